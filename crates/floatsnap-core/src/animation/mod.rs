#![forbid(unsafe_code)]

//! Frame-driven animation primitives.
//!
//! Everything here advances only when the host calls `tick(dt)` once per
//! frame; nothing owns a timer or a thread.
//!
//! - [`Spring`]: 1-D damped harmonic oscillator.
//! - [`SnapAnimator`]: two springs moving an element toward the finger or a
//!   corner, with a single-fire completion signal.
//! - [`Tween`]: fixed-duration interpolation with an [`Interpolator`].

pub mod snap;
pub mod spring;
pub mod tween;

use web_time::Duration;

pub use snap::{AxisTunings, SettleHandle, SettleStatus, Settled, SnapAnimator, SpringMode};
pub use spring::{Spring, SpringTuning};
pub use tween::{Interpolator, Tween};

/// A time-stepped animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end state.
    fn is_complete(&self) -> bool;

    /// Current output value.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);
}
