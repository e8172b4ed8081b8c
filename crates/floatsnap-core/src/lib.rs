#![forbid(unsafe_code)]

//! Core: touch gestures, geometry, and spring physics for floating elements.
//!
//! # Role in floatsnap
//! `floatsnap-core` turns raw touch streams into element motion. It is pure
//! and single-threaded: the host feeds [`TouchEvent`]s and per-frame ticks,
//! and implements small surface traits to expose the element being moved.
//!
//! # Primary responsibilities
//! - **CornerDragListener**: drag an element, then fling or snap it into a
//!   corner of its area with springs.
//! - **ScaleOnPressListener**: scale feedback while an element is pressed.
//! - **TouchTracker / VelocityTracker**: slop-based drag detection and
//!   release velocity.
//! - **resolve_fling**: pure fling-to-corner classification.
//! - **GestureConfig**: thresholds and tunings, loadable from TOML/JSON with
//!   the `config` feature.
//!
//! # How it fits in the system
//! `floatsnap-runtime` holds everything that involves threads or screen
//! stacks (presenter, navigation, soft input). Nothing here spawns threads
//! or owns a timer; animations advance only through `tick(dt)`.

pub mod animation;
pub mod config;
pub mod corner_drag;
pub mod event;
pub mod fling;
pub mod geometry;
pub mod gesture;
pub mod scale;
pub mod velocity;

pub use animation::{
    Animation, AxisTunings, Interpolator, SettleHandle, SettleStatus, Settled, SnapAnimator,
    Spring, SpringMode, SpringTuning, Tween,
};
pub use config::{ConfigError, CornerDragConfig, GestureConfig, ScaleConfig, ScaleType};
pub use corner_drag::{
    CornerDragDelegate, CornerDragListener, DragSurface, FixedArea, ReleaseOutcome,
};
pub use event::{DeviceMetrics, TouchAction, TouchEvent};
pub use fling::{
    FlingDecision, FlingInput, FlingThresholds, HorizontalDirection, VerticalDirection,
    resolve_fling,
};
pub use geometry::{Corner, Point, Rect, Size, center_of};
pub use gesture::{MoveUpdate, TouchState, TouchTracker};
pub use scale::{ScaleAnimation, ScaleOnPressListener, ScaleSurface};
pub use velocity::VelocityTracker;
