#![forbid(unsafe_code)]

//! floatsnap Runtime
//!
//! The threaded and screen-level pieces that sit around the gesture core.
//!
//! # Key Components
//!
//! - [`Presenter`] - single worker thread plus a main-thread queue drained by
//!   [`Presenter::pump`]
//! - [`MainPoster`] - `Send` handle that posts closures back to the UI thread
//! - [`NavigationStack`] - back stack of [`Screen`]s with keyboard auto-hide
//!   and double-press exit
//! - [`SoftInput`] - on-screen keyboard control
//! - [`CancellationSource`] - release signal shared with the worker
//!
//! # Role in floatsnap
//! `floatsnap-core` is pure and single-threaded. This crate owns the only
//! thread the library creates and the state that outlives a single gesture.

pub mod cancellation;
pub mod navigation;
pub mod presenter;
pub mod soft_input;

pub use cancellation::{CancellationSource, CancellationToken, Cancelled};
pub use navigation::{BackPressOutcome, EXIT_WINDOW, Entry, NavigationStack, Screen, Transition};
pub use presenter::{
    MainPoster, Presenter, PresenterError, PresenterView, TaskFailure, TaskResult,
    WORKER_THREAD_NAME,
};
pub use soft_input::{SoftInput, VISIBLE_FRACTION, soft_input_height};
