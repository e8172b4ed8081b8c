#![forbid(unsafe_code)]

//! Canonical touch event types.
//!
//! A touch stream for one element is an ordered sequence: one `Down`,
//! zero or more `Move`s, then one terminal `Up` or `Cancel`. Hosts that
//! drop a `Down` (e.g. the element was attached mid-gesture) are tolerated
//! by the trackers, which treat the first `Move` as an implicit down.
//!
//! # Design Notes
//!
//! - Positions are raw screen coordinates, independent of the element's
//!   own position, so moving the element does not feed back into the
//!   gesture.
//! - Times are monotonic offsets from an arbitrary origin chosen by the
//!   host. Only differences are meaningful.

use web_time::Duration;

use crate::geometry::Point;

/// The phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchAction {
    /// A pointer went down.
    Down,
    /// The pointer moved while down.
    Move,
    /// The pointer was lifted.
    Up,
    /// The gesture was aborted by the host.
    Cancel,
}

impl TouchAction {
    /// Whether this action ends a gesture session.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, TouchAction::Up | TouchAction::Cancel)
    }
}

/// A single touch sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Event phase.
    pub action: TouchAction,
    /// Raw screen-space position of the pointer.
    pub raw: Point,
    /// Time this event happened.
    pub event_time: Duration,
    /// Time of the `Down` that started the current gesture.
    pub down_time: Duration,
}

impl TouchEvent {
    /// Create an event whose gesture started at `down_time`.
    #[must_use]
    pub const fn new(
        action: TouchAction,
        raw: Point,
        event_time: Duration,
        down_time: Duration,
    ) -> Self {
        Self {
            action,
            raw,
            event_time,
            down_time,
        }
    }

    /// A `Down` at `time`; its down time is itself.
    #[must_use]
    pub const fn down(raw: Point, time: Duration) -> Self {
        Self::new(TouchAction::Down, raw, time, time)
    }

    /// Time elapsed since the gesture's `Down`.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.event_time.saturating_sub(self.down_time)
    }
}

/// Device-dependent touch constants.
///
/// Hosts read these from the platform once per listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceMetrics {
    /// Minimum displacement (px) on either axis before a touch is a drag.
    pub touch_slop: f32,
    /// Velocity (px/s) below which motion is not a fling.
    pub minimum_fling_velocity: f32,
    /// Upper bound (px/s) applied to measured velocities.
    pub maximum_fling_velocity: f32,
}

impl Default for DeviceMetrics {
    /// Values for a typical ~2.75x density phone.
    fn default() -> Self {
        Self {
            touch_slop: 22.0,
            minimum_fling_velocity: 137.0,
            maximum_fling_velocity: 22_000.0,
        }
    }
}
