#![forbid(unsafe_code)]

//! Pointer velocity estimation for fling detection.
//!
//! [`VelocityTracker`] keeps a short history of raw pointer positions and
//! fits a recency-weighted least-squares line per axis. Only samples within
//! [`HORIZON`] of the newest one contribute.
//!
//! # Failure Modes
//!
//! - Fewer than two samples: velocity is zero.
//! - Samples with decreasing timestamps are ignored.
//! - A pointer that moved less than [`MIN_MOVEMENT`] over more than
//!   [`ASSUME_STOPPED`] reports zero on that axis.

use std::collections::VecDeque;

use tracing::trace;
use web_time::Duration;

use crate::geometry::Point;

/// Maximum number of retained samples.
const HISTORY_SIZE: usize = 20;

/// Only samples this close to the newest one are used.
pub const HORIZON: Duration = Duration::from_millis(100);

/// Span after which an unmoving pointer is considered stopped.
pub const ASSUME_STOPPED: Duration = Duration::from_millis(40);

/// Movement (px) under which a pointer is considered stationary.
pub const MIN_MOVEMENT: f32 = 2.0;

/// Recency weight decay per sample.
const DECAY: f64 = 0.95;

#[derive(Debug, Clone, Copy)]
struct Sample {
    time: Duration,
    pos: Point,
}

/// Two-axis velocity tracker for a single gesture.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    history: VecDeque<Sample>,
}

impl VelocityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_SIZE),
        }
    }

    /// Record the pointer at `pos` at `time`.
    pub fn add(&mut self, time: Duration, pos: Point) {
        if let Some(last) = self.history.back()
            && time < last.time
        {
            trace!(?time, last = ?last.time, "ignoring out-of-order velocity sample");
            return;
        }
        if self.history.len() == HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(Sample { time, pos });
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Unbounded velocity in px/s.
    #[must_use]
    pub fn velocity(&self) -> Point {
        Point::new(
            self.axis_velocity(|p| p.x) as f32,
            self.axis_velocity(|p| p.y) as f32,
        )
    }

    /// Velocity in px/s with each axis clamped to `[-max, max]`.
    #[must_use]
    pub fn compute_velocity(&self, max: f32) -> Point {
        let max = max.abs();
        let v = self.velocity();
        Point::new(v.x.clamp(-max, max), v.y.clamp(-max, max))
    }

    fn axis_velocity(&self, axis: impl Fn(Point) -> f32) -> f64 {
        let Some(newest) = self.history.back() else {
            return 0.0;
        };

        let window: Vec<&Sample> = self
            .history
            .iter()
            .rev()
            .take_while(|s| newest.time - s.time <= HORIZON)
            .collect();
        if window.len() < 2 {
            return 0.0;
        }

        let oldest = window[window.len() - 1];
        let span = newest.time - oldest.time;
        if span > ASSUME_STOPPED && (axis(newest.pos) - axis(oldest.pos)).abs() < MIN_MOVEMENT {
            return 0.0;
        }

        let mut sum_w = 0.0;
        let mut sum_t = 0.0;
        let mut sum_x = 0.0;
        let mut sum_tt = 0.0;
        let mut sum_tx = 0.0;
        let mut weight = 1.0;
        for sample in &window {
            // Seconds relative to the newest sample (<= 0).
            let t = -(newest.time - sample.time).as_secs_f64();
            let x = f64::from(axis(sample.pos));
            sum_w += weight;
            sum_t += weight * t;
            sum_x += weight * x;
            sum_tt += weight * t * t;
            sum_tx += weight * t * x;
            weight *= DECAY;
        }

        let denom = sum_w * sum_tt - sum_t * sum_t;
        if denom.abs() < f64::EPSILON {
            return 0.0;
        }
        (sum_w * sum_tx - sum_t * sum_x) / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_linear(tracker: &mut VelocityTracker, vx: f32, vy: f32, frames: u64) {
        for i in 0..frames {
            let t = Duration::from_millis(i * 10);
            let secs = t.as_secs_f32();
            tracker.add(t, Point::new(vx * secs, vy * secs));
        }
    }

    #[test]
    fn empty_tracker_is_still() {
        let t = VelocityTracker::new();
        assert_eq!(t.velocity(), Point::new(0.0, 0.0));
    }

    #[test]
    fn single_sample_is_still() {
        let mut t = VelocityTracker::new();
        t.add(Duration::ZERO, Point::new(5.0, 5.0));
        assert_eq!(t.velocity(), Point::new(0.0, 0.0));
    }

    #[test]
    fn linear_motion_matches_speed() {
        let mut t = VelocityTracker::new();
        feed_linear(&mut t, 1000.0, -500.0, 8);
        let v = t.velocity();
        assert!((v.x - 1000.0).abs() < 1.0, "vx = {}", v.x);
        assert!((v.y + 500.0).abs() < 1.0, "vy = {}", v.y);
    }

    #[test]
    fn velocity_is_clamped_per_axis() {
        let mut t = VelocityTracker::new();
        feed_linear(&mut t, 9000.0, -9000.0, 8);
        let v = t.compute_velocity(4000.0);
        assert_eq!(v, Point::new(4000.0, -4000.0));
    }

    #[test]
    fn stationary_pointer_reports_zero() {
        let mut t = VelocityTracker::new();
        for i in 0..8u64 {
            t.add(Duration::from_millis(i * 10), Point::new(10.0 + (i % 2) as f32 * 0.5, 10.0));
        }
        assert_eq!(t.velocity().x, 0.0);
    }

    #[test]
    fn old_samples_fall_out_of_horizon() {
        let mut t = VelocityTracker::new();
        // Fast motion long ago...
        feed_linear(&mut t, 5000.0, 0.0, 5);
        // ...then a long pause followed by a single sample.
        t.add(Duration::from_millis(1000), Point::new(200.0, 0.0));
        assert_eq!(t.velocity().x, 0.0);
    }

    #[test]
    fn out_of_order_sample_is_ignored() {
        let mut t = VelocityTracker::new();
        t.add(Duration::from_millis(50), Point::default());
        t.add(Duration::from_millis(40), Point::default());
        assert_eq!(t.len(), 1);
    }
}
