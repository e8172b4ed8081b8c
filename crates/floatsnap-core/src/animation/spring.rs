#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) animation.
//!
//! Drives one axis of an element's position with physically-based motion.
//! Based on the classical damped spring equation with unit mass:
//!
//!   a = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **stiffness** (k): Restoring force strength. Higher = faster response.
//! - **damping ratio** (ζ): Oscillation control, converted to the damping
//!   coefficient `c = 2ζ√k`.
//!   - ζ < 1: overshoots and bounces before settling
//!   - ζ = 1: fastest convergence without overshoot
//!   - ζ > 1: slow convergence, no overshoot
//! - **bounds**: optional `[min, max]` clamp on the position. Hitting a
//!   bound zeroes the velocity.
//! - **rest thresholds**: position delta and speed below which the spring
//!   is considered settled.
//!
//! # Integration
//!
//! Semi-implicit Euler, with frame deltas subdivided into steps of at most
//! [`MAX_STEP_SECS`] for stability at high stiffness.
//!
//! # Invariants
//!
//! 1. A spring at rest does not move until `animate_to` or `reset` is called.
//! 2. `cancel()` stops the spring where it is and zeroes its velocity.
//! 3. Stiffness is always ≥ [`MIN_STIFFNESS`]; damping is never negative.
//! 4. When bounds are set, `position()` is always within them.
//!
//! # Failure Modes
//!
//! - Zero damping: the spring oscillates forever and never reports rest.
//! - Very large dt: subdivided; callers should still cap frame deltas.

use web_time::Duration;

use super::Animation;

/// Maximum dt per integration step (4ms).
pub const MAX_STEP_SECS: f64 = 0.004;

/// Default rest threshold (px): position delta below which the spring may rest.
const DEFAULT_REST_THRESHOLD: f64 = 0.5;

/// Default velocity threshold (px/s) below which the spring may rest.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 30.0;

/// Minimum stiffness to prevent degenerate springs.
pub const MIN_STIFFNESS: f64 = 0.1;

/// Stiffness and damping ratio for a spring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringTuning {
    pub stiffness: f32,
    pub damping_ratio: f32,
}

impl SpringTuning {
    pub const STIFFNESS_HIGH: f32 = 10_000.0;
    pub const STIFFNESS_MEDIUM: f32 = 1_500.0;
    pub const STIFFNESS_LOW: f32 = 200.0;
    pub const STIFFNESS_VERY_LOW: f32 = 50.0;

    pub const DAMPING_RATIO_HIGH_BOUNCY: f32 = 0.2;
    pub const DAMPING_RATIO_MEDIUM_BOUNCY: f32 = 0.5;
    pub const DAMPING_RATIO_LOW_BOUNCY: f32 = 0.75;
    pub const DAMPING_RATIO_NO_BOUNCY: f32 = 1.0;

    /// Snappy, non-oscillating: used while following the finger.
    pub const FOLLOW: SpringTuning =
        SpringTuning::new(Self::STIFFNESS_HIGH, Self::DAMPING_RATIO_NO_BOUNCY);

    /// Soft with visible overshoot: used when settling into a corner.
    pub const SETTLE: SpringTuning =
        SpringTuning::new(Self::STIFFNESS_VERY_LOW, Self::DAMPING_RATIO_MEDIUM_BOUNCY);

    #[must_use]
    pub const fn new(stiffness: f32, damping_ratio: f32) -> Self {
        Self {
            stiffness,
            damping_ratio,
        }
    }
}

/// A damped harmonic oscillator on one axis.
///
/// # Example
///
/// ```
/// use web_time::Duration;
/// use floatsnap_core::animation::{Spring, SpringTuning};
///
/// let mut spring = Spring::new(0.0, 300.0).with_tuning(SpringTuning::new(400.0, 1.0));
/// for _ in 0..120 {
///     spring.advance(Duration::from_millis(16));
/// }
/// assert!((spring.position() - 300.0).abs() < 1.0);
/// assert!(!spring.is_running());
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    stiffness: f64,
    damping: f64,
    min: f64,
    max: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a running spring starting at `initial` and targeting `target`.
    ///
    /// Default tuning is [`SpringTuning::FOLLOW`].
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            stiffness: 1.0,
            damping: 0.0,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
        .with_tuning(SpringTuning::FOLLOW)
    }

    /// Create a spring resting at `position`.
    #[must_use]
    pub fn resting(position: f64) -> Self {
        let mut spring = Self::new(position, position);
        spring.at_rest = true;
        spring
    }

    /// Set stiffness (builder pattern). Clamped to [`MIN_STIFFNESS`].
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set the damping coefficient directly (builder pattern). Clamped to 0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Set stiffness and damping ratio (builder pattern).
    #[must_use]
    pub fn with_tuning(mut self, tuning: SpringTuning) -> Self {
        self.set_tuning(tuning);
        self
    }

    /// Clamp the position to `[min, max]` (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.set_bounds(min, max);
        self
    }

    /// Set rest threshold (builder pattern).
    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    /// Set velocity threshold (builder pattern).
    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    /// Current position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Damping coefficient.
    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Damping ratio derived from the coefficient.
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.damping / self.critical_damping()
    }

    /// Damping coefficient at which the spring is critically damped.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }

    /// Replace stiffness and damping ratio, keeping position and velocity.
    pub fn set_tuning(&mut self, tuning: SpringTuning) {
        self.stiffness = f64::from(tuning.stiffness).max(MIN_STIFFNESS);
        self.damping = (f64::from(tuning.damping_ratio) * self.critical_damping()).max(0.0);
    }

    /// Replace the position bounds. Inverted bounds are swapped.
    pub fn set_bounds(&mut self, min: f64, max: f64) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min = min;
        self.max = max;
        self.position = self.position.clamp(min, max);
    }

    /// Whether the spring is still moving.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.at_rest
    }

    /// Move the target and start (or keep) the spring running.
    pub fn animate_to(&mut self, target: f64) {
        self.target = target;
        self.at_rest = false;
    }

    /// Jump to `position` and rest there.
    pub fn snap_to(&mut self, position: f64) {
        self.position = position.clamp(self.min, self.max);
        self.target = self.position;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    /// Stop where the spring currently is.
    pub fn cancel(&mut self) {
        self.velocity = 0.0;
        self.at_rest = true;
    }

    /// Perform a single integration step of `dt` seconds.
    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;

        if self.position <= self.min || self.position >= self.max {
            self.position = self.position.clamp(self.min, self.max);
            self.velocity = 0.0;
        }
    }

    /// Advance the spring by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let total_secs = dt.as_secs_f64();
        if total_secs <= 0.0 {
            return;
        }

        let mut remaining = total_secs;
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        let settled_at_target = (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold;
        // A target outside the bounds can never be reached; resting on the
        // bound is the end state.
        let pinned = self.velocity == 0.0
            && ((self.position == self.min && self.target < self.min)
                || (self.position == self.max && self.target > self.max));

        if settled_at_target {
            self.position = self.target.clamp(self.min, self.max);
            self.velocity = 0.0;
            self.at_rest = true;
        } else if pinned {
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    /// The raw position.
    fn value(&self) -> f32 {
        self.position as f32
    }

    fn reset(&mut self) {
        self.position = self.initial.clamp(self.min, self.max);
        self.velocity = 0.0;
        self.at_rest = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn simulate(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            spring.tick(MS_16);
        }
    }

    #[test]
    fn follow_tuning_reaches_target_quickly() {
        let mut spring = Spring::new(0.0, 100.0);
        simulate(&mut spring, 30);
        assert!(spring.is_complete(), "pos {} vel {}", spring.position(), spring.velocity());
        assert!((spring.position() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn looser_rest_thresholds_rest_sooner() {
        fn frames_to_rest(mut spring: Spring) -> usize {
            (1..=2000)
                .find(|_| {
                    spring.tick(MS_16);
                    spring.is_complete()
                })
                .unwrap_or(usize::MAX)
        }
        let tight = Spring::new(0.0, 300.0).with_tuning(SpringTuning::SETTLE);
        let loose = tight
            .clone()
            .with_rest_threshold(20.0)
            .with_velocity_threshold(500.0);
        let (tight, loose) = (frames_to_rest(tight), frames_to_rest(loose));
        assert!(loose < tight, "loose {loose} vs tight {tight}");
        assert!(tight < 2000);
    }

    #[test]
    fn settle_tuning_overshoots_then_rests() {
        let mut spring = Spring::new(0.0, 300.0).with_tuning(SpringTuning::SETTLE);
        let mut max_pos = 0.0_f64;
        for _ in 0..600 {
            spring.tick(MS_16);
            max_pos = max_pos.max(spring.position());
        }
        assert!(max_pos > 300.0, "medium bouncy should overshoot, max {max_pos}");
        assert!(spring.is_complete());
        assert!((spring.position() - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_bouncy_does_not_overshoot() {
        let mut spring = Spring::new(0.0, 100.0).with_tuning(SpringTuning::new(200.0, 1.0));
        for _ in 0..300 {
            spring.tick(MS_16);
            assert!(spring.position() <= 100.0 + 0.5, "overshoot to {}", spring.position());
        }
    }

    #[test]
    fn tuning_converts_ratio_to_coefficient() {
        let spring = Spring::new(0.0, 1.0).with_tuning(SpringTuning::new(100.0, 0.5));
        assert!((spring.damping() - 10.0).abs() < 1e-9);
        assert!((spring.damping_ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn bounds_clamp_position() {
        let mut spring = Spring::new(0.0, 500.0).with_bounds(-50.0, 120.0);
        for _ in 0..60 {
            spring.tick(MS_16);
            assert!(spring.position() <= 120.0);
        }
        assert!((spring.position() - 120.0).abs() < f64::EPSILON);
        assert!(spring.is_complete(), "spring pinned at bound should rest");
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let spring = Spring::resting(500.0).with_bounds(100.0, -100.0);
        assert!((spring.position() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cancel_stops_in_place() {
        let mut spring = Spring::new(0.0, 300.0).with_tuning(SpringTuning::SETTLE);
        simulate(&mut spring, 5);
        let pos = spring.position();
        spring.cancel();
        assert!(!spring.is_running());
        simulate(&mut spring, 10);
        assert!((spring.position() - pos).abs() < f64::EPSILON);
    }

    #[test]
    fn animate_to_wakes_resting_spring() {
        let mut spring = Spring::resting(10.0);
        assert!(!spring.is_running());
        spring.animate_to(50.0);
        assert!(spring.is_running());
        simulate(&mut spring, 60);
        assert!((spring.position() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn animate_to_current_position_finishes_next_frame() {
        let mut spring = Spring::resting(10.0);
        spring.animate_to(10.0);
        spring.tick(MS_16);
        assert!(spring.is_complete());
    }

    #[test]
    fn snap_to_jumps_and_rests() {
        let mut spring = Spring::new(0.0, 100.0);
        spring.snap_to(42.0);
        assert!(!spring.is_running());
        assert!((spring.position() - 42.0).abs() < f64::EPSILON);
        assert!((spring.target() - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_dt_noop() {
        let mut spring = Spring::new(0.0, 1.0);
        let pos_before = spring.position();
        spring.tick(Duration::ZERO);
        assert!((spring.position() - pos_before).abs() < f64::EPSILON);
    }

    #[test]
    fn large_dt_subdivided() {
        let mut spring = Spring::new(0.0, 100.0).with_tuning(SpringTuning::new(170.0, 1.0));
        spring.tick(Duration::from_secs(5));
        assert!((spring.position() - 100.0).abs() < 0.5, "position: {}", spring.position());
    }

    #[test]
    fn zero_stiffness_clamped() {
        let spring = Spring::new(0.0, 1.0).with_stiffness(0.0);
        assert!(spring.stiffness() >= MIN_STIFFNESS);
    }

    #[test]
    fn negative_damping_clamped() {
        let spring = Spring::new(0.0, 1.0).with_damping(-5.0);
        assert!(spring.damping() >= 0.0);
    }

    #[test]
    fn zero_damping_never_rests() {
        let mut spring = Spring::new(0.0, 100.0)
            .with_stiffness(170.0)
            .with_damping(0.0);
        simulate(&mut spring, 500);
        assert!(spring.is_running());
    }

    #[test]
    fn reset_restores_initial() {
        let mut spring = Spring::new(42.0, 100.0);
        simulate(&mut spring, 200);
        spring.reset();
        assert!((spring.position() - 42.0).abs() < f64::EPSILON);
        assert!((spring.velocity() - 0.0).abs() < f64::EPSILON);
        assert!(!spring.is_complete());
    }

    #[test]
    fn deterministic_across_runs() {
        let run = || {
            let mut spring = Spring::new(0.0, 200.0).with_tuning(SpringTuning::SETTLE);
            let mut positions = Vec::new();
            for _ in 0..50 {
                spring.tick(MS_16);
                positions.push(spring.position());
            }
            positions
        };
        assert_eq!(run(), run());
    }
}
