#![forbid(unsafe_code)]

//! Fixed-duration interpolation between two values.
//!
//! # Failure Modes
//!
//! - Zero duration: clamped to 1ns so progress jumps straight to 1.0.

use web_time::Duration;

use super::Animation;

/// Shape of a tween's progress curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interpolator {
    Linear,
    /// Slow start and end (cosine curve).
    #[default]
    AccelerateDecelerate,
    /// Runs past the end value then settles back onto it.
    Overshoot { tension: f32 },
}

impl Interpolator {
    /// Overshoot with the platform's default tension.
    pub const OVERSHOOT: Interpolator = Interpolator::Overshoot { tension: 2.0 };

    /// Map linear progress `t` in [0, 1] to eased progress.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Interpolator::Linear => t,
            Interpolator::AccelerateDecelerate => {
                ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5
            }
            Interpolator::Overshoot { tension } => {
                let s = t - 1.0;
                s * s * ((tension + 1.0) * s + tension) + 1.0
            }
        }
    }
}

/// Interpolates `from → to` over a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    interpolator: Interpolator,
}

impl Tween {
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration: duration.max(Duration::from_nanos(1)),
            elapsed: Duration::ZERO,
            interpolator: Interpolator::default(),
        }
    }

    /// Set the progress curve (builder pattern).
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    #[inline]
    #[must_use]
    pub fn start_value(&self) -> f32 {
        self.from
    }

    #[inline]
    #[must_use]
    pub fn end_value(&self) -> f32 {
        self.to
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    /// Linear progress in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.interpolator.apply(self.progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolators_hit_endpoints() {
        for i in [
            Interpolator::Linear,
            Interpolator::AccelerateDecelerate,
            Interpolator::OVERSHOOT,
        ] {
            assert!(i.apply(0.0).abs() < 1e-6, "{i:?} at 0");
            assert!((i.apply(1.0) - 1.0).abs() < 1e-6, "{i:?} at 1");
        }
    }

    #[test]
    fn overshoot_exceeds_one_midway() {
        let peak = (1..100)
            .map(|i| Interpolator::OVERSHOOT.apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0, "peak {peak}");
    }

    #[test]
    fn tween_completes_at_duration() {
        let mut t = Tween::new(1.0, 0.75, Duration::from_millis(250))
            .with_interpolator(Interpolator::Linear);
        t.tick(Duration::from_millis(125));
        assert!((t.value() - 0.875).abs() < 1e-6);
        assert!(!t.is_complete());
        t.tick(Duration::from_millis(500));
        assert!(t.is_complete());
        assert!((t.value() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut t = Tween::new(0.0, 1.0, Duration::ZERO);
        t.tick(Duration::from_nanos(1));
        assert!(t.is_complete());
        assert!((t.value() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn reset_rewinds() {
        let mut t = Tween::new(0.0, 1.0, Duration::from_millis(10));
        t.tick(Duration::from_millis(10));
        t.reset();
        assert!(!t.is_complete());
        assert!(t.value().abs() < 1e-6);
    }
}
