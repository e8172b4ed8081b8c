#![forbid(unsafe_code)]

//! Press feedback that scales an element down (or up) while it is held.
//!
//! Independent of corner dragging: it shares only the click timing rule.
//! On `Down` the element animates from `base` to `base ± delta` and holds
//! there. On release it animates back to `base`; a tap starts the way back
//! from a slightly larger offset with an overshoot curve so the element
//! visibly bounces.

use tracing::{debug, warn};
use web_time::Duration;

use crate::animation::{Animation, Interpolator, Tween};
use crate::config::ScaleConfig;
use crate::event::{DeviceMetrics, TouchAction, TouchEvent};
use crate::gesture::TouchTracker;

/// The element receiving scale feedback.
pub trait ScaleSurface {
    /// Pressed-state feedback.
    fn set_pressed(&mut self, _pressed: bool) {}

    /// Replace any running scale animation with `animation`.
    fn start_scale(&mut self, animation: ScaleAnimation);

    fn perform_click(&mut self) -> bool;

    fn perform_long_click(&mut self) -> bool;

    /// Device constants. Read once, on the first press.
    fn metrics(&self) -> DeviceMetrics {
        DeviceMetrics::default()
    }
}

/// Uniform scale animation around the element center.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleAnimation {
    tween: Tween,
    fill_after: bool,
}

impl ScaleAnimation {
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            tween: Tween::new(from, to, duration),
            fill_after: false,
        }
    }

    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.tween = self.tween.with_interpolator(interpolator);
        self
    }

    /// Keep the end scale once finished instead of reverting to 1.0.
    #[must_use]
    pub fn with_fill_after(mut self, fill_after: bool) -> Self {
        self.fill_after = fill_after;
        self
    }

    #[inline]
    #[must_use]
    pub fn from_scale(&self) -> f32 {
        self.tween.start_value()
    }

    #[inline]
    #[must_use]
    pub fn to_scale(&self) -> f32 {
        self.tween.end_value()
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.tween.duration()
    }

    #[inline]
    #[must_use]
    pub fn interpolator(&self) -> Interpolator {
        self.tween.interpolator()
    }

    #[inline]
    #[must_use]
    pub fn fill_after(&self) -> bool {
        self.fill_after
    }

    /// Scale to draw with this frame.
    #[must_use]
    pub fn scale(&self) -> f32 {
        if self.tween.is_complete() && !self.fill_after {
            1.0
        } else {
            self.tween.value()
        }
    }
}

impl Animation for ScaleAnimation {
    fn tick(&mut self, dt: Duration) {
        self.tween.tick(dt);
    }

    fn is_complete(&self) -> bool {
        self.tween.is_complete()
    }

    fn value(&self) -> f32 {
        self.scale()
    }

    fn reset(&mut self) {
        self.tween.reset();
    }
}

/// Scale-on-press listener.
#[derive(Debug, Clone)]
pub struct ScaleOnPressListener {
    config: ScaleConfig,
    tracker: TouchTracker,
    slop_known: bool,
}

impl Default for ScaleOnPressListener {
    fn default() -> Self {
        Self::new(ScaleConfig::default())
    }
}

impl ScaleOnPressListener {
    #[must_use]
    pub fn new(config: ScaleConfig) -> Self {
        Self {
            config,
            tracker: TouchTracker::new(0.0),
            slop_known: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Scale held while pressed.
    #[must_use]
    pub fn pressed_scale(&self) -> f32 {
        self.config.base_scale + self.config.scale_type.sign() * self.config.delta_scale
    }

    /// Feed one touch event. Always consumes it.
    pub fn on_touch<S: ScaleSurface>(&mut self, event: &TouchEvent, surface: &mut S) -> bool {
        match event.action {
            TouchAction::Down => self.begin_press(event, surface),
            TouchAction::Move => {
                if !self.tracker.has_session() {
                    warn!(x = event.raw.x, y = event.raw.y, "move without down, pressing here");
                    self.begin_press(event, surface);
                }
                self.tracker.update(event.raw);
            }
            TouchAction::Up | TouchAction::Cancel => {
                let tapped = event.action == TouchAction::Up
                    && self.tracker.has_session()
                    && !self.tracker.is_dragging();
                if tapped {
                    if event.elapsed() < self.config.tap_time {
                        debug!("scale listener: click");
                        surface.perform_click();
                    } else {
                        debug!("scale listener: long click");
                        surface.perform_long_click();
                    }
                }
                self.tracker.finish();
                surface.set_pressed(false);
                surface.start_scale(self.release_animation(tapped));
            }
        }
        true
    }

    fn begin_press<S: ScaleSurface>(&mut self, event: &TouchEvent, surface: &mut S) {
        if !self.slop_known {
            self.tracker.set_slop(surface.metrics().touch_slop);
            self.slop_known = true;
        }
        self.tracker.begin(event.raw);
        surface.set_pressed(true);
        surface.start_scale(self.press_animation());
    }

    fn press_animation(&self) -> ScaleAnimation {
        ScaleAnimation::new(self.config.base_scale, self.pressed_scale(), self.config.duration)
            .with_fill_after(true)
    }

    fn release_animation(&self, tapped: bool) -> ScaleAnimation {
        let boost = if tapped { self.config.tap_boost } else { 0.0 };
        let delta = (self.config.delta_scale + boost) * self.config.scale_type.sign();
        let to = self.config.base_scale;
        let from = (to + delta).max(0.0);
        let animation = ScaleAnimation::new(from, to, self.config.duration);
        if tapped {
            animation.with_interpolator(Interpolator::OVERSHOOT)
        } else {
            animation
        }
    }
}
