#![forbid(unsafe_code)]

//! Draggable element that snaps into the corners of an area.
//!
//! [`CornerDragListener`] is a fixed state machine fed with [`TouchEvent`]s
//! and frame ticks. It moves a [`DragSurface`] with a [`SnapAnimator`]: the
//! springs follow the finger while the pointer is down and settle into a
//! corner of the movement area on release. A [`CornerDragDelegate`] supplies
//! the bounding area and receives the corner-reached notification.
//!
//! # Release policy
//!
//! | Release                                 | Outcome                       |
//! |-----------------------------------------|-------------------------------|
//! | `Up`, never dragged, click allowed      | click / long click, no snap   |
//! | `Up`, never dragged, click suppressed   | snap to nearest corner        |
//! | `Up` after a drag, or any `Cancel`      | snap (fling or nearest)       |
//!
//! A drag or cancel snap is classified as a fling when the gesture lasted
//! less than `fling_time`; see [`resolve_fling`]. When the fling resolves no corner the
//! element settles into the corner nearest its top-left position.
//!
//! # Invariants
//!
//! 1. The movement area is the bounding area shrunk by the element size and
//!    is fixed for the duration of a session. A size change is picked up on
//!    the next `Down`.
//! 2. The surface position is only written from [`CornerDragListener::tick`],
//!    i.e. by the springs.
//! 3. [`CornerDragDelegate::on_corner_reached`] fires once per completed
//!    settle and never for a cancelled one. A new `Down` cancels any settle
//!    in flight.
//!
//! # Failure Modes
//!
//! - `Move` without `Down`: recovered as an implicit down at the move point.
//! - `Up`/`Cancel` without a session: ignored, returns `false`.
//! - Degenerate (zero-size) areas never divide by zero; their axes simply
//!   never pass the fling distance check.

use tracing::{debug, trace, warn};
use web_time::Duration;

use crate::animation::{SettleHandle, Settled, SnapAnimator};
use crate::config::CornerDragConfig;
use crate::event::{DeviceMetrics, TouchAction, TouchEvent};
use crate::fling::{FlingInput, FlingThresholds, resolve_fling};
use crate::geometry::{Corner, Point, Rect, Size, center_of};
use crate::gesture::{TouchState, TouchTracker};
use crate::velocity::VelocityTracker;

// ---------------------------------------------------------------------------
// Platform and customization seams
// ---------------------------------------------------------------------------

/// The element being dragged.
pub trait DragSurface {
    /// Top-left position of the element.
    fn position(&self) -> Point;

    fn size(&self) -> Size;

    fn set_position(&mut self, position: Point);

    /// Pressed-state feedback.
    fn set_pressed(&mut self, _pressed: bool) {}

    fn perform_click(&mut self) -> bool;

    fn perform_long_click(&mut self) -> bool;

    /// Device constants. Read once, on the first session.
    fn metrics(&self) -> DeviceMetrics {
        DeviceMetrics::default()
    }
}

/// Customization points of a [`CornerDragListener`].
pub trait CornerDragDelegate {
    /// Bounding area for an element of `size`.
    fn area(&mut self, size: Size) -> Rect;

    /// A settle finished at `settled.corner`.
    fn on_corner_reached(&mut self, _settled: Settled) {}

    /// Return value of `on_touch` for a `Down`.
    fn on_down(&mut self, _event: &TouchEvent) -> bool {
        true
    }

    /// Return value of `on_touch` for a `Move` while dragging.
    fn on_move(&mut self, _event: &TouchEvent) -> bool {
        true
    }

    /// Return value of `on_touch` for an `Up`/`Cancel`.
    fn on_stop(&mut self, _event: &TouchEvent, _outcome: &ReleaseOutcome) -> bool {
        true
    }
}

/// Delegate with a constant bounding area and no callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedArea(pub Rect);

impl CornerDragDelegate for FixedArea {
    fn area(&mut self, _size: Size) -> Rect {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Release outcome
// ---------------------------------------------------------------------------

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Tap shorter than the tap time.
    Click,
    /// Tap at least as long as the tap time.
    LongClick,
    /// The element is settling into `corner`, whose coordinates are `point`.
    Settle {
        corner: Corner,
        point: Point,
        /// The corner came from fling classification.
        fling: bool,
        /// A tap was released away from every corner and its click dropped.
        click_suppressed: bool,
    },
}

impl ReleaseOutcome {
    #[must_use]
    pub fn is_click(&self) -> bool {
        matches!(self, ReleaseOutcome::Click | ReleaseOutcome::LongClick)
    }

    /// Target corner of a settle.
    #[must_use]
    pub fn corner(&self) -> Option<Corner> {
        match self {
            ReleaseOutcome::Settle { corner, .. } => Some(*corner),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Geometry and springs, created on first contact with a surface.
#[derive(Debug)]
struct Attached {
    size: Size,
    area: Rect,
    movement: Rect,
    animator: SnapAnimator,
}

impl Attached {
    fn new<S: DragSurface, D: CornerDragDelegate>(
        surface: &S,
        delegate: &mut D,
        config: &CornerDragConfig,
    ) -> Self {
        let size = surface.size();
        let area = delegate.area(size);
        let mut animator = SnapAnimator::new(surface.position(), config.follow, config.settle);
        animator.set_bounds(animation_area(area, size));
        let attached = Self {
            size,
            area,
            movement: area.movement_area(size),
            animator,
        };
        debug!(?area, movement = ?attached.movement, "corner drag attached");
        attached
    }

    fn resize<D: CornerDragDelegate>(&mut self, size: Size, delegate: &mut D) {
        self.size = size;
        self.area = delegate.area(size);
        self.movement = self.area.movement_area(size);
        self.animator.set_bounds(animation_area(self.area, size));
        debug!(area = ?self.area, movement = ?self.movement, "element resized, area recomputed");
    }
}

/// Range the springs may reach: the area grown by twice the element size.
fn animation_area(area: Rect, size: Size) -> Rect {
    area.expand(2.0 * size.width, 2.0 * size.height)
}

/// Drag-and-snap state machine for one element.
#[derive(Debug)]
pub struct CornerDragListener<D> {
    delegate: D,
    config: CornerDragConfig,
    metrics: Option<DeviceMetrics>,
    tracker: TouchTracker,
    velocity: VelocityTracker,
    attached: Option<Attached>,
    /// Element position minus finger position at down.
    finger_offset: Point,
    /// Element center at down.
    start_center: Point,
    settle: Option<SettleHandle>,
    last_release: Option<ReleaseOutcome>,
}

impl<D: CornerDragDelegate> CornerDragListener<D> {
    /// Listener with default thresholds and tunings.
    #[must_use]
    pub fn new(delegate: D) -> Self {
        Self::with_config(delegate, CornerDragConfig::default())
    }

    #[must_use]
    pub fn with_config(delegate: D, config: CornerDragConfig) -> Self {
        Self {
            delegate,
            config,
            metrics: None,
            tracker: TouchTracker::new(0.0),
            velocity: VelocityTracker::new(),
            attached: None,
            finger_offset: Point::default(),
            start_center: Point::default(),
            settle: None,
            last_release: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &CornerDragConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    #[inline]
    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> TouchState {
        self.tracker.state()
    }

    /// Whether a pointer is down.
    #[inline]
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.tracker.has_session()
    }

    /// Bounding area, once attached.
    #[must_use]
    pub fn area(&self) -> Option<Rect> {
        self.attached.as_ref().map(|a| a.area)
    }

    /// Valid top-left positions, once attached.
    #[must_use]
    pub fn movement_area(&self) -> Option<Rect> {
        self.attached.as_ref().map(|a| a.movement)
    }

    /// Outcome of the most recent release.
    #[inline]
    #[must_use]
    pub fn last_release(&self) -> Option<ReleaseOutcome> {
        self.last_release
    }

    /// Completion signal of the most recent settle.
    #[must_use]
    pub fn settle_handle(&self) -> Option<&SettleHandle> {
        self.settle.as_ref()
    }

    /// Whether the springs are moving.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.attached
            .as_ref()
            .is_some_and(|a| a.animator.is_running())
    }

    /// Feed one touch event.
    pub fn on_touch<S: DragSurface>(&mut self, event: &TouchEvent, surface: &mut S) -> bool {
        trace!(action = ?event.action, x = event.raw.x, y = event.raw.y, "touch");
        match event.action {
            TouchAction::Down => self.handle_down(event, surface),
            TouchAction::Move => self.handle_move(event, surface),
            TouchAction::Up | TouchAction::Cancel => self.handle_release(event, surface),
        }
    }

    /// Advance the springs by one frame and move the surface.
    ///
    /// Returns the settle result on the frame it completes.
    pub fn tick<S: DragSurface>(&mut self, dt: Duration, surface: &mut S) -> Option<Settled> {
        let attached = self.attached.as_mut()?;
        if !attached.animator.is_running() && !attached.animator.has_pending_settle() {
            return None;
        }
        let settled = attached.animator.tick(dt);
        surface.set_position(attached.animator.position());
        if let Some(settled) = settled {
            self.delegate.on_corner_reached(settled);
        }
        settled
    }

    /// Stop the springs where they are. A pending settle is cancelled.
    pub fn clear_animation(&mut self) {
        if let Some(attached) = self.attached.as_mut() {
            attached.animator.cancel();
        }
    }

    /// Settle into `corner` of the movement area.
    pub fn move_to_corner<S: DragSurface>(&mut self, corner: Corner, surface: &S) -> SettleHandle {
        self.attach(surface);
        let attached = self
            .attached
            .get_or_insert_with(|| Attached::new(surface, &mut self.delegate, &self.config));
        let point = attached.movement.corner(corner);
        let handle = attached.animator.settle_to(corner, point);
        self.settle = Some(handle.clone());
        handle
    }

    /// Settle into the corner nearest the element's current position.
    pub fn move_to_nearest_corner<S: DragSurface>(&mut self, surface: &S) -> SettleHandle {
        let corner = self.current_corner(surface);
        self.move_to_corner(corner, surface)
    }

    /// Corner of the movement area nearest the element's position.
    pub fn current_corner<S: DragSurface>(&mut self, surface: &S) -> Corner {
        self.attach(surface);
        self.attached
            .as_ref()
            .map_or(Corner::TopLeft, |a| a.movement.nearest_corner(surface.position()))
    }

    // -----------------------------------------------------------------------
    // Event handling
    // -----------------------------------------------------------------------

    /// Read metrics and build geometry on first use.
    fn attach<S: DragSurface>(&mut self, surface: &S) {
        if self.metrics.is_none() {
            let metrics = surface.metrics();
            self.tracker.set_slop(metrics.touch_slop);
            self.metrics = Some(metrics);
        }
        if self.attached.is_none() {
            self.attached = Some(Attached::new(surface, &mut self.delegate, &self.config));
        }
    }

    fn begin_session<S: DragSurface>(&mut self, event: &TouchEvent, surface: &mut S) {
        self.attach(surface);
        let position = surface.position();
        let size = surface.size();
        if let Some(attached) = self.attached.as_mut() {
            if attached.size != size {
                attached.resize(size, &mut self.delegate);
            }
            // Sync the springs with wherever the host left the element.
            attached.animator.snap_to(position);
        }
        self.tracker.begin(event.raw);
        self.velocity.clear();
        self.velocity.add(event.event_time, event.raw);
        self.finger_offset = position.delta(event.raw);
        self.start_center = center_of(position, size);
        surface.set_pressed(true);
    }

    fn handle_down<S: DragSurface>(&mut self, event: &TouchEvent, surface: &mut S) -> bool {
        self.begin_session(event, surface);
        self.delegate.on_down(event)
    }

    fn handle_move<S: DragSurface>(&mut self, event: &TouchEvent, surface: &mut S) -> bool {
        if !self.tracker.has_session() {
            warn!(x = event.raw.x, y = event.raw.y, "move without down, starting session here");
            self.begin_session(event, surface);
        } else {
            self.velocity.add(event.event_time, event.raw);
        }
        self.tracker.update(event.raw);

        let allow_out = self.config.allow_move_out_of_area;
        let offset = self.finger_offset;
        if let Some(attached) = self.attached.as_mut() {
            let mut target = event.raw.offset(offset.x, offset.y);
            if !allow_out {
                target = attached.movement.clamp(target);
            }
            attached.animator.follow(target);
        }

        if self.tracker.is_dragging() {
            self.delegate.on_move(event)
        } else {
            true
        }
    }

    fn handle_release<S: DragSurface>(&mut self, event: &TouchEvent, surface: &mut S) -> bool {
        if !self.tracker.has_session() {
            debug!(action = ?event.action, "release without session, ignored");
            self.velocity.clear();
            surface.set_pressed(false);
            return false;
        }
        self.velocity.add(event.event_time, event.raw);

        let elapsed = event.elapsed();
        let outcome = self.resolve_release(event, elapsed, surface);
        debug!(?outcome, elapsed_ms = elapsed.as_millis() as u64, "release");

        self.velocity.clear();
        self.tracker.finish();
        surface.set_pressed(false);
        self.last_release = Some(outcome);
        self.delegate.on_stop(event, &outcome)
    }

    fn resolve_release<S: DragSurface>(
        &mut self,
        event: &TouchEvent,
        elapsed: Duration,
        surface: &mut S,
    ) -> ReleaseOutcome {
        let position = surface.position();
        let mut click_suppressed = false;

        if event.action == TouchAction::Up && self.tracker.state() == TouchState::Resting {
            let near_corner = self.attached.as_ref().is_some_and(|a| {
                a.movement
                    .is_near_corner(position, self.config.corner_click_tolerance)
            });
            if !self.config.only_corner_click || near_corner {
                return if elapsed < self.config.tap_time {
                    surface.perform_click();
                    ReleaseOutcome::Click
                } else {
                    surface.perform_long_click();
                    ReleaseOutcome::LongClick
                };
            }
            debug!(x = position.x, y = position.y, "not near a corner, click suppressed");
            click_suppressed = true;
        }

        let Some(attached) = self.attached.as_mut() else {
            // begin_session always attaches; keep the element where it is.
            return ReleaseOutcome::Settle {
                corner: Corner::TopLeft,
                point: position,
                fling: false,
                click_suppressed,
            };
        };

        let mut fling_corner = None;
        if !click_suppressed && elapsed < self.config.fling_time {
            let metrics = self.metrics.unwrap_or_default();
            let input = FlingInput {
                velocity: self.velocity.compute_velocity(metrics.maximum_fling_velocity),
                start_center: self.start_center,
                end_center: center_of(position, surface.size()),
                area: attached.area,
            };
            let thresholds = FlingThresholds {
                minimum_fling_velocity: metrics.minimum_fling_velocity,
                threshold_velocity_x: self.config.threshold_velocity_x,
                threshold_velocity_y: self.config.threshold_velocity_y,
                distance_pass_percent: self.config.fling_distance_pass_percent,
            };
            fling_corner = resolve_fling(&input, &thresholds).corner;
        }

        let corner = fling_corner.unwrap_or_else(|| attached.movement.nearest_corner(position));
        let point = attached.movement.corner(corner);
        self.settle = Some(attached.animator.settle_to(corner, point));
        ReleaseOutcome::Settle {
            corner,
            point,
            fling: fling_corner.is_some(),
            click_suppressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Element {
        position: Point,
        size: Size,
        pressed: bool,
        clicks: u32,
        long_clicks: u32,
    }

    impl DragSurface for Element {
        fn position(&self) -> Point {
            self.position
        }
        fn size(&self) -> Size {
            self.size
        }
        fn set_position(&mut self, position: Point) {
            self.position = position;
        }
        fn set_pressed(&mut self, pressed: bool) {
            self.pressed = pressed;
        }
        fn perform_click(&mut self) -> bool {
            self.clicks += 1;
            true
        }
        fn perform_long_click(&mut self) -> bool {
            self.long_clicks += 1;
            true
        }
    }

    fn element_at(x: f32, y: f32) -> Element {
        Element {
            position: Point::new(x, y),
            size: Size::new(50.0, 50.0),
            ..Element::default()
        }
    }

    fn listener() -> CornerDragListener<FixedArea> {
        CornerDragListener::new(FixedArea(Rect::new(0.0, 0.0, 400.0, 800.0)))
    }

    fn at(action: TouchAction, x: f32, y: f32, ms: u64) -> TouchEvent {
        TouchEvent::new(
            action,
            Point::new(x, y),
            Duration::from_millis(ms),
            Duration::ZERO,
        )
    }

    #[test]
    fn movement_area_is_area_minus_size() {
        let mut l = listener();
        let mut e = element_at(0.0, 0.0);
        l.on_touch(&at(TouchAction::Down, 10.0, 10.0, 0), &mut e);
        assert_eq!(l.movement_area(), Some(Rect::new(0.0, 0.0, 350.0, 750.0)));
        assert!(e.pressed);
    }

    #[test]
    fn tap_on_corner_clicks_without_snap() {
        let mut l = listener();
        let mut e = element_at(0.0, 0.0);
        l.on_touch(&at(TouchAction::Down, 10.0, 10.0, 0), &mut e);
        l.on_touch(&at(TouchAction::Up, 10.0, 10.0, 100), &mut e);
        assert_eq!(l.last_release(), Some(ReleaseOutcome::Click));
        assert_eq!(e.clicks, 1);
        assert!(l.settle_handle().is_none());
        assert!(!e.pressed);
        assert!(!l.has_session());
    }

    #[test]
    fn tap_away_from_corner_is_suppressed_and_snaps() {
        let mut l = listener();
        let mut e = element_at(100.0, 100.0);
        l.on_touch(&at(TouchAction::Down, 110.0, 110.0, 0), &mut e);
        l.on_touch(&at(TouchAction::Up, 110.0, 110.0, 500), &mut e);
        assert_eq!(e.clicks, 0);
        match l.last_release() {
            Some(ReleaseOutcome::Settle {
                corner,
                click_suppressed,
                fling,
                ..
            }) => {
                assert_eq!(corner, Corner::TopLeft);
                assert!(click_suppressed);
                assert!(!fling);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn new_down_cancels_settle() {
        let mut l = listener();
        let mut e = element_at(100.0, 100.0);
        let handle = l.move_to_corner(Corner::BottomRight, &e);
        l.tick(Duration::from_millis(16), &mut e);
        l.on_touch(&at(TouchAction::Down, 120.0, 120.0, 1000), &mut e);
        assert!(handle.is_cancelled());
        assert!(!l.is_animating());
    }

    #[test]
    fn stray_release_is_ignored() {
        let mut l = listener();
        let mut e = element_at(0.0, 0.0);
        assert!(!l.on_touch(&at(TouchAction::Up, 0.0, 0.0, 10), &mut e));
        assert_eq!(l.last_release(), None);
        assert_eq!(e.clicks, 0);
    }
}
