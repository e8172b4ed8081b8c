#![forbid(unsafe_code)]

//! Two-axis spring driver for floating elements.
//!
//! [`SnapAnimator`] moves an element's top-left position with one [`Spring`]
//! per axis. It has two modes:
//!
//! - **Follow**: the target tracks the finger every move; stiff and
//!   non-bouncy so the element sticks to the pointer.
//! - **Settle**: the target is a corner, set once; soft and bouncy.
//!
//! Every settle returns a [`SettleHandle`], a single-fire completion signal.
//!
//! # Invariants
//!
//! 1. A settle completes at most once, and only on a tick where neither axis
//!    is running.
//! 2. A cancelled settle never completes. Starting a new follow or settle
//!    cancels the pending one.
//! 3. Both axes always use the same mode.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};
use web_time::Duration;

use super::spring::{Spring, SpringTuning};
use crate::geometry::{Corner, Point, Rect};

/// Which tuning the springs currently use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringMode {
    Follow,
    Settle,
}

/// Per-axis spring tunings for one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisTunings {
    pub x: SpringTuning,
    pub y: SpringTuning,
}

impl AxisTunings {
    /// Same tuning on both axes.
    #[must_use]
    pub const fn uniform(tuning: SpringTuning) -> Self {
        Self {
            x: tuning,
            y: tuning,
        }
    }
}

/// A finished settle: the corner reached and its coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settled {
    pub corner: Corner,
    pub point: Point,
}

/// State of a settle's completion signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettleStatus {
    Pending,
    Completed(Settled),
    Cancelled,
}

/// Completion signal for one settle. Clones observe the same signal.
#[derive(Debug, Clone)]
pub struct SettleHandle {
    status: Rc<Cell<SettleStatus>>,
}

impl SettleHandle {
    fn new() -> Self {
        Self {
            status: Rc::new(Cell::new(SettleStatus::Pending)),
        }
    }

    #[must_use]
    pub fn status(&self) -> SettleStatus {
        self.status.get()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status() == SettleStatus::Pending
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status() == SettleStatus::Cancelled
    }

    /// The settle result, once completed.
    #[must_use]
    pub fn result(&self) -> Option<Settled> {
        match self.status() {
            SettleStatus::Completed(settled) => Some(settled),
            _ => None,
        }
    }

    /// Resolve the signal. Returns `false` if it was already resolved.
    fn complete(&self, settled: Settled) -> bool {
        self.resolve(SettleStatus::Completed(settled))
    }

    fn cancel(&self) -> bool {
        self.resolve(SettleStatus::Cancelled)
    }

    fn resolve(&self, status: SettleStatus) -> bool {
        if self.is_pending() {
            self.status.set(status);
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
struct PendingSettle {
    settled: Settled,
    handle: SettleHandle,
}

/// Two-axis spring animator with follow and settle modes.
#[derive(Debug)]
pub struct SnapAnimator {
    x: Spring,
    y: Spring,
    follow: AxisTunings,
    settle: AxisTunings,
    mode: SpringMode,
    pending: Option<PendingSettle>,
}

impl SnapAnimator {
    /// Create an animator resting at `position`.
    #[must_use]
    pub fn new(position: Point, follow: AxisTunings, settle: AxisTunings) -> Self {
        let mut animator = Self {
            x: Spring::resting(f64::from(position.x)),
            y: Spring::resting(f64::from(position.y)),
            follow,
            settle,
            mode: SpringMode::Follow,
            pending: None,
        };
        animator.apply_mode(SpringMode::Follow);
        animator
    }

    /// Limit positions to `bounds`.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.x
            .set_bounds(f64::from(bounds.left), f64::from(bounds.right));
        self.y
            .set_bounds(f64::from(bounds.top), f64::from(bounds.bottom));
    }

    /// Current animated position.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x.position() as f32, self.y.position() as f32)
    }

    /// Current spring target.
    #[must_use]
    pub fn target(&self) -> Point {
        Point::new(self.x.target() as f32, self.y.target() as f32)
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> SpringMode {
        self.mode
    }

    /// Whether either axis is still moving.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.x.is_running() || self.y.is_running()
    }

    /// Whether a settle is in flight.
    #[must_use]
    pub fn has_pending_settle(&self) -> bool {
        self.pending.is_some()
    }

    /// Stop both axes and place them at `position`.
    pub fn snap_to(&mut self, position: Point) {
        self.cancel();
        self.x.snap_to(f64::from(position.x));
        self.y.snap_to(f64::from(position.y));
    }

    /// Track `target` with the follow tuning.
    pub fn follow(&mut self, target: Point) {
        self.cancel_pending();
        if self.mode != SpringMode::Follow {
            self.apply_mode(SpringMode::Follow);
        }
        trace!(x = target.x, y = target.y, "follow");
        self.x.animate_to(f64::from(target.x));
        self.y.animate_to(f64::from(target.y));
    }

    /// Animate to `point` (the coordinates of `corner`) with the settle
    /// tuning. The returned handle completes when both axes come to rest.
    pub fn settle_to(&mut self, corner: Corner, point: Point) -> SettleHandle {
        self.cancel_pending();
        self.apply_mode(SpringMode::Settle);
        debug!(?corner, x = point.x, y = point.y, "settling to corner");
        self.x.animate_to(f64::from(point.x));
        self.y.animate_to(f64::from(point.y));

        let handle = SettleHandle::new();
        self.pending = Some(PendingSettle {
            settled: Settled { corner, point },
            handle: handle.clone(),
        });
        handle
    }

    /// Stop both axes where they are; any pending settle is cancelled.
    pub fn cancel(&mut self) {
        self.x.cancel();
        self.y.cancel();
        self.cancel_pending();
    }

    /// Advance both axes. Returns the settle result on the tick it completes.
    pub fn tick(&mut self, dt: Duration) -> Option<Settled> {
        self.x.advance(dt);
        self.y.advance(dt);

        if self.is_running() {
            return None;
        }
        let pending = self.pending.take()?;
        if pending.handle.complete(pending.settled) {
            debug!(corner = ?pending.settled.corner, "settle complete");
            Some(pending.settled)
        } else {
            None
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take()
            && pending.handle.cancel()
        {
            debug!(corner = ?pending.settled.corner, "settle cancelled");
        }
    }

    fn apply_mode(&mut self, mode: SpringMode) {
        let tunings = match mode {
            SpringMode::Follow => self.follow,
            SpringMode::Settle => self.settle,
        };
        self.x.set_tuning(tunings.x);
        self.y.set_tuning(tunings.y);
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn animator() -> SnapAnimator {
        SnapAnimator::new(
            Point::new(50.0, 50.0),
            AxisTunings::uniform(SpringTuning::FOLLOW),
            AxisTunings::uniform(SpringTuning::SETTLE),
        )
    }

    fn run_until_settled(a: &mut SnapAnimator, max_frames: usize) -> Vec<Settled> {
        let mut fired = Vec::new();
        for _ in 0..max_frames {
            if let Some(s) = a.tick(MS_16) {
                assert!(!a.is_running(), "completion while an axis is running");
                fired.push(s);
            }
        }
        fired
    }

    #[test]
    fn settle_fires_exactly_once() {
        let mut a = animator();
        let handle = a.settle_to(Corner::BottomRight, Point::new(300.0, 500.0));
        assert!(handle.is_pending());
        let fired = run_until_settled(&mut a, 1000);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].corner, Corner::BottomRight);
        assert_eq!(handle.result(), Some(fired[0]));
        assert_eq!(a.position(), Point::new(300.0, 500.0));
    }

    #[test]
    fn cancel_never_completes() {
        let mut a = animator();
        let handle = a.settle_to(Corner::TopLeft, Point::new(0.0, 0.0));
        a.tick(MS_16);
        a.cancel();
        assert!(handle.is_cancelled());
        assert!(run_until_settled(&mut a, 100).is_empty());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn follow_cancels_pending_settle() {
        let mut a = animator();
        let handle = a.settle_to(Corner::TopLeft, Point::new(0.0, 0.0));
        a.follow(Point::new(80.0, 80.0));
        assert!(handle.is_cancelled());
        assert_eq!(a.mode(), SpringMode::Follow);
        assert!(run_until_settled(&mut a, 100).is_empty());
        assert_eq!(a.position(), Point::new(80.0, 80.0));
    }

    #[test]
    fn new_settle_supersedes_old() {
        let mut a = animator();
        let first = a.settle_to(Corner::TopLeft, Point::new(0.0, 0.0));
        let second = a.settle_to(Corner::TopRight, Point::new(200.0, 0.0));
        assert!(first.is_cancelled());
        let fired = run_until_settled(&mut a, 1000);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].corner, Corner::TopRight);
        assert!(second.result().is_some());
    }

    #[test]
    fn settle_at_current_position_completes_next_tick() {
        let mut a = animator();
        let handle = a.settle_to(Corner::TopLeft, Point::new(50.0, 50.0));
        assert!(a.tick(MS_16).is_some());
        assert!(handle.result().is_some());
    }

    #[test]
    fn bounds_limit_follow() {
        let mut a = animator();
        a.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        a.follow(Point::new(500.0, -500.0));
        run_until_settled(&mut a, 100);
        assert_eq!(a.position(), Point::new(100.0, 0.0));
        assert!(!a.is_running());
    }

    #[test]
    fn snap_to_places_without_animation() {
        let mut a = animator();
        a.follow(Point::new(10.0, 10.0));
        a.snap_to(Point::new(70.0, 20.0));
        assert!(!a.is_running());
        assert_eq!(a.position(), Point::new(70.0, 20.0));
    }
}
