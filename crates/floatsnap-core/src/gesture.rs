#![forbid(unsafe_code)]

//! Touch-state tracking: turns a raw touch stream into a two-state machine.
//!
//! [`TouchTracker`] decides whether the pointer is still resting near where
//! it went down or has started a drag, using the device's touch slop.
//!
//! # State Machine
//!
//! ```text
//!            Down                 |dx| >= slop or |dy| >= slop
//!   (none) ───────▶ Resting ────────────────────────────────▶ Dragging
//!      ▲               │                                         │
//!      └───────────────┴──────────── Up / Cancel ────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. Within one session the state is monotonic: `Resting → Dragging`,
//!    never back.
//! 2. A session exists iff a pointer is down (`has_session()`).
//! 3. A session whose displacement never reaches the slop stays `Resting`.
//!
//! # Failure Modes
//!
//! - A `Move` without a preceding `Down` starts a session at the move's
//!   position (implicit down) instead of failing.

use tracing::{debug, warn};

use crate::geometry::Point;

/// Drag state of the current gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchState {
    /// Pointer is down but has not moved beyond the slop.
    #[default]
    Resting,
    /// Pointer has moved beyond the slop at least once this session.
    Dragging,
}

/// Result of feeding a move into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveUpdate {
    /// The move started a session because no `Down` was seen.
    pub implicit_down: bool,
    /// This move caused the `Resting → Dragging` transition.
    pub started_drag: bool,
}

/// Two-state touch tracker with a slop threshold.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    slop: f32,
    /// Anchor of the current session; `None` between sessions.
    anchor: Option<Point>,
    state: TouchState,
}

impl TouchTracker {
    /// Create a tracker with the given slop (px). Negative values clamp to 0.
    #[must_use]
    pub fn new(slop: f32) -> Self {
        Self {
            slop: slop.max(0.0),
            anchor: None,
            state: TouchState::Resting,
        }
    }

    /// The slop threshold in use.
    #[inline]
    #[must_use]
    pub fn slop(&self) -> f32 {
        self.slop
    }

    /// Replace the slop threshold. Takes effect on the next move.
    pub fn set_slop(&mut self, slop: f32) {
        self.slop = slop.max(0.0);
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> TouchState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == TouchState::Dragging
    }

    /// Whether a pointer is currently down.
    #[inline]
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.anchor.is_some()
    }

    /// Where the current session went down.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Start a session at `pos`.
    pub fn begin(&mut self, pos: Point) {
        self.anchor = Some(pos);
        self.state = TouchState::Resting;
        debug!(x = pos.x, y = pos.y, "touch down, state = resting");
    }

    /// Feed a move at `pos`.
    pub fn update(&mut self, pos: Point) -> MoveUpdate {
        let implicit_down = if self.anchor.is_none() {
            warn!(x = pos.x, y = pos.y, "move without down, treating as implicit down");
            self.begin(pos);
            true
        } else {
            false
        };

        let mut started_drag = false;
        if !implicit_down
            && self.state != TouchState::Dragging
            && let Some(anchor) = self.anchor
            && ((pos.x - anchor.x).abs() >= self.slop || (pos.y - anchor.y).abs() >= self.slop)
        {
            self.state = TouchState::Dragging;
            started_drag = true;
            debug!(x = pos.x, y = pos.y, "slop exceeded, state = dragging");
        }

        MoveUpdate {
            implicit_down,
            started_drag,
        }
    }

    /// End the session. Returns the state the session ended in.
    pub fn finish(&mut self) -> TouchState {
        let ended = self.state;
        self.anchor = None;
        self.state = TouchState::Resting;
        ended
    }
}
