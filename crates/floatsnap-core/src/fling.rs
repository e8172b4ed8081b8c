#![forbid(unsafe_code)]

//! Fling classification: turns a release's velocity and displacement into
//! a target corner.
//!
//! The decision is a pure function of [`FlingInput`] and
//! [`FlingThresholds`]; it never touches springs or surfaces.
//!
//! # Policy
//!
//! 1. Velocities below `minimum_fling_velocity` are zeroed.
//! 2. An axis' velocity passes when `|v| > minimum_fling_velocity + threshold`.
//! 3. An axis' displacement passes when
//!    `100 * |d| / extent > distance_pass_percent`. Zero-extent axes fail.
//! 4. An axis resolves to the sign of its displacement when both pass.
//! 5. Two resolved axes pick their matching corner. One resolved axis picks
//!    the side given by which half of the bounding area the gesture started
//!    in on the other axis. No resolved axis yields no corner; the caller
//!    falls back to nearest-corner snapping.

use tracing::debug;

use crate::geometry::{Corner, Point, Rect};

/// Horizontal fling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    Left,
    Right,
    Unknown,
}

/// Vertical fling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
    Unknown,
}

/// Thresholds for fling classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingThresholds {
    /// Device minimum fling velocity (px/s).
    pub minimum_fling_velocity: f32,
    /// Extra horizontal velocity (px/s) required on top of the minimum.
    pub threshold_velocity_x: f32,
    /// Extra vertical velocity (px/s) required on top of the minimum.
    pub threshold_velocity_y: f32,
    /// Displacement needed, as a percentage of the area extent.
    pub distance_pass_percent: f32,
}

/// Measurements taken at release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingInput {
    /// Release velocity (px/s), already capped by the device maximum.
    pub velocity: Point,
    /// Element center when the gesture went down.
    pub start_center: Point,
    /// Element center at release.
    pub end_center: Point,
    /// Bounding area the element moves in.
    pub area: Rect,
}

impl FlingInput {
    /// Net center displacement over the gesture.
    #[inline]
    #[must_use]
    pub fn displacement(&self) -> Point {
        self.end_center.delta(self.start_center)
    }
}

/// Outcome of fling classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlingDecision {
    pub horizontal: HorizontalDirection,
    pub vertical: VerticalDirection,
    /// Target corner, or `None` when neither axis resolved.
    pub corner: Option<Corner>,
}

impl FlingDecision {
    /// Whether at least one axis resolved to a direction.
    #[inline]
    #[must_use]
    pub fn is_fling(&self) -> bool {
        self.corner.is_some()
    }
}

fn velocity_passes(v: f32, minimum: f32, threshold: f32) -> bool {
    let v = if v.abs() < minimum { 0.0 } else { v };
    v.abs() > minimum + threshold
}

fn distance_passes(d: f32, extent: f32, percent: f32) -> bool {
    if extent <= 0.0 {
        return false;
    }
    100.0 * d.abs() / extent > percent
}

/// Classify a release.
#[must_use]
pub fn resolve_fling(input: &FlingInput, thresholds: &FlingThresholds) -> FlingDecision {
    let d = input.displacement();
    let area = &input.area;

    let vx_pass = velocity_passes(
        input.velocity.x,
        thresholds.minimum_fling_velocity,
        thresholds.threshold_velocity_x,
    );
    let vy_pass = velocity_passes(
        input.velocity.y,
        thresholds.minimum_fling_velocity,
        thresholds.threshold_velocity_y,
    );
    let dx_pass = distance_passes(d.x, area.width(), thresholds.distance_pass_percent);
    let dy_pass = distance_passes(d.y, area.height(), thresholds.distance_pass_percent);

    let horizontal = match (vx_pass && dx_pass, d.x) {
        (true, dx) if dx > 0.0 => HorizontalDirection::Right,
        (true, dx) if dx < 0.0 => HorizontalDirection::Left,
        _ => HorizontalDirection::Unknown,
    };
    let vertical = match (vy_pass && dy_pass, d.y) {
        (true, dy) if dy > 0.0 => VerticalDirection::Down,
        (true, dy) if dy < 0.0 => VerticalDirection::Up,
        _ => VerticalDirection::Unknown,
    };

    let started_top = input.start_center.y < area.top + area.height() / 2.0;
    let started_left = input.start_center.x < area.left + area.width() / 2.0;

    let corner = match (horizontal, vertical) {
        (HorizontalDirection::Unknown, VerticalDirection::Unknown) => None,
        (HorizontalDirection::Unknown, v) => {
            Some(Corner::from_sides(started_left, v == VerticalDirection::Up))
        }
        (h, VerticalDirection::Unknown) => {
            Some(Corner::from_sides(h == HorizontalDirection::Left, started_top))
        }
        (h, v) => Some(Corner::from_sides(
            h == HorizontalDirection::Left,
            v == VerticalDirection::Up,
        )),
    };

    debug!(
        vx = input.velocity.x,
        vy = input.velocity.y,
        dx = d.x,
        dy = d.y,
        ?horizontal,
        ?vertical,
        ?corner,
        "fling resolved"
    );

    FlingDecision {
        horizontal,
        vertical,
        corner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose() -> FlingThresholds {
        FlingThresholds {
            minimum_fling_velocity: 0.0,
            threshold_velocity_x: 0.0,
            threshold_velocity_y: 0.0,
            distance_pass_percent: 1.0,
        }
    }

    fn input(velocity: Point, start: Point, displacement: Point) -> FlingInput {
        FlingInput {
            velocity,
            start_center: start,
            end_center: start.offset(displacement.x, displacement.y),
            area: Rect::new(0.0, 0.0, 100.0, 100.0),
        }
    }

    #[test]
    fn horizontal_right_started_top_goes_top_right() {
        let d = resolve_fling(
            &input(Point::new(500.0, 0.0), Point::new(20.0, 20.0), Point::new(60.0, 0.0)),
            &loose(),
        );
        assert_eq!(d.horizontal, HorizontalDirection::Right);
        assert_eq!(d.vertical, VerticalDirection::Unknown);
        assert_eq!(d.corner, Some(Corner::TopRight));
    }

    #[test]
    fn horizontal_right_started_bottom_goes_bottom_right() {
        let d = resolve_fling(
            &input(Point::new(500.0, 0.0), Point::new(20.0, 80.0), Point::new(60.0, 0.0)),
            &loose(),
        );
        assert_eq!(d.corner, Some(Corner::BottomRight));
    }

    #[test]
    fn vertical_only_uses_start_column() {
        let d = resolve_fling(
            &input(Point::new(0.0, -800.0), Point::new(80.0, 80.0), Point::new(0.0, -40.0)),
            &loose(),
        );
        assert_eq!(d.vertical, VerticalDirection::Up);
        assert_eq!(d.corner, Some(Corner::TopRight));
    }

    #[test]
    fn diagonal_picks_matching_corner() {
        let d = resolve_fling(
            &input(Point::new(-900.0, 900.0), Point::new(80.0, 20.0), Point::new(-30.0, 30.0)),
            &loose(),
        );
        assert_eq!(d.corner, Some(Corner::BottomLeft));
    }

    #[test]
    fn velocity_without_distance_is_not_a_fling() {
        let d = resolve_fling(
            &input(Point::new(900.0, 900.0), Point::new(50.0, 50.0), Point::new(0.5, 0.5)),
            &loose(),
        );
        assert!(!d.is_fling());
    }

    #[test]
    fn distance_without_velocity_is_not_a_fling() {
        let d = resolve_fling(
            &input(Point::new(0.0, 0.0), Point::new(50.0, 50.0), Point::new(40.0, 40.0)),
            &loose(),
        );
        assert!(!d.is_fling());
    }

    #[test]
    fn velocity_must_exceed_minimum_plus_threshold() {
        let thresholds = FlingThresholds {
            minimum_fling_velocity: 100.0,
            threshold_velocity_x: 400.0,
            threshold_velocity_y: 430.0,
            distance_pass_percent: 1.0,
        };
        let start = Point::new(20.0, 20.0);
        let shift = Point::new(60.0, 0.0);
        let at_limit = resolve_fling(&input(Point::new(500.0, 0.0), start, shift), &thresholds);
        assert!(!at_limit.is_fling());
        let above = resolve_fling(&input(Point::new(501.0, 0.0), start, shift), &thresholds);
        assert_eq!(above.corner, Some(Corner::TopRight));
    }

    #[test]
    fn zero_extent_area_never_passes_distance() {
        let mut inp = input(Point::new(900.0, 900.0), Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        inp.area = Rect::new(0.0, 0.0, 0.0, 0.0);
        let d = resolve_fling(&inp, &loose());
        assert_eq!(d.horizontal, HorizontalDirection::Unknown);
        assert_eq!(d.vertical, VerticalDirection::Unknown);
        assert!(d.corner.is_none());
    }

    #[test]
    fn start_half_respects_area_offset() {
        let mut inp = input(
            Point::new(500.0, 0.0),
            Point::new(220.0, 260.0),
            Point::new(60.0, 0.0),
        );
        inp.area = Rect::new(200.0, 200.0, 300.0, 300.0);
        let d = resolve_fling(&inp, &loose());
        assert_eq!(d.corner, Some(Corner::BottomRight));
    }
}
