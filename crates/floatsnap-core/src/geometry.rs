#![forbid(unsafe_code)]

//! Geometric primitives for floating-element placement.
//!
//! Coordinates are screen pixels (f32, origin at top-left, y grows down).
//! [`Rect`] uses edge coordinates (`left`, `top`, `right`, `bottom`) because
//! the corner targets are edge points, not cells.
//!
//! # Invariants
//!
//! 1. `width()` and `height()` are never negative; an inverted rect reports 0.
//! 2. `movement_area(size)` is always contained in the source rect.
//! 3. `nearest_corner` breaks ties in [`Corner::ALL`] order.

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component-wise difference `self - other`.
    #[inline]
    #[must_use]
    pub fn delta(&self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Element dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Center of an element whose top-left is at `position`.
#[inline]
#[must_use]
pub fn center_of(position: Point, size: Size) -> Point {
    Rect::from_origin_size(position, size).center()
}

/// One of the four corners of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners in enumeration order (also the tie-break order).
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Whether this corner lies on the left edge.
    #[inline]
    #[must_use]
    pub const fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    /// Whether this corner lies on the top edge.
    #[inline]
    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Build a corner from its edge flags.
    #[inline]
    #[must_use]
    pub const fn from_sides(left: bool, top: bool) -> Corner {
        match (left, top) {
            (true, true) => Corner::TopLeft,
            (false, true) => Corner::TopRight,
            (true, false) => Corner::BottomLeft,
            (false, false) => Corner::BottomRight,
        }
    }
}

/// An axis-aligned rectangle described by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Create a new rectangle from edges.
    #[inline]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size.
    #[inline]
    #[must_use]
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + size.width,
            origin.y + size.height,
        )
    }

    /// Horizontal extent, saturating at zero.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    /// Vertical extent, saturating at zero.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    /// Whether either extent is zero.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
        )
    }

    /// Whether `p` lies inside or on the edge of the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// The area of valid top-left positions for an element of `size`.
    ///
    /// Right and bottom edges move in by the element size. If the element
    /// is larger than the area the edges collapse onto left/top, so the
    /// result is never inverted and always contained in `self`.
    #[must_use]
    pub fn movement_area(&self, size: Size) -> Rect {
        let right = (self.right - size.width).max(self.left);
        let bottom = (self.bottom - size.height).max(self.top);
        Rect::new(self.left, self.top, right, bottom)
    }

    /// Grow by `dx` horizontally and `dy` vertically on each side.
    #[must_use]
    pub fn expand(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.left - dx,
            self.top - dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Clamp `p` into the rectangle.
    #[must_use]
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.max(self.left).min(self.right),
            p.y.max(self.top).min(self.bottom),
        )
    }

    /// Coordinates of `corner`.
    #[inline]
    #[must_use]
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.left, self.top),
            Corner::TopRight => Point::new(self.right, self.top),
            Corner::BottomLeft => Point::new(self.left, self.bottom),
            Corner::BottomRight => Point::new(self.right, self.bottom),
        }
    }

    /// Distance from `p` to every corner, in [`Corner::ALL`] order.
    #[must_use]
    pub fn corner_distances(&self, p: Point) -> [(Corner, f32); 4] {
        Corner::ALL.map(|corner| (corner, p.distance(self.corner(corner))))
    }

    /// The corner closest to `p`. Equal distances resolve to the earlier
    /// corner in enumeration order.
    #[must_use]
    pub fn nearest_corner(&self, p: Point) -> Corner {
        let distances = self.corner_distances(p);
        let mut best = distances[0];
        for candidate in &distances[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        best.0
    }

    /// Whether `p` is within `tolerance` of any corner.
    #[must_use]
    pub fn is_near_corner(&self, p: Point, tolerance: f32) -> bool {
        self.corner_distances(p)
            .iter()
            .any(|(_, distance)| *distance <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn element_center_comes_from_origin_and_size() {
        let r = Rect::from_origin_size(Point::new(10.0, 20.0), Size::new(50.0, 30.0));
        assert_eq!(r, Rect::new(10.0, 20.0, 60.0, 50.0));
        assert_eq!(r.center(), Point::new(35.0, 35.0));
        assert_eq!(center_of(Point::new(10.0, 20.0), Size::new(50.0, 30.0)), r.center());
    }

    #[test]
    fn nearest_corner_picks_each_quadrant() {
        let r = area();
        assert_eq!(r.nearest_corner(Point::new(10.0, 10.0)), Corner::TopLeft);
        assert_eq!(r.nearest_corner(Point::new(90.0, 10.0)), Corner::TopRight);
        assert_eq!(r.nearest_corner(Point::new(10.0, 90.0)), Corner::BottomLeft);
        assert_eq!(r.nearest_corner(Point::new(90.0, 90.0)), Corner::BottomRight);
    }

    #[test]
    fn nearest_corner_ties_use_enumeration_order() {
        let r = area();
        // Dead center is equidistant from all four corners.
        assert_eq!(r.nearest_corner(Point::new(50.0, 50.0)), Corner::TopLeft);
        // Equidistant from the two bottom corners.
        assert_eq!(r.nearest_corner(Point::new(50.0, 95.0)), Corner::BottomLeft);
        // Equidistant from the two right corners.
        assert_eq!(r.nearest_corner(Point::new(95.0, 50.0)), Corner::TopRight);
    }

    #[test]
    fn movement_area_insets_right_and_bottom() {
        let m = area().movement_area(Size::new(20.0, 30.0));
        assert_eq!(m, Rect::new(0.0, 0.0, 80.0, 70.0));
        assert!(area().contains_rect(&m));
    }

    #[test]
    fn movement_area_never_inverts() {
        let m = area().movement_area(Size::new(150.0, 150.0));
        assert_eq!(m, Rect::new(0.0, 0.0, 0.0, 0.0));
        assert!(area().contains_rect(&m));
    }

    #[test]
    fn inverted_rect_has_zero_extent() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert_eq!(r.width(), 0.0);
        assert_eq!(r.height(), 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn near_corner_tolerance_is_inclusive() {
        let r = area();
        assert!(r.is_near_corner(Point::new(3.0, 4.0), 5.0));
        assert!(!r.is_near_corner(Point::new(4.0, 4.0), 5.0));
        assert!(r.is_near_corner(Point::new(100.0, 100.0), 5.0));
    }

    #[test]
    fn clamp_and_expand() {
        let r = area();
        assert_eq!(r.clamp(Point::new(-5.0, 120.0)), Point::new(0.0, 100.0));
        assert_eq!(r.expand(10.0, 20.0), Rect::new(-10.0, -20.0, 110.0, 120.0));
    }

    #[test]
    fn center_of_element() {
        let c = center_of(Point::new(10.0, 20.0), Size::new(40.0, 60.0));
        assert_eq!(c, Point::new(30.0, 50.0));
    }

    #[test]
    fn corner_from_sides_round_trips() {
        for corner in Corner::ALL {
            assert_eq!(Corner::from_sides(corner.is_left(), corner.is_top()), corner);
        }
    }
}
