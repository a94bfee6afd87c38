//! Axis-aligned bounds and rotated-frame helpers.
//!
//! Every drawable reports its bounds in its own unrotated frame. Rotation is
//! applied about the bounds center, so hit-testing maps the query point back
//! into that frame before a plain point-in-rect check.

use kurbo::{Point, Rect, Vec2};

/// Axis-aligned box in an object's unrotated local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Tight box around a set of points, or `None` when the set is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub fn cx(&self) -> f64 {
        self.x + self.w / 2.0
    }

    pub fn cy(&self) -> f64 {
        self.y + self.h / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx(), self.cy())
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Same box with non-negative width and height.
    pub fn normalized(&self) -> Self {
        Self::from_rect(self.to_rect().abs())
    }

    /// Inclusive point containment.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Self::from_rect(self.to_rect().union(other.to_rect()))
    }

    /// Strict overlap test; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn inflate(&self, dx: f64, dy: f64) -> Bounds {
        Self::new(self.x - dx, self.y - dy, self.w + 2.0 * dx, self.h + 2.0 * dy)
    }

    pub fn translate(&self, offset: Vec2) -> Bounds {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Axis-aligned box enclosing this box after rotating it about its center.
    pub fn rotated_aabb(&self, rotation: f64) -> Bounds {
        if rotation == 0.0 {
            return *self;
        }
        let center = self.center();
        let corners = [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
        .map(|c| rotate_about(c, center, rotation));
        Self::from_points(corners.iter()).unwrap_or(*self)
    }
}

/// Union of a sequence of boxes, `None` when the sequence is empty.
pub fn union_bounds(bounds: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
    bounds.into_iter().reduce(|acc, b| acc.union(&b))
}

/// Rotate `point` about `center` by `angle` radians.
pub fn rotate_about(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Express `point` in a frame whose origin is `origin` and whose x axis is
/// rotated by `rotation`.
pub fn to_local_frame(point: Point, origin: Point, rotation: f64) -> Point {
    let (sin, cos) = (-rotation).sin_cos();
    let d = point - origin;
    Point::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Inverse of [`to_local_frame`].
pub fn from_local_frame(local: Point, origin: Point, rotation: f64) -> Point {
    let (sin, cos) = rotation.sin_cos();
    Point::new(
        origin.x + local.x * cos - local.y * sin,
        origin.y + local.x * sin + local.y * cos,
    )
}

/// Point-in-bounds test after undoing `rotation` about the bounds center.
pub fn hit_test_rotated(point: Point, bounds: &Bounds, rotation: f64) -> bool {
    let center = bounds.center();
    let local = to_local_frame(point, center, rotation);
    bounds.contains(center + local.to_vec2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_from_points() {
        let pts = [Point::new(10.0, 5.0), Point::new(-2.0, 8.0), Point::new(4.0, 20.0)];
        let b = Bounds::from_points(pts.iter()).unwrap();
        assert!((b.x + 2.0).abs() < EPS);
        assert!((b.y - 5.0).abs() < EPS);
        assert!((b.w - 12.0).abs() < EPS);
        assert!((b.h - 15.0).abs() < EPS);
        assert!(Bounds::from_points([].iter()).is_none());
    }

    #[test]
    fn test_normalized() {
        let b = Bounds::new(100.0, 100.0, -40.0, -20.0).normalized();
        assert!((b.x - 60.0).abs() < EPS);
        assert!((b.y - 80.0).abs() < EPS);
        assert!((b.w - 40.0).abs() < EPS);
        assert!((b.h - 20.0).abs() < EPS);
    }

    #[test]
    fn test_intersects_is_strict() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Bounds::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Bounds::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Bounds::new(20.0, 20.0, 1.0, 1.0)));
    }

    #[test]
    fn test_local_frame_round_trip() {
        let origin = Point::new(50.0, 50.0);
        let p = Point::new(80.0, 20.0);
        let local = to_local_frame(p, origin, 0.7);
        let back = from_local_frame(local, origin, 0.7);
        assert!((back.x - p.x).abs() < EPS);
        assert!((back.y - p.y).abs() < EPS);
    }

    #[test]
    fn test_to_local_frame_quarter_turn() {
        let local = to_local_frame(Point::new(0.0, 10.0), Point::ZERO, FRAC_PI_2);
        assert!((local.x - 10.0).abs() < EPS);
        assert!(local.y.abs() < EPS);
    }

    #[test]
    fn test_hit_test_rotated() {
        // A long thin bar rotated a quarter turn stands upright.
        let bar = Bounds::new(0.0, 45.0, 100.0, 10.0);
        assert!(hit_test_rotated(Point::new(90.0, 50.0), &bar, 0.0));
        assert!(!hit_test_rotated(Point::new(90.0, 50.0), &bar, FRAC_PI_2));
        assert!(hit_test_rotated(Point::new(50.0, 90.0), &bar, FRAC_PI_2));
    }

    #[test]
    fn test_rotated_aabb() {
        let b = Bounds::new(0.0, 0.0, 20.0, 10.0).rotated_aabb(PI / 2.0);
        assert!((b.w - 10.0).abs() < 1e-6);
        assert!((b.h - 20.0).abs() < 1e-6);
        assert!((b.cx() - 10.0).abs() < 1e-6);
        assert!((b.cy() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_bounds() {
        let u = union_bounds([Bounds::new(0.0, 0.0, 10.0, 10.0), Bounds::new(20.0, -5.0, 5.0, 5.0)]).unwrap();
        assert!((u.x).abs() < EPS);
        assert!((u.y + 5.0).abs() < EPS);
        assert!((u.right() - 25.0).abs() < EPS);
        assert!((u.bottom() - 10.0).abs() < EPS);
        assert!(union_bounds(std::iter::empty()).is_none());
    }
}
