//! Rectangle shape.

use super::{MIN_SHAPE_SIZE, ObjectAttrs, SerializableColor, ShapeTrait};
use crate::geometry::Bounds;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle. Width and height may be negative while the
/// shape is being rubber-banded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub filled: bool,
    #[serde(flatten)]
    pub attrs: ObjectAttrs,
}

fn default_width() -> f64 {
    3.0
}

impl Rectangle {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            color: SerializableColor::black(),
            width: default_width(),
            filled: false,
            attrs: ObjectAttrs::default(),
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let r = Rect::from_points(p1, p2);
        Self::new(r.x0, r.y0, r.width(), r.height())
    }

    /// Make width and height non-negative, keeping the covered area.
    pub fn normalize(&mut self) {
        let b = Bounds::new(self.x, self.y, self.w, self.h).normalized();
        self.x = b.x;
        self.y = b.y;
        self.w = b.w;
        self.h = b.h;
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }
}

impl ShapeTrait for Rectangle {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.w, self.h)
    }

    fn offset(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }

    fn is_valid(&self) -> bool {
        self.w.abs() >= MIN_SHAPE_SIZE && self.h.abs() >= MIN_SHAPE_SIZE
    }

    fn hit_test(&self, point: Point) -> bool {
        crate::geometry::hit_test_rotated(point, &self.bounds().normalized(), self.attrs.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_from_corners() {
        let rect = Rectangle::from_corners(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        assert!((rect.x - 50.0).abs() < f64::EPSILON);
        assert!((rect.y - 50.0).abs() < f64::EPSILON);
        assert!((rect.w - 50.0).abs() < f64::EPSILON);
        assert!((rect.h - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_size() {
        assert!(!Rectangle::new(0.0, 0.0, 3.0, 3.0).is_valid());
        assert!(Rectangle::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(Rectangle::new(0.0, 0.0, -10.0, -10.0).is_valid());
        assert!(!Rectangle::new(0.0, 0.0, 10.0, 4.0).is_valid());
    }

    #[test]
    fn test_normalize() {
        let mut rect = Rectangle::new(100.0, 100.0, -30.0, -20.0);
        rect.normalize();
        assert!((rect.x - 70.0).abs() < f64::EPSILON);
        assert!((rect.y - 80.0).abs() < f64::EPSILON);
        assert!((rect.w - 30.0).abs() < f64::EPSILON);
        assert!((rect.h - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        assert!(rect.hit_test(Point::new(50.0, 50.0)));
        assert!(!rect.hit_test(Point::new(150.0, 50.0)));
        let flipped = Rectangle::new(100.0, 100.0, -100.0, -100.0);
        assert!(flipped.hit_test(Point::new(50.0, 50.0)));
    }
}
