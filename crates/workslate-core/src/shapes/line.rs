//! Straight line segment.

use super::{MIN_SHAPE_SIZE, ObjectAttrs, SerializableColor, ShapeTrait};
use crate::geometry::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Dash style of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dotted,
}

impl LineType {
    /// Dash pattern used when stroking, empty for solid lines.
    pub fn dashes(&self) -> &'static [f64] {
        match self {
            LineType::Solid => &[],
            LineType::Dotted => &[5.0, 10.0],
        }
    }
}

/// A line between two endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub line_type: LineType,
    #[serde(flatten)]
    pub attrs: ObjectAttrs,
}

fn default_width() -> f64 {
    3.0
}

impl Line {
    /// Padding applied around the endpoints' box.
    pub const BOUNDS_PADDING: f64 = 5.0;

    pub fn new(start: Point, end: Point) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            color: SerializableColor::black(),
            width: default_width(),
            line_type: LineType::Solid,
            attrs: ObjectAttrs::default(),
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn set_start(&mut self, p: Point) {
        self.x1 = p.x;
        self.y1 = p.y;
    }

    pub fn set_end(&mut self, p: Point) {
        self.x2 = p.x;
        self.y2 = p.y;
    }

    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

impl ShapeTrait for Line {
    fn bounds(&self) -> Bounds {
        let x = self.x1.min(self.x2);
        let y = self.y1.min(self.y2);
        let pad = Self::BOUNDS_PADDING;
        Bounds::new(
            x - pad,
            y - pad,
            (self.x1 - self.x2).abs() + 2.0 * pad,
            (self.y1 - self.y2).abs() + 2.0 * pad,
        )
    }

    fn offset(&mut self, dx: f64, dy: f64) {
        self.x1 += dx;
        self.x2 += dx;
        self.y1 += dy;
        self.y2 += dy;
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }

    fn is_valid(&self) -> bool {
        self.length() >= MIN_SHAPE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let line = Line::new(Point::new(50.0, 10.0), Point::new(10.0, 30.0));
        let b = line.bounds();
        assert!((b.x - 5.0).abs() < f64::EPSILON);
        assert!((b.y - 5.0).abs() < f64::EPSILON);
        assert!((b.w - 50.0).abs() < f64::EPSILON);
        assert!((b.h - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_offset_moves_both_endpoints() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        line.offset(5.0, -5.0);
        assert_eq!(line.start(), Point::new(5.0, -5.0));
        assert_eq!(line.end(), Point::new(15.0, 5.0));
    }

    #[test]
    fn test_min_length() {
        assert!(!Line::new(Point::ZERO, Point::new(3.0, 3.0)).is_valid());
        assert!(Line::new(Point::ZERO, Point::new(3.0, 4.0)).is_valid());
    }

    #[test]
    fn test_dotted_dashes() {
        assert_eq!(LineType::Dotted.dashes(), &[5.0, 10.0]);
        assert!(LineType::Solid.dashes().is_empty());
    }
}
