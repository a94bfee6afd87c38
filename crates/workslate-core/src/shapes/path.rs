//! Freehand stroke.

use super::{ObjectAttrs, SerializableColor, ShapeTrait};
use crate::geometry::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pen variant used to capture a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenType {
    #[default]
    Pen,
    /// Wide translucent stroke.
    Highlighter,
}

impl PenType {
    pub const HIGHLIGHTER_WIDTH: f64 = 20.0;
    pub const HIGHLIGHTER_OPACITY: f64 = 0.3;
}

/// A freehand drawing (series of points).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freehand {
    /// Points in capture order.
    pub points: Vec<Point>,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub pen_type: PenType,
    /// Strokes drawn with the eraser pen paint in the background color.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_eraser: bool,
    #[serde(flatten)]
    pub attrs: ObjectAttrs,
}

fn default_width() -> f64 {
    Freehand::DEFAULT_WIDTH
}

impl Freehand {
    pub const DEFAULT_WIDTH: f64 = 3.0;
    /// Extra padding around the stroke's points when computing bounds.
    pub const BOUNDS_PADDING: f64 = 5.0;

    /// Create from existing points.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            color: SerializableColor::black(),
            width: Self::DEFAULT_WIDTH,
            pen_type: PenType::Pen,
            is_eraser: false,
            attrs: ObjectAttrs::default(),
        }
    }

    pub fn with_style(mut self, color: SerializableColor, width: f64, pen_type: PenType) -> Self {
        self.color = color;
        self.width = width;
        self.pen_type = pen_type;
        self
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Turn a single tap into a zero-length two-point segment.
    pub fn expand_single_point(&mut self) {
        if let [only] = self.points.as_slice() {
            let p = *only;
            self.points.push(p);
        }
    }

    /// Width actually painted, accounting for the highlighter.
    pub fn effective_width(&self) -> f64 {
        match self.pen_type {
            PenType::Highlighter => PenType::HIGHLIGHTER_WIDTH,
            PenType::Pen => self.width,
        }
    }

    /// Copy of this stroke's styling carrying a new run of points.
    pub fn fragment(&self, points: Vec<Point>) -> Self {
        Self {
            points,
            is_eraser: false,
            ..self.clone()
        }
    }
}

impl ShapeTrait for Freehand {
    fn bounds(&self) -> Bounds {
        let Some(tight) = Bounds::from_points(&self.points) else {
            return Bounds::default();
        };
        let width = if self.width > 0.0 { self.width } else { Self::DEFAULT_WIDTH };
        let pad = width / 2.0 + Self::BOUNDS_PADDING;
        tight.inflate(pad, pad)
    }

    fn offset(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }

    fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_padding() {
        let mut path = Freehand::new(vec![Point::new(10.0, 10.0), Point::new(30.0, 20.0)]);
        path.width = 4.0;
        let b = path.bounds();
        assert!((b.x - 3.0).abs() < f64::EPSILON);
        assert!((b.y - 3.0).abs() < f64::EPSILON);
        assert!((b.w - 34.0).abs() < f64::EPSILON);
        assert!((b.h - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_width_pads_as_default() {
        let mut path = Freehand::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        path.width = 0.0;
        let b = path.bounds();
        assert!((b.x + 6.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_point_expansion() {
        let mut path = Freehand::new(vec![Point::new(5.0, 5.0)]);
        assert!(!path.is_valid());
        path.expand_single_point();
        assert_eq!(path.len(), 2);
        assert_eq!(path.points[0], path.points[1]);
        assert!(path.is_valid());
    }

    #[test]
    fn test_fragment_drops_eraser_flag() {
        let mut path = Freehand::new(vec![Point::ZERO, Point::new(10.0, 0.0)]);
        path.is_eraser = true;
        path.width = 7.0;
        let frag = path.fragment(vec![Point::new(1.0, 1.0), Point::new(9.0, 1.0)]);
        assert!(!frag.is_eraser);
        assert!((frag.width - 7.0).abs() < f64::EPSILON);
        assert_eq!(frag.points.len(), 2);
    }

    #[test]
    fn test_highlighter_width() {
        let path = Freehand::new(vec![]).with_style(SerializableColor::black(), 3.0, PenType::Highlighter);
        assert!((path.effective_width() - 20.0).abs() < f64::EPSILON);
    }
}
