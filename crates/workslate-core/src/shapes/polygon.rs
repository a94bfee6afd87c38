//! Regular polygon shape.

use super::{MIN_SHAPE_SIZE, ObjectAttrs, SerializableColor, ShapeTrait};
use crate::geometry::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// A regular polygon inscribed in a circle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    pub radius: f64,
    pub sides: u32,
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

impl Polygon {
    pub const MIN_SIDES: u32 = 3;
    pub const MAX_SIDES: u32 = 12;

    pub fn new(x: f64, y: f64, radius: f64, sides: u32) -> Self {
        Self {
            x,
            y,
            radius,
            sides: sides.max(Self::MIN_SIDES),
            color: SerializableColor::black(),
            width: default_width(),
            filled: false,
            attrs: ObjectAttrs::default(),
        }
    }

    /// Vertices in the unrotated frame, the first pointing straight up.
    pub fn vertices(&self) -> Vec<Point> {
        let sides = self.sides.max(Self::MIN_SIDES);
        let step = TAU / sides as f64;
        (0..sides)
            .map(|i| {
                let angle = i as f64 * step - FRAC_PI_2;
                Point::new(
                    self.x + self.radius * angle.cos(),
                    self.y + self.radius * angle.sin(),
                )
            })
            .collect()
    }
}

impl ShapeTrait for Polygon {
    fn bounds(&self) -> Bounds {
        Bounds::new(
            self.x - self.radius,
            self.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
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
        self.radius >= MIN_SHAPE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices() {
        let poly = Polygon::new(0.0, 0.0, 10.0, 4);
        let v = poly.vertices();
        assert_eq!(v.len(), 4);
        assert!(v[0].x.abs() < 1e-9);
        assert!((v[0].y + 10.0).abs() < 1e-9);
        assert!((v[1].x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_sides_floor() {
        assert_eq!(Polygon::new(0.0, 0.0, 10.0, 1).sides, 3);
    }
}
