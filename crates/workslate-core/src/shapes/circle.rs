//! Circle shape.

use super::{MIN_SHAPE_SIZE, ObjectAttrs, SerializableColor, ShapeTrait};
use crate::geometry::Bounds;
use serde::{Deserialize, Serialize};

/// A circle given by its center and radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    pub radius: f64,
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

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            radius,
            color: SerializableColor::black(),
            width: default_width(),
            filled: false,
            attrs: ObjectAttrs::default(),
        }
    }
}

impl ShapeTrait for Circle {
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
