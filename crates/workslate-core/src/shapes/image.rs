//! Raster image shape.

use super::{ObjectAttrs, ShapeTrait};
use crate::geometry::Bounds;
use serde::{Deserialize, Serialize};

/// A raster image placed on a slide. `src` holds a data URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub src: String,
    #[serde(flatten)]
    pub attrs: ObjectAttrs,
}

impl Image {
    pub fn new(x: f64, y: f64, w: f64, h: f64, src: String) -> Self {
        Self {
            x,
            y,
            w,
            h,
            src,
            attrs: ObjectAttrs::default(),
        }
    }
}

impl ShapeTrait for Image {
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
        self.w > 0.0 && self.h > 0.0
    }
}
