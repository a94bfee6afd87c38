//! Text shape.

use super::{ObjectAttrs, SerializableColor, ShapeTrait};
use crate::geometry::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn toggled(self) -> Self {
        match self {
            FontWeight::Normal => FontWeight::Bold,
            FontWeight::Bold => FontWeight::Normal,
        }
    }
}

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn toggled(self) -> Self {
        match self {
            FontStyle::Normal => FontStyle::Italic,
            FontStyle::Italic => FontStyle::Normal,
        }
    }
}

/// Multi-line text anchored at its top-left corner.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(flatten)]
    pub attrs: ObjectAttrs,
    /// Layout width measured by the renderer.
    #[serde(skip)]
    cached_width: RwLock<Option<f64>>,
}

fn default_font_size() -> f64 {
    Text::DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    Text::DEFAULT_FONT_FAMILY.to_string()
}

impl Clone for Text {
    fn clone(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            text: self.text.clone(),
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            font_weight: self.font_weight,
            font_style: self.font_style,
            color: self.color,
            attrs: self.attrs.clone(),
            cached_width: RwLock::new(self.cached_width()),
        }
    }
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 36.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Lexend";
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.2;
    /// Smallest font size reachable by resizing.
    pub const MIN_FONT_SIZE: f64 = 5.0;
    /// Average glyph advance relative to font size, used before the renderer
    /// has measured the text.
    const APPROX_ADVANCE: f64 = 0.6;

    pub fn new(position: Point, text: String, font_size: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            text,
            font_size,
            font_family: default_font_family(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            color: SerializableColor::black(),
            attrs: ObjectAttrs::default(),
            cached_width: RwLock::new(None),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.lines().count().max(1)
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.invalidate_cache();
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size.max(Self::MIN_FONT_SIZE);
        self.invalidate_cache();
    }

    pub fn set_font_family(&mut self, family: String) {
        self.font_family = family;
        self.invalidate_cache();
    }

    /// Store the width measured by the renderer.
    pub fn set_cached_width(&self, width: f64) {
        if let Ok(mut cache) = self.cached_width.write() {
            *cache = Some(width);
        }
    }

    pub fn cached_width(&self) -> Option<f64> {
        self.cached_width.read().ok().and_then(|g| *g)
    }

    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.cached_width.write() {
            *cache = None;
        }
    }

    /// Measured width, or an estimate from character counts.
    pub fn width(&self) -> f64 {
        self.cached_width().unwrap_or_else(|| {
            let longest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
            longest as f64 * self.font_size * Self::APPROX_ADVANCE
        })
    }

    pub fn height(&self) -> f64 {
        self.font_size * Self::LINE_HEIGHT * self.line_count() as f64
    }
}

impl ShapeTrait for Text {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width(), self.height())
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
        !self.text.trim().is_empty()
    }
}
