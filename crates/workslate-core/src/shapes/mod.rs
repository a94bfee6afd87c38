//! Drawable object definitions for slides.

mod circle;
mod group;
mod image;
mod line;
mod path;
mod polygon;
mod rectangle;
mod text;

pub use circle::Circle;
pub use group::Group;
pub use image::Image;
pub use line::{Line, LineType};
pub use path::{Freehand, PenType};
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use text::{FontStyle, FontWeight, Text};

use crate::geometry::{Bounds, hit_test_rotated};
use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serializable color representation (RGBA8).
///
/// Serialized as a CSS hex string: `#rrggbb`, or `#rrggbbaa` when not opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn red() -> Self {
        Self::new(255, 0, 0, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(digits.get(i..i + 1)?, 16)
                        .ok()
                        .map(|v| v * 17)
                };
                Some(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, 255))
            }
            6 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Same color with alpha scaled by `opacity`.
    pub fn with_opacity(&self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..*self }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

fn default_scale() -> f64 {
    1.0
}

fn is_default_scale(v: &f64) -> bool {
    *v == 1.0
}

/// Attributes shared by every drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectAttrs {
    /// Rotation in radians about the bounds center.
    #[serde(default)]
    pub rotation: f64,
    /// Signed horizontal scale; negative values flip.
    #[serde(default = "default_scale", skip_serializing_if = "is_default_scale")]
    pub scale_x: f64,
    /// Signed vertical scale; negative values flip.
    #[serde(default = "default_scale", skip_serializing_if = "is_default_scale")]
    pub scale_y: f64,
    /// Locked objects cannot be moved, resized, rotated, erased or flipped.
    #[serde(default)]
    pub locked: bool,
}

impl Default for ObjectAttrs {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            locked: false,
        }
    }
}

/// Common trait for all drawables.
pub trait ShapeTrait {
    /// Bounding box in the object's unrotated frame.
    fn bounds(&self) -> Bounds;

    /// Translate the object's geometry.
    fn offset(&mut self, dx: f64, dy: f64);

    /// Shared attributes.
    fn attrs(&self) -> &ObjectAttrs;

    /// Mutable shared attributes.
    fn attrs_mut(&mut self) -> &mut ObjectAttrs;

    /// Whether freshly captured geometry is large enough to be committed.
    fn is_valid(&self) -> bool;

    /// Check if a point hits this object. Scale is ignored.
    fn hit_test(&self, point: Point) -> bool {
        hit_test_rotated(point, &self.bounds(), self.attrs().rotation)
    }
}

/// Minimum extent, in pixels, of committed geometry.
pub const MIN_SHAPE_SIZE: f64 = 5.0;

/// One visual element on a slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Drawable {
    Path(Freehand),
    Rect(Rectangle),
    Circle(Circle),
    Poly(Polygon),
    Line(Line),
    Text(Text),
    Image(Image),
    Group(Group),
}

macro_rules! each_variant {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Drawable::Path($s) => $body,
            Drawable::Rect($s) => $body,
            Drawable::Circle($s) => $body,
            Drawable::Poly($s) => $body,
            Drawable::Line($s) => $body,
            Drawable::Text($s) => $body,
            Drawable::Image($s) => $body,
            Drawable::Group($s) => $body,
        }
    };
}

impl Drawable {
    /// The `type` tag used in the slide format.
    pub fn kind(&self) -> &'static str {
        match self {
            Drawable::Path(_) => "path",
            Drawable::Rect(_) => "rect",
            Drawable::Circle(_) => "circle",
            Drawable::Poly(_) => "poly",
            Drawable::Line(_) => "line",
            Drawable::Text(_) => "text",
            Drawable::Image(_) => "image",
            Drawable::Group(_) => "group",
        }
    }

    pub fn bounds(&self) -> Bounds {
        each_variant!(self, s => s.bounds())
    }

    /// Axis-aligned box enclosing the object as drawn, rotation included.
    pub fn world_bounds(&self) -> Bounds {
        self.bounds().rotated_aabb(self.rotation())
    }

    pub fn offset(&mut self, dx: f64, dy: f64) {
        each_variant!(self, s => s.offset(dx, dy))
    }

    pub fn attrs(&self) -> &ObjectAttrs {
        each_variant!(self, s => s.attrs())
    }

    pub fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        each_variant!(self, s => s.attrs_mut())
    }

    pub fn is_valid(&self) -> bool {
        each_variant!(self, s => s.is_valid())
    }

    pub fn hit_test(&self, point: Point) -> bool {
        each_variant!(self, s => s.hit_test(point))
    }

    pub fn rotation(&self) -> f64 {
        self.attrs().rotation
    }

    pub fn is_locked(&self) -> bool {
        self.attrs().locked
    }

    /// Stroke or text color; images and groups have none.
    pub fn color(&self) -> Option<SerializableColor> {
        match self {
            Drawable::Path(s) => Some(s.color),
            Drawable::Rect(s) => Some(s.color),
            Drawable::Circle(s) => Some(s.color),
            Drawable::Poly(s) => Some(s.color),
            Drawable::Line(s) => Some(s.color),
            Drawable::Text(s) => Some(s.color),
            Drawable::Image(_) | Drawable::Group(_) => None,
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        match self {
            Drawable::Path(s) => s.color = color,
            Drawable::Rect(s) => s.color = color,
            Drawable::Circle(s) => s.color = color,
            Drawable::Poly(s) => s.color = color,
            Drawable::Line(s) => s.color = color,
            Drawable::Text(s) => s.color = color,
            Drawable::Image(_) => {}
            Drawable::Group(s) => s.children.iter_mut().for_each(|c| c.set_color(color)),
        }
    }

    /// Stroke width for stroked variants.
    pub fn stroke_width(&self) -> Option<f64> {
        match self {
            Drawable::Path(s) => Some(s.width),
            Drawable::Rect(s) => Some(s.width),
            Drawable::Circle(s) => Some(s.width),
            Drawable::Poly(s) => Some(s.width),
            Drawable::Line(s) => Some(s.width),
            Drawable::Text(_) | Drawable::Image(_) | Drawable::Group(_) => None,
        }
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        match self {
            Drawable::Path(s) => s.width = width,
            Drawable::Rect(s) => s.width = width,
            Drawable::Circle(s) => s.width = width,
            Drawable::Poly(s) => s.width = width,
            Drawable::Line(s) => s.width = width,
            Drawable::Text(_) | Drawable::Image(_) | Drawable::Group(_) => {}
        }
    }

    /// Flip fill on rect, circle and poly. Returns whether anything changed.
    pub fn toggle_fill(&mut self) -> bool {
        match self {
            Drawable::Rect(s) => s.filled = !s.filled,
            Drawable::Circle(s) => s.filled = !s.filled,
            Drawable::Poly(s) => s.filled = !s.filled,
            _ => return false,
        }
        true
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Drawable::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Drawable::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Mirror the object about `center` along one axis.
    ///
    /// Lines and paths mirror their points. Other variants move their center
    /// to the mirrored position, negate the matching scale and negate rotation.
    pub fn flip(&mut self, horizontal: bool, center: Point) {
        let mirror = |p: Point| {
            if horizontal {
                Point::new(2.0 * center.x - p.x, p.y)
            } else {
                Point::new(p.x, 2.0 * center.y - p.y)
            }
        };
        match self {
            Drawable::Line(l) => {
                let (a, b) = (mirror(l.start()), mirror(l.end()));
                l.set_start(a);
                l.set_end(b);
            }
            Drawable::Path(p) => {
                for pt in &mut p.points {
                    *pt = mirror(*pt);
                }
            }
            _ => {
                let old = self.bounds().center();
                let new = mirror(old);
                self.offset(new.x - old.x, new.y - old.y);
                let attrs = self.attrs_mut();
                if horizontal {
                    attrs.scale_x = -attrs.scale_x;
                } else {
                    attrs.scale_y = -attrs.scale_y;
                }
                attrs.rotation = -attrs.rotation;
            }
        }
    }
}

impl From<Freehand> for Drawable {
    fn from(s: Freehand) -> Self {
        Drawable::Path(s)
    }
}

impl From<Rectangle> for Drawable {
    fn from(s: Rectangle) -> Self {
        Drawable::Rect(s)
    }
}

impl From<Circle> for Drawable {
    fn from(s: Circle) -> Self {
        Drawable::Circle(s)
    }
}

impl From<Polygon> for Drawable {
    fn from(s: Polygon) -> Self {
        Drawable::Poly(s)
    }
}

impl From<Line> for Drawable {
    fn from(s: Line) -> Self {
        Drawable::Line(s)
    }
}

impl From<Text> for Drawable {
    fn from(s: Text) -> Self {
        Drawable::Text(s)
    }
}

impl From<Image> for Drawable {
    fn from(s: Image) -> Self {
        Drawable::Image(s)
    }
}

impl From<Group> for Drawable {
    fn from(s: Group) -> Self {
        Drawable::Group(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_variant() -> Vec<Drawable> {
        let mut rotated = Rectangle::new(30.0, 40.0, 80.0, 20.0);
        rotated.attrs.rotation = 0.9;
        vec![
            Freehand::new(vec![Point::new(0.0, 0.0), Point::new(40.0, 30.0)]).into(),
            Rectangle::new(10.0, 10.0, 50.0, 30.0).into(),
            rotated.into(),
            Circle::new(100.0, 100.0, 20.0).into(),
            Polygon::new(50.0, 50.0, 30.0, 6).into(),
            Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).into(),
            Text::new(Point::new(5.0, 5.0), "Hello\nworld".to_string(), 36.0).into(),
            Image::new(0.0, 0.0, 64.0, 48.0, String::new()).into(),
            Group::from_objects(vec![
                Rectangle::new(0.0, 0.0, 50.0, 50.0).into(),
                Circle::new(100.0, 100.0, 20.0).into(),
            ])
            .into(),
        ]
    }

    #[test]
    fn test_hit_test_at_bounds_center() {
        for obj in every_variant() {
            let center = obj.bounds().center();
            assert!(obj.hit_test(center), "{} missed its own center", obj.kind());
        }
    }

    #[test]
    fn test_color_hex() {
        let c = SerializableColor::from_hex("#007acc").unwrap();
        assert_eq!(c, SerializableColor::new(0, 122, 204, 255));
        assert_eq!(c.to_hex(), "#007acc");
        assert_eq!(SerializableColor::from_hex("#fff"), Some(SerializableColor::white()));
        assert_eq!(
            SerializableColor::from_hex("#ff000080"),
            Some(SerializableColor::new(255, 0, 0, 128))
        );
        assert!(SerializableColor::from_hex("blue").is_none());
    }

    #[test]
    fn test_peniko_color_conversion() {
        let c: Color = SerializableColor::new(10, 20, 30, 255).into();
        let back: SerializableColor = c.into();
        assert_eq!(back, SerializableColor::new(10, 20, 30, 255));
    }

    #[test]
    fn test_serialized_shape() {
        let mut rect = Rectangle::new(1.0, 2.0, 3.0, 4.0);
        rect.attrs.scale_x = -1.0;
        let json = serde_json::to_value(Drawable::from(rect)).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["w"], 3.0);
        assert_eq!(json["scaleX"], -1.0);
        assert_eq!(json["color"], "#000000");
        assert!(json.get("scaleY").is_none());
    }

    #[test]
    fn test_deserialize_minimal_objects() {
        let json = r##"[
            {"type":"rect","x":1,"y":2,"w":30,"h":40,"color":"#ff0000","width":3},
            {"type":"path","points":[{"x":0,"y":0},{"x":5,"y":5}],"color":"#000000","width":3,"penType":"highlighter"},
            {"type":"text","x":0,"y":0,"text":"hi","fontSize":24,"fontFamily":"Lexend","color":"#000000","fontWeight":"bold"}
        ]"##;
        let objs: Vec<Drawable> = serde_json::from_str(json).unwrap();
        assert_eq!(objs.len(), 3);
        assert!(!objs[0].is_locked());
        assert!((objs[0].attrs().scale_x - 1.0).abs() < f64::EPSILON);
        match &objs[1] {
            Drawable::Path(p) => assert_eq!(p.pen_type, PenType::Highlighter),
            other => panic!("expected path, got {}", other.kind()),
        }
        match &objs[2] {
            Drawable::Text(t) => assert_eq!(t.font_weight, FontWeight::Bold),
            other => panic!("expected text, got {}", other.kind()),
        }
    }

    #[test]
    fn test_flip_line_horizontal() {
        let mut line: Drawable = Line::new(Point::new(10.0, 0.0), Point::new(50.0, 20.0)).into();
        line.flip(true, Point::new(30.0, 10.0));
        let Drawable::Line(l) = &line else { unreachable!() };
        assert!((l.x1 - 50.0).abs() < f64::EPSILON);
        assert!((l.x2 - 10.0).abs() < f64::EPSILON);
        assert!((l.y1 - 0.0).abs() < f64::EPSILON);
        assert!((l.y2 - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flip_rect_negates_scale_and_rotation() {
        let mut rect = Rectangle::new(0.0, 0.0, 20.0, 20.0);
        rect.attrs.rotation = 0.5;
        let mut obj: Drawable = rect.into();
        obj.flip(true, Point::new(50.0, 10.0));
        let b = obj.bounds();
        assert!((b.cx() - 90.0).abs() < 1e-9);
        assert!((obj.attrs().scale_x + 1.0).abs() < f64::EPSILON);
        assert!((obj.rotation() + 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_toggle_fill_only_on_shapes() {
        let mut rect: Drawable = Rectangle::new(0.0, 0.0, 10.0, 10.0).into();
        assert!(rect.toggle_fill());
        let mut line: Drawable = Line::new(Point::ZERO, Point::new(10.0, 0.0)).into();
        assert!(!line.toggle_fill());
    }
}
