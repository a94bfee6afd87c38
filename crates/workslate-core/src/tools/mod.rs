//! Drawing tools and the settings new objects inherit.

use crate::shapes::{LineType, PenType, Polygon, SerializableColor, Text};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Selection tool for moving/resizing shapes.
    Select,
    /// Freehand drawing tool.
    #[default]
    Pen,
    /// Splits strokes and removes objects under the pointer.
    Eraser,
    /// Rectangle tool.
    Rect,
    /// Circle tool.
    Circle,
    /// Line tool.
    Line,
    /// Regular polygon, placed with a single click.
    Poly,
    /// Text tool.
    Text,
}

impl ToolKind {
    /// Tools that capture geometry with a press-drag-release gesture.
    pub fn is_shape_tool(&self) -> bool {
        matches!(self, ToolKind::Rect | ToolKind::Circle | ToolKind::Line)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
            ToolKind::Rect => "rect",
            ToolKind::Circle => "circle",
            ToolKind::Line => "line",
            ToolKind::Poly => "poly",
            ToolKind::Text => "text",
        }
    }
}

/// Current tool plus the style applied to new objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub pen_size: f64,
    pub pen_type: PenType,
    pub line_type: LineType,
    pub text_size: f64,
    pub font_family: String,
    pub poly_sides: u32,
    pub snap_to_grid: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: SerializableColor::black(),
            pen_size: 3.0,
            pen_type: PenType::Pen,
            line_type: LineType::Solid,
            text_size: Text::DEFAULT_FONT_SIZE,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            poly_sides: 5,
            snap_to_grid: false,
        }
    }
}

impl ToolSettings {
    /// Radius within which the eraser removes stroke points.
    pub fn eraser_radius(&self) -> f64 {
        self.pen_size * 2.0
    }

    /// Radius of the eraser cursor drawn on the overlay.
    pub fn eraser_cursor_radius(&self) -> f64 {
        (self.pen_size * 4.0).max(20.0)
    }

    pub fn set_poly_sides(&mut self, sides: u32) {
        self.poly_sides = sides.clamp(Polygon::MIN_SIDES, Polygon::MAX_SIDES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eraser_radii() {
        let mut settings = ToolSettings::default();
        assert!((settings.eraser_radius() - 6.0).abs() < f64::EPSILON);
        assert!((settings.eraser_cursor_radius() - 20.0).abs() < f64::EPSILON);
        settings.pen_size = 10.0;
        assert!((settings.eraser_cursor_radius() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_poly_sides_clamped() {
        let mut settings = ToolSettings::default();
        settings.set_poly_sides(40);
        assert_eq!(settings.poly_sides, 12);
        settings.set_poly_sides(1);
        assert_eq!(settings.poly_sides, 3);
    }

    #[test]
    fn test_shape_tools() {
        assert!(ToolKind::Rect.is_shape_tool());
        assert!(!ToolKind::Poly.is_shape_tool());
        assert!(!ToolKind::Pen.is_shape_tool());
    }
}
