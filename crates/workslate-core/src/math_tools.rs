//! On-canvas measuring aids: ruler, protractor and compass.
//!
//! Each tool keeps its own position and rotation and exposes drag hotspots
//! tested in the tool's local frame.

use crate::geometry::to_local_frame;
use crate::input::CursorIcon;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Which measuring aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathToolKind {
    Ruler,
    Protractor,
    Compass,
}

/// Gesture started on a measuring aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathAction {
    Move,
    Rotate,
    Resize,
    /// Compass only: trace an arc at the compass radius.
    Draw,
}

impl MathAction {
    pub fn cursor(&self) -> CursorIcon {
        match self {
            MathAction::Move => CursorIcon::Move,
            MathAction::Rotate => CursorIcon::Grab,
            MathAction::Resize => CursorIcon::EwResize,
            MathAction::Draw => CursorIcon::Crosshair,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ruler {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub rotation: f64,
}

impl Default for Ruler {
    fn default() -> Self {
        Self {
            x: 100.0,
            y: 100.0,
            w: 400.0,
            h: 65.0,
            rotation: 0.0,
        }
    }
}

impl Ruler {
    pub const MIN_WIDTH: f64 = 50.0;
    /// Gap between the ruler's right edge and its rotate handle.
    pub const ROTATE_HANDLE_GAP: f64 = 40.0;

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Rotate handle position in the ruler's local frame.
    pub fn rotate_handle(&self) -> Point {
        Point::new(self.w + Self::ROTATE_HANDLE_GAP, self.h / 2.0)
    }

    /// Angular offset of the rotate handle from the local x axis.
    pub fn handle_angle(&self) -> f64 {
        (self.h / 2.0).atan2(self.w + Self::ROTATE_HANDLE_GAP)
    }

    fn hotspot(&self, point: Point) -> Option<MathAction> {
        let local = to_local_frame(point, self.origin(), self.rotation);
        let inside_y = local.y > 0.0 && local.y < self.h;
        if local.distance(self.rotate_handle()) < 20.0 {
            Some(MathAction::Rotate)
        } else if local.x > self.w - 20.0 && local.x < self.w && inside_y {
            Some(MathAction::Resize)
        } else if local.x > 0.0 && local.x < self.w && inside_y {
            Some(MathAction::Move)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Protractor {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub rotation: f64,
}

impl Default for Protractor {
    fn default() -> Self {
        Self {
            x: 400.0,
            y: 300.0,
            r: 150.0,
            rotation: 0.0,
        }
    }
}

impl Protractor {
    pub const ROTATE_HANDLE_GAP: f64 = 40.0;

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn rotate_handle(&self) -> Point {
        Point::new(self.r + Self::ROTATE_HANDLE_GAP, 0.0)
    }

    fn hotspot(&self, point: Point) -> Option<MathAction> {
        let local = to_local_frame(point, self.origin(), self.rotation);
        if local.distance(self.rotate_handle()) < 20.0 {
            Some(MathAction::Rotate)
        } else if point.distance(self.origin()) < self.r - 20.0 {
            Some(MathAction::Move)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compass {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub rotation: f64,
}

impl Default for Compass {
    fn default() -> Self {
        Self {
            x: 300.0,
            y: 300.0,
            r: 100.0,
            rotation: 0.0,
        }
    }
}

impl Compass {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Point on the compass circle in the direction of `toward`.
    pub fn point_on_circle(&self, toward: Point) -> Point {
        let angle = self.angle_to(toward);
        Point::new(self.x + self.r * angle.cos(), self.y + self.r * angle.sin())
    }

    pub fn angle_to(&self, point: Point) -> f64 {
        (point.y - self.y).atan2(point.x - self.x)
    }

    fn hotspot(&self, point: Point) -> Option<MathAction> {
        let local = to_local_frame(point, self.origin(), self.rotation);
        if local.distance(Point::new(self.r * 0.4, 0.0)) < 15.0 {
            Some(MathAction::Rotate)
        } else if local.distance(Point::new(self.r * 0.7, 0.0)) < 15.0 {
            Some(MathAction::Resize)
        } else if local.distance(Point::ZERO) < 20.0 {
            Some(MathAction::Move)
        } else if local.distance(Point::new(self.r, 0.0)) < 20.0 {
            Some(MathAction::Draw)
        } else {
            None
        }
    }
}

/// Minimum radius of the compass and protractor.
pub const MIN_TOOL_RADIUS: f64 = 20.0;

/// The three measuring aids and their visibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MathTools {
    pub ruler: Ruler,
    pub protractor: Protractor,
    pub compass: Compass,
    pub show_ruler: bool,
    pub show_protractor: bool,
    pub show_compass: bool,
}

impl MathTools {
    pub fn toggle(&mut self, kind: MathToolKind) {
        match kind {
            MathToolKind::Ruler => self.show_ruler = !self.show_ruler,
            MathToolKind::Protractor => self.show_protractor = !self.show_protractor,
            MathToolKind::Compass => self.show_compass = !self.show_compass,
        }
    }

    pub fn is_visible(&self, kind: MathToolKind) -> bool {
        match kind {
            MathToolKind::Ruler => self.show_ruler,
            MathToolKind::Protractor => self.show_protractor,
            MathToolKind::Compass => self.show_compass,
        }
    }

    pub fn any_visible(&self) -> bool {
        self.show_ruler || self.show_protractor || self.show_compass
    }

    /// Hotspot under `point` among visible tools, compass first, then
    /// protractor, then ruler.
    pub fn hotspot(&self, point: Point) -> Option<(MathToolKind, MathAction)> {
        if self.show_compass {
            if let Some(action) = self.compass.hotspot(point) {
                return Some((MathToolKind::Compass, action));
            }
        }
        if self.show_protractor {
            if let Some(action) = self.protractor.hotspot(point) {
                return Some((MathToolKind::Protractor, action));
            }
        }
        if self.show_ruler {
            if let Some(action) = self.ruler.hotspot(point) {
                return Some((MathToolKind::Ruler, action));
            }
        }
        None
    }

    /// Apply one step of a move/rotate/resize drag. `Draw` is handled by the
    /// editor since it produces a stroke.
    pub fn drag(&mut self, kind: MathToolKind, action: MathAction, point: Point, delta: Vec2) {
        match (kind, action) {
            (_, MathAction::Draw) => {}
            (MathToolKind::Ruler, MathAction::Move) => {
                self.ruler.x += delta.x;
                self.ruler.y += delta.y;
            }
            (MathToolKind::Protractor, MathAction::Move) => {
                self.protractor.x += delta.x;
                self.protractor.y += delta.y;
            }
            (MathToolKind::Compass, MathAction::Move) => {
                self.compass.x += delta.x;
                self.compass.y += delta.y;
            }
            (MathToolKind::Ruler, MathAction::Rotate) => {
                let r = &mut self.ruler;
                r.rotation = (point.y - r.y).atan2(point.x - r.x) - r.handle_angle();
            }
            (MathToolKind::Protractor, MathAction::Rotate) => {
                let p = &mut self.protractor;
                p.rotation = (point.y - p.y).atan2(point.x - p.x);
            }
            (MathToolKind::Compass, MathAction::Rotate) => {
                self.compass.rotation = self.compass.angle_to(point);
            }
            (MathToolKind::Ruler, MathAction::Resize) => {
                self.ruler.w = (self.ruler.w + delta.x).max(Ruler::MIN_WIDTH);
            }
            (MathToolKind::Protractor, MathAction::Resize) => {
                self.protractor.r = (self.protractor.r + delta.x).max(MIN_TOOL_RADIUS);
            }
            (MathToolKind::Compass, MathAction::Resize) => {
                self.compass.r = (self.compass.r + delta.x).max(MIN_TOOL_RADIUS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn all_visible() -> MathTools {
        MathTools {
            show_ruler: true,
            show_protractor: true,
            show_compass: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_hidden_tools_have_no_hotspots() {
        let tools = MathTools::default();
        assert_eq!(tools.hotspot(Point::new(300.0, 300.0)), None);
    }

    #[test]
    fn test_compass_hotspots() {
        let tools = all_visible();
        let at = |x: f64| tools.hotspot(Point::new(300.0 + x, 300.0));
        assert_eq!(at(0.0), Some((MathToolKind::Compass, MathAction::Move)));
        assert_eq!(at(40.0), Some((MathToolKind::Compass, MathAction::Rotate)));
        assert_eq!(at(70.0), Some((MathToolKind::Compass, MathAction::Resize)));
        assert_eq!(at(100.0), Some((MathToolKind::Compass, MathAction::Draw)));
    }

    #[test]
    fn test_ruler_hotspots() {
        let mut tools = all_visible();
        tools.show_compass = false;
        tools.show_protractor = false;
        assert_eq!(
            tools.hotspot(Point::new(200.0, 130.0)),
            Some((MathToolKind::Ruler, MathAction::Move))
        );
        assert_eq!(
            tools.hotspot(Point::new(490.0, 130.0)),
            Some((MathToolKind::Ruler, MathAction::Resize))
        );
        assert_eq!(
            tools.hotspot(Point::new(540.0, 132.5)),
            Some((MathToolKind::Ruler, MathAction::Rotate))
        );
        assert_eq!(tools.hotspot(Point::new(200.0, 90.0)), None);
    }

    #[test]
    fn test_rotated_ruler_hotspot() {
        let mut tools = MathTools { show_ruler: true, ..Default::default() };
        tools.ruler.rotation = FRAC_PI_2;
        // Rotated a quarter turn, the ruler body extends downwards from its origin.
        assert_eq!(
            tools.hotspot(Point::new(70.0, 200.0)),
            Some((MathToolKind::Ruler, MathAction::Move))
        );
    }

    #[test]
    fn test_protractor_hotspots() {
        let tools = MathTools { show_protractor: true, ..Default::default() };
        assert_eq!(
            tools.hotspot(Point::new(590.0, 300.0)),
            Some((MathToolKind::Protractor, MathAction::Rotate))
        );
        assert_eq!(
            tools.hotspot(Point::new(450.0, 300.0)),
            Some((MathToolKind::Protractor, MathAction::Move))
        );
        assert_eq!(tools.hotspot(Point::new(540.0, 300.0)), None);
    }

    #[test]
    fn test_ruler_rotate_keeps_handle_under_pointer() {
        let mut tools = all_visible();
        let handle_angle = tools.ruler.handle_angle();
        let target = Point::new(100.0, 600.0);
        tools.drag(MathToolKind::Ruler, MathAction::Rotate, target, Vec2::ZERO);
        assert!((tools.ruler.rotation - (FRAC_PI_2 - handle_angle)).abs() < 1e-9);
    }

    #[test]
    fn test_resize_floors() {
        let mut tools = all_visible();
        tools.drag(MathToolKind::Ruler, MathAction::Resize, Point::ZERO, Vec2::new(-1000.0, 0.0));
        assert!((tools.ruler.w - Ruler::MIN_WIDTH).abs() < f64::EPSILON);
        tools.drag(MathToolKind::Compass, MathAction::Resize, Point::ZERO, Vec2::new(-1000.0, 0.0));
        assert!((tools.compass.r - MIN_TOOL_RADIUS).abs() < f64::EPSILON);
        tools.drag(MathToolKind::Compass, MathAction::Resize, Point::ZERO, Vec2::new(15.0, 0.0));
        assert!((tools.compass.r - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compass_point_on_circle() {
        let compass = Compass::default();
        let p = compass.point_on_circle(Point::new(300.0, 0.0));
        assert!((p.x - 300.0).abs() < 1e-9);
        assert!((p.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_toggle() {
        let mut tools = MathTools::default();
        tools.toggle(MathToolKind::Protractor);
        assert!(tools.is_visible(MathToolKind::Protractor));
        assert!(tools.any_visible());
        tools.toggle(MathToolKind::Protractor);
        assert!(!tools.any_visible());
    }
}
