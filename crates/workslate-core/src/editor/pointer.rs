//! Pointer gestures: press, drag and release across the tools.

use super::{Action, Editor};
use crate::document::ObjectIndex;
use crate::eraser::erase_at;
use crate::geometry::Bounds;
use crate::input::CursorIcon;
use crate::math_tools::{MathAction, MathToolKind};
use crate::selection::{HandleKind, hit_test_handles, move_endpoint, resize_by, rotate_toward};
use crate::shapes::{Circle, Drawable, Freehand, Line, Polygon, Rectangle};
use crate::tools::ToolKind;
use kurbo::Point;

/// Radius of a polygon placed with a click.
const POLYGON_RADIUS: f64 = 50.0;

/// What a select-tool drag is manipulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    Move,
    Handle(HandleKind),
}

/// The gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Capturing a pen or highlighter stroke.
    DrawingPath { path: Freehand },
    /// Rubber-banding a rect, circle or line from `start`.
    DrawingShape { shape: Drawable, start: Point },
    Erasing { position: Point },
    /// Dragging the selection or one of its handles.
    DraggingHandle { handle: DragHandle, last: Point },
    BoxSelecting { start: Point, current: Point },
    /// Manipulating a measuring aid; compass draws collect an arc stroke.
    MathTool {
        kind: MathToolKind,
        action: MathAction,
        last: Point,
        stroke: Option<Freehand>,
    },
}

impl Gesture {
    /// Normalized box-selection rectangle.
    pub fn box_select_rect(&self) -> Option<Bounds> {
        match self {
            Gesture::BoxSelecting { start, current } => Some(box_from(*start, *current)),
            _ => None,
        }
    }
}

fn box_from(start: Point, end: Point) -> Bounds {
    Bounds::new(start.x, start.y, end.x - start.x, end.y - start.y).normalized()
}

/// Thing under the pointer while no gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverTarget {
    #[default]
    None,
    MathTool(MathToolKind, MathAction),
    Handle(HandleKind),
    Object(ObjectIndex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverInfo {
    pub cursor: CursorIcon,
    pub target: HoverTarget,
}

impl HoverInfo {
    fn new(cursor: CursorIcon, target: HoverTarget) -> Self {
        Self { cursor, target }
    }
}

fn handle_cursor(handle: HandleKind) -> CursorIcon {
    match handle {
        HandleKind::Rotate => CursorIcon::Grab,
        HandleKind::Resize => CursorIcon::NwseResize,
        HandleKind::Start | HandleKind::End => CursorIcon::Crosshair,
    }
}

/// Resize a provisional shape to span from `start` to `point`.
fn update_shape(shape: &mut Drawable, start: Point, point: Point) {
    match shape {
        Drawable::Rect(r) => {
            r.w = point.x - start.x;
            r.h = point.y - start.y;
        }
        Drawable::Circle(c) => c.radius = start.distance(point),
        Drawable::Line(l) => l.set_end(point),
        _ => {}
    }
}

impl Editor {
    fn new_shape(&self, tool: ToolKind, at: Point) -> Option<Drawable> {
        let (color, width) = (self.settings.color, self.settings.pen_size);
        let shape = match tool {
            ToolKind::Rect => {
                let mut r = Rectangle::new(at.x, at.y, 0.0, 0.0);
                r.color = color;
                r.width = width;
                r.into()
            }
            ToolKind::Circle => {
                let mut c = Circle::new(at.x, at.y, 0.0);
                c.color = color;
                c.width = width;
                c.into()
            }
            ToolKind::Line => {
                let mut l = Line::new(at, at);
                l.color = color;
                l.width = width;
                l.line_type = self.settings.line_type;
                l.into()
            }
            _ => return None,
        };
        Some(shape)
    }

    fn new_stroke(&self, start: Point) -> Freehand {
        Freehand::new(vec![start]).with_style(
            self.settings.color,
            self.settings.pen_size,
            self.settings.pen_type,
        )
    }

    pub(super) fn on_down(&mut self, point: Point) -> Vec<Action> {
        if self.text_entry.is_some() {
            return self.finalize_text_entry();
        }

        if let Some((kind, action)) = self.math_tools.hotspot(point) {
            let stroke = (kind == MathToolKind::Compass && action == MathAction::Draw)
                .then(|| self.new_stroke(self.math_tools.compass.point_on_circle(point)));
            self.gesture = Gesture::MathTool { kind, action, last: point, stroke };
            return vec![Action::SetCursor(action.cursor())];
        }

        match self.settings.tool {
            ToolKind::Select => self.begin_select(point),
            ToolKind::Eraser => {
                self.gesture = Gesture::Erasing { position: point };
                self.erase(point);
                vec![Action::RenderNeeded]
            }
            ToolKind::Pen => {
                self.gesture = Gesture::DrawingPath { path: self.new_stroke(point) };
                vec![Action::RenderNeeded]
            }
            ToolKind::Text => {
                let found = self
                    .document
                    .find_object(point)
                    .filter(|&i| matches!(self.document.get(i), Some(Drawable::Text(_))));
                self.start_text_entry(point, found)
            }
            ToolKind::Poly => self.place_polygon(point),
            tool @ (ToolKind::Rect | ToolKind::Circle | ToolKind::Line) => {
                if let Some(shape) = self.new_shape(tool, point) {
                    self.gesture = Gesture::DrawingShape { shape, start: point };
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    fn begin_select(&mut self, point: Point) -> Vec<Action> {
        if let Some(index) = self.selection.single() {
            let handle = self.document.get(index).and_then(|o| hit_test_handles(o, point));
            if let Some(handle) = handle {
                self.gesture = Gesture::DraggingHandle {
                    handle: DragHandle::Handle(handle),
                    last: point,
                };
                return vec![Action::SetCursor(handle_cursor(handle))];
            }
        }

        match self.document.find_object(point) {
            Some(index) => {
                self.selection.select(index);
                if self.document.get(index).is_some_and(|o| !o.is_locked()) {
                    self.gesture = Gesture::DraggingHandle { handle: DragHandle::Move, last: point };
                }
            }
            None => {
                self.selection.clear();
                self.gesture = Gesture::BoxSelecting { start: point, current: point };
            }
        }
        self.needs_bake = true;
        vec![Action::SelectionChanged, Action::RenderNeeded]
    }

    fn place_polygon(&mut self, point: Point) -> Vec<Action> {
        let mut poly = Polygon::new(point.x, point.y, POLYGON_RADIUS, self.settings.poly_sides);
        poly.color = self.settings.color;
        poly.width = self.settings.pen_size;
        let index = self.document.push(poly.into());

        let mut actions = self.set_tool(ToolKind::Select);
        self.selection.select(index);
        actions.push(Action::SelectionChanged);
        self.commit(&mut actions);
        actions
    }

    fn erase(&mut self, point: Point) {
        let radius = self.settings.eraser_radius();
        if erase_at(self.document.current_slide_mut(), point, radius) {
            let len = self.document.current_slide().len();
            self.selection.retain_valid(len);
            self.needs_bake = true;
        }
    }

    pub(super) fn on_move(&mut self, point: Point, raw: Point) -> Vec<Action> {
        match &mut self.gesture {
            Gesture::Idle => return self.update_hover(raw),
            Gesture::Erasing { position } => {
                *position = point;
                self.erase(point);
            }
            Gesture::DrawingPath { path } => path.add_point(point),
            Gesture::DrawingShape { shape, start } => update_shape(shape, *start, point),
            Gesture::BoxSelecting { current, .. } => *current = point,
            Gesture::DraggingHandle { handle, last } => {
                let delta = point - *last;
                *last = point;
                match *handle {
                    DragHandle::Move => {
                        for &index in self.selection.indices() {
                            if let Some(obj) = self.document.get_mut(index) {
                                obj.offset(delta.x, delta.y);
                            }
                        }
                    }
                    DragHandle::Handle(kind) => {
                        let target = self.selection.first().and_then(|i| self.document.get_mut(i));
                        if let Some(obj) = target {
                            match kind {
                                HandleKind::Rotate => rotate_toward(obj, point),
                                HandleKind::Resize => resize_by(obj, delta),
                                HandleKind::Start | HandleKind::End => move_endpoint(obj, kind, point),
                            }
                        }
                    }
                }
            }
            Gesture::MathTool { kind, action, last, stroke } => {
                if let Some(stroke) = stroke {
                    let compass = &mut self.math_tools.compass;
                    compass.rotation = compass.angle_to(point);
                    stroke.add_point(compass.point_on_circle(point));
                } else {
                    self.math_tools.drag(*kind, *action, point, point - *last);
                }
                *last = point;
            }
        }
        vec![Action::RenderNeeded]
    }

    fn update_hover(&mut self, point: Point) -> Vec<Action> {
        let hover = self.hover_at(point);
        let mut actions = Vec::new();
        if hover.cursor != self.hover.cursor {
            actions.push(Action::SetCursor(hover.cursor));
        }
        if hover.target != self.hover.target {
            actions.push(Action::RenderNeeded);
        }
        self.hover = hover;
        actions
    }

    /// Hover feedback: measuring aids first, then the handles of a single
    /// unlocked selection, then objects.
    pub fn hover_at(&self, point: Point) -> HoverInfo {
        if let Some((kind, action)) = self.math_tools.hotspot(point) {
            return HoverInfo::new(action.cursor(), HoverTarget::MathTool(kind, action));
        }

        let single = self
            .selection
            .single()
            .and_then(|i| self.document.get(i).map(|o| (i, o)))
            .filter(|(_, o)| !o.is_locked());
        if let Some((index, obj)) = single {
            if let Some(handle) = hit_test_handles(obj, point) {
                return HoverInfo::new(handle_cursor(handle), HoverTarget::Handle(handle));
            }
            if obj.hit_test(point) {
                return HoverInfo::new(CursorIcon::Move, HoverTarget::Object(index));
            }
            return HoverInfo::default();
        }

        match self.document.find_object(point) {
            Some(index) => HoverInfo::new(CursorIcon::Move, HoverTarget::Object(index)),
            None => HoverInfo::default(),
        }
    }

    pub(super) fn on_up(&mut self, point: Point) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.gesture);
        let mut actions = Vec::new();

        match gesture {
            Gesture::BoxSelecting { start, .. } => {
                let indices = self.document.objects_in_rect(box_from(start, point));
                self.selection.set(indices);
                self.needs_bake = true;
                return vec![Action::SelectionChanged, Action::RenderNeeded];
            }
            Gesture::MathTool { stroke: Some(mut stroke), .. } => {
                if stroke.len() == 1 {
                    stroke.expand_single_point();
                }
                self.document.push(stroke.into());
                actions.push(Action::SetCursor(CursorIcon::Default));
            }
            Gesture::MathTool { .. } => actions.push(Action::SetCursor(CursorIcon::Default)),
            Gesture::DrawingPath { mut path } => {
                if path.len() == 1 {
                    path.expand_single_point();
                }
                let path: Drawable = path.into();
                if path.is_valid() {
                    self.document.push(path);
                }
            }
            Gesture::DrawingShape { mut shape, start } => {
                update_shape(&mut shape, start, point);
                if let Drawable::Rect(r) = &mut shape {
                    r.normalize();
                }
                if shape.is_valid() {
                    self.document.push(shape);
                }
            }
            Gesture::DraggingHandle { .. } | Gesture::Erasing { .. } | Gesture::Idle => {}
        }

        self.commit(&mut actions);
        actions
    }

    pub(super) fn on_double_click(&mut self, point: Point) -> Vec<Action> {
        if !matches!(self.settings.tool, ToolKind::Select | ToolKind::Text) {
            return Vec::new();
        }
        match self.document.find_object(point) {
            Some(index) if matches!(self.document.get(index), Some(Drawable::Text(_))) => {
                self.gesture = Gesture::Idle;
                self.start_text_entry(point, Some(index))
            }
            _ => Vec::new(),
        }
    }
}
