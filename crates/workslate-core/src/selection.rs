//! Selection and manipulation handle system.

use crate::document::ObjectIndex;
use crate::geometry::rotate_about;
use crate::shapes::{Drawable, Text};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Handle hit radius in canvas pixels.
pub const HANDLE_HIT_RADIUS: f64 = 10.0;
/// Drawn size of square handles.
pub const HANDLE_SIZE: f64 = 8.0;
/// Radius of the round rotate handle.
pub const ROTATE_HANDLE_RADIUS: f64 = 5.0;
/// Distance above the bounds' top edge to the rotate handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 20.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Rotation handle above the top-center.
    Rotate,
    /// Bottom-right corner, or the rim point of circles and polygons.
    Resize,
    /// Line start point.
    Start,
    /// Line end point.
    End,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point) -> bool {
        self.position.distance(point) < HANDLE_HIT_RADIUS
    }
}

/// Handles of an object, in hit-test priority order.
pub fn get_handles(obj: &Drawable) -> Vec<Handle> {
    if let Drawable::Line(line) = obj {
        return vec![
            Handle::new(line.start(), HandleKind::Start),
            Handle::new(line.end(), HandleKind::End),
        ];
    }
    let b = obj.bounds();
    let center = b.center();
    let rotation = obj.rotation();
    let place = |p: Point| rotate_about(p, center, rotation);
    let mut handles = vec![Handle::new(
        place(Point::new(b.cx(), b.y - ROTATE_HANDLE_OFFSET)),
        HandleKind::Rotate,
    )];
    let resize = match obj {
        Drawable::Text(_) => None,
        Drawable::Circle(c) => Some(Point::new(c.x + c.radius, c.y)),
        Drawable::Poly(p) => Some(Point::new(p.x + p.radius, p.y)),
        _ => Some(Point::new(b.right(), b.bottom())),
    };
    if let Some(p) = resize {
        handles.push(Handle::new(place(p), HandleKind::Resize));
    }
    handles
}

/// First handle of `obj` under `point`. Locked objects expose no handles.
pub fn hit_test_handles(obj: &Drawable, point: Point) -> Option<HandleKind> {
    if obj.is_locked() {
        return None;
    }
    get_handles(obj)
        .into_iter()
        .find(|h| h.hit_test(point))
        .map(|h| h.kind)
}

/// Rotate `obj` so its rotate handle points at `point`.
pub fn rotate_toward(obj: &mut Drawable, point: Point) {
    let center = obj.bounds().center();
    obj.attrs_mut().rotation = (point.y - center.y).atan2(point.x - center.x) + FRAC_PI_2;
}

/// Grow `obj` by one resize-drag step.
pub fn resize_by(obj: &mut Drawable, delta: Vec2) {
    match obj {
        Drawable::Rect(r) => {
            r.w += delta.x;
            r.h += delta.y;
        }
        Drawable::Image(i) => {
            i.w += delta.x;
            i.h += delta.y;
        }
        Drawable::Circle(c) => c.radius += delta.x,
        Drawable::Poly(p) => p.radius += delta.x,
        Drawable::Text(t) => {
            let size = (t.font_size + delta.x * 0.5).max(Text::MIN_FONT_SIZE);
            t.set_font_size(size);
        }
        Drawable::Path(_) | Drawable::Line(_) | Drawable::Group(_) => {
            let s = 1.0 + delta.x * 0.01;
            let attrs = obj.attrs_mut();
            attrs.scale_x *= s;
            attrs.scale_y *= s;
        }
    }
}

/// Move a line endpoint.
pub fn move_endpoint(obj: &mut Drawable, handle: HandleKind, point: Point) {
    if let Drawable::Line(line) = obj {
        match handle {
            HandleKind::Start => line.set_start(point),
            HandleKind::End => line.set_end(point),
            HandleKind::Rotate | HandleKind::Resize => {}
        }
    }
}

/// Selected objects of the current slide, by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    indices: Vec<ObjectIndex>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, indices: Vec<ObjectIndex>) {
        self.indices = indices;
    }

    pub fn select(&mut self, index: ObjectIndex) {
        self.indices = vec![index];
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn contains(&self, index: ObjectIndex) -> bool {
        self.indices.contains(&index)
    }

    pub fn indices(&self) -> &[ObjectIndex] {
        &self.indices
    }

    pub fn first(&self) -> Option<ObjectIndex> {
        self.indices.first().copied()
    }

    /// The selected index when exactly one object is selected.
    pub fn single(&self) -> Option<ObjectIndex> {
        match self.indices.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Drop indices no longer valid for a slide of `len` objects.
    pub fn retain_valid(&mut self, len: usize) {
        self.indices.retain(|&i| i < len);
    }
}
