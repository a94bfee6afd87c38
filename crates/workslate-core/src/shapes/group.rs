//! Group shape for combining multiple drawables.

use super::{Drawable, ObjectAttrs, ShapeTrait};
use crate::geometry::{Bounds, union_bounds};
use serde::{Deserialize, Serialize};

/// A group of drawables that can be manipulated as a single unit.
///
/// Children store coordinates relative to the group origin `(x, y)`.
/// Groups can contain other groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
    pub children: Vec<Drawable>,
    #[serde(flatten)]
    pub attrs: ObjectAttrs,
}

impl Group {
    /// Build a group from objects in absolute coordinates. The origin is the
    /// top-left of their combined bounds.
    pub fn from_objects(mut objects: Vec<Drawable>) -> Self {
        let union = union_bounds(objects.iter().map(Drawable::world_bounds)).unwrap_or_default();
        for obj in &mut objects {
            obj.offset(-union.x, -union.y);
        }
        Self {
            x: union.x,
            y: union.y,
            w: union.w,
            h: union.h,
            children: objects,
            attrs: ObjectAttrs::default(),
        }
    }

    /// Dissolve this group, returning its children in absolute coordinates.
    pub fn ungroup(self) -> Vec<Drawable> {
        let (x, y) = (self.x, self.y);
        self.children
            .into_iter()
            .map(|mut child| {
                child.offset(x, y);
                child
            })
            .collect()
    }
}

impl ShapeTrait for Group {
    fn bounds(&self) -> Bounds {
        match union_bounds(self.children.iter().map(Drawable::world_bounds)) {
            Some(b) => Bounds::new(b.x + self.x, b.y + self.y, b.w, b.h),
            None => Bounds::new(self.x, self.y, 0.0, 0.0),
        }
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
        !self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Rectangle};

    fn rect_and_circle() -> Vec<Drawable> {
        vec![
            Rectangle::new(0.0, 0.0, 50.0, 50.0).into(),
            Circle::new(100.0, 100.0, 20.0).into(),
        ]
    }

    #[test]
    fn test_group_bounds_cover_children() {
        let group = Group::from_objects(rect_and_circle());
        let b = group.bounds();
        assert!(b.x.abs() < f64::EPSILON);
        assert!(b.y.abs() < f64::EPSILON);
        assert!((b.right() - 120.0).abs() < f64::EPSILON);
        assert!((b.bottom() - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ungroup_restores_absolute_coordinates() {
        let mut objects = rect_and_circle();
        objects[0].offset(30.0, 40.0);
        let group = Group::from_objects(objects);
        assert!((group.x - 30.0).abs() < f64::EPSILON);
        let children = group.ungroup();
        match (&children[0], &children[1]) {
            (Drawable::Rect(r), Drawable::Circle(c)) => {
                assert!((r.x - 30.0).abs() < f64::EPSILON);
                assert!((r.y - 40.0).abs() < f64::EPSILON);
                assert!((c.x - 100.0).abs() < f64::EPSILON);
                assert!((c.y - 100.0).abs() < f64::EPSILON);
            }
            _ => panic!("children reordered"),
        }
    }

    #[test]
    fn test_empty_group_bounds() {
        let mut group = Group::from_objects(Vec::new());
        group.x = 7.0;
        group.y = 9.0;
        let b = group.bounds();
        assert_eq!(b, Bounds::new(7.0, 9.0, 0.0, 0.0));
        assert!(!group.is_valid());
    }

    #[test]
    fn test_nested_group_offsets() {
        let inner = Group::from_objects(rect_and_circle());
        let mut outer = Group::from_objects(vec![inner.into(), Rectangle::new(200.0, 0.0, 10.0, 10.0).into()]);
        outer.offset(10.0, 10.0);
        let b = outer.bounds();
        assert!((b.x - 10.0).abs() < f64::EPSILON);
        assert!((b.right() - 220.0).abs() < f64::EPSILON);
    }
}
