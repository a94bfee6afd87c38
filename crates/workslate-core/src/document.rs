//! Slide collection and per-slide object operations.

use crate::geometry::{Bounds, union_bounds};
use crate::shapes::{Drawable, Group};
use kurbo::Point;

/// One page of the document; insertion order is z-order (back to front).
pub type Slide = Vec<Drawable>;

/// Position of an object within the current slide.
pub type ObjectIndex = usize;

/// Offset applied to duplicated objects.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Ordered slides plus the current-slide pointer. Always holds at least one
/// slide.
#[derive(Debug, Clone)]
pub struct Document {
    slides: Vec<Slide>,
    current: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with one empty slide.
    pub fn new() -> Self {
        Self {
            slides: vec![Vec::new()],
            current: 0,
        }
    }

    /// Create a document from existing slides, starting on the first.
    pub fn from_slides(slides: Vec<Slide>) -> Self {
        let mut doc = Self::new();
        doc.replace_slides(slides);
        doc
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Replace every slide, clamping the current index.
    pub fn replace_slides(&mut self, slides: Vec<Slide>) {
        self.slides = if slides.is_empty() { vec![Vec::new()] } else { slides };
        self.current = self.current.min(self.slides.len() - 1);
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Replace one slide's objects. Out-of-range indices are ignored.
    pub fn replace_slide(&mut self, index: usize, objects: Slide) {
        if let Some(slide) = self.slides.get_mut(index) {
            *slide = objects;
        }
    }

    pub fn current_slide(&self) -> &Slide {
        &self.slides[self.current]
    }

    pub fn current_slide_mut(&mut self) -> &mut Slide {
        &mut self.slides[self.current]
    }

    pub fn get(&self, index: ObjectIndex) -> Option<&Drawable> {
        self.current_slide().get(index)
    }

    pub fn get_mut(&mut self, index: ObjectIndex) -> Option<&mut Drawable> {
        self.current_slide_mut().get_mut(index)
    }

    /// Append an object on top of the current slide.
    pub fn push(&mut self, object: Drawable) -> ObjectIndex {
        let slide = self.current_slide_mut();
        slide.push(object);
        slide.len() - 1
    }

    /// Topmost object under `point`.
    pub fn find_object(&self, point: Point) -> Option<ObjectIndex> {
        self.current_slide().iter().rposition(|o| o.hit_test(point))
    }

    /// Objects whose unrotated bounds overlap `rect`, in z-order.
    pub fn objects_in_rect(&self, rect: Bounds) -> Vec<ObjectIndex> {
        let rect = rect.normalized();
        self.current_slide()
            .iter()
            .enumerate()
            .filter(|(_, o)| o.bounds().intersects(&rect))
            .map(|(i, _)| i)
            .collect()
    }

    /// Union of the unrotated bounds of the given objects.
    pub fn bounds_of(&self, indices: &[ObjectIndex]) -> Option<Bounds> {
        union_bounds(indices.iter().filter_map(|&i| self.get(i)).map(Drawable::bounds))
    }

    /// Move an object to the top. Returns its new index when it moved.
    pub fn bring_to_front(&mut self, index: ObjectIndex) -> Option<ObjectIndex> {
        let slide = self.current_slide_mut();
        if index + 1 >= slide.len() {
            return None;
        }
        let obj = slide.remove(index);
        slide.push(obj);
        Some(slide.len() - 1)
    }

    /// Move an object to the bottom. Returns its new index when it moved.
    pub fn send_to_back(&mut self, index: ObjectIndex) -> Option<ObjectIndex> {
        let slide = self.current_slide_mut();
        if index == 0 || index >= slide.len() {
            return None;
        }
        let obj = slide.remove(index);
        slide.insert(0, obj);
        Some(0)
    }

    /// Remove the given objects. Returns them in z-order.
    pub fn remove(&mut self, indices: &[ObjectIndex]) -> Vec<Drawable> {
        let mut sorted: Vec<ObjectIndex> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let slide = self.current_slide_mut();
        let mut removed = Vec::with_capacity(sorted.len());
        for index in sorted.into_iter().rev() {
            if index < slide.len() {
                removed.push(slide.remove(index));
            }
        }
        removed.reverse();
        removed
    }

    /// Append unlocked copies offset by [`DUPLICATE_OFFSET`]; returns their indices.
    pub fn duplicate(&mut self, indices: &[ObjectIndex]) -> Vec<ObjectIndex> {
        let copies: Vec<Drawable> = indices
            .iter()
            .filter_map(|&i| self.get(i).cloned())
            .map(|mut copy| {
                copy.attrs_mut().locked = false;
                copy.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
                copy
            })
            .collect();
        copies.into_iter().map(|c| self.push(c)).collect()
    }

    /// Group two or more objects. The group is placed on top.
    pub fn group(&mut self, indices: &[ObjectIndex]) -> Option<ObjectIndex> {
        let valid = indices.iter().filter(|&&i| i < self.current_slide().len()).count();
        if valid < 2 {
            return None;
        }
        let children = self.remove(indices);
        Some(self.push(Group::from_objects(children).into()))
    }

    /// Dissolve a group, appending its children on top. Returns their indices.
    pub fn ungroup(&mut self, index: ObjectIndex) -> Option<Vec<ObjectIndex>> {
        if !matches!(self.get(index), Some(Drawable::Group(_))) {
            return None;
        }
        let Drawable::Group(group) = self.current_slide_mut().remove(index) else {
            return None;
        };
        Some(group.ungroup().into_iter().map(|c| self.push(c)).collect())
    }

    /// Mirror unlocked objects about the center of the whole set's bounds.
    pub fn flip(&mut self, indices: &[ObjectIndex], horizontal: bool) -> bool {
        let Some(bounds) = self.bounds_of(indices) else {
            return false;
        };
        let center = bounds.center();
        let mut changed = false;
        for &i in indices {
            if let Some(obj) = self.get_mut(i).filter(|o| !o.is_locked()) {
                obj.flip(horizontal, center);
                changed = true;
            }
        }
        changed
    }

    /// Remove every object from the current slide.
    pub fn clear_slide(&mut self) {
        self.current_slide_mut().clear();
    }

    /// Append an empty slide without navigating to it.
    pub fn add_slide(&mut self) -> usize {
        self.slides.push(Vec::new());
        self.slides.len() - 1
    }

    /// Delete a slide. The last remaining slide is never deleted.
    pub fn delete_slide(&mut self, index: usize) -> bool {
        if self.slides.len() <= 1 || index >= self.slides.len() {
            return false;
        }
        self.slides.remove(index);
        if self.current >= self.slides.len() {
            self.current = self.slides.len() - 1;
        }
        true
    }

    pub fn prev_slide(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Advance one slide, appending a fresh slide past the end.
    /// Returns true when a slide was appended.
    pub fn next_slide(&mut self) -> bool {
        let appended = self.current + 1 >= self.slides.len();
        if appended {
            self.slides.push(Vec::new());
        }
        self.current += 1;
        appended
    }

    pub fn go_to_slide(&mut self, index: usize) -> bool {
        if index >= self.slides.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Line, Rectangle};

    fn doc_with(objects: Vec<Drawable>) -> Document {
        Document::from_slides(vec![objects])
    }

    #[test]
    fn test_never_empty() {
        let doc = Document::from_slides(Vec::new());
        assert_eq!(doc.slide_count(), 1);
        assert!(doc.current_slide().is_empty());
    }

    #[test]
    fn test_find_object_top_down() {
        let doc = doc_with(vec![
            Rectangle::new(0.0, 0.0, 100.0, 100.0).into(),
            Rectangle::new(50.0, 50.0, 100.0, 100.0).into(),
        ]);
        assert_eq!(doc.find_object(Point::new(75.0, 75.0)), Some(1));
        assert_eq!(doc.find_object(Point::new(10.0, 10.0)), Some(0));
        assert_eq!(doc.find_object(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_objects_in_rect_with_negative_drag() {
        let doc = doc_with(vec![
            Rectangle::new(0.0, 0.0, 10.0, 10.0).into(),
            Rectangle::new(100.0, 100.0, 10.0, 10.0).into(),
        ]);
        let hits = doc.objects_in_rect(Bounds::new(50.0, 50.0, -45.0, -45.0));
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn test_z_order() {
        let mut doc = doc_with(vec![
            Rectangle::new(0.0, 0.0, 10.0, 10.0).into(),
            Circle::new(0.0, 0.0, 10.0).into(),
            Line::new(Point::ZERO, Point::new(10.0, 0.0)).into(),
        ]);
        assert_eq!(doc.bring_to_front(0), Some(2));
        assert_eq!(doc.current_slide()[2].kind(), "rect");
        assert_eq!(doc.bring_to_front(2), None);
        assert_eq!(doc.send_to_back(2), Some(0));
        assert_eq!(doc.current_slide()[0].kind(), "rect");
        assert_eq!(doc.send_to_back(0), None);
    }

    #[test]
    fn test_duplicate_offsets_and_unlocks() {
        let mut rect = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        rect.attrs.locked = true;
        let mut doc = doc_with(vec![rect.into()]);
        let copies = doc.duplicate(&[0]);
        assert_eq!(copies, vec![1]);
        let copy = doc.get(1).unwrap();
        assert!(!copy.is_locked());
        assert!((copy.bounds().x - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_and_ungroup() {
        let mut doc = doc_with(vec![
            Line::new(Point::new(300.0, 300.0), Point::new(320.0, 300.0)).into(),
            Rectangle::new(0.0, 0.0, 50.0, 50.0).into(),
            Circle::new(100.0, 100.0, 20.0).into(),
        ]);
        let group = doc.group(&[1, 2]).unwrap();
        assert_eq!(doc.current_slide().len(), 2);
        assert_eq!(group, 1);
        let b = doc.get(group).unwrap().bounds();
        assert!((b.right() - 120.0).abs() < f64::EPSILON);
        assert!((b.bottom() - 120.0).abs() < f64::EPSILON);

        let children = doc.ungroup(group).unwrap();
        assert_eq!(children, vec![1, 2]);
        match (doc.get(1).unwrap(), doc.get(2).unwrap()) {
            (Drawable::Rect(r), Drawable::Circle(c)) => {
                assert_eq!((r.x, r.y, r.w, r.h), (0.0, 0.0, 50.0, 50.0));
                assert_eq!((c.x, c.y, c.radius), (100.0, 100.0, 20.0));
            }
            _ => panic!("unexpected children"),
        }
    }

    #[test]
    fn test_group_needs_two() {
        let mut doc = doc_with(vec![Rectangle::new(0.0, 0.0, 50.0, 50.0).into()]);
        assert_eq!(doc.group(&[0]), None);
        assert_eq!(doc.ungroup(0), None);
    }

    #[test]
    fn test_flip_single_line_about_own_center() {
        let mut doc = doc_with(vec![Line::new(Point::new(10.0, 0.0), Point::new(70.0, 40.0)).into()]);
        let cx = doc.bounds_of(&[0]).unwrap().cx();
        assert!(doc.flip(&[0], true));
        let Drawable::Line(l) = doc.get(0).unwrap() else { unreachable!() };
        assert!((l.x1 - (2.0 * cx - 10.0)).abs() < 1e-9);
        assert!((l.x2 - (2.0 * cx - 70.0)).abs() < 1e-9);
        assert!(((l.x1 + l.x2) / 2.0 - cx).abs() < 1e-9);
        assert!((l.y1 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_flip_skips_locked() {
        let mut rect = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        rect.attrs.locked = true;
        let mut doc = doc_with(vec![rect.into(), Rectangle::new(100.0, 0.0, 10.0, 10.0).into()]);
        assert!(doc.flip(&[0, 1], true));
        assert!((doc.get(0).unwrap().bounds().x).abs() < f64::EPSILON);
        assert!((doc.get(1).unwrap().bounds().x).abs() < f64::EPSILON);
    }

    #[test]
    fn test_slide_navigation() {
        let mut doc = Document::new();
        assert!(!doc.prev_slide());
        assert!(doc.next_slide());
        assert_eq!(doc.slide_count(), 2);
        assert_eq!(doc.current_index(), 1);
        assert!(doc.prev_slide());
        assert!(!doc.next_slide());
        assert_eq!(doc.slide_count(), 2);
        assert!(doc.go_to_slide(0));
        assert!(!doc.go_to_slide(9));
    }

    #[test]
    fn test_delete_slide_clamps_current() {
        let mut doc = Document::new();
        doc.add_slide();
        doc.go_to_slide(1);
        assert!(doc.delete_slide(1));
        assert_eq!(doc.current_index(), 0);
        assert!(!doc.delete_slide(0));
        assert_eq!(doc.slide_count(), 1);
    }

    #[test]
    fn test_remove_returns_z_order() {
        let mut doc = doc_with(vec![
            Rectangle::new(0.0, 0.0, 10.0, 10.0).into(),
            Circle::new(0.0, 0.0, 10.0).into(),
            Line::new(Point::ZERO, Point::new(10.0, 0.0)).into(),
        ]);
        let removed = doc.remove(&[2, 0]);
        assert_eq!(removed.iter().map(Drawable::kind).collect::<Vec<_>>(), vec!["rect", "line"]);
        assert_eq!(doc.current_slide().len(), 1);
    }

    #[test]
    fn test_remove_skips_stale_and_repeated_indices() {
        let mut doc = doc_with(vec![
            Rectangle::new(0.0, 0.0, 10.0, 10.0).into(),
            Circle::new(0.0, 0.0, 10.0).into(),
        ]);
        let removed = doc.remove(&[1, 7, 1]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].kind(), "circle");
        assert_eq!(doc.current_slide()[0].kind(), "rect");
    }
}
