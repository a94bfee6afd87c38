//! Eraser: removes objects under the cursor and splits strokes it crosses.

use crate::document::Slide;
use crate::geometry::Bounds;
use crate::shapes::{Drawable, Freehand, MIN_SHAPE_SIZE, ShapeTrait};
use kurbo::Point;

/// A run of points is kept only if its box spans more than this in x or y.
fn is_fragment_valid(points: &[Point]) -> bool {
    if points.len() < 2 {
        return false;
    }
    Bounds::from_points(points).is_some_and(|b| b.w > MIN_SHAPE_SIZE || b.h > MIN_SHAPE_SIZE)
}

/// Split a stroke around `point`. Returns `None` when no point of the stroke
/// lies within `radius`, otherwise the surviving fragments (possibly none).
pub fn split_path(path: &Freehand, point: Point, radius: f64) -> Option<Vec<Freehand>> {
    let mut fragments = Vec::new();
    let mut run: Vec<Point> = Vec::new();
    let mut touched = false;

    for &p in &path.points {
        if p.distance(point) > radius {
            run.push(p);
        } else {
            touched = true;
            let closed = std::mem::take(&mut run);
            if is_fragment_valid(&closed) {
                fragments.push(path.fragment(closed));
            }
        }
    }
    if !touched {
        return None;
    }
    if is_fragment_valid(&run) {
        fragments.push(path.fragment(run));
    }
    Some(fragments)
}

/// Erase at `point` across every unlocked object of `slide`.
/// Returns whether the slide changed.
pub fn erase_at(slide: &mut Slide, point: Point, radius: f64) -> bool {
    let mut changed = false;
    let mut survivors = Vec::with_capacity(slide.len());

    for obj in slide.drain(..) {
        if obj.is_locked() {
            survivors.push(obj);
            continue;
        }
        match obj {
            Drawable::Path(path) => {
                if !path.bounds().inflate(radius, radius).contains(point) {
                    survivors.push(Drawable::Path(path));
                    continue;
                }
                match split_path(&path, point, radius) {
                    Some(fragments) => {
                        changed = true;
                        survivors.extend(fragments.into_iter().map(Drawable::Path));
                    }
                    None => survivors.push(Drawable::Path(path)),
                }
            }
            other => {
                if other.hit_test(point) {
                    changed = true;
                } else {
                    survivors.push(other);
                }
            }
        }
    }

    *slide = survivors;
    changed
}
