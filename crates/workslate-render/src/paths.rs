//! Geometry for drawing: object outlines, transforms and background grids.
//!
//! Everything here is backend-independent; the Vello renderer strokes and
//! fills what these functions build.

use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Size, Stroke};
use peniko::Color;
use workslate_core::background::GridType;
use workslate_core::shapes::{Drawable, Freehand, Polygon};

/// Tolerance used when flattening kurbo shapes into paths.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Smooth a stroke through the midpoints of successive samples. Strokes of
/// two points or fewer are drawn as a straight segment.
pub fn smooth_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    match points {
        [] => {}
        [only] => {
            path.move_to(*only);
            path.line_to(*only);
        }
        [a, b] => {
            path.move_to(*a);
            path.line_to(*b);
        }
        _ => {
            let n = points.len();
            path.move_to(points[0]);
            for i in 1..n - 2 {
                path.quad_to(points[i], points[i].midpoint(points[i + 1]));
            }
            path.quad_to(points[n - 2], points[n - 1]);
        }
    }
    path
}

/// Closed outline through a polygon's vertices.
pub fn polygon_path(poly: &Polygon) -> BezPath {
    let mut path = BezPath::new();
    for (i, v) in poly.vertices().into_iter().enumerate() {
        if i == 0 {
            path.move_to(v);
        } else {
            path.line_to(v);
        }
    }
    path.close_path();
    path
}

/// Straight polyline through every sample, used for eraser strokes.
pub fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(*p);
        } else {
            path.line_to(*p);
        }
    }
    path
}

/// Outline of a stroke, rect, circle, polygon or line. Text, images and
/// groups have no single outline.
pub fn outline(obj: &Drawable) -> Option<BezPath> {
    let path = match obj {
        Drawable::Path(p) => smooth_path(&p.points),
        Drawable::Rect(r) => Rect::new(r.x, r.y, r.x + r.w, r.y + r.h).to_path(PATH_TOLERANCE),
        Drawable::Circle(c) => kurbo::Circle::new((c.x, c.y), c.radius).to_path(PATH_TOLERANCE),
        Drawable::Poly(p) => polygon_path(p),
        Drawable::Line(l) => {
            let mut path = BezPath::new();
            path.move_to(l.start());
            path.line_to(l.end());
            path
        }
        Drawable::Text(_) | Drawable::Image(_) | Drawable::Group(_) => return None,
    };
    Some(path)
}

/// Transform applying an object's rotation and signed scale about its
/// bounds centre.
pub fn object_transform(obj: &Drawable) -> Affine {
    let attrs = obj.attrs();
    if attrs.rotation == 0.0 && attrs.scale_x == 1.0 && attrs.scale_y == 1.0 {
        return Affine::IDENTITY;
    }
    let center = obj.bounds().center();
    Affine::translate(center.to_vec2())
        * Affine::rotate(attrs.rotation)
        * Affine::scale_non_uniform(attrs.scale_x, attrs.scale_y)
        * Affine::translate(-center.to_vec2())
}

/// Transform for selection decorations: rotation only, scale is ignored.
pub fn selection_transform(obj: &Drawable) -> Affine {
    let rotation = obj.rotation();
    if rotation == 0.0 {
        return Affine::IDENTITY;
    }
    Affine::rotate_about(rotation, obj.bounds().center())
}

/// Round-capped stroke with an optional dash pattern.
pub fn stroke_style(width: f64, dashes: &[f64]) -> Stroke {
    let stroke = Stroke::new(width)
        .with_caps(kurbo::Cap::Round)
        .with_join(kurbo::Join::Round);
    if dashes.is_empty() {
        stroke
    } else {
        stroke.with_dashes(0.0, dashes.iter().copied())
    }
}

/// Stroke style for a freehand path.
pub fn freehand_stroke(path: &Freehand) -> Stroke {
    stroke_style(path.effective_width(), &[])
}

/// Radius, in pixels, of dot-grid dots.
pub const DOT_RADIUS: f64 = 2.0;

/// One stroked or filled layer of a background grid.
#[derive(Debug, Clone)]
pub struct GridLayer {
    pub path: BezPath,
    pub color: Color,
    /// Stroke width, or `None` to fill the path.
    pub stroke_width: Option<f64>,
}

fn line_grid(size: Size, spacing: f64, vertical: bool) -> BezPath {
    let mut path = BezPath::new();
    if spacing <= 0.0 {
        return path;
    }
    if vertical {
        let mut x = 0.0;
        while x <= size.width {
            path.move_to((x, 0.0));
            path.line_to((x, size.height));
            x += spacing;
        }
    }
    let mut y = 0.0;
    while y <= size.height {
        path.move_to((0.0, y));
        path.line_to((size.width, y));
        y += spacing;
    }
    path
}

/// Grid layers for a background style, back to front. Plain paper and the
/// webcam have none.
pub fn grid_layers(grid_type: GridType, grid_size: f64, viewport: Size) -> Vec<GridLayer> {
    if grid_size <= 0.0 {
        return Vec::new();
    }
    match grid_type {
        GridType::None | GridType::Webcam => Vec::new(),
        GridType::Square | GridType::Lined => vec![GridLayer {
            path: line_grid(viewport, grid_size, grid_type == GridType::Square),
            color: Color::from_rgb8(0xcb, 0xd5, 0xe1),
            stroke_width: Some(1.0),
        }],
        GridType::Dot => {
            let mut path = BezPath::new();
            let mut x = grid_size;
            while x < viewport.width {
                let mut y = grid_size;
                while y < viewport.height {
                    path.extend(kurbo::Circle::new((x, y), DOT_RADIUS).path_elements(PATH_TOLERANCE));
                    y += grid_size;
                }
                x += grid_size;
            }
            vec![GridLayer {
                path,
                color: Color::from_rgb8(0x64, 0x74, 0x8b),
                stroke_width: None,
            }]
        }
        GridType::GraphCyan => {
            let unit = grid_size / 2.0;
            let cyan = |alpha: f32| Color::from_rgb8(6, 182, 212).with_alpha(alpha);
            [(unit, 0.2, 0.5), (unit * 5.0, 0.5, 1.0), (unit * 10.0, 1.0, 2.0)]
                .into_iter()
                .map(|(spacing, alpha, width)| GridLayer {
                    path: line_grid(viewport, spacing, true),
                    color: cyan(alpha),
                    stroke_width: Some(width),
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;
    use workslate_core::shapes::{Line, Rectangle};

    const EPS: f64 = 1e-9;

    fn count_moves(path: &BezPath) -> usize {
        path.elements().iter().filter(|el| matches!(el, PathEl::MoveTo(_))).count()
    }

    #[test]
    fn test_smooth_path_uses_midpoints() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(30.0, 10.0),
        ];
        let path = smooth_path(&points);
        let els = path.elements();
        assert_eq!(els.len(), 3);
        match els[1] {
            PathEl::QuadTo(ctrl, end) => {
                assert_eq!(ctrl, Point::new(10.0, 0.0));
                assert_eq!(end, Point::new(15.0, 5.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(els[2], PathEl::QuadTo(_, end) if end == Point::new(30.0, 10.0)));
    }

    #[test]
    fn test_short_strokes_are_segments() {
        assert!(smooth_path(&[]).elements().is_empty());
        let dot = smooth_path(&[Point::new(5.0, 5.0)]);
        assert_eq!(dot.elements().len(), 2);
        let seg = smooth_path(&[Point::ZERO, Point::new(3.0, 4.0)]);
        assert!(matches!(seg.elements()[1], PathEl::LineTo(_)));
    }

    #[test]
    fn test_polygon_path_closed() {
        let poly = Polygon::new(0.0, 0.0, 10.0, 5);
        let path = polygon_path(&poly);
        assert_eq!(path.elements().len(), 6);
        assert!(matches!(path.elements().last(), Some(PathEl::ClosePath)));
        match path.elements()[0] {
            PathEl::MoveTo(p) => assert!((p.y + 10.0).abs() < EPS),
            _ => panic!("expected move"),
        }
    }

    #[test]
    fn test_identity_transform_for_plain_objects() {
        let rect: Drawable = Rectangle::new(0.0, 0.0, 10.0, 10.0).into();
        assert_eq!(object_transform(&rect), Affine::IDENTITY);
    }

    #[test]
    fn test_transform_flips_about_center() {
        let mut rect: Drawable = Rectangle::new(0.0, 0.0, 10.0, 10.0).into();
        rect.attrs_mut().scale_x = -1.0;
        let t = object_transform(&rect);
        let p = t * Point::new(0.0, 3.0);
        assert!((p.x - 10.0).abs() < EPS && (p.y - 3.0).abs() < EPS);
        assert_eq!(selection_transform(&rect), Affine::IDENTITY);
    }

    #[test]
    fn test_line_outline() {
        let line: Drawable = Line::new(Point::ZERO, Point::new(10.0, 0.0)).into();
        let path = outline(&line).unwrap();
        assert_eq!(path.elements().len(), 2);
    }

    #[test]
    fn test_square_and_lined_grids() {
        let viewport = Size::new(100.0, 100.0);
        let square = grid_layers(GridType::Square, 50.0, viewport);
        assert_eq!(square.len(), 1);
        assert_eq!(count_moves(&square[0].path), 6);

        let lined = grid_layers(GridType::Lined, 50.0, viewport);
        assert_eq!(count_moves(&lined[0].path), 3);

        assert!(grid_layers(GridType::None, 50.0, viewport).is_empty());
        assert!(grid_layers(GridType::Webcam, 50.0, viewport).is_empty());
    }

    #[test]
    fn test_dot_grid_skips_edges() {
        let dots = grid_layers(GridType::Dot, 50.0, Size::new(150.0, 150.0));
        assert_eq!(dots.len(), 1);
        assert!(dots[0].stroke_width.is_none());
        assert_eq!(count_moves(&dots[0].path), 4);
    }

    #[test]
    fn test_graph_cyan_has_three_tiers() {
        let layers = grid_layers(GridType::GraphCyan, 50.0, Size::new(250.0, 250.0));
        assert_eq!(layers.len(), 3);
        assert!((layers[2].stroke_width.unwrap() - 2.0).abs() < EPS);
        assert!(count_moves(&layers[0].path) > count_moves(&layers[2].path));
    }
}
