//! Vello-based renderer implementation.
//!
//! A frame is composed of two layers. The baked layer holds the grid and
//! every object that is neither selected nor being edited; it is rebuilt
//! only when the editor reports `needs_bake`. The overlay is redrawn every
//! frame and holds the live objects, selection decorations, gesture
//! previews and the measuring aids.

use crate::paths::{
    GridLayer, PATH_TOLERANCE, freehand_stroke, grid_layers, object_transform, outline, polyline,
    selection_transform, smooth_path, stroke_style,
};
use crate::renderer::{RenderContext, Renderer, ShapeRenderer};
use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Shape as KurboShape, Size, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, Layout, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use std::borrow::Cow;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;
use vello::Scene;
use workslate_core::background::{CameraFrame, GridType};
use workslate_core::editor::{Editor, Gesture, HoverTarget};
use workslate_core::import::data_url_bytes;
use workslate_core::math_tools::{Compass, MathAction, MathToolKind, Protractor, Ruler};
use workslate_core::selection::{HANDLE_SIZE, HandleKind, ROTATE_HANDLE_OFFSET, ROTATE_HANDLE_RADIUS};
use workslate_core::shapes::{Drawable, FontStyle, FontWeight, Freehand, Image, PenType, Text};

const INK: Color = Color::from_rgb8(0x1e, 0x29, 0x3b);
const TOOL_BLUE: Color = Color::from_rgb8(0x3b, 0x82, 0xf6);
const LABEL_FAMILY: &str = "sans-serif";

/// Pixels per centimetre and per inch on the ruler scale.
const PX_PER_CM: f64 = 37.8;
const PX_PER_INCH: f64 = 96.0;
/// Inset of the ruler's zero mark from its left edge.
const RULER_ZERO: f64 = 15.0;

/// What the baked layer was last built for.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BakeKey {
    viewport: Size,
    grid_type: GridType,
    grid_size: f64,
    slide: usize,
}

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The frame scene being built.
    scene: Scene,
    /// Cached static layer in logical coordinates.
    baked: Scene,
    baked_for: Option<BakeKey>,
    selection_color: Color,
    locked_color: Color,
    hover_color: Color,
    paper_color: Color,
    /// Font context for text rendering (cached to avoid re-scanning fonts).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Decoded images keyed by data URL; `None` marks a source that failed
    /// to decode.
    image_cache: HashMap<String, Option<peniko::ImageData>>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn image_data(rgba: Vec<u8>, width: u32, height: u32) -> peniko::ImageData {
    peniko::ImageData {
        data: peniko::Blob::new(Arc::new(rgba)),
        format: peniko::ImageFormat::Rgba8,
        width,
        height,
        alpha_type: peniko::ImageAlphaType::Alpha,
    }
}

fn decode_data_url(src: &str) -> Option<peniko::ImageData> {
    let bytes = data_url_bytes(src)?;
    match ::image::load_from_memory(&bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            Some(image_data(rgba.into_vec(), width, height))
        }
        Err(e) => {
            log::warn!("Failed to decode image: {e}");
            None
        }
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            baked: Scene::new(),
            baked_for: None,
            selection_color: Color::from_rgb8(0x00, 0x7a, 0xcc),
            locked_color: Color::from_rgb8(0xff, 0x00, 0x00),
            hover_color: Color::from_rgb8(0xf5, 0x9e, 0x0b),
            paper_color: GridType::default().paper_color(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            image_cache: HashMap::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// A picture of the current slide: paper, grid and every object, with no
    /// selection decorations, previews or measuring aids.
    pub fn build_export_scene(&mut self, ctx: &RenderContext) -> Scene {
        let frame = std::mem::take(&mut self.scene);
        self.paper_color = ctx.background_color;
        let editor = ctx.editor;

        let page = Rect::from_origin_size(Point::ZERO, ctx.viewport_size);
        self.scene.fill(Fill::NonZero, Affine::IDENTITY, ctx.background_color, None, &page);
        if ctx.grid_type == GridType::Webcam {
            if let Some(frame) = editor.background().frame() {
                self.render_webcam(frame, ctx.viewport_size, Affine::IDENTITY);
            }
        }
        for layer in grid_layers(ctx.grid_type, ctx.grid_size, ctx.viewport_size) {
            self.render_grid_layer(&layer);
        }
        for obj in editor.current_slide() {
            self.render_object(obj, Affine::IDENTITY);
        }

        let content = std::mem::replace(&mut self.scene, frame);
        let mut export = Scene::new();
        export.append(&content, Some(ctx.view_transform()));
        export
    }

    /// Force the baked layer to be rebuilt on the next frame.
    pub fn invalidate(&mut self) {
        self.baked_for = None;
    }

    /// Rebuild the static layer: grid plus every object that is not live.
    fn bake(&mut self, ctx: &RenderContext) {
        std::mem::swap(&mut self.scene, &mut self.baked);
        self.scene.reset();

        for layer in grid_layers(ctx.grid_type, ctx.grid_size, ctx.viewport_size) {
            self.render_grid_layer(&layer);
        }
        let editor = ctx.editor;
        for (index, obj) in editor.current_slide().iter().enumerate() {
            if !editor.is_live(index) {
                self.render_object(obj, Affine::IDENTITY);
            }
        }

        std::mem::swap(&mut self.scene, &mut self.baked);
        log::debug!("Baked slide {}", editor.document().current_index());
    }

    fn render_grid_layer(&mut self, layer: &GridLayer) {
        match layer.stroke_width {
            Some(width) => {
                self.scene
                    .stroke(&Stroke::new(width), Affine::IDENTITY, layer.color, None, &layer.path)
            }
            None => self.scene.fill(Fill::NonZero, Affine::IDENTITY, layer.color, None, &layer.path),
        }
    }

    fn render_webcam(&mut self, frame: &CameraFrame, viewport: Size, transform: Affine) {
        let dest = frame.cover_rect(viewport);
        if dest.area() <= 0.0 {
            return;
        }
        let data = image_data(frame.rgba.clone(), frame.width, frame.height);
        let image_transform = transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / frame.width as f64, dest.height() / frame.height as f64);
        self.scene.draw_image(&peniko::ImageBrush::from(data), image_transform);
    }

    fn render_freehand(&mut self, path: &Freehand, transform: Affine) {
        if path.is_eraser {
            // Eraser strokes paint the paper back over what is beneath them.
            let stroke = stroke_style(path.width * 2.0, &[]);
            self.scene.stroke(&stroke, transform, self.paper_color, None, &polyline(&path.points));
            return;
        }
        let mut color = Color::from(path.color);
        if path.pen_type == PenType::Highlighter {
            color = color.multiply_alpha(PenType::HIGHLIGHTER_OPACITY as f32);
        }
        let bez = smooth_path(&path.points);
        self.scene.stroke(&freehand_stroke(path), transform, color, None, &bez);
    }

    /// Lay out one line of text with the given style.
    fn layout_line(
        &mut self,
        line: &str,
        font_size: f64,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
        brush: &Brush,
    ) -> Layout<Brush> {
        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, line, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(Cow::Owned(format!(
            "{family}, sans-serif"
        )))));
        if weight == FontWeight::Bold {
            builder.push_default(StyleProperty::FontWeight(parley::FontWeight::BOLD));
        }
        if style == FontStyle::Italic {
            builder.push_default(StyleProperty::FontStyle(parley::FontStyle::Italic));
        }
        let mut layout = builder.build(line);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }

    /// Draw a laid-out line; `transform` places the layout's top-left.
    fn draw_layout(&mut self, layout: &Layout<Brush>, brush: &Brush, transform: Affine) {
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(brush)
                        .hint(true)
                        .transform(transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
    }

    /// Render a text object line by line and cache its measured width.
    /// Returns the width of the last line.
    fn render_text(&mut self, text: &Text, transform: Affine) -> f64 {
        let brush = Brush::Solid(text.color.into());
        let line_height = text.font_size * Text::LINE_HEIGHT;
        let mut widest = 0.0_f64;
        let mut last = 0.0;
        for (i, line) in text.lines().enumerate() {
            last = 0.0;
            if line.is_empty() {
                continue;
            }
            let layout = self.layout_line(
                line,
                text.font_size,
                &text.font_family,
                text.font_weight,
                text.font_style,
                &brush,
            );
            last = layout.width() as f64;
            widest = widest.max(last);
            let origin = Affine::translate((text.x, text.y + i as f64 * line_height));
            self.draw_layout(&layout, &brush, transform * origin);
        }
        text.set_cached_width(widest);
        last
    }

    /// Draw a short label centred on `center`.
    fn draw_label(&mut self, label: &str, center: Point, font_size: f64, bold: bool, transform: Affine) {
        let brush = Brush::Solid(Color::BLACK);
        let weight = if bold { FontWeight::Bold } else { FontWeight::Normal };
        let layout = self.layout_line(label, font_size, LABEL_FAMILY, weight, FontStyle::Normal, &brush);
        let (w, h) = (layout.width() as f64, layout.height() as f64);
        let origin = Affine::translate((center.x - w / 2.0, center.y - h / 2.0));
        self.draw_layout(&layout, &brush, transform * origin);
    }

    /// Render an image object.
    fn render_image(&mut self, image: &Image, transform: Affine) {
        let cached = self
            .image_cache
            .entry(image.src.clone())
            .or_insert_with(|| decode_data_url(&image.src))
            .clone();

        let Some(data) = cached else {
            self.render_image_placeholder(image, transform);
            return;
        };
        let scale_x = image.w / data.width as f64;
        let scale_y = image.h / data.height as f64;
        let image_transform =
            transform * Affine::translate((image.x, image.y)) * Affine::scale_non_uniform(scale_x, scale_y);
        self.scene.draw_image(&peniko::ImageBrush::from(data), image_transform);
    }

    /// Render a placeholder for images that couldn't be loaded.
    fn render_image_placeholder(&mut self, image: &Image, transform: Affine) {
        let bounds = Rect::new(image.x, image.y, image.x + image.w, image.y + image.h);
        let rect_path = bounds.to_path(PATH_TOLERANCE);
        self.scene
            .fill(Fill::NonZero, transform, Color::from_rgb8(200, 200, 200), None, &rect_path);

        let stroke = Stroke::new(2.0);
        let mut x_path = BezPath::new();
        x_path.move_to(Point::new(bounds.x0, bounds.y0));
        x_path.line_to(Point::new(bounds.x1, bounds.y1));
        x_path.move_to(Point::new(bounds.x1, bounds.y0));
        x_path.line_to(Point::new(bounds.x0, bounds.y1));
        self.scene
            .stroke(&stroke, transform, Color::from_rgb8(150, 150, 150), None, &x_path);
        self.scene
            .stroke(&stroke, transform, Color::from_rgb8(100, 100, 100), None, &rect_path);
    }

    /// Square white handle centred on `pos`.
    fn render_handle(&mut self, pos: Point, transform: Affine) {
        let half = HANDLE_SIZE / 2.0;
        let rect = Rect::new(pos.x - half, pos.y - half, pos.x + half, pos.y + half);
        self.scene.fill(Fill::NonZero, transform, Color::WHITE, None, &rect);
        self.scene
            .stroke(&Stroke::new(1.0), transform, self.selection_color, None, &rect);
    }

    /// Dashed frame, resize handle and rotate handle of a selected object.
    fn render_selection(&mut self, obj: &Drawable, rotate_hovered: bool, transform: Affine) {
        let t = transform * selection_transform(obj);
        let locked = obj.is_locked();
        let color = if locked { self.locked_color } else { self.selection_color };
        let dashed = Stroke::new(1.0).with_dashes(0.0, [5.0, 5.0]);
        let b = obj.bounds();

        if let Drawable::Line(line) = obj {
            let seg = kurbo::Line::new(line.start(), line.end());
            self.scene.stroke(&dashed, t, color, None, &seg);
            if !locked {
                self.render_handle(line.start(), t);
                self.render_handle(line.end(), t);
            }
            return;
        }

        let (frame, resize) = match obj {
            Drawable::Circle(c) => (
                kurbo::Circle::new((c.x, c.y), c.radius).to_path(PATH_TOLERANCE),
                Some(Point::new(c.x + c.radius, c.y)),
            ),
            Drawable::Poly(p) => (
                kurbo::Circle::new((p.x, p.y), p.radius).to_path(PATH_TOLERANCE),
                Some(Point::new(p.x + p.radius, p.y)),
            ),
            Drawable::Text(_) => (b.to_rect().to_path(PATH_TOLERANCE), None),
            _ => (b.to_rect().to_path(PATH_TOLERANCE), Some(Point::new(b.right(), b.bottom()))),
        };
        self.scene.stroke(&dashed, t, color, None, &frame);
        if locked {
            return;
        }

        if let Some(pos) = resize {
            self.render_handle(pos, t);
        }
        let knob = Point::new(b.cx(), b.y - ROTATE_HANDLE_OFFSET);
        let stem = kurbo::Line::new(Point::new(b.cx(), b.y), knob);
        self.scene.stroke(&Stroke::new(1.0), t, color, None, &stem);
        let fill = if rotate_hovered { self.hover_color } else { self.selection_color };
        self.scene
            .fill(Fill::NonZero, t, fill, None, &kurbo::Circle::new(knob, ROTATE_HANDLE_RADIUS));
    }

    /// Dashed marquee for box selection.
    fn render_selection_rect(&mut self, rect: Rect, transform: Affine) {
        let fill_color = Color::from_rgba8(0, 122, 204, 25);
        self.scene.fill(Fill::NonZero, transform, fill_color, None, &rect);
        let stroke = Stroke::new(1.0).with_dashes(0.0, [5.0, 5.0]);
        self.scene
            .stroke(&stroke, transform, self.selection_color, None, &rect);
    }

    fn render_eraser_cursor(&mut self, center: Point, radius: f64, transform: Affine) {
        let circle = kurbo::Circle::new(center, radius);
        self.scene
            .fill(Fill::NonZero, transform, Color::from_rgba8(255, 200, 200, 102), None, &circle);
        self.scene
            .stroke(&Stroke::new(1.0), transform, Color::from_rgb8(255, 0, 0), None, &circle);
    }

    /// Text being edited, with a frame and a caret after the last character.
    fn render_text_entry(&mut self, draft: &Text, transform: Affine) {
        let last_width = self.render_text(draft, transform);
        let b = Rect::new(draft.x, draft.y, draft.x + draft.width().max(20.0), draft.y + draft.height());
        let frame = Stroke::new(1.0).with_dashes(0.0, [4.0, 4.0]);
        self.scene
            .stroke(&frame, transform, self.selection_color, None, &b.inflate(4.0, 4.0));

        let line_height = draft.font_size * Text::LINE_HEIGHT;
        let top = draft.y + (draft.line_count() - 1) as f64 * line_height;
        let caret = Rect::new(draft.x + last_width + 1.0, top, draft.x + last_width + 2.5, top + line_height);
        self.scene.fill(Fill::NonZero, transform, Color::BLACK, None, &caret);
    }

    /// Round rotate knob shared by the ruler and protractor.
    fn render_rotate_knob(&mut self, center: Point, hovered: bool, transform: Affine) {
        let circle = kurbo::Circle::new(center, 14.0);
        self.scene.fill(Fill::NonZero, transform, Color::WHITE, None, &circle);
        let (color, width) = if hovered { (self.hover_color, 4.0) } else { (TOOL_BLUE, 2.0) };
        self.scene.stroke(&Stroke::new(width), transform, color, None, &circle);
        self.render_rotate_glyph(center, TOOL_BLUE, transform);
    }

    /// Circular arrow drawn inside rotate knobs.
    fn render_rotate_glyph(&mut self, center: Point, color: Color, transform: Affine) {
        let arc = kurbo::Arc::new(center, (6.0, 6.0), -PI / 2.0, 1.5 * PI, 0.0);
        self.scene.stroke(&Stroke::new(2.0), transform, color, None, &arc);
        let tip = Point::new(center.x - 6.0, center.y);
        let mut head = BezPath::new();
        head.move_to(Point::new(tip.x - 3.0, tip.y - 3.0));
        head.line_to(Point::new(tip.x, tip.y + 1.0));
        head.line_to(Point::new(tip.x + 3.0, tip.y - 3.0));
        self.scene.stroke(&Stroke::new(2.0), transform, color, None, &head);
    }

    /// Soft drop shadow approximated by an offset translucent copy.
    fn render_shadow(&mut self, shape: &impl KurboShape, offset: f64, alpha: u8, transform: Affine) {
        let shadow = Color::from_rgba8(0, 0, 0, alpha);
        self.scene
            .fill(Fill::NonZero, transform * Affine::translate((0.0, offset)), shadow, None, shape);
    }

    fn render_ruler(&mut self, ruler: &Ruler, rotate_hovered: bool, base: Affine) {
        let t = base * Affine::translate((ruler.x, ruler.y)) * Affine::rotate(ruler.rotation);
        let body = RoundedRect::new(0.0, 0.0, ruler.w, ruler.h, 10.0);
        self.render_shadow(&body, 5.0, 25, t);
        self.scene.fill(Fill::NonZero, t, Color::WHITE, None, &body);
        self.scene
            .stroke(&Stroke::new(1.0), t, Color::from_rgb8(0xe2, 0xe8, 0xf0), None, &body);

        let mut ticks = BezPath::new();
        let mut tick = |x: f64, y: f64, w: f64, h: f64| {
            ticks.extend(Rect::new(x, y, x + w, y + h).path_elements(PATH_TOLERANCE));
        };
        let mut labels = Vec::new();

        let mut i = 0.0;
        while i <= ruler.w - 10.0 {
            let x = i + RULER_ZERO;
            tick(x, 0.0, 1.0, 10.0);
            for j in 1..10 {
                tick(x + j as f64 * PX_PER_CM / 10.0, 0.0, 0.5, 5.0);
            }
            if i > 0.0 {
                labels.push(((i / PX_PER_CM).round().to_string(), Point::new(x, 18.0)));
            }
            i += PX_PER_CM;
        }
        let mut i = 0.0;
        while i <= ruler.w - 10.0 {
            let x = i + RULER_ZERO;
            tick(x, ruler.h - 12.0, 1.0, 12.0);
            tick(x + PX_PER_INCH / 2.0, ruler.h - 8.0, 0.5, 8.0);
            if i > 0.0 {
                labels.push(((i / PX_PER_INCH).round().to_string(), Point::new(x, ruler.h - 22.0)));
            }
            i += PX_PER_INCH;
        }
        self.scene.fill(Fill::NonZero, t, INK, None, &ticks);

        self.draw_label("0 cm", Point::new(RULER_ZERO, 21.0), 10.0, false, t);
        self.draw_label("0 in", Point::new(RULER_ZERO, ruler.h - 22.0), 10.0, false, t);
        for (label, at) in labels {
            self.draw_label(&label, at, 10.0, false, t);
        }

        self.render_rotate_knob(ruler.rotate_handle(), rotate_hovered, t);
    }

    fn render_protractor(&mut self, p: &Protractor, rotate_hovered: bool, base: Affine) {
        let t = base * Affine::translate((p.x, p.y)) * Affine::rotate(p.rotation);
        let rim = kurbo::Circle::new(Point::ZERO, p.r);
        self.render_shadow(&rim, 4.0, 20, t);
        self.scene
            .fill(Fill::NonZero, t, Color::from_rgba8(255, 255, 255, 128), None, &rim);
        self.scene
            .stroke(&Stroke::new(1.0), t, Color::from_rgb8(0xcb, 0xd5, 0xe1), None, &rim);

        let inner = kurbo::Circle::new(Point::ZERO, (p.r - 30.0).max(0.0));
        self.scene
            .fill(Fill::NonZero, t, Color::from_rgba8(224, 242, 254, 77), None, &inner);
        let band = Rect::new(-p.r + 40.0, -15.0, p.r - 40.0, 15.0);
        self.scene
            .fill(Fill::NonZero, t, Color::from_rgba8(59, 130, 246, 25), None, &band);

        let baseline = kurbo::Line::new((-p.r, 0.0), (p.r, 0.0));
        self.scene
            .stroke(&Stroke::new(1.0), t, Color::from_rgb8(255, 0, 0), None, &baseline);
        let mut cross = BezPath::new();
        cross.extend(Rect::new(-10.0, 0.0, 10.0, 1.0).path_elements(PATH_TOLERANCE));
        cross.extend(Rect::new(0.0, -10.0, 1.0, 10.0).path_elements(PATH_TOLERANCE));
        self.scene.fill(Fill::NonZero, t, INK, None, &cross);

        let mut ticks = BezPath::new();
        let mut labels = Vec::new();
        for degrees in (0..360).step_by(2) {
            let angle = (degrees as f64).to_radians();
            let len = if degrees % 10 == 0 { 10.0 } else { 5.0 };
            let mark = Affine::rotate(angle) * Rect::new(p.r - len, 0.0, p.r, 1.0).to_path(PATH_TOLERANCE);
            ticks.extend(mark.elements().iter().copied());
            if degrees % 10 == 0 {
                labels.push((degrees.to_string(), Affine::rotate(angle) * Point::new(p.r - 20.0, 0.0)));
            }
        }
        self.scene.fill(Fill::NonZero, t, Color::BLACK, None, &ticks);
        for (label, at) in labels {
            self.draw_label(&label, at, 10.0, true, t);
        }

        self.render_rotate_knob(p.rotate_handle(), rotate_hovered, t);
    }

    fn render_compass(&mut self, c: &Compass, base: Affine) {
        let t = base * Affine::translate((c.x, c.y)) * Affine::rotate(c.rotation);
        let arm = RoundedRect::new(-20.0, -20.0, c.r + 20.0, 20.0, 20.0);
        self.render_shadow(&arm, 3.0, 50, t);
        self.scene
            .fill(Fill::NonZero, t, Color::from_rgba8(226, 232, 240, 242), None, &arm);
        self.scene
            .stroke(&Stroke::new(1.0), t, Color::from_rgb8(0x94, 0xa3, 0xb8), None, &arm);

        let white = Stroke::new(2.0);
        let pivot = kurbo::Circle::new(Point::ZERO, 16.0);
        self.scene
            .fill(Fill::NonZero, t, Color::from_rgb8(0xef, 0x44, 0x44), None, &pivot);
        self.scene.stroke(&white, t, Color::WHITE, None, &pivot);
        let mut cross = BezPath::new();
        cross.move_to((0.0, -6.0));
        cross.line_to((0.0, 6.0));
        cross.move_to((-6.0, 0.0));
        cross.line_to((6.0, 0.0));
        self.scene.stroke(&white, t, Color::WHITE, None, &cross);

        let spin = Point::new(c.r * 0.4, 0.0);
        let knob = kurbo::Circle::new(spin, 14.0);
        self.scene
            .fill(Fill::NonZero, t, Color::from_rgb8(0xf5, 0x9e, 0x0b), None, &knob);
        self.scene.stroke(&white, t, Color::WHITE, None, &knob);
        self.render_rotate_glyph(spin, Color::WHITE, t);

        let grow_x = c.r * 0.7;
        let grow = Rect::new(grow_x - 12.0, -12.0, grow_x + 12.0, 12.0);
        self.scene
            .fill(Fill::NonZero, t, Color::from_rgb8(0x10, 0xb9, 0x81), None, &grow);
        self.scene.stroke(&white, t, Color::WHITE, None, &grow);
        let mut arrows = BezPath::new();
        arrows.move_to((grow_x - 7.0, 0.0));
        arrows.line_to((grow_x + 7.0, 0.0));
        for dir in [-1.0, 1.0] {
            let tip = grow_x + dir * 7.0;
            arrows.move_to((tip - dir * 3.0, -3.0));
            arrows.line_to((tip, 0.0));
            arrows.line_to((tip - dir * 3.0, 3.0));
        }
        self.scene.stroke(&Stroke::new(1.5), t, Color::WHITE, None, &arrows);

        let nib = kurbo::Circle::new((c.r, 0.0), 8.0);
        self.scene.fill(Fill::NonZero, t, INK, None, &nib);
        let mut point = BezPath::new();
        point.move_to((c.r, 0.0));
        point.line_to((c.r + 4.0, 16.0));
        point.line_to((c.r - 4.0, 16.0));
        point.close_path();
        self.scene.fill(Fill::NonZero, t, INK, None, &point);
    }

    /// Previews and cursors for the gesture in progress.
    fn render_gesture(&mut self, editor: &Editor, transform: Affine) {
        match editor.gesture() {
            Gesture::DrawingPath { path } => self.render_freehand(path, transform),
            Gesture::DrawingShape { shape, .. } => self.render_object(shape, transform),
            Gesture::MathTool { stroke: Some(stroke), .. } => self.render_freehand(stroke, transform),
            Gesture::Erasing { position } => {
                self.render_eraser_cursor(*position, editor.settings.eraser_cursor_radius(), transform)
            }
            Gesture::BoxSelecting { .. } => {
                if let Some(rect) = editor.gesture().box_select_rect() {
                    self.render_selection_rect(rect.to_rect(), transform);
                }
            }
            Gesture::MathTool { .. } | Gesture::DraggingHandle { .. } | Gesture::Idle => {}
        }
    }

    fn render_math_tools(&mut self, editor: &Editor, transform: Affine) {
        let tools = &editor.math_tools;
        let hovered = |kind| editor.hover().target == HoverTarget::MathTool(kind, MathAction::Rotate);
        if tools.show_ruler {
            self.render_ruler(&tools.ruler, hovered(MathToolKind::Ruler), transform);
        }
        if tools.show_protractor {
            self.render_protractor(&tools.protractor, hovered(MathToolKind::Protractor), transform);
        }
        if tools.show_compass {
            self.render_compass(&tools.compass, transform);
        }
    }
}

impl ShapeRenderer for VelloRenderer {
    fn render_object(&mut self, obj: &Drawable, transform: Affine) {
        let t = transform * object_transform(obj);
        match obj {
            Drawable::Path(path) => self.render_freehand(path, t),
            Drawable::Text(text) => {
                self.render_text(text, t);
            }
            Drawable::Image(image) => self.render_image(image, t),
            Drawable::Group(group) => {
                let inner = t * Affine::translate((group.x, group.y));
                for child in &group.children {
                    self.render_object(child, inner);
                }
            }
            Drawable::Rect(_) | Drawable::Circle(_) | Drawable::Poly(_) | Drawable::Line(_) => {
                let Some(path) = outline(obj) else {
                    return;
                };
                let color: Color = obj.color().map(Color::from).unwrap_or(Color::BLACK);
                let filled = match obj {
                    Drawable::Rect(r) => r.filled,
                    Drawable::Circle(c) => c.filled,
                    Drawable::Poly(p) => p.filled,
                    _ => false,
                };
                if filled {
                    self.scene.fill(Fill::NonZero, t, color, None, &path);
                }
                let dashes: &[f64] = match obj {
                    Drawable::Line(line) => line.line_type.dashes(),
                    _ => &[],
                };
                let width = obj.stroke_width().unwrap_or(1.0);
                self.scene.stroke(&stroke_style(width, dashes), t, color, None, &path);
            }
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let editor = ctx.editor;
        self.selection_color = ctx.selection_color;
        self.locked_color = ctx.locked_color;
        self.hover_color = ctx.hover_color;
        self.paper_color = ctx.background_color;

        let key = BakeKey {
            viewport: ctx.viewport_size,
            grid_type: ctx.grid_type,
            grid_size: ctx.grid_size,
            slide: editor.document().current_index(),
        };
        if editor.needs_bake() || self.baked_for != Some(key) {
            self.bake(ctx);
            self.baked_for = Some(key);
        }

        self.scene.reset();
        let view = ctx.view_transform();
        let page = Rect::from_origin_size(Point::ZERO, ctx.viewport_size);
        self.scene.fill(Fill::NonZero, view, ctx.background_color, None, &page);
        if ctx.grid_type == GridType::Webcam {
            if let Some(frame) = editor.background().frame() {
                self.render_webcam(frame, ctx.viewport_size, view);
            }
        }
        self.scene.append(&self.baked, Some(view));

        let rotate_hovered = editor.hover().target == HoverTarget::Handle(HandleKind::Rotate);
        let slide = editor.current_slide();
        for &index in editor.selection().indices() {
            if let Some(obj) = slide.get(index) {
                self.render_object(obj, view);
                self.render_selection(obj, rotate_hovered, view);
            }
        }

        self.render_gesture(editor, view);
        if let Some(entry) = editor.text_entry() {
            self.render_text_entry(entry.draft(), view);
        }
        self.render_math_tools(editor, view);
    }
}
