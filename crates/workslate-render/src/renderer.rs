//! Backend-neutral rendering interface for slides.

use kurbo::{Affine, Size};
use peniko::Color;
use thiserror::Error;
use workslate_core::background::GridType;
use workslate_core::editor::Editor;
use workslate_core::shapes::Drawable;

/// Failures raised by a rendering backend.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer setup failed: {0}")]
    InitFailed(String),
    #[error("could not draw frame: {0}")]
    RenderFailed(String),
    #[error("surface unavailable: {0}")]
    Surface(String),
}

pub type RenderResult<T> = Result<T, RendererError>;

/// Everything a backend needs to draw one frame of the editor.
pub struct RenderContext<'a> {
    /// The editor whose current slide is drawn.
    pub editor: &'a Editor,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Surface pixels per logical pixel.
    pub scale_factor: f64,
    /// Paper colour behind the grid.
    pub background_color: Color,
    pub grid_type: GridType,
    pub grid_size: f64,
    /// Selection frame and handle colour.
    pub selection_color: Color,
    /// Selection frame colour for locked objects.
    pub locked_color: Color,
    /// Fill of hovered rotate handles.
    pub hover_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Colours and grid come from the editor's background settings.
    pub fn new(editor: &'a Editor, viewport_size: Size) -> Self {
        let background = editor.background();
        Self {
            editor,
            viewport_size,
            scale_factor: 1.0,
            background_color: background.grid_type().paper_color(),
            grid_type: background.grid_type(),
            grid_size: background.grid_size,
            selection_color: Color::from_rgb8(0x00, 0x7a, 0xcc),
            locked_color: Color::from_rgb8(0xff, 0x00, 0x00),
            hover_color: Color::from_rgb8(0xf5, 0x9e, 0x0b),
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, grid_type: GridType, grid_size: f64) -> Self {
        self.grid_type = grid_type;
        self.grid_size = grid_size;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Transform from logical canvas coordinates to surface pixels.
    pub fn view_transform(&self) -> Affine {
        Affine::scale(self.scale_factor)
    }
}

/// A backend that turns the editor state into draw commands.
pub trait Renderer: Send + Sync {
    /// Record the frame's draw commands; the static layer is reused while
    /// nothing it depends on has changed.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Clear colour for the surface.
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Drawing of individual slide objects.
pub trait ShapeRenderer {
    fn render_object(&mut self, obj: &Drawable, transform: Affine);
}
