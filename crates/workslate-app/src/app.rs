//! Core application state and lifecycle.

use kurbo::{Point, Size};
use std::sync::Arc;
use thiserror::Error;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowId};
use workslate_core::assistant::{AssistantError, CHAT_FALLBACK_REPLY, ChatSession, Language};
use workslate_core::config::EditorConfig;
use workslate_core::editor::{Action, Editor};
use workslate_core::input::{CursorIcon, Modifiers};
use workslate_core::shapes::PenType;
use workslate_core::storage::{FileStorage, LocalStore};
use workslate_core::tools::ToolKind;
use workslate_render::{RenderContext, RenderResult, Renderer, RendererError, VelloRenderer};

use crate::event_handler::{Command, EventHandler, TextInput, command_for_key, text_input_for_key};
use crate::export;
use crate::file_ops;
use crate::net::{AssistantJob, AssistantReply, AssistantWorker, HttpAssistant};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Events sent to the event loop from other threads.
#[derive(Debug)]
pub enum UserEvent {
    Assistant(AssistantReply),
}

/// Window settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl AppConfig {
    pub fn from_editor_config(config: &EditorConfig) -> Self {
        Self {
            title: "Workslate".to_string(),
            width: config.canvas_width.round() as u32,
            height: config.canvas_height.round() as u32,
        }
    }
}

/// Window, surface and renderers; exists once the window has been created.
struct GpuState {
    window: Arc<Window>,
    surface: RenderSurface<'static>,
    vello_renderer: vello::Renderer,
    scene_renderer: VelloRenderer,
    /// Texture blitter for RGBA->surface format conversion
    texture_blitter: vello::wgpu::util::TextureBlitter,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    editor: Editor,
    input: EventHandler,
    language: Language,
    chat: ChatSession,
    worker: Option<AssistantWorker>,
    render_cx: vello::util::RenderContext,
    gpu: Option<GpuState>,
}

fn cursor_icon(icon: CursorIcon) -> winit::window::CursorIcon {
    match icon {
        CursorIcon::Default => winit::window::CursorIcon::Default,
        CursorIcon::Grab => winit::window::CursorIcon::Grab,
        CursorIcon::EwResize => winit::window::CursorIcon::EwResize,
        CursorIcon::NwseResize => winit::window::CursorIcon::NwseResize,
        CursorIcon::Move => winit::window::CursorIcon::Move,
        CursorIcon::Crosshair => winit::window::CursorIcon::Crosshair,
    }
}

fn modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

fn open_store(config: &EditorConfig) -> Option<LocalStore> {
    match FileStorage::default_location() {
        Ok(storage) => Some(LocalStore::with_key(Box::new(storage), config.storage_key.clone())),
        Err(e) => {
            log::warn!("Local storage unavailable, slides will not persist: {e}");
            None
        }
    }
}

fn spawn_worker(config: &EditorConfig, proxy: EventLoopProxy<UserEvent>) -> Option<AssistantWorker> {
    let assistant = match HttpAssistant::new(&config.assistant) {
        Ok(assistant) => assistant,
        Err(e) => {
            log::error!("Assistant unavailable: {e}");
            return None;
        }
    };
    let deliver = move |reply| proxy.send_event(UserEvent::Assistant(reply)).is_ok();
    match AssistantWorker::spawn(Arc::new(assistant), deliver) {
        Ok(worker) => Some(worker),
        Err(e) => {
            log::error!("Failed to start assistant worker: {e}");
            None
        }
    }
}

impl App {
    /// Build the editor (restoring persisted slides) and the assistant worker.
    pub fn new(config: &EditorConfig, proxy: EventLoopProxy<UserEvent>) -> Self {
        let mut editor = Editor::new(config);
        if let Some(store) = open_store(config) {
            editor = editor.with_store(store);
        }
        Self {
            config: AppConfig::from_editor_config(config),
            editor,
            input: EventHandler::new(),
            language: Language::from_name(&config.assistant.language),
            chat: ChatSession::new(config.assistant.level),
            worker: spawn_worker(config, proxy),
            render_cx: vello::util::RenderContext::new(),
            gpu: None,
        }
    }

    /// Run the application.
    pub fn run(config: &EditorConfig) -> Result<(), AppError> {
        let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
        let mut app = App::new(config, event_loop.create_proxy());
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<GpuState, RendererError> {
        let attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| RendererError::InitFailed(e.to_string()))?,
        );

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };
        log::info!("Surface size: {}x{}", width, height);

        let surface = pollster::block_on(self.render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        ))
        .map_err(|e| RendererError::Surface(e.to_string()))?;

        let device = &self.render_cx.devices[surface.dev_id].device;
        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(e.to_string()))?;
        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let scale = window.scale_factor();
        self.editor
            .set_canvas_size(Size::new(width as f64 / scale, height as f64 / scale));

        Ok(GpuState {
            window,
            surface,
            vello_renderer,
            scene_renderer: VelloRenderer::new(),
            texture_blitter,
        })
    }

    /// React to the side effects the editor asked for.
    fn apply(&mut self, actions: Vec<Action>) {
        let mut redraw = false;
        for action in actions {
            match action {
                Action::RenderNeeded => redraw = true,
                Action::SetCursor(icon) => {
                    if let Some(gpu) = &self.gpu {
                        gpu.window.set_cursor(cursor_icon(icon));
                    }
                }
                Action::SlideChanged(index) => {
                    let count = self.editor.document().slide_count();
                    log::debug!("Slide {}/{}", index + 1, count);
                    if let Some(gpu) = &self.gpu {
                        gpu.window
                            .set_title(&format!("{} - Slide {}/{}", self.config.title, index + 1, count));
                    }
                }
                Action::ToolChanged(tool) => log::debug!("Tool: {}", tool.name()),
                Action::PhysicsChanged(active) => log::debug!("Physics active: {active}"),
                Action::Notify(notice) => file_ops::show_notice(&notice),
                Action::SelectionChanged
                | Action::TextEditStarted
                | Action::TextEditFinished
                | Action::HistoryCommitted => {}
            }
        }
        if redraw {
            self.request_redraw();
        }
    }

    fn request_redraw(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn execute(&mut self, command: Command) {
        let actions = match command {
            Command::Tool(tool) => {
                if tool == ToolKind::Pen {
                    self.editor.set_pen_type(PenType::Pen);
                }
                self.editor.set_tool(tool)
            }
            Command::Highlighter => {
                self.editor.set_pen_type(PenType::Highlighter);
                self.editor.set_tool(ToolKind::Pen)
            }
            Command::Undo => self.editor.undo(),
            Command::Redo => self.editor.redo(),
            Command::Open => match file_ops::open_project() {
                Some(json) => self.editor.load_project(&json),
                None => Vec::new(),
            },
            Command::Save => {
                match self.editor.export_project() {
                    Ok(json) => file_ops::save_project(&json),
                    Err(e) => log::error!("Failed to serialize project: {e}"),
                }
                Vec::new()
            }
            Command::ExportPng => {
                self.export_slide();
                Vec::new()
            }
            Command::ImportImage => match file_ops::pick_image() {
                Some(bytes) => self.editor.insert_image(&bytes),
                None => Vec::new(),
            },
            Command::Duplicate => self.editor.duplicate_selected(),
            Command::Group => self.editor.group_selected(),
            Command::Ungroup => self.editor.ungroup_selected(),
            Command::ToggleLock => self.editor.toggle_lock(),
            Command::Translate => self.translate_selection(),
            Command::Ask => self.ask_assistant(),
            Command::Delete => self.editor.delete_selected(),
            Command::Cancel => self.editor.cancel_current_action(),
            Command::PrevSlide => self.editor.prev_slide(),
            Command::NextSlide => self.editor.next_slide(),
            Command::FlipHorizontal => self.editor.flip_selected(true),
            Command::FlipVertical => self.editor.flip_selected(false),
            Command::SendToBack => self.editor.send_to_back(),
            Command::BringToFront => self.editor.bring_to_front(),
            Command::TogglePhysics => self.editor.toggle_physics(),
            Command::CycleGrid => self.editor.cycle_grid_type(),
            Command::ToggleMathTool(kind) => {
                self.editor.math_tools.toggle(kind);
                vec![Action::RenderNeeded]
            }
        };
        self.apply(actions);
    }

    fn translate_selection(&mut self) -> Vec<Action> {
        match self.editor.begin_translation(self.language) {
            Ok(ticket) => self.submit_job(AssistantJob::Translate(ticket)),
            Err(notice) => vec![Action::Notify(notice)],
        }
    }

    fn ask_assistant(&mut self) -> Vec<Action> {
        let ticket = match self.editor.begin_chat() {
            Ok(ticket) => ticket,
            Err(notice) => return vec![Action::Notify(notice)],
        };
        match self.chat.ask(&ticket.question) {
            Some(request) => self.submit_job(AssistantJob::Chat(ticket, request)),
            None => self.editor.finish_chat(&ticket, CHAT_FALLBACK_REPLY),
        }
    }

    /// Queue a job on the worker. A job that cannot be queued fails at once.
    fn submit_job(&mut self, job: AssistantJob) -> Vec<Action> {
        let rejected = match &self.worker {
            Some(worker) => worker.submit(job).err(),
            None => Some(job),
        };
        let Some(job) = rejected else {
            return vec![Action::RenderNeeded];
        };
        let error = AssistantError::Request("assistant unavailable".to_string());
        let reply = match job {
            AssistantJob::Translate(ticket) => AssistantReply::Translated(ticket, Err(error)),
            AssistantJob::Chat(ticket, _) => AssistantReply::Answered(ticket, Err(error)),
        };
        self.handle_reply(reply)
    }

    fn handle_reply(&mut self, reply: AssistantReply) -> Vec<Action> {
        match reply {
            AssistantReply::Translated(ticket, result) => self.editor.finish_translation(&ticket, result),
            AssistantReply::Answered(ticket, result) => {
                let answer = self.chat.reply_or_fallback(result).to_string();
                self.editor.finish_chat(&ticket, &answer)
            }
        }
    }

    /// Render the current slide offscreen at window size and save it as PNG.
    fn export_slide(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let width = gpu.surface.config.width;
        let height = gpu.surface.config.height;
        let scale = gpu.window.scale_factor();
        let logical = Size::new(width as f64 / scale, height as f64 / scale);
        let ctx = RenderContext::new(&self.editor, logical).with_scale_factor(scale);
        let scene = gpu.scene_renderer.build_export_scene(&ctx);

        let device_handle = &self.render_cx.devices[gpu.surface.dev_id];
        let image = match export::render_scene_to_image(
            &device_handle.device,
            &device_handle.queue,
            &mut gpu.vello_renderer,
            &scene,
            width,
            height,
        ) {
            Ok(image) => image,
            Err(e) => {
                log::error!("Slide export failed: {e}");
                return;
            }
        };
        match export::encode_png(&image) {
            Ok(png) => {
                let name = export::slide_file_name(self.editor.document().current_index());
                file_ops::save_png(&png, &name);
            }
            Err(e) => log::error!("Failed to encode PNG: {e}"),
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let mods = self.input.modifiers;
        if self.editor.text_entry().is_some() {
            let Some(input) = text_input_for_key(&event.logical_key, event.text.as_deref(), mods) else {
                return;
            };
            let actions = match input {
                TextInput::Insert(text) => self.editor.type_text(&text),
                TextInput::Backspace => self.editor.backspace(),
                TextInput::ToggleBold => self.editor.toggle_bold(),
                TextInput::ToggleItalic => self.editor.toggle_italic(),
                TextInput::Finish => self.editor.finalize_text_entry(),
            };
            self.apply(actions);
            return;
        }
        if let Some(command) = command_for_key(&event.logical_key, mods) {
            log::debug!("Command: {:?}", command);
            self.execute(command);
        }
    }

    fn render(&mut self) -> RenderResult<()> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        let width = gpu.surface.config.width;
        let height = gpu.surface.config.height;
        let scale = gpu.window.scale_factor();
        let logical = Size::new(width as f64 / scale, height as f64 / scale);

        let ctx = RenderContext::new(&self.editor, logical).with_scale_factor(scale);
        let base_color = ctx.background_color;
        gpu.scene_renderer.build_scene(&ctx);
        self.editor.mark_baked();
        let scene = gpu.scene_renderer.take_scene();

        let device_handle = &self.render_cx.devices[gpu.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = gpu
            .surface
            .surface
            .get_current_texture()
            .map_err(|e| RendererError::Surface(e.to_string()))?;

        let params = RenderParams {
            base_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello renders to Rgba8Unorm with storage binding; the surface
        // format may differ, so render offscreen and blit.
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_texture_view = render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        gpu.vello_renderer
            .render_to_texture(device, queue, &scene, &render_texture_view, &params)
            .map_err(|e| RendererError::RenderFailed(e.to_string()))?;

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
            label: Some("blit encoder"),
        });
        gpu.texture_blitter
            .copy(device, &mut encoder, &render_texture_view, &surface_view);
        queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        log::info!("Creating window...");
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                log::error!("{e}");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Assistant(reply) => {
                let actions = self.handle_reply(reply);
                self.apply(actions);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                let actions = self.editor.finalize_text_entry();
                self.apply(actions);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                let Some(gpu) = self.gpu.as_mut() else {
                    return;
                };
                self.render_cx
                    .resize_surface(&mut gpu.surface, size.width, size.height);
                let scale = gpu.window.scale_factor();
                self.editor.set_canvas_size(Size::new(
                    size.width as f64 / scale,
                    size.height as f64 / scale,
                ));
                gpu.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    log::warn!("Frame skipped: {e}");
                }
            }

            WindowEvent::ModifiersChanged(state) => {
                self.input.modifiers = modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let Some(gpu) = &self.gpu else {
                    return;
                };
                let logical = position.to_logical::<f64>(gpu.window.scale_factor());
                let event = self.input.cursor_moved(Point::new(logical.x, logical.y));
                let actions = self.editor.dispatch(event);
                self.apply(actions);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                for event in self.input.mouse_input(state, button) {
                    let actions = self.editor.dispatch(event);
                    self.apply(actions);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),

            WindowEvent::DroppedFile(path) => {
                if let Some(bytes) = file_ops::read_image(&path) {
                    log::info!("Dropped image: {:?}", path.file_name());
                    let actions = self.editor.insert_image(&bytes);
                    self.apply(actions);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.editor.wants_frames() {
            let actions = self.editor.tick_frame();
            self.apply(actions);
            event_loop.set_control_flow(ControlFlow::Poll);
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}
