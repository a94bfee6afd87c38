//! The editing engine: document, history, selection and the pointer-driven
//! state machine, owned by one context object.
//!
//! Hosts feed [`PointerEvent`]s into [`Editor::dispatch`] and commands into
//! the other `Editor` methods. Each call returns the [`Action`]s the host
//! should carry out (redraw, change cursor, show a notice).

mod commands;
mod pointer;
mod text_entry;

pub use commands::{ASK_SELECTION_MESSAGE, ChatTicket, TRANSLATE_SELECTION_MESSAGE, TranslationTicket};
pub use pointer::{DragHandle, Gesture, HoverInfo, HoverTarget};
pub use text_entry::TextEntry;

use crate::background::{Background, CAMERA_DENIED_MESSAGE, CameraSource, GridType};
use crate::config::EditorConfig;
use crate::document::{Document, ObjectIndex, Slide};
use crate::history::History;
use crate::input::{CursorIcon, MouseButton, PointerEvent};
use crate::math_tools::MathTools;
use crate::physics::PhysicsController;
use crate::selection::Selection;
use crate::storage::{LocalStore, StorageError};
use crate::tools::{ToolKind, ToolSettings};
use kurbo::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Side effects requested by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SetCursor(CursorIcon),
    SelectionChanged,
    ToolChanged(ToolKind),
    SlideChanged(usize),
    TextEditStarted,
    TextEditFinished,
    HistoryCommitted,
    PhysicsChanged(bool),
    Notify(Notice),
}

pub struct Editor {
    document: Document,
    history: History,
    selection: Selection,
    pub settings: ToolSettings,
    pub math_tools: MathTools,
    background: Background,
    physics: PhysicsController,
    store: Option<LocalStore>,
    gesture: Gesture,
    hover: HoverInfo,
    text_entry: Option<TextEntry>,
    needs_bake: bool,
    canvas_size: Size,
    import_max_dimension: u32,
    history_capacity: usize,
    next_ticket: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: &EditorConfig) -> Self {
        let mut background = Background::default();
        background.grid_size = config.grid_size;
        // Webcam needs a camera source; start on paper until one is attached.
        if config.grid_type != GridType::Webcam {
            if let Err(e) = background.set_grid_type(config.grid_type) {
                log::warn!("Grid type {:?} unavailable: {e}", config.grid_type);
            }
        }

        let mut editor = Self {
            document: Document::new(),
            history: History::new(config.history_capacity),
            selection: Selection::new(),
            settings: config.tool_settings(),
            math_tools: MathTools::default(),
            background,
            physics: PhysicsController::default(),
            store: None,
            gesture: Gesture::Idle,
            hover: HoverInfo::default(),
            text_entry: None,
            needs_bake: true,
            canvas_size: config.canvas_size(),
            import_max_dimension: config.import_max_dimension,
            history_capacity: config.history_capacity,
            next_ticket: 0,
        };
        editor.reset_history();
        editor
    }

    /// Attach persistent storage and restore any saved slides from it.
    pub fn with_store(mut self, store: LocalStore) -> Self {
        if let Some(slides) = store.load() {
            log::info!("Restored {} slides from '{}'", slides.len(), store.key());
            self.document.replace_slides(slides);
            self.reset_history();
        }
        self.store = Some(store);
        self
    }

    pub fn with_camera(mut self, camera: Box<dyn CameraSource>) -> Self {
        let grid_size = self.background.grid_size;
        let grid_type = self.background.grid_type();
        self.background = Background::new(camera);
        self.background.grid_size = grid_size;
        if let Err(e) = self.background.set_grid_type(grid_type) {
            log::warn!("Grid type {grid_type:?} unavailable: {e}");
        }
        self
    }

    pub fn with_physics(mut self, physics: PhysicsController) -> Self {
        self.physics = physics;
        self
    }

    fn reset_history(&mut self) {
        self.history = History::new(self.history_capacity);
        self.history.commit(self.document.slides());
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn current_slide(&self) -> &Slide {
        self.document.current_slide()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn hover(&self) -> &HoverInfo {
        &self.hover
    }

    pub fn text_entry(&self) -> Option<&TextEntry> {
        self.text_entry.as_ref()
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        if size != self.canvas_size {
            self.canvas_size = size;
            self.needs_bake = true;
        }
    }

    /// Whether the object is drawn by the live overlay instead of the baked
    /// layer (selected, or open in the text editor).
    pub fn is_live(&self, index: ObjectIndex) -> bool {
        self.selection.contains(index) || self.is_being_edited(index)
    }

    /// Whether the object is hidden behind the open text editor.
    pub fn is_being_edited(&self, index: ObjectIndex) -> bool {
        self.text_entry.as_ref().and_then(TextEntry::existing) == Some(index)
    }

    pub fn needs_bake(&self) -> bool {
        self.needs_bake
    }

    pub fn mark_baked(&mut self) {
        self.needs_bake = false;
    }

    pub fn invalidate_bake(&mut self) {
        self.needs_bake = true;
    }

    /// Route a pointer event through the state machine.
    pub fn dispatch(&mut self, event: PointerEvent) -> Vec<Action> {
        let raw = event.position();
        let event = if self.settings.snap_to_grid && self.background.grid_type() != GridType::None {
            event.snapped(self.background.grid_size)
        } else {
            event
        };
        match event {
            PointerEvent::Down { position, button: MouseButton::Left } => {
                let mut actions = self.settle_physics();
                actions.extend(self.on_down(position));
                actions
            }
            PointerEvent::Down { .. } => self.cancel_current_action(),
            PointerEvent::Move { position } => self.on_move(position, raw),
            PointerEvent::Up { position, button: MouseButton::Left } => self.on_up(position),
            PointerEvent::Up { .. } => Vec::new(),
            PointerEvent::DoubleClick { position } => self.on_double_click(position),
        }
    }

    /// Drop every transient gesture state without touching the document.
    pub fn cancel_current_action(&mut self) -> Vec<Action> {
        if matches!(self.gesture, Gesture::Idle) {
            return Vec::new();
        }
        let was_erasing = matches!(self.gesture, Gesture::Erasing { .. });
        self.gesture = Gesture::Idle;
        let mut actions = vec![Action::RenderNeeded];
        // Erasing mutates the slide as it goes; keep what was already erased.
        if was_erasing {
            self.commit(&mut actions);
        }
        actions
    }

    /// Record a completed mutation in history and persist the slides.
    fn commit(&mut self, actions: &mut Vec<Action>) {
        // Bodies are paired with slide indices; any edit invalidates them.
        actions.extend(self.stop_physics_silently());
        self.needs_bake = true;
        if self.history.commit(self.document.slides()) {
            self.save_local();
            actions.push(Action::HistoryCommitted);
        }
        actions.push(Action::RenderNeeded);
    }

    fn save_local(&self) {
        if let Some(store) = &self.store {
            match store.save(self.document.slides()) {
                Ok(()) => {}
                Err(e @ StorageError::QuotaExceeded { .. }) => log::warn!("Storage full: {e}"),
                Err(e) => log::warn!("Failed to save slides: {e}"),
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Vec<Action> {
        self.step_history(true)
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.step_history(false)
    }

    fn step_history(&mut self, undo: bool) -> Vec<Action> {
        let mut actions = self.stop_physics_silently();
        self.close_text_entry();
        self.gesture = Gesture::Idle;
        let applied = if undo {
            self.history.undo(&mut self.document)
        } else {
            self.history.redo(&mut self.document)
        };
        if !applied {
            return actions;
        }
        self.selection.clear();
        self.needs_bake = true;
        self.save_local();
        actions.extend([
            Action::SelectionChanged,
            Action::SlideChanged(self.document.current_index()),
            Action::RenderNeeded,
        ]);
        actions
    }

    pub fn set_tool(&mut self, tool: ToolKind) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.text_entry.is_some() {
            actions.extend(self.finalize_text_entry());
        }
        self.gesture = Gesture::Idle;
        self.settings.tool = tool;
        if !self.selection.is_empty() {
            self.selection.clear();
            self.needs_bake = true;
            actions.push(Action::SelectionChanged);
        }
        actions.extend([Action::ToolChanged(tool), Action::RenderNeeded]);
        actions
    }

    pub fn toggle_snap(&mut self) -> bool {
        self.settings.snap_to_grid = !self.settings.snap_to_grid;
        self.settings.snap_to_grid
    }

    pub fn set_grid_type(&mut self, grid_type: GridType) -> Vec<Action> {
        let mut actions = vec![Action::RenderNeeded];
        if self.background.set_grid_type(grid_type).is_err() {
            actions.push(Action::Notify(Notice::warning(CAMERA_DENIED_MESSAGE)));
        }
        self.needs_bake = true;
        actions
    }

    pub fn cycle_grid_type(&mut self) -> Vec<Action> {
        let next = self.background.grid_type().next();
        self.set_grid_type(next)
    }

    pub fn set_grid_size(&mut self, size: f64) {
        if size > 0.0 {
            self.background.grid_size = size;
            self.needs_bake = true;
        }
    }

    pub fn toggle_webcam_freeze(&mut self) -> bool {
        self.background.toggle_freeze()
    }

    pub fn is_physics_active(&self) -> bool {
        self.physics.is_active()
    }

    pub fn toggle_physics(&mut self) -> Vec<Action> {
        if self.physics.is_active() {
            let mut actions = Vec::new();
            if self.physics.stop() {
                self.commit(&mut actions);
            }
            actions.push(Action::PhysicsChanged(false));
            return actions;
        }
        self.gesture = Gesture::Idle;
        self.physics.start(self.document.current_slide(), self.canvas_size);
        self.needs_bake = true;
        vec![Action::PhysicsChanged(true), Action::RenderNeeded]
    }

    /// Stop a running simulation before the pointer edits the slide, keeping
    /// the simulated positions as their own history entry.
    fn settle_physics(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.physics.stop() {
            self.commit(&mut actions);
            actions.push(Action::PhysicsChanged(false));
        }
        actions
    }

    /// Stop the simulation before a structural change, keeping the bodies'
    /// last positions in the document without a separate history entry.
    fn stop_physics_silently(&mut self) -> Vec<Action> {
        if self.physics.stop() {
            vec![Action::PhysicsChanged(false)]
        } else {
            Vec::new()
        }
    }

    /// Whether the host should keep scheduling frames for continuous tasks.
    pub fn wants_frames(&self) -> bool {
        self.physics.is_active() || self.background.is_streaming()
    }

    /// Run one frame of the continuous tasks (physics sync, webcam copy).
    pub fn tick_frame(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.physics.is_active() && self.physics.sync_frame(self.document.current_slide_mut()) {
            self.needs_bake = true;
            actions.push(Action::RenderNeeded);
        }
        if self.background.tick() && actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Drawable, Rectangle};
    use crate::storage::{MemoryStorage, Storage};
    use kurbo::Point;

    #[test]
    fn test_new_editor_defaults() {
        let editor = Editor::default();
        assert_eq!(editor.settings.tool, ToolKind::Pen);
        assert_eq!(editor.document().slide_count(), 1);
        assert!(!editor.can_undo());
        assert!(editor.needs_bake());
        assert_eq!(editor.background().grid_type(), GridType::Square);
    }

    #[test]
    fn test_store_restores_and_persists() {
        let storage = MemoryStorage::new();
        storage
            .set("workslate_slides", r##"[[{"type":"rect","x":0,"y":0,"w":20,"h":20,"color":"#000000","width":3}],[]]"##)
            .unwrap();
        let mut editor = Editor::default().with_store(LocalStore::new(Box::new(storage)));
        assert_eq!(editor.document().slide_count(), 2);
        assert_eq!(editor.current_slide().len(), 1);
        assert!(!editor.can_undo());

        editor.set_tool(ToolKind::Rect);
        editor.dispatch(PointerEvent::Down { position: Point::new(100.0, 100.0), button: MouseButton::Left });
        editor.dispatch(PointerEvent::Move { position: Point::new(150.0, 150.0) });
        let actions = editor.dispatch(PointerEvent::Up { position: Point::new(150.0, 150.0), button: MouseButton::Left });
        assert!(actions.contains(&Action::HistoryCommitted));
        assert_eq!(editor.current_slide().len(), 2);
    }

    #[test]
    fn test_full_store_keeps_editing_in_memory() {
        let storage = MemoryStorage::with_quota(8);
        let mut editor = Editor::default().with_store(LocalStore::new(Box::new(storage)));
        editor.document.push(Rectangle::new(0.0, 0.0, 50.0, 50.0).into());
        let mut actions = Vec::new();
        editor.commit(&mut actions);
        assert!(actions.contains(&Action::HistoryCommitted));
        assert!(editor.can_undo());
        assert_eq!(editor.current_slide().len(), 1);
    }

    #[test]
    fn test_corrupt_store_is_ignored() {
        let storage = MemoryStorage::new();
        storage.set("workslate_slides", "{oops").unwrap();
        let editor = Editor::default().with_store(LocalStore::new(Box::new(storage)));
        assert_eq!(editor.document().slide_count(), 1);
        assert!(editor.current_slide().is_empty());
    }

    #[test]
    fn test_undo_redo_clears_selection() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Select);
        editor.document.push(Rectangle::new(0.0, 0.0, 50.0, 50.0).into());
        let mut actions = Vec::new();
        editor.commit(&mut actions);
        editor.selection.select(0);

        let actions = editor.undo();
        assert!(actions.contains(&Action::SelectionChanged));
        assert!(editor.selection().is_empty());
        assert!(editor.current_slide().is_empty());

        editor.redo();
        assert_eq!(editor.current_slide().len(), 1);
        assert!(editor.redo().is_empty());
    }

    #[test]
    fn test_snap_to_grid() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Rect);
        assert!(editor.toggle_snap());
        editor.dispatch(PointerEvent::Down { position: Point::new(48.0, 52.0), button: MouseButton::Left });
        editor.dispatch(PointerEvent::Move { position: Point::new(141.0, 160.0) });
        editor.dispatch(PointerEvent::Up { position: Point::new(141.0, 160.0), button: MouseButton::Left });
        let bounds = editor.current_slide()[0].bounds();
        assert!((bounds.x - 50.0).abs() < 1e-9);
        assert!((bounds.w - 100.0).abs() < 1e-9);
        assert!((bounds.h - 100.0).abs() < 1e-9);

        editor.set_grid_type(GridType::None);
        editor.dispatch(PointerEvent::Down { position: Point::new(48.0, 52.0), button: MouseButton::Left });
        editor.dispatch(PointerEvent::Up { position: Point::new(141.0, 160.0), button: MouseButton::Left });
        let bounds = editor.current_slide()[1].bounds();
        assert!((bounds.x - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_webcam_without_camera_notifies() {
        let mut editor = Editor::default();
        let actions = editor.set_grid_type(GridType::Webcam);
        assert!(actions.iter().any(|a| matches!(a, Action::Notify(n) if n.message == CAMERA_DENIED_MESSAGE)));
        assert_eq!(editor.background().grid_type(), GridType::Square);
    }

    #[test]
    fn test_physics_toggle_commits_on_stop() {
        let mut editor = Editor::default();
        editor.document.push(Rectangle::new(100.0, 100.0, 50.0, 50.0).into());
        let mut actions = Vec::new();
        editor.commit(&mut actions);

        editor.toggle_physics();
        assert!(editor.is_physics_active());
        assert!(editor.wants_frames());
        for _ in 0..10 {
            assert_eq!(editor.tick_frame(), vec![Action::RenderNeeded]);
        }
        assert!(editor.current_slide()[0].bounds().y > 100.0);

        let actions = editor.toggle_physics();
        assert!(actions.contains(&Action::HistoryCommitted));
        assert!(actions.contains(&Action::PhysicsChanged(false)));
        assert!(!editor.wants_frames());
        assert!(editor.tick_frame().is_empty());

        editor.undo();
        assert!((editor.current_slide()[0].bounds().y - 100.0).abs() < 1e-9);
    }

    fn falling_pair() -> Editor {
        let mut editor = Editor::default();
        editor.document.push(Rectangle::new(100.0, 100.0, 40.0, 40.0).into());
        editor.document.push(Circle::new(600.0, 100.0, 10.0).into());
        let mut actions = Vec::new();
        editor.commit(&mut actions);
        editor.toggle_physics();
        for _ in 0..3 {
            editor.tick_frame();
        }
        editor
    }

    fn circle_center(editor: &Editor) -> Point {
        let circle = editor
            .current_slide()
            .iter()
            .find_map(|o| match o {
                Drawable::Circle(c) => Some(c),
                _ => None,
            })
            .unwrap();
        Point::new(circle.x, circle.y)
    }

    #[test]
    fn test_erasing_during_physics_leaves_other_bodies_alone() {
        let mut editor = falling_pair();
        editor.set_tool(ToolKind::Eraser);
        let rect_center = editor.current_slide()[0].bounds().center();
        let before = circle_center(&editor);

        let actions = editor.dispatch(PointerEvent::Down { position: rect_center, button: MouseButton::Left });
        assert!(actions.contains(&Action::PhysicsChanged(false)));
        assert!(!editor.is_physics_active());
        editor.dispatch(PointerEvent::Up { position: rect_center, button: MouseButton::Left });
        assert_eq!(editor.current_slide().len(), 1);

        assert!(editor.tick_frame().is_empty());
        let after = circle_center(&editor);
        assert!((after.x - 600.0).abs() < 1e-6, "circle moved to x={}", after.x);
        assert!((after.y - before.y).abs() < 1e-9);
    }

    #[test]
    fn test_delete_during_physics_stops_simulation() {
        let mut editor = falling_pair();
        let before = circle_center(&editor);
        editor.selection.select(0);

        let actions = editor.delete_selected();
        assert!(actions.contains(&Action::PhysicsChanged(false)));
        assert!(actions.contains(&Action::HistoryCommitted));
        editor.tick_frame();
        assert_eq!(circle_center(&editor), before);

        // Keyboard edits drop the simulated layout; undo returns to the last commit.
        editor.undo();
        assert_eq!(editor.current_slide().len(), 2);
        assert!((editor.current_slide()[0].bounds().y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_cancel_current_action() {
        let mut editor = Editor::default();
        editor.dispatch(PointerEvent::Down { position: Point::new(10.0, 10.0), button: MouseButton::Left });
        editor.dispatch(PointerEvent::Move { position: Point::new(30.0, 30.0) });
        assert!(matches!(editor.gesture(), Gesture::DrawingPath { .. }));

        let actions = editor.dispatch(PointerEvent::Down { position: Point::new(30.0, 30.0), button: MouseButton::Right });
        assert_eq!(actions, vec![Action::RenderNeeded]);
        assert!(matches!(editor.gesture(), Gesture::Idle));
        editor.dispatch(PointerEvent::Up { position: Point::new(30.0, 30.0), button: MouseButton::Left });
        assert!(editor.current_slide().is_empty());
        assert!(!editor.can_undo());
    }
}
