//! Translation of window input into editor commands and pointer events.

use kurbo::Point;
use winit::event::{ElementState, MouseButton as WinitButton};
use winit::keyboard::{Key, NamedKey};
use workslate_core::input::{ClickTracker, Modifiers, MouseButton, PointerEvent};
use workslate_core::math_tools::MathToolKind;
use workslate_core::tools::ToolKind;

/// Keyboard-driven editor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tool(ToolKind),
    Highlighter,
    Undo,
    Redo,
    Open,
    Save,
    ExportPng,
    ImportImage,
    Duplicate,
    Group,
    Ungroup,
    ToggleLock,
    Translate,
    Ask,
    Delete,
    Cancel,
    PrevSlide,
    NextSlide,
    FlipHorizontal,
    FlipVertical,
    SendToBack,
    BringToFront,
    TogglePhysics,
    CycleGrid,
    ToggleMathTool(MathToolKind),
}

/// Key input while a text entry is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    Insert(String),
    Backspace,
    ToggleBold,
    ToggleItalic,
    Finish,
}

/// Command bound to `key`, if any.
pub fn command_for_key(key: &Key, mods: Modifiers) -> Option<Command> {
    let ctrl = mods.ctrl || mods.meta;
    match key {
        Key::Named(NamedKey::Delete) | Key::Named(NamedKey::Backspace) => Some(Command::Delete),
        Key::Named(NamedKey::Escape) => Some(Command::Cancel),
        Key::Named(NamedKey::PageUp) => Some(Command::PrevSlide),
        Key::Named(NamedKey::PageDown) => Some(Command::NextSlide),
        Key::Character(c) => {
            let c = c.to_lowercase();
            if ctrl {
                return match (c.as_str(), mods.shift) {
                    ("z", false) => Some(Command::Undo),
                    ("z", true) | ("y", _) => Some(Command::Redo),
                    ("o", _) => Some(Command::Open),
                    ("s", false) => Some(Command::Save),
                    ("s", true) => Some(Command::ExportPng),
                    ("i", _) => Some(Command::ImportImage),
                    ("d", _) => Some(Command::Duplicate),
                    ("g", false) => Some(Command::Group),
                    ("g", true) => Some(Command::Ungroup),
                    ("l", _) => Some(Command::ToggleLock),
                    ("t", _) => Some(Command::Translate),
                    ("k", _) => Some(Command::Ask),
                    _ => None,
                };
            }
            match (c.as_str(), mods.shift) {
                ("v", _) => Some(Command::Tool(ToolKind::Select)),
                ("p", _) => Some(Command::Tool(ToolKind::Pen)),
                ("h", _) => Some(Command::Highlighter),
                ("e", _) => Some(Command::Tool(ToolKind::Eraser)),
                ("r", _) => Some(Command::Tool(ToolKind::Rect)),
                ("c", _) => Some(Command::Tool(ToolKind::Circle)),
                ("l", _) => Some(Command::Tool(ToolKind::Line)),
                ("g", _) => Some(Command::Tool(ToolKind::Poly)),
                ("t", _) => Some(Command::Tool(ToolKind::Text)),
                ("f", false) => Some(Command::FlipHorizontal),
                ("f", true) => Some(Command::FlipVertical),
                ("[", _) => Some(Command::SendToBack),
                ("]", _) => Some(Command::BringToFront),
                ("b", _) => Some(Command::TogglePhysics),
                ("k", _) => Some(Command::CycleGrid),
                ("1", _) => Some(Command::ToggleMathTool(MathToolKind::Ruler)),
                ("2", _) => Some(Command::ToggleMathTool(MathToolKind::Protractor)),
                ("3", _) => Some(Command::ToggleMathTool(MathToolKind::Compass)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Text edit for `key` while typing into a text entry. `text` is the
/// character sequence the platform produced for the key press.
pub fn text_input_for_key(key: &Key, text: Option<&str>, mods: Modifiers) -> Option<TextInput> {
    let ctrl = mods.ctrl || mods.meta;
    match key {
        Key::Named(NamedKey::Escape) => Some(TextInput::Finish),
        Key::Named(NamedKey::Backspace) => Some(TextInput::Backspace),
        Key::Named(NamedKey::Enter) => Some(TextInput::Insert("\n".to_string())),
        Key::Named(NamedKey::Space) => Some(TextInput::Insert(" ".to_string())),
        Key::Character(c) if ctrl => match c.to_lowercase().as_str() {
            "b" => Some(TextInput::ToggleBold),
            "i" => Some(TextInput::ToggleItalic),
            _ => None,
        },
        Key::Character(c) => Some(TextInput::Insert(text.unwrap_or(c.as_str()).to_string())),
        _ => None,
    }
}

/// Tracks pointer position, modifiers and click timing between window
/// events.
#[derive(Debug, Default)]
pub struct EventHandler {
    position: Point,
    pub modifiers: Modifiers,
    clicks: ClickTracker,
    /// Set on the second press of a double click; delivered after release.
    pending_double_click: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn cursor_moved(&mut self, position: Point) -> PointerEvent {
        self.position = position;
        PointerEvent::Move { position }
    }

    /// Pointer events for a button transition at the last known position.
    pub fn mouse_input(&mut self, state: ElementState, button: WinitButton) -> Vec<PointerEvent> {
        let button = match button {
            WinitButton::Left => MouseButton::Left,
            WinitButton::Right => MouseButton::Right,
            WinitButton::Middle => MouseButton::Middle,
            _ => return Vec::new(),
        };
        let position = self.position;
        match state {
            ElementState::Pressed => {
                if button == MouseButton::Left {
                    self.pending_double_click = self.clicks.press(position);
                }
                vec![PointerEvent::Down { position, button }]
            }
            ElementState::Released => {
                let mut events = vec![PointerEvent::Up { position, button }];
                if button == MouseButton::Left && std::mem::take(&mut self.pending_double_click) {
                    events.push(PointerEvent::DoubleClick { position });
                }
                events
            }
        }
    }
}
