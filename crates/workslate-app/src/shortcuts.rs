//! Keyboard shortcut registry and documentation.

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("V", false, false, "Select tool"),
            Shortcut::new("P", false, false, "Pen"),
            Shortcut::new("H", false, false, "Highlighter"),
            Shortcut::new("E", false, false, "Eraser"),
            Shortcut::new("R", false, false, "Rectangle"),
            Shortcut::new("C", false, false, "Circle"),
            Shortcut::new("L", false, false, "Line"),
            Shortcut::new("G", false, false, "Polygon"),
            Shortcut::new("T", false, false, "Text"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("O", true, false, "Open project..."),
            Shortcut::new("S", true, false, "Save project..."),
            Shortcut::new("S", true, true, "Export slide as PNG..."),
            Shortcut::new("I", true, false, "Import image..."),
            Shortcut::new("D", true, false, "Duplicate selection"),
            Shortcut::new("G", true, false, "Group selection"),
            Shortcut::new("G", true, true, "Ungroup selection"),
            Shortcut::new("L", true, false, "Lock / unlock selection"),
            Shortcut::new("T", true, false, "Translate selected text"),
            Shortcut::new("K", true, false, "Ask the assistant about selected text"),
            Shortcut::new("F", false, false, "Flip horizontally"),
            Shortcut::new("F", false, true, "Flip vertically"),
            Shortcut::new("[", false, false, "Send to back"),
            Shortcut::new("]", false, false, "Bring to front"),
            Shortcut::new("B", false, false, "Toggle physics"),
            Shortcut::new("K", false, false, "Cycle background"),
            Shortcut::new("1", false, false, "Toggle ruler"),
            Shortcut::new("2", false, false, "Toggle protractor"),
            Shortcut::new("3", false, false, "Toggle compass"),
            Shortcut::new("Delete", false, false, "Delete selection"),
            Shortcut::new("PageUp", false, false, "Previous slide"),
            Shortcut::new("PageDown", false, false, "Next slide"),
            Shortcut::new("Escape", false, false, "Cancel current action"),
            Shortcut::new("Double-click", false, false, "Edit text"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
