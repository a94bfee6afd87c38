//! In-place text editing.

use super::{Action, Editor};
use crate::document::ObjectIndex;
use crate::shapes::{Drawable, SerializableColor, Text};
use kurbo::Point;

/// A text object open in the editor. Edits go to a draft that replaces the
/// original (or is appended) when the entry is finalized.
#[derive(Debug, Clone)]
pub struct TextEntry {
    draft: Text,
    existing: Option<ObjectIndex>,
}

impl TextEntry {
    pub fn draft(&self) -> &Text {
        &self.draft
    }

    pub(super) fn draft_mut(&mut self) -> &mut Text {
        &mut self.draft
    }

    /// Index of the object being re-edited, if any.
    pub fn existing(&self) -> Option<ObjectIndex> {
        self.existing
    }
}

impl Editor {
    /// Open the editor on an existing text object, or on a new one at
    /// `position`. An entry already open is finalized first.
    pub fn start_text_entry(&mut self, position: Point, existing: Option<ObjectIndex>) -> Vec<Action> {
        let mut actions = self.finalize_text_entry();

        let existing_text = existing.and_then(|i| self.document.get(i).and_then(Drawable::as_text).map(|t| (i, t.clone())));
        let entry = match existing_text {
            Some((index, text)) => TextEntry { draft: text, existing: Some(index) },
            None => {
                let mut draft = Text::new(position, String::new(), self.settings.text_size);
                draft.font_family = self.settings.font_family.clone();
                draft.color = self.settings.color;
                TextEntry { draft, existing: None }
            }
        };
        self.text_entry = Some(entry);
        self.needs_bake = true;
        actions.extend([Action::TextEditStarted, Action::RenderNeeded]);
        actions
    }

    /// Replace the text being edited.
    pub fn update_text_entry(&mut self, text: impl Into<String>) -> Vec<Action> {
        match &mut self.text_entry {
            Some(entry) => {
                entry.draft.set_text(text.into());
                vec![Action::RenderNeeded]
            }
            None => Vec::new(),
        }
    }

    /// Append typed characters to the text being edited.
    pub fn type_text(&mut self, input: &str) -> Vec<Action> {
        let Some(entry) = &self.text_entry else {
            return Vec::new();
        };
        let text = format!("{}{}", entry.draft.text, input);
        self.update_text_entry(text)
    }

    pub fn backspace(&mut self) -> Vec<Action> {
        let Some(entry) = &self.text_entry else {
            return Vec::new();
        };
        let mut text = entry.draft.text.clone();
        text.pop();
        self.update_text_entry(text)
    }

    /// Close the editor, writing the draft back. Blank text removes the
    /// object being edited, or adds nothing for a new entry.
    pub fn finalize_text_entry(&mut self) -> Vec<Action> {
        let Some(entry) = self.text_entry.take() else {
            return Vec::new();
        };
        let blank = entry.draft.text.trim().is_empty();
        let mut actions = vec![Action::TextEditFinished];

        match entry.existing {
            Some(index) if blank => {
                self.document.remove(&[index]);
                if !self.selection.is_empty() {
                    self.selection.clear();
                    actions.push(Action::SelectionChanged);
                }
            }
            Some(index) => {
                if let Some(slot) = self.document.get_mut(index) {
                    *slot = entry.draft.into();
                }
            }
            None if blank => {}
            None => {
                self.document.push(entry.draft.into());
            }
        }

        self.commit(&mut actions);
        actions
    }

    /// Drop the open entry without writing it back.
    pub(super) fn close_text_entry(&mut self) {
        if self.text_entry.take().is_some() {
            self.needs_bake = true;
        }
    }

    /// Apply `edit` to the text being edited, or to every selected text
    /// object (committing the change).
    fn edit_text_style(&mut self, edit: impl Fn(&mut Text)) -> Vec<Action> {
        if let Some(entry) = &mut self.text_entry {
            edit(&mut entry.draft);
            entry.draft.invalidate_cache();
            return vec![Action::RenderNeeded];
        }
        let mut changed = false;
        for &index in self.selection.indices() {
            if let Some(text) = self.document.get_mut(index).and_then(Drawable::as_text_mut) {
                edit(text);
                text.invalidate_cache();
                changed = true;
            }
        }
        let mut actions = Vec::new();
        if changed {
            self.commit(&mut actions);
        }
        actions
    }

    pub fn toggle_bold(&mut self) -> Vec<Action> {
        self.edit_text_style(|t| t.font_weight = t.font_weight.toggled())
    }

    pub fn toggle_italic(&mut self) -> Vec<Action> {
        self.edit_text_style(|t| t.font_style = t.font_style.toggled())
    }

    pub fn set_text_color(&mut self, color: SerializableColor) -> Vec<Action> {
        self.edit_text_style(|t| t.color = color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, PointerEvent};
    use crate::shapes::FontWeight;
    use crate::tools::ToolKind;

    fn click(editor: &mut Editor, x: f64, y: f64) -> Vec<Action> {
        let position = Point::new(x, y);
        let mut actions = editor.dispatch(PointerEvent::Down { position, button: MouseButton::Left });
        actions.extend(editor.dispatch(PointerEvent::Up { position, button: MouseButton::Left }));
        actions
    }

    #[test]
    fn test_new_text_committed_on_click_elsewhere() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Text);
        click(&mut editor, 100.0, 100.0);
        assert!(editor.text_entry().is_some());
        editor.type_text("Hello");
        editor.type_text("!");
        editor.backspace();

        let actions = click(&mut editor, 400.0, 400.0);
        assert!(actions.contains(&Action::TextEditFinished));
        assert!(editor.text_entry().is_none());
        let text = editor.current_slide()[0].as_text().unwrap();
        assert_eq!(text.text, "Hello");
        assert!((text.font_size - 36.0).abs() < f64::EPSILON);
        assert_eq!(text.font_family, "Lexend");
        assert_eq!(editor.current_slide().len(), 1);
    }

    #[test]
    fn test_blank_entry_adds_nothing() {
        let mut editor = Editor::default();
        editor.start_text_entry(Point::new(10.0, 10.0), None);
        editor.update_text_entry("   ");
        editor.finalize_text_entry();
        assert!(editor.current_slide().is_empty());
        assert!(editor.finalize_text_entry().is_empty());
    }

    #[test]
    fn test_reedit_existing_text() {
        let mut editor = Editor::default();
        editor.document.push(Text::new(Point::new(0.0, 0.0), "one".into(), 20.0).into());
        editor.set_tool(ToolKind::Text);
        click(&mut editor, 5.0, 5.0);
        assert_eq!(editor.text_entry().unwrap().existing(), Some(0));
        assert!(editor.is_live(0));

        editor.update_text_entry("two");
        editor.finalize_text_entry();
        assert_eq!(editor.current_slide()[0].as_text().unwrap().text, "two");
        assert_eq!(editor.current_slide().len(), 1);

        click(&mut editor, 5.0, 5.0);
        editor.update_text_entry("");
        editor.finalize_text_entry();
        assert!(editor.current_slide().is_empty());
    }

    #[test]
    fn test_bold_applies_to_entry_then_selection() {
        let mut editor = Editor::default();
        editor.start_text_entry(Point::new(0.0, 0.0), None);
        editor.type_text("hi");
        editor.toggle_bold();
        assert_eq!(editor.text_entry().unwrap().draft().font_weight, FontWeight::Bold);
        editor.finalize_text_entry();

        editor.selection.select(0);
        let actions = editor.toggle_bold();
        assert!(actions.contains(&Action::HistoryCommitted));
        assert_eq!(editor.current_slide()[0].as_text().unwrap().font_weight, FontWeight::Normal);

        editor.set_text_color(SerializableColor::red());
        assert_eq!(editor.current_slide()[0].color(), Some(SerializableColor::red()));
    }
}
