//! Selection, property, slide and collaborator commands.

use super::{Action, Editor, Gesture, Notice};
use crate::assistant::{AssistantError, Language, THINKING_PLACEHOLDER, TRANSLATING_PLACEHOLDER};
use crate::document::ObjectIndex;
use crate::import::import_image;
use crate::project::{self, ProjectError};
use crate::shapes::{Drawable, LineType, PenType, SerializableColor, Text};
use crate::tools::ToolKind;
use kurbo::Point;

/// Message shown when translation is requested without a single text selected.
pub const TRANSLATE_SELECTION_MESSAGE: &str = "Please select a single text object to translate.";

/// Message shown when the assistant is asked without a single text selected.
pub const ASK_SELECTION_MESSAGE: &str = "Please select a single text object to ask about.";

/// Gap between an inserted reply and its source text.
const REPLY_GAP: f64 = 20.0;

/// A pending translation. The placeholder text it refers to is replaced when
/// the result arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTicket {
    pub id: u64,
    slide: usize,
    index: ObjectIndex,
    /// Source text to translate.
    pub text: String,
    pub language: Language,
}

/// A pending assistant answer to a selected text.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTicket {
    pub id: u64,
    slide: usize,
    index: ObjectIndex,
    pub question: String,
}

impl Editor {
    /// Apply `edit` to each selected object and commit when any changed.
    fn edit_selected(&mut self, mut edit: impl FnMut(&mut Drawable) -> bool) -> Vec<Action> {
        let mut changed = false;
        for &index in self.selection.indices() {
            if let Some(obj) = self.document.get_mut(index) {
                changed |= edit(obj);
            }
        }
        let mut actions = Vec::new();
        if changed {
            self.commit(&mut actions);
        }
        actions
    }

    fn reselect(&mut self, indices: Vec<ObjectIndex>, actions: &mut Vec<Action>) {
        self.selection.set(indices);
        actions.push(Action::SelectionChanged);
        self.commit(actions);
    }

    pub fn bring_to_front(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(index) = self.selection.first().and_then(|i| self.document.bring_to_front(i)) {
            self.reselect(vec![index], &mut actions);
        }
        actions
    }

    pub fn send_to_back(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(index) = self.selection.first().and_then(|i| self.document.send_to_back(i)) {
            self.reselect(vec![index], &mut actions);
        }
        actions
    }

    /// Copy the selection and select the copies.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let copies = self.document.duplicate(self.selection.indices());
        if !copies.is_empty() {
            self.reselect(copies, &mut actions);
        }
        actions
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.selection.is_empty() {
            return actions;
        }
        self.document.remove(self.selection.indices());
        self.reselect(Vec::new(), &mut actions);
        actions
    }

    /// Lock or unlock the whole selection, following the first object.
    pub fn toggle_lock(&mut self) -> Vec<Action> {
        let Some(locked) = self.selection.first().and_then(|i| self.document.get(i)).map(|o| !o.is_locked())
        else {
            return Vec::new();
        };
        let mut actions = self.edit_selected(|obj| {
            obj.attrs_mut().locked = locked;
            true
        });
        actions.push(Action::SelectionChanged);
        actions
    }

    pub fn group_selected(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(index) = self.document.group(self.selection.indices()) {
            self.reselect(vec![index], &mut actions);
        }
        actions
    }

    pub fn ungroup_selected(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(children) = self.selection.single().and_then(|i| self.document.ungroup(i)) {
            self.reselect(children, &mut actions);
        }
        actions
    }

    pub fn flip_selected(&mut self, horizontal: bool) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.document.flip(self.selection.indices(), horizontal) {
            self.commit(&mut actions);
        }
        actions
    }

    /// Set the drawing colour and recolour the selection.
    pub fn set_color(&mut self, color: SerializableColor) -> Vec<Action> {
        self.settings.color = color;
        self.edit_selected(|obj| {
            obj.set_color(color);
            true
        })
    }

    /// Set the stroke width for new objects and unlocked selected ones.
    pub fn set_pen_size(&mut self, size: f64) -> Vec<Action> {
        if size <= 0.0 {
            return Vec::new();
        }
        self.settings.pen_size = size;
        self.edit_selected(|obj| {
            if obj.is_locked() || obj.stroke_width().is_none() {
                return false;
            }
            obj.set_stroke_width(size);
            true
        })
    }

    pub fn set_text_size(&mut self, size: f64) -> Vec<Action> {
        let size = size.max(Text::MIN_FONT_SIZE);
        self.settings.text_size = size;
        if let Some(entry) = &mut self.text_entry {
            entry.draft_mut().set_font_size(size);
            return vec![Action::RenderNeeded];
        }
        self.edit_selected(|obj| match obj.as_text_mut() {
            Some(text) => {
                text.set_font_size(size);
                true
            }
            None => false,
        })
    }

    pub fn set_font_family(&mut self, family: &str) -> Vec<Action> {
        self.settings.font_family = family.to_string();
        if let Some(entry) = &mut self.text_entry {
            entry.draft_mut().set_font_family(family.to_string());
            return vec![Action::RenderNeeded];
        }
        self.edit_selected(|obj| match obj.as_text_mut() {
            Some(text) => {
                text.set_font_family(family.to_string());
                true
            }
            None => false,
        })
    }

    pub fn toggle_fill(&mut self) -> Vec<Action> {
        self.edit_selected(Drawable::toggle_fill)
    }

    /// Set the style of new lines and apply it to selected lines.
    pub fn set_line_type(&mut self, line_type: LineType) -> Vec<Action> {
        self.settings.line_type = line_type;
        self.edit_selected(|obj| match obj {
            Drawable::Line(line) if line.line_type != line_type => {
                line.line_type = line_type;
                true
            }
            _ => false,
        })
    }

    pub fn set_pen_type(&mut self, pen_type: PenType) {
        self.settings.pen_type = pen_type;
    }

    pub fn set_poly_sides(&mut self, sides: u32) {
        self.settings.set_poly_sides(sides);
    }

    /// Reset per-slide state before the current slide changes.
    fn leave_slide(&mut self) -> Vec<Action> {
        let mut actions = self.stop_physics_silently();
        actions.extend(self.finalize_text_entry());
        self.gesture = Gesture::Idle;
        self.selection.clear();
        actions
    }

    fn entered_slide(&mut self, actions: &mut Vec<Action>) {
        self.needs_bake = true;
        actions.extend([
            Action::SelectionChanged,
            Action::SlideChanged(self.document.current_index()),
            Action::RenderNeeded,
        ]);
    }

    /// Append an empty slide after the last one.
    pub fn add_slide(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.document.add_slide();
        self.commit(&mut actions);
        actions
    }

    pub fn delete_slide(&mut self, index: usize) -> Vec<Action> {
        let count = self.document.slide_count();
        if count <= 1 || index >= count {
            return Vec::new();
        }
        // Indices on the current slide go stale when it or an earlier slide goes.
        let current = self.document.current_index();
        let mut actions = if index <= current { self.leave_slide() } else { Vec::new() };
        self.document.delete_slide(index);
        self.entered_slide(&mut actions);
        self.commit(&mut actions);
        actions
    }

    pub fn prev_slide(&mut self) -> Vec<Action> {
        if self.document.current_index() == 0 {
            return Vec::new();
        }
        let mut actions = self.leave_slide();
        self.document.prev_slide();
        self.entered_slide(&mut actions);
        actions
    }

    /// Advance one slide, creating a new one past the end.
    pub fn next_slide(&mut self) -> Vec<Action> {
        let mut actions = self.leave_slide();
        let appended = self.document.next_slide();
        self.entered_slide(&mut actions);
        if appended {
            self.commit(&mut actions);
        }
        actions
    }

    pub fn go_to_slide(&mut self, index: usize) -> Vec<Action> {
        if index >= self.document.slide_count() || index == self.document.current_index() {
            return Vec::new();
        }
        let mut actions = self.leave_slide();
        self.document.go_to_slide(index);
        self.entered_slide(&mut actions);
        actions
    }

    /// Remove every object from the current slide.
    pub fn clear_slide(&mut self) -> Vec<Action> {
        let mut actions = self.leave_slide();
        if self.current_slide().is_empty() {
            return actions;
        }
        self.document.clear_slide();
        actions.push(Action::SelectionChanged);
        self.commit(&mut actions);
        actions
    }

    /// Replace every slide with a parsed project. Invalid input changes
    /// nothing and produces an error notice.
    pub fn load_project(&mut self, json: &str) -> Vec<Action> {
        let slides = match project::from_json(json) {
            Ok(slides) => slides,
            Err(e) => {
                log::error!("Failed to load project: {e}");
                return vec![Action::Notify(Notice::error(format!("Invalid file: {e}")))];
            }
        };
        let mut actions = self.stop_physics_silently();
        self.close_text_entry();
        self.gesture = Gesture::Idle;
        log::info!("Loaded project with {} slides", slides.len());
        self.document.replace_slides(slides);
        self.document.go_to_slide(0);
        self.selection.clear();
        self.entered_slide(&mut actions);
        self.commit(&mut actions);
        actions
    }

    pub fn export_project(&self) -> Result<String, ProjectError> {
        project::to_json(self.document.slides())
    }

    /// Decode a raster image and place it centred on the canvas, selected.
    pub fn insert_image(&mut self, bytes: &[u8]) -> Vec<Action> {
        let image = match import_image(bytes, self.import_max_dimension, self.canvas_size) {
            Ok(image) => image,
            Err(e) => {
                log::error!("Image import failed: {e}");
                return vec![Action::Notify(Notice::error(e.to_string()))];
            }
        };
        let mut actions = self.set_tool(ToolKind::Select);
        let index = self.document.push(image.into());
        self.reselect(vec![index], &mut actions);
        actions
    }

    /// Push `placeholder` under the single selected text, styled like it.
    /// Returns the source text and the placeholder's index.
    fn insert_placeholder(&mut self, placeholder: &str, missing: &str) -> Result<(Text, ObjectIndex), Notice> {
        let source = self
            .selection
            .single()
            .and_then(|i| self.document.get(i))
            .and_then(Drawable::as_text)
            .filter(|t| !t.text.trim().is_empty())
            .cloned()
            .ok_or_else(|| Notice::warning(missing))?;

        let position = Point::new(source.x, source.y + source.height() + REPLY_GAP);
        let mut text = Text::new(position, placeholder.to_string(), source.font_size);
        text.color = source.color;
        text.font_family = source.font_family.clone();

        let index = self.document.push(text.into());
        self.needs_bake = true;
        self.next_ticket += 1;
        Ok((source, index))
    }

    /// The placeholder a ticket refers to: at its recorded index if still
    /// there, else the first one left on the slide.
    fn placeholder_mut(&mut self, slide: usize, index: ObjectIndex, placeholder: &str) -> Option<(ObjectIndex, &mut Text)> {
        let slide = self.document.slide_mut(slide)?;
        let is_placeholder = |o: &Drawable| o.as_text().is_some_and(|t| t.text == placeholder);
        let index = if slide.get(index).is_some_and(is_placeholder) {
            index
        } else {
            slide.iter().position(is_placeholder)?
        };
        let text = slide.get_mut(index).and_then(Drawable::as_text_mut)?;
        Some((index, text))
    }

    /// Insert a placeholder under the selected text and return the request
    /// to hand to the translation service.
    pub fn begin_translation(&mut self, language: Language) -> Result<TranslationTicket, Notice> {
        let (source, index) = self.insert_placeholder(TRANSLATING_PLACEHOLDER, TRANSLATE_SELECTION_MESSAGE)?;
        Ok(TranslationTicket {
            id: self.next_ticket,
            slide: self.document.current_index(),
            index,
            text: source.text,
            language,
        })
    }

    /// Write a finished translation into its placeholder.
    pub fn finish_translation(
        &mut self,
        ticket: &TranslationTicket,
        result: Result<String, AssistantError>,
    ) -> Vec<Action> {
        let Some((index, text)) = self.placeholder_mut(ticket.slide, ticket.index, TRANSLATING_PLACEHOLDER) else {
            log::warn!("Translation {} has no placeholder left", ticket.id);
            return Vec::new();
        };

        match result {
            Ok(translated) => {
                text.set_text(translated);
                let mut actions = Vec::new();
                if ticket.slide == self.document.current_index() {
                    self.selection.set(vec![index]);
                    actions.push(Action::SelectionChanged);
                }
                self.commit(&mut actions);
                actions
            }
            Err(e) => {
                log::error!("Translation failed: {e}");
                text.set_text(format!("Error: {e}"));
                self.needs_bake = true;
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Insert a "Thinking..." placeholder under the selected text and return
    /// the question to send to the assistant.
    pub fn begin_chat(&mut self) -> Result<ChatTicket, Notice> {
        let (source, index) = self.insert_placeholder(THINKING_PLACEHOLDER, ASK_SELECTION_MESSAGE)?;
        Ok(ChatTicket {
            id: self.next_ticket,
            slide: self.document.current_index(),
            index,
            question: source.text,
        })
    }

    /// Replace the ticket's placeholder with the assistant's answer.
    pub fn finish_chat(&mut self, ticket: &ChatTicket, answer: &str) -> Vec<Action> {
        let Some((_, text)) = self.placeholder_mut(ticket.slide, ticket.index, THINKING_PLACEHOLDER) else {
            log::warn!("Answer {} has no placeholder left", ticket.id);
            return Vec::new();
        };
        text.set_text(answer.to_string());
        let mut actions = Vec::new();
        self.commit(&mut actions);
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::NoticeLevel;
    use crate::shapes::{Line, Rectangle};

    const EPS: f64 = 1e-9;

    fn editor_with(objects: Vec<Drawable>) -> Editor {
        let mut editor = Editor::default();
        for obj in objects {
            editor.document.push(obj);
        }
        editor
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Drawable {
        Rectangle::new(x, y, w, h).into()
    }

    #[test]
    fn test_group_then_ungroup_restores_positions() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 50.0, 50.0), rect(100.0, 100.0, 20.0, 20.0)]);
        editor.selection.set(vec![0, 1]);
        editor.group_selected();

        assert_eq!(editor.current_slide().len(), 1);
        assert_eq!(editor.selection().indices(), &[0]);
        let b = editor.current_slide()[0].bounds();
        assert!((b.x - 0.0).abs() < EPS && (b.y - 0.0).abs() < EPS);
        assert!((b.w - 120.0).abs() < EPS && (b.h - 120.0).abs() < EPS);

        editor.ungroup_selected();
        assert_eq!(editor.current_slide().len(), 2);
        assert_eq!(editor.selection().len(), 2);
        let second = editor.current_slide()[1].bounds();
        assert!((second.x - 100.0).abs() < EPS && (second.y - 100.0).abs() < EPS);
    }

    #[test]
    fn test_group_needs_two_objects() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 50.0, 50.0)]);
        editor.selection.select(0);
        assert!(editor.group_selected().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_flip_line_horizontal() {
        let mut editor = editor_with(vec![Line::new(Point::new(0.0, 0.0), Point::new(100.0, 50.0)).into()]);
        editor.selection.select(0);
        editor.flip_selected(true);
        let Drawable::Line(line) = &editor.current_slide()[0] else {
            panic!("expected line");
        };
        assert!((line.x1 - 100.0).abs() < EPS && (line.y1 - 0.0).abs() < EPS);
        assert!((line.x2 - 0.0).abs() < EPS && (line.y2 - 50.0).abs() < EPS);
        assert!(editor.can_undo());
    }

    #[test]
    fn test_duplicate_unlocks_and_offsets() {
        let mut editor = editor_with(vec![rect(10.0, 10.0, 50.0, 50.0)]);
        editor.selection.select(0);
        editor.toggle_lock();
        assert!(editor.current_slide()[0].is_locked());

        editor.duplicate_selected();
        assert_eq!(editor.current_slide().len(), 2);
        assert_eq!(editor.selection().indices(), &[1]);
        let copy = &editor.current_slide()[1];
        assert!(!copy.is_locked());
        assert!((copy.bounds().x - 30.0).abs() < EPS);
    }

    #[test]
    fn test_delete_and_undo() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 50.0, 50.0), rect(60.0, 0.0, 50.0, 50.0)]);
        editor.reset_history();
        editor.selection.select(0);
        editor.delete_selected();
        assert_eq!(editor.current_slide().len(), 1);
        assert!(editor.selection().is_empty());
        editor.undo();
        assert_eq!(editor.current_slide().len(), 2);
    }

    #[test]
    fn test_z_order_commands() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0), rect(1.0, 0.0, 10.0, 10.0)]);
        editor.selection.select(0);
        editor.bring_to_front();
        assert_eq!(editor.selection().indices(), &[1]);
        assert!((editor.current_slide()[1].bounds().x - 0.0).abs() < EPS);
        editor.send_to_back();
        assert_eq!(editor.selection().indices(), &[0]);
        assert!(editor.bring_to_front().len() > 1);
        assert!(editor.bring_to_front().is_empty());
    }

    #[test]
    fn test_pen_size_skips_locked() {
        let mut locked = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        locked.attrs.locked = true;
        let mut editor = editor_with(vec![locked.into(), rect(20.0, 0.0, 10.0, 10.0)]);
        editor.selection.set(vec![0, 1]);
        editor.set_pen_size(8.0);
        assert!((editor.current_slide()[0].stroke_width().unwrap() - 3.0).abs() < EPS);
        assert!((editor.current_slide()[1].stroke_width().unwrap() - 8.0).abs() < EPS);
        assert!((editor.settings.pen_size - 8.0).abs() < EPS);
    }

    #[test]
    fn test_set_color_updates_settings_and_selection() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        editor.selection.select(0);
        let actions = editor.set_color(SerializableColor::red());
        assert!(actions.contains(&Action::HistoryCommitted));
        assert_eq!(editor.settings.color, SerializableColor::red());
        assert_eq!(editor.current_slide()[0].color(), Some(SerializableColor::red()));
    }

    #[test]
    fn test_line_type_applies_to_selected_lines() {
        let mut editor = editor_with(vec![Line::new(Point::ZERO, Point::new(50.0, 0.0)).into()]);
        editor.selection.select(0);
        editor.set_line_type(LineType::Dotted);
        assert_eq!(editor.settings.line_type, LineType::Dotted);
        let Drawable::Line(line) = &editor.current_slide()[0] else {
            panic!("expected line");
        };
        assert_eq!(line.line_type, LineType::Dotted);
    }

    #[test]
    fn test_slide_navigation() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        editor.selection.select(0);

        let actions = editor.next_slide();
        assert!(actions.contains(&Action::SlideChanged(1)));
        assert_eq!(editor.document().slide_count(), 2);
        assert!(editor.selection().is_empty());
        assert!(editor.current_slide().is_empty());

        assert!(editor.go_to_slide(1).is_empty());
        editor.prev_slide();
        assert_eq!(editor.document().current_index(), 0);
        assert!(editor.prev_slide().is_empty());

        editor.add_slide();
        assert_eq!(editor.document().slide_count(), 3);
        assert_eq!(editor.document().current_index(), 0);

        editor.go_to_slide(2);
        editor.delete_slide(2);
        assert_eq!(editor.document().slide_count(), 2);
        assert_eq!(editor.document().current_index(), 1);
    }

    #[test]
    fn test_last_slide_not_deleted() {
        let mut editor = Editor::default();
        assert!(editor.delete_slide(0).is_empty());
        assert_eq!(editor.document().slide_count(), 1);
    }

    #[test]
    fn test_clear_slide_is_undoable() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        editor.reset_history();
        editor.clear_slide();
        assert!(editor.current_slide().is_empty());
        editor.undo();
        assert_eq!(editor.current_slide().len(), 1);
    }

    #[test]
    fn test_load_project_replaces_slides() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        editor.next_slide();
        let json = r##"[[{"type":"circle","x":50,"y":50,"radius":10,"color":"#000000","width":3}],[]]"##;
        let actions = editor.load_project(json);
        assert!(actions.contains(&Action::HistoryCommitted));
        assert_eq!(editor.document().slide_count(), 2);
        assert_eq!(editor.document().current_index(), 0);
        assert_eq!(editor.current_slide()[0].kind(), "circle");
    }

    #[test]
    fn test_load_invalid_project_changes_nothing() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        let actions = editor.load_project("{not json");
        assert!(matches!(&actions[..], [Action::Notify(n)] if n.level == NoticeLevel::Error));
        assert_eq!(editor.current_slide().len(), 1);

        editor.load_project(r#"{"type":"rect"}"#);
        assert_eq!(editor.current_slide().len(), 1);
    }

    #[test]
    fn test_export_round_trips_through_load() {
        let mut editor = editor_with(vec![rect(5.0, 5.0, 10.0, 10.0)]);
        let json = editor.export_project().unwrap();
        editor.clear_slide();
        editor.load_project(&json);
        assert_eq!(editor.current_slide().len(), 1);
    }

    #[test]
    fn test_insert_image_selects_and_switches_tool() {
        let mut png = Vec::new();
        image::RgbaImage::new(40, 20)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut editor = Editor::default();
        let actions = editor.insert_image(&png);
        assert!(actions.contains(&Action::ToolChanged(ToolKind::Select)));
        assert_eq!(editor.settings.tool, ToolKind::Select);
        assert_eq!(editor.selection().indices(), &[0]);
        let b = editor.current_slide()[0].bounds();
        assert!((b.x - (640.0 - 20.0)).abs() < EPS);
        assert!((b.y - (400.0 - 10.0)).abs() < EPS);

        let actions = editor.insert_image(b"not an image");
        assert!(matches!(&actions[..], [Action::Notify(_)]));
        assert_eq!(editor.current_slide().len(), 1);
    }

    #[test]
    fn test_translation_requires_single_text() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        editor.selection.select(0);
        let notice = editor.begin_translation(Language::French).unwrap_err();
        assert_eq!(notice.message, TRANSLATE_SELECTION_MESSAGE);
        assert_eq!(editor.current_slide().len(), 1);
    }

    #[test]
    fn test_translation_success_commits() {
        let mut text = Text::new(Point::new(10.0, 100.0), "hello".into(), 20.0);
        text.color = SerializableColor::red();
        let mut editor = editor_with(vec![text.into()]);
        editor.reset_history();
        editor.selection.select(0);

        let ticket = editor.begin_translation(Language::Spanish).unwrap();
        assert_eq!(ticket.text, "hello");
        let placeholder = editor.current_slide()[1].as_text().unwrap();
        assert_eq!(placeholder.text, TRANSLATING_PLACEHOLDER);
        assert!((placeholder.y - (100.0 + 24.0 + 20.0)).abs() < EPS);
        assert_eq!(placeholder.color, SerializableColor::red());
        assert!(!editor.can_undo());

        let actions = editor.finish_translation(&ticket, Ok("hola".into()));
        assert!(actions.contains(&Action::HistoryCommitted));
        assert_eq!(editor.current_slide()[1].as_text().unwrap().text, "hola");
        assert_eq!(editor.selection().indices(), &[1]);
    }

    #[test]
    fn test_translation_failure_shows_error() {
        let mut editor = editor_with(vec![Text::new(Point::ZERO, "hello".into(), 20.0).into()]);
        editor.reset_history();
        editor.selection.select(0);
        let ticket = editor.begin_translation(Language::German).unwrap();

        let err = AssistantError::Request("offline".into());
        editor.finish_translation(&ticket, Err(err));
        let text = &editor.current_slide()[1].as_text().unwrap().text;
        assert!(text.starts_with("Error: "));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_chat_answer_replaces_thinking_text() {
        let mut editor = editor_with(vec![
            Text::new(Point::new(10.0, 10.0), "What is a prime?".into(), 20.0).into(),
            rect(300.0, 300.0, 10.0, 10.0),
        ]);
        editor.reset_history();
        editor.selection.select(0);

        let ticket = editor.begin_chat().unwrap();
        assert_eq!(ticket.question, "What is a prime?");
        assert_eq!(editor.current_slide()[2].as_text().unwrap().text, THINKING_PLACEHOLDER);

        // A delete while waiting moves the placeholder down one slot.
        editor.selection.set(vec![1]);
        editor.delete_selected();
        let actions = editor.finish_chat(&ticket, "A number with two factors.");
        assert!(actions.contains(&Action::HistoryCommitted));
        assert_eq!(editor.current_slide()[1].as_text().unwrap().text, "A number with two factors.");
    }

    #[test]
    fn test_chat_requires_single_text() {
        let mut editor = editor_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        let notice = editor.begin_chat().unwrap_err();
        assert_eq!(notice.message, ASK_SELECTION_MESSAGE);
        assert_eq!(editor.current_slide().len(), 1);
    }
}
