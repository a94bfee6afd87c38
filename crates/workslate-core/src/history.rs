//! Undo/redo log of full and single-slide snapshots.

use crate::document::{Document, Slide};
use log::debug;

/// Default number of retained entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// One committed change.
#[derive(Debug, Clone)]
pub enum HistoryEntry {
    /// Every slide after the change. `previous` is absent only for the
    /// session baseline, which cannot be undone.
    Full {
        slides: Vec<Slide>,
        previous: Option<Vec<Slide>>,
    },
    /// One slide's objects before and after the change.
    Delta {
        slide_index: usize,
        before: Slide,
        after: Slide,
    },
}

impl HistoryEntry {
    fn can_undo(&self) -> bool {
        match self {
            HistoryEntry::Full { previous, .. } => previous.is_some(),
            HistoryEntry::Delta { .. } => true,
        }
    }

    fn apply_before(&self, doc: &mut Document) {
        match self {
            HistoryEntry::Full { previous: Some(prev), .. } => doc.replace_slides(prev.clone()),
            HistoryEntry::Full { previous: None, .. } => {}
            HistoryEntry::Delta { slide_index, before, .. } => {
                doc.replace_slide(*slide_index, before.clone())
            }
        }
    }

    fn apply_after(&self, doc: &mut Document) {
        match self {
            HistoryEntry::Full { slides, .. } => doc.replace_slides(slides.clone()),
            HistoryEntry::Delta { slide_index, after, .. } => {
                doc.replace_slide(*slide_index, after.clone())
            }
        }
    }
}

/// Serialized form used to detect which slide changed.
fn slide_key(slide: &Slide) -> String {
    serde_json::to_string(slide).unwrap_or_default()
}

/// Bounded undo log with branch-truncating redo.
///
/// Only the first slide that differs from the last stable state is recorded
/// per commit; edits spanning several slides between commits are not
/// captured beyond that slide.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Number of entries currently applied.
    cursor: usize,
    capacity: usize,
    last_stable: Option<Vec<Slide>>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
            last_stable: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0 && self.entries[self.cursor - 1].can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Record the document's current state. Returns false when nothing
    /// changed since the last stable state.
    pub fn commit(&mut self, slides: &[Slide]) -> bool {
        let entry = match &self.last_stable {
            None => {
                debug!("history: baseline ({} slides)", slides.len());
                HistoryEntry::Full {
                    slides: slides.to_vec(),
                    previous: None,
                }
            }
            Some(last) if last.len() != slides.len() => {
                debug!("history: full snapshot ({} -> {} slides)", last.len(), slides.len());
                HistoryEntry::Full {
                    slides: slides.to_vec(),
                    previous: Some(last.clone()),
                }
            }
            Some(last) => {
                let Some(index) = (0..slides.len()).find(|&i| slide_key(&last[i]) != slide_key(&slides[i]))
                else {
                    return false;
                };
                debug!("history: delta for slide {index}");
                HistoryEntry::Delta {
                    slide_index: index,
                    before: last[index].clone(),
                    after: slides[index].clone(),
                }
            }
        };
        self.append(entry);
        self.last_stable = Some(slides.to_vec());
        true
    }

    fn append(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
    }

    /// Step back one entry. Returns whether anything was applied.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.entries[self.cursor].apply_before(doc);
        self.last_stable = Some(doc.slides().to_vec());
        true
    }

    /// Re-apply the next entry. Returns whether anything was applied.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.entries[self.cursor].apply_after(doc);
        self.cursor += 1;
        self.last_stable = Some(doc.slides().to_vec());
        true
    }
}
