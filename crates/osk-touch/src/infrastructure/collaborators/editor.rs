//! In-memory text field used by the replay tool and the tests.

use std::sync::Mutex;

use tracing::debug;

use crate::application::collaborators::{EditorCollaborator, Selection};

#[derive(Debug, Default)]
struct EditorState {
    text: Vec<char>,
    selection: Selection,
    composing: Option<(i64, i64)>,
    raw_input: bool,
}

impl EditorState {
    fn len(&self) -> i64 {
        self.text.len() as i64
    }

    /// Start of the `n`-th word left of `from`.  Whitespace before a word
    /// belongs to that word.
    fn words_left(&self, from: i64, n: u32) -> i64 {
        let mut pos = from.clamp(0, self.len()) as usize;
        for _ in 0..n {
            while pos > 0 && self.text[pos - 1].is_whitespace() {
                pos -= 1;
            }
            while pos > 0 && !self.text[pos - 1].is_whitespace() {
                pos -= 1;
            }
        }
        pos as i64
    }
}

/// A plain text buffer with a selection.
#[derive(Debug, Default)]
pub struct InMemoryEditor {
    state: Mutex<EditorState>,
}

impl InMemoryEditor {
    /// Creates an editor holding `text` with the cursor at its end.
    pub fn with_text(text: &str) -> Self {
        let text: Vec<char> = text.chars().collect();
        let end = text.len() as i64;
        Self {
            state: Mutex::new(EditorState {
                text,
                selection: Selection::new(end, end),
                composing: None,
                raw_input: false,
            }),
        }
    }

    /// Marks the field as raw input (no text editing gestures).
    pub fn set_raw_input(&self, raw: bool) {
        self.lock().raw_input = raw;
    }

    pub fn text(&self) -> String {
        self.lock().text.iter().collect()
    }

    pub fn composing_region(&self) -> Option<(i64, i64)> {
        self.lock().composing
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EditorCollaborator for InMemoryEditor {
    fn selection(&self) -> Selection {
        self.lock().selection
    }

    fn mark_composing_region(&self, region: Option<(i64, i64)>) {
        self.lock().composing = region;
    }

    fn delete_backwards(&self) {
        let mut state = self.lock();
        let Selection { start, end } = state.selection;
        if !state.selection.is_valid() {
            return;
        }
        let (from, to) = if start != end {
            (start.min(end), start.max(end))
        } else if start > 0 {
            (start - 1, start)
        } else {
            return;
        };
        let (from, to) = (from.clamp(0, state.len()) as usize, to.clamp(0, state.len()) as usize);
        state.text.drain(from..to);
        state.selection = Selection::new(from as i64, from as i64);
        state.composing = None;
        debug!(from, to, "deleted text");
    }

    fn selection_set_n_words_left(&self, n: u32) {
        let mut state = self.lock();
        let end = state.selection.end;
        let start = if n == 0 { end } else { state.words_left(end, n) };
        state.selection = Selection::new(start, end);
    }

    fn update_selection(&self, start: i64, end: i64) {
        let mut state = self.lock();
        let len = state.len();
        state.selection = Selection::new(start.clamp(0, len), end.clamp(0, len));
    }

    fn is_raw_input_editor(&self) -> bool {
        self.lock().raw_input
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
