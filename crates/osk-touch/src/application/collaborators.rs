//! Interfaces the touch controller drives.
//!
//! The controller never inserts text, draws popups or plays sounds itself.
//! Every outward effect goes through one of the traits below, injected as
//! `Arc<dyn Trait>` at construction time so tests can substitute recording
//! doubles.  All methods take `&self`; implementations that keep state use
//! interior mutability.

use std::sync::Arc;

use osk_core::{Key, KeyCode, KeyData, KeyboardMode, SwipeAction};

use super::glide::GlidePoint;
use super::settings::HintConfig;

/// A discrete key action sent to the input backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKeyEvent {
    Down(KeyData),
    Up(KeyData),
    Cancel(KeyData),
    /// A complete press repeated `count` times.
    DownUp { data: KeyData, count: u32 },
}

impl InputKeyEvent {
    pub fn down_up(data: KeyData) -> Self {
        InputKeyEvent::DownUp { data, count: 1 }
    }

    pub fn data(&self) -> &KeyData {
        match self {
            InputKeyEvent::Down(data)
            | InputKeyEvent::Up(data)
            | InputKeyEvent::Cancel(data)
            | InputKeyEvent::DownUp { data, .. } => data,
        }
    }
}

/// Receives key actions.
pub trait InputEventSink: Send + Sync {
    fn send(&self, event: InputKeyEvent);

    /// Whether a `Down` for `code` is outstanding.
    fn is_pressed(&self, code: KeyCode) -> bool;
}

/// Text selection in the editor, as character offsets.
///
/// Negative offsets mean the editor has no valid selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: i64,
    pub end: i64,
}

impl Selection {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start >= 0 && self.end >= 0
    }

    /// A valid, non-empty selection.
    pub fn is_selection_mode(&self) -> bool {
        self.is_valid() && self.start != self.end
    }
}

/// The text field being edited.
pub trait EditorCollaborator: Send + Sync {
    fn selection(&self) -> Selection;

    /// Sets or clears (`None`) the composing region.
    fn mark_composing_region(&self, region: Option<(i64, i64)>);

    /// Deletes the selection, or the character before the cursor.
    fn delete_backwards(&self);

    /// Selects the `n` words left of the cursor; `0` collapses the selection.
    fn selection_set_n_words_left(&self, n: u32);

    fn update_selection(&self, start: i64, end: i64);

    /// Raw-input fields (terminals, games) take key events but no text edits.
    fn is_raw_input_editor(&self) -> bool;
}

/// Executes high-level keyboard actions.
#[cfg_attr(test, mockall::automock)]
pub trait KeyboardController: Send + Sync {
    fn execute_swipe_action(&self, action: SwipeAction);

    fn mode(&self) -> KeyboardMode;
}

/// The key preview and alternates popup.
pub trait PopupController: Send + Sync {
    fn is_suitable_for_popups(&self, key: &Key) -> bool;

    fn show(&self, key: &Key);

    /// Expands the popup to offer the key's alternates.
    fn extend(&self, key: &Key, hints: &HintConfig);

    fn hide(&self);

    fn is_showing_extended_popup(&self) -> bool;

    /// Lets the extended popup track the pointer.  Returns `false` when the
    /// point is outside the popup and the pointer should re-target instead.
    fn propagate_motion(&self, key: &Key, x: f64, y: f64, pointer_index: usize) -> bool;

    /// Data to emit on release: the selected alternate, or the key's own data
    /// when nothing else was selected.  `None` means emit nothing.
    fn active_key_data(&self, key: &Key, hints: &HintConfig) -> Option<KeyData>;
}

/// Haptic and audio feedback.  Every method defaults to doing nothing.
pub trait FeedbackSink: Send + Sync {
    fn key_press(&self, _data: &KeyData) {}

    fn key_long_press(&self, _data: &KeyData) {}

    fn gesture_moving_swipe(&self, _data: &KeyData) {}
}

/// Feedback sink that ignores everything.
#[derive(Debug, Default)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {}

/// Turns a completed glide path into words.
pub trait GlideDecoder: Send + Sync {
    fn decode(&self, path: &[GlidePoint]);
}

/// The full set of collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub input: Arc<dyn InputEventSink>,
    pub editor: Arc<dyn EditorCollaborator>,
    pub keyboard: Arc<dyn KeyboardController>,
    pub popup: Arc<dyn PopupController>,
    pub feedback: Arc<dyn FeedbackSink>,
    pub glide_decoder: Arc<dyn GlideDecoder>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_validity() {
        assert!(!Selection::new(-1, -1).is_valid());
        assert!(Selection::new(3, 3).is_valid());
        assert!(!Selection::new(3, 3).is_selection_mode());
        assert!(Selection::new(1, 3).is_selection_mode());
    }

    #[test]
    fn test_input_key_event_data_accessor() {
        let ev = InputKeyEvent::down_up(KeyData::caps_lock());
        assert_eq!(ev.data().code, KeyCode::CAPS_LOCK);
        assert_eq!(ev, InputKeyEvent::DownUp { data: KeyData::caps_lock(), count: 1 });
    }
}
