//! High-level actions bound to swipe gestures.
//!
//! A [`SwipeAction`] is what the user configured a gesture to do, for example
//! "swipe left on the space bar moves the cursor left".  The touch core only
//! decides *when* an action fires; executing it is the keyboard-mode
//! collaborator's job.

use serde::{Deserialize, Serialize};

/// A configurable gesture action.
///
/// Written in configuration files in snake_case, e.g. `move_cursor_left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    #[default]
    NoAction,
    CycleToPreviousKeyboardMode,
    CycleToNextKeyboardMode,
    DeleteWord,
    /// Delete-key swipe selects characters one key unit at a time.
    DeleteCharactersPrecisely,
    /// Delete-key swipe selects whole words, one per two key units.
    DeleteWordsPrecisely,
    HideKeyboard,
    InsertSpace,
    MoveCursorUp,
    MoveCursorDown,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorStartOfLine,
    MoveCursorEndOfLine,
    MoveCursorStartOfPage,
    MoveCursorEndOfPage,
    Shift,
    Redo,
    Undo,
    SwitchToClipboardContext,
    ShowInputMethodPicker,
    SwitchToPrevSubtype,
    SwitchToNextSubtype,
    SwitchToPrevKeyboard,
    SelectAll,
}

impl SwipeAction {
    pub fn is_no_action(self) -> bool {
        self == SwipeAction::NoAction
    }

    /// Actions that move the cursor one step per key unit of travel.
    pub fn is_cursor_step(self) -> bool {
        matches!(
            self,
            SwipeAction::MoveCursorLeft
                | SwipeAction::MoveCursorRight
                | SwipeAction::MoveCursorUp
                | SwipeAction::MoveCursorDown
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
