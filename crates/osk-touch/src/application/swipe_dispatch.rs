//! Swipe-action dispatch table.
//!
//! The swipe detector reports every recognised swipe step to
//! [`TouchState::on_swipe`], which picks a handler from the code of the key
//! the pointer first touched:
//!
//! | Origin key      | Handler                                              |
//! |-----------------|------------------------------------------------------|
//! | Delete          | precise character/word selection, delete word        |
//! | Space           | cursor movement, swipe-up action                     |
//! | Shift → space   | same as space (cursor movement with shift held)      |
//! | Shift → letter  | types the letter under the finger, drops shift       |
//! | Printable       | configured per-direction action on a quick flick     |
//!
//! Returning `true` marks the event handled; the dispatch loop then treats
//! the pointer as a gesture rather than a tap.

use osk_core::{Direction, KeyCode, KeyData, SwipeAction, SwipeEvent, SwipeListener, SwipeType};
use tracing::debug;

use super::collaborators::InputKeyEvent;
use super::key_press::TouchState;

/// A space-bar release this many rows above the bar triggers the swipe-up action.
pub const SPACE_SWIPE_UP_ROWS: i32 = -6;

impl SwipeListener for TouchState {
    fn on_swipe(&mut self, event: &SwipeEvent) -> bool {
        let id = event.pointer_id;
        let Some(initial) = self.initial_code(id) else {
            return false;
        };
        let active = self.active_code(id);

        match initial {
            KeyCode::DELETE => self.handle_delete_swipe(event),
            code if code.is_space() => self.handle_space_swipe(event),
            KeyCode::SHIFT if active.is_some_and(KeyCode::is_space) && event.kind == SwipeType::TouchMove => {
                self.handle_space_swipe(event)
            }
            KeyCode::SHIFT if active != Some(KeyCode::SHIFT) && event.kind == SwipeType::TouchUp => {
                self.handle_shift_release_on_other_key(event)
            }
            code if code.is_printable()
                && !self.collab.popup.is_showing_extended_popup()
                && !self.settings.glide.enabled
                && !self.has_triggered_gesture_move(id)
                && event.kind == SwipeType::TouchUp =>
            {
                let action = match event.direction {
                    Direction::Up => self.settings.gestures.swipe_up,
                    Direction::Down => self.settings.gestures.swipe_down,
                    Direction::Left => self.settings.gestures.swipe_left,
                    Direction::Right => self.settings.gestures.swipe_right,
                    Direction::None => SwipeAction::NoAction,
                };
                if action.is_no_action() {
                    return false;
                }
                self.execute_swipe_action(action);
                true
            }
            _ => false,
        }
    }
}

impl TouchState {
    fn execute_swipe_action(&self, action: SwipeAction) {
        if action.is_no_action() {
            return;
        }
        debug!(?action, "executing swipe action");
        self.collab.keyboard.execute_swipe_action(action);
    }

    fn handle_delete_swipe(&mut self, event: &SwipeEvent) -> bool {
        let editor = &self.collab.editor;
        if editor.is_raw_input_editor() {
            return false;
        }
        let action = self.settings.gestures.delete_key_swipe_left;

        match event.kind {
            SwipeType::TouchMove => {
                match action {
                    SwipeAction::DeleteCharactersPrecisely => {
                        if event.rel_unit_count_x != 0 {
                            self.collab.feedback.gesture_moving_swipe(&KeyData::delete());
                        }
                        editor.mark_composing_region(None);
                        let selection = editor.selection();
                        if selection.is_valid() {
                            let start = (selection.end + i64::from(event.abs_unit_count_x) + 1).clamp(0, selection.end);
                            editor.update_selection(start, selection.end);
                        }
                    }
                    SwipeAction::DeleteWordsPrecisely => {
                        if event.rel_unit_count_x != 0 {
                            self.collab.feedback.gesture_moving_swipe(&KeyData::delete());
                        }
                        editor.mark_composing_region(None);
                        if editor.selection().is_valid() {
                            let words = (event.abs_unit_count_x / 2).unsigned_abs().saturating_sub(1);
                            editor.selection_set_n_words_left(words);
                        }
                    }
                    _ => return false,
                }
                if let Some(pointer) = self.pointers.find_by_id_mut(event.pointer_id) {
                    pointer.should_block_next_up = true;
                }
                true
            }
            SwipeType::TouchUp if event.direction == Direction::Left && action == SwipeAction::DeleteWord => {
                self.execute_swipe_action(action);
                true
            }
            _ => false,
        }
    }

    fn handle_space_swipe(&mut self, event: &SwipeEvent) -> bool {
        let gestures = &self.settings.gestures;
        match (event.kind, event.direction) {
            (SwipeType::TouchMove, Direction::Left | Direction::Right) => {
                let (configured, step, arrow) = if event.direction == Direction::Left {
                    (gestures.space_bar_swipe_left, SwipeAction::MoveCursorLeft, KeyData::arrow_left())
                } else {
                    (gestures.space_bar_swipe_right, SwipeAction::MoveCursorRight, KeyData::arrow_right())
                };
                if configured == step {
                    // The first unit only activates the gesture.
                    let first = !self.has_triggered_gesture_move(event.pointer_id);
                    let count = event.rel_unit_count_x.unsigned_abs().saturating_sub(u32::from(first));
                    if count > 0 {
                        self.collab.feedback.gesture_moving_swipe(&KeyData::space());
                        self.collab
                            .input
                            .send(InputKeyEvent::DownUp { data: arrow, count });
                    }
                }
                true
            }
            // Swallow vertical motion so nearby keys do not flash their popups.
            (SwipeType::TouchMove, _) => true,
            (SwipeType::TouchUp, Direction::Left | Direction::Right) => {
                let (configured, step) = if event.direction == Direction::Left {
                    (gestures.space_bar_swipe_left, SwipeAction::MoveCursorLeft)
                } else {
                    (gestures.space_bar_swipe_right, SwipeAction::MoveCursorRight)
                };
                if configured == step {
                    return false;
                }
                self.execute_swipe_action(configured);
                true
            }
            (SwipeType::TouchUp, _) if event.abs_unit_count_y < SPACE_SWIPE_UP_ROWS => {
                self.execute_swipe_action(gestures.space_bar_swipe_up);
                true
            }
            _ => false,
        }
    }

    /// Shift pressed, finger released on another key: type that key (or its
    /// selected popup alternate) and drop the shift press.
    fn handle_shift_release_on_other_key(&mut self, event: &SwipeEvent) -> bool {
        let id = event.pointer_id;
        let Some(pointer) = self.pointers.find_by_id_mut(id) else {
            return false;
        };
        let active = pointer.active_key.take();
        let pressed = pointer.pressed_data.take();

        if let Some(key) = active.and_then(|active| self.layout.key_mut(active)) {
            key.pressed = false;
            let key = key.clone();
            let selected = self
                .collab
                .popup
                .active_key_data(&key, &self.settings.keyboard.hints)
                .unwrap_or_else(|| key.data.clone());
            match pressed {
                Some(pressed) if pressed == selected => self.collab.input.send(InputKeyEvent::Up(pressed)),
                pressed => {
                    if let Some(pressed) = pressed {
                        self.collab.input.send(InputKeyEvent::Cancel(pressed));
                    }
                    self.collab.input.send(InputKeyEvent::down_up(selected));
                }
            }
            if self.collab.popup.is_suitable_for_popups(&key) {
                self.collab.popup.hide();
            }
        } else if let Some(pressed) = pressed {
            self.collab.input.send(InputKeyEvent::Cancel(pressed));
        }

        if self.collab.input.is_pressed(KeyCode::SHIFT) {
            self.collab.input.send(InputKeyEvent::Cancel(KeyData::shift()));
        }
        true
    }
}
