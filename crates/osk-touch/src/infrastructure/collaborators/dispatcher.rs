//! Input event sink that tracks pressed keys and records history.

use std::collections::HashMap;
use std::sync::Mutex;

use osk_core::KeyCode;
use tracing::{debug, warn};

use crate::application::collaborators::{InputEventSink, InputKeyEvent};

#[derive(Debug, Default)]
struct DispatcherState {
    /// Outstanding `Down`s per code.
    pressed: HashMap<KeyCode, u32>,
    history: Vec<InputKeyEvent>,
}

/// Records every key event and tracks which codes are held down.
#[derive(Debug, Default)]
pub struct InputEventDispatcher {
    state: Mutex<DispatcherState>,
}

impl InputEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event received so far, in order.
    pub fn history(&self) -> Vec<InputKeyEvent> {
        self.lock().history.clone()
    }

    /// Returns and clears the recorded history.
    pub fn take_history(&self) -> Vec<InputKeyEvent> {
        std::mem::take(&mut self.lock().history)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DispatcherState> {
        // A poisoned lock only means a panicking test thread; the data is
        // still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl InputEventSink for InputEventDispatcher {
    fn send(&self, event: InputKeyEvent) {
        let mut state = self.lock();
        let code = event.data().code;
        match &event {
            InputKeyEvent::Down(_) => *state.pressed.entry(code).or_insert(0) += 1,
            InputKeyEvent::Up(_) | InputKeyEvent::Cancel(_) => match state.pressed.get_mut(&code) {
                Some(count) if *count > 1 => *count -= 1,
                Some(_) => {
                    state.pressed.remove(&code);
                }
                None if matches!(event, InputKeyEvent::Up(_)) => {
                    warn!(code = code.0, "key up without matching down");
                }
                None => {}
            },
            InputKeyEvent::DownUp { .. } => {}
        }
        debug!(?event, "input event");
        state.history.push(event);
    }

    fn is_pressed(&self, code: KeyCode) -> bool {
        self.lock().pressed.contains_key(&code)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use osk_core::KeyData;

    #[test]
    fn test_down_marks_pressed_until_up() {
        let dispatcher = InputEventDispatcher::new();
        let a = KeyData::char('a');

        dispatcher.send(InputKeyEvent::Down(a.clone()));
        assert!(dispatcher.is_pressed(a.code));

        dispatcher.send(InputKeyEvent::Up(a.clone()));
        assert!(!dispatcher.is_pressed(a.code));
        assert_eq!(dispatcher.history().len(), 2);
    }

    #[test]
    fn test_two_downs_of_same_code_need_two_terminals() {
        let dispatcher = InputEventDispatcher::new();
        let shift = KeyData::shift();

        dispatcher.send(InputKeyEvent::Down(shift.clone()));
        dispatcher.send(InputKeyEvent::Down(shift.clone()));
        dispatcher.send(InputKeyEvent::Cancel(shift.clone()));

        assert!(dispatcher.is_pressed(KeyCode::SHIFT));
        dispatcher.send(InputKeyEvent::Up(shift));
        assert!(!dispatcher.is_pressed(KeyCode::SHIFT));
    }

    #[test]
    fn test_take_history_drains() {
        let dispatcher = InputEventDispatcher::new();
        dispatcher.send(InputKeyEvent::down_up(KeyData::caps_lock()));

        assert_eq!(dispatcher.take_history().len(), 1);
        assert!(dispatcher.history().is_empty());
        assert!(!dispatcher.is_pressed(KeyCode::CAPS_LOCK));
    }
}
