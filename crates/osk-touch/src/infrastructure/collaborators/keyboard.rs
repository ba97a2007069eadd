//! Keyboard manager that logs and records executed actions.

use std::sync::Mutex;

use osk_core::{KeyboardMode, SwipeAction};
use tracing::info;

use crate::application::collaborators::KeyboardController;

#[derive(Debug, Default)]
struct ManagerState {
    mode: KeyboardMode,
    executed: Vec<SwipeAction>,
}

/// Executes swipe actions by recording them; mode-cycling actions also
/// switch the reported keyboard mode.
#[derive(Debug, Default)]
pub struct LoggingKeyboardManager {
    state: Mutex<ManagerState>,
}

impl LoggingKeyboardManager {
    pub fn new(mode: KeyboardMode) -> Self {
        Self {
            state: Mutex::new(ManagerState {
                mode,
                executed: Vec::new(),
            }),
        }
    }

    pub fn set_mode(&self, mode: KeyboardMode) {
        self.lock().mode = mode;
    }

    /// Actions executed so far, in order.
    pub fn executed(&self) -> Vec<SwipeAction> {
        self.lock().executed.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn next_mode(mode: KeyboardMode) -> KeyboardMode {
    match mode {
        KeyboardMode::Characters => KeyboardMode::Symbols,
        KeyboardMode::Symbols => KeyboardMode::Numeric,
        KeyboardMode::Numeric => KeyboardMode::Characters,
    }
}

fn previous_mode(mode: KeyboardMode) -> KeyboardMode {
    match mode {
        KeyboardMode::Characters => KeyboardMode::Numeric,
        KeyboardMode::Symbols => KeyboardMode::Characters,
        KeyboardMode::Numeric => KeyboardMode::Symbols,
    }
}

impl KeyboardController for LoggingKeyboardManager {
    fn execute_swipe_action(&self, action: SwipeAction) {
        let mut state = self.lock();
        match action {
            SwipeAction::CycleToNextKeyboardMode => state.mode = next_mode(state.mode),
            SwipeAction::CycleToPreviousKeyboardMode => state.mode = previous_mode(state.mode),
            _ => {}
        }
        info!(?action, mode = ?state.mode, "keyboard action");
        state.executed.push(action);
    }

    fn mode(&self) -> KeyboardMode {
        self.lock().mode
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_are_recorded_in_order() {
        let manager = LoggingKeyboardManager::default();

        manager.execute_swipe_action(SwipeAction::Undo);
        manager.execute_swipe_action(SwipeAction::HideKeyboard);

        assert_eq!(manager.executed(), vec![SwipeAction::Undo, SwipeAction::HideKeyboard]);
        assert_eq!(manager.mode(), KeyboardMode::Characters);
    }

    #[test]
    fn test_mode_cycles_both_ways() {
        let manager = LoggingKeyboardManager::new(KeyboardMode::Characters);

        manager.execute_swipe_action(SwipeAction::CycleToNextKeyboardMode);
        assert_eq!(manager.mode(), KeyboardMode::Symbols);

        manager.execute_swipe_action(SwipeAction::CycleToPreviousKeyboardMode);
        manager.execute_swipe_action(SwipeAction::CycleToPreviousKeyboardMode);
        assert_eq!(manager.mode(), KeyboardMode::Numeric);
    }

    #[test]
    fn test_set_mode() {
        let manager = LoggingKeyboardManager::default();
        manager.set_mode(KeyboardMode::Numeric);
        assert_eq!(manager.mode(), KeyboardMode::Numeric);
    }
}
