//! Key-press state machine and long-press timers.
//!
//! [`TouchState`] owns everything the controller mutates per touch sample:
//! the key table, the per-finger [`TouchPointer`] records, the timer queue
//! and the collaborators.  The transitions in this module implement the life
//! of one key touch:
//!
//! ```text
//!  Idle ──DOWN──▶ Down ──(long press)──▶ PopupExtended
//!                  │                          │
//!                  ├──UP──▶ Released ◀──UP────┘
//!                  └──CANCEL / re-target──▶ Cancelled
//! ```
//!
//! # In-flight presses
//!
//! A pointer remembers the [`KeyData`] of the `Down` it emitted until that
//! press receives its terminal action (`Up` or `Cancel`).  Every terminal
//! path takes this record, so a `Down` is always matched by exactly one
//! terminal action even when several cancel paths run for the same pointer.

use kurbo::Point;
use osk_core::{KeyCode, KeyData, KeyId, KeyboardLayout, PointerId, PointerMap, SwipeAction, TrackedPointer};
use tracing::{debug, trace, warn};

use super::collaborators::{Collaborators, InputKeyEvent, Selection};
use super::glide::GlideTrail;
use super::scheduler::{TimerId, TimerQueue, TimerTask};
use super::settings::TouchSettings;

/// Horizontal drift allowed past the visible key, as a fraction of its width.
pub const RETARGET_TOLERANCE_X: f64 = 0.1;
/// Vertical drift allowed past the visible key, as a fraction of its height.
pub const RETARGET_TOLERANCE_Y: f64 = 0.35;

/// Per-finger touch state.
#[derive(Debug, Clone)]
pub struct TouchPointer {
    pub id: PointerId,
    /// Index of this pointer in the most recent sample.
    pub index: usize,
    /// Keyboard-local position from the most recent sample.
    pub position: Point,
    /// Key first pressed by this finger.
    pub initial_key: Option<KeyId>,
    /// Key currently pressed; differs from `initial_key` after re-targeting.
    pub active_key: Option<KeyId>,
    /// Data of the `Down` still awaiting its terminal action.
    pub pressed_data: Option<KeyData>,
    pub long_press: Option<TimerId>,
    pub has_triggered_gesture_move: bool,
    pub should_block_next_up: bool,
}

impl TrackedPointer for TouchPointer {
    fn new(id: PointerId, index: usize) -> Self {
        Self {
            id,
            index,
            position: Point::ZERO,
            initial_key: None,
            active_key: None,
            pressed_data: None,
            long_press: None,
            has_triggered_gesture_move: false,
            should_block_next_up: false,
        }
    }

    fn id(&self) -> PointerId {
        self.id
    }
}

/// Mutable state shared by the dispatch loop, the swipe handlers and the glide
/// listener.
pub struct TouchState {
    pub(crate) layout: KeyboardLayout,
    pub(crate) pointers: PointerMap<TouchPointer>,
    pub(crate) timers: TimerQueue,
    pub(crate) settings: TouchSettings,
    pub(crate) collab: Collaborators,
    pub(crate) now_ms: u64,
    /// Selection recorded when the space bar went down.
    pub(crate) space_anchor: Option<Selection>,
    pub(crate) trail: GlideTrail,
}

impl TouchState {
    pub fn new(layout: KeyboardLayout, settings: TouchSettings, collab: Collaborators) -> Self {
        Self {
            pointers: PointerMap::with_capacity(settings.keyboard.pointer_capacity),
            layout,
            timers: TimerQueue::new(),
            settings,
            collab,
            now_ms: 0,
            space_anchor: None,
            trail: GlideTrail::default(),
        }
    }

    /// Code of the key a pointer first touched.
    pub(crate) fn initial_code(&self, id: PointerId) -> Option<KeyCode> {
        let key = self.pointers.find_by_id(id)?.initial_key?;
        self.layout.key(key).map(|k| k.code())
    }

    /// Code of the key a pointer is currently on.
    pub(crate) fn active_code(&self, id: PointerId) -> Option<KeyCode> {
        let key = self.pointers.find_by_id(id)?.active_key?;
        self.layout.key(key).map(|k| k.code())
    }

    pub(crate) fn has_triggered_gesture_move(&self, id: PointerId) -> bool {
        self.pointers
            .find_by_id(id)
            .is_some_and(|p| p.has_triggered_gesture_move)
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    /// DOWN: presses the key under the pointer and starts its long-press timer.
    pub(crate) fn touch_down(&mut self, id: PointerId) {
        let Some(pointer) = self.pointers.find_by_id(id) else {
            return;
        };
        let pos = pointer.position;
        let hit = self
            .layout
            .key_for_pos(pos.x, pos.y)
            .filter(|key| self.layout.key(*key).is_some_and(|k| k.enabled));
        let Some(key_id) = hit else {
            debug!(pointer = id.0, x = pos.x, y = pos.y, "touch down without an enabled key");
            if let Some(pointer) = self.pointers.find_by_id_mut(id) {
                pointer.active_key = None;
            }
            return;
        };
        let Some(key) = self.layout.key_mut(key_id) else {
            return;
        };
        key.pressed = true;
        let key = key.clone();

        self.collab.input.send(InputKeyEvent::Down(key.data.clone()));
        if self.settings.keyboard.popup_enabled && self.collab.popup.is_suitable_for_popups(&key) {
            self.collab.popup.show(&key);
        }
        self.collab.feedback.key_press(&key.data);
        if key.code().is_space() {
            self.space_anchor = Some(self.collab.editor.selection());
        }

        let deadline = self.now_ms + self.settings.keyboard.long_press_delay_for(key.code());
        let Some(pointer) = self.pointers.find_by_id_mut(id) else {
            return;
        };
        if let Some(stale) = pointer.long_press.take() {
            self.timers.cancel(stale);
        }
        pointer.initial_key.get_or_insert(key_id);
        pointer.active_key = Some(key_id);
        pointer.pressed_data = Some(key.data.clone());
        pointer.long_press = Some(self.timers.schedule(
            deadline,
            TimerTask::LongPress {
                pointer: id,
                key: key_id,
            },
        ));
        debug!(pointer = id.0, key = %key.data.label, deadline, "key down");
    }

    /// MOVE: re-targets the pointer when it leaves its key or the popup.
    pub(crate) fn touch_move(&mut self, id: PointerId) {
        let Some(pointer) = self.pointers.find_by_id(id) else {
            return;
        };
        let (Some(_), Some(active)) = (pointer.initial_key, pointer.active_key) else {
            return;
        };
        let (pos, index) = (pointer.position, pointer.index);

        let retarget = match self.layout.key(active) {
            None => {
                debug!(pointer = id.0, "active key no longer in layout");
                true
            }
            Some(key) if self.collab.popup.is_showing_extended_popup() => {
                !self.collab.popup.propagate_motion(key, pos.x, pos.y, index)
            }
            Some(key) => !key.is_within_tolerance(pos.x, pos.y, RETARGET_TOLERANCE_X, RETARGET_TOLERANCE_Y),
        };
        if retarget {
            trace!(pointer = id.0, x = pos.x, y = pos.y, "re-targeting pointer");
            self.touch_cancel(id);
            self.touch_down(id);
        }
    }

    /// UP: releases the active key, emitting a popup alternate if one was
    /// selected.
    pub(crate) fn touch_up(&mut self, id: PointerId) {
        self.cancel_long_press(id);
        let Some(pointer) = self.pointers.find_by_id_mut(id) else {
            return;
        };
        let active = pointer.active_key.take();
        let pressed = pointer.pressed_data.take();
        let triggered = pointer.has_triggered_gesture_move;
        pointer.has_triggered_gesture_move = false;
        pointer.should_block_next_up = false;

        let key = active.and_then(|active| self.layout.key_mut(active)).map(|key| {
            key.pressed = false;
            key.clone()
        });
        let Some(key) = key else {
            if let Some(data) = pressed {
                self.collab.input.send(InputKeyEvent::Cancel(data));
            }
            return;
        };

        let input = &self.collab.input;
        if self.collab.popup.is_suitable_for_popups(&key) {
            let selected = self
                .collab
                .popup
                .active_key_data(&key, &self.settings.keyboard.hints)
                .filter(|_| !triggered);
            match (selected, pressed) {
                (Some(data), Some(pressed)) if data == pressed => input.send(InputKeyEvent::Up(pressed)),
                (Some(data), pressed) => {
                    if let Some(pressed) = pressed {
                        input.send(InputKeyEvent::Cancel(pressed));
                    }
                    input.send(InputKeyEvent::down_up(data));
                }
                (None, Some(pressed)) => input.send(InputKeyEvent::Cancel(pressed)),
                (None, None) => {}
            }
            self.collab.popup.hide();
        } else if let Some(pressed) = pressed {
            if triggered {
                input.send(InputKeyEvent::Cancel(pressed));
            } else {
                input.send(InputKeyEvent::Up(pressed));
            }
        }
        debug!(pointer = id.0, key = %key.data.label, "key up");
    }

    /// CANCEL: abandons the active key without producing input.
    pub(crate) fn touch_cancel(&mut self, id: PointerId) {
        self.cancel_long_press(id);
        let Some(pointer) = self.pointers.find_by_id_mut(id) else {
            return;
        };
        let active = pointer.active_key.take();
        let pressed = pointer.pressed_data.take();
        pointer.has_triggered_gesture_move = false;
        pointer.should_block_next_up = false;

        if let Some(data) = pressed {
            self.collab.input.send(InputKeyEvent::Cancel(data));
        }
        if let Some(key) = active.and_then(|active| self.layout.key_mut(active)) {
            key.pressed = false;
            if self.collab.popup.is_suitable_for_popups(key) {
                self.collab.popup.hide();
            }
            debug!(pointer = id.0, key = %key.data.label, "key cancelled");
        }
    }

    /// Hands a pointer over to gesture semantics: the long press is cancelled
    /// and an in-flight press is cancelled, but the active key is kept so the
    /// swipe handlers still see where the finger is.
    pub(crate) fn suppress_press_for_gesture(&mut self, id: PointerId) {
        self.cancel_long_press(id);
        let Some(pointer) = self.pointers.find_by_id_mut(id) else {
            return;
        };
        pointer.has_triggered_gesture_move = true;
        let active = pointer.active_key;
        let pressed = pointer.pressed_data.take();
        if let Some(key) = active.and_then(|active| self.layout.key_mut(active)) {
            key.pressed = false;
        }
        if let Some(data) = pressed {
            trace!(pointer = id.0, "press superseded by gesture");
            self.collab.input.send(InputKeyEvent::Cancel(data));
        }
    }

    /// Terminal handling of a lifted pointer.
    ///
    /// A pointer whose release was consumed by a gesture, that already moved
    /// as a gesture, or whose UP is blocked by a long press is cancelled;
    /// otherwise it is released normally.
    pub(crate) fn finish_pointer(&mut self, id: PointerId, gesture_handled: bool) {
        let Some(pointer) = self.pointers.find_by_id(id) else {
            return;
        };
        let triggered = pointer.has_triggered_gesture_move;
        if gesture_handled || triggered || pointer.should_block_next_up {
            if triggered && self.initial_code(id) == Some(KeyCode::DELETE) {
                let editor = &self.collab.editor;
                if editor.selection().is_selection_mode() {
                    editor.delete_backwards();
                }
            }
            self.touch_cancel(id);
        } else {
            self.touch_up(id);
        }
    }

    /// Cancels the press of every pointer that currently has one.
    pub(crate) fn cancel_all_active(&mut self) {
        let active: Vec<PointerId> = self
            .pointers
            .iter()
            .filter(|p| p.active_key.is_some() || p.pressed_data.is_some())
            .map(|p| p.id)
            .collect();
        for id in active {
            self.touch_cancel(id);
        }
    }

    /// Stops tracking one pointer.
    pub(crate) fn release_pointer(&mut self, id: PointerId) {
        self.cancel_long_press(id);
        self.pointers.remove_by_id(id);
    }

    /// Stops tracking every pointer.
    pub(crate) fn clear_pointers(&mut self) {
        for id in self.pointers.ids() {
            self.cancel_long_press(id);
        }
        self.pointers.clear();
    }

    // ── Timers ────────────────────────────────────────────────────────────────

    /// Fires every timer due at or before `now_ms`, in deadline order.
    pub(crate) fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
        while let Some((timer, task)) = self.timers.pop_due(self.now_ms) {
            match task {
                TimerTask::LongPress { pointer, key } => self.fire_long_press(timer, pointer, key),
                TimerTask::GlideFadeFrame => self.on_fade_frame(timer),
            }
        }
    }

    fn cancel_long_press(&mut self, id: PointerId) {
        if let Some(timer) = self.pointers.find_by_id_mut(id).and_then(|p| p.long_press.take()) {
            self.timers.cancel(timer);
        }
    }

    fn fire_long_press(&mut self, timer: TimerId, pointer_id: PointerId, key_id: KeyId) {
        let owner = self
            .pointers
            .find_by_id_mut(pointer_id)
            .filter(|p| p.long_press == Some(timer) && p.active_key == Some(key_id));
        let Some(pointer) = owner else {
            warn!(pointer = pointer_id.0, "long-press timer fired for a released pointer");
            return;
        };
        pointer.long_press = None;
        let Some(key) = self.layout.key(key_id).cloned() else {
            warn!(pointer = pointer_id.0, "long-press key no longer in layout");
            return;
        };
        debug!(pointer = pointer_id.0, key = %key.data.label, "long press");

        let block_next_up = match key.code() {
            code if code.is_space() => match self.settings.gestures.space_bar_long_press {
                SwipeAction::NoAction | SwipeAction::InsertSpace => false,
                action => {
                    self.collab.keyboard.execute_swipe_action(action);
                    true
                }
            },
            KeyCode::SHIFT => {
                self.collab.input.send(InputKeyEvent::down_up(KeyData::caps_lock()));
                self.collab.feedback.key_long_press(&key.data);
                true
            }
            KeyCode::LANGUAGE_SWITCH => {
                self.collab
                    .input
                    .send(InputKeyEvent::down_up(KeyData::input_method_picker()));
                true
            }
            _ => {
                let hints = &self.settings.keyboard.hints;
                if self.collab.popup.is_suitable_for_popups(&key) && !hints.filter(&key.popup).is_empty() {
                    self.collab.popup.extend(&key, hints);
                    self.collab.feedback.key_long_press(&key.data);
                }
                false
            }
        };
        if block_next_up {
            if let Some(pointer) = self.pointers.find_by_id_mut(pointer_id) {
                pointer.should_block_next_up = true;
            }
        }
    }
}
