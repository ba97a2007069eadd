//! TouchController: the single entry point for raw touch samples.
//!
//! Every hardware sample passes through [`TouchController::on_touch_event`]
//! one at a time.  For each sample the controller:
//!
//! 1. fires timers that became due before the sample's timestamp,
//! 2. converts screen coordinates to keyboard-local ones,
//! 3. offers the sample to the glide detector, which may claim the gesture,
//! 4. otherwise runs the swipe detector and the key-press state machine.
//!
//! Nothing here is async and nothing blocks; the event loop in
//! `infrastructure::event_loop` owns the controller and serialises samples
//! and timer deadlines.
//!
//! # Architecture
//!
//! The controller depends only on the collaborator traits.  All
//! implementations are injected at construction time, making it fully
//! unit-testable with recording doubles.

use kurbo::Vec2;
use osk_core::{
    render, DesiredKey, DrawInstruction, KeyCode, KeySpec, KeyboardLayout, KeyboardMode, LayoutError, PointerId,
    SwipeAction, SwipeDetector, TouchAction, TouchSample,
};
use tracing::{debug, trace};

use super::collaborators::{Collaborators, Selection};
use super::glide::{GlideDetector, ThresholdGlideDetector};
use super::key_press::TouchState;
use super::settings::TouchSettings;

pub struct TouchController {
    state: TouchState,
    swipe: SwipeDetector,
    glide: Box<dyn GlideDetector>,
    offset: Vec2,
}

impl TouchController {
    /// Creates a controller using the threshold glide detector.
    pub fn new(layout: KeyboardLayout, settings: TouchSettings, collab: Collaborators) -> Self {
        let swipe = SwipeDetector::new(settings.keyboard.pointer_capacity, settings.gestures.thresholds());
        let glide = Box::new(ThresholdGlideDetector::new(&settings.glide));
        Self {
            state: TouchState::new(layout, settings, collab),
            swipe,
            glide,
            offset: Vec2::ZERO,
        }
    }

    /// Replaces the glide detector.
    pub fn with_glide_detector(mut self, glide: Box<dyn GlideDetector>) -> Self {
        self.glide = glide;
        self
    }

    /// Recomputes key geometry for a `width × height` keyboard.
    ///
    /// Pointers keep their keys across the relayout.  Swipe units follow the
    /// new key size.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidSize`] for non-positive dimensions.
    pub fn layout(&mut self, width: f64, height: f64) -> Result<(), LayoutError> {
        let kb = &self.state.settings.keyboard;
        let desired = DesiredKey::for_keyboard(width, kb.row_base_height, kb.key_spacing_horizontal, kb.key_spacing_vertical);
        self.state.layout.layout(width, height, desired)?;
        let rows = self.state.layout.row_count().max(1) as f64;
        let row_height = desired.height.min(height / rows);
        self.swipe.set_unit_size(desired.width, row_height);
        debug!(width, height, unit_width = desired.width, unit_height = row_height, "keyboard laid out");
        Ok(())
    }

    /// Swaps in a new key set (e.g. a mode switch).  In-flight presses are
    /// cancelled because their keys no longer exist.
    pub fn replace_keys(&mut self, mode: KeyboardMode, rows: Vec<Vec<KeySpec>>) {
        self.state.cancel_all_active();
        self.state.layout.replace_keys(mode, rows);
    }

    /// Sets the keyboard's top-left corner in screen coordinates.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset = Vec2::new(x, y);
    }

    /// Processes one raw sample.  Returns whether the sample was consumed.
    pub fn on_touch_event(&mut self, sample: &TouchSample) -> bool {
        if sample.action == TouchAction::Hover {
            return false;
        }
        self.advance_to(sample.time_ms);
        let sample = self.to_local(sample);
        trace!(action = ?sample.action, pointers = sample.pointers.len(), time = sample.time_ms, "touch sample");

        if self.glide_claims(&sample) {
            return true;
        }

        match sample.action {
            TouchAction::Down => self.on_down(&sample),
            TouchAction::PointerDown => self.on_pointer_down(&sample),
            TouchAction::Move => self.on_move(&sample),
            TouchAction::PointerUp => self.on_pointer_up(&sample),
            TouchAction::Up => self.on_up(&sample),
            TouchAction::Cancel => self.on_cancel(),
            TouchAction::Hover => return false,
        }
        true
    }

    /// Fires every timer due at or before `now_ms`.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.state.advance_to(now_ms);
    }

    /// Deadline of the next pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.state.timers.next_deadline()
    }

    /// Draw instructions for the keys and the glide trail.
    pub fn draw(&self) -> Vec<DrawInstruction> {
        render(&self.state.layout, &self.state.trail.dots())
    }

    pub fn keyboard_layout(&self) -> &KeyboardLayout {
        &self.state.layout
    }

    pub fn settings(&self) -> &TouchSettings {
        &self.state.settings
    }

    /// Selection recorded when the space bar was last pressed.
    pub fn selection_anchor(&self) -> Option<Selection> {
        self.state.space_anchor
    }

    pub fn active_pointer_count(&self) -> usize {
        self.state.pointers.len()
    }

    pub fn is_gliding(&self) -> bool {
        self.state.trail.is_gliding()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    fn to_local(&self, sample: &TouchSample) -> TouchSample {
        let mut local = sample.clone();
        for p in &mut local.pointers {
            p.x -= self.offset.x;
            p.y -= self.offset.y;
        }
        local
    }

    /// Offers the sample to the glide detector.  A claim cancels every active
    /// press, and terminal samples clear the pointer registry.
    fn glide_claims(&mut self, sample: &TouchSample) -> bool {
        if !self.state.settings.glide.enabled || self.state.collab.keyboard.mode() != KeyboardMode::Characters {
            return false;
        }
        let initial_key = self
            .state
            .pointers
            .get_slot(0)
            .and_then(|p| p.initial_key)
            .and_then(|id| self.state.layout.key(id))
            .cloned();
        if !self
            .glide
            .on_touch_event(sample, initial_key.as_ref(), &mut self.state)
        {
            return false;
        }
        self.state.cancel_all_active();
        if matches!(sample.action, TouchAction::Up | TouchAction::Cancel) {
            self.state.clear_pointers();
            self.swipe.clear();
        }
        true
    }

    /// Registers a new pointer and presses the key under it.
    fn register_and_press(&mut self, sample: &TouchSample) {
        let Some(p) = sample.action_pointer() else {
            return;
        };
        let Some(pointer) = self.state.pointers.add(p.id, sample.action_index) else {
            debug!(pointer = p.id.0, "pointer ignored: already tracked or registry full");
            return;
        };
        pointer.position = kurbo::Point::new(p.x, p.y);
        self.swipe
            .on_touch_down(p.id, sample.action_index, p.x, p.y, sample.time_ms);
        self.state.touch_down(p.id);
    }

    fn on_down(&mut self, sample: &TouchSample) {
        self.register_and_press(sample);
    }

    fn on_pointer_down(&mut self, sample: &TouchSample) {
        let Some(p) = sample.action_pointer() else {
            return;
        };
        if self.state.pointers.find_by_id(p.id).is_some() {
            debug!(pointer = p.id.0, "pointer went down twice, dropping stale record");
            self.swipe.on_touch_cancel(p.id, &mut self.state);
            self.state.touch_cancel(p.id);
            self.state.release_pointer(p.id);
        }
        // A new finger releases every other finger resting on a popup key.
        let popup_holders: Vec<PointerId> = self
            .state
            .pointers
            .iter()
            .filter(|other| {
                other
                    .active_key
                    .and_then(|key| self.state.layout.key(key))
                    .is_some_and(|key| self.state.collab.popup.is_suitable_for_popups(key))
            })
            .map(|other| other.id)
            .collect();
        for id in popup_holders {
            self.swipe.on_touch_cancel(id, &mut self.state);
            self.state.touch_up(id);
        }
        self.register_and_press(sample);
    }

    fn on_move(&mut self, sample: &TouchSample) {
        for (index, p) in sample.pointers.iter().enumerate() {
            let Some(pointer) = self.state.pointers.find_by_id_mut(p.id) else {
                continue;
            };
            pointer.index = index;
            pointer.position = kurbo::Point::new(p.x, p.y);
            let triggered = pointer.has_triggered_gesture_move;

            let always_trigger = triggered
                && match self.state.initial_code(p.id) {
                    Some(KeyCode::DELETE) => {
                        self.state.settings.gestures.delete_key_swipe_left == SwipeAction::DeleteCharactersPrecisely
                    }
                    Some(code) => code.is_space(),
                    None => false,
                };
            let fired = self
                .swipe
                .on_touch_move(p.id, p.x, p.y, sample.time_ms, always_trigger, &mut self.state);
            if fired || triggered {
                self.state.suppress_press_for_gesture(p.id);
            } else {
                self.state.touch_move(p.id);
            }
        }
    }

    /// Runs the swipe UP for a lifted pointer and finishes its press.
    fn lift(&mut self, sample: &TouchSample, id: PointerId) {
        let Some(p) = sample.pointer(id) else {
            return;
        };
        if let Some(pointer) = self.state.pointers.find_by_id_mut(id) {
            pointer.index = sample.action_index;
            pointer.position = kurbo::Point::new(p.x, p.y);
        }
        let handled = self
            .swipe
            .on_touch_up(id, p.x, p.y, sample.time_ms, &mut self.state);
        self.state.finish_pointer(id, handled);
    }

    fn on_pointer_up(&mut self, sample: &TouchSample) {
        let Some(id) = sample.action_pointer().map(|p| p.id) else {
            return;
        };
        if self.state.pointers.find_by_id(id).is_none() {
            trace!(pointer = id.0, "pointer up for untracked pointer");
            return;
        }
        self.lift(sample, id);
        self.state.release_pointer(id);
    }

    fn on_up(&mut self, sample: &TouchSample) {
        let lifted = sample.action_pointer().map(|p| p.id);
        for id in self.state.pointers.ids() {
            if Some(id) == lifted {
                self.lift(sample, id);
            } else {
                self.swipe.on_touch_cancel(id, &mut self.state);
                self.state.touch_cancel(id);
            }
        }
        self.state.clear_pointers();
        self.swipe.clear();
    }

    fn on_cancel(&mut self) {
        for id in self.state.pointers.ids() {
            self.swipe.on_touch_cancel(id, &mut self.state);
            self.state.touch_cancel(id);
        }
        self.state.clear_pointers();
        self.swipe.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use mockall::predicate::eq;
    use osk_core::{Key, KeyData};

    use super::*;
    use crate::application::collaborators::{InputKeyEvent, MockKeyboardController};
    use crate::application::glide::GlideListener;
    use crate::infrastructure::collaborators::InMemoryCollaborators;
    use crate::infrastructure::layouts::rows_for;

    /// Glide detector double that counts offers and never claims.
    struct CountingGlide {
        offers: Arc<Mutex<usize>>,
    }

    impl GlideDetector for CountingGlide {
        fn on_touch_event(&mut self, _: &TouchSample, _: Option<&Key>, _: &mut dyn GlideListener) -> bool {
            *self.offers.lock().unwrap() += 1;
            false
        }
    }

    fn build(
        settings: TouchSettings,
        keyboard: MockKeyboardController,
    ) -> (TouchController, InMemoryCollaborators) {
        let memory = InMemoryCollaborators::new(KeyboardMode::Characters, "hello");
        let mut collab = memory.collaborators();
        collab.keyboard = Arc::new(keyboard);
        let layout = KeyboardLayout::new(KeyboardMode::Characters, rows_for(KeyboardMode::Characters));
        let mut controller = TouchController::new(layout, settings, collab);
        controller.layout(1000.0, 240.0).unwrap();
        (controller, memory)
    }

    fn any_mode_keyboard(mode: KeyboardMode) -> MockKeyboardController {
        let mut keyboard = MockKeyboardController::new();
        keyboard.expect_mode().return_const(mode);
        keyboard
    }

    fn sample(action: TouchAction, x: f64, y: f64, t: u64) -> TouchSample {
        TouchSample::single(action, 0, x, y, t)
    }

    #[test]
    fn test_hover_is_not_consumed() {
        let (mut controller, memory) = build(TouchSettings::default(), any_mode_keyboard(KeyboardMode::Characters));

        let consumed = controller.on_touch_event(&sample(TouchAction::Hover, 50.0, 25.0, 0));

        assert!(!consumed);
        assert!(memory.input.history().is_empty());
    }

    #[test]
    fn test_tap_emits_down_then_up() {
        // Arrange
        let (mut controller, memory) = build(TouchSettings::default(), any_mode_keyboard(KeyboardMode::Characters));

        // Act
        controller.on_touch_event(&sample(TouchAction::Down, 50.0, 25.0, 0));
        controller.on_touch_event(&sample(TouchAction::Up, 52.0, 26.0, 60));

        // Assert
        assert_eq!(
            memory.input.history(),
            vec![InputKeyEvent::Down(KeyData::char('q')), InputKeyEvent::Up(KeyData::char('q'))]
        );
        assert_eq!(controller.active_pointer_count(), 0);
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_offset_converts_screen_coordinates() {
        let (mut controller, memory) = build(TouchSettings::default(), any_mode_keyboard(KeyboardMode::Characters));
        controller.set_offset(0.0, 500.0);

        controller.on_touch_event(&sample(TouchAction::Down, 50.0, 525.0, 0));

        assert_eq!(memory.input.history(), vec![InputKeyEvent::Down(KeyData::char('q'))]);
    }

    #[test]
    fn test_quick_flick_executes_configured_swipe_action() {
        // Arrange
        let mut settings = TouchSettings::default();
        settings.gestures.swipe_up = SwipeAction::Undo;
        let mut keyboard = any_mode_keyboard(KeyboardMode::Characters);
        keyboard
            .expect_execute_swipe_action()
            .with(eq(SwipeAction::Undo))
            .times(1)
            .return_const(());
        let (mut controller, memory) = build(settings, keyboard);

        // Act: 'x' is at (300, 150); release two rows higher 20 ms later.
        controller.on_touch_event(&sample(TouchAction::Down, 300.0, 150.0, 0));
        controller.on_touch_event(&sample(TouchAction::Up, 300.0, 30.0, 20));

        // Assert: the press is withdrawn rather than typed.
        assert_eq!(
            memory.input.history(),
            vec![InputKeyEvent::Down(KeyData::char('x')), InputKeyEvent::Cancel(KeyData::char('x'))]
        );
    }

    #[test]
    fn test_unbound_flick_releases_the_pressed_key() {
        let mut keyboard = any_mode_keyboard(KeyboardMode::Characters);
        keyboard.expect_execute_swipe_action().never();
        let (mut controller, memory) = build(TouchSettings::default(), keyboard);

        controller.on_touch_event(&sample(TouchAction::Down, 300.0, 150.0, 0));
        controller.on_touch_event(&sample(TouchAction::Up, 300.0, 30.0, 20));

        assert_eq!(
            memory.input.history(),
            vec![
                InputKeyEvent::Down(KeyData::char('x')),
                InputKeyEvent::Up(KeyData::char('x')),
            ]
        );
    }

    #[test]
    fn test_glide_detector_only_offered_in_characters_mode() {
        // Arrange
        let mut settings = TouchSettings::default();
        settings.glide.enabled = true;
        let offers = Arc::new(Mutex::new(0));

        let (controller, _memory) = build(settings.clone(), any_mode_keyboard(KeyboardMode::Symbols));
        let mut symbols = controller.with_glide_detector(Box::new(CountingGlide { offers: offers.clone() }));
        let (controller, _memory) = build(settings, any_mode_keyboard(KeyboardMode::Characters));
        let mut characters = controller.with_glide_detector(Box::new(CountingGlide { offers: offers.clone() }));

        // Act
        symbols.on_touch_event(&sample(TouchAction::Down, 50.0, 25.0, 0));
        symbols.on_touch_event(&sample(TouchAction::Up, 50.0, 25.0, 10));
        assert_eq!(*offers.lock().unwrap(), 0);
        characters.on_touch_event(&sample(TouchAction::Down, 50.0, 25.0, 0));
        characters.on_touch_event(&sample(TouchAction::Up, 50.0, 25.0, 10));

        // Assert
        assert_eq!(*offers.lock().unwrap(), 2);
    }

    #[test]
    fn test_replace_keys_cancels_in_flight_press() {
        // Arrange
        let (mut controller, memory) = build(TouchSettings::default(), any_mode_keyboard(KeyboardMode::Characters));
        controller.on_touch_event(&sample(TouchAction::Down, 50.0, 25.0, 0));

        // Act
        controller.replace_keys(KeyboardMode::Symbols, rows_for(KeyboardMode::Symbols));
        controller.on_touch_event(&sample(TouchAction::Up, 50.0, 25.0, 50));

        // Assert
        assert_eq!(
            memory.input.history(),
            vec![InputKeyEvent::Down(KeyData::char('q')), InputKeyEvent::Cancel(KeyData::char('q'))]
        );
        assert_eq!(controller.keyboard_layout().mode(), KeyboardMode::Symbols);
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_relayout_keeps_pointer_on_its_key() {
        let (mut controller, memory) = build(TouchSettings::default(), any_mode_keyboard(KeyboardMode::Characters));
        controller.on_touch_event(&sample(TouchAction::Down, 50.0, 25.0, 0));

        controller.layout(2000.0, 480.0).unwrap();
        controller.on_touch_event(&sample(TouchAction::Up, 100.0, 27.0, 40));

        assert_eq!(memory.input.history().last(), Some(&InputKeyEvent::Up(KeyData::char('q'))));
    }

    #[test]
    fn test_layout_rejects_zero_size() {
        let (mut controller, _memory) = build(TouchSettings::default(), any_mode_keyboard(KeyboardMode::Characters));
        assert!(controller.layout(0.0, 240.0).is_err());
    }

    #[test]
    fn test_draw_marks_pressed_key() {
        let (mut controller, _memory) = build(TouchSettings::default(), any_mode_keyboard(KeyboardMode::Characters));
        controller.on_touch_event(&sample(TouchAction::Down, 50.0, 25.0, 0));

        let pressed = controller
            .draw()
            .into_iter()
            .filter(|d| matches!(d, DrawInstruction::KeyBackground { pressed: true, .. }))
            .count();

        assert_eq!(pressed, 1);
    }
}
