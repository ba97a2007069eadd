//! Read-only tunables consumed by the touch controller.
//!
//! Each struct is one section of the configuration file (see
//! `infrastructure::storage::config`).  Every field has a serde default so a
//! partial or empty file is always valid, and a missing action binding reads
//! as [`SwipeAction::NoAction`].

use osk_core::{KeyCode, KeyData, SwipeAction, SwipeThresholds};
use serde::{Deserialize, Serialize};

/// Which popup alternates are offered on long press.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HintConfig {
    /// Offer symbol alternates (`!`, `@`, ...).
    #[serde(default = "default_true")]
    pub symbol_hints: bool,
    /// Offer digit alternates.
    #[serde(default = "default_true")]
    pub number_hints: bool,
}

impl HintConfig {
    /// Filters a key's popup alternates according to the hint flags.
    ///
    /// Letters are always offered; digits and symbols only when enabled.
    pub fn filter(&self, alternates: &[KeyData]) -> Vec<KeyData> {
        alternates
            .iter()
            .filter(|alt| match alt.code.as_char() {
                Some(c) if c.is_ascii_digit() => self.number_hints,
                Some(c) if c.is_alphabetic() => true,
                Some(_) => self.symbol_hints,
                None => true,
            })
            .cloned()
            .collect()
    }
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            symbol_hints: default_true(),
            number_hints: default_true(),
        }
    }
}

/// `[keyboard]` section: press timing, popups and key geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyboardSettings {
    /// Base long-press delay; space and shift wait 2.5×, language switch 2×.
    #[serde(default = "default_long_press_delay_ms")]
    pub long_press_delay_ms: u64,
    /// Show the key preview popup on DOWN.
    #[serde(default = "default_true")]
    pub popup_enabled: bool,
    /// Horizontal margin between a key's touch and visible bounds (px).
    #[serde(default = "default_key_spacing_horizontal")]
    pub key_spacing_horizontal: f64,
    /// Vertical margin between a key's touch and visible bounds (px).
    #[serde(default = "default_key_spacing_vertical")]
    pub key_spacing_vertical: f64,
    /// Desired row height (px) before the keyboard height is divided.
    #[serde(default = "default_row_base_height")]
    pub row_base_height: f64,
    /// Maximum number of simultaneously tracked fingers.
    #[serde(default = "default_pointer_capacity")]
    pub pointer_capacity: usize,
    #[serde(default)]
    pub hints: HintConfig,
}

impl KeyboardSettings {
    /// Effective long-press delay for a key.
    pub fn long_press_delay_for(&self, code: KeyCode) -> u64 {
        let base = self.long_press_delay_ms;
        if code.is_space() || code == KeyCode::SHIFT {
            base * 5 / 2
        } else if code == KeyCode::LANGUAGE_SWITCH {
            base * 2
        } else {
            base
        }
    }
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            long_press_delay_ms: default_long_press_delay_ms(),
            popup_enabled: default_true(),
            key_spacing_horizontal: default_key_spacing_horizontal(),
            key_spacing_vertical: default_key_spacing_vertical(),
            row_base_height: default_row_base_height(),
            pointer_capacity: default_pointer_capacity(),
            hints: HintConfig::default(),
        }
    }
}

/// `[gestures]` section: swipe action bindings and detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureSettings {
    #[serde(default)]
    pub swipe_up: SwipeAction,
    #[serde(default)]
    pub swipe_down: SwipeAction,
    #[serde(default)]
    pub swipe_left: SwipeAction,
    #[serde(default)]
    pub swipe_right: SwipeAction,
    #[serde(default)]
    pub space_bar_swipe_up: SwipeAction,
    #[serde(default = "default_space_bar_swipe_left")]
    pub space_bar_swipe_left: SwipeAction,
    #[serde(default = "default_space_bar_swipe_right")]
    pub space_bar_swipe_right: SwipeAction,
    #[serde(default = "default_space_bar_long_press")]
    pub space_bar_long_press: SwipeAction,
    #[serde(default = "default_delete_key_swipe_left")]
    pub delete_key_swipe_left: SwipeAction,
    /// Key units between two reported swipe moves.
    #[serde(default = "default_one")]
    pub move_threshold_units: f64,
    /// Key units a quick flick must cover to count on release.
    #[serde(default = "default_one")]
    pub swipe_distance_threshold_units: f64,
    /// Minimum swipe speed in px/ms.
    #[serde(default = "default_velocity_threshold")]
    pub swipe_velocity_threshold: f64,
}

impl GestureSettings {
    pub fn thresholds(&self) -> SwipeThresholds {
        SwipeThresholds {
            move_units: self.move_threshold_units,
            distance_units: self.swipe_distance_threshold_units,
            velocity: self.swipe_velocity_threshold,
        }
    }
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            swipe_up: SwipeAction::NoAction,
            swipe_down: SwipeAction::NoAction,
            swipe_left: SwipeAction::NoAction,
            swipe_right: SwipeAction::NoAction,
            space_bar_swipe_up: SwipeAction::NoAction,
            space_bar_swipe_left: default_space_bar_swipe_left(),
            space_bar_swipe_right: default_space_bar_swipe_right(),
            space_bar_long_press: default_space_bar_long_press(),
            delete_key_swipe_left: default_delete_key_swipe_left(),
            move_threshold_units: default_one(),
            swipe_distance_threshold_units: default_one(),
            swipe_velocity_threshold: default_velocity_threshold(),
        }
    }
}

/// `[glide]` section: glide typing and its trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlideSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub show_trail: bool,
    /// Trail fade-out duration after the glide ends.
    #[serde(default = "default_trail_duration_ms")]
    pub trail_duration_ms: u64,
    /// How long after DOWN a glide may still start.
    #[serde(default = "default_detect_window_ms")]
    pub detect_window_ms: u64,
    /// Minimum speed in px/ms for a trajectory to count as a glide.
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f64,
}

impl Default for GlideSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            show_trail: default_true(),
            trail_duration_ms: default_trail_duration_ms(),
            detect_window_ms: default_detect_window_ms(),
            velocity_threshold: default_velocity_threshold(),
        }
    }
}

/// Everything the touch controller reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchSettings {
    pub keyboard: KeyboardSettings,
    pub gestures: GestureSettings,
    pub glide: GlideSettings,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_one() -> f64 {
    1.0
}
fn default_long_press_delay_ms() -> u64 {
    300
}
fn default_key_spacing_horizontal() -> f64 {
    2.0
}
fn default_key_spacing_vertical() -> f64 {
    5.0
}
fn default_row_base_height() -> f64 {
    55.0
}
fn default_pointer_capacity() -> usize {
    10
}
fn default_space_bar_swipe_left() -> SwipeAction {
    SwipeAction::MoveCursorLeft
}
fn default_space_bar_swipe_right() -> SwipeAction {
    SwipeAction::MoveCursorRight
}
fn default_space_bar_long_press() -> SwipeAction {
    SwipeAction::ShowInputMethodPicker
}
fn default_delete_key_swipe_left() -> SwipeAction {
    SwipeAction::DeleteCharactersPrecisely
}
fn default_velocity_threshold() -> f64 {
    0.1
}
fn default_trail_duration_ms() -> u64 {
    200
}
fn default_detect_window_ms() -> u64 {
    500
}

// ── Tests ─────────────────────────────────────────────────────────────────────
