//! Key data model.
//!
//! A [`Key`] is one record in the keyboard's key table.  It carries the
//! resolved [`KeyData`] (code + label), geometry computed by the layout, the
//! enabled/pressed flags, and the alternates shown by an extended popup.
//!
//! Keys are addressed through [`KeyId`] handles rather than references.  A
//! handle stays valid across a relayout (geometry changes only) and becomes
//! stale when the key set itself is replaced, which the layout detects by
//! comparing generations.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::keycode::KeyCode;

/// Arena handle to a key in a [`KeyboardLayout`](crate::domain::layout::KeyboardLayout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId {
    /// Generation of the key set this handle was issued for.
    pub generation: u32,
    /// Position of the key in the key table.
    pub index: u32,
}

/// The resolved output of a key: what it types and how it is labelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyData {
    pub code: KeyCode,
    pub label: String,
}

impl KeyData {
    pub fn new(code: KeyCode, label: impl Into<String>) -> Self {
        Self {
            code,
            label: label.into(),
        }
    }

    /// Data for a key that types `c`.
    pub fn char(c: char) -> Self {
        Self::new(KeyCode::from(c), c.to_string())
    }

    pub fn space() -> Self {
        Self::new(KeyCode::SPACE, "space")
    }

    pub fn shift() -> Self {
        Self::new(KeyCode::SHIFT, "shift")
    }

    pub fn delete() -> Self {
        Self::new(KeyCode::DELETE, "delete")
    }

    pub fn caps_lock() -> Self {
        Self::new(KeyCode::CAPS_LOCK, "caps")
    }

    pub fn arrow_left() -> Self {
        Self::new(KeyCode::ARROW_LEFT, "left")
    }

    pub fn arrow_right() -> Self {
        Self::new(KeyCode::ARROW_RIGHT, "right")
    }

    pub fn language_switch() -> Self {
        Self::new(KeyCode::LANGUAGE_SWITCH, "lang")
    }

    pub fn input_method_picker() -> Self {
        Self::new(KeyCode::SHOW_INPUT_METHOD_PICKER, "ime")
    }
}

/// Declarative description of a key, used to build a layout.
///
/// `width_factor` is relative to the desired key width.  Spare row width is
/// distributed to keys proportionally to `grow`; overflow is removed
/// proportionally to `shrink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySpec {
    pub data: KeyData,
    #[serde(default = "default_factor")]
    pub width_factor: f64,
    #[serde(default)]
    pub grow: f64,
    #[serde(default = "default_factor")]
    pub shrink: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub popup: Vec<KeyData>,
}

fn default_factor() -> f64 {
    1.0
}
fn default_enabled() -> bool {
    true
}

impl KeySpec {
    pub fn new(data: KeyData) -> Self {
        Self {
            data,
            width_factor: default_factor(),
            grow: 0.0,
            shrink: default_factor(),
            enabled: default_enabled(),
            popup: Vec::new(),
        }
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyData::char(c))
    }

    pub fn with_width(mut self, width_factor: f64) -> Self {
        self.width_factor = width_factor;
        self
    }

    /// Marks the key as absorbing spare row width (e.g. the space bar).
    pub fn growing(mut self) -> Self {
        self.grow = 1.0;
        self
    }

    pub fn with_popup(mut self, popup: Vec<KeyData>) -> Self {
        self.popup = popup;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A key record owned by the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub id: KeyId,
    pub data: KeyData,
    pub width_factor: f64,
    pub grow: f64,
    pub shrink: f64,
    pub enabled: bool,
    /// Set while a pointer is pressing this key.
    pub pressed: bool,
    /// Alternates offered by the extended popup.
    pub popup: Vec<KeyData>,
    /// Full hit area; tiles the keyboard without gaps.
    pub touch_bounds: Rect,
    /// Drawn area, inset by the key margins; narrower than `touch_bounds`
    /// when the row has spare height.
    pub visible_bounds: Rect,
}

impl Key {
    pub fn from_spec(id: KeyId, spec: KeySpec) -> Self {
        Self {
            id,
            data: spec.data,
            width_factor: spec.width_factor,
            grow: spec.grow,
            shrink: spec.shrink,
            enabled: spec.enabled,
            pressed: false,
            popup: spec.popup,
            touch_bounds: Rect::ZERO,
            visible_bounds: Rect::ZERO,
        }
    }

    pub fn code(&self) -> KeyCode {
        self.data.code
    }

    /// Returns `true` when the point lies within `visible_bounds` grown by the
    /// given fractions of the visible width and height.
    ///
    /// Used for move re-targeting, where a finger may drift slightly past the
    /// drawn key before it counts as having left it.
    pub fn is_within_tolerance(&self, x: f64, y: f64, tol_x: f64, tol_y: f64) -> bool {
        let v = self.visible_bounds;
        let dx = tol_x * v.width();
        let dy = tol_y * v.height();
        x >= v.x0 - dx && x <= v.x1 + dx && y >= v.y0 - dy && y <= v.y1 + dy
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
