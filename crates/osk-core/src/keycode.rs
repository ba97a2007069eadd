//! Key codes understood by the touch core.
//!
//! A [`KeyCode`] is the resolved action code of a key.  Printable keys use
//! their Unicode scalar value (so `'a'` is `97` and the space bar is `32`);
//! functional keys (shift, delete, view switches, ...) use negative values so
//! they can never collide with a character.
//!
//! # Why not an enum? (for beginners)
//!
//! The set of printable characters is open-ended: any layout can introduce a
//! key for any Unicode character.  A Rust `enum` would need one variant per
//! character, so instead the code is a thin newtype around `i32` with named
//! constants for the functional keys the core cares about.
//!
//! | Key              | Code     |
//! |------------------|----------|
//! | Letter `a`       | 97       |
//! | Space            | 32       |
//! | Shift            | -11      |
//! | Delete           | -7       |
//! | Language switch  | -210     |

use serde::{Deserialize, Serialize};

/// Resolved action code of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub i32);

impl KeyCode {
    pub const UNSPECIFIED: KeyCode = KeyCode(0);
    pub const ENTER: KeyCode = KeyCode(10);
    pub const SPACE: KeyCode = KeyCode(32);
    /// Ideographic space used by CJK layouts; behaves like [`KeyCode::SPACE`].
    pub const CJK_SPACE: KeyCode = KeyCode(12288);

    pub const DELETE: KeyCode = KeyCode(-7);
    pub const DELETE_WORD: KeyCode = KeyCode(-8);
    pub const SHIFT: KeyCode = KeyCode(-11);
    pub const CAPS_LOCK: KeyCode = KeyCode(-13);

    pub const ARROW_LEFT: KeyCode = KeyCode(-21);
    pub const ARROW_RIGHT: KeyCode = KeyCode(-22);
    pub const ARROW_UP: KeyCode = KeyCode(-23);
    pub const ARROW_DOWN: KeyCode = KeyCode(-24);

    pub const VIEW_CHARACTERS: KeyCode = KeyCode(-201);
    pub const VIEW_SYMBOLS: KeyCode = KeyCode(-202);
    pub const VIEW_NUMERIC: KeyCode = KeyCode(-204);
    pub const LANGUAGE_SWITCH: KeyCode = KeyCode(-210);
    pub const SHOW_INPUT_METHOD_PICKER: KeyCode = KeyCode(-211);

    /// Returns `true` for either flavour of space bar.
    pub fn is_space(self) -> bool {
        self == Self::SPACE || self == Self::CJK_SPACE
    }

    /// Returns `true` for codes that produce a character other than space.
    ///
    /// Generic per-direction swipe actions are only bound to these keys.
    pub fn is_printable(self) -> bool {
        self > Self::SPACE && !self.is_space()
    }

    /// Returns `true` when the code is an alphabetic character.
    ///
    /// Glide typing may only start from a letter key.
    pub fn is_letter(self) -> bool {
        u32::try_from(self.0)
            .ok()
            .and_then(char::from_u32)
            .map(char::is_alphabetic)
            .unwrap_or(false)
    }

    /// Returns the character this code produces, if it is printable.
    pub fn as_char(self) -> Option<char> {
        if self.0 < Self::SPACE.0 {
            return None;
        }
        u32::try_from(self.0).ok().and_then(char::from_u32)
    }
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        KeyCode(c as i32)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
