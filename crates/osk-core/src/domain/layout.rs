//! Keyboard layout and hit testing.
//!
//! The [`KeyboardLayout`] owns the key table for the current keyboard mode and
//! computes every key's geometry from a row/column model.  All touch
//! positions are expressed in keyboard-local coordinates: `(0, 0)` is the
//! top-left corner of the keyboard surface.
//!
//! # How a row is laid out
//!
//! Each key asks for `width_factor × desired.width` pixels.  When a row asks
//! for less than the keyboard width, the spare width goes to keys with a
//! non-zero `grow` (typically the space bar); when no key grows, the first and
//! last key stretch their *touch* area to the keyboard edges while their
//! *visible* area stays centred, so a touch near the edge still hits a key.
//! When a row asks for more than the keyboard width, keys give width back
//! proportionally to `shrink`.
//!
//! ```text
//!  touch  |<-----q----->|<--w-->|<--e-->| ... |<--p-->|
//!  visible   [  q  ]    [  w  ]  [  e  ]       [  p  ]
//! ```

use std::ops::Range;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::key::{Key, KeyId, KeySpec};

/// Number of desired-width keys that fit across the keyboard.
pub const KEYS_PER_ROW: f64 = 10.0;

/// Errors that can occur when computing the layout.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The keyboard or desired key size is zero, negative or not finite.
    #[error("invalid layout size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

/// Which key set the keyboard is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardMode {
    /// Letter entry.  Glide typing is only available in this mode.
    #[default]
    Characters,
    Symbols,
    Numeric,
}

/// The size and margins every key is laid out against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesiredKey {
    /// Touch width of a `width_factor == 1.0` key.
    pub width: f64,
    /// Touch height of a row.
    pub height: f64,
    /// Horizontal inset of the visible bounds on each side.
    pub margin_h: f64,
    /// Vertical inset of the visible bounds on each side.
    pub margin_v: f64,
}

impl DesiredKey {
    /// Desired key for a keyboard `keyboard_width` wide: ten keys per row.
    pub fn for_keyboard(keyboard_width: f64, row_height: f64, margin_h: f64, margin_v: f64) -> Self {
        Self {
            width: keyboard_width / KEYS_PER_ROW,
            height: row_height,
            margin_h,
            margin_v,
        }
    }
}

/// Vertical extent of one row: the hit band and the drawn band.
#[derive(Debug, Clone, Copy)]
struct RowBand {
    touch_y0: f64,
    touch_y1: f64,
    visible_y0: f64,
    visible_y1: f64,
}

/// Key table plus row model for one keyboard mode.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    mode: KeyboardMode,
    generation: u32,
    keys: Vec<Key>,
    rows: Vec<Range<usize>>,
    desired: Option<DesiredKey>,
    width: f64,
    height: f64,
}

impl KeyboardLayout {
    /// Creates a layout from rows of key specs.  Geometry is empty until
    /// [`KeyboardLayout::layout`] is called.
    pub fn new(mode: KeyboardMode, rows: Vec<Vec<KeySpec>>) -> Self {
        let mut layout = Self {
            mode,
            generation: 0,
            keys: Vec::new(),
            rows: Vec::new(),
            desired: None,
            width: 0.0,
            height: 0.0,
        };
        layout.fill(rows);
        layout
    }

    /// Replaces the key set.  Every previously issued [`KeyId`] becomes stale.
    pub fn replace_keys(&mut self, mode: KeyboardMode, rows: Vec<Vec<KeySpec>>) {
        self.mode = mode;
        self.generation = self.generation.wrapping_add(1);
        self.fill(rows);
        if let Some(desired) = self.desired {
            // Geometry was validated by the previous layout; re-apply it.
            if let Err(e) = self.layout(self.width, self.height, desired) {
                warn!("re-applying layout to replaced keys failed: {e}");
            }
        }
    }

    /// Recomputes `touch_bounds` and `visible_bounds` of every key.
    ///
    /// Key identities are untouched, so pointers holding a [`KeyId`] remain
    /// valid across the call.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidSize`] if the keyboard or desired key
    /// dimensions are not positive and finite.
    pub fn layout(&mut self, width: f64, height: f64, desired: DesiredKey) -> Result<(), LayoutError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) || !valid(desired.width) || !valid(desired.height) {
            return Err(LayoutError::InvalidSize { width, height });
        }
        self.width = width;
        self.height = height;
        self.desired = Some(desired);

        let row_count = self.rows.len();
        if row_count == 0 {
            return Ok(());
        }
        let row_height = desired.height.min(height / row_count as f64);
        let row_gap = if row_count > 1 {
            (height - row_height * row_count as f64) / (row_count - 1) as f64
        } else {
            0.0
        };

        // The gap between drawn rows is split between the neighbouring rows'
        // touch bounds, so every point of the surface belongs to a row.
        let row_top = |r: usize| (row_height + row_gap) * r as f64;
        let boundary = |r: usize| match r {
            0 => 0.0,
            r if r == row_count => height,
            r => row_top(r) - row_gap / 2.0,
        };
        for (r, range) in self.rows.clone().into_iter().enumerate() {
            let pos_y = row_top(r);
            let (touch_y0, touch_y1) = (boundary(r), boundary(r + 1));
            let band = RowBand {
                touch_y0,
                touch_y1,
                visible_y0: pos_y + desired.margin_v,
                visible_y1: pos_y + row_height - desired.margin_v,
            };
            self.layout_row(range, band, desired);
        }
        Ok(())
    }

    /// Returns the key whose touch bounds contain `(x, y)`.
    pub fn key_for_pos(&self, x: f64, y: f64) -> Option<KeyId> {
        let point = Point::new(x, y);
        for range in &self.rows {
            let Some(first) = self.keys.get(range.start) else {
                continue;
            };
            let bounds = first.touch_bounds;
            if y < bounds.y0 || y >= bounds.y1 {
                continue;
            }
            return self.keys[range.clone()]
                .iter()
                .find(|key| key.touch_bounds.contains(point))
                .map(|key| key.id);
        }
        None
    }

    /// Looks up a key; stale handles from a replaced key set return `None`.
    pub fn key(&self, id: KeyId) -> Option<&Key> {
        if id.generation != self.generation {
            return None;
        }
        self.keys.get(id.index as usize)
    }

    pub fn key_mut(&mut self, id: KeyId) -> Option<&mut Key> {
        if id.generation != self.generation {
            return None;
        }
        self.keys.get_mut(id.index as usize)
    }

    /// All keys in row order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Finds the first key producing `code`.
    pub fn find_by_code(&self, code: crate::keycode::KeyCode) -> Option<&Key> {
        self.keys.iter().find(|key| key.code() == code)
    }

    pub fn mode(&self) -> KeyboardMode {
        self.mode
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The desired key used by the last successful layout.
    pub fn desired_key(&self) -> Option<DesiredKey> {
        self.desired
    }

    /// Keyboard surface bounds in local coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn fill(&mut self, rows: Vec<Vec<KeySpec>>) {
        self.keys.clear();
        self.rows.clear();
        for row in rows {
            let start = self.keys.len();
            for spec in row {
                let id = KeyId {
                    generation: self.generation,
                    index: self.keys.len() as u32,
                };
                self.keys.push(Key::from_spec(id, spec));
            }
            if self.keys.len() > start {
                self.rows.push(start..self.keys.len());
            }
        }
    }

    fn layout_row(&mut self, range: Range<usize>, band: RowBand, desired: DesiredKey) {
        let available = self.width / desired.width;
        let row = &mut self.keys[range];
        let last = row.len() - 1;

        let requested: f64 = row.iter().map(|k| k.width_factor).sum();
        let grow_sum: f64 = row.iter().map(|k| k.grow).sum();
        let shrink_sum: f64 = row.iter().map(|k| k.shrink).sum();

        let mut pos_x = 0.0;
        for (k, key) in row.iter_mut().enumerate() {
            // Extra width (in factor units) added before and after the visible key.
            let (mut lead, mut trail) = (0.0, 0.0);
            let factor = if requested <= available {
                let extra = available - requested;
                if grow_sum > 0.0 {
                    key.width_factor + extra * (key.grow / grow_sum)
                } else {
                    if k == 0 {
                        lead = extra / 2.0;
                    }
                    if k == last {
                        trail = extra / 2.0;
                    }
                    key.width_factor + lead + trail
                }
            } else if shrink_sum > 0.0 {
                let clip = requested - available;
                (key.width_factor - clip * (key.shrink / shrink_sum)).max(0.0)
            } else {
                key.width_factor
            };

            let key_width = desired.width * factor;
            key.touch_bounds = Rect::new(pos_x, band.touch_y0, pos_x + key_width, band.touch_y1);
            key.visible_bounds = Rect::new(
                key.touch_bounds.x0 + lead * desired.width + desired.margin_h,
                band.visible_y0,
                key.touch_bounds.x1 - trail * desired.width - desired.margin_h,
                band.visible_y1,
            );
            pos_x += key_width;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key::KeyData;
    use crate::keycode::KeyCode;

    fn qwerty_rows() -> Vec<Vec<KeySpec>> {
        vec![
            "qwertyuiop".chars().map(KeySpec::char).collect(),
            "asdfghjkl".chars().map(KeySpec::char).collect(),
            vec![KeySpec::new(KeyData::shift()).with_width(1.5)]
                .into_iter()
                .chain("zxcvbnm".chars().map(KeySpec::char))
                .chain([KeySpec::new(KeyData::delete()).with_width(1.5)])
                .collect(),
            vec![
                KeySpec::new(KeyData::new(KeyCode::VIEW_SYMBOLS, "?123")).with_width(1.5),
                KeySpec::char(','),
                KeySpec::new(KeyData::space()).with_width(5.0).growing(),
                KeySpec::char('.'),
                KeySpec::new(KeyData::new(KeyCode::ENTER, "enter")).with_width(1.5),
            ],
        ]
    }

    fn laid_out() -> KeyboardLayout {
        let mut layout = KeyboardLayout::new(KeyboardMode::Characters, qwerty_rows());
        layout
            .layout(1000.0, 240.0, DesiredKey::for_keyboard(1000.0, 60.0, 2.0, 5.0))
            .unwrap();
        layout
    }

    fn code_at(layout: &KeyboardLayout, x: f64, y: f64) -> Option<KeyCode> {
        layout.key_for_pos(x, y).and_then(|id| layout.key(id)).map(|k| k.code())
    }

    // ── layout ────────────────────────────────────────────────────────────────

    #[test]
    fn test_full_row_tiles_keyboard_width() {
        let layout = laid_out();
        let q = layout.find_by_code(KeyCode::from('q')).unwrap();
        let p = layout.find_by_code(KeyCode::from('p')).unwrap();
        assert_eq!(q.touch_bounds, Rect::new(0.0, 0.0, 100.0, 60.0));
        assert_eq!(p.touch_bounds.x1, 1000.0);
    }

    #[test]
    fn test_visible_bounds_are_inset_by_margins() {
        let layout = laid_out();
        let w = layout.find_by_code(KeyCode::from('w')).unwrap();
        assert_eq!(w.visible_bounds, Rect::new(102.0, 5.0, 198.0, 55.0));
    }

    #[test]
    fn test_short_row_edge_keys_stretch_touch_but_not_visible_bounds() {
        // Row 2 has nine keys: half a key of spare width on each side.
        let layout = laid_out();
        let a = layout.find_by_code(KeyCode::from('a')).unwrap();
        let l = layout.find_by_code(KeyCode::from('l')).unwrap();
        assert_eq!(a.touch_bounds.x0, 0.0);
        assert_eq!(a.touch_bounds.x1, 150.0);
        assert_eq!(a.visible_bounds.x0, 52.0);
        assert_eq!(l.touch_bounds.x1, 1000.0);
        assert_eq!(l.visible_bounds.x1, 948.0);
    }

    #[test]
    fn test_growing_key_absorbs_spare_width() {
        // Bottom row requests 1.5 + 1 + 5 + 1 + 1.5 = 10 units: no spare width.
        let mut rows = qwerty_rows();
        rows[3][2].width_factor = 3.0;
        let mut layout = KeyboardLayout::new(KeyboardMode::Characters, rows);
        layout
            .layout(1000.0, 240.0, DesiredKey::for_keyboard(1000.0, 60.0, 0.0, 0.0))
            .unwrap();
        let space = layout.find_by_code(KeyCode::SPACE).unwrap();
        assert_eq!(space.touch_bounds.width(), 500.0);
    }

    #[test]
    fn test_overfull_row_shrinks_to_fit() {
        let rows = vec!["abcdefghijkl".chars().map(KeySpec::char).collect()];
        let mut layout = KeyboardLayout::new(KeyboardMode::Characters, rows);
        layout
            .layout(1000.0, 60.0, DesiredKey::for_keyboard(1000.0, 60.0, 0.0, 0.0))
            .unwrap();
        let last = layout.keys().last().unwrap();
        assert!((last.touch_bounds.x1 - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_rejects_zero_size() {
        let mut layout = KeyboardLayout::new(KeyboardMode::Characters, qwerty_rows());
        let result = layout.layout(0.0, 240.0, DesiredKey::for_keyboard(1000.0, 60.0, 0.0, 0.0));
        assert!(matches!(result, Err(LayoutError::InvalidSize { .. })));
    }

    // ── key_for_pos ───────────────────────────────────────────────────────────

    #[test]
    fn test_key_for_pos_resolves_each_row() {
        let layout = laid_out();
        assert_eq!(code_at(&layout, 5.0, 5.0), Some(KeyCode::from('q')));
        assert_eq!(code_at(&layout, 160.0, 70.0), Some(KeyCode::from('s')));
        assert_eq!(code_at(&layout, 10.0, 130.0), Some(KeyCode::SHIFT));
        assert_eq!(code_at(&layout, 500.0, 200.0), Some(KeyCode::SPACE));
    }

    #[test]
    fn test_key_for_pos_in_margin_still_hits_touch_bounds() {
        let layout = laid_out();
        // x = 101 is inside w's touch bounds but left of its visible bounds.
        assert_eq!(code_at(&layout, 101.0, 1.0), Some(KeyCode::from('w')));
    }

    #[test]
    fn test_key_for_pos_outside_keyboard_returns_none() {
        let layout = laid_out();
        assert_eq!(layout.key_for_pos(500.0, -1.0), None);
        assert_eq!(layout.key_for_pos(500.0, 240.0), None);
        assert_eq!(layout.key_for_pos(1000.0, 10.0), None);
    }

    #[test]
    fn test_row_gaps_are_covered_by_touch_bounds() {
        // Arrange: 55 px rows on a 240 px surface leave 6.67 px between rows.
        let mut layout = KeyboardLayout::new(KeyboardMode::Characters, qwerty_rows());
        layout
            .layout(1000.0, 240.0, DesiredKey::for_keyboard(1000.0, 55.0, 2.0, 5.0))
            .unwrap();

        // Act / Assert: every scanline hits a key.
        for y in 0..240 {
            assert!(layout.key_for_pos(50.0, y as f64).is_some(), "no key at y = {y}");
        }
        // Between row 0 (drawn 0..55) and row 1 (drawn from 61.67).
        assert_eq!(code_at(&layout, 50.0, 57.0), Some(KeyCode::from('q')));
        assert_eq!(code_at(&layout, 50.0, 60.0), Some(KeyCode::from('a')));
    }

    #[test]
    fn test_tall_surface_has_no_dead_scanlines() {
        let mut layout = KeyboardLayout::new(KeyboardMode::Characters, qwerty_rows());
        layout
            .layout(1080.0, 720.0, DesiredKey::for_keyboard(1080.0, 55.0, 2.0, 5.0))
            .unwrap();

        let misses = (0..720).filter(|&y| layout.key_for_pos(540.0, y as f64).is_none()).count();

        assert_eq!(misses, 0);
    }

    #[test]
    fn test_row_gap_does_not_grow_visible_bounds() {
        let mut layout = KeyboardLayout::new(KeyboardMode::Characters, qwerty_rows());
        layout
            .layout(1000.0, 240.0, DesiredKey::for_keyboard(1000.0, 55.0, 2.0, 5.0))
            .unwrap();

        let q = layout.find_by_code(KeyCode::from('q')).unwrap();

        assert_eq!(q.visible_bounds.y0, 5.0);
        assert_eq!(q.visible_bounds.y1, 50.0);
        assert!(q.touch_bounds.y1 > 55.0);
    }

    // ── identity ──────────────────────────────────────────────────────────────

    #[test]
    fn test_relayout_preserves_key_identity() {
        let mut layout = laid_out();
        let id = layout.key_for_pos(5.0, 5.0).unwrap();

        layout
            .layout(500.0, 120.0, DesiredKey::for_keyboard(500.0, 30.0, 1.0, 2.0))
            .unwrap();

        let key = layout.key(id).expect("id must survive relayout");
        assert_eq!(key.code(), KeyCode::from('q'));
        assert_eq!(key.touch_bounds, Rect::new(0.0, 0.0, 50.0, 30.0));
    }

    #[test]
    fn test_replacing_keys_invalidates_old_ids() {
        let mut layout = laid_out();
        let id = layout.key_for_pos(5.0, 5.0).unwrap();

        layout.replace_keys(KeyboardMode::Symbols, vec!["1234567890".chars().map(KeySpec::char).collect()]);

        assert!(layout.key(id).is_none());
        assert_eq!(layout.mode(), KeyboardMode::Symbols);
        // Geometry is recomputed for the new key set.
        assert_eq!(code_at(&layout, 5.0, 5.0), Some(KeyCode::from('1')));
    }
}
