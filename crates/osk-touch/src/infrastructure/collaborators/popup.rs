//! Key preview popup with a row of long-press alternates.

use std::sync::Mutex;

use kurbo::Rect;
use osk_core::{Key, KeyData, KeyId};
use tracing::debug;

use crate::application::collaborators::PopupController;
use crate::application::settings::HintConfig;

#[derive(Debug, Clone)]
struct ExtendedRow {
    key: KeyId,
    alternates: Vec<KeyData>,
    /// One cell per alternate, left to right, above the key.
    cells: Vec<Rect>,
    /// The cells plus the key underneath; motion inside keeps the popup.
    area: Rect,
    selected: usize,
}

#[derive(Debug, Default)]
struct PopupState {
    preview: Option<KeyId>,
    extended: Option<ExtendedRow>,
}

/// Popup that previews the pressed key and expands into a single row of
/// alternates on long press.
#[derive(Debug, Default)]
pub struct ExtendedPopup {
    state: Mutex<PopupState>,
}

impl ExtendedPopup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key whose preview is currently shown.
    pub fn preview_key(&self) -> Option<KeyId> {
        self.lock().preview
    }

    /// Currently selected alternate of the extended popup.
    pub fn selected(&self) -> Option<KeyData> {
        let state = self.lock();
        let row = state.extended.as_ref()?;
        row.alternates.get(row.selected).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PopupState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PopupController for ExtendedPopup {
    fn is_suitable_for_popups(&self, key: &Key) -> bool {
        key.code().is_printable() && !key.code().is_space()
    }

    fn show(&self, key: &Key) {
        let mut state = self.lock();
        state.preview = Some(key.id);
        state.extended = None;
    }

    fn extend(&self, key: &Key, hints: &HintConfig) {
        let alternates = hints.filter(&key.popup);
        if alternates.is_empty() {
            return;
        }
        let v = key.visible_bounds;
        let (w, h) = (v.width(), v.height());
        let cells: Vec<Rect> = (0..alternates.len())
            .map(|i| {
                let x0 = v.x0 + w * i as f64;
                Rect::new(x0, v.y0 - h, x0 + w, v.y0)
            })
            .collect();
        let row_x1 = cells.last().map_or(v.x1, |c| c.x1);
        let area = Rect::new(v.x0, v.y0 - h, row_x1.max(v.x1), v.y1);
        debug!(key = %key.data.label, count = alternates.len(), "popup extended");

        let mut state = self.lock();
        state.preview = Some(key.id);
        state.extended = Some(ExtendedRow {
            key: key.id,
            alternates,
            cells,
            area,
            selected: 0,
        });
    }

    fn hide(&self) {
        let mut state = self.lock();
        state.preview = None;
        state.extended = None;
    }

    fn is_showing_extended_popup(&self) -> bool {
        self.lock().extended.is_some()
    }

    fn propagate_motion(&self, key: &Key, x: f64, _y: f64, _pointer_index: usize) -> bool {
        let mut state = self.lock();
        let Some(row) = state.extended.as_mut().filter(|row| row.key == key.id) else {
            return false;
        };
        if x < row.area.x0 || x > row.area.x1 {
            return false;
        }
        let last = row.cells.len().saturating_sub(1);
        row.selected = row
            .cells
            .iter()
            .position(|cell| x >= cell.x0 && x < cell.x1)
            .unwrap_or(last);
        true
    }

    fn active_key_data(&self, key: &Key, _hints: &HintConfig) -> Option<KeyData> {
        let state = self.lock();
        match state.extended.as_ref().filter(|row| row.key == key.id) {
            Some(row) => row.alternates.get(row.selected).cloned(),
            None => Some(key.data.clone()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
