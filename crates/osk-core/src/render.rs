//! Render boundary.
//!
//! The core never draws anything itself.  [`render`] turns the current key
//! table and glide trail into a flat list of [`DrawInstruction`]s that any
//! frontend (a GPU renderer, a terminal preview, a test) can consume.

use kurbo::{Point, Rect};

use crate::domain::layout::KeyboardLayout;

/// One dot of the glide trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailDot {
    pub center: Point,
    pub radius: f64,
}

/// A toolkit-independent drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    /// Key background over the key's visible bounds.
    KeyBackground { bounds: Rect, pressed: bool, enabled: bool },
    /// Key label centred in `bounds`.
    KeyLabel { bounds: Rect, text: String },
    /// Glide trail dot.
    TrailDot { center: Point, radius: f64 },
}

/// Produces draw instructions for every key (background then label) followed
/// by the glide trail.
pub fn render(layout: &KeyboardLayout, trail: &[TrailDot]) -> Vec<DrawInstruction> {
    let mut out = Vec::with_capacity(layout.keys().count() * 2 + trail.len());
    for key in layout.keys() {
        out.push(DrawInstruction::KeyBackground {
            bounds: key.visible_bounds,
            pressed: key.pressed,
            enabled: key.enabled,
        });
        if !key.data.label.is_empty() {
            out.push(DrawInstruction::KeyLabel {
                bounds: key.visible_bounds,
                text: key.data.label.clone(),
            });
        }
    }
    out.extend(
        trail
            .iter()
            .filter(|dot| dot.radius > 0.0)
            .map(|dot| DrawInstruction::TrailDot {
                center: dot.center,
                radius: dot.radius,
            }),
    );
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
