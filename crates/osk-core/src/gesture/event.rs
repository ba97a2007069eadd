//! Touch samples in, gesture events out.
//!
//! A [`TouchSample`] is one hardware report: which action happened, which
//! pointer it happened to, and where every live pointer currently is.  The
//! swipe detector turns a pointer's sequence of samples into [`SwipeEvent`]s.

use serde::{Deserialize, Serialize};

use crate::domain::pointer::PointerId;

/// What a raw sample reports.
///
/// `Down` and `Up` are the first and last finger of a touch; `PointerDown`
/// and `PointerUp` are additional fingers joining or leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    PointerDown,
    Move,
    PointerUp,
    Up,
    Cancel,
    Hover,
}

/// One pointer's position within a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub id: PointerId,
    pub x: f64,
    pub y: f64,
}

/// A single hardware touch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    pub action: TouchAction,
    /// Index into `pointers` of the pointer `action` applies to.
    #[serde(default)]
    pub action_index: usize,
    /// Every live pointer, in hardware order.
    pub pointers: Vec<PointerSample>,
    /// Event time in milliseconds on a monotonic clock.
    pub time_ms: u64,
}

impl TouchSample {
    /// A sample with a single pointer.
    pub fn single(action: TouchAction, id: i32, x: f64, y: f64, time_ms: u64) -> Self {
        Self {
            action,
            action_index: 0,
            pointers: vec![PointerSample {
                id: PointerId(id),
                x,
                y,
            }],
            time_ms,
        }
    }

    /// The pointer the action applies to.
    pub fn action_pointer(&self) -> Option<&PointerSample> {
        self.pointers.get(self.action_index)
    }

    pub fn pointer(&self, id: PointerId) -> Option<&PointerSample> {
        self.pointers.iter().find(|p| p.id == id)
    }
}

/// Dominant direction of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    /// Movement below the distance threshold.
    None,
}

/// Phase of the gesture a [`SwipeEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeType {
    TouchMove,
    TouchUp,
    TouchCancel,
}

/// A recognised swipe step.
///
/// Counts are displacements measured in key units (key width horizontally,
/// row height vertically), truncated toward zero.  `abs_*` is measured from
/// the DOWN position; `rel_*` from the position of the last reported move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeEvent {
    pub pointer_id: PointerId,
    pub direction: Direction,
    pub kind: SwipeType,
    pub abs_unit_count_x: i32,
    pub abs_unit_count_y: i32,
    pub rel_unit_count_x: i32,
    pub rel_unit_count_y: i32,
}

impl SwipeEvent {
    pub fn is_horizontal(&self) -> bool {
        matches!(self.direction, Direction::Left | Direction::Right)
    }
}
