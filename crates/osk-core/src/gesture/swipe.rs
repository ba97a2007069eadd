//! Swipe gesture recognizer.
//!
//! [`SwipeDetector`] watches every tracked pointer's trajectory and reports
//! [`SwipeEvent`]s to a [`SwipeListener`].  Displacements are measured in key
//! units so a gesture means the same thing on a phone and on a tablet.
//!
//! # Reporting rules
//!
//! - **Move:** once the displacement since the last report reaches
//!   `move_units` along the dominant axis a `TouchMove` is reported.  The very
//!   first report of a pointer additionally requires the average speed since
//!   DOWN to reach `velocity`, so a slow drift is not mistaken for a swipe.
//!   After a report the reference point advances by whole units only; the
//!   sub-unit remainder carries over to the next report.
//! - **Up:** always reported.  If no move was reported, the direction is
//!   [`Direction::None`] unless the total displacement reaches
//!   `distance_units` at `velocity` or faster (a quick flick).
//! - **Cancel:** always reported, direction [`Direction::None`].

use kurbo::{Point, Vec2};
use tracing::trace;

use crate::domain::pointer::{PointerId, PointerMap, TrackedPointer};

use super::event::{Direction, SwipeEvent, SwipeType};

/// Receives swipe events; returns `true` when the event was handled.
pub trait SwipeListener {
    fn on_swipe(&mut self, event: &SwipeEvent) -> bool;
}

/// Distance and speed thresholds of the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeThresholds {
    /// Key units between two move reports.
    pub move_units: f64,
    /// Key units a quick flick must travel to count on release.
    pub distance_units: f64,
    /// Minimum average speed in pixels per millisecond.
    pub velocity: f64,
}

impl Default for SwipeThresholds {
    fn default() -> Self {
        Self {
            move_units: 1.0,
            distance_units: 1.0,
            velocity: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
struct GesturePointer {
    id: PointerId,
    first: Point,
    first_time: u64,
    last: Point,
    triggered: bool,
}

impl TrackedPointer for GesturePointer {
    fn new(id: PointerId, _index: usize) -> Self {
        Self {
            id,
            first: Point::ZERO,
            first_time: 0,
            last: Point::ZERO,
            triggered: false,
        }
    }

    fn id(&self) -> PointerId {
        self.id
    }
}

/// Per-pointer swipe recognizer.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    pointers: PointerMap<GesturePointer>,
    unit_width: f64,
    unit_height: f64,
    thresholds: SwipeThresholds,
}

impl SwipeDetector {
    pub fn new(capacity: usize, thresholds: SwipeThresholds) -> Self {
        Self {
            pointers: PointerMap::with_capacity(capacity),
            unit_width: 0.0,
            unit_height: 0.0,
            thresholds,
        }
    }

    /// Sets the size of one key unit in pixels.
    pub fn set_unit_size(&mut self, width: f64, height: f64) {
        self.unit_width = width;
        self.unit_height = height;
    }

    pub fn unit_size(&self) -> (f64, f64) {
        (self.unit_width, self.unit_height)
    }

    /// Starts tracking a pointer from `(x, y)`.
    pub fn on_touch_down(&mut self, id: PointerId, index: usize, x: f64, y: f64, time_ms: u64) {
        self.pointers.remove_by_id(id);
        let Some(pointer) = self.pointers.add(id, index) else {
            trace!(pointer = id.0, "swipe detector full, pointer not tracked");
            return;
        };
        pointer.first = Point::new(x, y);
        pointer.first_time = time_ms;
        pointer.last = pointer.first;
    }

    /// Feeds a move sample.  Returns the listener's answer if a move was
    /// reported, `false` otherwise.
    ///
    /// With `always_trigger` set, a pointer that already reported a move
    /// reports again on every whole-unit change regardless of `move_units`.
    pub fn on_touch_move(
        &mut self,
        id: PointerId,
        x: f64,
        y: f64,
        time_ms: u64,
        always_trigger: bool,
        listener: &mut impl SwipeListener,
    ) -> bool {
        let (unit_w, unit_h, thresholds) = (self.unit_width, self.unit_height, self.thresholds);
        let Some(pointer) = self.pointers.find_by_id_mut(id) else {
            return false;
        };
        let pos = Point::new(x, y);
        let rel = units(pos - pointer.last, unit_w, unit_h);

        let needed = if always_trigger && pointer.triggered {
            1.0
        } else {
            thresholds.move_units
        };
        let direction = dominant_direction(rel, needed);
        if direction == Direction::None {
            return false;
        }
        if !pointer.triggered && speed(pointer.first, pos, pointer.first_time, time_ms) < thresholds.velocity {
            return false;
        }

        let (rel_x, rel_y) = (rel.x.trunc(), rel.y.trunc());
        pointer.last = Point::new(
            pointer.last.x + rel_x * unit_w,
            pointer.last.y + rel_y * unit_h,
        );
        pointer.triggered = true;
        let abs = units(pos - pointer.first, unit_w, unit_h);

        let event = SwipeEvent {
            pointer_id: id,
            direction,
            kind: SwipeType::TouchMove,
            abs_unit_count_x: abs.x.trunc() as i32,
            abs_unit_count_y: abs.y.trunc() as i32,
            rel_unit_count_x: rel_x as i32,
            rel_unit_count_y: rel_y as i32,
        };
        trace!(?event, "swipe move");
        listener.on_swipe(&event)
    }

    /// Reports the end of a pointer's gesture and stops tracking it.
    pub fn on_touch_up(
        &mut self,
        id: PointerId,
        x: f64,
        y: f64,
        time_ms: u64,
        listener: &mut impl SwipeListener,
    ) -> bool {
        let Some(pointer) = self.pointers.remove_by_id(id) else {
            return false;
        };
        let pos = Point::new(x, y);
        let abs = units(pos - pointer.first, self.unit_width, self.unit_height);
        let rel = units(pos - pointer.last, self.unit_width, self.unit_height);

        let direction = if pointer.triggered {
            dominant_direction(abs, f64::MIN_POSITIVE)
        } else if speed(pointer.first, pos, pointer.first_time, time_ms) >= self.thresholds.velocity {
            dominant_direction(abs, self.thresholds.distance_units)
        } else {
            Direction::None
        };

        let event = SwipeEvent {
            pointer_id: id,
            direction,
            kind: SwipeType::TouchUp,
            abs_unit_count_x: abs.x.trunc() as i32,
            abs_unit_count_y: abs.y.trunc() as i32,
            rel_unit_count_x: rel.x.trunc() as i32,
            rel_unit_count_y: rel.y.trunc() as i32,
        };
        trace!(?event, "swipe up");
        listener.on_swipe(&event)
    }

    /// Reports a cancelled gesture and stops tracking the pointer.
    pub fn on_touch_cancel(&mut self, id: PointerId, listener: &mut impl SwipeListener) -> bool {
        if self.pointers.remove_by_id(id).is_none() {
            return false;
        }
        let event = SwipeEvent {
            pointer_id: id,
            direction: Direction::None,
            kind: SwipeType::TouchCancel,
            abs_unit_count_x: 0,
            abs_unit_count_y: 0,
            rel_unit_count_x: 0,
            rel_unit_count_y: 0,
        };
        listener.on_swipe(&event)
    }

    /// Stops tracking a pointer without reporting anything.
    pub fn forget(&mut self, id: PointerId) {
        self.pointers.remove_by_id(id);
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
    }

    pub fn is_tracking(&self, id: PointerId) -> bool {
        self.pointers.find_by_id(id).is_some()
    }

    /// Whether a move has already been reported for `id`.
    pub fn has_triggered(&self, id: PointerId) -> bool {
        self.pointers.find_by_id(id).is_some_and(|p| p.triggered)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Converts a pixel displacement into key units.
fn units(delta: Vec2, unit_w: f64, unit_h: f64) -> Vec2 {
    let scale = |v: f64, unit: f64| if unit > 0.0 { v / unit } else { 0.0 };
    Vec2::new(scale(delta.x, unit_w), scale(delta.y, unit_h))
}

/// Average speed in pixels per millisecond.
fn speed(from: Point, to: Point, from_ms: u64, to_ms: u64) -> f64 {
    let elapsed = to_ms.saturating_sub(from_ms).max(1) as f64;
    from.distance(to) / elapsed
}

/// Direction of the dominant axis if it reaches `threshold`; ties go horizontal.
fn dominant_direction(delta: Vec2, threshold: f64) -> Direction {
    let (ax, ay) = (delta.x.abs(), delta.y.abs());
    if ax >= ay {
        if ax < threshold {
            Direction::None
        } else if delta.x < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if ay < threshold {
        Direction::None
    } else if delta.y < 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
