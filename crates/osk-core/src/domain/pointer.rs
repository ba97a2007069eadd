//! Fixed-capacity pointer tracking.
//!
//! Both the key-press state machine and the swipe detector keep per-finger
//! state.  [`PointerMap`] is the shared container: a fixed number of slots,
//! each either empty or holding one tracked pointer.  Iteration is in slot
//! order, so the pointer in slot 0 is always the "primary" finger if present.

use serde::{Deserialize, Serialize};

/// Platform-assigned finger identifier, stable from down to up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub i32);

/// Implemented by anything stored in a [`PointerMap`].
pub trait TrackedPointer {
    /// Creates a fresh record for a pointer that just went down.
    fn new(id: PointerId, index: usize) -> Self;
    fn id(&self) -> PointerId;
}

/// A fixed-size table of tracked pointers.
#[derive(Debug, Clone)]
pub struct PointerMap<P> {
    slots: Vec<Option<P>>,
}

impl<P: TrackedPointer> PointerMap<P> {
    /// Creates a map with room for `capacity` simultaneous pointers.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots }
    }

    /// Starts tracking `id` in the first free slot.
    ///
    /// Returns `None` if the id is already tracked or all slots are in use.
    pub fn add(&mut self, id: PointerId, index: usize) -> Option<&mut P> {
        if self.find_by_id(id).is_some() {
            return None;
        }
        let slot = self.slots.iter().position(Option::is_none)?;
        self.slots[slot] = Some(P::new(id, index));
        self.slots[slot].as_mut()
    }

    pub fn find_by_id(&self, id: PointerId) -> Option<&P> {
        self.iter().find(|p| p.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: PointerId) -> Option<&mut P> {
        self.iter_mut().find(|p| p.id() == id)
    }

    /// Stops tracking `id`, returning its record.
    pub fn remove_by_id(&mut self, id: PointerId) -> Option<P> {
        self.slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|p| p.id() == id))
            .and_then(Option::take)
    }

    /// The pointer in `slot`, if any.
    pub fn get_slot(&self, slot: usize) -> Option<&P> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Slot number of `id`, if tracked.
    pub fn slot_of(&self, id: PointerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|p| p.id() == id))
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut P> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Ids of all tracked pointers in slot order.
    pub fn ids(&self) -> Vec<PointerId> {
        self.iter().map(TrackedPointer::id).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
