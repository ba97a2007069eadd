//! Deadline-ordered timer queue.
//!
//! Long-press timers and glide-trail frames are not separate tasks: they are
//! entries in a [`TimerQueue`] owned by the touch state and fired by the same
//! loop that processes touch samples, so a timer can never run concurrently
//! with an event.  Cancelling removes the entry; a cancelled timer can never
//! fire.

use std::collections::BTreeMap;

use osk_core::{KeyId, PointerId};

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId {
    deadline_ms: u64,
    seq: u64,
}

impl TimerId {
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }
}

/// What to do when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Long press of `key` by `pointer`.
    LongPress { pointer: PointerId, key: KeyId },
    /// Next animation frame of the fading glide trail.
    GlideFadeFrame,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_seq: u64,
    entries: BTreeMap<TimerId, TimerTask>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline_ms: u64, task: TimerTask) -> TimerId {
        let id = TimerId {
            deadline_ms,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(id, task);
        id
    }

    /// Removes a pending timer.  Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(TimerId::deadline_ms)
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, TimerTask)> {
        let (&id, _) = self.entries.first_key_value()?;
        if id.deadline_ms > now_ms {
            return None;
        }
        self.entries.remove_entry(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_returns_timers_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(300, TimerTask::GlideFadeFrame);
        let first = queue.schedule(100, TimerTask::GlideFadeFrame);

        assert_eq!(queue.next_deadline(), Some(100));
        assert_eq!(queue.pop_due(50), None);
        assert_eq!(queue.pop_due(100).map(|(id, _)| id), Some(first));
        assert_eq!(queue.pop_due(200), None);
        assert!(queue.pop_due(300).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule(10, TimerTask::GlideFadeFrame);

        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert_eq!(queue.pop_due(1_000), None);
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn test_equal_deadlines_fire_in_schedule_order() {
        let mut queue = TimerQueue::new();
        let a = queue.schedule(5, TimerTask::GlideFadeFrame);
        let b = queue.schedule(5, TimerTask::GlideFadeFrame);

        assert_eq!(queue.pop_due(5).map(|(id, _)| id), Some(a));
        assert_eq!(queue.pop_due(5).map(|(id, _)| id), Some(b));
    }
}
