//! Bounded event queue and the processing loop that owns the controller.
//!
//! # Threading model (for beginners)
//!
//! The touch controller is a plain struct with `&mut self` methods, so it
//! must only ever be touched from one place.  This module gives it a home:
//!
//! ```text
//!  hook thread ──blocking_send──┐
//!                               ├──▶ mpsc (bounded) ──▶ run() ──▶ TouchController
//!  async task  ──send().await───┘                          ▲
//!                                                          │
//!                                         sleep_until(next timer deadline)
//! ```
//!
//! Producers never drop a sample: when the queue is full they wait
//! (`send().await`) or block (`blocking_send`).  The loop sleeps until either
//! a new event arrives or the controller's next timer is due, so long-press
//! timers and sample processing are serialised on the same task.
//!
//! # Time
//!
//! Sample timestamps and timer deadlines are milliseconds since the
//! [`EngineClock`] was created.  `tokio::time::Instant` is used so tests can
//! run with a paused clock.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use osk_core::TouchSample;

use crate::application::controller::TouchController;

/// Everything the processing loop can be asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Touch(TouchSample),
    /// The keyboard surface changed size.
    Relayout { width: f64, height: f64 },
    Shutdown,
}

/// Error returned when the processing loop is no longer running.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("event queue closed")]
    Closed,
}

/// Monotonic millisecond clock shared by producers and the loop.
#[derive(Debug, Clone, Copy)]
pub struct EngineClock {
    start: Instant,
}

impl EngineClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Milliseconds elapsed since the clock was created.
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// The instant `ms` milliseconds after the clock was created.
    pub fn instant_at(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms)
    }
}

impl Default for EngineClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of the event queue.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Enqueues an event, waiting for space when the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] once the loop has stopped.
    pub async fn send(&self, event: EngineEvent) -> Result<(), QueueError> {
        self.tx.send(event).await.map_err(|_| QueueError::Closed)
    }

    /// Enqueues an event from a non-async thread, blocking while the queue is
    /// full.  Must not be called from inside the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] once the loop has stopped.
    pub fn blocking_send(&self, event: EngineEvent) -> Result<(), QueueError> {
        self.tx.blocking_send(event).map_err(|_| QueueError::Closed)
    }
}

/// Creates a bounded queue holding at most `capacity` pending events.
pub fn channel(capacity: usize) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EngineHandle { tx }, rx)
}

/// Runs the controller until [`EngineEvent::Shutdown`] arrives or every
/// producer is dropped, then hands the controller back.
pub async fn run(
    mut controller: TouchController,
    mut rx: mpsc::Receiver<EngineEvent>,
    clock: EngineClock,
) -> TouchController {
    info!("touch engine started");
    loop {
        let deadline = controller.next_deadline();
        // The sleep future is built even when no timer is pending; the
        // branch guard keeps it from being polled.
        let wake_at = clock.instant_at(deadline.unwrap_or(0));

        tokio::select! {
            event = rx.recv() => match event {
                Some(EngineEvent::Touch(sample)) => {
                    controller.on_touch_event(&sample);
                }
                Some(EngineEvent::Relayout { width, height }) => {
                    if let Err(e) = controller.layout(width, height) {
                        warn!("relayout rejected: {e}");
                    }
                }
                Some(EngineEvent::Shutdown) => {
                    debug!("shutdown requested");
                    break;
                }
                None => {
                    debug!("all producers dropped");
                    break;
                }
            },
            _ = sleep_until(wake_at), if deadline.is_some() => {
                controller.advance_to(clock.now_ms());
            }
        }
    }
    info!("touch engine stopped");
    controller
}

// ── Tests ─────────────────────────────────────────────────────────────────────
