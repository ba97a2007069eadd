//! Application layer: turning touch samples into key actions.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The domain crate (`osk-core`) knows what a key is and where it sits.  This
//! layer decides what a sequence of touches *means*: a tap, a long press, a
//! swipe along the space bar, or a glide across letters.  It:
//!
//! - **Orchestrates** domain objects (layout, pointer registry, swipe
//!   detector) for every incoming sample.
//! - **Depends on abstractions** (the traits in `collaborators`) rather than
//!   concrete implementations.
//! - **Contains no I/O**: no files, no sockets, no async runtime.
//!
//! # Sub-modules
//!
//! - **`controller`**     – The dispatch loop; the only entry point for samples.
//! - **`key_press`**      – Per-pointer press state machine and long-press timers.
//! - **`swipe_dispatch`** – Maps recognised swipes to configured actions.
//! - **`glide`**          – Glide-typing handoff and the fading trail.
//! - **`scheduler`**      – Deadline-ordered timer queue.
//! - **`collaborators`**  – Traits for everything the controller drives.
//! - **`settings`**       – Thresholds and action bindings.

pub mod collaborators;
pub mod controller;
pub mod glide;
pub mod key_press;
pub mod scheduler;
pub mod settings;
pub mod swipe_dispatch;

pub use collaborators::{
    Collaborators, EditorCollaborator, FeedbackSink, GlideDecoder, InputEventSink, InputKeyEvent, KeyboardController,
    NoFeedback, PopupController, Selection,
};
pub use controller::TouchController;
pub use glide::{GlideDetector, GlideListener, GlidePoint, ThresholdGlideDetector};
pub use settings::{GestureSettings, GlideSettings, HintConfig, KeyboardSettings, TouchSettings};
