//! # osk-core
//!
//! Domain core of an on-screen keyboard's touch handling: the key model, the
//! layout and hit tester, fixed-capacity pointer tracking, raw touch samples
//! and the swipe gesture recognizer.
//!
//! This crate has no async runtime, no I/O and no UI toolkit.  The touch
//! controller in `osk-touch` drives it from a single serialized event loop.
//!
//! # Architecture overview (for beginners)
//!
//! An on-screen keyboard receives raw finger positions from the touch screen
//! and must decide which keys were pressed.  Several fingers may be down at
//! once, and some finger movements are gestures (swipe the space bar to move
//! the cursor) rather than taps.
//!
//! - **`domain`** – The key table (`KeyboardLayout`), per-key geometry and the
//!   hit tester that maps a coordinate to a key, plus `PointerMap`, the
//!   bounded per-finger state table.
//!
//! - **`gesture`** – Raw touch samples and the `SwipeDetector`, which turns a
//!   finger's trajectory into direction + distance events measured in key
//!   units.
//!
//! - **`action`** – The configurable actions a swipe can trigger.
//!
//! - **`render`** – A pure `render()` function producing draw instructions
//!   for whatever frontend displays the keyboard.

pub mod action;
pub mod domain;
pub mod gesture;
pub mod keycode;
pub mod render;

// Re-export the most-used types at the crate root so callers can write
// `osk_core::KeyboardLayout` instead of `osk_core::domain::layout::KeyboardLayout`.
pub use action::SwipeAction;
pub use domain::key::{Key, KeyData, KeyId, KeySpec};
pub use domain::layout::{DesiredKey, KeyboardLayout, KeyboardMode, LayoutError};
pub use domain::pointer::{PointerId, PointerMap, TrackedPointer};
pub use gesture::{
    Direction, PointerSample, SwipeDetector, SwipeEvent, SwipeListener, SwipeThresholds, SwipeType,
    TouchAction, TouchSample,
};
pub use keycode::KeyCode;
pub use render::{render, DrawInstruction, TrailDot};
