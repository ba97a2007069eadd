//! Raw touch samples and the swipe gesture recognizer.

pub mod event;
pub mod swipe;

pub use event::{Direction, PointerSample, SwipeEvent, SwipeType, TouchAction, TouchSample};
pub use swipe::{SwipeDetector, SwipeListener, SwipeThresholds};
