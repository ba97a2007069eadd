//! Keyboard domain entities: keys, the key table and pointer tracking.
//!
//! Everything here is plain data plus pure functions.  Nothing in this module
//! schedules work, performs I/O or talks to an input-method backend; the
//! touch controller in `osk-touch` drives these types from its event loop.
//!
//! # Why handles instead of references? (for beginners)
//!
//! A finger that presses a key remembers *which* key it pressed.  Storing a
//! `&Key` would borrow the layout for as long as the finger is down, which
//! makes it impossible to recompute geometry while someone is typing.  Instead
//! the layout hands out small copyable [`key::KeyId`] handles.  A relayout
//! keeps every handle valid; replacing the key set bumps a generation counter
//! so old handles simply stop resolving.

/// Key data records and per-key geometry.
pub mod key;

/// Key table, row layout and hit testing.
pub mod layout;

/// Fixed-capacity per-finger state container.
pub mod pointer;
