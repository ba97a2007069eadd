//! osk-touch library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the `osk-replay` binary share the same module tree.

pub mod application;
pub mod infrastructure;
