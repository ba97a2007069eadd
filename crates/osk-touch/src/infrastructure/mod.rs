//! Infrastructure layer for the touch engine.
//!
//! Contains the adapters around the controller: the bounded event queue and
//! its processing loop, configuration file storage, in-memory collaborator
//! implementations, the built-in key sets, and touch trace files.
//!
//! **Dependency rule**: this layer may depend on `application` and `osk_core`,
//! but MUST NOT be imported by the `application` layer.

pub mod collaborators;
pub mod event_loop;
pub mod layouts;
pub mod storage;
pub mod trace;
