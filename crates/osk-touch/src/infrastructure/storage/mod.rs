//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration from the platform
//! config directory (or an explicit path), falls back to defaults when the
//! file does not exist yet, and writes changes back to disk.

pub mod config;
