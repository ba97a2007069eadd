//! Recorded touch traces.
//!
//! A trace is a JSON array of touch samples, in the order the hardware
//! delivered them:
//!
//! ```json
//! [
//!   { "action": "down", "pointers": [{ "id": 0, "x": 50.0, "y": 25.0 }], "time_ms": 0 },
//!   { "action": "up",   "pointers": [{ "id": 0, "x": 50.0, "y": 25.0 }], "time_ms": 80 }
//! ]
//! ```
//!
//! `action_index` may be omitted for single-pointer samples.

use std::path::{Path, PathBuf};

use osk_core::TouchSample;
use thiserror::Error;

/// Error type for trace loading.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("I/O error reading trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed trace JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Sample `index` is older than the sample before it.
    #[error("sample {index} goes back in time ({time_ms} ms < {previous_ms} ms)")]
    OutOfOrder { index: usize, time_ms: u64, previous_ms: u64 },
}

/// Parses a trace from JSON text.
///
/// # Errors
///
/// Returns [`TraceError::Json`] for malformed input and
/// [`TraceError::OutOfOrder`] when timestamps decrease.
pub fn parse_trace(json: &str) -> Result<Vec<TouchSample>, TraceError> {
    let samples: Vec<TouchSample> = serde_json::from_str(json)?;
    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].time_ms < pair[0].time_ms {
            return Err(TraceError::OutOfOrder {
                index: index + 1,
                time_ms: pair[1].time_ms,
                previous_ms: pair[0].time_ms,
            });
        }
    }
    Ok(samples)
}

/// Reads and parses a trace file.
///
/// # Errors
///
/// Returns [`TraceError::Io`] if the file cannot be read, otherwise as
/// [`parse_trace`].
pub fn load_trace(path: &Path) -> Result<Vec<TouchSample>, TraceError> {
    let json = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&json)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use osk_core::{PointerId, TouchAction};

    #[test]
    fn test_parse_trace_reads_samples() {
        // Arrange
        let json = r#"[
            { "action": "down", "pointers": [{ "id": 0, "x": 50.0, "y": 25.0 }], "time_ms": 0 },
            { "action": "pointer_down", "action_index": 1,
              "pointers": [{ "id": 0, "x": 50.0, "y": 25.0 }, { "id": 3, "x": 250.0, "y": 25.0 }],
              "time_ms": 40 },
            { "action": "up", "pointers": [{ "id": 0, "x": 50.0, "y": 25.0 }], "time_ms": 80 }
        ]"#;

        // Act
        let samples = parse_trace(json).expect("valid trace");

        // Assert
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].action, TouchAction::Down);
        assert_eq!(samples[0].action_index, 0);
        assert_eq!(samples[1].action_pointer().map(|p| p.id), Some(PointerId(3)));
        assert_eq!(samples[2].time_ms, 80);
    }

    #[test]
    fn test_parse_trace_rejects_unknown_action() {
        let json = r#"[{ "action": "wiggle", "pointers": [], "time_ms": 0 }]"#;
        assert!(matches!(parse_trace(json), Err(TraceError::Json(_))));
    }

    #[test]
    fn test_parse_trace_rejects_time_going_backwards() {
        let json = r#"[
            { "action": "down", "pointers": [{ "id": 0, "x": 1.0, "y": 1.0 }], "time_ms": 50 },
            { "action": "up", "pointers": [{ "id": 0, "x": 1.0, "y": 1.0 }], "time_ms": 20 }
        ]"#;

        let result = parse_trace(json);

        assert!(matches!(
            result,
            Err(TraceError::OutOfOrder { index: 1, time_ms: 20, previous_ms: 50 })
        ));
    }

    #[test]
    fn test_load_trace_missing_file_is_io_error() {
        let result = load_trace(Path::new("/nonexistent/trace.json"));
        assert!(matches!(result, Err(TraceError::Io { .. })));
    }
}
