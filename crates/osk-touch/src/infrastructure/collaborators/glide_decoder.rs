//! Glide decoder stand-in that records completed paths.

use std::sync::Mutex;

use tracing::info;

use crate::application::collaborators::GlideDecoder;
use crate::application::glide::GlidePoint;

/// Stores every completed glide path instead of decoding it into words.
#[derive(Debug, Default)]
pub struct PathRecorder {
    paths: Mutex<Vec<Vec<GlidePoint>>>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<Vec<GlidePoint>> {
        self.paths.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl GlideDecoder for PathRecorder {
    fn decode(&self, path: &[GlidePoint]) {
        let duration = match (path.first(), path.last()) {
            (Some(first), Some(last)) => last.time_ms.saturating_sub(first.time_ms),
            _ => 0,
        };
        info!(points = path.len(), duration_ms = duration, "glide path completed");
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_vec());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
