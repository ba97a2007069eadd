//! In-memory collaborator implementations.
//!
//! These back the replay binary and the integration tests.  Each one keeps
//! its state behind a `std::sync::Mutex` and records what it was asked to do,
//! so a caller can inspect the outcome after feeding samples.

pub mod dispatcher;
pub mod editor;
pub mod glide_decoder;
pub mod keyboard;
pub mod popup;

use std::sync::Arc;

use osk_core::KeyboardMode;

use crate::application::collaborators::{Collaborators, NoFeedback};

pub use dispatcher::InputEventDispatcher;
pub use editor::InMemoryEditor;
pub use glide_decoder::PathRecorder;
pub use keyboard::LoggingKeyboardManager;
pub use popup::ExtendedPopup;

/// One instance of each in-memory collaborator, kept concretely typed so
/// callers can inspect them after a run.
#[derive(Debug, Clone)]
pub struct InMemoryCollaborators {
    pub input: Arc<InputEventDispatcher>,
    pub editor: Arc<InMemoryEditor>,
    pub keyboard: Arc<LoggingKeyboardManager>,
    pub popup: Arc<ExtendedPopup>,
    pub glide_decoder: Arc<PathRecorder>,
}

impl InMemoryCollaborators {
    pub fn new(mode: KeyboardMode, text: &str) -> Self {
        Self {
            input: Arc::new(InputEventDispatcher::new()),
            editor: Arc::new(InMemoryEditor::with_text(text)),
            keyboard: Arc::new(LoggingKeyboardManager::new(mode)),
            popup: Arc::new(ExtendedPopup::new()),
            glide_decoder: Arc::new(PathRecorder::new()),
        }
    }

    /// Trait-object view handed to the controller.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            input: self.input.clone(),
            editor: self.editor.clone(),
            keyboard: self.keyboard.clone(),
            popup: self.popup.clone(),
            feedback: Arc::new(NoFeedback),
            glide_decoder: self.glide_decoder.clone(),
        }
    }
}
