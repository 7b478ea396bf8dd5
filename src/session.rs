//! Session-scoped state for the current claim.
//!
//! One `SessionState` exists per running instance. All fields are owned
//! exclusively by the state; services never retain references to it. The
//! state is reset as a whole when a differently-named claim is uploaded or
//! the user resets the session.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the session's conversation history. Append-only; cleared
/// only by a new-identity upload or an explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

impl ConversationTurn {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The uploaded claim PDF. Identity is the uploaded file name; bytes are
/// shared via `Arc` so preview/download handlers can clone cheaply.
#[derive(Debug, Clone)]
pub struct ClaimDocument {
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
    pub page_count: usize,
}

/// All per-session state. No ambient globals: transitions in
/// `SessionController` are the only mutators.
#[derive(Debug, Default)]
pub struct SessionState {
    pub document: Option<ClaimDocument>,
    pub extracted_text: String,
    pub selected_pages: BTreeSet<usize>,
    pub history: Vec<ConversationTurn>,
    pub latest_response: Option<String>,
}

impl SessionState {
    /// Clear everything back to the initial state, dropping the document.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Clear the analysis artifacts but keep the (new) document slot for
    /// the caller to fill. Used when a differently-named claim arrives.
    pub fn clear_analysis(&mut self) {
        self.extracted_text.clear();
        self.selected_pages.clear();
        self.history.clear();
        self.latest_response = None;
    }
}

/// Precondition failures from session transitions. These never mutate
/// state; the API layer maps them to short user-facing messages.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no claim uploaded")]
    NoClaim,
    #[error("no pages selected")]
    NoPages,
    #[error("no analysis has been run yet")]
    NoAnalysis,
    #[error("claim PDF could not be read: {0}")]
    UnreadableClaim(String),
}
