//! Streaming exchange lifecycle types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::llm::LlmError;

/// Lifecycle state of one streaming exchange.
///
/// `Idle → Connecting → Streaming → {Completed, Cancelled, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Streaming => write!(f, "streaming"),
            SessionState::Completed => write!(f, "completed"),
            SessionState::Cancelled => write!(f, "cancelled"),
            SessionState::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a streaming exchange.
///
/// A transport error after content has been delivered is *not* a failure:
/// it classifies as `SuccessDespiteDisconnect` and keeps the partial text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Success(String),
    /// Content was delivered before the transport dropped or was cancelled.
    SuccessDespiteDisconnect(String),
    Cancelled,
    Failed(LlmError),
}

impl StreamOutcome {
    /// Final reply text for either success variant.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamOutcome::Success(text) | StreamOutcome::SuccessDespiteDisconnect(text) => {
                Some(text)
            }
            StreamOutcome::Cancelled | StreamOutcome::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.text().is_some()
    }

    /// Terminal session state this outcome corresponds to.
    pub fn state(&self) -> SessionState {
        match self {
            StreamOutcome::Success(_) | StreamOutcome::SuccessDespiteDisconnect(_) => {
                SessionState::Completed
            }
            StreamOutcome::Cancelled => SessionState::Cancelled,
            StreamOutcome::Failed(_) => SessionState::Failed,
        }
    }
}
