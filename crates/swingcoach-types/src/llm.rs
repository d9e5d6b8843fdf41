//! LLM request/response types for swingcoach.
//!
//! These types model the data shapes exchanged with the relay endpoint:
//! completion requests, streaming events, and the error taxonomy shared by
//! the streaming and one-shot paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single prior turn sent to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Prompt payload for one relay call (streaming or one-shot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instructions.
    pub system: String,
    /// Prior turns, oldest first. The last entry is normally the new user turn.
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    #[serde(default)]
    pub stream: bool,
}

/// Events emitted during a streaming relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Status and headers validated; the body is about to be read.
    Connected,

    /// An incremental chunk of reply text.
    TextDelta { text: String },

    /// Explicit end-of-stream marker from the relay.
    Done,
}

/// Which of the two timeout ceilings fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutKind {
    /// Nothing arrived before the time-to-first-byte ceiling.
    FirstByte,
    /// The whole exchange exceeded its duration ceiling.
    Total,
}

impl fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutKind::FirstByte => write!(f, "time to first byte"),
            TimeoutKind::Total => write!(f, "total duration"),
        }
    }
}

/// Errors from relay operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Connectivity failure: DNS, TLS, reset, body read error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status. The body is kept verbatim.
    #[error("HTTP {code}: {body}")]
    Http { code: u16, body: String },

    /// Explicit error envelope from the remote service.
    #[error("API error: {message}")]
    Api { message: String },

    /// Response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("timed out ({0})")]
    Timeout(TimeoutKind),
}

impl LlmError {
    /// HTTP 429 from the relay.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::Http { code: 429, .. })
    }

    /// Human-readable text for the primary chat path.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Http { code: 429, .. } => {
                "You're sending messages too quickly. Please wait a moment and try again."
                    .to_string()
            }
            LlmError::Http { code, body } if body.trim().is_empty() => {
                format!("The coach service returned an error (HTTP {code}).")
            }
            LlmError::Http { code, body } => {
                format!("The coach service returned an error (HTTP {code}): {}", body.trim())
            }
            LlmError::Transport(_) => {
                "Couldn't reach the coach. Check your connection and try again.".to_string()
            }
            LlmError::Api { message } => format!("The coach ran into a problem: {message}"),
            LlmError::Parse(_) => "The coach sent a reply that couldn't be read.".to_string(),
            LlmError::Timeout(_) => "The coach took too long to respond. Please try again.".to_string(),
        }
    }
}
