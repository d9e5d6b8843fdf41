//! Conversation and message types for swingcoach.
//!
//! A `Conversation` owns its messages exclusively. Messages are appended in
//! monotonic order and never reordered; an assistant message's content is
//! mutable only while its reply is streaming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Kind of media attached to a user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Video,
    Image,
}

/// Reference to media held by an external collaborator (never the bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub reference: String,
}

/// A single message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Whether any attachment is a video reference.
    pub fn has_video(&self) -> bool {
        self.attachments
            .iter()
            .any(|a| a.kind == AttachmentKind::Video)
    }

    /// Whether the message carries text or attachments.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty() || !self.attachments.is_empty()
    }

    /// Trimmed text followed by one `[Attached ...]` line per attachment.
    pub fn text_with_attachments(&self) -> String {
        let mut text = self.content.trim().to_string();
        for attachment in &self.attachments {
            let label = match attachment.kind {
                AttachmentKind::Video => "swing video",
                AttachmentKind::Image => "image",
            };
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&format!("[Attached {label}: {}]", attachment.reference));
        }
        text
    }
}

/// An ordered conversation between the user and the coach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
}

/// Title given to a conversation until one is generated.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

impl Conversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: DEFAULT_CONVERSATION_TITLE.to_string(),
            summary: None,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Messages in append order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message at the end. Returns its id.
    pub fn push(&mut self, message: ChatMessage) -> Uuid {
        let id = message.id;
        self.messages.push(message);
        self.updated_at = Utc::now();
        id
    }

    /// Append streamed text to an existing message.
    ///
    /// Returns false if no message has that id.
    pub fn append_content(&mut self, message_id: Uuid, text: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) => {
                message.content.push_str(text);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Remove a message only if its content is empty.
    ///
    /// Relative order of the remaining messages is unchanged.
    pub fn remove_if_empty(&mut self, message_id: Uuid) -> bool {
        let before = self.messages.len();
        self.messages
            .retain(|m| !(m.id == message_id && m.content.trim().is_empty()));
        let removed = self.messages.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn message(&self, message_id: Uuid) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Whether the conversation still carries the placeholder title.
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_CONVERSATION_TITLE
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
