//! Event types for the swingcoach event bus.
//!
//! `CoachEvent` is broadcast to UI subscribers instead of exposing shared
//! mutable state. All variants are Clone + Send + Sync for use with tokio
//! broadcast channels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::SwingProfile;
use crate::stream::SessionState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoachEvent {
    /// The profile was merged or reset and persisted.
    ProfileUpdated { profile: Box<SwingProfile> },

    /// Messages of a conversation changed (turn appended, placeholder removed).
    ConversationUpdated { conversation_id: Uuid },

    /// A streamed chunk was appended to an assistant message.
    TextDelta {
        conversation_id: Uuid,
        message_id: Uuid,
        text: String,
    },

    /// A streaming exchange reached a terminal state.
    StreamFinished {
        conversation_id: Uuid,
        state: SessionState,
        /// User-facing error text for failed exchanges.
        error: Option<String>,
    },

    TitleGenerated { conversation_id: Uuid, title: String },

    SummaryGenerated { conversation_id: Uuid, summary: String },

    /// The active conversation changed.
    ConversationActivated { conversation_id: Uuid },
}
