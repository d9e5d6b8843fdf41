//! Relay wire types.
//!
//! The relay speaks a subset of the Anthropic Messages shape. These structs
//! are private to the HTTP adapter; the rest of the workspace only sees
//! `CompletionRequest` and `StreamEvent`.

use serde::{Deserialize, Serialize};

use swingcoach_types::llm::{CompletionRequest, Message};

/// Request body POSTed to the relay.
#[derive(Debug, Clone, Serialize)]
pub struct RelayRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl RelayRequest {
    pub fn from_completion(request: &CompletionRequest, stream: bool, model: Option<&str>) -> Self {
        Self {
            system: request.system.clone(),
            messages: request.messages.clone(),
            stream,
            max_tokens: request.max_tokens,
            model: model.map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// SSE payloads
//
// Dispatch is on the SSE `event:` name, falling back to the `type` field of
// the JSON payload for unnamed events.
// ---------------------------------------------------------------------------

/// Just the `type` discriminator of an event payload.
#[derive(Debug, Deserialize)]
pub struct EventKind {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Payload for `event: content_block_delta`.
#[derive(Debug, Deserialize)]
pub struct ContentBlockDeltaPayload {
    pub delta: RelayDelta,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum RelayDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    /// Any other delta kind (thinking, signatures) carries no reply text.
    #[serde(other)]
    Other,
}

/// `{"type":"error","error":{"type":"overloaded_error","message":"..."}}`,
/// used both as an SSE event payload and as a non-streaming body.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    /// Message text for `LlmError::Api`.
    pub fn into_message(self) -> String {
        match (self.error.message, self.error.kind) {
            (Some(message), _) if !message.trim().is_empty() => message,
            (_, Some(kind)) => kind,
            _ => "unknown relay error".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Non-streaming response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RelayMessageResponse {
    pub content: Vec<RelayContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum RelayContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl RelayMessageResponse {
    /// Concatenated text of every text block.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                RelayContentBlock::Text { text } => Some(text.as_str()),
                RelayContentBlock::Other => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_absent_model() {
        let request = CompletionRequest {
            system: "coach".to_string(),
            messages: vec![Message::user("hi")],
            max_tokens: 64,
            stream: true,
        };
        let json = serde_json::to_value(RelayRequest::from_completion(&request, true, None)).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["stream"], true);

        let json =
            serde_json::to_value(RelayRequest::from_completion(&request, false, Some("m1"))).unwrap();
        assert_eq!(json["model"], "m1");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn unknown_delta_kinds_are_other() {
        let payload: ContentBlockDeltaPayload = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"thinking_delta","thinking":"hmm"}}"#,
        )
        .unwrap();
        assert!(matches!(payload.delta, RelayDelta::Other));
    }

    #[test]
    fn response_text_skips_non_text_blocks() {
        let response: RelayMessageResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"Hello "},{"type":"tool_use","id":"x"},{"type":"text","text":"there"}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), "Hello there");
    }

    #[test]
    fn error_envelope_falls_back_to_kind() {
        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"error":{"type":"overloaded_error"}}"#).unwrap();
        assert_eq!(envelope.into_message(), "overloaded_error");
    }
}
