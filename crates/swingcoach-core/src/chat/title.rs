//! Conversation title and summary generation.
//!
//! One best-effort call per exchange returns both a short title and a
//! one-sentence summary. Callers run it in the background and only log
//! failures.

use swingcoach_observe::genai_attrs;
use swingcoach_types::chat::ChatMessage;
use swingcoach_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

use crate::llm::box_transport::BoxTransport;
use crate::memory::prompt::{recent_turns, truncate_chars};
use crate::parse::extract_json_object;

const DIGEST_SYSTEM_PROMPT: &str = r#"You label golf coaching conversations. Return ONE JSON object and nothing else:
{"title": "3-6 word title naming the main swing topic", "summary": "one sentence describing what was covered"}

Examples of titles:
- "Fixing an over-the-top slice"
- "Driver setup and ball position"
- "Chipping contact drills""#;

/// Messages considered for the digest.
const DIGEST_TURNS: usize = 8;
const DIGEST_CHARS_PER_TURN: usize = 600;
const MAX_TITLE_CHARS: usize = 60;

/// Generated conversation labels. Either may be missing if the model
/// returned something unusable for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationDigest {
    pub title: Option<String>,
    pub summary: Option<String>,
}

/// Ask the relay for a title and summary of `messages`.
#[tracing::instrument(
    name = "generate_digest",
    skip(transport, messages),
    fields(gen_ai.operation.name = genai_attrs::OP_GENERATE_TITLE, messages = messages.len())
)]
pub async fn generate_digest(
    transport: &BoxTransport,
    messages: &[ChatMessage],
    max_tokens: u32,
) -> Result<ConversationDigest, LlmError> {
    let mut transcript = String::new();
    for message in recent_turns(messages, DIGEST_TURNS) {
        let speaker = match message.role {
            MessageRole::User => "Student",
            MessageRole::Assistant => "Coach",
        };
        transcript.push_str(speaker);
        transcript.push_str(": ");
        transcript.push_str(&truncate_chars(
            &message.text_with_attachments(),
            DIGEST_CHARS_PER_TURN,
        ));
        transcript.push('\n');
    }

    let request = CompletionRequest {
        system: DIGEST_SYSTEM_PROMPT.to_string(),
        messages: vec![Message::user(format!(
            "Conversation:\n{transcript}\nLabel this conversation."
        ))],
        max_tokens,
        stream: false,
    };

    let reply = transport.send(&request).await?;
    Ok(parse_digest(&reply))
}

/// Read the JSON digest; a plain-text reply is taken as the title alone.
fn parse_digest(reply: &str) -> ConversationDigest {
    match extract_json_object(reply) {
        Ok(object) => ConversationDigest {
            title: object
                .get("title")
                .and_then(|v| v.as_str())
                .and_then(clean_title),
            summary: object
                .get("summary")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        },
        Err(_) => ConversationDigest {
            title: reply.lines().next().and_then(clean_title),
            summary: None,
        },
    }
}

/// Trim whitespace and surrounding quotes, cap the length.
fn clean_title(raw: &str) -> Option<String> {
    let title = raw
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .trim_end_matches('.');
    if title.is_empty() {
        return None;
    }
    Some(truncate_chars(title, MAX_TITLE_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;

    fn exchange() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(MessageRole::User, "My driver slices"),
            ChatMessage::new(MessageRole::Assistant, "Let's check your grip first."),
        ]
    }

    #[tokio::test]
    async fn parses_json_digest() {
        let transport = BoxTransport::new(MockTransport::reply(
            r#"{"title": "\"Taming a driver slice\"", "summary": "Grip check for a slicing driver."}"#,
        ));
        let digest = generate_digest(&transport, &exchange(), 60).await.unwrap();
        assert_eq!(digest.title.as_deref(), Some("Taming a driver slice"));
        assert_eq!(
            digest.summary.as_deref(),
            Some("Grip check for a slicing driver.")
        );
    }

    #[tokio::test]
    async fn plain_reply_becomes_title() {
        let transport = BoxTransport::new(MockTransport::reply("'Driver slice fix'\n"));
        let digest = generate_digest(&transport, &exchange(), 60).await.unwrap();
        assert_eq!(digest.title.as_deref(), Some("Driver slice fix"));
        assert_eq!(digest.summary, None);
    }

    #[tokio::test]
    async fn upstream_error_propagates() {
        let transport = BoxTransport::new(MockTransport::responder(|_| {
            Err(LlmError::Transport("offline".into()))
        }));
        assert!(generate_digest(&transport, &exchange(), 60).await.is_err());
    }

    #[test]
    fn long_titles_are_capped() {
        let title = clean_title(&"a".repeat(100)).unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS + 1);
        assert!(clean_title("  \"\" ").is_none());
    }

    #[tokio::test]
    async fn request_is_one_shot_with_transcript() {
        let mock = MockTransport::reply("{}");
        let requests = mock.requests();
        let transport = BoxTransport::new(mock);
        generate_digest(&transport, &exchange(), 42).await.unwrap();

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].stream);
        assert_eq!(sent[0].max_tokens, 42);
        assert!(sent[0].messages[0].content.contains("Student: My driver slices"));
    }
}
