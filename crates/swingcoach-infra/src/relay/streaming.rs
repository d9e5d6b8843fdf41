//! SSE event stream for the relay.
//!
//! Event mapping:
//! - `content_block_delta` with a `text_delta` -> `StreamEvent::TextDelta`
//! - `message_stop`, or a `data: [DONE]` line -> `StreamEvent::Done`
//! - `error` -> `LlmError::Api`, then the stream ends
//! - `ping`, `message_start`, `content_block_start` etc. are ignored
//!
//! Undecodable payloads and broken framing are skipped. A body that ends
//! without an end marker simply ends the stream; classifying that is up to
//! the session.

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures_util::StreamExt;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use swingcoach_core::llm::transport::EventStream;
use swingcoach_types::llm::{LlmError, StreamEvent};

use super::client::authorized;
use super::types::{ContentBlockDeltaPayload, ErrorEnvelope, EventKind, RelayDelta, RelayRequest};

/// What a single SSE event means for the consumer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decoded {
    Event(StreamEvent),
    Error(LlmError),
    Ignore,
}

/// Map one SSE event to a stream item.
pub(crate) fn decode_event(event: &Event) -> Decoded {
    let data = event.data.trim();
    if data == "[DONE]" {
        return Decoded::Event(StreamEvent::Done);
    }

    let name = if event.event.is_empty() || event.event == "message" {
        match serde_json::from_str::<EventKind>(data) {
            Ok(kind) => kind.kind,
            Err(_) => {
                tracing::debug!(data, "skipping unnamed SSE event without a type");
                return Decoded::Ignore;
            }
        }
    } else {
        event.event.clone()
    };

    match name.as_str() {
        "content_block_delta" => match serde_json::from_str::<ContentBlockDeltaPayload>(data) {
            Ok(ContentBlockDeltaPayload {
                delta: RelayDelta::TextDelta { text },
            }) if !text.is_empty() => Decoded::Event(StreamEvent::TextDelta { text }),
            Ok(_) => Decoded::Ignore,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed content_block_delta");
                Decoded::Ignore
            }
        },
        "message_stop" => Decoded::Event(StreamEvent::Done),
        "error" => {
            let message = match serde_json::from_str::<ErrorEnvelope>(data) {
                Ok(envelope) => envelope.into_message(),
                Err(_) => data.to_string(),
            };
            Decoded::Error(LlmError::Api { message })
        }
        _ => Decoded::Ignore,
    }
}

/// Only transport failures end the stream. Broken framing (invalid UTF-8,
/// unparsable lines) is skipped like any other undecodable event.
fn fatal_stream_error<E: std::fmt::Display>(e: EventStreamError<E>) -> Option<LlmError> {
    match e {
        EventStreamError::Transport(e) => Some(LlmError::Transport(e.to_string())),
        framing => {
            tracing::debug!(error = %framing, "skipping malformed SSE framing");
            None
        }
    }
}

/// Open a streaming exchange with the relay.
///
/// The request is only sent once the stream is polled. Cancellation is
/// checked before connecting and at every chunk boundary; the HTTP
/// response is dropped on every exit path.
pub fn create_relay_stream(
    client: reqwest::Client,
    url: String,
    body: RelayRequest,
    device_id: String,
    token: Option<SecretString>,
    cancel: CancellationToken,
) -> EventStream {
    Box::pin(async_stream::stream! {
        let builder = authorized(client.post(&url), &device_id, token.as_ref())
            .header("accept", "text/event-stream")
            .json(&body);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("relay stream cancelled before connecting");
                return;
            }
            result = builder.send() => result,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                yield Err(LlmError::Transport(e.to_string()));
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "relay rejected stream request");
            yield Err(LlmError::Http { code: status.as_u16(), body });
            return;
        }

        yield Ok(StreamEvent::Connected);

        let mut events = response.bytes_stream().eventsource();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("relay stream cancelled");
                    return;
                }
                next = events.next() => next,
            };

            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(e)) => match fatal_stream_error(e) {
                    Some(error) => {
                        yield Err(error);
                        return;
                    }
                    None => continue,
                },
                None => return,
            };

            match decode_event(&event) {
                Decoded::Event(StreamEvent::Done) => {
                    yield Ok(StreamEvent::Done);
                    return;
                }
                Decoded::Event(event) => yield Ok(event),
                Decoded::Error(e) => {
                    yield Err(e);
                    return;
                }
                Decoded::Ignore => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, data: &str) -> Event {
        Event {
            event: name.to_string(),
            data: data.to_string(),
            id: String::new(),
            retry: None,
        }
    }

    #[test]
    fn decodes_text_delta() {
        let decoded = decode_event(&event(
            "content_block_delta",
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Keep"}}"#,
        ));
        assert_eq!(
            decoded,
            Decoded::Event(StreamEvent::TextDelta {
                text: "Keep".to_string()
            })
        );
    }

    #[test]
    fn unnamed_events_dispatch_on_payload_type() {
        let decoded = decode_event(&event(
            "message",
            r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"your"}}"#,
        ));
        assert!(matches!(decoded, Decoded::Event(StreamEvent::TextDelta { .. })));
        assert_eq!(
            decode_event(&event("", r#"{"type":"message_stop"}"#)),
            Decoded::Event(StreamEvent::Done)
        );
    }

    #[test]
    fn done_sentinel_ends_stream() {
        assert_eq!(
            decode_event(&event("", "[DONE]")),
            Decoded::Event(StreamEvent::Done)
        );
    }

    #[test]
    fn empty_text_delta_is_ignored() {
        let decoded = decode_event(&event(
            "content_block_delta",
            r#"{"delta":{"type":"text_delta","text":""}}"#,
        ));
        assert_eq!(decoded, Decoded::Ignore);
    }

    #[test]
    fn error_event_carries_message() {
        let decoded = decode_event(&event(
            "error",
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        ));
        assert_eq!(
            decoded,
            Decoded::Error(LlmError::Api {
                message: "Overloaded".to_string()
            })
        );
    }

    #[test]
    fn framing_errors_are_not_fatal() {
        let utf8 = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        assert!(fatal_stream_error(EventStreamError::<std::io::Error>::Utf8(utf8)).is_none());

        let reset = std::io::Error::other("connection reset");
        assert_eq!(
            fatal_stream_error(EventStreamError::Transport(reset)),
            Some(LlmError::Transport("connection reset".to_string()))
        );
    }

    #[test]
    fn malformed_and_keepalive_events_are_ignored() {
        assert_eq!(
            decode_event(&event("content_block_delta", "{not json")),
            Decoded::Ignore
        );
        assert_eq!(decode_event(&event("ping", "{}")), Decoded::Ignore);
        assert_eq!(decode_event(&event("", "garbage")), Decoded::Ignore);
    }
}
