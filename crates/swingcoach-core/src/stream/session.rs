//! StreamSession -- drives one streaming exchange to a terminal state.
//!
//! The session owns the transport stream, forwards text chunks to a callback
//! and classifies the end of the exchange. The central rule: once any
//! non-empty content has been delivered, an interruption (transport error,
//! cancellation, total timeout) still ends in a successful outcome that
//! keeps the partial text.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use swingcoach_types::config::RelayConfig;
use swingcoach_types::llm::{CompletionRequest, LlmError, StreamEvent, TimeoutKind};
use swingcoach_types::stream::{SessionState, StreamOutcome};

use crate::llm::box_transport::BoxTransport;

/// Timeout ceilings for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTimeouts {
    /// Maximum wait for the first upstream event.
    pub first_byte: Duration,
    /// Maximum duration of the whole exchange.
    pub total: Duration,
}

impl From<&RelayConfig> for StreamTimeouts {
    fn from(config: &RelayConfig) -> Self {
        Self {
            first_byte: config.first_byte_timeout(),
            total: config.stream_timeout(),
        }
    }
}

/// Clonable handle used to observe or cancel a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    cancellation: CancellationToken,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Request cancellation. A no-op once the session is terminal.
    pub fn cancel(&self) {
        if !self.state().is_terminal() {
            debug!(session_id = %self.id, "cancelling stream session");
        }
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Wait until the session reaches a terminal state.
    pub async fn finished(&mut self) -> SessionState {
        match self.state.wait_for(|state| state.is_terminal()).await {
            Ok(state) => *state,
            // Sender dropped: the session future was dropped mid-flight.
            Err(_) => SessionState::Cancelled,
        }
    }
}

/// One streaming exchange. Consumed by [`StreamSession::run`].
pub struct StreamSession {
    id: Uuid,
    transport: BoxTransport,
    timeouts: StreamTimeouts,
    cancellation: CancellationToken,
    state: watch::Sender<SessionState>,
}

impl StreamSession {
    pub fn new(transport: BoxTransport, timeouts: StreamTimeouts) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            id: Uuid::now_v7(),
            transport,
            timeouts,
            cancellation: CancellationToken::new(),
            state,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            id: self.id,
            cancellation: self.cancellation.clone(),
            state: self.state.subscribe(),
        }
    }

    /// Run the exchange to completion.
    ///
    /// `on_chunk` receives every non-empty text delta in arrival order and is
    /// never called after cancellation has been observed. The transport
    /// stream is dropped (closing the connection) on every exit path.
    pub async fn run<F>(self, request: CompletionRequest, on_chunk: F) -> StreamOutcome
    where
        F: FnMut(&str) + Send,
    {
        let span = info_span!("stream_session", session_id = %self.id);
        self.drive(request, on_chunk).instrument(span).await
    }

    async fn drive<F>(self, request: CompletionRequest, mut on_chunk: F) -> StreamOutcome
    where
        F: FnMut(&str) + Send,
    {
        self.set_state(SessionState::Connecting);

        if self.cancellation.is_cancelled() {
            self.set_state(SessionState::Cancelled);
            return StreamOutcome::Cancelled;
        }

        let started = Instant::now();
        let first_byte_deadline = started + self.timeouts.first_byte;
        let total_deadline = started + self.timeouts.total;

        let mut stream = self
            .transport
            .stream(request, self.cancellation.child_token());
        let mut buffer = String::new();
        let mut content_received = false;
        let mut first_byte_seen = false;
        let mut chunks = 0usize;

        let outcome = loop {
            let (deadline, kind) = if first_byte_seen || total_deadline <= first_byte_deadline {
                (total_deadline, TimeoutKind::Total)
            } else {
                (first_byte_deadline, TimeoutKind::FirstByte)
            };

            tokio::select! {
                biased;

                _ = self.cancellation.cancelled() => {
                    break if content_received {
                        StreamOutcome::SuccessDespiteDisconnect(buffer)
                    } else {
                        StreamOutcome::Cancelled
                    };
                }

                _ = tokio::time::sleep_until(deadline) => {
                    warn!(?kind, content_received, "stream session timed out");
                    break interrupted(content_received, buffer, LlmError::Timeout(kind));
                }

                next = stream.next() => match next {
                    Some(Ok(StreamEvent::Connected)) => {
                        first_byte_seen = true;
                        self.set_state(SessionState::Streaming);
                    }
                    Some(Ok(StreamEvent::TextDelta { text })) => {
                        first_byte_seen = true;
                        self.set_state(SessionState::Streaming);
                        if !text.is_empty() {
                            content_received = true;
                            chunks += 1;
                            buffer.push_str(&text);
                            on_chunk(&text);
                        }
                    }
                    Some(Ok(StreamEvent::Done)) => break StreamOutcome::Success(buffer),
                    Some(Err(e)) => {
                        warn!(error = %e, content_received, "stream interrupted");
                        break interrupted(content_received, buffer, e);
                    }
                    None => {
                        break interrupted(
                            content_received,
                            buffer,
                            LlmError::Transport("stream ended without a completion signal".into()),
                        );
                    }
                },
            }
        };

        drop(stream);
        self.set_state(outcome.state());

        info!(
            outcome = %outcome.state(),
            chunks,
            chars = outcome.text().map(|t| t.chars().count()).unwrap_or(0),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stream session finished"
        );

        outcome
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

/// Classify an interruption by whether content already reached the caller.
fn interrupted(content_received: bool, buffer: String, error: LlmError) -> StreamOutcome {
    if content_received {
        StreamOutcome::SuccessDespiteDisconnect(buffer)
    } else {
        StreamOutcome::Failed(error)
    }
}
