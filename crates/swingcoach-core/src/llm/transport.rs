//! TransportClient trait definition.
//!
//! The relay is the only upstream. `stream` returns a boxed stream so the
//! trait can sit behind `BoxTransport`; `send` uses RPITIT.

use std::pin::Pin;

use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use swingcoach_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// Boxed event stream returned by [`TransportClient::stream`].
///
/// Dropping the stream aborts the underlying connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Client for the coaching relay.
///
/// Implementations perform no retries: every failure is surfaced to the
/// caller. The concrete HTTP client lives in swingcoach-infra.
pub trait TransportClient: Send + Sync {
    /// Short transport name used in spans (e.g. "relay").
    fn name(&self) -> &str;

    /// Open a streaming exchange.
    ///
    /// The first item is `StreamEvent::Connected` once the upstream accepted
    /// the request, followed by text deltas and a final `Done`. Non-success
    /// HTTP statuses surface as a single `LlmError::Http` item carrying the
    /// response body.
    ///
    /// Implementations stop at the next chunk boundary once `cancel` fires.
    fn stream(&self, request: CompletionRequest, cancel: CancellationToken) -> EventStream;

    /// Issue a non-streaming call and return the complete reply text.
    fn send(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
