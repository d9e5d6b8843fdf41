//! BoxTransport -- object-safe, clonable wrapper for TransportClient.
//!
//! Same blanket-impl pattern as the other `Box*` wrappers:
//! 1. An object-safe `TransportClientDyn` with boxed futures
//! 2. Blanket impl for every `T: TransportClient`
//! 3. `BoxTransport` holds an `Arc<dyn TransportClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;
use tokio_util::sync::CancellationToken;
use swingcoach_observe::genai_attrs;
use tracing::{Instrument, info_span};

use swingcoach_types::llm::{CompletionRequest, LlmError, StreamEvent};

use super::transport::{EventStream, TransportClient};

/// Object-safe version of [`TransportClient`].
pub trait TransportClientDyn: Send + Sync {
    fn name(&self) -> &str;

    fn stream_boxed(&self, request: CompletionRequest, cancel: CancellationToken) -> EventStream;

    fn send_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}

impl<T: TransportClient> TransportClientDyn for T {
    fn name(&self) -> &str {
        TransportClient::name(self)
    }

    fn stream_boxed(&self, request: CompletionRequest, cancel: CancellationToken) -> EventStream {
        self.stream(request, cancel)
    }

    fn send_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }
}

/// Type-erased transport shared by the stream session, the memory updater
/// and title generation.
///
/// Cloning is cheap: all clones share the same underlying client.
#[derive(Clone)]
pub struct BoxTransport {
    inner: Arc<dyn TransportClientDyn>,
}

impl BoxTransport {
    pub fn new<T: TransportClient + 'static>(transport: T) -> Self {
        Self {
            inner: Arc::new(transport),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Open a streaming exchange. Polling happens inside a `gen_ai.stream` span.
    pub fn stream(&self, request: CompletionRequest, cancel: CancellationToken) -> EventStream {
        let span = info_span!(
            "gen_ai.stream",
            gen_ai.operation.name = genai_attrs::OP_CHAT,
            gen_ai.provider.name = self.inner.name(),
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.messages = request.messages.len(),
        );
        let inner = self.inner.stream_boxed(request, cancel);
        Box::pin(StreamInSpan { inner, span })
    }

    /// Issue a one-shot call.
    pub async fn send(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.provider.name = self.inner.name(),
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.stream = false,
        );
        self.inner.send_boxed(request).instrument(span).await
    }
}

impl std::fmt::Debug for BoxTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxTransport")
            .field("name", &self.inner.name())
            .finish()
    }
}

/// Enters `span` on every poll of the wrapped stream.
struct StreamInSpan {
    inner: EventStream,
    span: tracing::Span,
}

impl Stream for StreamInSpan {
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        // Both fields are Unpin (`inner` is already boxed).
        let this = self.get_mut();
        let _enter = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}
