//! RelayClient -- the concrete [`TransportClient`] for the coaching relay.
//!
//! Every request carries the device identifier in `X-Device-ID` and, when
//! configured, a bearer token. The token is wrapped in [`SecretString`] and
//! only exposed while building headers.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;

use swingcoach_core::llm::transport::{EventStream, TransportClient};
use swingcoach_types::config::RelayConfig;
use swingcoach_types::llm::{CompletionRequest, LlmError, TimeoutKind};

use super::streaming::create_relay_stream;
use super::types::{ErrorEnvelope, RelayMessageResponse, RelayRequest};

const DEVICE_ID_HEADER: &str = "X-Device-ID";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity presented to the relay.
#[derive(Clone)]
pub struct RelayCredentials {
    pub device_id: String,
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for RelayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayCredentials")
            .field("device_id", &self.device_id)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Attach the caller identity headers to a request.
pub(crate) fn authorized(
    builder: reqwest::RequestBuilder,
    device_id: &str,
    token: Option<&SecretString>,
) -> reqwest::RequestBuilder {
    let builder = builder.header(DEVICE_ID_HEADER, device_id);
    match token {
        Some(token) => builder.bearer_auth(token.expose_secret()),
        None => builder,
    }
}

/// HTTP client for the relay endpoint.
///
/// No retries: every failure goes back to the caller. Streaming calls have
/// no client-side deadline because the stream session owns both timeout
/// ceilings; one-shot calls use `oneshot_timeout`.
///
/// Idle connections are never pooled, so every session opens a fresh
/// connection. Not `Debug`: holds the relay token.
pub struct RelayClient {
    client: reqwest::Client,
    url: String,
    model: Option<String>,
    credentials: RelayCredentials,
    oneshot_timeout: Duration,
}

impl RelayClient {
    pub fn new(config: &RelayConfig, credentials: RelayCredentials) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: endpoint(&config.base_url, &config.path),
            model: config.model.clone(),
            credentials,
            oneshot_timeout: config.oneshot_timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn request_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(TimeoutKind::Total)
    } else {
        LlmError::Transport(e.to_string())
    }
}

/// Decode a successful non-streaming body: either a message or an error
/// envelope.
fn decode_message_body(body: &str) -> Result<String, LlmError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| LlmError::Parse(format!("response is not JSON: {e}")))?;

    if value.get("error").is_some_and(|e| e.is_object()) {
        let envelope: ErrorEnvelope = serde_json::from_value(value)
            .map_err(|e| LlmError::Parse(format!("unreadable error envelope: {e}")))?;
        return Err(LlmError::Api {
            message: envelope.into_message(),
        });
    }

    let message: RelayMessageResponse = serde_json::from_value(value)
        .map_err(|e| LlmError::Parse(format!("unexpected response shape: {e}")))?;
    Ok(message.text())
}

impl TransportClient for RelayClient {
    fn name(&self) -> &str {
        "relay"
    }

    fn stream(&self, request: CompletionRequest, cancel: CancellationToken) -> EventStream {
        let body = RelayRequest::from_completion(&request, true, self.model.as_deref());
        create_relay_stream(
            self.client.clone(),
            self.url.clone(),
            body,
            self.credentials.device_id.clone(),
            self.credentials.token.clone(),
            cancel,
        )
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = RelayRequest::from_completion(request, false, self.model.as_deref());

        let response = authorized(
            self.client.post(&self.url),
            &self.credentials.device_id,
            self.credentials.token.as_ref(),
        )
        .timeout(self.oneshot_timeout)
        .json(&body)
        .send()
        .await
        .map_err(request_error)?;

        let status = response.status();
        let text = response.text().await.map_err(request_error)?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "relay rejected one-shot request");
            return Err(LlmError::Http {
                code: status.as_u16(),
                body: text,
            });
        }

        decode_message_body(&text)
    }
}
