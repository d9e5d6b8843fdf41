//! In-memory doubles shared by the unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use swingcoach_types::chat::Conversation;
use swingcoach_types::error::RepositoryError;
use swingcoach_types::llm::{CompletionRequest, LlmError, StreamEvent};
use swingcoach_types::profile::SwingProfile;

use crate::llm::transport::{EventStream, TransportClient};
use crate::repository::conversation::ConversationRepository;
use crate::repository::profile::ProfileStore;

type Responder = Arc<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

/// Scripted transport: every `stream` call replays the same events, every
/// `send` call asks the responder.
pub struct MockTransport {
    events: Vec<Result<StreamEvent, LlmError>>,
    hang: bool,
    responder: Responder,
    gate: Option<Arc<Notify>>,
    send_calls: Arc<AtomicUsize>,
    stream_calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockTransport {
    pub fn streaming(events: Vec<Result<StreamEvent, LlmError>>) -> Self {
        Self {
            events,
            hang: false,
            responder: Arc::new(|_| Err(LlmError::Transport("no responder configured".into()))),
            gate: None,
            send_calls: Arc::new(AtomicUsize::new(0)),
            stream_calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn reply(text: &str) -> Self {
        let text = text.to_string();
        Self::streaming(vec![]).with_responder(move |_| Ok(text.clone()))
    }

    pub fn responder<F>(f: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self::streaming(vec![]).with_responder(f)
    }

    pub fn with_responder<F>(mut self, f: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.responder = Arc::new(f);
        self
    }

    /// Keep the stream open (pending) after the scripted events.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Make every `send` wait for a notification before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn send_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.send_calls)
    }

    pub fn stream_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stream_calls)
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl TransportClient for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn stream(&self, request: CompletionRequest, cancel: CancellationToken) -> EventStream {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let events = self.events.clone();
        let hang = self.hang;
        Box::pin(async_stream::stream! {
            for event in events {
                if cancel.is_cancelled() {
                    return;
                }
                yield event;
            }
            if hang {
                std::future::pending::<()>().await;
            }
        })
    }

    fn send(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let result = (self.responder)(request);
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            result
        }
    }
}

/// Profile store backed by a shared cell. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    profile: Arc<Mutex<Option<SwingProfile>>>,
    fail_writes: Arc<AtomicBool>,
    write_gate: Arc<Mutex<Option<Arc<Notify>>>>,
    writes_started: Arc<AtomicUsize>,
}

impl MemoryProfileStore {
    /// Make every `save` wait for a notification before writing.
    pub fn gate_writes(&self, gate: Arc<Notify>) {
        *self.write_gate.lock().unwrap() = Some(gate);
    }

    /// Number of `save` calls entered so far, including gated ones.
    pub fn writes_started(&self) -> usize {
        self.writes_started.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".into()));
        }
        Ok(())
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn load(&self) -> Result<Option<SwingProfile>, RepositoryError> {
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn save(&self, profile: &SwingProfile) -> Result<(), RepositoryError> {
        self.writes_started.fetch_add(1, Ordering::SeqCst);
        let gate = self.write_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_writable()?;
        *self.profile.lock().unwrap() = Some(profile.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.check_writable()?;
        *self.profile.lock().unwrap() = None;
        Ok(())
    }
}

/// Conversation repository backed by a shared map. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryConversationRepository {
    conversations: Arc<Mutex<HashMap<Uuid, Conversation>>>,
}

impl MemoryConversationRepository {
    pub fn get(&self, id: &Uuid) -> Option<Conversation> {
        self.conversations.lock().unwrap().get(id).cloned()
    }
}

impl ConversationRepository for MemoryConversationRepository {
    async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Conversation>, RepositoryError> {
        let mut all: Vec<Conversation> = self.conversations.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        self.conversations.lock().unwrap().remove(id);
        Ok(())
    }
}
