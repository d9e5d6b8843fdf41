//! ConversationCoordinator -- sequences chat exchanges.
//!
//! For each user message the coordinator appends the user turn and an empty
//! assistant placeholder, streams the reply into the placeholder, then
//! finalizes: drops the placeholder if nothing arrived, persists the
//! conversation and, after a successful exchange, starts the background
//! memory update and title/summary generation.
//!
//! One stream session runs per conversation. Sending while a reply is still
//! streaming cancels the older session first. Only the active conversation
//! accepts new messages; the others are read-only.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast};
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use swingcoach_types::chat::{Attachment, ChatMessage, Conversation};
use swingcoach_types::config::CoachConfig;
use swingcoach_types::error::CoordinatorError;
use swingcoach_types::event::CoachEvent;
use swingcoach_types::llm::MessageRole;
use swingcoach_types::stream::StreamOutcome;

use super::prompt::build_chat_request;
use super::title::generate_digest;
use crate::catalog::DrillCatalog;
use crate::event::EventBus;
use crate::llm::box_transport::BoxTransport;
use crate::memory::{ExchangeMode, MemoryUpdater};
use crate::profile::ProfileService;
use crate::repository::conversation::ConversationRepository;
use crate::repository::profile::ProfileStore;
use crate::stream::{SessionHandle, StreamSession, StreamTimeouts};

struct Inner<P: ProfileStore, C: ConversationRepository> {
    transport: BoxTransport,
    repository: C,
    profile: ProfileService<P>,
    memory: MemoryUpdater<P>,
    catalog: Arc<dyn DrillCatalog>,
    config: CoachConfig,
    events: EventBus,
    conversations: DashMap<Uuid, Conversation>,
    sessions: DashMap<Uuid, SessionHandle>,
    active: RwLock<Option<Uuid>>,
    background: TaskTracker,
}

/// Clonable handle; clones share all state.
pub struct ConversationCoordinator<P: ProfileStore, C: ConversationRepository> {
    inner: Arc<Inner<P, C>>,
}

impl<P: ProfileStore, C: ConversationRepository> Clone for ConversationCoordinator<P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: ProfileStore, C: ConversationRepository> ConversationCoordinator<P, C> {
    pub fn new(
        transport: BoxTransport,
        repository: C,
        profile: ProfileService<P>,
        catalog: Arc<dyn DrillCatalog>,
        config: CoachConfig,
        events: EventBus,
    ) -> Self {
        let memory = MemoryUpdater::new(
            transport.clone(),
            profile.clone(),
            Arc::clone(&catalog),
            config.memory.clone(),
            config.relay.oneshot_timeout(),
        );

        Self {
            inner: Arc::new(Inner {
                transport,
                repository,
                profile,
                memory,
                catalog,
                config,
                events,
                conversations: DashMap::new(),
                sessions: DashMap::new(),
                active: RwLock::new(None),
                background: TaskTracker::new(),
            }),
        }
    }

    /// Load stored conversations. The most recently updated one becomes
    /// active unless another is already active. Returns how many were loaded.
    pub async fn restore(&self) -> Result<usize, CoordinatorError> {
        let stored = self.inner.repository.list().await?;
        let count = stored.len();
        let latest = stored.iter().max_by_key(|c| c.updated_at).map(|c| c.id);

        for conversation in stored {
            self.inner.conversations.insert(conversation.id, conversation);
        }

        let mut active = self.inner.active.write().await;
        if active.is_none() {
            *active = latest;
        }
        info!(count, "restored conversations");
        Ok(count)
    }

    /// Create a new conversation and make it the active one.
    pub async fn start_conversation(&self) -> Result<Uuid, CoordinatorError> {
        let conversation = Conversation::new();
        let id = conversation.id;
        self.inner.repository.save(&conversation).await?;
        self.inner.conversations.insert(id, conversation);
        self.set_active(id).await;
        info!(conversation_id = %id, "started conversation");
        Ok(id)
    }

    /// Make an existing conversation the active one.
    pub async fn activate(&self, id: Uuid) -> Result<(), CoordinatorError> {
        if !self.inner.conversations.contains_key(&id) {
            return Err(CoordinatorError::UnknownConversation(id));
        }
        self.set_active(id).await;
        Ok(())
    }

    pub async fn active_conversation_id(&self) -> Option<Uuid> {
        *self.inner.active.read().await
    }

    pub async fn is_read_only(&self, id: Uuid) -> bool {
        self.active_conversation_id().await != Some(id)
    }

    /// Copy of a conversation.
    pub fn conversation(&self, id: Uuid) -> Option<Conversation> {
        self.inner.conversations.get(&id).map(|c| c.clone())
    }

    /// All conversations, most recently updated first.
    pub fn conversations(&self) -> Vec<Conversation> {
        let mut all: Vec<Conversation> = self
            .inner
            .conversations
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }

    pub fn profile(&self) -> &ProfileService<P> {
        &self.inner.profile
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoachEvent> {
        self.inner.events.subscribe()
    }

    /// Whether a reply is currently streaming into `conversation_id`.
    pub fn is_streaming(&self, conversation_id: Uuid) -> bool {
        self.inner
            .sessions
            .get(&conversation_id)
            .is_some_and(|handle| !handle.state().is_terminal())
    }

    /// Cancel the streaming reply of a conversation, if any.
    pub fn cancel(&self, conversation_id: Uuid) -> bool {
        match self.inner.sessions.get(&conversation_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Send a user message and stream the coach's reply.
    ///
    /// Returns the stream outcome; a failed exchange is reported through
    /// `StreamOutcome::Failed`, not as an `Err`. Errors are reserved for
    /// requests that never started (unknown or read-only conversation,
    /// empty message).
    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> Result<StreamOutcome, CoordinatorError> {
        let text = text.trim();
        if text.is_empty() && attachments.is_empty() {
            return Err(CoordinatorError::EmptyMessage);
        }
        if !self.inner.conversations.contains_key(&conversation_id) {
            return Err(CoordinatorError::UnknownConversation(conversation_id));
        }
        if self.is_read_only(conversation_id).await {
            return Err(CoordinatorError::ReadOnly(conversation_id));
        }

        let user_turn = ChatMessage::new(MessageRole::User, text).with_attachments(attachments);
        let mode = if user_turn.has_video() {
            ExchangeMode::Video
        } else {
            ExchangeMode::Text
        };
        let profile = self.inner.profile.snapshot().await;

        // No await between registering this session and cancelling the
        // previous one.
        let session = StreamSession::new(
            self.inner.transport.clone(),
            StreamTimeouts::from(&self.inner.config.relay),
        );
        let session_id = session.id();

        let (request, placeholder_id) = {
            let mut conversation = self
                .inner
                .conversations
                .get_mut(&conversation_id)
                .ok_or(CoordinatorError::UnknownConversation(conversation_id))?;

            if let Some(previous) = self.inner.sessions.insert(conversation_id, session.handle()) {
                debug!(%conversation_id, session_id = %previous.id(), "superseding in-flight session");
                previous.cancel();
            }

            conversation.push(user_turn);
            let request = build_chat_request(
                &self.inner.config,
                &profile,
                self.inner.catalog.as_ref(),
                conversation.messages(),
            );
            let placeholder_id = conversation.push(ChatMessage::new(MessageRole::Assistant, ""));
            (request, placeholder_id)
        };
        self.inner
            .events
            .publish(CoachEvent::ConversationUpdated { conversation_id });

        let span = info_span!("exchange", %conversation_id, %session_id, ?mode);
        let sink = Arc::clone(&self.inner);
        let outcome = session
            .run(request, move |chunk| {
                if let Some(mut conversation) = sink.conversations.get_mut(&conversation_id) {
                    conversation.append_content(placeholder_id, chunk);
                }
                sink.events.publish(CoachEvent::TextDelta {
                    conversation_id,
                    message_id: placeholder_id,
                    text: chunk.to_string(),
                });
            })
            .instrument(span)
            .await;

        self.finish_exchange(conversation_id, session_id, placeholder_id, mode, &outcome)
            .await;
        Ok(outcome)
    }

    async fn finish_exchange(
        &self,
        conversation_id: Uuid,
        session_id: Uuid,
        placeholder_id: Uuid,
        mode: ExchangeMode,
        outcome: &StreamOutcome,
    ) {
        self.inner
            .sessions
            .remove_if(&conversation_id, |_, handle| handle.id() == session_id);

        let has_reply = outcome
            .text()
            .is_some_and(|text| !text.trim().is_empty());

        let snapshot = {
            let Some(mut conversation) = self.inner.conversations.get_mut(&conversation_id) else {
                return;
            };
            if !has_reply && conversation.remove_if_empty(placeholder_id) {
                debug!(%conversation_id, "removed empty assistant placeholder");
            }
            conversation.clone()
        };

        if let Err(e) = self.inner.repository.save(&snapshot).await {
            warn!(%conversation_id, error = %e, "failed to persist conversation");
        }

        self.inner
            .events
            .publish(CoachEvent::ConversationUpdated { conversation_id });
        self.inner.events.publish(CoachEvent::StreamFinished {
            conversation_id,
            state: outcome.state(),
            error: match outcome {
                StreamOutcome::Failed(e) => Some(e.user_message()),
                _ => None,
            },
        });

        if has_reply {
            self.spawn_follow_ups(conversation_id, snapshot.messages().to_vec(), mode);
        }
    }

    /// Fire-and-forget memory update and digest generation. Failures are
    /// logged by the tasks themselves.
    fn spawn_follow_ups(&self, conversation_id: Uuid, messages: Vec<ChatMessage>, mode: ExchangeMode) {
        let memory = self.inner.memory.clone();
        let tail = messages.clone();
        self.inner.background.spawn(async move {
            memory.update(&tail, mode).await;
        });

        if self.inner.config.titles.enabled {
            let inner = Arc::clone(&self.inner);
            self.inner.background.spawn(
                async move { inner.refresh_digest(conversation_id, messages).await }
                    .instrument(info_span!("digest", %conversation_id)),
            );
        }
    }

    /// Wait for background follow-ups started so far.
    pub async fn wait_for_background(&self) {
        self.inner.background.close();
        self.inner.background.wait().await;
        self.inner.background.reopen();
    }

    async fn set_active(&self, id: Uuid) {
        *self.inner.active.write().await = Some(id);
        self.inner
            .events
            .publish(CoachEvent::ConversationActivated { conversation_id: id });
    }
}

impl<P: ProfileStore, C: ConversationRepository> Inner<P, C> {
    async fn refresh_digest(&self, conversation_id: Uuid, messages: Vec<ChatMessage>) {
        let call = generate_digest(&self.transport, &messages, self.config.titles.max_tokens);
        let digest = match tokio::time::timeout(self.config.relay.oneshot_timeout(), call).await {
            Ok(Ok(digest)) => digest,
            Ok(Err(e)) => {
                warn!(error = %e, "title/summary generation failed");
                return;
            }
            Err(_) => {
                warn!("title/summary generation timed out");
                return;
            }
        };

        let mut events = Vec::new();
        let snapshot = {
            let Some(mut conversation) = self.conversations.get_mut(&conversation_id) else {
                return;
            };
            if let Some(title) = digest.title.filter(|_| conversation.has_default_title()) {
                conversation.title = title.clone();
                events.push(CoachEvent::TitleGenerated {
                    conversation_id,
                    title,
                });
            }
            if let Some(summary) = digest.summary {
                conversation.summary = Some(summary.clone());
                events.push(CoachEvent::SummaryGenerated {
                    conversation_id,
                    summary,
                });
            }
            if events.is_empty() {
                return;
            }
            conversation.clone()
        };

        if let Err(e) = self.repository.save(&snapshot).await {
            warn!(error = %e, "failed to persist conversation digest");
            return;
        }
        for event in events {
            self.events.publish(event);
        }
    }
}
