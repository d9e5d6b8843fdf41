//! MemoryUpdater -- single-flight profile extraction and merge.
//!
//! After a successful exchange the coordinator hands the conversation tail
//! to `update`. At most one update runs at a time: a call arriving while
//! another is in flight returns `Skipped(InFlight)` immediately instead of
//! waiting. Upstream, parse and storage failures are logged and leave the
//! profile untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use swingcoach_observe::genai_attrs;
use tracing::{debug, info, warn};

use swingcoach_types::chat::ChatMessage;
use swingcoach_types::config::MemoryConfig;
use swingcoach_types::error::RepositoryError;
use swingcoach_types::llm::{LlmError, MessageRole, TimeoutKind};
use swingcoach_types::profile::SwingProfile;

use super::merge::{ExchangeMode, merge_profile};
use super::payload::ProfileUpdate;
use super::prompt::build_extraction_request;
use crate::catalog::DrillCatalog;
use crate::llm::box_transport::BoxTransport;
use crate::parse::{ParseFailure, extract_json_object};
use crate::profile::ProfileService;
use crate::repository::profile::ProfileStore;

/// Why an update did not change the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Another update was already running.
    InFlight,
    /// The tail lacks a user turn followed by an assistant turn.
    TooFewTurns,
    Upstream(LlmError),
    Parse(ParseFailure),
    /// The reply parsed but carried no field to merge.
    NothingToMerge,
    Storage(RepositoryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied(Box<SwingProfile>),
    Skipped(SkipReason),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied(_))
    }
}

/// Clears the in-flight flag on drop, whichever way the update exits.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Clonable; clones share the in-flight flag.
pub struct MemoryUpdater<S: ProfileStore> {
    transport: BoxTransport,
    profile: ProfileService<S>,
    catalog: Arc<dyn DrillCatalog>,
    config: MemoryConfig,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

impl<S: ProfileStore> Clone for MemoryUpdater<S> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            profile: self.profile.clone(),
            catalog: Arc::clone(&self.catalog),
            config: self.config.clone(),
            timeout: self.timeout,
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: ProfileStore> MemoryUpdater<S> {
    pub fn new(
        transport: BoxTransport,
        profile: ProfileService<S>,
        catalog: Arc<dyn DrillCatalog>,
        config: MemoryConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            profile,
            catalog,
            config,
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Extract facts from `tail` and merge them into the profile.
    #[tracing::instrument(
        name = "memory_update",
        skip(self, tail),
        fields(gen_ai.operation.name = genai_attrs::OP_EXTRACT_MEMORY, turns = tail.len())
    )]
    pub async fn update(&self, tail: &[ChatMessage], mode: ExchangeMode) -> UpdateOutcome {
        if !has_exchange(tail) {
            debug!("conversation tail has no complete exchange, skipping memory update");
            return UpdateOutcome::Skipped(SkipReason::TooFewTurns);
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("memory update already in flight, dropping this one");
            return UpdateOutcome::Skipped(SkipReason::InFlight);
        };

        let snapshot = self.profile.snapshot().await;
        let request =
            build_extraction_request(&snapshot, tail, mode, self.catalog.as_ref(), &self.config);

        let raw = match tokio::time::timeout(self.timeout, self.transport.send(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(error = %e, "memory extraction call failed");
                return UpdateOutcome::Skipped(SkipReason::Upstream(e));
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "memory extraction call timed out");
                return UpdateOutcome::Skipped(SkipReason::Upstream(LlmError::Timeout(
                    TimeoutKind::Total,
                )));
            }
        };

        let object = match extract_json_object(&raw) {
            Ok(object) => object,
            Err(e) => {
                warn!(
                    error = %e,
                    content_preview = %raw.chars().take(200).collect::<String>(),
                    "could not parse memory extraction reply; profile left unchanged"
                );
                return UpdateOutcome::Skipped(SkipReason::Parse(e));
            }
        };

        let update = ProfileUpdate::from_object(&object);
        if update.is_empty() {
            debug!("memory extraction reply had nothing to merge");
            return UpdateOutcome::Skipped(SkipReason::NothingToMerge);
        }

        let catalog = Arc::clone(&self.catalog);
        let now = Utc::now();
        let result = self
            .profile
            .apply(move |current| merge_profile(current, update, mode, catalog.as_ref(), now))
            .await;

        match result {
            Ok(profile) => {
                info!(
                    issues = profile.identified_issues.len(),
                    drills = profile.recommended_drills.len(),
                    sessions = profile.session_history().len(),
                    "swing profile updated"
                );
                UpdateOutcome::Applied(Box::new(profile))
            }
            Err(e) => {
                warn!(error = %e, "failed to persist merged profile");
                UpdateOutcome::Skipped(SkipReason::Storage(e))
            }
        }
    }
}

/// At least one user turn and one assistant turn with content.
fn has_exchange(tail: &[ChatMessage]) -> bool {
    let with_content = |role: MessageRole| tail.iter().any(|m| m.role == role && m.has_content());
    tail.len() >= 2 && with_content(MessageRole::User) && with_content(MessageRole::Assistant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticDrillCatalog;
    use crate::event::EventBus;
    use crate::test_support::{MemoryProfileStore, MockTransport};
    use tokio::sync::Notify;

    const REPLY: &str = r#"```json
{"summary": "Casts from the top", "identifiedIssues": ["casting"],
 "recommendedDrills": [{"drillID": "pump-drill", "reason": "hold the lag", "priority": "high"}],
 "sessionRecord": {"rootCause": "early release", "assignedDrill": "pump-drill", "score": 12}}
```"#;

    fn exchange() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(MessageRole::User, "I keep hitting it fat"),
            ChatMessage::new(MessageRole::Assistant, "You're casting the club from the top."),
        ]
    }

    async fn updater(
        transport: MockTransport,
        store: MemoryProfileStore,
    ) -> MemoryUpdater<MemoryProfileStore> {
        let profile = ProfileService::load(store, EventBus::default()).await.unwrap();
        MemoryUpdater::new(
            BoxTransport::new(transport),
            profile,
            Arc::new(StaticDrillCatalog::builtin()),
            MemoryConfig::default(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn applies_parsed_update() {
        let store = MemoryProfileStore::default();
        let updater = updater(MockTransport::reply(REPLY), store.clone()).await;

        let outcome = updater.update(&exchange(), ExchangeMode::Video).await;
        let UpdateOutcome::Applied(profile) = outcome else {
            panic!("expected applied, got {outcome:?}");
        };
        assert_eq!(profile.summary, "Casts from the top");
        assert!(profile.recommends("pump-drill"));
        assert_eq!(profile.session_history()[0].score.value(), 10);
        assert_eq!(store.load().await.unwrap().unwrap().summary, "Casts from the top");
        assert!(!updater.is_in_flight());
    }

    #[tokio::test]
    async fn single_turn_is_skipped_without_upstream_call() {
        let transport = MockTransport::reply(REPLY);
        let calls = transport.send_calls();
        let updater = updater(transport, MemoryProfileStore::default()).await;

        let tail = vec![ChatMessage::new(MessageRole::User, "hello")];
        assert_eq!(
            updater.update(&tail, ExchangeMode::Text).await,
            UpdateOutcome::Skipped(SkipReason::TooFewTurns)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn parse_failure_leaves_profile_untouched() {
        let updater = updater(
            MockTransport::reply("Sorry, I can't help with that."),
            MemoryProfileStore::default(),
        )
        .await;

        let outcome = updater.update(&exchange(), ExchangeMode::Text).await;
        assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::Parse(ParseFailure::NoObject)));
        assert!(updater.profile.snapshot().await.is_empty());
        assert!(!updater.is_in_flight());
    }

    #[tokio::test]
    async fn empty_reply_skips_the_write() {
        let store = MemoryProfileStore::default();
        let updater = updater(
            MockTransport::reply(r#"{"identifiedIssues": 42, "summary": "  "}"#),
            store.clone(),
        )
        .await;

        let outcome = updater.update(&exchange(), ExchangeMode::Text).await;
        assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::NothingToMerge));
        assert_eq!(store.writes_started(), 0);
        assert!(!updater.is_in_flight());
    }

    #[tokio::test]
    async fn upstream_error_is_swallowed() {
        let updater = updater(
            MockTransport::responder(|_| {
                Err(LlmError::Http {
                    code: 500,
                    body: "boom".into(),
                })
            }),
            MemoryProfileStore::default(),
        )
        .await;

        let outcome = updater.update(&exchange(), ExchangeMode::Text).await;
        assert!(matches!(
            outcome,
            UpdateOutcome::Skipped(SkipReason::Upstream(LlmError::Http { code: 500, .. }))
        ));
        assert!(updater.profile.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_leaves_profile_untouched() {
        let store = MemoryProfileStore::default();
        let updater = updater(MockTransport::reply(REPLY), store.clone()).await;
        store.fail_writes(true);

        let outcome = updater.update(&exchange(), ExchangeMode::Text).await;
        assert!(matches!(outcome, UpdateOutcome::Skipped(SkipReason::Storage(_))));
        assert!(updater.profile.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_update_is_dropped() {
        let gate = Arc::new(Notify::new());
        let transport = MockTransport::reply(REPLY).gated(gate.clone());
        let calls = transport.send_calls();
        let updater = updater(transport, MemoryProfileStore::default()).await;

        let first = {
            let updater = updater.clone();
            tokio::spawn(async move { updater.update(&exchange(), ExchangeMode::Text).await })
        };
        while !updater.is_in_flight() {
            tokio::task::yield_now().await;
        }

        let second = updater.update(&exchange(), ExchangeMode::Text).await;
        assert_eq!(second, UpdateOutcome::Skipped(SkipReason::InFlight));

        gate.notify_one();
        assert!(first.await.unwrap().is_applied());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!updater.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_upstream_times_out() {
        let gate = Arc::new(Notify::new());
        let updater = updater(
            MockTransport::reply(REPLY).gated(gate),
            MemoryProfileStore::default(),
        )
        .await;

        let outcome = updater.update(&exchange(), ExchangeMode::Text).await;
        assert_eq!(
            outcome,
            UpdateOutcome::Skipped(SkipReason::Upstream(LlmError::Timeout(TimeoutKind::Total)))
        );
        assert!(!updater.is_in_flight());
    }
}
