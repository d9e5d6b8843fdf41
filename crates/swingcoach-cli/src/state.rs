//! Application state wiring all services together.
//!
//! The core services are generic over their storage ports; AppState pins
//! them to the SQLite implementations and the relay HTTP client.

use std::sync::Arc;

use swingcoach_core::catalog::{DrillCatalog, StaticDrillCatalog};
use swingcoach_core::chat::ConversationCoordinator;
use swingcoach_core::event::EventBus;
use swingcoach_core::llm::box_transport::BoxTransport;
use swingcoach_core::profile::ProfileService;
use swingcoach_infra::catalog::load_catalog;
use swingcoach_infra::config::load_config;
use swingcoach_infra::filesystem::{database_url, ensure_data_dir, resolve_data_dir};
use swingcoach_infra::keychain::KeychainProvider;
use swingcoach_infra::relay::RelayClient;
use swingcoach_infra::secret::chain::build_credential_chain;
use swingcoach_infra::secret::resolve_relay_credentials;
use swingcoach_infra::sqlite::conversation::KvConversationRepository;
use swingcoach_infra::sqlite::kv::SqliteKvStore;
use swingcoach_infra::sqlite::pool::DatabasePool;
use swingcoach_infra::sqlite::profile::KvProfileStore;

/// Coordinator pinned to the SQLite-backed stores.
pub type ConcreteCoordinator = ConversationCoordinator<KvProfileStore, KvConversationRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: ConcreteCoordinator,
    pub catalog: Arc<StaticDrillCatalog>,
    pub relay_url: String,
}

impl AppState {
    /// Load config, open the database, resolve credentials and restore
    /// stored conversations.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let kv = SqliteKvStore::new(db_pool);

        let events = EventBus::default();
        let profile = ProfileService::load(KvProfileStore::new(kv.clone()), events.clone()).await?;

        let catalog = Arc::new(load_catalog(&data_dir).await);

        let credential_chain = build_credential_chain(Some(KeychainProvider::new()), true);
        let credentials = resolve_relay_credentials(&credential_chain).await;
        let relay = RelayClient::new(&config.relay, credentials)?;
        let relay_url = relay.url().to_string();

        let coordinator = ConversationCoordinator::new(
            BoxTransport::new(relay),
            KvConversationRepository::new(kv),
            profile,
            Arc::clone(&catalog) as Arc<dyn DrillCatalog>,
            config,
            events,
        );
        coordinator.restore().await?;

        Ok(Self {
            coordinator,
            catalog,
            relay_url,
        })
    }
}
