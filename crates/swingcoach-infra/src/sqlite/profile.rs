//! Swing profile persistence on top of the KV store.

use swingcoach_core::repository::profile::ProfileStore;
use swingcoach_types::error::RepositoryError;
use swingcoach_types::profile::SwingProfile;

use super::kv::SqliteKvStore;

const NAMESPACE: &str = "profile";
const KEY: &str = "swing_profile";

/// Stores the single profile as one JSON value.
#[derive(Clone)]
pub struct KvProfileStore {
    kv: SqliteKvStore,
}

impl KvProfileStore {
    pub fn new(kv: SqliteKvStore) -> Self {
        Self { kv }
    }
}

impl ProfileStore for KvProfileStore {
    async fn load(&self) -> Result<Option<SwingProfile>, RepositoryError> {
        self.kv.get_json(NAMESPACE, KEY).await
    }

    async fn save(&self, profile: &SwingProfile) -> Result<(), RepositoryError> {
        self.kv.set_json(NAMESPACE, KEY, profile).await
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.kv.delete(NAMESPACE, KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    async fn store() -> (KvProfileStore, SqliteKvStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("profile.db").display());
        let kv = SqliteKvStore::new(DatabasePool::new(&url).await.unwrap());
        (KvProfileStore::new(kv.clone()), kv, dir)
    }

    #[tokio::test]
    async fn absent_profile_loads_as_none() {
        let (store, _kv, _dir) = store().await;
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let (store, _kv, _dir) = store().await;
        let mut profile = SwingProfile::default();
        profile.summary = "Steep downswing, early extension.".to_string();
        profile.identified_issues.insert("slice".to_string());

        store.save(&profile).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.summary, profile.summary);
        assert!(loaded.identified_issues.contains("slice"));
    }

    #[tokio::test]
    async fn clear_removes_profile() {
        let (store, _kv, _dir) = store().await;
        store.save(&SwingProfile::default()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_value_is_serialization_error() {
        let (store, kv, _dir) = store().await;
        kv.set(NAMESPACE, KEY, &serde_json::json!(["not", "a", "profile"]))
            .await
            .unwrap();
        assert!(matches!(
            store.load().await,
            Err(RepositoryError::Serialization(_))
        ));
    }
}
