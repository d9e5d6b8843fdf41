//! Conversation persistence on top of the KV store.
//!
//! Each conversation, messages included, is one JSON value keyed by its id.

use swingcoach_core::repository::conversation::ConversationRepository;
use swingcoach_types::chat::Conversation;
use swingcoach_types::error::RepositoryError;
use uuid::Uuid;

use super::kv::SqliteKvStore;

const NAMESPACE: &str = "conversation";

#[derive(Clone)]
pub struct KvConversationRepository {
    kv: SqliteKvStore,
}

impl KvConversationRepository {
    pub fn new(kv: SqliteKvStore) -> Self {
        Self { kv }
    }
}

impl ConversationRepository for KvConversationRepository {
    async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        self.kv
            .set_json(NAMESPACE, &conversation.id.to_string(), conversation)
            .await
    }

    async fn list(&self) -> Result<Vec<Conversation>, RepositoryError> {
        let entries = self.kv.entries(NAMESPACE).await?;
        let mut conversations = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<Conversation>(entry.value) {
                Ok(conversation) => conversations.push(conversation),
                Err(e) => {
                    tracing::warn!(key = %entry.key, error = %e, "skipping unreadable conversation");
                }
            }
        }
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        self.kv.delete(NAMESPACE, &id.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use chrono::Duration;
    use swingcoach_types::chat::{ChatMessage, MessageRole};

    async fn repo() -> (KvConversationRepository, SqliteKvStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("conv.db").display());
        let kv = SqliteKvStore::new(DatabasePool::new(&url).await.unwrap());
        (KvConversationRepository::new(kv.clone()), kv, dir)
    }

    #[tokio::test]
    async fn save_and_list_with_messages() {
        let (repo, _kv, _dir) = repo().await;
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::new(MessageRole::User, "I keep slicing my driver"));
        conversation.push(ChatMessage::new(MessageRole::Assistant, "Let's check your grip."));

        repo.save(&conversation).await.unwrap();
        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, conversation.id);
        assert_eq!(listed[0].messages().len(), 2);
        assert_eq!(listed[0].messages()[1].content, "Let's check your grip.");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (repo, _kv, _dir) = repo().await;
        let mut older = Conversation::new();
        older.updated_at = older.updated_at - Duration::hours(2);
        let newer = Conversation::new();

        repo.save(&newer).await.unwrap();
        repo.save(&older).await.unwrap();

        let ids: Vec<Uuid> = repo.list().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn save_replaces_existing() {
        let (repo, _kv, _dir) = repo().await;
        let mut conversation = Conversation::new();
        repo.save(&conversation).await.unwrap();
        conversation.title = "Fixing the slice".to_string();
        repo.save(&conversation).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Fixing the slice");
    }

    #[tokio::test]
    async fn unreadable_entries_are_skipped() {
        let (repo, kv, _dir) = repo().await;
        repo.save(&Conversation::new()).await.unwrap();
        kv.set(NAMESPACE, "garbage", &serde_json::json!({"nope": true}))
            .await
            .unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_conversation() {
        let (repo, _kv, _dir) = repo().await;
        let conversation = Conversation::new();
        repo.save(&conversation).await.unwrap();
        repo.delete(&conversation.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }
}
