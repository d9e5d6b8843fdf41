//! Conversation repository trait definition.

use swingcoach_types::chat::Conversation;
use swingcoach_types::error::RepositoryError;
use uuid::Uuid;

/// Durable storage for conversations and their messages.
pub trait ConversationRepository: Send + Sync + 'static {
    /// Insert or replace a conversation with all of its messages.
    fn save(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load every stored conversation, most recently updated first.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Delete a conversation. No-op if it does not exist.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
