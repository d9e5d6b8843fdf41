use thiserror::Error;
use uuid::Uuid;

/// Errors from repository operations (used by trait definitions in swingcoach-core).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors related to credential lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential provider unavailable")]
    ProviderUnavailable,

    #[error("credential provider is read-only")]
    ReadOnly,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors surfaced by the conversation coordinator.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("conversation {0} not found")]
    UnknownConversation(Uuid),

    #[error("conversation {0} is not the active conversation")]
    ReadOnly(Uuid),

    #[error("message text is empty")]
    EmptyMessage,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
