//! Chat exchanges: request construction, the conversation coordinator and
//! title/summary generation.

pub mod coordinator;
pub mod prompt;
pub mod title;

pub use coordinator::ConversationCoordinator;
