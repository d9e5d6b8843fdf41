//! Shared domain types for swingcoach.
//!
//! Conversations, the swing profile, relay request/stream types, the error
//! taxonomy and configuration.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod profile;
pub mod stream;
