//! Repository trait definitions (ports).
//!
//! The infrastructure layer (swingcoach-infra) implements these traits. The
//! core crate never depends on a specific storage technology.

pub mod conversation;
pub mod credential;
pub mod profile;
