//! Infrastructure layer for swingcoach.
//!
//! Implementations of the ports defined in `swingcoach-core`: the relay HTTP
//! client, SQLite key-value persistence, OS keychain and environment
//! credentials, plus config, catalog and data-directory loading.

pub mod catalog;
pub mod config;
pub mod filesystem;
pub mod keychain;
pub mod relay;
pub mod secret;
pub mod sqlite;
