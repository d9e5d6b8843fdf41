//! SQLite storage layer.
//!
//! A single key-value table in WAL mode with split read/write pools. The
//! profile and conversations are stored as JSON values in separate
//! namespaces.

pub mod conversation;
pub mod kv;
pub mod pool;
pub mod profile;
