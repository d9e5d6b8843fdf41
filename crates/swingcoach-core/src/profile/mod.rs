//! Swing profile ownership.

pub mod service;

pub use service::ProfileService;
