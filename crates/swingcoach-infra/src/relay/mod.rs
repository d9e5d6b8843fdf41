//! HTTP client for the coaching relay.
//!
//! [`RelayClient`] implements
//! [`TransportClient`](swingcoach_core::llm::transport::TransportClient)
//! over reqwest with SSE streaming.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::{RelayClient, RelayCredentials};
