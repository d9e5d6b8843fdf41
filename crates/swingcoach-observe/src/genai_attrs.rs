//! OpenTelemetry GenAI semantic convention values.
//!
//! Field names in `tracing` macros must be literal, so spans spell out
//! `gen_ai.operation.name` inline; the operation values come from here.

/// Streaming coaching reply.
pub const OP_CHAT: &str = "chat";

/// Profile extraction after an exchange.
pub const OP_EXTRACT_MEMORY: &str = "extract_memory";

/// Conversation title and summary generation.
pub const OP_GENERATE_TITLE: &str = "generate_title";
