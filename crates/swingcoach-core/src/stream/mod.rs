//! Streaming exchange lifecycle.

pub mod session;

pub use session::{SessionHandle, StreamSession, StreamTimeouts};
