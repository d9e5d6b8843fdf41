//! Interactive chat with the coach.
//!
//! Streams replies as they arrive, lets Ctrl+C cancel an in-flight reply,
//! and waits for the background profile update before exiting. Entry
//! point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
