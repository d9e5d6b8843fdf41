//! Coaching logic and repository trait definitions for swingcoach.
//!
//! This crate defines the "ports" (transport and repository traits) that the
//! infrastructure layer implements, plus the stream session, profile memory
//! and conversation coordinator built on top of them. It depends only on
//! `swingcoach-types` and `swingcoach-observe` -- never on `swingcoach-infra` or any IO crate.

pub mod catalog;
pub mod chat;
pub mod event;
pub mod llm;
pub mod memory;
pub mod parse;
pub mod profile;
pub mod repository;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_support;
