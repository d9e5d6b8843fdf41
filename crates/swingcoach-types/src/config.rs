//! Configuration types for swingcoach.
//!
//! `CoachConfig` represents the top-level `config.toml`. Every field has a
//! default so a missing file or section yields a working client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `~/.swingcoach/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub relay: RelayConfig,
    pub memory: MemoryConfig,
    pub titles: TitleConfig,
    pub chat: ChatConfig,
}

/// Relay endpoint and timeout ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub base_url: String,
    pub path: String,
    /// Model hint forwarded to the relay; the relay picks one when absent.
    pub model: Option<String>,
    /// Generation limit for chat replies.
    pub max_tokens: u32,
    pub first_byte_timeout_secs: u64,
    pub stream_timeout_secs: u64,
    /// Ceiling for one-shot calls (memory, title, summary).
    pub oneshot_timeout_secs: u64,
}

impl RelayConfig {
    pub fn first_byte_timeout(&self) -> Duration {
        Duration::from_secs(self.first_byte_timeout_secs)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn oneshot_timeout(&self) -> Duration {
        Duration::from_secs(self.oneshot_timeout_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
            path: "/v1/messages".to_string(),
            model: None,
            max_tokens: 1024,
            first_byte_timeout_secs: 30,
            stream_timeout_secs: 180,
            oneshot_timeout_secs: 45,
        }
    }
}

/// Bounds for the memory extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of most recent turns sent upstream.
    pub max_turns: usize,
    /// Per-turn character limit.
    pub max_chars_per_turn: usize,
    pub max_tokens: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: 6,
            max_chars_per_turn: 1500,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub enabled: bool,
    pub max_tokens: u32,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tokens: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Replaces the built-in coaching prompt when set.
    pub system_prompt: Option<String>,
    /// Prior messages included with each chat request.
    pub history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            history_turns: 20,
        }
    }
}
