//! Configuration loader for swingcoach.
//!
//! Reads `config.toml` from the data directory (`~/.swingcoach/` in
//! production) into [`CoachConfig`]. Falls back to defaults when the file is
//! missing or malformed, then applies environment overrides.

use std::path::Path;

use swingcoach_types::config::CoachConfig;

use crate::filesystem::config_path;

/// Overrides `[relay].base_url`.
pub const RELAY_URL_ENV: &str = "SWINGCOACH_RELAY_URL";

/// Lower bound for every timeout, in seconds.
const MIN_TIMEOUT_SECS: u64 = 1;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unreadable or unparsable file: a warning and defaults.
/// - `SWINGCOACH_RELAY_URL`, when set, replaces the relay base URL.
pub async fn load_config(data_dir: &Path) -> CoachConfig {
    let path = config_path(data_dir);

    let mut config = match tokio::fs::read_to_string(&path).await {
        Ok(content) => match toml::from_str::<CoachConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
                CoachConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            CoachConfig::default()
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            CoachConfig::default()
        }
    };

    if let Ok(url) = std::env::var(RELAY_URL_ENV) {
        if !url.trim().is_empty() {
            config.relay.base_url = url.trim().to_string();
        }
    }

    normalize(config)
}

/// Clamp values that would make the client unusable.
fn normalize(mut config: CoachConfig) -> CoachConfig {
    let relay = &mut config.relay;
    relay.first_byte_timeout_secs = relay.first_byte_timeout_secs.max(MIN_TIMEOUT_SECS);
    relay.stream_timeout_secs = relay
        .stream_timeout_secs
        .max(relay.first_byte_timeout_secs);
    relay.oneshot_timeout_secs = relay.oneshot_timeout_secs.max(MIN_TIMEOUT_SECS);
    relay.max_tokens = relay.max_tokens.max(1);

    config.memory.max_turns = config.memory.max_turns.max(2);
    config.memory.max_chars_per_turn = config.memory.max_chars_per_turn.max(1);
    config.chat.history_turns = config.chat.history_turns.max(1);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.relay.path, "/v1/messages");
        assert_eq!(config.memory.max_turns, 6);
    }

    #[tokio::test]
    async fn valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            config_path(tmp.path()),
            r#"
[relay]
base_url = "https://relay.example.com"
model = "coach-large"
stream_timeout_secs = 90

[titles]
enabled = false
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.relay.base_url, "https://relay.example.com");
        assert_eq!(config.relay.model.as_deref(), Some("coach-large"));
        assert_eq!(config.relay.stream_timeout_secs, 90);
        assert!(!config.titles.enabled);
    }

    #[tokio::test]
    async fn invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(config_path(tmp.path()), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.relay.max_tokens, 1024);
    }

    #[test]
    fn normalize_enforces_floors() {
        let mut config = CoachConfig::default();
        config.relay.first_byte_timeout_secs = 0;
        config.relay.stream_timeout_secs = 0;
        config.memory.max_turns = 0;

        let config = normalize(config);
        assert_eq!(config.relay.first_byte_timeout_secs, 1);
        assert_eq!(config.relay.stream_timeout_secs, 1);
        assert_eq!(config.memory.max_turns, 2);
    }
}
