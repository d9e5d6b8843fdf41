//! Data directory layout.
//!
//! ```text
//! {data_dir}/
//!   config.toml      optional settings
//!   drills.json      optional drill catalog override
//!   swingcoach.db    profile and conversations
//!   logs/            daily-rotated JSON logs
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SWINGCOACH_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `SWINGCOACH_DATA_DIR` environment variable
/// 2. `~/.swingcoach`
/// 3. `./.swingcoach` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".swingcoach");
    }

    PathBuf::from(".swingcoach")
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

pub fn catalog_path(data_dir: &Path) -> PathBuf {
    data_dir.join("drills.json")
}

/// SQLite URL for the database inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("swingcoach.db").display())
}

/// Create the data directory if it does not exist yet.
pub async fn ensure_data_dir(data_dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(data_dir).await
}
