//! Drill catalog loader.
//!
//! `{data_dir}/drills.json` replaces the built-in catalog when present and
//! valid. It is a JSON array of `{"id", "name", "addresses"?}` objects.

use std::path::Path;

use swingcoach_core::catalog::StaticDrillCatalog;
use swingcoach_types::catalog::Drill;

use crate::filesystem::catalog_path;

/// Load the drill catalog for a data directory.
///
/// A missing file yields the built-in catalog. An unreadable, malformed or
/// empty file logs a warning and also yields the built-in catalog.
pub async fn load_catalog(data_dir: &Path) -> StaticDrillCatalog {
    let path = catalog_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return StaticDrillCatalog::builtin();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using built-in drills", path.display());
            return StaticDrillCatalog::builtin();
        }
    };

    match serde_json::from_str::<Vec<Drill>>(&content) {
        Ok(drills) if !drills.is_empty() => {
            tracing::info!(count = drills.len(), "loaded drill catalog from {}", path.display());
            StaticDrillCatalog::new(drills)
        }
        Ok(_) => {
            tracing::warn!("{} lists no drills, using built-in drills", path.display());
            StaticDrillCatalog::builtin()
        }
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using built-in drills", path.display());
            StaticDrillCatalog::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swingcoach_core::catalog::DrillCatalog;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_uses_builtin() {
        let tmp = TempDir::new().unwrap();
        let catalog = load_catalog(tmp.path()).await;
        assert_eq!(catalog.len(), StaticDrillCatalog::builtin().len());
        assert!(catalog.contains("gate-drill"));
    }

    #[tokio::test]
    async fn override_file_replaces_builtin() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            catalog_path(tmp.path()),
            r#"[{"id":"wall-drill","name":"Wall drill","addresses":["early extension"]},{"id":"hinge","name":"Hinge and hold"}]"#,
        )
        .await
        .unwrap();

        let catalog = load_catalog(tmp.path()).await;
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("wall-drill"));
        assert!(!catalog.contains("gate-drill"));
        assert!(catalog.get("hinge").unwrap().addresses.is_empty());
    }

    #[tokio::test]
    async fn malformed_or_empty_file_uses_builtin() {
        let tmp = TempDir::new().unwrap();
        let path = catalog_path(tmp.path());

        tokio::fs::write(&path, "{ not json").await.unwrap();
        assert!(load_catalog(tmp.path()).await.contains("gate-drill"));

        tokio::fs::write(&path, "[]").await.unwrap();
        assert!(load_catalog(tmp.path()).await.contains("gate-drill"));
    }
}
