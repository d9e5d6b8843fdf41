//! SQLite key-value store.
//!
//! Values are JSON text grouped by namespace. Profile and conversation
//! storage are thin typed layers over this table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;

use swingcoach_types::error::RepositoryError;

use super::pool::DatabasePool;

#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

/// A stored value with its bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct KvEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct KvRow {
    key: String,
    value: String,
    created_at: String,
    updated_at: String,
}

impl KvRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("key")?,
            value: row.try_get("value")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_entry(self) -> Result<KvEntry, RepositoryError> {
        let value = serde_json::from_str(&self.value)
            .map_err(|e| RepositoryError::Serialization(format!("invalid JSON value: {e}")))?;
        Ok(KvEntry {
            key: self.key,
            value,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Raw JSON value for a key.
    pub async fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE namespace = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("value").map_err(query_error)?;
                let value = serde_json::from_str(&raw).map_err(|e| {
                    RepositoryError::Serialization(format!("invalid JSON value: {e}"))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Upsert a raw JSON value.
    pub async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let raw = serde_json::to_string(value)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO kv_store (namespace, key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(namespace)
        .bind(key)
        .bind(&raw)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    /// Delete a key. No-op if absent.
    pub async fn delete(&self, namespace: &str, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv_store WHERE namespace = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    /// All entries of a namespace, most recently updated first.
    pub async fn entries(&self, namespace: &str) -> Result<Vec<KvEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT key, value, created_at, updated_at FROM kv_store WHERE namespace = ? ORDER BY updated_at DESC",
        )
        .bind(namespace)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| KvRow::from_row(row).map_err(query_error)?.into_entry())
            .collect()
    }

    /// Typed read.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<T>, RepositoryError> {
        match self.get(namespace, key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| RepositoryError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Typed write.
    pub async fn set_json<T: Serialize>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
    ) -> Result<(), RepositoryError> {
        let value =
            serde_json::to_value(value).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.set(namespace, key, &value).await
    }
}
