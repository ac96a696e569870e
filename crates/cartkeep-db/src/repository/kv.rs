//! # Key-Value Repository
//!
//! Reads and writes opaque string blobs in the `kv_store` table.
//!
//! ## Write Semantics
//! ```text
//! set(key, value)
//!      │
//!      ▼
//! INSERT INTO kv_store (key, value, updated_at)
//! ON CONFLICT(key) DO UPDATE SET value = excluded.value, ...
//!      │
//!      ▼
//! Whole-blob replacement in one statement: a reader sees the old blob
//! or the new one, never a mix.
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for `kv_store` operations.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads the blob stored under `key`.
    ///
    /// ## Returns
    /// `None` if nothing has been stored under the key.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = value.is_some(), "kv get");

        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous blob.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv set");

        Ok(())
    }

    /// Deletes the blob under `key`.
    ///
    /// ## Returns
    /// `true` if a row was removed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every stored key in lexical order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}
