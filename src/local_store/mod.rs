//! Local store - device-resident persistence
//!
//! ## Responsibilities
//!
//! - Secure partition: session tokens, addressed by string key
//! - General partition: per-store state snapshots, keyed by store name
//! - Offline payload caches (`offline_<key>` convention)
//!
//! One SQLite file backs both partitions. Reads and writes never surface
//! errors to callers: failures are logged and reads fall back to `None`,
//! so a corrupt or missing entry degrades to "nothing persisted".

use crate::error::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

/// Local store instance
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open (and create if needed) the local database
    pub async fn open(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await?;

        let pragmas = [
            "PRAGMA journal_mode = WAL",
            "PRAGMA synchronous = NORMAL",
            "PRAGMA busy_timeout = 5000",
        ];
        for pragma in pragmas {
            sqlx::query(pragma).execute(&pool).await?;
        }

        let store = Self { pool };
        store.bootstrap().await?;

        Ok(store)
    }

    /// Open an in-memory database (tests)
    ///
    /// Limited to a single connection: every new `:memory:` connection
    /// would otherwise be a fresh, empty database.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.bootstrap().await?;

        Ok(store)
    }

    async fn bootstrap(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS secure_entries (
                entry_key   TEXT PRIMARY KEY,
                entry_value TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS store_snapshots (
                store_key  TEXT PRIMARY KEY,
                payload    TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================
    // Secure partition
    // ========================================

    /// Store a secure value
    pub async fn secure_set(&self, key: &str, value: &str) {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO secure_entries (entry_key, entry_value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(entry_key) DO UPDATE SET
                entry_value = excluded.entry_value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(key = %key, error = %e, "Secure store write failed");
        }
    }

    /// Read a secure value; missing key or read failure yields `None`
    pub async fn secure_get(&self, key: &str) -> Option<String> {
        let result = sqlx::query("SELECT entry_value FROM secure_entries WHERE entry_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(row) => row.map(|r| r.get("entry_value")),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Secure store read failed");
                None
            }
        }
    }

    /// Delete a secure value
    pub async fn secure_delete(&self, key: &str) {
        let result = sqlx::query("DELETE FROM secure_entries WHERE entry_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await;

        if let Err(e) = result {
            tracing::warn!(key = %key, error = %e, "Secure store delete failed");
        }
    }

    // ========================================
    // General partition (store snapshots)
    // ========================================

    /// Persist a store snapshot, replacing any previous one
    pub async fn snapshot_set(&self, store: &str, payload: &serde_json::Value) {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO store_snapshots (store_key, payload, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(store_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(store)
        .bind(payload.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(store = %store, error = %e, "Snapshot write failed");
        }
    }

    /// Load a store snapshot; missing, unreadable, or undecodable yields `None`
    pub async fn snapshot_get(&self, store: &str) -> Option<serde_json::Value> {
        let result = sqlx::query("SELECT payload FROM store_snapshots WHERE store_key = ?")
            .bind(store)
            .fetch_optional(&self.pool)
            .await;

        let payload: String = match result {
            Ok(Some(row)) => row.get("payload"),
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(store = %store, error = %e, "Snapshot read failed");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(store = %store, error = %e, "Snapshot payload undecodable");
                None
            }
        }
    }

    /// Remove a store snapshot
    pub async fn snapshot_delete(&self, store: &str) {
        let result = sqlx::query("DELETE FROM store_snapshots WHERE store_key = ?")
            .bind(store)
            .execute(&self.pool)
            .await;

        if let Err(e) = result {
            tracing::warn!(store = %store, error = %e, "Snapshot delete failed");
        }
    }

    // ========================================
    // Offline payload caches
    // ========================================

    /// Cache a payload under the `offline_<key>` convention
    pub async fn cache_set(&self, key: &str, payload: &serde_json::Value) {
        self.snapshot_set(&format!("offline_{key}"), payload).await;
    }

    /// Read a cached payload
    pub async fn cache_get(&self, key: &str) -> Option<serde_json::Value> {
        self.snapshot_get(&format!("offline_{key}")).await
    }
}
