/// SQLite implementation of the stats store
///
/// Documents are serialized to JSON and kept in the `app_state` key-value table
/// under the fixed keys in `storage::keys`.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{CompletionRecord, UserStats};
use crate::storage::{keys, migrations, StatsStore, StorageError};

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so the store can be shared across tasks;
/// every call holds the lock only for the duration of one statement.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        migrations::initialize_database(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Read and decode the document stored under `key`
    fn read_document<T: DeserializeOwned>(
        &self,
        key: &'static str,
    ) -> Result<Option<T>, StorageError> {
        let read_error = |reason: String| StorageError::Read { key, reason };

        let conn = self
            .conn
            .lock()
            .map_err(|_| read_error("connection lock poisoned".to_string()))?;

        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| read_error(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| read_error(format!("malformed JSON: {}", e)))
        })
        .transpose()
    }

    /// Encode `value` and replace the document stored under `key`
    fn write_document<T: Serialize + ?Sized>(
        &self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StorageError> {
        let write_error = |reason: String| StorageError::Write { key, reason };

        let json = serde_json::to_string(value).map_err(|e| write_error(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| write_error("connection lock poisoned".to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, json, Utc::now()],
        )
        .map_err(|e| write_error(e.to_string()))?;

        tracing::debug!("Wrote '{}' ({} bytes)", key, json.len());
        Ok(())
    }
}

#[async_trait]
impl StatsStore for SqliteStorage {
    async fn load_completions(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        Ok(self.read_document(keys::COMPLETIONS)?.unwrap_or_default())
    }

    async fn save_completions(&self, records: &[CompletionRecord]) -> Result<(), StorageError> {
        self.write_document(keys::COMPLETIONS, records)
    }

    async fn load_stats(&self) -> Result<UserStats, StorageError> {
        Ok(self.read_document(keys::USER_STATS)?.unwrap_or_default())
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        self.write_document(keys::USER_STATS, stats)
    }
}
