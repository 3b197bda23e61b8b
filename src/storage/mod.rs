/// Storage layer for persisting the completion log and stats snapshot
///
/// The stats engine treats persistence as an external collaborator with a
/// minimal load/save contract. Values are JSON documents stored under fixed
/// keys, with SQLite as the production backend.

pub mod memory;
pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CompletionRecord, UserStats};

/// Fixed keys the persisted documents live under
pub mod keys {
    pub const COMPLETIONS: &str = "completions";
    pub const USER_STATS: &str = "user_stats";
}

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store is unreadable or holds malformed data
    #[error("Failed to read '{key}': {reason}")]
    Read { key: &'static str, reason: String },

    /// The backing store rejected a write
    #[error("Failed to write '{key}': {reason}")]
    Write { key: &'static str, reason: String },

    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl StorageError {
    pub fn is_read(&self) -> bool {
        matches!(self, StorageError::Read { .. })
    }

    pub fn is_write(&self) -> bool {
        matches!(self, StorageError::Write { .. })
    }
}

/// Trait defining the persistence contract of the stats engine
///
/// Loads return `StorageError::Read` and saves return `StorageError::Write`.
/// Recovery policy (fail-open reads, retried writes) belongs to the caller.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Load the full completion log; a missing document is an empty log
    async fn load_completions(&self) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Replace the full completion log
    async fn save_completions(&self, records: &[CompletionRecord]) -> Result<(), StorageError>;

    /// Load the stats snapshot; a missing document is `UserStats::default()`
    async fn load_stats(&self) -> Result<UserStats, StorageError>;

    /// Replace the stats snapshot
    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError>;
}
