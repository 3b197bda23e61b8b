/// In-process stats store
///
/// Keeps both documents in memory. Reads and writes can be made to fail on
/// demand, which is how the orchestrator's recovery paths are exercised.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{CompletionRecord, UserStats};
use crate::storage::{keys, StatsStore, StorageError};

#[derive(Default)]
pub struct MemoryStorage {
    completions: Mutex<Option<Vec<CompletionRecord>>>,
    stats: Mutex<Option<UserStats>>,
    fail_reads: AtomicBool,
    fail_stats_reads: AtomicBool,
    failing_writes: AtomicU32,
    stats_writes: AtomicU32,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing completion log
    pub fn with_completions(records: Vec<CompletionRecord>) -> Self {
        let storage = Self::new();
        if let Ok(mut slot) = storage.completions.lock() {
            *slot = Some(records);
        }
        storage
    }

    /// Make every subsequent read fail (or succeed again)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make reads of the stats snapshot alone fail (or succeed again)
    pub fn set_fail_stats_reads(&self, fail: bool) {
        self.fail_stats_reads.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` writes fail
    pub fn fail_next_writes(&self, count: u32) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of successful stats snapshot writes so far
    pub fn stats_writes(&self) -> u32 {
        self.stats_writes.load(Ordering::SeqCst)
    }

    fn check_read(&self, key: &'static str) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Read { key, reason: "store unavailable".to_string() });
        }
        Ok(())
    }

    fn check_write(&self, key: &'static str) -> Result<(), StorageError> {
        let consumed = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            return Err(StorageError::Write { key, reason: "store rejected write".to_string() });
        }
        Ok(())
    }

    fn poisoned(key: &'static str) -> StorageError {
        StorageError::Read { key, reason: "lock poisoned".to_string() }
    }
}

#[async_trait]
impl StatsStore for MemoryStorage {
    async fn load_completions(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        self.check_read(keys::COMPLETIONS)?;
        let slot = self.completions.lock().map_err(|_| Self::poisoned(keys::COMPLETIONS))?;
        Ok(slot.clone().unwrap_or_default())
    }

    async fn save_completions(&self, records: &[CompletionRecord]) -> Result<(), StorageError> {
        self.check_write(keys::COMPLETIONS)?;
        let mut slot = self.completions.lock().map_err(|_| Self::poisoned(keys::COMPLETIONS))?;
        *slot = Some(records.to_vec());
        Ok(())
    }

    async fn load_stats(&self) -> Result<UserStats, StorageError> {
        self.check_read(keys::USER_STATS)?;
        if self.fail_stats_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Read {
                key: keys::USER_STATS,
                reason: "snapshot unreadable".to_string(),
            });
        }
        let slot = self.stats.lock().map_err(|_| Self::poisoned(keys::USER_STATS))?;
        Ok(slot.clone().unwrap_or_default())
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        self.check_write(keys::USER_STATS)?;
        let mut slot = self.stats.lock().map_err(|_| Self::poisoned(keys::USER_STATS))?;
        *slot = Some(stats.clone());
        self.stats_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
