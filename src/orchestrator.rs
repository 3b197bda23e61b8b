/// Stats recomputation orchestrator
///
/// Every mutating event (toggling a completion, deleting a habit) runs one full
/// load-compute-persist cycle. Cycles are serialized behind an async mutex so a
/// stale read-modify-write can never clobber a newer toggle.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::analytics::recompute_stats;
use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::domain::{CompletionLog, HabitId, UserStats};
use crate::storage::{StatsStore, StorageError};

/// Result of toggling a completion
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    /// The completed flag after the toggle
    pub completed: bool,
    pub stats: UserStats,
    /// Ids of achievements unlocked by this toggle
    pub newly_unlocked: Vec<String>,
}

/// Result of deleting a habit's completions
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    /// Number of completion records removed
    pub removed: usize,
    pub stats: UserStats,
}

pub struct StatsOrchestrator<S> {
    store: S,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
    gate: Mutex<()>,
}

impl<S: StatsStore> StatsOrchestrator<S> {
    /// Create an orchestrator that reads the wall clock
    pub fn new(store: S, config: TrackerConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, config: TrackerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config,
            gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Recompute and persist stats from the current completion log
    ///
    /// Reads fail open here. When either document can't be read, the stats
    /// derived from the fallback are returned but not saved, so an unreadable
    /// snapshot never overwrites stored unlocks or the longest streak.
    pub async fn recompute(&self) -> Result<UserStats, StorageError> {
        let _guard = self.gate.lock().await;

        let loaded = self.store.load_completions().await.map(CompletionLog::from_records);
        let previous = self.store.load_stats().await;

        match (loaded, previous) {
            (Ok(log), Ok(previous)) => self.persist_recomputed(&log, &previous).await,
            (loaded, previous) => {
                if let Err(e) = &loaded {
                    warn!("Treating completion log as empty: {}", e);
                }
                if let Err(e) = &previous {
                    warn!("Falling back to default stats: {}", e);
                }
                warn!("Reporting recomputed stats without saving them");

                let log = loaded.unwrap_or_default();
                let previous = previous.unwrap_or_default();
                Ok(recompute_stats(&log, &previous, self.clock.today(), self.clock.now()))
            }
        }
    }

    /// Toggle a habit's completion for a day, then recompute
    ///
    /// Both documents are loaded strictly here: a read failure aborts the toggle
    /// rather than saving a log or snapshot rebuilt from nothing over the
    /// stored one.
    pub async fn toggle_completion(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<ToggleOutcome, StorageError> {
        let _guard = self.gate.lock().await;

        let mut log = CompletionLog::from_records(self.store.load_completions().await?);
        let previous = self.store.load_stats().await?;

        let completed = log.toggle(habit_id, date, self.clock.now());
        debug!("Toggled {} on {} -> {}", habit_id, date, completed);

        self.save_log(&log).await?;
        let stats = self.persist_recomputed(&log, &previous).await?;

        let newly_unlocked = stats
            .newly_unlocked(&previous)
            .into_iter()
            .map(|a| a.id.clone())
            .collect();

        Ok(ToggleOutcome {
            completed,
            stats,
            newly_unlocked,
        })
    }

    /// Remove every completion of a deleted habit, then recompute
    pub async fn delete_habit(&self, habit_id: &HabitId) -> Result<DeleteOutcome, StorageError> {
        let _guard = self.gate.lock().await;

        let mut log = CompletionLog::from_records(self.store.load_completions().await?);
        let previous = self.store.load_stats().await?;

        let removed = log.remove_habit(habit_id);
        info!("Deleted habit {}: removed {} completion record(s)", habit_id, removed);

        self.save_log(&log).await?;
        let stats = self.persist_recomputed(&log, &previous).await?;

        Ok(DeleteOutcome { removed, stats })
    }

    /// The last persisted stats snapshot, or defaults if it can't be read
    pub async fn stats(&self) -> UserStats {
        self.load_stats_or_default().await
    }

    /// The current completion log, or an empty log if it can't be read
    pub async fn completions(&self) -> CompletionLog {
        self.load_log_or_empty().await
    }

    pub async fn is_completed(&self, habit_id: &HabitId, date: NaiveDate) -> bool {
        self.load_log_or_empty().await.is_completed(habit_id, date)
    }

    /// Compute from `log` on top of `previous` and persist; caller must hold the gate
    async fn persist_recomputed(
        &self,
        log: &CompletionLog,
        previous: &UserStats,
    ) -> Result<UserStats, StorageError> {
        let stats = recompute_stats(log, previous, self.clock.today(), self.clock.now());

        let snapshot = &stats;
        self.with_retries("stats", move || self.store.save_stats(snapshot)).await?;
        debug!(
            "Recomputed stats: {} points, streak {} (best {})",
            stats.total_points, stats.current_streak, stats.longest_streak
        );

        Ok(stats)
    }

    async fn save_log(&self, log: &CompletionLog) -> Result<(), StorageError> {
        let records = log.records();
        self.with_retries("completions", move || self.store.save_completions(records))
            .await
    }

    async fn load_log_or_empty(&self) -> CompletionLog {
        match self.store.load_completions().await {
            Ok(records) => CompletionLog::from_records(records),
            Err(e) => {
                warn!("Treating completion log as empty: {}", e);
                CompletionLog::new()
            }
        }
    }

    async fn load_stats_or_default(&self) -> UserStats {
        match self.store.load_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Falling back to default stats: {}", e);
                UserStats::default()
            }
        }
    }

    /// Run a write, retrying up to `write_retries` extra times
    async fn with_retries<F, Fut>(&self, what: &str, mut write: F) -> Result<(), StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), StorageError>>,
    {
        let mut attempt = 0;
        loop {
            match write().await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.config.write_retries => {
                    attempt += 1;
                    warn!("Write of {} failed (attempt {}), retrying: {}", what, attempt, e);
                }
                Err(e) => {
                    error!("Write of {} failed, giving up: {}", what, e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::clock::FixedClock;
    use crate::domain::{AchievementKind, CompletionRecord};
    use crate::storage::MemoryStorage;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn orchestrator_on(store: MemoryStorage, today: NaiveDate) -> StatsOrchestrator<MemoryStorage> {
        let clock = Arc::new(FixedClock::on(today));
        StatsOrchestrator::with_clock(store, TrackerConfig::default(), clock)
    }

    fn habit(name: &str) -> HabitId {
        HabitId::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_persists_log_and_stats() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(1));

        let outcome = orchestrator.toggle_completion(&habit("read"), day(1)).await.unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.stats.total_points, 10);
        assert_eq!(outcome.stats.current_streak, 1);
        assert_eq!(outcome.newly_unlocked, vec!["first_habit".to_string()]);

        assert_eq!(orchestrator.stats().await, outcome.stats);
        assert!(orchestrator.is_completed(&habit("read"), day(1)).await);
        assert_eq!(orchestrator.store().stats_writes(), 1);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_points_but_keeps_unlock() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(1));
        orchestrator.toggle_completion(&habit("read"), day(1)).await.unwrap();

        let outcome = orchestrator.toggle_completion(&habit("read"), day(1)).await.unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.stats.total_points, 0);
        assert!(outcome.newly_unlocked.is_empty());

        let first_habit = outcome.stats.achievement(AchievementKind::FirstHabit).unwrap();
        assert_eq!(first_habit.progress, 0);
        assert!(first_habit.is_unlocked());
        assert_eq!(orchestrator.completions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_habit_cascades_and_keeps_longest_streak() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(4));
        for d in 1..=4 {
            orchestrator.toggle_completion(&habit("read"), day(d)).await.unwrap();
        }
        orchestrator.toggle_completion(&habit("run"), day(4)).await.unwrap();

        let outcome = orchestrator.delete_habit(&habit("read")).await.unwrap();
        assert_eq!(outcome.removed, 4);
        assert_eq!(outcome.stats.total_points, 10);
        assert_eq!(outcome.stats.current_streak, 1);
        assert_eq!(outcome.stats.longest_streak, 4);
    }

    #[tokio::test]
    async fn test_recompute_reads_fail_open() {
        let store = MemoryStorage::with_completions(vec![CompletionRecord::completed(
            habit("read"),
            day(1),
            FixedClock::on(day(1)).now,
        )]);
        store.set_fail_reads(true);
        let orchestrator = orchestrator_on(store, day(1));

        let stats = orchestrator.recompute().await.unwrap();
        assert_eq!(stats, UserStats::default());
        assert_eq!(orchestrator.store().stats_writes(), 0);
    }

    #[tokio::test]
    async fn test_toggle_surfaces_read_failure() {
        let store = MemoryStorage::new();
        store.set_fail_reads(true);
        let orchestrator = orchestrator_on(store, day(1));

        let err = orchestrator.toggle_completion(&habit("read"), day(1)).await.unwrap_err();
        assert!(err.is_read());
    }

    async fn unlock_streak_7_then_lapse(orchestrator: &StatsOrchestrator<MemoryStorage>) {
        for d in 1..=7 {
            orchestrator.toggle_completion(&habit("read"), day(d)).await.unwrap();
        }
        orchestrator.toggle_completion(&habit("read"), day(7)).await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_surfaces_stats_read_failure_and_keeps_latch() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(7));
        unlock_streak_7_then_lapse(&orchestrator).await;
        let writes = orchestrator.store().stats_writes();

        orchestrator.store().set_fail_stats_reads(true);
        let err = orchestrator.toggle_completion(&habit("read"), day(6)).await.unwrap_err();
        assert!(err.is_read());
        assert_eq!(orchestrator.store().stats_writes(), writes);

        // The log was not touched either
        assert!(orchestrator.is_completed(&habit("read"), day(6)).await);

        orchestrator.store().set_fail_stats_reads(false);
        let stats = orchestrator.stats().await;
        assert!(stats.achievement(AchievementKind::Streak7).unwrap().is_unlocked());
        assert_eq!(stats.longest_streak, 7);
    }

    #[tokio::test]
    async fn test_delete_surfaces_stats_read_failure() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(7));
        unlock_streak_7_then_lapse(&orchestrator).await;

        orchestrator.store().set_fail_stats_reads(true);
        let err = orchestrator.delete_habit(&habit("read")).await.unwrap_err();
        assert!(err.is_read());

        orchestrator.store().set_fail_stats_reads(false);
        assert_eq!(orchestrator.completions().await.completed_count(), 6);
        assert_eq!(orchestrator.stats().await.longest_streak, 7);
    }

    #[tokio::test]
    async fn test_recompute_with_unreadable_stats_does_not_save() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(7));
        unlock_streak_7_then_lapse(&orchestrator).await;
        let writes = orchestrator.store().stats_writes();

        orchestrator.store().set_fail_stats_reads(true);
        let reported = orchestrator.recompute().await.unwrap();
        assert_eq!(reported.total_points, 60);
        assert_eq!(reported.longest_streak, 6);
        assert_eq!(orchestrator.store().stats_writes(), writes);

        orchestrator.store().set_fail_stats_reads(false);
        let stored = orchestrator.stats().await;
        assert!(stored.achievement(AchievementKind::Streak7).unwrap().is_unlocked());
        assert_eq!(stored.longest_streak, 7);
    }

    #[tokio::test]
    async fn test_single_write_failure_is_retried() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(1));
        orchestrator.store().fail_next_writes(1);

        let outcome = orchestrator.toggle_completion(&habit("read"), day(1)).await;
        assert!(outcome.is_ok());
        assert_eq!(orchestrator.store().stats_writes(), 1);
    }

    #[tokio::test]
    async fn test_persistent_write_failure_is_surfaced() {
        let orchestrator = orchestrator_on(MemoryStorage::new(), day(1));
        orchestrator.store().fail_next_writes(2);

        let err = orchestrator.toggle_completion(&habit("read"), day(1)).await.unwrap_err();
        assert!(err.is_write());
        assert_eq!(orchestrator.store().stats_writes(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_toggles_are_not_lost() {
        let orchestrator = Arc::new(orchestrator_on(MemoryStorage::new(), day(20)));

        let mut handles = Vec::new();
        for d in 1..=20 {
            let orchestrator = Arc::clone(&orchestrator);
            handles.push(tokio::spawn(async move {
                orchestrator.toggle_completion(&habit("read"), day(d)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = orchestrator.stats().await;
        assert_eq!(orchestrator.completions().await.completed_count(), 20);
        assert_eq!(stats.total_points, 200);
        assert_eq!(stats.current_streak, 20);
        assert!(stats.achievement(AchievementKind::Streak7).unwrap().is_unlocked());
    }
}
