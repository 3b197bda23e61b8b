/// Completion log: the per-habit, per-day record of habit completions
///
/// Records are never deleted when a completion is un-toggled; the `completed`
/// flag is flipped in place instead. The only removal path is the cascade that
/// runs when a habit is deleted.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::HabitId;

/// A record that a habit was (or was not) performed on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// Which habit this record is for
    pub habit_id: HabitId,
    /// The logical calendar day, timezone-naive
    pub date: NaiveDate,
    /// Whether the habit counts as done for that day
    pub completed: bool,
    /// Instant of the last mutation (audit/display only)
    pub timestamp: DateTime<Utc>,
}

impl CompletionRecord {
    /// Create a fresh completed record
    pub fn completed(habit_id: HabitId, date: NaiveDate, timestamp: DateTime<Utc>) -> Self {
        Self {
            habit_id,
            date,
            completed: true,
            timestamp,
        }
    }
}

/// The full completion log
///
/// Holds at most one record per `(habit_id, date)` pair. Insertion order is
/// preserved so the log round-trips through storage unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionLog {
    records: Vec<CompletionRecord>,
}

impl CompletionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from loaded records, repairing duplicate pairs
    ///
    /// When the same `(habit_id, date)` pair appears more than once the record
    /// with the latest timestamp wins (later input position on a tie). The
    /// surviving record keeps the position of the first occurrence.
    pub fn from_records(records: Vec<CompletionRecord>) -> Self {
        let mut positions: HashMap<(HabitId, NaiveDate), usize> = HashMap::new();
        let mut coalesced: Vec<CompletionRecord> = Vec::with_capacity(records.len());

        for record in records {
            let key = (record.habit_id.clone(), record.date);
            match positions.get(&key) {
                Some(&index) => {
                    tracing::warn!(
                        "Duplicate completion for habit {} on {}, keeping latest",
                        record.habit_id,
                        record.date
                    );
                    if record.timestamp >= coalesced[index].timestamp {
                        coalesced[index] = record;
                    }
                }
                None => {
                    positions.insert(key, coalesced.len());
                    coalesced.push(record);
                }
            }
        }

        Self { records: coalesced }
    }

    /// Toggle the completion for a habit on a day
    ///
    /// An existing record has its flag flipped and its timestamp refreshed; a
    /// missing record is appended as completed. Returns the new flag.
    pub fn toggle(&mut self, habit_id: &HabitId, date: NaiveDate, now: DateTime<Utc>) -> bool {
        if let Some(record) = self
            .records
            .iter_mut()
            .find(|r| &r.habit_id == habit_id && r.date == date)
        {
            record.completed = !record.completed;
            record.timestamp = now;
            return record.completed;
        }

        self.records.push(CompletionRecord::completed(habit_id.clone(), date, now));
        true
    }

    /// Remove every record belonging to a habit, returning how many went
    pub fn remove_habit(&mut self, habit_id: &HabitId) -> usize {
        let before = self.records.len();
        self.records.retain(|r| &r.habit_id != habit_id);
        before - self.records.len()
    }

    /// Check whether a habit is marked completed on a day
    pub fn is_completed(&self, habit_id: &HabitId, date: NaiveDate) -> bool {
        self.records
            .iter()
            .any(|r| &r.habit_id == habit_id && r.date == date && r.completed)
    }

    /// Iterate over the records currently marked completed
    pub fn completed_records(&self) -> impl Iterator<Item = &CompletionRecord> {
        self.records.iter().filter(|r| r.completed)
    }

    /// Number of records marked completed
    pub fn completed_count(&self) -> u32 {
        u32::try_from(self.completed_records().count()).unwrap_or(u32::MAX)
    }

    /// Distinct days with at least one completion, ascending
    pub fn completed_dates(&self) -> BTreeSet<NaiveDate> {
        self.completed_records().map(|r| r.date).collect()
    }

    pub fn records(&self) -> &[CompletionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
