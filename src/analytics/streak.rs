/// Combined streak calculation
///
/// A streak counts consecutive calendar days on which at least one habit was
/// completed. Habits are not tracked separately: two habits completed on the
/// same day count as one active day.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::CompletionLog;

/// Current and longest combined streak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    /// Length of the run ending today or yesterday, otherwise 0
    pub current_streak: u32,
    /// Longest run anywhere in the log
    pub longest_streak: u32,
}

/// Calculate streaks from the full completion log
///
/// `today` is the local calendar day at recomputation time. The final run only
/// counts as current if its last day is today or yesterday.
pub fn calculate_streaks(log: &CompletionLog, today: NaiveDate) -> StreakSummary {
    // BTreeSet iteration is ascending, so this walks the days chronologically
    let dates = log.completed_dates();

    let mut longest_streak = 0;
    let mut running = 0;
    let mut last_date: Option<NaiveDate> = None;

    for date in dates {
        running = match last_date {
            Some(previous) if (date - previous).num_days() == 1 => running + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(running);
        last_date = Some(date);
    }

    let current_streak = match last_date {
        Some(last) if (today - last).num_days() <= 1 => running,
        _ => 0,
    };

    StreakSummary {
        current_streak,
        longest_streak,
    }
}
