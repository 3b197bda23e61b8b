/// Analytics engine: pure derivations over the completion log
///
/// The streak, points and achievement calculators are composed by
/// `recompute_stats` into one consistent `UserStats` snapshot. Nothing in this
/// module reads the clock or touches storage; "today" and "now" are passed in.

pub mod achievements;
pub mod points;
pub mod progress;
pub mod streak;

pub use achievements::{evaluate_achievements, progress_for, AchievementMetrics};
pub use points::{calculate_points, points_for, POINTS_PER_COMPLETION};
pub use progress::{
    days_of_month, distinct_habits, habit_breakdown, month_heatmap, monthly_summary,
    weekday_distribution, DayIntensity, HabitCompletionCount, HeatmapCell, MonthlySummary,
    WeekdayCount,
};
pub use streak::{calculate_streaks, StreakSummary};

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{CompletionLog, UserStats};

/// Rebuild the stats snapshot from the full completion log
///
/// `previous` is the last persisted snapshot. Only two things flow from it into
/// the result: the historical `longest_streak` (the result never goes below
/// it) and achievement unlock timestamps.
pub fn recompute_stats(
    log: &CompletionLog,
    previous: &UserStats,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> UserStats {
    let completed_count = log.completed_count();
    let streaks = calculate_streaks(log, today);
    let total_points = points_for(completed_count);

    let metrics = AchievementMetrics {
        current_streak: streaks.current_streak,
        total_points,
        completed_count,
    };
    let achievements = evaluate_achievements(&previous.achievements, &metrics, now);

    UserStats {
        total_points,
        current_streak: streaks.current_streak,
        longest_streak: streaks.longest_streak.max(previous.longest_streak),
        achievements,
    }
}
