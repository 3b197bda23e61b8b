/// Properties of the stats engine, checked through the public API
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use habit_stats_mcp::*;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn habit(name: &str) -> HabitId {
    HabitId::parse(name).unwrap()
}

fn log_of(entries: &[(&str, NaiveDate)]) -> CompletionLog {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut log = CompletionLog::new();
    for (name, date) in entries {
        log.toggle(&habit(name), *date, now);
    }
    log
}

fn orchestrator_on(today: NaiveDate) -> StatsOrchestrator<MemoryStorage> {
    StatsOrchestrator::with_clock(
        MemoryStorage::new(),
        TrackerConfig::default(),
        Arc::new(FixedClock::on(today)),
    )
}

#[cfg(test)]
mod stats_property_tests {
    use super::*;

    #[test]
    fn test_empty_log_scenario() {
        let log = CompletionLog::new();
        let stats = recompute_stats(&log, &UserStats::default(), day(1, 7), Utc::now());

        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.achievements.len(), 6);
        assert!(stats.achievements.iter().all(|a| a.progress == 0 && a.unlocked_at.is_none()));
    }

    #[test]
    fn test_contiguous_week_ending_today_scenario() {
        let entries: Vec<_> = (1..=7).map(|d| ("read", day(1, d))).collect();
        let log = log_of(&entries);
        let stats = recompute_stats(&log, &UserStats::default(), day(1, 7), Utc::now());

        assert_eq!(stats.current_streak, 7);
        assert_eq!(stats.longest_streak, 7);
        let streak_7 = stats.achievement(AchievementKind::Streak7).unwrap();
        assert_eq!(streak_7.progress, 7);
        assert!(streak_7.unlocked_at.is_some());
    }

    #[test]
    fn test_streak_broken_then_gap_scenario() {
        let log = log_of(&[("read", day(1, 1)), ("read", day(1, 2)), ("read", day(1, 5))]);
        let streaks = calculate_streaks(&log, day(1, 5));
        assert_eq!(streaks.current_streak, 1);
        assert_eq!(streaks.longest_streak, 2);
    }

    #[test]
    fn test_stale_streak_scenario() {
        let log = log_of(&[("read", day(1, 1))]);
        let stale = calculate_streaks(&log, day(1, 10));
        let fresh = calculate_streaks(&log, day(1, 1));
        assert_eq!(stale.current_streak, 0);
        assert_eq!(stale.longest_streak, fresh.longest_streak);
    }

    #[test]
    fn test_points_match_completed_count_with_toggled_off_records() {
        let mut log = log_of(&[
            ("read", day(1, 1)),
            ("run", day(1, 1)),
            ("read", day(1, 2)),
            ("run", day(1, 3)),
        ]);
        log.toggle(&habit("run"), day(1, 1), Utc::now());

        assert_eq!(log.len(), 4);
        assert_eq!(log.completed_count(), 3);
        assert_eq!(calculate_points(&log), 10 * log.completed_count());
    }

    #[test]
    fn test_recompute_twice_is_identical() {
        let log = log_of(&[("read", day(1, 3)), ("run", day(1, 4)), ("read", day(1, 5))]);
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();

        let first = recompute_stats(&log, &UserStats::default(), day(1, 5), now);
        let second = recompute_stats(&log, &first, day(1, 5), now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_longest_streak_over_earlier_subset_is_lower_bound() {
        let full: Vec<_> = [1, 2, 3, 4, 8, 9, 15, 16, 17, 18, 19, 20]
            .iter()
            .map(|d| ("read", day(1, *d)))
            .collect();

        let full_longest = calculate_streaks(&log_of(&full), day(1, 20)).longest_streak;
        for cut in 0..full.len() {
            let subset = calculate_streaks(&log_of(&full[..cut]), day(1, 20)).longest_streak;
            assert!(full_longest >= subset);
        }
        assert_eq!(full_longest, 6);
    }

    #[tokio::test]
    async fn test_unlock_latch_survives_any_later_input() {
        let orchestrator = orchestrator_on(day(1, 7));
        for d in 1..=7 {
            orchestrator.toggle_completion(&habit("read"), day(1, d)).await.unwrap();
        }
        let unlocked_at = orchestrator
            .stats()
            .await
            .achievement(AchievementKind::Streak7)
            .and_then(|a| a.unlocked_at)
            .expect("streak_7 should be unlocked");

        let outcome = orchestrator.delete_habit(&habit("read")).await.unwrap();
        let streak_7 = outcome.stats.achievement(AchievementKind::Streak7).unwrap();
        assert_eq!(streak_7.progress, 0);
        assert_eq!(streak_7.unlocked_at, Some(unlocked_at));
        assert_eq!(outcome.stats.longest_streak, 7);
    }

    #[tokio::test]
    async fn test_deleting_completions_reduces_points_but_not_unlocks() {
        let orchestrator = orchestrator_on(day(1, 10));
        for d in 1..=4 {
            orchestrator.toggle_completion(&habit("read"), day(1, d)).await.unwrap();
        }
        for d in 5..=10 {
            orchestrator.toggle_completion(&habit("run"), day(1, d)).await.unwrap();
        }

        let before = orchestrator.stats().await;
        assert_eq!(before.total_points, 100);
        assert!(before.achievement(AchievementKind::Points100).unwrap().is_unlocked());

        let outcome = orchestrator.delete_habit(&habit("run")).await.unwrap();
        let points_100 = outcome.stats.achievement(AchievementKind::Points100).unwrap();
        assert_eq!(outcome.stats.total_points, 40);
        assert_eq!(points_100.progress, 40);
        assert!(points_100.is_unlocked());
    }

    #[tokio::test]
    async fn test_each_mutation_writes_stats_once() {
        let orchestrator = orchestrator_on(day(1, 2));
        orchestrator.toggle_completion(&habit("read"), day(1, 1)).await.unwrap();
        orchestrator.toggle_completion(&habit("read"), day(1, 2)).await.unwrap();
        orchestrator.delete_habit(&habit("read")).await.unwrap();

        assert_eq!(orchestrator.store().stats_writes(), 3);
    }

    #[test]
    fn test_loaded_duplicates_are_coalesced() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        let mut undone = CompletionRecord::completed(habit("read"), day(1, 1), late);
        undone.completed = false;
        let records = vec![
            undone,
            CompletionRecord::completed(habit("read"), day(1, 1), early),
        ];

        let log = CompletionLog::from_records(records);
        assert_eq!(log.len(), 1);
        assert!(!log.is_completed(&habit("read"), day(1, 1)));
        assert_eq!(calculate_points(&log), 0);
    }
}
