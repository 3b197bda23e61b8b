/// Achievement evaluation
///
/// Progress is derived fresh from the live metrics on every evaluation and may
/// go down (a broken streak, deleted completions). The unlock timestamp is a
/// one-way latch: once set it is carried forward untouched.

use chrono::{DateTime, Utc};

use crate::domain::{Achievement, AchievementKind, AchievementMetric};

/// Live aggregate metrics achievements are measured against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementMetrics {
    pub current_streak: u32,
    pub total_points: u32,
    pub completed_count: u32,
}

impl AchievementMetrics {
    fn value_of(&self, metric: AchievementMetric) -> u32 {
        match metric {
            AchievementMetric::AnyCompletion => u32::from(self.completed_count > 0),
            AchievementMetric::CurrentStreak => self.current_streak,
            AchievementMetric::TotalPoints => self.total_points,
            AchievementMetric::CompletedCount => self.completed_count,
        }
    }
}

/// Progress of a single achievement for the given metrics
pub fn progress_for(kind: AchievementKind, metrics: &AchievementMetrics) -> u32 {
    metrics.value_of(kind.metric()).min(kind.max_progress())
}

/// Produce the updated achievement sequence
///
/// The result always holds the whole catalog in catalog order. Entries in
/// `previous` with ids outside the catalog are dropped.
pub fn evaluate_achievements(
    previous: &[Achievement],
    metrics: &AchievementMetrics,
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    AchievementKind::ALL
        .into_iter()
        .map(|kind| {
            let mut achievement = previous
                .iter()
                .find(|a| a.id == kind.id())
                .cloned()
                .unwrap_or_else(|| Achievement::locked(kind));

            achievement.max_progress = kind.max_progress();
            achievement.progress = progress_for(kind, metrics);

            let reached = achievement.progress >= achievement.max_progress;
            if achievement.unlocked_at.is_none() && reached {
                tracing::info!("Achievement unlocked: {} ({})", kind.title(), kind.id());
                achievement.unlocked_at = Some(now);
            }

            achievement
        })
        .collect()
}
