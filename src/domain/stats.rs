/// The derived user statistics snapshot
///
/// `UserStats` is never patched incrementally: the orchestrator rebuilds it from
/// the full completion log and persists it wholesale.

use serde::{Deserialize, Serialize};

use crate::domain::{default_achievements, Achievement, AchievementKind};

/// Points, streaks and achievement state derived from the completion log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Always 10 points per completed record
    pub total_points: u32,
    /// Combined streak across all habits, 0 once it has lapsed
    pub current_streak: u32,
    /// Historical best; never decreases across recomputations
    pub longest_streak: u32,
    /// One entry per catalog achievement, in catalog order
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_points: 0,
            current_streak: 0,
            longest_streak: 0,
            achievements: default_achievements(),
        }
    }
}

impl UserStats {
    /// Look up the state of a catalog achievement
    pub fn achievement(&self, kind: AchievementKind) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == kind.id())
    }

    /// Achievements whose unlock latch is set
    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.is_unlocked())
    }

    /// Achievements unlocked in `self` that were still locked in `previous`
    pub fn newly_unlocked(&self, previous: &UserStats) -> Vec<&Achievement> {
        self.unlocked()
            .filter(|a| {
                !previous
                    .achievements
                    .iter()
                    .any(|p| p.id == a.id && p.is_unlocked())
            })
            .collect()
    }

    /// Get a motivational message based on the current combined streak
    pub fn motivational_message(&self) -> String {
        let days = self.current_streak;
        match days {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!(
                "Nice work! {} days in a row. You're building a strong routine.",
                days
            ),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", days),
            14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", days),
            _ => format!("Incredible! {} days of consistency. You're a habit master!", days),
        }
    }
}
