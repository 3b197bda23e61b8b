/// Achievement catalog and per-achievement state
///
/// The catalog is fixed and statically defined. Each entry names the aggregate
/// metric its progress is derived from and the threshold that unlocks it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate metric an achievement tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementMetric {
    /// 1 once anything has been completed, 0 otherwise
    AnyCompletion,
    /// Live combined streak
    CurrentStreak,
    /// Live points total
    TotalPoints,
    /// Number of completed records
    CompletedCount,
}

/// Every achievement in the catalog, in definition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    FirstHabit,
    Streak7,
    Streak30,
    Points100,
    Points500,
    Complete50,
}

impl AchievementKind {
    /// Catalog order; achievement sequences are always emitted in this order
    pub const ALL: [AchievementKind; 6] = [
        AchievementKind::FirstHabit,
        AchievementKind::Streak7,
        AchievementKind::Streak30,
        AchievementKind::Points100,
        AchievementKind::Points500,
        AchievementKind::Complete50,
    ];

    /// Stable identifier persisted with the stats snapshot
    pub fn id(&self) -> &'static str {
        match self {
            Self::FirstHabit => "first_habit",
            Self::Streak7 => "streak_7",
            Self::Streak30 => "streak_30",
            Self::Points100 => "points_100",
            Self::Points500 => "points_500",
            Self::Complete50 => "complete_50",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::FirstHabit => "Getting Started",
            Self::Streak7 => "7 Day Warrior",
            Self::Streak30 => "Monthly Master",
            Self::Points100 => "Century Club",
            Self::Points500 => "High Achiever",
            Self::Complete50 => "Consistency King",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstHabit => "Complete your first habit",
            Self::Streak7 => "Maintain a 7-day streak",
            Self::Streak30 => "Maintain a 30-day streak",
            Self::Points100 => "Earn 100 points",
            Self::Points500 => "Earn 500 points",
            Self::Complete50 => "Complete habits 50 times",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::FirstHabit => "🎯",
            Self::Streak7 => "🔥",
            Self::Streak30 => "⭐",
            Self::Points100 => "💯",
            Self::Points500 => "👑",
            Self::Complete50 => "🏆",
        }
    }

    /// Threshold at which the achievement unlocks
    pub fn max_progress(&self) -> u32 {
        match self {
            Self::FirstHabit => 1,
            Self::Streak7 => 7,
            Self::Streak30 => 30,
            Self::Points100 => 100,
            Self::Points500 => 500,
            Self::Complete50 => 50,
        }
    }

    pub fn metric(&self) -> AchievementMetric {
        match self {
            Self::FirstHabit => AchievementMetric::AnyCompletion,
            Self::Streak7 | Self::Streak30 => AchievementMetric::CurrentStreak,
            Self::Points100 | Self::Points500 => AchievementMetric::TotalPoints,
            Self::Complete50 => AchievementMetric::CompletedCount,
        }
    }
}

/// Progress and unlock state of one catalog achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    /// Freshly derived on every recomputation, may go down
    pub progress: u32,
    pub max_progress: u32,
    /// Write-once: never cleared after it is first set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// A catalog entry at zero progress
    pub fn locked(kind: AchievementKind) -> Self {
        Self {
            id: kind.id().to_string(),
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            icon: kind.icon().to_string(),
            progress: 0,
            max_progress: kind.max_progress(),
            unlocked_at: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

/// The whole catalog at zero progress
pub fn default_achievements() -> Vec<Achievement> {
    AchievementKind::ALL.into_iter().map(Achievement::locked).collect()
}
