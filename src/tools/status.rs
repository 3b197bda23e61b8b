/// Tools for checking completion status and overall stats
///
/// This module implements the completion_status and stats_get MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_day, HabitId};
use crate::orchestrator::StatsOrchestrator;
use crate::storage::StatsStore;
use crate::ServerError;

/// Parameters for checking one habit on one day
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompletionStatusParams {
    /// ID of the habit to check
    pub habit_id: String,
    /// Day to check (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompletionStatusResponse {
    pub habit_id: String,
    pub date: String,
    pub completed: bool,
    pub message: String,
}

/// Check whether a habit is marked completed on a day
pub async fn get_completion_status<S: StatsStore>(
    orchestrator: &StatsOrchestrator<S>,
    params: CompletionStatusParams,
) -> Result<CompletionStatusResponse, ServerError> {
    let habit_id = HabitId::parse(&params.habit_id)?;
    let date = match params.date.as_deref() {
        Some(s) => parse_day(s)?,
        None => orchestrator.clock().today(),
    };

    let completed = orchestrator.is_completed(&habit_id, date).await;

    Ok(CompletionStatusResponse {
        habit_id: habit_id.to_string(),
        date: date.to_string(),
        completed,
        message: if completed {
            format!("✅ {} is done for {}", habit_id, date)
        } else {
            format!("⬜ {} is not done for {}", habit_id, date)
        },
    })
}

/// Parameters for reading the stats snapshot
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatsParams {
    /// Recompute from the completion log before reporting (optional, defaults to false)
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_points: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub unlocked_achievements: usize,
    pub total_achievements: usize,
    pub message: String,
}

/// Report points, streaks and achievement counts
///
/// The persisted snapshot is only as fresh as the last mutation; `refresh`
/// recomputes it first so a lapsed streak shows as 0.
pub async fn get_stats<S: StatsStore>(
    orchestrator: &StatsOrchestrator<S>,
    params: StatsParams,
) -> Result<StatsResponse, ServerError> {
    let stats = if params.refresh {
        orchestrator.recompute().await?
    } else {
        orchestrator.stats().await
    };

    let unlocked_achievements = stats.unlocked().count();
    let total_achievements = stats.achievements.len();

    let message = format!(
        "📊 Points: {} | 🔥 Streak: {} days | 🏅 Best: {} days | 🏆 Achievements: {}/{}\n{}",
        stats.total_points,
        stats.current_streak,
        stats.longest_streak,
        unlocked_achievements,
        total_achievements,
        stats.motivational_message()
    );

    Ok(StatsResponse {
        total_points: stats.total_points,
        current_streak: stats.current_streak,
        longest_streak: stats.longest_streak,
        unlocked_achievements,
        total_achievements,
        message,
    })
}
