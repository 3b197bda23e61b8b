/// Tool for toggling a habit completion
///
/// This module implements the completion_toggle MCP tool. Every toggle runs a
/// full stats recomputation before it returns.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_day, AchievementKind, HabitId};
use crate::orchestrator::StatsOrchestrator;
use crate::storage::StatsStore;
use crate::ServerError;

/// Parameters for toggling a completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleCompletionParams {
    /// ID of the habit to toggle
    pub habit_id: String,
    /// Day to toggle (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
}

/// Response from toggling a completion
#[derive(Debug, Serialize)]
pub struct ToggleCompletionResponse {
    pub completed: bool,
    pub date: String,
    pub total_points: u32,
    pub current_streak: u32,
    pub newly_unlocked: Vec<String>,
    pub message: String,
}

/// Toggle a completion and report the recomputed stats
pub async fn toggle_completion<S: StatsStore>(
    orchestrator: &StatsOrchestrator<S>,
    params: ToggleCompletionParams,
) -> Result<ToggleCompletionResponse, ServerError> {
    let habit_id = HabitId::parse(&params.habit_id)?;
    let date = match params.date.as_deref() {
        Some(s) => parse_day(s)?,
        None => orchestrator.clock().today(),
    };

    let outcome = orchestrator.toggle_completion(&habit_id, date).await?;

    let mut message = if outcome.completed {
        format!(
            "✅ Marked {} done for {}. {} points, current streak: {} day{}",
            habit_id,
            date,
            outcome.stats.total_points,
            outcome.stats.current_streak,
            if outcome.stats.current_streak == 1 { "" } else { "s" }
        )
    } else {
        format!(
            "↩️ Unmarked {} for {}. {} points, current streak: {} day{}",
            habit_id,
            date,
            outcome.stats.total_points,
            outcome.stats.current_streak,
            if outcome.stats.current_streak == 1 { "" } else { "s" }
        )
    };

    for id in &outcome.newly_unlocked {
        if let Some(kind) = AchievementKind::from_id(id) {
            message.push_str(&format!("\n{} Achievement unlocked: {}!", kind.icon(), kind.title()));
        }
    }

    Ok(ToggleCompletionResponse {
        completed: outcome.completed,
        date: date.to_string(),
        total_points: outcome.stats.total_points,
        current_streak: outcome.stats.current_streak,
        newly_unlocked: outcome.newly_unlocked,
        message,
    })
}
