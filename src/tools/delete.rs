/// Tool for clearing a deleted habit's completions
///
/// This module implements the habit_delete MCP tool. The habit record itself
/// lives with the habit editor; this removes its completion history and
/// recomputes stats without it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::HabitId;
use crate::orchestrator::StatsOrchestrator;
use crate::storage::StatsStore;
use crate::ServerError;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit that was deleted
    pub habit_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub removed: usize,
    pub total_points: u32,
    pub longest_streak: u32,
    pub message: String,
}

pub async fn delete_habit<S: StatsStore>(
    orchestrator: &StatsOrchestrator<S>,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ServerError> {
    let habit_id = HabitId::parse(&params.habit_id)?;
    let outcome = orchestrator.delete_habit(&habit_id).await?;

    Ok(DeleteHabitResponse {
        removed: outcome.removed,
        total_points: outcome.stats.total_points,
        longest_streak: outcome.stats.longest_streak,
        message: format!(
            "🗑️ Removed {} completion record{} for {}. Points are now {}.",
            outcome.removed,
            if outcome.removed == 1 { "" } else { "s" },
            habit_id,
            outcome.stats.total_points
        ),
    })
}
