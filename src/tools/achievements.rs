/// Tool for listing achievements
///
/// This module implements the achievements_list MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::Achievement;
use crate::orchestrator::StatsOrchestrator;
use crate::storage::StatsStore;
use crate::ServerError;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListAchievementsParams {
    /// Only list unlocked achievements (optional, defaults to false)
    #[serde(default)]
    pub unlocked_only: bool,
}

#[derive(Debug, Serialize)]
pub struct ListAchievementsResponse {
    pub achievements: Vec<Achievement>,
    pub message: String,
}

pub async fn list_achievements<S: StatsStore>(
    orchestrator: &StatsOrchestrator<S>,
    params: ListAchievementsParams,
) -> Result<ListAchievementsResponse, ServerError> {
    let stats = orchestrator.stats().await;

    let achievements: Vec<Achievement> = stats
        .achievements
        .into_iter()
        .filter(|a| !params.unlocked_only || a.is_unlocked())
        .collect();

    let message = if achievements.is_empty() {
        "No achievements unlocked yet. Complete a habit to earn your first one!".to_string()
    } else {
        achievements
            .iter()
            .map(|a| match a.unlocked_at {
                Some(at) => format!(
                    "{} **{}** - {} (unlocked {})",
                    a.icon,
                    a.title,
                    a.description,
                    at.format("%Y-%m-%d")
                ),
                None => format!(
                    "🔒 **{}** - {} ({}/{})",
                    a.title, a.description, a.progress, a.max_progress
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(ListAchievementsResponse {
        achievements,
        message,
    })
}
