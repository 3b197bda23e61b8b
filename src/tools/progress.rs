/// Tool for monthly progress views
///
/// This module implements the progress_month MCP tool: the monthly summary,
/// weekday distribution, per-habit breakdown and calendar heatmap.

use chrono::Datelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{
    distinct_habits, habit_breakdown, month_heatmap, monthly_summary, weekday_distribution,
    DayIntensity, HabitCompletionCount, HeatmapCell, MonthlySummary, WeekdayCount,
};
use crate::orchestrator::StatsOrchestrator;
use crate::storage::StatsStore;
use crate::ServerError;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ProgressParams {
    /// Year to report on (optional, defaults to the current year)
    pub year: Option<i32>,
    /// Month to report on, 1-12 (optional, defaults to the current month)
    pub month: Option<u32>,
    /// Number of habits being tracked (optional, defaults to the habits seen in the log)
    pub habit_count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub summary: MonthlySummary,
    pub weekdays: Vec<WeekdayCount>,
    pub habits: Vec<HabitCompletionCount>,
    pub heatmap: Vec<HeatmapCell>,
    pub message: String,
}

pub async fn get_month_progress<S: StatsStore>(
    orchestrator: &StatsOrchestrator<S>,
    params: ProgressParams,
) -> Result<ProgressResponse, ServerError> {
    let today = orchestrator.clock().today();
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());

    let log = orchestrator.completions().await;
    let habit_count = params.habit_count.unwrap_or_else(|| distinct_habits(&log));

    let summary = monthly_summary(&log, habit_count, year, month)?;
    let weekdays = weekday_distribution(&log);
    let habits = habit_breakdown(&log);
    let heatmap = month_heatmap(&log, year, month, |_| habit_count as usize)?;

    let calendar = heatmap
        .iter()
        .map(|cell| match cell.intensity {
            DayIntensity::None => '⬜',
            DayIntensity::Low => '🟥',
            DayIntensity::Half => '🟨',
            DayIntensity::Full => '🟩',
        })
        .collect::<String>();

    let message = format!(
        "📅 {}-{:02}: {} of {} possible completions ({}%), {} active day{}\n{}\n{}",
        year,
        month,
        summary.completed,
        summary.total_possible,
        summary.percentage,
        summary.active_days,
        if summary.active_days == 1 { "" } else { "s" },
        calendar,
        weekdays
            .iter()
            .map(|w| format!("{}: {}", w.weekday, w.completions))
            .collect::<Vec<_>>()
            .join(" | ")
    );

    Ok(ProgressResponse {
        summary,
        weekdays,
        habits,
        heatmap,
        message,
    })
}
