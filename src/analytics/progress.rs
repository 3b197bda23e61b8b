/// Progress views: monthly summary, weekday distribution, per-habit breakdown
/// and the calendar heatmap
///
/// All of these count completed records only. Like the streak calculator they
/// are pure functions over the completion log.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::domain::{CompletionLog, DomainError, HabitId};

/// Completion figures for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    /// Completed records dated inside the month
    pub completed: u32,
    /// `habit_count × days in month`
    pub total_possible: u32,
    /// `completed / total_possible` as a rounded percentage
    pub percentage: u32,
    /// Distinct days with at least one completion
    pub active_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub completions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitCompletionCount {
    pub habit_id: HabitId,
    pub completions: u32,
}

/// How full a calendar day is relative to what was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayIntensity {
    None,
    Low,
    Half,
    Full,
}

impl DayIntensity {
    pub fn classify(completed: usize, scheduled: usize) -> Self {
        if scheduled == 0 || completed == 0 {
            DayIntensity::None
        } else if completed >= scheduled {
            DayIntensity::Full
        } else if completed * 2 >= scheduled {
            DayIntensity::Half
        } else {
            DayIntensity::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub completed: u32,
    pub intensity: DayIntensity,
}

/// Every day of a calendar month, in order
pub fn days_of_month(year: i32, month: u32) -> Result<Vec<NaiveDate>, DomainError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| DomainError::InvalidValue {
        message: format!("No such month: {}-{:02}", year, month),
    })?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}

/// Summarize completions for one month
pub fn monthly_summary(
    log: &CompletionLog,
    habit_count: u32,
    year: i32,
    month: u32,
) -> Result<MonthlySummary, DomainError> {
    let days_in_month = days_of_month(year, month)?.len() as u32;

    let in_month = log
        .completed_records()
        .filter(|r| r.date.year() == year && r.date.month() == month);

    let mut completed = 0u32;
    let mut active: BTreeSet<NaiveDate> = BTreeSet::new();
    for record in in_month {
        completed += 1;
        active.insert(record.date);
    }

    let total_possible = habit_count.saturating_mul(days_in_month);
    let percentage = if total_possible > 0 {
        (f64::from(completed) / f64::from(total_possible) * 100.0).round() as u32
    } else {
        0
    };

    Ok(MonthlySummary {
        year,
        month,
        completed,
        total_possible,
        percentage,
        active_days: active.len() as u32,
    })
}

/// Completions per weekday, Monday first
pub fn weekday_distribution(log: &CompletionLog) -> Vec<WeekdayCount> {
    let mut counts = [0u32; 7];
    for record in log.completed_records() {
        counts[record.date.weekday().num_days_from_monday() as usize] += 1;
    }

    let mut weekday = Weekday::Mon;
    counts
        .iter()
        .map(|&completions| {
            let entry = WeekdayCount {
                weekday: weekday.to_string(),
                completions,
            };
            weekday = weekday.succ();
            entry
        })
        .collect()
}

/// Completions per habit, ordered by habit id
pub fn habit_breakdown(log: &CompletionLog) -> Vec<HabitCompletionCount> {
    let mut counts: BTreeMap<&HabitId, u32> = BTreeMap::new();
    for record in log.completed_records() {
        *counts.entry(&record.habit_id).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(habit_id, completions)| HabitCompletionCount {
            habit_id: habit_id.clone(),
            completions,
        })
        .collect()
}

/// Number of distinct habits that appear in the log
pub fn distinct_habits(log: &CompletionLog) -> u32 {
    let ids: BTreeSet<&HabitId> = log.records().iter().map(|r| &r.habit_id).collect();
    ids.len() as u32
}

/// One heatmap cell per day of the month
///
/// `scheduled` reports how many habits were due on a given day; the caller
/// owns habit schedules.
pub fn month_heatmap(
    log: &CompletionLog,
    year: i32,
    month: u32,
    scheduled: impl Fn(NaiveDate) -> usize,
) -> Result<Vec<HeatmapCell>, DomainError> {
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for record in log.completed_records() {
        *per_day.entry(record.date).or_insert(0) += 1;
    }

    Ok(days_of_month(year, month)?
        .into_iter()
        .map(|date| {
            let completed = per_day.get(&date).copied().unwrap_or(0);
            HeatmapCell {
                date,
                completed,
                intensity: DayIntensity::classify(completed as usize, scheduled(date)),
            }
        })
        .collect())
}
