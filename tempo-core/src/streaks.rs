//! Completion streaks and the activity heatmap.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::AnalyticsConfig;
use crate::task::Task;
use crate::time::local_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub completions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    /// Consecutive days with at least one completion, ending today.
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Days in the heatmap window with at least one completion.
    pub active_days: usize,
    /// Oldest first, ending today.
    pub heatmap: Vec<HeatmapDay>,
    pub interpretation: String,
}

fn completions_per_day(tasks: &[Task], config: &AnalyticsConfig) -> BTreeMap<NaiveDate, usize> {
    let mut per_day = BTreeMap::new();
    for t in tasks.iter().filter(|t| t.completed) {
        if let Some(done) = t.completed_at {
            *per_day.entry(local_date(done, config.timezone)).or_insert(0) += 1;
        }
    }
    per_day
}

pub fn streak_summary(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> StreakSummary {
    let per_day = completions_per_day(tasks, config);
    let today = local_date(now, config.timezone);

    let mut current_streak = 0u32;
    let mut day = today;
    while per_day.contains_key(&day) {
        current_streak += 1;
        day = day - Duration::days(1);
    }

    let mut longest_streak = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &date in per_day.keys() {
        run = match prev {
            Some(p) if date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        prev = Some(date);
    }

    let days = config.heatmap_span();
    let heatmap: Vec<HeatmapDay> = (0..days)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            HeatmapDay {
                date,
                completions: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect();
    let active_days = heatmap.iter().filter(|d| d.completions > 0).count();

    let interpretation = if per_day.is_empty() {
        "No completions yet. Finish one task today to start a streak.".to_string()
    } else if current_streak > 0 {
        format!(
            "You are on a {current_streak}-day streak (best: {longest_streak}). Active on {active_days} of the last {days} days."
        )
    } else {
        format!(
            "No completion yet today, so the streak is at zero (best: {longest_streak}). Active on {active_days} of the last {days} days."
        )
    };

    StreakSummary {
        current_streak,
        longest_streak,
        active_days,
        heatmap,
        interpretation,
    }
}
