//! Productivity analytics over a task snapshot.
//!
//! Everything in here is a pure function of `(tasks, now, config)`: no I/O, no
//! clocks read except in [`compute_analytics_now`]. Each metric group can be
//! computed on its own through its module's function; [`compute_analytics`]
//! just runs them all and reuses the shared pieces for the productivity score.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::completion::{completion_metrics, CompletionMetrics};
use crate::focus::{focus_analysis, FocusAnalysis};
use crate::patterns::{time_patterns, TimePatterns};
use crate::priority::{priority_analysis, PriorityAnalysis};
use crate::procrastination::{procrastination_analysis, ProcrastinationAnalysis};
use crate::score::{combine_score, ProductivityScore};
use crate::streaks::{streak_summary, StreakSummary};
use crate::task::Task;
use crate::weekly::{weekly_aggregates, WeekSummary};

/// Thresholds and bucketing options for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Timezone used for hour-of-day, weekday and calendar-day buckets.
    pub timezone: Tz,
    /// Window for `tasks_created` / `tasks_completed`. `None` means all time.
    pub period_days: Option<i64>,
    pub reopen_threshold: u32,
    pub stale_after_days: i64,
    pub never_started_grace_days: i64,
    pub frequent_postponement_threshold: u32,
    pub severe_overdue_days: i64,
    pub heatmap_days: u32,
    pub weekly_weeks: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            period_days: None,
            reopen_threshold: 2,
            stale_after_days: 7,
            never_started_grace_days: 3,
            frequent_postponement_threshold: 3,
            severe_overdue_days: 7,
            heatmap_days: 30,
            weekly_weeks: 4,
        }
    }
}

/// Longest span any day-based setting may cover (about a century).
pub const MAX_WINDOW_DAYS: i64 = 36_600;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

impl AnalyticsConfig {
    /// Reject windows and thresholds the date arithmetic cannot represent.
    /// The engine clamps regardless; this is for reporting bad config files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(days) = self.period_days {
            check_range("period_days", days, 0, MAX_WINDOW_DAYS)?;
        }
        check_range("stale_after_days", self.stale_after_days, 0, MAX_WINDOW_DAYS)?;
        check_range("never_started_grace_days", self.never_started_grace_days, 0, MAX_WINDOW_DAYS)?;
        check_range("severe_overdue_days", self.severe_overdue_days, 0, MAX_WINDOW_DAYS)?;
        check_range("heatmap_days", self.heatmap_days.into(), 1, MAX_WINDOW_DAYS)?;
        check_range("weekly_weeks", self.weekly_weeks.into(), 1, MAX_WINDOW_DAYS / 7)?;
        Ok(())
    }

    pub(crate) fn period_window(&self) -> Option<Duration> {
        self.period_days
            .map(|days| Duration::days(days.clamp(0, MAX_WINDOW_DAYS)))
    }

    pub(crate) fn stale_after(&self) -> Duration {
        Duration::days(self.stale_after_days.clamp(0, MAX_WINDOW_DAYS))
    }

    pub(crate) fn heatmap_span(&self) -> i64 {
        i64::from(self.heatmap_days).clamp(1, MAX_WINDOW_DAYS)
    }

    pub(crate) fn weekly_span(&self) -> i64 {
        i64::from(self.weekly_weeks).clamp(1, MAX_WINDOW_DAYS / 7)
    }
}

/// Full analytics output: one section per metric group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub timezone: String,
    pub total_tasks: usize,
    pub completion: CompletionMetrics,
    pub time_patterns: TimePatterns,
    pub priority: PriorityAnalysis,
    pub focus: FocusAnalysis,
    pub procrastination: ProcrastinationAnalysis,
    pub streaks: StreakSummary,
    pub weekly: Vec<WeekSummary>,
    pub productivity: ProductivityScore,
}

#[instrument(skip_all, fields(tasks = tasks.len()))]
pub fn compute_analytics(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> AnalyticsReport {
    let untimed = tasks.iter().filter(|t| t.created_at.is_none()).count();
    if untimed > 0 {
        debug!(untimed, "tasks without a creation timestamp are left out of time-based metrics");
    }

    let completion = completion_metrics(tasks, now, config);
    let focus = focus_analysis(tasks, now, config);
    let productivity = combine_score(tasks, &completion, &focus);

    AnalyticsReport {
        generated_at: now,
        timezone: config.timezone.name().to_string(),
        total_tasks: tasks.len(),
        time_patterns: time_patterns(tasks, config),
        priority: priority_analysis(tasks, now),
        procrastination: procrastination_analysis(tasks, now, config),
        streaks: streak_summary(tasks, now, config),
        weekly: weekly_aggregates(tasks, now, config),
        completion,
        focus,
        productivity,
    }
}

/// [`compute_analytics`] against the wall clock.
pub fn compute_analytics_now(tasks: &[Task], config: &AnalyticsConfig) -> AnalyticsReport {
    compute_analytics(tasks, Utc::now(), config)
}

/// `part / whole * 100`, or 0 when there is nothing to divide by.
pub(crate) fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Arithmetic mean, 0 for an empty iterator.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
