//! Completion metrics: totals, rates, overdue counts and a daily created/completed series.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::{mean, pct, AnalyticsConfig};
use crate::task::Task;
use crate::time::local_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub created: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Created within the configured period (all tasks when no period is set).
    pub tasks_created: usize,
    /// Completed within the configured period (all completed tasks when no period is set).
    pub tasks_completed: usize,
    pub completion_rate: f64,
    pub total_overdue: usize,
    pub overdue_percentage: f64,
    pub avg_completion_time_hours: f64,
    pub daily: Vec<DailyCount>,
    pub interpretation: String,
}

pub fn completion_metrics(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> CompletionMetrics {
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|t| t.completed).count();
    let total_overdue = tasks.iter().filter(|t| t.is_overdue(now)).count();

    let (tasks_created, tasks_completed) = match config.period_window() {
        None => (total_tasks, completed_tasks),
        Some(window) => {
            let start = now - window;
            let in_window = |ts: Option<DateTime<Utc>>| ts.is_some_and(|ts| ts >= start && ts <= now);
            (
                tasks.iter().filter(|t| in_window(t.created_at)).count(),
                tasks
                    .iter()
                    .filter(|t| t.completed && in_window(t.completed_at))
                    .count(),
            )
        }
    };

    let completion_rate = pct(completed_tasks, total_tasks);
    let overdue_percentage = pct(total_overdue, total_tasks);
    let avg_completion_time_hours = mean(tasks.iter().filter_map(Task::completion_hours));

    CompletionMetrics {
        total_tasks,
        completed_tasks,
        tasks_created,
        tasks_completed,
        completion_rate,
        total_overdue,
        overdue_percentage,
        avg_completion_time_hours,
        daily: daily_series(tasks, now, config),
        interpretation: interpret(total_tasks, completion_rate, total_overdue, avg_completion_time_hours),
    }
}

/// Created vs completed per local calendar day, oldest first, ending today.
pub fn daily_series(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> Vec<DailyCount> {
    let tz = config.timezone;
    let today = local_date(now, tz);
    let days = config.heatmap_span();
    let first = today - Duration::days(days - 1);

    let mut buckets: BTreeMap<NaiveDate, DailyCount> = (0..days)
        .map(|i| {
            let date = first + Duration::days(i);
            (date, DailyCount { date, created: 0, completed: 0 })
        })
        .collect();

    for t in tasks {
        if let Some(created) = t.created_at {
            if let Some(b) = buckets.get_mut(&local_date(created, tz)) {
                b.created += 1;
            }
        }
        if let (true, Some(done)) = (t.completed, t.completed_at) {
            if let Some(b) = buckets.get_mut(&local_date(done, tz)) {
                b.completed += 1;
            }
        }
    }

    buckets.into_values().collect()
}

fn interpret(total: usize, rate: f64, overdue: usize, avg_hours: f64) -> String {
    if total == 0 {
        return "No tasks yet. Add a few tasks to start tracking your progress.".to_string();
    }

    let mut s = match rate {
        r if r >= 80.0 => format!("Excellent follow-through: {rate:.0}% of your tasks are done."),
        r if r >= 60.0 => format!("Solid progress: {rate:.0}% of your tasks are done."),
        r if r >= 40.0 => format!("About {rate:.0}% of your tasks are done; there is room to close more loops."),
        _ => format!("Only {rate:.0}% of your tasks are done. Try breaking big tasks into smaller steps."),
    };

    if overdue > 0 {
        let noun = if overdue == 1 { "task is" } else { "tasks are" };
        s.push_str(&format!(" {overdue} {noun} past due."));
    }
    if avg_hours > 0.0 {
        s.push_str(&format!(" Tasks take {avg_hours:.1} hours on average from creation to completion."));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 18, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_defaults_to_zero() {
        let m = completion_metrics(&[], now(), &AnalyticsConfig::default());
        assert_eq!(m.completion_rate, 0.0);
        assert_eq!(m.overdue_percentage, 0.0);
        assert_eq!(m.avg_completion_time_hours, 0.0);
        assert_eq!(m.daily.len(), 30);
        assert!(m.interpretation.starts_with("No tasks yet"));
    }

    #[test]
    fn period_window_limits_created_and_completed() {
        let old = Task::new("a", "old", now() - Duration::days(40))
            .completed_at(now() - Duration::days(35));
        let recent = Task::new("b", "recent", now() - Duration::days(2))
            .completed_at(now() - Duration::days(1));
        let untimed = Task {
            created_at: None,
            ..Task::new("c", "untimed", now())
        };
        let tasks = vec![old, recent, untimed];

        let cfg = AnalyticsConfig {
            period_days: Some(7),
            ..AnalyticsConfig::default()
        };
        let m = completion_metrics(&tasks, now(), &cfg);
        assert_eq!(m.total_tasks, 3);
        assert_eq!(m.completed_tasks, 2);
        assert_eq!(m.tasks_created, 1);
        assert_eq!(m.tasks_completed, 1);

        let all = completion_metrics(&tasks, now(), &AnalyticsConfig::default());
        assert_eq!(all.tasks_created, 3);
        assert_eq!(all.tasks_completed, 2);
    }

    #[test]
    fn daily_series_counts_today() {
        let t = Task::new("a", "x", now() - Duration::hours(3)).completed_at(now() - Duration::hours(1));
        let cfg = AnalyticsConfig {
            heatmap_days: 7,
            ..AnalyticsConfig::default()
        };
        let series = daily_series(&[t], now(), &cfg);
        assert_eq!(series.len(), 7);
        let last = series.last().unwrap();
        assert_eq!(last.date, local_date(now(), cfg.timezone));
        assert_eq!((last.created, last.completed), (1, 1));
    }
}
