//! Weekly aggregates and the week-over-week report.
//!
//! Weeks start on Monday in the configured timezone.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::{pct, AnalyticsConfig};
use crate::patterns::{peak_index, PeakBucket};
use crate::score::{productivity_score, ProductivityScore};
use crate::task::{Task, UNCATEGORIZED};
use crate::time::{local_date, week_start, weekday_index, WEEKDAY_NAMES};

const TOP_CATEGORIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    pub created: usize,
    pub completed: usize,
    /// Share of the tasks created this week that are now done.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub created: usize,
    pub completed: usize,
    pub completion_rate: f64,
    pub overdue: usize,
    pub previous_week_completed: usize,
    /// `None` when last week had no completions to compare against.
    pub completed_change_pct: Option<f64>,
    pub busiest_day: Option<PeakBucket>,
    pub top_categories: Vec<CategoryCount>,
    pub productivity: ProductivityScore,
    pub interpretation: String,
}

fn in_week(ts: Option<DateTime<Utc>>, start: NaiveDate, config: &AnalyticsConfig) -> bool {
    ts.is_some_and(|ts| week_start(local_date(ts, config.timezone)) == start)
}

fn summarize_week(tasks: &[Task], start: NaiveDate, config: &AnalyticsConfig) -> WeekSummary {
    let created: Vec<&Task> = tasks
        .iter()
        .filter(|t| in_week(t.created_at, start, config))
        .collect();
    let created_done = created.iter().filter(|t| t.completed).count();
    let completed = tasks
        .iter()
        .filter(|t| t.completed && in_week(t.completed_at, start, config))
        .count();

    WeekSummary {
        week_start: start,
        created: created.len(),
        completed,
        completion_rate: pct(created_done, created.len()),
    }
}

/// The last `weekly_weeks` weeks, oldest first, ending with the current week.
pub fn weekly_aggregates(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> Vec<WeekSummary> {
    let this_week = week_start(local_date(now, config.timezone));
    let weeks = config.weekly_span();
    (0..weeks)
        .rev()
        .map(|back| summarize_week(tasks, this_week - Duration::weeks(back), config))
        .collect()
}

pub fn weekly_report(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> WeeklyReport {
    let start = week_start(local_date(now, config.timezone));
    let current = summarize_week(tasks, start, config);
    let previous = summarize_week(tasks, start - Duration::weeks(1), config);

    let done_this_week: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.completed && in_week(t.completed_at, start, config))
        .collect();

    let mut by_day = vec![0usize; 7];
    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for t in &done_this_week {
        if let Some(done) = t.completed_at {
            by_day[weekday_index(done, config.timezone)] += 1;
        }
        if t.categories.is_empty() {
            *by_category.entry(UNCATEGORIZED).or_insert(0) += 1;
        }
        for c in &t.categories {
            *by_category.entry(c.as_str()).or_insert(0) += 1;
        }
    }

    let busiest_day = peak_index(&by_day).map(|i| PeakBucket {
        index: i,
        label: WEEKDAY_NAMES[i].to_string(),
        count: by_day[i],
    });

    let mut top_categories: Vec<CategoryCount> = by_category
        .into_iter()
        .map(|(category, completed)| CategoryCount {
            category: category.to_string(),
            completed,
        })
        .collect();
    top_categories.sort_by(|a, b| b.completed.cmp(&a.completed).then_with(|| a.category.cmp(&b.category)));
    top_categories.truncate(TOP_CATEGORIES);

    let completed_change_pct = (previous.completed > 0).then(|| {
        (current.completed as f64 - previous.completed as f64) / previous.completed as f64 * 100.0
    });

    let overdue = tasks.iter().filter(|t| t.is_overdue(now)).count();
    let productivity = productivity_score(tasks, now, config);

    let interpretation = interpret(&current, previous.completed, completed_change_pct, busiest_day.as_ref(), overdue);

    WeeklyReport {
        week_start: start,
        week_end: start + Duration::days(6),
        created: current.created,
        completed: current.completed,
        completion_rate: current.completion_rate,
        overdue,
        previous_week_completed: previous.completed,
        completed_change_pct,
        busiest_day,
        top_categories,
        productivity,
        interpretation,
    }
}

fn interpret(
    week: &WeekSummary,
    previous: usize,
    change: Option<f64>,
    busiest: Option<&PeakBucket>,
    overdue: usize,
) -> String {
    let mut s = format!(
        "This week you created {} task(s) and completed {}.",
        week.created, week.completed
    );
    match change {
        Some(c) if c > 0.0 => s.push_str(&format!(" That is {c:.0}% more than last week ({previous}).")),
        Some(c) if c < 0.0 => s.push_str(&format!(" That is {:.0}% fewer than last week ({previous}).", c.abs())),
        Some(_) => s.push_str(" Same pace as last week."),
        None if week.completed > 0 => s.push_str(" Nothing was completed last week, so this is a fresh start."),
        None => {}
    }
    if let Some(day) = busiest {
        s.push_str(&format!(" {} was your busiest day.", day.label));
    }
    if overdue > 0 {
        s.push_str(&format!(" {overdue} task(s) are overdue going into next week."));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Wednesday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 11, 15, 0, 0).unwrap()
    }

    #[test]
    fn aggregates_cover_requested_weeks() {
        let monday = Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap();
        let last_week = monday - Duration::days(3);
        let tasks = vec![
            Task::new("a", "a", monday).completed_at(monday + Duration::hours(2)),
            Task::new("b", "b", monday),
            Task::new("c", "c", last_week).completed_at(last_week + Duration::hours(1)),
        ];
        let weeks = weekly_aggregates(&tasks, now(), &AnalyticsConfig::default());
        assert_eq!(weeks.len(), 4);
        let current = weeks.last().unwrap();
        assert_eq!(current.week_start, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!((current.created, current.completed), (2, 1));
        assert_eq!(current.completion_rate, 50.0);
        assert_eq!(weeks[2].completed, 1);
    }

    #[test]
    fn report_compares_with_previous_week() {
        let monday = Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap();
        let prev = monday - Duration::days(5);
        let tasks = vec![
            Task::new("a", "a", monday).with_category("Math").completed_at(monday + Duration::hours(1)),
            Task::new("b", "b", monday).with_category("Math").completed_at(monday + Duration::hours(2)),
            Task::new("c", "c", monday).completed_at(monday + Duration::days(1)),
            Task::new("d", "d", prev).completed_at(prev + Duration::hours(1)),
        ];
        let r = weekly_report(&tasks, now(), &AnalyticsConfig::default());
        assert_eq!(r.completed, 3);
        assert_eq!(r.previous_week_completed, 1);
        assert_eq!(r.completed_change_pct, Some(200.0));
        assert_eq!(r.busiest_day.as_ref().map(|d| d.label.as_str()), Some("Monday"));
        assert_eq!(r.top_categories[0], CategoryCount { category: "Math".into(), completed: 2 });
        assert_eq!(r.week_end, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn empty_week_has_no_change() {
        let r = weekly_report(&[], now(), &AnalyticsConfig::default());
        assert_eq!(r.completed_change_pct, None);
        assert!(r.busiest_day.is_none());
        assert!(r.top_categories.is_empty());
    }
}
