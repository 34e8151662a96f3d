//! Category breakdown and focus: how often consecutive completions jump between categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::{mean, pct, AnalyticsConfig};
use crate::task::{Task, UNCATEGORIZED};
use crate::time::days_between;

/// Focus component used when there are fewer than two completions to compare.
pub const NEUTRAL_FOCUS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReopenedTask {
    pub id: String,
    pub title: String,
    pub reopen_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleTask {
    pub id: String,
    pub title: String,
    pub age_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusAnalysis {
    /// Most tasks first, then by name.
    pub categories: Vec<CategoryStats>,
    pub context_switches: usize,
    pub context_switch_rate: f64,
    pub avg_focus_streak: f64,
    pub max_focus_streak: usize,
    /// 100 minus the switch rate, or neutral when there is too little to compare.
    pub focus_score: f64,
    pub frequently_reopened: Vec<ReopenedTask>,
    pub stale_tasks: Vec<StaleTask>,
    pub interpretation: String,
}

/// Context switching over an ordered sequence of completion categories.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStats {
    pub switches: usize,
    /// Percentage of transitions that changed category.
    pub rate: f64,
    /// Lengths of same-category runs, in order.
    pub runs: Vec<usize>,
}

pub fn switch_stats<'a>(sequence: impl IntoIterator<Item = &'a str>) -> SwitchStats {
    let mut switches = 0;
    let mut runs: Vec<usize> = Vec::new();
    let mut prev: Option<&str> = None;

    for cat in sequence {
        match prev {
            Some(p) if p == cat => {
                if let Some(last) = runs.last_mut() {
                    *last += 1;
                }
            }
            Some(_) => {
                switches += 1;
                runs.push(1);
            }
            None => runs.push(1),
        }
        prev = Some(cat);
    }

    let completions: usize = runs.iter().sum();
    SwitchStats {
        switches,
        rate: pct(switches, completions.saturating_sub(1)),
        runs,
    }
}

/// Completed tasks with a known completion time, oldest first (ties by id).
pub(crate) fn timed_completions(tasks: &[Task]) -> Vec<&Task> {
    let mut done: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.completed && t.completed_at.is_some())
        .collect();
    done.sort_by(|a, b| a.completed_at.cmp(&b.completed_at).then_with(|| a.id.cmp(&b.id)));
    done
}

/// Focus component of the productivity score.
pub fn focus_component(tasks: &[Task]) -> f64 {
    let done = timed_completions(tasks);
    if done.len() < 2 {
        return NEUTRAL_FOCUS;
    }
    let stats = switch_stats(done.iter().map(|t| t.primary_category()));
    (100.0 - stats.rate).clamp(0.0, 100.0)
}

pub fn focus_analysis(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> FocusAnalysis {
    let categories = category_breakdown(tasks);

    let done = timed_completions(tasks);
    let stats = switch_stats(done.iter().map(|t| t.primary_category()));
    let avg_focus_streak = mean(stats.runs.iter().map(|&r| r as f64));
    let max_focus_streak = stats.runs.iter().copied().max().unwrap_or(0);
    let focus_score = focus_component(tasks);

    let mut frequently_reopened: Vec<ReopenedTask> = tasks
        .iter()
        .filter(|t| t.reopen_count >= config.reopen_threshold && t.reopen_count > 0)
        .map(|t| ReopenedTask {
            id: t.id.clone(),
            title: t.title.clone(),
            reopen_count: t.reopen_count,
        })
        .collect();
    frequently_reopened.sort_by(|a, b| b.reopen_count.cmp(&a.reopen_count).then_with(|| a.id.cmp(&b.id)));

    let mut stale_tasks: Vec<StaleTask> = tasks
        .iter()
        .filter(|t| !t.completed)
        .filter_map(|t| {
            let created = t.created_at?;
            (now - created > config.stale_after()).then(|| StaleTask {
                id: t.id.clone(),
                title: t.title.clone(),
                age_days: days_between(created, now),
            })
        })
        .collect();
    stale_tasks.sort_by(|a, b| b.age_days.cmp(&a.age_days).then_with(|| a.id.cmp(&b.id)));

    let interpretation = interpret(
        done.len(),
        stats.rate,
        max_focus_streak,
        frequently_reopened.len(),
        stale_tasks.len(),
    );

    FocusAnalysis {
        categories,
        context_switches: stats.switches,
        context_switch_rate: stats.rate,
        avg_focus_streak,
        max_focus_streak,
        focus_score,
        frequently_reopened,
        stale_tasks,
        interpretation,
    }
}

/// Per-category totals. A task counts once toward each of its categories;
/// tasks without any count under [`UNCATEGORIZED`].
pub fn category_breakdown(tasks: &[Task]) -> Vec<CategoryStats> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for t in tasks {
        let labels: Vec<&str> = if t.categories.is_empty() {
            vec![UNCATEGORIZED]
        } else {
            t.categories.iter().map(|c| c.as_str()).collect()
        };
        for label in labels {
            let entry = counts.entry(label).or_default();
            entry.0 += 1;
            if t.completed {
                entry.1 += 1;
            }
        }
    }

    let mut out: Vec<CategoryStats> = counts
        .into_iter()
        .map(|(category, (total, completed))| CategoryStats {
            category: category.to_string(),
            total,
            completed,
            completion_rate: pct(completed, total),
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    out
}

fn interpret(completions: usize, rate: f64, max_streak: usize, reopened: usize, stale: usize) -> String {
    let mut s = if completions < 2 {
        "Complete a few more tasks to measure how focused your work sessions are.".to_string()
    } else if rate <= 25.0 {
        format!("Great focus: only {rate:.0}% of consecutive completions switch category (longest run: {max_streak}).")
    } else if rate <= 60.0 {
        format!("Moderate context switching: {rate:.0}% of consecutive completions change category. Batching similar tasks could help.")
    } else {
        format!("Heavy context switching: {rate:.0}% of consecutive completions change category. Try grouping tasks by subject.")
    };

    if reopened > 0 {
        s.push_str(&format!(" {reopened} task(s) keep getting reopened; consider clearer completion criteria."));
    }
    if stale > 0 {
        s.push_str(&format!(" {stale} open task(s) have been sitting for over a week."));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn switch_stats_counts_transitions() {
        let s = switch_stats(["A", "A", "B", "A"]);
        assert_eq!(s.switches, 2);
        assert!((s.rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.runs, vec![2, 1, 1]);

        let single = switch_stats(["A"]);
        assert_eq!(single.rate, 0.0);
        let empty = switch_stats(Vec::<&str>::new());
        assert_eq!(empty.rate, 0.0);
        assert!(empty.runs.is_empty());
    }

    #[test]
    fn uncategorized_tasks_are_counted() {
        let tasks = vec![
            Task::new("a", "a", now()).with_category("Math").with_category("Exam"),
            Task::new("b", "b", now()),
            Task::new("c", "c", now()).with_category("Math").completed_at(now()),
        ];
        let cats = category_breakdown(&tasks);
        assert_eq!(cats[0].category, "Math");
        assert_eq!((cats[0].total, cats[0].completed), (2, 1));
        assert!(cats.iter().any(|c| c.category == UNCATEGORIZED && c.total == 1));
    }

    #[test]
    fn reopened_and_stale_lists() {
        let mut flaky = Task::new("flaky", "Lab report", now() - Duration::days(2));
        flaky.reopen_count = 3;
        let old = Task::new("old", "Old chore", now() - Duration::days(10));
        let week = Task::new("week", "Exactly a week", now() - Duration::days(7));
        let week_and_half_day = Task::new("later", "Week and a half day", now() - Duration::days(7) - Duration::hours(12));

        let f = focus_analysis(&[flaky, old, week, week_and_half_day], now(), &AnalyticsConfig::default());
        assert_eq!(f.frequently_reopened.len(), 1);
        assert_eq!(f.frequently_reopened[0].id, "flaky");
        let stale: Vec<&str> = f.stale_tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(stale, ["old", "later"]);
        assert_eq!(f.stale_tasks[1].age_days, 7);
        assert_eq!(f.focus_score, NEUTRAL_FOCUS);
    }

    #[test]
    fn completions_are_ordered_by_time_not_input() {
        let t = |id: &str, cat: &str, h: i64| {
            Task::new(id, id, now() - Duration::days(1))
                .with_category(cat)
                .completed_at(now() - Duration::days(1) + Duration::hours(h))
        };
        // chronological order: A(1) A(2) B(3) A(4)
        let tasks = vec![t("d", "A", 4), t("b", "A", 2), t("c", "B", 3), t("a", "A", 1)];
        let f = focus_analysis(&tasks, now(), &AnalyticsConfig::default());
        assert_eq!(f.context_switches, 2);
        assert_eq!(f.max_focus_streak, 2);
        assert!((f.focus_score - (100.0 - 200.0 / 3.0)).abs() < 1e-9);
    }
}
