//! Priority analysis: does declared priority line up with what actually gets done?

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::{mean, pct};
use crate::task::{Priority, Task};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityStats {
    pub priority: Priority,
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
    /// Tasks with a due date whose on-time status is known.
    pub dated: usize,
    pub missed_deadlines: usize,
    pub missed_deadline_rate: f64,
    pub avg_completion_hours: f64,
    pub avg_first_action_hours: f64,
}

impl PriorityStats {
    /// 0-100: mean of completion rate and deadline hit rate.
    pub fn reliability(&self) -> f64 {
        (self.completion_rate + (100.0 - self.missed_deadline_rate)) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityAnalysis {
    /// Ordered high, medium, low, then unknown labels alphabetically.
    pub buckets: Vec<PriorityStats>,
    pub effectiveness_score: f64,
    pub interpretation: String,
}

#[derive(Default)]
struct Acc {
    total: usize,
    completed: usize,
    dated: usize,
    missed: usize,
    completion_hours: Vec<f64>,
    first_action_hours: Vec<f64>,
}

/// Missed = completed after its due date, or still open past it.
/// `None` when the task has no due date or its completion time is unknown.
fn missed_deadline(t: &Task, now: DateTime<Utc>) -> Option<bool> {
    let due = t.due_date?;
    if t.completed {
        t.completed_at.map(|done| done > due)
    } else {
        Some(due < now)
    }
}

fn first_action_hours(t: &Task) -> Option<f64> {
    let created = t.created_at?;
    let action = t.first_action_at.or(if t.completed { t.completed_at } else { None })?;
    if action < created {
        return None;
    }
    Some((action - created).num_seconds() as f64 / 3600.0)
}

pub fn priority_analysis(tasks: &[Task], now: DateTime<Utc>) -> PriorityAnalysis {
    let mut accs: BTreeMap<Priority, Acc> = BTreeMap::new();

    for t in tasks {
        let acc = accs.entry(t.priority.clone()).or_default();
        acc.total += 1;
        if t.completed {
            acc.completed += 1;
        }
        if let Some(missed) = missed_deadline(t, now) {
            acc.dated += 1;
            if missed {
                acc.missed += 1;
            }
        }
        if let Some(h) = t.completion_hours() {
            acc.completion_hours.push(h);
        }
        if let Some(h) = first_action_hours(t) {
            acc.first_action_hours.push(h);
        }
    }

    let buckets: Vec<PriorityStats> = accs
        .into_iter()
        .map(|(priority, acc)| PriorityStats {
            priority,
            total: acc.total,
            completed: acc.completed,
            completion_rate: pct(acc.completed, acc.total),
            dated: acc.dated,
            missed_deadlines: acc.missed,
            missed_deadline_rate: pct(acc.missed, acc.dated),
            avg_completion_hours: mean(acc.completion_hours),
            avg_first_action_hours: mean(acc.first_action_hours),
        })
        .collect();

    let effectiveness_score = effectiveness_score(&buckets);
    let interpretation = interpret(&buckets, effectiveness_score);

    PriorityAnalysis {
        buckets,
        effectiveness_score,
        interpretation,
    }
}

/// Priority-weighted mean of bucket reliability. Raising a bucket's completion
/// rate or lowering its missed-deadline rate can only raise the score.
pub fn effectiveness_score(buckets: &[PriorityStats]) -> f64 {
    let (weighted, weights) = buckets
        .iter()
        .filter(|b| b.total > 0)
        .fold((0.0, 0.0), |(s, w), b| {
            let weight = b.priority.weight();
            (s + weight * b.reliability(), w + weight)
        });
    if weights == 0.0 {
        return 0.0;
    }
    (weighted / weights).clamp(0.0, 100.0)
}

fn interpret(buckets: &[PriorityStats], score: f64) -> String {
    if buckets.is_empty() {
        return "No tasks to analyse by priority yet.".to_string();
    }

    let rate_of = |p: Priority| {
        buckets
            .iter()
            .find(|b| b.priority == p)
            .map(|b| b.completion_rate)
    };

    let mut s = format!("Priority effectiveness is {score:.0}/100.");
    match (rate_of(Priority::High), rate_of(Priority::Low)) {
        (Some(high), Some(low)) if high + 0.5 < low => s.push_str(&format!(
            " Low-priority tasks get finished more often ({low:.0}%) than high-priority ones ({high:.0}%); make sure the important work comes first."
        )),
        (Some(high), Some(low)) => s.push_str(&format!(
            " High-priority tasks are completed at {high:.0}% versus {low:.0}% for low priority, so your effort follows your priorities."
        )),
        (Some(high), None) => {
            s.push_str(&format!(" You complete {high:.0}% of your high-priority tasks."))
        }
        _ => {}
    }

    if let Some(worst) = buckets
        .iter()
        .filter(|b| b.dated > 0)
        .max_by(|a, b| a.missed_deadline_rate.total_cmp(&b.missed_deadline_rate))
    {
        if worst.missed_deadline_rate > 0.0 {
            s.push_str(&format!(
                " {:.0}% of dated {} tasks miss their deadline.",
                worst.missed_deadline_rate, worst.priority
            ));
        }
    }
    s
}
