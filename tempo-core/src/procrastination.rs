//! Procrastination indicators: postponements, untouched tasks, severe overdue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsConfig;
use crate::task::Task;
use crate::time::days_between;

const POSTPONED_WEIGHT: f64 = 0.30;
const FREQUENTLY_POSTPONED_WEIGHT: f64 = 0.20;
const SEVERELY_OVERDUE_WEIGHT: f64 = 0.30;
const NEVER_STARTED_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcrastinationAnalysis {
    pub postponed: usize,
    pub frequently_postponed: usize,
    pub never_started: usize,
    pub overdue: usize,
    pub severely_overdue: usize,
    pub procrastination_score: f64,
    pub interpretation: String,
}

fn is_never_started(t: &Task, now: DateTime<Utc>, config: &AnalyticsConfig) -> bool {
    if t.completed || t.first_action_at.is_some() {
        return false;
    }
    t.created_at
        .is_some_and(|created| days_between(created, now) >= config.never_started_grace_days)
}

fn is_severely_overdue(t: &Task, now: DateTime<Utc>, config: &AnalyticsConfig) -> bool {
    t.is_overdue(now)
        && t.due_date
            .is_some_and(|due| days_between(due, now) >= config.severe_overdue_days)
}

pub fn procrastination_analysis(
    tasks: &[Task],
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> ProcrastinationAnalysis {
    let postponed = tasks.iter().filter(|t| t.postponement_count >= 1).count();
    let frequently_postponed = tasks
        .iter()
        .filter(|t| t.postponement_count >= config.frequent_postponement_threshold.max(1))
        .count();
    let never_started = tasks.iter().filter(|t| is_never_started(t, now, config)).count();
    let overdue = tasks.iter().filter(|t| t.is_overdue(now)).count();
    let severely_overdue = tasks
        .iter()
        .filter(|t| is_severely_overdue(t, now, config))
        .count();

    let procrastination_score = procrastination_score(
        tasks.len(),
        postponed,
        frequently_postponed,
        severely_overdue,
        never_started,
    );

    ProcrastinationAnalysis {
        postponed,
        frequently_postponed,
        never_started,
        overdue,
        severely_overdue,
        procrastination_score,
        interpretation: interpret(procrastination_score, postponed, never_started, severely_overdue),
    }
}

/// Weighted share of tasks showing each avoidance signal, scaled to 0-100.
pub fn procrastination_score(
    total: usize,
    postponed: usize,
    frequently_postponed: usize,
    severely_overdue: usize,
    never_started: usize,
) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = |n: usize| n as f64 / total as f64;
    let raw = POSTPONED_WEIGHT * ratio(postponed)
        + FREQUENTLY_POSTPONED_WEIGHT * ratio(frequently_postponed)
        + SEVERELY_OVERDUE_WEIGHT * ratio(severely_overdue)
        + NEVER_STARTED_WEIGHT * ratio(never_started);
    (raw * 100.0).clamp(0.0, 100.0)
}

fn interpret(score: f64, postponed: usize, never_started: usize, severe: usize) -> String {
    let mut s = match score {
        x if x == 0.0 => "No signs of procrastination: nothing postponed, stalled or badly overdue.".to_string(),
        x if x < 20.0 => format!("Low procrastination ({score:.0}/100). A few tasks are slipping, but you are mostly on top of things."),
        x if x < 50.0 => format!("Moderate procrastination ({score:.0}/100). Some tasks keep getting pushed back."),
        _ => format!("High procrastination ({score:.0}/100). Many tasks are being avoided; pick one small next step and start there."),
    };
    if postponed > 0 {
        s.push_str(&format!(" Postponed: {postponed}."));
    }
    if never_started > 0 {
        s.push_str(&format!(" Never started: {never_started}."));
    }
    if severe > 0 {
        s.push_str(&format!(" More than a week overdue: {severe}."));
    }
    s
}
