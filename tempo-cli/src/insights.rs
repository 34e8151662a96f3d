//! Narrative "AI insights" over a computed report.
//!
//! The numeric report is always computed first and is never affected by a
//! provider failure. Generated text is cached per provider/model and reused
//! while the task snapshot is unchanged.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use tempo_core::{cached_or_compute, snapshot_fingerprint, AnalyticsReport, CachePolicy, ReportCache, Task};
use tracing::info;

use crate::llm::InsightError;

pub const SYSTEM_PROMPT: &str = "You are a concise productivity coach. Using only the metrics provided, \
give 3 to 5 short, specific, encouraging suggestions as a bulleted list. Do not invent numbers.";

pub fn cache_key(provider: &str, model: &str) -> String {
    format!("insights:{provider}:{model}")
}

/// Compact plain-text digest of the report, sent as the user message.
pub fn build_prompt(report: &AnalyticsReport) -> String {
    let mut s = String::new();
    let c = &report.completion;
    let p = &report.productivity;
    let _ = writeln!(s, "Productivity metrics (timezone {}):", report.timezone);
    let _ = writeln!(
        s,
        "- Tasks: {} total, {} completed ({:.1}%), {} overdue ({:.1}%)",
        c.total_tasks, c.completed_tasks, c.completion_rate, c.total_overdue, c.overdue_percentage
    );
    let _ = writeln!(s, "- Average completion time: {:.1} hours", c.avg_completion_time_hours);
    let _ = writeln!(s, "- Productivity score: {} (grade {})", p.score, p.grade);
    let _ = writeln!(
        s,
        "- Components: completion {:.1}, on-time {:.1}, focus {:.1}, anti-procrastination {:.1}",
        p.components.completion, p.components.on_time, p.components.focus, p.components.anti_procrastination
    );

    let t = &report.time_patterns;
    if let Some(h) = &t.most_productive_hour {
        let _ = writeln!(s, "- Most productive hour: {} ({} completions)", h.label, h.count);
    }
    if let Some(d) = &t.most_productive_day {
        let _ = writeln!(s, "- Most productive day: {} ({} completions)", d.label, d.count);
    }

    for b in &report.priority.buckets {
        let _ = writeln!(
            s,
            "- Priority {}: {}/{} completed, {:.1}% of deadlines missed",
            b.priority, b.completed, b.total, b.missed_deadline_rate
        );
    }

    let f = &report.focus;
    let _ = writeln!(
        s,
        "- Focus: {} context switches ({:.1}%), longest focus run {}, {} stale tasks",
        f.context_switches,
        f.context_switch_rate,
        f.max_focus_streak,
        f.stale_tasks.len()
    );
    for cat in f.categories.iter().take(5) {
        let _ = writeln!(s, "- Category {}: {}/{} completed", cat.category, cat.completed, cat.total);
    }

    let pr = &report.procrastination;
    let _ = writeln!(
        s,
        "- Procrastination score {:.1}: {} postponed, {} never started, {} severely overdue",
        pr.procrastination_score, pr.postponed, pr.never_started, pr.severely_overdue
    );
    let _ = writeln!(
        s,
        "- Streak: current {} days, longest {} days",
        report.streaks.current_streak, report.streaks.longest_streak
    );
    s
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub text: String,
    pub cached: bool,
}

/// Return insights for `report`, asking the provider only on a cache miss.
/// `refresh` evicts the entry first.
#[allow(clippy::too_many_arguments)]
pub fn generate_insights<C, F>(
    cache: &mut C,
    key: &str,
    tasks: &[Task],
    report: &AnalyticsReport,
    policy: CachePolicy,
    now: DateTime<Utc>,
    refresh: bool,
    ask: F,
) -> Result<Insights>
where
    C: ReportCache<String> + ?Sized,
    F: FnOnce(&str, &str) -> Result<String, InsightError>,
{
    if refresh {
        info!(key, "refresh requested; evicting cached insights");
        cache.evict(key)?;
    }
    let fingerprint = snapshot_fingerprint(tasks);
    let (text, cached) = cached_or_compute(cache, key, &fingerprint, policy, now, || {
        Ok(ask(SYSTEM_PROMPT, &build_prompt(report))?)
    })?;
    Ok(Insights { text, cached })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;
    use chrono::{Duration, TimeZone};
    use std::cell::Cell;
    use tempo_core::{compute_analytics, AnalyticsConfig, MemoryCache};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn snapshot() -> Vec<Task> {
        let created = now() - Duration::days(2);
        vec![
            Task::new("a", "Essay", created).completed_at(now() - Duration::hours(3)),
            Task::new("b", "Lab report", created).with_due(now() - Duration::days(1)),
        ]
    }

    #[test]
    fn prompt_carries_headline_numbers() {
        let tasks = snapshot();
        let report = compute_analytics(&tasks, now(), &AnalyticsConfig::default());
        let prompt = build_prompt(&report);
        assert!(prompt.contains("2 total, 1 completed (50.0%)"), "{prompt}");
        assert!(prompt.contains("grade"));
        assert!(prompt.contains("Streak: current 1 days"));
    }

    #[test]
    fn second_call_is_served_from_cache() {
        let tasks = snapshot();
        let report = compute_analytics(&tasks, now(), &AnalyticsConfig::default());
        let mut cache: MemoryCache<String> = MemoryCache::new();
        let calls = Cell::new(0);
        let ask = |_: &str, _: &str| {
            calls.set(calls.get() + 1);
            Ok("- Finish the lab report first.".to_string())
        };

        let key = cache_key("groq", "llama");
        let first = generate_insights(&mut cache, &key, &tasks, &report, CachePolicy::default(), now(), false, ask).unwrap();
        let second = generate_insights(&mut cache, &key, &tasks, &report, CachePolicy::default(), now(), false, ask).unwrap();
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.text, second.text);
        assert_eq!(calls.get(), 1);

        let refreshed = generate_insights(&mut cache, &key, &tasks, &report, CachePolicy::default(), now(), true, ask).unwrap();
        assert!(!refreshed.cached);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn provider_errors_surface_without_caching() {
        let tasks = snapshot();
        let report = compute_analytics(&tasks, now(), &AnalyticsConfig::default());
        let mut cache: MemoryCache<String> = MemoryCache::new();
        let err = generate_insights(&mut cache, "k", &tasks, &report, CachePolicy::default(), now(), false, |_, _| {
            Err(InsightError::RateLimited(Provider::Gemini))
        })
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<InsightError>(), Some(InsightError::RateLimited(_))));
        assert!(cache.is_empty());
    }
}
