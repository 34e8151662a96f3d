//! End-to-end scenarios for `compute_analytics` on small, hand-built snapshots.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempo_core::{compute_analytics, AnalyticsConfig, Grade, Priority, Task};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 20, 18, 0, 0).unwrap()
}

fn config() -> AnalyticsConfig {
    AnalyticsConfig::default()
}

/// 10 tasks: 6 completed before their due dates, 2 open and overdue, 2 open and not yet due.
fn mixed_snapshot() -> Vec<Task> {
    let start = now() - Duration::days(6);
    let mut tasks = Vec::new();
    for i in 0..6 {
        let created = start + Duration::hours(i);
        tasks.push(
            Task::new(format!("done-{i}"), format!("Finished {i}"), created)
                .with_due(created + Duration::days(3))
                .with_category(if i % 2 == 0 { "Math" } else { "History" })
                .completed_at(created + Duration::days(1)),
        );
    }
    for i in 0..2 {
        tasks.push(
            Task::new(format!("late-{i}"), format!("Late {i}"), start)
                .with_priority(Priority::High)
                .with_due(now() - Duration::days(1)),
        );
    }
    for i in 0..2 {
        tasks.push(
            Task::new(format!("open-{i}"), format!("Open {i}"), now() - Duration::hours(5))
                .with_due(now() + Duration::days(2)),
        );
    }
    tasks
}

#[test]
fn empty_snapshot_uses_defaults() {
    let r = compute_analytics(&[], now(), &config());
    assert_eq!(r.total_tasks, 0);
    assert_eq!(r.completion.completion_rate, 0.0);
    assert_eq!(r.productivity.on_time_rate, 100.0);
    assert_eq!(r.procrastination.procrastination_score, 0.0);
    assert!(r.productivity.score <= 100);
    assert!(!r.productivity.interpretation.is_empty());
}

#[test]
fn ten_task_mix() {
    let r = compute_analytics(&mixed_snapshot(), now(), &config());
    assert_eq!(r.completion.total_tasks, 10);
    assert_eq!(r.completion.completed_tasks, 6);
    assert_eq!(r.completion.completion_rate, 60.0);
    assert_eq!(r.completion.total_overdue, 2);
    assert_eq!(r.completion.overdue_percentage, 20.0);
    assert_eq!(r.productivity.on_time_rate, 100.0);
    assert_eq!(r.procrastination.overdue, 2);

    // 6 alternating completions: every transition is a switch
    assert_eq!(r.focus.context_switches, 5);
    assert_eq!(r.focus.context_switch_rate, 100.0);

    // 0.30*60 + 0.25*100 + 0.20*0 + 0.25*80 = 63
    assert_eq!(r.productivity.score, 63);
    assert_eq!(r.productivity.grade, Grade::C);
}

#[test]
fn hour_nine_peak() {
    let tasks: Vec<Task> = (0..3)
        .map(|d| {
            let day = Utc.with_ymd_and_hms(2026, 3, 16 + d, 9, 15, 0).unwrap();
            Task::new(format!("t{d}"), "Morning review", day - Duration::hours(2)).completed_at(day)
        })
        .collect();
    let r = compute_analytics(&tasks, now(), &config());
    assert_eq!(r.time_patterns.hourly[9], 3);
    assert_eq!(r.time_patterns.hourly.iter().sum::<usize>(), 3);
    let peak = r.time_patterns.most_productive_hour.expect("peak hour");
    assert_eq!(peak.index, 9);
    assert_eq!(peak.label, "09:00");
    assert_eq!(r.time_patterns.time_of_day.morning, 3);
}

#[test]
fn hour_buckets_follow_configured_timezone() {
    let done = Utc.with_ymd_and_hms(2026, 3, 16, 15, 0, 0).unwrap();
    let tasks = vec![Task::new("t", "t", done - Duration::hours(1)).completed_at(done)];
    let cfg = AnalyticsConfig {
        timezone: chrono_tz::America::Chicago,
        ..config()
    };
    let r = compute_analytics(&tasks, now(), &cfg);
    // 15:00 UTC is 10:00 CDT
    assert_eq!(r.time_patterns.most_productive_hour.unwrap().index, 10);
    assert_eq!(r.timezone, "America/Chicago");
}

#[test]
fn single_task_three_hours() {
    let created = Utc.with_ymd_and_hms(2026, 3, 19, 8, 0, 0).unwrap();
    let tasks = vec![Task::new("t", "Write summary", created).completed_at(created + Duration::hours(3))];
    let r = compute_analytics(&tasks, now(), &config());
    assert!((r.completion.avg_completion_time_hours - 3.0).abs() < 1e-9);
    assert_eq!(r.productivity.on_time_rate, 100.0);
}

#[test]
fn category_switches_a_a_b_a() {
    let base = Utc.with_ymd_and_hms(2026, 3, 19, 8, 0, 0).unwrap();
    let tasks: Vec<Task> = ["A", "A", "B", "A"]
        .iter()
        .enumerate()
        .map(|(i, cat)| {
            Task::new(format!("t{i}"), "step", base)
                .with_category(*cat)
                .completed_at(base + Duration::hours(i as i64 + 1))
        })
        .collect();
    let r = compute_analytics(&tasks, now(), &config());
    assert_eq!(r.focus.context_switches, 2);
    assert!((r.focus.context_switch_rate - 66.7).abs() < 0.05);
    assert_eq!(r.focus.max_focus_streak, 2);
}

#[test]
fn malformed_timestamps_only_drop_time_metrics() {
    let mut broken = Task::new("broken", "No timestamps", now());
    broken.created_at = None;
    broken.completed = true;
    broken.completed_at = None;
    let ok = Task::new("ok", "Fine", now() - Duration::hours(4)).completed_at(now() - Duration::hours(2));

    let r = compute_analytics(&[broken, ok], now(), &config());
    assert_eq!(r.completion.total_tasks, 2);
    assert_eq!(r.completion.completed_tasks, 2);
    assert_eq!(r.completion.completion_rate, 100.0);
    assert!((r.completion.avg_completion_time_hours - 2.0).abs() < 1e-9);
    assert_eq!(r.time_patterns.hourly.iter().sum::<usize>(), 1);
}

#[test]
fn unknown_priority_is_its_own_bucket() {
    let tasks = vec![
        Task::new("a", "a", now()).with_priority(Priority::from("someday")),
        Task::new("b", "b", now()).with_priority(Priority::High),
    ];
    let r = compute_analytics(&tasks, now(), &config());
    assert_eq!(r.priority.buckets.len(), 2);
    assert_eq!(r.priority.buckets[1].priority, Priority::Other("someday".into()));
}

#[test]
fn report_serializes_with_camel_case_fields() {
    let r = compute_analytics(&mixed_snapshot(), now(), &config());
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["completion"]["completionRate"], 60.0);
    assert_eq!(json["productivity"]["grade"], "C");
    assert!(json["timePatterns"]["mostProductiveHour"]["label"].is_string());
}
