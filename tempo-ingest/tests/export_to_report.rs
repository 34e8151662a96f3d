use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use tempo_core::{compute_analytics, AnalyticsConfig, Priority, UNCATEGORIZED};
use tempo_ingest::parse_task_export;

fn fixture() -> String {
    let p = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tasks.json");
    std::fs::read_to_string(&p).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

#[test]
fn export_normalizes_with_skips_and_warnings() {
    let report = parse_task_export(&fixture()).unwrap();

    assert_eq!(report.tasks.len(), 3);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 3);

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].task_id, "3");
    assert_eq!(report.warnings[0].field, "createdAt");

    let reading = &report.tasks[1];
    assert_eq!(reading.priority, Priority::Low);
    assert_eq!(reading.postponement_count, 2);
    assert_eq!(reading.primary_category(), "Reading");
}

#[test]
fn normalized_export_feeds_the_engine() {
    let tasks = parse_task_export(&fixture()).unwrap().tasks;
    let report = compute_analytics(&tasks, now(), &AnalyticsConfig::default());

    assert_eq!(report.total_tasks, 3);
    assert_eq!(report.completion.completed_tasks, 2);
    assert!((report.completion.completion_rate - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.completion.total_overdue, 1);

    // the task with an unparseable createdAt still counts, but has no duration
    assert!((report.completion.avg_completion_time_hours - 25.0).abs() < 1e-9);

    assert_eq!(report.priority.buckets.len(), 3);
    assert!(report.focus.categories.iter().any(|c| c.category == UNCATEGORIZED));
    assert_eq!(report.streaks.current_streak, 1);
    assert_eq!(report.procrastination.postponed, 1);
}
