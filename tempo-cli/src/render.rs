//! Plain-text and JSON rendering of report sections.

use anyhow::Result;
use serde_json::Value;
use std::fmt::Write;
use tempo_core::{AnalyticsReport, WeeklyReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Section {
    Completion,
    TimePatterns,
    Priority,
    Focus,
    Procrastination,
    ProductivityScore,
    Streaks,
    Weekly,
    #[default]
    Comprehensive,
}

/// JSON body for one section, field names as in the report itself.
pub fn section_json(report: &AnalyticsReport, section: Section) -> Result<Value> {
    let v = match section {
        Section::Completion => serde_json::to_value(&report.completion)?,
        Section::TimePatterns => serde_json::to_value(&report.time_patterns)?,
        Section::Priority => serde_json::to_value(&report.priority)?,
        Section::Focus => serde_json::to_value(&report.focus)?,
        Section::Procrastination => serde_json::to_value(&report.procrastination)?,
        Section::ProductivityScore => serde_json::to_value(&report.productivity)?,
        Section::Streaks => serde_json::to_value(&report.streaks)?,
        Section::Weekly => serde_json::to_value(&report.weekly)?,
        Section::Comprehensive => serde_json::to_value(report)?,
    };
    Ok(v)
}

pub fn render_section(report: &AnalyticsReport, section: Section) -> String {
    let mut s = String::new();
    match section {
        Section::Completion => completion(&mut s, report),
        Section::TimePatterns => time_patterns(&mut s, report),
        Section::Priority => priority(&mut s, report),
        Section::Focus => focus(&mut s, report),
        Section::Procrastination => procrastination(&mut s, report),
        Section::ProductivityScore => productivity(&mut s, report),
        Section::Streaks => streaks(&mut s, report),
        Section::Weekly => weekly(&mut s, report),
        Section::Comprehensive => {
            let _ = writeln!(
                s,
                "Tempo report  {} ({})  {} tasks\n",
                report.generated_at.format("%Y-%m-%d %H:%M UTC"),
                report.timezone,
                report.total_tasks
            );
            productivity(&mut s, report);
            completion(&mut s, report);
            time_patterns(&mut s, report);
            priority(&mut s, report);
            focus(&mut s, report);
            procrastination(&mut s, report);
            streaks(&mut s, report);
            weekly(&mut s, report);
        }
    }
    s
}

fn heading(s: &mut String, title: &str) {
    let _ = writeln!(s, "== {title} ==");
}

fn interpretation(s: &mut String, text: &str) {
    let _ = writeln!(s, "  > {text}\n");
}

fn productivity(s: &mut String, r: &AnalyticsReport) {
    let p = &r.productivity;
    heading(s, "Productivity score");
    let _ = writeln!(s, "  {} / 100  grade {} ({})", p.score, p.grade, p.grade.summary());
    let _ = writeln!(
        s,
        "  completion {:.1} x{:.2}  on-time {:.1} x{:.2}  focus {:.1} x{:.2}  anti-procrastination {:.1} x{:.2}",
        p.components.completion,
        p.weights.completion,
        p.components.on_time,
        p.weights.on_time,
        p.components.focus,
        p.weights.focus,
        p.components.anti_procrastination,
        p.weights.anti_procrastination
    );
    interpretation(s, &p.interpretation);
}

fn completion(s: &mut String, r: &AnalyticsReport) {
    let c = &r.completion;
    heading(s, "Completion");
    let _ = writeln!(
        s,
        "  {}/{} completed ({:.1}%)  created in period {}  completed in period {}",
        c.completed_tasks, c.total_tasks, c.completion_rate, c.tasks_created, c.tasks_completed
    );
    let _ = writeln!(
        s,
        "  overdue {} ({:.1}%)  avg completion {:.1}h",
        c.total_overdue, c.overdue_percentage, c.avg_completion_time_hours
    );
    interpretation(s, &c.interpretation);
}

fn time_patterns(s: &mut String, r: &AnalyticsReport) {
    let t = &r.time_patterns;
    heading(s, "Time patterns");
    if let Some(h) = &t.most_productive_hour {
        let _ = writeln!(s, "  peak hour {} ({} done)", h.label, h.count);
    }
    if let Some(d) = &t.most_productive_day {
        let _ = writeln!(s, "  peak day  {} ({} done)", d.label, d.count);
    }
    let tod = &t.time_of_day;
    let _ = writeln!(
        s,
        "  morning {}  afternoon {}  evening {}  night {}",
        tod.morning, tod.afternoon, tod.evening, tod.night
    );
    interpretation(s, &t.interpretation);
}

fn priority(s: &mut String, r: &AnalyticsReport) {
    let p = &r.priority;
    heading(s, "Priority");
    for b in &p.buckets {
        let _ = writeln!(
            s,
            "  {:<8} {:>3}/{:<3} done ({:>5.1}%)  missed {:>3}/{:<3} ({:>5.1}%)  avg {:.1}h",
            b.priority.label(),
            b.completed,
            b.total,
            b.completion_rate,
            b.missed_deadlines,
            b.dated,
            b.missed_deadline_rate,
            b.avg_completion_hours
        );
    }
    let _ = writeln!(s, "  effectiveness {:.1}", p.effectiveness_score);
    interpretation(s, &p.interpretation);
}

fn focus(s: &mut String, r: &AnalyticsReport) {
    let f = &r.focus;
    heading(s, "Focus");
    for c in &f.categories {
        let _ = writeln!(
            s,
            "  {:<16} {:>3}/{:<3} done ({:>5.1}%)",
            c.category, c.completed, c.total, c.completion_rate
        );
    }
    let _ = writeln!(
        s,
        "  switches {} ({:.1}%)  focus score {:.1}  longest run {}",
        f.context_switches, f.context_switch_rate, f.focus_score, f.max_focus_streak
    );
    for t in &f.frequently_reopened {
        let _ = writeln!(s, "  reopened x{}: {}", t.reopen_count, t.title);
    }
    for t in &f.stale_tasks {
        let _ = writeln!(s, "  stale {}d: {}", t.age_days, t.title);
    }
    interpretation(s, &f.interpretation);
}

fn procrastination(s: &mut String, r: &AnalyticsReport) {
    let p = &r.procrastination;
    heading(s, "Procrastination");
    let _ = writeln!(
        s,
        "  score {:.1}  postponed {} (often {})  never started {}  overdue {} (severely {})",
        p.procrastination_score, p.postponed, p.frequently_postponed, p.never_started, p.overdue, p.severely_overdue
    );
    interpretation(s, &p.interpretation);
}

fn streaks(s: &mut String, r: &AnalyticsReport) {
    let st = &r.streaks;
    heading(s, "Streaks");
    let _ = writeln!(
        s,
        "  current {}  longest {}  active days {}",
        st.current_streak, st.longest_streak, st.active_days
    );
    let cells: String = st
        .heatmap
        .iter()
        .map(|d| match d.completions {
            0 => '.',
            1 => ':',
            2..=3 => '+',
            _ => '#',
        })
        .collect();
    let _ = writeln!(s, "  [{cells}]");
    interpretation(s, &st.interpretation);
}

fn weekly(s: &mut String, r: &AnalyticsReport) {
    heading(s, "Weekly");
    for w in &r.weekly {
        let _ = writeln!(
            s,
            "  week of {}  created {:>3}  completed {:>3}  ({:.1}%)",
            w.week_start, w.created, w.completed, w.completion_rate
        );
    }
    let _ = writeln!(s);
}

pub fn render_weekly_report(w: &WeeklyReport) -> String {
    let mut s = String::new();
    heading(&mut s, &format!("Week {} to {}", w.week_start, w.week_end));
    let change = match w.completed_change_pct {
        Some(pct) => format!("{pct:+.1}% vs last week"),
        None => "no completions last week".to_string(),
    };
    let _ = writeln!(
        s,
        "  created {}  completed {} ({:.1}%)  {}",
        w.created, w.completed, w.completion_rate, change
    );
    if let Some(d) = &w.busiest_day {
        let _ = writeln!(s, "  busiest day {} ({} done)", d.label, d.count);
    }
    for c in &w.top_categories {
        let _ = writeln!(s, "  {:<16} {}", c.category, c.completed);
    }
    let _ = writeln!(
        s,
        "  overdue {}  score {} (grade {})",
        w.overdue, w.productivity.score, w.productivity.grade
    );
    interpretation(&mut s, &w.interpretation);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempo_core::{compute_analytics, weekly_report, AnalyticsConfig, Task};

    fn report() -> AnalyticsReport {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let tasks = vec![
            Task::new("a", "Essay", now - Duration::days(1)).completed_at(now - Duration::hours(2)),
            Task::new("b", "Lab", now - Duration::days(10)),
        ];
        compute_analytics(&tasks, now, &AnalyticsConfig::default())
    }

    #[test]
    fn comprehensive_includes_every_section() {
        let text = render_section(&report(), Section::Comprehensive);
        for title in [
            "Productivity score",
            "Completion",
            "Time patterns",
            "Priority",
            "Focus",
            "Procrastination",
            "Streaks",
            "Weekly",
        ] {
            assert!(text.contains(&format!("== {title} ==")), "missing {title}");
        }
        assert!(text.contains("stale 10d: Lab"));
    }

    #[test]
    fn section_json_uses_camel_case() {
        let v = section_json(&report(), Section::Completion).unwrap();
        assert_eq!(v["completionRate"], 50.0);
        let whole = section_json(&report(), Section::Comprehensive).unwrap();
        assert!(whole.get("productivity").is_some());
    }

    #[test]
    fn weekly_report_mentions_missing_baseline() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let tasks = vec![Task::new("a", "Essay", now - Duration::hours(5)).completed_at(now - Duration::hours(1))];
        let text = render_weekly_report(&weekly_report(&tasks, now, &AnalyticsConfig::default()));
        assert!(text.contains("no completions last week"));
        assert!(text.contains("Week 2026-03-09 to 2026-03-15"));
    }
}
