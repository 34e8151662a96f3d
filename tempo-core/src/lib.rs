//! tempo-core: task model and productivity analytics engine for the Tempo planner.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at I/O seams, `thiserror` enums for domain errors.
//! - **Logging**: `tracing` macros; the engine itself only emits `debug!`.

pub mod analytics;
pub mod cache;
pub mod completion;
pub mod focus;
pub mod patterns;
pub mod priority;
pub mod procrastination;
pub mod score;
pub mod streaks;
pub mod task;
pub mod time;
pub mod weekly;

pub use analytics::{
    compute_analytics, compute_analytics_now, AnalyticsConfig, AnalyticsReport, ConfigError, MAX_WINDOW_DAYS,
};
pub use cache::{cached_or_compute, snapshot_fingerprint, CacheEntry, CachePolicy, MemoryCache, ReportCache};
pub use completion::{completion_metrics, CompletionMetrics, DailyCount};
pub use focus::{focus_analysis, CategoryStats, FocusAnalysis, NEUTRAL_FOCUS};
pub use patterns::{time_patterns, DayPeriod, PeakBucket, TimeOfDayBreakdown, TimePatterns};
pub use priority::{priority_analysis, PriorityAnalysis, PriorityStats};
pub use procrastination::{procrastination_analysis, ProcrastinationAnalysis};
pub use score::{on_time_rate, productivity_score, Grade, ProductivityScore, ScoreComponents, ScoreWeights};
pub use streaks::{streak_summary, HeatmapDay, StreakSummary};
pub use task::{Category, Priority, Task, TaskError, UNCATEGORIZED};
pub use weekly::{weekly_aggregates, weekly_report, WeekSummary, WeeklyReport};
