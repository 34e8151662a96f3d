//! Document -> Task normalization.
//!
//! Port target: the task documents written by the planner's REST API and by the
//! browser's local-storage export. Both use camelCase, Mongo ids, and categories
//! that are sometimes labels and sometimes embedded objects.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tempo_core::{Priority, Task};
use tracing::{debug, warn};

use crate::parsers::{category_from_value, Timestamp, TimestampParser};
use crate::types::{IngestError, IngestReport, IngestWarning, SkippedRecord};

pub struct Normalizer {
    timestamps: TimestampParser,
}

fn first<'a>(doc: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| doc.get(*k))
        .find(|v| !v.is_null())
}

fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(id_of),
        _ => None,
    }
}

fn count_of(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n.min(u32::MAX as u64) as u32).unwrap_or(0),
        Some(Value::Array(items)) => items.len().min(u32::MAX as usize) as u32,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            timestamps: TimestampParser::new()?,
        })
    }

    /// Normalize one record. Recoverable problems are appended to `warnings`;
    /// only a missing object, id or title rejects the record.
    pub fn normalize_document(&self, value: &Value, warnings: &mut Vec<IngestWarning>) -> Result<Task, IngestError> {
        let doc = value.as_object().ok_or(IngestError::NotAnObject)?;

        let id = first(doc, &["id", "_id"])
            .and_then(id_of)
            .ok_or(IngestError::MissingId)?;
        let title = first(doc, &["title", "name"])
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IngestError::MissingTitle(id.clone()))?
            .to_string();

        let mut warn_field = |field: &'static str, message: String| {
            warnings.push(IngestWarning {
                task_id: id.clone(),
                field,
                message,
            });
        };

        let priority = match first(doc, &["priority"]) {
            None => Priority::Medium,
            Some(Value::String(s)) => Priority::from(s.as_str()),
            Some(other) => {
                warn_field("priority", format!("non-string priority {other} kept as its own bucket"));
                Priority::Other(other.to_string())
            }
        };

        let mut categories = Vec::new();
        let raw_categories: Vec<&Value> = match first(doc, &["categories", "category"]) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
            None => Vec::new(),
        };
        for raw in raw_categories {
            match category_from_value(raw) {
                Some(c) => categories.push(c),
                None => warn_field("categories", format!("unusable category reference {raw}")),
            }
        }

        let mut timestamp = |field: &'static str, keys: &[&str]| match first(doc, keys) {
            None => None,
            Some(v) => match self.timestamps.parse(v) {
                Timestamp::Parsed(dt) => Some(dt),
                Timestamp::Absent => None,
                Timestamp::Malformed(raw) => {
                    warn_field(field, format!("unparseable timestamp {raw:?}"));
                    None
                }
            },
        };

        let due_date = timestamp("dueDate", &["dueDate", "due_date", "deadline"]);
        let created_at = timestamp("createdAt", &["createdAt", "created_at"]);
        let mut completed_at = timestamp("completedAt", &["completedAt", "completed_at"]);
        let first_action_at = timestamp("firstActionAt", &["firstActionAt", "first_action_at", "startedAt"]);

        let completed = match first(doc, &["completed"]) {
            Some(Value::Bool(b)) => *b,
            _ => matches!(
                first(doc, &["status"]).and_then(Value::as_str),
                Some("completed" | "done")
            ),
        };
        if !completed && completed_at.is_some() {
            warn_field("completedAt", "completion time on an open task dropped".to_string());
            completed_at = None;
        }

        let description = first(doc, &["description", "notes"])
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty());

        let task = Task {
            id: id.clone(),
            title,
            description,
            priority,
            categories,
            due_date,
            completed,
            created_at,
            completed_at,
            postponement_count: count_of(first(doc, &["postponementCount", "postponedCount", "postponements"])),
            reopen_count: count_of(first(doc, &["reopenCount", "reopenedCount"])),
            first_action_at,
        };

        if let Err(e) = task.validate() {
            warn_field("title", e.to_string());
        }

        Ok(task)
    }
}

/// Parse a JSON export: either a bare array of task documents or `{"tasks": [...]}`.
pub fn parse_task_export(text: &str) -> Result<IngestReport> {
    let root: Value = serde_json::from_str(text).context("parse task export JSON")?;
    let records = match &root {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("tasks") {
            Some(Value::Array(items)) => items,
            _ => bail!("task export object has no \"tasks\" array"),
        },
        _ => bail!("task export must be an array or an object with a \"tasks\" array"),
    };

    let normalizer = Normalizer::new()?;
    let mut report = IngestReport::default();

    for (index, record) in records.iter().enumerate() {
        match normalizer.normalize_document(record, &mut report.warnings) {
            Ok(task) => report.tasks.push(task),
            Err(e) => {
                warn!(index, error = %e, "skipping task record");
                report.skipped.push(SkippedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        tasks = report.tasks.len(),
        skipped = report.skipped.len(),
        warnings = report.warnings.len(),
        "task export normalized"
    );
    Ok(report)
}
