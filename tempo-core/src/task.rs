//! Task model consumed by the analytics engine.
//!
//! The engine only reads snapshots of these records. The lifecycle methods here
//! are what keep the derived history fields (postponements, reopens, first action)
//! consistent for whatever storage layer owns the tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Label used for tasks that carry no category at all.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("task title is {0} characters (max {MAX_TITLE_CHARS})")]
    TitleTooLong(usize),
    #[error("task description is {0} characters (max {MAX_DESCRIPTION_CHARS})")]
    DescriptionTooLong(usize),
    #[error("task {0} is already completed")]
    AlreadyCompleted(String),
    #[error("new due date must be later than the current one")]
    NotLater,
}

/// Declared task priority.
///
/// Anything that is not one of the three known levels is kept verbatim in
/// `Other` so it stays visible as its own bucket in the priority breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Priority {
    /// Weight used by the priority effectiveness score.
    pub fn weight(&self) -> f64 {
        match self {
            Priority::High => 3.0,
            Priority::Medium => 2.0,
            Priority::Low | Priority::Other(_) => 1.0,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Other(s) => s,
        }
    }
}

impl From<&str> for Priority {
    fn from(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Priority::High,
            "medium" | "" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Other(raw.trim().to_string()),
        }
    }
}

impl From<String> for Priority {
    fn from(raw: String) -> Self {
        Priority::from(raw.as_str())
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.label().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical category reference. Labels are opaque and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single planner task.
///
/// Timestamps are `Option` so a record whose source timestamp could not be parsed
/// still counts toward totals while being left out of time-based metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// Times the due date was pushed back while incomplete.
    #[serde(default)]
    pub postponement_count: u32,
    /// Times the task went from completed back to incomplete.
    #[serde(default)]
    pub reopen_count: u32,
    /// First status-changing action (a completion toggle).
    #[serde(default)]
    pub first_action_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            categories: Vec::new(),
            due_date: None,
            completed: false,
            created_at: Some(created_at),
            completed_at: None,
            postponement_count: 0,
            reopen_count: 0,
            first_action_at: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_category(mut self, label: impl Into<String>) -> Self {
        self.categories.push(Category::new(label));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder form of [`Task::complete`] for fixtures; ignores the already-completed case.
    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        let _ = self.complete(at);
        self
    }

    /// Check the field limits of the data model.
    pub fn validate(&self) -> Result<(), TaskError> {
        let title_len = self.title.trim().chars().count();
        if title_len == 0 {
            return Err(TaskError::EmptyTitle);
        }
        if title_len > MAX_TITLE_CHARS {
            return Err(TaskError::TitleTooLong(title_len));
        }
        if let Some(desc) = &self.description {
            let n = desc.chars().count();
            if n > MAX_DESCRIPTION_CHARS {
                return Err(TaskError::DescriptionTooLong(n));
            }
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), TaskError> {
        let old = std::mem::replace(&mut self.title, title.into());
        if let Err(e) = self.validate() {
            self.title = old;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) -> Result<(), TaskError> {
        let old = std::mem::replace(&mut self.description, description);
        if let Err(e) = self.validate() {
            self.description = old;
            return Err(e);
        }
        Ok(())
    }

    /// Mark complete. `completed_at` is set only on the false -> true transition.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), TaskError> {
        if self.completed {
            return Err(TaskError::AlreadyCompleted(self.id.clone()));
        }
        self.completed = true;
        self.completed_at = Some(at);
        if self.first_action_at.is_none() {
            self.first_action_at = Some(at);
        }
        Ok(())
    }

    /// Revert a completion. No-op for tasks that are not completed.
    pub fn reopen(&mut self) {
        if !self.completed {
            return;
        }
        self.completed = false;
        self.completed_at = None;
        self.reopen_count += 1;
    }

    /// Push the due date later. Tasks without a due date simply gain one and
    /// that does not count as a postponement.
    pub fn postpone(&mut self, new_due: DateTime<Utc>) -> Result<(), TaskError> {
        if self.completed {
            return Err(TaskError::AlreadyCompleted(self.id.clone()));
        }
        match self.due_date {
            Some(due) if new_due <= due => Err(TaskError::NotLater),
            Some(_) => {
                self.due_date = Some(new_due);
                self.postponement_count += 1;
                Ok(())
            }
            None => {
                self.due_date = Some(new_due);
                Ok(())
            }
        }
    }

    /// Category used for focus/context-switch tracking.
    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(Category::as_str)
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|d| d < now)
    }

    /// Completion duration in hours, when both timestamps are present and ordered.
    pub fn completion_hours(&self) -> Option<f64> {
        let created = self.created_at?;
        let done = self.completed_at?;
        if !self.completed || done < created {
            return None;
        }
        Some((done - created).num_seconds() as f64 / 3600.0)
    }
}
