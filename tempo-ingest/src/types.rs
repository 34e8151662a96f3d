use serde::Serialize;
use tempo_core::Task;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no usable id")]
    MissingId,
    #[error("record {0} has no title")]
    MissingTitle(String),
}

/// A record that could not become a task at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// A record that was kept, but with a field dropped or adjusted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestWarning {
    pub task_id: String,
    pub field: &'static str,
    pub message: String,
}

/// Normalized output of an export (store-agnostic).
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub tasks: Vec<Task>,
    pub skipped: Vec<SkippedRecord>,
    pub warnings: Vec<IngestWarning>,
}
