//! tempo-ingest: turns loosely-typed task documents (document-store exports) into
//! canonical `tempo_core::Task` records.

pub mod normalize;
pub mod parsers;
pub mod types;

pub use normalize::{parse_task_export, Normalizer};
pub use types::{IngestError, IngestReport, IngestWarning, SkippedRecord};
