//! Field-level parsers for the shapes the document store has produced over time.

pub mod category;
pub mod timestamp;

pub use category::category_from_value;
pub use timestamp::{Timestamp, TimestampParser};
