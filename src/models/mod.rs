//! Core data models for search records and pipeline output.

mod paper;
mod report;
mod search;

pub use paper::{PaperRecord, PlaceholderKind, RecordBuilder};
pub use report::{PaperEntry, PipelineReport};
pub use search::{QueryError, SearchQuery, MIN_QUERY_CHARS};
