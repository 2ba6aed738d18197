//! Output of one pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PaperRecord;

/// A search record paired with its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperEntry {
    pub record: PaperRecord,
    pub summary: String,
}

/// Everything a pipeline run produced, in presentation order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// The topic as entered
    pub query: String,

    /// One entry per search record, in search order
    pub papers: Vec<PaperEntry>,

    /// The synthesized insight across all summaries
    pub insight: String,

    /// When the run finished
    pub generated_at: DateTime<Utc>,
}

impl PipelineReport {
    pub fn new(query: impl Into<String>, papers: Vec<PaperEntry>, insight: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            papers,
            insight: insight.into(),
            generated_at: Utc::now(),
        }
    }

    /// The search records, in order
    pub fn records(&self) -> impl Iterator<Item = &PaperRecord> {
        self.papers.iter().map(|p| &p.record)
    }

    /// The per-paper summaries, in order
    pub fn summaries(&self) -> impl Iterator<Item = &str> {
        self.papers.iter().map(|p| p.summary.as_str())
    }

    /// Whether the search stage degraded to a placeholder
    pub fn is_degraded(&self) -> bool {
        self.papers.iter().any(|p| p.record.is_placeholder())
    }
}
