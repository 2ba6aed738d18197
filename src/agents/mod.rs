//! The three pipeline stages.
//!
//! Every stage is total: it returns a value for any input and degrades
//! instead of failing.
//!
//! - [`SearchClient`]: validated, retried literature search that falls back
//!   to placeholder records
//! - [`Summarizer`]: remote summarization with an extractive fallback
//! - [`InsightSynthesizer`]: one-shot chat-model synthesis with a truncated
//!   concatenation fallback

mod insight;
mod search;
mod summarizer;

pub use insight::{
    offline_insight, InsightSynthesizer, INSIGHT_FAILED_MARKER, NO_SUMMARIES_MARKER,
    OFFLINE_CHAR_BUDGET, OFFLINE_EMPTY, OFFLINE_PREFIX,
};
pub use search::SearchClient;
pub use summarizer::{
    adaptive_bounds, extractive_summary, Summarizer, EMPTY_SUMMARY_MARKER, FALLBACK_WORDS,
    NO_TEXT_MARKER,
};
