//! # Paper Insight
//!
//! Find research papers on a topic, summarize each abstract and synthesize one
//! insight across them.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (PaperRecord, SearchQuery, PipelineReport)
//! - [`sources`]: Search transports behind the [`Source`] trait
//! - [`inference`]: Remote summarization and chat-completion capabilities
//! - [`agents`]: The search, summarize and synthesize stages with their fallbacks
//! - [`pipeline`]: Runs the stages in sequence
//! - [`utils`]: HTTP client, retry with backoff and text helpers
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal rendering for the command-line interface

pub mod agents;
pub mod config;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use agents::{InsightSynthesizer, SearchClient, Summarizer};
pub use config::{Config, Credentials};
pub use models::{PaperRecord, PipelineReport};
pub use pipeline::{Pipeline, PipelineError, PipelineEvent};
pub use sources::Source;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
