//! Literature search transports.
//!
//! A [`Source`] performs exactly one request against a search API and parses
//! the response into [`PaperRecord`]s. It never retries and never invents
//! placeholder records; both are the job of
//! [`SearchClient`](crate::agents::SearchClient), which wraps a source with
//! validation, backoff and degradation.
//!
//! [`ArxivSource`] talks to the arXiv Atom API. [`MockSource`] replays scripted
//! outcomes for tests.

mod arxiv;
pub mod mock;

pub use arxiv::{ArxivSource, ARXIV_API_URL};
pub use mock::MockSource;

use async_trait::async_trait;
use std::time::Duration;

use crate::models::{PaperRecord, SearchQuery};

/// Parameters for a single search request
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Validated topic
    pub query: SearchQuery,

    /// Offset of the first result
    pub start: usize,

    /// Maximum number of results to ask for
    pub max_results: usize,

    /// Deadline for the whole request
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(query: SearchQuery, max_results: usize, timeout: Duration) -> Self {
        Self {
            query,
            start: 0,
            max_results,
            timeout,
        }
    }
}

/// The Source trait defines the interface for search transports.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "arxiv")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Issue one search request and parse the response.
    ///
    /// An empty vector is a successful search that matched nothing.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<PaperRecord>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within its deadline
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a non-success status
    #[error("API returned status {0}")]
    Status(u16),

    /// The response body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<feed_rs::parser::ParseFeedError> for SourceError {
    fn from(err: feed_rs::parser::ParseFeedError) -> Self {
        SourceError::Parse(format!("Feed: {}", err))
    }
}
