//! Resilient literature search.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::models::{PaperRecord, PlaceholderKind, SearchQuery};
use crate::sources::{ArxivSource, FetchRequest, Source, SourceError};
use crate::utils::{truncate_chars, with_retry, HttpClient, RetryConfig, RetryResult};

/// Searches a [`Source`] with validation, retries and placeholder degradation.
///
/// [`SearchClient::search`] never fails and never returns an empty list:
/// - a topic shorter than two characters yields one "Invalid Search Query" record
///   without touching the network;
/// - a successful search with no entries yields one "No Results Found" record;
/// - transport failures are retried with `backoff_factor ^ attempt` second
///   delays and, once attempts run out, yield one "Connection Error" record.
#[derive(Debug, Clone)]
pub struct SearchClient {
    source: Arc<dyn Source>,
    timeout: Duration,
    retry: RetryConfig,
    abstract_char_limit: usize,
}

impl SearchClient {
    /// Wrap an arbitrary source.
    ///
    /// Fails when `config.max_retries` is zero.
    pub fn new(source: Arc<dyn Source>, config: &SearchConfig) -> Result<Self, SourceError> {
        Ok(Self {
            source,
            timeout: config.timeout(),
            retry: config.retry()?,
            abstract_char_limit: config.abstract_char_limit,
        })
    }

    /// Search arXiv at `config.base_url`
    pub fn from_config(config: &SearchConfig) -> Result<Self, SourceError> {
        let source = ArxivSource::new(HttpClient::new()?, &config.base_url);
        Self::new(Arc::new(source), config)
    }

    /// Search for up to `max_results` papers about `query`.
    ///
    /// `max_results` below one is treated as one.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<PaperRecord> {
        let query = match SearchQuery::parse(query) {
            Ok(query) => query,
            Err(err) => {
                tracing::warn!("Rejected search topic: {}", err);
                return vec![PaperRecord::placeholder(
                    PlaceholderKind::InvalidQuery,
                    format!("Please enter a research topic: {}.", err),
                )];
            }
        };

        let max_results = max_results.max(1);
        let request = FetchRequest::new(query, max_results, self.timeout);
        let source_name = self.source.name();
        let source_id = self.source.id();

        match with_retry(self.retry, || self.source.fetch(&request)).await {
            RetryResult::Success(records) if records.is_empty() => {
                tracing::info!(source = source_id, "{} returned no results for '{}'", source_name, request.query);
                vec![PaperRecord::placeholder(
                    PlaceholderKind::NoResults,
                    format!("No papers on {} matched '{}'.", source_name, request.query),
                )]
            }
            RetryResult::Success(records) => {
                tracing::info!(
                    source = source_id,
                    "{} returned {} papers for '{}'",
                    source_name,
                    records.len(),
                    request.query
                );
                records
                    .into_iter()
                    .take(max_results)
                    .map(|record| self.clip_abstract(record))
                    .collect()
            }
            RetryResult::TransientFailure {
                error, attempts, ..
            } => {
                tracing::warn!(
                    source = source_id,
                    "Giving up on {} after {} attempts: {}",
                    source_name,
                    attempts,
                    error
                );
                vec![PaperRecord::placeholder(
                    PlaceholderKind::ConnectionError,
                    format!(
                        "Could not reach {} after {} attempt(s): {}.",
                        source_name, attempts, error
                    ),
                )]
            }
            RetryResult::PermanentFailure { error, .. } => {
                tracing::warn!(source = source_id, "Unusable response from {}: {}", source_name, error);
                vec![PaperRecord::placeholder(
                    PlaceholderKind::NoResults,
                    format!("The {} response could not be read: {}.", source_name, error),
                )]
            }
        }
    }

    fn clip_abstract(&self, mut record: PaperRecord) -> PaperRecord {
        if self.abstract_char_limit > 0 {
            record.summary = truncate_chars(&record.summary, self.abstract_char_limit);
        }
        record
    }
}
