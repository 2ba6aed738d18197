//! arXiv search transport.

use async_trait::async_trait;
use feed_rs::parser;

use crate::models::{PaperRecord, RecordBuilder};
use crate::sources::{FetchRequest, Source, SourceError};
use crate::utils::{sanitize_text, HttpClient};

/// Base URL for arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv caps a single page of results
const MAX_RESULTS_PER_REQUEST: usize = 200;

/// arXiv search source
///
/// Sends `search_query`, `start` and `max_results` to the query endpoint and
/// parses the Atom feed it answers with.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
}

impl ArxivSource {
    /// Create a source sending queries to `base_url` ([`ARXIV_API_URL`] in production)
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn query_params(request: &FetchRequest) -> [(&'static str, String); 3] {
        [
            ("search_query", request.query.topic().to_string()),
            ("start", request.start.to_string()),
            (
                "max_results",
                request.max_results.min(MAX_RESULTS_PER_REQUEST).to_string(),
            ),
        ]
    }

    /// Parse an Atom feed body into records, keeping at most `max_results`.
    pub fn parse_feed(body: &[u8], max_results: usize) -> Result<Vec<PaperRecord>, SourceError> {
        let feed = parser::parse(body)?;

        Ok(feed
            .entries
            .iter()
            .take(max_results)
            .map(Self::parse_entry)
            .collect())
    }

    /// Parse arXiv Atom feed entry into a record
    fn parse_entry(entry: &feed_rs::model::Entry) -> PaperRecord {
        let title = entry
            .title
            .as_ref()
            .map(|t| sanitize_text(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let summary = entry
            .summary
            .as_ref()
            .map(|s| sanitize_text(&s.content))
            .unwrap_or_default();

        // Prefer the abstract page link; the entry id is the same URL on arXiv
        let url = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .map(|l| l.href.clone())
            .unwrap_or_else(|| entry.id.clone());

        RecordBuilder::new(title, url)
            .summary(summary)
            .authors(entry.authors.iter().map(|a| sanitize_text(&a.name)))
            .published(entry.published.map(|d| d.to_rfc3339()))
            .build()
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<PaperRecord>, SourceError> {
        tracing::debug!(
            "Querying {} for '{}' (max_results={})",
            self.base_url,
            request.query,
            request.max_results
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query_params(request))
            .header("Accept", "application/atom+xml")
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Self::parse_feed(bytes.as_ref(), request.max_results)
    }
}
