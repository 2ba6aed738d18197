//! Paper record produced by the search stage.

use serde::{Deserialize, Serialize};

/// Why a synthetic record stands in for real search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    /// The topic failed validation; no request was made
    InvalidQuery,
    /// The search succeeded but matched nothing (or the feed was unreadable)
    NoResults,
    /// Every attempt failed at the transport level
    ConnectionError,
}

impl PlaceholderKind {
    /// Title shown for the placeholder record
    pub fn title(&self) -> &'static str {
        match self {
            PlaceholderKind::InvalidQuery => "Invalid Search Query",
            PlaceholderKind::NoResults => "No Results Found",
            PlaceholderKind::ConnectionError => "Connection Error",
        }
    }
}

impl std::fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A paper returned by the literature search
///
/// Either a parsed feed entry or a placeholder standing in for a failed or
/// empty search, so downstream stages always receive at least one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper title
    pub title: String,

    /// Abstract text (or an explanation, for placeholders)
    pub summary: String,

    /// Paper page URL, empty for placeholders
    pub url: String,

    /// Author names in feed order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    /// Publication date (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,

    /// Set when this record is synthetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<PlaceholderKind>,
}

impl PaperRecord {
    /// Create a record with the required fields
    pub fn new(title: impl Into<String>, summary: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            url: url.into(),
            authors: Vec::new(),
            published: None,
            placeholder: None,
        }
    }

    /// Create a placeholder record explaining why there are no real results
    pub fn placeholder(kind: PlaceholderKind, summary: impl Into<String>) -> Self {
        Self {
            placeholder: Some(kind),
            ..Self::new(kind.title(), summary, String::new())
        }
    }

    /// Whether this record is synthetic
    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Authors joined for display
    pub fn author_line(&self) -> String {
        self.authors.join("; ")
    }
}

/// Builder for records parsed from a feed
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: PaperRecord,
}

impl RecordBuilder {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            record: PaperRecord::new(title, String::new(), url),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.record.summary = summary.into();
        self
    }

    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.authors = authors
            .into_iter()
            .map(Into::into)
            .filter(|a: &String| !a.trim().is_empty())
            .collect();
        self
    }

    pub fn published(mut self, published: Option<String>) -> Self {
        self.record.published = published.filter(|p| !p.is_empty());
        self
    }

    pub fn build(self) -> PaperRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_titles() {
        let record = PaperRecord::placeholder(PlaceholderKind::ConnectionError, "down");
        assert_eq!(record.title, "Connection Error");
        assert_eq!(record.summary, "down");
        assert!(record.url.is_empty());
        assert!(record.is_placeholder());

        assert_eq!(PlaceholderKind::InvalidQuery.title(), "Invalid Search Query");
        assert_eq!(PlaceholderKind::NoResults.to_string(), "No Results Found");
    }

    #[test]
    fn test_builder() {
        let record = RecordBuilder::new("Attention Is All You Need", "http://arxiv.org/abs/1706.03762")
            .summary("The dominant sequence transduction models...")
            .authors(["Ashish Vaswani", " ", "Noam Shazeer"])
            .published(Some("2017-06-12T17:57:34+00:00".to_string()))
            .build();

        assert!(!record.is_placeholder());
        assert_eq!(record.author_line(), "Ashish Vaswani; Noam Shazeer");
        assert!(record.published.is_some());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let record = PaperRecord::new("T", "S", "U");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("authors").is_none());
        assert!(json.get("placeholder").is_none());

        let placeholder = PaperRecord::placeholder(PlaceholderKind::NoResults, "none");
        let json = serde_json::to_value(&placeholder).unwrap();
        assert_eq!(json["placeholder"], "no_results");
    }
}
