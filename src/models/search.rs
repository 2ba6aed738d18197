//! Validated search topic.

use serde::{Deserialize, Serialize};

/// Shortest accepted topic, counted in characters after trimming
pub const MIN_QUERY_CHARS: usize = 2;

/// A trimmed, non-trivial search topic
///
/// Construction goes through [`SearchQuery::parse`], so holding one means the
/// topic already passed validation and may be sent over the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchQuery {
    topic: String,
}

impl SearchQuery {
    /// Trim and validate a raw topic string
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let topic = raw.trim();
        let len = topic.chars().count();
        if len < MIN_QUERY_CHARS {
            return Err(QueryError::TooShort(len));
        }

        Ok(Self {
            topic: topic.to_string(),
        })
    }

    /// The trimmed topic
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.topic)
    }
}

impl TryFrom<String> for SearchQuery {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SearchQuery> for String {
    fn from(query: SearchQuery) -> Self {
        query.topic
    }
}

/// Reasons a topic is rejected before any request is made
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("search topic must be at least {MIN_QUERY_CHARS} characters long (got {0})")]
    TooShort(usize),
}
