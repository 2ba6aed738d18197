//! Remote inference capabilities used by the summarizer and insight stages.
//!
//! Each stage owns a [`LazyCapability`]: the backend is acquired on first use,
//! the outcome ([`Capability::Available`] or [`Capability::Unavailable`]) is
//! cached for the lifetime of the stage, and callers branch on it once instead
//! of re-checking credentials at every call site.

mod capability;
mod chat;
mod huggingface;

pub use capability::{Capability, LazyCapability};
pub use chat::{ChatBackend, ChatCompletionClient, ChatMessage, ChatRequest, Role};
pub use huggingface::{HuggingFaceSummarizer, SummarizationBackend, SummarizationRequest};

/// Errors raised by inference backends
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The capability cannot be used (missing credential, disabled, ...)
    #[error("Capability unavailable: {0}")]
    Unavailable(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within its deadline
    #[error("Request timed out")]
    Timeout,

    /// The service answered with a non-success status
    #[error("Service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not match the expected schema
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// A caller-supplied summarization function failed
    #[error("Override failed: {0}")]
    Override(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else if err.is_decode() {
            InferenceError::Parse(err.to_string())
        } else {
            InferenceError::Network(err.to_string())
        }
    }
}

/// Turn a non-success response into [`InferenceError::Status`], keeping a short body excerpt
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, InferenceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(InferenceError::Status {
        status: status.as_u16(),
        body: crate::utils::truncate_chars(body.trim(), 200),
    })
}
