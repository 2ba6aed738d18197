//! Utility modules supporting the pipeline stages.
//!
//! - [`HttpClient`]: shared reqwest client with sensible defaults
//! - [`RetryConfig`]: retry configuration with `backoff_factor ^ attempt` delays
//! - [`with_retry`]: execute an operation with automatic retry on transient errors
//! - [`sanitize_text`], [`redact_sensitive`], [`truncate_chars`]: text hygiene
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use paper_insight::sources::SourceError;
//! use paper_insight::utils::{with_retry, RetryConfig, RetryResult};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::new(3, 2.0)?;
//! match with_retry(config, fetch_data).await {
//!     RetryResult::Success(data) => println!("{}", data),
//!     other => eprintln!("gave up after {:?} attempts", other.attempts()),
//! }
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;
mod text;

pub use http::{HttpClient, USER_AGENT};
pub use retry::{with_retry, RetryConfig, RetryResult, TransientError};
pub use text::{
    redact_sensitive, sanitize_text, take_chars, truncate_chars, word_count, ELLIPSIS, REDACTED,
    REDACTED_TERMS,
};
