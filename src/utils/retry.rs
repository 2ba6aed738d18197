//! Retry utilities with exponential backoff for resilient API calls.

use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Longest pause between two attempts, whatever the backoff factor
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    max_attempts: u32,
    backoff_factor: f64,
}

impl RetryConfig {
    /// `max_attempts` counts the first attempt and must be at least one.
    pub fn new(max_attempts: u32, backoff_factor: f64) -> Result<Self, SourceError> {
        if max_attempts == 0 {
            return Err(SourceError::InvalidRequest(
                "at least one attempt is required".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            backoff_factor,
        })
    }

    /// Delay to wait after a failed `attempt` (1-based): `backoff_factor ^ attempt` seconds.
    ///
    /// Capped at [`MAX_BACKOFF`]. Negative or NaN values mean no delay.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.backoff_factor.powi(exponent);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(secs.min(MAX_BACKOFF.as_secs_f64()))
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Network connectivity issues
    Network,
    /// Request timeout
    Timeout,
    /// Too many requests (429)
    TooManyRequests,
    /// Server error (5xx)
    ServerError(u16),
    /// Any other non-success status
    Status(u16),
}

impl TransientError {
    /// Check if a SourceError represents a transient error
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::Timeout => Some(TransientError::Timeout),
            SourceError::Status(429) => Some(TransientError::TooManyRequests),
            SourceError::Status(code) if *code >= 500 => Some(TransientError::ServerError(*code)),
            SourceError::Status(code) => Some(TransientError::Status(*code)),
            _ => None,
        }
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T> {
    /// Operation succeeded
    Success(T),
    /// Operation failed with a transient error on every attempt
    TransientFailure {
        error: SourceError,
        transient: TransientError,
        attempts: u32,
    },
    /// Operation failed with a permanent error
    PermanentFailure { error: SourceError, attempts: u32 },
}

impl<T> RetryResult<T> {
    /// Number of times the operation ran
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RetryResult::Success(_) => None,
            RetryResult::TransientFailure { attempts, .. }
            | RetryResult::PermanentFailure { attempts, .. } => Some(*attempts),
        }
    }

}

/// Execute an async operation with retry logic
///
/// Transient failures are retried up to the configured number of attempts in total,
/// sleeping `backoff_factor ^ attempt` seconds between attempts and never after
/// the last one. Permanent failures return immediately.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> RetryResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let max_attempts = config.max_attempts;
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} transient failures",
                        attempt,
                        attempt - 1
                    );
                }
                return RetryResult::Success(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::from_source_error(&error) else {
                    return RetryResult::PermanentFailure {
                        error,
                        attempts: attempt,
                    };
                };

                if attempt >= max_attempts {
                    tracing::warn!("Operation failed after {} attempts: {}", attempt, error);
                    return RetryResult::TransientFailure {
                        error,
                        transient,
                        attempts: attempt,
                    };
                }

                let delay = config.delay_after(attempt);
                tracing::debug!(
                    "Transient error on attempt {}/{}: {:?}, retrying in {:?}",
                    attempt,
                    max_attempts,
                    transient,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}
