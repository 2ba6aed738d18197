//! Configuration management.
//!
//! Configuration is resolved once at process start and passed explicitly into
//! each component's constructor. Components never read the environment.

mod file_config;

pub use file_config::{
    find_config_file, load_config, save_config, ConfigFileError, CONFIG_FILE_NAME, ENV_PREFIX,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::sources::{SourceError, ARXIV_API_URL};
use crate::utils::RetryConfig;

/// Environment variable holding the Hugging Face access token
pub const HUGGINGFACE_API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

/// Alternative name used by the Hugging Face tooling
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Literature search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Abstract summarization settings
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Insight synthesis settings
    #[serde(default)]
    pub insight: InsightConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        for (name, value) in [
            ("search.base_url", &self.search.base_url),
            ("summarizer.endpoint", &self.summarizer.endpoint),
            ("insight.endpoint", &self.insight.endpoint),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigFileError::Invalid(format!("{}: {} ({})", name, e, value)))?;
        }

        if self.search.max_retries == 0 {
            return Err(ConfigFileError::Invalid(
                "search.max_retries must be at least 1".to_string(),
            ));
        }

        if !(self.search.backoff_factor >= 0.0) {
            return Err(ConfigFileError::Invalid(format!(
                "search.backoff_factor must be non-negative (got {})",
                self.search.backoff_factor
            )));
        }

        if !(0.0..=2.0).contains(&self.insight.temperature) {
            return Err(ConfigFileError::Invalid(format!(
                "insight.temperature must be within 0.0..=2.0 (got {})",
                self.insight.temperature
            )));
        }

        Ok(())
    }
}

/// Literature search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Query endpoint of the search API
    #[serde(default = "default_search_url")]
    pub base_url: String,

    /// Default number of papers to fetch
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Total attempts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff, in seconds
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Abstracts longer than this many characters are cut (0 keeps them whole)
    #[serde(default = "default_abstract_char_limit")]
    pub abstract_char_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_url(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
            max_retries: default_max_retries(),
            backoff_factor: default_backoff_factor(),
            abstract_char_limit: default_abstract_char_limit(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry(&self) -> Result<RetryConfig, SourceError> {
        RetryConfig::new(self.max_retries, self.backoff_factor)
    }
}

fn default_search_url() -> String {
    ARXIV_API_URL.to_string()
}

fn default_max_results() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_abstract_char_limit() -> usize {
    1500
}

/// Summarization model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Whether to use the remote model at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model identifier on the inference service
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// Inference service base URL
    #[serde(default = "default_summarizer_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_summarizer_model(),
            endpoint: default_summarizer_endpoint(),
            timeout_secs: default_inference_timeout(),
        }
    }
}

impl SummarizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_summarizer_model() -> String {
    "facebook/bart-large-cnn".to_string()
}

fn default_summarizer_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

/// Chat-completion model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Whether to use the remote model at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model identifier sent with every request
    #[serde(default = "default_insight_model")]
    pub model: String,

    /// OpenAI-compatible API base URL (the `/chat/completions` path is appended)
    #[serde(default = "default_insight_endpoint")]
    pub endpoint: String,

    /// Completion token budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_insight_model(),
            endpoint: default_insight_endpoint(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_inference_timeout(),
        }
    }
}

impl InsightConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_insight_model() -> String {
    "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string()
}

fn default_insight_endpoint() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.7
}

fn default_inference_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Credentials for the inference services
///
/// Resolved once by the caller (normally `main`) and handed to constructors.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Hugging Face access token, used by both inference stages
    pub huggingface: Option<String>,
}

impl Credentials {
    /// No credentials: every remote capability will be unavailable
    pub fn none() -> Self {
        Self::default()
    }

    /// Use the given Hugging Face token
    pub fn with_huggingface(token: impl Into<String>) -> Self {
        Self {
            huggingface: Some(token.into()),
        }
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Self {
        let huggingface = [HUGGINGFACE_API_KEY_ENV, HF_TOKEN_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());

        Self { huggingface }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("huggingface", &self.huggingface.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.timeout(), Duration::from_secs(10));
        assert_eq!(config.search.retry().unwrap(), RetryConfig::new(3, 2.0).unwrap());
        assert_eq!(config.search.abstract_char_limit, 1500);
        assert_eq!(config.insight.max_tokens, 300);
        assert_eq!(config.insight.temperature, 0.7);
        assert!(config.summarizer.enabled);
        assert_eq!(config.logging.format, LogFormat::Plain);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.search.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigFileError::Invalid(_))));

        let mut config = Config::default();
        config.search.backoff_factor = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.backoff_factor = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.max_retries = 0;
        match config.validate() {
            Err(ConfigFileError::Invalid(msg)) => assert!(msg.contains("search.max_retries")),
            other => panic!("Expected Invalid, got {:?}", other),
        }
        assert!(config.search.retry().is_err());

        let mut config = Config::default();
        config.insight.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let credentials = Credentials::with_huggingface("hf_supersecret");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("hf_supersecret"));
        assert!(debug.contains("redacted"));

        assert!(Credentials::none().huggingface.is_none());
    }
}
