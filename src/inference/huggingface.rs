//! Hugging Face hosted summarization model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_for_status, InferenceError};
use crate::config::{Credentials, SummarizerConfig, HUGGINGFACE_API_KEY_ENV};
use crate::utils::HttpClient;

/// Input for one summarization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizationRequest {
    pub text: String,
    /// Upper bound on the summary length, in model tokens
    pub max_length: usize,
    /// Lower bound on the summary length, in model tokens
    pub min_length: usize,
    /// Sample instead of decoding deterministically
    pub do_sample: bool,
}

/// A text summarization capability
#[async_trait]
pub trait SummarizationBackend: Send + Sync + std::fmt::Debug {
    /// Summarize the request text. An empty string means the model produced nothing.
    async fn summarize(&self, request: &SummarizationRequest) -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Parameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Summarization through the Hugging Face inference API
///
/// POSTs `{"inputs", "parameters"}` to `{endpoint}/models/{model}` and reads
/// `[{"summary_text": ...}]` back.
#[derive(Clone)]
pub struct HuggingFaceSummarizer {
    client: HttpClient,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl HuggingFaceSummarizer {
    pub fn new(
        client: HttpClient,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Build from configuration, failing when the stage is disabled or no token is set
    pub fn from_config(
        config: &SummarizerConfig,
        credentials: &Credentials,
    ) -> Result<Self, InferenceError> {
        if !config.enabled {
            return Err(InferenceError::Unavailable(
                "summarization disabled in configuration".to_string(),
            ));
        }

        let api_key = credentials.huggingface.clone().ok_or_else(|| {
            InferenceError::Unavailable(format!("{} not set", HUGGINGFACE_API_KEY_ENV))
        })?;

        let client = HttpClient::new()?;
        Ok(Self::new(
            client,
            &config.endpoint,
            &config.model,
            api_key,
            config.timeout(),
        ))
    }

    fn url(&self) -> String {
        format!("{}/models/{}", self.endpoint.trim_end_matches('/'), self.model)
    }
}

impl std::fmt::Debug for HuggingFaceSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceSummarizer")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SummarizationBackend for HuggingFaceSummarizer {
    async fn summarize(&self, request: &SummarizationRequest) -> Result<String, InferenceError> {
        let payload = Payload {
            inputs: &request.text,
            parameters: Parameters {
                max_length: request.max_length,
                min_length: request.min_length,
                do_sample: request.do_sample,
            },
        };

        tracing::debug!(
            "Summarizing {} chars with {} (max_length={}, min_length={})",
            request.text.len(),
            self.model,
            request.max_length,
            request.min_length
        );

        let response = self
            .client
            .post(&self.url())
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let outputs: Vec<SummaryOutput> = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| InferenceError::Parse(format!("summarization response: {}", e)))?;

        Ok(outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .unwrap_or_default())
    }
}
