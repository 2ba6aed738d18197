//! Per-paper summarization with an offline extractive fallback.

use std::sync::Arc;

use crate::config::{Credentials, SummarizerConfig};
use crate::inference::{
    Capability, HuggingFaceSummarizer, InferenceError, LazyCapability, SummarizationBackend,
    SummarizationRequest,
};
use crate::utils::{word_count, ELLIPSIS};

/// Returned for empty or whitespace-only input
pub const NO_TEXT_MARKER: &str = "No text provided for summarization.";

/// Returned when the model answers with nothing
pub const EMPTY_SUMMARY_MARKER: &str = "Summary could not be generated (empty result).";

/// Word budget of the extractive fallback
pub const FALLBACK_WORDS: usize = 60;

const MAX_LENGTH_FLOOR: usize = 40;
const MAX_LENGTH_CEILING: usize = 130;
const MIN_LENGTH_FLOOR: usize = 20;

type OverrideFn = Arc<dyn Fn(&str) -> Result<String, InferenceError> + Send + Sync>;

/// Reduces one abstract to a short summary.
///
/// [`Summarizer::summarize`] never fails. In order of preference it uses a
/// caller-supplied override, the remote model, then [`extractive_summary`].
pub struct Summarizer {
    override_fn: Option<OverrideFn>,
    backend: LazyCapability<Arc<dyn SummarizationBackend>>,
}

impl Summarizer {
    /// Use the Hugging Face model described by `config`, acquired on first use
    pub fn new(config: &SummarizerConfig, credentials: &Credentials) -> Self {
        let config = config.clone();
        let credentials = credentials.clone();
        Self {
            override_fn: None,
            backend: LazyCapability::new("Summarization model", move || {
                HuggingFaceSummarizer::from_config(&config, &credentials)
                    .map(|s| Arc::new(s) as Arc<dyn SummarizationBackend>)
            }),
        }
    }

    /// Always use the extractive fallback
    pub fn offline() -> Self {
        Self {
            override_fn: None,
            backend: LazyCapability::unavailable("Summarization model", "offline mode"),
        }
    }

    /// Use an already constructed backend
    pub fn with_backend(backend: Arc<dyn SummarizationBackend>) -> Self {
        Self {
            override_fn: None,
            backend: LazyCapability::available("Summarization model", backend),
        }
    }

    /// Route every summary through `f` instead of the model.
    ///
    /// If `f` fails the extractive fallback is used.
    pub fn with_override<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, InferenceError> + Send + Sync + 'static,
    {
        self.override_fn = Some(Arc::new(f));
        self
    }

    /// Whether the remote model is usable; acquires it if that has not happened yet
    pub fn is_model_available(&self) -> bool {
        self.backend.get().is_available()
    }

    /// Summarize `text`
    pub async fn summarize(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return NO_TEXT_MARKER.to_string();
        }

        if let Some(override_fn) = &self.override_fn {
            return match override_fn(text) {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::warn!("Summary override failed: {}; using extractive fallback", err);
                    extractive_summary(text)
                }
            };
        }

        if let Capability::Available(backend) = self.backend.get() {
            let (max_length, min_length) = adaptive_bounds(word_count(text));
            let request = SummarizationRequest {
                text: text.to_string(),
                max_length,
                min_length,
                do_sample: false,
            };

            match backend.summarize(&request).await {
                Ok(summary) => {
                    let summary = summary.trim();
                    return if summary.is_empty() {
                        EMPTY_SUMMARY_MARKER.to_string()
                    } else {
                        summary.to_string()
                    };
                }
                Err(err) => {
                    tracing::warn!("Summarization failed: {}; using extractive fallback", err);
                }
            }
        }

        extractive_summary(text)
    }
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("override", &self.override_fn.is_some())
            .field("backend", &self.backend)
            .finish()
    }
}

/// `(max_length, min_length)` for an input of `words` words.
///
/// `max_length` is 80% of the input clamped to 40..=130; `min_length` is 40%
/// of that, at least 20.
pub fn adaptive_bounds(words: usize) -> (usize, usize) {
    let max_length = ((words as f64 * 0.8) as usize).clamp(MAX_LENGTH_FLOOR, MAX_LENGTH_CEILING);
    let min_length = ((max_length as f64 * 0.4) as usize).max(MIN_LENGTH_FLOOR);
    (max_length, min_length)
}

/// Deterministic summary used when no model is available.
///
/// The first two sentences when the text has at least two, otherwise the first
/// [`FALLBACK_WORDS`] words with [`ELLIPSIS`] appended if anything was dropped.
pub fn extractive_summary(text: &str) -> String {
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.len() >= 2 {
        return format!("{}.", sentences[..2].join(". "));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > FALLBACK_WORDS {
        format!("{}{}", words[..FALLBACK_WORDS].join(" "), ELLIPSIS)
    } else {
        words.join(" ")
    }
}
