//! Cross-paper insight synthesis.

use std::sync::Arc;

use crate::config::{Credentials, InsightConfig};
use crate::inference::{
    Capability, ChatBackend, ChatCompletionClient, ChatMessage, ChatRequest, LazyCapability,
};
use crate::utils::take_chars;

/// Returned when there is nothing to analyze
pub const NO_SUMMARIES_MARKER: &str = "No summaries provided for analysis.";

/// Returned when the chat model call fails
pub const INSIGHT_FAILED_MARKER: &str = "Insight generation failed due to an API error.";

/// Prefix of the offline insight
pub const OFFLINE_PREFIX: &str = "Offline insights (fallback): ";

/// Offline insight body when the summaries are blank
pub const OFFLINE_EMPTY: &str = "No content.";

/// Characters of combined summaries kept by the offline insight
pub const OFFLINE_CHAR_BUDGET: usize = 800;

const SUMMARY_SEPARATOR: &str = "\n\n";

const SYSTEM_PROMPT: &str = "You are an expert AI research assistant.";

fn user_prompt(combined: &str) -> String {
    format!(
        "You are an AI research assistant.\n\
         Given the following research paper summaries, identify:\n\
         - The common themes or trends\n\
         - Differences in methodology or findings\n\
         - Overall insights or conclusions\n\
         \n\
         Summaries:\n\
         {}\n\
         \n\
         Provide your insights in a concise, academic paragraph format.",
        combined
    )
}

/// Reduces a set of summaries to one paragraph of insight.
///
/// The chat model is called at most once per [`InsightSynthesizer::synthesize`]
/// call and failures are not retried.
pub struct InsightSynthesizer {
    backend: LazyCapability<Arc<dyn ChatBackend>>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl InsightSynthesizer {
    /// Use the chat endpoint described by `config`, acquired on first use
    pub fn new(config: &InsightConfig, credentials: &Credentials) -> Self {
        let acquire_config = config.clone();
        let credentials = credentials.clone();
        Self::with_capability(
            LazyCapability::new("Insight model", move || {
                ChatCompletionClient::from_config(&acquire_config, &credentials)
                    .map(|c| Arc::new(c) as Arc<dyn ChatBackend>)
            }),
            config,
        )
    }

    /// Always use the offline insight
    pub fn offline() -> Self {
        Self::with_capability(
            LazyCapability::unavailable("Insight model", "offline mode"),
            &InsightConfig::default(),
        )
    }

    /// Use an already constructed backend with the model settings from `config`
    pub fn with_backend(backend: Arc<dyn ChatBackend>, config: &InsightConfig) -> Self {
        Self::with_capability(LazyCapability::available("Insight model", backend), config)
    }

    fn with_capability(backend: LazyCapability<Arc<dyn ChatBackend>>, config: &InsightConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Whether the chat model is usable; acquires it if that has not happened yet
    pub fn is_model_available(&self) -> bool {
        self.backend.get().is_available()
    }

    /// Synthesize one insight from `summaries`
    pub async fn synthesize<S: AsRef<str>>(&self, summaries: &[S]) -> String {
        if summaries.is_empty() {
            return NO_SUMMARIES_MARKER.to_string();
        }

        let combined = summaries
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(SUMMARY_SEPARATOR);

        match self.backend.get() {
            Capability::Available(backend) => {
                let request = self.request(&combined);
                tracing::info!("Generating insight from {} summaries", summaries.len());
                match backend.complete(&request).await {
                    Ok(content) => content.trim().to_string(),
                    Err(err) => {
                        tracing::error!("Insight generation failed: {}", err);
                        INSIGHT_FAILED_MARKER.to_string()
                    }
                }
            }
            Capability::Unavailable(_) => offline_insight(&combined),
        }
    }

    fn request(&self, combined: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt(combined)),
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl std::fmt::Debug for InsightSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightSynthesizer")
            .field("backend", &self.backend)
            .field("model", &self.model)
            .finish()
    }
}

/// Deterministic insight used when no chat model is available
pub fn offline_insight(combined: &str) -> String {
    let snippet = take_chars(combined, OFFLINE_CHAR_BUDGET).trim();
    if snippet.is_empty() {
        format!("{}{}", OFFLINE_PREFIX, OFFLINE_EMPTY)
    } else {
        format!("{}{}", OFFLINE_PREFIX, snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{InferenceError, Role};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct ScriptedChat {
        reply: Option<String>,
        calls: AtomicUsize,
        last: Mutex<Option<ChatRequest>>,
    }

    #[async_trait]
    impl ChatBackend for ScriptedChat {
        async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last.lock() {
                *last = Some(request.clone());
            }
            self.reply.clone().ok_or(InferenceError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_no_summaries() {
        let empty: [&str; 0] = [];
        assert_eq!(InsightSynthesizer::offline().synthesize(&empty).await, NO_SUMMARIES_MARKER);
    }

    #[tokio::test]
    async fn test_backend_reply_is_trimmed() {
        let chat = Arc::new(ScriptedChat {
            reply: Some("  mocked insight  ".into()),
            ..Default::default()
        });
        let synthesizer = InsightSynthesizer::with_backend(chat.clone(), &InsightConfig::default());

        let insight = synthesizer.synthesize(&["Summary A.", "Summary B."]).await;

        assert_eq!(insight, "mocked insight");
        let last = chat.last.lock().unwrap();
        let request = last.as_ref().unwrap();
        assert_eq!(request.model, InsightConfig::default().model);
        assert_eq!(request.max_tokens, 300);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert!(request.messages[1].content.contains("Summary A.\n\nSummary B."));
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_retried() {
        let chat = Arc::new(ScriptedChat::default());
        let synthesizer = InsightSynthesizer::with_backend(chat.clone(), &InsightConfig::default());

        let insight = synthesizer.synthesize(&["Summary."]).await;

        assert_eq!(insight, INSIGHT_FAILED_MARKER);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_offline_insight_truncates() {
        let long = "x".repeat(2000);
        let insight = InsightSynthesizer::offline().synthesize(&[long]).await;

        assert!(insight.starts_with(OFFLINE_PREFIX));
        assert_eq!(insight.len(), OFFLINE_PREFIX.len() + OFFLINE_CHAR_BUDGET);
    }

    #[tokio::test]
    async fn test_offline_insight_blank_summaries() {
        let insight = InsightSynthesizer::offline().synthesize(&["  ", "\n"]).await;
        assert_eq!(insight, format!("{}{}", OFFLINE_PREFIX, OFFLINE_EMPTY));
    }

    #[tokio::test]
    async fn test_offline_insight_is_deterministic() {
        let synthesizer = InsightSynthesizer::offline();
        let summaries = vec!["First.".to_string(), "Second.".to_string()];
        let a = synthesizer.synthesize(&summaries).await;
        let b = synthesizer.synthesize(&summaries).await;
        assert_eq!(a, b);
        assert_eq!(a, "Offline insights (fallback): First.\n\nSecond.");
    }

    #[test]
    fn test_synthesize_from_blocking_caller() {
        let insight = tokio_test::block_on(InsightSynthesizer::offline().synthesize(&["Only one."]));
        assert_eq!(insight, "Offline insights (fallback): Only one.");
    }

    #[test]
    fn test_missing_token_is_unavailable() {
        let synthesizer = InsightSynthesizer::new(&InsightConfig::default(), &Credentials::none());
        assert!(!synthesizer.is_model_available());
    }
}
