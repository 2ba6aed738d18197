//! OpenAI-compatible chat-completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_for_status, InferenceError};
use crate::config::{Credentials, InsightConfig, HUGGINGFACE_API_KEY_ENV};
use crate::utils::HttpClient;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat-completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A chat-completion capability
#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    /// Run the conversation and return the generated text
    async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {endpoint}/chat/completions`
#[derive(Clone)]
pub struct ChatCompletionClient {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl ChatCompletionClient {
    pub fn new(
        client: HttpClient,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Build from configuration, failing when the stage is disabled or no token is set
    pub fn from_config(
        config: &InsightConfig,
        credentials: &Credentials,
    ) -> Result<Self, InferenceError> {
        if !config.enabled {
            return Err(InferenceError::Unavailable(
                "insight generation disabled in configuration".to_string(),
            ));
        }

        let api_key = credentials.huggingface.clone().ok_or_else(|| {
            InferenceError::Unavailable(format!("{} not set", HUGGINGFACE_API_KEY_ENV))
        })?;

        Ok(Self::new(
            HttpClient::new()?,
            &config.endpoint,
            api_key,
            config.timeout(),
        ))
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatBackend for ChatCompletionClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError> {
        tracing::debug!(
            "Requesting chat completion from {} ({} messages, max_tokens={})",
            request.model,
            request.messages.len(),
            request.max_tokens
        );

        let response = self
            .client
            .post(&self.url())
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        let body: ChatCompletionResponse = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| InferenceError::Parse(format!("chat completion response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InferenceError::Parse("response contained no message content".to_string()))
    }
}
