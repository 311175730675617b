//! Chat-completion HTTP client with a fixed retry/backoff policy

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{NeedfulError, Result};
use crate::models::{ChatMessage, ChatRole};

/// Maximum number of call attempts per turn
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff unit: the wait before attempt n+1 is `n * RETRY_DELAY_UNIT`
pub const RETRY_DELAY_UNIT: Duration = Duration::from_millis(1000);

/// Substituted when a 2xx response carries no message content
pub const EMPTY_COMPLETION_REPLY: &str =
    "I didn't quite understand that. Could you rephrase your question?";

/// One message on the chat-completion wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        Self {
            role: role.to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the external chat-completion API.
///
/// Model, temperature and max-token budget are fixed configuration of the
/// pipeline, never per-turn inputs.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Build a client from configuration. Returns `None` when no API key
    /// is configured (mock mode).
    pub fn from_config(config: &crate::config::AppConfig) -> Option<Self> {
        let api_key = config.llm_api_key()?;
        Some(Self::new(
            config.llm_endpoint(),
            api_key,
            config.llm_model(),
            config.llm.temperature,
            config.llm.max_tokens,
        ))
    }

    /// Call the chat-completion endpoint, retrying on failure.
    ///
    /// Up to [`MAX_ATTEMPTS`] attempts; after a failed attempt n the loop
    /// sleeps `n * 1000 ms` before retrying. The first 2xx response stops
    /// the loop. The policy is an explicit counter loop so its numeric
    /// contract stays auditable.
    pub async fn chat_completion(&self, messages: &[WireMessage]) -> Result<String> {
        let mut last_error = NeedfulError::LlmApi {
            status: 0,
            message: "no attempts made".to_string(),
        };

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(messages).await {
                Ok(text) => {
                    debug!(attempt, "LLM call succeeded");
                    return Ok(text);
                }
                Err(error) => {
                    warn!(attempt, "LLM call failed: {error}");
                    last_error = error;
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY_UNIT * attempt).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    /// One call attempt, no retries
    async fn attempt(&self, messages: &[WireMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(NeedfulError::LlmRateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NeedfulError::LlmApi {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ChatCompletionResponse = response.json().await?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_else(|| EMPTY_COMPLETION_REPLY.to_string());

        Ok(content)
    }
}
