//! Chat-completion client abstraction and implementations.
//!
//! Defines the [`CompletionClient`] trait and two implementations:
//! - **[`DisabledClient`]**: always fails; used when `llm.provider = "disabled"`.
//! - **[`OpenAiClient`]**: calls `POST {base_url}/chat/completions`.
//!
//! Use [`create_client`] to pick one from configuration:
//!
//! ```rust,no_run
//! # use notesmith::config::LlmConfig;
//! # use notesmith::llm::create_client;
//! let mut config = LlmConfig::default();
//! config.provider = "disabled".to_string();
//! let client = create_client(&config).unwrap();
//! assert_eq!(client.model_name(), "disabled");
//! ```
//!
//! Requests are sent once: there is no retry and no streaming.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("completion API is disabled")]
    Disabled,
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("completion response contained no message content")]
    EmptyResponse,
}

/// Boundary to an external chat-completion API.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-3.5-turbo"`).
    fn model_name(&self) -> &str;

    /// Sends `messages` and returns the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

// ============ Disabled ============

pub struct DisabledClient;

#[async_trait]
impl CompletionClient for DisabledClient {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
}

// ============ OpenAI ============

/// Client for the OpenAI chat completions endpoint, or any server that
/// speaks the same wire format at `base_url`.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Fails if no API key was resolved from `llm.api_key_env`.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let Some(api_key) = config.api_key.clone() else {
            bail!("{} environment variable not set", config.api_key_env);
        };

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Create the [`CompletionClient`] named by `config.provider`.
///
/// | Config Value | Client |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledClient`] |
/// | `"openai"` | [`OpenAiClient`] |
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn CompletionClient>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledClient)),
        "openai" => Ok(Box::new(OpenAiClient::new(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}
