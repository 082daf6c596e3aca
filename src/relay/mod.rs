//! Relay between portal users and an OpenAI-compatible chat-completion API.

mod openai;

pub use openai::{CompletionBackend, CompletionRequest, OpenAiClient};

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the internal virtual assistant of the company portal. \
     Answer politely, objectively and professionally.";
pub const BLOCKED_TOPIC_ANSWER: &str = "This subject is sensitive for the company. \
     Please talk to HR or your manager directly about it.";
pub const FALLBACK_ANSWER: &str = "I could not generate an answer right now. Please try again.";

/// Only this many prior turns are forwarded upstream.
pub const MAX_HISTORY_TURNS: usize = 20;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),
    #[error("chat relay is not configured")]
    NotConfigured,
    #[error("could not build the upstream HTTP client: {0}")]
    Client(String),
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    pub temperature: Option<f32>,
    /// Lowercased topics; a message containing any of them is never relayed.
    pub blocked_topics: Vec<String>,
}

impl RelayConfig {
    /// Parses a comma-separated topic list, lowercasing and dropping blanks.
    pub fn parse_topics(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|topic| topic.trim().to_lowercase())
            .filter(|topic| !topic.is_empty())
            .collect()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: None,
            blocked_topics: Vec::new(),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("blocked_topics", &self.blocked_topics)
            .finish()
    }
}

/// One message in a conversation, in the upstream wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// A user's chat request after the caller has checked who may set what.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
}

pub struct ChatRelay {
    config: RelayConfig,
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl ChatRelay {
    /// Builds the relay. Without an API key every chat request fails with
    /// `NotConfigured`, but the rest of the portal keeps working.
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let backend: Option<Arc<dyn CompletionBackend>> = match &config.api_key {
            Some(key) => Some(Arc::new(OpenAiClient::new(&config.base_url, key)?)),
            None => None,
        };
        Ok(Self { config, backend })
    }

    pub fn with_backend(config: RelayConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            config,
            backend: Some(backend),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn is_blocked(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.config
            .blocked_topics
            .iter()
            .any(|topic| lower.contains(topic.as_str()))
    }

    /// Produces the assistant's answer to `input`.
    pub async fn reply(&self, input: ChatInput) -> Result<String, RelayError> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(RelayError::EmptyMessage);
        }
        let temperature = input.temperature.or(self.config.temperature);
        if let Some(t) = temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(RelayError::InvalidTemperature(t));
            }
        }
        let backend = self.backend.as_ref().ok_or(RelayError::NotConfigured)?;

        if self.is_blocked(message) {
            info!("Chat message matched a blocked topic, not relayed");
            return Ok(BLOCKED_TOPIC_ANSWER.to_string());
        }

        let request = self.build_request(message, input.history, input.system_prompt, temperature);
        let answer = backend.complete(&request).await?;
        Ok(answer.unwrap_or_else(|| FALLBACK_ANSWER.to_string()))
    }

    fn build_request(
        &self,
        message: &str,
        history: Vec<ChatMessage>,
        system_prompt: Option<String>,
        temperature: Option<f32>,
    ) -> CompletionRequest {
        let system_prompt = system_prompt
            .filter(|prompt| !prompt.trim().is_empty())
            .unwrap_or_else(|| self.config.system_prompt.clone());

        // Clients may not smuggle in their own system turns.
        let history: Vec<ChatMessage> = history
            .into_iter()
            .filter(|turn| matches!(turn.role.as_str(), "user" | "assistant"))
            .filter(|turn| !turn.content.trim().is_empty())
            .collect();
        let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);

        let mut messages = Vec::with_capacity(history.len() - skip + 2);
        messages.push(ChatMessage::new("system", system_prompt));
        messages.extend(history.into_iter().skip(skip));
        messages.push(ChatMessage::new("user", message));

        CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
        }
    }
}
