use super::{ChatMessage, RelayError};
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Something that can turn a conversation into an answer.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the first choice's trimmed text, or `None` if it was empty.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, RelayError>;
}

/// `POST {base_url}/chat/completions` over reqwest.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, RelayError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completion request failed: {}", e);
                RelayError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Chat completion API returned {}: {}", status, body);
            return Err(RelayError::Upstream(format!("status {}", status.as_u16())));
        }

        let body: CompletionResponse = response.json().await.map_err(|e| {
            error!("Could not decode chat completion response: {}", e);
            RelayError::Upstream(e.to_string())
        })?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty()))
    }
}
