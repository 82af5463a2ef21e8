use crate::config::Config;
use crate::error::CompletionError;
use crate::events::Message;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Anything that can turn a conversation into the next assistant message
pub trait Completer: Clone + Send + Sync + 'static {
    fn complete(
        &self,
        messages: Vec<Message>,
    ) -> impl Future<Output = Result<Message, CompletionError>> + Send;
}

/// Request body sent to the chat completions route
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<serde_json::Value>,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.completions_url(),
            model: config.model.clone(),
            api_key: config.api_key().map(str::to_string),
        }
    }

    /// Send the full conversation and return the first choice's message.
    /// One attempt, no timeout.
    pub async fn request_completion(&self, messages: &[Message]) -> Result<Message, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;

        let payload = CompletionRequest {
            model: &self.model,
            messages,
        };

        debug!("POST {} ({} messages, model {})", self.url, messages.len(), self.model);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/novachat/novachat")
            .header("X-Title", "NovaChat")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("completion endpoint returned {}", status);
            return Err(CompletionError::Status { status, body });
        }

        let body = response.text().await?;
        decode_completion(&body)
    }
}

impl Completer for LlmClient {
    async fn complete(&self, messages: Vec<Message>) -> Result<Message, CompletionError> {
        self.request_completion(&messages).await
    }
}

/// Extract the first choice's message from a completion response body
pub fn decode_completion(body: &str) -> Result<Message, CompletionError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::protocol(format!("body is not a completion object: {}", e)))?;

    let choice = response
        .choices
        .ok_or_else(|| CompletionError::protocol("response has no choices"))?
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::protocol("response has an empty choices list"))?;

    let message = choice
        .message
        .ok_or_else(|| CompletionError::protocol("first choice has no message"))?;

    serde_json::from_value::<Message>(message)
        .map_err(|e| CompletionError::protocol(format!("malformed message: {}", e)))
}
