//! Chat-completion clients used by the summarization pipeline.
//!
//! Both adapters issue plain HTTP requests with `reqwest`: one speaks the OpenAI-compatible
//! `/chat/completions` dialect (Groq, OpenAI, vLLM, ...), the other Ollama's `/api/chat`. The
//! pipeline only sees the [`ChatClient`] trait.

mod ollama;
mod openai;

use crate::config::{Config, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaChatClient;
pub use openai::OpenAiChatClient;

/// Errors surfaced by chat-completion providers.
#[derive(Debug, Error)]
pub enum LlmClientError {
    /// Provider could not be reached or the client could not be built.
    #[error("LLM provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Literal prompt sent as the only user message.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output-token ceiling.
    pub max_tokens: u32,
    /// Ask the provider to constrain the output to a JSON object.
    pub json_response: bool,
}

/// Interface implemented by chat-completion backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Return the trimmed text of the first completion choice.
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmClientError>;
}

/// Build the chat client selected by configuration.
pub fn build_chat_client(config: &Config) -> Result<Arc<dyn ChatClient>, LlmClientError> {
    let http = http_client(Duration::from_secs(config.llm_timeout_secs))?;
    let client: Arc<dyn ChatClient> = match config.llm_provider {
        LlmProvider::OpenAI => {
            let api_key = config.llm_api_key.clone().ok_or_else(|| {
                LlmClientError::ProviderUnavailable("LLM_API_KEY is not set".into())
            })?;
            Arc::new(OpenAiChatClient::new(
                http,
                config.llm_base_url.clone(),
                api_key,
            ))
        }
        LlmProvider::Ollama => Arc::new(OllamaChatClient::new(http, config.llm_base_url.clone())),
    };
    tracing::info!(
        provider = ?config.llm_provider,
        base_url = %config.llm_base_url,
        "Chat client initialized"
    );
    Ok(client)
}

fn http_client(timeout: Duration) -> Result<Client, LlmClientError> {
    Client::builder()
        .user_agent("docdigest/summary")
        .timeout(timeout)
        .build()
        .map_err(|error| {
            LlmClientError::ProviderUnavailable(format!("failed to build HTTP client: {error}"))
        })
}

/// Map a non-success HTTP response to a [`LlmClientError`].
async fn error_for_status(provider: &str, response: reqwest::Response) -> LlmClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::NOT_FOUND {
        LlmClientError::ProviderUnavailable(format!("{provider} endpoint returned 404: {body}"))
    } else {
        LlmClientError::GenerationFailed(format!("{provider} returned {status}: {body}"))
    }
}
