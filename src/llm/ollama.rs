use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ChatClient, ChatRequest, LlmClientError, error_for_status};

/// Client for a local Ollama runtime's `/api/chat` endpoint.
pub struct OllamaChatClient {
    http: Client,
    base_url: String,
}

impl OllamaChatClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:11434`).
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[async_trait]
impl ChatClient for OllamaChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmClientError> {
        let mut payload = json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            }
        });
        if request.json_response {
            payload["format"] = json!("json");
        }

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                LlmClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            return Err(error_for_status("Ollama", response).await);
        }

        let body: OllamaChatResponse = response.json().await.map_err(|error| {
            LlmClientError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(LlmClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.message.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(server: &MockServer) -> OllamaChatClient {
        OllamaChatClient::new(
            Client::builder()
                .user_agent("docdigest-test")
                .build()
                .expect("client"),
            server.base_url(),
        )
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "llama3".into(),
            prompt: "Summarize".into(),
            temperature: 0.5,
            max_tokens: 1000,
            json_response: false,
        }
    }

    #[tokio::test]
    async fn handles_successful_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat")
                    .json_body_partial(r#"{ "stream": false, "options": { "num_predict": 1000 } }"#);
                then.status(200).json_body(serde_json::json!({
                    "message": { "role": "assistant", "content": "Summary text\n" },
                    "done": true
                }));
            })
            .await;

        let text = client(&server).complete(request()).await.expect("completion");

        mock.assert_async().await;
        assert_eq!(text, "Summary text");
    }

    #[tokio::test]
    async fn missing_endpoint_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(404).body("not found");
            })
            .await;

        let error = client(&server)
            .complete(request())
            .await
            .expect_err("404");
        assert!(matches!(error, LlmClientError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn incomplete_response_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200).json_body(serde_json::json!({
                    "message": { "role": "assistant", "content": "partial" },
                    "done": false
                }));
            })
            .await;

        let error = client(&server)
            .complete(request())
            .await
            .expect_err("incomplete");
        assert!(matches!(error, LlmClientError::InvalidResponse(_)));
    }
}
