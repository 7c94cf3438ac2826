use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ChatClient, ChatRequest, LlmClientError, error_for_status};

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiChatClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiChatClient {
    /// Create a client for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmClientError> {
        let mut payload = json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if request.json_response {
            payload["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                LlmClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            return Err(error_for_status("Chat completions API", response).await);
        }

        let body: CompletionResponse = response.json().await.map_err(|error| {
            LlmClientError::InvalidResponse(format!("failed to decode completion: {error}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| LlmClientError::InvalidResponse("completion has no content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn request(json_response: bool) -> ChatRequest {
        ChatRequest {
            model: "llama3-8b-8192".into(),
            prompt: "Summarize this".into(),
            temperature: 0.5,
            max_tokens: 800,
            json_response,
        }
    }

    fn client(server: &MockServer) -> OpenAiChatClient {
        OpenAiChatClient::new(
            Client::builder()
                .user_agent("docdigest-test")
                .build()
                .expect("client"),
            format!("{}/v1/", server.base_url()),
            "secret".into(),
        )
    }

    #[tokio::test]
    async fn sends_single_user_message_and_trims_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer secret")
                    .json_body_partial(
                        r#"{
                            "model": "llama3-8b-8192",
                            "messages": [{ "role": "user", "content": "Summarize this" }],
                            "max_tokens": 800
                        }"#,
                    );
                then.status(200).json_body(serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": "  Summary:\n• a \n" } }]
                }));
            })
            .await;

        let text = client(&server)
            .complete(request(false))
            .await
            .expect("completion");

        mock.assert_async().await;
        assert_eq!(text, "Summary:\n• a");
    }

    #[tokio::test]
    async fn requests_json_mode_when_asked() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .json_body_partial(r#"{ "response_format": { "type": "json_object" } }"#);
                then.status(200).json_body(serde_json::json!({
                    "choices": [{ "message": { "content": "{}" } }]
                }));
            })
            .await;

        client(&server)
            .complete(request(true))
            .await
            .expect("completion");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_generation_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let error = client(&server)
            .complete(request(false))
            .await
            .expect_err("error response");
        assert!(
            matches!(error, LlmClientError::GenerationFailed(ref message) if message.contains("429"))
        );
    }

    #[tokio::test]
    async fn empty_choices_are_invalid() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(serde_json::json!({ "choices": [] }));
            })
            .await;

        let error = client(&server)
            .complete(request(false))
            .await
            .expect_err("no choices");
        assert!(matches!(error, LlmClientError::InvalidResponse(_)));
    }
}
