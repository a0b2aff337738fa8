use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::ai::config::AiConfig;
use crate::ai::prompts::Intent;
use crate::error::ApiError;

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

const TEMPERATURE: f32 = 0.2;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatRequestMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Client for an OpenAI-compatible chat completion endpoint.
///
/// One request per call: no retries, no caching.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl ChatClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.gpt_model.clone(),
            url: config
                .openai_chat_url
                .clone()
                .unwrap_or_else(|| OPENAI_CHAT_URL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` and return the trimmed text of the first choice.
    #[instrument(level = "trace", skip_all, fields(intent = intent.as_str()))]
    pub async fn complete(&self, prompt: &str, intent: Intent) -> Result<String, ApiError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: intent.max_tokens(),
            temperature: TEMPERATURE,
        };

        debug!(url = %self.url, model = %self.model, max_tokens = body.max_tokens, "sending chat completion request");

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "chat completion request failed");
                ApiError::upstream("Failed to reach AI service", Some(err.to_string()))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err_text = resp.text().await.unwrap_or_default();
            warn!(%status, "OpenAI API error");
            return Err(ApiError::upstream(
                "AI service returned an error",
                Some(format!("{status}: {err_text}")),
            ));
        }

        let raw = resp.text().await.map_err(|err| {
            ApiError::upstream("Failed to read AI service response", Some(err.to_string()))
        })?;
        let snippet: String = raw.chars().take(200).collect();
        debug!(snippet = %snippet, "chat response body");
        trace!(raw = %raw, "chat response");

        parse_chat_content(&raw)
    }
}

/// Pull the first choice's message text out of a chat completion envelope.
pub fn parse_chat_content(raw: &str) -> Result<String, ApiError> {
    let chat: ChatResponse = serde_json::from_str(raw).map_err(|err| {
        ApiError::upstream("Unexpected AI service response", Some(err.to_string()))
    })?;
    chat.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ApiError::upstream("AI service returned no choices", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ChatClient {
        ChatClient::new(&AiConfig {
            api_key: "k".into(),
            gpt_model: "gpt-test".into(),
            openai_chat_url: Some(format!("{}/v1/chat/completions", server.uri())),
        })
    }

    #[test]
    fn parse_chat_content_takes_first_choice() {
        let raw = r#"{"choices":[{"message":{"content":"  first "}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_chat_content(raw).unwrap(), "first");
    }

    #[test]
    fn parse_chat_content_without_choices_is_upstream_error() {
        let err = parse_chat_content(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ApiError::Upstream { .. }));
    }

    #[tokio::test]
    async fn complete_sends_model_and_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer k"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-test",
                "max_tokens": 300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"choices":[{"message":{"content":"hello"}}]}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .complete("prompt", Intent::QuickAnswer)
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn complete_maps_error_status_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete("prompt", Intent::BatchShelfLife)
            .await
            .unwrap_err();
        match err {
            ApiError::Upstream { detail, .. } => {
                let detail = detail.unwrap();
                assert!(detail.contains("429"));
                assert!(detail.contains("slow down"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
