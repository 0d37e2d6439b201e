//! Anthropic Messages API backend for [`Generator`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::generator::{
    ContentBlock, GenerationRequest, GenerationResponse, Generator, Message, StopReason,
    ToolDefinition,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum AnthropicError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com/v1".into(),
        }
    }

    /// Overrides the API base URL, for tests against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_messages_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AnthropicError> {
        let body = MessagesRequest {
            model: Self::MODEL,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: &request.messages,
            tools: &request.tools,
        };

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(Self::REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(AnthropicError::Api { status, message });
        }

        let body = resp.json::<MessagesResponse>().await?;
        Ok(GenerationResponse {
            stop_reason: parse_stop_reason(body.stop_reason.as_deref()),
            content: body.content,
        })
    }
}

impl Generator for AnthropicClient {
    const MODEL: &'static str = "claude-sonnet-4-5-20250929";
    type Error = AnthropicError;

    #[tracing::instrument(skip(self, request), fields(model = Self::MODEL))]
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, Self::Error> {
        self.send_messages_request(&request)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Generation request failed"))
    }
}

fn parse_stop_reason(raw: Option<&str>) -> StopReason {
    match raw {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
    tools: &'a [ToolDefinition],
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(flatten)]
    _rest: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_stop_reasons() {
        assert_eq!(parse_stop_reason(Some("tool_use")), StopReason::ToolUse);
        assert_eq!(parse_stop_reason(Some("max_tokens")), StopReason::MaxTokens);
        assert_eq!(parse_stop_reason(Some("end_turn")), StopReason::EndTurn);
        assert_eq!(parse_stop_reason(None), StopReason::EndTurn);
    }

    #[test]
    fn deserializes_messages_response() {
        let raw = serde_json::json!({
            "id": "msg_01",
            "content": [
                {"type": "text", "text": "hello"},
                {"type": "tool_use", "id": "t1", "name": "search_news", "input": {"query": "q"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });
        let resp: MessagesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.content.len(), 2);
        assert_eq!(resp.stop_reason.as_deref(), Some("tool_use"));
    }
}
