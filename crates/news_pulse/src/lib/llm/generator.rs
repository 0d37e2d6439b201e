//! Text generation abstraction over tool-capable LLM backends.

use std::fmt::Debug;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conversation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single content block within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

/// A conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
}

/// A tool the model may call during generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One generation call: system prompt, conversation so far, available tools.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: u32,
}

/// The model's reply.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl GenerationResponse {
    /// Concatenated text blocks, None when the reply carries no text.
    pub fn text(&self) -> Option<String> {
        let text: Vec<&str> = self
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text.join("\n"))
        }
    }

    /// Tool invocations requested in this reply, in order.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }
}

/// Tool-capable text generation backend.
pub trait Generator {
    const MODEL: &'static str;
    type Error: Debug;

    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResponse, Self::Error>> + Send;
}

impl<T: Generator + Send + Sync> Generator for &T {
    const MODEL: &'static str = T::MODEL;
    type Error = T::Error;

    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResponse, Self::Error>> + Send {
        (*self).generate(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_blocks_serialize_with_type_tag() {
        let block = ContentBlock::ToolUse {
            id: "toolu_01".into(),
            name: "search_news".into(),
            input: json!({"query": "AI news", "count": 10}),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        assert_eq!(value["name"], "search_news");
        assert_eq!(value["input"]["count"], 10);
    }

    #[test]
    fn tool_result_round_trips() {
        let raw = json!({
            "type": "tool_result",
            "tool_use_id": "toolu_01",
            "content": "1. \"Some headline\" - details"
        });
        let block: ContentBlock = serde_json::from_value(raw).unwrap();
        assert_eq!(
            block,
            ContentBlock::ToolResult {
                tool_use_id: "toolu_01".into(),
                content: "1. \"Some headline\" - details".into(),
            }
        );
    }

    #[test]
    fn response_text_joins_blocks_and_skips_tool_uses() {
        let response = GenerationResponse {
            stop_reason: StopReason::EndTurn,
            content: vec![
                ContentBlock::Text { text: "first".into() },
                ContentBlock::ToolUse {
                    id: "t1".into(),
                    name: "search_news".into(),
                    input: json!({}),
                },
                ContentBlock::Text { text: "second".into() },
            ],
        };
        assert_eq!(response.text().as_deref(), Some("first\nsecond"));
        assert_eq!(response.tool_uses().len(), 1);
    }

    #[test]
    fn response_without_text_yields_none() {
        let response = GenerationResponse {
            stop_reason: StopReason::ToolUse,
            content: vec![ContentBlock::ToolUse {
                id: "t1".into(),
                name: "search_news".into(),
                input: json!({"query": "q"}),
            }],
        };
        assert!(response.text().is_none());
    }
}
