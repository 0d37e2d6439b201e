use std::sync::{Arc, Mutex};

use news_pulse::{ContentBlock, GenerationRequest, GenerationResponse, Generator, StopReason};
use serde_json::json;

enum Script {
    /// Pop one queued response per call, then fall back to a final text.
    Queued(Mutex<Vec<GenerationResponse>>),
    /// Always ask for another tool call (never terminates on its own).
    AlwaysToolUse,
    Failing(String),
}

#[derive(Clone)]
pub struct MockGenerator {
    script: Arc<Script>,
    pub requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    /// Replies with `responses` in order, then with a plain text reply.
    pub fn scripted(responses: Vec<GenerationResponse>) -> Self {
        let mut queue = responses;
        queue.reverse();
        Self {
            script: Arc::new(Script::Queued(Mutex::new(queue))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replies with a single text response to every call.
    pub fn text(text: &str) -> Self {
        Self::scripted(vec![text_response(text)])
    }

    pub fn always_tool_use() -> Self {
        Self {
            script: Arc::new(Script::AlwaysToolUse),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            script: Arc::new(Script::Failing(msg.to_string())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Generator for MockGenerator {
    const MODEL: &'static str = "mock-model";
    type Error = anyhow::Error;

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, Self::Error> {
        self.requests.lock().unwrap().push(request);

        match self.script.as_ref() {
            Script::Queued(queue) => Ok(queue
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| text_response("fallback reply"))),
            Script::AlwaysToolUse => Ok(GenerationResponse {
                stop_reason: StopReason::ToolUse,
                content: vec![
                    ContentBlock::Text {
                        text: "still searching".into(),
                    },
                    ContentBlock::ToolUse {
                        id: format!("toolu_{}", self.call_count()),
                        name: "search_news".into(),
                        input: json!({"query": "more AI news"}),
                    },
                ],
            }),
            Script::Failing(msg) => Err(anyhow::anyhow!("{}", msg)),
        }
    }
}

pub fn text_response(text: &str) -> GenerationResponse {
    GenerationResponse {
        stop_reason: StopReason::EndTurn,
        content: vec![ContentBlock::Text { text: text.into() }],
    }
}

pub fn tool_use_response(calls: &[(&str, &str)]) -> GenerationResponse {
    GenerationResponse {
        stop_reason: StopReason::ToolUse,
        content: calls
            .iter()
            .map(|(id, query)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: "search_news".into(),
                input: json!({"query": query}),
            })
            .collect(),
    }
}
