//! Shared test helpers for loop tests.

use datadesk_core::error::ProviderError;
use datadesk_core::message::{ContentBlock, Message, ToolCall};
use datadesk_core::provider::{Provider, ProviderRequest, ProviderResponse, StopReason, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request it was given.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The request sent on call `n` (0-based).
    pub fn request(&self, n: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[n].clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let count = requests.len();

        if count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                count,
                responses.len()
            );
        }

        requests.push(request);
        Ok(responses[count].clone())
    }
}

fn response(blocks: Vec<ContentBlock>, stop_reason: StopReason) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_blocks(blocks),
        stop_reason,
        usage: Some(Usage {
            input_tokens: 10,
            output_tokens: 5,
        }),
        model: "mock-model".into(),
    }
}

/// An end-of-turn response made of the given text blocks.
pub fn make_text_response(parts: &[&str]) -> ProviderResponse {
    response(
        parts
            .iter()
            .map(|t| ContentBlock::Text {
                text: t.to_string(),
            })
            .collect(),
        StopReason::EndTurn,
    )
}

/// A tool-use response carrying the given calls.
pub fn make_tool_call_response(calls: Vec<ToolCall>) -> ProviderResponse {
    response(
        calls.into_iter().map(ContentBlock::ToolCall).collect(),
        StopReason::ToolUse,
    )
}

/// Helper to create a tool call.
pub fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: args.as_object().cloned().unwrap_or_default(),
    }
}
