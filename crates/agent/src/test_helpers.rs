//! Shared test helpers: a scripted provider and response builders.

use devagent_core::error::ProviderError;
use devagent_core::message::{Message, MessageToolCall};
use devagent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses and keeps
/// every request it was sent.
///
/// Each call to `complete` returns the next response in the queue. Once the
/// queue is used up it either repeats the last response (see
/// [`repeating`](Self::repeating)) or fails.
pub struct SequentialMockProvider {
    responses: Vec<ProviderResponse>,
    repeat_last: bool,
    fail: bool,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            repeat_last: false,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `response`.
    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(vec![response])
        }
    }

    /// Every call fails with a server error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);

        if self.fail {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "scripted failure".into(),
            });
        }

        match self.responses.get(index) {
            Some(response) => Ok(response.clone()),
            None if self.repeat_last && !self.responses.is_empty() => {
                Ok(self.responses[self.responses.len() - 1].clone())
            }
            None => Err(ProviderError::ApiError {
                status_code: 500,
                message: format!(
                    "no more scripted responses (call #{index}, have {})",
                    self.responses.len()
                ),
            }),
        }
    }
}

/// A final answer (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A decision requesting the given tool calls.
pub fn make_tool_call_response(calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_with_calls("", calls),
        usage: Some(Usage {
            prompt_tokens: 20,
            completion_tokens: 10,
            total_tokens: 30,
        }),
        model: "mock-model".into(),
    }
}

pub fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: args.to_string(),
    }
}
