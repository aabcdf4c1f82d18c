//! One model call per step.

use devagent_core::error::Result;
use devagent_core::instructions::InstructionSource;
use devagent_core::message::Conversation;
use devagent_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use std::sync::Arc;
use tracing::debug;

/// Asks the model what to do next, given the conversation so far.
pub struct DecisionEngine {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    instructions: Arc<dyn InstructionSource>,
}

impl DecisionEngine {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        instructions: Arc<dyn InstructionSource>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            instructions,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Run one decision step.
    ///
    /// The system instruction is loaded again on every call and placed first;
    /// the conversation itself is not modified.
    pub async fn decide(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
    ) -> Result<ProviderResponse> {
        let system_prompt = self.instructions.load()?;

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: conversation.with_system_prompt(&system_prompt),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: tools.to_vec(),
        };

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Requesting decision"
        );

        Ok(self.provider.complete(request).await?)
    }
}
