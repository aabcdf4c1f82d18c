//! Tools: the actions the model may request.
//!
//! A [`Toolset`] owns both the descriptors offered to the model and the
//! handlers behind them. The [`ToolRegistry`] freezes a toolset at startup,
//! enforces unique names, and acts as the dispatcher: every call comes back
//! as a [`ToolResult`], failures included, so the model can observe and
//! correct its own mistakes.

use crate::error::ToolError;
use crate::message::MessageToolCall;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A request to execute a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Decode a call embedded in an assistant message.
    ///
    /// Arguments that are not valid JSON are kept as a raw string value;
    /// typed argument parsing then rejects them as invalid arguments.
    pub fn from_message(tc: &MessageToolCall) -> Self {
        let arguments = if tc.arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&tc.arguments)
                .unwrap_or_else(|_| serde_json::Value::String(tc.arguments.clone()))
        };
        Self {
            id: tc.id.clone(),
            name: tc.name.clone(),
            arguments,
        }
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content (what the model sees)
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: false,
            output: output.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A closed set of tools: their descriptors and their handlers.
#[async_trait]
pub trait Toolset: Send + Sync {
    /// Descriptors in the order they are offered to the model.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Execute one call. `call.name` is guaranteed to be one of
    /// `definitions()` when invoked through a [`ToolRegistry`].
    async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError>;
}

/// The frozen, ordered registry the agent loop dispatches through.
pub struct ToolRegistry {
    toolset: Box<dyn Toolset>,
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Freeze a toolset. Fails if two descriptors share a name.
    pub fn new(toolset: impl Toolset + 'static) -> std::result::Result<Self, ToolError> {
        let definitions = toolset.definitions();
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.name.as_str()) {
                return Err(ToolError::DuplicateTool(def.name.clone()));
            }
        }
        Ok(Self {
            toolset: Box::new(toolset),
            definitions,
        })
    }

    /// All tool definitions, in registration order (for sending to the LLM).
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Get a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// List all registered tool names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Execute a tool call, surfacing failures as errors.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        if self.get(&call.name).is_none() {
            return Err(ToolError::NotFound(call.name.clone()));
        }
        let mut result = self.toolset.execute(call).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// Execute a tool call and always produce an observation.
    ///
    /// Errors become unsuccessful results whose output is the error text.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        match self.execute(call).await {
            Ok(result) => {
                debug!(tool = %call.name, success = result.success, "Tool finished");
                result
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult {
                    call_id: call.id.clone(),
                    success: false,
                    output: format!("Error: {e}"),
                    data: None,
                }
            }
        }
    }
}
