//! The agent control loop: decide, act, repeat until the model stops asking
//! for tools.

use crate::decision::DecisionEngine;
use chrono::Utc;
use devagent_core::error::Result;
use devagent_core::event::{DomainEvent, EventBus};
use devagent_core::message::{Conversation, Message, MessageToolCall};
use devagent_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Decision steps allowed per run unless configured otherwise.
pub const DEFAULT_MAX_STEPS: u32 = 25;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The model answered without requesting tools.
    Completed,
    /// The step budget ran out first.
    StepLimitExceeded { steps: u32 },
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::StepLimitExceeded { .. } => "step_limit_exceeded",
        }
    }
}

/// The final conversation and how the run ended.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub conversation: Conversation,
    pub status: RunStatus,
}

impl RunOutcome {
    /// The model's closing message, if the run completed.
    pub fn final_answer(&self) -> Option<&str> {
        match self.status {
            RunStatus::Completed => self.conversation.last().map(|m| m.content.as_str()),
            RunStatus::StepLimitExceeded { .. } => None,
        }
    }
}

enum LoopState {
    Deciding,
    Acting(Vec<MessageToolCall>),
    Done,
}

/// Drives one conversation to completion.
pub struct AgentLoop {
    engine: DecisionEngine,
    tools: Arc<ToolRegistry>,
    max_steps: u32,
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    pub fn new(engine: DecisionEngine, tools: Arc<ToolRegistry>) -> Self {
        Self {
            engine,
            tools,
            max_steps: DEFAULT_MAX_STEPS,
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Set the maximum number of decision steps per run.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop over a conversation seeded with the triggering message.
    ///
    /// Tool failures are appended as observations and never end the run.
    /// Model and instruction failures do, and are returned as errors.
    pub async fn run(&self, mut conversation: Conversation) -> Result<RunOutcome> {
        let conversation_id = conversation.id.to_string();
        info!(
            conversation_id = %conversation_id,
            messages = conversation.len(),
            max_steps = self.max_steps,
            "Agent run started"
        );
        self.event_bus.publish(DomainEvent::RunStarted {
            conversation_id: conversation_id.clone(),
            timestamp: Utc::now(),
        });

        let mut steps = 0;
        let mut state = LoopState::Deciding;

        let status = loop {
            state = match state {
                LoopState::Deciding => {
                    if steps >= self.max_steps {
                        warn!(
                            conversation_id = %conversation_id,
                            steps,
                            "Step limit reached before the model finished"
                        );
                        break RunStatus::StepLimitExceeded { steps };
                    }
                    steps += 1;

                    let response = match self
                        .engine
                        .decide(&conversation, self.tools.definitions())
                        .await
                    {
                        Ok(response) => response,
                        Err(e) => {
                            warn!(
                                conversation_id = %conversation_id,
                                step = steps,
                                error = %e,
                                "Decision failed"
                            );
                            self.publish_finished(&conversation_id, "failed", steps);
                            return Err(e);
                        }
                    };

                    let calls = response.message.tool_calls.clone();
                    debug!(
                        conversation_id = %conversation_id,
                        step = steps,
                        tool_calls = calls.len(),
                        "Decision received"
                    );
                    self.event_bus.publish(DomainEvent::DecisionMade {
                        conversation_id: conversation_id.clone(),
                        step: steps,
                        model: response.model.clone(),
                        tool_calls: calls.len(),
                        tokens_used: response.usage.map(|u| u.total_tokens),
                        timestamp: Utc::now(),
                    });

                    conversation.push(response.message);
                    if calls.is_empty() {
                        LoopState::Done
                    } else {
                        LoopState::Acting(calls)
                    }
                }

                LoopState::Acting(calls) => {
                    for tc in &calls {
                        let call = ToolCall::from_message(tc);
                        let started = Instant::now();
                        let result = self.tools.dispatch(&call).await;

                        self.event_bus.publish(DomainEvent::ToolExecuted {
                            tool_name: call.name.clone(),
                            success: result.success,
                            duration_ms: started.elapsed().as_millis() as u64,
                            timestamp: Utc::now(),
                        });
                        conversation.push(Message::tool_result(&tc.id, result.output));
                    }
                    LoopState::Deciding
                }

                LoopState::Done => break RunStatus::Completed,
            };
        };

        info!(
            conversation_id = %conversation_id,
            status = status.as_str(),
            steps,
            messages = conversation.len(),
            "Agent run finished"
        );
        self.publish_finished(&conversation_id, status.as_str(), steps);

        Ok(RunOutcome {
            conversation,
            status,
        })
    }

    fn publish_finished(&self, conversation_id: &str, status: &str, steps: u32) {
        self.event_bus.publish(DomainEvent::RunFinished {
            conversation_id: conversation_id.to_string(),
            status: status.to_string(),
            steps,
            timestamp: Utc::now(),
        });
    }
}
