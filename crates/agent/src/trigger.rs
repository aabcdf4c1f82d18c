//! Queue trigger adapter.
//!
//! Turns an inbound queue event (`{"Records": [{"body": ...}]}`) into agent
//! runs. Each record body is a JSON document naming the work item to handle.

use crate::loop_runner::{AgentLoop, RunStatus};
use devagent_config::BatchMode;
use devagent_core::error::TriggerError;
use devagent_core::message::Conversation;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// An inbound queue event.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEvent {
    #[serde(rename = "Records")]
    pub records: Vec<QueueRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueRecord {
    pub body: String,
    #[serde(rename = "messageId", default)]
    pub message_id: Option<String>,
}

impl QueueEvent {
    pub fn from_json(raw: &str) -> Result<Self, TriggerError> {
        serde_json::from_str(raw).map_err(|e| TriggerError::InvalidEvent(e.to_string()))
    }
}

/// The seed message for one record.
///
/// The body must be valid JSON. A JSON string is used as its text, anything
/// else in its compact JSON form.
pub fn seed_message(index: usize, record: &QueueRecord) -> Result<String, TriggerError> {
    let body: serde_json::Value =
        serde_json::from_str(&record.body).map_err(|e| TriggerError::InvalidRecord {
            index,
            reason: e.to_string(),
        })?;
    let text = match body {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    Ok(work_item_message(&text))
}

/// The human message that starts a run for a work item.
pub fn work_item_message(work_item: &str) -> String {
    format!("Work item ID received from supervisor: {work_item}")
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Completed { final_answer: String },
    StepLimit { steps: u32 },
    Failed { error: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

/// Per-record outcomes for one event, in record order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    /// No record failed. Skipped and step-limited records do not count as
    /// failures.
    pub fn is_success(&self) -> bool {
        !self
            .records
            .iter()
            .any(|r| matches!(r.outcome, RecordOutcome::Failed { .. }))
    }

    pub fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs the agent once per accepted record.
pub struct TriggerAdapter {
    agent: AgentLoop,
    mode: BatchMode,
}

impl TriggerAdapter {
    pub fn new(agent: AgentLoop, mode: BatchMode) -> Self {
        Self { agent, mode }
    }

    /// Handle one event. Records are processed one after another; a failing
    /// record is reported and does not stop the next.
    pub async fn handle(&self, event: &QueueEvent) -> BatchReport {
        let mut report = BatchReport::default();

        if event.records.is_empty() {
            warn!("Queue event has no records");
            return report;
        }

        let accepted = match self.mode {
            BatchMode::First => 1,
            BatchMode::All => event.records.len(),
        };
        if accepted < event.records.len() {
            warn!(
                dropped = event.records.len() - accepted,
                "Only the first record of the batch is processed"
            );
        }

        for (index, record) in event.records.iter().enumerate() {
            let outcome = if index < accepted {
                self.handle_record(index, record).await
            } else {
                RecordOutcome::Skipped
            };
            report.records.push(RecordReport {
                index,
                message_id: record.message_id.clone(),
                outcome,
            });
        }

        report
    }

    async fn handle_record(&self, index: usize, record: &QueueRecord) -> RecordOutcome {
        let seed = match seed_message(index, record) {
            Ok(seed) => seed,
            Err(e) => {
                error!(index, error = %e, "Rejected queue record");
                return RecordOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };
        info!(
            index,
            message_id = ?record.message_id,
            message = %seed,
            "Message received from supervisor"
        );

        match self.agent.run(Conversation::seeded(seed)).await {
            Ok(outcome) => match outcome.status {
                RunStatus::Completed => {
                    let final_answer = outcome.final_answer().unwrap_or_default().to_string();
                    info!(index, answer = %final_answer, "Record handled");
                    RecordOutcome::Completed { final_answer }
                }
                RunStatus::StepLimitExceeded { steps } => RecordOutcome::StepLimit { steps },
            },
            Err(e) => {
                error!(index, error = %e, "Agent run failed");
                RecordOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
