//! The DevAgent control loop.
//!
//! The agent follows a **Decide → Act** cycle:
//!
//! 1. **Seed** a conversation with the triggering work item message
//! 2. **Decide**: send the system instruction, the conversation, and every
//!    tool descriptor to the model
//! 3. **Act**: if the model requested tools, run each one in order and append
//!    every result, failures included, then decide again
//! 4. **Done**: the first decision without tool calls ends the run
//!
//! A step budget bounds the cycle. [`TriggerAdapter`] feeds queue events
//! into the loop.

pub mod decision;
pub mod loop_runner;
pub mod trigger;

#[cfg(test)]
pub(crate) mod test_helpers;

use devagent_config::AppConfig;
use devagent_core::error::Result;
use devagent_core::instructions::FileInstructions;
use std::sync::Arc;
use tracing::debug;

pub use decision::DecisionEngine;
pub use loop_runner::{AgentLoop, DEFAULT_MAX_STEPS, RunOutcome, RunStatus};
pub use trigger::{
    BatchReport, QueueEvent, QueueRecord, RecordOutcome, TriggerAdapter, work_item_message,
};

/// Wire up the agent from configuration: the configured provider, the
/// instruction file, and the full tool registry.
pub fn build_agent(config: &AppConfig) -> Result<AgentLoop> {
    let provider = devagent_providers::build_from_config(config);
    let instructions = Arc::new(FileInstructions::new(&config.agent.instruction_file));
    let registry = devagent_tools::default_registry(config)?;

    debug!(
        provider = provider.name(),
        model = %config.model,
        instructions = %config.agent.instruction_file.display(),
        tools = registry.definitions().len(),
        "Building agent"
    );

    let engine = DecisionEngine::new(provider, &config.model, instructions)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

    Ok(AgentLoop::new(engine, Arc::new(registry)).with_max_steps(config.agent.max_steps))
}

/// [`build_agent`] wrapped in a [`TriggerAdapter`] using the configured
/// batch mode.
pub fn build_trigger(config: &AppConfig) -> Result<TriggerAdapter> {
    Ok(TriggerAdapter::new(
        build_agent(config)?,
        config.trigger.batch_mode,
    ))
}
