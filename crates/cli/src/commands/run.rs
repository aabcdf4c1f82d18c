//! `devagent run`: handle a single work item.

use devagent_agent::{RunStatus, work_item_message};
use devagent_core::message::Conversation;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    work_item_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let agent = devagent_agent::build_agent(&config).map_err(|e| e.to_string())?;

    let seed = Conversation::seeded(work_item_message(work_item_id.trim()));
    let outcome = agent.run(seed).await.map_err(|e| e.to_string())?;

    match outcome.status {
        RunStatus::Completed => {
            println!("{}", outcome.final_answer().unwrap_or_default());
            Ok(())
        }
        RunStatus::StepLimitExceeded { steps } => Err(format!(
            "Agent stopped after {steps} steps without finishing (agent.max_steps = {})",
            config.agent.max_steps
        )
        .into()),
    }
}
