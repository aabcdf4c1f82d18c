//! `devagent handle-event`: process a queue event.

use devagent_agent::QueueEvent;
use std::path::Path;
use tokio::io::AsyncReadExt;

pub async fn run(
    config_path: Option<&Path>,
    file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let event = QueueEvent::from_json(&raw).map_err(|e| e.to_string())?;
    let config = super::load_config(config_path)?;
    let trigger = devagent_agent::build_trigger(&config).map_err(|e| e.to_string())?;

    let report = trigger.handle(&event).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.is_success() {
        Ok(())
    } else {
        Err("One or more records failed".into())
    }
}
