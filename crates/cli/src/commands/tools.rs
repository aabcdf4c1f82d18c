//! `devagent tools`: list the tools offered to the model.

use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let registry = devagent_tools::default_registry(&config)?;
    println!("{}", serde_json::to_string_pretty(registry.definitions())?);
    Ok(())
}
