pub mod config_cmd;
pub mod handle_event;
pub mod run;
pub mod tools;

use devagent_config::AppConfig;
use std::path::Path;

/// Load the config from an explicit path, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        tracing::warn!(
            provider = %config.provider,
            "No API key configured (set DEVAGENT_API_KEY or OPENAI_API_KEY)"
        );
    }
    Ok(config)
}
