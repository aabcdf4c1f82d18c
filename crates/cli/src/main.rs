//! DevAgent CLI: the main entry point.
//!
//! Commands:
//! - `run`: handle one work item by ID
//! - `handle-event`: handle a queue event read from a file or stdin
//! - `tools`: print the tool descriptors offered to the model
//! - `config`: show the effective (or default) configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "devagent",
    about = "DevAgent: a coding agent driven by work items",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Path to the config file
    #[arg(short, long, global = true, env = "DEVAGENT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent for one work item
    Run {
        /// The work item ID to hand to the agent
        work_item_id: String,
    },

    /// Handle a queue event ({"Records": [...]})
    HandleEvent {
        /// Read the event from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the tool descriptors as JSON
    Tools,

    /// Show configuration
    Config {
        /// Print the default configuration instead of the loaded one
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run { work_item_id } => commands::run::run(config_path, &work_item_id).await?,
        Commands::HandleEvent { file } => {
            commands::handle_event::run(config_path, file.as_deref()).await?
        }
        Commands::Tools => commands::tools::run(config_path)?,
        Commands::Config { default } => commands::config_cmd::show(config_path, default)?,
    }

    Ok(())
}
