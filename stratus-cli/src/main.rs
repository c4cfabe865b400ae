//! # Stratus
//!
//! Run a single compute operation and print the result as JSON.
//!
//! ## Usage
//! ```bash
//! stratus --config ./stratus.yaml list --state RUNNING
//! stratus --config ./stratus.yaml create --group web --name web-1
//! ```

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use stratus_cli::cli::Args;
use stratus_cli::commands;
use stratus_cli::config::{Config, LogFormat, DEFAULT_CONFIG_PATH};
use stratus_compute::mock_strategies;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::load(config_path)?.with_cli_overrides(&args),
        None => match Config::load(DEFAULT_CONFIG_PATH) {
            Ok(cfg) => cfg.with_cli_overrides(&args),
            Err(_) => Config::default().with_cli_overrides(&args),
        },
    };

    // Initialize logging
    match config.log_format {
        LogFormat::Json => stratus_common::init_logging_json(&config.log_level)?,
        LogFormat::Pretty => stratus_common::init_logging(&config.log_level)?,
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        nodes = config.provider.nodes.len(),
        "Starting Stratus"
    );

    let adapter = Arc::new(config.build_adapter()?);
    let store = Arc::new(config.build_credential_store());
    let strategies = mock_strategies(adapter, store);

    match commands::run(&args.command, &strategies).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
