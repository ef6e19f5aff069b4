use anyhow::Result;
use clap::Parser;
use linkwatch::client::{session, ClientConfig};
use linkwatch::logging::init_logging_with_config;
use tracing::error;

fn main() {
    // Parse CLI arguments
    let config = ClientConfig::parse();

    // Initialize structured logging with config options
    init_logging_with_config(&config.log_level, config.is_json_format());

    // Validate configuration
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&config) {
        error!(error = %e, "Client failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &ClientConfig) -> Result<()> {
    session::run(config)?;
    Ok(())
}
