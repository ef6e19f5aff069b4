use anyhow::Result;
use clap::Parser;
use linkwatch::logging::init_logging_with_config;
use linkwatch::server::{Listener, ServerConfig};
use tracing::{error, info};

fn main() {
    // Parse CLI arguments
    let config = ServerConfig::parse();

    // Initialize structured logging with config options
    init_logging_with_config(&config.log_level, config.is_json_format());

    // Validate configuration
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config) {
        error!(error = %e, "Server failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: ServerConfig) -> Result<()> {
    let listener = Listener::bind(&config)?;

    info!(
        address = %listener.local_addr()?,
        auth_required = config.auth_key.is_some(),
        keepalive_ms = config.keepalive_ms,
        max_payload_bytes = config.max_payload_bytes,
        "Linkwatch server listening"
    );

    listener.run()
}
