use crate::client::error::{ClientError, Result};
use crate::exchange::constants::DEFAULT_PORT;
use clap::Parser;
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(name = "linkwatch-client")]
#[command(about = "Watches round-trip link latency against a linkwatch server")]
pub struct ClientConfig {
    /// Server address (<host>:<port>) to connect to
    #[arg(long, default_value_t = format!("127.0.0.1:{DEFAULT_PORT}"))]
    pub server: String,

    /// Shared key expected by the server; sent as the first record
    #[arg(long)]
    pub auth_key: Option<String>,

    /// Keepalive interval in milliseconds (one PING per interval)
    #[arg(long, default_value_t = 1000)]
    pub keepalive_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,
}

impl ClientConfig {
    /// WebSocket URL for the configured server address
    pub fn url(&self) -> String {
        format!("ws://{}", self.server)
    }

    /// Returns the configured keepalive interval as a Duration
    pub fn keepalive(&self) -> Duration {
        Duration::from_millis(self.keepalive_ms)
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        if !self.server.contains(':') {
            return Err(ClientError::Config(
                "server must be <host>:<port>".into(),
            ));
        }

        if self.keepalive_ms == 0 {
            return Err(ClientError::Config("keepalive_ms must be > 0".into()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ClientError::Config(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        debug!("Configuration validated successfully");
        Ok(())
    }

    /// Returns true if JSON format logging is enabled
    pub fn is_json_format(&self) -> bool {
        self.log_format.to_lowercase() == "json"
    }
}
