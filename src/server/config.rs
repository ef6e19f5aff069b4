//! Server configuration module
//!
//! Provides CLI argument parsing and validation for the linkwatch server.

use crate::exchange::constants::{DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_PORT};
use clap::Parser;
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(name = "linkwatch-server")]
#[command(about = "Accepts linkwatch clients and answers their latency probes")]
pub struct ServerConfig {
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Bind port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// If set, every client must supply this key in its first record or be
    /// disconnected
    #[arg(long)]
    pub auth_key: Option<String>,

    /// Cap on a single inbound message, enforced by the transport
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD_BYTES)]
    pub max_payload_bytes: usize,

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

impl ServerConfig {
    /// Returns the full bind address as a string (bind:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Returns the configured keepalive interval as a Duration
    pub fn keepalive(&self) -> Duration {
        Duration::from_millis(self.keepalive_ms)
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<(), String> {
        debug!("Validating server configuration");

        if self.port == 0 {
            return Err("port must be > 0".into());
        }

        if self.max_payload_bytes == 0 {
            return Err("max_payload_bytes must be > 0".into());
        }

        if self.keepalive_ms == 0 {
            return Err("keepalive_ms must be > 0".into());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            ));
        }

        debug!("Server configuration validated successfully");
        Ok(())
    }

    /// Returns true if JSON format logging is enabled
    pub fn is_json_format(&self) -> bool {
        self.log_format.to_lowercase() == "json"
    }
}
