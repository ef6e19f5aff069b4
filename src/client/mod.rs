//! Client role: opens the connection and runs an initiator exchange

pub mod config;
pub mod error;
pub mod session;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
