//! Server role: accepts connections and runs one responder exchange each

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::Listener;
