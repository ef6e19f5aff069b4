//! Exchange protocol engine
//!
//! One [`Exchange`] owns one connection's full lifecycle: it wires transport
//! events to the auth policy and the ping timer, schedules the keepalive, and
//! enforces send-gating. Client and server are indistinguishable once a
//! connection is authenticated; the only asymmetry lives in [`AuthPolicy`].

pub mod auth;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ping;
pub mod runner;
pub mod transport;

pub use auth::{AuthPolicy, Gate, Role};
pub use constants::*;
pub use engine::{Exchange, ExchangeState};
pub use error::{ExchangeError, Result};
pub use ping::PingTimer;
pub use runner::drive;
pub use transport::{Transport, TransportEvent, WsTransport};
