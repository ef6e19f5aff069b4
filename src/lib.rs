//! Linkwatch - persistent-connection link latency watcher
//!
//! This library measures round-trip latency over a persistent WebSocket
//! connection between two symmetric peers (one initiator, one responder),
//! gating all traffic behind an optional shared-key handshake. The protocol
//! engine lives in [`exchange`]; the wire codec in [`protocol`].

pub mod client;
pub mod exchange;
pub mod logging;
pub mod protocol;
pub mod server;
