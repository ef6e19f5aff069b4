use std::time::Duration;

/// Default interval between keepalive ticks; each tick emits one PING while
/// the connection is ready and authenticated.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(1);

/// Read-poll timeout for the per-connection loop. Bounds how late a
/// keepalive tick can fire while the socket is idle.
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// WebSocket close code used for locally-initiated protocol closes
/// (1008, "policy violation") with a distinguishing reason string.
pub const CLOSE_POLICY_VIOLATION: u16 = 1008;

/// Close reason for a payload that is not a JSON object.
pub const CLOSE_REASON_MALFORMED: &str = "protocol error: malformed record";

/// Close reason for a missing or incorrect shared key.
pub const CLOSE_REASON_AUTH: &str = "authentication failed";

/// Default TCP port for the responder.
pub const DEFAULT_PORT: u16 = 29873;

/// Default cap on a single inbound message, enforced by the transport layer.
/// Compression stays off so payload sizes reflect the link under test.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 2 * 1024 * 1024;
