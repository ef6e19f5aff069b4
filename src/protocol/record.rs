use crate::protocol::error::{ProtocolError, Result};
use serde_json::{json, Value};
use tracing::debug;

/// A control record exchanged between peers.
///
/// One JSON object per WebSocket text frame, discriminated by the `event`
/// field. Unknown fields are ignored and unknown `event` values decode as
/// [`Record::Unrecognized`] so the wire format stays forward-compatible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Shared-key credential sent by an initiator as its first record.
    Auth { key: Option<String> },
    /// Keepalive probe; `ts` is informational only (latency is measured
    /// against a local monotonic clock, never by comparing timestamps).
    Ping { id: u64, ts: Option<String> },
    /// Reply to a probe, echoing its `id`.
    Pong { id: u64, ts: Option<String> },
    /// Any record this peer does not understand; logged and dropped by the
    /// dispatcher rather than rejected.
    Unrecognized { event: String },
}

impl Record {
    /// Serialize to a single JSON text frame. Never fails for the known
    /// record shapes.
    pub fn encode(&self) -> String {
        let value = match self {
            Record::Auth { key } => json!({ "event": "AUTH", "key": key }),
            Record::Ping { id, ts } => json!({ "event": "PING", "id": id, "ts": ts }),
            Record::Pong { id, ts } => json!({ "event": "PONG", "id": id, "ts": ts }),
            Record::Unrecognized { event } => json!({ "event": event }),
        };
        value.to_string()
    }

    /// Deserialize one inbound frame.
    ///
    /// Fails with [`ProtocolError::MalformedRecord`] only when the payload is
    /// not a JSON object. There is no schema validation beyond that: a known
    /// event missing a usable `id` classifies as [`Record::Unrecognized`].
    pub fn decode(payload: &[u8]) -> Result<Record> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| ProtocolError::MalformedRecord(e.to_string()))?;

        let obj = value
            .as_object()
            .ok_or_else(|| ProtocolError::MalformedRecord("payload is not an object".into()))?;

        let event = obj
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let record = match event.as_str() {
            "AUTH" => Record::Auth {
                key: obj.get("key").and_then(Value::as_str).map(str::to_string),
            },
            "PING" | "PONG" => match obj.get("id").and_then(Value::as_u64) {
                Some(id) => {
                    let ts = obj.get("ts").and_then(Value::as_str).map(str::to_string);
                    if event == "PING" {
                        Record::Ping { id, ts }
                    } else {
                        Record::Pong { id, ts }
                    }
                }
                None => {
                    debug!(event = %event, "Known event without a usable id");
                    Record::Unrecognized { event }
                }
            },
            _ => Record::Unrecognized { event },
        };

        Ok(record)
    }
}
