use std::io::{Read, Write};
use tracing::{debug, warn};
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::{Message, WebSocket};

/// Outbound half of the transport collaborator contract.
///
/// `send` is fire-and-forget: silently ineffective when the channel is not
/// open, with no queueing and no backpressure. `close` requests a local
/// close with a code/reason pair the peer can distinguish.
pub trait Transport {
    fn send(&mut self, payload: &str);
    fn close(&mut self, code: u16, reason: &str);
}

/// Inbound events delivered to an [`crate::exchange::Exchange`], at most one
/// at a time per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection finished opening (initiator side).
    Opened,
    /// One complete inbound message.
    Message(Vec<u8>),
    /// The connection closed, locally or remotely.
    Closed { code: u16, reason: String },
    /// A transport-level error; by itself non-fatal, teardown is driven by
    /// the close event that follows it.
    Errored(String),
}

/// Adapts a blocking WebSocket to [`Transport`].
pub struct WsTransport<'a, S: Read + Write>(pub &'a mut WebSocket<S>);

impl<S: Read + Write> Transport for WsTransport<'_, S> {
    fn send(&mut self, payload: &str) {
        if !self.0.can_write() {
            debug!("Connection is down, cannot send message");
            return;
        }

        debug!(payload = payload, "Sending message");
        if let Err(e) = self.0.send(Message::text(payload)) {
            warn!(error = %e, "Failed to send message");
        }
    }

    fn close(&mut self, code: u16, reason: &str) {
        debug!(code = code, reason = reason, "Closing connection");
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        if let Err(e) = self.0.close(Some(frame)) {
            debug!(error = %e, "Close request failed");
        }
        // Push the close frame out; the runner drains the peer's reply.
        let _ = self.0.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        pub Transport {}

        impl Transport for Transport {
            fn send(&mut self, payload: &str);
            fn close(&mut self, code: u16, reason: &str);
        }
    }

    #[test]
    fn test_mock_transport_records_send() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|payload| payload.contains("PING"))
            .times(1)
            .return_const(());

        transport.send(r#"{"event":"PING","id":0}"#);
    }
}

#[cfg(test)]
pub use tests::MockTransport;
