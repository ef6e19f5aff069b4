use crate::exchange::engine::Exchange;
use crate::exchange::transport::{TransportEvent, WsTransport};
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use tracing::debug;
use tungstenite::{Error, Message, WebSocket};

/// Drive one exchange over one blocking WebSocket until it closes.
///
/// Runs on the connection's own thread: reads poll with a short timeout (set
/// by the caller on the underlying stream) so the keepalive deadline is
/// checked between frames. All exchange handling happens here, which gives
/// the strict per-connection serialization the engine relies on.
pub fn drive<S: Read + Write>(ws: &mut WebSocket<S>, exchange: &mut Exchange, keepalive: Duration) {
    let mut next_tick = Instant::now() + keepalive;

    while !exchange.is_closed() {
        match ws.read() {
            Ok(Message::Text(text)) => {
                exchange.handle_event(
                    &mut WsTransport(ws),
                    TransportEvent::Message(text.into_bytes()),
                );
            }
            Ok(Message::Binary(data)) => {
                exchange.handle_event(&mut WsTransport(ws), TransportEvent::Message(data));
            }
            // WebSocket-level ping/pong is transport plumbing, not protocol
            // traffic; tungstenite already answered it.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(frame)) => {
                let (code, reason) = frame
                    .map(|f| (u16::from(f.code), f.reason.into_owned()))
                    .unwrap_or((1005, String::new())); // 1005: no status received
                exchange.handle_event(
                    &mut WsTransport(ws),
                    TransportEvent::Closed { code, reason },
                );
            }
            // Raw frames never surface from read() outside manual mode.
            Ok(Message::Frame(_)) => {}
            Err(Error::Io(e))
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
            {
                // Poll timeout; fall through to the keepalive check.
            }
            Err(Error::ConnectionClosed) | Err(Error::AlreadyClosed) => {
                exchange.handle_event(
                    &mut WsTransport(ws),
                    TransportEvent::Closed {
                        code: 1006, // abnormal closure
                        reason: String::new(),
                    },
                );
            }
            Err(e) => {
                // The peer will not deliver a close frame after a hard
                // error, so synthesize the close that follows it.
                exchange.handle_event(
                    &mut WsTransport(ws),
                    TransportEvent::Errored(e.to_string()),
                );
                exchange.handle_event(
                    &mut WsTransport(ws),
                    TransportEvent::Closed {
                        code: 1006,
                        reason: String::new(),
                    },
                );
            }
        }

        if exchange.is_closed() {
            break;
        }

        let now = Instant::now();
        if now >= next_tick {
            exchange.handle_tick(&mut WsTransport(ws));
            next_tick = now + keepalive;
        }
    }

    drain_close(ws);
}

/// Complete the close handshake after a locally-initiated close, bounded so
/// an unresponsive peer cannot hold the thread.
fn drain_close<S: Read + Write>(ws: &mut WebSocket<S>) {
    let deadline = Instant::now() + Duration::from_secs(1);

    while Instant::now() < deadline {
        match ws.read() {
            Ok(_) => {}
            Err(Error::Io(e))
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
            Err(e) => {
                debug!(error = %e, "Close handshake finished");
                return;
            }
        }
    }
}
