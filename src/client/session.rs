use crate::client::config::ClientConfig;
use crate::client::error::{ClientError, Result};
use crate::exchange::constants::READ_POLL_INTERVAL;
use crate::exchange::runner::drive;
use crate::exchange::transport::{TransportEvent, WsTransport};
use crate::exchange::Exchange;
use std::net::TcpStream;
use tracing::info;
use tungstenite::stream::MaybeTlsStream;

/// Connect to the server and run an initiator exchange until the
/// connection closes. There is no automatic reconnect: a dropped
/// connection ends the session.
pub fn run(config: &ClientConfig) -> Result<()> {
    let url = config.url();
    info!(url = %url, "Connecting to server");

    let (mut ws, _response) = tungstenite::connect(url.as_str())
        .map_err(|e| ClientError::Socket(format!("Failed to connect to {}: {}", url, e)))?;

    set_poll_timeout(ws.get_ref())?;

    let mut exchange = Exchange::initiator(config.auth_key.clone());
    exchange.handle_event(&mut WsTransport(&mut ws), TransportEvent::Opened);

    drive(&mut ws, &mut exchange, config.keepalive());

    info!(last_round_trip = ?exchange.last_round_trip(), "Session ended");
    Ok(())
}

/// Short read timeout so the keepalive deadline is checked while the
/// socket is idle.
fn set_poll_timeout(stream: &MaybeTlsStream<TcpStream>) -> Result<()> {
    match stream {
        MaybeTlsStream::Plain(tcp) => {
            tcp.set_read_timeout(Some(READ_POLL_INTERVAL))
                .map_err(ClientError::Io)?;
            Ok(())
        }
        _ => Err(ClientError::Socket("unsupported stream type".into())),
    }
}
