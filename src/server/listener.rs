use crate::exchange::constants::READ_POLL_INTERVAL;
use crate::exchange::runner::drive;
use crate::exchange::Exchange;
use crate::server::config::ServerConfig;
use anyhow::Result;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;
use tracing::{error, info, info_span, warn};
use tungstenite::protocol::WebSocketConfig;

/// Accepts connections and hands each one to a responder exchange on its
/// own thread. Connections are fully independent; the only shared state is
/// the configuration, read-only after startup.
pub struct Listener {
    listener: TcpListener,
    secret: Option<String>,
    keepalive: Duration,
    max_payload_bytes: usize,
}

impl Listener {
    /// Bind the TCP listener for the configured address.
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = config.address();

        let listener = TcpListener::bind(&addr).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                anyhow::anyhow!(
                    "Failed to bind to {}: Address already in use. Try a different port or ensure no other process is using it.",
                    addr
                )
            } else {
                anyhow::Error::new(e).context(format!("Failed to bind to {}", addr))
            }
        })?;

        Ok(Self {
            listener,
            secret: config.auth_key.clone(),
            keepalive: config.keepalive(),
            max_payload_bytes: config.max_payload_bytes,
        })
    }

    /// The bound local address (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. Each connection gets the next numeric id,
    /// used only for log correlation.
    pub fn run(&self) -> Result<()> {
        let mut next_connection_id = 0u64;

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let id = next_connection_id;
                    next_connection_id += 1;

                    let peer = stream.peer_addr().ok();
                    info!(connection = id, peer = ?peer, "Client connected");

                    let secret = self.secret.clone();
                    let keepalive = self.keepalive;
                    let max_payload_bytes = self.max_payload_bytes;

                    thread::spawn(move || {
                        if let Err(e) =
                            handle_connection(stream, id, secret, keepalive, max_payload_bytes)
                        {
                            warn!(connection = id, error = %e, "Connection handler failed");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }

        Ok(())
    }
}

/// One connection, start to finish, on the calling thread.
fn handle_connection(
    stream: TcpStream,
    id: u64,
    secret: Option<String>,
    keepalive: Duration,
    max_payload_bytes: usize,
) -> Result<()> {
    let span = info_span!("conn", id = id);
    let _guard = span.enter();

    // Cap the payload for some protection against hostile clients. No
    // per-message compression: payload sizes must reflect the link under
    // test. (tungstenite does not compress.)
    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = Some(max_payload_bytes);
    ws_config.max_frame_size = Some(max_payload_bytes);

    let mut ws = tungstenite::accept_with_config(stream, Some(ws_config))
        .map_err(|e| anyhow::anyhow!("WebSocket handshake failed: {}", e))?;

    ws.get_ref().set_read_timeout(Some(READ_POLL_INTERVAL))?;

    let mut exchange = Exchange::responder(secret, id);
    drive(&mut ws, &mut exchange, keepalive);

    info!("Client disconnected");
    Ok(())
}
