use crate::exchange::auth::{AuthPolicy, Gate, Role};
use crate::exchange::constants::{
    CLOSE_POLICY_VIOLATION, CLOSE_REASON_AUTH, CLOSE_REASON_MALFORMED,
};
use crate::exchange::ping::PingTimer;
use crate::exchange::transport::{Transport, TransportEvent};
use crate::protocol::Record;
use colored::Colorize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of one connection. Terminal once `Closed`; a fresh exchange
/// must be created for each physical connection attempt.
///
/// An exchange only exists once its transport does, so there is no
/// pre-connection idle state to represent: an initiator is born
/// `Connecting`, a responder is born active (the socket is already open
/// when the accepted connection is handed over).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Connecting,
    ActiveUnauthenticated,
    ActiveAuthenticated,
    Closed,
}

/// Protocol engine for one connection.
///
/// Owns the auth policy and the ping timer, consumes transport events and
/// keepalive ticks, and emits records through a [`Transport`]. All handling
/// for one exchange runs on a single thread (the connection runner), so no
/// internal locking is needed.
#[derive(Debug)]
pub struct Exchange {
    auth: AuthPolicy,
    pings: PingTimer,
    state: ExchangeState,
    connection_id: Option<u64>,
    last_rtt: Option<Duration>,
}

impl Exchange {
    /// Exchange for the side that opens the connection. Waits for the
    /// `Opened` event before doing anything.
    pub fn initiator(secret: Option<String>) -> Self {
        Self {
            auth: AuthPolicy::new(Role::Initiator, secret),
            pings: PingTimer::new(),
            state: ExchangeState::Connecting,
            connection_id: None,
            last_rtt: None,
        }
    }

    /// Exchange for the side that accepted the connection. The transport is
    /// already open, so the exchange starts active; with no secret
    /// configured it is authenticated immediately.
    pub fn responder(secret: Option<String>, connection_id: u64) -> Self {
        let auth = AuthPolicy::new(Role::Responder, secret);
        let state = if auth.is_authenticated() {
            ExchangeState::ActiveAuthenticated
        } else {
            ExchangeState::ActiveUnauthenticated
        };

        Self {
            auth,
            pings: PingTimer::new(),
            state,
            connection_id: Some(connection_id),
            last_rtt: None,
        }
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ExchangeState::Closed
    }

    pub fn role(&self) -> Role {
        self.auth.role()
    }

    pub fn connection_id(&self) -> Option<u64> {
        self.connection_id
    }

    /// Most recently measured round trip, if any PONG has resolved yet.
    pub fn last_round_trip(&self) -> Option<Duration> {
        self.last_rtt
    }

    /// Handle one transport event. The transport delivers at most one event
    /// at a time per connection.
    pub fn handle_event(&mut self, transport: &mut impl Transport, event: TransportEvent) {
        if self.is_closed() {
            debug!("Ignoring event on closed exchange");
            return;
        }

        match event {
            TransportEvent::Opened => self.handle_opened(transport),
            TransportEvent::Message(payload) => self.handle_message(transport, &payload),
            TransportEvent::Closed { code, reason } => {
                info!(code = code, reason = %reason, "Disconnected");
                self.enter_closed();
            }
            TransportEvent::Errored(error) => {
                // Non-fatal on its own; the transport's close event drives
                // the actual teardown.
                warn!(error = %error, "Transport error");
            }
        }
    }

    /// Keepalive tick: emit one PING, gated on "connection ready AND
    /// authenticated". A failed gate skips the tick, it is never queued.
    pub fn handle_tick(&mut self, transport: &mut impl Transport) {
        if self.state != ExchangeState::ActiveAuthenticated {
            debug!(state = ?self.state, "Skipping keepalive tick");
            return;
        }

        let ping = self.pings.make_ping();
        transport.send(&ping.encode());
    }

    fn handle_opened(&mut self, transport: &mut impl Transport) {
        info!("Connected");

        if let Some(record) = self.auth.authenticate() {
            transport.send(&record.encode());
        }

        // The initiator self-authenticates the moment its credential is
        // sent (or immediately when none is required).
        self.state = if self.auth.is_authenticated() {
            ExchangeState::ActiveAuthenticated
        } else {
            ExchangeState::ActiveUnauthenticated
        };
    }

    fn handle_message(&mut self, transport: &mut impl Transport, payload: &[u8]) {
        let record = match Record::decode(payload) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Closing on malformed record");
                transport.close(CLOSE_POLICY_VIOLATION, CLOSE_REASON_MALFORMED);
                self.enter_closed();
                return;
            }
        };

        debug!(record = ?record, "Received record");

        match self.auth.evaluate(record) {
            Gate::Pass(record) => self.dispatch(transport, record),
            Gate::Consumed => {
                self.state = ExchangeState::ActiveAuthenticated;
            }
            Gate::Rejected => {
                warn!("Closing on rejected authentication");
                transport.close(CLOSE_POLICY_VIOLATION, CLOSE_REASON_AUTH);
                self.enter_closed();
            }
        }
    }

    fn dispatch(&mut self, transport: &mut impl Transport, record: Record) {
        match record {
            Record::Ping { id, .. } => {
                let pong = self.pings.handle_ping(id);
                transport.send(&pong.encode());
            }
            Record::Pong { id, .. } => match self.pings.handle_pong(id) {
                Ok(elapsed) => {
                    self.last_rtt = Some(elapsed);
                    info!(
                        id = id,
                        "Exchange took {}",
                        format!("{:.2?}", elapsed).blue()
                    );
                }
                Err(e) => warn!(error = %e, "Discarding stale PONG"),
            },
            Record::Auth { .. } => {
                debug!("Dropping AUTH record outside the handshake");
            }
            Record::Unrecognized { event } => {
                info!(event = %event, "Dropping unrecognized event");
            }
        }
    }

    fn enter_closed(&mut self) {
        self.state = ExchangeState::Closed;
        self.auth.deauthenticate();
        debug!(
            connection = ?self.connection_id,
            outstanding = self.pings.outstanding_count(),
            "Exchange closed"
        );
    }
}
