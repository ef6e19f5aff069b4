use crate::exchange::error::{ExchangeError, Result};
use crate::protocol::Record;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Generates outgoing PING records with monotonically increasing ids and
/// measures elapsed time to the matching PONG.
///
/// The outstanding map only tracks ids *this* peer originated. Entries are
/// removed when their PONG resolves; an unanswered ping stays outstanding
/// for the life of the exchange (there is no ping timeout).
#[derive(Debug, Default)]
pub struct PingTimer {
    next_id: u64,
    outstanding: HashMap<u64, Instant>,
}

impl PingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id, start its elapsed-time measurement, and return
    /// the PING record to transmit.
    pub fn make_ping(&mut self) -> Record {
        let id = self.next_id;
        self.next_id += 1;
        self.outstanding.insert(id, Instant::now());
        debug!(id = id, "Ping created");

        Record::Ping {
            id,
            ts: Some(now_timestamp()),
        }
    }

    /// Build the PONG reply for an inbound PING. Does not touch the
    /// outstanding map.
    pub fn handle_ping(&self, id: u64) -> Record {
        Record::Pong {
            id,
            ts: Some(now_timestamp()),
        }
    }

    /// Resolve an inbound PONG against the outstanding map, returning the
    /// measured round trip and evicting the entry.
    pub fn handle_pong(&mut self, id: u64) -> Result<Duration> {
        let sent_at = self
            .outstanding
            .remove(&id)
            .ok_or(ExchangeError::UnknownPingId(id))?;
        Ok(sent_at.elapsed())
    }

    /// Number of pings sent whose PONG has not yet arrived.
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }
}

/// Informational wall-clock timestamp carried in the `ts` field. Latency is
/// never derived from it.
fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping_id(record: &Record) -> u64 {
        match record {
            Record::Ping { id, .. } => *id,
            other => panic!("expected PING, got {:?}", other),
        }
    }

    #[test]
    fn test_ids_are_monotonic_from_zero() {
        let mut timer = PingTimer::new();
        assert_eq!(ping_id(&timer.make_ping()), 0);
        assert_eq!(ping_id(&timer.make_ping()), 1);
        assert_eq!(ping_id(&timer.make_ping()), 2);
        assert_eq!(timer.outstanding_count(), 3);
    }

    #[test]
    fn test_handle_ping_echoes_id() {
        let timer = PingTimer::new();
        match timer.handle_ping(17) {
            Record::Pong { id, ts } => {
                assert_eq!(id, 17);
                assert!(ts.is_some());
            }
            other => panic!("expected PONG, got {:?}", other),
        }
        // Replying to a peer's PING must not create an outstanding entry.
        assert_eq!(timer.outstanding_count(), 0);
    }

    #[test]
    fn test_handle_pong_resolves_and_evicts() {
        let mut timer = PingTimer::new();
        let id = ping_id(&timer.make_ping());

        let elapsed = timer.handle_pong(id).unwrap();
        assert!(elapsed >= Duration::ZERO);
        assert_eq!(timer.outstanding_count(), 0);

        // A duplicate PONG for the same id is now unknown.
        assert!(matches!(
            timer.handle_pong(id),
            Err(ExchangeError::UnknownPingId(i)) if i == id
        ));
    }

    #[test]
    fn test_handle_pong_unknown_id() {
        let mut timer = PingTimer::new();
        timer.make_ping();

        assert!(matches!(
            timer.handle_pong(999),
            Err(ExchangeError::UnknownPingId(999))
        ));
        // The failed lookup must not disturb other outstanding entries.
        assert_eq!(timer.outstanding_count(), 1);
        assert!(timer.handle_pong(0).is_ok());
    }

    #[test]
    fn test_ids_never_reset() {
        let mut timer = PingTimer::new();
        for _ in 0..5 {
            let id = ping_id(&timer.make_ping());
            timer.handle_pong(id).unwrap();
        }
        assert_eq!(ping_id(&timer.make_ping()), 5);
    }
}
