use crate::protocol::Record;
use tracing::{debug, info};

/// The two roles of one exchange: the initiator opens the connection, the
/// responder accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// Outcome of running one inbound record through the auth gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Traffic may pass; dispatch the record.
    Pass(Record),
    /// The record was a valid credential and was consumed by the handshake;
    /// it is never forwarded to the dispatcher.
    Consumed,
    /// Missing or incorrect credential; the connection must be closed.
    Rejected,
}

/// Role-keyed handshake policy.
///
/// With no secret configured, both roles are authenticated from the start
/// and the gate is a pass-through. With a secret, the responder enforces the
/// gate while the initiator marks itself authenticated the instant it
/// transmits its credential, without waiting for acknowledgment. That
/// asymmetry is part of the protocol, not an accident.
#[derive(Debug)]
pub struct AuthPolicy {
    role: Role,
    secret: Option<String>,
    authenticated: bool,
}

impl AuthPolicy {
    pub fn new(role: Role, secret: Option<String>) -> Self {
        let authenticated = secret.is_none();
        Self {
            role,
            secret,
            authenticated,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Reset to the unauthenticated baseline, called on disconnect. A
    /// reconnecting session must re-handshake (no-op without a secret).
    pub fn deauthenticate(&mut self) {
        self.authenticated = self.secret.is_none();
    }

    /// Initiator-side handshake step: returns the AUTH record to transmit,
    /// if one is needed, and optimistically marks this side authenticated.
    pub fn authenticate(&mut self) -> Option<Record> {
        match &self.secret {
            None => {
                info!("Authentication not needed (no shared key configured)");
                None
            }
            Some(_) if self.authenticated => {
                info!("Already authenticated");
                None
            }
            Some(key) => {
                info!("Sending the shared key");
                self.authenticated = true;
                Some(Record::Auth {
                    key: Some(key.clone()),
                })
            }
        }
    }

    /// Run one inbound record through the gate.
    pub fn evaluate(&mut self, record: Record) -> Gate {
        match self.role {
            // An initiator trusts every record it receives once connected.
            Role::Initiator => Gate::Pass(record),
            Role::Responder => self.evaluate_responder(record),
        }
    }

    fn evaluate_responder(&mut self, record: Record) -> Gate {
        debug!("Checking authentication status");

        if self.authenticated {
            return Gate::Pass(record);
        }

        match record {
            Record::Auth { key: Some(key) } if Some(&key) == self.secret.as_ref() => {
                self.authenticated = true;
                info!("Peer authenticated");
                Gate::Consumed
            }
            _ => Gate::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping() -> Record {
        Record::Ping { id: 0, ts: None }
    }

    #[test]
    fn test_no_secret_authenticated_immediately() {
        let policy = AuthPolicy::new(Role::Responder, None);
        assert!(policy.is_authenticated());

        let policy = AuthPolicy::new(Role::Initiator, None);
        assert!(policy.is_authenticated());
    }

    #[test]
    fn test_responder_accepts_matching_key() {
        let mut policy = AuthPolicy::new(Role::Responder, Some("abc".to_string()));
        assert!(!policy.is_authenticated());

        let gate = policy.evaluate(Record::Auth {
            key: Some("abc".to_string()),
        });
        assert_eq!(gate, Gate::Consumed);
        assert!(policy.is_authenticated());

        // Subsequent traffic passes through.
        assert_eq!(policy.evaluate(ping()), Gate::Pass(ping()));
    }

    #[test]
    fn test_responder_rejects_wrong_key() {
        let mut policy = AuthPolicy::new(Role::Responder, Some("abc".to_string()));
        let gate = policy.evaluate(Record::Auth {
            key: Some("nope".to_string()),
        });
        assert_eq!(gate, Gate::Rejected);
        assert!(!policy.is_authenticated());
    }

    #[test]
    fn test_responder_rejects_missing_key() {
        let mut policy = AuthPolicy::new(Role::Responder, Some("abc".to_string()));
        assert_eq!(policy.evaluate(Record::Auth { key: None }), Gate::Rejected);
    }

    #[test]
    fn test_responder_rejects_traffic_before_auth() {
        let mut policy = AuthPolicy::new(Role::Responder, Some("abc".to_string()));
        assert_eq!(policy.evaluate(ping()), Gate::Rejected);
        assert_eq!(
            policy.evaluate(Record::Unrecognized {
                event: "HELLO".to_string()
            }),
            Gate::Rejected
        );
    }

    #[test]
    fn test_responder_no_secret_passes_everything() {
        let mut policy = AuthPolicy::new(Role::Responder, None);
        assert_eq!(policy.evaluate(ping()), Gate::Pass(ping()));
    }

    #[test]
    fn test_authenticated_responder_forwards_auth_records() {
        // An AUTH record arriving after authentication is ordinary traffic;
        // the dispatcher drops it as unrecognized, the gate does not consume it.
        let mut policy = AuthPolicy::new(Role::Responder, Some("abc".to_string()));
        policy.evaluate(Record::Auth {
            key: Some("abc".to_string()),
        });

        let again = Record::Auth {
            key: Some("abc".to_string()),
        };
        assert_eq!(policy.evaluate(again.clone()), Gate::Pass(again));
    }

    #[test]
    fn test_initiator_authenticate_sends_key_once() {
        let mut policy = AuthPolicy::new(Role::Initiator, Some("abc".to_string()));
        assert!(!policy.is_authenticated());

        let record = policy.authenticate();
        assert_eq!(
            record,
            Some(Record::Auth {
                key: Some("abc".to_string())
            })
        );
        // Optimistic: authenticated as soon as the credential is produced.
        assert!(policy.is_authenticated());
        assert_eq!(policy.authenticate(), None);
    }

    #[test]
    fn test_initiator_no_secret_sends_nothing() {
        let mut policy = AuthPolicy::new(Role::Initiator, None);
        assert_eq!(policy.authenticate(), None);
        assert!(policy.is_authenticated());
    }

    #[test]
    fn test_initiator_gate_is_pass_through() {
        let mut policy = AuthPolicy::new(Role::Initiator, Some("abc".to_string()));
        assert_eq!(policy.evaluate(ping()), Gate::Pass(ping()));
    }

    #[test]
    fn test_deauthenticate_resets_baseline() {
        let mut policy = AuthPolicy::new(Role::Responder, Some("abc".to_string()));
        policy.evaluate(Record::Auth {
            key: Some("abc".to_string()),
        });
        assert!(policy.is_authenticated());

        policy.deauthenticate();
        assert!(!policy.is_authenticated());

        let mut open = AuthPolicy::new(Role::Responder, None);
        open.deauthenticate();
        assert!(open.is_authenticated());
    }
}
