use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// A PONG arrived for an id this peer never sent, or one already
    /// resolved. Recoverable: the caller logs and discards.
    #[error("No outstanding ping with id {0}")]
    UnknownPingId(u64),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
