use thiserror::Error;

/// Protocol-level errors for record encoding/decoding
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
