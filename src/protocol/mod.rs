//! Wire protocol for Linkwatch control records

pub mod error;
pub mod record;

pub use error::{ProtocolError, Result as ProtocolResult};
pub use record::Record;
