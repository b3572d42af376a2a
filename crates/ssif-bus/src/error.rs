use std::path::PathBuf;

use crate::traits::SlaveAddress;

/// Errors reported by a bus master.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The target did not acknowledge the transaction.
    ///
    /// SSIF responders NACK reads while a response is still being prepared,
    /// so callers may treat this outcome as "not ready yet".
    #[error("no response from device at {address}")]
    NoResponse { address: SlaveAddress },

    /// The transaction was rejected by the master or the target.
    #[error("bus transaction with {address} failed: {reason}")]
    Failed {
        address: SlaveAddress,
        reason: String,
    },

    /// The master cannot express the requested operation sequence.
    #[error("unsupported operation sequence: {0}")]
    Unsupported(&'static str),

    /// Failed to open the bus device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the bus device.
    #[error("bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The master has gone away.
    #[error("bus master unavailable")]
    Unavailable,
}

impl BusError {
    /// Returns true when the outcome means the target simply did not answer.
    pub fn is_no_response(&self) -> bool {
        matches!(self, BusError::NoResponse { .. })
    }
}

pub type Result<T> = std::result::Result<T, BusError>;
