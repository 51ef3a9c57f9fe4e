use thiserror::Error;

use crate::poll::PollError;

/// Top-level error type for pollcast.
#[derive(Debug, Error)]
pub enum PollcastError {
    /// A poll operation was rejected (user-facing).
    #[error(transparent)]
    Poll(#[from] PollError),

    /// Error from the host chat platform or a broadcast channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from the vote ledger (spreadsheet).
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
