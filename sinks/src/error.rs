//! Error types for sink transports.

use thiserror::Error;

/// Result type alias for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors that can occur in a sink transport.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Encoding an event for the wire failed.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer did not reply within the deadline.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The stream connection is gone; sends are dropped.
    #[error("connection closed")]
    Disconnected,
}
