//! Error types for the watcher core.

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur in the watcher core.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Watched path does not exist.
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// Invalid exclude pattern.
    #[error("invalid exclude pattern: {0}")]
    InvalidPattern(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
