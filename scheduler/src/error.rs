//! Error types for the scheduler.

use thiserror::Error;

/// Result type alias for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors that can occur while scheduling watch targets.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// Watcher core error.
    #[error(transparent)]
    Watch(#[from] vigil_watcher::WatchError),

    /// The notification channel closed unexpectedly.
    #[error("trigger channel closed")]
    TriggerClosed,

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
