//! Classified events produced by watch targets.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TargetKind;

/// Label given to units that matched no signature but are reported anyway.
pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

/// A classified unit together with its surrounding context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// Signature label, e.g. `"NullReference"`.
    pub label: String,

    /// The line (or file content) that matched.
    pub line: String,

    /// Snapshot of the context window at match time, oldest first.
    pub context: Vec<String>,
}

impl Classification {
    /// Create a new classification.
    pub fn new(label: impl Into<String>, line: impl Into<String>, context: Vec<String>) -> Self {
        Self {
            label: label.into(),
            line: line.into(),
            context,
        }
    }
}

/// An event ready for dispatch to the configured sinks.
///
/// Immutable once constructed; every sink serializes its own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    /// Name of the target that produced the event.
    pub target: String,

    /// What kind of source produced the event.
    pub kind: TargetKind,

    /// Path the content came from.
    pub path: PathBuf,

    /// What was detected.
    pub classification: Classification,

    /// When the event was assembled.
    pub timestamp: DateTime<Utc>,
}

impl WatchEvent {
    /// Create a new event stamped with the current time.
    pub fn new(
        target: impl Into<String>,
        kind: TargetKind,
        path: impl Into<PathBuf>,
        classification: Classification,
    ) -> Self {
        Self {
            target: target.into(),
            kind,
            path: path.into(),
            classification,
            timestamp: Utc::now(),
        }
    }
}
