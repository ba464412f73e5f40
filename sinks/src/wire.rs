//! Outward wire format for classified events.

use serde::{Deserialize, Serialize};
use vigil_watcher::WatchEvent;

use crate::error::Result;

/// Compact outward representation of a classified event.
///
/// `content` carries the full context snapshot, newline-joined. Encoding
/// goes through the JSON serializer, which escapes embedded quotes and
/// control characters, so arbitrary log text is always valid on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
    /// Fixed discriminator, always `"error"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Classification label.
    pub error_type: String,

    /// Context snapshot, lines joined with `\n`.
    pub content: String,
}

impl WireEvent {
    /// Encode to JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl From<&WatchEvent> for WireEvent {
    fn from(event: &WatchEvent) -> Self {
        Self {
            kind: "error".to_string(),
            error_type: event.classification.label.clone(),
            content: event.classification.context.join("\n"),
        }
    }
}
