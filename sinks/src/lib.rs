//! # Vigil Sinks
//!
//! Outward transports for classified watch events. Sinks are pure
//! transports: they carry no classification logic and share no state with
//! each other, so any number of them can receive the same event stream.
//!
//! ## Variants
//!
//! - **DatagramSink**: fire-and-forget UDP, failures dropped
//! - **StreamSink**: persistent framed TCP, degrades to a no-op when the
//!   consumer disconnects
//! - **InferenceBridge**: request/reply with a timeout, for the inference
//!   collaborator

use async_trait::async_trait;
use vigil_watcher::WatchEvent;

pub mod bridge;
pub mod datagram;
pub mod error;
pub mod stream;
pub mod wire;

pub use bridge::{DEFAULT_REQUEST_TIMEOUT, InferenceBridge};
pub use datagram::DatagramSink;
pub use error::{Result, SinkError};
pub use stream::StreamSink;
pub use wire::WireEvent;

/// A transport-agnostic event emitter.
///
/// `send` never fails at the call site: transports degrade internally
/// (drop the datagram, mark the stream dead) so an offline consumer cannot
/// halt monitoring.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Short transport name for logs.
    fn name(&self) -> &str;

    /// Emit one event, best-effort.
    async fn send(&self, event: &WatchEvent);
}
