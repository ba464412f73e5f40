//! Reliable framed stream sink.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::EventSink;
use crate::error::{Result, SinkError};
use crate::wire::WireEvent;
use vigil_watcher::WatchEvent;

/// Persistent framed TCP sink.
///
/// Frames are a big-endian u32 payload length followed by the payload. A
/// send blocks its caller until the transport accepts the write. A failed
/// write marks the connection dead: later sends become silent no-ops
/// instead of propagating errors into the scheduler, so a disconnected
/// consumer cannot halt monitoring.
pub struct StreamSink {
    peer: SocketAddr,
    conn: Mutex<Option<TcpStream>>,
}

impl StreamSink {
    /// Connect to the consumer.
    pub async fn connect(peer: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(peer).await?;
        info!(%peer, "stream sink connected");
        Ok(Self {
            peer,
            conn: Mutex::new(Some(stream)),
        })
    }

    /// Whether the connection is still believed alive.
    pub async fn is_alive(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Write one framed payload. Returns `Disconnected` once the connection
    /// has been marked dead.
    async fn send_frame(&self, payload: &[u8]) -> Result<()> {
        let mut guard = self.conn.lock().await;
        let Some(stream) = guard.as_mut() else {
            return Err(SinkError::Disconnected);
        };

        let outcome = async {
            stream.write_u32(payload.len() as u32).await?;
            stream.write_all(payload).await
        }
        .await;

        if let Err(err) = outcome {
            warn!(
                peer = %self.peer,
                error = %err,
                "stream write failed, marking connection dead"
            );
            *guard = None;
            return Err(SinkError::Io(err));
        }

        Ok(())
    }

    /// Forward free-form text to the consumer, best-effort. This is the
    /// delivery boundary: replies shown to the user travel the same framed
    /// channel as events.
    pub async fn deliver(&self, text: &str) {
        if self.send_frame(text.as_bytes()).await.is_err() {
            debug!(peer = %self.peer, "delivery dropped, consumer gone");
        }
    }
}

#[async_trait]
impl EventSink for StreamSink {
    fn name(&self) -> &str {
        "stream"
    }

    async fn send(&self, event: &WatchEvent) {
        let payload = match WireEvent::from(event).encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(error = %err, "event not encodable, dropping");
                return;
            }
        };

        if self.send_frame(&payload).await.is_err() {
            debug!(peer = %self.peer, "event dropped, consumer gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use vigil_watcher::{Classification, TargetKind};

    fn sample_event() -> WatchEvent {
        WatchEvent::new(
            "editor",
            TargetKind::LogFile,
            "/var/log/editor.log",
            Classification::new(
                "CompilationError",
                "error CS1002: ; expected",
                vec!["error CS1002: ; expected".to_string()],
            ),
        )
    }

    async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
        let len = stream.read_u32().await.unwrap() as usize;
        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload).await.unwrap();
        payload
    }

    #[tokio::test]
    async fn test_event_arrives_framed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let peer = listener.local_addr().unwrap();

        let sink = StreamSink::connect(peer).await.unwrap();
        let (mut accepted, _) = listener.accept().await.unwrap();

        sink.send(&sample_event()).await;

        let payload = read_frame(&mut accepted).await;
        let wire: WireEvent = serde_json::from_slice(&payload).unwrap();
        assert_eq!(wire.error_type, "CompilationError");
    }

    #[tokio::test]
    async fn test_deliver_shares_the_framing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let peer = listener.local_addr().unwrap();

        let sink = StreamSink::connect(peer).await.unwrap();
        let (mut accepted, _) = listener.accept().await.unwrap();

        sink.deliver("try null-checking the player reference").await;

        let payload = read_frame(&mut accepted).await;
        assert_eq!(payload, b"try null-checking the player reference");
    }

    #[tokio::test]
    async fn test_broken_connection_degrades_to_no_op() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let peer = listener.local_addr().unwrap();

        let sink = StreamSink::connect(peer).await.unwrap();
        let (accepted, _) = listener.accept().await.unwrap();
        drop(accepted);
        drop(listener);

        // The first writes may land in kernel buffers; keep sending until
        // the failure surfaces and the sink marks itself dead.
        for _ in 0..50 {
            sink.send(&sample_event()).await;
            if !sink.is_alive().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!sink.is_alive().await);

        // Dead sink: sends are silent no-ops, nothing panics or blocks.
        sink.send(&sample_event()).await;
        sink.deliver("still fine").await;
    }
}
