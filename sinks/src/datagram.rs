//! Fire-and-forget datagram sink.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::EventSink;
use crate::error::Result;
use crate::wire::WireEvent;
use vigil_watcher::WatchEvent;

/// Best-effort UDP sink: no acknowledgement, no retry, no backpressure.
///
/// A listener that is offline simply loses events; the watcher never stalls
/// on it.
pub struct DatagramSink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl DatagramSink {
    /// Bind an ephemeral local socket aimed at `peer`.
    pub async fn new(peer: SocketAddr) -> Result<Self> {
        let bind_addr = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(Self { socket, peer })
    }

    /// Address events are sent to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

#[async_trait]
impl EventSink for DatagramSink {
    fn name(&self) -> &str {
        "datagram"
    }

    async fn send(&self, event: &WatchEvent) {
        let payload = match WireEvent::from(event).encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(error = %err, "event not encodable, dropping");
                return;
            }
        };

        if let Err(err) = self.socket.send_to(&payload, self.peer).await {
            debug!(peer = %self.peer, error = %err, "datagram send failed, dropping event");
        }
    }
}
