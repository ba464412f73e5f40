//! Synchronous request/reply bridge.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time;

use crate::error::{Result, SinkError};

/// Default time to wait for a reply before giving up.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request/reply client for the inference collaborator.
///
/// Unlike the fire-and-forget sinks this is a blocking exchange: the caller
/// waits for the reply or a timeout. Inference can take seconds, so callers
/// must not hold any watch state across the await. Exchanges are serialized
/// so replies pair with the request that prompted them; concurrent callers
/// queue.
pub struct InferenceBridge {
    socket: UdpSocket,
    exchange: Mutex<()>,
    timeout: Duration,
}

impl InferenceBridge {
    /// Connect to the inference peer with the default timeout.
    pub async fn connect(peer: SocketAddr) -> Result<Self> {
        Self::connect_with_timeout(peer, DEFAULT_REQUEST_TIMEOUT).await
    }

    /// Connect to the inference peer with an explicit reply timeout.
    pub async fn connect_with_timeout(peer: SocketAddr, timeout: Duration) -> Result<Self> {
        let bind_addr = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(peer).await?;
        Ok(Self {
            socket,
            exchange: Mutex::new(()),
            timeout,
        })
    }

    /// Send `payload` and wait for the reply.
    pub async fn request(&self, payload: &str) -> Result<String> {
        let _guard = self.exchange.lock().await;

        self.socket.send(payload.as_bytes()).await?;

        let mut buf = vec![0u8; 64 * 1024];
        let received = time::timeout(self.timeout, self.socket.recv(&mut buf))
            .await
            .map_err(|_| SinkError::Timeout(self.timeout))??;

        Ok(String::from_utf8_lossy(&buf[..received]).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_request_reply_round_trip() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer = server.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 64 * 1024];
            let (received, from) = server.recv_from(&mut buf).await.unwrap();
            let prompt = String::from_utf8_lossy(&buf[..received]).into_owned();
            let reply = format!("considered: {prompt}");
            server.send_to(reply.as_bytes(), from).await.unwrap();
        });

        let bridge = InferenceBridge::connect(peer).await.unwrap();
        let reply = bridge.request("System Error:\nNullReferenceException").await.unwrap();

        assert_eq!(reply, "considered: System Error:\nNullReferenceException");
    }

    #[tokio::test]
    async fn test_request_times_out_without_reply() {
        // Bound but silent peer.
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer = server.local_addr().unwrap();

        let bridge = InferenceBridge::connect_with_timeout(peer, Duration::from_millis(100))
            .await
            .unwrap();

        let err = bridge.request("anyone there?").await.unwrap_err();
        assert!(matches!(err, SinkError::Timeout(_)));
    }
}
