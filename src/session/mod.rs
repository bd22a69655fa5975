//! Per-client streaming session
//!
//! One task per connected viewer. The session writes the multipart
//! handshake, then polls the shared frame cache with its own version
//! cursor: a newer frame is written as one part, an unchanged cache means
//! a short sleep. The producer is never involved and never blocked; a
//! slow client only ever stalls its own socket write until the transport
//! surfaces the backlog as a write error.
//!
//! Failure is always local: any I/O error tears this session down and
//! nothing else. Teardown runs exactly once, from a single exit point.

pub mod state;
pub mod writer;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::watch;

use crate::cache::FrameCache;
use crate::registry::ClientRegistry;
use crate::stats::FpsCounter;

pub use state::{SessionPhase, SessionState};
pub use writer::{MjpegWriter, DEFAULT_BOUNDARY};

/// One accepted client connection
///
/// Generic over the transport so the delivery loop can be exercised against
/// in-memory pipes; the server instantiates it with `TcpStream`.
pub struct ClientSession<W> {
    state: SessionState,
    writer: MjpegWriter<W>,
    cache: Arc<FrameCache>,
    registry: Arc<ClientRegistry>,
    shutdown: watch::Receiver<()>,
    poll_interval: Duration,
    fps: FpsCounter,
}

impl<W: AsyncWrite + Unpin> ClientSession<W> {
    /// Create a session for a freshly accepted connection
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: SessionState,
        socket: W,
        boundary: impl Into<String>,
        poll_interval: Duration,
        cache: Arc<FrameCache>,
        registry: Arc<ClientRegistry>,
        shutdown: watch::Receiver<()>,
    ) -> Self {
        Self {
            state,
            writer: MjpegWriter::with_boundary(socket, boundary),
            cache,
            registry,
            shutdown,
            poll_interval,
            fps: FpsCounter::new(),
        }
    }

    /// Drive the session to completion
    ///
    /// Returns when the client disconnects, a write fails, or the shutdown
    /// signal fires. Never propagates an error to the caller.
    pub async fn run(mut self) {
        let mut shutdown = self.shutdown.clone();

        let result = tokio::select! {
            _ = shutdown.changed() => Ok(()),
            res = self.stream() => res,
        };

        match result {
            Ok(()) => tracing::debug!(session_id = self.state.id, "Session cancelled by shutdown"),
            Err(e) => tracing::debug!(
                session_id = self.state.id,
                error = %e,
                "Session write failed"
            ),
        }

        self.close().await;
    }

    /// Handshake, then the poll/deliver loop
    ///
    /// Only ever returns with an error; cancellation comes from outside.
    async fn stream(&mut self) -> std::io::Result<()> {
        self.writer.write_handshake().await?;
        self.state.start_streaming();
        tracing::debug!(
            session_id = self.state.id,
            boundary = self.writer.boundary(),
            "Handshake sent"
        );

        loop {
            match self.cache.latest() {
                Some(frame) if self.state.wants(frame.version) => {
                    self.writer.write_frame(&frame.bytes).await?;
                    self.state.mark_delivered(frame.version, frame.len());

                    if let Some(fps) = self.fps.record() {
                        tracing::debug!(session_id = self.state.id, fps, "Delivery rate");
                    }
                }
                // Nothing new (or nothing ever published): wait out one
                // poll interval rather than spinning.
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }

    /// Tear the session down: deregister, log, drop the socket
    async fn close(mut self) {
        self.state.close();
        self.registry.remove(self.state.id).await;

        tracing::info!(
            session_id = self.state.id,
            peer = %self.state.peer_addr,
            frames = self.state.stats.frames_sent,
            duration_ms = self.state.duration().as_millis() as u64,
            "Client disconnected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use bytes::Bytes;
    use tokio::io::AsyncReadExt;

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8888)
    }

    fn session(
        socket: tokio::io::DuplexStream,
        cache: Arc<FrameCache>,
        registry: Arc<ClientRegistry>,
        shutdown: watch::Receiver<()>,
    ) -> ClientSession<tokio::io::DuplexStream> {
        ClientSession::new(
            SessionState::new(1, addr()),
            socket,
            DEFAULT_BOUNDARY,
            Duration::from_millis(5),
            cache,
            registry,
            shutdown,
        )
    }

    #[tokio::test]
    async fn test_delivers_new_frames_once() {
        let cache = Arc::new(FrameCache::new());
        let registry = Arc::new(ClientRegistry::new());
        let (tx, rx) = watch::channel(());

        let (server_end, mut client_end) = tokio::io::duplex(64 * 1024);
        let task = tokio::spawn(session(server_end, Arc::clone(&cache), registry, rx).run());

        cache.publish(Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]));

        // Handshake followed by exactly one part for version 1
        let mut buf = vec![0u8; 256];
        let mut received = Vec::new();
        loop {
            let n = client_end.read(&mut buf).await.unwrap();
            received.extend_from_slice(&buf[..n]);
            if received.ends_with(b"\xFF\xD8\xFF\xD9\r\n") {
                break;
            }
        }

        let text = String::from_utf8_lossy(&received);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert_eq!(text.matches("Content-Length: 4").count(), 1);

        // Cache unchanged: no further bytes arrive
        tokio::time::sleep(Duration::from_millis(50)).await;
        let more = tokio::time::timeout(Duration::from_millis(20), client_end.read(&mut buf)).await;
        assert!(more.is_err(), "session re-sent an already delivered frame");

        tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_signal_ends_session() {
        let cache = Arc::new(FrameCache::new());
        let registry = Arc::new(ClientRegistry::new());
        let (tx, rx) = watch::channel(());

        let (server_end, mut client_end) = tokio::io::duplex(1024);
        let task = tokio::spawn(session(server_end, cache, registry, rx).run());

        tx.send(()).unwrap();
        task.await.unwrap();

        // Peer observes EOF once the session drops its socket
        let mut buf = Vec::new();
        client_end.read_to_end(&mut buf).await.unwrap();
        assert!(buf.starts_with(b"HTTP/1.1 200 OK\r\n") || buf.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_removes_from_registry() {
        let cache = Arc::new(FrameCache::new());
        let registry = Arc::new(ClientRegistry::new());
        let (_tx, rx) = watch::channel(());

        let (handle_tx, _) = watch::channel(());
        registry
            .add(1, crate::registry::SessionHandle::new(addr(), handle_tx))
            .await;
        assert_eq!(registry.len().await, 1);

        let (server_end, client_end) = tokio::io::duplex(1024);
        // Client goes away immediately
        drop(client_end);

        let task = tokio::spawn(session(server_end, Arc::clone(&cache), Arc::clone(&registry), rx).run());
        cache.publish(Bytes::from_static(b"frame"));

        task.await.unwrap();
        assert_eq!(registry.len().await, 0);
    }
}
