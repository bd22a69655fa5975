//! MJPEG server lifecycle and accept loop
//!
//! `MjpegServer` owns the shared frame cache and the client registry, and
//! runs the TCP accept loop on its own task. Each accepted connection gets
//! a session task; accept returns to listening immediately and no
//! per-client work ever runs on the acceptor.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::{watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};

use crate::cache::FrameCache;
use crate::error::{Error, Result};
use crate::registry::{ClientRegistry, SessionHandle};
use crate::server::config::ServerConfig;
use crate::session::{ClientSession, SessionState};
use crate::source::FramePublisher;

/// Handle to the running acceptor, present only between start and stop
struct Running {
    shutdown: watch::Sender<()>,
    acceptor: JoinHandle<()>,
}

/// MJPEG streaming server
pub struct MjpegServer {
    config: ServerConfig,
    cache: Arc<FrameCache>,
    registry: Arc<ClientRegistry>,
    running: Mutex<Option<Running>>,
}

impl MjpegServer {
    /// Create a server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            cache: Arc::new(FrameCache::new()),
            registry: Arc::new(ClientRegistry::new()),
            running: Mutex::new(None),
        }
    }

    /// The shared frame cache
    pub fn cache(&self) -> &Arc<FrameCache> {
        &self.cache
    }

    /// The live client registry
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// The server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Create a producer handle for a frame source to publish through
    pub fn publisher(&self) -> FramePublisher {
        FramePublisher::new(Arc::clone(&self.cache))
    }

    /// Whether the acceptor has been started and not yet stopped
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Bind the listening socket and start accepting clients
    ///
    /// Returns the bound address (useful with an ephemeral port). Fails
    /// with [`Error::AlreadyRunning`] on a double start, and with
    /// [`Error::Bind`] before any accept is attempted if the bind fails.
    pub async fn start(&self) -> Result<SocketAddr> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let listener = bind_listener(&self.config)?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "MJPEG server listening");

        let (shutdown, shutdown_rx) = watch::channel(());
        let acceptor = tokio::spawn(accept_loop(
            listener,
            shutdown_rx,
            self.config.clone(),
            Arc::clone(&self.cache),
            Arc::clone(&self.registry),
        ));

        *running = Some(Running { shutdown, acceptor });
        Ok(local_addr)
    }

    /// Stop accepting, close every client session, wait for all of them
    ///
    /// A no-op when the server is not running, so calling it twice is safe.
    pub async fn stop(&self) {
        let running = self.running.lock().await.take();
        let Some(running) = running else {
            return;
        };

        tracing::info!("Stopping MJPEG server");
        // Unblocks the accept loop; the acceptor then signals every session
        // and waits for them to unwind before its task finishes.
        let _ = running.shutdown.send(());

        if let Err(e) = running.acceptor.await {
            tracing::error!(error = %e, "Acceptor task panicked");
        }

        // Normally drained by the acceptor's exit path already; covers an
        // acceptor that died before reaching it.
        self.registry.close_all().await;
    }
}

/// Bind with an explicit accept backlog
fn bind_listener(config: &ServerConfig) -> Result<TcpListener> {
    let bind = |source| Error::Bind {
        addr: config.bind_addr,
        source,
    };

    let socket = match config.bind_addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(bind)?;

    socket.set_reuseaddr(true).map_err(bind)?;
    socket.bind(config.bind_addr).map_err(bind)?;
    socket.listen(config.backlog).map_err(bind)
}

/// Accept clients until shutdown or a fatal accept error
///
/// The exit path is self-contained: it closes the listener, signals every
/// session through the registry and drains the session task set, so by the
/// time this task finishes every client socket is closed. It deliberately
/// does not call back into [`MjpegServer::stop`], which would retake the
/// start/stop lock from inside the shutdown sequence.
async fn accept_loop(
    listener: TcpListener,
    mut shutdown: watch::Receiver<()>,
    config: ServerConfig,
    cache: Arc<FrameCache>,
    registry: Arc<ClientRegistry>,
) {
    let mut sessions = JoinSet::new();
    let mut next_session_id: u64 = 1;

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer_addr)) => {
                    let session_id = next_session_id;
                    next_session_id += 1;

                    if config.tcp_nodelay {
                        if let Err(e) = socket.set_nodelay(true) {
                            tracing::warn!(session_id, error = %e, "Failed to set TCP_NODELAY");
                        }
                    }

                    tracing::info!(session_id, peer = %peer_addr, "New client");

                    // Register before spawning so close_all can always
                    // reach the session.
                    let (tx, rx) = watch::channel(());
                    registry
                        .add(session_id, SessionHandle::new(peer_addr, tx))
                        .await;

                    let session = ClientSession::new(
                        SessionState::new(session_id, peer_addr),
                        socket,
                        config.boundary.clone(),
                        config.poll_interval,
                        Arc::clone(&cache),
                        Arc::clone(&registry),
                        rx,
                    );
                    sessions.spawn(session.run());
                }
                Err(e) => {
                    // A session failure never reaches this loop; an accept
                    // failure outside shutdown takes the server down.
                    tracing::error!(error = %e, "Accept failed, stopping server");
                    break;
                }
            }
        }
    }

    drop(listener);
    registry.close_all().await;
    while sessions.join_next().await.is_some() {}
    tracing::info!("Acceptor stopped");
}
