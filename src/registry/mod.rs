//! Live client registry
//!
//! Tracks every active session so shutdown can reach all of them. The
//! acceptor adds entries, each session removes itself as it unwinds, and
//! `close_all` drains the set — all under one mutex, so a session removing
//! itself while shutdown drains can be neither skipped nor signalled twice.
//!
//! The registry does not own sockets. Each handle carries the sender half
//! of its session's shutdown channel; firing it makes the session task
//! close its own socket on the way out (cooperative cancellation).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use tokio::sync::{watch, Mutex};

/// Handle to one live session, held by the registry
#[derive(Debug)]
pub struct SessionHandle {
    /// Remote peer address
    pub peer_addr: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
    shutdown: watch::Sender<()>,
}

impl SessionHandle {
    /// Create a handle around a session's shutdown channel
    pub fn new(peer_addr: SocketAddr, shutdown: watch::Sender<()>) -> Self {
        Self {
            peer_addr,
            connected_at: Instant::now(),
            shutdown,
        }
    }

    /// Ask the session to terminate
    ///
    /// A no-op if the session already finished and dropped its receiver.
    pub fn close(&self) {
        let _ = self.shutdown.send(());
    }
}

/// The set of active client sessions, keyed by session ID
#[derive(Debug, Default)]
pub struct ClientRegistry {
    sessions: Mutex<HashMap<u64, SessionHandle>>,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a session
    pub async fn add(&self, id: u64, handle: SessionHandle) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(id, handle);
    }

    /// Deregister a session, returning its handle if it was present
    ///
    /// Sessions call this on their own teardown path; after `close_all` has
    /// drained the map this is a harmless no-op.
    pub async fn remove(&self, id: u64) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(&id)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no sessions are live
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Signal every live session to terminate and empty the registry
    ///
    /// Drains under the lock, signals outside it. Idempotent, and safe to
    /// race against sessions removing themselves.
    pub async fn close_all(&self) {
        let drained: Vec<(u64, SessionHandle)> = {
            let mut sessions = self.sessions.lock().await;
            sessions.drain().collect()
        };

        if drained.is_empty() {
            return;
        }

        tracing::info!(count = drained.len(), "Closing all client sessions");
        for (id, handle) in drained {
            tracing::debug!(session_id = id, peer = %handle.peer_addr, "Signalling close");
            handle.close();
        }
    }
}
