//! Session state machine
//!
//! Tracks one client connection from accept to teardown, including the
//! version cursor that decides which cache frames still need delivering.

use std::net::SocketAddr;
use std::time::Instant;

use crate::frame::VERSION_NONE;
use crate::stats::SessionStats;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// TCP connected, handshake not yet written
    Connected,
    /// Handshake sent, polling the cache and writing parts
    Streaming,
    /// Session torn down
    Closed,
}

/// Complete per-session state
///
/// The version cursor is owned exclusively by its session; there is no
/// contention on it, only on the cache it compares against.
#[derive(Debug)]
pub struct SessionState {
    /// Unique session ID
    pub id: u64,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Connection accept time
    pub connected_at: Instant,

    /// Version of the last frame written to this client (0 = none yet)
    pub last_delivered: u64,

    /// Delivery totals
    pub stats: SessionStats,
}

impl SessionState {
    /// Create state for a freshly accepted connection
    pub fn new(id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::Connected,
            connected_at: Instant::now(),
            last_delivered: VERSION_NONE,
            stats: SessionStats::new(),
        }
    }

    /// Handshake written, enter the streaming loop
    pub fn start_streaming(&mut self) {
        if self.phase == SessionPhase::Connected {
            self.phase = SessionPhase::Streaming;
        }
    }

    /// Tear the session down
    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
    }

    /// Whether `version` is newer than anything delivered so far
    pub fn wants(&self, version: u64) -> bool {
        version > self.last_delivered
    }

    /// Advance the cursor after a successful write
    ///
    /// Returns `false` (and leaves the cursor alone) if `version` is not
    /// strictly newer, so a duplicate delivery can never be recorded.
    pub fn mark_delivered(&mut self, version: u64, len: usize) -> bool {
        if !self.wants(version) {
            return false;
        }
        self.last_delivered = version;
        self.stats.record_frame(len);
        true
    }

    /// Session duration so far
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }

    /// Whether the session is in its streaming loop
    pub fn is_streaming(&self) -> bool {
        self.phase == SessionPhase::Streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8888)
    }

    #[test]
    fn test_session_lifecycle() {
        let mut state = SessionState::new(1, addr());

        assert_eq!(state.phase, SessionPhase::Connected);
        assert!(!state.is_streaming());

        state.start_streaming();
        assert_eq!(state.phase, SessionPhase::Streaming);
        assert!(state.is_streaming());

        state.close();
        assert_eq!(state.phase, SessionPhase::Closed);
    }

    #[test]
    fn test_streaming_only_from_connected() {
        let mut state = SessionState::new(1, addr());
        state.close();

        state.start_streaming();
        assert_eq!(state.phase, SessionPhase::Closed);
    }

    #[test]
    fn test_cursor_rejects_duplicates() {
        let mut state = SessionState::new(1, addr());

        assert!(state.wants(1));
        assert!(state.mark_delivered(1, 100));
        assert_eq!(state.last_delivered, 1);

        // Same version again: refused
        assert!(!state.mark_delivered(1, 100));
        // Older version: refused
        assert!(!state.mark_delivered(0, 100));
        assert_eq!(state.stats.frames_sent, 1);

        // Gaps are fine, only monotonicity matters
        assert!(state.mark_delivered(5, 100));
        assert_eq!(state.last_delivered, 5);
    }
}
