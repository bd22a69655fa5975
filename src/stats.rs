//! Delivery statistics for client sessions
//!
//! Diagnostics only; nothing here feeds back into flow control.

use std::time::{Duration, Instant};

/// Frames-per-second counter over a rolling 1-second window
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    /// Window length over which FPS is measured
    pub const WINDOW: Duration = Duration::from_secs(1);

    /// Create a counter with an empty window starting now
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
        }
    }

    /// Record one delivered frame
    ///
    /// Returns `Some(fps)` when this frame closes a 1-second window, with
    /// the number of frames counted in it; the next window starts fresh.
    pub fn record(&mut self) -> Option<u32> {
        self.frames += 1;

        if self.window_start.elapsed() >= Self::WINDOW {
            let fps = self.frames;
            self.frames = 0;
            self.window_start = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-session delivery totals
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Frames written to this client
    pub frames_sent: u64,
    /// Payload bytes written to this client (excluding part headers)
    pub bytes_sent: u64,
    /// When the session was accepted
    pub connected_at: Instant,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            frames_sent: 0,
            bytes_sent: 0,
            connected_at: Instant::now(),
        }
    }

    /// Record one delivered frame of `len` payload bytes
    pub fn record_frame(&mut self, len: usize) {
        self.frames_sent += 1;
        self.bytes_sent += len as u64;
    }

    /// Session duration so far
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Delivery bitrate in bits per second
    pub fn bitrate(&self) -> u64 {
        let secs = self.duration().as_secs();
        if secs > 0 {
            (self.bytes_sent * 8) / secs
        } else {
            0
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
