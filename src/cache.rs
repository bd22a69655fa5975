//! Latest-frame cache
//!
//! Single-slot store shared between the frame source (one writer) and every
//! client session (many readers). There is no queue and no history: a publish
//! overwrites the previous frame outright, and a consumer that polls slower
//! than the source publishes simply skips the intermediate frames.

use std::sync::{PoisonError, RwLock};

use bytes::Bytes;

use crate::frame::{Frame, VERSION_NONE};

/// Single-writer, multi-reader store of the most recent frame
///
/// Versions are strictly increasing across publishes, starting at 1. The
/// slot holds a `Frame` handle, not a buffer that is mutated in place, so a
/// reader always observes a complete frame. The lock is held only for the
/// handle swap or clone; no I/O ever happens under it, so the writer is
/// never blocked behind a slow consumer.
#[derive(Debug, Default)]
pub struct FrameCache {
    slot: RwLock<Option<Frame>>,
}

impl FrameCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Install a new frame, returning its version
    ///
    /// Never blocks on readers beyond the handle swap. Intended for a single
    /// producer; the version counter lives inside the slot's lock, so even a
    /// misbehaving second producer cannot corrupt the sequence.
    pub fn publish(&self, bytes: Bytes) -> u64 {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let version = slot.as_ref().map_or(VERSION_NONE, |f| f.version) + 1;
        *slot = Some(Frame::new(bytes, version));
        version
    }

    /// Snapshot the latest frame, or `None` if nothing has been published
    pub fn latest(&self) -> Option<Frame> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current version, or 0 if the cache is empty
    pub fn version(&self) -> u64 {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(VERSION_NONE, |f| f.version)
    }
}
