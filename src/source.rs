//! Frame-source side of the cache
//!
//! The core imposes no cadence on the capture pipeline: whatever acquires
//! and encodes frames (camera driver, screen copy) just calls `publish`
//! whenever it has data. `FramePublisher` is the handle it does that
//! through, with an optional minimum inter-frame interval so an encoder
//! firing faster than viewers can use is rate-limited at the source.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::cache::FrameCache;

/// Default minimum interval between published frames (~40 fps cap)
pub const DEFAULT_MIN_FRAME_INTERVAL: Duration = Duration::from_millis(25);

/// Producer-side handle over the shared frame cache
///
/// One per capture pipeline. Not `Clone`: the cache expects a single writer,
/// and the throttle state only makes sense for one producer.
#[derive(Debug)]
pub struct FramePublisher {
    cache: Arc<FrameCache>,
    min_interval: Duration,
    last_publish: Option<Instant>,
}

impl FramePublisher {
    /// Create an unthrottled publisher
    pub fn new(cache: Arc<FrameCache>) -> Self {
        Self {
            cache,
            min_interval: Duration::ZERO,
            last_publish: None,
        }
    }

    /// Create a publisher that drops frames arriving faster than `min_interval`
    pub fn with_min_interval(cache: Arc<FrameCache>, min_interval: Duration) -> Self {
        Self {
            cache,
            min_interval,
            last_publish: None,
        }
    }

    /// Publish one encoded JPEG frame
    ///
    /// Returns the new cache version, or `None` if the frame was dropped by
    /// the throttle. Dropping is silent from the viewers' perspective; they
    /// only ever ask for the latest frame anyway.
    pub fn publish(&mut self, bytes: Bytes) -> Option<u64> {
        let now = Instant::now();

        if let Some(last) = self.last_publish {
            if now.duration_since(last) < self.min_interval {
                tracing::trace!(len = bytes.len(), "Frame dropped by publish throttle");
                return None;
            }
        }

        self.last_publish = Some(now);
        Some(self.cache.publish(bytes))
    }

    /// The cache this publisher feeds
    pub fn cache(&self) -> &Arc<FrameCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unthrottled_publish() {
        let cache = Arc::new(FrameCache::new());
        let mut publisher = FramePublisher::new(Arc::clone(&cache));

        assert_eq!(publisher.publish(Bytes::from_static(b"a")), Some(1));
        assert_eq!(publisher.publish(Bytes::from_static(b"b")), Some(2));
        assert_eq!(cache.version(), 2);
    }

    #[test]
    fn test_throttle_drops_fast_frames() {
        let cache = Arc::new(FrameCache::new());
        let mut publisher =
            FramePublisher::with_min_interval(Arc::clone(&cache), Duration::from_secs(60));

        assert_eq!(publisher.publish(Bytes::from_static(b"a")), Some(1));
        // Second frame arrives well inside the interval
        assert_eq!(publisher.publish(Bytes::from_static(b"b")), None);

        let frame = cache.latest().unwrap();
        assert_eq!(frame.version, 1);
        assert_eq!(&frame.bytes[..], b"a");
    }

    #[test]
    fn test_throttle_allows_spaced_frames() {
        let cache = Arc::new(FrameCache::new());
        let mut publisher =
            FramePublisher::with_min_interval(Arc::clone(&cache), Duration::from_millis(1));

        assert_eq!(publisher.publish(Bytes::from_static(b"a")), Some(1));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(publisher.publish(Bytes::from_static(b"b")), Some(2));
    }
}
