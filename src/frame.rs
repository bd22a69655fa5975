//! Frame value type
//!
//! A frame is one JPEG-encoded image paired with the cache version it was
//! published under.

use bytes::Bytes;

/// Content type of every frame in the stream
pub const FRAME_CONTENT_TYPE: &str = "image/jpeg";

/// Sentinel cursor value meaning "no frame delivered yet"
///
/// Published versions start at 1, so 0 never matches a real frame.
pub const VERSION_NONE: u64 = 0;

/// A published frame
///
/// This is designed to be cheap to clone due to `Bytes` reference counting:
/// every session holding a snapshot of the same frame shares one allocation.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Encoded JPEG data (zero-copy via reference counting)
    pub bytes: Bytes,
    /// Cache version this frame was published under
    pub version: u64,
}

impl Frame {
    /// Create a new frame
    pub fn new(bytes: Bytes, version: u64) -> Self {
        Self { bytes, version }
    }

    /// Encoded payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type of the payload
    pub fn content_type(&self) -> &'static str {
        FRAME_CONTENT_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clone_shares_payload() {
        let frame = Frame::new(Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]), 1);
        let copy = frame.clone();

        assert_eq!(copy.version, 1);
        assert_eq!(copy.len(), 4);
        // Bytes clones share the underlying buffer
        assert_eq!(frame.bytes.as_ptr(), copy.bytes.as_ptr());
    }

    #[test]
    fn test_content_type() {
        let frame = Frame::new(Bytes::new(), 1);
        assert_eq!(frame.content_type(), "image/jpeg");
        assert!(frame.is_empty());
    }
}
