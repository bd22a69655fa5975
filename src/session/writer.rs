//! Multipart MJPEG wire writer
//!
//! Writes the `multipart/x-mixed-replace` handshake and one part per frame.
//! The byte layout is fixed: the handshake ends after the Content-Type
//! header's CRLF, and every part begins with a CRLF, so the first part's
//! leading blank line is what terminates the response header block. Viewers
//! (browsers, VLC, ffplay) depend on this exact framing.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::frame::FRAME_CONTENT_TYPE;

/// Default multipart boundary token
pub const DEFAULT_BOUNDARY: &str = "--boundary";

/// Writer for one client's MJPEG stream
///
/// The boundary token is fixed at construction; no request line is ever
/// read, so there is nothing to renegotiate per connection.
#[derive(Debug)]
pub struct MjpegWriter<W> {
    writer: W,
    boundary: String,
}

impl<W: AsyncWrite + Unpin> MjpegWriter<W> {
    /// Create a writer with the default boundary
    pub fn new(writer: W) -> Self {
        Self::with_boundary(writer, DEFAULT_BOUNDARY)
    }

    /// Create a writer with a custom boundary token
    pub fn with_boundary(writer: W, boundary: impl Into<String>) -> Self {
        Self {
            writer,
            boundary: boundary.into(),
        }
    }

    /// The boundary token in use
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Write the HTTP response status line and multipart header
    pub async fn write_handshake(&mut self) -> std::io::Result<()> {
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace; boundary={}\r\n",
            self.boundary
        );
        self.writer.write_all(header.as_bytes()).await?;
        self.writer.flush().await
    }

    /// Write one frame as a multipart part
    pub async fn write_frame(&mut self, data: &[u8]) -> std::io::Result<()> {
        let header = format!(
            "\r\n{}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            self.boundary,
            FRAME_CONTENT_TYPE,
            data.len()
        );
        self.writer.write_all(header.as_bytes()).await?;
        self.writer.write_all(data).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await
    }

    /// Consume the writer, returning the underlying stream
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handshake_bytes() {
        let mut writer = MjpegWriter::new(Vec::new());
        writer.write_handshake().await.unwrap();

        assert_eq!(
            writer.into_inner(),
            b"HTTP/1.1 200 OK\r\n\
              Content-Type: multipart/x-mixed-replace; boundary=--boundary\r\n"
                .to_vec()
        );
    }

    #[tokio::test]
    async fn test_frame_bytes() {
        let mut writer = MjpegWriter::new(Vec::new());
        writer
            .write_frame(&[0xFF, 0xD8, 0xFF, 0xD9])
            .await
            .unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"\r\n--boundary\r\nContent-Type: image/jpeg\r\nContent-Length: 4\r\n\r\n",
        );
        expected.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9]);
        expected.extend_from_slice(b"\r\n");

        assert_eq!(writer.into_inner(), expected);
    }

    #[tokio::test]
    async fn test_custom_boundary() {
        let mut writer = MjpegWriter::with_boundary(Vec::new(), "--frame");
        assert_eq!(writer.boundary(), "--frame");

        writer.write_handshake().await.unwrap();
        writer.write_frame(b"x").await.unwrap();

        let out = writer.into_inner();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("boundary=--frame\r\n"));
        assert!(text.contains("\r\n--frame\r\nContent-Type: image/jpeg\r\nContent-Length: 1\r\n"));
    }
}
