//! MJPEG streaming server library
//!
//! Distributes a live sequence of JPEG frames from one producer to any
//! number of HTTP clients over `multipart/x-mixed-replace` ("Motion-JPEG").
//! The producer publishes into a single-slot versioned cache; every client
//! session reads it with its own cursor, so a slow or dead viewer can never
//! stall the producer or another viewer.
//!
//! # Architecture
//!
//! ```text
//!  capture pipeline ──publish()──► FrameCache (latest frame + version)
//!                                      │ latest()
//!                    ┌─────────────────┼─────────────────┐
//!                    ▼                 ▼                 ▼
//!              ClientSession     ClientSession     ClientSession
//!              (version cursor)  (version cursor)  (version cursor)
//!                    │                 │                 │
//!                    ▼                 ▼                 ▼
//!                  TCP               TCP               TCP
//! ```
//!
//! `MjpegServer` owns the accept loop and the `ClientRegistry` used for
//! coordinated shutdown. Sessions deliver each cache version at most once,
//! skip versions they are too slow for, and tear themselves down on any
//! write error.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use mjpeg_rs::{MjpegServer, ServerConfig};
//!
//! # async fn run() -> mjpeg_rs::Result<()> {
//! let server = MjpegServer::new(ServerConfig::default());
//! let addr = server.start().await?;
//! println!("streaming on http://{}", addr);
//!
//! let mut publisher = server.publisher();
//! let jpeg: Bytes = std::fs::read("frame.jpg")?.into();
//! let _version = publisher.publish(jpeg);
//!
//! server.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod frame;
pub mod registry;
pub mod server;
pub mod session;
pub mod source;
pub mod stats;

pub use cache::FrameCache;
pub use error::{Error, Result};
pub use frame::{Frame, FRAME_CONTENT_TYPE};
pub use registry::{ClientRegistry, SessionHandle};
pub use server::{MjpegServer, ServerConfig};
pub use session::{ClientSession, SessionPhase, SessionState};
pub use source::FramePublisher;
pub use stats::{FpsCounter, SessionStats};
