//! Simple MJPEG server example
//!
//! Run with: cargo run --example simple_server [BIND_ADDR] [JPEG_DIR]
//!
//! Examples:
//!   cargo run --example simple_server                       # 0.0.0.0:8888, placeholder frames
//!   cargo run --example simple_server 127.0.0.1:9000        # custom address
//!   cargo run --example simple_server 0.0.0.0:8888 ./shots  # cycle *.jpg files from ./shots
//!
//! ## Viewing
//!
//! Open http://localhost:8888 in a browser, or:
//!   ffplay http://localhost:8888
//!   vlc http://localhost:8888
//!
//! Without a JPEG directory the demo publishes tiny placeholder payloads;
//! viewers will reject them as images, but the multipart stream itself can
//! be inspected with `curl -s http://localhost:8888 | head -c 512`.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use mjpeg_rs::source::DEFAULT_MIN_FRAME_INTERVAL;
use mjpeg_rs::{FramePublisher, MjpegServer, ServerConfig};

fn load_frames(dir: &Path) -> std::io::Result<Vec<Bytes>> {
    let mut frames = Vec::new();
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("jpg")))
        .collect();
    paths.sort();

    for path in paths {
        frames.push(std::fs::read(&path)?.into());
    }
    Ok(frames)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mjpeg_rs=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let bind_addr: SocketAddr = args
        .next()
        .unwrap_or_else(|| "0.0.0.0:8888".to_string())
        .parse()?;

    let frames = match args.next() {
        Some(dir) => {
            let frames = load_frames(Path::new(&dir))?;
            if frames.is_empty() {
                return Err(format!("no .jpg files in {}", dir).into());
            }
            println!("Loaded {} frames from {}", frames.len(), dir);
            frames
        }
        None => {
            println!("No JPEG directory given, publishing placeholder frames");
            (0u8..30)
                .map(|i| Bytes::copy_from_slice(&[0xFF, 0xD8, i, 0xFF, 0xD9]))
                .collect()
        }
    };

    let server = MjpegServer::new(ServerConfig::with_addr(bind_addr));
    let addr = server.start().await?;
    println!("Streaming on http://{}", addr);

    // Frame source: cycle the loaded frames at ~25 fps, with the capture
    // throttle guarding against anything faster
    let mut publisher =
        FramePublisher::with_min_interval(server.cache().clone(), DEFAULT_MIN_FRAME_INTERVAL);
    let source = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(40));
        for frame in frames.iter().cycle() {
            ticker.tick().await;
            publisher.publish(frame.clone());
        }
    });

    tokio::signal::ctrl_c().await?;
    println!("Shutting down");

    source.abort();
    server.stop().await;
    Ok(())
}
