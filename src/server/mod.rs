//! Server lifecycle, configuration and accept loop

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::MjpegServer;
