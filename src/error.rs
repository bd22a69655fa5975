//! Crate error types

use std::io;
use std::net::SocketAddr;

/// Result alias for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for server operations
#[derive(Debug)]
pub enum Error {
    /// Failed to bind the listening socket
    Bind { addr: SocketAddr, source: io::Error },
    /// The accept loop failed outside of shutdown
    Accept(io::Error),
    /// The server is already running
    AlreadyRunning,
    /// Other I/O failure
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Bind { addr, source } => write!(f, "Failed to bind {}: {}", addr, source),
            Error::Accept(e) => write!(f, "Accept loop failed: {}", e),
            Error::AlreadyRunning => write!(f, "Server is already running"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Bind { source, .. } => Some(source),
            Error::Accept(e) => Some(e),
            Error::AlreadyRunning => None,
            Error::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
