//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::session::writer::DEFAULT_BOUNDARY;

/// Default accept backlog
pub const DEFAULT_BACKLOG: u32 = 100;

/// Default cache poll interval for client sessions
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Accept backlog size
    pub backlog: u32,

    /// Multipart boundary token, fixed for all clients
    pub boundary: String,

    /// How long a session waits between cache polls when nothing is new
    pub poll_interval: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8888".parse().unwrap(),
            backlog: DEFAULT_BACKLOG,
            boundary: DEFAULT_BOUNDARY.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            tcp_nodelay: true, // Important for low latency
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the accept backlog
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Set the multipart boundary token
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    /// Set the session poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 8888);
        assert_eq!(config.backlog, DEFAULT_BACKLOG);
        assert_eq!(config.boundary, "--boundary");
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .backlog(10)
            .boundary("--frame")
            .poll_interval(Duration::from_millis(5))
            .tcp_nodelay(false);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.backlog, 10);
        assert_eq!(config.boundary, "--frame");
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert!(!config.tcp_nodelay);
    }
}
