//! Router server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::protocol::DEFAULT_MAX_RESPONSE_SIZE;

/// Default port secondaries connect to
pub const DEFAULT_PORT: u16 = 2002;

/// Router server configuration options
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Port to listen on (always bound on all interfaces)
    pub port: u16,

    /// Number of worker threads driving connections and callbacks
    pub worker_threads: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Largest reply a secondary may send; bigger frames close the connection
    pub max_response_size: usize,

    /// How long shutdown waits for in-flight connection tasks
    pub shutdown_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            worker_threads: 2,
            tcp_nodelay: true, // Commands are small and latency sensitive
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

impl RouterConfig {
    /// Create a new config listening on `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Address the listener binds: every local interface on the configured port
    pub fn endpoint(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }

    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set worker thread count (at least one)
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.max(1);
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Set maximum reply size
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }

    /// Set shutdown timeout
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}
