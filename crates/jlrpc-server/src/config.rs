//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use jlrpc_common::DEFAULT_READ_BUFFER_SIZE;

/// Default cap on concurrent client connections.
pub const DEFAULT_MAX_CLIENTS: usize = 64;

/// Default idle read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Configuration for [`Server`](crate::Server).
///
/// `max_clients` is a hard cap: it sizes the pre-allocated slot table, and
/// while every slot is taken the listener is simply not polled for new
/// connections. `read_timeout` bounds how long a connection may sit without
/// read progress before its receive side is shut down.
///
/// # Example
///
/// ```
/// use jlrpc_server::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::new("127.0.0.1:0".parse().unwrap())
///     .with_max_clients(128)
///     .with_read_timeout(Duration::from_secs(30));
/// assert_eq!(config.max_clients, 128);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listening socket binds to.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections; also sizes the slot pool.
    pub max_clients: usize,
    /// Idle timeout applied to every connection's read side.
    pub read_timeout: Duration,
    /// Per-connection line buffer capacity; bounds the longest frame.
    pub read_buffer_size: usize,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            max_clients: DEFAULT_MAX_CLIENTS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }
}
