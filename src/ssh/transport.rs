//! TCP transport for SSH sessions
//!
//! Opens the TCP connection a session runs over and applies socket options.

use super::error::{Result, SshError};
use std::time::Duration;
use tokio::net::TcpStream;

/// Default TCP connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Socket options for session connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOpts {
    /// Enable TCP_NODELAY
    pub nodelay: bool,
    /// TCP keepalive timeout
    pub keepalive_secs: Option<u64>,
    /// TCP keepalive interval
    pub keepalive_interval: Option<u64>,
}

impl Default for SocketOpts {
    fn default() -> Self {
        SocketOpts {
            nodelay: true,
            keepalive_secs: Some(30),
            keepalive_interval: Some(10),
        }
    }
}

impl SocketOpts {
    /// Socket options without TCP keepalive
    pub fn without_keepalive() -> Self {
        SocketOpts {
            nodelay: true,
            keepalive_secs: None,
            keepalive_interval: None,
        }
    }

    /// Apply socket options to a TCP stream
    pub fn apply(&self, stream: &TcpStream) -> std::io::Result<()> {
        stream.set_nodelay(self.nodelay)?;

        if let (Some(timeout), Some(interval)) = (self.keepalive_secs, self.keepalive_interval) {
            let socket = socket2::SockRef::from(stream);
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(Duration::from_secs(timeout))
                .with_interval(Duration::from_secs(interval));
            socket.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

/// Connect to `addr` within `timeout` and apply `opts`
pub async fn connect_tcp(addr: &str, opts: &SocketOpts, timeout: Duration) -> Result<TcpStream> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| SshError::Timeout(format!("connecting to {}", addr)))??;

    if let Err(e) = opts.apply(&stream) {
        tracing::warn!("Failed to apply socket options: {}", e);
    }

    tracing::debug!("TCP connection established to {}", addr);

    Ok(stream)
}
