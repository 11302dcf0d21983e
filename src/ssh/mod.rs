//! SSH session factory module
//!
//! This module plugs russh client sessions into the session pool. It covers
//! everything the pool itself leaves to its collaborator:
//!
//! - opening the TCP connection (with socket options and a connect timeout)
//! - the SSH handshake and authentication (password or private key)
//! - the liveness probe, a `keepalive@openssh.com` global request
//! - closing a session with a polite disconnect
//!
//! # Example
//!
//! ```ignore
//! use sshpool::pool::SessionPool;
//! use sshpool::session::Identity;
//! use sshpool::ssh::{ConnectOptions, SshConnector};
//!
//! let pool = SessionPool::new(PoolConfig::default(), SshConnector::default());
//! let identity = Identity::new("root", "10.0.0.1", 22);
//! let options = ConnectOptions::new().password("secret").timeout(5);
//!
//! let session = pool.get_or_create(&identity.key(), &identity, &options).await?;
//! // ... use the session ...
//! pool.put(&identity.key(), session).await.ok();
//! ```

mod connector;
mod error;
mod handler;
mod options;
mod transport;

pub use connector::{SshConnector, SshSession};
pub use error::{Result, SshError};
pub use handler::ClientHandler;
pub use options::{decode_private_key, AuthMethod, ConnectOptions};
pub use transport::{connect_tcp, SocketOpts, DEFAULT_CONNECT_TIMEOUT_SECS};
