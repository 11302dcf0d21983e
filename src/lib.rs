//! # sshpool - Bounded, Time-Expiring SSH Session Pool
//!
//! sshpool keeps authenticated remote sessions around so callers can check
//! out a live one instead of paying for a new handshake every time. Sessions
//! are grouped by an identity key (typically `user@host:port`), bounded in
//! number, and reclaimed once they go stale.
//!
//! ## Features
//!
//! - **Admission Control**: Global and per-key bounds; a full pool rejects, never blocks
//! - **FIFO Checkout**: Sessions for a key come back in the order they were stored
//! - **Checkout Validation**: Stale sessions are dropped and older ones are probed before use
//! - **Background Sweep**: Idle sessions that were never checked out are still reclaimed
//! - **Pluggable Sessions**: Any [`SessionFactory`] can be pooled; russh is built in
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sshpool::config::PoolConfig;
//! use sshpool::pool::SessionPool;
//! use sshpool::session::Identity;
//! use sshpool::ssh::{ConnectOptions, SshConnector};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = SessionPool::new(PoolConfig::default(), SshConnector::default());
//!     let identity = Identity::new("root", "10.0.0.1", 22);
//!     let options = ConnectOptions::new().password("secret");
//!
//!     {
//!         let session = pool.checkout(&identity, &options).await?;
//!         // ... use the session, it is checked back in on drop ...
//!     }
//!
//!     pool.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller -> SessionPool::get -> KeyedQueue pop -> (expired? close) -> (fresh? return : probe) -> session
//! caller -> SessionPool::put -> admission check -> KeyedQueue push
//! sweeper -> SessionPool::sweep -> per-queue scan -> close expired
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod pool;
pub mod session;
#[cfg(feature = "ssh")]
pub mod ssh;

// Re-export commonly used items
pub use config::{load_config, Config, PoolConfig};
pub use error::{AdmissionError, ConfigError, Rejected};
pub use pool::{new_pool, PooledSession, SessionPool};
pub use session::{Identity, SessionFactory};

/// Version of the sshpool library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
