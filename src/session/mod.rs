//! Session factory contract
//!
//! The pool never builds, authenticates or probes sessions itself. It drives
//! a [`SessionFactory`] for those, which keeps the pool engine independent of
//! any particular protocol.

use async_trait::async_trait;
use std::fmt;

/// Identity of a remote endpoint: who logs in where
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Login user
    pub user: String,
    /// Remote host name or address
    pub host: String,
    /// Remote port
    pub port: u16,
}

impl Identity {
    /// Create a new identity
    pub fn new(user: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Identity {
            user: user.into(),
            host: host.into(),
            port,
        }
    }

    /// Pool key for this identity, `user@host:port`
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Socket address string, `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Builds, probes and closes sessions on behalf of the pool
///
/// `probe` and `close` are always called without any pool lock held, so
/// implementations are free to block on network I/O.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    /// The session handle produced by this factory
    type Session: Send + 'static;

    /// Per-call construction options (credentials, timeouts)
    type Options: Send + Sync;

    /// Error produced by construction, probing or closing
    type Error: std::error::Error + Send + Sync + 'static;

    /// Establish and authenticate a new session
    async fn construct(
        &self,
        identity: &Identity,
        options: &Self::Options,
    ) -> Result<Self::Session, Self::Error>;

    /// Cheaply confirm that an established session is still usable
    async fn probe(&self, session: &Self::Session) -> Result<(), Self::Error>;

    /// Close a session; best effort
    async fn close(&self, session: Self::Session) -> Result<(), Self::Error>;
}
