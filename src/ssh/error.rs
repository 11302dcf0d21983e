//! Error types for the SSH session factory.

use std::io;
use thiserror::Error;

/// Result type for SSH session operations.
pub type Result<T> = std::result::Result<T, SshError>;

/// Errors that can occur while building, probing or closing SSH sessions.
#[derive(Debug, Error)]
pub enum SshError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// SSH protocol error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Private key could not be decoded.
    #[error("Key error: {0}")]
    Key(#[from] russh::keys::Error),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Operation timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session is already closed.
    #[error("Session closed")]
    Closed,
}
