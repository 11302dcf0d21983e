//! Error types for sshpool
//!
//! This module defines the errors that cross the pool boundary. Failures of
//! individual stored sessions (expiry, failed probes, close errors) are
//! resolved inside the pool and never show up here.

use std::fmt;
use thiserror::Error;

/// Reason a session was refused by [`SessionPool::put`](crate::pool::SessionPool::put)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionError {
    /// The pool already holds `max_total` sessions
    #[error("pool is full")]
    PoolFull,

    /// The key already holds `max_per_key` sessions
    #[error("key is full")]
    KeyFull,

    /// The pool has been closed
    #[error("pool is closed")]
    Closed,
}

/// A rejected put, handing the session back to the caller
///
/// The pool never takes ownership of a session it refused to store; the
/// caller decides whether to close it, keep using it, or retry later.
pub struct Rejected<S> {
    reason: AdmissionError,
    session: S,
}

impl<S> Rejected<S> {
    pub(crate) fn new(reason: AdmissionError, session: S) -> Self {
        Rejected { reason, session }
    }

    /// Why the session was refused
    pub fn reason(&self) -> AdmissionError {
        self.reason
    }

    /// Take the session back
    pub fn into_session(self) -> S {
        self.session
    }

    /// Split into the reason and the session
    pub fn into_parts(self) -> (AdmissionError, S) {
        (self.reason, self.session)
    }
}

impl<S> fmt::Debug for Rejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl<S> fmt::Display for Rejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session rejected: {}", self.reason)
    }
}

impl<S> std::error::Error for Rejected<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value outside its accepted range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A target has no way to authenticate
    #[error("Target {0} has no password or private key configured")]
    MissingCredentials(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_error_display() {
        assert_eq!(AdmissionError::PoolFull.to_string(), "pool is full");
        assert_eq!(AdmissionError::KeyFull.to_string(), "key is full");
        assert_eq!(AdmissionError::Closed.to_string(), "pool is closed");
    }

    #[test]
    fn test_rejected_returns_session() {
        let rejected = Rejected::new(AdmissionError::KeyFull, String::from("session"));
        assert_eq!(rejected.reason(), AdmissionError::KeyFull);
        assert_eq!(rejected.into_session(), "session");
    }

    #[test]
    fn test_rejected_into_parts() {
        let rejected = Rejected::new(AdmissionError::PoolFull, 7u32);
        let (reason, session) = rejected.into_parts();
        assert_eq!(reason, AdmissionError::PoolFull);
        assert_eq!(session, 7);
    }

    #[test]
    fn test_rejected_display_and_source() {
        struct Opaque;
        let rejected = Rejected::new(AdmissionError::PoolFull, Opaque);
        assert_eq!(rejected.to_string(), "session rejected: pool is full");

        let source = std::error::Error::source(&rejected).unwrap();
        assert_eq!(source.to_string(), "pool is full");

        let debug = format!("{:?}", rejected);
        assert!(debug.contains("PoolFull"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "max_per_key",
            reason: "must not exceed max_total".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for max_per_key: must not exceed max_total"
        );

        let err = ConfigError::MissingCredentials("root@db1:22".to_string());
        assert_eq!(
            err.to_string(),
            "Target root@db1:22 has no password or private key configured"
        );
    }
}
