//! Per-connection SSH options
//!
//! Authentication methods are tried in the order they were added.

use super::error::Result;
use russh::keys::PrivateKey;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// A way to authenticate a new session
#[derive(Clone)]
pub enum AuthMethod {
    /// Password authentication
    Password(String),
    /// Public key authentication with an OpenSSH/PEM encoded private key
    PrivateKey {
        /// Encoded private key
        pem: String,
        /// Passphrase protecting the key
        passphrase: Option<String>,
    },
}

impl AuthMethod {
    /// Short name of the method, safe to log
    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::Password(_) => "password",
            AuthMethod::PrivateKey { .. } => "publickey",
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("Password(<redacted>)"),
            AuthMethod::PrivateKey { passphrase, .. } => f
                .debug_struct("PrivateKey")
                .field("pem", &"<redacted>")
                .field("has_passphrase", &passphrase.is_some())
                .finish(),
        }
    }
}

/// Options for building a new SSH session
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Authentication methods, tried in order
    pub auth: Vec<AuthMethod>,
    /// Upper bound on connect + handshake + authentication
    pub timeout: Option<Duration>,
}

impl ConnectOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add password authentication
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth.push(AuthMethod::Password(password.into()));
        self
    }

    /// Add public key authentication
    ///
    /// An empty passphrase means the key is not encrypted.
    pub fn private_key(mut self, pem: impl Into<String>, passphrase: impl Into<String>) -> Self {
        let passphrase = passphrase.into();
        self.auth.push(AuthMethod::PrivateKey {
            pem: pem.into(),
            passphrase: (!passphrase.is_empty()).then_some(passphrase),
        });
        self
    }

    /// Set the session establishment timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(Duration::from_secs(seconds));
        self
    }
}

/// Decode a private key
///
/// With a passphrase the key is first decoded as encrypted; if that fails
/// it is retried as an unencrypted key.
pub fn decode_private_key(pem: &str, passphrase: Option<&str>) -> Result<PrivateKey> {
    if let Some(passphrase) = passphrase.filter(|p| !p.is_empty()) {
        match russh::keys::decode_secret_key(pem, Some(passphrase)) {
            Ok(key) => return Ok(key),
            Err(e) => debug!("Failed to decode key with passphrase: {}", e),
        }
    }
    Ok(russh::keys::decode_secret_key(pem, None)?)
}
