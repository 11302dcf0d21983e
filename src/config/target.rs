//! Target host configuration
//!
//! Describes the remote SSH endpoints the binary keeps sessions open to.

use crate::error::ConfigError;
use crate::session::Identity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default SSH port
fn default_port() -> u16 {
    22
}

/// Default connect timeout in seconds
fn default_connect_timeout() -> u64 {
    10
}

/// Default number of sessions to keep per target
fn default_connections() -> usize {
    1
}

/// A remote SSH endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Login user
    pub user: String,

    /// Remote host name or address
    pub host: String,

    /// Remote port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Password for password authentication
    #[serde(default)]
    pub password: Option<String>,

    /// Path to an OpenSSH private key
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,

    /// Passphrase protecting the private key
    #[serde(default)]
    pub passphrase: Option<String>,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Number of sessions to pre-open and keep pooled
    #[serde(default = "default_connections")]
    pub connections: usize,
}

impl TargetConfig {
    /// Identity of this target
    pub fn identity(&self) -> Identity {
        Identity::new(&self.user, &self.host, self.port)
    }

    /// Check if any credentials are configured
    pub fn has_credentials(&self) -> bool {
        self.password.is_some() || self.private_key_file.is_some()
    }

    /// Validate the target
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host",
                reason: "must not be empty".to_string(),
            });
        }
        if self.user.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.has_credentials() {
            return Err(ConfigError::MissingCredentials(self.identity().key()));
        }
        Ok(())
    }
}
