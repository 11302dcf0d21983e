//! Configuration module for sshpool
//!
//! This module provides configuration types and parsing for the pool and
//! the targets the binary keeps sessions open to.

mod pool;
mod target;

pub use pool::{PoolConfig, FALLBACK_PERIOD_SECS};
pub use target::TargetConfig;

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Pool configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// Remote endpoints
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl Config {
    /// Validate the pool and every target
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;
        for target in &self.targets {
            target.validate()?;
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).with_context(|| "Failed to parse configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
