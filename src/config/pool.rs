//! Session pool configuration
//!
//! Defines the admission bounds and timing of the session pool.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifetime and sweep interval used when the configured value is zero
pub const FALLBACK_PERIOD_SECS: u64 = 600;

/// Default session lifetime
fn default_lifetime() -> Duration {
    Duration::from_secs(FALLBACK_PERIOD_SECS)
}

/// Default sweep interval
fn default_sweep_interval() -> Duration {
    Duration::from_secs(FALLBACK_PERIOD_SECS)
}

/// Default maximum number of pooled sessions
fn default_max_total() -> usize {
    1000
}

/// Default maximum number of pooled sessions per key
fn default_max_per_key() -> usize {
    3
}

/// Default age under which a session is trusted without a probe
fn default_fresh_threshold() -> Duration {
    Duration::from_secs(60)
}

/// Default probe timeout
fn default_probe_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Session pool configuration
///
/// Durations are written in TOML as seconds; fractions such as `0.5` are kept.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// How long a pooled session stays valid
    #[serde(default = "default_lifetime", with = "duration_secs")]
    pub lifetime: Duration,

    /// How often expired sessions are swept
    #[serde(default = "default_sweep_interval", with = "duration_secs")]
    pub sweep_interval: Duration,

    /// Maximum number of sessions held across all keys
    #[serde(default = "default_max_total")]
    pub max_total: usize,

    /// Maximum number of sessions held for a single key
    #[serde(default = "default_max_per_key")]
    pub max_per_key: usize,

    /// Sessions younger than this skip the liveness probe on checkout
    #[serde(default = "default_fresh_threshold", with = "duration_secs")]
    pub fresh_threshold: Duration,

    /// Upper bound on a single liveness probe
    #[serde(default = "default_probe_timeout", with = "duration_secs")]
    pub probe_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            lifetime: default_lifetime(),
            sweep_interval: default_sweep_interval(),
            max_total: default_max_total(),
            max_per_key: default_max_per_key(),
            fresh_threshold: default_fresh_threshold(),
            probe_timeout: default_probe_timeout(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration from the four core pool parameters
    pub fn new(lifetime: Duration, sweep_interval: Duration, max_total: usize, max_per_key: usize) -> Self {
        PoolConfig {
            lifetime,
            sweep_interval,
            max_total,
            max_per_key,
            ..Default::default()
        }
        .normalized()
    }

    /// Replace zero values with the pool defaults
    ///
    /// A zero fresh threshold is kept: it means every checkout is probed.
    pub fn normalized(mut self) -> Self {
        if self.lifetime.is_zero() {
            self.lifetime = default_lifetime();
        }
        if self.sweep_interval.is_zero() {
            self.sweep_interval = default_sweep_interval();
        }
        if self.max_total == 0 {
            self.max_total = default_max_total();
        }
        if self.max_per_key == 0 {
            self.max_per_key = default_max_per_key();
        }
        if self.probe_timeout.is_zero() {
            self.probe_timeout = default_probe_timeout();
        }
        self
    }

    /// Set the fresh threshold
    pub fn with_fresh_threshold(mut self, threshold: Duration) -> Self {
        self.fresh_threshold = threshold;
        self
    }

    /// Set the probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Session lifetime
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sweep interval
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Fresh threshold
    pub fn fresh_threshold(&self) -> Duration {
        self.fresh_threshold
    }

    /// Probe timeout
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Validate the pool configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_per_key > self.max_total && self.max_total != 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_per_key",
                reason: "cannot be greater than max_total".to_string(),
            });
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "probe_timeout",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Durations as (possibly fractional) seconds
mod duration_secs {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            serializer.serialize_f64(duration.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
