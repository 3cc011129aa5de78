//! Configuration for futures.
//!
//! # Configuration Precedence
//!
//! 1. **Programmatic**: values set via `with_*` builder methods
//! 2. **Environment variables**: values from `PROMISSORY_*` env vars
//! 3. **Defaults**: built-in defaults from [`FutureConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `PROMISSORY_DEFAULT_TIMEOUT_MS` | `u64` | `default_timeout` |

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable name for the default future timeout.
pub const ENV_DEFAULT_TIMEOUT_MS: &str = "PROMISSORY_DEFAULT_TIMEOUT_MS";

/// Default timeout applied to futures created without an explicit one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held an unparseable value.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Human description of the expected type.
        expected: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },
}

/// Configuration for futures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FutureConfig {
    /// Timeout for futures created without an explicit one.
    #[serde(with = "millis")]
    pub default_timeout: Duration,
}

impl Default for FutureConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FutureConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults, then applies any `PROMISSORY_*` environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Sets the default timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Applies overrides for every variable that is set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(val) = read_env(ENV_DEFAULT_TIMEOUT_MS) {
            self.default_timeout = Duration::from_millis(parse_u64(ENV_DEFAULT_TIMEOUT_MS, &val)?);
        }
        Ok(())
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_u64(var: &'static str, val: &str) -> Result<u64, ConfigError> {
    val.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        var,
        expected: "milliseconds as u64",
        value: val.to_string(),
    })
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
