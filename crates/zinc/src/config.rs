//! Top-level configuration.

use serde::{Deserialize, Serialize};
use zinc_metrics_influx::InfluxConfig;
use zinc_store::{ConfigError, LogProfile};
use zinc_store_redis::RedisBackendConfig;

/// Everything [`connect`](crate::connect) needs.
///
/// Deserializes from any serde source. Unknown fields are rejected, and so
/// is any `log_profile` other than `"dev"` or `"prod"`.
///
/// ```
/// let config: zinc::ZincConfig = serde_json::from_str(r#"{
///     "log_profile": "dev",
///     "redis": { "url": "redis://localhost:6379/0" },
///     "influx": {
///         "url": "http://localhost:8086",
///         "token": "my-token",
///         "org": "acme",
///         "bucket": "redis"
///     }
/// }"#)?;
/// config.validate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZincConfig {
    /// Logging profile (default: `prod`).
    #[serde(default)]
    log_profile: LogProfile,

    /// Redis connection settings.
    redis: RedisBackendConfig,

    /// InfluxDB sink settings.
    influx: InfluxConfig,
}

impl ZincConfig {
    /// Assembles a configuration from already-validated parts.
    #[must_use]
    pub fn new(log_profile: LogProfile, redis: RedisBackendConfig, influx: InfluxConfig) -> Self {
        Self { log_profile, redis, influx }
    }

    /// Validates the Redis and Influx sections.
    ///
    /// Deserialization bypasses the builders, so call this (or let
    /// [`connect`](crate::connect) call it) before using a config read from
    /// a file.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.redis.validate()?;
        self.influx.validate()
    }

    /// Returns the logging profile.
    #[must_use]
    pub fn log_profile(&self) -> LogProfile {
        self.log_profile
    }

    /// Returns the Redis section.
    #[must_use]
    pub fn redis(&self) -> &RedisBackendConfig {
        &self.redis
    }

    /// Returns the Influx section.
    #[must_use]
    pub fn influx(&self) -> &InfluxConfig {
        &self.influx
    }
}
