//! Configuration for the Redis backend.
//!
//! This module provides [`RedisBackendConfig`], which configures the connection
//! URL, the service tag reported on metric points, and an optional key prefix
//! for sharing one Redis database between applications.

use std::time::Duration;

use redis::IntoConnectionInfo;
use serde::{Deserialize, Serialize};
use zinc_store::ConfigError;

/// Default connection timeout (5 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default service tag.
pub const DEFAULT_SERVICE: &str = "redis";

/// Configuration for [`RedisBackend`](crate::RedisBackend).
///
/// # Key Prefix
///
/// When `key_prefix` is set, every key is stored as `"<prefix>:<key>"`. The
/// prefix is invisible to callers: `get("a")` reads `"<prefix>:a"`.
///
/// # Example
///
/// ```
/// use zinc_store_redis::RedisBackendConfig;
///
/// let config = RedisBackendConfig::builder()
///     .url("redis://localhost:6379/0")
///     .key_prefix("myapp")
///     .build()?;
///
/// assert_eq!(config.service(), "redis");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisBackendConfig {
    /// Connection URL (`redis://[:password@]host:port/db`).
    pub(crate) url: String,

    /// Service tag attached to metric points.
    #[serde(default = "default_service")]
    pub(crate) service: String,

    /// Optional namespace prepended to every key.
    #[serde(default)]
    pub(crate) key_prefix: Option<String>,

    /// Time allowed for the initial connection.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub(crate) connect_timeout: Duration,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_owned()
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

#[bon::bon]
impl RedisBackendConfig {
    /// Creates a new configuration, validating all fields.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL.
    ///
    /// # Optional Fields
    ///
    /// * `service` - Service tag (default: `"redis"`).
    /// * `key_prefix` - Namespace prepended to keys as `"<prefix>:"`.
    /// * `connect_timeout` - Initial connection timeout (default: 5 seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is empty or not a valid Redis URL
    /// - The service tag is empty
    /// - The key prefix is present but empty
    /// - The connect timeout is zero
    #[builder]
    pub fn new(
        #[builder(into)] url: String,
        #[builder(into, default = DEFAULT_SERVICE.to_owned())] service: String,
        #[builder(into)] key_prefix: Option<String>,
        #[builder(default = DEFAULT_CONNECT_TIMEOUT)] connect_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self { url, service, key_prefix, connect_timeout };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants enforced by the builder.
    ///
    /// Deserialized configurations bypass the builder, so
    /// [`RedisBackend::connect`](crate::RedisBackend::connect) calls this
    /// before opening a connection.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Empty { field: "redis.url" });
        }
        if let Err(err) = self.url.as_str().into_connection_info() {
            return Err(ConfigError::Invalid { field: "redis.url", message: err.to_string() });
        }
        if self.service.is_empty() {
            return Err(ConfigError::Empty { field: "redis.service" });
        }
        if self.key_prefix.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Empty { field: "redis.key_prefix" });
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::BelowMinimum {
                field: "redis.connect_timeout",
                value: format!("{:?}", self.connect_timeout),
                min: "1ms".to_owned(),
            });
        }
        Ok(())
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the service tag.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the key prefix, if configured.
    #[must_use]
    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
