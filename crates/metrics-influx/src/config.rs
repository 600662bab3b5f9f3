//! Configuration for the InfluxDB sink.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use zinc_store::ConfigError;

/// Default request timeout (10 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Smallest accepted request timeout.
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Timestamp precision sent with each write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// Nanoseconds.
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    /// Microseconds.
    #[serde(rename = "us")]
    Microseconds,
    /// Milliseconds.
    #[serde(rename = "ms")]
    Milliseconds,
    /// Seconds.
    #[serde(rename = "s")]
    Seconds,
}

impl Precision {
    /// Value of the `precision` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }

    /// Converts `timestamp` to an integer in this precision.
    ///
    /// Returns `None` if the timestamp does not fit in an `i64` (nanoseconds
    /// only cover roughly the years 1677 to 2262).
    #[must_use]
    pub fn timestamp(self, timestamp: DateTime<Utc>) -> Option<i64> {
        match self {
            Self::Nanoseconds => timestamp.timestamp_nanos_opt(),
            Self::Microseconds => Some(timestamp.timestamp_micros()),
            Self::Milliseconds => Some(timestamp.timestamp_millis()),
            Self::Seconds => Some(timestamp.timestamp()),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for [`InfluxSink`](crate::InfluxSink).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use zinc_metrics_influx::{InfluxConfig, Precision};
///
/// let config = InfluxConfig::builder()
///     .url("http://localhost:8086")
///     .token("my-token")
///     .org("acme")
///     .bucket("redis")
///     .timeout(Duration::from_secs(2))
///     .precision(Precision::Milliseconds)
///     .build()?;
///
/// assert_eq!(config.bucket(), "redis");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfluxConfig {
    /// Base URL of the InfluxDB server.
    pub(crate) url: String,

    /// API token, sent as `Authorization: Token <token>`.
    pub(crate) token: String,

    /// Organization name.
    pub(crate) org: String,

    /// Destination bucket.
    pub(crate) bucket: String,

    /// Per-request timeout.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub(crate) timeout: Duration,

    /// Timestamp precision.
    #[serde(default)]
    pub(crate) precision: Precision,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

#[bon::bon]
impl InfluxConfig {
    /// Creates a new configuration, validating all fields.
    ///
    /// # Arguments
    ///
    /// * `url` - Base URL of the InfluxDB server (`http` or `https`).
    /// * `token` - API token.
    /// * `org` - Organization name.
    /// * `bucket` - Destination bucket.
    ///
    /// # Optional Fields
    ///
    /// * `timeout` - Per-request timeout (default: 10 seconds, minimum: 1 ms).
    /// * `precision` - Timestamp precision (default: nanoseconds).
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is empty, the URL is not an
    /// absolute `http`/`https` URL, or the timeout is below 1 ms.
    #[builder]
    pub fn new(
        #[builder(into)] url: String,
        #[builder(into)] token: String,
        #[builder(into)] org: String,
        #[builder(into)] bucket: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(default)] precision: Precision,
    ) -> Result<Self, ConfigError> {
        let config = Self { url, token, org, bucket, timeout, precision };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants enforced by the builder.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("influx.url", &self.url),
            ("influx.token", &self.token),
            ("influx.org", &self.org),
            ("influx.bucket", &self.bucket),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Empty { field });
            }
        }

        self.base_url()?;

        if self.timeout < MIN_TIMEOUT {
            return Err(ConfigError::BelowMinimum {
                field: "influx.timeout",
                value: format!("{:?}", self.timeout),
                min: format!("{MIN_TIMEOUT:?}"),
            });
        }
        Ok(())
    }

    /// Parses the base URL, normalised to end with `/` so that relative
    /// joins keep any path prefix.
    pub(crate) fn base_url(&self) -> Result<Url, ConfigError> {
        let normalised = format!("{}/", self.url.trim_end_matches('/'));
        let url = Url::parse(&normalised)
            .map_err(|e| ConfigError::Invalid { field: "influx.url", message: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid {
                field: "influx.url",
                message: format!("unsupported scheme {other:?}"),
            }),
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the organization.
    #[must_use]
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Returns the bucket.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the timestamp precision.
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("timeout", &self.timeout)
            .field("precision", &self.precision)
            .finish()
    }
}
