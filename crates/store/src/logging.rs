//! Call logging and process-wide tracing setup.
//!
//! # Architecture
//!
//! The [`CallLogger`] trait receives one [`CallEntry`] per attempted call,
//! before the backend runs:
//!
//! - [`TracingCallLogger`]: emits a `tracing` DEBUG event with `service`, `operation`, `key` and
//!   `value` fields and the message `"<service> <operation>"`.
//! - [`NoopCallLogger`]: discards entries.
//!
//! [`init_tracing`] installs the global `tracing` subscriber for a
//! [`LogProfile`]. It is optional: the logger only emits events, and whatever
//! subscriber the host process installs decides where they go.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter, fmt as fmt_layer,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::{error::ConfigError, operation::CallEntry};

/// Sink for per-call log entries.
///
/// Logging is synchronous and infallible; implementations must not block on
/// I/O in a way that would stall the calling task.
pub trait CallLogger: Send + Sync {
    /// Records that `entry` is about to be sent to the backend.
    fn log_attempt(&self, entry: &CallEntry<'_>);
}

impl<L: CallLogger + ?Sized> CallLogger for Arc<L> {
    fn log_attempt(&self, entry: &CallEntry<'_>) {
        (**self).log_attempt(entry);
    }
}

/// Logger that emits structured `tracing` DEBUG events.
///
/// Field mapping:
/// - `service` - backend service tag
/// - `operation` - operation name (e.g. `"get"`)
/// - `key` - key argument, when present
/// - `value` - value argument, when present
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCallLogger;

impl CallLogger for TracingCallLogger {
    fn log_attempt(&self, entry: &CallEntry<'_>) {
        tracing::debug!(
            service = entry.service,
            operation = %entry.operation,
            key = entry.key,
            value = entry.value,
            "{} {}",
            entry.service,
            entry.operation
        );
    }
}

/// Logger that discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallLogger;

impl CallLogger for NoopCallLogger {
    fn log_attempt(&self, _entry: &CallEntry<'_>) {}
}

/// Output profile for [`init_tracing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogProfile {
    /// Human-readable output, `debug` and above.
    Dev,
    /// JSON lines, `info` and above.
    #[default]
    Prod,
}

impl LogProfile {
    /// Filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub const fn default_directive(self) -> &'static str {
        match self {
            Self::Dev => "debug",
            Self::Prod => "info",
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for LogProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(ConfigError::Unrecognized {
                field: "log_profile",
                value: other.to_owned(),
                expected: "dev, prod",
            }),
        }
    }
}

/// Installs the global `tracing` subscriber for `profile`.
///
/// `RUST_LOG` overrides the profile's default level.
///
/// # Errors
///
/// Returns [`TryInitError`] if a global subscriber is already installed.
pub fn init_tracing(profile: LogProfile) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
    let registry = tracing_subscriber::registry().with(filter);

    match profile {
        LogProfile::Dev => registry.with(fmt_layer::layer().with_target(true)).try_init(),
        LogProfile::Prod => registry.with(fmt_layer::layer().json()).try_init(),
    }
}
