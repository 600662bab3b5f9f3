//! Error types and result aliases.
//!
//! Three error families exist in this crate:
//!
//! - [`StoreError`] - anything a [`KeyValueBackend`](crate::KeyValueBackend) can fail with. The
//!   instrumented facade returns these to callers untouched.
//! - [`MetricsError`] - failures writing a [`MetricPoint`](crate::MetricPoint) to a
//!   [`MetricsSink`](crate::MetricsSink). The facade never surfaces these.
//! - [`ConfigError`] - validation failures when building configuration.
//!
//! # Example
//!
//! ```
//! use zinc_store::{StoreError, StoreResult};
//!
//! fn lookup(key: &str) -> StoreResult<String> {
//!     Err(StoreError::not_found(key))
//! }
//!
//! assert!(lookup("user:1").unwrap_err().is_not_found());
//! ```

use std::{fmt, sync::Arc};

use thiserror::Error;

/// A shared error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for metric sink writes.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Reason a [`CallContext`](crate::CallContext) stopped a call before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// The cancellation token was triggered.
    Cancelled,
    /// The deadline elapsed.
    DeadlineExceeded,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Errors produced by key-value backends.
///
/// Backends map their driver errors onto these variants at their own boundary.
/// Callers of the instrumented facade see exactly what the backend returned, so
/// they can tell a missing key apart from a lost connection.
///
/// # Non-exhaustive
///
/// New variants may be added in minor releases; downstream matches need a
/// wildcard arm.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The key (or list) does not exist.
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found.
        key: String,
    },

    /// Network or connection failure talking to the backend.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// The backend answered, but not in the expected shape (wrong value type,
    /// unexpected reply, server-side command error).
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol error.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// Catch-all for backend-specific failures.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// The call's deadline elapsed before the backend answered.
    #[error("Operation timeout")]
    Timeout,

    /// The call's cancellation token fired before the backend answered.
    #[error("Operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Creates a `NotFound` error for the given key.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a `Protocol` error with the given message.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol { message: message.into(), source: None }
    }

    /// Creates a `Protocol` error with a message and source error.
    #[must_use]
    pub fn protocol_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Protocol { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates an `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates an `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Creates a `Cancelled` error.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    /// Returns `true` for [`StoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` when the call was stopped by its context, either by
    /// cancellation or by an elapsed deadline.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout)
    }
}

impl From<Interruption> for StoreError {
    fn from(reason: Interruption) -> Self {
        match reason {
            Interruption::Cancelled => Self::Cancelled,
            Interruption::DeadlineExceeded => Self::Timeout,
        }
    }
}

/// Errors produced while writing a metric point.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetricsError {
    /// The sink could not be reached.
    #[error("Metrics transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// The sink answered with a non-success status.
    #[error("Metrics write rejected with status {status}: {body}")]
    Rejected {
        /// HTTP (or sink-specific) status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },

    /// The point could not be encoded for the sink.
    #[error("Metrics encoding error: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },

    /// The sink was configured with invalid settings.
    #[error("Invalid metrics configuration: {0}")]
    Config(#[from] ConfigError),

    /// The write's deadline elapsed.
    #[error("Metrics write timeout")]
    Timeout,

    /// The write's cancellation token fired.
    #[error("Metrics write cancelled")]
    Cancelled,
}

impl MetricsError {
    /// Creates a `Transport` error with the given message.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into(), source: None }
    }

    /// Creates a `Transport` error with a message and source error.
    #[must_use]
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates an `Encoding` error with the given message.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding { message: message.into() }
    }
}

impl From<Interruption> for MetricsError {
    fn from(reason: Interruption) -> Self {
        match reason {
            Interruption::Cancelled => Self::Cancelled,
            Interruption::DeadlineExceeded => Self::Timeout,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required field was empty or missing.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A value was below its allowed minimum.
    #[error("{field} = {value} is below the minimum of {min}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value, rendered for display.
        value: String,
        /// The minimum allowed value, rendered for display.
        min: String,
    },

    /// A value was not one of the accepted choices.
    #[error("invalid {field}: {value:?} (expected one of: {expected})")]
    Unrecognized {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// The accepted values, comma separated.
        expected: &'static str,
    },

    /// A value was syntactically invalid.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },
}
