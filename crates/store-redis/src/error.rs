//! Error types for the Redis backend.
//!
//! This module maps `redis` driver errors onto the generic
//! [`StoreError`](zinc_store::StoreError) type.

use std::time::Duration;

use redis::{ErrorKind, RedisError};
use thiserror::Error;
use zinc_store::{ConfigError, StoreError};

/// Result type alias for Redis backend construction.
pub type Result<T> = std::result::Result<T, RedisStorageError>;

/// Errors specific to the Redis backend.
#[derive(Debug, Error)]
pub enum RedisStorageError {
    /// Error from the Redis driver.
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The initial connection did not complete in time.
    #[error("Timed out connecting to Redis after {0:?}")]
    ConnectTimeout(Duration),
}

/// Total over every variant so that [`RedisBackend::connect`] failures can be
/// reported through the same [`StoreError`] as per-call failures. Store
/// operations only ever produce the `Redis` variant.
///
/// [`RedisBackend::connect`]: crate::RedisBackend::connect
impl From<RedisStorageError> for StoreError {
    fn from(err: RedisStorageError) -> Self {
        match err {
            RedisStorageError::Redis(source) => redis_error_to_store_error(source),
            RedisStorageError::Config(source) => {
                StoreError::internal_with_source("invalid Redis configuration", source)
            },
            RedisStorageError::ConnectTimeout(_) => StoreError::timeout(),
        }
    }
}

/// Converts a driver error to a store error, keeping the driver error as the
/// source.
fn redis_error_to_store_error(err: RedisError) -> StoreError {
    if err.is_timeout() {
        return StoreError::timeout();
    }

    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        return StoreError::connection_with_source(err.to_string(), err);
    }

    match err.kind() {
        // Server replied with an error (e.g. `WRONGTYPE`, `ERR unknown command`),
        // or with a reply of an unexpected shape.
        ErrorKind::ResponseError
        | ErrorKind::ExtensionError
        | ErrorKind::TypeError
        | ErrorKind::ExecAbortError
        | ErrorKind::NoScriptError
        | ErrorKind::ReadOnly => StoreError::protocol_with_source(err.to_string(), err),
        ErrorKind::BusyLoadingError | ErrorKind::TryAgain => {
            StoreError::connection_with_source(err.to_string(), err)
        },
        _ => StoreError::internal_with_source(err.to_string(), err),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::io;

    use super::*;

    fn convert(err: RedisError) -> StoreError {
        RedisStorageError::from(err).into()
    }

    #[test]
    fn test_io_timeout_maps_to_timeout() {
        let err = RedisError::from(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        assert!(matches!(convert(err), StoreError::Timeout));
    }

    #[test]
    fn test_refused_connection_maps_to_connection() {
        let err =
            RedisError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"));
        let store_err = convert(err);
        assert!(matches!(store_err, StoreError::Connection { .. }), "got {store_err:?}");
        assert!(std::error::Error::source(&store_err).is_some());
    }

    #[test]
    fn test_reset_connection_maps_to_connection() {
        let err = RedisError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(matches!(convert(err), StoreError::Connection { .. }));
    }

    #[test]
    fn test_type_error_maps_to_protocol() {
        let err = RedisError::from((ErrorKind::TypeError, "Response was of incompatible type"));
        let store_err = convert(err);
        match store_err {
            StoreError::Protocol { message, source } => {
                assert!(message.contains("incompatible type"), "message: {message}");
                assert!(source.is_some());
            },
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn test_response_error_maps_to_protocol() {
        let err = RedisError::from((ErrorKind::ResponseError, "ERR syntax error"));
        assert!(matches!(convert(err), StoreError::Protocol { .. }));
    }

    #[test]
    fn test_client_config_error_maps_to_internal() {
        let err = RedisError::from((ErrorKind::InvalidClientConfig, "Redis URL did not parse"));
        assert!(matches!(convert(err), StoreError::Internal { .. }));
    }

    #[test]
    fn test_config_error_maps_to_internal() {
        let err = RedisStorageError::from(ConfigError::Empty { field: "redis.url" });
        assert_eq!(err.to_string(), "Configuration error: redis.url must not be empty");
        assert!(matches!(StoreError::from(err), StoreError::Internal { .. }));
    }

    #[test]
    fn test_connect_timeout_maps_to_timeout() {
        let err = RedisStorageError::ConnectTimeout(Duration::from_secs(5));
        assert!(matches!(StoreError::from(err), StoreError::Timeout));
    }
}
