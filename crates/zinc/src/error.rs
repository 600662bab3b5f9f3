//! Assembly errors.

use thiserror::Error;
use zinc_store::{ConfigError, MetricsError};
use zinc_store_redis::RedisStorageError;

/// Result type alias for [`connect`](crate::connect).
pub type Result<T> = std::result::Result<T, ZincError>;

/// Errors returned while assembling a [`ZincStore`](crate::ZincStore).
///
/// Once assembled, the store itself only returns
/// [`StoreError`](zinc_store::StoreError).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ZincError {
    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The Redis backend could not be connected.
    #[error("Redis backend unavailable: {0}")]
    Redis(#[from] RedisStorageError),

    /// The Influx sink could not be built or did not answer its ping.
    #[error("Metrics sink unavailable: {0}")]
    Metrics(#[from] MetricsError),
}
