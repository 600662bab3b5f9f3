//! Instrumented Redis client.
//!
//! Every call is logged at debug level, executed against Redis, and on
//! success reported to InfluxDB as one point (`measurement = field =
//! operation`, `tag service = <service>`, value `1`). Errors from Redis are
//! returned unchanged; failures to write the point never fail the call.
//!
//! This crate only wires the pieces together:
//!
//! | Piece | Crate |
//! |-------|-------|
//! | facade, contexts, errors, logging | `zinc-store` |
//! | Redis backend | `zinc-store-redis` |
//! | InfluxDB sink | `zinc-metrics-influx` |
//!
//! # Quick Start
//!
//! ```no_run
//! // Requires running Redis and InfluxDB servers.
//! use zinc::{CallContext, KeyValueBackend, ZincConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config: ZincConfig = serde_json::from_str(&std::fs::read_to_string("zinc.json")?)?;
//!     zinc::init_tracing(config.log_profile())?;
//!
//!     let store = zinc::connect(&config).await?;
//!     let ctx = CallContext::new().with_timeout(std::time::Duration::from_secs(1));
//!
//!     store.set(&ctx, "greeting", "hello").await?;
//!     assert_eq!(store.get(&ctx, "greeting").await?, "hello");
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

mod config;
mod error;

pub use config::ZincConfig;
pub use error::{Result, ZincError};
pub use zinc_metrics_influx::{InfluxConfig, InfluxSink, Precision};
pub use zinc_store::{
    CallContext, CancellationToken, ConfigError, InstrumentedStore, KeyValueBackend, LogProfile,
    MetricsError, StoreError, StoreResult, TracingCallLogger, init_tracing,
};
pub use zinc_store_redis::{RedisBackend, RedisBackendConfig, RedisStorageError};

/// The store returned by [`connect`].
pub type ZincStore = InstrumentedStore<RedisBackend, InfluxSink, TracingCallLogger>;

/// Validates `config`, checks InfluxDB is reachable, then connects to Redis.
///
/// The global `tracing` subscriber is left alone; install it with
/// [`init_tracing`] if the application has none.
///
/// # Errors
///
/// Returns [`ZincError::Config`] for an invalid configuration,
/// [`ZincError::Metrics`] if InfluxDB does not answer its ping, and
/// [`ZincError::Redis`] if the Redis connection fails.
pub async fn connect(config: &ZincConfig) -> Result<ZincStore> {
    config.validate()?;

    let sink = InfluxSink::connect(config.influx()).await?;
    let backend = RedisBackend::connect(config.redis().clone()).await?;

    tracing::debug!(
        service = config.redis().service(),
        bucket = config.influx().bucket(),
        log_profile = %config.log_profile(),
        "zinc store ready"
    );

    Ok(InstrumentedStore::new(backend, sink, TracingCallLogger))
}
