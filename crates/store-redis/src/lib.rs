//! Redis implementation of [`KeyValueBackend`](zinc_store::KeyValueBackend).
//!
//! This crate provides [`RedisBackend`], the production backend for the
//! instrumented facade. It talks to Redis through the `redis` crate's
//! reconnecting [`ConnectionManager`](redis::aio::ConnectionManager) and maps
//! driver errors onto [`StoreError`](zinc_store::StoreError).
//!
//! # Quick Start
//!
//! ```no_run
//! // Requires a running Redis server.
//! use zinc_store::{CallContext, KeyValueBackend};
//! use zinc_store_redis::{RedisBackend, RedisBackendConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedisBackendConfig::builder().url("redis://localhost:6379").build()?;
//!     let backend = RedisBackend::connect(config).await?;
//!
//!     let ctx = CallContext::new();
//!     backend.set(&ctx, "greeting", "hello").await?;
//!     assert_eq!(backend.get(&ctx, "greeting").await?, "hello");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error Mapping
//!
//! | Driver error | `StoreError` |
//! |--------------|--------------|
//! | I/O timeout | `Timeout` |
//! | refused / dropped connection, other I/O | `Connection` |
//! | server error reply, unexpected reply type | `Protocol` |
//! | anything else | `Internal` |
//!
//! The driver error is kept as the `source` of the mapped error.

#![deny(unsafe_code)]

mod backend;
mod config;
mod error;

pub use backend::RedisBackend;
pub use config::{DEFAULT_SERVICE, RedisBackendConfig};
pub use error::{RedisStorageError, Result};
