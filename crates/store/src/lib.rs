//! Instrumented key-value store client.
//!
//! This crate provides the [`KeyValueBackend`] trait for string/list stores,
//! the [`MetricsSink`] and [`CallLogger`] seams for observability, and the
//! [`InstrumentedStore`] facade that ties them together: every call is logged
//! before it runs, and every successful call records exactly one metric point.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application code                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    InstrumentedStore                        │
//! │        log attempt ─► backend call ─► metric point          │
//! ├───────────────────┬──────────────────┬──────────────────────┤
//! │  KeyValueBackend  │   MetricsSink    │     CallLogger       │
//! ├─────────┬─────────┼──────────┬───────┼──────────────────────┤
//! │ Memory  │ Redis   │ Influx   │ Noop  │ TracingCallLogger    │
//! └─────────┴─────────┴──────────┴───────┴──────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use zinc_store::{
//!     CallContext, InstrumentedStore, KeyValueBackend, MemoryBackend, NoopSink,
//!     TracingCallLogger,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InstrumentedStore::new(MemoryBackend::new(), NoopSink, TracingCallLogger);
//!     let ctx = CallContext::new();
//!
//!     store.list_push(&ctx, "jobs", "job-1").await?;
//!     assert_eq!(store.list_length(&ctx, "jobs").await?, 1);
//!     assert_eq!(store.list_pop(&ctx, "jobs").await?, "job-1");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Available Backends
//!
//! | Backend | Use Case | Persistence |
//! |---------|----------|-------------|
//! | [`MemoryBackend`] | Testing, development | No |
//! | `RedisBackend` (in `zinc-store-redis`) | Production | Yes |
//!
//! # Cancellation
//!
//! Every operation takes a [`CallContext`]. A cancelled or expired context
//! fails the backend call with [`StoreError::Cancelled`] or
//! [`StoreError::Timeout`], and no metric point is recorded.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with recording/failing doubles and assertion
//!   macros. Enable this in `[dev-dependencies]` for integration tests.
//! - **`failpoints`**: Compiles the `memory-backend-call` fail point into [`MemoryBackend`].

#![deny(unsafe_code)]

pub mod backend;
pub mod context;
pub mod error;
pub mod instrumented;
pub mod logging;
pub mod memory;
pub mod metrics;
pub mod operation;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

// Re-export primary types at crate root for convenience
pub use backend::KeyValueBackend;
pub use context::CallContext;
pub use error::{
    BoxError, ConfigError, Interruption, MetricsError, MetricsResult, StoreError, StoreResult,
};
pub use instrumented::InstrumentedStore;
pub use logging::{CallLogger, LogProfile, NoopCallLogger, TracingCallLogger, init_tracing};
pub use memory::MemoryBackend;
pub use metrics::{FieldValue, MetricPoint, MetricsSink, NoopSink, SERVICE_TAG};
pub use operation::{CallEntry, Operation};
pub use tokio_util::sync::CancellationToken;
