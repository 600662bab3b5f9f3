//! Instrumented facade over a [`KeyValueBackend`].
//!
//! [`InstrumentedStore`] wraps a backend, a [`MetricsSink`] and a
//! [`CallLogger`]. Every operation runs the same pipeline:
//!
//! ```text
//! log_attempt(entry) ──► backend call ──► Ok(v) ──► write_point(point) ──► Ok(v)
//!                                    │                      │
//!                                    └─ Err(e) ──► Err(e)   └─ Err(_) ──► debug!, Ok(v)
//! ```
//!
//! Backend errors are returned untouched and produce no metric point. Sink
//! errors never fail the call.
//!
//! The facade itself implements [`KeyValueBackend`], so it can be used
//! anywhere a backend is expected (including behind another decorator).
//!
//! # Example
//!
//! ```
//! use zinc_store::{
//!     CallContext, InstrumentedStore, KeyValueBackend, MemoryBackend, NoopSink,
//!     TracingCallLogger,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = InstrumentedStore::new(MemoryBackend::new(), NoopSink, TracingCallLogger);
//!     let ctx = CallContext::new();
//!
//!     store.set(&ctx, "a", "1").await.unwrap();
//!     assert_eq!(store.get(&ctx, "a").await.unwrap(), "1");
//! }
//! ```

use std::future::Future;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    backend::KeyValueBackend,
    context::CallContext,
    error::StoreResult,
    logging::CallLogger,
    metrics::{MetricPoint, MetricsSink},
    operation::{CallEntry, Operation},
};

/// A [`KeyValueBackend`] decorator that logs every attempt and records one
/// metric point per successful call.
///
/// # Type Parameters
///
/// * `B` - The wrapped backend
/// * `S` - The metrics sink
/// * `L` - The call logger
///
/// All three are injected; the facade never mutates them. It is `Send + Sync`
/// whenever they are, and adds no locking of its own.
#[derive(Debug, Clone)]
pub struct InstrumentedStore<B, S, L> {
    backend: B,
    sink: S,
    logger: L,
}

impl<B, S, L> InstrumentedStore<B, S, L>
where
    B: KeyValueBackend,
    S: MetricsSink,
    L: CallLogger,
{
    /// Wraps `backend`, writing metric points to `sink` and log entries to
    /// `logger`.
    #[must_use]
    pub fn new(backend: B, sink: S, logger: L) -> Self {
        Self { backend, sink, logger }
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the metrics sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the call logger.
    #[must_use]
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Consumes the facade, returning its parts.
    #[must_use]
    pub fn into_parts(self) -> (B, S, L) {
        (self.backend, self.sink, self.logger)
    }

    /// Runs one call through the log → call → metric pipeline.
    async fn observe<T, F>(
        &self,
        ctx: &CallContext,
        entry: CallEntry<'_>,
        call: F,
    ) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
        T: Send,
    {
        self.logger.log_attempt(&entry);

        let output = call.await?;

        let point = MetricPoint::operation(entry.service, entry.operation, Utc::now());
        if let Err(error) = self.sink.write_point(ctx, &point).await {
            tracing::debug!(
                service = entry.service,
                operation = %entry.operation,
                error = %error,
                "metric write failed"
            );
        }

        Ok(output)
    }

    fn entry(&self, operation: Operation) -> CallEntry<'_> {
        CallEntry::new(self.backend.service(), operation)
    }
}

#[async_trait]
impl<B, S, L> KeyValueBackend for InstrumentedStore<B, S, L>
where
    B: KeyValueBackend,
    S: MetricsSink,
    L: CallLogger,
{
    fn service(&self) -> &str {
        self.backend.service()
    }

    async fn ping(&self, ctx: &CallContext) -> StoreResult<()> {
        self.observe(ctx, self.entry(Operation::Ping), self.backend.ping(ctx)).await
    }

    async fn get(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        self.observe(ctx, self.entry(Operation::Get).key(key), self.backend.get(ctx, key)).await
    }

    async fn set(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        let entry = self.entry(Operation::Set).key(key).value(value);
        self.observe(ctx, entry, self.backend.set(ctx, key, value)).await
    }

    async fn delete(&self, ctx: &CallContext, key: &str) -> StoreResult<()> {
        self.observe(ctx, self.entry(Operation::Delete).key(key), self.backend.delete(ctx, key))
            .await
    }

    async fn list_push(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        let entry = self.entry(Operation::ListPush).key(key).value(value);
        self.observe(ctx, entry, self.backend.list_push(ctx, key, value)).await
    }

    async fn list_pop(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        let entry = self.entry(Operation::ListPop).key(key);
        self.observe(ctx, entry, self.backend.list_pop(ctx, key)).await
    }

    async fn list_length(&self, ctx: &CallContext, key: &str) -> StoreResult<i64> {
        let entry = self.entry(Operation::ListLength).key(key);
        self.observe(ctx, entry, self.backend.list_length(ctx, key)).await
    }
}
