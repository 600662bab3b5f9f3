//! Key-value backend trait definition.
//!
//! [`KeyValueBackend`] is the seam between the instrumented facade and the
//! store driver. Implementations map their driver errors onto
//! [`StoreError`](crate::StoreError) and honour the [`CallContext`] passed to
//! every method (usually via [`CallContext::guard`]).
//!
//! # Implementing a Backend
//!
//! 1. Implement [`KeyValueBackend`], wrapping each driver call in `ctx.guard(..)`
//! 2. Map driver errors to [`StoreError`](crate::StoreError), keeping the source
//! 3. Report a missing key from `get` / `list_pop` as
//!    [`StoreError::NotFound`](crate::StoreError::NotFound)
//!
//! See [`MemoryBackend`](crate::MemoryBackend) for a reference implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{context::CallContext, error::StoreResult};

/// String key-value and list store.
///
/// Backends must be `Send + Sync`; the facade shares one instance across all
/// concurrent callers.
///
/// | Method | Redis command | Missing key |
/// |--------|---------------|-------------|
/// | [`ping`](KeyValueBackend::ping) | `PING` | - |
/// | [`get`](KeyValueBackend::get) | `GET` | `NotFound` |
/// | [`set`](KeyValueBackend::set) | `SET` | creates |
/// | [`delete`](KeyValueBackend::delete) | `DEL` | `Ok(())` |
/// | [`list_push`](KeyValueBackend::list_push) | `LPUSH` | creates |
/// | [`list_pop`](KeyValueBackend::list_pop) | `RPOP` | `NotFound` |
/// | [`list_length`](KeyValueBackend::list_length) | `LLEN` | `Ok(0)` |
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Fixed service tag attached to every metric point (e.g. `"redis"`).
    fn service(&self) -> &str;

    /// Round-trips to the backend to verify it is reachable.
    #[must_use = "backend operations may fail and errors must be handled"]
    async fn ping(&self, ctx: &CallContext) -> StoreResult<()>;

    /// Reads the string stored at `key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`](crate::StoreError::NotFound) if the key does not exist.
    #[must_use = "backend operations may fail and errors must be handled"]
    async fn get(&self, ctx: &CallContext, key: &str) -> StoreResult<String>;

    /// Stores `value` at `key` without expiry, replacing whatever was there.
    #[must_use = "backend operations may fail and errors must be handled"]
    async fn set(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key succeeds.
    #[must_use = "backend operations may fail and errors must be handled"]
    async fn delete(&self, ctx: &CallContext, key: &str) -> StoreResult<()>;

    /// Pushes `value` onto the head of the list at `key`, creating it if needed.
    #[must_use = "backend operations may fail and errors must be handled"]
    async fn list_push(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()>;

    /// Pops from the tail of the list at `key`. Combined with
    /// [`list_push`](KeyValueBackend::list_push) this gives FIFO order.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`](crate::StoreError::NotFound) if the list is
    /// empty or missing.
    #[must_use = "backend operations may fail and errors must be handled"]
    async fn list_pop(&self, ctx: &CallContext, key: &str) -> StoreResult<String>;

    /// Returns the length of the list at `key` (0 if missing).
    #[must_use = "backend operations may fail and errors must be handled"]
    async fn list_length(&self, ctx: &CallContext, key: &str) -> StoreResult<i64>;
}

#[async_trait]
impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Arc<B> {
    fn service(&self) -> &str {
        (**self).service()
    }

    async fn ping(&self, ctx: &CallContext) -> StoreResult<()> {
        (**self).ping(ctx).await
    }

    async fn get(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        (**self).get(ctx, key).await
    }

    async fn set(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(ctx, key, value).await
    }

    async fn delete(&self, ctx: &CallContext, key: &str) -> StoreResult<()> {
        (**self).delete(ctx, key).await
    }

    async fn list_push(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        (**self).list_push(ctx, key, value).await
    }

    async fn list_pop(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        (**self).list_pop(ctx, key).await
    }

    async fn list_length(&self, ctx: &CallContext, key: &str) -> StoreResult<i64> {
        (**self).list_length(ctx, key).await
    }
}
