//! In-memory key-value backend.
//!
//! [`MemoryBackend`] implements [`KeyValueBackend`] over a `HashMap` guarded by
//! a [`parking_lot::RwLock`]. It follows Redis semantics for the subset of
//! commands the facade exposes, including `WRONGTYPE` errors when a string
//! command hits a list (and vice versa), and deleting a list once its last
//! element is popped.
//!
//! # Example
//!
//! ```
//! use zinc_store::{CallContext, KeyValueBackend, MemoryBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MemoryBackend::new();
//!     let ctx = CallContext::new();
//!
//!     backend.set(&ctx, "greeting", "hello").await.unwrap();
//!     assert_eq!(backend.get(&ctx, "greeting").await.unwrap(), "hello");
//! }
//! ```
//!
//! # Limitations
//!
//! - Data is not persisted
//! - No expiry support

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use fail::fail_point;
use parking_lot::RwLock;

use crate::{
    backend::KeyValueBackend,
    context::CallContext,
    error::{StoreError, StoreResult},
};

/// Service tag reported by [`MemoryBackend`] unless overridden.
pub const DEFAULT_MEMORY_SERVICE: &str = "memory";

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    List(VecDeque<String>),
}

type Keyspace = HashMap<String, Value>;

/// In-memory backend, primarily for tests and local development.
///
/// # Cloning
///
/// Clones share the same keyspace.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<Keyspace>>,
    service: Arc<str>,
    latency: Option<Duration>,
}

impl MemoryBackend {
    /// Creates an empty backend reporting the `"memory"` service tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            service: Arc::from(DEFAULT_MEMORY_SERVICE),
            latency: None,
        }
    }

    /// Overrides the service tag (e.g. `"redis"` when standing in for Redis).
    #[must_use]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = service.into();
        self
    }

    /// Adds a simulated round-trip latency to every call.
    ///
    /// The delay runs inside the call's [`CallContext`], so deadlines and
    /// cancellation interrupt it like they would a network round-trip.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    async fn run<T, F>(&self, ctx: &CallContext, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Keyspace) -> StoreResult<T> + Send,
        T: Send,
    {
        ctx.guard(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            fail_point!("memory-backend-call", |_| {
                Err(StoreError::connection("injected connection failure"))
            });
            let mut keyspace = self.data.write();
            op(&mut keyspace)
        })
        .await
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    fn service(&self) -> &str {
        &self.service
    }

    async fn ping(&self, ctx: &CallContext) -> StoreResult<()> {
        self.run(ctx, |_| Ok(())).await
    }

    async fn get(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        self.run(ctx, |data| match data.get(key) {
            Some(Value::Text(value)) => Ok(value.clone()),
            Some(Value::List(_)) => Err(StoreError::protocol(WRONGTYPE)),
            None => Err(StoreError::not_found(key)),
        })
        .await
    }

    async fn set(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        self.run(ctx, |data| {
            data.insert(key.to_owned(), Value::Text(value.to_owned()));
            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &CallContext, key: &str) -> StoreResult<()> {
        self.run(ctx, |data| {
            data.remove(key);
            Ok(())
        })
        .await
    }

    async fn list_push(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        self.run(ctx, |data| {
            match data.entry(key.to_owned()).or_insert_with(|| Value::List(VecDeque::new())) {
                Value::List(list) => {
                    list.push_front(value.to_owned());
                    Ok(())
                },
                Value::Text(_) => Err(StoreError::protocol(WRONGTYPE)),
            }
        })
        .await
    }

    async fn list_pop(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        self.run(ctx, |data| {
            let popped = match data.get_mut(key) {
                Some(Value::List(list)) => list.pop_back(),
                Some(Value::Text(_)) => return Err(StoreError::protocol(WRONGTYPE)),
                None => None,
            };
            // Redis drops a list once it is empty.
            if matches!(data.get(key), Some(Value::List(list)) if list.is_empty()) {
                data.remove(key);
            }
            popped.ok_or_else(|| StoreError::not_found(key))
        })
        .await
    }

    async fn list_length(&self, ctx: &CallContext, key: &str) -> StoreResult<i64> {
        self.run(ctx, |data| match data.get(key) {
            Some(Value::List(list)) => Ok(list.len() as i64),
            Some(Value::Text(_)) => Err(StoreError::protocol(WRONGTYPE)),
            None => Ok(0),
        })
        .await
    }
}
