//! Redis implementation of [`KeyValueBackend`].

use std::{borrow::Cow, future::Future, sync::Arc};

use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};
use zinc_store::{CallContext, KeyValueBackend, StoreError, StoreResult};

use crate::{
    config::RedisBackendConfig,
    error::{RedisStorageError, Result},
};

/// Redis-backed [`KeyValueBackend`].
///
/// Wraps a [`ConnectionManager`], which multiplexes every call over one
/// connection and transparently reconnects after it drops. Cloning the
/// backend is cheap and shares that connection.
///
/// # Command Mapping
///
/// | Method | Command | Missing key |
/// |--------|---------|-------------|
/// | `ping` | `PING` | - |
/// | `get` | `GET` | `NotFound` |
/// | `set` | `SET` | - |
/// | `delete` | `DEL` | `Ok(())` |
/// | `list_push` | `LPUSH` | creates |
/// | `list_pop` | `RPOP` | `NotFound` |
/// | `list_length` | `LLEN` | `Ok(0)` |
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
    key_prefix: Option<Arc<str>>,
    service: Arc<str>,
}

impl RedisBackend {
    /// Connects to Redis using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the URL cannot be
    /// opened, or the initial connection fails or exceeds
    /// `connect_timeout`.
    pub async fn connect(config: RedisBackendConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::open(config.url())?;
        let manager =
            tokio::time::timeout(config.connect_timeout(), ConnectionManager::new(client))
                .await
                .map_err(|_| RedisStorageError::ConnectTimeout(config.connect_timeout()))??;

        tracing::debug!(
            service = config.service(),
            key_prefix = config.key_prefix(),
            "connected to redis"
        );

        Ok(Self {
            manager,
            key_prefix: config.key_prefix().map(Arc::from),
            service: Arc::from(config.service()),
        })
    }

    /// Applies the configured key prefix.
    fn key<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match &self.key_prefix {
            Some(prefix) => Cow::Owned(format!("{prefix}:{key}")),
            None => Cow::Borrowed(key),
        }
    }

    /// Runs a driver call under `ctx`, mapping driver errors.
    async fn run<T, F>(&self, ctx: &CallContext, call: F) -> StoreResult<T>
    where
        F: Future<Output = RedisResult<T>> + Send,
    {
        ctx.guard(async move {
            call.await.map_err(|err| StoreError::from(RedisStorageError::from(err)))
        })
        .await
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("service", &self.service)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    fn service(&self) -> &str {
        &self.service
    }

    async fn ping(&self, ctx: &CallContext) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        let _pong: String =
            self.run(ctx, async move { redis::cmd("PING").query_async(&mut conn).await }).await?;
        Ok(())
    }

    async fn get(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        let mut conn = self.manager.clone();
        let redis_key = self.key(key).into_owned();
        let value: Option<String> =
            self.run(ctx, async move { conn.get(redis_key).await }).await?;
        value.ok_or_else(|| StoreError::not_found(key))
    }

    async fn set(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        let redis_key = self.key(key).into_owned();
        let value = value.to_owned();
        self.run(ctx, async move { conn.set(redis_key, value).await }).await
    }

    async fn delete(&self, ctx: &CallContext, key: &str) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        let redis_key = self.key(key).into_owned();
        let _removed: i64 = self.run(ctx, async move { conn.del(redis_key).await }).await?;
        Ok(())
    }

    async fn list_push(&self, ctx: &CallContext, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        let redis_key = self.key(key).into_owned();
        let value = value.to_owned();
        let _len: i64 = self.run(ctx, async move { conn.lpush(redis_key, value).await }).await?;
        Ok(())
    }

    async fn list_pop(&self, ctx: &CallContext, key: &str) -> StoreResult<String> {
        let mut conn = self.manager.clone();
        let redis_key = self.key(key).into_owned();
        let value: Option<String> =
            self.run(ctx, async move { conn.rpop(redis_key, None).await }).await?;
        value.ok_or_else(|| StoreError::not_found(key))
    }

    async fn list_length(&self, ctx: &CallContext, key: &str) -> StoreResult<i64> {
        let mut conn = self.manager.clone();
        let redis_key = self.key(key).into_owned();
        self.run(ctx, async move { conn.llen(redis_key).await }).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_invalid_config_as_internal_store_error() {
        // Deserialization skips the builder's validation.
        let config: RedisBackendConfig = serde_json::from_str(r#"{ "url": "" }"#).unwrap();

        let err = RedisBackend::connect(config).await.unwrap_err();
        assert!(matches!(err, RedisStorageError::Config(_)), "got {err:?}");
        assert!(matches!(StoreError::from(err), StoreError::Internal { .. }));
    }
}
