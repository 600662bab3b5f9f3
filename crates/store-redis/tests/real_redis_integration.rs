//! Integration tests for the Redis backend against a real Redis server.
//!
//! These tests require a running Redis server. They are skipped unless the
//! `RUN_REDIS_INTEGRATION_TESTS` environment variable is set.
//!
//! # Running the tests
//!
//! ```bash
//! docker run --rm -p 6379:6379 redis:7
//!
//! RUN_REDIS_INTEGRATION_TESTS=1 \
//! REDIS_URL=redis://localhost:6379/15 \
//! cargo test -p zinc-store-redis --test real_redis_integration
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    env,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use zinc_store::{
    CallContext, InstrumentedStore, KeyValueBackend, StoreError, assert_not_found,
    testutil::{RecordingLogger, RecordingSink},
};
use zinc_store_redis::{RedisBackend, RedisBackendConfig};

// ============================================================================
// Test Configuration
// ============================================================================

/// Counter for generating unique key prefixes per test.
static PREFIX_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Check if real Redis integration tests should run.
fn should_run() -> bool {
    env::var("RUN_REDIS_INTEGRATION_TESTS").is_ok()
}

/// Get the Redis URL from environment, or default.
fn redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379/15".to_string())
}

/// A prefix unique to this process and test, so runs never collide.
fn unique_prefix() -> String {
    format!(
        "zinc-test:{}:{}",
        std::process::id(),
        PREFIX_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

async fn connect() -> RedisBackend {
    let config = RedisBackendConfig::builder()
        .url(redis_url())
        .key_prefix(unique_prefix())
        .build()
        .expect("valid config");
    RedisBackend::connect(config).await.expect("connect to redis")
}

// ============================================================================
// Backend
// ============================================================================

#[tokio::test]
async fn ping_succeeds() {
    if !should_run() {
        eprintln!("Skipping real Redis test (RUN_REDIS_INTEGRATION_TESTS not set)");
        return;
    }

    let backend = connect().await;
    backend.ping(&CallContext::new()).await.expect("ping");
}

#[tokio::test]
async fn set_get_delete_round_trip() {
    if !should_run() {
        return;
    }

    let backend = connect().await;
    let ctx = CallContext::new();

    backend.set(&ctx, "a", "1").await.unwrap();
    assert_eq!(backend.get(&ctx, "a").await.unwrap(), "1");

    backend.delete(&ctx, "a").await.unwrap();
    assert_not_found!(backend.get(&ctx, "a").await);

    // Deleting again is fine.
    backend.delete(&ctx, "a").await.unwrap();
}

#[tokio::test]
async fn list_is_fifo() {
    if !should_run() {
        return;
    }

    let backend = connect().await;
    let ctx = CallContext::new();

    assert_eq!(backend.list_length(&ctx, "q").await.unwrap(), 0);
    backend.list_push(&ctx, "q", "first").await.unwrap();
    backend.list_push(&ctx, "q", "second").await.unwrap();
    assert_eq!(backend.list_length(&ctx, "q").await.unwrap(), 2);

    assert_eq!(backend.list_pop(&ctx, "q").await.unwrap(), "first");
    assert_eq!(backend.list_pop(&ctx, "q").await.unwrap(), "second");
    assert_not_found!(backend.list_pop(&ctx, "q").await);
}

#[tokio::test]
async fn wrong_type_is_protocol_error() {
    if !should_run() {
        return;
    }

    let backend = connect().await;
    let ctx = CallContext::new();

    backend.set(&ctx, "s", "v").await.unwrap();
    let result = backend.list_push(&ctx, "s", "x").await;
    assert!(matches!(result, Err(StoreError::Protocol { .. })), "got {result:?}");

    backend.delete(&ctx, "s").await.unwrap();
}

#[tokio::test]
async fn key_prefix_isolates_backends() {
    if !should_run() {
        return;
    }

    let first = connect().await;
    let second = connect().await;
    let ctx = CallContext::new();

    first.set(&ctx, "shared", "one").await.unwrap();
    assert_not_found!(second.get(&ctx, "shared").await);

    first.delete(&ctx, "shared").await.unwrap();
}

#[tokio::test]
async fn cancelled_context_skips_command() {
    if !should_run() {
        return;
    }

    let backend = connect().await;
    let ctx = CallContext::new();
    ctx.cancel();

    assert!(matches!(backend.set(&ctx, "a", "1").await, Err(StoreError::Cancelled)));
    assert_not_found!(backend.get(&CallContext::new(), "a").await);
}

#[tokio::test]
async fn unreachable_server_fails_to_connect() {
    if !should_run() {
        return;
    }

    // Port 1 is reserved and never runs Redis.
    let config = RedisBackendConfig::builder()
        .url("redis://127.0.0.1:1")
        .connect_timeout(Duration::from_millis(500))
        .build()
        .unwrap();

    let err = RedisBackend::connect(config).await.expect_err("connect should fail");
    let store_err = StoreError::from(err);
    assert!(
        matches!(store_err, StoreError::Connection { .. } | StoreError::Timeout),
        "got {store_err:?}"
    );
}

// ============================================================================
// Instrumented facade over Redis
// ============================================================================

#[tokio::test]
async fn instrumented_redis_records_points() {
    if !should_run() {
        return;
    }

    let sink = Arc::new(RecordingSink::new());
    let store = InstrumentedStore::new(connect().await, Arc::clone(&sink), RecordingLogger::new());
    let ctx = CallContext::new();

    store.list_push(&ctx, "q", "x").await.unwrap();
    assert_eq!(store.list_length(&ctx, "q").await.unwrap(), 1);
    assert_eq!(store.list_pop(&ctx, "q").await.unwrap(), "x");
    assert_eq!(store.list_length(&ctx, "q").await.unwrap(), 0);
    assert_not_found!(store.get(&ctx, "missing-key").await);

    assert_eq!(sink.measurements(), ["lpush", "llen", "rpop", "llen"]);
    assert!(sink.points().iter().all(|p| p.tag("service") == Some("redis")));
}
