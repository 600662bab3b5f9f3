#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection.
//!
//! These tests require the `failpoints` feature:
//! ```bash
//! cargo test -p zinc-store --features failpoints --test failpoint_tests
//! ```

use std::sync::Arc;

use zinc_store::{
    CallContext, InstrumentedStore, KeyValueBackend, MemoryBackend, StoreError,
    testutil::{RecordingLogger, RecordingSink},
};

#[tokio::test]
async fn backend_failpoint_surfaces_connection_error() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("memory-backend-call", "return").expect("failed to configure fail point");

    let sink = Arc::new(RecordingSink::new());
    let store = InstrumentedStore::new(MemoryBackend::new(), Arc::clone(&sink), RecordingLogger::new());
    let result = store.set(&CallContext::new(), "a", "1").await;

    assert!(
        matches!(result, Err(StoreError::Connection { .. })),
        "expected injected connection error, got {result:?}"
    );
    assert!(sink.is_empty(), "failed call must not record a point");
    assert!(store.backend().is_empty(), "failed call must not write");

    scenario.teardown();
}

#[tokio::test]
async fn backend_failpoint_off_succeeds() {
    let scenario = fail::FailScenario::setup();
    // Without a configured fail point the call goes through.

    let sink = Arc::new(RecordingSink::new());
    let store = InstrumentedStore::new(MemoryBackend::new(), Arc::clone(&sink), RecordingLogger::new());
    store.set(&CallContext::new(), "a", "1").await.expect("set should succeed");

    assert_eq!(sink.measurements(), ["set"]);

    scenario.teardown();
}
