//! Behavioural tests for `InstrumentedStore`: one log entry per attempt, one
//! metric point per success, errors passed through untouched.

#![allow(clippy::expect_used, clippy::panic)]

use std::{sync::Arc, time::Duration};

use rstest::rstest;
use tokio::task::JoinSet;
use zinc_store::{
    CallContext, FieldValue, InstrumentedStore, KeyValueBackend, MemoryBackend, Operation,
    StoreError, assert_cancelled, assert_not_found, assert_store_ok,
    testutil::{
        CallJournal, FailingBackend, FailingSink, JournalEvent, LoggedCall, RecordingLogger,
        RecordingSink, invoke,
    },
};

type Recorded = InstrumentedStore<MemoryBackend, Arc<RecordingSink>, Arc<RecordingLogger>>;

fn recorded_store() -> (Recorded, Arc<RecordingSink>, Arc<RecordingLogger>) {
    let sink = Arc::new(RecordingSink::new());
    let logger = Arc::new(RecordingLogger::new());
    let backend = MemoryBackend::new().with_service("redis");
    (InstrumentedStore::new(backend, Arc::clone(&sink), Arc::clone(&logger)), sink, logger)
}

// ---------------------------------------------------------------------------
// Metric point shape
// ---------------------------------------------------------------------------

#[rstest]
#[case::ping(Operation::Ping, "ping")]
#[case::get(Operation::Get, "get")]
#[case::set(Operation::Set, "set")]
#[case::delete(Operation::Delete, "del")]
#[case::list_push(Operation::ListPush, "lpush")]
#[case::list_pop(Operation::ListPop, "rpop")]
#[case::list_length(Operation::ListLength, "llen")]
#[tokio::test]
async fn successful_call_records_one_point(#[case] op: Operation, #[case] name: &str) {
    let (store, sink, logger) = recorded_store();
    let ctx = CallContext::new();

    // Seed so that get / list_pop succeed.
    store.backend().set(&ctx, "key", "value").await.expect("seed key");
    store.backend().list_push(&ctx, "list", "value").await.expect("seed list");

    invoke(&store, &ctx, op).await.expect("call should succeed");

    let points = sink.points();
    assert_eq!(points.len(), 1, "expected exactly one point, got {points:?}");
    let point = &points[0];
    assert_eq!(point.measurement, name);
    assert_eq!(point.tag("service"), Some("redis"));
    assert_eq!(point.tags.len(), 1);
    assert_eq!(point.field(name), Some(&FieldValue::Integer(1)));
    assert_eq!(point.fields.len(), 1);

    assert_eq!(logger.operations(), vec![op]);
}

#[tokio::test]
async fn point_timestamp_is_taken_after_the_call() {
    let (store, sink, _logger) = recorded_store();
    let before = chrono::Utc::now();
    store.ping(&CallContext::new()).await.expect("ping");
    let after = chrono::Utc::now();

    let point = sink.points().pop().expect("one point");
    assert!(point.timestamp >= before && point.timestamp <= after);
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_then_get_round_trips() {
    let (store, sink, _logger) = recorded_store();
    let ctx = CallContext::new();

    assert_store_ok!(store.set(&ctx, "a", "1").await);
    assert_eq!(assert_store_ok!(store.get(&ctx, "a").await), "1");

    assert_eq!(sink.measurements(), ["set", "get"]);
}

#[tokio::test]
async fn repeated_get_records_each_call() {
    let (store, sink, _logger) = recorded_store();
    let ctx = CallContext::new();
    store.set(&ctx, "a", "1").await.expect("set");

    let first = store.get(&ctx, "a").await.expect("first get");
    let second = store.get(&ctx, "a").await.expect("second get");

    assert_eq!(first, second);
    assert_eq!(sink.measurements(), ["set", "get", "get"]);
}

#[tokio::test]
async fn missing_key_returns_not_found_without_point() {
    let (store, sink, logger) = recorded_store();

    let result = store.get(&CallContext::new(), "missing-key").await;

    assert_not_found!(result);
    assert!(sink.is_empty());
    // The attempt is still logged.
    assert_eq!(logger.operations(), vec![Operation::Get]);
}

#[tokio::test]
async fn list_queue_scenario() {
    let (store, sink, _logger) = recorded_store();
    let ctx = CallContext::new();

    store.list_push(&ctx, "q", "x").await.expect("push");
    assert_eq!(store.list_length(&ctx, "q").await.expect("len"), 1);
    assert_eq!(store.list_pop(&ctx, "q").await.expect("pop"), "x");
    assert_eq!(store.list_length(&ctx, "q").await.expect("len"), 0);

    assert_eq!(sink.measurements(), ["lpush", "llen", "rpop", "llen"]);
}

#[tokio::test]
async fn list_pop_on_empty_list_records_nothing() {
    let (store, sink, _logger) = recorded_store();

    assert_not_found!(store.list_pop(&CallContext::new(), "empty").await);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn delete_missing_key_succeeds_and_records() {
    let (store, sink, _logger) = recorded_store();

    store.delete(&CallContext::new(), "never-set").await.expect("delete");
    assert_eq!(sink.measurements(), ["del"]);
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn log_entries_carry_arguments() {
    let (store, _sink, logger) = recorded_store();
    let ctx = CallContext::new();

    store.set(&ctx, "a", "1").await.expect("set");
    store.get(&ctx, "a").await.expect("get");
    store.ping(&ctx).await.expect("ping");

    let logged = logger.entries();
    assert_eq!(
        logged,
        vec![
            LoggedCall {
                service: "redis".to_owned(),
                operation: Operation::Set,
                key: Some("a".to_owned()),
                value: Some("1".to_owned()),
            },
            LoggedCall {
                service: "redis".to_owned(),
                operation: Operation::Get,
                key: Some("a".to_owned()),
                value: None,
            },
            LoggedCall {
                service: "redis".to_owned(),
                operation: Operation::Ping,
                key: None,
                value: None,
            },
        ]
    );
}

#[tokio::test]
async fn log_entry_precedes_metric_point() {
    let journal = CallJournal::new();
    let store = InstrumentedStore::new(
        MemoryBackend::new(),
        RecordingSink::with_journal(journal.clone()),
        RecordingLogger::with_journal(journal.clone()),
    );
    let ctx = CallContext::new();

    store.list_push(&ctx, "q", "x").await.expect("push");
    let _ = store.get(&ctx, "missing").await;
    store.list_pop(&ctx, "q").await.expect("pop");

    assert_eq!(
        journal.events(),
        vec![
            JournalEvent::Attempt(Operation::ListPush),
            JournalEvent::Point("lpush".to_owned()),
            JournalEvent::Attempt(Operation::Get),
            JournalEvent::Attempt(Operation::ListPop),
            JournalEvent::Point("rpop".to_owned()),
        ]
    );
}

// ---------------------------------------------------------------------------
// Error propagation
// ---------------------------------------------------------------------------

#[rstest]
#[case::ping(Operation::Ping)]
#[case::get(Operation::Get)]
#[case::set(Operation::Set)]
#[case::delete(Operation::Delete)]
#[case::list_push(Operation::ListPush)]
#[case::list_pop(Operation::ListPop)]
#[case::list_length(Operation::ListLength)]
#[tokio::test]
async fn backend_error_is_returned_unchanged(#[case] op: Operation) {
    let sink = Arc::new(RecordingSink::new());
    let logger = Arc::new(RecordingLogger::new());
    let store = InstrumentedStore::new(
        FailingBackend::new(|| StoreError::protocol("ERR unknown command")),
        Arc::clone(&sink),
        Arc::clone(&logger),
    );

    let err = invoke(&store, &CallContext::new(), op).await.expect_err("call should fail");

    match err {
        StoreError::Protocol { message, source } => {
            assert_eq!(message, "ERR unknown command");
            assert!(source.is_none());
        },
        other => panic!("expected the backend's Protocol error, got {other:?}"),
    }
    assert!(sink.is_empty());
    assert_eq!(logger.operations(), vec![op]);
    assert_eq!(store.backend().calls(), 1);
}

#[tokio::test]
async fn backend_timeout_is_not_remapped() {
    let sink = Arc::new(RecordingSink::new());
    let store =
        InstrumentedStore::new(FailingBackend::timing_out(), Arc::clone(&sink), RecordingLogger::new());

    let result = store.get(&CallContext::new(), "a").await;
    assert!(matches!(result, Err(StoreError::Timeout)));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn sink_failure_never_fails_the_call() {
    let sink = Arc::new(FailingSink::unreachable());
    let store = InstrumentedStore::new(MemoryBackend::new(), Arc::clone(&sink), RecordingLogger::new());
    let ctx = CallContext::new();

    for op in Operation::ALL {
        // Seed before each op so reads succeed.
        store.backend().set(&ctx, "key", "value").await.expect("seed key");
        store.backend().list_push(&ctx, "list", "value").await.expect("seed list");
        invoke(&store, &ctx, op).await.expect("sink errors must not surface");
    }
    assert_eq!(sink.attempts(), Operation::ALL.len());
}

// ---------------------------------------------------------------------------
// Cancellation and deadlines
// ---------------------------------------------------------------------------

#[rstest]
#[case::ping(Operation::Ping)]
#[case::get(Operation::Get)]
#[case::set(Operation::Set)]
#[case::delete(Operation::Delete)]
#[case::list_push(Operation::ListPush)]
#[case::list_pop(Operation::ListPop)]
#[case::list_length(Operation::ListLength)]
#[tokio::test]
async fn precancelled_context_records_nothing(#[case] op: Operation) {
    let (store, sink, _logger) = recorded_store();
    let ctx = CallContext::new();
    ctx.cancel();

    let result = invoke(&store, &ctx, op).await;

    assert!(matches!(result, Err(StoreError::Cancelled)), "got {result:?}");
    assert!(sink.is_empty());
}

#[rstest]
#[case::ping(Operation::Ping)]
#[case::set(Operation::Set)]
#[case::list_length(Operation::ListLength)]
#[tokio::test]
async fn expired_deadline_records_nothing(#[case] op: Operation) {
    let (store, sink, _logger) = recorded_store();
    let ctx = CallContext::new().with_timeout(Duration::ZERO);

    let result = invoke(&store, &ctx, op).await;

    assert!(matches!(result, Err(StoreError::Timeout)), "got {result:?}");
    assert!(sink.is_empty());
}

#[tokio::test(start_paused = true)]
async fn deadline_during_slow_backend_call() {
    let sink = Arc::new(RecordingSink::new());
    let store = InstrumentedStore::new(
        MemoryBackend::new().with_latency(Duration::from_secs(2)),
        Arc::clone(&sink),
        RecordingLogger::new(),
    );
    let ctx = CallContext::new().with_timeout(Duration::from_millis(100));

    assert_cancelled!(store.set(&ctx, "a", "1").await);
    assert!(sink.is_empty());
    assert!(store.backend().is_empty(), "interrupted write must not land");
}

#[tokio::test(start_paused = true)]
async fn cancel_during_slow_backend_call() {
    let sink = Arc::new(RecordingSink::new());
    let store = Arc::new(InstrumentedStore::new(
        MemoryBackend::new().with_latency(Duration::from_secs(2)),
        Arc::clone(&sink),
        RecordingLogger::new(),
    ));
    let ctx = CallContext::new();

    let task = {
        let store = Arc::clone(&store);
        let ctx = ctx.clone();
        tokio::spawn(async move { store.ping(&ctx).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctx.cancel();

    let result = task.await.expect("task should not panic");
    assert!(matches!(result, Err(StoreError::Cancelled)));
    assert!(sink.is_empty());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

const CONCURRENCY: usize = 16;
const OPS_PER_TASK: usize = 25;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_each_record_their_points() {
    let (store, sink, logger) = recorded_store();
    let store = Arc::new(store);

    let mut set = JoinSet::new();
    for task_id in 0..CONCURRENCY {
        let store = Arc::clone(&store);
        set.spawn(async move {
            let ctx = CallContext::new();
            for i in 0..OPS_PER_TASK {
                let key = format!("task{task_id}:{i}");
                store.set(&ctx, &key, "v").await.expect("set");
                store.get(&ctx, &key).await.expect("get");
            }
        });
    }
    while let Some(joined) = set.join_next().await {
        joined.expect("task should not panic");
    }

    let expected = CONCURRENCY * OPS_PER_TASK * 2;
    assert_eq!(sink.len(), expected);
    assert_eq!(logger.entries().len(), expected);
    assert_eq!(store.backend().len(), CONCURRENCY * OPS_PER_TASK);
}
