//! Shared test doubles for the instrumented facade.
//!
//! This module provides recording and failing implementations of
//! [`MetricsSink`], [`CallLogger`] and [`KeyValueBackend`], plus assertion
//! macros for [`StoreResult`] values. It is feature-gated behind `testutil` to
//! prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! zinc-store = { path = "../store", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use zinc_store::testutil::{CallJournal, RecordingLogger, RecordingSink};
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    backend::KeyValueBackend,
    context::CallContext,
    error::{MetricsError, MetricsResult, StoreError, StoreResult},
    logging::CallLogger,
    metrics::{MetricPoint, MetricsSink},
    operation::{CallEntry, Operation},
};

/// One observable step of an instrumented call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEvent {
    /// A [`CallLogger`] received an attempt for this operation.
    Attempt(Operation),
    /// A [`MetricsSink`] received a point with this measurement.
    Point(String),
}

/// Ordered record shared between a [`RecordingLogger`] and a
/// [`RecordingSink`], used to assert that logging precedes the metric write.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    events: Arc<Mutex<Vec<JournalEvent>>>,
}

impl CallJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<JournalEvent> {
        self.events.lock().clone()
    }

    fn push(&self, event: JournalEvent) {
        self.events.lock().push(event);
    }
}

/// Owned copy of a [`CallEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedCall {
    /// Service tag.
    pub service: String,
    /// Operation attempted.
    pub operation: Operation,
    /// Key argument.
    pub key: Option<String>,
    /// Value argument.
    pub value: Option<String>,
}

impl From<&CallEntry<'_>> for LoggedCall {
    fn from(entry: &CallEntry<'_>) -> Self {
        Self {
            service: entry.service.to_owned(),
            operation: entry.operation,
            key: entry.key.map(str::to_owned),
            value: entry.value.map(str::to_owned),
        }
    }
}

/// [`CallLogger`] that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LoggedCall>>,
    journal: Option<CallJournal>,
}

impl RecordingLogger {
    /// Creates an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger that also appends to `journal`.
    #[must_use]
    pub fn with_journal(journal: CallJournal) -> Self {
        Self { entries: Mutex::default(), journal: Some(journal) }
    }

    /// Snapshot of every logged call.
    #[must_use]
    pub fn entries(&self) -> Vec<LoggedCall> {
        self.entries.lock().clone()
    }

    /// Operations logged, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.entries.lock().iter().map(|e| e.operation).collect()
    }
}

impl CallLogger for RecordingLogger {
    fn log_attempt(&self, entry: &CallEntry<'_>) {
        self.entries.lock().push(LoggedCall::from(entry));
        if let Some(journal) = &self.journal {
            journal.push(JournalEvent::Attempt(entry.operation));
        }
    }
}

/// [`MetricsSink`] that keeps every point in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    points: Mutex<Vec<MetricPoint>>,
    journal: Option<CallJournal>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that also appends to `journal`.
    #[must_use]
    pub fn with_journal(journal: CallJournal) -> Self {
        Self { points: Mutex::default(), journal: Some(journal) }
    }

    /// Snapshot of every recorded point.
    #[must_use]
    pub fn points(&self) -> Vec<MetricPoint> {
        self.points.lock().clone()
    }

    /// Measurement names recorded, in order.
    #[must_use]
    pub fn measurements(&self) -> Vec<String> {
        self.points.lock().iter().map(|p| p.measurement.clone()).collect()
    }

    /// Number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.lock().is_empty()
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn write_point(&self, ctx: &CallContext, point: &MetricPoint) -> MetricsResult<()> {
        if let Some(reason) = ctx.interruption() {
            return Err(reason.into());
        }
        self.points.lock().push(point.clone());
        if let Some(journal) = &self.journal {
            journal.push(JournalEvent::Point(point.measurement.clone()));
        }
        Ok(())
    }
}

/// [`MetricsSink`] that fails every write, counting attempts.
#[derive(Debug)]
pub struct FailingSink {
    status: Option<u16>,
    attempts: AtomicUsize,
}

impl FailingSink {
    /// Fails with [`MetricsError::Rejected`] carrying `status`.
    #[must_use]
    pub fn rejecting(status: u16) -> Self {
        Self { status: Some(status), attempts: AtomicUsize::new(0) }
    }

    /// Fails with [`MetricsError::Transport`].
    #[must_use]
    pub fn unreachable() -> Self {
        Self { status: None, attempts: AtomicUsize::new(0) }
    }

    /// Number of writes attempted.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSink for FailingSink {
    async fn write_point(&self, _ctx: &CallContext, _point: &MetricPoint) -> MetricsResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(match self.status {
            Some(status) => MetricsError::Rejected { status, body: "injected".to_owned() },
            None => MetricsError::transport("injected transport failure"),
        })
    }
}

type ErrorFactory = Box<dyn Fn() -> StoreError + Send + Sync>;

/// [`KeyValueBackend`] whose every call fails with a freshly built error.
pub struct FailingBackend {
    service: String,
    make_error: ErrorFactory,
    calls: AtomicUsize,
}

impl FailingBackend {
    /// Fails every call with the error returned by `make_error`.
    pub fn new(make_error: impl Fn() -> StoreError + Send + Sync + 'static) -> Self {
        Self {
            service: "failing".to_owned(),
            make_error: Box::new(make_error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every call with [`StoreError::Connection`].
    #[must_use]
    pub fn connection_lost() -> Self {
        Self::new(|| StoreError::connection("connection reset by peer"))
    }

    /// Fails every call with [`StoreError::Timeout`].
    #[must_use]
    pub fn timing_out() -> Self {
        Self::new(StoreError::timeout)
    }

    /// Overrides the service tag.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Number of calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}

impl std::fmt::Debug for FailingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailingBackend")
            .field("service", &self.service)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueBackend for FailingBackend {
    fn service(&self) -> &str {
        &self.service
    }

    async fn ping(&self, _ctx: &CallContext) -> StoreResult<()> {
        self.fail()
    }

    async fn get(&self, _ctx: &CallContext, _key: &str) -> StoreResult<String> {
        self.fail()
    }

    async fn set(&self, _ctx: &CallContext, _key: &str, _value: &str) -> StoreResult<()> {
        self.fail()
    }

    async fn delete(&self, _ctx: &CallContext, _key: &str) -> StoreResult<()> {
        self.fail()
    }

    async fn list_push(&self, _ctx: &CallContext, _key: &str, _value: &str) -> StoreResult<()> {
        self.fail()
    }

    async fn list_pop(&self, _ctx: &CallContext, _key: &str) -> StoreResult<String> {
        self.fail()
    }

    async fn list_length(&self, _ctx: &CallContext, _key: &str) -> StoreResult<i64> {
        self.fail()
    }
}

/// Runs `operation` against `backend` with fixed arguments, discarding the
/// returned value. Lets tests iterate over [`Operation::ALL`].
///
/// # Errors
///
/// Returns whatever the backend call returned.
pub async fn invoke<B: KeyValueBackend + ?Sized>(
    backend: &B,
    ctx: &CallContext,
    operation: Operation,
) -> StoreResult<()> {
    match operation {
        Operation::Ping => backend.ping(ctx).await,
        Operation::Get => backend.get(ctx, "key").await.map(drop),
        Operation::Set => backend.set(ctx, "key", "value").await,
        Operation::Delete => backend.delete(ctx, "key").await,
        Operation::ListPush => backend.list_push(ctx, "list", "value").await,
        Operation::ListPop => backend.list_pop(ctx, "list").await.map(drop),
        Operation::ListLength => backend.list_length(ctx, "list").await.map(drop),
    }
}

/// Assert that a [`StoreResult`] is a [`StoreError::NotFound`].
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use zinc_store::{StoreError, StoreResult, assert_not_found};
///
/// let result: StoreResult<()> = Err(StoreError::not_found("missing"));
/// assert_not_found!(result);
/// ```
#[macro_export]
macro_rules! assert_not_found {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::StoreError::NotFound { .. })),
            "expected StoreError::NotFound, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::StoreError::NotFound { .. })),
            "{}: expected StoreError::NotFound, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`StoreResult`] was stopped by its context
/// ([`StoreError::Cancelled`] or [`StoreError::Timeout`]).
#[macro_export]
macro_rules! assert_cancelled {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::StoreError::Cancelled | $crate::StoreError::Timeout)),
            "expected a cancellation error, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::StoreError::Cancelled | $crate::StoreError::Timeout)),
            "{}: expected a cancellation error, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`StoreResult`] is `Ok`, returning the inner value.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use zinc_store::{StoreResult, assert_store_ok};
///
/// let result: StoreResult<i64> = Ok(3);
/// assert_eq!(assert_store_ok!(result), 3);
/// ```
#[macro_export]
macro_rules! assert_store_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got StoreError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got StoreError: {e:?}", $msg),
        }
    };
}
