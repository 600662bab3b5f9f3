//! Metric points and the sink trait they are written to.
//!
//! A [`MetricPoint`] is one immutable time-series record: a measurement name,
//! string tags, typed fields and a timestamp. The instrumented facade builds
//! one per successful backend call via [`MetricPoint::operation`] and hands it
//! to a [`MetricsSink`].
//!
//! # Usage
//!
//! ```
//! use zinc_store::{FieldValue, MetricPoint};
//!
//! let point = MetricPoint::builder()
//!     .measurement("get")
//!     .tags([("service".to_owned(), "redis".to_owned())].into())
//!     .fields([("get".to_owned(), FieldValue::Integer(1))].into())
//!     .build();
//!
//! assert_eq!(point.measurement, "get");
//! assert_eq!(point.tag("service"), Some("redis"));
//! ```

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{context::CallContext, error::MetricsResult, operation::Operation};

/// Tag key carrying the backend's service name.
pub const SERVICE_TAG: &str = "service";

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// One time-series record.
///
/// Tags and fields are kept in [`BTreeMap`]s so that encoders see them in a
/// stable, sorted order.
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct MetricPoint {
    /// Measurement name (e.g. `"get"`).
    #[builder(into)]
    pub measurement: String,
    /// Indexed string tags.
    #[builder(default)]
    pub tags: BTreeMap<String, String>,
    /// Typed field values.
    #[builder(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// When the event happened (defaults to now).
    #[builder(default = Utc::now())]
    pub timestamp: DateTime<Utc>,
}

impl MetricPoint {
    /// The per-call point recorded by the instrumented facade:
    /// `{measurement = op, tags = {service}, fields = {op: 1}, timestamp}`.
    #[must_use]
    pub fn operation(service: &str, operation: Operation, timestamp: DateTime<Utc>) -> Self {
        let name = operation.as_str();
        Self {
            measurement: name.to_owned(),
            tags: BTreeMap::from([(SERVICE_TAG.to_owned(), service.to_owned())]),
            fields: BTreeMap::from([(name.to_owned(), FieldValue::Integer(1))]),
            timestamp,
        }
    }

    /// Looks up a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Looks up a field value.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Destination for metric points.
///
/// `write_point` resolves once the sink has acknowledged the point (or
/// failed). Implementations honour the [`CallContext`] they are given.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Writes a single point.
    #[must_use = "metric writes may fail and errors must be handled"]
    async fn write_point(&self, ctx: &CallContext, point: &MetricPoint) -> MetricsResult<()>;
}

#[async_trait]
impl<S: MetricsSink + ?Sized> MetricsSink for Arc<S> {
    async fn write_point(&self, ctx: &CallContext, point: &MetricPoint) -> MetricsResult<()> {
        (**self).write_point(ctx, point).await
    }
}

/// Sink that accepts and discards every point.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl MetricsSink for NoopSink {
    async fn write_point(&self, _ctx: &CallContext, _point: &MetricPoint) -> MetricsResult<()> {
        Ok(())
    }
}
