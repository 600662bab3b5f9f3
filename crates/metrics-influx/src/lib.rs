//! InfluxDB v2 implementation of [`MetricsSink`](zinc_store::MetricsSink).
//!
//! [`InfluxSink`] encodes each [`MetricPoint`](zinc_store::MetricPoint) as one
//! line of InfluxDB line protocol and posts it to `/api/v2/write`, waiting for
//! the server to acknowledge the write.
//!
//! # Quick Start
//!
//! ```no_run
//! // Requires a running InfluxDB server.
//! use zinc_metrics_influx::{InfluxConfig, InfluxSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InfluxConfig::builder()
//!         .url("http://localhost:8086")
//!         .token("my-token")
//!         .org("acme")
//!         .bucket("redis")
//!         .build()?;
//!
//!     // Fails with "influx ping failed" if the server is not reachable.
//!     let sink = InfluxSink::connect(&config).await?;
//!     println!("writing to {}", sink.write_url());
//!     Ok(())
//! }
//! ```
//!
//! # Error Mapping
//!
//! | Condition | `MetricsError` |
//! |-----------|----------------|
//! | invalid configuration | `Config` |
//! | point cannot be encoded | `Encoding` |
//! | connection failure | `Transport` |
//! | non-2xx response | `Rejected { status, body }` |
//! | HTTP client timeout or context deadline | `Timeout` |
//! | context cancelled | `Cancelled` |

#![deny(unsafe_code)]

mod config;
pub mod line_protocol;
mod sink;

pub use config::{InfluxConfig, Precision};
pub use sink::InfluxSink;
