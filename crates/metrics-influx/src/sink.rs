//! InfluxDB v2 HTTP sink.

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use zinc_store::{CallContext, MetricPoint, MetricsError, MetricsResult, MetricsSink};

use crate::{
    config::{InfluxConfig, Precision},
    line_protocol,
};

/// [`MetricsSink`] writing to the InfluxDB v2 `/api/v2/write` endpoint.
///
/// Each [`write_point`](MetricsSink::write_point) posts one line-protocol
/// record and waits for the server's answer. Nothing is buffered or retried.
///
/// Cloning is cheap; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct InfluxSink {
    client: Client,
    ping_url: Url,
    write_url: Url,
    authorization: String,
    precision: Precision,
}

impl InfluxSink {
    /// Builds the sink without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Config`] for an invalid configuration and
    /// [`MetricsError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &InfluxConfig) -> MetricsResult<Self> {
        config.validate()?;

        let base = config.base_url()?;
        let ping_url = join(&base, "ping")?;
        let mut write_url = join(&base, "api/v2/write")?;
        write_url
            .query_pairs_mut()
            .append_pair("org", config.org())
            .append_pair("bucket", config.bucket())
            .append_pair("precision", config.precision().as_str());

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MetricsError::transport_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            ping_url,
            write_url,
            authorization: format!("Token {}", config.token()),
            precision: config.precision(),
        })
    }

    /// Builds the sink and verifies the server answers `GET /ping`.
    ///
    /// # Errors
    ///
    /// Everything [`new`](Self::new) returns, plus [`MetricsError::Transport`]
    /// (`"influx ping failed"`) if the server is unreachable or unhealthy.
    pub async fn connect(config: &InfluxConfig) -> MetricsResult<Self> {
        let sink = Self::new(config)?;
        sink.ping(&CallContext::new()).await?;
        tracing::debug!(
            url = config.url(),
            org = config.org(),
            bucket = config.bucket(),
            "connected to influx"
        );
        Ok(sink)
    }

    /// Checks that the server is up.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Transport`] (`"influx ping failed"`) if the
    /// request fails or the server answers with a non-success status, or a
    /// cancellation error if `ctx` stops the request.
    pub async fn ping(&self, ctx: &CallContext) -> MetricsResult<()> {
        ctx.guard(async {
            let response = self
                .client
                .get(self.ping_url.clone())
                .send()
                .await
                .map_err(|e| MetricsError::transport_with_source("influx ping failed", e))?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(MetricsError::transport(format!("influx ping failed: status {status}")))
            }
        })
        .await
    }

    /// Returns the full write endpoint, including query parameters.
    #[must_use]
    pub fn write_url(&self) -> &Url {
        &self.write_url
    }
}

impl std::fmt::Debug for InfluxSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxSink")
            .field("write_url", &self.write_url.as_str())
            .field("precision", &self.precision)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetricsSink for InfluxSink {
    async fn write_point(&self, ctx: &CallContext, point: &MetricPoint) -> MetricsResult<()> {
        let line = line_protocol::encode(point, self.precision)?;

        ctx.guard(async {
            let response = self
                .client
                .post(self.write_url.clone())
                .header(header::AUTHORIZATION, &self.authorization)
                .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(line)
                .send()
                .await
                .map_err(request_error)?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            Err(MetricsError::Rejected { status: status.as_u16(), body })
        })
        .await
    }
}

fn join(base: &Url, path: &str) -> MetricsResult<Url> {
    base.join(path).map_err(|e| {
        MetricsError::Config(zinc_store::ConfigError::Invalid {
            field: "influx.url",
            message: e.to_string(),
        })
    })
}

fn request_error(err: reqwest::Error) -> MetricsError {
    if err.is_timeout() {
        MetricsError::Timeout
    } else {
        MetricsError::transport_with_source("influx write failed", err)
    }
}
