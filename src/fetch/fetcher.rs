//! Chunked metric retrieval through a pluggable source.

use crate::config::FetchConfig;
use crate::core::{MetricFrame, TimeSeries};
use crate::error::{MetricsError, Result};
use crate::fetch::plan::{parse_date, parse_interval, plan_chunks, DateChunk};
use chrono::NaiveDate;
use tracing::{debug, trace, warn};

/// What to fetch: a metric for an asset at a sampling interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub metric: String,
    pub asset: String,
    pub interval: String,
}

impl MetricQuery {
    pub fn new(
        metric: impl Into<String>,
        asset: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            metric: metric.into(),
            asset: asset.into(),
            interval: interval.into(),
        }
    }

    /// `metric/asset` identifier.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.metric, self.asset)
    }
}

/// A remote (or local) provider of metric data for one date chunk.
///
/// Implementations return the observations whose dates fall inside the
/// chunk, in ascending time order.
pub trait MetricSource {
    fn fetch_chunk(&self, query: &MetricQuery, chunk: &DateChunk) -> Result<TimeSeries>;
}

impl<F> MetricSource for F
where
    F: Fn(&MetricQuery, &DateChunk) -> Result<TimeSeries>,
{
    fn fetch_chunk(&self, query: &MetricQuery, chunk: &DateChunk) -> Result<TimeSeries> {
        self(query, chunk)
    }
}

/// Splits long date ranges into chunks and stitches the results together.
#[derive(Debug, Clone)]
pub struct MetricFetcher<S> {
    source: S,
    config: FetchConfig,
}

impl<S: MetricSource> MetricFetcher<S> {
    /// Create a fetcher with default chunking.
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: FetchConfig::default(),
        }
    }

    pub fn with_config(source: S, config: FetchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `query` over the inclusive range `[start, end]`.
    ///
    /// Chunks are requested in chronological order. The first failing chunk
    /// aborts the whole fetch. When the combined series is evenly spaced at
    /// the query interval, that interval is recorded as its frequency.
    pub fn fetch(
        &self,
        query: &MetricQuery,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries> {
        let step = parse_interval(&query.interval)?;
        let chunks = plan_chunks(start, end, self.config.chunk_days)?;
        let slug = query.slug();

        debug!(
            slug = %slug,
            %start,
            %end,
            chunks = chunks.len(),
            "fetching metric"
        );

        let mut series = TimeSeries::empty();
        for chunk in &chunks {
            debug!(slug = %slug, chunk = %chunk, "requesting chunk");

            let part = self
                .source
                .fetch_chunk(query, chunk)
                .map_err(|e| chunk_error(chunk, e))?;

            if part.is_empty() {
                warn!(slug = %slug, chunk = %chunk, "chunk returned no rows");
            }
            trace!(slug = %slug, chunk = %chunk, rows = part.len(), "chunk received");

            series.append(part)?;
        }

        series.set_name(slug);
        series.set_metadata("metric", query.metric.clone());
        series.set_metadata("asset", query.asset.clone());
        series.set_metadata("interval", query.interval.clone());

        if series.len() >= 2 && series.is_regular(step) {
            series.set_frequency(step)?;
        }

        Ok(series)
    }

    /// [`fetch`](Self::fetch) with `YYYY-MM-DD` date strings.
    pub fn fetch_between(&self, query: &MetricQuery, start: &str, end: &str) -> Result<TimeSeries> {
        self.fetch(query, parse_date(start)?, parse_date(end)?)
    }

    /// Fetch several queries into a frame keyed by metric name.
    ///
    /// Metric names must be unique across `queries`. The check runs before
    /// any chunk is requested.
    pub fn fetch_frame(
        &self,
        queries: &[MetricQuery],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MetricFrame> {
        for (i, query) in queries.iter().enumerate() {
            if queries[..i].iter().any(|q| q.metric == query.metric) {
                return Err(MetricsError::InvalidParameter(format!(
                    "metric '{}' requested more than once ({})",
                    query.metric,
                    query.slug()
                )));
            }
        }

        let mut frame = MetricFrame::new();
        for query in queries {
            let series = self.fetch(query, start, end)?;
            frame.insert(query.metric.clone(), series);
        }
        Ok(frame)
    }
}

fn chunk_error(chunk: &DateChunk, err: MetricsError) -> MetricsError {
    match err {
        MetricsError::Fetch { .. } => err,
        other => MetricsError::Fetch {
            chunk: chunk.to_string(),
            reason: other.to_string(),
        },
    }
}
