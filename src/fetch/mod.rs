//! Chunked retrieval of metric series from an external provider.
//!
//! Metric APIs cap the size of a single request, so a long date range is
//! split into consecutive chunks (120 days by default), requested in order,
//! and concatenated into one chronological [`TimeSeries`](crate::core::TimeSeries).
//! The transport is left to a [`MetricSource`] implementation.

mod fetcher;
mod plan;

pub use fetcher::{MetricFetcher, MetricQuery, MetricSource};
pub use plan::{parse_date, parse_interval, plan_chunks, DateChunk};
