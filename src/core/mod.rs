//! Core data structures for metric time series.

mod frame;
mod time_series;

pub use frame::MetricFrame;
pub use time_series::{TimeSeries, TimeSeriesBuilder};
