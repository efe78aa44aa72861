//! # chainmetrics
//!
//! Analytics support kit for cryptoasset metric time series.
//!
//! Provides N-period percentage change, time-aware moving averages and the
//! change of a moving average, all sharing one policy for missing values and
//! zero baselines. Around that core sit chunked fetching through a pluggable
//! [`fetch::MetricSource`] and dual-axis chart descriptions.

pub mod change;
pub mod chart;
pub mod config;
pub mod core;
pub mod error;
pub mod fetch;

pub use error::{MetricsError, Result};

pub mod prelude {
    pub use crate::change::{
        moving_average, moving_average_change, n_period_change, n_period_change_raw,
    };
    pub use crate::config::{ChangeConfig, FetchConfig};
    pub use crate::core::{MetricFrame, TimeSeries, TimeSeriesBuilder};
    pub use crate::error::{MetricsError, Result};
    pub use crate::fetch::{MetricFetcher, MetricQuery, MetricSource};
}
