//! Configuration for change computations and chunked fetching.

use crate::change::DEFAULT_CHANGE_WINDOW_HOURS;
use crate::error::{MetricsError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default number of days requested per fetch chunk.
pub const DEFAULT_CHUNK_DAYS: u32 = 120;

/// Windows for moving-average change computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeConfig {
    /// Moving average window in hours
    pub ma_window_hours: u32,

    /// Look-back for the change of the moving average, in hours
    pub change_window_hours: u32,

    /// Minimum non-missing observations inside the moving average window
    pub min_periods: usize,
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            ma_window_hours: 24,
            change_window_hours: DEFAULT_CHANGE_WINDOW_HOURS as u32,
            min_periods: 1,
        }
    }
}

impl ChangeConfig {
    /// Parse from JSON, filling absent fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MetricsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ma_window_hours == 0 {
            return Err(MetricsError::Config(
                "ma_window_hours must be positive".to_string(),
            ));
        }
        if self.change_window_hours == 0 {
            return Err(MetricsError::Config(
                "change_window_hours must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ma_window(&self) -> Duration {
        Duration::hours(i64::from(self.ma_window_hours))
    }

    pub fn change_window(&self) -> Duration {
        Duration::hours(i64::from(self.change_window_hours))
    }
}

/// Settings for [`MetricFetcher`](crate::fetch::MetricFetcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Days covered by each request
    pub chunk_days: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            chunk_days: DEFAULT_CHUNK_DAYS,
        }
    }
}

impl FetchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MetricsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_days == 0 {
            return Err(MetricsError::Config(
                "chunk_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
