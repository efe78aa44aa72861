//! TimeSeries data structure for timestamped metric values.

use crate::error::{MetricsError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// A univariate metric series with strictly increasing timestamps.
///
/// Missing observations are stored as `None`. NaN values handed to any
/// constructor are normalized to `None`, so a stored `Some(v)` is never NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<Option<f64>>,
    name: Option<String>,
    metadata: HashMap<String, String>,
    frequency: Option<Duration>,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<Option<f64>>,
    name: Option<String>,
    metadata: HashMap<String, String>,
    frequency: Option<Duration>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Set values with explicit missing markers.
    pub fn values(mut self, values: Vec<Option<f64>>) -> Self {
        self.values = values;
        self
    }

    /// Set values from a raw buffer, treating NaN as missing.
    pub fn values_f64(mut self, values: &[f64]) -> Self {
        self.values = values.iter().map(|&v| nan_to_none(v)).collect();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn frequency(mut self, freq: Duration) -> Self {
        self.frequency = Some(freq);
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        let mut ts = TimeSeries::new(self.timestamps, self.values)?;
        if let Some(freq) = self.frequency {
            ts.set_frequency(freq)?;
        }
        ts.name = self.name;
        ts.metadata = self.metadata;
        Ok(ts)
    }
}

impl TimeSeries {
    /// Create a series from timestamps and optional values.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(MetricsError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        validate_increasing(&timestamps)?;

        let values = values
            .into_iter()
            .map(|v| v.and_then(nan_to_none))
            .collect();

        Ok(Self {
            timestamps,
            values,
            name: None,
            metadata: HashMap::new(),
            frequency: None,
        })
    }

    /// Create a series from a raw buffer where NaN marks a missing value.
    pub fn from_f64(timestamps: Vec<DateTime<Utc>>, values: &[f64]) -> Result<Self> {
        Self::new(timestamps, values.iter().map(|&v| nan_to_none(v)).collect())
    }

    /// Create an empty series.
    pub fn empty() -> Self {
        Self {
            timestamps: Vec::new(),
            values: Vec::new(),
            name: None,
            metadata: HashMap::new(),
            frequency: None,
        }
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Values as a raw buffer with NaN in place of missing observations.
    pub fn to_f64(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, Option<f64>)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Number of missing observations.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Smallest and largest non-missing value, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Known sampling interval, if any.
    pub fn frequency(&self) -> Option<Duration> {
        self.frequency
    }

    /// Declare a fixed sampling interval. Must be positive.
    pub fn set_frequency(&mut self, freq: Duration) -> Result<()> {
        if freq <= Duration::zero() {
            return Err(MetricsError::InvalidParameter(
                "frequency must be positive".to_string(),
            ));
        }
        self.frequency = Some(freq);
        Ok(())
    }

    pub fn clear_frequency(&mut self) {
        self.frequency = None;
    }

    /// A series with the same index, name and frequency but new values.
    pub fn with_values(&self, values: Vec<Option<f64>>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(MetricsError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values: values.into_iter().map(|v| v.and_then(nan_to_none)).collect(),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            frequency: self.frequency,
        })
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(MetricsError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(MetricsError::InvalidParameter(format!(
                "slice end {} exceeds length {}",
                end,
                self.len()
            )));
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            frequency: self.frequency,
        })
    }

    /// Append a later series onto this one.
    ///
    /// The first appended timestamp must be strictly after the last existing one.
    pub fn append(&mut self, other: TimeSeries) -> Result<()> {
        if let (Some(last), Some(first)) = (self.timestamps.last(), other.timestamps.first()) {
            if first <= last {
                return Err(MetricsError::TimestampError(format!(
                    "appended series starts at {} which is not after {}",
                    first, last
                )));
            }
        }

        self.timestamps.extend(other.timestamps);
        self.values.extend(other.values);
        Ok(())
    }

    /// Check that every gap between consecutive timestamps equals `step`.
    pub fn is_regular(&self, step: Duration) -> bool {
        self.timestamps.windows(2).all(|w| w[1] - w[0] == step)
    }

    /// Infer frequency from the modal timestamp spacing.
    ///
    /// `tolerance` is the minimum share of gaps that must equal the mode.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Duration> {
        if self.len() < 2 {
            return Err(MetricsError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        // Ties resolve to the smaller spacing.
        let (modal_diff, modal_count) = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&diff, &count)| (diff, count))
            .ok_or(MetricsError::FrequencyInference(
                "empty spacing data".to_string(),
            ))?;

        let total_count = self.len() - 1;
        let modal_ratio = modal_count as f64 / total_count as f64;

        if modal_ratio < tolerance {
            return Err(MetricsError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }

        Ok(Duration::seconds(modal_diff))
    }

    /// Declare the sampling interval from the timestamps.
    ///
    /// Only succeeds when every gap equals the modal spacing. A series with
    /// any irregular gap keeps no frequency, so positional shifts are never
    /// applied to it.
    pub fn set_frequency_from_timestamps(&mut self) -> Result<()> {
        let freq = self.infer_frequency(0.5)?;
        if !self.is_regular(freq) {
            return Err(MetricsError::FrequencyInference(format!(
                "spacing is not uniformly {}",
                freq
            )));
        }
        self.set_frequency(freq)
    }
}

fn validate_increasing(timestamps: &[DateTime<Utc>]) -> Result<()> {
    for w in timestamps.windows(2) {
        if w[1] <= w[0] {
            return Err(MetricsError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }
    }
    Ok(())
}

fn nan_to_none(v: f64) -> Option<f64> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}
