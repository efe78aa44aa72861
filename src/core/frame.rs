//! Ordered collection of named metric series.

use crate::core::TimeSeries;
use crate::error::{MetricsError, Result};

/// Named series kept in insertion order.
///
/// Columns are independent: each keeps its own index. No alignment or
/// resampling is performed between them.
#[derive(Debug, Clone, Default)]
pub struct MetricFrame {
    columns: Vec<(String, TimeSeries)>,
}

impl MetricFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, replacing any existing column with the same name.
    pub fn insert(&mut self, name: impl Into<String>, series: TimeSeries) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = series,
            None => self.columns.push((name, series)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, series: TimeSeries) -> Self {
        self.insert(name, series);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TimeSeries> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Like [`get`](Self::get) but fails with `UnknownMetric`.
    pub fn require(&self, name: &str) -> Result<&TimeSeries> {
        self.get(name)
            .ok_or_else(|| MetricsError::UnknownMetric(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Smallest and largest non-missing value across every column.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.columns
            .iter()
            .filter_map(|(_, s)| s.value_range())
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)))
    }
}
