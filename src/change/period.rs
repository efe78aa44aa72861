//! Positional N-period percentage change.

use crate::change::policy::{combine, combine_f64};
use crate::core::TimeSeries;
use crate::error::{MetricsError, Result};

/// Percentage change between each value and the value `periods` steps back.
///
/// Only ordering matters, timestamps are ignored. The first `periods`
/// positions are always `None`.
///
/// # Example
///
/// ```
/// use chainmetrics::change::n_period_change;
///
/// let values = vec![Some(100.0), Some(110.0), Some(99.0), Some(108.0)];
/// let changes = n_period_change(&values, 1).unwrap();
///
/// assert_eq!(changes[0], None);
/// assert!((changes[1].unwrap() - 0.10).abs() < 1e-12);
/// assert!((changes[2].unwrap() + 0.10).abs() < 1e-12);
/// ```
pub fn n_period_change(values: &[Option<f64>], periods: usize) -> Result<Vec<Option<f64>>> {
    check_periods(periods)?;
    Ok(shifted_change(values, periods))
}

/// [`n_period_change`] over a raw buffer where NaN marks missing values.
///
/// If `periods >= values.len()` every output is NaN.
pub fn n_period_change_raw(values: &[f64], periods: usize) -> Result<Vec<f64>> {
    check_periods(periods)?;

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if periods >= n {
        return Ok(result);
    }

    for ((out, &old), &new) in result[periods..]
        .iter_mut()
        .zip(values.iter())
        .zip(values[periods..].iter())
    {
        *out = combine_f64(old, new);
    }

    Ok(result)
}

/// One-period change.
pub fn one_period_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    shifted_change(values, 1)
}

/// Seven-period change (one week on daily data).
pub fn seven_period_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    shifted_change(values, 7)
}

/// Thirty-period change (roughly one month on daily data).
pub fn thirty_period_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    shifted_change(values, 30)
}

fn shifted_change(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let old = i.checked_sub(periods).and_then(|j| values[j]);
            combine(old, values[i])
        })
        .collect()
}

fn check_periods(periods: usize) -> Result<()> {
    if periods == 0 {
        return Err(MetricsError::InvalidParameter(
            "periods must be at least 1".to_string(),
        ));
    }
    Ok(())
}

impl TimeSeries {
    /// N-period percentage change, keeping this series' index.
    pub fn pct_change(&self, periods: usize) -> Result<TimeSeries> {
        let changes = n_period_change(self.values(), periods)?;
        self.with_values(changes)
    }
}
