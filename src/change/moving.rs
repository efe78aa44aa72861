//! Time-aware trailing moving averages and their percentage change.
//!
//! Windows are defined in wall-clock time rather than observation counts, so
//! irregularly spaced series are handled without resampling. The window for
//! an observation at `t` covers `(t - window, t]`.

use crate::change::policy::{combine, present};
use crate::config::ChangeConfig;
use crate::core::TimeSeries;
use crate::error::{MetricsError, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Default look-back used by [`moving_average_change`] callers.
pub const DEFAULT_CHANGE_WINDOW_HOURS: i64 = 24;

/// Running sum with Neumaier compensation, so values leaving the window do
/// not leave rounding residue behind.
///
/// Infinite observations are counted instead of summed. Feeding one into the
/// compensated sum would poison it with NaN after the value leaves again.
#[derive(Debug, Default)]
struct WindowSum {
    sum: f64,
    compensation: f64,
    count: usize,
    finite: usize,
    pos_inf: usize,
    neg_inf: usize,
}

impl WindowSum {
    fn add(&mut self, x: f64) {
        self.count += 1;
        if x == f64::INFINITY {
            self.pos_inf += 1;
        } else if x == f64::NEG_INFINITY {
            self.neg_inf += 1;
        } else {
            self.finite += 1;
            self.accumulate(x);
        }
    }

    fn remove(&mut self, x: f64) {
        self.count -= 1;
        if x == f64::INFINITY {
            self.pos_inf -= 1;
        } else if x == f64::NEG_INFINITY {
            self.neg_inf -= 1;
        } else {
            self.finite -= 1;
            if self.finite == 0 {
                self.sum = 0.0;
                self.compensation = 0.0;
            } else {
                self.accumulate(-x);
            }
        }
    }

    fn accumulate(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn mean(&self, min_periods: usize) -> Option<f64> {
        if self.count == 0 || self.count < min_periods {
            return None;
        }
        match (self.pos_inf > 0, self.neg_inf > 0) {
            // inf - inf is undefined
            (true, true) => None,
            (true, false) => Some(f64::INFINITY),
            (false, true) => Some(f64::NEG_INFINITY),
            (false, false) => Some((self.sum + self.compensation) / self.count as f64),
        }
    }
}

/// Trailing time-window mean over parallel timestamp and value slices.
///
/// Each output is the mean of the non-missing values whose timestamp lies in
/// `(t - window, t]`, or `None` when fewer than `min_periods` such values
/// exist. `Some(NaN)` counts as missing. Timestamps must be sorted ascending.
///
/// # Arguments
/// * `timestamps` - Observation times, ascending
/// * `values` - Observations, `None` for missing
/// * `window` - Window span, must be positive
/// * `min_periods` - Minimum non-missing observations required
pub fn time_rolling_mean(
    timestamps: &[DateTime<Utc>],
    values: &[Option<f64>],
    window: Duration,
    min_periods: usize,
) -> Result<Vec<Option<f64>>> {
    if timestamps.len() != values.len() {
        return Err(MetricsError::DimensionMismatch {
            expected: timestamps.len(),
            got: values.len(),
        });
    }
    check_positive(window, "window")?;

    let mut result = Vec::with_capacity(values.len());
    let mut acc = WindowSum::default();
    let mut start = 0;

    for (i, (&t, &value)) in timestamps.iter().zip(values.iter()).enumerate() {
        if let Some(v) = present(value) {
            acc.add(v);
        }

        let cutoff = t - window;
        while start < i && timestamps[start] <= cutoff {
            if let Some(v) = present(values[start]) {
                acc.remove(v);
            }
            start += 1;
        }

        result.push(acc.mean(min_periods));
    }

    Ok(result)
}

/// Trailing moving average over a time window.
///
/// # Example
///
/// ```
/// use chainmetrics::change::moving_average;
/// use chainmetrics::core::TimeSeries;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let timestamps = (0..4).map(|h| base + Duration::hours(h)).collect();
/// let series = TimeSeries::from_f64(timestamps, &[1.0, 2.0, 3.0, 4.0]).unwrap();
///
/// let ma = moving_average(&series, Duration::hours(2), 1).unwrap();
/// assert_eq!(ma.values(), &[Some(1.0), Some(1.5), Some(2.5), Some(3.5)]);
/// ```
pub fn moving_average(
    series: &TimeSeries,
    window: Duration,
    min_periods: usize,
) -> Result<TimeSeries> {
    let means = time_rolling_mean(series.timestamps(), series.values(), window, min_periods)?;
    series.with_values(means)
}

/// Percentage change of a moving average over `change_window`.
///
/// The moving average uses `min_periods = 1`. When the series declares a
/// sampling interval the baseline is the average `change_window / interval`
/// observations back (rounded down). Otherwise the baseline is the average at
/// the latest timestamp at or before `t - change_window`.
pub fn moving_average_change(
    series: &TimeSeries,
    ma_window: Duration,
    change_window: Duration,
) -> Result<TimeSeries> {
    ma_change(series, ma_window, change_window, 1)
}

/// [`moving_average_change`] with windows and `min_periods` taken from config.
pub fn moving_average_change_with(
    series: &TimeSeries,
    config: &ChangeConfig,
) -> Result<TimeSeries> {
    config.validate()?;
    ma_change(
        series,
        config.ma_window(),
        config.change_window(),
        config.min_periods,
    )
}

fn ma_change(
    series: &TimeSeries,
    ma_window: Duration,
    change_window: Duration,
    min_periods: usize,
) -> Result<TimeSeries> {
    check_positive(change_window, "change window")?;

    let ma = moving_average(series, ma_window, min_periods)?;
    let current = ma.values();

    let baseline = match series.frequency() {
        Some(freq) => {
            let periods = (total_nanos(change_window) / total_nanos(freq)) as usize;
            debug!(periods, ?freq, "shifting moving average by whole periods");
            shift_by_periods(current, periods)
        }
        None => {
            debug!(?change_window, "shifting moving average by wall-clock time");
            shift_by_time(ma.timestamps(), current, change_window)
        }
    };

    let changes = baseline
        .iter()
        .zip(current.iter())
        .map(|(&old, &new)| combine(old, new))
        .collect();

    series.with_values(changes)
}

fn shift_by_periods(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(periods).and_then(|j| values[j]))
        .collect()
}

/// As-of lookup: for each `t`, the value at the latest timestamp `<= t - lag`.
fn shift_by_time(
    timestamps: &[DateTime<Utc>],
    values: &[Option<f64>],
    lag: Duration,
) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    let mut next = 0;

    for &t in timestamps {
        let target = t - lag;
        while next < timestamps.len() && timestamps[next] <= target {
            next += 1;
        }
        result.push(next.checked_sub(1).and_then(|j| values[j]));
    }

    result
}

fn total_nanos(span: Duration) -> i128 {
    i128::from(span.num_seconds()) * 1_000_000_000 + i128::from(span.subsec_nanos())
}

fn check_positive(span: Duration, what: &str) -> Result<()> {
    if span <= Duration::zero() {
        return Err(MetricsError::InvalidParameter(format!(
            "{} must be positive",
            what
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn hourly(n: usize) -> Vec<DateTime<Utc>> {
        (0..n).map(|i| base() + Duration::hours(i as i64)).collect()
    }

    fn at_hours(hours: &[i64]) -> Vec<DateTime<Utc>> {
        hours.iter().map(|&h| base() + Duration::hours(h)).collect()
    }

    // ==================== time_rolling_mean ====================

    #[test]
    fn window_excludes_left_edge() {
        let ts = hourly(5);
        let values: Vec<_> = [1.0, 2.0, 3.0, 4.0, 5.0].iter().map(|&v| Some(v)).collect();

        // 3h window at t=3h covers (0h, 3h] -> 1h, 2h, 3h
        let result = time_rolling_mean(&ts, &values, Duration::hours(3), 1).unwrap();

        assert_eq!(result[0], Some(1.0));
        assert_eq!(result[1], Some(1.5));
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[3], Some(3.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn irregular_spacing() {
        let ts = at_hours(&[0, 1, 5, 6, 30]);
        let values: Vec<_> = [2.0, 4.0, 6.0, 8.0, 10.0].iter().map(|&v| Some(v)).collect();

        let result = time_rolling_mean(&ts, &values, Duration::hours(5), 1).unwrap();

        assert_eq!(result[0], Some(2.0));
        assert_eq!(result[1], Some(3.0));
        // (0h, 5h] -> 1h, 5h
        assert_eq!(result[2], Some(5.0));
        // (1h, 6h] -> 5h, 6h
        assert_eq!(result[3], Some(7.0));
        assert_eq!(result[4], Some(10.0));
    }

    #[test]
    fn missing_values_are_skipped() {
        let ts = hourly(4);
        let values = vec![Some(2.0), None, Some(4.0), None];

        let result = time_rolling_mean(&ts, &values, Duration::hours(2), 1).unwrap();

        assert_eq!(result[0], Some(2.0));
        assert_eq!(result[1], Some(2.0));
        assert_eq!(result[2], Some(4.0));
        assert_eq!(result[3], Some(4.0));
    }

    #[test]
    fn min_periods_threshold() {
        let ts = hourly(4);
        let values = vec![Some(2.0), None, Some(4.0), Some(6.0)];

        let result = time_rolling_mean(&ts, &values, Duration::hours(3), 2).unwrap();

        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(3.0));
        assert_eq!(result[3], Some(5.0));
    }

    #[test]
    fn empty_window_is_missing_even_with_zero_min_periods() {
        let ts = hourly(2);
        let values = vec![None, None];
        let result = time_rolling_mean(&ts, &values, Duration::hours(1), 0).unwrap();
        assert_eq!(result, vec![None, None]);
    }

    #[test]
    fn constant_series_averages_to_constant() {
        let ts = at_hours(&[0, 1, 3, 4, 9, 10, 11, 20]);
        let values = vec![Some(0.7); ts.len()];

        for hours in [1, 2, 5, 48] {
            let result = time_rolling_mean(&ts, &values, Duration::hours(hours), 1).unwrap();
            for v in result {
                assert_relative_eq!(v.unwrap(), 0.7, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn rejects_shape_mismatch_and_bad_window() {
        let ts = hourly(3);
        assert_eq!(
            time_rolling_mean(&ts, &[Some(1.0)], Duration::hours(1), 1),
            Err(MetricsError::DimensionMismatch {
                expected: 3,
                got: 1
            })
        );
        assert!(matches!(
            time_rolling_mean(&ts, &[None, None, None], Duration::zero(), 1),
            Err(MetricsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn infinite_values_leave_the_window_cleanly() {
        let ts = hourly(5);
        let values = vec![Some(1.0), Some(f64::INFINITY), Some(1.0), Some(1.0), Some(1.0)];

        let result = time_rolling_mean(&ts, &values, Duration::hours(1), 1).unwrap();
        assert_eq!(
            result,
            vec![Some(1.0), Some(f64::INFINITY), Some(1.0), Some(1.0), Some(1.0)]
        );

        // (1h, 4h] no longer holds the infinity
        let result = time_rolling_mean(&ts, &values, Duration::hours(3), 1).unwrap();
        assert_eq!(result[3], Some(f64::INFINITY));
        assert_eq!(result[4], Some(1.0));
    }

    #[test]
    fn opposite_infinities_are_undefined() {
        let ts = hourly(3);
        let values = vec![Some(f64::INFINITY), Some(f64::NEG_INFINITY), Some(1.0)];

        let result = time_rolling_mean(&ts, &values, Duration::hours(2), 1).unwrap();
        assert_eq!(result, vec![Some(f64::INFINITY), None, Some(f64::NEG_INFINITY)]);
    }

    #[test]
    fn nan_counts_as_missing() {
        let ts = hourly(4);
        let values = vec![Some(1.0), Some(f64::NAN), Some(2.0), Some(4.0)];

        let result = time_rolling_mean(&ts, &values, Duration::hours(1), 1).unwrap();
        assert_eq!(result, vec![Some(1.0), None, Some(2.0), Some(4.0)]);

        let result = time_rolling_mean(&ts, &values, Duration::hours(3), 1).unwrap();
        assert_eq!(result, vec![Some(1.0), Some(1.0), Some(1.5), Some(3.0)]);
    }

    #[test]
    fn moving_average_of_empty_series() {
        let ma = moving_average(&TimeSeries::empty(), Duration::hours(24), 1).unwrap();
        assert!(ma.is_empty());
    }

    // ==================== moving_average_change ====================

    #[test]
    fn change_with_known_frequency_shifts_positionally() {
        let mut series = TimeSeries::from_f64(hourly(6), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        series.set_frequency(Duration::hours(1)).unwrap();

        // 1h moving average is the series itself; 2h change looks 2 steps back
        let result =
            moving_average_change(&series, Duration::hours(1), Duration::hours(2)).unwrap();
        let values = result.values();

        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_relative_eq!(values[2].unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(values[3].unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(values[5].unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn change_periods_round_down() {
        let mut series = TimeSeries::from_f64(hourly(4), &[1.0, 2.0, 4.0, 8.0]).unwrap();
        series.set_frequency(Duration::hours(2)).unwrap();

        // 3h / 2h -> 1 period; timestamps are hourly but the declared interval wins
        let result =
            moving_average_change(&series, Duration::minutes(30), Duration::hours(3)).unwrap();
        assert_eq!(result.values(), &[None, Some(1.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn change_without_frequency_uses_as_of_lookup() {
        let ts = at_hours(&[0, 1, 3, 4, 7]);
        let series = TimeSeries::from_f64(ts, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let result =
            moving_average_change(&series, Duration::minutes(30), Duration::hours(2)).unwrap();
        let values = result.values();

        // 0h, 1h: nothing at or before t-2h
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        // 3h -> baseline at 1h (2.0)
        assert_relative_eq!(values[2].unwrap(), 0.5, epsilon = 1e-12);
        // 4h -> baseline at 1h (2.0), the latest at or before 2h
        assert_relative_eq!(values[3].unwrap(), 1.0, epsilon = 1e-12);
        // 7h -> baseline at 4h (4.0)
        assert_relative_eq!(values[4].unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn as_of_baseline_with_missing_average_is_missing() {
        let ts = at_hours(&[0, 1, 3, 5]);
        let series = TimeSeries::new(ts, vec![Some(2.0), None, Some(3.0), Some(4.0)]).unwrap();

        let result =
            moving_average_change(&series, Duration::minutes(30), Duration::hours(2)).unwrap();
        let values = result.values();

        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        // 3h -> latest at or before 1h is 1h, whose average is missing
        assert_eq!(values[2], None);
        // 5h -> baseline at 3h (3.0)
        assert_relative_eq!(values[3].unwrap(), 4.0 / 3.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mostly_regular_series_stays_on_as_of_lookup() {
        let ts = at_hours(&[0, 1, 2, 3, 10, 11]);
        let mut series = TimeSeries::from_f64(ts, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert!(series.set_frequency_from_timestamps().is_err());

        let result =
            moving_average_change(&series, Duration::minutes(30), Duration::hours(2)).unwrap();
        // 10h -> baseline at 3h (4.0), not two positions back
        assert_relative_eq!(result.values()[4].unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn constant_series_has_zero_change() {
        let series = TimeSeries::from_f64(hourly(72), &vec![3.0; 72]).unwrap();
        let result =
            moving_average_change(&series, Duration::hours(24), Duration::hours(24)).unwrap();

        let values = result.values();
        assert!(values[..24].iter().all(|v| v.is_none()));
        for v in &values[24..] {
            assert_relative_eq!(v.unwrap(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_series_change_is_zero() {
        let mut series = TimeSeries::from_f64(hourly(5), &[0.0; 5]).unwrap();
        series.set_frequency(Duration::hours(1)).unwrap();

        let result =
            moving_average_change(&series, Duration::hours(2), Duration::hours(1)).unwrap();
        assert_eq!(&result.values()[1..], &[Some(0.0); 4]);
    }

    #[test]
    fn change_rejects_non_positive_windows() {
        let series = TimeSeries::from_f64(hourly(3), &[1.0, 2.0, 3.0]).unwrap();
        assert!(moving_average_change(&series, Duration::hours(1), Duration::zero()).is_err());
        assert!(moving_average_change(&series, Duration::hours(-1), Duration::hours(1)).is_err());
    }

    #[test]
    fn change_from_config() {
        let series = TimeSeries::from_f64(hourly(48), &vec![5.0; 48]).unwrap();
        let config = ChangeConfig {
            ma_window_hours: 6,
            change_window_hours: 12,
            min_periods: 1,
        };

        let result = moving_average_change_with(&series, &config).unwrap();
        assert_eq!(result.values()[11], None);
        assert_eq!(result.values()[12], Some(0.0));
    }
}
