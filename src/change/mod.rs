//! Percentage-change and moving-average transforms.
//!
//! Every computation here shares one rule for combining an old and a new
//! value (see [`policy::combine`]):
//!
//! 1. either side missing gives missing
//! 2. `0 -> 0` gives `0`
//! 3. `0 -> x` gives `1`
//! 4. otherwise `new / old - 1`
//!
//! # Example
//!
//! ```
//! use chainmetrics::change::{n_period_change_raw, moving_average_change};
//! use chainmetrics::core::TimeSeries;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let changes = n_period_change_raw(&[100.0, 110.0, 99.0], 1).unwrap();
//! assert!(changes[0].is_nan());
//!
//! let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let timestamps = (0..48).map(|h| base + Duration::hours(h)).collect();
//! let series = TimeSeries::from_f64(timestamps, &[2.0; 48]).unwrap();
//!
//! let ma_change =
//!     moving_average_change(&series, Duration::hours(24), Duration::hours(24)).unwrap();
//! assert_eq!(ma_change.values()[47], Some(0.0));
//! ```

pub mod moving;
pub mod period;
pub mod policy;

pub use moving::{
    moving_average, moving_average_change, moving_average_change_with, time_rolling_mean,
    DEFAULT_CHANGE_WINDOW_HOURS,
};
pub use period::{
    n_period_change, n_period_change_raw, one_period_change, seven_period_change,
    thirty_period_change,
};
pub use policy::{classify, combine, combine_f64, ChangeCase};
