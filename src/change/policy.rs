//! The old/new combination rule shared by every change computation.

/// Which branch of the combination rule produced a change value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCase {
    /// Either side is missing.
    Missing,
    /// Both sides are zero.
    BothZero,
    /// Old value is zero and new value is not.
    FromZero,
    /// Plain ratio `new / old - 1`.
    Ratio,
}

/// Classify an `(old, new)` pair. First matching rule wins.
///
/// A NaN on either side counts as missing.
pub fn classify(old: Option<f64>, new: Option<f64>) -> ChangeCase {
    match (present(old), present(new)) {
        (Some(old), Some(new)) => {
            if old == 0.0 && new == 0.0 {
                ChangeCase::BothZero
            } else if old == 0.0 {
                ChangeCase::FromZero
            } else {
                ChangeCase::Ratio
            }
        }
        _ => ChangeCase::Missing,
    }
}

/// Relative change from `old` to `new`.
///
/// - missing on either side gives `None`
/// - `0 -> 0` gives `0`
/// - `0 -> x` gives `1`, a fixed +100% marker rather than a ratio
/// - otherwise `new / old - 1`
pub fn combine(old: Option<f64>, new: Option<f64>) -> Option<f64> {
    match classify(old, new) {
        ChangeCase::Missing => None,
        ChangeCase::BothZero => Some(0.0),
        ChangeCase::FromZero => Some(1.0),
        ChangeCase::Ratio => match (old, new) {
            // old != 0 on this branch, so the division never sees a zero divisor
            (Some(old), Some(new)) => Some(new / old - 1.0),
            _ => None,
        },
    }
}

/// [`combine`] over raw floats, NaN in and NaN out for missing.
pub fn combine_f64(old: f64, new: f64) -> f64 {
    combine(Some(old), Some(new)).unwrap_or(f64::NAN)
}

pub(crate) fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| !x.is_nan())
}
