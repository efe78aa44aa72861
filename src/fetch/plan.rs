//! Date-range chunking and interval parsing for metric requests.

use crate::error::{MetricsError, Result};
use chrono::{Days, Duration, NaiveDate};
use std::fmt;

/// An inclusive calendar-day range covered by one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateChunk {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateChunk {
    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Split `[start, end]` into consecutive chunks of at most `chunk_days` days.
///
/// Chunks are returned in chronological order, never overlap, and together
/// cover every day of the range. The last chunk is clipped at `end`.
pub fn plan_chunks(start: NaiveDate, end: NaiveDate, chunk_days: u32) -> Result<Vec<DateChunk>> {
    if chunk_days == 0 {
        return Err(MetricsError::InvalidParameter(
            "chunk_days must be positive".to_string(),
        ));
    }
    if start > end {
        return Err(MetricsError::InvalidParameter(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    let mut chunks = Vec::new();
    let mut cursor = start;

    loop {
        let chunk_end = cursor
            .checked_add_days(Days::new(u64::from(chunk_days - 1)))
            .map_or(end, |d| d.min(end));
        chunks.push(DateChunk {
            start: cursor,
            end: chunk_end,
        });

        if chunk_end >= end {
            break;
        }
        match chunk_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    Ok(chunks)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| MetricsError::InvalidParameter(format!("invalid date '{}': {}", s, e)))
}

/// Parse a sampling interval such as `5m`, `1h`, `1d` or `1w`.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let s = s.trim();
    let invalid = || MetricsError::InvalidParameter(format!("invalid interval '{}'", s));

    let split = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
    let (amount, unit) = s.split_at(split);
    let amount: i64 = amount.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let step = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    };
    step.ok_or_else(invalid)
}
