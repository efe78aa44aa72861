//! Dual-axis line chart descriptions.
//!
//! [`DualAxisChart`] turns columns of a [`MetricFrame`] into a [`Chart`]: one
//! or more lines on the left axis, an optional line on the right axis, and
//! vertical markers at event timestamps. Rendering is left to the caller; the
//! chart serializes with serde for hand-off to a plotting frontend.

use crate::core::{MetricFrame, TimeSeries};
use crate::error::{MetricsError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

const LEFT_LINE_WIDTH: f64 = 2.0;
const RIGHT_LINE_WIDTH: f64 = 1.8;
const RIGHT_LINE_COLOR: &str = "red";
const MARKER_COLOR: &str = "#424242";
const MARKER_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Left,
    Right,
}

/// One plotted metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub metric: String,
    pub axis: Axis,
    /// `None` lets the renderer pick from its palette.
    pub color: Option<String>,
    pub width: f64,
    pub points: Vec<(DateTime<Utc>, Option<f64>)>,
}

/// Vertical line marking an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMarker {
    pub at: DateTime<Utc>,
    pub y_min: f64,
    pub y_max: f64,
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub left: Vec<Line>,
    pub right: Option<Line>,
    pub markers: Vec<EventMarker>,
}

/// Builder for a [`Chart`].
///
/// # Example
///
/// ```
/// use chainmetrics::chart::DualAxisChart;
/// use chainmetrics::core::{MetricFrame, TimeSeries};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let ts: Vec<_> = (0..3).map(|d| base + Duration::days(d)).collect();
/// let frame = MetricFrame::new()
///     .with("price_usd", TimeSeries::from_f64(ts.clone(), &[40.0, 42.0, 41.0]).unwrap())
///     .with("mvrv", TimeSeries::from_f64(ts.clone(), &[1.1, 1.2, 1.15]).unwrap());
///
/// let chart = DualAxisChart::new(["price_usd"])
///     .right("mvrv")
///     .markers(vec![ts[1]])
///     .build(&frame)
///     .unwrap();
///
/// assert_eq!(chart.left.len(), 1);
/// assert_eq!(chart.markers[0].y_max, 42.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DualAxisChart {
    left: Vec<String>,
    right: Option<String>,
    markers: Vec<DateTime<Utc>>,
}

impl DualAxisChart {
    pub fn new<I, S>(left_metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            left: left_metrics.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn right(mut self, metric: impl Into<String>) -> Self {
        self.right = Some(metric.into());
        self
    }

    pub fn markers(mut self, at: Vec<DateTime<Utc>>) -> Self {
        self.markers = at;
        self
    }

    /// Resolve metric names against `frame` and lay out the chart.
    ///
    /// Markers span the smallest to largest value found anywhere in the frame.
    pub fn build(&self, frame: &MetricFrame) -> Result<Chart> {
        if self.left.is_empty() {
            return Err(MetricsError::InvalidParameter(
                "at least one left-axis metric is required".to_string(),
            ));
        }

        let left = self
            .left
            .iter()
            .map(|name| {
                let series = frame.require(name)?;
                Ok(line(name, series, Axis::Left, None, LEFT_LINE_WIDTH))
            })
            .collect::<Result<Vec<_>>>()?;

        let right = match &self.right {
            Some(name) => Some(line(
                name,
                frame.require(name)?,
                Axis::Right,
                Some(RIGHT_LINE_COLOR),
                RIGHT_LINE_WIDTH,
            )),
            None => None,
        };

        let markers = if self.markers.is_empty() {
            Vec::new()
        } else {
            let (y_min, y_max) = frame
                .value_range()
                .ok_or(MetricsError::InsufficientData { needed: 1, got: 0 })?;
            self.markers
                .iter()
                .map(|&at| EventMarker {
                    at,
                    y_min,
                    y_max,
                    color: MARKER_COLOR.to_string(),
                    width: MARKER_WIDTH,
                })
                .collect()
        };

        Ok(Chart {
            left,
            right,
            markers,
        })
    }
}

fn line(metric: &str, series: &TimeSeries, axis: Axis, color: Option<&str>, width: f64) -> Line {
    Line {
        metric: metric.to_string(),
        axis,
        color: color.map(str::to_string),
        width,
        points: series.iter().collect(),
    }
}
