//! Error types for the chainmetrics library.

use thiserror::Error;

/// Result type alias for metric operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while building, transforming or fetching series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Length mismatch between timestamps and values (or between columns).
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// A metric name was not found in a frame.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// A chunk request to the metric source failed.
    #[error("fetch failed for chunk {chunk}: {reason}")]
    Fetch { chunk: String, reason: String },

    /// Configuration could not be parsed or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = MetricsError::InvalidParameter("periods must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: periods must be at least 1"
        );

        let err = MetricsError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, got 2");

        let err = MetricsError::Fetch {
            chunk: "2024-01-01..2024-04-29".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "fetch failed for chunk 2024-01-01..2024-04-29: timeout"
        );

        let err = MetricsError::UnknownMetric("price_usd".to_string());
        assert_eq!(err.to_string(), "unknown metric: price_usd");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = MetricsError::Config("bad".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
