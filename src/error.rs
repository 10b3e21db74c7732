//! Error types for the tsprep library.

use thiserror::Error;

/// Result type alias for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors that can occur while fitting, applying or inverting a transform.
///
/// Errors are raised at the offending stage and travel through a pipeline
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// A domain precondition on the input values was violated.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The series has (numerically) zero spread, so standardization is undefined.
    #[error("degenerate distribution: standard deviation {std} is zero")]
    DegenerateDistribution { std: f64 },

    /// Every value in the series is the same, so min-max scaling is undefined.
    #[error("degenerate range: all values equal {value}")]
    DegenerateRange { value: f64 },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The inverse would require an invalid real-valued operation.
    #[error("numeric domain error at index {index}: value {value} has no real inverse")]
    NumericDomain { index: usize, value: f64 },

    /// Difference inversion needs a lag value that was not supplied.
    #[error("missing lag value for index {index} (only {available} values available)")]
    MissingLagValue { index: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = TransformError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = TransformError::InsufficientData { needed: 3, got: 2 };
        assert_eq!(err.to_string(), "insufficient data: need at least 3, got 2");

        let err = TransformError::InvalidParameter("interval must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: interval must be at least 1"
        );

        let err = TransformError::MissingLagValue {
            index: 4,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "missing lag value for index 4 (only 4 values available)"
        );

        let err = TransformError::DegenerateRange { value: 5.0 };
        assert_eq!(err.to_string(), "degenerate range: all values equal 5");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = TransformError::NumericDomain {
            index: 2,
            value: -3.0,
        };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
        assert_ne!(err1, TransformError::EmptyData);
    }
}
