//! Error types for time arithmetic.
//!
//! Every fallible operation in this crate reports a [`TimeError`]; invalid
//! rates are input-validation failures, never silent infinities.

use thiserror::Error;

/// Errors produced by rational time arithmetic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeError {
    /// A rate was zero, negative, or not finite.
    #[error("Invalid rate: {rate}")]
    InvalidRate { rate: f64 },

    /// A time value was not finite.
    #[error("Invalid time value: {value}")]
    InvalidValue { value: f64 },

    /// A range was built with a negative duration.
    #[error("Negative duration: {value} at rate {rate}")]
    NegativeDuration { value: f64, rate: f64 },

    /// A rational number was built with a zero denominator.
    #[error("Denominator cannot be zero")]
    ZeroDenominator,

    /// A rate cannot be expressed as an integer timebase with optional NTSC pulldown.
    #[error("Rate {rate} cannot be expressed as a timebase")]
    UnrepresentableRate { rate: f64 },

    /// An exact computation overflowed its integer representation.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

/// Result type alias using [`TimeError`].
pub type Result<T> = std::result::Result<T, TimeError>;

impl TimeError {
    /// Create an invalid-rate error.
    pub fn invalid_rate(rate: f64) -> Self {
        TimeError::InvalidRate { rate }
    }

    /// Check if this error was caused by a bad rate.
    #[must_use]
    pub fn is_rate_error(&self) -> bool {
        matches!(
            self,
            TimeError::InvalidRate { .. } | TimeError::UnrepresentableRate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimeError::invalid_rate(0.0);
        assert_eq!(err.to_string(), "Invalid rate: 0");

        let err = TimeError::NegativeDuration {
            value: -3.0,
            rate: 24.0,
        };
        assert_eq!(err.to_string(), "Negative duration: -3 at rate 24");
    }

    #[test]
    fn test_is_rate_error() {
        assert!(TimeError::invalid_rate(-1.0).is_rate_error());
        assert!(TimeError::UnrepresentableRate { rate: 23.5 }.is_rate_error());
        assert!(!TimeError::ZeroDenominator.is_rate_error());
    }
}
