use thiserror::Error;

/// Boundary validation failures for values handed to the clustering engine,
/// the classifier or the weekly aggregator.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    NegativeOrNonFinite { field: &'static str, value: f64 },
    #[error("similarity threshold must be in (0, 1] (got {0})")]
    ThresholdOutOfRange(f64),
    #[error("tolerance `{field}` must be positive and finite (got {value})")]
    InvalidTolerance { field: &'static str, value: f64 },
}

/// Checks that `value` is finite and >= 0, returning it unchanged.
pub fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NegativeOrNonFinite { field, value })
    }
}
