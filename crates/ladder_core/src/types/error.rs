//! Structured validation errors shared across the workspace.
//!
//! Validation failures are fatal, inspectable values: callers receive the
//! offending field and value rather than a panic or a silently clamped
//! result. Non-fatal outcomes (infeasibility, non-convergence) are fields on
//! results, never error variants.

use crate::types::tier::Tier;
use thiserror::Error;

/// Input validation failure.
///
/// Raised when a record breaks a structural precondition (non-finite price,
/// inverted range, unsupported class count). Construction helpers keep call
/// sites terse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A numeric field that must be finite is NaN or infinite.
    #[error("field `{field}` must be finite, got {value}")]
    NonFinite {
        /// Dotted path of the offending field (e.g. `ladder.better`).
        field: String,
        /// The offending value.
        value: f64,
    },

    /// A numeric field that must be strictly positive is zero or negative.
    #[error("field `{field}` must be positive, got {value}")]
    NonPositive {
        /// Dotted path of the offending field.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// A numeric field that must be non-negative is negative.
    #[error("field `{field}` must be non-negative, got {value}")]
    NegativeValue {
        /// Dotted path of the offending field.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// A fraction field lies outside `[0, 1]`.
    #[error("field `{field}` must lie in [0, 1], got {value}")]
    InvalidFraction {
        /// Dotted path of the offending field.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// A per-tier search range is inverted or non-finite.
    #[error("search range for tier `{tier}` is invalid: min {min}, max {max}")]
    InvalidRange {
        /// Tier whose range failed validation.
        tier: Tier,
        /// Lower bound supplied.
        min: f64,
        /// Upper bound supplied.
        max: f64,
    },

    /// The grid step is zero, negative, or non-finite.
    #[error("grid step must be positive and finite, got {step}")]
    InvalidStep {
        /// The offending step.
        step: f64,
    },

    /// A segment list was empty where at least one segment is required.
    #[error("segment list must not be empty")]
    EmptySegments,

    /// A latent-class count outside the supported `1..=3`.
    #[error("latent class count must be between 1 and 3, got {classes}")]
    InvalidClassCount {
        /// The requested class count.
        classes: usize,
    },
}

impl ValidationError {
    /// Non-finite field helper.
    pub fn non_finite(field: impl Into<String>, value: f64) -> Self {
        ValidationError::NonFinite {
            field: field.into(),
            value,
        }
    }

    /// Non-positive field helper.
    pub fn non_positive(field: impl Into<String>, value: f64) -> Self {
        ValidationError::NonPositive {
            field: field.into(),
            value,
        }
    }

    /// Out-of-range fraction helper.
    pub fn invalid_fraction(field: impl Into<String>, value: f64) -> Self {
        ValidationError::InvalidFraction {
            field: field.into(),
            value,
        }
    }

    /// Invalid range helper.
    pub fn invalid_range(tier: Tier, min: f64, max: f64) -> Self {
        ValidationError::InvalidRange { tier, min, max }
    }

    /// True for `NonFinite` failures.
    pub fn is_non_finite(&self) -> bool {
        matches!(self, ValidationError::NonFinite { .. })
    }

    /// True for range/step failures raised by grid configuration.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            ValidationError::InvalidRange { .. } | ValidationError::InvalidStep { .. }
        )
    }
}

/// Checks that `value` is finite, naming `field` on failure.
pub fn ensure_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::non_finite(field, value))
    }
}

/// Checks that `value` is finite and strictly positive.
pub fn ensure_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::non_positive(field, value))
    }
}

/// Checks that `value` is finite and non-negative.
pub fn ensure_non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeValue {
            field: field.into(),
            value,
        })
    }
}

/// Checks that `value` is a finite fraction in `[0, 1]`.
pub fn ensure_fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    ensure_finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::invalid_fraction(field, value))
    }
}
