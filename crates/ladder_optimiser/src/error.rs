//! Optimiser error types.

use ladder_core::types::{Tier, ValidationError};
use thiserror::Error;

/// Errors raised before any grid work starts.
///
/// An empty feasible set is not an error; it is reported through
/// [`crate::result::OptimiserResult`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimiserError {
    /// A search range is inverted, non-positive, or non-finite.
    #[error("invalid search range for `{tier}`: [{min}, {max}]")]
    InvalidRange {
        /// Tier whose range is unusable.
        tier: Tier,
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },

    /// The population multiplier is non-positive or non-finite.
    #[error("population must be a positive finite count, got {population}")]
    InvalidPopulation {
        /// Offending population value.
        population: f64,
    },

    /// A constituent record failed its own validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl OptimiserError {
    /// Builds an [`OptimiserError::InvalidRange`].
    pub fn invalid_range(tier: Tier, min: f64, max: f64) -> Self {
        Self::InvalidRange { tier, min, max }
    }

    /// Builds an [`OptimiserError::InvalidPopulation`].
    pub fn invalid_population(population: f64) -> Self {
        Self::InvalidPopulation { population }
    }

    /// True for range problems, from either constructor or validation.
    pub fn is_range_error(&self) -> bool {
        match self {
            Self::InvalidRange { .. } => true,
            Self::Invalid(inner) => inner.is_range_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_tier() {
        let err = OptimiserError::invalid_range(Tier::Better, 50.0, 10.0);
        assert!(err.to_string().contains("better"));
        assert!(err.is_range_error());
    }

    #[test]
    fn validation_errors_convert() {
        let err: OptimiserError = ValidationError::non_positive("step", 0.0).into();
        assert!(matches!(err, OptimiserError::Invalid(_)));
        assert!(!err.is_range_error());
    }
}
