//! Estimation configuration with defaults and presets.

use ladder_core::types::error::{ensure_non_negative, ensure_positive, ValidationError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the single-class gradient-ascent fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MleConfig {
    /// Maximum ascent iterations.
    pub max_iterations: usize,
    /// Convergence threshold on the gradient norm.
    pub tolerance: f64,
    /// Initial step size attempted each iteration.
    pub initial_step: f64,
    /// Maximum halvings of the step before giving up on an iteration.
    pub max_halvings: usize,
    /// L2 ridge strength applied to every coefficient.
    pub ridge: f64,
}

impl Default for MleConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-5,
            initial_step: 0.1,
            max_halvings: 20,
            ridge: 1e-4,
        }
    }
}

impl MleConfig {
    /// Quick, low-precision fit for interactive callers.
    pub fn fast() -> Self {
        Self {
            max_iterations: 60,
            tolerance: 1e-4,
            ..Self::default()
        }
    }

    /// Slow, tight-tolerance fit for offline analysis.
    pub fn high_precision() -> Self {
        Self {
            max_iterations: 1_000,
            tolerance: 1e-7,
            ..Self::default()
        }
    }

    /// Sets the maximum iteration count.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the gradient-norm tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the ridge strength.
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge;
        self
    }

    /// Validates every field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_positive("mle.maxIterations", self.max_iterations as f64)?;
        ensure_positive("mle.tolerance", self.tolerance)?;
        ensure_positive("mle.initialStep", self.initial_step)?;
        ensure_non_negative("mle.ridge", self.ridge)
    }
}

/// Configuration for the latent-class EM fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmConfig {
    /// Number of latent classes (1..=3).
    pub classes: usize,
    /// Maximum EM iterations.
    pub max_iterations: usize,
    /// Convergence threshold on the mixture log-likelihood change.
    pub tolerance: f64,
    /// Standard deviation of the jitter applied to the initial fit.
    pub jitter: f64,
    /// Seed for reproducible initialisation.
    pub seed: u64,
    /// Inner single-class configuration used by each M-step.
    pub mle: MleConfig,
    /// Optional wall-clock budget, checked between EM iterations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget: Option<Duration>,
}

impl Default for EmConfig {
    fn default() -> Self {
        Self {
            classes: 1,
            max_iterations: 60,
            tolerance: 1e-6,
            jitter: 0.3,
            seed: 42,
            mle: MleConfig::default(),
            time_budget: None,
        }
    }
}

impl EmConfig {
    /// Quick fit: fewer EM and inner iterations.
    pub fn fast() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-4,
            mle: MleConfig::fast(),
            ..Self::default()
        }
    }

    /// Tight-tolerance fit for offline analysis.
    pub fn high_precision() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-8,
            mle: MleConfig::high_precision(),
            ..Self::default()
        }
    }

    /// Sets the latent class count (validated in [`EmConfig::validate`]).
    pub fn with_classes(mut self, classes: usize) -> Self {
        self.classes = classes;
        self
    }

    /// Sets the maximum EM iteration count.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence threshold on the mixture log-likelihood change.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the initialisation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Sets the inner single-class configuration.
    pub fn with_mle(mut self, mle: MleConfig) -> Self {
        self.mle = mle;
        self
    }

    /// Validates every field, including the supported class range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=3).contains(&self.classes) {
            return Err(ValidationError::InvalidClassCount {
                classes: self.classes,
            });
        }
        ensure_positive("em.maxIterations", self.max_iterations as f64)?;
        ensure_positive("em.tolerance", self.tolerance)?;
        ensure_non_negative("em.jitter", self.jitter)?;
        self.mle.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(MleConfig::default().validate().is_ok());
        assert!(EmConfig::default().validate().is_ok());
        assert!(EmConfig::fast().validate().is_ok());
        assert!(EmConfig::high_precision().validate().is_ok());
    }

    #[test]
    fn class_count_is_bounded() {
        assert!(EmConfig::default().with_classes(0).validate().is_err());
        assert!(EmConfig::default().with_classes(3).validate().is_ok());
        let err = EmConfig::default().with_classes(4).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidClassCount { classes: 4 }
        ));
    }

    #[test]
    fn builders_override_defaults() {
        let config = EmConfig::default()
            .with_classes(2)
            .with_seed(7)
            .with_time_budget(Duration::from_secs(45))
            .with_mle(MleConfig::default().with_ridge(1e-3));
        assert_eq!(config.classes, 2);
        assert_eq!(config.seed, 7);
        assert_eq!(config.time_budget, Some(Duration::from_secs(45)));
        assert_eq!(config.mle.ridge, 1e-3);
    }

    #[test]
    fn negative_ridge_is_rejected() {
        assert!(MleConfig::default().with_ridge(-0.1).validate().is_err());
    }
}
