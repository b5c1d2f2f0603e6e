//! Latent-class estimation via expectation-maximisation.
//!
//! A mixture of 1..=3 multinomial-logit classes is fitted by the classic
//! EM scheme: soft-assign occasions to classes in log space (E-step),
//! refresh the class weights from the mean responsibilities, then refit
//! each class with [`fit_single_class`] warm-started from its current
//! coefficients (M-step). Warm-starting is load-bearing: refitting every
//! class from zeros would send them all to the same optimum and collapse
//! the mixture.
//!
//! The single-class base fit doubles as the `classes = 1` answer and as
//! the seed for multi-class runs, where each class starts from a jittered
//! copy of it.

use crate::config::EmConfig;
use crate::error::EstimationError;
use crate::mle::{fit_single_class, occasion_log_likelihood, Coefficients};
use crate::observations::{group_occasions, Occasion, ObservationRow};
use ladder_core::math::logsumexp;
use ladder_core::types::error::ValidationError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback invoked after each EM iteration with the iteration number
/// (1-based) and the current mixture log-likelihood.
pub type ProgressCallback = Arc<dyn Fn(usize, f64) + Send + Sync>;

/// Fitted latent-class mixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResult {
    /// Class mixing weights; non-negative and summing to 1.
    pub weights: Vec<f64>,
    /// Fitted coefficient vector per class.
    pub classes: Vec<Coefficients>,
    /// Unpenalised mixture log-likelihood of the data.
    pub log_likelihood: f64,
    /// EM iterations completed (inner ascent iterations for a
    /// single-class fit).
    pub iterations: usize,
    /// False when the iteration cap was exhausted first.
    pub converged: bool,
}

impl FitResult {
    /// Number of latent classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Index of the heaviest class.
    pub fn dominant_class(&self) -> usize {
        self.weights
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Latent-class estimator wrapping an [`EmConfig`].
#[derive(Debug, Clone)]
pub struct Estimator {
    config: EmConfig,
}

impl Estimator {
    /// Creates an estimator with the given configuration.
    pub fn new(config: EmConfig) -> Self {
        Self { config }
    }

    /// Creates an estimator with default configuration (one class).
    pub fn with_defaults() -> Self {
        Self::new(EmConfig::default())
    }

    /// The configuration in use.
    pub fn config(&self) -> &EmConfig {
        &self.config
    }

    /// Groups rows into occasions and fits the configured mixture.
    pub fn fit(&self, rows: &[ObservationRow]) -> Result<FitResult, EstimationError> {
        self.fit_with_controls(rows, None, None)
    }

    /// Like [`Estimator::fit`], with optional progress reporting and
    /// cooperative cancellation.
    ///
    /// The cancel flag and the configured time budget are checked before
    /// the base fit and between EM iterations; a tripped check surfaces as
    /// [`EstimationError::Cancelled`] or [`EstimationError::TimedOut`].
    pub fn fit_with_controls(
        &self,
        rows: &[ObservationRow],
        progress: Option<ProgressCallback>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<FitResult, EstimationError> {
        self.config.validate()?;
        let occasions = group_occasions(rows)?;
        self.fit_occasions(&occasions, progress, cancel)
    }

    fn fit_occasions(
        &self,
        occasions: &[Occasion],
        progress: Option<ProgressCallback>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<FitResult, EstimationError> {
        let start = Instant::now();
        check_interrupts(start, self.config.time_budget, cancel.as_deref())?;

        let base = fit_single_class(occasions, None, Coefficients::zeros(), &self.config.mle)?;
        if self.config.classes == 1 {
            if let Some(progress) = &progress {
                progress(1, base.log_likelihood);
            }
            return Ok(FitResult {
                weights: vec![1.0],
                classes: vec![base.coefficients],
                log_likelihood: base.log_likelihood,
                iterations: base.iterations,
                converged: base.converged,
            });
        }

        let class_count = self.config.classes;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let noise = Normal::new(0.0, self.config.jitter)
            .map_err(|_| ValidationError::non_finite("em.jitter", self.config.jitter))?;

        let mut classes: Vec<Coefficients> = (0..class_count)
            .map(|_| {
                let mut values = base.coefficients.as_array();
                for value in values.iter_mut() {
                    *value += noise.sample(&mut rng);
                }
                Coefficients::from_array(values)
            })
            .collect();
        let mut weights = vec![1.0 / class_count as f64; class_count];
        let mut responsibilities = vec![vec![0.0; occasions.len()]; class_count];

        let mut log_likelihood = mixture_log_likelihood(occasions, &weights, &classes);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            check_interrupts(start, self.config.time_budget, cancel.as_deref())?;

            // E-step in log space; dead classes (weight 0) score -inf and
            // collect zero responsibility.
            let mut class_scores = vec![0.0; class_count];
            for (i, occasion) in occasions.iter().enumerate() {
                for (c, class) in classes.iter().enumerate() {
                    class_scores[c] = weights[c].ln() + occasion_log_likelihood(occasion, class);
                }
                let total = logsumexp(&class_scores);
                for c in 0..class_count {
                    responsibilities[c][i] = (class_scores[c] - total).exp();
                }
            }

            // M-step: weights from mean responsibility, then one warm-started
            // refit per class.
            for (c, class_responsibilities) in responsibilities.iter().enumerate() {
                weights[c] =
                    class_responsibilities.iter().sum::<f64>() / occasions.len() as f64;
            }
            for (c, class) in classes.iter_mut().enumerate() {
                let refit =
                    fit_single_class(occasions, Some(&responsibilities[c]), *class, &self.config.mle)?;
                *class = refit.coefficients;
            }

            let updated = mixture_log_likelihood(occasions, &weights, &classes);
            let delta = updated - log_likelihood;
            log_likelihood = updated;
            iterations += 1;
            tracing::debug!(iteration = iterations, log_likelihood, delta, "EM iteration");
            if let Some(progress) = &progress {
                progress(iterations, log_likelihood);
            }
            if delta.abs() < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                iterations,
                classes = class_count,
                "EM stopped at the iteration cap without converging"
            );
        }

        Ok(FitResult {
            weights,
            classes,
            log_likelihood,
            iterations,
            converged,
        })
    }
}

/// Mixture log-likelihood `Σ_i logsumexp_c(ln w_c + ll(o_i | c))`.
fn mixture_log_likelihood(
    occasions: &[Occasion],
    weights: &[f64],
    classes: &[Coefficients],
) -> f64 {
    let mut class_scores = vec![0.0; classes.len()];
    occasions
        .iter()
        .map(|occasion| {
            for (c, class) in classes.iter().enumerate() {
                class_scores[c] = weights[c].ln() + occasion_log_likelihood(occasion, class);
            }
            logsumexp(&class_scores)
        })
        .sum()
}

fn check_interrupts(
    start: Instant,
    budget: Option<Duration>,
    cancel: Option<&AtomicBool>,
) -> Result<(), EstimationError> {
    if let Some(cancel) = cancel {
        if cancel.load(Ordering::Relaxed) {
            return Err(EstimationError::Cancelled);
        }
    }
    if let Some(budget) = budget {
        let elapsed = start.elapsed();
        if elapsed >= budget {
            return Err(EstimationError::TimedOut { elapsed, budget });
        }
    }
    Ok(())
}
