//! Single-class multinomial-logit fit.
//!
//! Maximum-likelihood estimation over choice occasions via gradient ascent
//! with a backtracking line search. The objective is the weighted
//! log-likelihood minus an L2 ridge term, which keeps coefficients bounded
//! even on separable data.
//!
//! Utilities are linear in six coefficients: one intercept per paid tier
//! (the opt-out alternative is the zero-utility baseline) plus shared price
//! and feature slopes. Alternatives not shown in an occasion enter the
//! softmax at `-inf`, so they receive probability zero without special
//! casing.

use crate::config::MleConfig;
use crate::error::EstimationError;
use crate::observations::Occasion;
use ladder_core::math::{logsumexp, softmax_stable};
use serde::{Deserialize, Serialize};

/// Number of free coefficients in the single-class model.
const COEF_COUNT: usize = 6;

/// Coefficient vector of the single-class multinomial logit.
///
/// The opt-out alternative is the baseline with utility fixed at zero;
/// each paid tier gets its own intercept while price and feature slopes
/// are shared across tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coefficients {
    /// Intercept of the good tier.
    pub intercept_good: f64,
    /// Intercept of the better tier.
    pub intercept_better: f64,
    /// Intercept of the best tier.
    pub intercept_best: f64,
    /// Shared price slope (typically negative).
    pub beta_price: f64,
    /// Shared slope on the first feature column.
    pub beta_feat_a: f64,
    /// Shared slope on the second feature column.
    pub beta_feat_b: f64,
}

impl Coefficients {
    /// All-zero starting point.
    pub fn zeros() -> Self {
        Self::from_array([0.0; COEF_COUNT])
    }

    /// Packs the coefficients into a fixed-order array.
    ///
    /// Order: intercepts (good, better, best), then price, feature A and
    /// feature B slopes. [`Coefficients::from_array`] is the inverse.
    pub fn as_array(&self) -> [f64; COEF_COUNT] {
        [
            self.intercept_good,
            self.intercept_better,
            self.intercept_best,
            self.beta_price,
            self.beta_feat_a,
            self.beta_feat_b,
        ]
    }

    /// Unpacks a fixed-order array produced by [`Coefficients::as_array`].
    pub fn from_array(values: [f64; COEF_COUNT]) -> Self {
        Self {
            intercept_good: values[0],
            intercept_better: values[1],
            intercept_best: values[2],
            beta_price: values[3],
            beta_feat_a: values[4],
            beta_feat_b: values[5],
        }
    }

    /// True when every coefficient is finite.
    pub fn all_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }

    /// Sum of squared coefficients, the ridge penalty base.
    pub fn squared_norm(&self) -> f64 {
        self.as_array().iter().map(|v| v * v).sum()
    }

    /// Utility of every alternative slot for one occasion.
    ///
    /// Alternatives that were not shown get `-inf`, which the softmax maps
    /// to probability zero.
    pub fn utilities(&self, occasion: &Occasion) -> [f64; 4] {
        let mut utilities = [f64::NEG_INFINITY; 4];
        for slot in 0..4 {
            if occasion.shown[slot] {
                utilities[slot] = dot(&self.as_array(), &feature_vector(occasion, slot));
            }
        }
        utilities
    }

    fn stepped(&self, gradient: &[f64; COEF_COUNT], step: f64) -> Self {
        let mut values = self.as_array();
        for (value, g) in values.iter_mut().zip(gradient.iter()) {
            *value += step * g;
        }
        Self::from_array(values)
    }
}

/// Outcome of a single-class fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleClassFit {
    /// Fitted coefficient vector.
    pub coefficients: Coefficients,
    /// Unpenalised weighted log-likelihood at the fitted coefficients.
    pub log_likelihood: f64,
    /// Accepted ascent steps.
    pub iterations: usize,
    /// Whether the fit stopped at a numerical optimum rather than the
    /// iteration cap.
    pub converged: bool,
    /// Euclidean norm of the penalised gradient at the last check.
    pub grad_norm: f64,
}

/// Design row of one alternative slot.
///
/// Slot 0 (opt-out) is all zeros; paid slots carry a one-hot intercept
/// followed by price and the two feature columns.
fn feature_vector(occasion: &Occasion, slot: usize) -> [f64; COEF_COUNT] {
    let mut x = [0.0; COEF_COUNT];
    if slot == 0 {
        return x;
    }
    x[slot - 1] = 1.0;
    x[3] = occasion.prices[slot];
    x[4] = occasion.feat_a[slot];
    x[5] = occasion.feat_b[slot];
    x
}

fn dot(a: &[f64; COEF_COUNT], b: &[f64; COEF_COUNT]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Log-likelihood of one occasion under a coefficient vector.
///
/// # Mathematical Definition
/// ```text
/// ll(o) = u_chosen - logsumexp(u_shown)
/// ```
///
/// Always finite for a valid occasion because the chosen alternative is
/// guaranteed to be shown.
pub fn occasion_log_likelihood(occasion: &Occasion, coefficients: &Coefficients) -> f64 {
    let utilities = coefficients.utilities(occasion);
    utilities[occasion.chosen] - logsumexp(&utilities)
}

/// Weighted sum of per-occasion log-likelihoods.
///
/// `weights` defaults to 1 per occasion when absent; the EM loop passes
/// class responsibilities here.
pub fn weighted_log_likelihood(
    occasions: &[Occasion],
    weights: Option<&[f64]>,
    coefficients: &Coefficients,
) -> f64 {
    occasions
        .iter()
        .enumerate()
        .map(|(i, occasion)| {
            let weight = weights.map_or(1.0, |w| w[i]);
            weight * occasion_log_likelihood(occasion, coefficients)
        })
        .sum()
}

fn penalised_objective(
    occasions: &[Occasion],
    weights: Option<&[f64]>,
    coefficients: &Coefficients,
    ridge: f64,
) -> f64 {
    weighted_log_likelihood(occasions, weights, coefficients) - ridge * coefficients.squared_norm()
}

/// Gradient of the penalised objective: observed-minus-expected design
/// rows, weighted per occasion, minus the ridge pull `2·ridge·b`.
fn penalised_gradient(
    occasions: &[Occasion],
    weights: Option<&[f64]>,
    coefficients: &Coefficients,
    ridge: f64,
) -> [f64; COEF_COUNT] {
    let mut gradient = [0.0; COEF_COUNT];
    for (i, occasion) in occasions.iter().enumerate() {
        let weight = weights.map_or(1.0, |w| w[i]);
        if weight <= 0.0 {
            continue;
        }
        let probabilities = softmax_stable(&coefficients.utilities(occasion));
        let observed = feature_vector(occasion, occasion.chosen);
        for (j, g) in gradient.iter_mut().enumerate() {
            *g += weight * observed[j];
        }
        for (slot, &p) in probabilities.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            let expected = feature_vector(occasion, slot);
            for (j, g) in gradient.iter_mut().enumerate() {
                *g -= weight * p * expected[j];
            }
        }
    }
    let values = coefficients.as_array();
    for (j, g) in gradient.iter_mut().enumerate() {
        *g -= 2.0 * ridge * values[j];
    }
    gradient
}

fn norm(gradient: &[f64; COEF_COUNT]) -> f64 {
    gradient.iter().map(|g| g * g).sum::<f64>().sqrt()
}

/// Fits one multinomial-logit class by penalised gradient ascent.
///
/// Each iteration tries the configured initial step along the gradient and
/// halves it until the penalised objective improves; when no improving step
/// exists within the halving budget, the current point is a numerical
/// optimum and the fit stops with `converged: true`. Exhausting the
/// iteration cap instead reports `converged: false`, returning the best
/// point reached so far.
///
/// # Arguments
/// * `occasions` - Grouped choice occasions, at least one
/// * `weights` - Optional per-occasion weights (EM responsibilities)
/// * `init` - Starting coefficients; warm-starting matters inside EM
/// * `config` - Step, tolerance and ridge settings
pub fn fit_single_class(
    occasions: &[Occasion],
    weights: Option<&[f64]>,
    init: Coefficients,
    config: &MleConfig,
) -> Result<SingleClassFit, EstimationError> {
    config.validate()?;
    if occasions.is_empty() {
        return Err(EstimationError::NoChoices);
    }
    debug_assert!(weights.map_or(true, |w| w.len() == occasions.len()));

    let mut coefficients = init;
    let mut objective = penalised_objective(occasions, weights, &coefficients, config.ridge);
    let mut iterations = 0;
    let mut converged = false;
    let mut grad_norm = f64::INFINITY;

    while iterations < config.max_iterations {
        let gradient = penalised_gradient(occasions, weights, &coefficients, config.ridge);
        grad_norm = norm(&gradient);
        if grad_norm < config.tolerance {
            converged = true;
            break;
        }

        let mut step = config.initial_step;
        let mut accepted = false;
        for _ in 0..=config.max_halvings {
            let candidate = coefficients.stepped(&gradient, step);
            let candidate_objective =
                penalised_objective(occasions, weights, &candidate, config.ridge);
            if candidate_objective > objective {
                coefficients = candidate;
                objective = candidate_objective;
                accepted = true;
                break;
            }
            step *= 0.5;
        }
        if !accepted {
            // No improving step at machine precision: treat as converged.
            converged = true;
            break;
        }
        iterations += 1;
    }

    let log_likelihood = weighted_log_likelihood(occasions, weights, &coefficients);
    tracing::debug!(
        iterations,
        converged,
        grad_norm,
        log_likelihood,
        "single-class fit finished"
    );

    Ok(SingleClassFit {
        coefficients,
        log_likelihood,
        iterations,
        converged,
        grad_norm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::{group_occasions, ObservationRow};
    use approx::assert_relative_eq;
    use ladder_core::types::Tier;
    use proptest::prelude::*;

    /// Occasions where cheap good tiers win and expensive ladders push
    /// respondents to opt out. Enough mixing to keep the data
    /// non-separable.
    fn price_sensitive_rows() -> Vec<ObservationRow> {
        let mut rows = Vec::new();
        let mut obs_id = 0;
        for round in 0..30 {
            let base = 8.0 + (round % 5) as f64 * 4.0;
            let chosen = if base < 16.0 {
                Alt::Good
            } else if round % 3 == 0 {
                Alt::Better
            } else {
                Alt::None
            };
            rows.extend(occasion_rows(obs_id, base, chosen));
            obs_id += 1;
        }
        rows
    }

    enum Alt {
        None,
        Good,
        Better,
    }

    fn occasion_rows(obs_id: u64, base: f64, chosen: Alt) -> Vec<ObservationRow> {
        let none = ObservationRow::opt_out(obs_id);
        let good = ObservationRow::tier(obs_id, Tier::Good, base).with_features(0.2, 0.1);
        let better =
            ObservationRow::tier(obs_id, Tier::Better, base * 2.0).with_features(0.6, 0.4);
        let best = ObservationRow::tier(obs_id, Tier::Best, base * 4.0).with_features(1.0, 0.9);
        let mut rows = vec![none, good, better, best];
        let idx = match chosen {
            Alt::None => 0,
            Alt::Good => 1,
            Alt::Better => 2,
        };
        rows[idx] = rows[idx].clone().chosen();
        rows
    }

    // ====== Coefficients ======

    #[test]
    fn array_round_trip_preserves_order() {
        let coefficients = Coefficients {
            intercept_good: 0.1,
            intercept_better: 0.2,
            intercept_best: 0.3,
            beta_price: -0.08,
            beta_feat_a: 0.5,
            beta_feat_b: 0.4,
        };
        assert_eq!(
            Coefficients::from_array(coefficients.as_array()),
            coefficients
        );
        assert_eq!(coefficients.as_array()[3], -0.08);
    }

    #[test]
    fn zeros_have_zero_norm() {
        assert_eq!(Coefficients::zeros().squared_norm(), 0.0);
        assert!(Coefficients::zeros().all_finite());
    }

    #[test]
    fn opt_out_utility_is_always_zero() {
        let rows = occasion_rows(1, 20.0, Alt::Good);
        let occasions = group_occasions(&rows).unwrap();
        let coefficients = Coefficients {
            intercept_good: 5.0,
            intercept_better: 5.0,
            intercept_best: 5.0,
            beta_price: -1.0,
            beta_feat_a: 2.0,
            beta_feat_b: 2.0,
        };
        let utilities = coefficients.utilities(&occasions[0]);
        assert_eq!(utilities[0], 0.0);
    }

    #[test]
    fn hidden_alternatives_get_zero_probability() {
        let mut rows = occasion_rows(1, 20.0, Alt::Good);
        rows[3] = rows[3].clone().not_shown();
        let occasions = group_occasions(&rows).unwrap();
        let probabilities = softmax_stable(&Coefficients::zeros().utilities(&occasions[0]));
        assert_eq!(probabilities[3], 0.0);
        let total: f64 = probabilities.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    // ====== likelihood ======

    #[test]
    fn zero_coefficients_give_uniform_log_likelihood() {
        let rows = occasion_rows(1, 20.0, Alt::Good);
        let occasions = group_occasions(&rows).unwrap();
        let ll = occasion_log_likelihood(&occasions[0], &Coefficients::zeros());
        assert_relative_eq!(ll, (1.0f64 / 4.0).ln(), epsilon = 1e-12);
    }

    #[test]
    fn weights_scale_the_likelihood() {
        let rows = price_sensitive_rows();
        let occasions = group_occasions(&rows).unwrap();
        let coefficients = Coefficients::zeros();
        let unweighted = weighted_log_likelihood(&occasions, None, &coefficients);
        let halves = vec![0.5; occasions.len()];
        let weighted = weighted_log_likelihood(&occasions, Some(&halves), &coefficients);
        assert_relative_eq!(weighted, unweighted * 0.5, epsilon = 1e-9);
    }

    // ====== fit_single_class ======

    #[test]
    fn empty_occasions_are_rejected() {
        let result = fit_single_class(&[], None, Coefficients::zeros(), &MleConfig::default());
        assert!(matches!(result, Err(EstimationError::NoChoices)));
    }

    #[test]
    fn fit_improves_on_the_starting_point() {
        let rows = price_sensitive_rows();
        let occasions = group_occasions(&rows).unwrap();
        let start_ll = weighted_log_likelihood(&occasions, None, &Coefficients::zeros());
        let fit =
            fit_single_class(&occasions, None, Coefficients::zeros(), &MleConfig::default())
                .unwrap();
        assert!(fit.log_likelihood > start_ll);
        assert!(fit.coefficients.all_finite());
        assert!(fit.iterations > 0);
    }

    #[test]
    fn fit_recovers_price_aversion() {
        let rows = price_sensitive_rows();
        let occasions = group_occasions(&rows).unwrap();
        let fit =
            fit_single_class(&occasions, None, Coefficients::zeros(), &MleConfig::default())
                .unwrap();
        // Cheaper ladders were chosen far more often.
        assert!(fit.coefficients.beta_price < 0.0);
    }

    #[test]
    fn heavy_ridge_shrinks_coefficients() {
        let rows = price_sensitive_rows();
        let occasions = group_occasions(&rows).unwrap();
        let light = fit_single_class(
            &occasions,
            None,
            Coefficients::zeros(),
            &MleConfig::default().with_ridge(1e-6),
        )
        .unwrap();
        let heavy = fit_single_class(
            &occasions,
            None,
            Coefficients::zeros(),
            &MleConfig::default().with_ridge(10.0),
        )
        .unwrap();
        assert!(heavy.coefficients.squared_norm() < light.coefficients.squared_norm());
    }

    #[test]
    fn loose_tolerance_converges_immediately() {
        let rows = price_sensitive_rows();
        let occasions = group_occasions(&rows).unwrap();
        let fit = fit_single_class(
            &occasions,
            None,
            Coefficients::zeros(),
            &MleConfig::default().with_tolerance(1e9),
        )
        .unwrap();
        assert!(fit.converged);
        assert_eq!(fit.iterations, 0);
    }

    #[test]
    fn iteration_cap_reports_not_converged() {
        let rows = price_sensitive_rows();
        let occasions = group_occasions(&rows).unwrap();
        let fit = fit_single_class(
            &occasions,
            None,
            Coefficients::zeros(),
            &MleConfig::default()
                .with_max_iterations(1)
                .with_tolerance(1e-12),
        )
        .unwrap();
        assert!(!fit.converged);
        assert_eq!(fit.iterations, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn occasion_log_likelihood_is_finite_and_non_positive(
            base in 1.0f64..60.0,
            beta_price in -0.5f64..0.0,
            beta_feat_a in -1.0f64..1.0,
            intercept_good in -2.0f64..2.0,
        ) {
            let rows = occasion_rows(1, base, Alt::Good);
            let occasions = group_occasions(&rows).unwrap();
            let coefficients = Coefficients {
                intercept_good,
                intercept_better: 0.3,
                intercept_best: -0.2,
                beta_price,
                beta_feat_a,
                beta_feat_b: 0.1,
            };
            let ll = occasion_log_likelihood(&occasions[0], &coefficients);
            prop_assert!(ll.is_finite());
            prop_assert!(ll <= 0.0);
        }
    }
}
