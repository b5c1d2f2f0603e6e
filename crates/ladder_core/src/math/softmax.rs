//! Numerically stable softmax and log-sum-exp.
//!
//! Both the choice-share engine and the estimator's likelihood loop convert
//! utilities to probabilities; they share these kernels so the max-subtraction
//! stabilisation lives in exactly one place.
//!
//! All functions use generic type parameter `T: num_traits::Float` for
//! f32/f64 support.

use num_traits::Float;

/// Log of the sum of exponentials, stabilised by max-subtraction.
///
/// # Mathematical Definition
/// ```text
/// logsumexp(v) = m + log(Σ exp(v_i - m)),  m = max_i v_i
/// ```
///
/// # Arguments
/// * `values` - Log-scale terms; may be empty
///
/// # Returns
/// `-inf` for an empty slice, otherwise the stabilised log-sum.
pub fn logsumexp<T: Float>(values: &[T]) -> T {
    let max = values
        .iter()
        .cloned()
        .fold(T::neg_infinity(), |a, b| a.max(b));
    if !max.is_finite() {
        // Empty input or all terms at -inf: the sum is zero, its log -inf.
        return max;
    }
    let sum = values
        .iter()
        .fold(T::zero(), |acc, &v| acc + (v - max).exp());
    max + sum.ln()
}

/// Softmax with max-subtraction stabilisation.
///
/// # Mathematical Definition
/// ```text
/// softmax(u)_i = exp(u_i - m) / Σ_j exp(u_j - m),  m = max_j u_j
/// ```
///
/// Subtracting the maximum keeps every exponent at or below zero, so large
/// utilities cannot overflow. The denominator is at least 1 (the maximal
/// term contributes `exp(0)`), so no division guard is needed.
///
/// # Arguments
/// * `utilities` - Raw utilities; may be empty
///
/// # Returns
/// Probabilities summing to 1; an empty vector for empty input; a uniform
/// distribution if the maximum utility is not finite (fully masked input).
pub fn softmax_stable<T: Float>(utilities: &[T]) -> Vec<T> {
    if utilities.is_empty() {
        return Vec::new();
    }
    let max = utilities
        .iter()
        .cloned()
        .fold(T::neg_infinity(), |a, b| a.max(b));
    if !max.is_finite() {
        let uniform = T::one() / T::from(utilities.len()).unwrap();
        return vec![uniform; utilities.len()];
    }
    let weights: Vec<T> = utilities.iter().map(|&u| (u - max).exp()).collect();
    let total = weights.iter().fold(T::zero(), |acc, &w| acc + w);
    weights.into_iter().map(|w| w / total).collect()
}
