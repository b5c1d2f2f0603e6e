//! Numeric guards and shared math kernels.
//!
//! This module provides:
//! - `charm`: Snapping prices to `.99` endings
//! - `softmax`: Numerically stable softmax and log-sum-exp
//! - Division guards and 2-decimal rounding used across the stack
//!
//! All divisions in the stack (margin ratios, share renormalisation) go
//! through [`safe_div`] so a vanishing denominator saturates instead of
//! producing infinities.

pub mod charm;
pub mod softmax;

pub use charm::snap_to_charm;
pub use softmax::{logsumexp, softmax_stable};

/// Floor applied to denominators before division.
pub const EPSILON: f64 = 1e-6;

/// Rounds to 2 decimal places (currency cents).
///
/// Waterfall deductions are rounded with this before being subtracted, so
/// cumulative rounding error stays bounded and deterministic.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Divides with the denominator floored at [`EPSILON`].
///
/// Never returns an error or an infinity for finite inputs; a zero or
/// negative denominator saturates the ratio instead.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(EPSILON)
}
