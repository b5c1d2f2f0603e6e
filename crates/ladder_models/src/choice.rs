//! Mixed multinomial-logit choice shares with reference-price anchoring.
//!
//! For each segment the four alternatives {none, good, better, best} receive
//! utilities, converted to probabilities by the stable softmax; segment
//! probability vectors are then mixed by weight and renormalised. The
//! estimator reimplements the same utility formulation on raw observation
//! rows for gradient efficiency; keep the two in step.

use crate::segments::Segment;
use ladder_core::math::softmax_stable;
use ladder_core::types::{ChoiceShares, Features, Ladder, RefPrices, Tier};

/// Computes choice shares for a ladder under a segment mixture.
///
/// Per segment: `U_none = beta_none` and
/// `U_tier = beta_price * price + beta_feat_a * featA + beta_feat_b * featB`,
/// minus the anchoring penalty when enabled (see [`anchoring_penalty`]).
/// Utilities convert to probabilities via max-subtracted softmax; segment
/// vectors are weight-averaged and the result renormalised against drift.
///
/// # Arguments
/// * `ladder` - List price per tier
/// * `features` - Feature covariates per tier
/// * `segments` - Behavioural mixture; weights are clamped at zero here
/// * `ref_prices` - Optional anchor prices; `None` disables anchoring
///
/// # Returns
/// Shares over the four alternatives summing to 1. If total segment weight
/// is non-positive the degenerate [`ChoiceShares::OPT_OUT`] is returned
/// rather than dividing by zero.
pub fn choice_shares(
    ladder: &Ladder,
    features: &Features,
    segments: &[Segment],
    ref_prices: Option<&RefPrices>,
) -> ChoiceShares {
    let total_weight: f64 = segments.iter().map(|s| s.weight.max(0.0)).sum();
    if total_weight <= 0.0 {
        return ChoiceShares::OPT_OUT;
    }

    let mut mixed = [0.0f64; 4];
    for segment in segments {
        let weight = segment.weight.max(0.0);
        if weight == 0.0 {
            continue;
        }
        let utilities = segment_utilities(segment, ladder, features, ref_prices);
        let shares = softmax_stable(&utilities);
        for (acc, share) in mixed.iter_mut().zip(shares.iter()) {
            *acc += weight * share;
        }
    }
    for mass in mixed.iter_mut() {
        *mass /= total_weight;
    }

    ChoiceShares::new(mixed[0], mixed[1], mixed[2], mixed[3]).renormalised()
}

/// Raw utilities for one segment, ordered `[none, good, better, best]`.
pub fn segment_utilities(
    segment: &Segment,
    ladder: &Ladder,
    features: &Features,
    ref_prices: Option<&RefPrices>,
) -> [f64; 4] {
    let mut utilities = [segment.beta_none, 0.0, 0.0, 0.0];
    for tier in Tier::ALL {
        let price = *ladder.get(tier);
        let tier_features = features.get(tier);
        let mut utility = segment.beta_price * price
            + segment.beta_feat_a * tier_features.feat_a
            + segment.beta_feat_b * tier_features.feat_b;
        if let Some(refs) = ref_prices {
            utility -= anchoring_penalty(segment, price, *refs.get(tier));
        }
        utilities[tier.index() + 1] = utility;
    }
    utilities
}

/// Anchoring penalty for one tier.
///
/// With `delta = price - ref_price` and `lambda = max(lambda_loss, 1)` the
/// penalty is `alpha_anchor * (lambda * delta)` above the reference and
/// `alpha_anchor * delta` below it: increases hurt `lambda` times harder
/// than decreases help (loss aversion). Zero when anchoring is disabled.
pub fn anchoring_penalty(segment: &Segment, price: f64, ref_price: f64) -> f64 {
    if !segment.anchoring_enabled() {
        return 0.0;
    }
    let delta = price - ref_price;
    let adjusted = if delta >= 0.0 {
        segment.loss_multiplier() * delta
    } else {
        delta
    };
    segment.alpha_anchor * adjusted
}
