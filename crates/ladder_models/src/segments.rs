//! Behavioural segments and mixture-weight normalisation.

use ladder_core::types::error::{ensure_finite, ensure_non_negative, ValidationError};
use serde::{Deserialize, Serialize};

/// One behavioural class in the choice mixture.
///
/// A segment owns its utility coefficients and a mixture weight. Weights are
/// kept summing to 1 across a segment list via [`normalise_weights`];
/// anchoring is disabled until [`Segment::with_anchoring`] sets a positive
/// strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Optional display label (fitted classes are unnamed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Mixture share in `[0, 1]`; the list is normalised to sum to 1.
    pub weight: f64,
    /// Price sensitivity (negative under normal behaviour).
    pub beta_price: f64,
    /// Sensitivity to the first feature covariate.
    pub beta_feat_a: f64,
    /// Sensitivity to the second feature covariate.
    pub beta_feat_b: f64,
    /// Baseline utility of opting out.
    pub beta_none: f64,
    /// Anchoring strength (`0` disables anchoring).
    #[serde(default)]
    pub alpha_anchor: f64,
    /// Loss-aversion multiplier; applied as `max(lambda_loss, 1)`.
    #[serde(default = "default_lambda")]
    pub lambda_loss: f64,
}

fn default_lambda() -> f64 {
    1.0
}

impl Segment {
    /// Builds a segment with anchoring disabled.
    pub fn new(
        weight: f64,
        beta_price: f64,
        beta_feat_a: f64,
        beta_feat_b: f64,
        beta_none: f64,
    ) -> Self {
        Self {
            label: None,
            weight,
            beta_price,
            beta_feat_a,
            beta_feat_b,
            beta_none,
            alpha_anchor: 0.0,
            lambda_loss: 1.0,
        }
    }

    /// Enables reference-price anchoring.
    ///
    /// `alpha_anchor` scales the anchoring penalty; `lambda_loss` multiplies
    /// it when the price sits above the reference (loss aversion).
    pub fn with_anchoring(mut self, alpha_anchor: f64, lambda_loss: f64) -> Self {
        self.alpha_anchor = alpha_anchor;
        self.lambda_loss = lambda_loss;
        self
    }

    /// Attaches a display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Effective loss-aversion multiplier (floored at 1).
    pub fn loss_multiplier(&self) -> f64 {
        self.lambda_loss.max(1.0)
    }

    /// True when anchoring contributes to this segment's utilities.
    pub fn anchoring_enabled(&self) -> bool {
        self.alpha_anchor > 0.0
    }

    /// Validates coefficient finiteness and sign preconditions.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("segment.weight", self.weight)?;
        ensure_finite("segment.betaPrice", self.beta_price)?;
        ensure_finite("segment.betaFeatA", self.beta_feat_a)?;
        ensure_finite("segment.betaFeatB", self.beta_feat_b)?;
        ensure_finite("segment.betaNone", self.beta_none)?;
        ensure_non_negative("segment.alphaAnchor", self.alpha_anchor)?;
        ensure_finite("segment.lambdaLoss", self.lambda_loss)
    }
}

/// Normalises mixture weights in place.
///
/// Each weight is clamped into `[0, 1]`, then the list is rescaled to sum
/// to 1. An all-zero (or fully clamped-away) list falls back to uniform
/// weights so downstream mixing stays defined. Empty lists are left alone.
pub fn normalise_weights(segments: &mut [Segment]) {
    if segments.is_empty() {
        return;
    }
    for segment in segments.iter_mut() {
        segment.weight = segment.weight.clamp(0.0, 1.0);
    }
    let total: f64 = segments.iter().map(|s| s.weight).sum();
    if total > 0.0 {
        for segment in segments.iter_mut() {
            segment.weight /= total;
        }
    } else {
        let uniform = 1.0 / segments.len() as f64;
        for segment in segments.iter_mut() {
            segment.weight = uniform;
        }
    }
}
