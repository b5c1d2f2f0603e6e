//! Utility covariates attached to each tier.

use crate::types::tier::TierMap;
use serde::{Deserialize, Serialize};

/// The two feature covariates entering a tier's utility.
///
/// Values are typically 0/1 indicators ("has capability X") but any finite
/// magnitude is accepted; the choice model multiplies them by the segment's
/// feature sensitivities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierFeatures {
    /// First feature covariate.
    pub feat_a: f64,
    /// Second feature covariate.
    pub feat_b: f64,
}

impl TierFeatures {
    /// Builds a feature bundle from the two covariates.
    pub fn new(feat_a: f64, feat_b: f64) -> Self {
        Self { feat_a, feat_b }
    }

    /// True when both covariates are finite.
    pub fn is_finite(&self) -> bool {
        self.feat_a.is_finite() && self.feat_b.is_finite()
    }
}

/// Feature bundle per tier.
pub type Features = TierMap<TierFeatures>;
