//! Scenario bundle: every input the downstream engines share.

use crate::choice::choice_shares;
use crate::segments::Segment;
use ladder_core::types::error::{ensure_non_negative, ensure_positive, ValidationError};
use ladder_core::types::{ChoiceShares, Costs, Features, Ladder, Leakages, RefPrices, Tier};
use ladder_core::waterfall::{pocket_price, PocketBreakdown};
use serde::{Deserialize, Serialize};

/// One coherent pricing scenario.
///
/// Groups the ladder, unit costs, feature covariates, segment mixture,
/// optional anchor prices, leakages, and addressable population so the
/// optimiser, frontier, tornado, and KPI functions all take a single input
/// and cannot drift out of step with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// List price per tier.
    pub ladder: Ladder,
    /// Unit cost per tier.
    pub costs: Costs,
    /// Feature covariates per tier.
    pub features: Features,
    /// Behavioural mixture.
    pub segments: Vec<Segment>,
    /// Anchor prices; `None` disables anchoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_prices: Option<RefPrices>,
    /// Leakage fractions between list and pocket price.
    #[serde(default)]
    pub leakages: Leakages,
    /// Addressable population used to scale shares into units.
    pub population: f64,
}

impl Scenario {
    /// Builds a scenario with default features, no anchoring, and no
    /// leakages; refine with the `with_*` builders.
    pub fn new(ladder: Ladder, costs: Costs, segments: Vec<Segment>, population: f64) -> Self {
        Self {
            ladder,
            costs,
            features: Features::default(),
            segments,
            ref_prices: None,
            leakages: Leakages::none(),
            population,
        }
    }

    /// Sets the feature covariates.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Enables anchoring against the given reference prices.
    pub fn with_ref_prices(mut self, ref_prices: RefPrices) -> Self {
        self.ref_prices = Some(ref_prices);
        self
    }

    /// Sets the leakage fractions.
    pub fn with_leakages(mut self, leakages: Leakages) -> Self {
        self.leakages = leakages;
        self
    }

    /// Predicted choice shares for the current ladder.
    pub fn shares(&self) -> ChoiceShares {
        choice_shares(
            &self.ladder,
            &self.features,
            &self.segments,
            self.ref_prices.as_ref(),
        )
    }

    /// Waterfall breakdown for one tier at its current list price.
    pub fn pocket(&self, tier: Tier) -> PocketBreakdown {
        pocket_price(*self.ladder.get(tier), tier, &self.leakages)
    }

    /// Validates the full bundle, naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (tier, price) in self.ladder.iter() {
            ensure_positive(&format!("ladder.{tier}"), *price)?;
        }
        for (tier, cost) in self.costs.iter() {
            ensure_non_negative(&format!("costs.{tier}"), *cost)?;
        }
        for (tier, f) in self.features.iter() {
            if !f.is_finite() {
                return Err(ValidationError::non_finite(
                    format!("features.{tier}"),
                    f64::NAN,
                ));
            }
        }
        if self.segments.is_empty() {
            return Err(ValidationError::EmptySegments);
        }
        for segment in &self.segments {
            segment.validate()?;
        }
        if let Some(refs) = &self.ref_prices {
            for (tier, price) in refs.iter() {
                ensure_positive(&format!("refPrices.{tier}"), *price)?;
            }
        }
        self.leakages.validate()?;
        ensure_positive("population", self.population)
    }
}
