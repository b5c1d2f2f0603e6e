//! Business guardrails applied to candidate ladders.

use crate::types::error::{ensure_fraction, ensure_non_negative, ValidationError};
use crate::types::tier::{Tier, TierMap};
use serde::{Deserialize, Serialize};

/// Guardrails a candidate ladder must satisfy, plus basis selection.
///
/// The default is fully permissive (zero gaps and floors, no share caps,
/// charm snapping off) with pocket-basis margins and profit; callers tighten
/// individual guardrails through the `with_*` builders so defaulting happens
/// once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Minimum dollar gap required: `better >= good + gap_gb`.
    #[serde(rename = "gapGB")]
    pub gap_gb: f64,
    /// Minimum dollar gap required: `best >= better + gap_bb`.
    #[serde(rename = "gapBB")]
    pub gap_bb: f64,
    /// Minimum margin fraction per tier, on the selected basis.
    pub margin_floor: TierMap<f64>,
    /// Snap candidate prices to `.99` endings before evaluation.
    pub charm: bool,
    /// Compute margins against pocket price instead of list price.
    pub use_pocket_margins: bool,
    /// Compute profit against pocket price instead of list price.
    pub use_pocket_profit: bool,
    /// Maximum acceptable predicted opt-out share.
    pub max_none_share: f64,
    /// Minimum acceptable combined paid-tier share.
    pub min_take_rate: f64,
}

impl Constraints {
    /// Sets both adjacent-tier gap minima.
    pub fn with_gaps(mut self, gap_gb: f64, gap_bb: f64) -> Self {
        self.gap_gb = gap_gb;
        self.gap_bb = gap_bb;
        self
    }

    /// Sets the same margin floor for every tier.
    pub fn with_margin_floor(mut self, floor: f64) -> Self {
        self.margin_floor = TierMap::splat(floor);
        self
    }

    /// Sets the margin floor for one tier.
    pub fn with_tier_margin_floor(mut self, tier: Tier, floor: f64) -> Self {
        self.margin_floor.set(tier, floor);
        self
    }

    /// Enables or disables charm (`.99`) snapping.
    pub fn with_charm(mut self, charm: bool) -> Self {
        self.charm = charm;
        self
    }

    /// Selects pocket or list basis for margins and profit.
    pub fn with_pocket_basis(mut self, margins: bool, profit: bool) -> Self {
        self.use_pocket_margins = margins;
        self.use_pocket_profit = profit;
        self
    }

    /// Caps the predicted opt-out share.
    pub fn with_max_none_share(mut self, cap: f64) -> Self {
        self.max_none_share = cap;
        self
    }

    /// Floors the combined paid-tier share.
    pub fn with_min_take_rate(mut self, floor: f64) -> Self {
        self.min_take_rate = floor;
        self
    }

    /// Validates gap, floor, and share bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("constraints.gapGB", self.gap_gb)?;
        ensure_non_negative("constraints.gapBB", self.gap_bb)?;
        for (tier, floor) in self.margin_floor.iter() {
            ensure_fraction(&format!("constraints.marginFloor.{tier}"), *floor)?;
        }
        ensure_fraction("constraints.maxNoneShare", self.max_none_share)?;
        ensure_fraction("constraints.minTakeRate", self.min_take_rate)
    }

    /// True when the three prices satisfy both adjacent-tier gaps.
    pub fn gaps_ok(&self, good: f64, better: f64, best: f64) -> bool {
        better >= good + self.gap_gb && best >= better + self.gap_bb
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            gap_gb: 0.0,
            gap_bb: 0.0,
            margin_floor: TierMap::splat(0.0),
            charm: false,
            use_pocket_margins: true,
            use_pocket_profit: true,
            max_none_share: 1.0,
            min_take_rate: 0.0,
        }
    }
}
