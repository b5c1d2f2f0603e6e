//! Per-tier search bounds and grid step for the price optimiser.

use crate::types::error::ValidationError;
use crate::types::tier::{Tier, TierMap};
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` price bounds for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl PriceRange {
    /// Builds a range without validation; see [`SearchRanges::validate`].
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the range (`max - min`).
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Clamps `price` into the range.
    pub fn clamp(&self, price: f64) -> f64 {
        price.clamp(self.min, self.max)
    }

    /// True when `price` lies within the range (inclusive).
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    /// Number of grid points when stepping through at `step`.
    ///
    /// Counts both endpoints; a degenerate range yields one point. Used to
    /// estimate the combination count before coarsening.
    pub fn grid_points(&self, step: f64) -> u64 {
        if step <= 0.0 || self.span() < 0.0 {
            return 0;
        }
        ((self.span() / step).floor() as u64).saturating_add(1)
    }
}

/// Per-tier search bounds plus the grid step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRanges {
    /// Bounds per tier.
    pub ranges: TierMap<PriceRange>,
    /// Requested grid step (the optimiser may coarsen it).
    pub step: f64,
}

impl SearchRanges {
    /// Builds search ranges from per-tier bounds and a step.
    pub fn new(ranges: TierMap<PriceRange>, step: f64) -> Self {
        Self { ranges, step }
    }

    /// Convenience constructor with identical bounds for every tier.
    pub fn uniform(min: f64, max: f64, step: f64) -> Self {
        Self {
            ranges: TierMap::splat(PriceRange::new(min, max)),
            step,
        }
    }

    /// Bounds for one tier.
    pub fn tier(&self, tier: Tier) -> &PriceRange {
        self.ranges.get(tier)
    }

    /// Upper bound on grid combinations at `step`, ignoring gap pruning.
    ///
    /// Saturates instead of overflowing so absurd range/step pairs still
    /// compare cleanly against a coarsening ceiling.
    pub fn combinations(&self, step: f64) -> u64 {
        Tier::ALL
            .iter()
            .map(|&t| self.tier(t).grid_points(step))
            .fold(1u64, |acc, n| acc.saturating_mul(n))
    }

    /// Validates bounds and step.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (tier, range) in self.ranges.iter() {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(ValidationError::invalid_range(tier, range.min, range.max));
            }
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ValidationError::InvalidStep { step: self.step });
        }
        Ok(())
    }
}
