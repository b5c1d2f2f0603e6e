//! Core record types for the tiered-pricing domain.
//!
//! This module provides:
//! - `tier`: Tier labels and the generic per-tier container `TierMap`
//! - `features`: Utility covariates attached to each tier
//! - `shares`: Predicted choice shares over {none, good, better, best}
//! - `leakages`: Discount/fee fractions consumed by the waterfall
//! - `constraints`: Business guardrails for the optimiser
//! - `ranges`: Per-tier search bounds and grid step
//! - `error`: Structured validation errors
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`Tier`], [`TierMap`], [`Ladder`], [`Costs`], [`RefPrices`] from `tier`
//! - [`TierFeatures`], [`Features`] from `features`
//! - [`ChoiceShares`] from `shares`
//! - [`Leakages`] from `leakages`
//! - [`Constraints`] from `constraints`
//! - [`PriceRange`], [`SearchRanges`] from `ranges`
//! - [`ValidationError`] from `error`

pub mod constraints;
pub mod error;
pub mod features;
pub mod leakages;
pub mod ranges;
pub mod shares;
pub mod tier;

// Re-export commonly used types at module level
pub use constraints::Constraints;
pub use error::ValidationError;
pub use features::{Features, TierFeatures};
pub use leakages::Leakages;
pub use ranges::{PriceRange, SearchRanges};
pub use shares::ChoiceShares;
pub use tier::{Costs, Ladder, RefPrices, Tier, TierMap};
