//! Observation rows and occasion grouping.
//!
//! The estimator consumes one row per (choice occasion, alternative) pair.
//! Grouping validates the full contract up front — exactly four rows per
//! occasion (the opt-out plus each tier once), exactly one chosen row, and
//! the chosen row shown — so the fitting loops can assume well-formed
//! occasions and stay branch-light.

use crate::error::EstimationError;
use ladder_core::types::error::{ensure_finite, ensure_non_negative};
use ladder_core::types::Tier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One of the four alternatives a customer can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alternative {
    /// Opt out: buy nothing.
    None,
    /// The `good` tier.
    Good,
    /// The `better` tier.
    Better,
    /// The `best` tier.
    Best,
}

impl Alternative {
    /// All alternatives in slot order (`none` first, then the ladder).
    pub const ALL: [Alternative; 4] = [
        Alternative::None,
        Alternative::Good,
        Alternative::Better,
        Alternative::Best,
    ];

    /// Stable slot index (`none = 0`, tiers follow ladder order).
    pub fn index(&self) -> usize {
        match self {
            Alternative::None => 0,
            Alternative::Good => 1,
            Alternative::Better => 2,
            Alternative::Best => 3,
        }
    }

    /// The paid tier this alternative refers to, if any.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Alternative::None => None,
            Alternative::Good => Some(Tier::Good),
            Alternative::Better => Some(Tier::Better),
            Alternative::Best => Some(Tier::Best),
        }
    }

    /// Wraps a paid tier.
    pub fn from_tier(tier: Tier) -> Self {
        match tier {
            Tier::Good => Alternative::Good,
            Tier::Better => Alternative::Better,
            Tier::Best => Alternative::Best,
        }
    }

    /// Human-readable label, matching the serialised form.
    pub fn label(&self) -> &'static str {
        match self {
            Alternative::None => "none",
            Alternative::Good => "good",
            Alternative::Better => "better",
            Alternative::Best => "best",
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One (occasion, alternative) record from the transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRow {
    /// Choice-occasion identifier; the four rows of one occasion share it.
    pub obs_id: u64,
    /// Which alternative this row describes.
    pub alternative: Alternative,
    /// Price faced for this alternative (ignored for `none`).
    pub price: f64,
    /// First feature covariate.
    pub feat_a: f64,
    /// Second feature covariate.
    pub feat_b: f64,
    /// Whether this alternative was offered on the occasion.
    pub shown: bool,
    /// Whether this alternative was the one picked.
    pub chosen: bool,
}

impl ObservationRow {
    /// The opt-out row for an occasion (shown, not chosen).
    pub fn opt_out(obs_id: u64) -> Self {
        Self {
            obs_id,
            alternative: Alternative::None,
            price: 0.0,
            feat_a: 0.0,
            feat_b: 0.0,
            shown: true,
            chosen: false,
        }
    }

    /// A paid-tier row (shown, not chosen, zero features).
    pub fn tier(obs_id: u64, tier: Tier, price: f64) -> Self {
        Self {
            obs_id,
            alternative: Alternative::from_tier(tier),
            price,
            feat_a: 0.0,
            feat_b: 0.0,
            shown: true,
            chosen: false,
        }
    }

    /// Sets the feature covariates.
    pub fn with_features(mut self, feat_a: f64, feat_b: f64) -> Self {
        self.feat_a = feat_a;
        self.feat_b = feat_b;
        self
    }

    /// Marks this row as the picked alternative.
    pub fn chosen(mut self) -> Self {
        self.chosen = true;
        self
    }

    /// Marks this alternative as not offered on the occasion.
    pub fn not_shown(mut self) -> Self {
        self.shown = false;
        self
    }
}

/// One validated choice occasion in slot layout.
///
/// Slot order is `[none, good, better, best]`; the opt-out slot carries zero
/// price and features. Masked (`shown = false`) slots are excluded from the
/// likelihood denominator by the fitting loops.
#[derive(Debug, Clone, PartialEq)]
pub struct Occasion {
    /// Occasion identifier carried through for diagnostics.
    pub obs_id: u64,
    /// Offer mask per slot.
    pub shown: [bool; 4],
    /// Price per slot.
    pub prices: [f64; 4],
    /// First feature covariate per slot.
    pub feat_a: [f64; 4],
    /// Second feature covariate per slot.
    pub feat_b: [f64; 4],
    /// Slot index of the picked alternative (always shown).
    pub chosen: usize,
}

/// Groups raw rows into validated occasions.
///
/// Occasions come back in first-appearance order of their `obs_id`. The
/// grouping contract is enforced strictly; the first violation is returned
/// as [`EstimationError::MalformedOccasion`] naming the occasion and the
/// reason. An empty row set is [`EstimationError::NoChoices`].
pub fn group_occasions(rows: &[ObservationRow]) -> Result<Vec<Occasion>, EstimationError> {
    if rows.is_empty() {
        return Err(EstimationError::NoChoices);
    }

    struct Partial {
        obs_id: u64,
        filled: [bool; 4],
        shown: [bool; 4],
        prices: [f64; 4],
        feat_a: [f64; 4],
        feat_b: [f64; 4],
        chosen: Option<usize>,
    }

    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut partials: Vec<Partial> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        ensure_non_negative(&format!("rows[{i}].price"), row.price)?;
        ensure_finite(&format!("rows[{i}].featA"), row.feat_a)?;
        ensure_finite(&format!("rows[{i}].featB"), row.feat_b)?;

        let slot_index = *index.entry(row.obs_id).or_insert_with(|| {
            partials.push(Partial {
                obs_id: row.obs_id,
                filled: [false; 4],
                shown: [false; 4],
                prices: [0.0; 4],
                feat_a: [0.0; 4],
                feat_b: [0.0; 4],
                chosen: None,
            });
            partials.len() - 1
        });
        let partial = &mut partials[slot_index];

        let slot = row.alternative.index();
        if partial.filled[slot] {
            return Err(EstimationError::malformed(
                row.obs_id,
                format!("duplicate row for alternative `{}`", row.alternative),
            ));
        }
        partial.filled[slot] = true;
        partial.shown[slot] = row.shown;
        partial.prices[slot] = row.price;
        partial.feat_a[slot] = row.feat_a;
        partial.feat_b[slot] = row.feat_b;

        if row.chosen {
            if partial.chosen.is_some() {
                return Err(EstimationError::malformed(
                    row.obs_id,
                    "multiple chosen alternatives",
                ));
            }
            if !row.shown {
                return Err(EstimationError::malformed(
                    row.obs_id,
                    format!("chosen alternative `{}` was not shown", row.alternative),
                ));
            }
            partial.chosen = Some(slot);
        }
    }

    let mut occasions = Vec::with_capacity(partials.len());
    for partial in partials {
        let filled = partial.filled.iter().filter(|&&f| f).count();
        if filled != 4 {
            return Err(EstimationError::malformed(
                partial.obs_id,
                format!("expected 4 rows (none + 3 tiers), found {filled}"),
            ));
        }
        let chosen = partial.chosen.ok_or_else(|| {
            EstimationError::malformed(partial.obs_id, "no chosen alternative")
        })?;
        occasions.push(Occasion {
            obs_id: partial.obs_id,
            shown: partial.shown,
            prices: partial.prices,
            feat_a: partial.feat_a,
            feat_b: partial.feat_b,
            chosen,
        });
    }
    Ok(occasions)
}
