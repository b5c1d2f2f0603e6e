//! Predicted choice shares over the four alternatives.

use crate::math::EPSILON;
use crate::types::tier::Tier;
use serde::{Deserialize, Serialize};

/// Probability mass over {opt out, good, better, best}.
///
/// Produced by the choice-share engine; the four fields are non-negative and
/// sum to 1 (the engine renormalises against floating-point drift).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceShares {
    /// Share choosing no tier at all.
    pub none: f64,
    /// Share choosing the `good` tier.
    pub good: f64,
    /// Share choosing the `better` tier.
    pub better: f64,
    /// Share choosing the `best` tier.
    pub best: f64,
}

impl ChoiceShares {
    /// Degenerate distribution with the whole population opting out.
    ///
    /// Returned by the engine when total segment weight is non-positive, so
    /// downstream profit maths stays defined without dividing by zero.
    pub const OPT_OUT: ChoiceShares = ChoiceShares {
        none: 1.0,
        good: 0.0,
        better: 0.0,
        best: 0.0,
    };

    /// Builds shares from explicit masses (not renormalised).
    pub fn new(none: f64, good: f64, better: f64, best: f64) -> Self {
        Self {
            none,
            good,
            better,
            best,
        }
    }

    /// Share for one paid tier.
    pub fn tier(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Good => self.good,
            Tier::Better => self.better,
            Tier::Best => self.best,
        }
    }

    /// Combined share across the three paid tiers (`1 - none` after
    /// renormalisation).
    pub fn take_rate(&self) -> f64 {
        self.good + self.better + self.best
    }

    /// Total mass across all four alternatives.
    pub fn total(&self) -> f64 {
        self.none + self.take_rate()
    }

    /// Rescales the four masses to sum to 1.
    ///
    /// Falls back to [`ChoiceShares::OPT_OUT`] when the total mass is below
    /// the numeric guard, rather than dividing by zero.
    pub fn renormalised(&self) -> ChoiceShares {
        let total = self.total();
        if total <= EPSILON {
            return ChoiceShares::OPT_OUT;
        }
        ChoiceShares {
            none: self.none / total,
            good: self.good / total,
            better: self.better / total,
            best: self.best / total,
        }
    }
}
