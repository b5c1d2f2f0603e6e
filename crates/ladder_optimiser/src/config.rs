//! Grid search configuration.

use ladder_core::types::error::{ensure_positive, ValidationError};
use serde::{Deserialize, Serialize};

/// Tuning knobs for the two-stage grid search.
///
/// The defaults match the intended interactive envelope: at most half a
/// million coarse combinations, with the twenty best feasible candidates
/// carried into refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSearchConfig {
    /// Maximum coarse-pass combinations before the step is doubled.
    pub combo_ceiling: u64,
    /// Number of top feasible candidates refined locally.
    pub top_k: usize,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            combo_ceiling: 500_000,
            top_k: 20,
        }
    }
}

impl GridSearchConfig {
    /// Smaller ceiling and candidate list for latency-sensitive callers.
    pub fn fast() -> Self {
        Self {
            combo_ceiling: 50_000,
            top_k: 8,
        }
    }

    /// Sets the combination ceiling.
    pub fn with_combo_ceiling(mut self, combo_ceiling: u64) -> Self {
        self.combo_ceiling = combo_ceiling;
        self
    }

    /// Sets the refinement candidate count.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Validates both knobs are positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_positive("grid.comboCeiling", self.combo_ceiling as f64)?;
        ensure_positive("grid.topK", self.top_k as f64)
    }
}
