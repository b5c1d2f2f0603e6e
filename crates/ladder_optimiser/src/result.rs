//! Search outcome and diagnostics.

use crate::evaluate::CandidateEvaluation;
use serde::{Deserialize, Serialize};

/// Work accounting for one grid search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDiagnostics {
    /// Candidates considered across both passes.
    pub tested: u64,
    /// Candidates rejected by a guardrail.
    pub skipped: u64,
    /// True when the requested step was doubled to fit the ceiling.
    pub coarsened: bool,
    /// Step actually used by the coarse pass.
    pub coarse_step: f64,
    /// Step used for the local refinement neighbourhood.
    pub refine_step: f64,
}

impl SearchDiagnostics {
    /// Candidates that passed every guardrail.
    pub fn feasible_count(&self) -> u64 {
        self.tested.saturating_sub(self.skipped)
    }
}

/// Outcome of a guarded grid search.
///
/// `best` is the feasible winner and is `None` exactly when no candidate
/// passed every guardrail. `best_unconstrained` ranks by profit alone
/// (gap-valid candidates only) and keeps its violation attached, so an
/// infeasible fallback can never masquerade as a feasible answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimiserResult {
    /// Highest-profit candidate that passed every guardrail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<CandidateEvaluation>,
    /// Highest-profit candidate ignoring margin and share guardrails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_unconstrained: Option<CandidateEvaluation>,
    /// Work accounting.
    pub diagnostics: SearchDiagnostics,
}

impl OptimiserResult {
    /// True when a feasible ladder was found.
    pub fn is_feasible(&self) -> bool {
        self.best.is_some()
    }
}
