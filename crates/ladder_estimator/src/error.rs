//! Estimation error taxonomy.
//!
//! Fatal, inspectable failures only: malformed input, timeouts, and
//! cancellation. Non-convergence is a field on [`crate::em::FitResult`],
//! never an error.

use ladder_core::types::ValidationError;
use std::time::Duration;
use thiserror::Error;

/// Fatal estimation failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    /// The dataset contains no choice occasions at all.
    #[error("dataset contains no choice occasions")]
    NoChoices,

    /// One occasion's rows break the grouping contract.
    #[error("occasion {obs_id} is malformed: {reason}")]
    MalformedOccasion {
        /// Identifier of the first offending occasion.
        obs_id: u64,
        /// What exactly was wrong with its rows.
        reason: String,
    },

    /// A field failed structural validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The fit exceeded its wall-clock budget.
    #[error("estimation exceeded its time budget: elapsed {elapsed:?}, budget {budget:?}")]
    TimedOut {
        /// Wall-clock time spent before the check fired.
        elapsed: Duration,
        /// The budget that was exceeded.
        budget: Duration,
    },

    /// The caller's cancellation flag was raised between iterations.
    #[error("estimation cancelled by caller")]
    Cancelled,
}

impl EstimationError {
    /// Malformed-occasion helper.
    pub fn malformed(obs_id: u64, reason: impl Into<String>) -> Self {
        EstimationError::MalformedOccasion {
            obs_id,
            reason: reason.into(),
        }
    }

    /// True for timeouts, which callers must distinguish from data and
    /// convergence problems.
    pub fn is_timeout(&self) -> bool {
        matches!(self, EstimationError::TimedOut { .. })
    }

    /// True when the run was cancelled cooperatively.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EstimationError::Cancelled)
    }

    /// True for input-data failures (no choices, malformed occasions,
    /// invalid values).
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            EstimationError::NoChoices
                | EstimationError::MalformedOccasion { .. }
                | EstimationError::Invalid(_)
        )
    }
}
