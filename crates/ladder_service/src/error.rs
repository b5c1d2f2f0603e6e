//! Failure states for managed runs.

use std::time::Duration;

use ladder_estimator::EstimationError;
use ladder_optimiser::OptimiserError;
use thiserror::Error;

use crate::run::RunId;

/// Why a managed run produced no usable result.
///
/// Timeouts and cancellation are lifecycle outcomes, kept distinct from the
/// data and convergence failures the workers themselves report.
#[derive(Error, Debug)]
pub enum RunError {
    /// The watchdog elapsed before the worker finished.
    #[error("run exceeded its watchdog budget of {budget:?}")]
    Timeout {
        /// The budget that elapsed.
        budget: Duration,
    },

    /// The run's cancel flag was raised while the worker was still going.
    #[error("run cancelled by the caller")]
    Cancelled,

    /// The result arrived after a newer run had been issued.
    #[error("{run} arrived after {latest} was issued")]
    Superseded {
        /// The run that produced the late result.
        run: RunId,
        /// The newest issued run.
        latest: RunId,
    },

    /// The estimator rejected its inputs or failed outright.
    #[error(transparent)]
    Estimation(#[from] EstimationError),

    /// The optimiser rejected its inputs.
    #[error(transparent)]
    Optimisation(#[from] OptimiserError),

    /// The worker task panicked or its pool shut down underneath it.
    #[error("worker failed: {detail}")]
    Worker {
        /// Join or pool failure description.
        detail: String,
    },
}

impl RunError {
    pub(crate) fn worker(detail: impl Into<String>) -> Self {
        RunError::Worker {
            detail: detail.into(),
        }
    }

    /// True when the run hit a wall-clock limit.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunError::Timeout { .. })
    }

    /// True when the result was discarded for being stale.
    pub fn is_superseded(&self) -> bool {
        matches!(self, RunError::Superseded { .. })
    }
}
