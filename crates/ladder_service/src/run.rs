//! Run-id tagged execution of fits and searches.
//!
//! The estimator and the optimiser are CPU-bound and can hold a thread for
//! seconds, so they run on the blocking pool rather than the caller's async
//! thread. Every invocation is tagged with a monotonically increasing
//! [`RunId`]; a caller that fires a new run before the old one lands keeps
//! only the newest id and discards late results through
//! [`RunManager::accept`]. Starting a run raises the previous run's cancel
//! flag, which the estimator checks between EM iterations.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ladder_core::types::{Constraints, SearchRanges};
use ladder_estimator::{EmConfig, Estimator, FitResult, ObservationRow, ProgressCallback};
use ladder_models::scenario::Scenario;
use ladder_optimiser::{GridSearch, GridSearchConfig, OptimiserResult};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Semaphore};
use tokio::task;
use tokio::time;

use crate::config::ServiceConfig;
use crate::error::RunError;

/// Monotonically increasing tag for one managed computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(u64);

impl RunId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// A worker's payload, tagged with the id that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome<T> {
    /// The id issued when this run started.
    pub run: RunId,
    /// What the worker produced.
    pub value: T,
}

/// Issues run ids and executes fits and searches off the async thread.
///
/// Estimation runs under a wall-clock watchdog on two levels: a
/// `tokio::time::timeout` around the whole run, and the estimator's own
/// time budget tightened to the same deadline so a worker that never
/// yields still stops itself. The optimiser gets no watchdog; its
/// combination ceiling already bounds the worst case.
///
/// Cloning is cheap and shares state: clones mint from the same counter
/// and supersede each other's runs.
#[derive(Debug, Clone)]
pub struct RunManager {
    config: ServiceConfig,
    watchdog: Duration,
    ids: Arc<AtomicU64>,
    workers: Arc<Semaphore>,
    active: Arc<Mutex<Option<Arc<AtomicBool>>>>,
}

impl RunManager {
    /// Creates a manager with the given settings.
    pub fn new(config: ServiceConfig) -> Self {
        let watchdog = config.watchdog();
        let workers = Arc::new(Semaphore::new(config.worker_threads.max(1)));
        Self {
            config,
            watchdog,
            ids: Arc::new(AtomicU64::new(0)),
            workers,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a manager with default settings.
    pub fn with_defaults() -> Self {
        Self::new(ServiceConfig::default())
    }

    /// Overrides the watchdog with a raw duration, for hosts that want
    /// sub-second budgets.
    pub fn with_watchdog(mut self, watchdog: Duration) -> Self {
        self.watchdog = watchdog;
        self
    }

    /// The settings this manager was built from.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The newest issued run id.
    pub fn latest(&self) -> RunId {
        RunId(self.ids.load(Ordering::SeqCst))
    }

    /// Whether a tagged result is still the one the caller wants.
    pub fn is_current(&self, run: RunId) -> bool {
        run == self.latest()
    }

    /// Accepts a tagged outcome only if no newer run has been issued since.
    pub fn accept<T>(&self, outcome: RunOutcome<T>) -> Result<T, RunError> {
        let latest = self.latest();
        if outcome.run == latest {
            Ok(outcome.value)
        } else {
            Err(RunError::Superseded {
                run: outcome.run,
                latest,
            })
        }
    }

    /// Raises the active run's cancel flag. Returns whether a run was
    /// still registered to cancel.
    pub async fn cancel_current(&self) -> bool {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(flag) => {
                flag.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Fits the configured mixture on a worker thread under the watchdog.
    pub async fn fit_em(
        &self,
        config: EmConfig,
        rows: Vec<ObservationRow>,
    ) -> Result<RunOutcome<FitResult>, RunError> {
        self.fit_em_with_progress(config, rows, None).await
    }

    /// Like [`RunManager::fit_em`], forwarding the estimator's progress
    /// ticks (iteration, log-likelihood) to the caller.
    pub async fn fit_em_with_progress(
        &self,
        mut config: EmConfig,
        rows: Vec<ObservationRow>,
        progress: Option<ProgressCallback>,
    ) -> Result<RunOutcome<FitResult>, RunError> {
        let (run, cancel) = self.begin("fit_em").await;

        // Tighten the worker-side budget to the watchdog so the estimator
        // stops itself even when the async timeout cannot reach it.
        let budget = match config.time_budget {
            Some(requested) => requested.min(self.watchdog),
            None => self.watchdog,
        };
        config.time_budget = Some(budget);

        let worker_cancel = Arc::clone(&cancel);
        let workers = Arc::clone(&self.workers);
        let started = Instant::now();
        let work = async move {
            let permit = workers
                .acquire_owned()
                .await
                .map_err(|_| RunError::worker("worker pool closed"))?;
            let handle = task::spawn_blocking(move || {
                let _permit = permit;
                Estimator::new(config).fit_with_controls(&rows, progress, Some(worker_cancel))
            });
            match handle.await {
                Ok(fit) => fit.map_err(|err| {
                    if err.is_timeout() {
                        RunError::Timeout { budget }
                    } else if err.is_cancelled() {
                        RunError::Cancelled
                    } else {
                        RunError::Estimation(err)
                    }
                }),
                Err(join) => Err(RunError::worker(join.to_string())),
            }
        };

        let outcome = match time::timeout(self.watchdog, work).await {
            Ok(result) => result,
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                Err(RunError::Timeout {
                    budget: self.watchdog,
                })
            }
        };
        self.finish(&cancel).await;

        match outcome {
            Ok(fit) => {
                tracing::info!(
                    run = run.value(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    converged = fit.converged,
                    classes = fit.class_count(),
                    "fit complete"
                );
                Ok(RunOutcome { run, value: fit })
            }
            Err(err) => {
                tracing::warn!(run = run.value(), error = %err, "fit abandoned");
                Err(err)
            }
        }
    }

    /// Runs the guarded grid search on a worker thread.
    pub async fn optimise(
        &self,
        config: GridSearchConfig,
        scenario: Scenario,
        ranges: SearchRanges,
        constraints: Constraints,
    ) -> Result<RunOutcome<OptimiserResult>, RunError> {
        let (run, cancel) = self.begin("optimise").await;

        let workers = Arc::clone(&self.workers);
        let started = Instant::now();
        let result = async {
            let permit = workers
                .acquire_owned()
                .await
                .map_err(|_| RunError::worker("worker pool closed"))?;
            let handle = task::spawn_blocking(move || {
                let _permit = permit;
                GridSearch::new(config).run(&scenario, &ranges, &constraints)
            });
            match handle.await {
                Ok(search) => search.map_err(RunError::Optimisation),
                Err(join) => Err(RunError::worker(join.to_string())),
            }
        }
        .await;
        self.finish(&cancel).await;

        match result {
            Ok(search) => {
                tracing::info!(
                    run = run.value(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    feasible = search.is_feasible(),
                    tested = search.diagnostics.tested,
                    "search complete"
                );
                Ok(RunOutcome { run, value: search })
            }
            Err(err) => {
                tracing::warn!(run = run.value(), error = %err, "search abandoned");
                Err(err)
            }
        }
    }

    /// Mints the next id, registers a fresh cancel flag, and cancels the
    /// previous run if one is still registered.
    async fn begin(&self, kind: &str) -> (RunId, Arc<AtomicBool>) {
        let run = RunId(self.ids.fetch_add(1, Ordering::SeqCst) + 1);
        let cancel = Arc::new(AtomicBool::new(false));
        let mut active = self.active.lock().await;
        if let Some(previous) = active.replace(Arc::clone(&cancel)) {
            previous.store(true, Ordering::Relaxed);
        }
        tracing::debug!(run = run.value(), kind, "run issued");
        (run, cancel)
    }

    /// Clears the active slot, but only if it still holds this run's flag.
    async fn finish(&self, cancel: &Arc<AtomicBool>) {
        let mut active = self.active.lock().await;
        if active
            .as_ref()
            .map_or(false, |held| Arc::ptr_eq(held, cancel))
        {
            *active = None;
        }
    }
}
