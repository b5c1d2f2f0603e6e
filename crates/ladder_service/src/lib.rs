//! # Ladder Service (L5: Run Management)
//!
//! Executes the CPU-bound fits and searches off the caller's async thread,
//! tagging every invocation with a monotonically increasing run id so that
//! late results from superseded runs get discarded instead of applied.
//!
//! This crate provides:
//! - [`RunManager`]: mints run ids, executes workers on the blocking pool,
//!   and guards estimation with a wall-clock watchdog
//! - [`RunOutcome`]: a worker's payload tagged with the id that produced it
//! - [`ServiceConfig`]: TOML-loadable settings with environment overrides
//!
//! ## Design Principles
//!
//! - **Latest id wins**: callers pass outcomes through
//!   [`RunManager::accept`], which rejects anything older than the newest
//!   issued id; starting a new run cancels the previous one cooperatively
//! - **Timeouts are lifecycle outcomes**: the watchdog surfaces
//!   [`RunError::Timeout`], kept distinct from data and convergence failures
//! - **Deep-copied inputs**: workers take owned rows and scenarios, so no
//!   two runs share mutable state
//!
//! ```
//! use ladder_core::types::{Constraints, SearchRanges, TierMap};
//! use ladder_models::scenario::Scenario;
//! use ladder_models::segments::Segment;
//! use ladder_optimiser::GridSearchConfig;
//! use ladder_service::{RunManager, ServiceConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = RunManager::new(ServiceConfig::default());
//! let scenario = Scenario::new(
//!     TierMap::new(10.0, 20.0, 30.0),
//!     TierMap::new(4.0, 8.0, 12.0),
//!     vec![Segment::new(1.0, -0.1, 0.0, 0.0, 0.0)],
//!     1_000.0,
//! );
//!
//! let outcome = manager
//!     .optimise(
//!         GridSearchConfig::fast(),
//!         scenario,
//!         SearchRanges::uniform(8.0, 32.0, 4.0),
//!         Constraints::default(),
//!     )
//!     .await?;
//! assert!(manager.is_current(outcome.run));
//!
//! let result = manager.accept(outcome)?;
//! assert!(result.is_feasible());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod error;
pub mod run;

pub use config::{ConfigError, ServiceConfig};
pub use error::RunError;
pub use run::{RunId, RunManager, RunOutcome};

pub use ladder_estimator::ProgressCallback;
