//! # Ladder Optimiser (L3: Price Search)
//!
//! Guarded combinatorial search for the profit-maximising price ladder.
//! Candidates come from a coarse-to-fine pass over a three-dimensional price
//! grid; each one is screened against business guardrails (tier gaps, margin
//! floors, opt-out ceiling, take-rate floor) before its expected profit
//! counts.
//!
//! This crate provides:
//! - Per-candidate evaluation with typed guardrail violations (`evaluate`)
//! - The two-stage grid search with combination-ceiling coarsening (`grid`)
//! - Search diagnostics and the feasible/unconstrained result split
//!   (`result`)
//!
//! ## Design Principles
//!
//! - **Infeasibility is an outcome, not an error**: an empty feasible set
//!   returns `best: None` plus diagnostics; errors are reserved for invalid
//!   inputs
//! - **Never dress up an infeasible ladder**: the unconstrained fallback is
//!   reported separately with its violation attached
//! - **Bounded work**: the combination ceiling coarsens the step until the
//!   worst case is affordable; refinement recovers local resolution
//!
//! ## Usage Example
//!
//! ```
//! use ladder_core::types::{Constraints, SearchRanges};
//! use ladder_models::presets::example_blend;
//! use ladder_models::scenario::Scenario;
//! use ladder_optimiser::GridSearch;
//!
//! let scenario = Scenario::new(
//!     ladder_core::types::Ladder { good: 10.0, better: 20.0, best: 30.0 },
//!     ladder_core::types::Costs { good: 4.0, better: 8.0, best: 12.0 },
//!     example_blend(),
//!     1_000.0,
//! );
//! let ranges = SearchRanges::uniform(5.0, 40.0, 1.0);
//! let constraints = Constraints::default().with_gaps(2.0, 2.0);
//!
//! let outcome = GridSearch::with_defaults()
//!     .run(&scenario, &ranges, &constraints)
//!     .unwrap();
//! assert!(outcome.diagnostics.tested > 0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod error;
pub mod evaluate;
pub mod grid;
pub mod result;

pub use config::GridSearchConfig;
pub use error::OptimiserError;
pub use evaluate::{evaluate_candidate, CandidateEvaluation, Violation};
pub use grid::GridSearch;
pub use result::{OptimiserResult, SearchDiagnostics};
