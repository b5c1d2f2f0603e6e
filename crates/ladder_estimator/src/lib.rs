//! # Ladder Estimator (L2: Model Fitting)
//!
//! Fits segment weights and utility coefficients from historical choice
//! observations: a single-class multinomial-logit MLE with analytic
//! gradients, and a latent-class EM wrapper for K = 1..3 behavioural
//! classes.
//!
//! This crate provides:
//! - Observation rows and occasion grouping with strict validation
//! - Ridge-penalised backtracking gradient ascent (`mle`)
//! - Latent-class EM with seeded jitter initialisation (`em`)
//! - Cooperative time budgets, cancellation, and progress callbacks
//!
//! ## Design Principles
//!
//! - **Raw rows in, typed results out**: no dependency on the choice engine;
//!   the utility formulation is restated here for gradient efficiency
//! - **Non-convergence is not an error**: the best iterate is returned with
//!   `converged: false`; only malformed data, timeouts, and cancellation
//!   surface as errors
//! - **Reproducibility**: all random initialisation flows from a caller
//!   seed

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod em;
pub mod error;
pub mod mle;
pub mod observations;

pub use config::{EmConfig, MleConfig};
pub use em::{Estimator, FitResult, ProgressCallback};
pub use error::EstimationError;
pub use mle::{Coefficients, SingleClassFit};
pub use observations::{group_occasions, Alternative, Occasion, ObservationRow};
