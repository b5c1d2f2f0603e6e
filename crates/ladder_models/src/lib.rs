//! # Ladder Models (L2: Behavioural Logic)
//!
//! Behavioural segments and the mixed multinomial-logit choice engine.
//!
//! This crate provides:
//! - Segment definitions with mixture-weight normalisation
//! - Choice-share computation with reference-price anchoring
//! - Scenario bundles grouping every engine input
//! - Serialisable snapshots for host import/export and save/fetch stores
//! - Example segment blends for tests and demos
//!
//! ## Design Principles
//!
//! - **Pure functions over immutable snapshots**: the engine holds no state
//! - **Weight-mixed aggregation**: per-segment probabilities are averaged by
//!   mixture weight, then renormalised against floating-point drift
//! - **Builder pattern** for ergonomic scenario construction with sensible
//!   defaults

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod choice;
pub mod presets;
pub mod scenario;
pub mod segments;
pub mod snapshot;
