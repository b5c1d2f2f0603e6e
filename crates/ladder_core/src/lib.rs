//! # ladder_core: Foundation for the Tiered-Pricing Stack
//!
//! ## Layer 1 (Foundation) Role
//!
//! ladder_core is the bottom layer of the workspace, providing:
//! - Tier labels and the generic per-tier container (`types::tier`)
//! - Tier feature covariates (`types::features`)
//! - Choice-share and guardrail records (`types::shares`, `types::constraints`)
//! - Leakage fractions feeding the waterfall (`types::leakages`)
//! - Grid-search ranges (`types::ranges`)
//! - Structured validation errors (`types::error`)
//! - Numeric guards, stable softmax, and charm snapping (`math`)
//! - The net-price waterfall (`waterfall`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other ladder_* crates, with minimal external
//! dependencies:
//! - num-traits: Traits for generic numerical computation
//! - serde: Serialisation of the record types shared with host applications
//! - thiserror: Structured error types
//!
//! ## Usage Examples
//!
//! ```rust
//! use ladder_core::types::{Leakages, Tier, TierMap};
//! use ladder_core::waterfall::pocket_price;
//!
//! // A price ladder is a per-tier map of list prices.
//! let ladder: TierMap<f64> = TierMap::new(19.0, 39.0, 79.0);
//! assert_eq!(*ladder.get(Tier::Better), 39.0);
//!
//! // With no leakages the pocket price equals the list price.
//! let breakdown = pocket_price(*ladder.get(Tier::Good), Tier::Good, &Leakages::none());
//! assert_eq!(breakdown.pocket, 19.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
pub mod waterfall;
