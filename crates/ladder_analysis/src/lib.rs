//! # Ladder Analysis (L4: Derived Views)
//!
//! One-dimensional views over the candidate evaluation rules:
//! - `frontier`: profit-vs-price sweeps for a single tier
//! - `tornado`: one-way driver shocks ranked by impact
//! - `kpis`: the headline numbers a host dashboard shows for one scenario
//!
//! ## Design Principles
//!
//! - **Views, not verdicts**: every function here is a pure read over a
//!   [`ladder_models::scenario::Scenario`]; nothing is mutated and nothing
//!   is cached between calls
//! - **Same evaluation rules as the optimiser**: profit, margins, and
//!   feasibility come from `ladder_optimiser::evaluate_candidate`, so a
//!   frontier point and a grid-search candidate at the same prices always
//!   agree
//! - **Infeasible stays marked**: sweeps report infeasible points with
//!   their flag attached rather than hiding them
//!
//! ## Usage Example
//!
//! ```rust
//! use ladder_analysis::{frontier_sweep, FrontierConfig};
//! use ladder_core::types::{Constraints, Tier, TierMap};
//! use ladder_models::presets::example_blend;
//! use ladder_models::scenario::Scenario;
//!
//! let scenario = Scenario::new(
//!     TierMap::new(10.0, 20.0, 30.0),
//!     TierMap::new(4.0, 8.0, 12.0),
//!     example_blend(),
//!     1_000.0,
//! );
//! let result = frontier_sweep(
//!     &scenario,
//!     Tier::Better,
//!     &Constraints::default().with_gaps(2.0, 2.0),
//!     &FrontierConfig::default(),
//! );
//! assert!(!result.points.is_empty());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod frontier;
pub mod kpis;
pub mod tornado;

pub use frontier::{frontier_sweep, FrontierConfig, FrontierPoint, FrontierResult};
pub use kpis::{kpi_summary, KpiSummary};
pub use tornado::{
    driver_impact, standard_drivers, tornado, Driver, DriverImpact, TornadoConfig, TornadoMetric,
};
