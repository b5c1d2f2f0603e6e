//! Headline numbers for one scenario at its current ladder.

use ladder_core::math::safe_div;
use ladder_core::types::{Constraints, Tier, TierMap};
use ladder_core::waterfall::pocket_price;
use ladder_models::scenario::Scenario;
use ladder_optimiser::evaluate_candidate;
use serde::{Deserialize, Serialize};

/// The numbers a host dashboard shows for one scenario.
///
/// Profit and revenue follow the constraints' profit basis, matching what
/// the optimiser reports for the same ladder. The blended average selling
/// price is always list-based; multiplying it by the pocket-coverage ratio
/// recovers the per-unit pocket take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    /// Expected profit on the configured profit basis.
    pub profit: f64,
    /// Expected revenue on the configured profit basis.
    pub revenue: f64,
    /// Fraction of the population choosing any paid tier.
    pub take_rate: f64,
    /// Fraction of the population opting out entirely.
    pub none_share: f64,
    /// Expected units per tier.
    pub units: TierMap<f64>,
    /// List-price revenue per paid unit.
    pub blended_asp: f64,
    /// Pocket revenue as a fraction of list revenue.
    pub pocket_coverage: f64,
}

impl KpiSummary {
    /// Total expected paid units across the three tiers.
    pub fn paid_units(&self) -> f64 {
        Tier::ALL.iter().map(|&tier| *self.units.get(tier)).sum()
    }
}

/// Computes the KPI block for the scenario's current ladder.
pub fn kpi_summary(scenario: &Scenario, constraints: &Constraints) -> KpiSummary {
    let evaluation = evaluate_candidate(scenario, &scenario.ladder, constraints);

    let mut paid_units = 0.0;
    let mut list_revenue = 0.0;
    let mut pocket_revenue = 0.0;
    for tier in Tier::ALL {
        let units = *evaluation.units.get(tier);
        let list = *scenario.ladder.get(tier);
        paid_units += units;
        list_revenue += units * list;
        pocket_revenue += units * pocket_price(list, tier, &scenario.leakages).pocket;
    }

    KpiSummary {
        profit: evaluation.profit,
        revenue: evaluation.revenue,
        take_rate: evaluation.shares.take_rate(),
        none_share: evaluation.shares.none,
        units: evaluation.units,
        blended_asp: safe_div(list_revenue, paid_units),
        pocket_coverage: safe_div(pocket_revenue, list_revenue),
    }
}
