//! Profit-vs-price frontier: sweep one tier, hold the other two.
//!
//! Each sampled price is evaluated with the optimiser's candidate rules, so
//! the curve shows exactly what the grid search would see along that axis,
//! including where the guardrails cut it off. The sweep range is taken from
//! the first available source: an explicit range, an observed market band,
//! or a fallback of +/-50% around the current list price.

use ladder_core::types::{Constraints, PriceRange, Tier};
use ladder_models::scenario::Scenario;
use ladder_optimiser::evaluate_candidate;
use serde::{Deserialize, Serialize};

/// Where the sweep bounds come from and how finely to sample them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontierConfig {
    /// Approximate number of sample points; the human-friendly step
    /// rounding lands at or just under this.
    pub target_points: usize,
    /// Explicit sweep bounds, taking priority over everything else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_range: Option<PriceRange>,
    /// Observed market price band, used when no explicit range is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_range: Option<PriceRange>,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            target_points: 90,
            explicit_range: None,
            observed_range: None,
        }
    }
}

impl FrontierConfig {
    /// Sets the approximate sample count.
    pub fn with_target_points(mut self, target_points: usize) -> Self {
        self.target_points = target_points;
        self
    }

    /// Pins the sweep to explicit bounds.
    pub fn with_explicit_range(mut self, range: PriceRange) -> Self {
        self.explicit_range = Some(range);
        self
    }

    /// Supplies an observed market band as the fallback bounds.
    pub fn with_observed_range(mut self, range: PriceRange) -> Self {
        self.observed_range = Some(range);
        self
    }
}

/// One sampled price on the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontierPoint {
    /// Price of the swept tier at this sample.
    pub price: f64,
    /// Expected profit with the other two tiers held at their current
    /// prices.
    pub profit: f64,
    /// True when the candidate passed every guardrail.
    pub feasible: bool,
}

/// A full sweep for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontierResult {
    /// The tier that was swept.
    pub tier: Tier,
    /// Samples in ascending price order.
    pub points: Vec<FrontierPoint>,
    /// Highest-profit feasible point, or the highest-profit point overall
    /// when nothing on the curve is feasible. `None` only for an empty
    /// sweep. Check `best.feasible` before treating it as actionable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<FrontierPoint>,
}

impl FrontierResult {
    /// The points that passed every guardrail.
    pub fn feasible_points(&self) -> impl Iterator<Item = &FrontierPoint> + '_ {
        self.points.iter().filter(|point| point.feasible)
    }
}

/// Sweeps `tier` across its derived range and evaluates each sample.
///
/// The other two tiers stay at the scenario's current prices, so gap
/// guardrails show up as infeasible stretches at the edges of the curve.
pub fn frontier_sweep(
    scenario: &Scenario,
    tier: Tier,
    constraints: &Constraints,
    config: &FrontierConfig,
) -> FrontierResult {
    let range = sweep_range(scenario, tier, config);
    if range.span() < 0.0 || !range.min.is_finite() || !range.max.is_finite() {
        tracing::warn!(%tier, min = range.min, max = range.max, "unusable sweep range");
        return FrontierResult {
            tier,
            points: Vec::new(),
            best: None,
        };
    }

    let step = nice_step(range.span(), config.target_points);
    let count = ((range.span() / step + 1e-9).floor() as u64).saturating_add(1);

    let mut candidate = scenario.ladder;
    let mut points = Vec::with_capacity(count as usize);
    for i in 0..count {
        let price = range.min + i as f64 * step;
        candidate.set(tier, price);
        let evaluation = evaluate_candidate(scenario, &candidate, constraints);
        points.push(FrontierPoint {
            price,
            profit: evaluation.profit,
            feasible: evaluation.feasible,
        });
    }

    let best = pick_best(&points);
    if points.iter().all(|point| !point.feasible) {
        tracing::warn!(%tier, samples = points.len(), "no feasible point on the frontier");
    }
    FrontierResult { tier, points, best }
}

/// Range preference: explicit, else observed, else +/-50% of the current
/// price.
fn sweep_range(scenario: &Scenario, tier: Tier, config: &FrontierConfig) -> PriceRange {
    if let Some(range) = config.explicit_range {
        return range;
    }
    if let Some(range) = config.observed_range {
        return range;
    }
    let current = *scenario.ladder.get(tier);
    PriceRange::new(current * 0.5, current * 1.5)
}

/// Smallest step from the {1, 2, 2.5, 5} x 10^k family that keeps the
/// sweep at or under the target point count. This is where the familiar
/// 0.25 / 1 / 2 / 10 / 25 / 50 increments come from.
fn nice_step(span: f64, target_points: usize) -> f64 {
    let raw = span / target_points.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 0.25;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    for multiplier in [1.0, 2.0, 2.5, 5.0, 10.0] {
        let step = multiplier * magnitude;
        if step >= raw * (1.0 - 1e-9) {
            return step;
        }
    }
    10.0 * magnitude
}

/// Best feasible point by profit, else best overall; price breaks ties.
fn pick_best(points: &[FrontierPoint]) -> Option<FrontierPoint> {
    let order = |a: &&FrontierPoint, b: &&FrontierPoint| {
        b.profit
            .total_cmp(&a.profit)
            .then_with(|| a.price.total_cmp(&b.price))
    };
    points
        .iter()
        .filter(|point| point.feasible)
        .min_by(order)
        .or_else(|| points.iter().min_by(order))
        .copied()
}
