//! One-way driver sensitivity around a base scenario.
//!
//! Each driver is shocked down and up by a fixed magnitude while everything
//! else stays at baseline, and the resulting profit (or revenue) deltas are
//! recorded in both directions. Drivers are ranked by the larger absolute
//! delta. Shocked copies are clamped into their legal domains, so a shock
//! can saturate: a percentage already at zero simply produces a zero delta
//! on the way down.

use ladder_core::math::EPSILON;
use ladder_core::types::{Constraints, Tier};
use ladder_models::scenario::Scenario;
use ladder_models::segments::Segment;
use ladder_optimiser::evaluate_candidate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scenario input that can be shocked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Driver {
    /// List price of one tier.
    TierPrice(Tier),
    /// Unit cost of one tier.
    TierCost(Tier),
    /// Anchor price of one tier; only meaningful when anchoring is on.
    TierRefPrice(Tier),
    /// Payment processing percentage.
    PaymentPct,
    /// Flat per-unit payment fee.
    PaymentFixed,
    /// Foreign-exchange percentage.
    FxPct,
    /// Refunds percentage.
    RefundsPct,
    /// Mixture weight moved between two segments, then renormalised.
    SegmentTilt {
        /// Segment losing weight on the up shock.
        from: usize,
        /// Segment gaining weight on the up shock.
        to: usize,
    },
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::TierPrice(tier) => write!(f, "price ({tier})"),
            Driver::TierCost(tier) => write!(f, "cost ({tier})"),
            Driver::TierRefPrice(tier) => write!(f, "ref price ({tier})"),
            Driver::PaymentPct => write!(f, "payment %"),
            Driver::PaymentFixed => write!(f, "payment fixed fee"),
            Driver::FxPct => write!(f, "fx %"),
            Driver::RefundsPct => write!(f, "refunds %"),
            Driver::SegmentTilt { from, to } => write!(f, "segment tilt ({from} to {to})"),
        }
    }
}

/// Which headline number the deltas are measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TornadoMetric {
    /// Expected profit on the configured basis.
    Profit,
    /// Expected revenue on the configured basis.
    Revenue,
}

/// Shock magnitudes and the metric under study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TornadoConfig {
    /// Metric the deltas are measured on.
    pub metric: TornadoMetric,
    /// Absolute shock for tier prices and reference prices, in currency
    /// units.
    pub price_shock: f64,
    /// Absolute shock for tier unit costs, in currency units.
    pub cost_shock: f64,
    /// Absolute shock for the percentage leakages, in fraction points.
    pub pct_shock: f64,
    /// Absolute shock for the fixed payment fee, in currency units.
    pub fixed_shock: f64,
    /// Mixture weight moved by the segment tilt.
    pub tilt_shock: f64,
}

impl Default for TornadoConfig {
    fn default() -> Self {
        Self {
            metric: TornadoMetric::Profit,
            price_shock: 1.0,
            cost_shock: 0.5,
            pct_shock: 0.01,
            fixed_shock: 0.05,
            tilt_shock: 0.05,
        }
    }
}

impl TornadoConfig {
    /// Default magnitudes measured on revenue instead of profit.
    pub fn revenue() -> Self {
        Self {
            metric: TornadoMetric::Revenue,
            ..Self::default()
        }
    }

    /// Sets the metric.
    pub fn with_metric(mut self, metric: TornadoMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the price and reference-price shock.
    pub fn with_price_shock(mut self, shock: f64) -> Self {
        self.price_shock = shock;
        self
    }

    /// Sets the unit-cost shock.
    pub fn with_cost_shock(mut self, shock: f64) -> Self {
        self.cost_shock = shock;
        self
    }

    /// Sets the percentage-leakage shock.
    pub fn with_pct_shock(mut self, shock: f64) -> Self {
        self.pct_shock = shock;
        self
    }

    /// Sets the tilt weight.
    pub fn with_tilt_shock(mut self, shock: f64) -> Self {
        self.tilt_shock = shock;
        self
    }
}

/// Signed metric movement for one driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverImpact {
    /// The shocked driver.
    pub driver: Driver,
    /// Metric delta versus baseline for the downward shock.
    pub down_delta: f64,
    /// Metric delta versus baseline for the upward shock.
    pub up_delta: f64,
}

impl DriverImpact {
    /// Raw ranking magnitude: the larger absolute delta of the two
    /// directions.
    pub fn magnitude(&self) -> f64 {
        self.down_delta.abs().max(self.up_delta.abs())
    }

    /// Magnitude floored for display, so near-zero bars stay visible on a
    /// chart. The raw value stays available through [`Self::magnitude`].
    pub fn display_magnitude(&self, floor: f64) -> f64 {
        self.magnitude().max(floor)
    }
}

/// Shocks every standard driver and returns the impacts sorted by
/// descending raw magnitude.
pub fn tornado(
    scenario: &Scenario,
    constraints: &Constraints,
    config: &TornadoConfig,
) -> Vec<DriverImpact> {
    let baseline = metric_value(scenario, constraints, config.metric);
    let mut impacts: Vec<DriverImpact> = standard_drivers(scenario)
        .into_iter()
        .map(|driver| impact_against(scenario, constraints, config, driver, baseline))
        .collect();
    impacts.sort_by(|a, b| b.magnitude().total_cmp(&a.magnitude()));
    impacts
}

/// The drivers worth shocking for this scenario.
///
/// Reference-price drivers appear only when anchoring is on, and the
/// segment tilt only when there are at least two segments to tilt between.
pub fn standard_drivers(scenario: &Scenario) -> Vec<Driver> {
    let mut drivers = Vec::new();
    for tier in Tier::ALL {
        drivers.push(Driver::TierPrice(tier));
    }
    for tier in Tier::ALL {
        drivers.push(Driver::TierCost(tier));
    }
    if scenario.ref_prices.is_some() {
        for tier in Tier::ALL {
            drivers.push(Driver::TierRefPrice(tier));
        }
    }
    drivers.extend([
        Driver::PaymentPct,
        Driver::PaymentFixed,
        Driver::FxPct,
        Driver::RefundsPct,
    ]);
    if scenario.segments.len() >= 2 {
        drivers.push(Driver::SegmentTilt { from: 0, to: 1 });
    }
    drivers
}

/// Both-direction deltas for a single driver.
pub fn driver_impact(
    scenario: &Scenario,
    constraints: &Constraints,
    config: &TornadoConfig,
    driver: Driver,
) -> DriverImpact {
    let baseline = metric_value(scenario, constraints, config.metric);
    impact_against(scenario, constraints, config, driver, baseline)
}

fn impact_against(
    scenario: &Scenario,
    constraints: &Constraints,
    config: &TornadoConfig,
    driver: Driver,
    baseline: f64,
) -> DriverImpact {
    let shock = shock_size(config, driver);
    let down = metric_value(
        &shocked_scenario(scenario, driver, -shock),
        constraints,
        config.metric,
    );
    let up = metric_value(
        &shocked_scenario(scenario, driver, shock),
        constraints,
        config.metric,
    );
    DriverImpact {
        driver,
        down_delta: down - baseline,
        up_delta: up - baseline,
    }
}

fn metric_value(scenario: &Scenario, constraints: &Constraints, metric: TornadoMetric) -> f64 {
    let evaluation = evaluate_candidate(scenario, &scenario.ladder, constraints);
    match metric {
        TornadoMetric::Profit => evaluation.profit,
        TornadoMetric::Revenue => evaluation.revenue,
    }
}

fn shock_size(config: &TornadoConfig, driver: Driver) -> f64 {
    match driver {
        Driver::TierPrice(_) | Driver::TierRefPrice(_) => config.price_shock,
        Driver::TierCost(_) => config.cost_shock,
        Driver::PaymentPct | Driver::FxPct | Driver::RefundsPct => config.pct_shock,
        Driver::PaymentFixed => config.fixed_shock,
        Driver::SegmentTilt { .. } => config.tilt_shock,
    }
}

/// Builds the shocked copy, clamped into each field's legal domain.
fn shocked_scenario(scenario: &Scenario, driver: Driver, delta: f64) -> Scenario {
    let mut shocked = scenario.clone();
    match driver {
        Driver::TierPrice(tier) => {
            let price = shocked.ladder.get_mut(tier);
            *price = (*price + delta).max(EPSILON);
        }
        Driver::TierCost(tier) => {
            let cost = shocked.costs.get_mut(tier);
            *cost = (*cost + delta).max(0.0);
        }
        Driver::TierRefPrice(tier) => {
            if let Some(refs) = shocked.ref_prices.as_mut() {
                let anchor = refs.get_mut(tier);
                *anchor = (*anchor + delta).max(EPSILON);
            }
        }
        Driver::PaymentPct => {
            shocked.leakages.payment_pct = (shocked.leakages.payment_pct + delta).clamp(0.0, 1.0);
        }
        Driver::PaymentFixed => {
            shocked.leakages.payment_fixed = (shocked.leakages.payment_fixed + delta).max(0.0);
        }
        Driver::FxPct => {
            shocked.leakages.fx_pct = (shocked.leakages.fx_pct + delta).clamp(0.0, 1.0);
        }
        Driver::RefundsPct => {
            shocked.leakages.refunds_pct = (shocked.leakages.refunds_pct + delta).clamp(0.0, 1.0);
        }
        Driver::SegmentTilt { from, to } => {
            tilt_segments(&mut shocked.segments, from, to, delta);
        }
    }
    shocked
}

/// Moves `delta` of mixture weight from one segment to another, clamped so
/// neither weight goes negative, then renormalises the whole list.
fn tilt_segments(segments: &mut [Segment], from: usize, to: usize, delta: f64) {
    if from == to || from >= segments.len() || to >= segments.len() {
        return;
    }
    let shift = delta.clamp(-segments[to].weight, segments[from].weight);
    segments[from].weight -= shift;
    segments[to].weight += shift;

    let total: f64 = segments.iter().map(|segment| segment.weight).sum();
    if total > 0.0 {
        for segment in segments.iter_mut() {
            segment.weight /= total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ladder_core::types::TierMap;

    fn linear_scenario() -> Scenario {
        Scenario::new(
            TierMap::new(10.0, 20.0, 30.0),
            TierMap::new(4.0, 8.0, 12.0),
            vec![Segment::new(1.0, -0.1, 0.0, 0.0, 0.0)],
            1_000.0,
        )
    }

    fn mixed_scenario() -> Scenario {
        Scenario::new(
            TierMap::new(10.0, 20.0, 30.0),
            TierMap::new(4.0, 8.0, 12.0),
            vec![
                Segment::new(0.5, -0.40, 0.0, 0.0, 0.0),
                Segment::new(0.5, -0.02, 0.0, 0.0, 0.0),
            ],
            1_000.0,
        )
    }

    // ====== Driver selection ======

    #[test]
    fn standard_drivers_track_the_scenario_shape() {
        let plain = standard_drivers(&linear_scenario());
        assert!(!plain.iter().any(|d| matches!(d, Driver::TierRefPrice(_))));
        assert!(!plain.iter().any(|d| matches!(d, Driver::SegmentTilt { .. })));
        assert_eq!(plain.len(), 10);

        let anchored = linear_scenario().with_ref_prices(TierMap::new(11.0, 21.0, 31.0));
        assert_eq!(
            standard_drivers(&anchored)
                .iter()
                .filter(|d| matches!(d, Driver::TierRefPrice(_)))
                .count(),
            3
        );

        let tilted = standard_drivers(&mixed_scenario());
        assert!(tilted.contains(&Driver::SegmentTilt { from: 0, to: 1 }));
    }

    // ====== Individual shocks ======

    #[test]
    fn price_shock_moves_profit_in_both_directions() {
        let impact = driver_impact(
            &linear_scenario(),
            &Constraints::default(),
            &TornadoConfig::default(),
            Driver::TierPrice(Tier::Good),
        );

        assert!(impact.down_delta.abs() > 1.0);
        assert!(impact.up_delta.abs() > 1.0);
        assert!(impact.magnitude() > 1.0);
    }

    #[test]
    fn zero_percentage_saturates_on_the_way_down() {
        // Leakages start at zero, so the downward shock clamps to no-op
        // while the upward shock costs real pocket revenue.
        let impact = driver_impact(
            &linear_scenario(),
            &Constraints::default(),
            &TornadoConfig::default(),
            Driver::PaymentPct,
        );

        assert_relative_eq!(impact.down_delta, 0.0);
        assert!(impact.up_delta < 0.0);
    }

    #[test]
    fn cost_shock_is_linear_in_units() {
        // Costs do not move shares, so the profit delta is exactly
        // -units * shock on the up side and +units * shock down.
        let scenario = linear_scenario();
        let config = TornadoConfig::default();
        let impact = driver_impact(
            &scenario,
            &Constraints::default(),
            &config,
            Driver::TierCost(Tier::Better),
        );

        let units = scenario.population * scenario.shares().better;
        assert_relative_eq!(
            impact.up_delta,
            -units * config.cost_shock,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            impact.down_delta,
            units * config.cost_shock,
            max_relative = 1e-9
        );
    }

    #[test]
    fn tilt_towards_the_premium_segment_lifts_profit() {
        // Segment 1 is far less price sensitive, so shifting weight to it
        // raises expected profit at these prices.
        let impact = driver_impact(
            &mixed_scenario(),
            &Constraints::default(),
            &TornadoConfig::default(),
            Driver::SegmentTilt { from: 0, to: 1 },
        );

        assert!(impact.up_delta > 0.0);
        assert!(impact.down_delta < 0.0);
    }

    #[test]
    fn oversized_tilt_clamps_instead_of_going_negative() {
        let config = TornadoConfig::default().with_tilt_shock(5.0);
        let impact = driver_impact(
            &mixed_scenario(),
            &Constraints::default(),
            &config,
            Driver::SegmentTilt { from: 0, to: 1 },
        );

        assert!(impact.up_delta.is_finite());
        assert!(impact.down_delta.is_finite());
    }

    #[test]
    fn self_tilt_and_out_of_range_tilt_are_no_ops() {
        let scenario = mixed_scenario();
        let config = TornadoConfig::default();
        for driver in [
            Driver::SegmentTilt { from: 1, to: 1 },
            Driver::SegmentTilt { from: 0, to: 9 },
        ] {
            let impact = driver_impact(&scenario, &Constraints::default(), &config, driver);
            assert_relative_eq!(impact.up_delta, 0.0);
            assert_relative_eq!(impact.down_delta, 0.0);
        }
    }

    // ====== Full tornado ======

    #[test]
    fn impacts_come_back_sorted_by_magnitude() {
        let impacts = tornado(
            &linear_scenario(),
            &Constraints::default(),
            &TornadoConfig::default(),
        );

        assert_eq!(impacts.len(), 10);
        for pair in impacts.windows(2) {
            assert!(pair[0].magnitude() >= pair[1].magnitude());
        }
        // A $1 price move dwarfs a one-point percentage move here.
        assert!(matches!(
            impacts[0].driver,
            Driver::TierPrice(_) | Driver::TierCost(_)
        ));
    }

    #[test]
    fn revenue_metric_ignores_costs() {
        let impacts = tornado(
            &linear_scenario(),
            &Constraints::default(),
            &TornadoConfig::revenue(),
        );

        let cost_impact = impacts
            .iter()
            .find(|i| i.driver == Driver::TierCost(Tier::Good))
            .unwrap();
        assert_relative_eq!(cost_impact.up_delta, 0.0);
        assert_relative_eq!(cost_impact.down_delta, 0.0);
    }

    #[test]
    fn display_floor_lifts_only_the_displayed_value() {
        let impact = DriverImpact {
            driver: Driver::FxPct,
            down_delta: 0.2,
            up_delta: -0.1,
        };

        assert_relative_eq!(impact.magnitude(), 0.2);
        assert_relative_eq!(impact.display_magnitude(5.0), 5.0);
        assert_relative_eq!(impact.display_magnitude(0.01), 0.2);
    }

    #[test]
    fn drivers_serialise_camel_case() {
        let json = serde_json::to_string(&Driver::SegmentTilt { from: 0, to: 1 }).unwrap();
        assert_eq!(json, "{\"segmentTilt\":{\"from\":0,\"to\":1}}");

        let json = serde_json::to_string(&Driver::TierPrice(Tier::Best)).unwrap();
        assert_eq!(json, "{\"tierPrice\":\"best\"}");

        let back: Driver = serde_json::from_str("\"paymentPct\"").unwrap();
        assert_eq!(back, Driver::PaymentPct);
    }
}
