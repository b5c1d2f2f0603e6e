//! Net-price waterfall: ordered deductions from list price to pocket price.
//!
//! The deduction order is fixed and part of the contract: promo and volume
//! discounts come off the list price, payment and FX costs off the running
//! net, refunds off the list price again. Every deduction is rounded to
//! cents before it is subtracted, so the breakdown reconciles exactly
//! against reported currency amounts.

use crate::math::{round2, safe_div};
use crate::types::leakages::Leakages;
use crate::types::tier::Tier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named deduction in the waterfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    /// Promotional discount, applied against list price.
    Promo,
    /// Volume discount, applied against list price.
    Volume,
    /// Payment processing percentage, applied against running net.
    PaymentPct,
    /// Flat payment fee per unit.
    PaymentFixed,
    /// Foreign-exchange percentage, applied against running net.
    Fx,
    /// Refunds, applied against list price.
    Refunds,
}

impl StepKind {
    /// Waterfall steps in application order.
    pub const ORDER: [StepKind; 6] = [
        StepKind::Promo,
        StepKind::Volume,
        StepKind::PaymentPct,
        StepKind::PaymentFixed,
        StepKind::Fx,
        StepKind::Refunds,
    ];

    /// Display label for charts and tables.
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Promo => "Promo",
            StepKind::Volume => "Volume",
            StepKind::PaymentPct => "Payment %",
            StepKind::PaymentFixed => "Payment fixed",
            StepKind::Fx => "FX",
            StepKind::Refunds => "Refunds",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One applied deduction: the kind plus its (non-positive) delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallStep {
    /// Which deduction this is.
    pub kind: StepKind,
    /// Signed change to the running net; a deduction is negative.
    pub delta: f64,
}

impl WaterfallStep {
    fn deduct(kind: StepKind, amount: f64) -> Self {
        // Avoid -0.0 in serialised breakdowns.
        let delta = if amount == 0.0 { 0.0 } else { -amount };
        Self { kind, delta }
    }
}

/// Full list-to-pocket breakdown for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PocketBreakdown {
    /// List price the waterfall started from.
    pub list: f64,
    /// The six deductions in application order.
    pub steps: Vec<WaterfallStep>,
    /// Residual pocket price after all deductions.
    pub pocket: f64,
}

impl PocketBreakdown {
    /// Pocket price as a fraction of list price (epsilon-guarded).
    pub fn pocket_ratio(&self) -> f64 {
        safe_div(self.pocket, self.list)
    }

    /// Total value leaked between list and pocket.
    pub fn total_leakage(&self) -> f64 {
        self.list - self.pocket
    }

    /// Delta for one step kind.
    pub fn delta(&self, kind: StepKind) -> f64 {
        self.steps
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.delta)
            .unwrap_or(0.0)
    }
}

/// Converts a list price into a pocket price via the ordered deductions.
///
/// Promo, volume, and refunds are percentages of the list price; payment and
/// FX percentages apply to the running net; the fixed payment fee is flat.
/// Each deduction is rounded to cents before subtraction. Fractions are used
/// as supplied; callers holding unvalidated input should run
/// [`Leakages::clamped`] first.
///
/// # Arguments
/// * `list` - List price for the tier
/// * `tier` - Which tier's promo/volume fractions apply
/// * `leakages` - Deduction fractions and fees
///
/// # Returns
/// The full [`PocketBreakdown`]; `pocket <= list` whenever all fractions are
/// non-negative, and the step deltas always sum to `pocket - list`.
pub fn pocket_price(list: f64, tier: Tier, leakages: &Leakages) -> PocketBreakdown {
    let mut steps = Vec::with_capacity(6);
    let mut net = list;

    let promo = round2(list * leakages.promo.get(tier));
    net -= promo;
    steps.push(WaterfallStep::deduct(StepKind::Promo, promo));

    let volume = round2(list * leakages.volume.get(tier));
    net -= volume;
    steps.push(WaterfallStep::deduct(StepKind::Volume, volume));

    let payment_pct = round2(net * leakages.payment_pct);
    net -= payment_pct;
    steps.push(WaterfallStep::deduct(StepKind::PaymentPct, payment_pct));

    let payment_fixed = round2(leakages.payment_fixed);
    net -= payment_fixed;
    steps.push(WaterfallStep::deduct(StepKind::PaymentFixed, payment_fixed));

    let fx = round2(net * leakages.fx_pct);
    net -= fx;
    steps.push(WaterfallStep::deduct(StepKind::Fx, fx));

    let refunds = round2(list * leakages.refunds_pct);
    net -= refunds;
    steps.push(WaterfallStep::deduct(StepKind::Refunds, refunds));

    PocketBreakdown {
        list,
        steps,
        pocket: net,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tier::TierMap;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn reference_leakages() -> Leakages {
        Leakages {
            promo: TierMap::splat(0.05),
            volume: TierMap::splat(0.03),
            payment_pct: 0.029,
            payment_fixed: 0.10,
            fx_pct: 0.01,
            refunds_pct: 0.02,
        }
    }

    // ====== Reference breakdown ======

    #[test]
    fn reference_breakdown_matches_hand_computation() {
        let breakdown = pocket_price(100.0, Tier::Good, &reference_leakages());

        let expected = [-5.00, -3.00, -2.67, -0.10, -0.89, -2.00];
        for (step, want) in breakdown.steps.iter().zip(expected.iter()) {
            assert_relative_eq!(step.delta, *want, epsilon = 1e-9);
        }
        assert_relative_eq!(breakdown.pocket, 86.34, epsilon = 1e-9);
        assert_relative_eq!(breakdown.total_leakage(), 13.66, epsilon = 1e-9);
    }

    #[test]
    fn steps_come_back_in_application_order() {
        let breakdown = pocket_price(100.0, Tier::Good, &reference_leakages());
        let kinds: Vec<StepKind> = breakdown.steps.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, StepKind::ORDER.to_vec());
    }

    #[test]
    fn zero_leakages_leave_list_untouched() {
        let breakdown = pocket_price(49.99, Tier::Best, &Leakages::none());
        assert_eq!(breakdown.pocket, 49.99);
        assert!(breakdown.steps.iter().all(|s| s.delta == 0.0));
        assert_relative_eq!(breakdown.pocket_ratio(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn promo_and_volume_are_tier_specific() {
        let mut leakages = Leakages::none();
        leakages.promo.good = 0.10;
        leakages.promo.best = 0.20;

        let good = pocket_price(100.0, Tier::Good, &leakages);
        let best = pocket_price(100.0, Tier::Best, &leakages);
        assert_relative_eq!(good.delta(StepKind::Promo), -10.0, epsilon = 1e-9);
        assert_relative_eq!(best.delta(StepKind::Promo), -20.0, epsilon = 1e-9);
    }

    #[test]
    fn percentage_steps_use_the_documented_basis() {
        // Payment % applies after promo/volume, refunds against list.
        let mut leakages = Leakages::none();
        leakages.promo = TierMap::splat(0.50);
        leakages.payment_pct = 0.10;
        leakages.refunds_pct = 0.10;

        let breakdown = pocket_price(100.0, Tier::Better, &leakages);
        assert_relative_eq!(breakdown.delta(StepKind::PaymentPct), -5.0, epsilon = 1e-9);
        assert_relative_eq!(breakdown.delta(StepKind::Refunds), -10.0, epsilon = 1e-9);
        assert_relative_eq!(breakdown.pocket, 35.0, epsilon = 1e-9);
    }

    // ====== Properties ======

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn pocket_never_exceeds_list(
            list in 0.0f64..10_000.0,
            promo in 0.0f64..1.0,
            volume in 0.0f64..1.0,
            payment_pct in 0.0f64..1.0,
            payment_fixed in 0.0f64..5.0,
            fx_pct in 0.0f64..1.0,
            refunds_pct in 0.0f64..1.0,
        ) {
            let leakages = Leakages {
                promo: TierMap::splat(promo),
                volume: TierMap::splat(volume),
                payment_pct,
                payment_fixed,
                fx_pct,
                refunds_pct,
            };
            let breakdown = pocket_price(list, Tier::Good, &leakages);

            prop_assert!(breakdown.pocket <= list + 1e-9);

            let delta_sum: f64 = breakdown.steps.iter().map(|s| s.delta).sum();
            prop_assert!((delta_sum - (breakdown.pocket - list)).abs() < 1e-9);
        }

        #[test]
        fn deductions_stay_non_positive_while_net_is_positive(
            list in 100.0f64..10_000.0,
            promo in 0.0f64..0.3,
            volume in 0.0f64..0.3,
            payment_pct in 0.0f64..0.3,
            payment_fixed in 0.0f64..2.0,
            fx_pct in 0.0f64..0.3,
            refunds_pct in 0.0f64..0.3,
        ) {
            let leakages = Leakages {
                promo: TierMap::splat(promo),
                volume: TierMap::splat(volume),
                payment_pct,
                payment_fixed,
                fx_pct,
                refunds_pct,
            };
            let breakdown = pocket_price(list, Tier::Good, &leakages);
            prop_assert!(breakdown.steps.iter().all(|s| s.delta <= 0.0));
        }
    }
}
