//! Single-candidate feasibility and profit evaluation.
//!
//! One ladder in, one verdict out. The evaluation always computes margins,
//! shares, and profit — even for infeasible candidates — so the
//! unconstrained track and the frontier sweep can rank candidates that the
//! guardrails reject. `feasible` plus the first violation encode the
//! verdict.

use ladder_core::math::safe_div;
use ladder_core::types::{ChoiceShares, Constraints, Ladder, Tier, TierMap};
use ladder_core::waterfall::pocket_price;
use ladder_models::choice::choice_shares;
use ladder_models::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First guardrail a candidate ladder tripped.
///
/// Checked in a fixed order: tier gaps, margin floors (in ladder order),
/// opt-out ceiling, take-rate floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Violation {
    /// `better < good + gapGB` or `best < better + gapBB`.
    Gap,
    /// The named tier's margin fell below its floor.
    MarginFloor(Tier),
    /// Predicted opt-out share exceeded `maxNoneShare`.
    NoneShare,
    /// Combined paid-tier share fell below `minTakeRate`.
    TakeRate,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Gap => write!(f, "tier gap"),
            Violation::MarginFloor(tier) => write!(f, "margin floor ({tier})"),
            Violation::NoneShare => write!(f, "opt-out ceiling"),
            Violation::TakeRate => write!(f, "take-rate floor"),
        }
    }
}

/// Full evaluation of one candidate ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvaluation {
    /// The candidate prices.
    pub ladder: Ladder,
    /// Margin per tier on the configured margin basis.
    pub margins: TierMap<f64>,
    /// Predicted choice shares at these prices.
    pub shares: ChoiceShares,
    /// Expected units per tier (`population × share`).
    pub units: TierMap<f64>,
    /// Expected revenue on the profit basis.
    pub revenue: f64,
    /// Expected profit on the profit basis.
    pub profit: f64,
    /// True when every guardrail passed.
    pub feasible: bool,
    /// First guardrail tripped, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
}

/// Evaluates one candidate ladder against a scenario's guardrails.
///
/// The scenario supplies costs, features, segments, reference prices,
/// leakages, and the population; its own ladder is ignored in favour of
/// `candidate`. Margins use the pocket basis when
/// `constraints.use_pocket_margins` is set, list price otherwise; profit
/// and revenue follow `constraints.use_pocket_profit` the same way.
pub fn evaluate_candidate(
    scenario: &Scenario,
    candidate: &Ladder,
    constraints: &Constraints,
) -> CandidateEvaluation {
    let pocket = candidate.map(|tier, &list| pocket_price(list, tier, &scenario.leakages).pocket);
    let margin_basis = if constraints.use_pocket_margins {
        &pocket
    } else {
        candidate
    };
    let profit_basis = if constraints.use_pocket_profit {
        &pocket
    } else {
        candidate
    };

    let margins =
        margin_basis.map(|tier, &basis| safe_div(basis - scenario.costs.get(tier), basis));
    let shares = choice_shares(
        candidate,
        &scenario.features,
        &scenario.segments,
        scenario.ref_prices.as_ref(),
    );
    let units = candidate.map(|tier, _| scenario.population * shares.tier(tier));

    let mut revenue = 0.0;
    let mut profit = 0.0;
    for tier in Tier::ALL {
        let basis = *profit_basis.get(tier);
        let sold = *units.get(tier);
        revenue += sold * basis;
        profit += sold * (basis - scenario.costs.get(tier));
    }

    let violation = first_violation(candidate, &margins, &shares, constraints);
    CandidateEvaluation {
        ladder: *candidate,
        margins,
        shares,
        units,
        revenue,
        profit,
        feasible: violation.is_none(),
        violation,
    }
}

fn first_violation(
    candidate: &Ladder,
    margins: &TierMap<f64>,
    shares: &ChoiceShares,
    constraints: &Constraints,
) -> Option<Violation> {
    if !constraints.gaps_ok(candidate.good, candidate.better, candidate.best) {
        return Some(Violation::Gap);
    }
    for tier in Tier::ALL {
        if *margins.get(tier) < *constraints.margin_floor.get(tier) {
            return Some(Violation::MarginFloor(tier));
        }
    }
    if shares.none > constraints.max_none_share {
        return Some(Violation::NoneShare);
    }
    if shares.take_rate() < constraints.min_take_rate {
        return Some(Violation::TakeRate);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ladder_core::types::{Costs, Leakages};
    use ladder_models::segments::Segment;

    fn reference_scenario() -> Scenario {
        Scenario::new(
            Ladder {
                good: 10.0,
                better: 20.0,
                best: 30.0,
            },
            Costs {
                good: 4.0,
                better: 8.0,
                best: 12.0,
            },
            vec![Segment::new(1.0, -0.1, 0.0, 0.0, 0.0)],
            1_000.0,
        )
    }

    // ====== Margin feasibility ======

    #[test]
    fn list_margins_clear_a_thirty_percent_floor() {
        let scenario = reference_scenario();
        let constraints = Constraints::default()
            .with_pocket_basis(false, false)
            .with_margin_floor(0.30);
        let eval = evaluate_candidate(&scenario, &scenario.ladder, &constraints);

        for tier in Tier::ALL {
            assert_relative_eq!(*eval.margins.get(tier), 0.60, epsilon = 1e-12);
        }
        assert!(eval.feasible);
        assert_eq!(eval.violation, None);
    }

    #[test]
    fn raised_floor_rejects_every_tier() {
        let scenario = reference_scenario();
        let constraints = Constraints::default()
            .with_pocket_basis(false, false)
            .with_margin_floor(0.65);
        let eval = evaluate_candidate(&scenario, &scenario.ladder, &constraints);

        assert!(!eval.feasible);
        assert_eq!(eval.violation, Some(Violation::MarginFloor(Tier::Good)));
    }

    #[test]
    fn pocket_basis_lowers_margins() {
        let mut scenario = reference_scenario();
        scenario.leakages = Leakages {
            payment_pct: 0.10,
            ..Leakages::none()
        };
        let on_list = evaluate_candidate(
            &scenario,
            &scenario.ladder,
            &Constraints::default().with_pocket_basis(false, false),
        );
        let on_pocket = evaluate_candidate(
            &scenario,
            &scenario.ladder,
            &Constraints::default().with_pocket_basis(true, false),
        );

        for tier in Tier::ALL {
            assert!(on_pocket.margins.get(tier) < on_list.margins.get(tier));
        }
    }

    // ====== Gap ordering ======

    #[test]
    fn gap_violation_wins_over_margin_violation() {
        let scenario = reference_scenario();
        let constraints = Constraints::default()
            .with_gaps(15.0, 0.0)
            .with_margin_floor(0.99);
        let eval = evaluate_candidate(&scenario, &scenario.ladder, &constraints);
        assert_eq!(eval.violation, Some(Violation::Gap));
    }

    // ====== Share guardrails ======

    #[test]
    fn expensive_ladder_trips_the_opt_out_ceiling() {
        let scenario = reference_scenario();
        let pricey = Ladder {
            good: 60.0,
            better: 80.0,
            best: 100.0,
        };
        let constraints = Constraints::default().with_max_none_share(0.50);
        let eval = evaluate_candidate(&scenario, &pricey, &constraints);

        assert!(eval.shares.none > 0.9);
        assert_eq!(eval.violation, Some(Violation::NoneShare));
    }

    #[test]
    fn take_rate_floor_uses_the_paid_share() {
        let scenario = reference_scenario();
        let pricey = Ladder {
            good: 60.0,
            better: 80.0,
            best: 100.0,
        };
        let constraints = Constraints::default().with_min_take_rate(0.50);
        let eval = evaluate_candidate(&scenario, &pricey, &constraints);
        assert_eq!(eval.violation, Some(Violation::TakeRate));
    }

    // ====== Profit arithmetic ======

    #[test]
    fn profit_and_revenue_follow_units_times_basis() {
        let scenario = reference_scenario();
        let eval = evaluate_candidate(&scenario, &scenario.ladder, &Constraints::default());

        let mut expected_profit = 0.0;
        let mut expected_revenue = 0.0;
        for tier in Tier::ALL {
            let units = 1_000.0 * eval.shares.tier(tier);
            assert_relative_eq!(*eval.units.get(tier), units, epsilon = 1e-9);
            expected_revenue += units * eval.ladder.get(tier);
            expected_profit += units * (eval.ladder.get(tier) - scenario.costs.get(tier));
        }
        assert_relative_eq!(eval.revenue, expected_revenue, epsilon = 1e-9);
        assert_relative_eq!(eval.profit, expected_profit, epsilon = 1e-9);
        // One price-only segment on the 10/20/30 ladder keeps roughly a
        // third of the population paying.
        assert!(eval.shares.take_rate() > 0.30 && eval.shares.take_rate() < 0.45);
    }

    #[test]
    fn infeasible_candidates_still_carry_profit() {
        let scenario = reference_scenario();
        let constraints = Constraints::default().with_margin_floor(0.99);
        let eval = evaluate_candidate(&scenario, &scenario.ladder, &constraints);
        assert!(!eval.feasible);
        assert!(eval.profit > 0.0);
    }

    // ====== Serde ======

    #[test]
    fn evaluation_serialises_camel_case() {
        let scenario = reference_scenario();
        let eval = evaluate_candidate(&scenario, &scenario.ladder, &Constraints::default());
        let json = serde_json::to_string(&eval).unwrap();
        assert!(json.contains("\"feasible\":true"));
        assert!(!json.contains("violation"));
        assert!(json.contains("\"revenue\""));
    }
}
