//! Two-stage guarded grid search over candidate ladders.
//!
//! The coarse pass walks an exhaustive grid whose inner loops start at the
//! gap bound, so candidates that could never satisfy the ordering are not
//! generated at all. When the raw combination count exceeds the configured
//! ceiling the step is doubled until the grid fits, and the result is
//! flagged as coarsened. The top feasible candidates then seed a local
//! refinement at half the coarse step. Both passes feed one accounting
//! structure so the diagnostics reflect every candidate actually touched.

use crate::config::GridSearchConfig;
use crate::error::OptimiserError;
use crate::evaluate::{evaluate_candidate, CandidateEvaluation};
use crate::result::{OptimiserResult, SearchDiagnostics};
use ladder_core::math::snap_to_charm;
use ladder_core::types::{Constraints, Ladder, SearchRanges, Tier, TierMap, ValidationError};
use ladder_models::scenario::Scenario;
use std::cmp::Ordering;

/// Deterministic total order over evaluations: profit descending, ties
/// broken by the lowest ladder in `(good, better, best)` order. Using
/// `total_cmp` keeps the order well-defined for every float the search can
/// produce, which is what makes the parallel merge reproducible.
fn candidate_order(a: &CandidateEvaluation, b: &CandidateEvaluation) -> Ordering {
    b.profit
        .total_cmp(&a.profit)
        .then_with(|| a.ladder.good.total_cmp(&b.ladder.good))
        .then_with(|| a.ladder.better.total_cmp(&b.ladder.better))
        .then_with(|| a.ladder.best.total_cmp(&b.ladder.best))
}

/// Inclusive grid values `start, start + step, ...` up to `max`.
///
/// Values are computed from the index rather than accumulated, so long
/// ranges do not drift, and a small tolerance keeps an endpoint that lands
/// one rounding error short of `max` inside the grid.
fn grid_values(start: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if start > max {
        0
    } else {
        (((max - start) / step + 1e-9).floor() as u64).saturating_add(1)
    };
    (0..count).map(move |i| start + i as f64 * step)
}

fn apply_charm(price: f64, constraints: &Constraints) -> f64 {
    if constraints.charm {
        snap_to_charm(price)
    } else {
        price
    }
}

/// Accumulator shared by the coarse and refinement passes.
///
/// `top` holds at most `top_k` feasible evaluations sorted by
/// [`candidate_order`], deduplicated by ladder so charm snapping cannot
/// fill the list with copies of one candidate. Merging two outcomes is
/// associative and commutative, which lets the parallel pass reduce
/// per-axis results in any order.
#[derive(Debug, Clone)]
struct ScanOutcome {
    tested: u64,
    skipped: u64,
    top: Vec<CandidateEvaluation>,
    best_unconstrained: Option<CandidateEvaluation>,
}

impl ScanOutcome {
    fn empty() -> Self {
        Self {
            tested: 0,
            skipped: 0,
            top: Vec::new(),
            best_unconstrained: None,
        }
    }

    /// Folds one evaluated candidate in.
    fn record(&mut self, evaluation: CandidateEvaluation, top_k: usize) {
        self.tested += 1;
        if self
            .best_unconstrained
            .as_ref()
            .map_or(true, |held| candidate_order(&evaluation, held) == Ordering::Less)
        {
            self.best_unconstrained = Some(evaluation.clone());
        }
        if evaluation.feasible {
            Self::push_top(&mut self.top, evaluation, top_k);
        } else {
            self.skipped += 1;
        }
    }

    /// Counts a candidate rejected by the gap re-check after snapping,
    /// without evaluating it.
    fn record_gap_skip(&mut self) {
        self.tested += 1;
        self.skipped += 1;
    }

    fn push_top(top: &mut Vec<CandidateEvaluation>, candidate: CandidateEvaluation, top_k: usize) {
        if top.iter().any(|held| held.ladder == candidate.ladder) {
            return;
        }
        let at = top
            .binary_search_by(|held| candidate_order(held, &candidate))
            .unwrap_or_else(|insert| insert);
        top.insert(at, candidate);
        top.truncate(top_k);
    }

    fn merge(mut self, other: ScanOutcome, top_k: usize) -> ScanOutcome {
        self.tested += other.tested;
        self.skipped += other.skipped;
        for candidate in other.top {
            Self::push_top(&mut self.top, candidate, top_k);
        }
        self.best_unconstrained = match (self.best_unconstrained.take(), other.best_unconstrained) {
            (Some(held), Some(incoming)) => {
                if candidate_order(&incoming, &held) == Ordering::Less {
                    Some(incoming)
                } else {
                    Some(held)
                }
            }
            (held, incoming) => held.or(incoming),
        };
        self
    }
}

/// Two-stage guarded grid search.
///
/// Wraps a [`GridSearchConfig`] and exposes [`GridSearch::run`], which
/// returns the best feasible ladder, the profit-only fallback, and the work
/// accounting for one scenario. The search itself holds no other state, so
/// one instance can serve any number of runs.
///
/// # Examples
///
/// ```rust
/// use ladder_core::types::{Constraints, SearchRanges, TierMap};
/// use ladder_models::presets::example_blend;
/// use ladder_models::scenario::Scenario;
/// use ladder_optimiser::GridSearch;
///
/// let scenario = Scenario::new(
///     TierMap::new(10.0, 20.0, 30.0),
///     TierMap::new(4.0, 8.0, 12.0),
///     example_blend(),
///     1_000.0,
/// );
/// let ranges = SearchRanges::uniform(5.0, 40.0, 1.0);
/// let constraints = Constraints::default().with_gaps(2.0, 2.0);
///
/// let result = GridSearch::with_defaults()
///     .run(&scenario, &ranges, &constraints)
///     .unwrap();
/// assert!(result.is_feasible());
/// ```
#[derive(Debug, Clone)]
pub struct GridSearch {
    config: GridSearchConfig,
}

impl GridSearch {
    /// Builds a search with the given configuration.
    pub fn new(config: GridSearchConfig) -> Self {
        Self { config }
    }

    /// Builds a search with [`GridSearchConfig::default`].
    pub fn with_defaults() -> Self {
        Self::new(GridSearchConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &GridSearchConfig {
        &self.config
    }

    /// Runs the search for one scenario.
    ///
    /// An empty grid or an empty feasible set is not an error: the result
    /// comes back with `best` (and possibly `best_unconstrained`) unset and
    /// the diagnostics explain how much work was done. Errors are reserved
    /// for inputs the search cannot meaningfully walk.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Costs, segments, leakages, and population; its own
    ///   ladder is ignored in favour of the grid candidates
    /// * `ranges` - Per-tier bounds and the requested step
    /// * `constraints` - Guardrails every candidate is checked against
    ///
    /// # Errors
    ///
    /// [`OptimiserError::InvalidRange`] for a non-positive, non-finite, or
    /// inverted bound; [`OptimiserError::InvalidPopulation`] for an
    /// unusable population; [`OptimiserError::Invalid`] when the step,
    /// configuration, constraints, or scenario fail validation.
    pub fn run(
        &self,
        scenario: &Scenario,
        ranges: &SearchRanges,
        constraints: &Constraints,
    ) -> Result<OptimiserResult, OptimiserError> {
        self.validate_inputs(scenario, ranges, constraints)?;

        let mut coarse_step = ranges.step;
        let mut coarsened = false;
        while ranges.combinations(coarse_step) > self.config.combo_ceiling {
            coarse_step *= 2.0;
            coarsened = true;
        }
        if coarsened {
            tracing::debug!(
                requested_step = ranges.step,
                coarse_step,
                ceiling = self.config.combo_ceiling,
                "coarsened grid to fit the combination ceiling"
            );
        }

        let mut outcome = self.coarse_pass(scenario, ranges, constraints, coarse_step);
        tracing::debug!(
            tested = outcome.tested,
            skipped = outcome.skipped,
            seeds = outcome.top.len(),
            "coarse pass complete"
        );

        let refine_step = coarse_step / 2.0;
        self.refine(scenario, ranges, constraints, refine_step, &mut outcome);

        let best = outcome.top.first().cloned();
        if best.is_none() {
            tracing::warn!(
                tested = outcome.tested,
                "no candidate satisfied every guardrail"
            );
        }
        Ok(OptimiserResult {
            best,
            best_unconstrained: outcome.best_unconstrained,
            diagnostics: SearchDiagnostics {
                tested: outcome.tested,
                skipped: outcome.skipped,
                coarsened,
                coarse_step,
                refine_step,
            },
        })
    }

    fn validate_inputs(
        &self,
        scenario: &Scenario,
        ranges: &SearchRanges,
        constraints: &Constraints,
    ) -> Result<(), OptimiserError> {
        self.config.validate()?;
        for (tier, range) in ranges.ranges.iter() {
            if !range.min.is_finite()
                || !range.max.is_finite()
                || range.min <= 0.0
                || range.min > range.max
            {
                return Err(OptimiserError::invalid_range(tier, range.min, range.max));
            }
        }
        if !ranges.step.is_finite() || ranges.step <= 0.0 {
            return Err(ValidationError::InvalidStep { step: ranges.step }.into());
        }
        if !scenario.population.is_finite() || scenario.population <= 0.0 {
            return Err(OptimiserError::invalid_population(scenario.population));
        }
        constraints.validate()?;
        scenario.validate()?;
        Ok(())
    }

    /// Walks the gap-pruned grid, fanning the `good` axis across threads.
    #[cfg(feature = "parallel")]
    fn coarse_pass(
        &self,
        scenario: &Scenario,
        ranges: &SearchRanges,
        constraints: &Constraints,
        step: f64,
    ) -> ScanOutcome {
        use rayon::prelude::*;

        let good = ranges.tier(Tier::Good);
        let goods: Vec<f64> = grid_values(good.min, good.max, step).collect();
        let top_k = self.config.top_k;
        goods
            .par_iter()
            .map(|&good_raw| self.scan_good_axis(scenario, ranges, constraints, step, good_raw))
            .reduce(ScanOutcome::empty, |left, right| left.merge(right, top_k))
    }

    /// Walks the gap-pruned grid on the current thread.
    #[cfg(not(feature = "parallel"))]
    fn coarse_pass(
        &self,
        scenario: &Scenario,
        ranges: &SearchRanges,
        constraints: &Constraints,
        step: f64,
    ) -> ScanOutcome {
        let good = ranges.tier(Tier::Good);
        let top_k = self.config.top_k;
        grid_values(good.min, good.max, step)
            .map(|good_raw| self.scan_good_axis(scenario, ranges, constraints, step, good_raw))
            .fold(ScanOutcome::empty(), |left, right| left.merge(right, top_k))
    }

    /// Evaluates every gap-respecting `(better, best)` pair for one `good`
    /// grid value.
    ///
    /// The inner loops start at `max(previous + gap, range.min)`, so the
    /// grid each tier walks depends on the tier below it. Charm snapping is
    /// applied to the assembled candidate, after which the gaps are checked
    /// again because snapping can pull adjacent prices back together.
    fn scan_good_axis(
        &self,
        scenario: &Scenario,
        ranges: &SearchRanges,
        constraints: &Constraints,
        step: f64,
        good_raw: f64,
    ) -> ScanOutcome {
        let mut outcome = ScanOutcome::empty();
        let better_range = ranges.tier(Tier::Better);
        let best_range = ranges.tier(Tier::Best);
        let good = apply_charm(good_raw, constraints);

        let better_start = (good_raw + constraints.gap_gb).max(better_range.min);
        for better_raw in grid_values(better_start, better_range.max, step) {
            let better = apply_charm(better_raw, constraints);
            let best_start = (better_raw + constraints.gap_bb).max(best_range.min);
            for best_raw in grid_values(best_start, best_range.max, step) {
                let best = apply_charm(best_raw, constraints);
                if !constraints.gaps_ok(good, better, best) {
                    outcome.record_gap_skip();
                    continue;
                }
                let candidate = TierMap::new(good, better, best);
                outcome.record(
                    evaluate_candidate(scenario, &candidate, constraints),
                    self.config.top_k,
                );
            }
        }
        outcome
    }

    /// Re-searches a one-step neighbourhood around each surviving seed.
    ///
    /// Neighbours are clamped back into the configured ranges before charm
    /// snapping, and the seed itself is not revisited. Refinement runs even
    /// when the grid was not coarsened; at `step / 2` it is what lets a
    /// coarse winner settle between coarse grid lines.
    fn refine(
        &self,
        scenario: &Scenario,
        ranges: &SearchRanges,
        constraints: &Constraints,
        refine_step: f64,
        outcome: &mut ScanOutcome,
    ) {
        let seeds: Vec<Ladder> = outcome.top.iter().map(|held| held.ladder).collect();
        let offsets = [-refine_step, 0.0, refine_step];
        for seed in seeds {
            for (gi, dg) in offsets.iter().enumerate() {
                for (bi, db) in offsets.iter().enumerate() {
                    for (si, ds) in offsets.iter().enumerate() {
                        if gi == 1 && bi == 1 && si == 1 {
                            continue;
                        }
                        let good = apply_charm(
                            ranges.tier(Tier::Good).clamp(seed.good + dg),
                            constraints,
                        );
                        let better = apply_charm(
                            ranges.tier(Tier::Better).clamp(seed.better + db),
                            constraints,
                        );
                        let best = apply_charm(
                            ranges.tier(Tier::Best).clamp(seed.best + ds),
                            constraints,
                        );
                        if !constraints.gaps_ok(good, better, best) {
                            outcome.record_gap_skip();
                            continue;
                        }
                        let candidate = TierMap::new(good, better, best);
                        outcome.record(
                            evaluate_candidate(scenario, &candidate, constraints),
                            self.config.top_k,
                        );
                    }
                }
            }
        }
    }
}
