//! Lifecycle tests for the run manager: tagging, supersession, watchdogs,
//! and cooperative cancellation over a synthetic transaction log.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ladder_core::math::softmax_stable;
use ladder_core::types::{Constraints, SearchRanges, Tier, TierMap};
use ladder_estimator::{EmConfig, EstimationError, ObservationRow, ProgressCallback};
use ladder_models::scenario::Scenario;
use ladder_models::segments::Segment;
use ladder_optimiser::GridSearchConfig;
use ladder_service::{RunError, RunManager, ServiceConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Single-population log: mild price aversion over a spread of menus.
fn synthetic_log(count: u64, seed: u64) -> Vec<ObservationRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(count as usize * 4);
    for obs_id in 0..count {
        let base = 6.0 + rng.gen::<f64>() * 12.0;
        let menu = [
            (Tier::Good, base),
            (Tier::Better, base * 2.0),
            (Tier::Best, base * 3.0),
        ];
        let utilities = [
            0.0,
            2.0 - 0.25 * menu[0].1,
            2.5 - 0.25 * menu[1].1,
            3.0 - 0.25 * menu[2].1,
        ];
        let probabilities = softmax_stable(&utilities);
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;
        let mut chosen = 3;
        for (slot, p) in probabilities.iter().enumerate() {
            cumulative += p;
            if draw < cumulative {
                chosen = slot;
                break;
            }
        }

        let mut occasion = vec![ObservationRow::opt_out(obs_id)];
        for (tier, price) in menu {
            occasion.push(ObservationRow::tier(obs_id, tier, price));
        }
        occasion[chosen].chosen = true;
        rows.extend(occasion);
    }
    rows
}

fn pricing_scenario() -> Scenario {
    Scenario::new(
        TierMap::new(10.0, 20.0, 30.0),
        TierMap::new(4.0, 8.0, 12.0),
        vec![Segment::new(1.0, -0.1, 0.0, 0.0, 0.0)],
        1_000.0,
    )
}

fn small_ranges() -> SearchRanges {
    SearchRanges::uniform(8.0, 32.0, 4.0)
}

// ====== Tagging and supersession ======

#[tokio::test]
async fn a_fit_comes_back_tagged_and_accepted() {
    init_tracing();
    let manager = RunManager::with_defaults();
    let rows = synthetic_log(150, 3);

    let outcome = manager.fit_em(EmConfig::fast(), rows).await.unwrap();
    assert_eq!(outcome.run.value(), 1);
    assert!(manager.is_current(outcome.run));

    let fit = manager.accept(outcome).unwrap();
    assert_eq!(fit.class_count(), 1);
    assert!(fit.classes[0].beta_price < 0.0);
}

#[tokio::test]
async fn a_newer_run_makes_the_old_result_stale() {
    let manager = RunManager::with_defaults();

    let first = manager
        .optimise(
            GridSearchConfig::fast(),
            pricing_scenario(),
            small_ranges(),
            Constraints::default(),
        )
        .await
        .unwrap();
    let second = manager
        .optimise(
            GridSearchConfig::fast(),
            pricing_scenario(),
            small_ranges(),
            Constraints::default(),
        )
        .await
        .unwrap();

    assert!(!manager.is_current(first.run));
    match manager.accept(first).unwrap_err() {
        RunError::Superseded { run, latest } => {
            assert_eq!(run.value(), 1);
            assert_eq!(latest.value(), 2);
        }
        other => panic!("expected Superseded, got {other:?}"),
    }

    let result = manager.accept(second).unwrap();
    assert!(result.is_feasible());
}

// ====== Watchdog ======

#[tokio::test]
async fn the_async_watchdog_aborts_a_slow_fit() {
    init_tracing();
    let manager = RunManager::with_defaults().with_watchdog(Duration::ZERO);
    let rows = synthetic_log(150, 5);

    let err = manager.fit_em(EmConfig::fast(), rows).await.unwrap_err();
    assert!(err.is_timeout());
    match err {
        RunError::Timeout { budget } => assert_eq!(budget, Duration::ZERO),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn the_worker_side_budget_also_maps_to_timeout() {
    let manager = RunManager::with_defaults();
    let rows = synthetic_log(150, 5);
    let config = EmConfig::fast().with_time_budget(Duration::ZERO);

    let err = manager.fit_em(config, rows).await.unwrap_err();
    assert!(err.is_timeout());
}

// ====== Cancellation ======

#[tokio::test]
async fn cancellation_lands_between_em_iterations() {
    init_tracing();
    let manager = RunManager::with_defaults();
    let rows = synthetic_log(800, 11);

    let worker = manager.clone();
    let handle = tokio::spawn(async move {
        worker
            .fit_em(EmConfig::default().with_classes(3), rows)
            .await
    });

    // Let the fit get into its EM loop before pulling the plug.
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(manager.cancel_current().await);

    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, RunError::Cancelled));
}

// ====== Worker pool ======

#[tokio::test]
async fn runs_queue_behind_a_single_worker() {
    let manager = RunManager::new(ServiceConfig::default().with_worker_threads(1));

    let (a, b) = tokio::join!(
        manager.optimise(
            GridSearchConfig::fast(),
            pricing_scenario(),
            small_ranges(),
            Constraints::default(),
        ),
        manager.optimise(
            GridSearchConfig::fast(),
            pricing_scenario(),
            small_ranges(),
            Constraints::default(),
        ),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert_ne!(a.run, b.run);
    assert_eq!(manager.latest().value(), 2);
}

// ====== Error passthrough and progress ======

#[tokio::test]
async fn data_errors_pass_through_unchanged() {
    let manager = RunManager::with_defaults();

    let err = manager
        .fit_em(EmConfig::fast(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::Estimation(EstimationError::NoChoices)
    ));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn progress_ticks_are_forwarded() {
    let manager = RunManager::with_defaults();
    let rows = synthetic_log(150, 7);

    let ticks: Arc<Mutex<Vec<(usize, f64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&ticks);
    let progress: ProgressCallback = Arc::new(move |iteration, log_likelihood| {
        sink.lock().unwrap().push((iteration, log_likelihood));
    });

    let outcome = manager
        .fit_em_with_progress(EmConfig::fast(), rows, Some(progress))
        .await
        .unwrap();
    assert!(manager.accept(outcome).is_ok());

    let ticks = ticks.lock().unwrap();
    assert!(!ticks.is_empty());
    assert!(ticks.iter().all(|(_, ll)| ll.is_finite()));
}
