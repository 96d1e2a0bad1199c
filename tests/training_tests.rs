//! Training session integration tests: configuration rejection,
//! full-session runs, and snapshot consistency under concurrency.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use solitaire_rl::{
    ConfigError, EncodedState, GameConfig, LinearPolicy, Policy, PolicyOutput, SessionError,
    SessionRng, SolitaireEncoder, StateEncoder, TrainConfig, TrainerManager, TrainerStatus,
    UniformPolicy, ACTION_SPACE,
};

/// A policy whose every prediction panics, for failure-containment tests.
#[derive(Clone, Debug)]
struct PanickingPolicy;

impl Policy for PanickingPolicy {
    fn predict(&self, _state: &EncodedState) -> PolicyOutput {
        panic!("synthetic policy failure");
    }

    fn mutate(&self, _rng: &mut SessionRng) -> Arc<dyn Policy> {
        Arc::new(Self)
    }

    fn loss_estimate(&self) -> f64 {
        1.0
    }

    fn lineage(&self) -> String {
        "root".to_string()
    }

    fn kind(&self) -> &'static str {
        "panicking"
    }

    fn export_params(&self) -> Vec<u8> {
        Vec::new()
    }
}

fn linear_population(count: usize, seed: u64) -> Vec<Arc<dyn Policy>> {
    let encoder = SolitaireEncoder::new();
    let features = encoder.output_shape()[0];
    let mut rng = SessionRng::new(seed);
    (0..count)
        .map(|_| Arc::new(LinearPolicy::new_random(&mut rng, features, ACTION_SPACE)) as Arc<dyn Policy>)
        .collect()
}

fn uniform_population(count: usize) -> Vec<Arc<dyn Policy>> {
    (0..count)
        .map(|_| Arc::new(UniformPolicy::new(ACTION_SPACE)) as Arc<dyn Policy>)
        .collect()
}

fn small_config(threads: usize, epochs: u64) -> TrainConfig {
    TrainConfig::new()
        .with_threads(threads)
        .with_max_epochs(epochs)
        .with_max_moves(60)
        .with_min_score(-30)
        .with_seed(99)
        .with_game(GameConfig::new().with_stacked_probability(1.0))
}

// =============================================================================
// Configuration Rejection Tests
// =============================================================================

#[test]
fn test_zero_threads_rejected_before_spawn() {
    let result = TrainerManager::new(
        small_config(0, 1),
        uniform_population(1),
        Arc::new(SolitaireEncoder::new()),
    );
    assert!(matches!(result, Err(ConfigError::InvalidThreadCount { .. })));
}

#[test]
fn test_empty_population_rejected() {
    let result = TrainerManager::new(
        small_config(2, 1),
        Vec::new(),
        Arc::new(SolitaireEncoder::new()),
    );
    assert!(matches!(result, Err(ConfigError::EmptyPopulation)));
}

#[test]
fn test_population_size_must_match_workers() {
    let result = TrainerManager::new(
        small_config(3, 1),
        uniform_population(2),
        Arc::new(SolitaireEncoder::new()),
    );
    assert!(matches!(
        result,
        Err(ConfigError::PopulationSizeMismatch { population: 2, workers: 3 })
    ));
}

// =============================================================================
// Session Tests
// =============================================================================

#[test]
fn test_full_session_produces_report() {
    let mut manager = TrainerManager::new(
        small_config(2, 3),
        linear_population(2, 7),
        Arc::new(SolitaireEncoder::new()),
    )
    .unwrap();
    assert_eq!(manager.worker_count(), 2);

    let report = manager.run().unwrap();
    assert_eq!(report.epochs_run, 3);

    let best = report.best.expect("a live population always ranks a best worker");
    assert!(best.worker_id < 2);
    assert!(best.generation >= 1);
    assert!(!report.best_params.is_empty());
    assert!(report.best_lineage.is_some());
    assert!(report.worker_failures.is_empty());
}

#[test]
fn test_stop_before_run_means_zero_epochs() {
    let mut manager = TrainerManager::new(
        small_config(2, 50),
        uniform_population(2),
        Arc::new(SolitaireEncoder::new()),
    )
    .unwrap();

    manager.handle().request_stop();
    let report = manager.run().unwrap();
    assert_eq!(report.epochs_run, 0);
    assert!(report.best.is_none());
}

#[test]
fn test_every_worker_terminates_each_epoch() {
    let mut manager = TrainerManager::new(
        small_config(3, 2),
        uniform_population(3),
        Arc::new(SolitaireEncoder::new()),
    )
    .unwrap();
    let handle = manager.handle();

    manager.run().unwrap();

    let snapshot = handle.snapshot();
    for worker in &snapshot.workers {
        assert!(
            matches!(worker.status, TrainerStatus::Terminated(_)),
            "worker {} left in {:?}",
            worker.worker_id,
            worker.status
        );
    }
    assert_eq!(snapshot.epoch, 2);
    assert_eq!(snapshot.generation, 2);
}

// =============================================================================
// Worker Failure Containment Tests
// =============================================================================

/// One worker's policy panics on every prediction: that worker ends up
/// dead and reported, the rest of the pool trains on, and the best
/// worker is chosen from the survivors.
#[test]
fn test_panicking_worker_is_contained() {
    let mut population = uniform_population(3);
    population[0] = Arc::new(PanickingPolicy);

    let mut manager = TrainerManager::new(
        small_config(3, 3),
        population,
        Arc::new(SolitaireEncoder::new()),
    )
    .unwrap();
    let handle = manager.handle();

    let report = manager.run().unwrap();
    assert_eq!(report.epochs_run, 3);

    assert_eq!(report.worker_failures.len(), 1);
    assert!(matches!(
        report.worker_failures[0],
        SessionError::WorkerFailure { worker_id: 0, .. }
    ));

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.workers[0].status, TrainerStatus::Dead);
    for worker in &snapshot.workers[1..] {
        assert!(matches!(worker.status, TrainerStatus::Terminated(_)));
    }

    let best = report.best.expect("survivors still rank a best worker");
    assert_ne!(best.worker_id, 0);
}

/// Once every worker has died the session fails instead of spinning.
#[test]
fn test_all_workers_dead_exhausts_population() {
    let population: Vec<Arc<dyn Policy>> = (0..2)
        .map(|_| Arc::new(PanickingPolicy) as Arc<dyn Policy>)
        .collect();

    let mut manager = TrainerManager::new(
        small_config(2, 5),
        population,
        Arc::new(SolitaireEncoder::new()),
    )
    .unwrap();

    let err = manager.run().unwrap_err();
    assert!(matches!(err, SessionError::PopulationExhausted));
}

// =============================================================================
// Concurrent Snapshot Tests
// =============================================================================

/// Hammer the snapshot path from the main thread while a session runs:
/// at least a thousand reads, every one internally consistent, and no
/// worker's generation ever moving backwards between snapshots.
#[test]
fn test_snapshots_are_consistent_during_run() {
    let workers = 4;
    let mut manager = TrainerManager::new(
        small_config(workers, 30),
        linear_population(workers, 11),
        Arc::new(SolitaireEncoder::new()),
    )
    .unwrap();
    let handle = manager.handle();

    let (done_tx, done_rx) = mpsc::channel();
    let runner = thread::spawn(move || {
        let result = manager.run();
        let _ = done_tx.send(());
        result
    });

    let mut last_generation = vec![0u64; workers];
    let mut taken = 0u32;
    let mut done = false;
    while !done || taken < 1000 {
        done = done || done_rx.try_recv().is_ok();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.workers.len(), workers);

        for worker in &snapshot.workers {
            assert!(
                worker.invalid_moves <= worker.moves,
                "worker {} counted more invalid attempts than attempts",
                worker.worker_id
            );
            if let Some(prediction) = worker.last_prediction {
                assert!(prediction.total_moves <= worker.moves);
            }
            assert!(
                worker.generation >= last_generation[worker.worker_id],
                "worker {} generation moved backwards",
                worker.worker_id
            );
            last_generation[worker.worker_id] = worker.generation;
        }

        taken += 1;
        if taken > 5000 {
            handle.request_stop();
        }
        thread::yield_now();
    }

    let report = runner.join().expect("manager thread panicked").unwrap();
    assert!(taken >= 1000);
    assert!(report.epochs_run <= 30);
}

/// A stop request lands at a generation boundary: the run ends early
/// but never mid-episode.
#[test]
fn test_stop_request_ends_session_at_boundary() {
    let mut manager = TrainerManager::new(
        small_config(2, 10_000),
        uniform_population(2),
        Arc::new(SolitaireEncoder::new()),
    )
    .unwrap();
    let handle = manager.handle();

    let runner = thread::spawn(move || manager.run());

    // Let at least one epoch land, then pull the plug.
    loop {
        if handle.snapshot().epoch >= 1 {
            break;
        }
        thread::yield_now();
    }
    handle.request_stop();

    let report = runner.join().expect("manager thread panicked").unwrap();
    assert!(report.epochs_run >= 1);
    assert!(report.epochs_run < 10_000);

    for worker in &handle.snapshot().workers {
        assert!(matches!(worker.status, TrainerStatus::Terminated(_)));
    }
}
