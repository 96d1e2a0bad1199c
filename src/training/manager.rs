//! TrainerManager: the worker pool and its scheduling hierarchy.
//!
//! Epoch -> generation -> episode -> step. One mutex per worker, fixed
//! index order for the whole session. Workers only ever take their own
//! lock, one step at a time; the snapshot reader is the single
//! multi-lock consumer and always acquires in ascending index order, so
//! no cyclic wait can form. Generation boundaries drain the pool
//! completely (blocking join) before the population is touched.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::{debug, info, warn};

use crate::core::{SessionRng, TrainConfig};
use crate::error::{ConfigError, SessionError};
use crate::game::Game;
use crate::policy::{Policy, StateEncoder};

use super::snapshot::{BestWorker, TrainingSnapshot, WorkerSnapshot};
use super::trainer::{EpisodeFitness, Trainer, TrainerStatus};

/// State shared between the manager, its workers, and snapshot readers.
struct Shared {
    /// One slot per worker; index order is the lock order.
    slots: Vec<Mutex<Trainer>>,
    /// Best-worker identity; lookup only, never owns the trainer.
    best: Mutex<Option<BestWorker>>,
    epoch: AtomicU64,
    generation: AtomicU64,
    /// External stop request, honored only at generation boundaries.
    stop_requested: AtomicBool,
}

impl Shared {
    /// Lock one slot, recovering from poisoning (the worker that
    /// poisoned it is marked dead separately).
    fn lock_slot(&self, index: usize) -> MutexGuard<'_, Trainer> {
        self.slots[index].lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only handle for polling snapshots from another thread while
/// the manager runs.
#[derive(Clone)]
pub struct SnapshotHandle {
    shared: Arc<Shared>,
}

impl SnapshotHandle {
    /// Take a globally consistent snapshot.
    ///
    /// Acquires mutex 0..N-1 in strictly ascending order, reads every
    /// trainer, then releases. Blocks at most one worker step per slot.
    #[must_use]
    pub fn snapshot(&self) -> TrainingSnapshot {
        let guards: Vec<MutexGuard<'_, Trainer>> = (0..self.shared.slots.len())
            .map(|i| self.shared.lock_slot(i))
            .collect();

        let workers = guards
            .iter()
            .map(|trainer| WorkerSnapshot {
                worker_id: trainer.worker_id(),
                generation: trainer.generation(),
                status: trainer.status(),
                score: trainer.score(),
                moves: trainer.moves(),
                invalid_moves: trainer.invalid_moves(),
                loss_rate: trainer.loss(),
                lineage: trainer.lineage(),
                policy_kind: trainer.policy_kind().to_string(),
                last_prediction: trainer.last_prediction(),
            })
            .collect();
        drop(guards);

        let best = *self
            .shared
            .best
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        TrainingSnapshot {
            epoch: self.shared.epoch.load(Ordering::SeqCst),
            generation: self.shared.generation.load(Ordering::SeqCst),
            best,
            workers,
        }
    }

    /// Request a session stop. Takes effect at the next generation
    /// boundary, after the current generation fully drains.
    pub fn request_stop(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);
    }
}

/// Final report of a training session.
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub epochs_run: u64,
    pub best: Option<BestWorker>,
    /// The best policy's exported parameters (format owned by the
    /// policy capability).
    pub best_params: Vec<u8>,
    pub best_lineage: Option<String>,
    /// One `SessionError::WorkerFailure` per dead worker. Failures are
    /// contained per worker; the session only errors when every worker
    /// dies.
    pub worker_failures: Vec<SessionError>,
}

/// Owns the worker pool for the lifetime of a training session.
pub struct TrainerManager {
    shared: Arc<Shared>,
    config: TrainConfig,
    rng: SessionRng,
    best_policy: Option<Arc<dyn Policy>>,
    worker_failures: Vec<SessionError>,
}

impl TrainerManager {
    /// Create a manager with one trainer per worker.
    ///
    /// Fails synchronously - before any thread exists - on an invalid
    /// config, an empty population, or a population/worker mismatch.
    pub fn new(
        config: TrainConfig,
        population: Vec<Arc<dyn Policy>>,
        encoder: Arc<dyn StateEncoder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if population.is_empty() {
            return Err(ConfigError::EmptyPopulation);
        }
        if population.len() != config.threads {
            return Err(ConfigError::PopulationSizeMismatch {
                population: population.len(),
                workers: config.threads,
            });
        }

        let mut rng = SessionRng::new(config.seed);
        let slots = population
            .into_iter()
            .enumerate()
            .map(|(i, policy)| {
                Mutex::new(Trainer::new(i, policy, Arc::clone(&encoder), rng.fork(), &config))
            })
            .collect();

        Ok(Self {
            shared: Arc::new(Shared {
                slots,
                best: Mutex::new(None),
                epoch: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                stop_requested: AtomicBool::new(false),
            }),
            config,
            rng,
            best_policy: None,
            worker_failures: Vec::new(),
        })
    }

    /// Handle for snapshot polling and stop requests from other threads.
    #[must_use]
    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle { shared: Arc::clone(&self.shared) }
    }

    /// Number of workers.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.shared.slots.len()
    }

    /// Run the session: epochs until the cap or a stop request.
    pub fn run(&mut self) -> Result<SessionReport, SessionError> {
        let mut epochs_run = 0;
        for _ in 0..self.config.max_epochs {
            if self.shared.stop_requested.load(Ordering::SeqCst) {
                info!(epochs_run, "stop requested; ending session at generation boundary");
                break;
            }
            self.run_epoch()?;
            epochs_run += 1;
        }

        let best = *self
            .shared
            .best
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let best_params = self
            .best_policy
            .as_ref()
            .map(|p| p.export_params())
            .unwrap_or_default();
        let best_lineage = self.best_policy.as_ref().map(|p| p.lineage());

        Ok(SessionReport {
            epochs_run,
            best,
            best_params,
            best_lineage,
            worker_failures: std::mem::take(&mut self.worker_failures),
        })
    }

    /// One epoch: deal, distribute isolated copies, run every worker's
    /// episode to termination, drain, select, breed.
    pub fn run_epoch(&mut self) -> Result<(), SessionError> {
        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.shared.generation.load(Ordering::SeqCst);

        // One fresh deal; every trainer gets an independent deep copy.
        let mut game = Game::new(self.config.game);
        game.deal(&mut self.rng);

        for i in 0..self.shared.slots.len() {
            let mut trainer = self.shared.lock_slot(i);
            if trainer.status() != TrainerStatus::Dead {
                trainer.begin_episode(game.clone(), generation);
            }
        }

        debug!(epoch, generation, "epoch started");
        let handles = self.spawn_workers();

        // Blocking full drain: every worker runs its episode to
        // termination and exits; the population is never touched while
        // a worker could still observe it.
        for (i, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                warn!(worker_id = i, "worker thread panicked; marking dead");
                self.shared.lock_slot(i).mark_dead("worker thread panicked");
            }
        }
        self.collect_worker_failures(epoch);

        self.select_and_breed(epoch)
    }

    /// Turn this epoch's deaths into structured `WorkerFailure` records
    /// for the session report. Each failure is reported exactly once.
    fn collect_worker_failures(&mut self, epoch: u64) {
        for i in 0..self.shared.slots.len() {
            if let Some(detail) = self.shared.lock_slot(i).take_failure() {
                warn!(epoch, worker_id = i, detail, "worker failed; excluded from ranking");
                self.worker_failures
                    .push(SessionError::WorkerFailure { worker_id: i, detail });
            }
        }
    }

    /// Spawn one worker per live slot. Each iteration holds its own
    /// mutex for exactly one step.
    fn spawn_workers(&self) -> Vec<thread::JoinHandle<()>> {
        (0..self.shared.slots.len())
            .map(|i| {
                let shared = Arc::clone(&self.shared);
                thread::Builder::new()
                    .name(format!("trainer-{i}"))
                    .spawn(move || worker_loop(&shared, i))
                    .expect("failed to spawn worker thread")
            })
            .collect()
    }

    /// Generation boundary: rank fitness, update the best identity,
    /// install the next population.
    fn select_and_breed(&mut self, epoch: u64) -> Result<(), SessionError> {
        let mut ranked: Vec<(usize, EpisodeFitness)> = Vec::new();
        for i in 0..self.shared.slots.len() {
            let trainer = self.shared.lock_slot(i);
            if let Some(fitness) = trainer.fitness() {
                ranked.push((i, fitness));
            }
        }

        if ranked.is_empty() {
            // Every worker is dead or aborted; nothing left to rank.
            let any_alive = (0..self.shared.slots.len())
                .any(|i| self.shared.lock_slot(i).status() != TrainerStatus::Dead);
            if !any_alive {
                return Err(SessionError::PopulationExhausted);
            }
            warn!(epoch, "no rankable fitness this generation; population unchanged");
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }

        // Best by score descending, then fewest moves.
        ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score).then(a.1.moves.cmp(&b.1.moves)));
        let (best_idx, best_fitness) = ranked[0];

        let best_policy = Arc::clone(self.shared.lock_slot(best_idx).policy());
        let next_generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut best = self
                .shared
                .best
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *best = Some(BestWorker {
                worker_id: best_idx,
                generation: next_generation,
                score: best_fitness.score,
                moves: best_fitness.moves,
            });
        }
        self.best_policy = Some(Arc::clone(&best_policy));

        info!(
            epoch,
            generation = next_generation,
            best_worker = best_idx,
            best_score = best_fitness.score,
            best_moves = best_fitness.moves,
            reason = ?best_fitness.reason,
            "generation complete"
        );

        // Elitism: the best worker keeps its policy; everyone else gets
        // a mutated child of it.
        for i in 0..self.shared.slots.len() {
            let next = if i == best_idx {
                Arc::clone(&best_policy)
            } else {
                best_policy.mutate(&mut self.rng)
            };
            let mut trainer = self.shared.lock_slot(i);
            if trainer.status() != TrainerStatus::Dead {
                trainer.install_policy(next, next_generation);
            }
        }

        Ok(())
    }
}

/// Worker loop: one step per lock acquisition, lock released between
/// steps so the snapshot reader never waits long. Panics in a step are
/// contained; the trainer is marked dead and the loop exits.
fn worker_loop(shared: &Shared, index: usize) {
    loop {
        let mut trainer = shared.lock_slot(index);
        match trainer.status() {
            TrainerStatus::Running => {
                let step = catch_unwind(AssertUnwindSafe(|| trainer.step()));
                match step {
                    Ok(Ok(_)) => {}
                    Ok(Err(err)) => {
                        // Integrity failure: episode already aborted by
                        // the trainer; contained to this worker.
                        warn!(worker_id = index, error = %err, "episode aborted");
                    }
                    Err(_) => {
                        warn!(worker_id = index, "step panicked; marking trainer dead");
                        trainer.mark_dead("policy step panicked");
                        return;
                    }
                }
            }
            // Episode over (or never started): this generation's work
            // is done.
            TrainerStatus::Terminated(_) | TrainerStatus::Idle | TrainerStatus::Dead => {
                return;
            }
        }
        drop(trainer);
        // Lock is never held across steps; yield keeps the snapshot
        // reader's wait bounded to a single step.
        thread::yield_now();
    }
}
