//! Snapshot records: the read-only dashboard poll contract.
//!
//! A snapshot is taken by acquiring every worker mutex in ascending
//! index order, so each per-worker record reflects a single step - no
//! torn state - and the whole set is globally consistent. Consumers
//! (the dashboard) render snapshots as pure functions; they never call
//! back into the engine.

use serde::{Deserialize, Serialize};

use super::trainer::{PredictionRecord, TrainerStatus};

/// Identity and fitness of the current best worker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestWorker {
    pub worker_id: usize,
    pub generation: u64,
    pub score: i64,
    pub moves: u32,
}

/// One worker's state at snapshot time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub worker_id: usize,
    pub generation: u64,
    pub status: TrainerStatus,
    pub score: i64,
    pub moves: u32,
    pub invalid_moves: u32,
    pub loss_rate: f64,
    pub lineage: String,
    pub policy_kind: String,
    pub last_prediction: Option<PredictionRecord>,
}

/// A globally consistent view of the whole worker pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingSnapshot {
    pub epoch: u64,
    pub generation: u64,
    pub best: Option<BestWorker>,
    pub workers: Vec<WorkerSnapshot>,
}
