//! Training: per-worker trainers and the concurrent manager.
//!
//! The scheduling hierarchy is epoch -> generation -> episode -> step.
//! `Trainer` owns one episode at a time; `TrainerManager` owns the
//! worker pool, the per-worker mutexes, and the snapshot protocol.

pub mod manager;
pub mod snapshot;
pub mod trainer;

pub use manager::{SessionReport, SnapshotHandle, TrainerManager};
pub use snapshot::{BestWorker, TrainingSnapshot, WorkerSnapshot};
pub use trainer::{
    EpisodeEnd, EpisodeFitness, PredictionRecord, StepOutcome, Trainer, TrainerStatus,
};
