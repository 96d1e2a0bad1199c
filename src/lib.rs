//! # solitaire-rl
//!
//! A solitaire self-play engine for evolutionary policy training.
//!
//! ## Design Principles
//!
//! 1. **Deterministic rules, stochastic training**: the game state
//!    machine is pure and total; all randomness flows through one
//!    seeded, forkable RNG.
//!
//! 2. **Policies are capabilities**: the trainer obtains moves and
//!    fitness through the `Policy`/`StateEncoder` traits and never
//!    inspects model internals.
//!
//! 3. **Per-worker locking**: each worker's trainer sits behind its own
//!    mutex. Workers take only their own lock, one step at a time; the
//!    snapshot reader is the single multi-lock consumer and always
//!    acquires in ascending index order, which rules out deadlock by
//!    construction.
//!
//! ## Modules
//!
//! - `core`: cards, deck, deterministic RNG, configuration
//! - `playfield`: piles, move validation, atomic move application, scoring
//! - `game`: deal, move, termination predicates, history
//! - `policy`: the external policy capability boundary plus baselines
//! - `training`: trainer, trainer manager, snapshot protocol
//! - `dashboard`: pure snapshot-to-text rendering
//! - `error`: the crate's error taxonomy

pub mod core;
pub mod dashboard;
pub mod error;
pub mod game;
pub mod playfield;
pub mod policy;
pub mod training;

// Re-export commonly used types
pub use crate::core::{Card, Color, Deck, GameConfig, Rank, ScoreWeights, SessionRng, Suit, TrainConfig};

pub use crate::playfield::{Move, MoveOutcome, Pile, PileId, PileKind, Playfield};

pub use crate::game::Game;

pub use crate::policy::{
    decode_action, encode_action, EncodedState, Experience, LinearPolicy, Policy, PolicyOutput,
    SolitaireEncoder, StateEncoder, UniformPolicy, ZeroEncoder, ACTION_SPACE,
};

pub use crate::training::{
    BestWorker, EpisodeEnd, EpisodeFitness, PredictionRecord, SessionReport, SnapshotHandle,
    StepOutcome, Trainer, TrainerManager, TrainerStatus, TrainingSnapshot, WorkerSnapshot,
};

pub use crate::error::{ConfigError, GameError, MoveError, SessionError};
