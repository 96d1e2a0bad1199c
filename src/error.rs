//! Error taxonomy for the engine.
//!
//! Three tiers with different blast radii:
//! - `MoveError` - a rejected move. Expected during training, recorded
//!   by the trainer, never fatal.
//! - `GameError` - a broken structural invariant. Fatal to the current
//!   episode only; the episode is aborted and reported.
//! - `ConfigError` / `SessionError` - surfaced synchronously to the
//!   caller; a bad config never spawns a single worker.

use crate::core::Card;
use crate::playfield::PileId;

/// Why a move was rejected. Non-fatal: the trainer records it and the
/// episode continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("{card} is not in the playfield")]
    CardNotFound { card: Card },

    #[error("{card} is not the top card of {pile}")]
    NotTopCard { card: Card, pile: PileId },

    #[error("{card} in {pile} is face down")]
    FaceDown { card: Card, pile: PileId },

    #[error("{card} cannot go on {pile}: needs opposite color, one rank higher on top")]
    TableauMismatch { card: Card, pile: PileId },

    #[error("only an ace may start an empty foundation, not {card}")]
    FoundationNeedsAce { card: Card },

    #[error("{card} cannot go on {pile}: foundations build up by one in the same suit")]
    FoundationMismatch { card: Card, pile: PileId },

    #[error("only the stock top card may be drawn to the waste")]
    NotADraw,

    #[error("the stock only accepts the waste top card once the stock is exhausted")]
    StockDestination,
}

/// A broken game invariant. Fatal to the episode, contained by the worker.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("card conservation broken: expected 52 cards, found {found}")]
    CardCountMismatch { found: usize },

    #[error("duplicate card detected: {card}")]
    DuplicateCard { card: Card },
}

/// Invalid configuration. Surfaced before any concurrency starts.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("worker count must be >= 1, got {requested}")]
    InvalidThreadCount { requested: usize },

    #[error("stacked probability must be within [0, 1], got {requested}")]
    InvalidStackedProbability { requested: f64 },

    #[error("per-episode move budget must be >= 1")]
    InvalidMoveBudget,

    #[error("policy population is empty")]
    EmptyPopulation,

    #[error("population size {population} does not match worker count {workers}")]
    PopulationSizeMismatch { population: usize, workers: usize },
}

/// Session-level failure from the trainer manager. `WorkerFailure`
/// records are also collected per epoch and carried in the session
/// report; only `PopulationExhausted` ends the run.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("worker {worker_id} failed: {detail}")]
    WorkerFailure { worker_id: usize, detail: String },

    #[error("all workers died; no population left to rank")]
    PopulationExhausted,
}
