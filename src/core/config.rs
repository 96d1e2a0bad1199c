//! Session and game configuration.
//!
//! Everything tunable lives here: scoring weights, deal bias, episode
//! budgets, and the worker/generation schedule. Configs are plain serde
//! structs with builder-style `with_*` methods; validation happens once,
//! synchronously, before any worker thread is spawned.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Per-move scoring weights.
///
/// The default scheme: +10 for a card reaching a foundation, +5 for a
/// move that exposes a previously face-down tableau card, -2 for a card
/// cycled back toward the stock/waste path. Weights are data, not code,
/// so experiments can tune them without touching rule logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Card moved to a foundation.
    pub foundation: i64,
    /// Move exposed a face-down tableau card.
    pub reveal: i64,
    /// Card moved back into the stock/waste cycle.
    pub waste_return: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            foundation: 10,
            reveal: 5,
            waste_return: -2,
        }
    }
}

/// Configuration for dealing and scoring a single game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Probability that a shuffle produces the deterministic stacked
    /// (more winnable) ordering instead of a uniform permutation.
    pub stacked_probability: f64,

    /// Scoring weights applied by `Game::play`.
    pub score: ScoreWeights,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stacked_probability: 0.5,
            score: ScoreWeights::default(),
        }
    }
}

impl GameConfig {
    /// Create a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stacked-deck probability.
    #[must_use]
    pub fn with_stacked_probability(mut self, p: f64) -> Self {
        self.stacked_probability = p;
        self
    }

    /// Set the scoring weights.
    #[must_use]
    pub fn with_score_weights(mut self, weights: ScoreWeights) -> Self {
        self.score = weights;
        self
    }
}

/// Configuration for a training session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Number of worker threads (one trainer per worker). Must be >= 1.
    pub threads: usize,

    /// Number of epochs (generation cycles) to run.
    pub max_epochs: u64,

    /// Episode move budget; invalid attempts count against it.
    pub max_moves: u32,

    /// Episode score floor; an episode ends once score falls to or below it.
    pub min_score: i64,

    /// How many candidate actions a trainer tries per step before
    /// giving the step up as a no-op.
    pub fallback_candidates: usize,

    /// Sample from the policy distribution instead of taking the argmax.
    pub sample_actions: bool,

    /// Session RNG seed.
    pub seed: u64,

    /// Deal/scoring configuration shared by every worker's game copy.
    pub game: GameConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            max_epochs: 100,
            max_moves: 100,
            min_score: -50,
            fallback_candidates: 8,
            sample_actions: false,
            seed: 0,
            game: GameConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Create a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the epoch cap.
    #[must_use]
    pub fn with_max_epochs(mut self, epochs: u64) -> Self {
        self.max_epochs = epochs;
        self
    }

    /// Set the per-episode move budget.
    #[must_use]
    pub fn with_max_moves(mut self, moves: u32) -> Self {
        self.max_moves = moves;
        self
    }

    /// Set the per-episode score floor.
    #[must_use]
    pub fn with_min_score(mut self, floor: i64) -> Self {
        self.min_score = floor;
        self
    }

    /// Set the session seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the game config.
    #[must_use]
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Validate the config. Called by the manager before spawning anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::InvalidThreadCount { requested: self.threads });
        }
        if !(0.0..=1.0).contains(&self.game.stacked_probability) {
            return Err(ConfigError::InvalidStackedProbability {
                requested: self.game.stacked_probability,
            });
        }
        if self.max_moves == 0 {
            return Err(ConfigError::InvalidMoveBudget);
        }
        Ok(())
    }
}
