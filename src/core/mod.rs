//! Core types: cards, the deck, deterministic RNG, configuration.
//!
//! These are the game-agnostic building blocks the rest of the engine
//! is assembled from.

pub mod card;
pub mod config;
pub mod deck;
pub mod rng;

pub use card::{Card, Color, Rank, Suit};
pub use config::{GameConfig, ScoreWeights, TrainConfig};
pub use deck::Deck;
pub use rng::SessionRng;
