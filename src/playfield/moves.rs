//! Move representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Card;

use super::pile::PileId;

/// A single move: a subject card from one pile to another.
///
/// Constructed per decision and never owned by a pile; applying it is
/// the playfield's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub card: Card,
    pub from: PileId,
    pub to: PileId,
}

impl Move {
    /// Create a move.
    #[must_use]
    pub fn new(card: Card, from: PileId, to: PileId) -> Self {
        Self { card, from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.card, self.from, self.to)
    }
}

/// What applying a move did, beyond the transfer itself. Input to scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub mv: Move,

    /// The move exposed a previously face-down tableau card.
    pub revealed: bool,
}
