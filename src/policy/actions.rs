//! Fixed action space: (source pile, destination pile) pairs.
//!
//! Policies emit scores over a fixed-size vector; this module maps
//! indices to concrete moves. With 13 piles there are 13 x 13 = 169
//! indices. Many decode to illegal moves (empty source, self-move,
//! rule violation) - the trainer treats those as expected invalid
//! attempts, not errors.

use crate::game::Game;
use crate::playfield::{Move, PileId};

/// Number of piles in ordinal order: 7 tableaus, 4 foundations, stock, waste.
pub const PILE_COUNT: usize = 13;

/// Total number of action indices.
pub const ACTION_SPACE: usize = PILE_COUNT * PILE_COUNT;

/// Ordinal of a pile in the fixed action-space ordering.
#[must_use]
pub fn pile_ordinal(id: PileId) -> usize {
    use crate::playfield::PileKind::*;
    match id.kind {
        Tableau => id.index as usize,
        Foundation => 7 + id.index as usize,
        Stock => 11,
        Waste => 12,
    }
}

/// Pile for an ordinal. Panics if out of range.
#[must_use]
pub fn pile_from_ordinal(ordinal: usize) -> PileId {
    match ordinal {
        0..=6 => PileId::tableau(ordinal as u8),
        7..=10 => PileId::foundation((ordinal - 7) as u8),
        11 => PileId::stock(),
        12 => PileId::waste(),
        _ => panic!("Pile ordinal must be 0..13, got {ordinal}"),
    }
}

/// Action index for a (source, destination) pair.
#[must_use]
pub fn encode_action(from: PileId, to: PileId) -> usize {
    pile_ordinal(from) * PILE_COUNT + pile_ordinal(to)
}

/// Decode an action index into a concrete move against the current
/// game state. The subject is the source pile's top card.
///
/// Returns `None` when the source pile is empty or the index names a
/// self-move; legality of the result is still the playfield's call.
#[must_use]
pub fn decode_action(game: &Game, index: usize) -> Option<Move> {
    if index >= ACTION_SPACE {
        return None;
    }
    let from = pile_from_ordinal(index / PILE_COUNT);
    let to = pile_from_ordinal(index % PILE_COUNT);
    if from == to {
        return None;
    }
    let card = game.playfield().pile(from).top()?;
    Some(Move::new(card, from, to))
}
