//! Playfield: pile layout, move validation, scoring.

pub mod field;
pub mod moves;
pub mod pile;

pub use field::{MoveList, Playfield};
pub use moves::{Move, MoveOutcome};
pub use pile::{Pile, PileId, PileKind};
