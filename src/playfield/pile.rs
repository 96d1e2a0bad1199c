//! Piles: typed card stacks with visibility tracking.
//!
//! A pile exclusively owns its cards while they reside in it; ownership
//! transfers atomically through `Playfield::apply_move`. Visibility
//! (face-up / face-down) lives here rather than on the card because it
//! is positional state: the same card is face-down under a tableau
//! stack and face-up once exposed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Card;

/// The four pile kinds. Move validation dispatches exhaustively over
/// this tag - there is no "any pile" fallback path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PileKind {
    Tableau,
    Foundation,
    Stock,
    Waste,
}

/// Stable identity of a pile within the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PileId {
    pub kind: PileKind,
    pub index: u8,
}

impl PileId {
    /// One of the 7 tableau piles.
    #[must_use]
    pub fn tableau(index: u8) -> Self {
        assert!(index < 7, "Tableau index must be 0..7, got {index}");
        Self { kind: PileKind::Tableau, index }
    }

    /// One of the 4 foundation piles.
    #[must_use]
    pub fn foundation(index: u8) -> Self {
        assert!(index < 4, "Foundation index must be 0..4, got {index}");
        Self { kind: PileKind::Foundation, index }
    }

    /// The stock (draw) pile.
    #[must_use]
    pub fn stock() -> Self {
        Self { kind: PileKind::Stock, index: 0 }
    }

    /// The waste (face-up discard) pile.
    #[must_use]
    pub fn waste() -> Self {
        Self { kind: PileKind::Waste, index: 0 }
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PileKind::Tableau => write!(f, "tableau[{}]", self.index),
            PileKind::Foundation => write!(f, "foundation[{}]", self.index),
            PileKind::Stock => write!(f, "stock"),
            PileKind::Waste => write!(f, "waste"),
        }
    }
}

/// An ordered pile of cards plus a parallel face-up flag per card.
///
/// The two vectors move in lockstep; `push`/`pop` are the only
/// mutation points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    id: PileId,
    cards: Vec<Card>,
    face_up: Vec<bool>,
}

impl Pile {
    /// Create an empty pile.
    #[must_use]
    pub fn new(id: PileId) -> Self {
        Self {
            id,
            cards: Vec::new(),
            face_up: Vec::new(),
        }
    }

    /// This pile's identity.
    #[must_use]
    pub fn id(&self) -> PileId {
        self.id
    }

    /// Add a card to the top.
    pub fn push(&mut self, card: Card, face_up: bool) {
        self.cards.push(card);
        self.face_up.push(face_up);
    }

    /// Remove and return the top card and its visibility.
    pub fn pop(&mut self) -> Option<(Card, bool)> {
        let card = self.cards.pop()?;
        let up = self.face_up.pop().unwrap_or(true);
        Some((card, up))
    }

    /// The top card, if any.
    #[must_use]
    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    /// Whether the top card is face-up. `None` for an empty pile.
    #[must_use]
    pub fn top_face_up(&self) -> Option<bool> {
        self.face_up.last().copied()
    }

    /// Turn the top card face-up. Returns true if it was face-down.
    pub fn flip_top_up(&mut self) -> bool {
        match self.face_up.last_mut() {
            Some(up) if !*up => {
                *up = true;
                true
            }
            _ => false,
        }
    }

    /// Number of cards in the pile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the pile holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All cards, bottom first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Whether this pile contains the given card.
    #[must_use]
    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rank, Suit};

    fn card(suit: Suit, rank: u8) -> Card {
        Card::new(suit, Rank::new(rank))
    }

    #[test]
    fn test_push_pop_lockstep() {
        let mut pile = Pile::new(PileId::tableau(0));
        pile.push(card(Suit::Hearts, 5), false);
        pile.push(card(Suit::Spades, 9), true);

        assert_eq!(pile.len(), 2);
        assert_eq!(pile.top(), Some(card(Suit::Spades, 9)));
        assert_eq!(pile.top_face_up(), Some(true));

        let (popped, up) = pile.pop().unwrap();
        assert_eq!(popped, card(Suit::Spades, 9));
        assert!(up);
        assert_eq!(pile.top_face_up(), Some(false));
    }

    #[test]
    fn test_flip_top_up() {
        let mut pile = Pile::new(PileId::tableau(0));
        pile.push(card(Suit::Clubs, 3), false);

        assert!(pile.flip_top_up());
        assert!(!pile.flip_top_up()); // already up
        assert_eq!(pile.top_face_up(), Some(true));
    }

    #[test]
    fn test_pile_id_display() {
        assert_eq!(PileId::tableau(3).to_string(), "tableau[3]");
        assert_eq!(PileId::foundation(0).to_string(), "foundation[0]");
        assert_eq!(PileId::stock().to_string(), "stock");
        assert_eq!(PileId::waste().to_string(), "waste");
    }

    #[test]
    #[should_panic(expected = "Tableau index")]
    fn test_tableau_index_bounds() {
        let _ = PileId::tableau(7);
    }
}
