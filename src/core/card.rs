//! Card identity: suit, rank, derived color.
//!
//! `Card` is an immutable `Copy` value type. Visibility (face-up /
//! face-down) is pile state, not card state - see `playfield::Pile`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four suits of a standard deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// All suits in deck-construction order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    /// Color of this suit: clubs and spades are black, hearts and
    /// diamonds are red.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Suit::Clubs | Suit::Spades => Color::Black,
            Suit::Hearts | Suit::Diamonds => Color::Red,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suit::Hearts => "Hearts",
            Suit::Diamonds => "Diamonds",
            Suit::Clubs => "Clubs",
            Suit::Spades => "Spades",
        };
        write!(f, "{name}")
    }
}

/// Card color, derived from suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

/// Card rank, 1 (ace) through 13 (king).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(u8);

impl Rank {
    pub const ACE: Rank = Rank(1);
    pub const JACK: Rank = Rank(11);
    pub const QUEEN: Rank = Rank(12);
    pub const KING: Rank = Rank(13);

    /// Create a rank. Panics if outside 1..=13.
    #[must_use]
    pub fn new(value: u8) -> Self {
        assert!((1..=13).contains(&value), "Rank must be 1..=13, got {value}");
        Rank(value)
    }

    /// Numeric value, 1..=13.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The rank one above this one, or `None` for king.
    #[must_use]
    pub fn successor(self) -> Option<Rank> {
        if self.0 < 13 {
            Some(Rank(self.0 + 1))
        } else {
            None
        }
    }

    /// All ranks in ascending order (ace first).
    pub fn all() -> impl Iterator<Item = Rank> {
        (1..=13).map(Rank)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => write!(f, "Ace"),
            11 => write!(f, "Jack"),
            12 => write!(f, "Queen"),
            13 => write!(f, "King"),
            n => write!(f, "{n}"),
        }
    }
}

/// A playing card: immutable (suit, rank) identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    /// Create a card.
    #[must_use]
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Derived color.
    #[must_use]
    pub fn color(self) -> Color {
        self.suit.color()
    }

    /// True if this card is an ace.
    #[must_use]
    pub fn is_ace(self) -> bool {
        self.rank == Rank::ACE
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors() {
        assert_eq!(Suit::Clubs.color(), Color::Black);
        assert_eq!(Suit::Spades.color(), Color::Black);
        assert_eq!(Suit::Hearts.color(), Color::Red);
        assert_eq!(Suit::Diamonds.color(), Color::Red);
    }

    #[test]
    fn test_rank_display() {
        assert_eq!(Rank::ACE.to_string(), "Ace");
        assert_eq!(Rank::new(7).to_string(), "7");
        assert_eq!(Rank::JACK.to_string(), "Jack");
        assert_eq!(Rank::QUEEN.to_string(), "Queen");
        assert_eq!(Rank::KING.to_string(), "King");
    }

    #[test]
    fn test_card_display() {
        let card = Card::new(Suit::Spades, Rank::ACE);
        assert_eq!(card.to_string(), "Ace of Spades");
    }

    #[test]
    #[should_panic(expected = "Rank must be 1..=13")]
    fn test_rank_out_of_range() {
        let _ = Rank::new(14);
    }

    #[test]
    fn test_successor() {
        assert_eq!(Rank::ACE.successor(), Some(Rank::new(2)));
        assert_eq!(Rank::KING.successor(), None);
    }
}
