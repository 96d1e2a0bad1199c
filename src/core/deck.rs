//! Deck construction and shuffling.
//!
//! `shuffle` supports a *stacked* mode: with the configured probability
//! the deck comes out in a deterministic rank-major, suit-minor order
//! (all four suits of rank 2, then rank 3, ... ace last), which biases
//! the deal toward winnable games. Otherwise the order is a uniform
//! random permutation. Training sessions tune this to control how often
//! workers see a solvable deal.

use serde::{Deserialize, Serialize};

use super::card::{Card, Rank, Suit};
use super::rng::SessionRng;

/// Rank order used for the stacked deck: 2..king, ace last.
fn stacked_ranks() -> impl Iterator<Item = Rank> {
    (2..=13).chain(std::iter::once(1)).map(Rank::new)
}

/// An ordered deck of cards. Cards are consumed from the front.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build the full 52-card deck, every (suit, rank) pair exactly once.
    #[must_use]
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::all() {
                cards.push(Card::new(suit, rank));
            }
        }
        Self { cards }
    }

    /// An empty deck (used for the dealt-out remainder).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shuffle the deck.
    ///
    /// With probability `stacked_probability` the deck is replaced by the
    /// deterministic stacked ordering; otherwise it is uniformly permuted.
    pub fn shuffle(&mut self, rng: &mut SessionRng, stacked_probability: f64) {
        if rng.gen_bool(stacked_probability) {
            self.cards.clear();
            for rank in stacked_ranks() {
                for suit in Suit::ALL {
                    self.cards.push(Card::new(suit, rank));
                }
            }
        } else {
            rng.shuffle(&mut self.cards);
        }
    }

    /// Deal one card from the front of the deck.
    pub fn deal_one(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Drain all remaining cards in order.
    pub fn drain_all(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    /// Number of cards left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if no cards remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remaining cards, front first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
