//! The game: playfield + undealt remainder + history + score.
//!
//! A `Game` is created fresh per episode and deep-copied independently
//! into every worker, so `Clone` must be cheap: the move history uses
//! `im::Vector` for structural sharing and everything else is small.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{Card, Deck, GameConfig, SessionRng};
use crate::error::{GameError, MoveError};
use crate::playfield::{Move, MoveOutcome, PileId, Playfield};

/// A solitaire game in progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    playfield: Playfield,
    undealt: Deck,
    history: Vector<Move>,
    score: i64,
    config: GameConfig,
}

impl Game {
    /// Create an undealt game. Call `deal` before playing.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            playfield: Playfield::new(),
            undealt: Deck::standard(),
            history: Vector::new(),
            score: 0,
            config,
        }
    }

    /// Create a game with an empty playfield and no undealt cards.
    ///
    /// Pair with `place_unchecked` to script exact positions.
    #[must_use]
    pub fn empty(config: GameConfig) -> Self {
        Self {
            playfield: Playfield::new(),
            undealt: Deck::empty(),
            history: Vector::new(),
            score: 0,
            config,
        }
    }

    /// Shuffle and deal a fresh layout, resetting score and history.
    ///
    /// Tableau pile `i` receives `i + 1` cards from the front of the
    /// deck with only the top one face-up; each foundation is seeded
    /// with one face-up card; the remainder becomes the stock.
    pub fn deal(&mut self, rng: &mut SessionRng) {
        let mut deck = Deck::standard();
        deck.shuffle(rng, self.config.stacked_probability);

        self.playfield = Playfield::new();
        self.history = Vector::new();
        self.score = 0;

        for i in 0..7u8 {
            for j in 0..=i {
                if let Some(card) = deck.deal_one() {
                    self.playfield.place(PileId::tableau(i), card, j == i);
                }
            }
        }
        for i in 0..4u8 {
            if let Some(card) = deck.deal_one() {
                self.playfield.place(PileId::foundation(i), card, true);
            }
        }
        for card in deck.drain_all() {
            self.playfield.place(PileId::stock(), card, false);
        }
        self.undealt = Deck::empty();
    }

    /// Attempt a move.
    ///
    /// On rejection nothing changes and the reason comes back as a
    /// `MoveError` - expected during training, not a defect. On success
    /// the move is recorded and the score adjusted.
    pub fn play(&mut self, card: Card, dest: PileId) -> Result<MoveOutcome, MoveError> {
        let outcome = self.playfield.apply_move(card, dest)?;
        self.history.push_back(outcome.mv);
        self.score += Playfield::move_score(&outcome, &self.config.score);
        Ok(outcome)
    }

    /// Verify card conservation after a structural mutation.
    pub fn verify_integrity(&self) -> Result<(), GameError> {
        self.playfield.check_integrity(self.undealt.cards())
    }

    /// True iff all four foundations hold exactly 13 cards.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.playfield.foundations().iter().all(|f| f.len() == 13)
    }

    /// True iff no progress move exists anywhere.
    #[must_use]
    pub fn is_stuck(&self) -> bool {
        !self.playfield.has_progress_move()
    }

    /// Move-count threshold predicate (history only counts applied moves;
    /// the trainer's own counter includes rejected attempts).
    #[must_use]
    pub fn is_max_moves_reached(&self, cap: u32) -> bool {
        self.history.len() as u32 >= cap
    }

    /// Score-floor threshold predicate.
    #[must_use]
    pub fn is_min_score_reached(&self, floor: i64) -> bool {
        self.score <= floor
    }

    /// Current score. May be negative.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Applied moves, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<Move> {
        &self.history
    }

    /// The playfield.
    #[must_use]
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    /// The game config this game was dealt under.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Scripting hook: place a card directly, bypassing rules.
    ///
    /// Intended for constructing positions in tests and tooling; the
    /// integrity check still applies to whatever gets built.
    pub fn place_unchecked(&mut self, id: PileId, card: Card, face_up: bool) {
        self.playfield.place(id, card, face_up);
    }
}
