//! The playfield: pile layout, move validation, atomic move application.
//!
//! Rules are fixed and total. `apply_move` either transfers the subject
//! card completely (pop from source, flip the newly exposed tableau
//! card, push to destination) or leaves the playfield untouched and
//! reports why - never a partial transfer.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use serde::{Deserialize, Serialize};

use crate::core::{Card, ScoreWeights};
use crate::error::{GameError, MoveError};

use super::moves::{Move, MoveOutcome};
use super::pile::{Pile, PileId, PileKind};

/// Candidate move list; 16 covers typical positions without spilling.
pub type MoveList = SmallVec<[Move; 16]>;

/// The 13-pile playfield: 7 tableaus, 4 foundations, stock, waste.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playfield {
    tableaus: [Pile; 7],
    foundations: [Pile; 4],
    stock: Pile,
    waste: Pile,
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Playfield {
    /// Create an empty playfield.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tableaus: std::array::from_fn(|i| Pile::new(PileId::tableau(i as u8))),
            foundations: std::array::from_fn(|i| Pile::new(PileId::foundation(i as u8))),
            stock: Pile::new(PileId::stock()),
            waste: Pile::new(PileId::waste()),
        }
    }

    /// Look up a pile by id. Dispatch is exhaustive over the kind tag.
    #[must_use]
    pub fn pile(&self, id: PileId) -> &Pile {
        match id.kind {
            PileKind::Tableau => &self.tableaus[id.index as usize],
            PileKind::Foundation => &self.foundations[id.index as usize],
            PileKind::Stock => &self.stock,
            PileKind::Waste => &self.waste,
        }
    }

    fn pile_mut(&mut self, id: PileId) -> &mut Pile {
        match id.kind {
            PileKind::Tableau => &mut self.tableaus[id.index as usize],
            PileKind::Foundation => &mut self.foundations[id.index as usize],
            PileKind::Stock => &mut self.stock,
            PileKind::Waste => &mut self.waste,
        }
    }

    /// The seven tableau piles.
    #[must_use]
    pub fn tableaus(&self) -> &[Pile; 7] {
        &self.tableaus
    }

    /// The four foundation piles.
    #[must_use]
    pub fn foundations(&self) -> &[Pile; 4] {
        &self.foundations
    }

    /// The stock pile.
    #[must_use]
    pub fn stock(&self) -> &Pile {
        &self.stock
    }

    /// The waste pile.
    #[must_use]
    pub fn waste(&self) -> &Pile {
        &self.waste
    }

    /// Iterate all 13 piles in fixed order: tableaus, foundations,
    /// stock, waste.
    pub fn piles(&self) -> impl Iterator<Item = &Pile> {
        self.tableaus
            .iter()
            .chain(self.foundations.iter())
            .chain(std::iter::once(&self.stock))
            .chain(std::iter::once(&self.waste))
    }

    /// Place a card during the deal. Bypasses move validation; only
    /// `Game::deal` uses this.
    pub(crate) fn place(&mut self, id: PileId, card: Card, face_up: bool) {
        self.pile_mut(id).push(card, face_up);
    }

    /// Find which pile holds a card.
    #[must_use]
    pub fn locate(&self, card: Card) -> Option<PileId> {
        self.piles().find(|p| p.contains(card)).map(Pile::id)
    }

    /// Check whether moving `card` to `dest` is legal.
    ///
    /// (a) the card must be the face-up top card of its current pile,
    /// (b) the destination's acceptance rule must hold.
    pub fn validate(&self, card: Card, dest: PileId) -> Result<Move, MoveError> {
        let from = self.locate(card).ok_or(MoveError::CardNotFound { card })?;
        let source = self.pile(from);

        if source.top() != Some(card) {
            return Err(MoveError::NotTopCard { card, pile: from });
        }
        if source.top_face_up() == Some(false) && from.kind != PileKind::Stock {
            return Err(MoveError::FaceDown { card, pile: from });
        }

        match dest.kind {
            PileKind::Tableau => self.accepts_tableau(card, dest)?,
            PileKind::Foundation => self.accepts_foundation(card, dest)?,
            PileKind::Waste => {
                // Only a draw from the stock lands on the waste.
                if from.kind != PileKind::Stock {
                    return Err(MoveError::NotADraw);
                }
            }
            PileKind::Stock => {
                // Recycle: the waste top may return to an exhausted stock.
                if from.kind != PileKind::Waste || !self.stock.is_empty() {
                    return Err(MoveError::StockDestination);
                }
            }
        }

        Ok(Move::new(card, from, dest))
    }

    fn accepts_tableau(&self, card: Card, dest: PileId) -> Result<(), MoveError> {
        let pile = self.pile(dest);
        match pile.top() {
            // Any card may start an empty tableau.
            None => Ok(()),
            Some(top) => {
                let descending = card.rank.successor() == Some(top.rank);
                let alternating = top.color() != card.color();
                if descending && alternating {
                    Ok(())
                } else {
                    Err(MoveError::TableauMismatch { card, pile: dest })
                }
            }
        }
    }

    fn accepts_foundation(&self, card: Card, dest: PileId) -> Result<(), MoveError> {
        let pile = self.pile(dest);
        match pile.top() {
            None => {
                if card.is_ace() {
                    Ok(())
                } else {
                    Err(MoveError::FoundationNeedsAce { card })
                }
            }
            Some(top) => {
                if top.suit == card.suit && top.rank.successor() == Some(card.rank) {
                    Ok(())
                } else {
                    Err(MoveError::FoundationMismatch { card, pile: dest })
                }
            }
        }
    }

    /// Apply a move atomically.
    ///
    /// Validation runs first; on any failure the playfield is unchanged.
    /// On success the source loses its top card, a newly exposed tableau
    /// card is turned face-up, and the destination gains the card.
    pub fn apply_move(&mut self, card: Card, dest: PileId) -> Result<MoveOutcome, MoveError> {
        let mv = self.validate(card, dest)?;

        let source = self.pile_mut(mv.from);
        let (moved, _) = source.pop().ok_or(MoveError::CardNotFound { card })?;
        debug_assert_eq!(moved, card);

        let revealed = mv.from.kind == PileKind::Tableau && source.flip_top_up();

        let face_up = dest.kind != PileKind::Stock;
        self.pile_mut(dest).push(moved, face_up);

        Ok(MoveOutcome { mv, revealed })
    }

    /// Score a completed move under the given weights.
    #[must_use]
    pub fn move_score(outcome: &MoveOutcome, weights: &ScoreWeights) -> i64 {
        let mut score = 0;
        if outcome.mv.to.kind == PileKind::Foundation {
            score += weights.foundation;
        }
        if outcome.revealed {
            score += weights.reveal;
        }
        if outcome.mv.from.kind == PileKind::Waste && outcome.mv.to.kind == PileKind::Stock {
            score += weights.waste_return;
        }
        score
    }

    /// Enumerate every currently legal move.
    ///
    /// Sources are the face-up tops of the tableaus and the waste, plus
    /// the stock draw and the waste recycle.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();

        let mut try_dests = |field: &Self, card: Card, out: &mut MoveList| {
            for i in 0..4 {
                let dest = PileId::foundation(i);
                if let Ok(mv) = field.validate(card, dest) {
                    out.push(mv);
                }
            }
            for i in 0..7 {
                let dest = PileId::tableau(i);
                if let Ok(mv) = field.validate(card, dest) {
                    // Skip the no-op of moving a card onto its own pile.
                    if mv.from != dest {
                        out.push(mv);
                    }
                }
            }
        };

        for pile in &self.tableaus {
            if let Some(card) = pile.top() {
                try_dests(self, card, &mut moves);
            }
        }
        if let Some(card) = self.waste.top() {
            try_dests(self, card, &mut moves);
        }
        if let Some(card) = self.stock.top() {
            moves.push(Move::new(card, PileId::stock(), PileId::waste()));
        }
        if self.stock.is_empty() {
            if let Some(card) = self.waste.top() {
                if self.validate(card, PileId::stock()).is_ok() {
                    moves.push(Move::new(card, PileId::waste(), PileId::stock()));
                }
            }
        }

        moves
    }

    /// Whether any progress move exists: a tableau or waste top with a
    /// legal foundation/tableau destination, or a stock draw. The waste
    /// recycle does not count - cycling the waste forever is not progress.
    #[must_use]
    pub fn has_progress_move(&self) -> bool {
        if !self.stock.is_empty() {
            return true;
        }
        self.legal_moves()
            .iter()
            .any(|mv| !(mv.from.kind == PileKind::Waste && mv.to.kind == PileKind::Stock))
    }

    /// Verify card conservation: piles plus the undealt remainder must
    /// hold exactly 52 cards with no (suit, rank) duplicate.
    pub fn check_integrity(&self, undealt: &[Card]) -> Result<(), GameError> {
        let mut seen = FxHashSet::default();
        let mut count = 0usize;

        for card in self.piles().flat_map(|p| p.cards()).chain(undealt) {
            count += 1;
            if !seen.insert(*card) {
                return Err(GameError::DuplicateCard { card: *card });
            }
        }

        if count != 52 {
            return Err(GameError::CardCountMismatch { found: count });
        }
        Ok(())
    }
}
