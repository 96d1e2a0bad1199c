//! State encoding for policy input.

use crate::game::Game;
use crate::playfield::Pile;

use super::actions::{ACTION_SPACE, PILE_COUNT};
use super::traits::{EncodedState, StateEncoder};

/// Features per pile: count, top rank, top suit one-hot (4), top face-up.
const PILE_FEATURES: usize = 7;

/// Encodes a game as a flat per-pile feature vector.
///
/// For each of the 13 piles in fixed ordinal order:
/// - card count, normalized by 13
/// - top card rank, normalized by 13 (0 when empty)
/// - top card suit one-hot (4 slots, all zero when empty)
/// - top card face-up flag
///
/// plus one trailing slot for the current score (scaled by 1/100).
#[derive(Clone, Copy, Debug, Default)]
pub struct SolitaireEncoder;

impl SolitaireEncoder {
    /// Create the encoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn encode_pile(pile: &Pile, out: &mut Vec<f32>) {
        out.push(pile.len() as f32 / 13.0);
        match pile.top() {
            Some(card) => {
                out.push(f32::from(card.rank.value()) / 13.0);
                let mut suit = [0.0f32; 4];
                suit[card.suit as usize] = 1.0;
                out.extend_from_slice(&suit);
                out.push(if pile.top_face_up() == Some(true) { 1.0 } else { 0.0 });
            }
            None => out.extend_from_slice(&[0.0; PILE_FEATURES - 1]),
        }
    }
}

impl StateEncoder for SolitaireEncoder {
    fn encode(&self, game: &Game) -> EncodedState {
        let mut tensor = Vec::with_capacity(PILE_COUNT * PILE_FEATURES + 1);
        for pile in game.playfield().piles() {
            Self::encode_pile(pile, &mut tensor);
        }
        tensor.push(game.score() as f32 / 100.0);
        EncodedState::new(tensor, self.output_shape())
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![PILE_COUNT * PILE_FEATURES + 1]
    }

    fn action_space_size(&self) -> usize {
        ACTION_SPACE
    }
}

/// Zero encoder for tests: fixed shape, all zeros.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroEncoder;

impl StateEncoder for ZeroEncoder {
    fn encode(&self, _game: &Game) -> EncodedState {
        EncodedState::zeros(self.output_shape())
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![1]
    }

    fn action_space_size(&self) -> usize {
        ACTION_SPACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, SessionRng};

    #[test]
    fn test_encoder_shape() {
        let mut game = Game::new(GameConfig::default());
        game.deal(&mut SessionRng::new(11));

        let encoder = SolitaireEncoder::new();
        let encoded = encoder.encode(&game);
        assert_eq!(encoded.len(), encoder.output_shape()[0]);
        assert_eq!(encoded.len(), 13 * 7 + 1);
    }

    #[test]
    fn test_encoder_sees_pile_counts() {
        let mut game = Game::new(GameConfig::default());
        game.deal(&mut SessionRng::new(11));

        let encoded = SolitaireEncoder::new().encode(&game);
        // Tableau 6 holds 7 cards; its count slot is pile 6's first feature.
        let slot = 6 * PILE_FEATURES;
        assert!((encoded.tensor[slot] - 7.0 / 13.0).abs() < 1e-6);
    }
}
