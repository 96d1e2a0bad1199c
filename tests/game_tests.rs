//! Game-level integration tests: win detection, stuck detection,
//! threshold predicates.

use solitaire_rl::{Card, Game, GameConfig, PileId, Rank, SessionRng, Suit};

fn card(suit: Suit, rank: u8) -> Card {
    Card::new(suit, Rank::new(rank))
}

/// Full 52-card position: each foundation holds ace..queen of one
/// suit, and the four kings sit face-up on tableaus 0..3.
fn one_move_per_king_from_won() -> Game {
    let mut game = Game::empty(GameConfig::default());
    for (i, suit) in Suit::ALL.into_iter().enumerate() {
        for rank in 1..=12 {
            game.place_unchecked(PileId::foundation(i as u8), card(suit, rank), true);
        }
        game.place_unchecked(PileId::tableau(i as u8), card(suit, 13), true);
    }
    game
}

// =============================================================================
// Win Detection Tests
// =============================================================================

/// The transition to won happens exactly at the final foundation move.
#[test]
fn test_is_won_flips_at_final_move() {
    let mut game = one_move_per_king_from_won();
    assert!(game.verify_integrity().is_ok());
    assert!(!game.is_won());

    for (i, suit) in Suit::ALL.into_iter().enumerate() {
        assert!(!game.is_won(), "won too early at king {i}");
        game.play(card(suit, 13), PileId::foundation(i as u8)).unwrap();
    }
    assert!(game.is_won());
    assert!(game.verify_integrity().is_ok());
    assert_eq!(game.score(), 40); // four foundation moves
}

#[test]
fn test_freshly_dealt_game_is_not_won() {
    let mut game = Game::new(GameConfig::default());
    game.deal(&mut SessionRng::new(8));
    assert!(!game.is_won());
}

// =============================================================================
// Stuck Detection Tests
// =============================================================================

/// All seven tableaus topped by same-color cards two ranks apart, no
/// stock, no waste, empty foundations: zero legal destinations.
fn stuck_position() -> Game {
    let mut game = Game::empty(GameConfig::default());
    let tops = [
        card(Suit::Clubs, 3),
        card(Suit::Spades, 3),
        card(Suit::Clubs, 5),
        card(Suit::Spades, 5),
        card(Suit::Clubs, 7),
        card(Suit::Spades, 7),
        card(Suit::Clubs, 9),
    ];
    for (i, top) in tops.into_iter().enumerate() {
        game.place_unchecked(PileId::tableau(i as u8), top, true);
    }
    game
}

#[test]
fn test_is_stuck_with_no_destinations() {
    let game = stuck_position();
    assert!(game.is_stuck());
}

/// Adding a single legal foundation move flips stuck to false.
#[test]
fn test_one_foundation_move_unsticks() {
    let mut game = stuck_position();
    game.place_unchecked(PileId::tableau(0), card(Suit::Hearts, 1), true);
    assert!(!game.is_stuck());
}

/// A non-empty stock always offers the draw, so the game is not stuck.
#[test]
fn test_stock_draw_counts_as_progress() {
    let mut game = stuck_position();
    game.place_unchecked(PileId::stock(), card(Suit::Diamonds, 12), false);
    assert!(!game.is_stuck());
}

/// The waste recycle alone is not progress; cycling forever is stuck.
#[test]
fn test_waste_recycle_is_not_progress() {
    let mut game = stuck_position();
    game.place_unchecked(PileId::waste(), card(Suit::Clubs, 11), true);
    assert!(game.is_stuck());
}

#[test]
fn test_fresh_deal_is_not_stuck() {
    let mut game = Game::new(GameConfig::default());
    game.deal(&mut SessionRng::new(8));
    // The stock is never empty right after a deal.
    assert!(!game.is_stuck());
}

// =============================================================================
// Threshold Predicate Tests
// =============================================================================

#[test]
fn test_max_moves_threshold() {
    let mut game = Game::new(GameConfig::default());
    game.deal(&mut SessionRng::new(8));

    assert!(game.is_max_moves_reached(0));
    assert!(!game.is_max_moves_reached(1));

    let top = game.playfield().stock().top().unwrap();
    game.play(top, PileId::waste()).unwrap();
    assert!(game.is_max_moves_reached(1));
}

#[test]
fn test_min_score_threshold() {
    let mut game = Game::empty(GameConfig::default());
    game.place_unchecked(PileId::waste(), card(Suit::Clubs, 5), true);

    assert!(game.is_min_score_reached(0));
    game.play(card(Suit::Clubs, 5), PileId::stock()).unwrap();

    // Score is now -2: below zero, at the -2 floor, above -3.
    assert_eq!(game.score(), -2);
    assert!(game.is_min_score_reached(-2));
    assert!(!game.is_min_score_reached(-3));
}

// =============================================================================
// History Tests
// =============================================================================

#[test]
fn test_history_records_applied_moves_only() {
    let mut game = Game::new(GameConfig::default());
    game.deal(&mut SessionRng::new(8));

    let top = game.playfield().stock().top().unwrap();
    game.play(top, PileId::waste()).unwrap();

    // A rejected move leaves history untouched.
    let tableau_top = game.playfield().tableaus()[0].top().unwrap();
    let _ = game.play(tableau_top, PileId::waste());

    assert_eq!(game.history().len(), 1);
    let recorded = game.history().back().unwrap();
    assert_eq!(recorded.card, top);
    assert_eq!(recorded.to, PileId::waste());
}
