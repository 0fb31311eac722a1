//! Integration tests for quarto-rust
//!
//! These tests drive the public API the way a game loop would: rules engine,
//! search engine and computer players together.

use quarto_rust::ai::{Ai, AiController, RandomAi};
use quarto_rust::compact::CompactState;
use quarto_rust::config::SearchConfig;
use quarto_rust::constants::{MAX_MOVES, NUM_FIELDS};
use quarto_rust::game::{GameState, Move, NextAction};
use quarto_rust::mcts::{Outcome, SearchEngine, SearchNode};
use quarto_rust::notation::{encode_history, replay_history};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Play `(piece, field)` pairs as select/place moves.
fn setup_position(placements: &[(usize, usize)]) -> GameState {
    let mut state = GameState::new();
    for &(piece, field) in placements {
        assert!(state.execute(Move::Select(piece)), "select {piece}");
        assert!(state.execute(Move::Place(field)), "place at {field}");
    }
    state
}

/// Two empty fields (D4 and A1) with pieces 0 and 15 left. Piece 15
/// completes the top row at D4 and the bottom row at A1.
fn two_threats() -> GameState {
    setup_position(&[
        (14, 0), (13, 1), (11, 2),
        (1, 4), (4, 5), (5, 6), (9, 7),
        (2, 8), (8, 9), (10, 10), (3, 11),
        (12, 14), (6, 15), (7, 13),
    ])
}

fn controller(state: GameState, iterations: u32, seed: u64) -> AiController {
    AiController::with_rng(
        state,
        SearchConfig::for_testing().with_iterations(iterations),
        fastrand::Rng::with_seed(seed),
    )
}

// =============================================================================
// Rules engine
// =============================================================================

#[test]
fn test_opening_sequence() {
    let mut state = GameState::new();
    let expected = [NextAction::Select, NextAction::Place, NextAction::Select, NextAction::Place];
    let moves = [Move::Select(0), Move::Place(0), Move::Select(15), Move::Place(1)];
    for (mv, action) in moves.into_iter().zip(expected) {
        assert_eq!(state.next_action(), action);
        assert!(state.execute(mv));
    }
    assert_eq!(state.move_count(), 4);
    assert!(!state.is_quarto_possible());
    assert_eq!(state.next_action(), NextAction::Select);
    assert_eq!(state.piece_at(0), Some(0));
    assert_eq!(state.piece_at(1), Some(15));
    assert!(!state.available(15));
}

#[test]
fn test_random_games_respect_invariants() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for _ in 0..200 {
        let mut state = GameState::new();
        loop {
            assert!(state.move_count() <= MAX_MOVES);
            assert_eq!(
                state.over(),
                state.quarto_claimed() || state.move_count() == MAX_MOVES
            );
            let moves = state.list_valid_moves();
            if state.over() {
                assert!(moves.is_empty());
                break;
            }
            assert!(!moves.is_empty());
            for &mv in &moves {
                assert!(state.is_valid(mv), "{mv:?} listed but invalid");
            }
            let count = state.move_count();
            assert!(state.execute(moves[rng.usize(..moves.len())]));
            assert_eq!(state.move_count(), count + 1);
        }
    }
}

#[test]
fn test_non_losing_filter_on_random_positions() {
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..300 {
        let mut state = CompactState::new();
        while !state.finished() {
            let moves = state.non_losing_moves();
            if moves.is_empty() {
                break;
            }
            if state.must_select() {
                for piece in moves.iter() {
                    for field in (0..NUM_FIELDS).filter(|&f| state.piece_at(f).is_none()) {
                        let mut next = state;
                        next.select(piece);
                        next.place(field);
                        assert!(!next.has_quarto());
                    }
                }
            }
            state.apply(moves.get(rng.usize(..moves.len())));
        }
    }
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_engine_solves_forced_win() {
    let mut root = SearchNode::new(CompactState::from_game(&two_threats()));
    let mut engine = SearchEngine::new(
        SearchConfig::default().with_iterations(50),
        fastrand::Rng::with_seed(0),
    );
    assert_eq!(engine.search(&mut root), Move::Select(0));
    assert_eq!(root.fixed(), Some(Outcome::Win));
}

#[test]
fn test_controller_plays_out_forced_win() {
    let mut winner_ai = controller(two_threats(), 200, 1);
    let mut loser_ai = controller(two_threats(), 200, 2);
    let mut state = two_threats();
    let winner = state.next_player();

    while !state.over() {
        let mv = if state.next_player() == winner {
            winner_ai.calculate_move()
        } else {
            loser_ai.calculate_move()
        };
        assert!(state.execute(mv));
        assert!(winner_ai.execute(mv));
        assert!(loser_ai.execute(mv));
    }
    assert_eq!(state.winner(), Some(winner));
}

#[test]
fn test_same_seed_same_decision() {
    let mut state = GameState::new();
    state.execute(Move::Select(6));
    state.execute(Move::Place(5));
    let mut a = controller(state.clone(), 3_000, 31);
    let mut b = controller(state, 3_000, 31);
    assert_eq!(a.calculate_move(), b.calculate_move());
    let (ra, rb) = (a.root().unwrap(), b.root().unwrap());
    assert_eq!(ra.visits(), rb.visits());
    assert_eq!(ra.child_stats(), rb.child_stats());
}

#[test]
fn test_tree_reuse_has_no_state_drift() {
    let mut ai = controller(GameState::new(), 800, 12);
    for _ in 0..6 {
        let mv = ai.calculate_move();
        assert!(ai.execute(mv));
        if let Some(root) = ai.root() {
            assert_eq!(root.state(), &CompactState::from_game(ai.state()));
        }
    }
    assert_eq!(ai.state().move_count(), 6);
}

// =============================================================================
// Full games
// =============================================================================

#[test]
fn test_engine_against_random_player() {
    let mut engine = controller(GameState::new(), 300, 5);
    let mut random = RandomAi::new(GameState::new(), fastrand::Rng::with_seed(6));
    let mut state = GameState::new();
    let mut history = Vec::new();

    while !state.over() {
        let mv = match state.next_player().index() {
            0 => engine.calculate_move(),
            _ => random.calculate_move(),
        };
        assert!(state.execute(mv), "illegal move {mv:?}");
        assert!(engine.execute(mv));
        assert!(random.execute(mv));
        history.push(mv);
    }

    assert!(history.len() <= MAX_MOVES);
    let replayed = replay_history(&encode_history(&history)).unwrap();
    assert_eq!(replayed, state);
}
