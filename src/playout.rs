//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays random moves until the board is full or a player runs out
//! of safe pieces to hand over. Moves are drawn uniformly from the
//! non-losing candidates, so neither side ever gives away an immediate win
//! while it can avoid it.

use crate::compact::CompactState;
use crate::mcts::Outcome;

/// Perform a random playout from the given state.
///
/// The result is from the perspective of the player making the next
/// selection: in a select state that is the player to move, in a place state
/// it is the player placing the pending piece (who selects afterwards).
pub fn playout(mut state: CompactState, rng: &mut fastrand::Rng) -> Outcome {
    let mut result = Outcome::Win;
    while !state.finished() {
        let moves = state.non_losing_moves();
        if state.must_select() {
            if moves.is_empty() {
                // Every piece lets the opponent complete a line.
                return result.invert();
            }
            state.select(moves.get(rng.usize(..moves.len())));
            result = result.invert();
        } else {
            debug_assert!(!moves.is_empty());
            state.place(moves.get(rng.usize(..moves.len())));
        }
    }
    Outcome::Tie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(placements: &[(usize, usize)]) -> CompactState {
        let mut state = CompactState::new();
        for &(piece, field) in placements {
            state.select(piece);
            state.place(field);
        }
        state
    }

    #[test]
    fn test_no_safe_piece_loses() {
        // Every remaining piece completes the top or bottom row.
        let state = setup(&[(1, 0), (3, 1), (5, 2), (0, 12), (2, 13), (4, 14)]);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(playout(state, &mut rng), Outcome::Loss);
    }

    #[test]
    fn test_forced_loss_after_placement() {
        let mut state = setup(&[
            (10, 6), (12, 12), (1, 13), (15, 4), (2, 14),
            (3, 9), (5, 2), (7, 11), (9, 1), (4, 10),
        ]);
        // 14 is the only piece that doesn't lose on the spot.
        assert_eq!(state.non_losing_moves().as_slice(), &[14]);
        state.select(14);
        for field in state.non_losing_moves().iter() {
            let mut next = state;
            next.place(field);
            assert!(!next.has_quarto());
            assert!(next.non_losing_moves().is_empty());
        }
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..10 {
            // Wherever 14 goes, the placing player has no safe piece left.
            assert_eq!(playout(state, &mut rng), Outcome::Loss);
        }
    }

    #[test]
    fn test_finished_board_is_tie() {
        let mut state = CompactState::new();
        let layout = [0, 15, 3, 12, 10, 5, 9, 6, 13, 2, 14, 1, 7, 8, 4, 11];
        for (field, &piece) in layout.iter().enumerate() {
            state.select(piece);
            state.place(field);
        }
        assert!(state.finished());
        let mut rng = fastrand::Rng::with_seed(5);
        assert_eq!(playout(state, &mut rng), Outcome::Tie);
    }

    #[test]
    fn test_playout_is_reproducible() {
        let state = CompactState::new();
        let mut a = fastrand::Rng::with_seed(42);
        let mut b = fastrand::Rng::with_seed(42);
        for _ in 0..50 {
            assert_eq!(playout(state, &mut a), playout(state, &mut b));
        }
    }
}
