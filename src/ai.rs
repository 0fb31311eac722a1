//! Computer players.
//!
//! [`AiController`] keeps its own copy of the game and a search tree that
//! survives between moves: after every move it descends into the matching
//! child, so statistics gathered for the position actually reached are kept.
//! [`RandomAi`] is a baseline opponent that plays uniformly random moves.
//!
//! ## Example
//!
//! ```
//! use quarto_rust::ai::{Ai, AiController};
//! use quarto_rust::config::SearchConfig;
//! use quarto_rust::game::GameState;
//!
//! let mut ai = AiController::with_rng(
//!     GameState::new(),
//!     SearchConfig::default().with_iterations(500),
//!     fastrand::Rng::with_seed(1),
//! );
//! let mv = ai.calculate_move();
//! assert!(ai.execute(mv));
//! ```

use tracing::{debug, info};

use crate::compact::CompactState;
use crate::config::SearchConfig;
use crate::game::{GameState, Move, NextAction};
use crate::mcts::{SearchEngine, SearchNode};

/// A computer player that follows a game move by move.
pub trait Ai {
    /// Feed a played move into the player's view of the game. Returns false
    /// (leaving the player's state unchanged) if the move is not valid.
    fn execute(&mut self, mv: Move) -> bool;

    /// Choose the next move. Must not be called once the game is over.
    fn calculate_move(&mut self) -> Move;
}

/// Monte Carlo tree search player with tree reuse across moves.
pub struct AiController {
    /// Current game position
    state: GameState,
    /// Search tree for `state`, if one has been built and survived
    root: Option<SearchNode>,
    engine: SearchEngine,
}

impl AiController {
    /// Create a controller whose random generator is seeded from entropy.
    pub fn new(state: GameState, config: SearchConfig) -> Self {
        Self::with_rng(state, config, fastrand::Rng::new())
    }

    /// Create a controller with an explicit random generator.
    pub fn with_rng(state: GameState, config: SearchConfig, rng: fastrand::Rng) -> Self {
        Self {
            state,
            root: None,
            engine: SearchEngine::new(config, rng),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The retained search tree, if any.
    pub fn root(&self) -> Option<&SearchNode> {
        self.root.as_ref()
    }

    /// Places for the pending piece that complete a line.
    fn winning_placements(&self) -> Vec<Move> {
        self.state
            .list_valid_moves()
            .into_iter()
            .filter(|&mv| matches!(mv, Move::Place(_)))
            .filter(|&mv| {
                let mut next = self.state.clone();
                next.execute_valid(mv);
                next.is_quarto_possible()
            })
            .collect()
    }
}

impl Ai for AiController {
    fn execute(&mut self, mv: Move) -> bool {
        if !self.state.execute(mv) {
            return false;
        }
        // Keep the subtree of the move just played, or drop the tree if the
        // move was never expanded (e.g. because it was losing).
        self.root = self.root.take().and_then(|root| root.into_child(mv));
        true
    }

    fn calculate_move(&mut self) -> Move {
        assert!(!self.state.over(), "calculate_move called on a finished game");
        if self.state.is_quarto_possible() {
            return Move::Quarto;
        }
        match self.state.next_action() {
            NextAction::Pass => return Move::Pass,
            NextAction::Place => {
                let winning = self.winning_placements();
                if !winning.is_empty() {
                    let mv = winning[self.engine.rng().usize(..winning.len())];
                    info!("found winning move: {mv:?}");
                    return mv;
                }
            }
            _ => {}
        }

        let root = self.root.get_or_insert_with(|| {
            debug!("recreating root node");
            SearchNode::new(CompactState::from_game(&self.state))
        });
        self.engine.search(root)
    }
}

/// Plays uniformly random valid moves, but never misses a Quarto claim.
pub struct RandomAi {
    state: GameState,
    rng: fastrand::Rng,
}

impl RandomAi {
    pub fn new(state: GameState, rng: fastrand::Rng) -> Self {
        Self { state, rng }
    }
}

impl Ai for RandomAi {
    fn execute(&mut self, mv: Move) -> bool {
        self.state.execute(mv)
    }

    fn calculate_move(&mut self) -> Move {
        assert!(!self.state.over(), "calculate_move called on a finished game");
        if self.state.is_quarto_possible() {
            return Move::Quarto;
        }
        let moves = self.state.list_valid_moves();
        moves[self.rng.usize(..moves.len())]
    }
}
