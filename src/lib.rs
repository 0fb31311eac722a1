//! Quarto-Rust: a Quarto player built on Monte Carlo tree search.
//!
//! The search combines random playouts with exact game-theoretic
//! resolution: once a node's value is proven (a forced win, loss or tie), it
//! is fixed and propagated towards the root, and the search stops as soon as
//! the root itself is solved.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, turn structure and search defaults
//! - [`game`] - Rules engine (moves, turn order, Quarto detection)
//! - [`compact`] - Incrementally maintained state used during search
//! - [`playout`] - Random game simulation for position evaluation
//! - [`config`] - Search configuration
//! - [`mcts`] - Monte Carlo Tree Search with fixed (proven) node values
//! - [`ai`] - Computer players with tree reuse across moves
//! - [`notation`] - Text representation of moves, boards and histories
//! - [`console`] - Interactive human-vs-computer session
//!
//! ## Example
//!
//! ```
//! use quarto_rust::compact::CompactState;
//! use quarto_rust::config::SearchConfig;
//! use quarto_rust::game::{GameState, Move};
//! use quarto_rust::mcts::{SearchEngine, SearchNode};
//!
//! // Create a new game and select a piece for the opponent
//! let mut state = GameState::new();
//! state.execute(Move::Select(5));
//!
//! // Run MCTS to find where to place it
//! let mut root = SearchNode::new(CompactState::from_game(&state));
//! let mut engine = SearchEngine::new(
//!     SearchConfig::default().with_iterations(1_000),
//!     fastrand::Rng::with_seed(1),
//! );
//! let best = engine.search(&mut root);
//! println!("Best move: {best}");
//! assert!(state.is_valid(best));
//! ```

pub mod ai;
pub mod compact;
pub mod config;
pub mod console;
pub mod constants;
pub mod game;
pub mod mcts;
pub mod notation;
pub mod playout;
