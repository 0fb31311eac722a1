//! Monte Carlo Tree Search (MCTS) with exact value resolution.
//!
//! This module implements MCTS with:
//! - UCB1 for node selection
//! - Lazy expansion, one child per visit, in candidate order
//! - Non-losing random playouts for value estimation
//! - Backward induction: once a node's game-theoretic value is proven, it is
//!   fixed and never revised, and fixed values propagate towards the root
//!
//! Node values are stored from the perspective of the player who makes the
//! next selection at that node. A select node's children are place nodes of
//! the opponent, so results are inverted when crossing a select edge.

use std::fmt;

use tracing::{debug, info};

use crate::compact::{CompactState, MoveList};
use crate::config::SearchConfig;
use crate::game::Move;
use crate::playout::playout;

/// A game result for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Loss = -1,
    Tie = 0,
    Win = 1,
}

impl Outcome {
    /// The same result seen by the other player.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Outcome::Loss => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
            Outcome::Win => Outcome::Loss,
        }
    }

    /// Game value: +1 for a win, 0 for a tie, -1 for a loss.
    #[inline]
    pub fn value(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Loss => "loss",
            Outcome::Tie => "tie",
            Outcome::Win => "win",
        };
        f.write_str(s)
    }
}

/// Value of a node: running playout statistics, or a proven result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeValue {
    Open { wins: u32, losses: u32 },
    Fixed(Outcome),
}

/// Statistics of one child of a node, for reporting and comparison.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildStats {
    pub mv: Move,
    pub visits: u32,
    pub value: NodeValue,
    pub expected_value: f64,
}

/// A node in the search tree.
///
/// Candidate moves are computed once, when the node is created. Children are
/// created lazily in candidate order, so `children[i]` always belongs to
/// `candidates[i]`.
#[derive(Clone, Debug)]
pub struct SearchNode {
    state: CompactState,
    visits: u32,
    value: NodeValue,
    candidates: MoveList,
    children: Vec<SearchNode>,
}

/// Result of one iteration as seen by the node that returned it.
#[derive(Clone, Copy, Debug)]
struct Backup {
    outcome: Outcome,
    fixed: bool,
}

impl Backup {
    fn open(outcome: Outcome) -> Self {
        Self { outcome, fixed: false }
    }

    fn fixed(outcome: Outcome) -> Self {
        Self { outcome, fixed: true }
    }

    fn invert(self) -> Self {
        Self {
            outcome: self.outcome.invert(),
            fixed: self.fixed,
        }
    }
}

impl SearchNode {
    /// Create a new, unvisited node for the given state.
    pub fn new(state: CompactState) -> Self {
        Self {
            candidates: state.non_losing_moves(),
            state,
            visits: 0,
            value: NodeValue::Open { wins: 0, losses: 0 },
            children: Vec::new(),
        }
    }

    pub fn state(&self) -> &CompactState {
        &self.state
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn value(&self) -> NodeValue {
        self.value
    }

    /// The proven value of this node, if any.
    pub fn fixed(&self) -> Option<Outcome> {
        match self.value {
            NodeValue::Fixed(outcome) => Some(outcome),
            NodeValue::Open { .. } => None,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self.value, NodeValue::Fixed(_))
    }

    /// Candidate piece or field indices, after the non-losing filter.
    pub fn candidates(&self) -> &MoveList {
        &self.candidates
    }

    /// Expanded children, in candidate order.
    pub fn children(&self) -> &[SearchNode] {
        &self.children
    }

    /// Estimated value in [-1, 1] for the player making the next selection.
    pub fn expected_value(&self) -> f64 {
        match self.value {
            NodeValue::Fixed(outcome) => outcome.value() as f64,
            NodeValue::Open { .. } if self.visits == 0 => 0.0,
            NodeValue::Open { wins, losses } => {
                (wins as f64 - losses as f64) / self.visits as f64
            }
        }
    }

    /// Statistics of every expanded child.
    pub fn child_stats(&self) -> Vec<ChildStats> {
        self.children
            .iter()
            .enumerate()
            .map(|(i, child)| ChildStats {
                mv: self.move_at(i),
                visits: child.visits,
                value: child.value,
                expected_value: child.expected_value(),
            })
            .collect()
    }

    /// Detach the expanded child reached by `mv`, dropping this node and all
    /// other children. Returns `None` if no such child has been expanded.
    pub fn into_child(mut self, mv: Move) -> Option<SearchNode> {
        let index = match mv {
            Move::Select(piece) if self.state.must_select() => piece,
            Move::Place(field) if !self.state.must_select() => field,
            _ => return None,
        };
        let position = self.candidates.as_slice()[..self.children.len()]
            .iter()
            .position(|&c| c as usize == index)?;
        Some(self.children.swap_remove(position))
    }

    #[inline]
    fn move_at(&self, i: usize) -> Move {
        self.state.to_move(self.candidates.get(i))
    }

    fn record(&mut self, outcome: Outcome) {
        if let NodeValue::Open { wins, losses } = &mut self.value {
            match outcome {
                Outcome::Win => *wins += 1,
                Outcome::Loss => *losses += 1,
                Outcome::Tie => {}
            }
        }
    }

    /// Index of the child with the most visits. Ties go to the first child.
    fn most_visited_child(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (i, child) in self.children.iter().enumerate() {
            if best.is_none_or(|(_, visits)| child.visits > visits) {
                best = Some((i, child.visits));
            }
        }
        best.map(|(i, _)| i)
    }

    fn fix(&mut self, outcome: Outcome) -> Outcome {
        assert!(!self.is_fixed(), "node value fixed twice");
        self.value = NodeValue::Fixed(outcome);
        outcome
    }

    /// Create the child for the next unexpanded candidate and return its index.
    ///
    /// A child without candidates must select, and every piece it could
    /// select lets the opponent win: it is lost, or tied if no piece is left.
    fn expand_next(&mut self) -> usize {
        let i = self.children.len();
        debug_assert!(i < self.candidates.len());
        let mut state = self.state;
        state.apply(self.candidates.get(i));
        let mut child = SearchNode::new(state);
        if child.candidates.is_empty() {
            assert!(child.state.must_select(), "place node without empty fields");
            child.fix(if child.state.available_pieces() != 0 {
                Outcome::Loss
            } else {
                Outcome::Tie
            });
        }
        self.children.push(child);
        i
    }

    /// Pick the child with the highest upper confidence bound. Ties go to
    /// the first child.
    fn select_child(&self, exploration: f64) -> usize {
        let log_visits = (self.visits as f64).ln();
        let mut best_score = f64::NEG_INFINITY;
        let mut best = 0;
        for (i, child) in self.children.iter().enumerate() {
            debug_assert!(child.is_fixed() || child.visits > 0);
            let score = child.expected_value()
                + (exploration * log_visits / child.visits as f64).sqrt();
            if score > best_score {
                best_score = score;
                best = i;
            }
        }
        best
    }

    /// If every candidate has been expanded and proven, the node's own value
    /// is the best of its children's values.
    fn solve_from_children(&self) -> Option<Outcome> {
        if self.children.len() < self.candidates.len() {
            return None;
        }
        let mut min_value = 1;
        let mut max_value = -1;
        for child in &self.children {
            let value = child.fixed()?.value();
            min_value = min_value.min(value);
            max_value = max_value.max(value);
        }
        let best = if self.state.must_select() { -min_value } else { max_value };
        // A winning child would already have fixed this node.
        assert!(best <= 0, "unproven win among fixed children");
        Some(if best < 0 { Outcome::Loss } else { Outcome::Tie })
    }
}

/// Drives the search over a tree of [`SearchNode`]s.
///
/// All randomness comes from the engine's generator, so a search from a given
/// tree is fully determined by the generator's seed.
pub struct SearchEngine {
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl SearchEngine {
    pub fn new(config: SearchConfig, rng: fastrand::Rng) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The engine's random generator, for callers that need to break ties
    /// from the same stream.
    pub fn rng(&mut self) -> &mut fastrand::Rng {
        &mut self.rng
    }

    /// Run the search from `root` and return the recommended move.
    ///
    /// Runs up to the configured number of iterations, stopping as soon as
    /// the root's value is proven. If no candidate avoids an immediate loss,
    /// a random legal move is returned without searching.
    pub fn search(&mut self, root: &mut SearchNode) -> Move {
        if root.candidates.is_empty() {
            info!("loss is unavoidable, picking a random move");
            let moves = root.state.legal_moves();
            assert!(!moves.is_empty(), "search on a finished game");
            return root.state.to_move(moves.get(self.rng.usize(..moves.len())));
        }

        for _ in 0..self.config.iterations {
            if root.is_fixed() {
                break;
            }
            self.iterate(root);
        }

        if let Some(outcome) = root.fixed() {
            info!("root node has fixed value: {outcome}");
            return self.proven_move(root, outcome);
        }
        let mv = self.most_visited(root);
        if self.config.verbose {
            log_children(root);
        }
        mv
    }

    /// Run a single iteration: descend, expand, simulate and back up.
    pub fn iterate(&mut self, root: &mut SearchNode) {
        self.descend(root);
    }

    fn descend(&mut self, node: &mut SearchNode) -> Backup {
        node.visits += 1;
        if let Some(outcome) = node.fixed() {
            return Backup::fixed(outcome);
        }
        if node.visits == 1 {
            let outcome = playout(node.state, &mut self.rng);
            node.record(outcome);
            return Backup::open(outcome);
        }
        assert!(!node.candidates.is_empty(), "open node without candidates");

        let (index, fixed_before) = if node.children.len() < node.candidates.len() {
            (node.expand_next(), false)
        } else {
            let index = node.select_child(self.config.exploration);
            (index, node.children[index].is_fixed())
        };
        let child_backup = self.descend(&mut node.children[index]);
        let backup = if node.state.must_select() {
            child_backup.invert()
        } else {
            child_backup
        };

        if backup.fixed && !fixed_before {
            if backup.outcome == Outcome::Win {
                return Backup::fixed(node.fix(Outcome::Win));
            }
            if let Some(outcome) = node.solve_from_children() {
                return Backup::fixed(node.fix(outcome));
            }
        }
        node.record(backup.outcome);
        Backup::open(backup.outcome)
    }

    /// Pick uniformly among the children whose proven value realises the
    /// root's proven value.
    fn proven_move(&mut self, root: &SearchNode, outcome: Outcome) -> Move {
        let target = if root.state.must_select() {
            outcome.invert()
        } else {
            outcome
        };
        let moves: Vec<Move> = root
            .children
            .iter()
            .enumerate()
            .filter(|(_, child)| child.fixed() == Some(target))
            .map(|(i, _)| root.move_at(i))
            .collect();
        assert!(!moves.is_empty(), "fixed root without a matching child");
        moves[self.rng.usize(..moves.len())]
    }

    /// The move of the most visited child. Ties go to the first child.
    fn most_visited(&mut self, root: &SearchNode) -> Move {
        match root.most_visited_child() {
            Some(i) => root.move_at(i),
            None => root.move_at(self.rng.usize(..root.candidates.len())),
        }
    }
}

/// Log the statistics of the root's children.
pub fn log_children(root: &SearchNode) {
    for stats in root.child_stats() {
        match stats.value {
            NodeValue::Open { wins, losses } => debug!(
                "move {:?}: ({} - {}) / {}",
                stats.mv, wins, losses, stats.visits
            ),
            NodeValue::Fixed(outcome) => {
                debug!("move {:?}: fixed {} / {}", stats.mv, outcome, stats.visits)
            }
        }
    }
    for i in root.children.len()..root.candidates.len() {
        debug!("move {:?} unexpanded", root.move_at(i));
    }
    if let Some(best) = root.most_visited_child() {
        let sign = if root.state.must_select() { -1.0 } else { 1.0 };
        debug!("expected value: {:.3}", sign * root.children[best].expected_value());
    }
}
