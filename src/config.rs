//! Search configuration.

use crate::constants::{EXPLORATION_CONSTANT, ITERATIONS_PER_MOVE};

/// Configuration for the Monte Carlo tree search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of iterations per move decision. The search stops
    /// earlier once the root's exact value is known.
    pub iterations: u32,

    /// Exploration constant `c` in `v + sqrt(c * ln(N) / n)`.
    pub exploration: f64,

    /// Log per-move statistics of the root after each search.
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: ITERATIONS_PER_MOVE,
            exploration: EXPLORATION_CONSTANT,
            verbose: false,
        }
    }
}

impl SearchConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 2_000,
            ..Self::default()
        }
    }

    /// Builder pattern: set number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: enable or disable statistics logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
