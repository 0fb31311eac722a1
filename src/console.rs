//! Interactive game between a human and a computer player.
//!
//! The session reads one move per line from any `BufRead` and writes the
//! board and prompts to any `Write`, so it can run on stdin/stdout as well
//! as on in-memory buffers.
//!
//! ## Example
//!
//! ```ignore
//! use quarto_rust::console::Session;
//! let mut session = Session::new(ai, Player::First);
//! session.run(std::io::stdin().lock(), &mut std::io::stdout())?;
//! ```

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::ai::Ai;
use crate::game::{GameState, Move, NextAction, Player};

/// A game between a human at the console and an [`Ai`].
pub struct Session<A: Ai> {
    state: GameState,
    ai: A,
    human: Player,
}

impl<A: Ai> Session<A> {
    /// Start a new game. The AI must be following the initial position.
    pub fn new(ai: A, human: Player) -> Self {
        Self {
            state: GameState::new(),
            ai,
            human,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Play until the game is over or the input ends.
    ///
    /// Returns the final state; it is not over if the input ran out first.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<&GameState> {
        let mut lines = input.lines();
        while !self.state.over() {
            write!(output, "\n{}", self.state)?;
            let mv = if self.state.next_player() == self.human {
                match self.read_move(&mut lines, output)? {
                    Some(mv) => mv,
                    None => {
                        writeln!(output, "\nEnd of input! Exiting.")?;
                        return Ok(&self.state);
                    }
                }
            } else {
                let mv = self.ai.calculate_move();
                writeln!(output, "{} plays {mv}", self.state.next_player())?;
                mv
            };
            self.state.execute_valid(mv);
            if !self.ai.execute(mv) {
                warn!("computer player rejected {mv:?}");
            }
        }

        write!(output, "\n{}Game over. ", self.state)?;
        match self.state.winner() {
            Some(winner) if winner == self.human => writeln!(output, "{winner} (you) won!")?,
            Some(winner) => writeln!(output, "{winner} won!")?,
            None => writeln!(output, "It's a tie.")?,
        }
        output.flush()?;
        Ok(&self.state)
    }

    /// Prompt until a valid move is entered. Returns `None` at end of input.
    fn read_move<I, W>(&self, lines: &mut I, output: &mut W) -> io::Result<Option<Move>>
    where
        I: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        loop {
            let action = match self.state.next_action() {
                NextAction::Select => "select piece",
                NextAction::Place => "place on field",
                NextAction::Pass => "(P)ass",
                NextAction::None => unreachable!("prompt after game over"),
            };
            write!(output, "{} to move. (Q)uarto or {action}: ", self.state.next_player())?;
            output.flush()?;

            let Some(line) = lines.next().transpose()? else {
                return Ok(None);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match crate::notation::parse_move(line) {
                None => writeln!(output, "Unrecognized move: {line:?}")?,
                Some(mv) => match self.state.check(mv) {
                    Ok(()) => return Ok(Some(mv)),
                    Err(err) => writeln!(output, "Move is not allowed: {line:?} ({err})")?,
                },
            }
            let valid: Vec<String> = self
                .state
                .list_valid_moves()
                .iter()
                .map(|mv| mv.to_string())
                .collect();
            writeln!(output, "Valid moves are: {}", valid.join(" "))?;
        }
    }
}
