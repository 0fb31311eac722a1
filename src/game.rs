//! Quarto rules engine.
//!
//! This module provides the authoritative game state, including:
//! - Turn order derived from the move counter
//! - Legal move enumeration and validation
//! - Quarto (win) detection around the most recent placement
//!
//! A game is a sequence of up to 34 moves. Moves 0 through 31 alternate
//! between selecting a piece for the opponent and placing the piece that was
//! selected by the opponent. Moves 32 and 33 let each player pass (or claim a
//! Quarto). Selecting and placing count as separate moves, so a player's turn
//! is always "place, then select".

use std::fmt;

use thiserror::Error;

use crate::constants::*;

/// A piece, numbered 0 through 15. Each bit selects one value of an attribute.
pub type Piece = usize;

/// A field on the board, numbered 0 through 15 row by row.
pub type Field = usize;

/// Bitmask of the attribute values of a piece.
///
/// The result has exactly 4 of its 8 bits set: the high nibble holds the
/// attributes the piece has, the low nibble the ones it lacks. Two pieces
/// share an attribute value iff their masks intersect.
#[inline]
pub const fn attribute_values(piece: Piece) -> u8 {
    (((piece << 4) | (piece ^ 0xf)) & 0xff) as u8
}

/// One of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    First,
    Second,
}

impl Player {
    fn from_index(index: usize) -> Self {
        if index & 1 == 0 { Player::First } else { Player::Second }
    }

    /// Zero-based player index.
    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.index() + 1)
    }
}

/// The kind of move expected next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextAction {
    /// Select a piece for the opponent to place (or claim a Quarto).
    Select,
    /// Place the piece selected by the opponent.
    Place,
    /// Pass (or claim a Quarto).
    Pass,
    /// The game is over.
    None,
}

/// A single move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    /// Hand the given piece to the opponent.
    Select(Piece),
    /// Place the pending piece on the given field.
    Place(Field),
    /// Claim a completed line.
    Quarto,
    /// Do nothing (only during the last two moves).
    Pass,
}

impl Move {
    pub fn selected_piece(self) -> Option<Piece> {
        match self {
            Move::Select(piece) => Some(piece),
            _ => None,
        }
    }

    pub fn placed_field(self) -> Option<Field> {
        match self {
            Move::Place(field) => Some(field),
            _ => None,
        }
    }
}

/// Reason a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is over")]
    GameOver,
    #[error("move does not match the next action ({0:?})")]
    WrongPhase(NextAction),
    #[error("piece {0} is not available")]
    PieceUnavailable(Piece),
    #[error("field {0} is occupied")]
    FieldOccupied(Field),
    #[error("there is no Quarto to claim")]
    NoQuarto,
    #[error("passing is only allowed in the last two moves")]
    PassNotAllowed,
}

#[inline]
fn check_field(field: Field) -> Field {
    assert!(field < NUM_FIELDS, "field out of range: {field}");
    field
}

#[inline]
fn check_piece(piece: Piece) -> Piece {
    assert!(piece < NUM_PIECES, "piece out of range: {piece}");
    piece
}

/// A Quarto game state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    /// Number of moves played so far (0 through 34).
    move_count: usize,
    /// Piece selected most recently. Cleared by the first pass.
    last_piece: Option<Piece>,
    /// Field placed on most recently. Cleared by the second pass.
    last_field: Option<Field>,
    /// Set once a Quarto has been claimed.
    quarto: bool,
    /// Piece occupying each field.
    fields: [Option<Piece>; NUM_FIELDS],
    /// Pieces that have not been selected yet.
    pieces: [bool; NUM_PIECES],
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Create the initial game state: empty board, all pieces available.
    pub fn new() -> Self {
        Self {
            move_count: 0,
            last_piece: None,
            last_field: None,
            quarto: false,
            fields: [None; NUM_FIELDS],
            pieces: [true; NUM_PIECES],
        }
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn last_piece(&self) -> Option<Piece> {
        self.last_piece
    }

    pub fn last_field(&self) -> Option<Field> {
        self.last_field
    }

    pub fn quarto_claimed(&self) -> bool {
        self.quarto
    }

    /// The player who made the previous move.
    pub fn previous_player(&self) -> Player {
        Player::from_index(self.move_count >> 1)
    }

    /// The player to make the next move.
    pub fn next_player(&self) -> Player {
        Player::from_index((self.move_count + 1) >> 1)
    }

    pub fn over(&self) -> bool {
        self.quarto || self.move_count >= MAX_MOVES
    }

    /// The winner, if a Quarto was claimed. `None` both while the game is
    /// running and after a tie; use [`GameState::over`] to tell them apart.
    pub fn winner(&self) -> Option<Player> {
        self.quarto.then(|| self.previous_player())
    }

    pub fn is_empty(&self, field: Field) -> bool {
        self.fields[check_field(field)].is_none()
    }

    pub fn piece_at(&self, field: Field) -> Option<Piece> {
        self.fields[check_field(field)]
    }

    pub fn available(&self, piece: Piece) -> bool {
        self.pieces[check_piece(piece)]
    }

    pub fn next_action(&self) -> NextAction {
        if self.over() {
            NextAction::None
        } else if self.move_count >= PASS_PHASE_START {
            NextAction::Pass
        } else if self.move_count % 2 == 0 {
            NextAction::Select
        } else {
            NextAction::Place
        }
    }

    /// Check whether `mv` may be played now.
    pub fn check(&self, mv: Move) -> Result<(), MoveError> {
        if self.over() {
            return Err(MoveError::GameOver);
        }
        match mv {
            Move::Select(piece) => {
                let action = self.next_action();
                if action != NextAction::Select {
                    return Err(MoveError::WrongPhase(action));
                }
                if !self.available(piece) {
                    return Err(MoveError::PieceUnavailable(piece));
                }
            }
            Move::Place(field) => {
                let action = self.next_action();
                if action != NextAction::Place {
                    return Err(MoveError::WrongPhase(action));
                }
                if !self.is_empty(field) {
                    return Err(MoveError::FieldOccupied(field));
                }
            }
            Move::Quarto => {
                if !self.is_quarto_possible() {
                    return Err(MoveError::NoQuarto);
                }
            }
            Move::Pass => {
                if self.move_count < PASS_PHASE_START {
                    return Err(MoveError::PassNotAllowed);
                }
            }
        }
        Ok(())
    }

    pub fn is_valid(&self, mv: Move) -> bool {
        self.check(mv).is_ok()
    }

    /// Check whether the player to move can claim a Quarto.
    ///
    /// Only the player who made the most recent placement may claim, so the
    /// claim is possible on even move counts only. A line can only become a
    /// Quarto through the placement that completes it, so only the lines
    /// through the last placed field are examined.
    pub fn is_quarto_possible(&self) -> bool {
        if self.move_count < MIN_QUARTO_MOVES || self.over() || self.move_count % 2 != 0 {
            return false;
        }
        let Some(last_field) = self.last_field else {
            return false;
        };
        LINES_PER_FIELD[last_field]
            .iter()
            .any(|&line| self.line_shares_attribute(line))
    }

    /// True if all four fields of `line` are occupied by pieces sharing an
    /// attribute value.
    fn line_shares_attribute(&self, line: usize) -> bool {
        let mut common = 0xffu8;
        for &field in &FIELDS_PER_LINE[line] {
            match self.fields[field] {
                Some(piece) => common &= attribute_values(piece),
                None => return false,
            }
            if common == 0 {
                return false;
            }
        }
        true
    }

    /// List all moves that are valid in this state.
    ///
    /// Returns an empty list once the game is over.
    pub fn list_valid_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(NUM_FIELDS + 1);
        match self.next_action() {
            NextAction::Select => {
                moves.extend((0..NUM_PIECES).filter(|&p| self.pieces[p]).map(Move::Select));
            }
            NextAction::Place => {
                moves.extend(
                    (0..NUM_FIELDS)
                        .filter(|&f| self.fields[f].is_none())
                        .map(Move::Place),
                );
            }
            NextAction::Pass => moves.push(Move::Pass),
            NextAction::None => return moves,
        }
        if self.is_quarto_possible() {
            moves.push(Move::Quarto);
        }
        moves
    }

    /// Validate and apply a move. Returns false (leaving the state
    /// unchanged) if the move is not valid.
    pub fn execute(&mut self, mv: Move) -> bool {
        if !self.is_valid(mv) {
            return false;
        }
        self.execute_valid(mv);
        true
    }

    /// Apply a move without validating it. The caller must ensure the move
    /// is valid.
    pub fn execute_valid(&mut self, mv: Move) {
        match mv {
            Move::Select(piece) => {
                self.pieces[check_piece(piece)] = false;
                self.last_piece = Some(piece);
            }
            Move::Place(field) => {
                let piece = self.last_piece.expect("no piece selected to place");
                self.fields[check_field(field)] = Some(piece);
                self.last_field = Some(field);
            }
            Move::Quarto => self.quarto = true,
            Move::Pass => {
                if self.move_count == PASS_PHASE_START {
                    self.last_piece = None;
                }
                if self.move_count == PASS_PHASE_START + 1 {
                    self.last_field = None;
                }
            }
        }
        self.move_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Play `(piece, field)` pairs as select/place moves.
    fn play(state: &mut GameState, placements: &[(Piece, Field)]) {
        for &(piece, field) in placements {
            assert!(state.execute(Move::Select(piece)), "select {piece}");
            assert!(state.execute(Move::Place(field)), "place at {field}");
        }
    }

    #[test]
    fn test_attribute_values() {
        assert_eq!(attribute_values(0), 0x0f);
        assert_eq!(attribute_values(15), 0xf0);
        assert_eq!(attribute_values(5), 0x5a);
        for piece in 0..NUM_PIECES {
            assert_eq!(attribute_values(piece).count_ones(), 4);
            assert_eq!(attribute_values(piece) & attribute_values(piece ^ 0xf), 0);
        }
    }

    #[test]
    fn test_next_action_cycle() {
        let mut state = GameState::new();
        assert_eq!(state.next_action(), NextAction::Select);
        assert_eq!(state.next_player(), Player::First);
        state.execute(Move::Select(3));
        assert_eq!(state.next_action(), NextAction::Place);
        assert_eq!(state.next_player(), Player::Second);
        state.execute(Move::Place(7));
        assert_eq!(state.next_action(), NextAction::Select);
        assert_eq!(state.next_player(), Player::Second);
        state.execute(Move::Select(4));
        assert_eq!(state.next_player(), Player::First);
    }

    #[test]
    fn test_invalid_moves_rejected() {
        let mut state = GameState::new();
        assert_eq!(state.check(Move::Place(0)), Err(MoveError::WrongPhase(NextAction::Select)));
        assert_eq!(state.check(Move::Pass), Err(MoveError::PassNotAllowed));
        assert_eq!(state.check(Move::Quarto), Err(MoveError::NoQuarto));

        assert!(state.execute(Move::Select(9)));
        let before = state.clone();
        assert!(!state.execute(Move::Select(1)));
        assert_eq!(state, before);
        assert!(state.execute(Move::Place(5)));
        assert_eq!(state.check(Move::Select(9)), Err(MoveError::PieceUnavailable(9)));
        assert!(state.execute(Move::Select(2)));
        assert_eq!(state.check(Move::Place(5)), Err(MoveError::FieldOccupied(5)));
    }

    #[test]
    fn test_quarto_on_row() {
        let mut state = GameState::new();
        // All four pieces have bit 0 set.
        play(&mut state, &[(1, 0), (3, 1), (5, 2), (7, 3)]);
        assert_eq!(state.move_count(), 8);
        assert!(state.is_quarto_possible());
        assert!(state.list_valid_moves().contains(&Move::Quarto));
    }

    #[test]
    fn test_quarto_on_column_and_diagonal() {
        let mut state = GameState::new();
        play(&mut state, &[(8, 0), (9, 4), (10, 8), (11, 12)]);
        assert!(state.is_quarto_possible());

        let mut state = GameState::new();
        play(&mut state, &[(0, 3), (2, 6), (4, 9), (6, 12)]);
        assert!(state.is_quarto_possible());
    }

    #[test]
    fn test_full_line_without_common_attribute() {
        let mut state = GameState::new();
        // 0 and 15 are complementary, so nothing is shared.
        play(&mut state, &[(0, 0), (15, 1), (3, 2), (12, 3)]);
        assert!(!state.is_quarto_possible());
        assert!(!state.is_valid(Move::Quarto));
    }

    #[test]
    fn test_only_placing_player_may_claim() {
        let mut state = GameState::new();
        play(&mut state, &[(1, 0), (3, 1), (5, 2), (7, 3)]);
        assert!(state.is_quarto_possible());
        state.execute(Move::Select(0));
        assert!(!state.is_quarto_possible());
    }

    #[test]
    fn test_claim_wins_for_placing_player() {
        let mut state = GameState::new();
        play(&mut state, &[(1, 0), (3, 1), (5, 2), (7, 3)]);
        let claimant = state.next_player();
        assert!(state.execute(Move::Quarto));
        assert!(state.over());
        assert_eq!(state.winner(), Some(claimant));
        assert_eq!(state.next_action(), NextAction::None);
        assert!(state.list_valid_moves().is_empty());
    }

    #[test]
    fn test_pass_phase_and_tie() {
        let mut state = GameState::new();
        // Fill the board without ever claiming.
        for i in 0..NUM_PIECES {
            play(&mut state, &[(i, i)]);
        }
        assert_eq!(state.move_count(), PASS_PHASE_START);
        assert_eq!(state.next_action(), NextAction::Pass);
        assert!(state.list_valid_moves().contains(&Move::Pass));
        assert!(state.execute(Move::Pass));
        assert_eq!(state.last_piece(), None);
        assert_eq!(state.list_valid_moves(), vec![Move::Pass]);
        assert!(state.execute(Move::Pass));
        assert_eq!(state.last_field(), None);
        assert!(state.over());
        assert_eq!(state.winner(), None);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_field_panics() {
        GameState::new().piece_at(16);
    }
}
