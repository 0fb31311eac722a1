//! Text representation of pieces, moves, boards and game histories.
//!
//! ## Pieces
//!
//! Each piece is shown as four characters, one per attribute, most
//! significant bit first. Attribute `j` uses the characters at positions
//! `2j` and `2j + 1` of `"ab+-01xy"`, so piece 0 is `a+0x` and piece 15 is
//! `b-1y`.
//!
//! ## Fields
//!
//! Fields are named by column letter (`A`-`D`) and row digit (`1`-`4`), with
//! row 4 at the top of the board. Field 0 is `A4`, field 15 is `D1`.
//!
//! ## Histories
//!
//! A game history is a string with one base-34 digit (`0-9a-x`) per move:
//! digits 0-15 select that piece, 16-31 place on field `digit - 16`, 32
//! claims a Quarto and 33 passes.

use std::fmt;

use thiserror::Error;

use crate::constants::{BOARD_WIDTH, NUM_FIELDS, NUM_PIECES};
use crate::game::{Field, GameState, Move, MoveError, NextAction, Piece};

const PALETTE: &[u8; 8] = b"ab+-01xy";

const HISTORY_DIGITS: &[u8; 34] = b"0123456789abcdefghijklmnopqrstuvwx";

/// Errors from decoding or replaying a game history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("invalid history digit {ch:?} at position {index}")]
    InvalidDigit { index: usize, ch: char },
    #[error("move {index} ({mv}) is not allowed")]
    IllegalMove {
        index: usize,
        mv: Move,
        #[source]
        source: MoveError,
    },
}

/// The four-character id of a piece.
pub fn piece_id(piece: Piece) -> String {
    assert!(piece < NUM_PIECES);
    (0..4)
        .map(|j| PALETTE[2 * j + ((piece >> (3 - j)) & 1)] as char)
        .collect()
}

/// The name of a field, e.g. `A4` for field 0.
pub fn field_name(field: Field) -> String {
    assert!(field < NUM_FIELDS);
    let column = (b'A' + (field % BOARD_WIDTH) as u8) as char;
    let row = (b'4' - (field / BOARD_WIDTH) as u8) as char;
    format!("{column}{row}")
}

/// Parse a move typed by a player.
///
/// Accepts field names (`a1`-`d4`), piece ids, `p`/`pass` and `q`/`quarto`,
/// all case-insensitive. Returns `None` if the text is not a move.
pub fn parse_move(text: &str) -> Option<Move> {
    let lower = text.trim().to_lowercase();
    match lower.as_str() {
        "p" | "pass" => return Some(Move::Pass),
        "q" | "quarto" => return Some(Move::Quarto),
        _ => {}
    }
    let bytes = lower.as_bytes();
    if let [column @ b'a'..=b'd', row @ b'1'..=b'4'] = bytes {
        let field = BOARD_WIDTH * (b'4' - row) as usize + (column - b'a') as usize;
        return Some(Move::Place(field));
    }
    (0..NUM_PIECES)
        .find(|&piece| piece_id(piece) == lower)
        .map(Move::Select)
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::Select(piece) => f.write_str(&piece_id(piece)),
            Move::Place(field) => f.write_str(&field_name(field)),
            Move::Quarto => f.write_str("quarto"),
            Move::Pass => f.write_str("pass"),
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_WIDTH {
            write!(f, "{} ", BOARD_WIDTH - row)?;
            for column in 0..BOARD_WIDTH {
                let field = row * BOARD_WIDTH + column;
                let id = self.piece_at(field).map_or_else(|| "....".to_string(), piece_id);
                if self.last_field() == Some(field) {
                    write!(f, "[{id}]")?;
                } else {
                    write!(f, " {id} ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "   A     B     C     D")?;

        let available: Vec<String> = (0..NUM_PIECES)
            .filter(|&p| self.available(p))
            .map(piece_id)
            .collect();
        writeln!(f, "available: {}", available.join(" "))?;
        if self.next_action() == NextAction::Place {
            if let Some(piece) = self.last_piece() {
                writeln!(f, "to place: {}", piece_id(piece))?;
            }
        }
        Ok(())
    }
}

fn history_digit(mv: Move) -> usize {
    match mv {
        Move::Select(piece) => piece,
        Move::Place(field) => NUM_PIECES + field,
        Move::Quarto => NUM_PIECES + NUM_FIELDS,
        Move::Pass => NUM_PIECES + NUM_FIELDS + 1,
    }
}

/// Encode a sequence of moves as a history string.
pub fn encode_history(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|&mv| HISTORY_DIGITS[history_digit(mv)] as char)
        .collect()
}

/// Decode a history string into moves. The moves are not validated.
pub fn decode_history(history: &str) -> Result<Vec<Move>, NotationError> {
    history
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            let digit = HISTORY_DIGITS
                .iter()
                .position(|&d| d as char == ch)
                .ok_or(NotationError::InvalidDigit { index, ch })?;
            Ok(match digit {
                d if d < NUM_PIECES => Move::Select(d),
                d if d < NUM_PIECES + NUM_FIELDS => Move::Place(d - NUM_PIECES),
                d if d == NUM_PIECES + NUM_FIELDS => Move::Quarto,
                _ => Move::Pass,
            })
        })
        .collect()
}

/// Decode a history string and replay it from the initial position.
pub fn replay_history(history: &str) -> Result<GameState, NotationError> {
    let mut state = GameState::new();
    for (index, mv) in decode_history(history)?.into_iter().enumerate() {
        state
            .check(mv)
            .map_err(|source| NotationError::IllegalMove { index, mv, source })?;
        state.execute_valid(mv);
    }
    Ok(state)
}
