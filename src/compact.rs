//! Compact, incrementally maintained game state for simulation.
//!
//! [`CompactState`] mirrors the board of a [`GameState`] but additionally
//! keeps, for every line, the intersection of the attribute values of the
//! pieces placed on it and the number of empty fields left. This makes it
//! possible to tell in constant time which pieces would let the opponent
//! complete a line, which is what both the search tree and the playouts need.
//!
//! Unlike [`GameState`], a compact state knows nothing about move counts,
//! passes or Quarto claims: a line completed during search simply ends the
//! simulated game.

use crate::constants::{ALL_PIECES, LINES_PER_FIELD, NUM_FIELDS, NUM_LINES, NUM_PIECES};
use crate::game::{Field, GameState, Move, NextAction, Piece, attribute_values};

/// Running state of a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineState {
    /// Intersection of the attribute values of the pieces on this line.
    pub common: u8,
    /// Number of empty fields on this line.
    pub slots_left: u8,
}

impl Default for LineState {
    fn default() -> Self {
        Self {
            common: 0xff,
            slots_left: 4,
        }
    }
}

/// A list of at most 16 piece or field indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveList {
    items: [u8; 16],
    len: u8,
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveList {
    pub const fn new() -> Self {
        Self {
            items: [0; 16],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, value: usize) {
        self.items[self.len as usize] = value as u8;
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.as_slice()[index] as usize
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.items[..self.len as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.as_slice().iter().map(|&v| v as usize)
    }

    pub fn contains(&self, value: usize) -> bool {
        self.iter().any(|v| v == value)
    }
}

/// Board state used by the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompactState {
    /// Piece waiting to be placed, or `None` if a piece must be selected.
    pending: Option<u8>,
    /// Bitmask of pieces that are neither placed nor pending.
    pieces: u16,
    /// Piece on each field.
    fields: [Option<u8>; NUM_FIELDS],
    /// State of each line.
    lines: [LineState; NUM_LINES],
}

impl Default for CompactState {
    fn default() -> Self {
        Self::new()
    }
}

impl CompactState {
    /// The state of an empty board where the first piece must be selected.
    pub fn new() -> Self {
        Self {
            pending: None,
            pieces: ALL_PIECES,
            fields: [None; NUM_FIELDS],
            lines: [LineState::default(); NUM_LINES],
        }
    }

    /// Derive the compact state of a game position.
    ///
    /// The game's next action must be `Select` or `Place`.
    pub fn from_game(state: &GameState) -> Self {
        let mut compact = Self::new();
        match state.next_action() {
            NextAction::Select => {}
            NextAction::Place => {
                let piece = state.last_piece().expect("place turn without a selected piece");
                compact.pending = Some(piece as u8);
                compact.pieces &= !(1 << piece);
            }
            action => panic!("no compact state for next action {action:?}"),
        }
        for field in 0..NUM_FIELDS {
            if let Some(piece) = state.piece_at(field) {
                assert!(compact.pieces & (1 << piece) != 0, "piece {piece} used twice");
                compact.pieces &= !(1 << piece);
                compact.put(field, piece);
            }
        }
        compact
    }

    /// True if the next move selects a piece, false if it places one.
    #[inline]
    pub fn must_select(&self) -> bool {
        self.pending.is_none()
    }

    pub fn pending(&self) -> Option<Piece> {
        self.pending.map(Piece::from)
    }

    /// Bitmask of the pieces still available for selection.
    pub fn available_pieces(&self) -> u16 {
        self.pieces
    }

    pub fn piece_at(&self, field: Field) -> Option<Piece> {
        self.fields[field].map(Piece::from)
    }

    pub fn line(&self, line: usize) -> LineState {
        self.lines[line]
    }

    /// True once every piece has been placed.
    #[inline]
    pub fn finished(&self) -> bool {
        self.pending.is_none() && self.pieces == 0
    }

    /// True if some line holds four pieces sharing an attribute value.
    pub fn has_quarto(&self) -> bool {
        self.lines.iter().any(|l| l.slots_left == 0 && l.common != 0)
    }

    /// Select `piece` for the opponent to place.
    pub fn select(&mut self, piece: Piece) {
        assert!(piece < NUM_PIECES);
        assert!(self.pending.is_none(), "a piece is already pending");
        assert!(self.pieces & (1 << piece) != 0, "piece {piece} is not available");
        self.pending = Some(piece as u8);
        self.pieces &= !(1 << piece);
    }

    /// Place the pending piece on `field`.
    pub fn place(&mut self, field: Field) {
        assert!(field < NUM_FIELDS);
        assert!(self.fields[field].is_none(), "field {field} is occupied");
        let piece = self.pending.take().expect("no piece pending");
        self.put(field, piece as Piece);
    }

    /// Apply a select or place move, whichever the state expects.
    #[inline]
    pub fn apply(&mut self, index: usize) {
        if self.must_select() {
            self.select(index);
        } else {
            self.place(index);
        }
    }

    /// Wrap a candidate index into the move kind this state expects.
    #[inline]
    pub fn to_move(&self, index: usize) -> Move {
        if self.must_select() {
            Move::Select(index)
        } else {
            Move::Place(index)
        }
    }

    fn put(&mut self, field: Field, piece: Piece) {
        self.fields[field] = Some(piece as u8);
        let values = attribute_values(piece);
        for &line in LINES_PER_FIELD[field] {
            let line = &mut self.lines[line];
            line.slots_left -= 1;
            line.common &= values;
        }
    }

    /// Union of the attribute values that would complete a line with one
    /// empty field left.
    pub fn winning_values(&self) -> u8 {
        self.lines
            .iter()
            .filter(|l| l.slots_left == 1)
            .fold(0, |acc, l| acc | l.common)
    }

    /// List the moves that don't hand the opponent an immediate win.
    ///
    /// When selecting, pieces that would complete a threatened line are
    /// excluded; the list is empty if every available piece loses. When
    /// placing, every empty field is listed.
    pub fn non_losing_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        if self.must_select() {
            let winning = self.winning_values();
            for piece in 0..NUM_PIECES {
                if self.pieces & (1 << piece) != 0 && attribute_values(piece) & winning == 0 {
                    moves.push(piece);
                }
            }
        } else {
            self.push_empty_fields(&mut moves);
        }
        moves
    }

    /// List every legal select or place move, losing or not.
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        if self.must_select() {
            for piece in (0..NUM_PIECES).filter(|&p| self.pieces & (1 << p) != 0) {
                moves.push(piece);
            }
        } else {
            self.push_empty_fields(&mut moves);
        }
        moves
    }

    fn push_empty_fields(&self, moves: &mut MoveList) {
        for field in (0..NUM_FIELDS).filter(|&f| self.fields[f].is_none()) {
            moves.push(field);
        }
    }
}
