//! Constants for board geometry, turn structure, and search parameters.
//!
//! The board is a flat array of 16 fields, numbered row by row from the top
//! left corner. Lines are numbered as follows:
//!
//! - `0..4`: rows (top to bottom)
//! - `4..8`: columns (left to right)
//! - `8`: main diagonal (fields 0, 5, 10, 15)
//! - `9`: anti-diagonal (fields 3, 6, 9, 12)

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of fields on the board.
pub const NUM_FIELDS: usize = 16;

/// Number of distinct pieces. Each piece is a 4-bit attribute vector.
pub const NUM_PIECES: usize = 16;

/// Number of lines (4 rows, 4 columns, 2 diagonals).
pub const NUM_LINES: usize = 10;

/// Width (and height) of the board.
pub const BOARD_WIDTH: usize = 4;

/// Bitmask with one bit set for every piece.
pub const ALL_PIECES: u16 = 0xffff;

/// Lines passing through each field.
pub const LINES_PER_FIELD: [&[usize]; NUM_FIELDS] = [
    &[0, 4, 8],
    &[0, 5],
    &[0, 6],
    &[0, 7, 9],
    &[1, 4],
    &[1, 5, 8],
    &[1, 6, 9],
    &[1, 7],
    &[2, 4],
    &[2, 5, 9],
    &[2, 6, 8],
    &[2, 7],
    &[3, 4, 9],
    &[3, 5],
    &[3, 6],
    &[3, 7, 8],
];

/// Fields making up each line.
pub const FIELDS_PER_LINE: [[usize; 4]; NUM_LINES] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    [0, 5, 10, 15],
    [3, 6, 9, 12],
];

// =============================================================================
// Turn Structure
// =============================================================================

/// Number of select/place plies (16 of each) before the pass phase.
pub const PASS_PHASE_START: usize = 32;

/// Move count at which an unresolved game ends in a tie.
pub const MAX_MOVES: usize = 34;

/// Fewest moves after which a line can hold four pieces (four select/place pairs).
pub const MIN_QUARTO_MOVES: usize = 8;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default number of search iterations per move decision.
pub const ITERATIONS_PER_MOVE: u32 = 1_000_000;

/// Default exploration constant in the UCB formula.
pub const EXPLORATION_CONSTANT: f64 = 2.0;
