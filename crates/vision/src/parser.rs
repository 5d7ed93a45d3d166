//! Board parser - turns a grid of sampled colors into a validated [`Board`]
//!
//! Every cell is classified independently. A cell that comes back
//! [`Symbol::Unknown`] resolves to Empty unless the board cannot be empty
//! there, in which case parsing fails and the caller retries on the next
//! frame:
//!
//! - the cell is in the configured must-resolve mask, or
//! - the cell directly above it resolved to a piece (stacks are supported from
//!   below, so the cell under a piece is occupied).
//!
//! A secondary per-cell signal (brightness of the animation overlay) marks
//! cells the game is currently clearing. It sets the `matching` flag and never
//! changes the symbol.

use hackmatch_core::Board;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::ClassifierTable;
use crate::types::{Color, Matrix, Symbol, BOARD_COLS, BOARD_ROWS};

const ROWS: usize = BOARD_ROWS as usize;
const COLS: usize = BOARD_COLS as usize;

/// Signal level at or above which a cell counts as matching
pub const DEFAULT_MATCHING_THRESHOLD: u8 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("cell ({row}, {col}) could not be classified")]
    AmbiguousCell { row: usize, col: usize },
    #[error("held piece could not be classified")]
    AmbiguousHeld,
    #[error("expected a 9x7 grid, got {rows}x{cols}")]
    MalformedGrid { rows: usize, cols: usize },
    #[error("cursor column {0} is off the board")]
    CursorOutOfRange(u8),
}

/// Where the cursor was seen, and the color of the piece it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSample {
    pub column: u8,
    /// `None` when the cursor area could not be sampled at all
    pub held: Option<Color>,
}

/// One observation from a capture source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub colors: Matrix<Color>,
    pub signal: Option<Matrix<u8>>,
    pub cursor: Option<CursorSample>,
}

impl Frame {
    pub fn new(colors: Matrix<Color>) -> Self {
        Self {
            colors,
            signal: None,
            cursor: None,
        }
    }
}

/// Cells that must classify to a known symbol
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMask {
    #[default]
    None,
    All,
    /// The bottom `n` rows
    BottomRows(u8),
    /// Explicit `(row, col)` cells
    Cells(Vec<(u8, u8)>),
}

impl ResolveMask {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        match self {
            ResolveMask::None => false,
            ResolveMask::All => true,
            ResolveMask::BottomRows(n) => row + (*n as usize) >= ROWS,
            ResolveMask::Cells(cells) => cells
                .iter()
                .any(|&(r, c)| r as usize == row && c as usize == col),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub matching_threshold: u8,
    pub must_resolve: ResolveMask,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            matching_threshold: DEFAULT_MATCHING_THRESHOLD,
            must_resolve: ResolveMask::None,
        }
    }
}

/// Classifier table plus parsing policy
#[derive(Debug, Clone, Default)]
pub struct BoardParser {
    table: ClassifierTable,
    config: ParserConfig,
}

impl BoardParser {
    pub fn new(table: ClassifierTable, config: ParserConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &ClassifierTable {
        &self.table
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a color grid; the cursor stays on its default column
    pub fn parse(&self, grid: &Matrix<Color>) -> Result<Board, ParseError> {
        check_dims(grid.rows(), grid.cols())?;

        let classified = grid.map(|c| self.table.classify(*c));
        let mut board = Board::new();
        for (row, col, symbol) in classified.iter() {
            let symbol = match *symbol {
                Symbol::Unknown => {
                    let under_piece = row > 0
                        && classified
                            .get(row - 1, col)
                            .is_some_and(|above| above.is_piece());
                    if under_piece || self.config.must_resolve.contains(row, col) {
                        return Err(ParseError::AmbiguousCell { row, col });
                    }
                    Symbol::Empty
                }
                known => known,
            };
            board.set(row, col, symbol);
        }
        Ok(board)
    }

    /// Parse a full frame: colors, animation signal and cursor
    pub fn parse_frame(&self, frame: &Frame) -> Result<Board, ParseError> {
        let mut board = self.parse(&frame.colors)?;

        if let Some(signal) = &frame.signal {
            check_dims(signal.rows(), signal.cols())?;
            for (row, col, level) in signal.iter() {
                if *level >= self.config.matching_threshold {
                    // Only colors and wildcards take the flag; it is refused elsewhere.
                    board.set_matching(row, col, true);
                }
            }
        }

        if let Some(cursor) = frame.cursor {
            if !board.set_cursor(cursor.column) {
                return Err(ParseError::CursorOutOfRange(cursor.column));
            }
            if let Some(color) = cursor.held {
                match self.table.classify(color) {
                    Symbol::Unknown => return Err(ParseError::AmbiguousHeld),
                    held if held.is_movable() => {
                        board.set_held(Some(held));
                    }
                    _ => {
                        board.set_held(None);
                    }
                }
            }
        }

        Ok(board)
    }
}

fn check_dims(rows: usize, cols: usize) -> Result<(), ParseError> {
    if rows != ROWS || cols != COLS {
        return Err(ParseError::MalformedGrid { rows, cols });
    }
    Ok(())
}

/// Render a board back into the frame a capture source would produce
///
/// Each symbol becomes its first reference color; matching cells get a full
/// signal. Symbols missing from the table fall back to black.
pub fn render(board: &Board, table: &ClassifierTable) -> Frame {
    let color_of = |symbol: Symbol| table.reference(symbol).unwrap_or_default();

    let mut colors = Matrix::filled(ROWS, COLS, Color::default());
    let mut signal = Matrix::filled(ROWS, COLS, 0u8);
    for row in 0..ROWS {
        for col in 0..COLS {
            let symbol = board.get(row, col).unwrap_or(Symbol::Empty);
            colors.set(row, col, color_of(symbol));
            if board.is_matching(row, col) {
                signal.set(row, col, u8::MAX);
            }
        }
    }

    Frame {
        colors,
        signal: Some(signal),
        cursor: Some(CursorSample {
            column: board.cursor(),
            held: Some(color_of(board.held().unwrap_or(Symbol::Empty))),
        }),
    }
}
