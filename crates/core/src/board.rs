//! Board module - manages the game grid
//!
//! The board is a 7x9 grid where each cell holds a [`Symbol`].
//! Uses a flat array for better cache locality and cheap by-value copies: every
//! transition returns a new `Board`, so search nodes never alias.
//! Coordinates: (row, col) where row ranges 0..8 (top to bottom), col ranges 0..6
//! (left to right). Pieces rest on row 8 and stack upward.
//!
//! Besides the cells the board tracks the cursor column, the piece it holds
//! (if any), per-cell `matching` flags for blocks the game is currently
//! clearing, and the chain points accumulated by releases.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::matches::resolve_chains;
use crate::scoring::ScorePolicy;
use crate::types::{Move, Symbol, BOARD_COLS, BOARD_ROWS, CENTER_COLUMN};

/// Total number of cells on the board
pub const BOARD_SIZE: usize = (BOARD_ROWS as usize) * (BOARD_COLS as usize);

const ROWS: usize = BOARD_ROWS as usize;
const COLS: usize = BOARD_COLS as usize;

/// Why a move cannot be applied to a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("cursor is already at the edge")]
    AtEdge,
    #[error("no piece is held")]
    NothingHeld,
    #[error("a piece is already held")]
    AlreadyHolding,
    #[error("column {0} is empty")]
    EmptyColumn(u8),
    #[error("column {0} is full")]
    ColumnFull(u8),
    #[error("column {0} has no cell to swap with")]
    OutOfBounds(u8),
    #[error("the target cell in column {0} cannot be moved")]
    Immovable(u8),
    #[error("column {0} is out of range")]
    ColumnOutOfRange(u8),
}

/// The game board - 7 columns x 9 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Flat array of cells, row-major order (row * COLS + col)
    cells: [Symbol; BOARD_SIZE],
    /// Bit `i` set = cell `i` is animating a clear
    matching: u64,
    cursor: u8,
    held: Option<Symbol>,
    points: i64,
}

impl Board {
    /// Create a new empty board with the cursor over the center column
    pub fn new() -> Self {
        Self {
            cells: [Symbol::Empty; BOARD_SIZE],
            matching: 0,
            cursor: CENTER_COLUMN,
            held: None,
            points: 0,
        }
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    pub(crate) fn index(row: usize, col: usize) -> Option<usize> {
        if row >= ROWS || col >= COLS {
            return None;
        }
        Some(row * COLS + col)
    }

    pub fn rows(&self) -> usize {
        ROWS
    }

    pub fn cols(&self) -> usize {
        COLS
    }

    /// Get cell at (row, col); `None` if out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        Self::index(row, col).map(|idx| self.cells[idx])
    }

    /// Set cell at (row, col); returns false if out of bounds or `symbol` is `Unknown`
    pub fn set(&mut self, row: usize, col: usize, symbol: Symbol) -> bool {
        if symbol == Symbol::Unknown {
            return false;
        }
        match Self::index(row, col) {
            Some(idx) => {
                self.cells[idx] = symbol;
                if symbol == Symbol::Empty {
                    self.matching &= !(1u64 << idx);
                }
                true
            }
            None => false,
        }
    }

    /// Whether the cell is part of a clear the game is still animating
    pub fn is_matching(&self, row: usize, col: usize) -> bool {
        Self::index(row, col)
            .map(|idx| self.matching & (1u64 << idx) != 0)
            .unwrap_or(false)
    }

    /// Flag a cell as matching; only colors and wildcards can be flagged, not bombs
    pub fn set_matching(&mut self, row: usize, col: usize, matching: bool) -> bool {
        let Some(idx) = Self::index(row, col) else {
            return false;
        };
        if matching && !self.cells[idx].is_matchable() {
            return false;
        }
        if matching {
            self.matching |= 1u64 << idx;
        } else {
            self.matching &= !(1u64 << idx);
        }
        true
    }

    pub(crate) fn matching_bits(&self) -> u64 {
        self.matching
    }

    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Move the cursor; returns false if out of range
    pub fn set_cursor(&mut self, col: u8) -> bool {
        if col >= BOARD_COLS {
            return false;
        }
        self.cursor = col;
        true
    }

    pub fn held(&self) -> Option<Symbol> {
        self.held
    }

    /// Set the held piece; `Empty` clears it, `Unknown` is rejected
    pub fn set_held(&mut self, held: Option<Symbol>) -> bool {
        match held {
            Some(Symbol::Unknown) => false,
            Some(Symbol::Empty) | None => {
                self.held = None;
                true
            }
            Some(symbol) => {
                self.held = Some(symbol);
                true
            }
        }
    }

    /// Chain points accumulated by releases since this board was observed
    pub fn points(&self) -> i64 {
        self.points
    }

    pub(crate) fn add_points(&mut self, points: i64) {
        self.points = self.points.saturating_add(points);
    }

    /// Row of the topmost piece in `col`
    pub fn top(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).find(|&row| self.cells[row * COLS + col].is_piece())
    }

    /// Height of the stack in `col`, measured from the floor to its top piece
    pub fn column_height(&self, col: usize) -> usize {
        self.top(col).map(|row| ROWS - row).unwrap_or(0)
    }

    /// Height of the tallest column
    pub fn stack_height(&self) -> usize {
        (0..COLS).map(|col| self.column_height(col)).max().unwrap_or(0)
    }

    /// Heights of all columns, left to right
    pub fn heights(&self) -> [usize; COLS] {
        let mut out = [0usize; COLS];
        for (col, h) in out.iter_mut().enumerate() {
            *h = self.column_height(col);
        }
        out
    }

    /// Number of occupied cells
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_piece()).count()
    }

    /// True when no cell is occupied and nothing is held
    pub fn is_empty(&self) -> bool {
        self.held.is_none() && self.cells.iter().all(|c| *c == Symbol::Empty)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Forget accumulated points, e.g. when a projected board becomes the next root
    pub fn reset_points(&mut self) {
        self.points = 0;
    }

    /// Moves worth trying from this state, legal or not
    ///
    /// With nothing held, every column is a grab candidate; with a piece held,
    /// the four carry moves are.
    pub fn candidate_moves(&self) -> ArrayVec<Move, COLS> {
        let mut out = ArrayVec::new();
        if self.held.is_none() {
            for col in 0..BOARD_COLS {
                out.push(Move::Grab(col));
            }
        } else {
            out.push(Move::ShiftLeft);
            out.push(Move::ShiftRight);
            out.push(Move::SwapDown);
            out.push(Move::Release);
        }
        out
    }

    /// Apply a move with the default score policy
    pub fn apply_move(&self, mv: Move) -> Result<Board, IllegalMove> {
        self.apply_move_with(mv, &ScorePolicy::DEFAULT)
    }

    /// Validate and apply a single move, returning the resulting board
    ///
    /// Only `Release` can clear blocks: after the drop, matches are cleared and
    /// the board settled repeatedly until stable, each step scored by `policy`.
    pub fn apply_move_with(&self, mv: Move, policy: &ScorePolicy) -> Result<Board, IllegalMove> {
        let mut next = self.clone();
        match mv {
            Move::Grab(col) => {
                if self.held.is_some() {
                    return Err(IllegalMove::AlreadyHolding);
                }
                if col >= BOARD_COLS {
                    return Err(IllegalMove::ColumnOutOfRange(col));
                }
                let row = self.top(col as usize).ok_or(IllegalMove::EmptyColumn(col))?;
                let symbol = self.cells[row * COLS + col as usize];
                if !symbol.is_movable() || self.is_matching(row, col as usize) {
                    return Err(IllegalMove::Immovable(col));
                }
                next.cells[row * COLS + col as usize] = Symbol::Empty;
                next.held = Some(symbol);
                next.cursor = col;
            }
            Move::ShiftLeft => {
                if self.held.is_none() {
                    return Err(IllegalMove::NothingHeld);
                }
                if self.cursor == 0 {
                    return Err(IllegalMove::AtEdge);
                }
                next.cursor -= 1;
            }
            Move::ShiftRight => {
                if self.held.is_none() {
                    return Err(IllegalMove::NothingHeld);
                }
                if self.cursor + 1 >= BOARD_COLS {
                    return Err(IllegalMove::AtEdge);
                }
                next.cursor += 1;
            }
            Move::SwapDown => {
                let held = self.held.ok_or(IllegalMove::NothingHeld)?;
                let col = self.cursor;
                let row = self
                    .top(col as usize)
                    .ok_or(IllegalMove::OutOfBounds(col))?;
                let target = self.cells[row * COLS + col as usize];
                if !target.is_movable() || self.is_matching(row, col as usize) {
                    return Err(IllegalMove::Immovable(col));
                }
                next.cells[row * COLS + col as usize] = held;
                next.held = Some(target);
            }
            Move::Release => {
                let held = self.held.ok_or(IllegalMove::NothingHeld)?;
                let col = self.cursor;
                let row = match self.top(col as usize) {
                    Some(0) => return Err(IllegalMove::ColumnFull(col)),
                    Some(top) => top - 1,
                    None => ROWS - 1,
                };
                next.cells[row * COLS + col as usize] = held;
                next.held = None;
                let (resolved, _) = resolve_chains(&next, policy);
                next = resolved;
            }
        }
        Ok(next)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(cells: &[(usize, usize, Symbol)]) -> Board {
        let mut board = Board::new();
        for &(row, col, symbol) in cells {
            assert!(board.set(row, col, symbol));
        }
        board
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(0, 6), Some(6));
        assert_eq!(Board::index(1, 0), Some(7));
        assert_eq!(Board::index(8, 6), Some(62));
        assert_eq!(Board::index(9, 0), None);
        assert_eq!(Board::index(0, 7), None);
    }

    #[test]
    fn test_set_rejects_unknown() {
        let mut board = Board::new();
        assert!(!board.set(0, 0, Symbol::Unknown));
        assert_eq!(board.get(0, 0), Some(Symbol::Empty));
    }

    #[test]
    fn test_heights() {
        let board = board_with(&[(8, 0, Symbol::Red), (7, 0, Symbol::Blue), (8, 3, Symbol::Green)]);
        assert_eq!(board.top(0), Some(7));
        assert_eq!(board.column_height(0), 2);
        assert_eq!(board.column_height(1), 0);
        assert_eq!(board.stack_height(), 2);
        assert_eq!(board.heights(), [2, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_grab_lifts_top_piece_and_moves_cursor() {
        let board = board_with(&[(8, 1, Symbol::Red), (7, 1, Symbol::Blue)]);
        let next = board.apply_move(Move::Grab(1)).unwrap();
        assert_eq!(next.held(), Some(Symbol::Blue));
        assert_eq!(next.cursor(), 1);
        assert_eq!(next.get(7, 1), Some(Symbol::Empty));
        // The source board is untouched.
        assert_eq!(board.get(7, 1), Some(Symbol::Blue));
    }

    #[test]
    fn test_grab_errors() {
        let board = board_with(&[(8, 2, Symbol::Obstacle)]);
        assert_eq!(board.apply_move(Move::Grab(0)), Err(IllegalMove::EmptyColumn(0)));
        assert_eq!(board.apply_move(Move::Grab(2)), Err(IllegalMove::Immovable(2)));
        assert_eq!(board.apply_move(Move::Grab(9)), Err(IllegalMove::ColumnOutOfRange(9)));

        let mut holding = Board::new();
        holding.set_held(Some(Symbol::Red));
        assert_eq!(holding.apply_move(Move::Grab(2)), Err(IllegalMove::AlreadyHolding));
    }

    #[test]
    fn test_shift_edges() {
        let mut board = Board::new();
        assert_eq!(board.apply_move(Move::ShiftLeft), Err(IllegalMove::NothingHeld));

        board.set_held(Some(Symbol::Pink));
        board.set_cursor(0);
        assert_eq!(board.apply_move(Move::ShiftLeft), Err(IllegalMove::AtEdge));
        assert_eq!(board.apply_move(Move::ShiftRight).unwrap().cursor(), 1);

        board.set_cursor(BOARD_COLS - 1);
        assert_eq!(board.apply_move(Move::ShiftRight), Err(IllegalMove::AtEdge));
    }

    #[test]
    fn test_swap_down_exchanges_with_top() {
        let mut board = board_with(&[(8, 4, Symbol::Green)]);
        board.set_cursor(4);
        board.set_held(Some(Symbol::Yellow));
        let next = board.apply_move(Move::SwapDown).unwrap();
        assert_eq!(next.get(8, 4), Some(Symbol::Yellow));
        assert_eq!(next.held(), Some(Symbol::Green));

        board.set_cursor(5);
        assert_eq!(board.apply_move(Move::SwapDown), Err(IllegalMove::OutOfBounds(5)));

        let mut blocked = board_with(&[(8, 4, Symbol::Obstacle)]);
        blocked.set_cursor(4);
        blocked.set_held(Some(Symbol::Yellow));
        assert_eq!(blocked.apply_move(Move::SwapDown), Err(IllegalMove::Immovable(4)));
    }

    #[test]
    fn test_release_stacks_on_top() {
        let mut board = board_with(&[(8, 0, Symbol::Red)]);
        board.set_cursor(0);
        board.set_held(Some(Symbol::Blue));
        let next = board.apply_move(Move::Release).unwrap();
        assert_eq!(next.get(7, 0), Some(Symbol::Blue));
        assert_eq!(next.held(), None);
        assert_eq!(next.points(), 0);
    }

    #[test]
    fn test_release_into_full_column_fails() {
        let mut board = Board::new();
        for row in 0..ROWS {
            let symbol = if row % 2 == 0 { Symbol::Red } else { Symbol::Blue };
            board.set(row, 2, symbol);
        }
        board.set_cursor(2);
        board.set_held(Some(Symbol::Green));
        assert_eq!(board.apply_move(Move::Release), Err(IllegalMove::ColumnFull(2)));
    }

    #[test]
    fn test_release_completing_run_clears_it() {
        let mut board = board_with(&[(8, 2, Symbol::Red), (7, 2, Symbol::Red)]);
        board.set_cursor(2);
        board.set_held(Some(Symbol::Red));
        let next = board.apply_move(Move::Release).unwrap();
        assert_eq!(next.column_height(2), 0);
        assert!(next.points() > 0);
    }

    #[test]
    fn test_bomb_pair_clears_on_release() {
        let mut board = board_with(&[(8, 5, Symbol::Blue), (7, 5, Symbol::RedBomb)]);
        board.set_cursor(5);
        board.set_held(Some(Symbol::RedBomb));
        let next = board.apply_move(Move::Release).unwrap();
        assert_eq!(next.column_height(5), 1);
        assert_eq!(next.get(8, 5), Some(Symbol::Blue));
        assert_eq!(next.points(), ScorePolicy::DEFAULT.chain_points(1, 2));

        // A bomb is carried like any block.
        let lone = board_with(&[(8, 1, Symbol::PinkBomb)]);
        let grabbed = lone.apply_move(Move::Grab(1)).unwrap();
        assert_eq!(grabbed.held(), Some(Symbol::PinkBomb));
    }

    #[test]
    fn test_matching_cell_is_immovable() {
        let mut board = board_with(&[(8, 3, Symbol::Red)]);
        assert!(board.set_matching(8, 3, true));
        assert!(!board.set_matching(0, 0, true));
        board.set(8, 4, Symbol::Obstacle);
        assert!(!board.set_matching(8, 4, true));
        assert_eq!(board.apply_move(Move::Grab(3)), Err(IllegalMove::Immovable(3)));
    }

    #[test]
    fn test_candidate_moves() {
        let board = Board::new();
        assert_eq!(board.candidate_moves().len(), COLS);

        let mut holding = Board::new();
        holding.set_held(Some(Symbol::Red));
        assert_eq!(
            holding.candidate_moves().as_slice(),
            &[Move::ShiftLeft, Move::ShiftRight, Move::SwapDown, Move::Release]
        );
    }
}
