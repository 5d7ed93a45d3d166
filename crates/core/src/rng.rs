//! RNG module - deterministic board generation
//!
//! Provides a simple LCG and a generator for random *stable* boards (no run of
//! three anywhere), used by tests and benchmarks that need realistic positions
//! without a capture source.

use crate::board::Board;
use crate::types::{Symbol, BOARD_COLS, BOARD_ROWS, MIN_RUN};

const ROWS: usize = BOARD_ROWS as usize;
const COLS: usize = BOARD_COLS as usize;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // The low bits of an LCG are weak; use the high half.
        (self.next_u32() >> 16) % max.max(1)
    }

    /// True with probability `percent`/100
    pub fn chance(&mut self, percent: u32) -> bool {
        self.next_range(100) < percent
    }
}

/// Shape of the boards produced by [`random_board`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGen {
    /// Tallest column allowed
    pub max_height: usize,
    /// Percent of cells that become obstacles
    pub obstacle_pct: u32,
    /// Percent of cells that become wildcards
    pub wildcard_pct: u32,
    /// Percent of cells that become bombs
    pub bomb_pct: u32,
}

impl Default for BoardGen {
    fn default() -> Self {
        Self {
            max_height: 5,
            obstacle_pct: 5,
            wildcard_pct: 0,
            bomb_pct: 0,
        }
    }
}

/// Would placing `symbol` at (row, col) complete a run with the cells already
/// placed to the left or below?
fn completes_run(board: &Board, row: usize, col: usize, symbol: Symbol) -> bool {
    let wild = symbol.is_color();
    let joins = |r: usize, c: usize| {
        board
            .get(r, c)
            .is_some_and(|s| s == symbol || (wild && s == Symbol::Wildcard))
    };
    let need = symbol.min_run().unwrap_or(MIN_RUN) - 1;
    let left = (1..=need).all(|d| col >= d && joins(row, col - d));
    let below = (1..=need).all(|d| joins(row + d, col));
    left || below
}

/// Generate a settled board with no pending matches
///
/// Columns are filled bottom-up to a random height; a color that would
/// complete a run is re-drawn. Wildcards are only placed where no neighbor is
/// a piece yet, so they never bridge two runs.
pub fn random_board(rng: &mut SimpleRng, shape: &BoardGen) -> Board {
    let mut board = Board::new();
    let max_height = shape.max_height.min(ROWS);

    let mut heights = [0usize; COLS];
    for h in heights.iter_mut() {
        *h = rng.next_range(max_height as u32 + 1) as usize;
    }

    for depth in 0..max_height {
        let row = ROWS - 1 - depth;
        for col in 0..COLS {
            if depth >= heights[col] {
                continue;
            }
            if rng.chance(shape.obstacle_pct) {
                board.set(row, col, Symbol::Obstacle);
                continue;
            }
            let isolated = col == 0 || !board.get(row, col - 1).is_some_and(|s| s.is_piece());
            if shape.wildcard_pct > 0 && depth == 0 && isolated && rng.chance(shape.wildcard_pct) {
                board.set(row, col, Symbol::Wildcard);
                continue;
            }
            if shape.bomb_pct > 0 && rng.chance(shape.bomb_pct) {
                let bomb = Symbol::BOMBS[rng.next_range(Symbol::BOMBS.len() as u32) as usize];
                if !completes_run(&board, row, col, bomb) {
                    board.set(row, col, bomb);
                    continue;
                }
            }
            let start = rng.next_range(Symbol::COLORS.len() as u32) as usize;
            let symbol = (0..Symbol::COLORS.len())
                .map(|i| Symbol::COLORS[(start + i) % Symbol::COLORS.len()])
                .find(|s| !completes_run(&board, row, col, *s))
                .unwrap_or(Symbol::Obstacle);
            board.set(row, col, symbol);
        }
    }
    board
}
