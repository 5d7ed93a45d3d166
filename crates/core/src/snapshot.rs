//! Canonical board keys and hashes
//!
//! A [`BoardKey`] captures everything that makes two boards play the same:
//! cells, matching flags, cursor column and held piece. Chain points are left
//! out, so the solver can prune a state reached twice with different scores.

use crate::board::{Board, BOARD_SIZE};
use crate::types::Symbol;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

fn symbol_code(symbol: Symbol) -> u8 {
    match symbol {
        Symbol::Empty => 0,
        Symbol::Yellow => 1,
        Symbol::Green => 2,
        Symbol::Red => 3,
        Symbol::Pink => 4,
        Symbol::Blue => 5,
        Symbol::Obstacle => 6,
        Symbol::Wildcard => 7,
        Symbol::Unknown => 8,
        Symbol::YellowBomb => 9,
        Symbol::GreenBomb => 10,
        Symbol::RedBomb => 11,
        Symbol::PinkBomb => 12,
        Symbol::BlueBomb => 13,
    }
}

/// Canonical, hashable encoding of a board's playable state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardKey {
    cells: [u8; BOARD_SIZE],
    matching: u64,
    cursor: u8,
    held: u8,
}

impl BoardKey {
    pub fn of(board: &Board) -> Self {
        let mut cells = [0u8; BOARD_SIZE];
        for (out, symbol) in cells.iter_mut().zip(board.cells()) {
            *out = symbol_code(*symbol);
        }
        Self {
            cells,
            matching: board.matching_bits(),
            cursor: board.cursor(),
            held: board.held().map(symbol_code).unwrap_or(u8::MAX),
        }
    }

    /// Bytes fed to the hash, in a fixed order
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells
            .iter()
            .copied()
            .chain(self.matching.to_le_bytes())
            .chain([self.cursor, self.held])
    }
}

impl From<&Board> for BoardKey {
    fn from(board: &Board) -> Self {
        Self::of(board)
    }
}

/// FNV-1a 64-bit
pub fn fnv1a64(bytes: impl Iterator<Item = u8>) -> u64 {
    let mut h = FNV_OFFSET;
    for b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Stable 64-bit fingerprint of a board, for logs and change detection
pub fn board_hash(board: &Board) -> u64 {
    fnv1a64(BoardKey::of(board).bytes())
}
