//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the bot.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (recognition, board model, solver, action encoding).
//!
//! # Board Dimensions
//!
//! The HACK*MATCH playfield is fixed by the game:
//!
//! - **Columns**: 7 (indexed 0-6, left to right)
//! - **Rows**: 9 (indexed 0-8, top to bottom)
//! - **Cursor**: starts over the center column (3)
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_SOLVE_TIME_MS` | 850 | Solver budget per cycle (~50 frames @ 60 FPS) |
//! | `FRAME_MS` | 17 | One game frame, used as the key-press delay |
//! | `DEFAULT_SETTLE_DELAY_MS` | 200 | Pause after a release so the game can animate |
//!
//! # Examples
//!
//! ```
//! use hackmatch_types::{Action, Move, Symbol, BOARD_COLS, BOARD_ROWS};
//!
//! let symbol = Symbol::from_char('r').unwrap();
//! assert_eq!(symbol, Symbol::Red);
//! assert!(symbol.is_color());
//!
//! let mv = Move::parse("grab(2)").unwrap();
//! assert_eq!(mv, Move::Grab(2));
//!
//! assert_eq!(Action::parse("Release"), Some(Action::Release));
//! assert_eq!((BOARD_ROWS, BOARD_COLS), (9, 7));
//! ```

use std::fmt;

/// Board width in cells (7 columns)
pub const BOARD_COLS: u8 = 7;

/// Board height in cells (9 rows)
pub const BOARD_ROWS: u8 = 9;

/// Column the cursor rests on when nothing else is known
pub const CENTER_COLUMN: u8 = BOARD_COLS / 2;

/// Shortest run of identical symbols that clears
pub const MIN_RUN: usize = 3;

/// Shortest run of identical bombs that clears
pub const MIN_BOMB_RUN: usize = 2;

/// Solver budget per cycle in milliseconds
pub const DEFAULT_SOLVE_TIME_MS: u64 = 850;

/// One frame at 60 FPS
pub const FRAME_MS: u64 = 17;

/// Pause after each release before the next observation
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// A discrete cell value.
///
/// `Unknown` is only ever produced by the classifier; a validated board never
/// contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Empty,
    Yellow,
    Green,
    Red,
    Pink,
    Blue,
    Obstacle,
    Wildcard,
    YellowBomb,
    GreenBomb,
    RedBomb,
    PinkBomb,
    BlueBomb,
    Unknown,
}

impl Symbol {
    /// The five block colors, in palette order
    pub const COLORS: [Symbol; 5] = [
        Symbol::Yellow,
        Symbol::Green,
        Symbol::Red,
        Symbol::Pink,
        Symbol::Blue,
    ];

    /// The five bombs, in the same order as their colors
    pub const BOMBS: [Symbol; 5] = [
        Symbol::YellowBomb,
        Symbol::GreenBomb,
        Symbol::RedBomb,
        Symbol::PinkBomb,
        Symbol::BlueBomb,
    ];

    /// Every symbol that may appear on a validated board
    pub const BOARD: [Symbol; 13] = [
        Symbol::Empty,
        Symbol::Yellow,
        Symbol::Green,
        Symbol::Red,
        Symbol::Pink,
        Symbol::Blue,
        Symbol::Obstacle,
        Symbol::Wildcard,
        Symbol::YellowBomb,
        Symbol::GreenBomb,
        Symbol::RedBomb,
        Symbol::PinkBomb,
        Symbol::BlueBomb,
    ];

    /// Parse from the single-character board encoding
    ///
    /// Bombs are the digits `1`-`5` in color order; upper case letters are
    /// left to the text format for cells that are clearing.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Symbol::Empty),
            'y' => Some(Symbol::Yellow),
            'g' => Some(Symbol::Green),
            'r' => Some(Symbol::Red),
            'p' => Some(Symbol::Pink),
            'b' => Some(Symbol::Blue),
            '#' => Some(Symbol::Obstacle),
            '*' => Some(Symbol::Wildcard),
            '1' => Some(Symbol::YellowBomb),
            '2' => Some(Symbol::GreenBomb),
            '3' => Some(Symbol::RedBomb),
            '4' => Some(Symbol::PinkBomb),
            '5' => Some(Symbol::BlueBomb),
            '?' => Some(Symbol::Unknown),
            _ => None,
        }
    }

    /// Single-character board encoding
    pub fn as_char(&self) -> char {
        match self {
            Symbol::Empty => '.',
            Symbol::Yellow => 'y',
            Symbol::Green => 'g',
            Symbol::Red => 'r',
            Symbol::Pink => 'p',
            Symbol::Blue => 'b',
            Symbol::Obstacle => '#',
            Symbol::Wildcard => '*',
            Symbol::YellowBomb => '1',
            Symbol::GreenBomb => '2',
            Symbol::RedBomb => '3',
            Symbol::PinkBomb => '4',
            Symbol::BlueBomb => '5',
            Symbol::Unknown => '?',
        }
    }

    /// Parse from a name (case-insensitive), as used in config files
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "empty" => Some(Symbol::Empty),
            "yellow" => Some(Symbol::Yellow),
            "green" => Some(Symbol::Green),
            "red" => Some(Symbol::Red),
            "pink" => Some(Symbol::Pink),
            "blue" => Some(Symbol::Blue),
            "obstacle" => Some(Symbol::Obstacle),
            "wildcard" => Some(Symbol::Wildcard),
            "yellow_bomb" => Some(Symbol::YellowBomb),
            "green_bomb" => Some(Symbol::GreenBomb),
            "red_bomb" => Some(Symbol::RedBomb),
            "pink_bomb" => Some(Symbol::PinkBomb),
            "blue_bomb" => Some(Symbol::BlueBomb),
            "unknown" => Some(Symbol::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Empty => "empty",
            Symbol::Yellow => "yellow",
            Symbol::Green => "green",
            Symbol::Red => "red",
            Symbol::Pink => "pink",
            Symbol::Blue => "blue",
            Symbol::Obstacle => "obstacle",
            Symbol::Wildcard => "wildcard",
            Symbol::YellowBomb => "yellow_bomb",
            Symbol::GreenBomb => "green_bomb",
            Symbol::RedBomb => "red_bomb",
            Symbol::PinkBomb => "pink_bomb",
            Symbol::BlueBomb => "blue_bomb",
            Symbol::Unknown => "unknown",
        }
    }

    /// True for the five block colors
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            Symbol::Yellow | Symbol::Green | Symbol::Red | Symbol::Pink | Symbol::Blue
        )
    }

    pub fn is_bomb(&self) -> bool {
        matches!(
            self,
            Symbol::YellowBomb
                | Symbol::GreenBomb
                | Symbol::RedBomb
                | Symbol::PinkBomb
                | Symbol::BlueBomb
        )
    }

    /// True for anything that occupies a cell
    pub fn is_piece(&self) -> bool {
        !matches!(self, Symbol::Empty | Symbol::Unknown)
    }

    /// True for pieces the cursor can pick up and carry
    pub fn is_movable(&self) -> bool {
        self.is_piece() && *self != Symbol::Obstacle
    }

    /// True for symbols that can take part in a color run
    ///
    /// Bombs only ever match their own kind and are not included.
    pub fn is_matchable(&self) -> bool {
        self.is_color() || *self == Symbol::Wildcard
    }

    /// Shortest run of this symbol that clears; `None` if it never clears
    pub fn min_run(&self) -> Option<usize> {
        if self.is_bomb() {
            Some(MIN_BOMB_RUN)
        } else if self.is_matchable() {
            Some(MIN_RUN)
        } else {
            None
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An 8-bit RGB sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sum of per-channel absolute differences
    pub fn manhattan(&self, other: &Color) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
    }

    /// Squared Euclidean distance in RGB space
    pub fn euclidean_sq(&self, other: &Color) -> u32 {
        let dr = self.r.abs_diff(other.r) as u32;
        let dg = self.g.abs_diff(other.g) as u32;
        let db = self.b.abs_diff(other.b) as u32;
        dr * dr + dg * dg + db * db
    }

    /// Average of a set of samples, `None` if empty
    pub fn average(samples: &[Color]) -> Option<Color> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as u32;
        let (r, g, b) = samples.iter().fold((0u32, 0u32, 0u32), |acc, c| {
            (acc.0 + c.r as u32, acc.1 + c.g as u32, acc.2 + c.b as u32)
        });
        Some(Color::new((r / n) as u8, (g / n) as u8, (b / n) as u8))
    }

    /// Parse `#rrggbb` or `r,g,b`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let v = u32::from_str_radix(hex, 16).ok()?;
            return Some(Color::new((v >> 16) as u8, (v >> 8) as u8, v as u8));
        }
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Color::new(r, g, b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Row-major 2-D grid, row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    /// Create a matrix filled with `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build from nested rows; `None` if the rows are ragged
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let n = rows.len();
        Some(Self {
            rows: n,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }
}

impl<T> Matrix<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col)
    }

    /// Set a cell; returns false if out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.data[row * self.cols + col] = value;
        true
    }

    /// Iterate `(row, col, &value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let cols = self.cols.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i / cols, i % cols, v))
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }
}

/// One atomic player move
///
/// The cursor (the game's "phage") sits under one column. `Grab` moves it to a
/// column and lifts the top piece; shifts carry the held piece sideways;
/// `SwapDown` exchanges it with the top piece of the column; `Release` drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Grab(u8),
    Release,
    ShiftLeft,
    ShiftRight,
    SwapDown,
}

impl Move {
    /// Stable numeric encoding used for lexicographic tie-breaks
    pub fn code(&self) -> u8 {
        match self {
            Move::Grab(col) => *col,
            Move::ShiftLeft => 16,
            Move::ShiftRight => 17,
            Move::SwapDown => 18,
            Move::Release => 19,
        }
    }

    /// Parse from string (case-insensitive), e.g. `grab(3)`, `left`, `release`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if let Some(rest) = s.strip_prefix("grab(") {
            let col = rest.strip_suffix(')')?.trim().parse::<u8>().ok()?;
            return Some(Move::Grab(col));
        }
        match s.as_str() {
            "release" => Some(Move::Release),
            "left" | "shiftleft" => Some(Move::ShiftLeft),
            "right" | "shiftright" => Some(Move::ShiftRight),
            "swap" | "swapdown" => Some(Move::SwapDown),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Grab(col) => write!(f, "grab({})", col),
            Move::Release => write!(f, "release"),
            Move::ShiftLeft => write!(f, "left"),
            Move::ShiftRight => write!(f, "right"),
            Move::SwapDown => write!(f, "swap"),
        }
    }
}

/// Primitive game input, one key press each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Grab,
    Swap,
    ShiftLeft,
    ShiftRight,
    Release,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Grab,
        Action::Swap,
        Action::ShiftLeft,
        Action::ShiftRight,
        Action::Release,
    ];

    /// Parse action from string (for the injector protocol)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grab" => Some(Action::Grab),
            "swap" => Some(Action::Swap),
            "shiftleft" | "left" => Some(Action::ShiftLeft),
            "shiftright" | "right" => Some(Action::ShiftRight),
            "release" => Some(Action::Release),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Grab => "grab",
            Action::Swap => "swap",
            Action::ShiftLeft => "shiftLeft",
            Action::ShiftRight => "shiftRight",
            Action::Release => "release",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_char_roundtrip() {
        for symbol in Symbol::BOARD {
            assert_eq!(Symbol::from_char(symbol.as_char()), Some(symbol));
            assert_eq!(Symbol::from_name(symbol.as_str()), Some(symbol));
        }
        assert_eq!(Symbol::from_char('x'), None);
    }

    #[test]
    fn symbol_classes() {
        assert!(Symbol::Red.is_color());
        assert!(Symbol::Wildcard.is_matchable());
        assert!(!Symbol::Obstacle.is_matchable());
        assert!(Symbol::Obstacle.is_piece());
        assert!(!Symbol::Empty.is_piece());
        assert!(!Symbol::Unknown.is_piece());
    }

    #[test]
    fn bombs_are_movable_but_not_matchable() {
        for (bomb, color) in Symbol::BOMBS.iter().zip(Symbol::COLORS) {
            assert!(bomb.is_bomb());
            assert!(bomb.is_movable());
            assert!(!bomb.is_matchable());
            assert_eq!(bomb.min_run(), Some(MIN_BOMB_RUN));
            assert_eq!(color.min_run(), Some(MIN_RUN));
            assert!(!color.is_bomb());
        }
        assert_eq!(Symbol::from_char('3'), Some(Symbol::RedBomb));
        assert_eq!(Symbol::from_name("Blue_Bomb"), Some(Symbol::BlueBomb));
        assert!(!Symbol::Obstacle.is_movable());
        assert_eq!(Symbol::Obstacle.min_run(), None);
    }

    #[test]
    fn color_distances() {
        let a = Color::new(10, 20, 30);
        let b = Color::new(13, 16, 30);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(a.euclidean_sq(&b), 25);
        assert_eq!(a.manhattan(&a), 0);
    }

    #[test]
    fn color_parse() {
        assert_eq!(Color::parse("#eba318"), Some(Color::new(235, 163, 24)));
        assert_eq!(Color::parse("18, 186, 156"), Some(Color::new(18, 186, 156)));
        assert_eq!(Color::parse("1,2"), None);
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::new(235, 163, 24).to_string(), "#eba318");
    }

    #[test]
    fn color_average() {
        let avg = Color::average(&[Color::new(0, 0, 0), Color::new(10, 20, 30)]);
        assert_eq!(avg, Some(Color::new(5, 10, 15)));
        assert_eq!(Color::average(&[]), None);
    }

    #[test]
    fn matrix_access() {
        let mut m = Matrix::filled(2, 3, 0u8);
        assert!(m.set(1, 2, 7));
        assert!(!m.set(2, 0, 1));
        assert_eq!(m.get(1, 2), Some(&7));
        assert_eq!(m.get(0, 3), None);
        let cells: Vec<_> = m.iter().filter(|(_, _, v)| **v == 7).collect();
        assert_eq!(cells, vec![(1, 2, &7)]);
        assert!(Matrix::from_rows(vec![vec![1], vec![1, 2]]).is_none());
    }

    #[test]
    fn move_parse_and_display() {
        for mv in [
            Move::Grab(0),
            Move::Grab(6),
            Move::Release,
            Move::ShiftLeft,
            Move::ShiftRight,
            Move::SwapDown,
        ] {
            assert_eq!(Move::parse(&mv.to_string()), Some(mv));
        }
        assert_eq!(Move::parse("grab(x)"), None);
        assert!(Move::Grab(6).code() < Move::ShiftLeft.code());
    }

    #[test]
    fn action_parse() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
        assert_eq!(Action::parse("hold"), None);
    }
}
