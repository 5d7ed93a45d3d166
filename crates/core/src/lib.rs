//! Board model - pure, deterministic, and testable
//!
//! This crate holds the HACK*MATCH rules as pure functions over a [`Board`].
//! It has **no dependencies** on capture, input injection, or I/O, making it:
//!
//! - **Deterministic**: the same board and move always produce the same result
//! - **Testable**: every rule is covered by unit tests
//! - **Cheap to search**: boards are small flat arrays copied by value
//!
//! # Module Structure
//!
//! - [`board`]: 7x9 grid, cursor, held piece and move application
//! - [`matches`]: run detection, clearing, gravity and chain resolution
//! - [`scoring`]: chain multipliers and the solver objective
//! - [`text`]: textual board format used by tests, logs and the CLI
//! - [`snapshot`]: canonical keys and hashes for duplicate detection
//! - [`rng`]: deterministic random boards for tests and benchmarks
//!
//! # Game Rules
//!
//! - **Grab** lifts the top piece of a column; the cursor moves there
//! - **Shift** carries the held piece one column left or right
//! - **Swap** exchanges the held piece with the top of the cursor column
//! - **Release** drops the held piece onto the cursor column
//! - **Runs** of three or more of one color clear; wildcards join any color
//! - **Chains**: after a clear the board settles and may clear again, each
//!   step worth more than the last
//!
//! # Example
//!
//! ```
//! use hackmatch_core::{parse_text, Board};
//! use hackmatch_types::{Move, Symbol};
//!
//! let board = parse_text(
//!     ".......\n.......\n.......\n.......\n.......\n.......\n.......\n..r....\nr.r.ybg",
//! )
//! .unwrap();
//!
//! let next = board
//!     .apply_move(Move::Grab(0))
//!     .and_then(|b| b.apply_move(Move::ShiftRight))
//!     .and_then(|b| b.apply_move(Move::ShiftRight))
//!     .and_then(|b| b.apply_move(Move::Release))
//!     .unwrap();
//!
//! assert_eq!(next.get(8, 2), Some(Symbol::Empty));
//! assert!(next.points() > 0);
//! ```

pub mod board;
pub mod matches;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod text;

pub use hackmatch_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, IllegalMove, BOARD_SIZE};
pub use matches::{
    apply_clear, find_matches, has_match, resolve_chains, settle, Axis, ChainReport, MatchGroup,
};
pub use rng::{random_board, BoardGen, SimpleRng};
pub use scoring::{score_delta, PolicyError, ScorePolicy, CHAIN_TIERS};
pub use snapshot::{board_hash, fnv1a64, BoardKey};
pub use text::{parse_text, render_line, render_text, TextError};
