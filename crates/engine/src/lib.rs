//! Move search
//!
//! [`Solver::search`] runs a layered breadth-first search over move sequences
//! and returns the best complete [`Plan`] it has when the deadline passes.
//! Boards are copied by value between layers; nothing is shared across
//! episodes. With `parallel` set, each legal first move gets its own rayon
//! worker and the results are reduced with the same preference order.

pub mod plan;
pub mod solver;

pub use hackmatch_types as types;

pub use plan::Plan;
pub use solver::{
    default_deadline, solve, SearchStats, Solver, SolverConfig, StopReason, DEFAULT_MAX_DEPTH,
    MIN_DEPTH,
};
