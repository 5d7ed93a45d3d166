//! Board recognition - sampled colors in, validated boards out
//!
//! - [`classifier`]: one color sample to one [`Symbol`](types::Symbol)
//! - [`parser`]: a 9x7 grid of samples (plus animation signal and cursor) to a
//!   [`Board`](hackmatch_core::Board)
//! - [`capture`]: per-resolution screenshot geometry and sampling
//!
//! Everything here is a pure transform; the classifier table is passed in
//! explicitly and nothing is cached between frames.

pub mod capture;
pub mod classifier;
pub mod parser;

pub use hackmatch_types as types;

pub use capture::{sample_image, CaptureError, Geometry, GEOMETRIES, SEGMENT_PIXELS};
pub use classifier::{classify, ClassEntry, ClassifierTable, Metric, TableError, DEFAULT_TOLERANCE};
pub use parser::{
    render, BoardParser, CursorSample, Frame, ParseError, ParserConfig, ResolveMask,
    DEFAULT_MATCHING_THRESHOLD,
};
