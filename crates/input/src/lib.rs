//! Plan execution (injector-facing).
//!
//! This crate is independent of any capture or injection backend. It expands
//! a solver [`Plan`](hackmatch_engine::Plan) into timed primitive
//! [`Action`](crate::types::Action)s and maps those actions to `crossterm`
//! key codes.

pub mod encoder;
pub mod keymap;

pub use hackmatch_types as types;

pub use encoder::{encode, total_delay, Encoder, EncoderConfig, TimedAction};
pub use keymap::{key_name, parse_key, sdl_keycode, Keymap, KeymapError};
