//! HACK*MATCH bot (workspace facade crate).
//!
//! The pipeline lives in dedicated crates under `crates/` and is re-exported
//! here as `hackmatch_bot::{types,core,vision,engine,input,adapter}`. This
//! package adds the layered configuration and the poll loop that ties them
//! together.

pub use hackmatch_adapter as adapter;
pub use hackmatch_core as core;
pub use hackmatch_engine as engine;
pub use hackmatch_input as input;
pub use hackmatch_types as types;
pub use hackmatch_vision as vision;

pub mod bot;
pub mod config;

pub use bot::{Bot, BotStats, Cycle, RunLimit};
pub use config::{BotConfig, ConfigError};
