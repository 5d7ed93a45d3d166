//! Adapter module - the bot's edges: frame sources and action sinks
//!
//! Capture and input injection are collaborators. This crate holds the seams
//! the bot loop talks to and the concrete implementations that make the bot
//! runnable without the game:
//!
//! - [`FrameSource`]: [`ImageFileSource`] (PNG screenshot) and
//!   [`TextBoardSource`] (textual boards rendered into frames)
//! - [`ActionSink`]: [`LogSink`], [`JsonLinesSink`], [`NullSink`] and the TCP
//!   [`ActionServer`]
//!
//! # Protocol Overview
//!
//! The action server speaks **line-delimited JSON** over TCP:
//!
//! 1. **Connection**: an injector connects (default: 127.0.0.1:7777)
//! 2. **Handshake**: the injector sends `hello`, the server answers `welcome`
//!    with the key bound to every action
//! 3. **Streaming**: every solved plan is pushed to every handshaken injector
//!    as an `actions` message; the injector presses each key and waits
//!    `delay_ms` before the next
//!
//! # Environment Variables
//!
//! - `HACKMATCH_HOST`: Bind address (default: "127.0.0.1")
//! - `HACKMATCH_PORT`: Port number (default: 7777)
//! - `HACKMATCH_WIRE_LOG`: Append every protocol line to this file
//!
//! # Example Protocol Flow
//!
//! ```text
//! Injector -> Bot: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"xdo","version":"0.1"},"protocol_version":"1.0.0"}
//! Bot -> Injector: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":1,"game_id":"hackmatch","keys":[{"action":"grab","key":"x"},...]}
//! Bot -> Injector: {"type":"actions","seq":1,"ts":1700000000420,"batch":3,"board":"...","plan":"grab(0) right right release","score":29,"actions":[{"action":"shiftLeft","key":"left","delay_ms":17},...]}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7777
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;
pub mod sink;
pub mod source;

pub use hackmatch_types as types;

pub use protocol::*;
pub use runtime::ActionServer;
pub use server::{run_server, ServerConfig};
pub use sink::{ActionBatch, ActionSink, JsonLinesSink, LogSink, NullSink};
pub use source::{FrameSource, ImageFileSource, TextBoardSource};
