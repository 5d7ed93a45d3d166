//! Protocol module - JSON message types for the action stream
//!
//! Line-delimited JSON. Every message has: type, seq (sequence number), ts
//! (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::sink::ActionBatch;
use hackmatch_input::Keymap;

use crate::types::Action;

pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Injector -> Bot Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

/// Injector hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

// ============== Bot -> Injector Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionsType {
    #[serde(rename = "actions")]
    Actions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_message")]
    InvalidMessage,
}

/// Key binding for one action, announced in the welcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub action: String,
    pub key: String,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub game_id: String,
    pub keys: Vec<KeyBinding>,
}

/// One key press on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAction {
    pub action: String,
    pub key: String,
    pub delay_ms: u64,
}

/// A solved plan, ready to type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsMessage {
    #[serde(rename = "type")]
    pub msg_type: ActionsType,
    pub seq: u64,
    pub ts: u64,
    /// Batch number, counted by the bot
    pub batch: u64,
    /// Board the plan was solved for, single-line text form
    pub board: String,
    pub plan: String,
    pub score: i64,
    pub actions: Vec<WireAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

// ============== Parsing ==============

#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub msg_type: String,
    pub seq: u64,
}

/// Parse one inbound line
///
/// A well-formed message of an unknown type is not a hard error; it comes
/// back as [`ParsedMessage::Unknown`] so the server can answer it.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct TypeOnly {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let probe = serde_json::from_str::<TypeOnly>(json)?;
            match probe.msg_type {
                Some(t) if t != "hello" => Ok(ParsedMessage::Unknown(UnknownMessage {
                    msg_type: t,
                    seq: probe.seq.unwrap_or(0),
                })),
                _ => Err(e),
            }
        }
    }
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
    }
}

/// Create a welcome message listing the key for every action
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    keymap: &Keymap,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        game_id: "hackmatch".to_string(),
        keys: Action::ALL
            .iter()
            .map(|a| KeyBinding {
                action: a.as_str().to_string(),
                key: keymap.key_name(*a),
            })
            .collect(),
    }
}

/// Create an actions message for `batch`
pub fn create_actions(seq: u64, batch: &ActionBatch, keymap: &Keymap) -> ActionsMessage {
    ActionsMessage {
        msg_type: ActionsType::Actions,
        seq,
        ts: current_timestamp_ms(),
        batch: batch.id,
        board: batch.board.clone(),
        plan: batch.plan.clone(),
        score: batch.score,
        actions: batch
            .actions
            .iter()
            .map(|t| WireAction {
                action: t.action.as_str().to_string(),
                key: keymap.key_name(t.action),
                delay_ms: t.delay_after.as_millis() as u64,
            })
            .collect(),
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
