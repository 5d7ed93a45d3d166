//! TCP server for injector clients
//!
//! Handles incoming connections and manages client lifecycle. Every batch
//! received from the bot loop is written to every client that has completed
//! the hello/welcome handshake; batches sent while nobody listens are dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use hackmatch_input::Keymap;

use crate::protocol::*;
use crate::sink::ActionBatch;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Append every line sent or received to this file
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            protocol_version: PROTOCOL_VERSION.to_string(),
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `HACKMATCH_HOST`, `HACKMATCH_PORT` and
    /// `HACKMATCH_WIRE_LOG`
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("HACKMATCH_HOST").unwrap_or(defaults.host);
        let port = env::var("HACKMATCH_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let log_path = env::var("HACKMATCH_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: u64,
    handshaken: bool,
    last_seq: Option<u64>,
    /// Next seq for lines this server sends to the client
    next_seq: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    keymap: Keymap,
    clients: RwLock<Vec<ClientHandle>>,
}

impl ServerState {
    /// Record an inbound seq; false if it does not increase
    async fn check_and_update_seq(&self, client_id: u64, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn is_handshaken(&self, client_id: u64) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn broadcast(&self, batch: &ActionBatch) -> usize {
        let mut clients = self.clients.write().await;
        let mut delivered = 0;
        for client in clients.iter_mut().filter(|c| c.handshaken) {
            client.next_seq += 1;
            let msg = create_actions(client.next_seq, batch, &self.keymap);
            let Ok(line) = serde_json::to_string(&msg) else {
                continue;
            };
            if client.tx.send(line).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

/// Start the TCP server
///
/// Runs until the batch channel closes. The bound address (useful with port
/// 0) is reported through `ready_tx` once the listener is up.
pub async fn run_server(
    config: ServerConfig,
    keymap: Keymap,
    mut batch_rx: mpsc::UnboundedReceiver<ActionBatch>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!("Action server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        keymap,
        clients: RwLock::new(Vec::new()),
    });
    let mut client_id_counter = 0u64;

    loop {
        tokio::select! {
            batch = batch_rx.recv() => {
                let Some(batch) = batch else {
                    info!("Action server shutting down");
                    return Ok(());
                };
                let delivered = state.broadcast(&batch).await;
                if delivered == 0 {
                    debug!("Batch {} dropped, no injector connected", batch.id);
                }
            }
            accepted = listener.accept() => {
                let (socket, addr) = accepted?;
                client_id_counter += 1;
                let client_id = client_id_counter;
                info!("Injector {} connected from {}", client_id, addr);

                let state = Arc::clone(&state);
                let wire_log_tx = wire_log_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(socket, client_id, Arc::clone(&state), wire_log_tx).await {
                        warn!("Injector {} error: {}", client_id, e);
                    }
                    state.clients.write().await.retain(|c| c.id != client_id);
                    info!("Injector {} disconnected", client_id);
                });
            }
        }
    }
}

/// Append-only log of raw protocol lines
fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!("Cannot open wire log {}: {}", path, e);
                return;
            }
        };
        while let Some(line) = rx.recv().await {
            if file.write_all(line.as_bytes()).await.is_err() || file.write_all(b"\n").await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: u64,
    state: Arc<ServerState>,
    wire_log_tx: Option<mpsc::UnboundedSender<String>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.clients.write().await.push(ClientHandle {
        id: client_id,
        handshaken: false,
        last_seq: None,
        next_seq: 0,
        tx: tx.clone(),
    });

    let wire_log_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send(line);
            }
        }
    });

    let reply = |line: anyhow::Result<String>| {
        if let Ok(line) = line {
            let _ = tx.send(line);
        }
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(trimmed.to_string());
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if !state.check_and_update_seq(client_id, hello.seq).await {
                    reply(to_line(&create_error(
                        hello.seq,
                        ErrorCode::InvalidMessage,
                        "seq must be strictly increasing",
                    )));
                    continue;
                }
                let major = state.config.protocol_version.split('.').next().unwrap_or("");
                if hello.protocol_version.split('.').next() != Some(major) {
                    reply(to_line(&create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    )));
                    break;
                }

                // Queued and marked under one lock, so the welcome always
                // precedes the first batch.
                let welcome = to_line(&create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id,
                    &state.keymap,
                ))?;
                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        let _ = client.tx.send(welcome);
                        client.handshaken = true;
                    }
                }
                info!(
                    "Injector {} is {} {}",
                    client_id, hello.client.name, hello.client.version
                );
            }
            Ok(ParsedMessage::Unknown(msg)) => {
                let (code, text) = if state.is_handshaken(client_id).await {
                    (ErrorCode::InvalidMessage, format!("unsupported message type {}", msg.msg_type))
                } else {
                    (ErrorCode::HandshakeRequired, "send hello first".to_string())
                };
                reply(to_line(&create_error(msg.seq, code, &text)));
            }
            Err(e) => {
                reply(to_line(&create_error(
                    0,
                    ErrorCode::InvalidMessage,
                    &format!("malformed message: {e}"),
                )));
            }
        }
    }

    drop(reply);
    drop(tx);
    state.clients.write().await.retain(|c| c.id != client_id);
    let _ = write_task.await;
    Ok(())
}

fn to_line<T: serde::Serialize>(msg: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string(msg)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7777);
        assert_eq!(config.protocol_version, PROTOCOL_VERSION);
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:7777".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bad_address() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
