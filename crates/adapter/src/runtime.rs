//! Adapter runtime integration.
//!
//! Bridges the sync bot loop with the async TCP server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use log::warn;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use hackmatch_input::Keymap;

use crate::server::{run_server, ServerConfig};
use crate::sink::{ActionBatch, ActionSink};

/// Running action server instance
///
/// Owns its tokio runtime; dropping it shuts the server down.
pub struct ActionServer {
    _rt: Runtime,
    batch_tx: mpsc::UnboundedSender<ActionBatch>,
    addr: SocketAddr,
}

impl ActionServer {
    /// Start the server and wait until it is listening
    pub fn start(config: ServerConfig, keymap: Keymap) -> anyhow::Result<Self> {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel::<ActionBatch>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server = rt.spawn(async move {
            if let Err(e) = run_server(config, keymap, batch_rx, Some(ready_tx)).await {
                warn!("Action server stopped: {e:#}");
            }
        });

        let addr = rt.block_on(async {
            match tokio::time::timeout(Duration::from_secs(5), ready_rx).await {
                Ok(Ok(addr)) => Ok(addr),
                Ok(Err(_)) => {
                    // The server task ended before it was listening.
                    let _ = server.await;
                    anyhow::bail!("action server failed to start")
                }
                Err(_) => anyhow::bail!("action server did not start within 5s"),
            }
        })?;

        Ok(Self {
            _rt: rt,
            batch_tx,
            addr,
        })
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl ActionSink for ActionServer {
    fn send(&mut self, batch: &ActionBatch) -> anyhow::Result<()> {
        self.batch_tx
            .send(batch.clone())
            .map_err(|_| anyhow::anyhow!("action server is not running"))
    }
}
