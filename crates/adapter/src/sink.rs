//! Where encoded plans go.

use std::io::Write;

use anyhow::Context;
use hackmatch_core::{render_line, Board};
use hackmatch_engine::Plan;
use hackmatch_input::{total_delay, Keymap, TimedAction};
use log::{debug, info};

use crate::protocol::create_actions;

/// One encoded plan with the context an injector (or a log reader) needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBatch {
    pub id: u64,
    /// Board the plan was solved for, single-line text form
    pub board: String,
    pub plan: String,
    pub score: i64,
    pub actions: Vec<TimedAction>,
}

impl ActionBatch {
    pub fn new(id: u64, board: &Board, plan: &Plan, actions: Vec<TimedAction>) -> Self {
        Self {
            id,
            board: render_line(board),
            plan: plan.to_string(),
            score: plan.score,
            actions,
        }
    }
}

/// Input-injection collaborator
pub trait ActionSink {
    fn send(&mut self, batch: &ActionBatch) -> anyhow::Result<()>;
}

/// Logs every batch
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    keymap: Keymap,
}

impl LogSink {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap }
    }
}

impl ActionSink for LogSink {
    fn send(&mut self, batch: &ActionBatch) -> anyhow::Result<()> {
        info!(
            "Moves: {} ({} keys, {}ms, score {})",
            batch.plan,
            batch.actions.len(),
            total_delay(&batch.actions).as_millis(),
            batch.score
        );
        for a in &batch.actions {
            debug!(
                "  {:<10} {:<6} +{}ms",
                a.action.as_str(),
                self.keymap.key_name(a.action),
                a.delay_after.as_millis()
            );
        }
        Ok(())
    }
}

/// Writes every batch as one `actions` JSON line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    keymap: Keymap,
    seq: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, keymap: Keymap) -> Self {
        Self {
            writer,
            keymap,
            seq: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ActionSink for JsonLinesSink<W> {
    fn send(&mut self, batch: &ActionBatch) -> anyhow::Result<()> {
        self.seq += 1;
        let msg = create_actions(self.seq, batch, &self.keymap);
        serde_json::to_writer(&mut self.writer, &msg).context("failed to encode batch")?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Discards batches, counting them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullSink {
    pub batches: u64,
    pub actions: u64,
}

impl ActionSink for NullSink {
    fn send(&mut self, batch: &ActionBatch) -> anyhow::Result<()> {
        self.batches += 1;
        self.actions += batch.actions.len() as u64;
        Ok(())
    }
}

impl<S: ActionSink + ?Sized> ActionSink for Box<S> {
    fn send(&mut self, batch: &ActionBatch) -> anyhow::Result<()> {
        (**self).send(batch)
    }
}
