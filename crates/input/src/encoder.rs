//! Plan to primitive actions.
//!
//! The solver thinks in [`Move`]s where `Grab(c)` jumps straight to a column.
//! The game only has one key per direction, so the encoder walks the cursor
//! there first, then attaches the pause each key needs before the next one.

use std::time::Duration;

use hackmatch_engine::Plan;

use crate::types::{Action, Move, CENTER_COLUMN, DEFAULT_SETTLE_DELAY_MS, FRAME_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Pause after every key press
    pub action_delay: Duration,
    /// Pause after a release, while the game clears and settles
    pub settle_delay: Duration,
    /// Walk the cursor back to the center column after the plan
    pub recenter: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            action_delay: Duration::from_millis(FRAME_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            recenter: true,
        }
    }
}

/// One key press and how long to wait after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedAction {
    pub action: Action,
    pub delay_after: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Expand `plan`, played from a cursor at `start_column`
    pub fn encode(&self, plan: &Plan, start_column: u8) -> Vec<TimedAction> {
        let mut out = Vec::with_capacity(plan.len() * 2);
        if plan.is_empty() {
            return out;
        }

        let mut cursor = start_column;
        for mv in &plan.moves {
            match *mv {
                Move::Grab(col) => {
                    self.walk(&mut out, cursor, col);
                    cursor = col;
                    self.push(&mut out, Action::Grab);
                }
                Move::ShiftLeft => {
                    cursor = cursor.saturating_sub(1);
                    self.push(&mut out, Action::ShiftLeft);
                }
                Move::ShiftRight => {
                    cursor += 1;
                    self.push(&mut out, Action::ShiftRight);
                }
                Move::SwapDown => self.push(&mut out, Action::Swap),
                Move::Release => self.push(&mut out, Action::Release),
            }
        }

        if self.config.recenter {
            self.walk(&mut out, cursor, CENTER_COLUMN);
        }
        out
    }

    fn walk(&self, out: &mut Vec<TimedAction>, from: u8, to: u8) {
        let (action, steps) = if to < from {
            (Action::ShiftLeft, from - to)
        } else {
            (Action::ShiftRight, to - from)
        };
        for _ in 0..steps {
            self.push(out, action);
        }
    }

    fn push(&self, out: &mut Vec<TimedAction>, action: Action) {
        let delay_after = match action {
            Action::Release => self.config.settle_delay.max(self.config.action_delay),
            _ => self.config.action_delay,
        };
        out.push(TimedAction {
            action,
            delay_after,
        });
    }
}

/// Encode with the default timings
pub fn encode(plan: &Plan, start_column: u8) -> Vec<TimedAction> {
    Encoder::default().encode(plan, start_column)
}

/// Wall-clock time a batch takes to play
pub fn total_delay(actions: &[TimedAction]) -> Duration {
    actions.iter().map(|a| a.delay_after).sum()
}
