//! The poll loop: capture, parse, solve, act, repeat.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{debug, info, warn};

use crate::adapter::{ActionBatch, ActionSink, FrameSource};
use crate::config::{BotConfig, ConfigError};
use crate::core::{board_hash, render_line, Board};
use crate::engine::{Plan, Solver};
use crate::input::Encoder;
use crate::vision::BoardParser;

/// Capture failures are reported once every this many attempts
const WARN_EVERY: u32 = 40;

/// What one cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// A plan was solved and sent to the sink
    Acted(Plan),
    /// The board was solved but offers no move
    Idle,
    /// Same board as last cycle; not solved again
    Unchanged,
    /// Nothing usable was captured; try again next cycle
    Retry,
}

/// When [`Bot::run`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLimit {
    /// After the first cycle
    Once,
    Cycles(u64),
    For(Duration),
    Forever,
}

/// Counters across cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotStats {
    pub cycles: u64,
    pub solves: u64,
    pub batches: u64,
    pub unchanged: u64,
    pub parse_errors: u64,
    pub capture_errors: u64,
    pub nodes: u64,
    pub solve_time: Duration,
    pub elapsed: Duration,
}

impl BotStats {
    fn new() -> Self {
        Self {
            cycles: 0,
            solves: 0,
            batches: 0,
            unchanged: 0,
            parse_errors: 0,
            capture_errors: 0,
            nodes: 0,
            solve_time: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    pub fn cycles_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.cycles as f64 / secs
    }

    pub fn avg_solve_ms(&self) -> f64 {
        if self.solves == 0 {
            return 0.0;
        }
        self.solve_time.as_secs_f64() * 1000.0 / self.solves as f64
    }

    /// One-line summary for logs and the benchmark report
    pub fn summary(&self) -> String {
        format!(
            "{} cycles in {:.1}s ({:.1} cycles/s), {} solves (avg {:.0}ms, {} boards), {} batches, {} unchanged, {} parse errors, {} capture errors",
            self.cycles,
            self.elapsed.as_secs_f64(),
            self.cycles_per_sec(),
            self.solves,
            self.avg_solve_ms(),
            self.nodes,
            self.batches,
            self.unchanged,
            self.parse_errors,
            self.capture_errors
        )
    }
}

/// One bot: a frame source, a sink and everything in between
pub struct Bot<S: FrameSource, K: ActionSink> {
    source: S,
    sink: K,
    parser: BoardParser,
    solver: Solver,
    encoder: Encoder,
    solve_time: Duration,
    poll_interval: Duration,
    max_capture_failures: u32,
    skip_unchanged: bool,
    prev_hash: Option<u64>,
    capture_failures: u32,
    next_batch: u64,
    stats: BotStats,
}

impl<S: FrameSource, K: ActionSink> Bot<S, K> {
    pub fn new(config: &BotConfig, source: S, sink: K) -> Result<Self, ConfigError> {
        Ok(Self {
            source,
            sink,
            parser: config.parser()?,
            solver: Solver::new(config.solver_config()?),
            encoder: Encoder::new(config.encoder_config()),
            solve_time: config.solve_time(),
            poll_interval: Duration::from_millis(config.bot.poll_interval_ms),
            max_capture_failures: config.bot.max_capture_failures,
            skip_unchanged: config.bot.skip_unchanged,
            prev_hash: None,
            capture_failures: 0,
            next_batch: 1,
            stats: BotStats::new(),
        })
    }

    pub fn stats(&self) -> &BotStats {
        &self.stats
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// Run one cycle
    ///
    /// Errors only when capture keeps failing or the sink fails; unreadable
    /// boards are retried.
    pub fn step(&mut self) -> anyhow::Result<Cycle> {
        self.stats.cycles += 1;

        let frame = match self.source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.capture_errors += 1;
                self.capture_failures += 1;
                if self.capture_failures >= self.max_capture_failures {
                    return Err(e.context(format!(
                        "capture failed {} times in a row",
                        self.capture_failures
                    )));
                }
                if self.capture_failures % WARN_EVERY == 1 {
                    warn!("Capture failed, retrying: {e:#}");
                }
                return Ok(Cycle::Retry);
            }
        };
        self.capture_failures = 0;

        let board = match self.parser.parse_frame(&frame) {
            Ok(board) => board,
            Err(e) => {
                self.stats.parse_errors += 1;
                warn!("Unreadable board, retrying: {e}");
                return Ok(Cycle::Retry);
            }
        };

        let hash = board_hash(&board);
        if self.skip_unchanged && self.prev_hash == Some(hash) {
            self.stats.unchanged += 1;
            return Ok(Cycle::Unchanged);
        }
        self.prev_hash = Some(hash);
        debug!("Board:\n{board}");

        self.solve_and_act(&board)
    }

    fn solve_and_act(&mut self, board: &Board) -> anyhow::Result<Cycle> {
        let deadline = Instant::now() + self.solve_time;
        let (plan, search) = self.solver.search(board, deadline);
        self.stats.solves += 1;
        self.stats.nodes += search.nodes as u64;
        self.stats.solve_time += search.elapsed;

        if plan.is_empty() {
            info!("No moves for {}", render_line(board));
            return Ok(Cycle::Idle);
        }
        info!("Moves: {plan}");

        let actions = self.encoder.encode(&plan, board.cursor());
        let batch = ActionBatch::new(self.next_batch, board, &plan, actions);
        self.next_batch += 1;
        self.sink
            .send(&batch)
            .with_context(|| format!("failed to send batch {}", batch.id))?;
        self.stats.batches += 1;
        Ok(Cycle::Acted(plan))
    }

    /// Cycle until `limit`, keeping at least `poll_interval` between captures
    pub fn run(&mut self, limit: RunLimit) -> anyhow::Result<BotStats> {
        let started = Instant::now();
        let mut cycles = 0u64;

        loop {
            let cycle_start = Instant::now();
            let cycle = self.step();
            self.stats.elapsed = started.elapsed();
            let cycle = cycle?;
            cycles += 1;

            let done = match limit {
                RunLimit::Once => {
                    if cycle == Cycle::Retry {
                        anyhow::bail!("no readable board");
                    }
                    true
                }
                RunLimit::Cycles(n) => cycles >= n,
                RunLimit::For(duration) => started.elapsed() >= duration,
                RunLimit::Forever => false,
            };
            if done {
                break;
            }

            if let Some(rest) = self.poll_interval.checked_sub(cycle_start.elapsed()) {
                thread::sleep(rest);
            }
        }

        self.stats.elapsed = started.elapsed();
        info!("{}", self.stats.summary());
        Ok(self.stats)
    }
}
