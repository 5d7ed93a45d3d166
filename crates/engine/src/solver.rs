//! Anytime move search
//!
//! Breadth-first over move sequences, one layer per move. Every child board
//! with nothing held ends a *complete* plan, which is scored and compared with
//! the best so far. Layers are generated in move-code order, so the first
//! path to reach a state is the shortest and lexicographically smallest one;
//! a later path to the same state with no more chain points is dropped.
//!
//! The deadline is checked before every node expansion once a complete plan
//! exists. Grabbing a piece and releasing it in place is always legal, so a
//! complete plan turns up within the first two layers whenever any move is.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use hackmatch_core::{Board, BoardKey, ScorePolicy};
use log::{debug, info};
use rayon::prelude::*;

use crate::plan::Plan;
use crate::types::{Move, DEFAULT_SOLVE_TIME_MS};

/// Deepest plan the solver considers by default
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Shallowest search that can finish a plan from an empty hand: grab, release
pub const MIN_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Longest plan, in moves; [`Solver::new`] raises it to [`MIN_DEPTH`]
    pub max_depth: usize,
    /// Stop after this many expansions once a plan exists (per worker in
    /// parallel mode)
    pub max_nodes: Option<usize>,
    /// One rayon worker per legal first move
    pub parallel: bool,
    pub policy: ScorePolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: None,
            parallel: false,
            policy: ScorePolicy::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Every plan up to `max_depth` was considered
    Completed,
    Timeout,
    NodeLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::Timeout => "timeout",
            StopReason::NodeLimit => "node_limit",
        }
    }

    /// Precedence when merging worker results
    fn severity(&self) -> u8 {
        match self {
            StopReason::Completed => 0,
            StopReason::NodeLimit => 1,
            StopReason::Timeout => 2,
        }
    }
}

/// Counters for one search episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes expanded
    pub nodes: usize,
    /// Distinct states recorded in the seen map(s)
    pub states: usize,
    /// Moves deep the search got
    pub depth: usize,
    pub elapsed: Duration,
    pub reason: StopReason,
}

impl SearchStats {
    fn new() -> Self {
        Self {
            nodes: 0,
            states: 0,
            depth: 0,
            elapsed: Duration::ZERO,
            reason: StopReason::Completed,
        }
    }

    pub fn boards_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.nodes as f64 / secs
    }

    fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.states += other.states;
        self.depth = self.depth.max(other.depth);
        if other.reason.severity() > self.reason.severity() {
            self.reason = other.reason;
        }
    }
}

struct Node {
    board: Board,
    moves: Vec<Move>,
}

/// Best-so-far bookkeeping for one frontier
struct Episode<'a> {
    root: &'a Board,
    config: &'a SolverConfig,
    deadline: Instant,
    seen: HashMap<BoardKey, i64>,
    best: Option<Plan>,
    stats: SearchStats,
}

impl<'a> Episode<'a> {
    fn new(root: &'a Board, config: &'a SolverConfig, deadline: Instant) -> Self {
        let mut seen = HashMap::new();
        seen.insert(BoardKey::of(root), root.points());
        Self {
            root,
            config,
            deadline,
            seen,
            best: None,
            stats: SearchStats::new(),
        }
    }

    /// Score a child that ends a complete plan
    fn offer(&mut self, board: &Board, moves: &[Move]) {
        if board.held().is_some() {
            return;
        }
        let candidate = Plan {
            moves: moves.to_vec(),
            board: board.clone(),
            score: self.config.policy.score_delta(self.root, board),
        };
        if self.best.as_ref().map_or(true, |best| candidate.better_than(best)) {
            self.best = Some(candidate);
        }
    }

    /// Record a state; false if an equal-or-better visit already exists
    fn visit(&mut self, board: &Board) -> bool {
        let key = BoardKey::of(board);
        match self.seen.get(&key) {
            Some(&points) if points >= board.points() => false,
            _ => {
                self.seen.insert(key, board.points());
                true
            }
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.best.is_none() {
            return false;
        }
        if Instant::now() >= self.deadline {
            self.stats.reason = StopReason::Timeout;
            return true;
        }
        if self
            .config
            .max_nodes
            .is_some_and(|limit| self.stats.nodes >= limit)
        {
            self.stats.reason = StopReason::NodeLimit;
            return true;
        }
        false
    }

    /// Run layers until the frontier drains, the depth cap is hit or time runs out
    fn run(&mut self, mut frontier: Vec<Node>) {
        let mut depth = frontier.first().map(|n| n.moves.len()).unwrap_or(0);

        'layers: while !frontier.is_empty() && depth < self.config.max_depth {
            let mut next = Vec::new();
            for node in &frontier {
                if self.should_stop() {
                    break 'layers;
                }
                self.stats.nodes += 1;

                for mv in node.board.candidate_moves() {
                    let Ok(child) = node.board.apply_move_with(mv, &self.config.policy) else {
                        continue;
                    };
                    let mut moves = node.moves.clone();
                    moves.push(mv);
                    // Offered before the seen check: returning to the root
                    // state is still a complete plan.
                    self.offer(&child, &moves);
                    if !self.visit(&child) {
                        continue;
                    }
                    next.push(Node {
                        board: child,
                        moves,
                    });
                }
            }
            depth += 1;
            self.stats.depth = depth;
            debug!(
                "depth {}: {} nodes next, {} states, best {}",
                depth,
                next.len(),
                self.seen.len(),
                self.best.as_ref().map_or(i64::MIN, |p| p.score)
            );
            frontier = next;
        }

        self.stats.states = self.seen.len();
    }
}

/// Configured solver; cheap to copy, holds no state between searches
#[derive(Debug, Clone, Copy, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(mut config: SolverConfig) -> Self {
        config.max_depth = config.max_depth.max(MIN_DEPTH);
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Best complete plan found before `deadline`, with search counters
    pub fn search(&self, board: &Board, deadline: Instant) -> (Plan, SearchStats) {
        let started = Instant::now();
        let (best, mut stats) = if self.config.parallel {
            self.search_parallel(board, deadline)
        } else {
            let mut episode = Episode::new(board, &self.config, deadline);
            episode.run(vec![Node {
                board: board.clone(),
                moves: Vec::new(),
            }]);
            (episode.best, episode.stats)
        };
        stats.elapsed = started.elapsed();

        let plan = best.unwrap_or_else(|| Plan::empty(board, &self.config.policy));
        info!(
            "{} after {:.0}ms, {} boards ({:.0} boards/s), {} moves deep, score {}",
            stats.reason.as_str().to_uppercase(),
            stats.elapsed.as_secs_f64() * 1000.0,
            stats.nodes,
            stats.boards_per_sec(),
            stats.depth,
            plan.score
        );
        (plan, stats)
    }

    /// One worker per legal first move, each with a private seen map and
    /// frontier; the results are reduced with the same preference order
    fn search_parallel(&self, board: &Board, deadline: Instant) -> (Option<Plan>, SearchStats) {
        let first: Vec<(Move, Board)> = board
            .candidate_moves()
            .into_iter()
            .filter_map(|mv| {
                board
                    .apply_move_with(mv, &self.config.policy)
                    .ok()
                    .map(|child| (mv, child))
            })
            .collect();

        let results: Vec<(Option<Plan>, SearchStats)> = first
            .par_iter()
            .map(|(mv, child)| {
                let mut episode = Episode::new(board, &self.config, deadline);
                episode.visit(child);
                episode.offer(child, &[*mv]);
                episode.stats.depth = 1;
                episode.run(vec![Node {
                    board: child.clone(),
                    moves: vec![*mv],
                }]);
                (episode.best, episode.stats)
            })
            .collect();

        let mut best: Option<Plan> = None;
        let mut stats = SearchStats::new();
        for (plan, worker) in results {
            stats.merge(&worker);
            if let Some(plan) = plan {
                if best.as_ref().map_or(true, |b| plan.better_than(b)) {
                    best = Some(plan);
                }
            }
        }
        (best, stats)
    }
}

/// Solve with the default configuration
pub fn solve(board: &Board, deadline: Instant) -> Plan {
    Solver::default().search(board, deadline).0
}

/// Deadline `DEFAULT_SOLVE_TIME_MS` from now
pub fn default_deadline() -> Instant {
    Instant::now() + Duration::from_millis(DEFAULT_SOLVE_TIME_MS)
}
