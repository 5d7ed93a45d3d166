//! HACK*MATCH bot runner (default binary).
//!
//! Reads boards from a screenshot file or from text, solves each new board
//! within the configured time and hands the encoded key presses to a sink:
//! the log (default), stdout as JSON lines, or injector clients over TCP.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use log::{info, LevelFilter};

use hackmatch_bot::adapter::{
    ActionServer, ActionSink, FrameSource, ImageFileSource, JsonLinesSink, LogSink, NullSink,
    TextBoardSource,
};
use hackmatch_bot::core::{parse_text, Board};
use hackmatch_bot::{Bot, BotConfig, RunLimit};

#[derive(Debug, Parser)]
#[command(name = "hackmatch", version, about = "Plays HACK*MATCH from screenshots")]
#[command(group(ArgGroup::new("input").required(true).args(["board", "image"])))]
struct Cli {
    /// Board in text form, or @FILE with boards separated by blank lines
    #[arg(long, value_name = "TEXT|@FILE")]
    board: Option<String>,

    /// Screenshot to read; re-read every cycle
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Time budget per board in milliseconds
    #[arg(long, value_name = "MS")]
    solve_time: Option<u64>,

    /// Search first moves on all cores
    #[arg(long)]
    parallel: bool,

    /// Solve and log, send nothing
    #[arg(long, conflicts_with_all = ["serve", "json"])]
    watch: bool,

    /// Solve every cycle for SECS seconds and print throughput
    #[arg(long, value_name = "SECS", conflicts_with_all = ["serve", "json", "once"])]
    benchmark: Option<u64>,

    /// Serve action batches to injector clients over TCP
    #[arg(long, conflicts_with = "json")]
    serve: bool,

    /// Write action batches to stdout as JSON lines
    #[arg(long)]
    json: bool,

    /// Stop after the first cycle
    #[arg(long)]
    once: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Less logging (-q warnings, -qq errors)
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            i16::MIN..=-2 => LevelFilter::Error,
            -1 => LevelFilter::Warn,
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut level = cli.level();
    if cli.watch {
        level = level.max(LevelFilter::Info);
    }
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();

    let mut config = BotConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(ms) = cli.solve_time {
        config.solver.solve_time_ms = ms;
    }
    if cli.parallel {
        config.solver.parallel = true;
    }
    if cli.benchmark.is_some() {
        config.bot.skip_unchanged = false;
        config.bot.poll_interval_ms = 0;
    }
    config.validate().context("invalid config")?;

    let table = config.table()?;
    let (source, boards): (Box<dyn FrameSource>, Option<usize>) = match (&cli.board, &cli.image) {
        (Some(arg), _) => {
            let boards = read_boards(arg)?;
            let count = boards.len();
            (Box::new(TextBoardSource::new(boards, table)) as Box<dyn FrameSource>, Some(count))
        }
        (None, Some(path)) => (Box::new(ImageFileSource::new(path, table)) as Box<dyn FrameSource>, None),
        (None, None) => unreachable!("clap requires --board or --image"),
    };

    let limit = if let Some(secs) = cli.benchmark {
        RunLimit::For(Duration::from_secs(secs))
    } else if cli.once {
        RunLimit::Once
    } else {
        match boards {
            Some(1) => RunLimit::Once,
            Some(n) => RunLimit::Cycles(n as u64),
            None => RunLimit::Forever,
        }
    };

    let keymap = config.keymap()?;
    let sink: Box<dyn ActionSink> = if cli.watch || cli.benchmark.is_some() {
        Box::new(NullSink::default())
    } else if cli.serve {
        let server = ActionServer::start(config.server_config(), keymap)
            .context("failed to start action server")?;
        info!("Serving actions on {}", server.local_addr());
        Box::new(server)
    } else if cli.json {
        Box::new(JsonLinesSink::new(io::stdout(), keymap))
    } else {
        Box::new(LogSink::new(keymap))
    };

    let mut bot = Bot::new(&config, source, sink)?;
    let stats = bot.run(limit)?;
    if cli.benchmark.is_some() {
        println!("{}", stats.summary());
    }
    Ok(())
}

/// Boards from the command line, `@FILE` reading them from a file
fn read_boards(arg: &str) -> Result<Vec<Board>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?,
        None => arg.to_string(),
    };

    let mut boards = Vec::new();
    let mut block = String::new();
    for line in text.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                let board = parse_text(&block)
                    .with_context(|| format!("board {} is invalid", boards.len() + 1))?;
                boards.push(board);
                block.clear();
            }
            continue;
        }
        if !block.is_empty() {
            block.push('\n');
        }
        block.push_str(line.trim());
    }

    if boards.is_empty() {
        anyhow::bail!("no board given");
    }
    Ok(boards)
}
