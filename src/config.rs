//! Bot configuration.
//!
//! Layered: built-in defaults, then an optional TOML file, then `HACKMATCH_*`
//! environment variables, then command-line flags (applied by the binary).
//!
//! ```
//! use hackmatch_bot::config::BotConfig;
//!
//! let config = BotConfig::from_toml_str(r#"
//!     [solver]
//!     solve_time_ms = 500
//!     parallel = true
//!
//!     [scoring]
//!     chain_multipliers = [1, 3, 9]
//! "#).unwrap();
//!
//! assert_eq!(config.solver.solve_time_ms, 500);
//! assert_eq!(config.policy().unwrap().multiplier(2), 3);
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapter::ServerConfig;
use crate::core::ScorePolicy;
use crate::engine::{SolverConfig, DEFAULT_MAX_DEPTH, MIN_DEPTH};
use crate::input::{parse_key, sdl_keycode, EncoderConfig, Keymap};
use crate::types::{Action, Color, Symbol, DEFAULT_SETTLE_DELAY_MS, DEFAULT_SOLVE_TIME_MS, FRAME_MS};
use crate::vision::{BoardParser, ClassifierTable, Metric, ParserConfig, DEFAULT_TOLERANCE};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverSection {
    pub solve_time_ms: u64,
    pub max_depth: usize,
    pub max_nodes: Option<usize>,
    pub parallel: bool,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            solve_time_ms: DEFAULT_SOLVE_TIME_MS,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: None,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringSection {
    pub clear_points: i64,
    pub chain_multipliers: Vec<i64>,
    pub height_penalty: i64,
}

impl Default for ScoringSection {
    fn default() -> Self {
        let policy = ScorePolicy::DEFAULT;
        Self {
            clear_points: policy.clear_points,
            chain_multipliers: vec![1, 2, 4, 8],
            height_penalty: policy.height_penalty,
        }
    }
}

/// One reference color, e.g. `{ symbol = "red", color = "#dc1731" }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntrySection {
    pub symbol: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub tolerance: u32,
    pub metric: Metric,
    /// Replaces the built-in palette when non-empty
    pub entries: Vec<EntrySection>,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            metric: Metric::Manhattan,
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EncoderSection {
    pub action_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub recenter: bool,
}

impl Default for EncoderSection {
    fn default() -> Self {
        Self {
            action_delay_ms: FRAME_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            recenter: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterSection {
    pub host: String,
    pub port: u16,
    pub wire_log: Option<String>,
}

impl Default for AdapterSection {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            host: server.host,
            port: server.port,
            wire_log: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BotSection {
    /// Minimum time between captures
    pub poll_interval_ms: u64,
    /// Consecutive capture failures before the loop gives up
    pub max_capture_failures: u32,
    /// Only solve when the parsed board differs from the last one
    pub skip_unchanged: bool,
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            max_capture_failures: 200,
            skip_unchanged: true,
        }
    }
}

/// Complete bot configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    pub solver: SolverSection,
    pub scoring: ScoringSection,
    pub classifier: ClassifierSection,
    pub parser: ParserConfig,
    pub encoder: EncoderSection,
    /// Action name to key name (`left`, `x`) or SDL keycode (`0x4000004F`)
    pub keys: BTreeMap<String, String>,
    pub adapter: AdapterSection,
    pub bot: BotSection,
}

impl BotConfig {
    /// Defaults, the TOML file at `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Apply `HACKMATCH_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply `HACKMATCH_*` overrides from `lookup`
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| invalid(format!("{key}={value:?} is not valid")))
        }

        if let Some(v) = lookup("HACKMATCH_SOLVE_TIME_MS") {
            self.solver.solve_time_ms = parse("HACKMATCH_SOLVE_TIME_MS", &v)?;
        }
        if let Some(v) = lookup("HACKMATCH_PARALLEL") {
            self.solver.parallel = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = lookup("HACKMATCH_SETTLE_DELAY_MS") {
            self.encoder.settle_delay_ms = parse("HACKMATCH_SETTLE_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("HACKMATCH_HOST") {
            self.adapter.host = v.trim().to_string();
        }
        if let Some(v) = lookup("HACKMATCH_PORT") {
            self.adapter.port = parse("HACKMATCH_PORT", &v)?;
        }
        if let Some(v) = lookup("HACKMATCH_WIRE_LOG") {
            let v = v.trim();
            self.adapter.wire_log = (!v.is_empty()).then(|| v.to_string());
        }
        Ok(())
    }

    /// Check every section converts into its runtime form
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.solve_time_ms == 0 {
            return Err(invalid("solver.solve_time_ms must be positive"));
        }
        if self.solver.max_depth < MIN_DEPTH {
            return Err(invalid(format!(
                "solver.max_depth must be at least {MIN_DEPTH} to grab and release"
            )));
        }
        if self.solver.max_nodes == Some(0) {
            return Err(invalid("solver.max_nodes must be positive"));
        }
        if self.bot.max_capture_failures == 0 {
            return Err(invalid("bot.max_capture_failures must be positive"));
        }
        self.policy()?;
        self.table()?;
        self.keymap()?;
        Ok(())
    }

    pub fn solve_time(&self) -> Duration {
        Duration::from_millis(self.solver.solve_time_ms)
    }

    pub fn policy(&self) -> Result<ScorePolicy, ConfigError> {
        let s = &self.scoring;
        ScorePolicy::new(s.clear_points, &s.chain_multipliers, s.height_penalty)
            .map_err(|e| invalid(format!("scoring: {e}")))
    }

    pub fn solver_config(&self) -> Result<SolverConfig, ConfigError> {
        Ok(SolverConfig {
            max_depth: self.solver.max_depth,
            max_nodes: self.solver.max_nodes,
            parallel: self.solver.parallel,
            policy: self.policy()?,
        })
    }

    /// The configured classifier table, or the built-in palette
    pub fn table(&self) -> Result<ClassifierTable, ConfigError> {
        let c = &self.classifier;
        let table = if c.entries.is_empty() {
            let default = ClassifierTable::default();
            ClassifierTable::new(default.entries().to_vec(), c.tolerance, c.metric)
        } else {
            let mut pairs = Vec::with_capacity(c.entries.len());
            for entry in &c.entries {
                let symbol = Symbol::from_name(&entry.symbol)
                    .ok_or_else(|| invalid(format!("unknown symbol {:?}", entry.symbol)))?;
                let color = Color::parse(&entry.color)
                    .ok_or_else(|| invalid(format!("invalid color {:?}", entry.color)))?;
                pairs.push((symbol, color));
            }
            ClassifierTable::from_pairs(&pairs, c.tolerance, c.metric)
        };
        table
            .validate()
            .map_err(|e| invalid(format!("classifier: {e}")))?;
        Ok(table)
    }

    pub fn parser(&self) -> Result<BoardParser, ConfigError> {
        Ok(BoardParser::new(self.table()?, self.parser.clone()))
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            action_delay: Duration::from_millis(self.encoder.action_delay_ms),
            settle_delay: Duration::from_millis(self.encoder.settle_delay_ms),
            recenter: self.encoder.recenter,
        }
    }

    /// Default keys overridden by the `[keys]` table
    pub fn keymap(&self) -> Result<Keymap, ConfigError> {
        let mut keymap = Keymap::default();
        for (name, key) in &self.keys {
            let action =
                Action::parse(name).ok_or_else(|| invalid(format!("unknown action {name:?}")))?;
            let code = match parse_keycode(key) {
                Some(code) => sdl_keycode(code),
                None => parse_key(key),
            }
            .map_err(|e| invalid(format!("keys.{name}: {e}")))?;
            keymap.set(action, code);
        }
        Ok(keymap)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.adapter.host.clone(),
            port: self.adapter.port,
            log_path: self.adapter.wire_log.clone(),
            ..ServerConfig::default()
        }
    }
}

/// Numeric SDL keycode, decimal or `0x` hex; single characters are key names
fn parse_keycode(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    if s.len() > 1 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok();
    }
    None
}
