//! Configuration loading and typed config structures for the Colony simulation.
//!
//! The canonical configuration lives in `colony-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads, overrides from the
//! environment, and validates the file. Every field has a default, so an
//! empty document is a valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use colony_types::Item;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong type.
    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv {
        /// The variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A value parsed but makes no sense (zero capacity, zero interval).
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level colony configuration.
///
/// Mirrors the structure of `colony-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColonyConfig {
    /// Tick pacing and run length.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Transaction resolution parameters.
    #[serde(default)]
    pub transactions: TransactionConfig,

    /// Agent population parameters.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Shared resource pool layout.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ColonyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `COLONY_MAX_TICKS` overrides `simulation.max_ticks`
    /// - `COLONY_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error from [`validate`](Self::validate).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or an
    /// override or validation error.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `COLONY_MAX_TICKS` is not an
    /// unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("COLONY_MAX_TICKS") {
            self.simulation.max_ticks = val.parse().map_err(move |_err| ConfigError::InvalidEnv {
                var: "COLONY_MAX_TICKS",
                value: val,
            })?;
        }
        if let Ok(val) = std::env::var("COLONY_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// Reject values that would make the simulation meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero tick interval, a zero
    /// ledger retention, or any zero capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.simulation.tick_interval_ms == 0 {
            return invalid("simulation.tick_interval_ms must be at least 1");
        }
        if self.transactions.ledger_retention == 0 {
            return invalid("transactions.ledger_retention must be at least 1");
        }
        if self.agents.inventory_capacity == 0 {
            return invalid("agents.inventory_capacity must be at least 1");
        }
        if self.pool.bed_capacity == 0 {
            return invalid("pool.bed_capacity must be at least 1");
        }
        if self.pool.job_capacity == 0 {
            return invalid("pool.job_capacity must be at least 1");
        }
        if self.pool.stockpile_capacity == 0 {
            return invalid("pool.stockpile_capacity must be at least 1");
        }
        let stocked = self
            .pool
            .stockpile
            .values()
            .try_fold(0_u32, |acc, qty| acc.checked_add(*qty));
        match stocked {
            Some(total) if total <= self.pool.stockpile_capacity => Ok(()),
            _ => invalid("pool.stockpile holds more than pool.stockpile_capacity"),
        }
    }
}

/// Tick pacing and run length.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds per tick; also the simulated delta.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 runs until interrupted).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Random seed for reproducible spawning.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            seed: default_seed(),
        }
    }
}

/// Transaction resolution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionConfig {
    /// Failed attempts a processing state retries before timing out.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Ledger entries kept in memory; older entries are pruned.
    #[serde(default = "default_ledger_retention")]
    pub ledger_retention: usize,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            ledger_retention: default_ledger_retention(),
        }
    }
}

/// Agent population parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentsConfig {
    /// Agents spawned at start.
    #[serde(default = "default_agent_count")]
    pub count: u32,

    /// Carry capacity of each agent's personal inventory.
    #[serde(default = "default_inventory_capacity")]
    pub inventory_capacity: u32,

    /// Rest need gained per tick while awake.
    #[serde(default = "default_rest_growth")]
    pub rest_growth: u32,

    /// Rest need recovered per tick while sleeping.
    #[serde(default = "default_rest_recovery")]
    pub rest_recovery: u32,

    /// Rest level at which an agent looks for a bed.
    #[serde(default = "default_tired_threshold")]
    pub tired_threshold: u32,

    /// Units requested per haul.
    #[serde(default = "default_haul_amount")]
    pub haul_amount: u32,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            count: default_agent_count(),
            inventory_capacity: default_inventory_capacity(),
            rest_growth: default_rest_growth(),
            rest_recovery: default_rest_recovery(),
            tired_threshold: default_tired_threshold(),
            haul_amount: default_haul_amount(),
        }
    }
}

/// Shared resource pool layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolConfig {
    /// Number of beds.
    #[serde(default = "default_beds")]
    pub beds: u32,

    /// Sleepers per bed.
    #[serde(default = "default_bed_capacity")]
    pub bed_capacity: u32,

    /// Number of job posts.
    #[serde(default = "default_job_posts")]
    pub job_posts: u32,

    /// Workers per job post.
    #[serde(default = "default_job_capacity")]
    pub job_capacity: u32,

    /// Carry capacity of the shared stockpile.
    #[serde(default = "default_stockpile_capacity")]
    pub stockpile_capacity: u32,

    /// Initial stockpile contents.
    #[serde(default = "default_stockpile")]
    pub stockpile: BTreeMap<Item, u32>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            beds: default_beds(),
            bed_capacity: default_bed_capacity(),
            job_posts: default_job_posts(),
            job_capacity: default_job_capacity(),
            stockpile_capacity: default_stockpile_capacity(),
            stockpile: default_stockpile(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is
    /// not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    250
}

const fn default_max_ticks() -> u64 {
    200
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_retries() -> u32 {
    1
}

const fn default_ledger_retention() -> usize {
    10_000
}

const fn default_agent_count() -> u32 {
    6
}

const fn default_inventory_capacity() -> u32 {
    20
}

const fn default_rest_growth() -> u32 {
    4
}

const fn default_rest_recovery() -> u32 {
    15
}

const fn default_tired_threshold() -> u32 {
    60
}

const fn default_haul_amount() -> u32 {
    5
}

const fn default_beds() -> u32 {
    3
}

const fn default_bed_capacity() -> u32 {
    1
}

const fn default_job_posts() -> u32 {
    2
}

const fn default_job_capacity() -> u32 {
    2
}

const fn default_stockpile_capacity() -> u32 {
    200
}

fn default_stockpile() -> BTreeMap<Item, u32> {
    let mut stock = BTreeMap::new();
    stock.insert(Item::Wood, 60);
    stock.insert(Item::Food, 40);
    stock.insert(Item::Water, 30);
    stock
}

fn default_log_level() -> String {
    "info".to_owned()
}
