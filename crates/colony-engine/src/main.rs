//! Colony engine binary.
//!
//! Wires configuration, the starting world, the agent spawner, and the paced
//! tick loop together, then runs until the tick limit or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `colony-config.yaml` (or `COLONY_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the shared pool: beds, job posts, stockpile
//! 4. Spawn agents from a seeded RNG
//! 5. Run the tick loop
//! 6. Log the result and the conservation check

mod behaviors;
mod error;
mod runner;
mod spawner;
mod world;

use std::path::PathBuf;

use colony_core::config::{ColonyConfig, LoggingConfig};
use colony_core::Colony;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::behaviors::Tuning;
use crate::error::EngineError;
use crate::spawner::Spawner;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config.logging);

    info!(
        seed = config.simulation.seed,
        tick_interval_ms = config.simulation.tick_interval_ms,
        max_ticks = config.simulation.max_ticks,
        max_retries = config.transactions.max_retries,
        "colony-engine starting"
    );

    let (pool, stockpile) = world::build_pool(&config.pool).map_err(EngineError::from)?;
    let opening = world::stock_totals(&pool).map_err(EngineError::from)?;
    let mut colony =
        Colony::new(pool).with_ledger_retention(config.transactions.ledger_retention);

    let tuning = Tuning {
        rest_recovery: config.agents.rest_recovery,
        tired_threshold: config.agents.tired_threshold,
        haul_amount: config.agents.haul_amount,
        max_retries: config.transactions.max_retries,
        stockpile,
    };
    let goods = config.pool.stockpile.keys().copied().collect();
    let mut spawner = Spawner::new(config.simulation.seed, &config.agents, goods, tuning);
    let spawned = spawner.spawn_all(&mut colony, config.agents.count)?;
    info!(agents_spawned = spawned.len(), "agents spawned");

    let result = runner::run(&mut colony, &config.simulation, tokio::signal::ctrl_c()).await?;
    runner::log_run_end(&result);
    runner::report(&colony, &opening)?;

    info!(end_reason = ?result.end_reason, "colony-engine shutdown complete");
    Ok(())
}

/// Load configuration from `COLONY_CONFIG` or `colony-config.yaml` in the
/// working directory. A missing file means defaults (environment overrides
/// still apply).
fn load_config() -> Result<ColonyConfig, EngineError> {
    let path = std::env::var_os("COLONY_CONFIG")
        .map_or_else(|| PathBuf::from("colony-config.yaml"), PathBuf::from);
    if path.exists() {
        Ok(ColonyConfig::from_file(&path)?)
    } else {
        Ok(ColonyConfig::parse("")?)
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
