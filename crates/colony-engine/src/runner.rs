//! Paced simulation loop.
//!
//! [`run`] drives [`Colony::advance`] on a tokio interval until the tick
//! limit is reached or the shutdown future resolves. The simulation itself
//! is synchronous; the runtime only paces it and listens for Ctrl-C.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use colony_core::config::SimulationConfig;
use colony_core::{Colony, TickSummary};
use colony_types::Item;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::world;

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `max_ticks` ticks completed.
    MaxTicksReached,
    /// The shutdown signal arrived.
    Interrupted,
}

/// Counters accumulated over the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Ticks executed.
    pub ticks: u64,
    /// State switches across all agents.
    pub switches: u64,
    /// Committed transactions.
    pub committed: u64,
    /// Transactions that timed out.
    pub timed_out: u64,
    /// Cancelled transactions.
    pub cancelled: u64,
}

impl RunTotals {
    fn record(&mut self, summary: &TickSummary) {
        let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        self.ticks = self.ticks.saturating_add(1);
        self.switches = self.switches.saturating_add(count(summary.switches.len()));
        self.committed = self.committed.saturating_add(count(summary.committed()));
        self.timed_out = self.timed_out.saturating_add(count(summary.timed_out()));
        self.cancelled = self.cancelled.saturating_add(count(summary.cancelled()));
    }
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Accumulated counters.
    pub totals: RunTotals,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
}

/// Run the colony until `config.max_ticks` (0 means no limit) or until
/// `shutdown` resolves.
///
/// # Errors
///
/// Returns [`EngineError::Tick`] if a tick fails, or
/// [`EngineError::Signal`] if listening for the shutdown signal fails.
pub async fn run<F>(
    colony: &mut Colony,
    config: &SimulationConfig,
    shutdown: F,
) -> Result<RunResult, EngineError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let delta = Duration::from_millis(config.tick_interval_ms);
    let mut interval = tokio::time::interval(delta);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut totals = RunTotals::default();
    let mut final_summary = None;

    info!(
        agents = colony.len(),
        max_ticks = config.max_ticks,
        tick_interval_ms = config.tick_interval_ms,
        "simulation starting"
    );

    let end_reason = loop {
        if config.max_ticks > 0 && totals.ticks >= config.max_ticks {
            info!(max_ticks = config.max_ticks, "tick limit reached");
            break EndReason::MaxTicksReached;
        }

        tokio::select! {
            _ = interval.tick() => {}
            signal = &mut shutdown => {
                signal.map_err(|source| EngineError::Signal { source })?;
                info!(tick = colony.tick(), "interrupt received");
                break EndReason::Interrupted;
            }
        }

        let summary = colony.advance(delta)?;
        totals.record(&summary);
        log_tick(&summary);
        final_summary = Some(summary);
    };

    Ok(RunResult {
        end_reason,
        totals,
        final_summary,
    })
}

fn log_tick(summary: &TickSummary) {
    for (agent, switch) in &summary.switches {
        debug!(
            tick = summary.tick,
            agent_id = %agent,
            from = %switch.from,
            to = %switch.to,
            label = switch.label,
            "state switch"
        );
    }
    if summary.resolved.is_empty() {
        return;
    }
    info!(
        tick = summary.tick,
        committed = summary.committed(),
        timed_out = summary.timed_out(),
        cancelled = summary.cancelled(),
        "transactions resolved"
    );
}

/// Log the end of the run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        ticks = result.totals.ticks,
        switches = result.totals.switches,
        committed = result.totals.committed,
        timed_out = result.totals.timed_out,
        cancelled = result.totals.cancelled,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "simulation ended"
    );
    if result.final_summary.is_none() {
        warn!("simulation ended with no ticks executed");
    }
}

/// Log each agent's final state and check that goods were conserved.
///
/// # Errors
///
/// Returns [`EngineError::World`] if the pool totals cannot be computed.
pub fn report(colony: &Colony, opening: &BTreeMap<Item, u32>) -> Result<(), EngineError> {
    for agent in colony.agents() {
        info!(
            agent_id = %agent.id,
            name = agent.name(),
            state = ?colony.current_state(agent.id).map(|s| s.as_str()),
            claims = agent.model.claims().len(),
            "final agent state"
        );
    }

    let closing = world::stock_totals(colony.pool())?;
    if closing == *opening {
        info!(ledger_entries = colony.ledger().len(), "goods conserved");
    } else {
        warn!(?opening, ?closing, "pool totals changed during the run");
    }
    Ok(())
}
