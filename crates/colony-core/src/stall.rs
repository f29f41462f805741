//! Stall detection for behavior wiring.
//!
//! A state none of whose transitions can ever fire traps its agent forever.
//! Nothing at runtime can tell that apart from a long legitimate wait, so
//! the check is a helper for tests and diagnostics: run the colony for a
//! window of ticks and report every agent that never switched state.

use std::collections::BTreeSet;
use std::time::Duration;

use colony_types::AgentId;

use crate::colony::Colony;
use crate::error::TickError;
use crate::machine::StateId;

/// An agent that stayed in one state for a whole observation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stall {
    /// The stuck agent.
    pub agent: AgentId,
    /// The state it never left.
    pub state: StateId,
    /// Length of the observation window in ticks.
    pub ticks: u64,
}

/// Advance `colony` by `ticks` ticks of `delta` each and report agents that
/// made no state switch during that time.
///
/// # Errors
///
/// Propagates any [`TickError`] from [`Colony::advance`].
pub fn detect_stalls(
    colony: &mut Colony,
    ticks: u64,
    delta: Duration,
) -> Result<Vec<Stall>, TickError> {
    let mut moved = BTreeSet::new();
    for _ in 0..ticks {
        let summary = colony.advance(delta)?;
        moved.extend(summary.switches.iter().map(|(agent, _)| *agent));
    }

    Ok(colony
        .agent_ids()
        .into_iter()
        .filter(|agent| !moved.contains(agent))
        .filter_map(|agent| {
            colony.current_state(agent).map(|state| Stall {
                agent,
                state,
                ticks,
            })
        })
        .collect())
}
