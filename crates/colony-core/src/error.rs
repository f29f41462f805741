//! Error types for the colony-core crate.
//!
//! [`MachineError`] covers state machines that are wired wrong and is
//! returned when a machine is built or driven outside its lifecycle.
//! [`TickError`] is what a tick returns: every hard failure from the lower
//! crates funnels into it through `#[from]`.

use colony_agents::AgentError;
use colony_ledger::LedgerError;
use colony_types::AgentId;
use colony_world::WorldError;

use crate::clock::ClockError;
use crate::machine::StateId;

/// Errors in state-machine construction and lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    /// Two registered states share an id.
    #[error("state {0} registered twice")]
    DuplicateState(StateId),

    /// A transition points at a state that was never registered.
    #[error("transition {label:?} of state {from} targets unknown state {target}")]
    UnknownTarget {
        /// Source state.
        from: StateId,
        /// Transition label.
        label: &'static str,
        /// The missing target.
        target: StateId,
    },

    /// No default state was named, or the named one is not registered.
    #[error("default state missing or not registered")]
    MissingDefault,

    /// The machine was ticked before [`activate`](crate::StateMachine::activate).
    #[error("state machine ticked before activation")]
    Inactive,

    /// An internal state index did not resolve.
    #[error("state index {0} out of range")]
    StateIndex(usize),

    /// The machine was activated twice.
    #[error("state machine already active")]
    AlreadyActive,
}

/// Errors that abort a simulation tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// Agent or promise failure (including use of an uninitialized queue).
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Resource pool failure (including use of an uninitialized inventory).
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// Ledger failure.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// State machine failure.
    #[error("machine error: {0}")]
    Machine(#[from] MachineError),

    /// Clock failure.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// An agent id did not match any member of the colony.
    #[error("agent not in colony: {0}")]
    UnknownAgent(AgentId),
}
