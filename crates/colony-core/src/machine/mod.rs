//! Agent behavior state machines.
//!
//! Each agent is driven by one [`StateMachine`]: a set of tagged [`State`]s
//! and the [`Transition`]s between them. A machine is built once per agent
//! with [`StateMachineBuilder`], activated, and then ticked once per
//! simulation tick with an [`AgentContext`] that borrows the agent, the
//! shared pool, and the ledger for the duration of that tick.
//!
//! Per tick the current state idles, then its transitions are evaluated in
//! registration order. The first whose guard holds runs its effect and the
//! machine switches (`end` on the source, `begin` on the target). At most
//! one transition fires per tick.

mod context;
mod node;
pub mod state;
pub mod state_machine;
pub mod transition;

use core::fmt;

pub use context::AgentContext;
pub use state::State;
pub use state_machine::{StateMachine, StateMachineBuilder, StateStats, Switch};
pub use transition::{Target, Transition, Transitions};

/// Tag identifying a state within one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(&'static str);

impl StateId {
    /// Create a state id from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The state's name.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
