//! The [`State`] trait.

use crate::error::TickError;
use crate::machine::{AgentContext, StateId, Transitions};

/// One behavior of an agent.
///
/// A state owns only its own locals. Anything shared lives in the
/// [`AgentContext`] and is reached through it; pool mutation goes through the
/// transaction protocol. Locals are reset in [`begin`](State::begin).
pub trait State: Sized + 'static {
    /// The tag this state is registered under.
    fn id(&self) -> StateId;

    /// Register outgoing transitions. Called exactly once, when the machine
    /// is built.
    fn on_initialize(&mut self, transitions: &mut Transitions<Self>);

    /// Called when the state becomes current.
    fn begin(&mut self, _ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        Ok(())
    }

    /// Called once per tick while the state is current, before its
    /// transitions are evaluated.
    fn idle(&mut self, _ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        Ok(())
    }

    /// Called when the state stops being current.
    fn end(&mut self, _ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        Ok(())
    }
}
