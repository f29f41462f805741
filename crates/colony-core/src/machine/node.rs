//! Type-erased storage for registered states.
//!
//! The machine holds states of different types side by side, so each one is
//! wrapped with its transitions in a [`StateNode`] and stored behind the
//! object-safe [`Node`] trait.

use crate::error::TickError;
use crate::machine::{AgentContext, State, StateId, Target, Transitions};

/// A transition that fired during evaluation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fired {
    pub label: &'static str,
    pub target: Target,
}

pub(crate) trait Node {
    fn id(&self) -> StateId;
    fn initialize(&mut self);
    fn targets(&self) -> Vec<(&'static str, Target)>;
    fn fire_counts(&self) -> Vec<(&'static str, u64)>;
    fn begin(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError>;
    fn idle(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError>;
    fn end(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError>;
    fn evaluate(&mut self, ctx: &mut AgentContext<'_>) -> Result<Option<Fired>, TickError>;
}

pub(crate) struct StateNode<S: State> {
    state: S,
    transitions: Transitions<S>,
    initialized: bool,
}

impl<S: State> StateNode<S> {
    pub(crate) const fn new(state: S) -> Self {
        Self {
            state,
            transitions: Transitions::new(),
            initialized: false,
        }
    }
}

impl<S: State> Node for StateNode<S> {
    fn id(&self) -> StateId {
        self.state.id()
    }

    fn initialize(&mut self) {
        if !self.initialized {
            self.state.on_initialize(&mut self.transitions);
            self.initialized = true;
        }
    }

    fn targets(&self) -> Vec<(&'static str, Target)> {
        self.transitions
            .iter()
            .map(|t| (t.label(), t.target()))
            .collect()
    }

    fn fire_counts(&self) -> Vec<(&'static str, u64)> {
        self.transitions
            .iter()
            .map(|t| (t.label(), t.fired()))
            .collect()
    }

    fn begin(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.state.begin(ctx)
    }

    fn idle(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.state.idle(ctx)
    }

    fn end(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.state.end(ctx)
    }

    fn evaluate(&mut self, ctx: &mut AgentContext<'_>) -> Result<Option<Fired>, TickError> {
        let Self {
            state, transitions, ..
        } = self;
        for transition in transitions.iter_mut() {
            if transition.is_triggered(state, ctx) {
                transition.fire(state, ctx)?;
                return Ok(Some(Fired {
                    label: transition.label(),
                    target: transition.target(),
                }));
            }
        }
        Ok(None)
    }
}
