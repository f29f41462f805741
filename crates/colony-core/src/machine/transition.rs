//! Transitions between states.
//!
//! A [`Transition`] is data: a label, a [`Target`], a read-only guard, and an
//! optional effect that runs exactly once when the transition fires. States
//! register theirs in [`State::on_initialize`](crate::State::on_initialize)
//! through [`Transitions`].

use core::fmt;

use crate::error::TickError;
use crate::machine::{AgentContext, StateId};

type Guard<S> = Box<dyn Fn(&S, &AgentContext<'_>) -> bool>;
type Effect<S> = Box<dyn FnMut(&mut S, &mut AgentContext<'_>) -> Result<(), TickError>>;

/// Where a transition leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A fixed state.
    State(StateId),
    /// The state the machine was in before the current one, or the default
    /// state when there is none.
    Previous,
}

/// A guarded edge out of a state of type `S`.
pub struct Transition<S> {
    label: &'static str,
    target: Target,
    guard: Guard<S>,
    effect: Option<Effect<S>>,
    fired: u64,
}

impl<S> Transition<S> {
    /// A transition to a fixed state.
    pub fn to<G>(target: StateId, label: &'static str, guard: G) -> Self
    where
        G: Fn(&S, &AgentContext<'_>) -> bool + 'static,
    {
        Self::new(Target::State(target), label, guard)
    }

    /// A transition back to the previous state.
    pub fn to_previous<G>(label: &'static str, guard: G) -> Self
    where
        G: Fn(&S, &AgentContext<'_>) -> bool + 'static,
    {
        Self::new(Target::Previous, label, guard)
    }

    /// A transition to `target`.
    pub fn new<G>(target: Target, label: &'static str, guard: G) -> Self
    where
        G: Fn(&S, &AgentContext<'_>) -> bool + 'static,
    {
        Self {
            label,
            target,
            guard: Box::new(guard),
            effect: None,
            fired: 0,
        }
    }

    /// Attach a side effect, run once each time the transition fires and
    /// before the machine switches.
    #[must_use]
    pub fn with_effect<F>(mut self, effect: F) -> Self
    where
        F: FnMut(&mut S, &mut AgentContext<'_>) -> Result<(), TickError> + 'static,
    {
        self.effect = Some(Box::new(effect));
        self
    }

    /// The transition's label.
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Where the transition leads.
    pub const fn target(&self) -> Target {
        self.target
    }

    /// How many times the transition has fired.
    pub const fn fired(&self) -> u64 {
        self.fired
    }

    /// Evaluate the guard.
    pub fn is_triggered(&self, state: &S, ctx: &AgentContext<'_>) -> bool {
        (self.guard)(state, ctx)
    }

    pub(crate) fn fire(
        &mut self,
        state: &mut S,
        ctx: &mut AgentContext<'_>,
    ) -> Result<(), TickError> {
        if let Some(effect) = self.effect.as_mut() {
            effect(state, ctx)?;
        }
        self.fired = self.fired.saturating_add(1);
        Ok(())
    }
}

impl<S> fmt::Debug for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("label", &self.label)
            .field("target", &self.target)
            .field("has_effect", &self.effect.is_some())
            .field("fired", &self.fired)
            .finish()
    }
}

/// The ordered outgoing transitions of one state.
pub struct Transitions<S> {
    list: Vec<Transition<S>>,
}

impl<S> Transitions<S> {
    pub(crate) const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Append a transition. Earlier registrations win ties.
    pub fn add(&mut self, transition: Transition<S>) -> &mut Self {
        self.list.push(transition);
        self
    }

    /// Number of registered transitions.
    pub const fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether no transitions are registered.
    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Transitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Transition<S>> {
        self.list.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Transition<S>> {
        self.list.iter_mut()
    }
}

impl<S> fmt::Debug for Transitions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.list.iter()).finish()
    }
}
