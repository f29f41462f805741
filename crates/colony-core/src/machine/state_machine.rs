//! The per-agent state machine and its builder.

use core::fmt;
use std::collections::BTreeMap;

use colony_agents::InventoryTransaction;
use tracing::{debug, warn};

use crate::error::{MachineError, TickError};
use crate::machine::node::{Node, StateNode};
use crate::machine::{AgentContext, State, StateId, Target};

/// A switch performed by [`StateMachine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch {
    /// State that was left.
    pub from: StateId,
    /// State that was entered.
    pub to: StateId,
    /// Label of the transition that fired.
    pub label: &'static str,
}

/// Lifetime counters for one registered state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateStats {
    /// Times the state was entered.
    pub entered: u64,
    /// Times the state was left.
    pub exited: u64,
    /// Ticks spent idling in the state.
    pub idled: u64,
}

struct Registered {
    node: Box<dyn Node>,
    stats: StateStats,
}

impl Registered {
    fn enter(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.stats.entered = self.stats.entered.saturating_add(1);
        self.node.begin(ctx)
    }

    fn exit(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.stats.exited = self.stats.exited.saturating_add(1);
        self.node.end(ctx)
    }
}

/// Collects states and the default before building a [`StateMachine`].
#[derive(Default)]
pub struct StateMachineBuilder {
    nodes: Vec<Box<dyn Node>>,
    default: Option<StateId>,
}

impl StateMachineBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state.
    #[must_use]
    pub fn state<S: State>(mut self, state: S) -> Self {
        self.nodes.push(Box::new(StateNode::new(state)));
        self
    }

    /// Register a state and make it the default.
    #[must_use]
    pub fn default_state<S: State>(mut self, state: S) -> Self {
        self.default = Some(state.id());
        self.state(state)
    }

    /// Name the default state among those registered.
    #[must_use]
    pub const fn with_default(mut self, id: StateId) -> Self {
        self.default = Some(id);
        self
    }

    /// Initialize every state and check the wiring.
    ///
    /// Calls [`State::on_initialize`] once per state. The machine is returned
    /// inactive; call [`StateMachine::activate`] to enter the default state.
    ///
    /// # Errors
    ///
    /// - [`MachineError::DuplicateState`] if two states share an id.
    /// - [`MachineError::MissingDefault`] if no registered default was named.
    /// - [`MachineError::UnknownTarget`] if a transition leads nowhere.
    pub fn build(self) -> Result<StateMachine, MachineError> {
        let mut index = BTreeMap::new();
        let mut entries = Vec::with_capacity(self.nodes.len());
        for (position, mut node) in self.nodes.into_iter().enumerate() {
            let id = node.id();
            if index.insert(id, position).is_some() {
                return Err(MachineError::DuplicateState(id));
            }
            node.initialize();
            entries.push(Registered {
                node,
                stats: StateStats::default(),
            });
        }

        let default = self
            .default
            .and_then(|id| index.get(&id).copied())
            .ok_or(MachineError::MissingDefault)?;

        for entry in &entries {
            for (label, target) in entry.node.targets() {
                let Target::State(target) = target else {
                    continue;
                };
                if !index.contains_key(&target) {
                    return Err(MachineError::UnknownTarget {
                        from: entry.node.id(),
                        label,
                        target,
                    });
                }
            }
        }

        Ok(StateMachine {
            entries,
            index,
            default,
            current: None,
            previous: None,
        })
    }
}

/// Drives one agent through its registered states.
pub struct StateMachine {
    entries: Vec<Registered>,
    index: BTreeMap<StateId, usize>,
    default: usize,
    current: Option<usize>,
    previous: Option<usize>,
}

impl StateMachine {
    /// Start building a machine.
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::new()
    }

    fn entry(&self, position: usize) -> Result<&Registered, MachineError> {
        self.entries
            .get(position)
            .ok_or(MachineError::StateIndex(position))
    }

    fn entry_mut(&mut self, position: usize) -> Result<&mut Registered, MachineError> {
        self.entries
            .get_mut(position)
            .ok_or(MachineError::StateIndex(position))
    }

    fn id_at(&self, position: usize) -> Result<StateId, MachineError> {
        Ok(self.entry(position)?.node.id())
    }

    /// Enter the default state.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::AlreadyActive`] on a second call, or whatever
    /// the default state's `begin` returns.
    pub fn activate(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        if self.current.is_some() {
            return Err(MachineError::AlreadyActive.into());
        }
        let default = self.default;
        self.current = Some(default);
        self.previous = None;
        debug!(agent = %ctx.agent.id, state = %self.id_at(default)?, "state machine activated");
        self.entry_mut(default)?.enter(ctx)
    }

    /// Leave the current state and become inactive.
    ///
    /// Does nothing on an inactive machine.
    pub fn deactivate(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        if let Some(current) = self.current.take() {
            self.previous = None;
            self.entry_mut(current)?.exit(ctx)?;
        }
        Ok(())
    }

    /// Run one tick: idle the current state, then fire at most one of its
    /// transitions.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Inactive`] before activation, or any error a
    /// hook or effect raises.
    pub fn tick(&mut self, ctx: &mut AgentContext<'_>) -> Result<Option<Switch>, TickError> {
        let current = self.current.ok_or(MachineError::Inactive)?;
        let entry = self.entry_mut(current)?;
        entry.stats.idled = entry.stats.idled.saturating_add(1);
        entry.node.idle(ctx)?;
        let Some(fired) = entry.node.evaluate(ctx)? else {
            return Ok(None);
        };

        let target = match fired.target {
            Target::State(id) => match self.index.get(&id) {
                Some(position) => *position,
                None => {
                    return Err(MachineError::UnknownTarget {
                        from: self.id_at(current)?,
                        label: fired.label,
                        target: id,
                    }
                    .into());
                }
            },
            Target::Previous => self.previous.unwrap_or(self.default),
        };

        let switch = Switch {
            from: self.id_at(current)?,
            to: self.id_at(target)?,
            label: fired.label,
        };
        debug!(
            agent = %ctx.agent.id,
            tick = ctx.sim.tick,
            from = %switch.from,
            to = %switch.to,
            label = switch.label,
            "transition fired"
        );
        self.switch(current, target, ctx)?;
        Ok(Some(switch))
    }

    fn switch(
        &mut self,
        from: usize,
        to: usize,
        ctx: &mut AgentContext<'_>,
    ) -> Result<(), TickError> {
        self.entry_mut(from)?.exit(ctx)?;
        self.previous = Some(from);
        self.current = Some(to);
        self.entry_mut(to)?.enter(ctx)
    }

    /// Force the machine back to its default state.
    ///
    /// Cancels every pending transaction of the agent first, then leaves the
    /// current state and enters the default one (even if it was already
    /// current). The previous state is forgotten. Returns the cancelled
    /// transactions.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Inactive`] before activation, an agent error
    /// if the promise is uninitialized, or any hook error.
    pub fn reset(
        &mut self,
        ctx: &mut AgentContext<'_>,
    ) -> Result<Vec<InventoryTransaction>, TickError> {
        let current = self.current.ok_or(MachineError::Inactive)?;
        let cancelled = ctx.agent.promise.cancel_all()?;
        if !cancelled.is_empty() {
            warn!(
                agent = %ctx.agent.id,
                cancelled = cancelled.len(),
                "pending transactions cancelled by reset"
            );
        }
        let default = self.default;
        self.switch(current, default, ctx)?;
        self.previous = None;
        Ok(cancelled)
    }

    /// Whether [`activate`](Self::activate) has run.
    pub const fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// The current state, if active.
    pub fn current(&self) -> Option<StateId> {
        self.current.and_then(|p| self.id_at(p).ok())
    }

    /// The state left most recently, if any.
    pub fn previous(&self) -> Option<StateId> {
        self.previous.and_then(|p| self.id_at(p).ok())
    }

    /// The default state.
    pub fn default_state(&self) -> Option<StateId> {
        self.id_at(self.default).ok()
    }

    /// Registered state ids in registration order.
    pub fn state_ids(&self) -> Vec<StateId> {
        self.entries.iter().map(|e| e.node.id()).collect()
    }

    /// Lifetime counters for a state.
    pub fn stats(&self, id: StateId) -> Option<StateStats> {
        let position = self.index.get(&id).copied()?;
        self.entries.get(position).map(|e| e.stats)
    }

    /// How often each transition of a state has fired, in registration
    /// order.
    pub fn transition_counts(&self, id: StateId) -> Vec<(&'static str, u64)> {
        self.index
            .get(&id)
            .and_then(|p| self.entries.get(*p))
            .map(|e| e.node.fire_counts())
            .unwrap_or_default()
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("states", &self.state_ids())
            .field("current", &self.current())
            .field("previous", &self.previous())
            .field("default", &self.default_state())
            .finish()
    }
}
