//! The colony: agents, their machines, the pool, and the tick loop.
//!
//! [`Colony::advance`] is the whole simulation step. It moves the clock
//! forward, then ticks every agent's machine once in spawn order, handing
//! each an [`AgentContext`] that borrows the agent, the pool, and the ledger.
//! Agents are processed strictly one after another, so contention for a
//! slot is decided by the pool's check-and-set in that order.

use std::time::Duration;

use colony_agents::{Agent, AgentError, AgentRoster, InventoryPromise, InventoryTransaction};
use colony_ledger::{AuditResult, Ledger};
use colony_types::{AgentId, InventoryId, SlotId, TransactionState};
use colony_world::{Inventory, ResourcePool, WorldError};
use tracing::{debug, info, warn};

use crate::clock::SimClock;
use crate::error::{MachineError, TickError};
use crate::machine::{AgentContext, StateId, StateMachine, Switch};
use crate::snapshot::{ColonySnapshot, SavedAgent};

#[derive(Debug)]
struct Member {
    agent: Agent,
    machine: StateMachine,
}

/// What happened during one call to [`Colony::advance`].
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    /// The tick that ran.
    pub tick: u64,
    /// State switches, in agent order.
    pub switches: Vec<(AgentId, Switch)>,
    /// Transactions that reached a final state, in resolution order.
    pub resolved: Vec<InventoryTransaction>,
}

impl TickSummary {
    fn count(&self, state: TransactionState) -> usize {
        self.resolved.iter().filter(|t| t.state() == state).count()
    }

    /// Transactions committed this tick.
    pub fn committed(&self) -> usize {
        self.count(TransactionState::Committed)
    }

    /// Transactions abandoned after too many failed attempts.
    pub fn timed_out(&self) -> usize {
        self.count(TransactionState::TimedOut)
    }

    /// Transactions cancelled this tick.
    pub fn cancelled(&self) -> usize {
        self.count(TransactionState::Cancelled)
    }

    /// Resolutions belonging to one agent.
    pub fn resolved_for(&self, agent: AgentId) -> impl Iterator<Item = &InventoryTransaction> {
        self.resolved.iter().filter(move |t| t.agent() == agent)
    }

    /// The switch one agent made, if any.
    pub fn switch_of(&self, agent: AgentId) -> Option<Switch> {
        self.switches
            .iter()
            .find(|(id, _)| *id == agent)
            .map(|(_, switch)| *switch)
    }
}

/// An agent removed by [`Colony::despawn_agent`].
#[derive(Debug)]
pub struct Departure {
    /// The agent, with a disposed promise.
    pub agent: Agent,
    /// The agent's personal inventory, removed from the pool.
    pub inventory: Option<Inventory>,
    /// Slots released on the agent's behalf.
    pub released: Vec<SlotId>,
    /// Pending transactions cancelled by the removal.
    pub cancelled: Vec<InventoryTransaction>,
}

/// The simulation: agents, their state machines, and the shared world.
#[derive(Debug, Default)]
pub struct Colony {
    clock: SimClock,
    pool: ResourcePool,
    ledger: Ledger,
    roster: AgentRoster,
    members: Vec<Member>,
}

impl Colony {
    /// A colony with no agents around `pool`.
    pub fn new(pool: ResourcePool) -> Self {
        Self {
            pool,
            ..Self::default()
        }
    }

    /// Keep only about `limit` ledger entries, dropping the oldest.
    ///
    /// Call before the first tick; entries already recorded are discarded.
    #[must_use]
    pub fn with_ledger_retention(mut self, limit: usize) -> Self {
        self.ledger = Ledger::with_retention(limit);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The shared resource pool.
    pub const fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Mutable access to the pool, for world setup between ticks.
    pub const fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.pool
    }

    /// The ledger of committed transactions.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The simulation clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Number of agents.
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the colony has no agents.
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Agents in spawn order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.members.iter().map(|m| &m.agent)
    }

    /// Agent ids in spawn order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.members.iter().map(|m| m.agent.id).collect()
    }

    fn member(&self, id: AgentId) -> Option<&Member> {
        self.members.iter().find(|m| m.agent.id == id)
    }

    /// Look up an agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.member(id).map(|m| &m.agent)
    }

    /// Mutable access to an agent between ticks.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.members
            .iter_mut()
            .find(|m| m.agent.id == id)
            .map(|m| &mut m.agent)
    }

    /// An agent's state machine.
    pub fn machine(&self, id: AgentId) -> Option<&StateMachine> {
        self.member(id).map(|m| &m.machine)
    }

    /// An agent's current state.
    pub fn current_state(&self, id: AgentId) -> Option<StateId> {
        self.machine(id).and_then(StateMachine::current)
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add an agent named `name` driven by `machine`.
    ///
    /// Creates and initializes the agent's personal inventory and promise
    /// queue, then activates the machine.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateName`] (as [`TickError::Agent`]) if the
    /// name is taken, or any error the default state's `begin` raises.
    pub fn spawn_agent(
        &mut self,
        name: String,
        inventory_capacity: u32,
        machine: StateMachine,
    ) -> Result<AgentId, TickError> {
        let inventory = InventoryId::new();
        let mut agent = self.roster.create(name, inventory)?;
        if let Err(err) = self
            .pool
            .insert_inventory(Inventory::initialized(inventory, inventory_capacity))
        {
            self.roster.release_name(agent.name());
            return Err(err.into());
        }
        agent.promise.initialize();
        let id = agent.id;
        self.admit(agent, machine)?;
        info!(agent_id = %id, inventory = %inventory, tick = self.tick(), "agent spawned");
        Ok(id)
    }

    fn admit(&mut self, mut agent: Agent, mut machine: StateMachine) -> Result<(), TickError> {
        let sim = self.clock.context(Duration::ZERO);
        let mut ctx = AgentContext::new(&mut agent, &mut self.pool, &mut self.ledger, sim);
        machine.activate(&mut ctx)?;
        self.members.push(Member { agent, machine });
        Ok(())
    }

    /// Remove an agent from the colony.
    ///
    /// Leaves the current state, disposes the promise queue (cancelling
    /// anything pending), releases every slot the agent holds, and takes its
    /// inventory out of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::UnknownAgent`] if no such agent exists, or any
    /// error the current state's `end` raises.
    pub fn despawn_agent(&mut self, id: AgentId) -> Result<Departure, TickError> {
        let position = self
            .members
            .iter()
            .position(|m| m.agent.id == id)
            .ok_or(TickError::UnknownAgent(id))?;
        let mut member = self.members.remove(position);

        let sim = self.clock.context(Duration::ZERO);
        let mut ctx = AgentContext::new(&mut member.agent, &mut self.pool, &mut self.ledger, sim);
        member.machine.deactivate(&mut ctx)?;

        let mut agent = member.agent;
        agent.promise.dispose();
        let cancelled = agent.promise.take_resolved();
        let released = self.pool.release_all(id);
        for slot in &released {
            agent.model.clear_claim(*slot);
        }
        let inventory = self.pool.remove_inventory(agent.model.inventory);
        self.roster.release_name(agent.name());

        if !cancelled.is_empty() {
            warn!(
                agent_id = %id,
                cancelled = cancelled.len(),
                "pending transactions cancelled by despawn"
            );
        }
        info!(agent_id = %id, released = released.len(), tick = self.tick(), "agent despawned");
        Ok(Departure {
            agent,
            inventory,
            released,
            cancelled,
        })
    }

    /// Force an agent's machine back to its default state, cancelling its
    /// pending transactions.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::UnknownAgent`] if no such agent exists, or any
    /// error from [`StateMachine::reset`].
    pub fn reset_agent(&mut self, id: AgentId) -> Result<Vec<InventoryTransaction>, TickError> {
        let sim = self.clock.context(Duration::ZERO);
        let member = self
            .members
            .iter_mut()
            .find(|m| m.agent.id == id)
            .ok_or(TickError::UnknownAgent(id))?;
        let mut ctx = AgentContext::new(&mut member.agent, &mut self.pool, &mut self.ledger, sim);
        let cancelled = member.machine.reset(&mut ctx)?;
        // Drain the resolved log so the next summary does not report these.
        member.agent.promise.take_resolved();
        Ok(cancelled)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one simulation tick covering `delta` of simulated time.
    ///
    /// Resolutions are collected from the agents only once every machine has
    /// ticked. When a tick aborts, transactions already resolved during it
    /// stay in their agents' logs and are reported by the next successful
    /// tick, and their ledger entries are audited then.
    ///
    /// # Errors
    ///
    /// Any hard failure aborts the tick: use of an uninitialized promise or
    /// inventory, a ledger rejection, a clock overflow, or a machine error.
    pub fn advance(&mut self, delta: Duration) -> Result<TickSummary, TickError> {
        let sim = self.clock.advance(delta)?;
        let mut summary = TickSummary {
            tick: sim.tick,
            ..TickSummary::default()
        };

        for member in &mut self.members {
            let mut ctx =
                AgentContext::new(&mut member.agent, &mut self.pool, &mut self.ledger, sim);
            if let Some(switch) = member.machine.tick(&mut ctx)? {
                summary.switches.push((member.agent.id, switch));
            }
        }
        for member in &mut self.members {
            summary.resolved.extend(member.agent.promise.take_resolved());
        }

        if let AuditResult::Anomaly(anomaly) = self.ledger.audit_pending(sim.tick) {
            warn!(tick = sim.tick, %anomaly, "ledger audit failed");
        }
        debug!(
            tick = sim.tick,
            switches = summary.switches.len(),
            committed = summary.committed(),
            timed_out = summary.timed_out(),
            cancelled = summary.cancelled(),
            "tick complete"
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Capture the persistent part of the colony.
    ///
    /// Agent models, the pool (slot claimants included), and the clock are
    /// saved. Current states and pending transactions are not.
    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            clock: self.clock,
            pool: self.pool.clone(),
            agents: self
                .members
                .iter()
                .map(|m| SavedAgent {
                    id: m.agent.id,
                    model: m.agent.model.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a colony from a snapshot.
    ///
    /// `machine_for` builds a fresh machine for each restored agent. Every
    /// machine starts in its default state with an empty promise queue; held
    /// claims survive through the agent model and the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if two saved agents share a name, an agent's
    /// inventory is missing from the pool, or a machine cannot be built or
    /// activated.
    pub fn restore<F>(snapshot: ColonySnapshot, mut machine_for: F) -> Result<Self, TickError>
    where
        F: FnMut(&Agent) -> Result<StateMachine, MachineError>,
    {
        let ColonySnapshot {
            clock,
            pool,
            agents,
        } = snapshot;
        let mut colony = Self {
            clock,
            pool,
            ..Self::default()
        };

        for saved in agents {
            if !colony.roster.adopt_name(&saved.model.name) {
                return Err(AgentError::DuplicateName(saved.model.name).into());
            }
            let inventory = saved.model.inventory;
            colony
                .pool
                .inventory_mut(inventory)
                .ok_or(WorldError::InventoryNotFound(inventory))?
                .initialize();

            let mut agent = Agent {
                id: saved.id,
                model: saved.model,
                promise: InventoryPromise::new(saved.id),
            };
            agent.promise.initialize();
            let machine = machine_for(&agent)?;
            colony.admit(agent, machine)?;
        }

        info!(tick = colony.tick(), agents = colony.len(), "colony restored");
        Ok(colony)
    }
}
