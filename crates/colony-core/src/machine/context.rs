//! The per-tick view an agent's states work through.
//!
//! [`AgentContext`] holds the borrows for one agent's tick and offers helpers
//! that queue transactions on the agent's promise.

use colony_agents::{Agent, InventoryTransaction};
use colony_ledger::Ledger;
use colony_types::{InventoryId, Item, SlotId, TransactionId};
use colony_world::ResourcePool;

use crate::clock::SimContext;
use crate::error::TickError;

/// Everything a state may touch while its agent is being ticked.
///
/// Guards receive a shared reference; hooks and effects receive a mutable
/// one. The borrows end when the agent's tick ends.
#[derive(Debug)]
pub struct AgentContext<'a> {
    /// The agent being ticked.
    pub agent: &'a mut Agent,
    /// The shared resource pool.
    pub pool: &'a mut ResourcePool,
    /// The ledger of committed transactions.
    pub ledger: &'a mut Ledger,
    /// Simulated time for this tick.
    pub sim: SimContext,
}

impl<'a> AgentContext<'a> {
    /// Bundle the borrows for one agent's tick.
    pub const fn new(
        agent: &'a mut Agent,
        pool: &'a mut ResourcePool,
        ledger: &'a mut Ledger,
        sim: SimContext,
    ) -> Self {
        Self {
            agent,
            pool,
            ledger,
            sim,
        }
    }

    /// Queue a claim on `slot` for this agent.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Agent`] if the agent's promise is not initialized.
    pub fn request_claim(&mut self, slot: SlotId) -> Result<TransactionId, TickError> {
        let txn = InventoryTransaction::claim(self.agent.id, slot, self.sim.tick);
        Ok(self.agent.promise.push(txn)?)
    }

    /// Queue the release of `slot` for this agent.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Agent`] if the agent's promise is not initialized.
    pub fn request_release(&mut self, slot: SlotId) -> Result<TransactionId, TickError> {
        let txn = InventoryTransaction::release(self.agent.id, slot, self.sim.tick);
        Ok(self.agent.promise.push(txn)?)
    }

    /// Queue a transfer of up to `quantity` units of `item`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Agent`] if the agent's promise is not initialized.
    pub fn request_transfer(
        &mut self,
        item: Item,
        from: InventoryId,
        to: InventoryId,
        quantity: u32,
    ) -> Result<TransactionId, TickError> {
        let txn =
            InventoryTransaction::transfer(self.agent.id, item, from, to, quantity, self.sim.tick);
        Ok(self.agent.promise.push(txn)?)
    }
}
