//! The shared resource pool.
//!
//! [`ResourcePool`] owns every slot and inventory in the world. It answers
//! read-only availability queries for guards, and exposes the only three
//! mutating operations agents may trigger:
//!
//! - [`ResourcePool::try_claim`] -- check-and-set reservation of a slot
//! - [`ResourcePool::release`] -- give a claimed slot back
//! - [`ResourcePool::transfer`] -- move goods, clamped to what is possible
//!
//! Each operation either applies completely or leaves the pool untouched.
//! Contention between agents is resolved by call order: the first caller in
//! a tick to find free capacity wins.

use std::collections::BTreeMap;

use colony_types::{AgentId, InventoryId, Item, Need, SlotId, SlotKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::inventory::Inventory;
use crate::slot::{ClaimOutcome, Slot};

/// Every contested resource in the world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    slots: BTreeMap<SlotId, Slot>,
    inventories: BTreeMap<InventoryId, Inventory>,
}

impl ResourcePool {
    /// Create an empty pool.
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            inventories: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Add a slot to the pool.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateSlot`] if the id is already present.
    pub fn insert_slot(&mut self, slot: Slot) -> Result<SlotId, WorldError> {
        let id = slot.id();
        if self.slots.contains_key(&id) {
            return Err(WorldError::DuplicateSlot(id));
        }
        self.slots.insert(id, slot);
        Ok(id)
    }

    /// Add an inventory to the pool (initialized or not).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateInventory`] if the id is already present.
    pub fn insert_inventory(&mut self, inventory: Inventory) -> Result<InventoryId, WorldError> {
        let id = inventory.id();
        if self.inventories.contains_key(&id) {
            return Err(WorldError::DuplicateInventory(id));
        }
        self.inventories.insert(id, inventory);
        Ok(id)
    }

    /// Remove an inventory, returning it.
    pub fn remove_inventory(&mut self, id: InventoryId) -> Option<Inventory> {
        self.inventories.remove(&id)
    }

    // -----------------------------------------------------------------------
    // Read-only queries
    // -----------------------------------------------------------------------

    /// Look up a slot.
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(&id)
    }

    /// Look up an inventory.
    pub fn inventory(&self, id: InventoryId) -> Option<&Inventory> {
        self.inventories.get(&id)
    }

    /// Mutable access to an inventory, for seeding stock outside the
    /// transaction protocol (world setup and tests).
    pub fn inventory_mut(&mut self, id: InventoryId) -> Option<&mut Inventory> {
        self.inventories.get_mut(&id)
    }

    /// All slots in id order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    /// Number of registered slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the slot exists and has room for another claimant.
    pub fn has_free_capacity(&self, id: SlotId) -> bool {
        self.slots.get(&id).is_some_and(Slot::has_free_capacity)
    }

    /// Claimants of a slot, empty if the slot is unknown.
    pub fn claimants(&self, id: SlotId) -> &[AgentId] {
        match self.slots.get(&id) {
            Some(slot) => slot.claimants(),
            None => &[],
        }
    }

    /// The free slot of `kind` with the highest positive quality for `need`.
    ///
    /// Ties go to the lowest slot id, so the answer is stable across calls.
    pub fn find_available_slot(&self, kind: SlotKind, need: Need) -> Option<SlotId> {
        let mut best: Option<(SlotId, u32)> = None;
        for slot in self.slots.values() {
            if slot.kind() != kind || !slot.has_free_capacity() {
                continue;
            }
            let quality = slot.quality(need);
            if quality == 0 {
                continue;
            }
            if best.is_none_or(|(_, q)| quality > q) {
                best = Some((slot.id(), quality));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Slots currently claimed by `agent`.
    pub fn claims_held_by(&self, agent: AgentId) -> Vec<SlotId> {
        self.slots
            .values()
            .filter(|s| s.is_claimed_by(agent))
            .map(Slot::id)
            .collect()
    }

    /// Quantity of `item` in an inventory.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InventoryNotFound`] or
    /// [`WorldError::InventoryUninitialized`].
    pub fn quantity(&self, id: InventoryId, item: Item) -> Result<u32, WorldError> {
        self.inventory_ref(id)?.quantity(item)
    }

    /// Free capacity of an inventory.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InventoryNotFound`] or
    /// [`WorldError::InventoryUninitialized`].
    pub fn remaining_capacity(&self, id: InventoryId) -> Result<u32, WorldError> {
        self.inventory_ref(id)?.remaining_capacity()
    }

    /// Total units of `item` across every initialized inventory.
    ///
    /// Transfers never change this number.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if the sum overflows.
    pub fn total_of(&self, item: Item) -> Result<u32, WorldError> {
        let mut total: u32 = 0;
        for inventory in self.inventories.values().filter(|i| i.is_initialized()) {
            total = total
                .checked_add(inventory.quantity(item)?)
                .ok_or(WorldError::ArithmeticOverflow)?;
        }
        Ok(total)
    }

    fn inventory_ref(&self, id: InventoryId) -> Result<&Inventory, WorldError> {
        self.inventories
            .get(&id)
            .ok_or(WorldError::InventoryNotFound(id))
    }

    fn inventory_mut_ref(&mut self, id: InventoryId) -> Result<&mut Inventory, WorldError> {
        self.inventories
            .get_mut(&id)
            .ok_or(WorldError::InventoryNotFound(id))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Attempt to reserve a slot for `agent`.
    ///
    /// A full slot or a forbidden re-claim is reported through the outcome,
    /// not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SlotNotFound`] if the slot does not exist.
    pub fn try_claim(&mut self, id: SlotId, agent: AgentId) -> Result<ClaimOutcome, WorldError> {
        let slot = self.slots.get_mut(&id).ok_or(WorldError::SlotNotFound(id))?;
        let outcome = slot.try_claim(agent);
        debug!(
            slot = %id,
            agent = %agent,
            outcome = ?outcome,
            claimed = slot.claimed(),
            capacity = slot.capacity(),
            "slot claim attempted"
        );
        Ok(outcome)
    }

    /// Release `agent`'s claim on a slot. Returns whether a claim was held.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SlotNotFound`] if the slot does not exist.
    pub fn release(&mut self, id: SlotId, agent: AgentId) -> Result<bool, WorldError> {
        let slot = self.slots.get_mut(&id).ok_or(WorldError::SlotNotFound(id))?;
        let released = slot.release(agent);
        debug!(slot = %id, agent = %agent, released, "slot release attempted");
        Ok(released)
    }

    /// Release every slot held by `agent`. Returns the released slot ids.
    pub fn release_all(&mut self, agent: AgentId) -> Vec<SlotId> {
        let mut released = Vec::new();
        for slot in self.slots.values_mut() {
            if slot.release(agent) {
                released.push(slot.id());
            }
        }
        released
    }

    /// Move up to `requested` units of `item` from `from` into `to`.
    ///
    /// The moved amount is `min(requested, held at source, free capacity at
    /// destination)`. A partial move is a success; zero means nothing could
    /// move this tick. Returns the number of units moved.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SelfTransfer`], [`WorldError::InventoryNotFound`],
    /// or [`WorldError::InventoryUninitialized`] (checked on both sides before
    /// anything is mutated).
    pub fn transfer(
        &mut self,
        from: InventoryId,
        to: InventoryId,
        item: Item,
        requested: u32,
    ) -> Result<u32, WorldError> {
        if from == to {
            return Err(WorldError::SelfTransfer(from));
        }
        let available = self.inventory_ref(from)?.quantity(item)?;
        let room = self.inventory_ref(to)?.remaining_capacity()?;
        let moved = requested.min(available).min(room);

        debug!(
            from = %from,
            to = %to,
            item = ?item,
            requested,
            available,
            room,
            moved,
            "transfer clamped"
        );

        if moved == 0 {
            return Ok(0);
        }

        self.inventory_mut_ref(from)?.remove(item, moved)?;
        if let Err(err) = self.inventory_mut_ref(to)?.add(item, moved) {
            // Put the goods back so a failed add never loses units.
            self.inventory_mut_ref(from)?.add(item, moved)?;
            return Err(err);
        }
        Ok(moved)
    }
}
