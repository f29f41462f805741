//! Fungible inventories with a carry capacity.
//!
//! An [`Inventory`] holds item quantities subject to a total-load limit. All
//! arithmetic is checked -- no silent overflows, no panics. An inventory is
//! created uninitialized and must be [`initialize`]d before any read or
//! write; touching it earlier is a construct-before-use bug and returns
//! [`WorldError::InventoryUninitialized`].
//!
//! [`initialize`]: Inventory::initialize

use std::collections::BTreeMap;

use colony_types::{InventoryId, Item};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// A capacity-limited bag of fungible items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    id: InventoryId,
    capacity: u32,
    /// `None` until [`Inventory::initialize`] runs.
    contents: Option<BTreeMap<Item, u32>>,
}

impl Inventory {
    /// Create an uninitialized inventory with the given capacity.
    pub const fn new(id: InventoryId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            contents: None,
        }
    }

    /// Create an inventory that is ready for use.
    pub const fn initialized(id: InventoryId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            contents: Some(BTreeMap::new()),
        }
    }

    /// Make the inventory usable. Calling this twice keeps existing contents.
    pub fn initialize(&mut self) {
        if self.contents.is_none() {
            self.contents = Some(BTreeMap::new());
        }
    }

    /// The inventory id.
    pub const fn id(&self) -> InventoryId {
        self.id
    }

    /// The maximum total load.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether [`initialize`](Self::initialize) has run.
    pub const fn is_initialized(&self) -> bool {
        self.contents.is_some()
    }

    fn contents(&self) -> Result<&BTreeMap<Item, u32>, WorldError> {
        self.contents
            .as_ref()
            .ok_or(WorldError::InventoryUninitialized(self.id))
    }

    fn contents_mut(&mut self) -> Result<&mut BTreeMap<Item, u32>, WorldError> {
        self.contents
            .as_mut()
            .ok_or(WorldError::InventoryUninitialized(self.id))
    }

    /// Total load (sum of all quantities).
    pub fn load(&self) -> Result<u32, WorldError> {
        let mut total: u32 = 0;
        for qty in self.contents()?.values() {
            total = total.checked_add(*qty).ok_or(WorldError::ArithmeticOverflow)?;
        }
        Ok(total)
    }

    /// Quantity of one item held.
    pub fn quantity(&self, item: Item) -> Result<u32, WorldError> {
        Ok(self.contents()?.get(&item).copied().unwrap_or(0))
    }

    /// How many more units fit before the capacity is reached.
    pub fn remaining_capacity(&self) -> Result<u32, WorldError> {
        Ok(self.capacity.saturating_sub(self.load()?))
    }

    /// A copy of the contents.
    pub fn snapshot(&self) -> Result<BTreeMap<Item, u32>, WorldError> {
        self.contents().cloned()
    }

    /// Add `amount` units of `item`.
    ///
    /// Fails without changing anything if the addition would exceed the
    /// capacity or overflow.
    pub fn add(&mut self, item: Item, amount: u32) -> Result<(), WorldError> {
        let current_load = self.load()?;
        let (id, capacity) = (self.id, self.capacity);
        let overflow = || WorldError::InventoryOverflow {
            inventory: id,
            item,
            attempted: amount,
            current_load,
            capacity,
        };
        let new_load = current_load.checked_add(amount).ok_or_else(overflow)?;
        if new_load > capacity {
            return Err(overflow());
        }

        let entry = self.contents_mut()?.entry(item).or_insert(0);
        // Bounded by new_load <= capacity, so this cannot overflow.
        *entry = entry.checked_add(amount).ok_or(WorldError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Remove `amount` units of `item`.
    ///
    /// Fails without changing anything if the inventory holds fewer units.
    /// Drops the key entirely once the quantity reaches zero.
    pub fn remove(&mut self, item: Item, amount: u32) -> Result<(), WorldError> {
        let id = self.id;
        let contents = self.contents_mut()?;
        let current = contents.get(&item).copied().unwrap_or(0);
        let remaining = current
            .checked_sub(amount)
            .ok_or(WorldError::InsufficientItem {
                inventory: id,
                item,
                requested: amount,
                available: current,
            })?;

        if remaining == 0 {
            contents.remove(&item);
        } else {
            contents.insert(item, remaining);
        }
        Ok(())
    }

    /// Empty the inventory, returning what it held.
    pub fn drain_all(&mut self) -> Result<BTreeMap<Item, u32>, WorldError> {
        Ok(core::mem::take(self.contents_mut()?))
    }
}
