//! Error types for the `colony-world` crate.
//!
//! "Resource unavailable" is not an error: a full slot or an empty source
//! inventory is reported through [`ClaimOutcome`] or a zero transfer. The
//! variants here are lookup failures, arithmetic failures, and use of an
//! inventory before it was initialized.
//!
//! [`ClaimOutcome`]: crate::ClaimOutcome

use colony_types::{InventoryId, Item, SlotId};

/// Errors that can occur during resource pool operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A slot was not found in the pool.
    #[error("slot not found: {0}")]
    SlotNotFound(SlotId),

    /// An inventory was not found in the pool.
    #[error("inventory not found: {0}")]
    InventoryNotFound(InventoryId),

    /// The inventory exists but has not been initialized.
    #[error("inventory {0} used before initialization")]
    InventoryUninitialized(InventoryId),

    /// Attempted to add items that would exceed carry capacity.
    #[error("inventory overflow in {inventory}: adding {attempted} of {item:?} would exceed capacity (current load: {current_load}, capacity: {capacity})")]
    InventoryOverflow {
        /// The inventory being filled.
        inventory: InventoryId,
        /// The item being added.
        item: Item,
        /// The quantity the caller attempted to add.
        attempted: u32,
        /// The inventory's current total load.
        current_load: u32,
        /// The inventory's carry capacity.
        capacity: u32,
    },

    /// Attempted to remove more of an item than the inventory holds.
    #[error("insufficient {item:?} in {inventory}: wanted {requested} but only have {available}")]
    InsufficientItem {
        /// The inventory being drained.
        inventory: InventoryId,
        /// The item being removed.
        item: Item,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// A transfer named the same inventory on both sides.
    #[error("cannot transfer from inventory {0} into itself")]
    SelfTransfer(InventoryId),

    /// A slot was declared with zero capacity.
    #[error("slot {0} must have a capacity of at least 1")]
    ZeroCapacity(SlotId),

    /// A duplicate slot was inserted.
    #[error("duplicate slot id: {0}")]
    DuplicateSlot(SlotId),

    /// A duplicate inventory was inserted.
    #[error("duplicate inventory id: {0}")]
    DuplicateInventory(InventoryId),

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in pool calculation")]
    ArithmeticOverflow,
}
