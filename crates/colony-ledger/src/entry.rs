//! Ledger entries and the validating entry builder.
//!
//! Provides an [`EntryBuilder`] that enforces the field contract of each
//! [`LedgerEntryType`]: slot entries name a slot and nothing else, transfer
//! entries name an item, a source, a destination, and a non-zero quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use colony_types::{
    AgentId, InventoryId, Item, LedgerEntryId, LedgerEntryType, SlotId, TransactionId,
};

use crate::LedgerError;

/// A single committed change to the shared resource pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry id.
    pub id: LedgerEntryId,
    /// Tick in which the transaction committed.
    pub tick: u64,
    /// What kind of change this was.
    pub entry_type: LedgerEntryType,
    /// The transaction that produced the change.
    pub transaction_id: TransactionId,
    /// The agent that issued the transaction.
    pub agent_id: AgentId,
    /// The claimed or released slot (slot entries only).
    pub slot: Option<SlotId>,
    /// The good that moved (transfer entries only).
    pub item: Option<Item>,
    /// Source inventory (transfer entries only).
    pub from: Option<InventoryId>,
    /// Destination inventory (transfer entries only).
    pub to: Option<InventoryId>,
    /// Units moved. Always 1 for slot entries.
    pub quantity: u32,
    /// Wall-clock time the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// # Examples
///
/// ```
/// use colony_ledger::EntryBuilder;
/// use colony_types::{AgentId, InventoryId, Item, LedgerEntryType, TransactionId};
///
/// let entry = EntryBuilder::new(3, LedgerEntryType::Transfer, TransactionId::new(), AgentId::new())
///     .goods(Item::Wood, InventoryId::new(), InventoryId::new())
///     .quantity(4)
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct EntryBuilder {
    tick: u64,
    entry_type: LedgerEntryType,
    transaction_id: TransactionId,
    agent_id: AgentId,
    slot: Option<SlotId>,
    item: Option<Item>,
    from: Option<InventoryId>,
    to: Option<InventoryId>,
    quantity: Option<u32>,
}

impl EntryBuilder {
    /// Start building an entry for the given tick, type, transaction, and agent.
    pub const fn new(
        tick: u64,
        entry_type: LedgerEntryType,
        transaction_id: TransactionId,
        agent_id: AgentId,
    ) -> Self {
        Self {
            tick,
            entry_type,
            transaction_id,
            agent_id,
            slot: None,
            item: None,
            from: None,
            to: None,
            quantity: None,
        }
    }

    /// Set the slot for claim and release entries.
    #[must_use]
    pub const fn slot(mut self, slot: SlotId) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Set the item and both inventories for transfer entries.
    #[must_use]
    pub const fn goods(mut self, item: Item, from: InventoryId, to: InventoryId) -> Self {
        self.item = Some(item);
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Set the moved quantity for transfer entries.
    #[must_use]
    pub const fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] or [`LedgerError::UnexpectedField`]
    /// if the fields do not match the entry type, [`LedgerError::ZeroQuantity`]
    /// for an empty transfer, and [`LedgerError::SelfTransfer`] when source and
    /// destination coincide.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let entry_type = self.entry_type;
        let quantity = match entry_type {
            LedgerEntryType::Claim | LedgerEntryType::Release => {
                if self.slot.is_none() {
                    return Err(LedgerError::MissingField {
                        entry_type,
                        field: "slot",
                    });
                }
                if self.item.is_some() {
                    return Err(LedgerError::UnexpectedField {
                        entry_type,
                        field: "item",
                    });
                }
                1
            }
            LedgerEntryType::Transfer => {
                if self.slot.is_some() {
                    return Err(LedgerError::UnexpectedField {
                        entry_type,
                        field: "slot",
                    });
                }
                let (Some(from), Some(to)) = (self.from, self.to) else {
                    return Err(LedgerError::MissingField {
                        entry_type,
                        field: "goods",
                    });
                };
                if from == to {
                    return Err(LedgerError::SelfTransfer);
                }
                let quantity = self.quantity.ok_or(LedgerError::MissingField {
                    entry_type,
                    field: "quantity",
                })?;
                if quantity == 0 {
                    return Err(LedgerError::ZeroQuantity);
                }
                quantity
            }
        };

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            tick: self.tick,
            entry_type,
            transaction_id: self.transaction_id,
            agent_id: self.agent_id,
            slot: self.slot,
            item: self.item,
            from: self.from,
            to: self.to,
            quantity,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(entry_type: LedgerEntryType) -> EntryBuilder {
        EntryBuilder::new(1, entry_type, TransactionId::new(), AgentId::new())
    }

    #[test]
    fn claim_entry_has_unit_quantity() {
        let entry = builder(LedgerEntryType::Claim).slot(SlotId::new()).build();
        assert!(entry.is_ok());
        if let Ok(e) = entry {
            assert_eq!(e.quantity, 1);
            assert_eq!(e.item, None);
        }
    }

    #[test]
    fn claim_without_slot_rejected() {
        let result = builder(LedgerEntryType::Claim).build();
        assert!(matches!(
            result.err(),
            Some(LedgerError::MissingField { field: "slot", .. })
        ));
    }

    #[test]
    fn release_with_goods_rejected() {
        let result = builder(LedgerEntryType::Release)
            .slot(SlotId::new())
            .goods(Item::Food, InventoryId::new(), InventoryId::new())
            .build();
        assert!(matches!(
            result.err(),
            Some(LedgerError::UnexpectedField { field: "item", .. })
        ));
    }

    #[test]
    fn transfer_requires_quantity() {
        let result = builder(LedgerEntryType::Transfer)
            .goods(Item::Stone, InventoryId::new(), InventoryId::new())
            .build();
        assert!(matches!(
            result.err(),
            Some(LedgerError::MissingField {
                field: "quantity",
                ..
            })
        ));
    }

    #[test]
    fn zero_transfer_rejected() {
        let result = builder(LedgerEntryType::Transfer)
            .goods(Item::Stone, InventoryId::new(), InventoryId::new())
            .quantity(0)
            .build();
        assert!(matches!(result.err(), Some(LedgerError::ZeroQuantity)));
    }

    #[test]
    fn self_transfer_rejected() {
        let inv = InventoryId::new();
        let result = builder(LedgerEntryType::Transfer)
            .goods(Item::Water, inv, inv)
            .quantity(2)
            .build();
        assert!(matches!(result.err(), Some(LedgerError::SelfTransfer)));
    }

    #[test]
    fn transfer_with_slot_rejected() {
        let result = builder(LedgerEntryType::Transfer)
            .slot(SlotId::new())
            .goods(Item::Water, InventoryId::new(), InventoryId::new())
            .quantity(2)
            .build();
        assert!(matches!(
            result.err(),
            Some(LedgerError::UnexpectedField { field: "slot", .. })
        ));
    }
}
