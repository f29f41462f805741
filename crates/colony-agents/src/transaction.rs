//! Inventory transaction records.
//!
//! An [`InventoryTransaction`] describes one resource operation an agent
//! wants performed against the shared pool. Everything about it is fixed at
//! construction except its lifecycle state and, for transfers, the amount
//! that actually moved. Only [`InventoryPromise`] writes those two fields.
//!
//! [`InventoryPromise`]: crate::InventoryPromise

use colony_types::{
    AgentId, InventoryId, Item, SlotId, TransactionId, TransactionKind, TransactionState,
};
use serde::{Deserialize, Serialize};

/// What a transaction acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionTarget {
    /// A claimable slot (claims and returns).
    Slot(SlotId),
    /// A quantity of goods moving between inventories (transfers).
    Goods {
        /// The good to move.
        item: Item,
        /// Source inventory.
        from: InventoryId,
        /// Destination inventory.
        to: InventoryId,
    },
}

/// One requested resource operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    id: TransactionId,
    kind: TransactionKind,
    state: TransactionState,
    target: TransactionTarget,
    agent: AgentId,
    quantity: Option<u32>,
    moved: Option<u32>,
    issued_at: u64,
}

impl InventoryTransaction {
    fn new(
        kind: TransactionKind,
        target: TransactionTarget,
        agent: AgentId,
        quantity: Option<u32>,
        issued_at: u64,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            state: TransactionState::Requested,
            target,
            agent,
            quantity,
            moved: None,
            issued_at,
        }
    }

    /// Request exclusive use of a slot.
    pub fn claim(agent: AgentId, slot: SlotId, issued_at: u64) -> Self {
        Self::new(
            TransactionKind::Claim,
            TransactionTarget::Slot(slot),
            agent,
            None,
            issued_at,
        )
    }

    /// Request release of a previously claimed slot.
    pub fn release(agent: AgentId, slot: SlotId, issued_at: u64) -> Self {
        Self::new(
            TransactionKind::Return,
            TransactionTarget::Slot(slot),
            agent,
            None,
            issued_at,
        )
    }

    /// Request a move of up to `quantity` units of `item` from `from` to `to`.
    pub fn transfer(
        agent: AgentId,
        item: Item,
        from: InventoryId,
        to: InventoryId,
        quantity: u32,
        issued_at: u64,
    ) -> Self {
        Self::new(
            TransactionKind::Transfer,
            TransactionTarget::Goods { item, from, to },
            agent,
            Some(quantity),
            issued_at,
        )
    }

    /// Transaction id.
    pub const fn id(&self) -> TransactionId {
        self.id
    }

    /// The operation kind.
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// What the transaction acts on.
    pub const fn target(&self) -> TransactionTarget {
        self.target
    }

    /// The slot targeted by a claim or return.
    pub const fn slot(&self) -> Option<SlotId> {
        match self.target {
            TransactionTarget::Slot(slot) => Some(slot),
            TransactionTarget::Goods { .. } => None,
        }
    }

    /// The requesting agent.
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// Requested quantity (transfers only).
    pub const fn quantity(&self) -> Option<u32> {
        self.quantity
    }

    /// Units actually moved, set when a transfer commits.
    pub const fn moved(&self) -> Option<u32> {
        self.moved
    }

    /// Tick on which the transaction was issued.
    pub const fn issued_at(&self) -> u64 {
        self.issued_at
    }

    /// Whether the transaction is still waiting for the pool.
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, TransactionState::Requested)
    }

    pub(crate) const fn resolve(&mut self, state: TransactionState) {
        self.state = state;
    }

    pub(crate) const fn record_moved(&mut self, moved: u32) {
        self.moved = Some(moved);
    }
}
