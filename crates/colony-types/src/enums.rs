//! Enumeration types for the Colony simulation.
//!
//! Goods, claimable slot kinds, agent needs, the inventory transaction
//! taxonomy, and the ledger entry types produced when a transaction commits.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Goods
// ---------------------------------------------------------------------------

/// A fungible good held in inventories and moved by `Transfer` transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Item {
    /// Lumber for building and fuel.
    Wood,
    /// Quarried stone.
    Stone,
    /// Edible rations.
    Food,
    /// Drinking water.
    Water,
    /// Woven cloth.
    Cloth,
    /// Hand tools.
    Tool,
}

// ---------------------------------------------------------------------------
// Claimable slots
// ---------------------------------------------------------------------------

/// The kind of a claimable slot.
///
/// A slot is an exclusive (or capacity-limited) reservation point inside a
/// building: a bed, a job post, a seat at a table. An agent records at most
/// one claimed slot per kind on its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// A place to sleep.
    Bed,
    /// A workplace post.
    Job,
    /// A seat for eating or leisure.
    Seat,
}

/// An agent need that slots can satisfy with a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Need {
    /// Sleep and recovery.
    Rest,
    /// Food.
    Hunger,
    /// Work and income.
    Work,
    /// Leisure and company.
    Social,
}

// ---------------------------------------------------------------------------
// Transaction taxonomy
// ---------------------------------------------------------------------------

/// The operation an inventory transaction performs against the shared pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Reserve a slot for the requesting agent.
    Claim,
    /// Move a quantity of a fungible item between two inventories.
    Transfer,
    /// Release a slot the agent previously claimed.
    Return,
}

/// Lifecycle of an inventory transaction.
///
/// `Requested` is the only non-terminal state. The queue owning the
/// transaction is the only writer of this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// Issued and waiting to be satisfied by the pool.
    Requested,
    /// Applied to the pool: the claim was granted, the goods moved, or the
    /// slot was released.
    Committed,
    /// Abandoned after exhausting its retries.
    TimedOut,
    /// Discarded before it could commit (reset, despawn, nothing to return).
    Cancelled,
}

impl TransactionState {
    /// Whether the transaction has reached a final state.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Requested)
    }
}

// ---------------------------------------------------------------------------
// Ledger entry types
// ---------------------------------------------------------------------------

/// The category of a committed ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LedgerEntryType {
    /// A slot was reserved by an agent.
    Claim,
    /// A slot was released by its claimant.
    Release,
    /// Goods moved between two inventories.
    Transfer,
}

impl From<TransactionKind> for LedgerEntryType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Claim => Self::Claim,
            TransactionKind::Transfer => Self::Transfer,
            TransactionKind::Return => Self::Release,
        }
    }
}
