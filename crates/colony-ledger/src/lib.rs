//! Append-only ledger of committed inventory transactions.
//!
//! Every transaction that commits against the shared resource pool produces
//! exactly one [`LedgerEntry`]. The ledger is the change feed a presentation
//! layer observes: claimed slots, released slots, and moved goods appear here
//! once and only once, in commit order.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: append-only log with recording methods.
//! - [`entry`] -- [`LedgerEntry`] and the validating [`EntryBuilder`].
//! - [`audit`] -- Exactly-once verification of new entries and transfer totals.
//!
//! Entry types and their required fields:
//!
//! | Type | Slot | Item | From | To |
//! |------|------|------|------|----|
//! | Claim | yes | no | no | no |
//! | Release | yes | no | no | no |
//! | Transfer | no | yes | yes | yes |
//!
//! # Usage
//!
//! ```
//! use colony_ledger::{AuditResult, Ledger};
//! use colony_types::{AgentId, SlotId, TransactionId};
//!
//! let mut ledger = Ledger::new();
//! ledger
//!     .record_claim(1, TransactionId::new(), AgentId::new(), SlotId::new())
//!     .ok();
//!
//! assert_eq!(ledger.len(), 1);
//! assert_eq!(ledger.audit_pending(1), AuditResult::Clean);
//! ```

pub mod audit;
pub mod entry;
pub mod ledger;

// Re-export primary types at crate root.
pub use audit::AuditResult;
pub use entry::{EntryBuilder, LedgerEntry};
pub use ledger::{Ledger, TransferRecord};

use colony_types::{LedgerEntryType, TransactionId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Transfers must move a strictly positive quantity.
    #[error("ledger transfer quantity must be non-zero")]
    ZeroQuantity,

    /// A required field was not set on the builder.
    #[error("missing required field for {entry_type:?}: {field}")]
    MissingField {
        /// The entry type being built.
        entry_type: LedgerEntryType,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A field was set that the entry type does not carry.
    #[error("unexpected field for {entry_type:?}: {field}")]
    UnexpectedField {
        /// The entry type being built.
        entry_type: LedgerEntryType,
        /// Name of the stray field.
        field: &'static str,
    },

    /// A transfer named the same inventory as source and destination.
    #[error("transfer source and destination are the same inventory")]
    SelfTransfer,

    /// The transaction already has an entry in the ledger.
    #[error("transaction {0} already recorded")]
    AlreadyRecorded(TransactionId),

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// An integrity violation detected while auditing a tick.
///
/// Raised when a transaction id appears more than once among the entries of
/// a tick, which would mean a change notification fired twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// Transactions recorded more than once, with their entry counts.
    pub duplicates: Vec<(TransactionId, usize)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
