//! The ledger: an append-only log of committed transactions.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Exactly once**: a transaction id is recorded at most once; a second
//!   attempt is rejected with [`LedgerError::AlreadyRecorded`].
//! - **Ordered**: entries appear in commit order, which within a tick is the
//!   agent processing order.
//! - **Bounded**: with a retention limit, the oldest entries are dropped once
//!   the history reaches twice the limit. Exactly-once is then enforced over
//!   the retained history.

use std::collections::BTreeSet;

use tracing::debug;

use colony_types::{AgentId, InventoryId, Item, LedgerEntryType, SlotId, TransactionId};

use crate::audit::{self, AuditResult};
use crate::{EntryBuilder, LedgerEntry, LedgerError};

/// Parameters for recording a committed goods transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferRecord {
    /// The tick number.
    pub tick: u64,
    /// The committed transaction.
    pub transaction_id: TransactionId,
    /// The agent that issued it.
    pub agent_id: AgentId,
    /// The good that moved.
    pub item: Item,
    /// Source inventory.
    pub from: InventoryId,
    /// Destination inventory.
    pub to: InventoryId,
    /// Units actually moved.
    pub moved: u32,
}

/// The ledger of all committed pool changes in a simulation run.
#[derive(Debug, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
    /// Transactions already recorded.
    recorded: BTreeSet<TransactionId>,
    /// Entries before this offset have been audited.
    audited: usize,
    /// Entries kept after pruning, if history is bounded.
    retention: Option<usize>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            recorded: BTreeSet::new(),
            audited: 0,
            retention: None,
        }
    }

    /// Create an empty ledger that keeps at most about `limit` entries.
    ///
    /// A limit of zero is treated as one.
    pub const fn with_retention(limit: usize) -> Self {
        let mut ledger = Self::new();
        ledger.retention = Some(if limit == 0 { 1 } else { limit });
        ledger
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in commit order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entries written during the given tick.
    pub fn entries_for_tick(&self, tick: u64) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.tick == tick)
    }

    /// The entry produced by a transaction, if it committed.
    pub fn entry_for(&self, transaction_id: TransactionId) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.transaction_id == transaction_id)
    }

    /// Whether a transaction has been recorded.
    pub fn contains(&self, transaction_id: TransactionId) -> bool {
        self.recorded.contains(&transaction_id)
    }

    /// Validate and append a built entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyRecorded`] if the transaction already has
    /// an entry, or any builder validation error.
    pub fn record(&mut self, builder: EntryBuilder) -> Result<&LedgerEntry, LedgerError> {
        let entry = builder.build()?;
        if !self.recorded.insert(entry.transaction_id) {
            return Err(LedgerError::AlreadyRecorded(entry.transaction_id));
        }
        debug!(
            tick = entry.tick,
            entry_type = ?entry.entry_type,
            transaction = %entry.transaction_id,
            agent = %entry.agent_id,
            quantity = entry.quantity,
            "ledger entry recorded"
        );
        self.entries.push(entry);
        self.entries.last().ok_or(LedgerError::InternalError(
            "failed to retrieve entry after append",
        ))
    }

    /// Record a granted slot claim.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_claim(
        &mut self,
        tick: u64,
        transaction_id: TransactionId,
        agent_id: AgentId,
        slot: SlotId,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.record(
            EntryBuilder::new(tick, LedgerEntryType::Claim, transaction_id, agent_id).slot(slot),
        )
    }

    /// Record a released slot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_release(
        &mut self,
        tick: u64,
        transaction_id: TransactionId,
        agent_id: AgentId,
        slot: SlotId,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.record(
            EntryBuilder::new(tick, LedgerEntryType::Release, transaction_id, agent_id)
                .slot(slot),
        )
    }

    /// Record a committed goods transfer.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_transfer(&mut self, record: TransferRecord) -> Result<&LedgerEntry, LedgerError> {
        self.record(
            EntryBuilder::new(
                record.tick,
                LedgerEntryType::Transfer,
                record.transaction_id,
                record.agent_id,
            )
            .goods(record.item, record.from, record.to)
            .quantity(record.moved),
        )
    }

    /// Audit the entries appended since the last audit, then prune history
    /// past the retention limit.
    ///
    /// Each entry is audited once, so the cost follows the entries written
    /// since the previous call rather than the whole history.
    pub fn audit_pending(&mut self, tick: u64) -> AuditResult {
        let pending = self.entries.get(self.audited..).unwrap_or_default();
        let result = audit::audit_batch(tick, pending);
        self.audited = self.entries.len();
        self.prune();
        result
    }

    fn prune(&mut self) {
        let Some(limit) = self.retention else {
            return;
        };
        if self.entries.len() < limit.saturating_mul(2) {
            return;
        }
        let excess = self.entries.len().saturating_sub(limit);
        for entry in self.entries.drain(..excess) {
            self.recorded.remove(&entry.transaction_id);
        }
        self.audited = self.audited.saturating_sub(excess);
        debug!(pruned = excess, retained = self.entries.len(), "ledger history pruned");
    }
}
