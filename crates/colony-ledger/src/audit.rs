//! Per-tick ledger audits.
//!
//! The exactly-once audit walks the entries of a single tick, or a batch of
//! newly appended entries, and flags any transaction recorded more than once. [`Ledger::record`] already refuses
//! duplicates, so for a ledger built through its API the audit passes by
//! construction; entries appended from a reloaded log are checked the same
//! way.
//!
//! [`Ledger::record`]: crate::Ledger::record

use std::collections::BTreeMap;

use colony_types::{Item, LedgerEntryType, TransactionId};
use tracing::warn;

use crate::{LedgerAnomaly, LedgerEntry};

/// The result of auditing a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// Every transaction in the tick was recorded once.
    Clean,
    /// One or more transactions were recorded more than once.
    Anomaly(LedgerAnomaly),
}

/// Check that no transaction appears more than once among the tick's entries.
pub fn audit_exactly_once(tick: u64, entries: &[LedgerEntry]) -> AuditResult {
    check(tick, entries.iter().filter(|e| e.tick == tick))
}

/// Check a batch of freshly appended entries, reported against `tick`.
///
/// The batch may span several ticks when an earlier audit was skipped.
pub fn audit_batch(tick: u64, entries: &[LedgerEntry]) -> AuditResult {
    check(tick, entries.iter())
}

fn check<'a>(tick: u64, entries: impl Iterator<Item = &'a LedgerEntry>) -> AuditResult {
    let mut counts: BTreeMap<TransactionId, usize> = BTreeMap::new();
    for entry in entries {
        let count = counts.entry(entry.transaction_id).or_insert(0);
        *count = count.saturating_add(1);
    }

    let duplicates: Vec<(TransactionId, usize)> =
        counts.into_iter().filter(|(_, count)| *count > 1).collect();

    if duplicates.is_empty() {
        return AuditResult::Clean;
    }

    let message = format!(
        "tick {tick}: {} transaction(s) recorded more than once",
        duplicates.len()
    );
    warn!(tick, duplicates = duplicates.len(), "ledger anomaly detected");
    AuditResult::Anomaly(LedgerAnomaly {
        tick,
        duplicates,
        message,
    })
}

/// Sum the goods moved per item during a tick.
pub fn transfer_totals(tick: u64, entries: &[LedgerEntry]) -> BTreeMap<Item, u32> {
    let mut totals = BTreeMap::new();
    for entry in entries
        .iter()
        .filter(|e| e.tick == tick && e.entry_type == LedgerEntryType::Transfer)
    {
        if let Some(item) = entry.item {
            let total: &mut u32 = totals.entry(item).or_insert(0);
            *total = total.saturating_add(entry.quantity);
        }
    }
    totals
}
