//! Shared type definitions for the Colony agent simulation.
//!
//! This crate is the single source of truth for the identifiers and
//! enumerations used across the Colony workspace. It has no behavior of its
//! own; the pool, agent, and state-machine crates build on these types.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (items, slot kinds, needs, transaction
//!   taxonomy, ledger entry types)

pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{Item, LedgerEntryType, Need, SlotKind, TransactionKind, TransactionState};
pub use ids::{AgentId, InventoryId, LedgerEntryId, SlotId, TransactionId};
