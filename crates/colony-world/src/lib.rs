//! Shared resource pool for the Colony simulation.
//!
//! The pool is the single source of truth for every contested resource in
//! the world. Agents never hold copies of pool state; they hold ids and go
//! through the check-and-set operations here to change anything.
//!
//! # Modules
//!
//! - [`slot`] -- Claimable slots with capacity, claimant list, and need qualities
//! - [`inventory`] -- Fungible inventories with carry capacity and checked arithmetic
//! - [`pool`] -- The [`ResourcePool`]: queries, claim/release, clamped transfer
//! - [`error`] -- Error types for pool operations

pub mod error;
pub mod inventory;
pub mod pool;
pub mod slot;

pub use error::WorldError;
pub use inventory::Inventory;
pub use pool::ResourcePool;
pub use slot::{ClaimOutcome, ReclaimPolicy, Slot};
