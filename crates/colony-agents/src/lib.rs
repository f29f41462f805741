//! Agent models, inventory transactions, and promise queues.
//!
//! This crate contains the per-agent side of the resource protocol --
//! everything an agent owns privately. The shared side (slots and
//! inventories) lives in `colony-world`; the state machines that drive the
//! protocol live in `colony-core`.
//!
//! # Modules
//!
//! - [`agent`] -- [`Agent`] (id, model, promise) and the [`AgentRoster`] factory
//! - [`model`] -- [`AgentModel`]: needs, claimed slot ids, personal inventory
//! - [`transaction`] -- [`InventoryTransaction`] records and their targets
//! - [`promise`] -- [`InventoryPromise`]: the per-agent FIFO of pending transactions
//! - [`error`] -- Error types for agent operations ([`AgentError`])

pub mod agent;
pub mod error;
pub mod model;
pub mod promise;
pub mod transaction;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentRoster};
pub use error::AgentError;
pub use model::AgentModel;
pub use promise::InventoryPromise;
pub use transaction::{InventoryTransaction, TransactionTarget};
