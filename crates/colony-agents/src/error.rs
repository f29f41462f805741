//! Error types for the colony-agents crate.
//!
//! Only setup and ordering bugs are errors here. An unavailable resource is
//! a normal outcome of the protocol and never surfaces as an [`AgentError`].

use colony_types::{AgentId, TransactionId};

/// Errors that can occur during agent and promise operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The agent's promise queue was used before initialization or after
    /// disposal.
    #[error("promise queue of agent {0} used while uninitialized")]
    PromiseUninitialized(AgentId),

    /// A transaction issued by one agent was pushed onto another's queue.
    #[error("transaction issued by {issuer} pushed onto the queue of {owner}")]
    ForeignTransaction {
        /// Owner of the queue.
        owner: AgentId,
        /// Agent named on the transaction.
        issuer: AgentId,
    },

    /// A transaction that already reached a final state was pushed.
    #[error("transaction {0} is no longer pending")]
    TransactionNotPending(TransactionId),

    /// Agent with the given ID was not found.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Agent name already exists in the roster.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),
}
