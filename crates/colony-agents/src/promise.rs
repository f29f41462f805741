//! The per-agent promise queue.
//!
//! An [`InventoryPromise`] is a FIFO of the transactions one agent has
//! issued but the pool has not yet resolved. Only the head is ever
//! processed. Every transaction leaves the queue exactly once, in exactly
//! one final state, and a copy of it is kept in the resolved log until the
//! owner drains it with [`InventoryPromise::take_resolved`].
//!
//! The queue has a lifecycle: it is unusable until [`initialize`] and after
//! [`dispose`]. Any queue operation outside that window returns
//! [`AgentError::PromiseUninitialized`].
//!
//! [`initialize`]: InventoryPromise::initialize
//! [`dispose`]: InventoryPromise::dispose

use std::collections::VecDeque;

use colony_types::{AgentId, TransactionId, TransactionKind, TransactionState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;
use crate::transaction::InventoryTransaction;

/// FIFO of pending transactions owned by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPromise {
    owner: AgentId,
    queue: Option<VecDeque<InventoryTransaction>>,
    #[serde(skip)]
    resolved: Vec<InventoryTransaction>,
}

impl InventoryPromise {
    /// Create an uninitialized promise for `owner`.
    pub const fn new(owner: AgentId) -> Self {
        Self {
            owner,
            queue: None,
            resolved: Vec::new(),
        }
    }

    /// The owning agent.
    pub const fn owner(&self) -> AgentId {
        self.owner
    }

    /// Make the queue usable. Idempotent.
    pub fn initialize(&mut self) {
        if self.queue.is_none() {
            self.queue = Some(VecDeque::new());
        }
    }

    /// Whether [`initialize`](Self::initialize) has run and the queue has not
    /// been disposed.
    pub const fn is_initialized(&self) -> bool {
        self.queue.is_some()
    }

    /// Cancel everything still pending and make the queue unusable.
    ///
    /// Disposing an uninitialized queue does nothing.
    pub fn dispose(&mut self) {
        if let Some(queue) = self.queue.take() {
            for txn in queue {
                self.finish(txn, TransactionState::Cancelled);
            }
        }
    }

    fn queue(&self) -> Result<&VecDeque<InventoryTransaction>, AgentError> {
        self.queue
            .as_ref()
            .ok_or(AgentError::PromiseUninitialized(self.owner))
    }

    fn queue_mut(&mut self) -> Result<&mut VecDeque<InventoryTransaction>, AgentError> {
        self.queue
            .as_mut()
            .ok_or(AgentError::PromiseUninitialized(self.owner))
    }

    /// Append a transaction to the tail.
    ///
    /// # Errors
    ///
    /// - [`AgentError::PromiseUninitialized`] before initialization.
    /// - [`AgentError::ForeignTransaction`] if another agent issued it.
    /// - [`AgentError::TransactionNotPending`] if it is already resolved.
    pub fn push(&mut self, txn: InventoryTransaction) -> Result<TransactionId, AgentError> {
        let owner = self.owner;
        let queue = self.queue_mut()?;
        if txn.agent() != owner {
            return Err(AgentError::ForeignTransaction {
                owner,
                issuer: txn.agent(),
            });
        }
        if !txn.is_pending() {
            return Err(AgentError::TransactionNotPending(txn.id()));
        }
        let id = txn.id();
        debug!(
            agent = %owner,
            transaction = %id,
            kind = ?txn.kind(),
            depth = queue.len(),
            "transaction queued"
        );
        queue.push_back(txn);
        Ok(id)
    }

    /// The oldest pending transaction, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromiseUninitialized`] before initialization.
    pub fn peek(&self) -> Result<Option<&InventoryTransaction>, AgentError> {
        Ok(self.queue()?.front())
    }

    /// Kind of the head transaction.
    ///
    /// Returns `None` for an empty or uninitialized queue. Guards use this to
    /// decide whether a processing state has work; the uninitialized case is
    /// reported by [`peek`](Self::peek) once the state runs.
    pub fn head_kind(&self) -> Option<TransactionKind> {
        self.queue
            .as_ref()
            .and_then(VecDeque::front)
            .map(InventoryTransaction::kind)
    }

    /// Number of pending transactions.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromiseUninitialized`] before initialization.
    pub fn len(&self) -> Result<usize, AgentError> {
        Ok(self.queue()?.len())
    }

    /// Whether nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromiseUninitialized`] before initialization.
    pub fn is_empty(&self) -> Result<bool, AgentError> {
        Ok(self.queue()?.is_empty())
    }

    /// Whether any pending transaction has the given kind.
    pub fn has_pending(&self, kind: TransactionKind) -> bool {
        self.queue
            .as_ref()
            .is_some_and(|q| q.iter().any(|t| t.kind() == kind))
    }

    /// Pop the head as [`TransactionState::Committed`].
    ///
    /// `moved` records the amount actually transferred for transfers.
    /// Returns `None` when the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromiseUninitialized`] before initialization.
    pub fn commit_head(
        &mut self,
        moved: Option<u32>,
    ) -> Result<Option<InventoryTransaction>, AgentError> {
        let Some(mut txn) = self.queue_mut()?.pop_front() else {
            return Ok(None);
        };
        if let Some(amount) = moved {
            txn.record_moved(amount);
        }
        Ok(Some(self.finish(txn, TransactionState::Committed)))
    }

    /// Pop the head as [`TransactionState::TimedOut`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromiseUninitialized`] before initialization.
    pub fn abandon_head(&mut self) -> Result<Option<InventoryTransaction>, AgentError> {
        self.pop_head(TransactionState::TimedOut)
    }

    /// Pop the head as [`TransactionState::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromiseUninitialized`] before initialization.
    pub fn cancel_head(&mut self) -> Result<Option<InventoryTransaction>, AgentError> {
        self.pop_head(TransactionState::Cancelled)
    }

    /// Cancel every pending transaction, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromiseUninitialized`] before initialization.
    pub fn cancel_all(&mut self) -> Result<Vec<InventoryTransaction>, AgentError> {
        let drained: Vec<InventoryTransaction> = self.queue_mut()?.drain(..).collect();
        Ok(drained
            .into_iter()
            .map(|txn| self.finish(txn, TransactionState::Cancelled))
            .collect())
    }

    /// Drain the log of transactions resolved since the last call.
    pub fn take_resolved(&mut self) -> Vec<InventoryTransaction> {
        core::mem::take(&mut self.resolved)
    }

    fn pop_head(
        &mut self,
        state: TransactionState,
    ) -> Result<Option<InventoryTransaction>, AgentError> {
        let popped = self.queue_mut()?.pop_front();
        Ok(popped.map(|txn| self.finish(txn, state)))
    }

    fn finish(
        &mut self,
        mut txn: InventoryTransaction,
        state: TransactionState,
    ) -> InventoryTransaction {
        txn.resolve(state);
        debug!(
            agent = %self.owner,
            transaction = %txn.id(),
            kind = ?txn.kind(),
            state = ?state,
            "transaction resolved"
        );
        self.resolved.push(txn.clone());
        txn
    }
}
