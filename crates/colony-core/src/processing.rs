//! The transaction-processing state.
//!
//! [`ProcessTransaction`] is a state parameterised by a [`TransactionKind`].
//! While current it works the head of its agent's promise queue against the
//! shared pool, one attempt per tick:
//!
//! - success commits the head, updates the agent model and the ledger, and
//!   leaves for the configured success target;
//! - a full slot or an empty source counts a failed attempt and the state
//!   stays current, so the next tick retries;
//! - once failures exceed `max_retries` the head is abandoned as timed out
//!   and the agent returns to its previous state;
//! - a request that can never succeed is cancelled, for example a claim on
//!   an unknown slot or on a second slot of a kind the agent already holds;
//! - an empty queue, or a head of another kind, also returns to the previous
//!   state.
//!
//! Other states enter a processing state with a guard built on
//! [`pending_head`].

use colony_agents::{InventoryTransaction, TransactionTarget};
use colony_ledger::TransferRecord;
use colony_types::{TransactionKind, TransactionState};
use colony_world::{ClaimOutcome, Slot, WorldError};
use tracing::{debug, info, warn};

use crate::error::TickError;
use crate::machine::{AgentContext, State, StateId, Target, Transition, Transitions};

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Whether the agent's queue head is a pending transaction of `kind`.
///
/// Returns `false` for an empty or uninitialized queue.
pub fn pending_head(ctx: &AgentContext<'_>, kind: TransactionKind) -> bool {
    ctx.agent.promise.head_kind() == Some(kind)
}

/// Lookup failures that only concern the request itself. Anything else,
/// use of an uninitialized inventory in particular, aborts the tick.
const fn is_bad_target(err: &WorldError) -> bool {
    matches!(
        err,
        WorldError::SlotNotFound(_) | WorldError::InventoryNotFound(_) | WorldError::SelfTransfer(_)
    )
}

/// Result of one attempt against the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Committed,
    Unavailable,
    Cancelled,
}

/// Works the head of the promise queue for one transaction kind.
#[derive(Debug, Clone)]
pub struct ProcessTransaction {
    id: StateId,
    kind: TransactionKind,
    success: Target,
    max_retries: u32,
    attempts: u32,
    committed: bool,
}

impl ProcessTransaction {
    /// A processing state for `kind` that leaves for `success` on commit.
    pub const fn new(id: StateId, kind: TransactionKind, success: Target) -> Self {
        Self {
            id,
            kind,
            success,
            max_retries: DEFAULT_MAX_RETRIES,
            attempts: 0,
            committed: false,
        }
    }

    /// Set how many times a failed attempt is retried before timing out.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The kind of transaction this state processes.
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Failed attempts on the current head.
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Retries allowed after the first failure.
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    const fn timed_out(&self) -> bool {
        self.attempts > self.max_retries
    }

    fn attempt(
        ctx: &mut AgentContext<'_>,
        head: &InventoryTransaction,
    ) -> Result<Attempt, TickError> {
        let agent = ctx.agent.id;
        let tick = ctx.sim.tick;
        match (head.kind(), head.target()) {
            (TransactionKind::Claim, TransactionTarget::Slot(slot)) => {
                let kind = ctx
                    .pool
                    .slot(slot)
                    .map(Slot::kind)
                    .ok_or(WorldError::SlotNotFound(slot))?;
                if let Some(held) = ctx.agent.model.claim(kind).filter(|held| *held != slot) {
                    ctx.agent.promise.cancel_head()?;
                    warn!(
                        agent = %agent,
                        slot = %slot,
                        held = %held,
                        ?kind,
                        "claim cancelled: a slot of this kind is already held"
                    );
                    return Ok(Attempt::Cancelled);
                }
                match ctx.pool.try_claim(slot, agent)? {
                    ClaimOutcome::Granted | ClaimOutcome::Refreshed => {}
                    ClaimOutcome::Full => return Ok(Attempt::Unavailable),
                    ClaimOutcome::AlreadyClaimed => {
                        ctx.agent.promise.cancel_head()?;
                        warn!(agent = %agent, slot = %slot, "claim cancelled: slot already held");
                        return Ok(Attempt::Cancelled);
                    }
                }
                ctx.agent.promise.commit_head(None)?;
                ctx.agent.model.set_claim(kind, slot);
                ctx.ledger.record_claim(tick, head.id(), agent, slot)?;
                info!(agent = %agent, slot = %slot, ?kind, tick, "slot claimed");
                Ok(Attempt::Committed)
            }
            (TransactionKind::Return, TransactionTarget::Slot(slot)) => {
                if !ctx.pool.release(slot, agent)? {
                    ctx.agent.promise.cancel_head()?;
                    warn!(agent = %agent, slot = %slot, "return cancelled: slot not held");
                    return Ok(Attempt::Cancelled);
                }
                ctx.agent.promise.commit_head(None)?;
                ctx.agent.model.clear_claim(slot);
                ctx.ledger.record_release(tick, head.id(), agent, slot)?;
                info!(agent = %agent, slot = %slot, tick, "slot released");
                Ok(Attempt::Committed)
            }
            (TransactionKind::Transfer, TransactionTarget::Goods { item, from, to }) => {
                let requested = head.quantity().unwrap_or(0);
                let moved = ctx.pool.transfer(from, to, item, requested)?;
                if moved == 0 {
                    return Ok(Attempt::Unavailable);
                }
                ctx.agent.promise.commit_head(Some(moved))?;
                ctx.ledger.record_transfer(TransferRecord {
                    tick,
                    transaction_id: head.id(),
                    agent_id: agent,
                    item,
                    from,
                    to,
                    moved,
                })?;
                info!(agent = %agent, ?item, requested, moved, tick, "goods transferred");
                Ok(Attempt::Committed)
            }
            (kind, target) => {
                ctx.agent.promise.cancel_head()?;
                warn!(agent = %agent, ?kind, ?target, "transaction target does not fit its kind");
                Ok(Attempt::Cancelled)
            }
        }
    }
}

impl State for ProcessTransaction {
    fn id(&self) -> StateId {
        self.id
    }

    fn on_initialize(&mut self, transitions: &mut Transitions<Self>) {
        let kind = self.kind;
        transitions
            .add(Transition::new(
                self.success,
                "committed",
                |state: &Self, _ctx: &AgentContext<'_>| state.committed,
            ))
            .add(
                Transition::to_previous("timed out", |state: &Self, _ctx: &AgentContext<'_>| {
                    state.timed_out()
                })
                .with_effect(|state: &mut Self, ctx: &mut AgentContext<'_>| {
                    if let Some(txn) = ctx.agent.promise.abandon_head()? {
                        warn!(
                            agent = %ctx.agent.id,
                            transaction = %txn.id(),
                            kind = ?txn.kind(),
                            attempts = state.attempts,
                            tick = ctx.sim.tick,
                            "transaction timed out"
                        );
                    }
                    Ok(())
                }),
            )
            .add(Transition::to_previous(
                "nothing pending",
                move |_state: &Self, ctx: &AgentContext<'_>| !pending_head(ctx, kind),
            ));
    }

    fn begin(&mut self, _ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.attempts = 0;
        self.committed = false;
        Ok(())
    }

    fn idle(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        let Some(head) = ctx.agent.promise.peek()? else {
            return Ok(());
        };
        if head.kind() != self.kind || head.state() != TransactionState::Requested {
            return Ok(());
        }
        let head = head.clone();
        let attempt = match Self::attempt(ctx, &head) {
            Err(TickError::World(err)) if is_bad_target(&err) => {
                ctx.agent.promise.cancel_head()?;
                warn!(
                    agent = %ctx.agent.id,
                    transaction = %head.id(),
                    kind = ?self.kind,
                    error = %err,
                    "transaction cancelled: bad request target"
                );
                Attempt::Cancelled
            }
            other => other?,
        };
        match attempt {
            Attempt::Committed => self.committed = true,
            Attempt::Cancelled => self.attempts = 0,
            Attempt::Unavailable => {
                self.attempts = self.attempts.saturating_add(1);
                debug!(
                    agent = %ctx.agent.id,
                    transaction = %head.id(),
                    kind = ?self.kind,
                    attempts = self.attempts,
                    max_retries = self.max_retries,
                    "resource unavailable"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use colony_agents::Agent;
    use colony_ledger::Ledger;
    use colony_types::{AgentId, InventoryId, Item, Need, SlotId, SlotKind};
    use colony_world::{Inventory, ResourcePool};

    use super::*;
    use crate::clock::SimClock;

    const CLAIMING: StateId = StateId::new("claiming");

    struct Fixture {
        agent: Agent,
        pool: ResourcePool,
        ledger: Ledger,
        clock: SimClock,
    }

    impl Fixture {
        fn new() -> Self {
            let mut pool = ResourcePool::new();
            let inventory = pool
                .insert_inventory(Inventory::initialized(InventoryId::new(), 10))
                .unwrap();
            let mut agent = Agent::new(String::from("Tamsin"), inventory);
            agent.promise.initialize();
            Self {
                agent,
                pool,
                ledger: Ledger::new(),
                clock: SimClock::new(),
            }
        }

        fn ctx(&mut self) -> AgentContext<'_> {
            let sim = self.clock.advance(Duration::from_millis(100)).unwrap();
            AgentContext::new(&mut self.agent, &mut self.pool, &mut self.ledger, sim)
        }

        fn bed(&mut self) -> SlotId {
            let slot = Slot::new(SlotId::new(), SlotKind::Bed, 1)
                .unwrap()
                .with_quality(Need::Rest, 2);
            self.pool.insert_slot(slot).unwrap()
        }
    }

    fn claiming() -> ProcessTransaction {
        ProcessTransaction::new(CLAIMING, TransactionKind::Claim, Target::Previous)
    }

    #[test]
    fn claim_commits_and_records_model_and_ledger() {
        let mut fx = Fixture::new();
        let bed = fx.bed();
        let mut state = claiming();
        let mut ctx = fx.ctx();
        ctx.request_claim(bed).unwrap();
        state.begin(&mut ctx).unwrap();
        state.idle(&mut ctx).unwrap();
        assert!(state.committed);
        assert_eq!(ctx.agent.model.claim(SlotKind::Bed), Some(bed));
        assert_eq!(ctx.pool.claimants(bed), &[ctx.agent.id]);
        assert_eq!(ctx.ledger.len(), 1);
        assert!(ctx.agent.promise.is_empty().unwrap());
    }

    #[test]
    fn full_slot_counts_failed_attempts() {
        let mut fx = Fixture::new();
        let bed = fx.bed();
        fx.pool.try_claim(bed, AgentId::new()).unwrap();
        let mut state = claiming();
        let mut ctx = fx.ctx();
        ctx.request_claim(bed).unwrap();
        state.begin(&mut ctx).unwrap();
        state.idle(&mut ctx).unwrap();
        assert_eq!(state.attempts(), 1);
        assert!(!state.timed_out());
        state.idle(&mut ctx).unwrap();
        assert_eq!(state.attempts(), 2);
        assert!(state.timed_out());
        assert_eq!(ctx.agent.promise.len().unwrap(), 1);
        assert!(ctx.ledger.is_empty());
    }

    #[test]
    fn begin_resets_locals() {
        let mut fx = Fixture::new();
        let mut state = claiming().with_max_retries(3);
        state.attempts = 2;
        state.committed = true;
        state.begin(&mut fx.ctx()).unwrap();
        assert_eq!(state.attempts(), 0);
        assert!(!state.committed);
        assert_eq!(state.max_retries(), 3);
    }

    #[test]
    fn return_of_unheld_slot_is_cancelled() {
        let mut fx = Fixture::new();
        let bed = fx.bed();
        let mut state = ProcessTransaction::new(
            StateId::new("returning"),
            TransactionKind::Return,
            Target::Previous,
        );
        let mut ctx = fx.ctx();
        ctx.request_release(bed).unwrap();
        state.idle(&mut ctx).unwrap();
        assert!(!state.committed);
        assert!(ctx.agent.promise.is_empty().unwrap());
        let resolved = ctx.agent.promise.take_resolved();
        assert_eq!(
            resolved.first().map(InventoryTransaction::state),
            Some(TransactionState::Cancelled)
        );
    }

    #[test]
    fn transfer_records_moved_amount() {
        let mut fx = Fixture::new();
        let mut stock = Inventory::initialized(InventoryId::new(), 50);
        stock.add(Item::Food, 3).unwrap();
        let stockpile = fx.pool.insert_inventory(stock).unwrap();
        let pocket = fx.agent.model.inventory;
        let mut state = ProcessTransaction::new(
            StateId::new("hauling"),
            TransactionKind::Transfer,
            Target::Previous,
        );
        let mut ctx = fx.ctx();
        ctx.request_transfer(Item::Food, stockpile, pocket, 5).unwrap();
        state.idle(&mut ctx).unwrap();
        assert!(state.committed);
        let resolved = ctx.agent.promise.take_resolved();
        assert_eq!(resolved.first().and_then(InventoryTransaction::moved), Some(3));
        assert_eq!(ctx.pool.quantity(pocket, Item::Food).unwrap(), 3);
        assert_eq!(ctx.ledger.entries().first().map(|e| e.quantity), Some(3));
    }

    #[test]
    fn other_kind_at_head_is_left_alone() {
        let mut fx = Fixture::new();
        let bed = fx.bed();
        let mut state = claiming();
        let mut ctx = fx.ctx();
        ctx.request_release(bed).unwrap();
        state.idle(&mut ctx).unwrap();
        assert_eq!(state.attempts(), 0);
        assert_eq!(ctx.agent.promise.len().unwrap(), 1);
        assert!(!pending_head(&ctx, TransactionKind::Claim));
        assert!(pending_head(&ctx, TransactionKind::Return));
    }

    #[test]
    fn second_slot_of_a_held_kind_is_cancelled() {
        let mut fx = Fixture::new();
        let first = fx.bed();
        let second = fx.bed();
        let mut state = claiming();
        let mut ctx = fx.ctx();
        ctx.request_claim(first).unwrap();
        ctx.request_claim(second).unwrap();
        state.idle(&mut ctx).unwrap();
        state.begin(&mut ctx).unwrap();
        state.idle(&mut ctx).unwrap();
        assert!(!state.committed);
        assert_eq!(state.attempts(), 0);
        assert_eq!(ctx.agent.model.claim(SlotKind::Bed), Some(first));
        assert!(ctx.pool.claimants(second).is_empty());
        assert_eq!(ctx.ledger.len(), 1);
        let states: Vec<_> = ctx
            .agent
            .promise
            .take_resolved()
            .iter()
            .map(InventoryTransaction::state)
            .collect();
        assert_eq!(
            states,
            vec![TransactionState::Committed, TransactionState::Cancelled]
        );
    }

    #[test]
    fn unknown_slot_is_cancelled_not_fatal() {
        let mut fx = Fixture::new();
        let mut state = claiming();
        let mut ctx = fx.ctx();
        ctx.request_claim(SlotId::new()).unwrap();
        state.idle(&mut ctx).unwrap();
        assert!(ctx.agent.promise.is_empty().unwrap());
        assert!(ctx.ledger.is_empty());
    }

    #[test]
    fn self_transfer_is_cancelled_not_fatal() {
        let mut fx = Fixture::new();
        let pocket = fx.agent.model.inventory;
        let mut state = ProcessTransaction::new(
            StateId::new("hauling"),
            TransactionKind::Transfer,
            Target::Previous,
        );
        let mut ctx = fx.ctx();
        ctx.request_transfer(Item::Wood, pocket, pocket, 1).unwrap();
        state.idle(&mut ctx).unwrap();
        assert!(!state.committed);
        let resolved = ctx.agent.promise.take_resolved();
        assert_eq!(
            resolved.first().map(InventoryTransaction::state),
            Some(TransactionState::Cancelled)
        );
    }

    #[test]
    fn uninitialized_inventory_still_aborts() {
        let mut fx = Fixture::new();
        let raw = fx
            .pool
            .insert_inventory(Inventory::new(InventoryId::new(), 5))
            .unwrap();
        let pocket = fx.agent.model.inventory;
        let mut state = ProcessTransaction::new(
            StateId::new("hauling"),
            TransactionKind::Transfer,
            Target::Previous,
        );
        let mut ctx = fx.ctx();
        ctx.request_transfer(Item::Wood, raw, pocket, 1).unwrap();
        let err = state.idle(&mut ctx).unwrap_err();
        assert!(matches!(err, TickError::World(WorldError::InventoryUninitialized(id)) if id == raw));
        assert_eq!(ctx.agent.promise.len().unwrap(), 1);
    }
}
