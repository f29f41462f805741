//! Shared behaviors and world setup for the protocol integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::time::Duration;

use colony_core::{
    AgentContext, Colony, ProcessTransaction, State, StateId, StateMachine, Target, TickError,
    Transition, Transitions, pending_head,
};
use colony_types::{AgentId, InventoryId, Item, Need, SlotId, SlotKind, TransactionKind};
use colony_world::{Inventory, ResourcePool, Slot};

pub const WANDER: StateId = StateId::new("wander");
pub const CLAIMING: StateId = StateId::new("claiming");
pub const SLEEPING: StateId = StateId::new("sleeping");
pub const RELEASING: StateId = StateId::new("releasing");
pub const HAULING: StateId = StateId::new("hauling");

pub const TICK: Duration = Duration::from_millis(100);

/// What a wandering agent goes after.
#[derive(Debug, Clone)]
pub enum Plan {
    /// Claim the best free bed whenever the agent holds none.
    Bed,
    /// Queue claims on these slots, in order, once.
    Slots(Vec<SlotId>),
    /// Queue one transfer from `from` into the agent's own inventory.
    Haul {
        item: Item,
        from: InventoryId,
        quantity: u32,
    },
    /// Do nothing.
    Idle,
}

/// Default state: issues requests according to its plan.
pub struct Wander {
    plan: Plan,
    issued: bool,
}

impl State for Wander {
    fn id(&self) -> StateId {
        WANDER
    }

    fn on_initialize(&mut self, transitions: &mut Transitions<Self>) {
        transitions
            .add(Transition::to(
                CLAIMING,
                "resume claim",
                |_state: &Self, ctx: &AgentContext<'_>| pending_head(ctx, TransactionKind::Claim),
            ))
            .add(Transition::to(
                HAULING,
                "resume haul",
                |_state: &Self, ctx: &AgentContext<'_>| {
                    pending_head(ctx, TransactionKind::Transfer)
                },
            ))
            .add(
                Transition::to(CLAIMING, "tired", |state: &Self, ctx: &AgentContext<'_>| {
                    matches!(state.plan, Plan::Bed)
                        && ctx.agent.model.claim(SlotKind::Bed).is_none()
                        && ctx.pool.find_available_slot(SlotKind::Bed, Need::Rest).is_some()
                })
                .with_effect(|_state: &mut Self, ctx: &mut AgentContext<'_>| {
                    if let Some(bed) = ctx.pool.find_available_slot(SlotKind::Bed, Need::Rest) {
                        ctx.request_claim(bed)?;
                    }
                    Ok(())
                }),
            )
            .add(
                Transition::to(CLAIMING, "claim list", |state: &Self, _ctx: &AgentContext<'_>| {
                    !state.issued && matches!(state.plan, Plan::Slots(_))
                })
                .with_effect(|state: &mut Self, ctx: &mut AgentContext<'_>| {
                    state.issued = true;
                    if let Plan::Slots(slots) = &state.plan {
                        for slot in slots {
                            ctx.request_claim(*slot)?;
                        }
                    }
                    Ok(())
                }),
            )
            .add(
                Transition::to(HAULING, "haul", |state: &Self, _ctx: &AgentContext<'_>| {
                    !state.issued && matches!(state.plan, Plan::Haul { .. })
                })
                .with_effect(|state: &mut Self, ctx: &mut AgentContext<'_>| {
                    state.issued = true;
                    if let Plan::Haul {
                        item,
                        from,
                        quantity,
                    } = state.plan
                    {
                        let pocket = ctx.agent.model.inventory;
                        ctx.request_transfer(item, from, pocket, quantity)?;
                    }
                    Ok(())
                }),
            );
    }
}

/// Holds the bed for a number of ticks (forever when `duration` is `None`),
/// then queues its release.
pub struct Sleeping {
    duration: Option<u32>,
    slept: u32,
}

impl State for Sleeping {
    fn id(&self) -> StateId {
        SLEEPING
    }

    fn on_initialize(&mut self, transitions: &mut Transitions<Self>) {
        transitions.add(
            Transition::to(RELEASING, "rested", |state: &Self, _ctx: &AgentContext<'_>| {
                state.duration.is_some_and(|d| state.slept >= d)
            })
            .with_effect(|_state: &mut Self, ctx: &mut AgentContext<'_>| {
                if let Some(bed) = ctx.agent.model.claim(SlotKind::Bed) {
                    ctx.request_release(bed)?;
                }
                Ok(())
            }),
        );
    }

    fn begin(&mut self, _ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.slept = 0;
        Ok(())
    }

    fn idle(&mut self, _ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        self.slept = self.slept.saturating_add(1);
        Ok(())
    }
}

/// A machine wired for `plan`.
pub fn machine(plan: Plan, sleep_for: Option<u32>, max_retries: u32) -> StateMachine {
    StateMachine::builder()
        .default_state(Wander {
            plan,
            issued: false,
        })
        .state(
            ProcessTransaction::new(CLAIMING, TransactionKind::Claim, Target::State(SLEEPING))
                .with_max_retries(max_retries),
        )
        .state(Sleeping {
            duration: sleep_for,
            slept: 0,
        })
        .state(
            ProcessTransaction::new(RELEASING, TransactionKind::Return, Target::State(WANDER))
                .with_max_retries(max_retries),
        )
        .state(
            ProcessTransaction::new(HAULING, TransactionKind::Transfer, Target::Previous)
                .with_max_retries(max_retries),
        )
        .build()
        .unwrap()
}

/// A two-state machine: wander, and a claim processor that returns to
/// wandering after each commit.
pub fn claim_loop(plan: Plan, max_retries: u32) -> StateMachine {
    StateMachine::builder()
        .default_state(Wander {
            plan,
            issued: false,
        })
        .state(
            ProcessTransaction::new(CLAIMING, TransactionKind::Claim, Target::Previous)
                .with_max_retries(max_retries),
        )
        .state(
            ProcessTransaction::new(HAULING, TransactionKind::Transfer, Target::Previous)
                .with_max_retries(max_retries),
        )
        .build()
        .unwrap()
}

/// Add `count` single-occupancy beds to `pool`.
pub fn add_beds(pool: &mut ResourcePool, count: usize) -> Vec<SlotId> {
    (0..count)
        .map(|_| {
            let bed = Slot::new(SlotId::new(), SlotKind::Bed, 1)
                .unwrap()
                .with_quality(Need::Rest, 5);
            pool.insert_slot(bed).unwrap()
        })
        .collect()
}

/// Add an initialized inventory holding `stock`.
pub fn add_stockpile(pool: &mut ResourcePool, capacity: u32, stock: &[(Item, u32)]) -> InventoryId {
    let mut inventory = Inventory::initialized(InventoryId::new(), capacity);
    for (item, qty) in stock {
        inventory.add(*item, *qty).unwrap();
    }
    pool.insert_inventory(inventory).unwrap()
}

/// Spawn an agent named `name` with a 10-unit pocket.
pub fn spawn(colony: &mut Colony, name: &str, machine: StateMachine) -> AgentId {
    colony.spawn_agent(name.to_owned(), 10, machine).unwrap()
}

/// Assert that no slot has more claimants than its capacity and that every
/// agent's recorded claims match the pool.
pub fn assert_pool_consistent(colony: &Colony) {
    for slot in colony.pool().slots() {
        let claimed = u32::try_from(slot.claimants().len()).unwrap();
        assert!(claimed <= slot.capacity(), "slot {} over capacity", slot.id());
    }
    for agent in colony.agents() {
        for (kind, slot) in agent.model.claims() {
            let held = colony.pool().slot(*slot).unwrap();
            assert_eq!(held.kind(), *kind);
            assert!(held.is_claimed_by(agent.id), "model claim not in pool");
        }
        for slot_id in colony.pool().claims_held_by(agent.id) {
            let kind = colony.pool().slot(slot_id).unwrap().kind();
            assert_eq!(agent.model.claim(kind), Some(slot_id), "pool claim not in model");
        }
    }
}
