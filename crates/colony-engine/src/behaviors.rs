//! Demonstration behaviors wired into every spawned agent.
//!
//! An agent wanders while its needs grow. When tired it claims a bed,
//! sleeps until rested, and gives the bed back. When restless it claims a
//! job post once and then hauls its favourite good between the stockpile and
//! its own pocket. Every contested step goes through a processing state, so
//! a full bed or an empty stockpile costs at most a couple of ticks before
//! the agent falls back to wandering.

use colony_agents::model::MAX_NEED;
use colony_core::{
    AgentContext, MachineError, ProcessTransaction, State, StateId, StateMachine, Target,
    TickError, Transition, Transitions,
};
use colony_types::{InventoryId, Item, Need, SlotKind, TransactionKind};

/// Default state.
pub const WANDER: StateId = StateId::new("wander");
/// Waiting for a bed claim.
pub const CLAIM_BED: StateId = StateId::new("claim bed");
/// Asleep in a held bed.
pub const SLEEP: StateId = StateId::new("sleep");
/// Waiting for the bed to be given back.
pub const RETURN_BED: StateId = StateId::new("return bed");
/// Waiting for a job post claim.
pub const CLAIM_JOB: StateId = StateId::new("claim job");
/// Waiting for goods to move.
pub const HAUL: StateId = StateId::new("haul");

/// Work need at which a wandering agent goes looking for something to do.
pub const RESTLESS_AT: u32 = 40;

/// Per-agent quirks rolled by the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperament {
    /// Rest need gained per tick awake.
    pub rest_growth: u32,
    /// Work need gained per tick awake.
    pub work_growth: u32,
    /// The good this agent hauls.
    pub favourite: Item,
}

/// Colony-wide behavior parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    /// Rest need recovered per tick asleep.
    pub rest_recovery: u32,
    /// Rest need at which an agent looks for a bed.
    pub tired_threshold: u32,
    /// Units requested per haul.
    pub haul_amount: u32,
    /// Retries for every processing state.
    pub max_retries: u32,
    /// The shared stockpile.
    pub stockpile: InventoryId,
}

struct Wander {
    temperament: Temperament,
    tuning: Tuning,
}

impl Wander {
    fn is_tired(&self, ctx: &AgentContext<'_>) -> bool {
        ctx.agent.model.need(Need::Rest) >= self.tuning.tired_threshold
    }

    fn is_restless(ctx: &AgentContext<'_>) -> bool {
        ctx.agent.model.need(Need::Work) >= RESTLESS_AT
    }

    /// Source and destination of the next haul: put carried goods back,
    /// otherwise fetch more.
    fn haul_route(&self, ctx: &AgentContext<'_>) -> Option<(InventoryId, InventoryId)> {
        let pocket = ctx.agent.model.inventory;
        let stockpile = self.tuning.stockpile;
        let item = self.temperament.favourite;
        if ctx.pool.quantity(pocket, item).unwrap_or(0) > 0 {
            (ctx.pool.remaining_capacity(stockpile).unwrap_or(0) > 0)
                .then_some((pocket, stockpile))
        } else {
            (ctx.pool.quantity(stockpile, item).unwrap_or(0) > 0).then_some((stockpile, pocket))
        }
    }
}

impl State for Wander {
    fn id(&self) -> StateId {
        WANDER
    }

    fn on_initialize(&mut self, transitions: &mut Transitions<Self>) {
        transitions
            .add(Transition::to(
                SLEEP,
                "back to bed",
                |state: &Self, ctx: &AgentContext<'_>| {
                    state.is_tired(ctx) && ctx.agent.model.claim(SlotKind::Bed).is_some()
                },
            ))
            .add(
                Transition::to(CLAIM_BED, "tired", |state: &Self, ctx: &AgentContext<'_>| {
                    state.is_tired(ctx)
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
                Transition::to(CLAIM_JOB, "seek work", |_state: &Self, ctx: &AgentContext<'_>| {
                    Self::is_restless(ctx)
                        && ctx.agent.model.claim(SlotKind::Job).is_none()
                        && ctx.pool.find_available_slot(SlotKind::Job, Need::Work).is_some()
                })
                .with_effect(|_state: &mut Self, ctx: &mut AgentContext<'_>| {
                    if let Some(post) = ctx.pool.find_available_slot(SlotKind::Job, Need::Work) {
                        ctx.request_claim(post)?;
                    }
                    Ok(())
                }),
            )
            .add(
                Transition::to(HAUL, "restless", |state: &Self, ctx: &AgentContext<'_>| {
                    Self::is_restless(ctx)
                        && ctx.agent.model.claim(SlotKind::Job).is_some()
                        && state.haul_route(ctx).is_some()
                })
                .with_effect(|state: &mut Self, ctx: &mut AgentContext<'_>| {
                    if let Some((from, to)) = state.haul_route(ctx) {
                        let item = state.temperament.favourite;
                        ctx.request_transfer(item, from, to, state.tuning.haul_amount)?;
                        ctx.agent.model.lower_need(Need::Work, MAX_NEED);
                    }
                    Ok(())
                }),
            );
    }

    fn idle(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        let model = &mut ctx.agent.model;
        model.raise_need(Need::Rest, self.temperament.rest_growth);
        model.raise_need(Need::Work, self.temperament.work_growth);
        Ok(())
    }
}

struct Sleep {
    recovery: u32,
}

impl State for Sleep {
    fn id(&self) -> StateId {
        SLEEP
    }

    fn on_initialize(&mut self, transitions: &mut Transitions<Self>) {
        transitions
            .add(Transition::to(
                WANDER,
                "no bed",
                |_state: &Self, ctx: &AgentContext<'_>| {
                    ctx.agent.model.claim(SlotKind::Bed).is_none()
                },
            ))
            .add(
                Transition::to(RETURN_BED, "rested", |_state: &Self, ctx: &AgentContext<'_>| {
                    ctx.agent.model.need(Need::Rest) == 0
                })
                .with_effect(|_state: &mut Self, ctx: &mut AgentContext<'_>| {
                    if let Some(bed) = ctx.agent.model.claim(SlotKind::Bed) {
                        ctx.request_release(bed)?;
                    }
                    Ok(())
                }),
            );
    }

    fn idle(&mut self, ctx: &mut AgentContext<'_>) -> Result<(), TickError> {
        ctx.agent.model.lower_need(Need::Rest, self.recovery);
        Ok(())
    }
}

/// Build the machine every engine agent runs.
///
/// # Errors
///
/// Returns a [`MachineError`] if the wiring is inconsistent.
pub fn colony_machine(
    temperament: Temperament,
    tuning: Tuning,
) -> Result<StateMachine, MachineError> {
    let retries = tuning.max_retries;
    StateMachine::builder()
        .default_state(Wander {
            temperament,
            tuning,
        })
        .state(
            ProcessTransaction::new(CLAIM_BED, TransactionKind::Claim, Target::State(SLEEP))
                .with_max_retries(retries),
        )
        .state(Sleep {
            recovery: tuning.rest_recovery,
        })
        .state(
            ProcessTransaction::new(RETURN_BED, TransactionKind::Return, Target::State(WANDER))
                .with_max_retries(retries),
        )
        .state(
            ProcessTransaction::new(CLAIM_JOB, TransactionKind::Claim, Target::Previous)
                .with_max_retries(retries),
        )
        .state(
            ProcessTransaction::new(HAUL, TransactionKind::Transfer, Target::Previous)
                .with_max_retries(retries),
        )
        .build()
}
