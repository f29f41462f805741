//! State machines, transaction processing, and the tick loop for the Colony
//! simulation.
//!
//! Each agent runs a [`StateMachine`] of tagged states. States that need a
//! contested resource push an inventory transaction onto the agent's promise
//! queue and switch into a [`ProcessTransaction`] state, which works the
//! queue against the shared pool one attempt per tick with a bounded retry.
//!
//! # Modules
//!
//! - [`machine`] -- [`State`], [`Transition`], [`StateMachine`], and the
//!   per-tick [`AgentContext`].
//! - [`processing`] -- The transaction-processing state and the
//!   [`pending_head`] entry guard.
//! - [`colony`] -- [`Colony`]: membership, the tick loop, save and restore.
//! - [`clock`] -- Tick counter and the per-tick [`SimContext`].
//! - [`config`] -- Configuration loading from `colony-config.yaml` into
//!   strongly-typed structs.
//! - [`snapshot`] -- [`ColonySnapshot`] save files.
//! - [`stall`] -- Detection of agents stuck in a state.
//! - [`error`] -- [`MachineError`] and [`TickError`].
//!
//! [`pending_head`]: processing::pending_head

pub mod clock;
pub mod colony;
pub mod config;
pub mod error;
pub mod machine;
pub mod processing;
pub mod snapshot;
pub mod stall;

pub use clock::{SimClock, SimContext};
pub use colony::{Colony, Departure, TickSummary};
pub use config::ColonyConfig;
pub use error::{MachineError, TickError};
pub use machine::{
    AgentContext, State, StateId, StateMachine, StateMachineBuilder, Switch, Target, Transition,
    Transitions,
};
pub use processing::{ProcessTransaction, pending_head};
pub use snapshot::ColonySnapshot;
pub use stall::{Stall, detect_stalls};
