//! Colony save files.
//!
//! A [`ColonySnapshot`] holds what outlives a run: the clock, the pool
//! (inventories and slot claimants), and each agent's model. State machines
//! and promise queues are runtime-only; [`Colony::restore`] rebuilds machines
//! in their default state with empty queues.
//!
//! [`Colony::restore`]: crate::Colony::restore

use colony_agents::AgentModel;
use colony_types::AgentId;
use colony_world::ResourcePool;
use serde::{Deserialize, Serialize};

use crate::clock::SimClock;

/// One saved agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAgent {
    /// The agent's id, kept across save and load.
    pub id: AgentId,
    /// Needs, claims, and inventory id.
    pub model: AgentModel,
}

/// The persistent part of a colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonySnapshot {
    /// Tick counter and elapsed time.
    pub clock: SimClock,
    /// Slots and inventories.
    pub pool: ResourcePool,
    /// Agents in spawn order.
    pub agents: Vec<SavedAgent>,
}

impl ColonySnapshot {
    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if a map key cannot be written.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser's error for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
