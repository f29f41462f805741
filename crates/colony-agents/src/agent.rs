//! Agents and the roster that creates them.
//!
//! An [`Agent`] bundles an identity, the mutable [`AgentModel`], and the
//! agent's [`InventoryPromise`]. The [`AgentRoster`] enforces name uniqueness
//! and hands out agents whose promise is still uninitialized; the owner
//! (normally the colony) initializes it once the agent's inventory exists.

use std::collections::BTreeSet;

use colony_types::{AgentId, InventoryId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AgentError;
use crate::model::AgentModel;
use crate::promise::InventoryPromise;

/// A simulated agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Mutable attributes.
    pub model: AgentModel,
    /// Pending inventory transactions.
    pub promise: InventoryPromise,
}

impl Agent {
    /// Build an agent with a fresh id and an uninitialized promise.
    pub fn new(name: String, inventory: InventoryId) -> Self {
        let id = AgentId::new();
        Self {
            id,
            model: AgentModel::new(name, inventory),
            promise: InventoryPromise::new(id),
        }
    }

    /// The agent's display name.
    pub fn name(&self) -> &str {
        &self.model.name
    }
}

/// Creates agents and tracks which names are in use.
#[derive(Debug, Default)]
pub struct AgentRoster {
    names_in_use: BTreeSet<String>,
}

impl AgentRoster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            names_in_use: BTreeSet::new(),
        }
    }

    /// Create an agent named `name` owning `inventory`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateName`] if the name is already taken.
    pub fn create(&mut self, name: String, inventory: InventoryId) -> Result<Agent, AgentError> {
        if self.names_in_use.contains(&name) {
            return Err(AgentError::DuplicateName(name));
        }
        self.names_in_use.insert(name.clone());
        let agent = Agent::new(name, inventory);
        info!(agent_id = %agent.id, name = agent.name(), "agent created");
        Ok(agent)
    }

    /// Register a name that is already in use, e.g. when restoring a save.
    ///
    /// Returns `false` if the name was already registered.
    pub fn adopt_name(&mut self, name: &str) -> bool {
        self.names_in_use.insert(name.to_owned())
    }

    /// Release a name after the agent leaves the simulation.
    ///
    /// Returns `true` if the name was in use and is now released.
    pub fn release_name(&mut self, name: &str) -> bool {
        self.names_in_use.remove(name)
    }

    /// Check whether a name is currently in use.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names_in_use.contains(name)
    }
}
