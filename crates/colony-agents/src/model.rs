//! The mutable agent model.
//!
//! [`AgentModel`] is the persisted part of an agent: its needs, the slot ids
//! it has claimed, and the id of its personal inventory in the pool. Claim
//! ids are written only by processing states when a transaction commits, so
//! each one changes exactly once per successful claim or return.

use std::collections::BTreeMap;

use colony_types::{InventoryId, Need, SlotId, SlotKind};
use serde::{Deserialize, Serialize};

/// Upper bound for any need level.
pub const MAX_NEED: u32 = 100;

/// Arbitrary agent attributes read by guards and written by states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentModel {
    /// Display name.
    pub name: String,
    /// The agent's personal inventory in the resource pool.
    pub inventory: InventoryId,
    needs: BTreeMap<Need, u32>,
    claims: BTreeMap<SlotKind, SlotId>,
}

impl AgentModel {
    /// Create a model with no needs and no claims.
    pub const fn new(name: String, inventory: InventoryId) -> Self {
        Self {
            name,
            inventory,
            needs: BTreeMap::new(),
            claims: BTreeMap::new(),
        }
    }

    // -- Claims --------------------------------------------------------------

    /// The slot of `kind` this agent holds, if any (its bed, its job post).
    pub fn claim(&self, kind: SlotKind) -> Option<SlotId> {
        self.claims.get(&kind).copied()
    }

    /// Record a committed claim. Returns the slot it replaced, if any.
    pub fn set_claim(&mut self, kind: SlotKind, slot: SlotId) -> Option<SlotId> {
        self.claims.insert(kind, slot)
    }

    /// Forget the claim on `slot`, whatever its kind. Returns the kind cleared.
    pub fn clear_claim(&mut self, slot: SlotId) -> Option<SlotKind> {
        let kind = self
            .claims
            .iter()
            .find(|(_, s)| **s == slot)
            .map(|(k, _)| *k)?;
        self.claims.remove(&kind);
        Some(kind)
    }

    /// All held claims.
    pub const fn claims(&self) -> &BTreeMap<SlotKind, SlotId> {
        &self.claims
    }

    // -- Needs ---------------------------------------------------------------

    /// Current level of a need (0 when never raised).
    pub fn need(&self, need: Need) -> u32 {
        self.needs.get(&need).copied().unwrap_or(0)
    }

    /// Raise a need, saturating at [`MAX_NEED`].
    pub fn raise_need(&mut self, need: Need, amount: u32) {
        let level = self.needs.entry(need).or_insert(0);
        *level = level.saturating_add(amount).min(MAX_NEED);
    }

    /// Lower a need, saturating at zero.
    pub fn lower_need(&mut self, need: Need, amount: u32) {
        let level = self.needs.entry(need).or_insert(0);
        *level = level.saturating_sub(amount);
    }
}
