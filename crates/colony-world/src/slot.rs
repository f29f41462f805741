//! Claimable slots.
//!
//! A [`Slot`] is a reservation point (a bed, a job post, a seat) with a fixed
//! capacity and a claimant list. The slot itself is the enforcement point
//! for exclusivity: [`Slot::try_claim`] is a check-and-set that never lets the
//! claimant list grow past the capacity, and never lists the same agent
//! twice.

use std::collections::BTreeMap;

use colony_types::{AgentId, Need, SlotId, SlotKind};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// What happens when an agent claims a slot it already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReclaimPolicy {
    /// A second claim by the same agent is rejected.
    Reject,
    /// A second claim by the same agent succeeds without adding an entry
    /// (refreshing the agent's own bed, for example).
    Refresh,
}

/// The result of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The agent was added to the claimant list.
    Granted,
    /// The agent already held the slot and the policy allows re-claiming.
    Refreshed,
    /// Every place in the slot is taken.
    Full,
    /// The agent already holds the slot and the policy forbids re-claiming.
    AlreadyClaimed,
}

impl ClaimOutcome {
    /// Whether the agent holds the slot after the attempt.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Granted | Self::Refreshed)
    }
}

/// A capacity-limited reservation point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    id: SlotId,
    kind: SlotKind,
    capacity: u32,
    claimants: Vec<AgentId>,
    qualities: BTreeMap<Need, u32>,
    reclaim: ReclaimPolicy,
}

impl Slot {
    /// Create an empty slot.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(id: SlotId, kind: SlotKind, capacity: u32) -> Result<Self, WorldError> {
        if capacity == 0 {
            return Err(WorldError::ZeroCapacity(id));
        }
        Ok(Self {
            id,
            kind,
            capacity,
            claimants: Vec::new(),
            qualities: BTreeMap::new(),
            reclaim: ReclaimPolicy::Reject,
        })
    }

    /// Set the quality this slot offers for a need.
    #[must_use]
    pub fn with_quality(mut self, need: Need, quality: u32) -> Self {
        self.qualities.insert(need, quality);
        self
    }

    /// Set the re-claim policy.
    #[must_use]
    pub const fn with_reclaim(mut self, reclaim: ReclaimPolicy) -> Self {
        self.reclaim = reclaim;
        self
    }

    /// The slot id.
    pub const fn id(&self) -> SlotId {
        self.id
    }

    /// The slot kind.
    pub const fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Maximum number of simultaneous claimants.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Agents currently holding the slot, in claim order.
    pub fn claimants(&self) -> &[AgentId] {
        &self.claimants
    }

    /// The re-claim policy.
    pub const fn reclaim(&self) -> ReclaimPolicy {
        self.reclaim
    }

    /// Quality offered for a need; zero when the slot does not serve it.
    pub fn quality(&self, need: Need) -> u32 {
        self.qualities.get(&need).copied().unwrap_or(0)
    }

    /// Number of current claimants.
    pub fn claimed(&self) -> u32 {
        u32::try_from(self.claimants.len()).unwrap_or(u32::MAX)
    }

    /// Whether another agent could be added.
    pub fn has_free_capacity(&self) -> bool {
        self.claimed() < self.capacity
    }

    /// Whether `agent` is among the claimants.
    pub fn is_claimed_by(&self, agent: AgentId) -> bool {
        self.claimants.contains(&agent)
    }

    /// Check-and-set claim for `agent`.
    pub fn try_claim(&mut self, agent: AgentId) -> ClaimOutcome {
        if self.is_claimed_by(agent) {
            return match self.reclaim {
                ReclaimPolicy::Refresh => ClaimOutcome::Refreshed,
                ReclaimPolicy::Reject => ClaimOutcome::AlreadyClaimed,
            };
        }
        if !self.has_free_capacity() {
            return ClaimOutcome::Full;
        }
        self.claimants.push(agent);
        ClaimOutcome::Granted
    }

    /// Remove `agent` from the claimants. Returns whether it was present.
    pub fn release(&mut self, agent: AgentId) -> bool {
        let before = self.claimants.len();
        self.claimants.retain(|a| *a != agent);
        self.claimants.len() != before
    }
}
