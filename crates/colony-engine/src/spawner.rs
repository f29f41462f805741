//! Agent spawner for seeding the colony.
//!
//! Names come from a fixed pool, picked without replacement. Each agent gets
//! a rolled [`Temperament`] so needs grow at different rates and agents
//! reach for beds and goods at different times. All rolls come from one
//! seeded RNG, so a seed reproduces the whole population.

use std::collections::BTreeSet;

use colony_core::Colony;
use colony_core::config::AgentsConfig;
use colony_types::{AgentId, Item};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::behaviors::{self, Temperament, Tuning};
use crate::error::EngineError;

/// Built-in pool of agent names.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze", "Iris", "Juniper",
    "Kestrel", "Lark", "Moss", "Nettle", "Oak", "Pine", "Quill", "Reed", "Sage", "Thorn",
    "Umber", "Vale", "Wren", "Yarrow", "Zephyr", "Ash", "Brook", "Clay", "Dawn", "Elm",
];

/// Seeded factory for engine agents.
#[derive(Debug)]
pub struct Spawner {
    rng: StdRng,
    inventory_capacity: u32,
    rest_growth: u32,
    goods: Vec<Item>,
    tuning: Tuning,
}

impl Spawner {
    /// A spawner seeded with `seed`.
    ///
    /// `goods` are the items agents may pick as a favourite; an empty list
    /// falls back to wood.
    pub fn new(seed: u64, agents: &AgentsConfig, goods: Vec<Item>, tuning: Tuning) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            inventory_capacity: agents.inventory_capacity,
            rest_growth: agents.rest_growth,
            goods,
            tuning,
        }
    }

    /// Roll a temperament around the configured rest growth.
    pub fn roll_temperament(&mut self) -> Temperament {
        let jitter = self.rng.random_range(0..=2_u32);
        let favourite = if self.goods.is_empty() {
            Item::Wood
        } else {
            let idx = self.rng.random_range(0..self.goods.len());
            self.goods.get(idx).copied().unwrap_or(Item::Wood)
        };
        Temperament {
            rest_growth: self.rest_growth.saturating_add(jitter).max(1),
            work_growth: self.rng.random_range(1..=5),
            favourite,
        }
    }

    /// Spawn one agent with a fresh name and temperament.
    pub fn spawn_one(&mut self, colony: &mut Colony) -> Result<AgentId, EngineError> {
        let existing: BTreeSet<String> = colony.agents().map(|a| a.name().to_owned()).collect();
        let name = pick_unused_name(&mut self.rng, &existing);
        let temperament = self.roll_temperament();
        let machine = behaviors::colony_machine(temperament, self.tuning)?;
        let id = colony.spawn_agent(name.clone(), self.inventory_capacity, machine)?;
        info!(
            agent_id = %id,
            name = %name,
            rest_growth = temperament.rest_growth,
            work_growth = temperament.work_growth,
            favourite = ?temperament.favourite,
            "agent joined the colony"
        );
        Ok(id)
    }

    /// Spawn `count` agents.
    pub fn spawn_all(
        &mut self,
        colony: &mut Colony,
        count: u32,
    ) -> Result<Vec<AgentId>, EngineError> {
        (0..count).map(|_| self.spawn_one(colony)).collect()
    }
}

/// Pick a name not in `existing`, falling back to numbered settlers once the
/// pool is exhausted.
fn pick_unused_name(rng: &mut impl Rng, existing: &BTreeSet<String>) -> String {
    let available: Vec<&str> = NAME_POOL
        .iter()
        .filter(|&&n| !existing.contains(n))
        .copied()
        .collect();

    if !available.is_empty() {
        let idx = rng.random_range(0..available.len());
        if let Some(name) = available.get(idx) {
            return String::from(*name);
        }
    }

    loop {
        let suffix: u32 = rng.random_range(1000..10_000);
        let name = format!("Settler-{suffix}");
        if !existing.contains(&name) {
            return name;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use colony_types::InventoryId;
    use colony_world::ResourcePool;

    use super::*;

    fn tuning() -> Tuning {
        Tuning {
            rest_recovery: 10,
            tired_threshold: 50,
            haul_amount: 3,
            max_retries: 1,
            stockpile: InventoryId::new(),
        }
    }

    fn spawner(seed: u64) -> Spawner {
        Spawner::new(
            seed,
            &AgentsConfig::default(),
            vec![Item::Wood, Item::Food],
            tuning(),
        )
    }

    #[test]
    fn spawns_unique_names() {
        let mut colony = Colony::new(ResourcePool::new());
        let ids = spawner(7).spawn_all(&mut colony, 40).unwrap();
        assert_eq!(ids.len(), 40);
        let names: BTreeSet<&str> = colony.agents().map(|a| a.name()).collect();
        assert_eq!(names.len(), 40, "all names must be unique");
    }

    #[test]
    fn same_seed_same_population() {
        let mut a = Colony::new(ResourcePool::new());
        let mut b = Colony::new(ResourcePool::new());
        spawner(99).spawn_all(&mut a, 5).unwrap();
        spawner(99).spawn_all(&mut b, 5).unwrap();
        let names_a: Vec<&str> = a.agents().map(|x| x.name()).collect();
        let names_b: Vec<&str> = b.agents().map(|x| x.name()).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn temperaments_stay_in_range() {
        let mut s = spawner(3);
        for _ in 0..50 {
            let t = s.roll_temperament();
            let base = AgentsConfig::default().rest_growth;
            assert!(t.rest_growth >= base && t.rest_growth <= base + 2);
            assert!((1..=5).contains(&t.work_growth));
            assert!(matches!(t.favourite, Item::Wood | Item::Food));
        }
    }

    #[test]
    fn name_pool_exhaustion_falls_back() {
        let existing: BTreeSet<String> = NAME_POOL.iter().map(|n| String::from(*n)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let name = pick_unused_name(&mut rng, &existing);
        assert!(name.starts_with("Settler-"));
    }
}
