//! Save and restore of a running colony.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use colony_core::{Colony, ColonySnapshot, TickError};
use colony_types::{Item, SlotKind};
use colony_world::ResourcePool;
use common::{CLAIMING, Plan, SLEEPING, TICK, WANDER};

fn contested_colony() -> Colony {
    let mut pool = ResourcePool::new();
    common::add_beds(&mut pool, 1);
    common::add_stockpile(&mut pool, 100, &[(Item::Food, 12)]);
    let mut colony = Colony::new(pool);
    common::spawn(&mut colony, "Alder", common::machine(Plan::Bed, None, 3));
    common::spawn(&mut colony, "Birch", common::machine(Plan::Bed, None, 3));
    colony
}

#[test]
fn restore_keeps_claims_and_resets_machines() {
    let mut colony = contested_colony();
    colony.advance(TICK).unwrap();
    colony.advance(TICK).unwrap();
    let ids = colony.agent_ids();
    let (alder, birch) = (ids[0], ids[1]);
    assert_eq!(colony.current_state(alder), Some(SLEEPING));
    assert_eq!(colony.current_state(birch), Some(CLAIMING));
    let bed = colony.agent(alder).unwrap().model.claim(SlotKind::Bed).unwrap();

    let snapshot = colony.snapshot();
    let restored =
        Colony::restore(snapshot, |_agent| Ok(common::machine(Plan::Bed, None, 3))).unwrap();

    assert_eq!(restored.tick(), 2);
    assert_eq!(restored.agent_ids(), ids);
    assert_eq!(restored.pool().claimants(bed), &[alder]);
    assert_eq!(
        restored.agent(alder).unwrap().model.claim(SlotKind::Bed),
        Some(bed)
    );
    for id in &ids {
        assert_eq!(restored.current_state(*id), Some(WANDER));
        let agent = restored.agent(*id).unwrap();
        assert!(agent.promise.is_initialized());
        assert!(agent.promise.is_empty().unwrap());
    }
    assert!(restored.ledger().is_empty());
    common::assert_pool_consistent(&restored);
}

#[test]
fn restored_colony_keeps_running() {
    let mut colony = contested_colony();
    colony.advance(TICK).unwrap();
    colony.advance(TICK).unwrap();
    let birch = colony.agent_ids()[1];

    let mut restored = Colony::restore(colony.snapshot(), |_agent| {
        Ok(common::machine(Plan::Bed, None, 3))
    })
    .unwrap();
    let summary = restored.advance(TICK).unwrap();
    assert_eq!(summary.tick, 3);
    // The only bed is held, so nobody goes back to claiming.
    assert!(summary.switches.is_empty());
    assert_eq!(restored.current_state(birch), Some(WANDER));
}

#[test]
fn snapshot_survives_json() {
    let mut colony = contested_colony();
    for _ in 0..4 {
        colony.advance(TICK).unwrap();
    }
    let snapshot = colony.snapshot();
    let json = snapshot.to_json().unwrap();
    let parsed = ColonySnapshot::from_json(&json).unwrap();
    assert_eq!(parsed, snapshot);
    assert_eq!(parsed.agents.len(), 2);
    assert_eq!(parsed.clock.tick(), 4);
    assert_eq!(parsed.pool.total_of(Item::Food).unwrap(), 12);
}

#[test]
fn duplicate_names_are_rejected_on_restore() {
    let colony = contested_colony();
    let mut snapshot = colony.snapshot();
    let copy = snapshot.agents[0].clone();
    snapshot.agents.push(copy);

    let err = Colony::restore(snapshot, |_agent| Ok(common::machine(Plan::Idle, None, 1)))
        .unwrap_err();
    assert!(matches!(err, TickError::Agent(_)));
}
