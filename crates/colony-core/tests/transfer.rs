//! Goods transfers through the processing state: clamping, retries, and
//! conservation of totals.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use colony_agents::InventoryTransaction;
use colony_core::{Colony, TickError};
use colony_types::{InventoryId, Item, LedgerEntryType, TransactionState};
use colony_world::{Inventory, ResourcePool, WorldError};
use common::{HAULING, Plan, TICK, WANDER};

fn haul(from: InventoryId, quantity: u32) -> Plan {
    Plan::Haul {
        item: Item::Wood,
        from,
        quantity,
    }
}

#[test]
fn partial_transfer_moves_what_is_available() {
    let mut pool = ResourcePool::new();
    let stockpile = common::add_stockpile(&mut pool, 50, &[(Item::Wood, 3)]);
    let mut colony = Colony::new(pool);
    let hauler = common::spawn(&mut colony, "Hauler", common::machine(haul(stockpile, 5), None, 1));
    let pocket = colony.agent(hauler).unwrap().model.inventory;
    let before = colony.pool().total_of(Item::Wood).unwrap();

    let t1 = colony.advance(TICK).unwrap();
    assert_eq!(t1.switch_of(hauler).map(|s| s.to), Some(HAULING));

    let t2 = colony.advance(TICK).unwrap();
    assert_eq!(t2.switch_of(hauler).map(|s| (s.to, s.label)), Some((WANDER, "committed")));
    let done: Vec<_> = t2.resolved_for(hauler).collect();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].state(), TransactionState::Committed);
    assert_eq!(done[0].quantity(), Some(5));
    assert_eq!(done[0].moved(), Some(3));

    assert_eq!(colony.pool().quantity(stockpile, Item::Wood).unwrap(), 0);
    assert_eq!(colony.pool().quantity(pocket, Item::Wood).unwrap(), 3);
    assert_eq!(colony.pool().total_of(Item::Wood).unwrap(), before);

    let entry = colony.ledger().entry_for(done[0].id()).unwrap();
    assert_eq!(entry.entry_type, LedgerEntryType::Transfer);
    assert_eq!(entry.quantity, 3);
    assert_eq!((entry.from, entry.to), (Some(stockpile), Some(pocket)));
}

#[test]
fn destination_capacity_clamps_the_move() {
    let mut pool = ResourcePool::new();
    let stockpile = common::add_stockpile(&mut pool, 50, &[(Item::Wood, 40)]);
    let mut colony = Colony::new(pool);
    // Pockets hold 10 units.
    let hauler = common::spawn(&mut colony, "Hauler", common::machine(haul(stockpile, 25), None, 1));
    let pocket = colony.agent(hauler).unwrap().model.inventory;

    colony.advance(TICK).unwrap();
    let t2 = colony.advance(TICK).unwrap();
    assert_eq!(t2.committed(), 1);
    assert_eq!(colony.pool().quantity(pocket, Item::Wood).unwrap(), 10);
    assert_eq!(colony.pool().quantity(stockpile, Item::Wood).unwrap(), 30);
    assert_eq!(colony.pool().total_of(Item::Wood).unwrap(), 40);
}

#[test]
fn empty_source_is_retried_then_times_out() {
    let mut pool = ResourcePool::new();
    let stockpile = common::add_stockpile(&mut pool, 50, &[(Item::Stone, 8)]);
    let mut colony = Colony::new(pool);
    let hauler = common::spawn(&mut colony, "Hauler", common::machine(haul(stockpile, 2), None, 1));

    colony.advance(TICK).unwrap();
    let t2 = colony.advance(TICK).unwrap();
    assert!(t2.switches.is_empty());
    assert_eq!(colony.current_state(hauler), Some(HAULING));

    let t3 = colony.advance(TICK).unwrap();
    assert_eq!(t3.switch_of(hauler).map(|s| (s.to, s.label)), Some((WANDER, "timed out")));
    assert_eq!(t3.timed_out(), 1);
    assert!(colony.ledger().is_empty());
}

#[test]
fn stock_arriving_before_timeout_is_picked_up() {
    let mut pool = ResourcePool::new();
    let stockpile = common::add_stockpile(&mut pool, 50, &[]);
    let mut colony = Colony::new(pool);
    let hauler = common::spawn(&mut colony, "Hauler", common::machine(haul(stockpile, 4), None, 2));
    let pocket = colony.agent(hauler).unwrap().model.inventory;

    colony.advance(TICK).unwrap();
    colony.advance(TICK).unwrap();
    colony
        .pool_mut()
        .inventory_mut(stockpile)
        .unwrap()
        .add(Item::Wood, 6)
        .unwrap();

    let t3 = colony.advance(TICK).unwrap();
    assert_eq!(t3.committed(), 1);
    assert_eq!(colony.pool().quantity(pocket, Item::Wood).unwrap(), 4);
}

#[test]
fn uninitialized_source_aborts_the_tick() {
    let mut pool = ResourcePool::new();
    let raw = pool
        .insert_inventory(Inventory::new(InventoryId::new(), 20))
        .unwrap();
    let mut colony = Colony::new(pool);
    common::spawn(&mut colony, "Hauler", common::machine(haul(raw, 1), None, 1));

    colony.advance(TICK).unwrap();
    let err = colony.advance(TICK).unwrap_err();
    assert!(matches!(
        err,
        TickError::World(WorldError::InventoryUninitialized(id)) if id == raw
    ));
}

#[test]
fn missing_source_cancels_only_that_request() {
    let mut pool = ResourcePool::new();
    let stockpile = common::add_stockpile(&mut pool, 50, &[(Item::Wood, 5)]);
    let mut colony = Colony::new(pool);
    let alder = common::spawn(&mut colony, "Alder", common::machine(haul(stockpile, 2), None, 1));
    let birch = common::spawn(
        &mut colony,
        "Birch",
        common::machine(haul(InventoryId::new(), 2), None, 1),
    );

    colony.advance(TICK).unwrap();
    let t2 = colony.advance(TICK).unwrap();
    assert_eq!(t2.committed(), 1);
    assert_eq!(t2.cancelled(), 1);
    assert_eq!(t2.switch_of(alder).map(|s| s.label), Some("committed"));
    assert_eq!(
        t2.switch_of(birch).map(|s| (s.to, s.label)),
        Some((WANDER, "nothing pending"))
    );
    assert_eq!(colony.pool().total_of(Item::Wood).unwrap(), 5);
    assert_eq!(colony.ledger().len(), 1);
}

#[test]
fn self_transfer_is_cancelled_and_the_tick_continues() {
    let mut pool = ResourcePool::new();
    let stockpile = common::add_stockpile(&mut pool, 50, &[(Item::Wood, 5)]);
    let mut colony = Colony::new(pool);
    let alder = common::spawn(&mut colony, "Alder", common::machine(Plan::Idle, None, 1));
    let birch = common::spawn(&mut colony, "Birch", common::machine(haul(stockpile, 2), None, 1));
    let pocket = colony.agent(alder).unwrap().model.inventory;
    colony
        .agent_mut(alder)
        .unwrap()
        .promise
        .push(InventoryTransaction::transfer(alder, Item::Wood, pocket, pocket, 1, 0))
        .unwrap();

    let t1 = colony.advance(TICK).unwrap();
    assert_eq!(t1.switch_of(alder).map(|s| s.label), Some("resume haul"));
    let t2 = colony.advance(TICK).unwrap();
    let cancelled: Vec<_> = t2.resolved_for(alder).collect();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].state(), TransactionState::Cancelled);
    assert_eq!(t2.switch_of(birch).map(|s| s.label), Some("committed"));
    assert_eq!(colony.pool().quantity(pocket, Item::Wood).unwrap(), 0);
}

#[test]
fn aborted_tick_keeps_earlier_resolutions() {
    let mut pool = ResourcePool::new();
    let stockpile = common::add_stockpile(&mut pool, 50, &[(Item::Wood, 5)]);
    let raw = pool
        .insert_inventory(Inventory::new(InventoryId::new(), 20))
        .unwrap();
    let mut colony = Colony::new(pool);
    let alder = common::spawn(&mut colony, "Alder", common::machine(haul(stockpile, 2), None, 1));
    common::spawn(&mut colony, "Birch", common::machine(haul(raw, 1), None, 1));

    colony.advance(TICK).unwrap();
    assert!(colony.advance(TICK).is_err());
    assert_eq!(colony.ledger().len(), 1);

    colony.pool_mut().inventory_mut(raw).unwrap().initialize();
    let t3 = colony.advance(TICK).unwrap();
    assert_eq!(t3.tick, 3);
    let carried: Vec<_> = t3.resolved_for(alder).collect();
    assert_eq!(carried.len(), 1);
    assert_eq!(carried[0].state(), TransactionState::Committed);
    assert_eq!(carried[0].moved(), Some(2));
    let entry = colony.ledger().entry_for(carried[0].id()).unwrap();
    assert_eq!(entry.tick, 2);
}
