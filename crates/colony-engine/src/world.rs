//! Starting world construction from the `pool` config section.

use std::collections::BTreeMap;

use colony_core::config::PoolConfig;
use colony_types::{InventoryId, Item, Need, SlotId, SlotKind};
use colony_world::{Inventory, ResourcePool, Slot, WorldError};
use tracing::info;

/// Every good, for totals reporting.
pub const GOODS: [Item; 6] = [
    Item::Wood,
    Item::Stone,
    Item::Food,
    Item::Water,
    Item::Cloth,
    Item::Tool,
];

/// Build the shared pool: beds, job posts, and one stockpile.
///
/// Beds and posts get descending quality so agents prefer the first ones
/// and contend for them. Returns the pool and the stockpile id.
pub fn build_pool(config: &PoolConfig) -> Result<(ResourcePool, InventoryId), WorldError> {
    let mut pool = ResourcePool::new();

    for rank in 0..config.beds {
        let bed = Slot::new(SlotId::new(), SlotKind::Bed, config.bed_capacity)?
            .with_quality(Need::Rest, config.beds.saturating_sub(rank));
        pool.insert_slot(bed)?;
    }
    for rank in 0..config.job_posts {
        let post = Slot::new(SlotId::new(), SlotKind::Job, config.job_capacity)?
            .with_quality(Need::Work, config.job_posts.saturating_sub(rank));
        pool.insert_slot(post)?;
    }

    let mut stockpile = Inventory::initialized(InventoryId::new(), config.stockpile_capacity);
    for (item, qty) in &config.stockpile {
        if *qty > 0 {
            stockpile.add(*item, *qty)?;
        }
    }
    let stockpile = pool.insert_inventory(stockpile)?;

    info!(
        beds = config.beds,
        job_posts = config.job_posts,
        stockpile = %stockpile,
        "starting world built"
    );
    Ok((pool, stockpile))
}

/// Pool-wide totals per good.
pub fn stock_totals(pool: &ResourcePool) -> Result<BTreeMap<Item, u32>, WorldError> {
    GOODS
        .iter()
        .map(|item| Ok((*item, pool.total_of(*item)?)))
        .collect()
}
