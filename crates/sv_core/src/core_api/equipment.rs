use log::debug;
use rand::Rng;

use crate::game_data::{Equipment, MarketItem, RARITY_COMMON, SaveState};
use crate::item_kind::ItemKind;

use super::engine::{remove_objects, replace_objects};
use super::types::{MutationReport, MutationRequest};

pub fn remove_equipment(state: &mut SaveState, equipment_id: i32) -> MutationReport {
    remove_objects(
        state,
        &[MutationRequest::remove(ItemKind::Equipment, equipment_id)],
    )
}

pub fn replace_equipment(state: &mut SaveState, target_id: i32, new_id: i32) -> MutationReport {
    replace_objects(
        state,
        &[MutationRequest::replace(ItemKind::Equipment, target_id, new_id)],
    )
}

/// Stocks `equipment` in station markets. A station qualifies when its level
/// is at least the equipment's item level, its market already has entries,
/// and a 1-99 roll is at most `sell_chance`. Each qualifying station gets one
/// common entry with a stock of 1-4. Returns the number of stations stocked.
pub fn add_to_random_stations<R: Rng + ?Sized>(
    state: &mut SaveState,
    equipment: &Equipment,
    rng: &mut R,
) -> usize {
    let mut stocked = 0;

    for station in state.station_list.iter_mut().flatten() {
        if station.level < equipment.item_level {
            continue;
        }
        let roll = rng.gen_range(1..100);
        let Some(market) = station.market.as_mut() else {
            continue;
        };
        if roll > equipment.sell_chance || market.is_empty() {
            continue;
        }

        let stock = rng.gen_range(1..5);
        market.push(MarketItem::new(
            ItemKind::Equipment,
            equipment.id,
            RARITY_COMMON,
            stock,
        ));
        stocked += 1;
        debug!(
            "stocked equipment {} x{stock} at station {}",
            equipment.id, station.id
        );
    }

    stocked
}
