//! The subset of the game's save schema this crate reads and mutates.
//!
//! Every collection that the game may leave unset is an `Option`; absent and
//! empty collections are treated the same way by the traversal.

use serde::{Deserialize, Serialize};

use crate::item_kind::ItemKind;

pub const RARITY_COMMON: i32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub space_ship_data: Option<SpaceShipData>,
    pub ship_loadouts: Option<Vec<ShipLoadout>>,
    pub crew: Option<Vec<CrewMember>>,
    pub character: Option<PlayerCharacter>,
    pub towed_objects: Option<Vec<TowedObject>>,
    pub station_list: Option<Vec<Station>>,
    pub arena_data: Option<ArenaData>,
    pub sectors: Option<Vec<Sector>>,
    pub last_sector: Option<Sector>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceShipData {
    pub ship_model_id: i32,
    pub cargo: Option<Vec<CargoItem>>,
    pub equipments: Option<Vec<InstalledEquipment>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoItem {
    pub item_type: i32,
    pub item_id: i32,
    pub rarity: i32,
    pub qnt: i32,
}

impl CargoItem {
    pub fn new(kind: ItemKind, item_id: i32, qnt: i32) -> Self {
        Self {
            item_type: kind.raw(),
            item_id,
            rarity: RARITY_COMMON,
            qnt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledEquipment {
    pub equipment_id: i32,
    pub rarity: i32,
    pub qnt: i32,
}

impl InstalledEquipment {
    pub fn new(equipment_id: i32) -> Self {
        Self {
            equipment_id,
            rarity: RARITY_COMMON,
            qnt: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipLoadout {
    pub name: String,
    pub data: Option<SpaceShipData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: i32,
    pub ai_char: Option<AiCharacter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiCharacter {
    pub name: String,
    pub ship_data: Option<SpaceShipData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub name: String,
    pub level: i32,
    pub mercenaries: Option<Vec<Mercenary>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mercenary {
    pub name: String,
    pub ship_data: Option<SpaceShipData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftingObject {
    pub item_type: i32,
    pub item_id: i32,
    pub rarity: i32,
    pub qnt: i32,
}

impl DriftingObject {
    pub fn new(kind: ItemKind, item_id: i32, qnt: i32) -> Self {
        Self {
            item_type: kind.raw(),
            item_id,
            rarity: RARITY_COMMON,
            qnt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowedObject {
    pub drifting_object: DriftingObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketItem {
    pub item_type: i32,
    pub item_id: i32,
    pub rarity: i32,
    pub stock: i32,
}

impl MarketItem {
    pub fn new(kind: ItemKind, item_id: i32, rarity: i32, stock: i32) -> Self {
        Self {
            item_type: kind.raw(),
            item_id,
            rarity,
            stock,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub level: i32,
    pub market: Option<Vec<MarketItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaData {
    pub curr_market: Option<Vec<MarketItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: i32,
    pub drifting_objects: Option<Vec<DriftingObject>>,
}

/// Equipment definition from the game's equipment database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub item_level: i32,
    /// Percent chance (1-99) that a qualifying station stocks this equipment.
    pub sell_chance: i32,
    pub effects_text_index: Option<usize>,
}

/// Generic item definition from the game's item database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub item_level: i32,
}
