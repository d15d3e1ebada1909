use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Global item kind as stored in the `item_type` field of kinded entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    None,
    Weapon,
    Equipment,
    GenericItem,
    Ship,
    Unknown(i32),
}

impl ItemKind {
    pub const NONE_RAW: i32 = 0;
    pub const WEAPON_RAW: i32 = 1;
    pub const EQUIPMENT_RAW: i32 = 2;
    pub const GENERIC_ITEM_RAW: i32 = 3;
    pub const SHIP_RAW: i32 = 4;

    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::NONE_RAW => Self::None,
            Self::WEAPON_RAW => Self::Weapon,
            Self::EQUIPMENT_RAW => Self::Equipment,
            Self::GENERIC_ITEM_RAW => Self::GenericItem,
            Self::SHIP_RAW => Self::Ship,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match *self {
            Self::None => Self::NONE_RAW,
            Self::Weapon => Self::WEAPON_RAW,
            Self::Equipment => Self::EQUIPMENT_RAW,
            Self::GenericItem => Self::GENERIC_ITEM_RAW,
            Self::Ship => Self::SHIP_RAW,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::None => "none",
            Self::Weapon => "weapon",
            Self::Equipment => "equipment",
            Self::GenericItem => "item",
            Self::Ship => "ship",
            Self::Unknown(_) => "unknown",
        }
    }

    pub fn is_equipment(&self) -> bool {
        *self == Self::Equipment
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "unknown ({})", v),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "weapon" => Ok(Self::Weapon),
            "equipment" | "equip" => Ok(Self::Equipment),
            "item" | "genericitem" | "generic" => Ok(Self::GenericItem),
            "ship" => Ok(Self::Ship),
            other => other
                .parse::<i32>()
                .map(Self::from_raw)
                .map_err(|_| format!("unknown item kind '{s}'")),
        }
    }
}
