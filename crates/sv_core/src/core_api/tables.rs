use serde::{Deserialize, Serialize};

use crate::game_data::{Equipment, Item};

/// Sections of the game's language text table, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LangTextSection {
    BasicAndUi,
    Weapons,
    Equipment,
    Items,
    EquipmentEffects,
    DynamicInterface,
    MessagesTexts,
    Factions,
    Skills,
    WeaponComponents,
    WeaponModifiers,
    NpcDialog,
    Spaceships,
    ShipStatusChanges,
    LocalQuestText,
    StoreQuestInd,
    StoryQuestMiner,
    StoryQuestTrader,
    StoryQuestPirate,
    StoryQuestVenghi,
    StoryQuestRebel,
    StoryQuestTechno,
    SpecialQuest,
    ShipCrewData,
    PerksData,
}

impl LangTextSection {
    pub const ALL: [Self; 25] = [
        Self::BasicAndUi,
        Self::Weapons,
        Self::Equipment,
        Self::Items,
        Self::EquipmentEffects,
        Self::DynamicInterface,
        Self::MessagesTexts,
        Self::Factions,
        Self::Skills,
        Self::WeaponComponents,
        Self::WeaponModifiers,
        Self::NpcDialog,
        Self::Spaceships,
        Self::ShipStatusChanges,
        Self::LocalQuestText,
        Self::StoreQuestInd,
        Self::StoryQuestMiner,
        Self::StoryQuestTrader,
        Self::StoryQuestPirate,
        Self::StoryQuestVenghi,
        Self::StoryQuestRebel,
        Self::StoryQuestTechno,
        Self::SpecialQuest,
        Self::ShipCrewData,
        Self::PerksData,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasicAndUi => "basicandui",
            Self::Weapons => "weapons",
            Self::Equipment => "equipment",
            Self::Items => "items",
            Self::EquipmentEffects => "equipmenteffects",
            Self::DynamicInterface => "dynamicinterface",
            Self::MessagesTexts => "messagestexts",
            Self::Factions => "factions",
            Self::Skills => "skills",
            Self::WeaponComponents => "weaponcomponents",
            Self::WeaponModifiers => "weaponmodifiers",
            Self::NpcDialog => "npcdialog",
            Self::Spaceships => "spaceships",
            Self::ShipStatusChanges => "shipstatuschanges",
            Self::LocalQuestText => "localquesttext",
            Self::StoreQuestInd => "storequestind",
            Self::StoryQuestMiner => "storyquestminer",
            Self::StoryQuestTrader => "storyquesttrader",
            Self::StoryQuestPirate => "storyquestpirate",
            Self::StoryQuestVenghi => "storyquestvenghi",
            Self::StoryQuestRebel => "storyquestrebel",
            Self::StoryQuestTechno => "storyquesttechno",
            Self::SpecialQuest => "specialquest",
            Self::ShipCrewData => "shipcrewdata",
            Self::PerksData => "perksdata",
        }
    }
}

/// The two operations this crate needs from the game's language table and
/// item database.
pub trait GameTables {
    /// Appends `text` to `section` and returns its index within the section.
    fn append_text(&mut self, section: LangTextSection, text: &str) -> usize;

    /// Replaces the item whose id is `item_id`. Returns false when no item
    /// has that id.
    fn lookup_and_replace_item(&mut self, item_id: i32, new_item: Item) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryTables {
    sections: Vec<Vec<String>>,
    items: Vec<Item>,
}

impl Default for InMemoryTables {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl InMemoryTables {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            sections: vec![Vec::new(); LangTextSection::ALL.len()],
            items,
        }
    }

    pub fn section(&self, section: LangTextSection) -> &[String] {
        &self.sections[section.index()]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl GameTables for InMemoryTables {
    fn append_text(&mut self, section: LangTextSection, text: &str) -> usize {
        let texts = &mut self.sections[section.index()];
        texts.push(text.to_string());
        texts.len() - 1
    }

    fn lookup_and_replace_item(&mut self, item_id: i32, new_item: Item) -> bool {
        match self.items.iter_mut().find(|item| item.id == item_id) {
            Some(slot) => {
                *slot = new_item;
                true
            }
            None => false,
        }
    }
}

/// Registers an equipment effect description and returns its text index.
pub fn add_to_effects_text<T: GameTables + ?Sized>(tables: &mut T, effect_text: &str) -> usize {
    tables.append_text(LangTextSection::EquipmentEffects, effect_text)
}

/// Next free equipment id (highest id + 1). `None` for an empty list or when
/// the highest id is `i32::MAX`.
pub fn next_equipment_id(equipments: &[Equipment]) -> Option<i32> {
    equipments.iter().map(|e| e.id).max().and_then(|id| id.checked_add(1))
}

/// Next free item id (highest id + 1). `None` for an empty list or when
/// the highest id is `i32::MAX`.
pub fn next_item_id(items: &[Item]) -> Option<i32> {
    items.iter().map(|i| i.id).max().and_then(|id| id.checked_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            item_level: 1,
        }
    }

    #[test]
    fn section_indices_follow_table_order() {
        assert_eq!(LangTextSection::BasicAndUi.index(), 0);
        assert_eq!(LangTextSection::EquipmentEffects.index(), 4);
        assert_eq!(LangTextSection::PerksData.index(), 24);
        assert_eq!(
            LangTextSection::from_index(4),
            Some(LangTextSection::EquipmentEffects)
        );
        assert_eq!(LangTextSection::from_index(25), None);
        for (index, section) in LangTextSection::ALL.iter().enumerate() {
            assert_eq!(section.index(), index);
        }
    }

    #[test]
    fn effects_text_returns_new_index() {
        let mut tables = InMemoryTables::default();
        assert_eq!(add_to_effects_text(&mut tables, "+5% shields"), 0);
        assert_eq!(add_to_effects_text(&mut tables, "+2 speed"), 1);
        assert_eq!(
            tables.section(LangTextSection::EquipmentEffects),
            ["+5% shields".to_string(), "+2 speed".to_string()]
        );
        assert!(tables.section(LangTextSection::Items).is_empty());
    }

    #[test]
    fn replace_item_by_id_not_by_position() {
        let mut tables = InMemoryTables::new(vec![item(10, "Ore"), item(3, "Fuel")]);

        assert!(tables.lookup_and_replace_item(3, item(3, "Refined Fuel")));
        assert_eq!(tables.items()[1].name, "Refined Fuel");
        assert_eq!(tables.items()[0].name, "Ore");
        assert!(!tables.lookup_and_replace_item(1, item(1, "Nothing")));
    }

    #[test]
    fn next_ids() {
        assert_eq!(next_item_id(&[]), None);
        assert_eq!(next_item_id(&[item(4, "a"), item(9, "b"), item(2, "c")]), Some(10));

        let equipment = Equipment {
            id: 41,
            ..Equipment::default()
        };
        assert_eq!(next_equipment_id(&[equipment]), Some(42));
        assert_eq!(next_equipment_id(&[]), None);
    }

    #[test]
    fn next_ids_stop_at_i32_max() {
        assert_eq!(next_item_id(&[item(i32::MAX, "last")]), None);
        assert_eq!(next_item_id(&[item(i32::MAX - 1, "almost")]), Some(i32::MAX));

        let equipment = Equipment {
            id: i32::MAX,
            ..Equipment::default()
        };
        assert_eq!(next_equipment_id(&[equipment]), None);
    }
}
