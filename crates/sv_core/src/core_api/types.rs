use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item_kind::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationMode {
    Remove,
    Replace,
}

impl OperationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Replace => "replace",
        }
    }
}

/// One remove-or-replace intent. `new_id` is ignored in remove mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub target_id: i32,
    pub new_id: i32,
    pub kind: ItemKind,
}

impl MutationRequest {
    pub fn remove(kind: ItemKind, target_id: i32) -> Self {
        Self {
            target_id,
            new_id: 0,
            kind,
        }
    }

    pub fn replace(kind: ItemKind, target_id: i32, new_id: i32) -> Self {
        Self {
            target_id,
            new_id,
            kind,
        }
    }

    pub fn scope(&self) -> RequestScope {
        classify(self.kind)
    }
}

/// Shape of an item container: entries tagged with a kind, or bare
/// equipment ids with an implicit equipment kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerClass {
    Kinded,
    BareId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestScope {
    pub equipment_containers: bool,
    pub generic_containers: bool,
}

impl RequestScope {
    pub fn covers(&self, class: ContainerClass) -> bool {
        match class {
            ContainerClass::Kinded => self.generic_containers,
            ContainerClass::BareId => self.equipment_containers,
        }
    }
}

/// Every kind reaches the kinded containers, where the kind tag filters
/// entries. Only equipment also reaches installed-equipment lists.
pub fn classify(kind: ItemKind) -> RequestScope {
    RequestScope {
        equipment_containers: kind.is_equipment(),
        generic_containers: true,
    }
}

/// Returns the requests of `kind`, or an empty list for absent or empty input.
pub fn subset_of_kind(
    requests: Option<&[MutationRequest]>,
    kind: ItemKind,
) -> Vec<MutationRequest> {
    let Some(requests) = requests else {
        return Vec::new();
    };

    requests
        .iter()
        .filter(|request| request.kind == kind)
        .copied()
        .collect()
}

/// Outcome of a guarded operation. `Busy` means another operation held the
/// guard and nothing was done.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Completed(T),
    Busy,
}

impl<T> Attempt<T> {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Busy => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attempt<U> {
        match self {
            Self::Completed(value) => Attempt::Completed(f(value)),
            Self::Busy => Attempt::Busy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationReport {
    pub mode: OperationMode,
    pub removed: usize,
    pub replaced: usize,
    pub containers_visited: usize,
}

impl MutationReport {
    pub fn new(mode: OperationMode) -> Self {
        Self {
            mode,
            removed: 0,
            replaced: 0,
            containers_visited: 0,
        }
    }

    pub fn changed(&self) -> usize {
        self.removed + self.replaced
    }
}

/// A place in the save graph where an item container lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerSite {
    PlayerShipCargo,
    PlayerShipEquipment,
    LoadoutCargo(usize),
    LoadoutEquipment(usize),
    CrewCargo(usize),
    CrewEquipment(usize),
    MercenaryCargo(usize),
    MercenaryEquipment(usize),
    TowedObjects,
    StationMarket(usize),
    ArenaMarket,
    SectorDriftingObjects(usize),
    LastSectorDriftingObjects,
}

impl ContainerSite {
    pub fn class(&self) -> ContainerClass {
        match self {
            Self::PlayerShipEquipment
            | Self::LoadoutEquipment(_)
            | Self::CrewEquipment(_)
            | Self::MercenaryEquipment(_) => ContainerClass::BareId,
            _ => ContainerClass::Kinded,
        }
    }
}

impl fmt::Display for ContainerSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PlayerShipCargo => f.write_str("player ship cargo"),
            Self::PlayerShipEquipment => f.write_str("player ship equipment"),
            Self::LoadoutCargo(i) => write!(f, "loadout #{i} cargo"),
            Self::LoadoutEquipment(i) => write!(f, "loadout #{i} equipment"),
            Self::CrewCargo(i) => write!(f, "crew #{i} cargo"),
            Self::CrewEquipment(i) => write!(f, "crew #{i} equipment"),
            Self::MercenaryCargo(i) => write!(f, "mercenary #{i} cargo"),
            Self::MercenaryEquipment(i) => write!(f, "mercenary #{i} equipment"),
            Self::TowedObjects => f.write_str("towed objects"),
            Self::StationMarket(i) => write!(f, "station #{i} market"),
            Self::ArenaMarket => f.write_str("arena market"),
            Self::SectorDriftingObjects(i) => write!(f, "sector #{i} drifting objects"),
            Self::LastSectorDriftingObjects => f.write_str("last sector drifting objects"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCount {
    pub site: ContainerSite,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveOverview {
    pub ships: usize,
    pub ship_loadouts: usize,
    pub crew_members: usize,
    pub mercenaries: usize,
    pub stations: usize,
    pub stations_with_market: usize,
    pub sectors: usize,
    pub towed_objects: usize,
    pub has_arena_market: bool,
    pub has_last_sector: bool,
    pub cargo_entries: usize,
    pub equipment_entries: usize,
    pub market_entries: usize,
    pub drifting_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_of_kind_treats_absent_list_as_empty() {
        assert!(subset_of_kind(None, ItemKind::Equipment).is_empty());
        assert!(subset_of_kind(Some(&[][..]), ItemKind::Equipment).is_empty());
    }

    #[test]
    fn subset_of_kind_keeps_batch_order() {
        let requests = [
            MutationRequest::remove(ItemKind::Equipment, 3),
            MutationRequest::remove(ItemKind::GenericItem, 3),
            MutationRequest::remove(ItemKind::Equipment, 1),
        ];
        let subset = subset_of_kind(Some(&requests[..]), ItemKind::Equipment);
        assert_eq!(subset, vec![requests[0], requests[2]]);
    }

    #[test]
    fn only_equipment_reaches_bare_id_containers() {
        assert!(classify(ItemKind::Equipment).covers(ContainerClass::BareId));
        assert!(classify(ItemKind::Equipment).covers(ContainerClass::Kinded));
        assert!(!classify(ItemKind::GenericItem).covers(ContainerClass::BareId));
        assert!(!classify(ItemKind::Weapon).covers(ContainerClass::BareId));
        assert!(classify(ItemKind::Ship).covers(ContainerClass::Kinded));
    }

    #[test]
    fn installed_equipment_sites_are_bare_id() {
        assert_eq!(ContainerSite::CrewEquipment(2).class(), ContainerClass::BareId);
        assert_eq!(ContainerSite::CrewCargo(2).class(), ContainerClass::Kinded);
        assert_eq!(ContainerSite::LastSectorDriftingObjects.class(), ContainerClass::Kinded);
        assert_eq!(ContainerSite::StationMarket(3).to_string(), "station #3 market");
    }

    #[test]
    fn overview_json_rejects_unknown_fields() {
        let json = serde_json::to_value(SaveOverview::default()).expect("serialize overview");
        assert_eq!(json["has_last_sector"], false);

        let mut with_extra = json.clone();
        with_extra["unexpected"] = serde_json::Value::from(1);
        assert!(serde_json::from_value::<SaveOverview>(with_extra).is_err());
        assert_eq!(
            serde_json::from_value::<SaveOverview>(json).expect("round trip"),
            SaveOverview::default()
        );
    }
}
