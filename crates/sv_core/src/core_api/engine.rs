use log::debug;

use crate::game_data::{SaveState, SpaceShipData};
use crate::item_kind::ItemKind;

use super::container::{
    BareIdContainer, BareIdEntry, KindedContainer, KindedEntry, MutableItemContainer,
};
use super::types::{
    ContainerClass, ContainerSite, MutationReport, MutationRequest, OperationMode, SaveOverview,
    SiteCount, subset_of_kind,
};

/// A container found in the save graph, tagged with where it lives.
pub struct ContainerSlot<'a> {
    pub site: ContainerSite,
    pub container: Box<dyn MutableItemContainer + 'a>,
}

impl<'a> ContainerSlot<'a> {
    fn kinded<T>(site: ContainerSite, entries: &'a mut Vec<T>) -> Self
    where
        T: KindedEntry + 'a,
    {
        Self {
            site,
            container: Box::new(KindedContainer::new(entries)),
        }
    }

    fn bare_id<T>(site: ContainerSite, entries: &'a mut Vec<T>) -> Self
    where
        T: BareIdEntry + 'a,
    {
        Self {
            site,
            container: Box::new(BareIdContainer::new(entries)),
        }
    }
}

type SlotCollector = for<'a> fn(&'a mut SaveState) -> Vec<ContainerSlot<'a>>;

// Every place an item reference can live, in traversal order. Ships first,
// then towed objects, markets, and sectors.
const CONTAINER_REGISTRY: &[SlotCollector] = &[
    player_ship,
    stored_loadouts,
    crew_ships,
    mercenary_ships,
    towed_objects,
    station_markets,
    arena_market,
    sector_drifting_objects,
    last_sector_drifting_objects,
];

/// Applies `requests` to every container in `state`.
///
/// Kinded containers (cargo, markets, towed and drifting objects) receive the
/// whole batch and match on kind and id. Installed-equipment lists receive
/// only the equipment requests and match on id.
pub fn remove_or_replace(
    mode: OperationMode,
    state: &mut SaveState,
    requests: &[MutationRequest],
) -> MutationReport {
    let mut report = MutationReport::new(mode);
    if requests.is_empty() {
        return report;
    }

    let kinded_requests: Vec<MutationRequest> = requests
        .iter()
        .filter(|request| request.scope().covers(ContainerClass::Kinded))
        .copied()
        .collect();
    let equipment_requests = subset_of_kind(Some(requests), ItemKind::Equipment);

    for collect in CONTAINER_REGISTRY {
        for mut slot in collect(&mut *state) {
            let applicable = match slot.container.class() {
                ContainerClass::Kinded => &kinded_requests,
                ContainerClass::BareId => &equipment_requests,
            };
            if applicable.is_empty() || slot.container.is_empty() {
                continue;
            }

            report.containers_visited += 1;
            let changed = match mode {
                OperationMode::Remove => {
                    let removed = slot.container.remove_matching(applicable);
                    report.removed += removed;
                    removed
                }
                OperationMode::Replace => {
                    let replaced = slot.container.replace_matching(applicable);
                    report.replaced += replaced;
                    replaced
                }
            };
            if changed > 0 {
                debug!("{} {changed} entries in {}", mode.as_str(), slot.site);
            }
        }
    }

    report
}

pub fn remove_objects(state: &mut SaveState, requests: &[MutationRequest]) -> MutationReport {
    remove_or_replace(OperationMode::Remove, state, requests)
}

pub fn replace_objects(state: &mut SaveState, requests: &[MutationRequest]) -> MutationReport {
    remove_or_replace(OperationMode::Replace, state, requests)
}

/// Counts entries matching `kind` and `item_id` per container site. Sites
/// without a match are left out.
///
/// Takes `&mut` because it walks the same registry as the mutating
/// traversal, whose collectors hand out mutable container views. Nothing is
/// modified.
pub fn reference_counts(state: &mut SaveState, kind: ItemKind, item_id: i32) -> Vec<SiteCount> {
    let probe = MutationRequest::remove(kind, item_id);
    let mut counts = Vec::new();

    for collect in CONTAINER_REGISTRY {
        for slot in collect(&mut *state) {
            if !probe.scope().covers(slot.container.class()) {
                continue;
            }
            let count = slot.container.count_matching(&probe);
            if count > 0 {
                counts.push(SiteCount {
                    site: slot.site,
                    count,
                });
            }
        }
    }

    counts
}

pub fn overview(state: &SaveState) -> SaveOverview {
    let mut out = SaveOverview::default();

    for ship in reachable_ships(state) {
        out.ships += 1;
        out.cargo_entries += ship.cargo.as_ref().map_or(0, Vec::len);
        out.equipment_entries += ship.equipments.as_ref().map_or(0, Vec::len);
    }

    out.ship_loadouts = state.ship_loadouts.as_ref().map_or(0, Vec::len);
    out.crew_members = state.crew.as_ref().map_or(0, Vec::len);
    out.mercenaries = state
        .character
        .as_ref()
        .and_then(|c| c.mercenaries.as_ref())
        .map_or(0, Vec::len);
    out.towed_objects = state.towed_objects.as_ref().map_or(0, Vec::len);

    for station in state.station_list.iter().flatten() {
        out.stations += 1;
        if let Some(market) = &station.market {
            out.stations_with_market += 1;
            out.market_entries += market.len();
        }
    }

    if let Some(market) = state.arena_data.as_ref().and_then(|a| a.curr_market.as_ref()) {
        out.has_arena_market = true;
        out.market_entries += market.len();
    }

    for sector in state.sectors.iter().flatten() {
        out.sectors += 1;
        out.drifting_entries += sector.drifting_objects.as_ref().map_or(0, Vec::len);
    }

    out.has_last_sector = state.last_sector.is_some();
    out
}

fn reachable_ships(state: &SaveState) -> impl Iterator<Item = &SpaceShipData> {
    let loadouts = state
        .ship_loadouts
        .iter()
        .flatten()
        .filter_map(|loadout| loadout.data.as_ref());
    let crew = state
        .crew
        .iter()
        .flatten()
        .filter_map(|member| member.ai_char.as_ref()?.ship_data.as_ref());
    let mercenaries = state
        .character
        .as_ref()
        .and_then(|c| c.mercenaries.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|merc| merc.ship_data.as_ref());

    state
        .space_ship_data
        .iter()
        .chain(loadouts)
        .chain(crew)
        .chain(mercenaries)
}

fn ship_slots<'a>(
    ship: &'a mut SpaceShipData,
    cargo_site: ContainerSite,
    equipment_site: ContainerSite,
    slots: &mut Vec<ContainerSlot<'a>>,
) {
    if let Some(cargo) = ship.cargo.as_mut() {
        slots.push(ContainerSlot::kinded(cargo_site, cargo));
    }
    if let Some(equipments) = ship.equipments.as_mut() {
        slots.push(ContainerSlot::bare_id(equipment_site, equipments));
    }
}

fn player_ship(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    let mut slots = Vec::new();
    if let Some(ship) = state.space_ship_data.as_mut() {
        ship_slots(
            ship,
            ContainerSite::PlayerShipCargo,
            ContainerSite::PlayerShipEquipment,
            &mut slots,
        );
    }
    slots
}

fn stored_loadouts(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    let mut slots = Vec::new();
    for (index, loadout) in state.ship_loadouts.iter_mut().flatten().enumerate() {
        if let Some(ship) = loadout.data.as_mut() {
            ship_slots(
                ship,
                ContainerSite::LoadoutCargo(index),
                ContainerSite::LoadoutEquipment(index),
                &mut slots,
            );
        }
    }
    slots
}

fn crew_ships(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    let mut slots = Vec::new();
    for (index, member) in state.crew.iter_mut().flatten().enumerate() {
        let ship = member
            .ai_char
            .as_mut()
            .and_then(|ai_char| ai_char.ship_data.as_mut());
        if let Some(ship) = ship {
            ship_slots(
                ship,
                ContainerSite::CrewCargo(index),
                ContainerSite::CrewEquipment(index),
                &mut slots,
            );
        }
    }
    slots
}

fn mercenary_ships(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    let mut slots = Vec::new();
    let mercenaries = state
        .character
        .as_mut()
        .and_then(|character| character.mercenaries.as_mut());
    for (index, merc) in mercenaries.into_iter().flatten().enumerate() {
        if let Some(ship) = merc.ship_data.as_mut() {
            ship_slots(
                ship,
                ContainerSite::MercenaryCargo(index),
                ContainerSite::MercenaryEquipment(index),
                &mut slots,
            );
        }
    }
    slots
}

fn towed_objects(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    state
        .towed_objects
        .as_mut()
        .map(|towed| ContainerSlot::kinded(ContainerSite::TowedObjects, towed))
        .into_iter()
        .collect()
}

fn station_markets(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    state
        .station_list
        .iter_mut()
        .flatten()
        .enumerate()
        .filter_map(|(index, station)| {
            let market = station.market.as_mut()?;
            Some(ContainerSlot::kinded(ContainerSite::StationMarket(index), market))
        })
        .collect()
}

fn arena_market(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    state
        .arena_data
        .as_mut()
        .and_then(|arena| arena.curr_market.as_mut())
        .map(|market| ContainerSlot::kinded(ContainerSite::ArenaMarket, market))
        .into_iter()
        .collect()
}

fn sector_drifting_objects(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    state
        .sectors
        .iter_mut()
        .flatten()
        .enumerate()
        .filter_map(|(index, sector)| {
            let objects = sector.drifting_objects.as_mut()?;
            Some(ContainerSlot::kinded(
                ContainerSite::SectorDriftingObjects(index),
                objects,
            ))
        })
        .collect()
}

// The cached last sector is a separate copy of one sector and does not see
// edits made through `sectors`, so it is mutated on its own.
fn last_sector_drifting_objects(state: &mut SaveState) -> Vec<ContainerSlot<'_>> {
    state
        .last_sector
        .as_mut()
        .and_then(|sector| sector.drifting_objects.as_mut())
        .map(|objects| ContainerSlot::kinded(ContainerSite::LastSectorDriftingObjects, objects))
        .into_iter()
        .collect()
}
