use sv_core::core_api::{
    ContainerSite, MutationRequest, SiteCount, overview, reference_counts, remove_equipment,
    remove_objects, replace_equipment, replace_objects,
};
use sv_core::game_data::{
    AiCharacter, ArenaData, CargoItem, CrewMember, DriftingObject, InstalledEquipment,
    MarketItem, Mercenary, PlayerCharacter, RARITY_COMMON, SaveState, Sector, ShipLoadout,
    SpaceShipData, Station, TowedObject,
};
use sv_core::item_kind::ItemKind;

fn ship(cargo: Vec<CargoItem>, equipments: Vec<InstalledEquipment>) -> SpaceShipData {
    SpaceShipData {
        ship_model_id: 1,
        cargo: Some(cargo),
        equipments: Some(equipments),
    }
}

fn market(entries: &[(ItemKind, i32)]) -> Option<Vec<MarketItem>> {
    Some(
        entries
            .iter()
            .map(|&(kind, id)| MarketItem::new(kind, id, RARITY_COMMON, 3))
            .collect(),
    )
}

fn station(id: i32, entries: &[(ItemKind, i32)]) -> Station {
    Station {
        id,
        name: format!("Station {id}"),
        level: 1,
        market: market(entries),
    }
}

fn sector(id: i32, objects: Vec<DriftingObject>) -> Sector {
    Sector {
        id,
        drifting_objects: Some(objects),
    }
}

/// A save with item 5 and equipment 5 spread over every container site.
fn populated_state() -> SaveState {
    let drifting = vec![
        DriftingObject::new(ItemKind::GenericItem, 5, 2),
        DriftingObject::new(ItemKind::Equipment, 5, 1),
    ];

    SaveState {
        space_ship_data: Some(ship(
            vec![
                CargoItem::new(ItemKind::GenericItem, 5, 10),
                CargoItem::new(ItemKind::Equipment, 5, 1),
            ],
            vec![InstalledEquipment::new(5), InstalledEquipment::new(6)],
        )),
        ship_loadouts: Some(vec![ShipLoadout {
            name: "Hauler".to_string(),
            data: Some(ship(
                vec![CargoItem::new(ItemKind::GenericItem, 5, 1)],
                vec![InstalledEquipment::new(5)],
            )),
        }]),
        crew: Some(vec![CrewMember {
            id: 1,
            ai_char: Some(AiCharacter {
                name: "Vex".to_string(),
                ship_data: Some(ship(Vec::new(), vec![InstalledEquipment::new(5)])),
            }),
        }]),
        character: Some(PlayerCharacter {
            name: "Captain".to_string(),
            level: 12,
            mercenaries: Some(vec![Mercenary {
                name: "Rook".to_string(),
                ship_data: Some(ship(
                    vec![CargoItem::new(ItemKind::GenericItem, 5, 1)],
                    Vec::new(),
                )),
            }]),
        }),
        towed_objects: Some(vec![TowedObject {
            drifting_object: DriftingObject::new(ItemKind::GenericItem, 5, 1),
        }]),
        station_list: Some(vec![
            station(1, &[(ItemKind::GenericItem, 5)]),
            station(2, &[(ItemKind::Equipment, 5)]),
        ]),
        arena_data: Some(ArenaData {
            curr_market: market(&[(ItemKind::Equipment, 5), (ItemKind::Weapon, 5)]),
        }),
        sectors: Some(vec![sector(3, drifting.clone())]),
        last_sector: Some(sector(3, drifting)),
    }
}

#[test]
fn remove_item_leaves_equipment_with_same_id_in_markets() {
    let mut state = SaveState {
        station_list: Some(vec![
            station(1, &[(ItemKind::GenericItem, 5)]),
            station(2, &[(ItemKind::Equipment, 5)]),
        ]),
        ..SaveState::default()
    };

    let report = remove_objects(
        &mut state,
        &[MutationRequest::remove(ItemKind::GenericItem, 5)],
    );

    assert_eq!(report.removed, 1);
    let stations = state.station_list.as_ref().expect("stations kept");
    assert_eq!(stations[0].market, Some(Vec::new()));
    assert_eq!(stations[1].market, market(&[(ItemKind::Equipment, 5)]));
}

#[test]
fn replace_skips_crew_members_without_ship_data() {
    let mut state = SaveState {
        crew: Some(vec![
            CrewMember {
                id: 1,
                ai_char: Some(AiCharacter {
                    name: "Idle".to_string(),
                    ship_data: None,
                }),
            },
            CrewMember {
                id: 2,
                ai_char: Some(AiCharacter {
                    name: "Pilot".to_string(),
                    ship_data: Some(ship(
                        vec![CargoItem::new(ItemKind::GenericItem, 9, 4)],
                        Vec::new(),
                    )),
                }),
            },
        ]),
        ..SaveState::default()
    };

    let report = replace_objects(
        &mut state,
        &[MutationRequest::replace(ItemKind::GenericItem, 9, 20)],
    );

    assert_eq!(report.replaced, 1);
    let crew = state.crew.as_ref().expect("crew kept");
    assert!(crew[0].ai_char.as_ref().is_some_and(|c| c.ship_data.is_none()));
    let cargo = crew[1]
        .ai_char
        .as_ref()
        .and_then(|c| c.ship_data.as_ref())
        .and_then(|s| s.cargo.as_ref())
        .expect("pilot cargo");
    assert_eq!(cargo, &vec![CargoItem::new(ItemKind::GenericItem, 20, 4)]);
}

#[test]
fn remove_equipment_reaches_every_container_and_last_sector_copy() {
    let mut state = populated_state();

    let report = remove_equipment(&mut state, 5);

    // Ship cargo 1, installed 3, station 1, arena 1, sector 1, last sector 1.
    assert_eq!(report.removed, 8);
    assert!(reference_counts(&mut state, ItemKind::Equipment, 5).is_empty());

    let last = state.last_sector.as_ref().and_then(|s| s.drifting_objects.as_ref());
    assert_eq!(
        last,
        Some(&vec![DriftingObject::new(ItemKind::GenericItem, 5, 2)])
    );
    let player = state.space_ship_data.as_ref().expect("player ship");
    assert_eq!(player.equipments, Some(vec![InstalledEquipment::new(6)]));
    assert_eq!(
        player.cargo,
        Some(vec![CargoItem::new(ItemKind::GenericItem, 5, 10)])
    );
}

#[test]
fn generic_requests_never_touch_installed_equipment() {
    let mut state = populated_state();
    let installed_before = overview(&state).equipment_entries;

    let report = remove_objects(
        &mut state,
        &[MutationRequest::remove(ItemKind::GenericItem, 5)],
    );

    assert_eq!(overview(&state).equipment_entries, installed_before);
    // Cargo 3, towed 1, station 1, sector 1, last sector 1.
    assert_eq!(report.removed, 7);
    assert!(state.towed_objects.as_ref().is_some_and(Vec::is_empty));
}

#[test]
fn remove_is_idempotent() {
    let mut state = populated_state();
    let requests = [
        MutationRequest::remove(ItemKind::GenericItem, 5),
        MutationRequest::remove(ItemKind::Equipment, 5),
    ];

    remove_objects(&mut state, &requests);
    let once = state.clone();
    let second = remove_objects(&mut state, &requests);

    assert_eq!(second.removed, 0);
    assert_eq!(state, once);
}

#[test]
fn replace_equipment_updates_installed_ids_in_place() {
    let mut state = populated_state();

    let report = replace_equipment(&mut state, 5, 50);

    assert_eq!(report.replaced, 8);
    let player = state.space_ship_data.as_ref().expect("player ship");
    assert_eq!(
        player.equipments,
        Some(vec![InstalledEquipment::new(50), InstalledEquipment::new(6)])
    );
    assert_eq!(
        reference_counts(&mut state, ItemKind::Equipment, 50),
        vec![
            SiteCount {
                site: ContainerSite::PlayerShipCargo,
                count: 1
            },
            SiteCount {
                site: ContainerSite::PlayerShipEquipment,
                count: 1
            },
            SiteCount {
                site: ContainerSite::LoadoutEquipment(0),
                count: 1
            },
            SiteCount {
                site: ContainerSite::CrewEquipment(0),
                count: 1
            },
            SiteCount {
                site: ContainerSite::StationMarket(1),
                count: 1
            },
            SiteCount {
                site: ContainerSite::ArenaMarket,
                count: 1
            },
            SiteCount {
                site: ContainerSite::SectorDriftingObjects(0),
                count: 1
            },
            SiteCount {
                site: ContainerSite::LastSectorDriftingObjects,
                count: 1
            },
        ]
    );
}

#[test]
fn weapon_entries_are_matched_by_kind_tag() {
    let mut state = populated_state();

    let report = replace_objects(
        &mut state,
        &[MutationRequest::replace(ItemKind::Weapon, 5, 8)],
    );

    assert_eq!(report.replaced, 1);
    let arena = state
        .arena_data
        .as_ref()
        .and_then(|a| a.curr_market.as_ref())
        .expect("arena market");
    assert_eq!(arena[0].item_id, 5);
    assert_eq!(arena[1].item_id, 8);
    assert_eq!(arena[1].item_type, ItemKind::Weapon.raw());
}

#[test]
fn overview_counts_reachable_containers() {
    let summary = overview(&populated_state());

    assert_eq!(summary.ships, 4);
    assert_eq!(summary.ship_loadouts, 1);
    assert_eq!(summary.crew_members, 1);
    assert_eq!(summary.mercenaries, 1);
    assert_eq!(summary.stations, 2);
    assert_eq!(summary.stations_with_market, 2);
    assert_eq!(summary.sectors, 1);
    assert_eq!(summary.towed_objects, 1);
    assert!(summary.has_arena_market);
    assert!(summary.has_last_sector);
    assert_eq!(summary.cargo_entries, 4);
    assert_eq!(summary.equipment_entries, 4);
    assert_eq!(summary.market_entries, 4);
    assert_eq!(summary.drifting_entries, 2);
}

#[test]
fn replace_batch_applies_requests_in_order() {
    let mut state = SaveState {
        space_ship_data: Some(ship(
            vec![CargoItem::new(ItemKind::GenericItem, 5, 1)],
            Vec::new(),
        )),
        ..SaveState::default()
    };

    replace_objects(
        &mut state,
        &[
            MutationRequest::replace(ItemKind::GenericItem, 5, 6),
            MutationRequest::replace(ItemKind::GenericItem, 6, 7),
        ],
    );

    let cargo = state
        .space_ship_data
        .and_then(|s| s.cargo)
        .expect("player cargo");
    assert_eq!(cargo, vec![CargoItem::new(ItemKind::GenericItem, 7, 1)]);
}
