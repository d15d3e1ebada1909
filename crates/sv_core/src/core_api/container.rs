use crate::game_data::{CargoItem, DriftingObject, InstalledEquipment, MarketItem, TowedObject};
use crate::item_kind::ItemKind;

use super::types::{ContainerClass, MutationRequest};

/// An entry tagged with an item kind and an item id.
pub trait KindedEntry {
    fn item_type(&self) -> i32;
    fn item_id(&self) -> i32;
    fn set_item_id(&mut self, item_id: i32);
}

/// An entry keyed by equipment id alone.
pub trait BareIdEntry {
    fn equipment_id(&self) -> i32;
    fn set_equipment_id(&mut self, equipment_id: i32);
}

/// A list of item references that can be filtered or retargeted in place.
pub trait MutableItemContainer {
    fn class(&self) -> ContainerClass;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count_matching(&self, request: &MutationRequest) -> usize;

    /// Deletes every entry matched by any request. Returns the number deleted.
    fn remove_matching(&mut self, requests: &[MutationRequest]) -> usize;

    /// Applies each request in batch order as a full pass over the entries,
    /// so `5 -> 6, 6 -> 7` ends at 7. Returns the number of rewrites.
    fn replace_matching(&mut self, requests: &[MutationRequest]) -> usize;
}

pub struct KindedContainer<'a, T> {
    entries: &'a mut Vec<T>,
}

impl<'a, T: KindedEntry> KindedContainer<'a, T> {
    pub fn new(entries: &'a mut Vec<T>) -> Self {
        Self { entries }
    }

    fn matches(entry: &T, request: &MutationRequest) -> bool {
        entry.item_type() == request.kind.raw() && entry.item_id() == request.target_id
    }
}

impl<T: KindedEntry> MutableItemContainer for KindedContainer<'_, T> {
    fn class(&self) -> ContainerClass {
        ContainerClass::Kinded
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn count_matching(&self, request: &MutationRequest) -> usize {
        self.entries
            .iter()
            .filter(|entry| Self::matches(entry, request))
            .count()
    }

    fn remove_matching(&mut self, requests: &[MutationRequest]) -> usize {
        retain_unmatched(self.entries, requests, Self::matches)
    }

    fn replace_matching(&mut self, requests: &[MutationRequest]) -> usize {
        retarget_matched(self.entries, requests, Self::matches, T::set_item_id)
    }
}

pub struct BareIdContainer<'a, T> {
    entries: &'a mut Vec<T>,
}

impl<'a, T: BareIdEntry> BareIdContainer<'a, T> {
    pub fn new(entries: &'a mut Vec<T>) -> Self {
        Self { entries }
    }

    fn matches(entry: &T, request: &MutationRequest) -> bool {
        request.kind == ItemKind::Equipment && entry.equipment_id() == request.target_id
    }
}

impl<T: BareIdEntry> MutableItemContainer for BareIdContainer<'_, T> {
    fn class(&self) -> ContainerClass {
        ContainerClass::BareId
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn count_matching(&self, request: &MutationRequest) -> usize {
        self.entries
            .iter()
            .filter(|entry| Self::matches(entry, request))
            .count()
    }

    fn remove_matching(&mut self, requests: &[MutationRequest]) -> usize {
        retain_unmatched(self.entries, requests, Self::matches)
    }

    fn replace_matching(&mut self, requests: &[MutationRequest]) -> usize {
        retarget_matched(
            self.entries,
            requests,
            Self::matches,
            T::set_equipment_id,
        )
    }
}

fn retain_unmatched<T>(
    entries: &mut Vec<T>,
    requests: &[MutationRequest],
    matches: impl Fn(&T, &MutationRequest) -> bool,
) -> usize {
    let before = entries.len();
    entries.retain(|entry| !requests.iter().any(|request| matches(entry, request)));
    before - entries.len()
}

fn retarget_matched<T>(
    entries: &mut [T],
    requests: &[MutationRequest],
    matches: impl Fn(&T, &MutationRequest) -> bool,
    set_id: impl Fn(&mut T, i32),
) -> usize {
    let mut replaced = 0;
    for request in requests {
        for entry in entries.iter_mut() {
            if matches(&*entry, request) {
                set_id(entry, request.new_id);
                replaced += 1;
            }
        }
    }
    replaced
}

impl KindedEntry for CargoItem {
    fn item_type(&self) -> i32 {
        self.item_type
    }

    fn item_id(&self) -> i32 {
        self.item_id
    }

    fn set_item_id(&mut self, item_id: i32) {
        self.item_id = item_id;
    }
}

impl KindedEntry for MarketItem {
    fn item_type(&self) -> i32 {
        self.item_type
    }

    fn item_id(&self) -> i32 {
        self.item_id
    }

    fn set_item_id(&mut self, item_id: i32) {
        self.item_id = item_id;
    }
}

impl KindedEntry for DriftingObject {
    fn item_type(&self) -> i32 {
        self.item_type
    }

    fn item_id(&self) -> i32 {
        self.item_id
    }

    fn set_item_id(&mut self, item_id: i32) {
        self.item_id = item_id;
    }
}

// Towed objects are matched through the drifting object they carry.
impl KindedEntry for TowedObject {
    fn item_type(&self) -> i32 {
        self.drifting_object.item_type
    }

    fn item_id(&self) -> i32 {
        self.drifting_object.item_id
    }

    fn set_item_id(&mut self, item_id: i32) {
        self.drifting_object.item_id = item_id;
    }
}

impl BareIdEntry for InstalledEquipment {
    fn equipment_id(&self) -> i32 {
        self.equipment_id
    }

    fn set_equipment_id(&mut self, equipment_id: i32) {
        self.equipment_id = equipment_id;
    }
}
