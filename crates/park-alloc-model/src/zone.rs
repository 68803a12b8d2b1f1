// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::{
    area::{Area, AreaSpec},
    slot::{Slot, SlotStatus},
    vehicle::VehicleClass,
};
use park_alloc_core::{
    id::{AreaId, SlotId, ZoneId},
    penalty::PenaltyMultiplier,
};
use serde::Serialize;
use std::{collections::BTreeMap, fmt::Display};

/// Declarative description of a zone, turned into a [`Zone`] by the layout builder.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, Serialize)]
pub struct ZoneSpec {
    pub name: String,
    pub code: String,
    pub color: String,
    pub penalty_multiplier: f64,
    pub areas: Vec<AreaSpec>,
}

impl ZoneSpec {
    pub fn new(name: impl Into<String>, code: impl Into<String>, penalty_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            color: "#8B5CF6".into(),
            penalty_multiplier,
            areas: Vec::new(),
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn area(mut self, area: AreaSpec) -> Self {
        self.areas.push(area);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    id: ZoneId,
    name: String,
    code: String,
    color: String,
    penalty_multiplier: PenaltyMultiplier,
    areas: Vec<Area>,
    adjacent: Vec<ZoneId>,
}

impl Zone {
    pub fn new(
        id: ZoneId,
        name: impl Into<String>,
        code: impl Into<String>,
        color: impl Into<String>,
        penalty_multiplier: PenaltyMultiplier,
        areas: Vec<Area>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
            color: color.into(),
            penalty_multiplier,
            areas,
            adjacent: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ZoneId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[inline]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[inline]
    pub fn penalty_multiplier(&self) -> PenaltyMultiplier {
        self.penalty_multiplier
    }

    #[inline]
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Directed neighbours, in the order they were added.
    #[inline]
    pub fn adjacent_zones(&self) -> &[ZoneId] {
        &self.adjacent
    }

    /// Adds a directed edge to `zone`. Self-loops and duplicates are ignored.
    pub fn add_adjacent_zone(&mut self, zone: ZoneId) -> bool {
        if zone == self.id || self.adjacent.contains(&zone) {
            return false;
        }
        self.adjacent.push(zone);
        true
    }

    #[inline]
    pub fn is_adjacent_to(&self, zone: ZoneId) -> bool {
        self.adjacent.contains(&zone)
    }

    pub fn find_available_slot(&self, class: VehicleClass) -> Option<&Slot> {
        self.areas
            .iter()
            .find_map(|a| a.find_available_slot(class))
    }

    pub fn find_available_slot_mut(&mut self, class: VehicleClass) -> Option<&mut Slot> {
        self.areas
            .iter_mut()
            .find_map(|a| a.find_available_slot_mut(class))
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| a.id() == id)
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.areas.iter().find_map(|a| a.slot(id))
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.areas.iter_mut().find_map(|a| a.slot_mut(id))
    }

    pub fn iter_slots(&self) -> impl Iterator<Item = &Slot> {
        self.areas.iter().flat_map(|a| a.slots().iter())
    }

    pub fn total_slots(&self) -> usize {
        self.areas.iter().map(Area::total_slots).sum()
    }

    pub fn total_available(&self) -> usize {
        self.areas.iter().map(Area::available_count).sum()
    }

    pub fn available_for(&self, class: VehicleClass) -> usize {
        self.areas.iter().map(|a| a.available_count_for(class)).sum()
    }

    pub fn count_with_status(&self, status: SlotStatus) -> usize {
        self.areas.iter().map(|a| a.count_with_status(status)).sum()
    }

    /// Used share in percent (unrounded).
    pub fn utilization(&self) -> f64 {
        let total = self.total_slots();
        if total == 0 {
            return 0.0;
        }
        (total - self.total_available()) as f64 / total as f64 * 100.0
    }
}

impl Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Zone(id: {}, code: {}, name: {}, areas: {}, slots: {}, multiplier: {})",
            self.id,
            self.code,
            self.name,
            self.areas.len(),
            self.total_slots(),
            self.penalty_multiplier
        )
    }
}

/// All zones of the city, iterated in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ZoneMap {
    zones: BTreeMap<ZoneId, Zone>,
}

impl ZoneMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zone: Zone) -> Option<Zone> {
        self.zones.insert(zone.id(), zone)
    }

    #[inline]
    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.get_mut(&id)
    }

    #[inline]
    pub fn contains(&self, id: ZoneId) -> bool {
        self.zones.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.keys().copied()
    }

    pub fn by_code(&self, code: &str) -> Option<&Zone> {
        self.zones.values().find(|z| z.code() == code)
    }

    /// Linear search over every zone.
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.zones.values().find_map(|z| z.slot(id))
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.zones.values_mut().find_map(|z| z.slot_mut(id))
    }

    pub fn iter_slots(&self) -> impl Iterator<Item = &Slot> {
        self.zones.values().flat_map(Zone::iter_slots)
    }

    pub fn total_slots(&self) -> usize {
        self.zones.values().map(Zone::total_slots).sum()
    }
}

impl<'a> IntoIterator for &'a ZoneMap {
    type Item = &'a Zone;
    type IntoIter = std::collections::btree_map::Values<'a, ZoneId, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{area::SlotMix, slot::SlotFeatures};
    use chrono::DateTime;
    use park_alloc_core::id::{IdSequence, RequestId};

    fn zone(id: u64, areas: &[(u32, SlotMix)], slot_ids: &mut IdSequence<SlotId>) -> Zone {
        let mut area_ids = IdSequence::<AreaId>::new();
        let zid = ZoneId::new(id);
        let built = areas
            .iter()
            .enumerate()
            .map(|(i, (n, mix))| {
                Area::build(
                    area_ids.next_id(),
                    zid,
                    &AreaSpec::new(format!("A{i}"), *n).with_mix(*mix),
                    slot_ids,
                    DateTime::UNIX_EPOCH,
                )
            })
            .collect();
        Zone::new(zid, "Z", format!("Z{id}"), "#000", PenaltyMultiplier::ONE, built)
    }

    #[test]
    fn test_adjacency_is_directed_and_deduplicated() {
        let mut ids = IdSequence::new();
        let mut z = zone(1, &[(1, SlotMix::default())], &mut ids);
        assert!(z.add_adjacent_zone(ZoneId::new(2)));
        assert!(!z.add_adjacent_zone(ZoneId::new(2)));
        assert!(!z.add_adjacent_zone(ZoneId::new(1)));
        assert!(z.add_adjacent_zone(ZoneId::new(3)));
        assert_eq!(z.adjacent_zones(), &[ZoneId::new(2), ZoneId::new(3)]);
        assert!(z.is_adjacent_to(ZoneId::new(3)));
        assert!(!z.is_adjacent_to(ZoneId::new(4)));
    }

    #[test]
    fn test_zone_first_fit_walks_areas_in_order() {
        let mut ids = IdSequence::new();
        let mut z = zone(
            1,
            &[
                (2, SlotMix::Uniform(VehicleClass::Motorcycle)),
                (2, SlotMix::Uniform(VehicleClass::Car)),
            ],
            &mut ids,
        );
        assert_eq!(z.total_slots(), 4);
        let first_car = z.find_available_slot(VehicleClass::Car).unwrap();
        assert_eq!(first_car.features(), SlotFeatures::standard(VehicleClass::Car));
        assert_eq!(first_car.area(), z.areas()[1].id());

        let t = DateTime::UNIX_EPOCH;
        z.find_available_slot_mut(VehicleClass::Motorcycle)
            .unwrap()
            .allocate(RequestId::new(1), t)
            .unwrap();
        assert_eq!(z.total_available(), 3);
        assert_eq!(z.count_with_status(SlotStatus::Allocated), 1);
        assert!((z.utilization() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_zone_map_iterates_in_creation_order_and_finds_slots() {
        let mut ids = IdSequence::new();
        let mut map = ZoneMap::new();
        map.insert(zone(2, &[(3, SlotMix::default())], &mut ids));
        map.insert(zone(1, &[(2, SlotMix::default())], &mut ids));
        let order: Vec<_> = map.ids().collect();
        assert_eq!(order, vec![ZoneId::new(1), ZoneId::new(2)]);
        assert_eq!(map.total_slots(), 5);

        // slots of zone 2 were minted first
        let s = map.slot(SlotId::new(1)).unwrap();
        assert_eq!(s.zone(), ZoneId::new(2));
        assert!(map.slot(SlotId::new(99)).is_none());
        assert_eq!(map.by_code("Z1").map(Zone::id), Some(ZoneId::new(1)));
    }
}
