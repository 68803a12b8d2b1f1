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
    slot::{Slot, SlotFeatures, SlotStatus},
    vehicle::VehicleClass,
};
use park_alloc_core::{
    id::{AreaId, IdSequence, SlotId, ZoneId},
    time::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Display-only placement of an area on the city map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AreaLocation {
    pub x: i32,
    pub y: i32,
}

impl AreaLocation {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// How many special-purpose slots an area gets. Whatever remains are car slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SlotCounts {
    pub handicapped: u32,
    pub electric: u32,
    pub truck: u32,
    pub motorcycle: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlotMix {
    /// 5% handicapped, 10% electric, 10% truck, 10% motorcycle, each rounded down.
    #[default]
    Proportional,
    Explicit(SlotCounts),
    /// Every slot is a plain slot of one class.
    Uniform(VehicleClass),
}

impl SlotMix {
    /// Feature list in slot-number order for an area of `total` slots.
    pub fn features(&self, total: u32) -> Vec<SlotFeatures> {
        let counts = match *self {
            SlotMix::Proportional => SlotCounts {
                handicapped: total * 5 / 100,
                electric: total * 10 / 100,
                truck: total * 10 / 100,
                motorcycle: total * 10 / 100,
            },
            SlotMix::Explicit(counts) => counts,
            SlotMix::Uniform(class) => {
                let features = match class {
                    VehicleClass::Electric => SlotFeatures::charging(),
                    other => SlotFeatures::standard(other),
                };
                return vec![features; total as usize];
            }
        };

        let groups = [
            (counts.handicapped, SlotFeatures::handicapped()),
            (counts.electric, SlotFeatures::charging()),
            (counts.truck, SlotFeatures::standard(VehicleClass::Truck)),
            (counts.motorcycle, SlotFeatures::standard(VehicleClass::Motorcycle)),
        ];

        let mut out = Vec::with_capacity(total as usize);
        for (n, features) in groups {
            for _ in 0..n {
                if out.len() == total as usize {
                    return out;
                }
                out.push(features);
            }
        }
        out.resize(total as usize, SlotFeatures::standard(VehicleClass::Car));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSpec {
    pub name: String,
    pub slot_count: u32,
    #[serde(default)]
    pub location: AreaLocation,
    #[serde(default)]
    pub mix: SlotMix,
}

impl AreaSpec {
    pub fn new(name: impl Into<String>, slot_count: u32) -> Self {
        Self {
            name: name.into(),
            slot_count,
            location: AreaLocation::default(),
            mix: SlotMix::default(),
        }
    }

    pub fn at(mut self, location: AreaLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_mix(mut self, mix: SlotMix) -> Self {
        self.mix = mix;
        self
    }
}

/// A lot or garage. The slot list is fixed at construction and doubles as the
/// search order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    id: AreaId,
    zone: ZoneId,
    name: String,
    location: AreaLocation,
    slots: Vec<Slot>,
}

impl Area {
    pub fn build(
        id: AreaId,
        zone: ZoneId,
        spec: &AreaSpec,
        slot_ids: &mut IdSequence<SlotId>,
        created_at: Timestamp,
    ) -> Self {
        let slots = spec
            .mix
            .features(spec.slot_count)
            .into_iter()
            .enumerate()
            .map(|(i, features)| {
                Slot::new(
                    slot_ids.next_id(),
                    id,
                    zone,
                    i as u32 + 1,
                    features,
                    created_at,
                )
            })
            .collect();

        Self {
            id,
            zone,
            name: spec.name.clone(),
            location: spec.location,
            slots,
        }
    }

    #[inline]
    pub fn id(&self) -> AreaId {
        self.id
    }

    #[inline]
    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn location(&self) -> AreaLocation {
        self.location
    }

    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[inline]
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn find_available_slot(&self, class: VehicleClass) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|s| s.is_available() && s.can_accommodate(class))
    }

    pub fn find_available_slot_mut(&mut self, class: VehicleClass) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|s| s.is_available() && s.can_accommodate(class))
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id() == id)
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id() == id)
    }

    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_available()).count()
    }

    pub fn available_count_for(&self, class: VehicleClass) -> usize {
        self.slots
            .iter()
            .filter(|s| s.is_available() && s.can_accommodate(class))
            .count()
    }

    pub fn count_with_status(&self, status: SlotStatus) -> usize {
        self.slots.iter().filter(|s| s.status() == status).count()
    }

    /// Share of slots that are allocated or occupied, in percent (unrounded).
    pub fn utilization(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }
        let used = self.slots.len() - self.available_count();
        used as f64 / self.slots.len() as f64 * 100.0
    }
}

impl Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Area(id: {}, name: {}, slots: {}, available: {})",
            self.id,
            self.name,
            self.slots.len(),
            self.available_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use park_alloc_core::id::RequestId;

    fn area(spec: AreaSpec) -> Area {
        let mut ids = IdSequence::new();
        Area::build(
            AreaId::new(1),
            ZoneId::new(1),
            &spec,
            &mut ids,
            DateTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_proportional_mix_of_twenty() {
        let a = area(AreaSpec::new("Garage", 20));
        let classes: Vec<_> = a.slots().iter().map(|s| s.features()).collect();
        assert_eq!(classes.len(), 20);
        // 1 handicapped, 2 electric, 2 truck, 2 motorcycle, 13 car
        assert_eq!(classes[0], SlotFeatures::handicapped());
        assert_eq!(classes[1], SlotFeatures::charging());
        assert_eq!(classes[2], SlotFeatures::charging());
        assert_eq!(classes[3], SlotFeatures::standard(VehicleClass::Truck));
        assert_eq!(classes[5], SlotFeatures::standard(VehicleClass::Motorcycle));
        assert!(
            classes[7..]
                .iter()
                .all(|f| *f == SlotFeatures::standard(VehicleClass::Car))
        );
        let numbers: Vec<u32> = a.slots().iter().map(|s| s.number()).collect();
        assert_eq!(numbers, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_explicit_counts_truncate_at_total() {
        let mix = SlotMix::Explicit(SlotCounts {
            handicapped: 2,
            electric: 5,
            truck: 0,
            motorcycle: 0,
        });
        let a = area(AreaSpec::new("Tiny", 4).with_mix(mix));
        assert_eq!(a.total_slots(), 4);
        assert_eq!(a.count_with_status(SlotStatus::Available), 4);
        assert_eq!(a.slots()[3].features(), SlotFeatures::charging());
    }

    #[test]
    fn test_first_fit_respects_order_and_class() {
        let mut a = area(AreaSpec::new("Lot", 20));
        let first_car = a.find_available_slot(VehicleClass::Car).unwrap().number();
        // handicapped car slot comes first
        assert_eq!(first_car, 1);
        let truck = a.find_available_slot(VehicleClass::Truck).unwrap().number();
        assert_eq!(truck, 4);

        let t = DateTime::UNIX_EPOCH;
        a.find_available_slot_mut(VehicleClass::Car)
            .unwrap()
            .allocate(RequestId::new(1), t)
            .unwrap();
        // slots 2 and 3 are electric, so the next car fit is the first truck slot
        assert_eq!(a.find_available_slot(VehicleClass::Car).unwrap().number(), 4);
    }

    #[test]
    fn test_counters_are_recomputed_on_demand() {
        let mut a = area(AreaSpec::new("Lot", 10).with_mix(SlotMix::Uniform(VehicleClass::Car)));
        assert_eq!(a.available_count(), 10);
        assert_eq!(a.utilization(), 0.0);
        let t = DateTime::UNIX_EPOCH;
        for i in 0..5 {
            a.find_available_slot_mut(VehicleClass::Car)
                .unwrap()
                .allocate(RequestId::new(i), t)
                .unwrap();
        }
        assert_eq!(a.available_count(), 5);
        assert_eq!(a.available_count_for(VehicleClass::Truck), 0);
        assert!((a.utilization() - 50.0).abs() < 1e-9);
    }
}
