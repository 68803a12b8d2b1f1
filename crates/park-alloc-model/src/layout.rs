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
    area::{Area, AreaLocation, AreaSpec},
    err::LayoutError,
    zone::{Zone, ZoneMap, ZoneSpec},
};
use park_alloc_core::{
    id::{AreaId, IdSequence, SlotId, ZoneId},
    penalty::PenaltyMultiplier,
    time::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Id sources for the static hierarchy. Shared across layouts so ids stay
/// unique when zones are added later.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIds {
    pub zones: IdSequence<ZoneId>,
    pub areas: IdSequence<AreaId>,
    pub slots: IdSequence<SlotId>,
}

impl HierarchyIds {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Declarative city: zones in creation order plus directed adjacency edges
/// given by zone code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLayout {
    pub zones: Vec<ZoneSpec>,
    pub adjacency: Vec<(String, String)>,
}

impl CityLayout {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            adjacency: Vec::new(),
        }
    }

    pub fn zone(mut self, zone: ZoneSpec) -> Self {
        self.zones.push(zone);
        self
    }

    /// Directed edge `from -> to`.
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.adjacency.push((from.into(), to.into()));
        self
    }

    pub fn total_slots(&self) -> u64 {
        self.zones
            .iter()
            .flat_map(|z| z.areas.iter())
            .map(|a| a.slot_count as u64)
            .sum()
    }

    /// Checks every zone spec and edge without minting ids.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut codes = HashSet::with_capacity(self.zones.len());
        for zone in &self.zones {
            if !codes.insert(zone.code.as_str()) {
                return Err(LayoutError::DuplicateZoneCode(zone.code.clone()));
            }
            PenaltyMultiplier::new(zone.penalty_multiplier).map_err(|source| {
                LayoutError::InvalidMultiplier {
                    zone_code: zone.code.clone(),
                    source,
                }
            })?;
            if zone.areas.is_empty() {
                return Err(LayoutError::NoAreas(zone.code.clone()));
            }
            if let Some(area) = zone.areas.iter().find(|a| a.slot_count == 0) {
                return Err(LayoutError::EmptyArea {
                    zone_code: zone.code.clone(),
                    area: area.name.clone(),
                });
            }
        }
        for (from, to) in &self.adjacency {
            for code in [from, to] {
                if !codes.contains(code.as_str()) {
                    return Err(LayoutError::UnknownZoneCode(code.clone()));
                }
            }
        }
        Ok(())
    }

    /// Materializes the layout. Nothing is minted from `ids` unless the
    /// whole layout is valid.
    pub fn build(&self, ids: &mut HierarchyIds, created_at: Timestamp) -> Result<ZoneMap, LayoutError> {
        self.validate()?;

        let mut map = ZoneMap::new();
        let mut by_code: HashMap<&str, ZoneId> = HashMap::with_capacity(self.zones.len());
        for spec in &self.zones {
            let zone_id = ids.zones.next_id();
            let multiplier = PenaltyMultiplier::new(spec.penalty_multiplier).map_err(|source| {
                LayoutError::InvalidMultiplier {
                    zone_code: spec.code.clone(),
                    source,
                }
            })?;
            let areas = spec
                .areas
                .iter()
                .map(|a| Area::build(ids.areas.next_id(), zone_id, a, &mut ids.slots, created_at))
                .collect();
            map.insert(Zone::new(
                zone_id,
                spec.name.as_str(),
                spec.code.as_str(),
                spec.color.as_str(),
                multiplier,
                areas,
            ));
            by_code.insert(spec.code.as_str(), zone_id);
        }

        for (from, to) in &self.adjacency {
            let (Some(&from_id), Some(&to_id)) = (by_code.get(from.as_str()), by_code.get(to.as_str()))
            else {
                return Err(LayoutError::UnknownZoneCode(format!("{from}->{to}")));
            };
            if let Some(zone) = map.get_mut(from_id) {
                zone.add_adjacent_zone(to_id);
            }
        }

        Ok(map)
    }
}

impl Default for CityLayout {
    /// Five-zone reference city with three areas per zone.
    fn default() -> Self {
        const ZONES: [(&str, &str, &str, f64); 5] = [
            ("Johar Town", "JT", "#8B5CF6", 1.0),
            ("Awan Town", "AT", "#6366F1", 1.2),
            ("UMT", "UMT", "#A855F7", 1.3),
            ("Gulburg", "GB", "#7C3AED", 1.4),
            ("Township", "TW", "#9333EA", 1.5),
        ];

        let zones = ZONES
            .iter()
            .enumerate()
            .map(|(i, &(name, code, color, multiplier))| {
                let x = i as i32 * 2;
                ZoneSpec::new(name, code, multiplier)
                    .color(color)
                    .area(AreaSpec::new(format!("{name} - Lot A"), 15).at(AreaLocation::new(x, 0)))
                    .area(AreaSpec::new(format!("{name} - Lot B"), 12).at(AreaLocation::new(x, 1)))
                    .area(
                        AreaSpec::new(format!("{name} - Garage"), 20)
                            .at(AreaLocation::new(x + 1, 0)),
                    )
            })
            .collect();

        let edges = [
            ("JT", "AT"),
            ("JT", "GB"),
            ("AT", "JT"),
            ("AT", "UMT"),
            ("AT", "TW"),
            ("UMT", "AT"),
            ("GB", "JT"),
            ("TW", "AT"),
        ];

        Self {
            zones,
            adjacency: edges
                .iter()
                .map(|&(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::SlotMix;
    use chrono::DateTime;

    #[test]
    fn test_reference_city_shape() {
        let layout = CityLayout::default();
        assert_eq!(layout.total_slots(), 5 * 47);

        let mut ids = HierarchyIds::new();
        let zones = layout.build(&mut ids, DateTime::UNIX_EPOCH).unwrap();
        assert_eq!(zones.len(), 5);
        assert_eq!(zones.total_slots(), 235);
        assert_eq!(ids.slots.issued(), 235);

        let jt = zones.by_code("JT").unwrap();
        let at = zones.by_code("AT").unwrap();
        let gb = zones.by_code("GB").unwrap();
        let umt = zones.by_code("UMT").unwrap();
        let tw = zones.by_code("TW").unwrap();
        assert_eq!(jt.adjacent_zones(), &[at.id(), gb.id()]);
        assert_eq!(at.adjacent_zones(), &[jt.id(), umt.id(), tw.id()]);
        assert!(!umt.is_adjacent_to(jt.id()));
        assert_eq!(at.penalty_multiplier().value(), 1.2);
        assert_eq!(jt.areas()[2].name(), "Johar Town - Garage");
        assert_eq!(jt.areas()[2].location(), AreaLocation::new(1, 0));
    }

    #[test]
    fn test_invalid_layouts_are_rejected() {
        let bad_multiplier = CityLayout::new().zone(
            ZoneSpec::new("Z", "Z", 0.5).area(AreaSpec::new("A", 1)),
        );
        assert!(matches!(
            bad_multiplier.validate(),
            Err(LayoutError::InvalidMultiplier { .. })
        ));

        let no_areas = CityLayout::new().zone(ZoneSpec::new("Z", "Z", 1.0));
        assert_eq!(no_areas.validate(), Err(LayoutError::NoAreas("Z".into())));

        let empty_area = CityLayout::new().zone(ZoneSpec::new("Z", "Z", 1.0).area(AreaSpec::new("A", 0)));
        assert!(matches!(empty_area.validate(), Err(LayoutError::EmptyArea { .. })));

        let dangling = CityLayout::new()
            .zone(ZoneSpec::new("Z", "Z", 1.0).area(AreaSpec::new("A", 1)))
            .edge("Z", "Q");
        assert_eq!(dangling.validate(), Err(LayoutError::UnknownZoneCode("Q".into())));

        let duplicate = CityLayout::new()
            .zone(ZoneSpec::new("Z", "Z", 1.0).area(AreaSpec::new("A", 1)))
            .zone(ZoneSpec::new("Y", "Z", 1.0).area(AreaSpec::new("A", 1)));
        assert_eq!(duplicate.validate(), Err(LayoutError::DuplicateZoneCode("Z".into())));
    }

    #[test]
    fn test_failed_build_mints_no_ids() {
        let mut ids = HierarchyIds::new();
        let layout = CityLayout::new()
            .zone(ZoneSpec::new("Z", "Z", 1.0).area(AreaSpec::new("A", 3)))
            .edge("Z", "nowhere");
        assert!(layout.build(&mut ids, DateTime::UNIX_EPOCH).is_err());
        assert_eq!(ids.zones.issued(), 0);
        assert_eq!(ids.slots.issued(), 0);
    }

    #[test]
    fn test_layouts_share_id_space() {
        let mut ids = HierarchyIds::new();
        let small = CityLayout::new().zone(
            ZoneSpec::new("Z", "Z", 1.0)
                .area(AreaSpec::new("A", 2).with_mix(SlotMix::Uniform(crate::vehicle::VehicleClass::Car))),
        );
        let a = small.build(&mut ids, DateTime::UNIX_EPOCH).unwrap();
        let b = small.build(&mut ids, DateTime::UNIX_EPOCH).unwrap();
        assert_eq!(a.ids().next(), Some(ZoneId::new(1)));
        assert_eq!(b.ids().next(), Some(ZoneId::new(2)));
        assert!(b.slot(SlotId::new(3)).is_some());
    }
}
