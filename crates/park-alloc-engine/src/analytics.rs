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

use crate::config::AnalyticsConfig;
use chrono::Timelike;
use park_alloc_core::{
    id::ZoneId,
    penalty::Penalty,
    ratio::{percent, rounded_mean},
    time::Timestamp,
};
use park_alloc_model::{
    request::{ParkingRequest, RequestStatus},
    slot::{Slot, SlotStatus},
    zone::{Zone, ZoneMap},
};
use serde::Serialize;
use tracing::{instrument, trace};

pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SlotStatusCounts {
    pub available: usize,
    pub allocated: usize,
    pub occupied: usize,
    pub released: usize,
}

impl SlotStatusCounts {
    fn tally<'a>(slots: impl Iterator<Item = &'a Slot>) -> Self {
        let mut counts = Self::default();
        for slot in slots {
            match slot.status() {
                SlotStatus::Available => counts.available += 1,
                SlotStatus::Allocated => counts.allocated += 1,
                SlotStatus::Occupied => counts.occupied += 1,
                SlotStatus::Released => counts.released += 1,
            }
        }
        counts
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.available + self.allocated + self.occupied + self.released
    }

    /// Slots that are neither AVAILABLE nor RELEASED.
    #[inline]
    pub fn in_use(&self) -> usize {
        self.allocated + self.occupied
    }

    #[inline]
    pub fn get(&self, status: SlotStatus) -> usize {
        match status {
            SlotStatus::Available => self.available,
            SlotStatus::Allocated => self.allocated,
            SlotStatus::Occupied => self.occupied,
            SlotStatus::Released => self.released,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakZone {
    pub zone: ZoneId,
    pub code: String,
    pub allocations: usize,
}

/// City-wide snapshot. Recomputed from scratch on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub generated_at: Timestamp,
    pub total_requests: usize,
    pub allocated_requests: usize,
    pub occupied_requests: usize,
    pub average_duration_minutes: u64,
    pub utilization_percent: u32,
    pub peak_zones: Vec<PeakZone>,
    pub cancellation_percent: u32,
    pub cross_zone_allocations: usize,
    pub total_penalties: Penalty,
    pub requests_by_hour: [usize; HOURS_PER_DAY],
    pub slot_status: SlotStatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAnalytics {
    pub zone: ZoneId,
    pub code: String,
    pub name: String,
    pub total_slots: usize,
    pub available: usize,
    pub allocated: usize,
    pub occupied: usize,
    pub utilization_percent: u32,
    /// Requests served by this zone, whatever their current status.
    pub allocated_requests: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    #[instrument(level = "debug", skip_all, fields(zones = zones.len()))]
    pub fn snapshot<'a, I>(&self, zones: &ZoneMap, requests: I, at: Timestamp) -> Analytics
    where
        I: IntoIterator<Item = &'a ParkingRequest>,
    {
        let mut total_requests = 0usize;
        let mut allocated_requests = 0usize;
        let mut occupied_requests = 0usize;
        let mut cancelled = 0usize;
        let mut duration_sum = 0u64;
        let mut duration_count = 0usize;
        let mut cross_zone_allocations = 0usize;
        let mut total_penalties = Penalty::ZERO;
        let mut requests_by_hour = [0usize; HOURS_PER_DAY];
        // encounter order decides ties
        let mut per_zone: Vec<(ZoneId, usize)> = Vec::new();

        for request in requests {
            total_requests += 1;
            match request.status() {
                RequestStatus::Allocated => allocated_requests += 1,
                RequestStatus::Occupied => occupied_requests += 1,
                RequestStatus::Cancelled => cancelled += 1,
                RequestStatus::Released => {
                    if let Some(d) = request.duration_minutes() {
                        duration_sum += d;
                        duration_count += 1;
                    }
                }
                RequestStatus::Requested => {}
            }
            if request.is_cross_zone() {
                cross_zone_allocations += 1;
            }
            total_penalties += request.penalty();

            let hour = request
                .created_at()
                .with_timezone(&self.config.hour_offset)
                .hour() as usize;
            requests_by_hour[hour % HOURS_PER_DAY] += 1;

            if let Some(zone) = request.allocated_zone() {
                match per_zone.iter_mut().find(|(id, _)| *id == zone) {
                    Some((_, n)) => *n += 1,
                    None => per_zone.push((zone, 1)),
                }
            }
        }

        // stable: equal counts keep encounter order
        per_zone.sort_by(|a, b| b.1.cmp(&a.1));
        let peak_zones = per_zone
            .into_iter()
            .take(self.config.peak_zone_limit)
            .map(|(zone, allocations)| PeakZone {
                zone,
                code: zones
                    .get(zone)
                    .map(|z| z.code().to_string())
                    .unwrap_or_default(),
                allocations,
            })
            .collect();

        let slot_status = SlotStatusCounts::tally(zones.iter_slots());
        trace!(total_requests, slots = slot_status.total(), "Scanned state");

        Analytics {
            generated_at: at,
            total_requests,
            allocated_requests,
            occupied_requests,
            average_duration_minutes: rounded_mean(duration_sum, duration_count),
            utilization_percent: percent(slot_status.in_use(), slot_status.total()),
            peak_zones,
            cancellation_percent: percent(cancelled, total_requests),
            cross_zone_allocations,
            total_penalties,
            requests_by_hour,
            slot_status,
        }
    }

    #[instrument(level = "debug", skip_all, fields(zone = %zone.id()))]
    pub fn zone_snapshot<'a, I>(&self, zone: &Zone, requests: I) -> ZoneAnalytics
    where
        I: IntoIterator<Item = &'a ParkingRequest>,
    {
        let counts = SlotStatusCounts::tally(zone.iter_slots());
        let allocated_requests = requests
            .into_iter()
            .filter(|r| r.allocated_zone() == Some(zone.id()))
            .count();

        ZoneAnalytics {
            zone: zone.id(),
            code: zone.code().to_string(),
            name: zone.name().to_string(),
            total_slots: counts.total(),
            available: counts.available + counts.released,
            allocated: counts.allocated,
            occupied: counts.occupied,
            utilization_percent: percent(counts.in_use(), counts.total()),
            allocated_requests,
        }
    }
}
