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
    err::{SlotAction, SlotTransitionError},
    vehicle::VehicleClass,
};
use park_alloc_core::{
    id::{AreaId, RequestId, SlotId, ZoneId},
    time::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Available,
    Allocated,
    Occupied,
    /// Previously used and free again.
    Released,
}

impl SlotStatus {
    pub const ALL: [SlotStatus; 4] = [
        SlotStatus::Available,
        SlotStatus::Allocated,
        SlotStatus::Occupied,
        SlotStatus::Released,
    ];

    #[inline]
    pub fn is_free(self) -> bool {
        matches!(self, SlotStatus::Available | SlotStatus::Released)
    }

    pub fn label(self) -> &'static str {
        match self {
            SlotStatus::Available => "Available",
            SlotStatus::Allocated => "Allocated",
            SlotStatus::Occupied => "Occupied",
            SlotStatus::Released => "Released",
        }
    }
}

impl Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotStatus::Available => "AVAILABLE",
            SlotStatus::Allocated => "ALLOCATED",
            SlotStatus::Occupied => "OCCUPIED",
            SlotStatus::Released => "RELEASED",
        };
        f.write_str(s)
    }
}

/// Fixed physical properties of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotFeatures {
    pub class: VehicleClass,
    pub handicapped: bool,
    pub electric_charging: bool,
}

impl SlotFeatures {
    #[inline]
    pub const fn standard(class: VehicleClass) -> Self {
        Self {
            class,
            handicapped: false,
            electric_charging: false,
        }
    }

    #[inline]
    pub const fn handicapped() -> Self {
        Self {
            class: VehicleClass::Car,
            handicapped: true,
            electric_charging: false,
        }
    }

    #[inline]
    pub const fn charging() -> Self {
        Self {
            class: VehicleClass::Electric,
            handicapped: false,
            electric_charging: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    id: SlotId,
    area: AreaId,
    zone: ZoneId,
    number: u32,
    status: SlotStatus,
    features: SlotFeatures,
    current_request: Option<RequestId>,
    last_updated: Timestamp,
}

impl Slot {
    pub fn new(
        id: SlotId,
        area: AreaId,
        zone: ZoneId,
        number: u32,
        features: SlotFeatures,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            area,
            zone,
            number,
            status: SlotStatus::Available,
            features,
            current_request: None,
            last_updated: created_at,
        }
    }

    #[inline]
    pub fn id(&self) -> SlotId {
        self.id
    }

    #[inline]
    pub fn area(&self) -> AreaId {
        self.area
    }

    #[inline]
    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn status(&self) -> SlotStatus {
        self.status
    }

    #[inline]
    pub fn features(&self) -> SlotFeatures {
        self.features
    }

    #[inline]
    pub fn class(&self) -> VehicleClass {
        self.features.class
    }

    #[inline]
    pub fn is_handicapped(&self) -> bool {
        self.features.handicapped
    }

    #[inline]
    pub fn has_charging(&self) -> bool {
        self.features.electric_charging
    }

    #[inline]
    pub fn current_request(&self) -> Option<RequestId> {
        self.current_request
    }

    #[inline]
    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status.is_free()
    }

    /// Vehicle/slot compatibility. The checks run in this exact order.
    pub fn can_accommodate(&self, vehicle: VehicleClass) -> bool {
        if vehicle == VehicleClass::Electric && !self.features.electric_charging {
            return false;
        }
        if vehicle == VehicleClass::Truck && self.features.class != VehicleClass::Truck {
            return false;
        }
        match vehicle {
            VehicleClass::Motorcycle => true,
            VehicleClass::Car => matches!(
                self.features.class,
                VehicleClass::Car | VehicleClass::Truck
            ),
            other => self.features.class == other,
        }
    }

    pub fn allocate(&mut self, request: RequestId, at: Timestamp) -> Result<(), SlotTransitionError> {
        if !self.is_available() {
            return Err(self.reject(SlotAction::Allocate));
        }
        self.status = SlotStatus::Allocated;
        self.current_request = Some(request);
        self.last_updated = at;
        Ok(())
    }

    pub fn occupy(&mut self, at: Timestamp) -> Result<(), SlotTransitionError> {
        if self.status != SlotStatus::Allocated {
            return Err(self.reject(SlotAction::Occupy));
        }
        self.status = SlotStatus::Occupied;
        self.last_updated = at;
        Ok(())
    }

    pub fn release(&mut self, at: Timestamp) -> Result<(), SlotTransitionError> {
        if self.status != SlotStatus::Occupied {
            return Err(self.reject(SlotAction::Release));
        }
        self.status = SlotStatus::Released;
        self.current_request = None;
        self.last_updated = at;
        Ok(())
    }

    pub fn cancel_allocation(&mut self, at: Timestamp) -> Result<(), SlotTransitionError> {
        if self.status != SlotStatus::Allocated {
            return Err(self.reject(SlotAction::CancelAllocation));
        }
        self.status = SlotStatus::Available;
        self.current_request = None;
        self.last_updated = at;
        Ok(())
    }

    /// Direct write that skips transition checks. Rollback only.
    pub fn restore_state(&mut self, status: SlotStatus, request: Option<RequestId>, at: Timestamp) {
        self.status = status;
        self.current_request = request;
        self.last_updated = at;
    }

    pub fn display_name(&self) -> String {
        format!("Slot {}", self.number)
    }

    #[inline]
    fn reject(&self, action: SlotAction) -> SlotTransitionError {
        SlotTransitionError::new(self.id, action, self.status)
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slot(id: {}, number: {}, class: {}, status: {})",
            self.id, self.number, self.features.class, self.status
        )
    }
}
