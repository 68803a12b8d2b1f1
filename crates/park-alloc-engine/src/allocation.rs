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

//! Slot search and every state-mutating transition.
//!
//! Each successful call touches exactly one slot and one request and returns
//! the [`Operation`] describing it. A failed call leaves both untouched.

use park_alloc_core::{
    id::{AreaId, IdSequence, OperationId, RequestId, SlotId, ZoneId},
    penalty::Penalty,
    time::Timestamp,
};
use park_alloc_model::{
    err::{InvalidTransitionError, SlotTransitionError},
    operation::{Operation, OperationKind},
    request::{ParkingRequest, RequestStatus},
    slot::{Slot, SlotStatus},
    vehicle::VehicleClass,
    zone::ZoneMap,
};
use serde::Serialize;
use std::fmt::Display;
use tracing::{debug, instrument, trace};

/// Where in the three-tier search a zone sits relative to the preferred one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchTier {
    Preferred,
    Adjacent,
    Remote,
}

impl SearchTier {
    /// Factor applied to `base × multiplier`.
    #[inline]
    pub const fn penalty_factor(self) -> f64 {
        match self {
            SearchTier::Preferred => 0.0,
            SearchTier::Adjacent => 1.0,
            SearchTier::Remote => 2.0,
        }
    }
}

impl Display for SearchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SearchTier::Preferred => "preferred",
            SearchTier::Adjacent => "adjacent",
            SearchTier::Remote => "remote",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    operation: Operation,
    slot: SlotId,
    slot_number: u32,
    area: AreaId,
    zone: ZoneId,
    tier: SearchTier,
    penalty: Penalty,
}

impl Allocation {
    #[inline]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    #[inline]
    pub fn slot_number(&self) -> u32 {
        self.slot_number
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
    pub fn tier(&self) -> SearchTier {
        self.tier
    }

    #[inline]
    pub fn penalty(&self) -> Penalty {
        self.penalty
    }

    #[inline]
    pub fn is_cross_zone(&self) -> bool {
        self.tier != SearchTier::Preferred
    }

    pub fn into_operation(self) -> Operation {
        self.operation
    }
}

impl Display for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slot {} in {} ({} zone), penalty {}",
            self.slot_number, self.zone, self.tier, self.penalty
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AllocationError {
    InvalidTransition(InvalidTransitionError),
    ZoneNotFound(ZoneId),
    NoCapacity {
        request: RequestId,
        class: VehicleClass,
    },
    Slot(SlotTransitionError),
}

impl Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use AllocationError::*;
        match self {
            InvalidTransition(e) => write!(f, "{}", e),
            ZoneNotFound(zone) => write!(f, "Zone {} not found", zone),
            NoCapacity { request, class } => write!(
                f,
                "No compatible slot available for {} ({}) in any zone",
                request,
                class.display_name()
            ),
            Slot(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AllocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AllocationError::InvalidTransition(e) => Some(e),
            AllocationError::Slot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvalidTransitionError> for AllocationError {
    fn from(e: InvalidTransitionError) -> Self {
        AllocationError::InvalidTransition(e)
    }
}

impl From<SlotTransitionError> for AllocationError {
    fn from(e: SlotTransitionError) -> Self {
        AllocationError::Slot(e)
    }
}

/// Failure of occupy, release or cancel.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationError {
    InvalidTransition(InvalidTransitionError),
    NoSlotAssigned(RequestId),
    SlotNotFound(SlotId),
    Slot(SlotTransitionError),
}

impl Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use OperationError::*;
        match self {
            InvalidTransition(e) => write!(f, "{}", e),
            NoSlotAssigned(request) => write!(f, "{} has no allocated slot", request),
            SlotNotFound(slot) => write!(f, "Slot {} not found", slot),
            Slot(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OperationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OperationError::InvalidTransition(e) => Some(e),
            OperationError::Slot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvalidTransitionError> for OperationError {
    fn from(e: InvalidTransitionError) -> Self {
        OperationError::InvalidTransition(e)
    }
}

impl From<SlotTransitionError> for OperationError {
    fn from(e: SlotTransitionError) -> Self {
        OperationError::Slot(e)
    }
}

#[derive(Debug, Clone)]
pub struct AllocationEngine {
    base_penalty: Penalty,
    operation_ids: IdSequence<OperationId>,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(Penalty::new(10.0))
    }
}

impl AllocationEngine {
    pub fn new(base_penalty: Penalty) -> Self {
        Self {
            base_penalty,
            operation_ids: IdSequence::new(),
        }
    }

    #[inline]
    pub fn base_penalty(&self) -> Penalty {
        self.base_penalty
    }

    /// Number of operations emitted so far.
    #[inline]
    pub fn operations_issued(&self) -> u64 {
        self.operation_ids.issued()
    }

    /// Zones in the order they are searched: the preferred zone, its
    /// neighbours in adjacency-list order, then every other zone in creation
    /// order. Empty if `preferred` is unknown.
    pub fn search_order(&self, zones: &ZoneMap, preferred: ZoneId) -> Vec<(ZoneId, SearchTier)> {
        let Some(home) = zones.get(preferred) else {
            return Vec::new();
        };

        let mut order = Vec::with_capacity(zones.len());
        order.push((preferred, SearchTier::Preferred));
        order.extend(
            home.adjacent_zones()
                .iter()
                .copied()
                .filter(|id| zones.contains(*id))
                .map(|id| (id, SearchTier::Adjacent)),
        );
        order.extend(
            zones
                .ids()
                .filter(|id| *id != preferred && !home.is_adjacent_to(*id))
                .map(|id| (id, SearchTier::Remote)),
        );
        order
    }

    /// Penalty charged for serving a request from `zone` at `tier`.
    pub fn penalty_for(&self, zones: &ZoneMap, zone: ZoneId, tier: SearchTier) -> Penalty {
        match (tier, zones.get(zone)) {
            (SearchTier::Preferred, _) | (_, None) => Penalty::ZERO,
            (tier, Some(z)) => {
                Penalty::scaled(self.base_penalty, z.penalty_multiplier(), tier.penalty_factor())
            }
        }
    }

    #[instrument(level = "debug", skip_all, fields(request = %request.id(), class = %class))]
    pub fn allocate(
        &mut self,
        zones: &mut ZoneMap,
        request: &mut ParkingRequest,
        class: VehicleClass,
        at: Timestamp,
    ) -> Result<Allocation, AllocationError> {
        if !request.can_transition_to(RequestStatus::Allocated) {
            return Err(InvalidTransitionError::new(
                request.id(),
                request.status(),
                RequestStatus::Allocated,
            )
            .into());
        }
        let preferred = request.preferred_zone();
        if !zones.contains(preferred) {
            return Err(AllocationError::ZoneNotFound(preferred));
        }

        for (zone_id, tier) in self.search_order(zones, preferred) {
            let penalty = self.penalty_for(zones, zone_id, tier);
            let Some(zone) = zones.get_mut(zone_id) else {
                continue;
            };
            let Some(slot) = zone.find_available_slot_mut(class) else {
                trace!(zone = %zone_id, %tier, "No compatible slot");
                continue;
            };

            let previous_slot_status = slot.status();
            let previous_request_status = request.status();
            slot.allocate(request.id(), at)?;
            if let Err(e) = request.allocate(slot.id(), zone_id, penalty, at) {
                slot.restore_state(previous_slot_status, None, at);
                return Err(e.into());
            }

            debug!(slot = %slot.id(), zone = %zone_id, %tier, %penalty, "Allocated");
            let operation = self.record(
                request.id(),
                Some(slot.id()),
                previous_slot_status,
                previous_request_status,
                OperationKind::Allocate,
                at,
            );
            return Ok(Allocation {
                operation,
                slot: slot.id(),
                slot_number: slot.number(),
                area: slot.area(),
                zone: zone_id,
                tier,
                penalty,
            });
        }

        debug!("No capacity in any zone");
        Err(AllocationError::NoCapacity {
            request: request.id(),
            class,
        })
    }

    #[instrument(level = "debug", skip_all, fields(request = %request.id()))]
    pub fn occupy(
        &mut self,
        zones: &mut ZoneMap,
        request: &mut ParkingRequest,
        at: Timestamp,
    ) -> Result<Operation, OperationError> {
        self.transition(zones, request, OperationKind::Occupy, at)
    }

    #[instrument(level = "debug", skip_all, fields(request = %request.id()))]
    pub fn release(
        &mut self,
        zones: &mut ZoneMap,
        request: &mut ParkingRequest,
        at: Timestamp,
    ) -> Result<Operation, OperationError> {
        self.transition(zones, request, OperationKind::Release, at)
    }

    /// Cancels a waiting or allocated request. A request that never held a
    /// slot yields an operation without a slot id.
    #[instrument(level = "debug", skip_all, fields(request = %request.id()))]
    pub fn cancel(
        &mut self,
        zones: &mut ZoneMap,
        request: &mut ParkingRequest,
        at: Timestamp,
    ) -> Result<Operation, OperationError> {
        if request.allocated_slot().is_some() {
            return self.transition(zones, request, OperationKind::Cancel, at);
        }

        let previous_request_status = request.status();
        request.cancel(at)?;
        debug!("Cancelled before allocation");
        Ok(self.record(
            request.id(),
            None,
            SlotStatus::Available,
            previous_request_status,
            OperationKind::Cancel,
            at,
        ))
    }

    fn transition(
        &mut self,
        zones: &mut ZoneMap,
        request: &mut ParkingRequest,
        kind: OperationKind,
        at: Timestamp,
    ) -> Result<Operation, OperationError> {
        let target = match kind {
            OperationKind::Occupy => RequestStatus::Occupied,
            OperationKind::Release => RequestStatus::Released,
            OperationKind::Cancel => RequestStatus::Cancelled,
            OperationKind::Allocate => RequestStatus::Allocated,
        };
        if !request.can_transition_to(target) {
            return Err(InvalidTransitionError::new(request.id(), request.status(), target).into());
        }

        let slot_id = request
            .allocated_slot()
            .ok_or(OperationError::NoSlotAssigned(request.id()))?;
        let slot = zones
            .slot_mut(slot_id)
            .ok_or(OperationError::SlotNotFound(slot_id))?;

        let previous_slot_status = slot.status();
        let previous_binding = slot.current_request();
        let previous_request_status = request.status();

        apply_slot(slot, kind, at)?;
        let applied = match kind {
            OperationKind::Occupy => request.occupy(at),
            OperationKind::Release => request.release(at),
            OperationKind::Cancel => request.cancel(at),
            OperationKind::Allocate => Err(InvalidTransitionError::new(
                request.id(),
                request.status(),
                target,
            )),
        };
        if let Err(e) = applied {
            slot.restore_state(previous_slot_status, previous_binding, at);
            return Err(e.into());
        }

        debug!(slot = %slot_id, %kind, "Applied");
        Ok(self.record(
            request.id(),
            Some(slot_id),
            previous_slot_status,
            previous_request_status,
            kind,
            at,
        ))
    }

    fn record(
        &mut self,
        request: RequestId,
        slot: Option<SlotId>,
        previous_slot_status: SlotStatus,
        previous_request_status: RequestStatus,
        kind: OperationKind,
        at: Timestamp,
    ) -> Operation {
        Operation::new(
            self.operation_ids.next_id(),
            request,
            slot,
            previous_slot_status,
            previous_request_status,
            kind,
            at,
        )
    }
}

#[inline]
fn apply_slot(slot: &mut Slot, kind: OperationKind, at: Timestamp) -> Result<(), SlotTransitionError> {
    match kind {
        OperationKind::Occupy => slot.occupy(at),
        OperationKind::Release => slot.release(at),
        OperationKind::Cancel => slot.cancel_allocation(at),
        OperationKind::Allocate => Err(SlotTransitionError::new(
            slot.id(),
            park_alloc_model::err::SlotAction::Allocate,
            slot.status(),
        )),
    }
}
