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

use crate::err::InvalidTransitionError;
use park_alloc_core::{
    id::{RequestId, SlotId, VehicleId, ZoneId},
    penalty::Penalty,
    time::{Timestamp, whole_minutes_between},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Requested,
    Allocated,
    Occupied,
    Released,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Requested,
        RequestStatus::Allocated,
        RequestStatus::Occupied,
        RequestStatus::Released,
        RequestStatus::Cancelled,
    ];

    /// The complete lifecycle table. Terminal states have no successors.
    pub const fn allowed_transitions(self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            Requested => &[Allocated, Cancelled],
            Allocated => &[Occupied, Cancelled],
            Occupied => &[Released],
            Released | Cancelled => &[],
        }
    }

    #[inline]
    pub fn can_transition(from: RequestStatus, to: RequestStatus) -> bool {
        from.allowed_transitions().contains(&to)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Holding a slot right now.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, RequestStatus::Allocated | RequestStatus::Occupied)
    }

    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Requested => "Requested",
            RequestStatus::Allocated => "Allocated",
            RequestStatus::Occupied => "Occupied",
            RequestStatus::Released => "Released",
            RequestStatus::Cancelled => "Cancelled",
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Requested => "REQUESTED",
            RequestStatus::Allocated => "ALLOCATED",
            RequestStatus::Occupied => "OCCUPIED",
            RequestStatus::Released => "RELEASED",
            RequestStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A vehicle's request for a slot, preferably in one zone.
///
/// Every mutator consults [`RequestStatus::can_transition`] first and
/// leaves the request untouched when it refuses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingRequest {
    id: RequestId,
    vehicle: VehicleId,
    preferred_zone: ZoneId,
    status: RequestStatus,
    allocated_slot: Option<SlotId>,
    allocated_zone: Option<ZoneId>,
    penalty: Penalty,
    created_at: Timestamp,
    allocated_at: Option<Timestamp>,
    occupied_at: Option<Timestamp>,
    released_at: Option<Timestamp>,
    cancelled_at: Option<Timestamp>,
    duration_minutes: Option<u64>,
}

impl ParkingRequest {
    pub fn new(
        id: RequestId,
        vehicle: VehicleId,
        preferred_zone: ZoneId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            vehicle,
            preferred_zone,
            status: RequestStatus::Requested,
            allocated_slot: None,
            allocated_zone: None,
            penalty: Penalty::ZERO,
            created_at,
            allocated_at: None,
            occupied_at: None,
            released_at: None,
            cancelled_at: None,
            duration_minutes: None,
        }
    }

    #[inline]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[inline]
    pub fn vehicle(&self) -> VehicleId {
        self.vehicle
    }

    #[inline]
    pub fn preferred_zone(&self) -> ZoneId {
        self.preferred_zone
    }

    #[inline]
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    #[inline]
    pub fn allocated_slot(&self) -> Option<SlotId> {
        self.allocated_slot
    }

    #[inline]
    pub fn allocated_zone(&self) -> Option<ZoneId> {
        self.allocated_zone
    }

    #[inline]
    pub fn penalty(&self) -> Penalty {
        self.penalty
    }

    #[inline]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    #[inline]
    pub fn allocated_at(&self) -> Option<Timestamp> {
        self.allocated_at
    }

    #[inline]
    pub fn occupied_at(&self) -> Option<Timestamp> {
        self.occupied_at
    }

    #[inline]
    pub fn released_at(&self) -> Option<Timestamp> {
        self.released_at
    }

    #[inline]
    pub fn cancelled_at(&self) -> Option<Timestamp> {
        self.cancelled_at
    }

    #[inline]
    pub fn duration_minutes(&self) -> Option<u64> {
        self.duration_minutes
    }

    #[inline]
    pub fn can_transition_to(&self, to: RequestStatus) -> bool {
        RequestStatus::can_transition(self.status, to)
    }

    /// Served by a zone other than the preferred one.
    #[inline]
    pub fn is_cross_zone(&self) -> bool {
        self.allocated_zone
            .is_some_and(|zone| zone != self.preferred_zone)
    }

    pub fn allocate(
        &mut self,
        slot: SlotId,
        zone: ZoneId,
        penalty: Penalty,
        at: Timestamp,
    ) -> Result<(), InvalidTransitionError> {
        self.check(RequestStatus::Allocated)?;
        self.status = RequestStatus::Allocated;
        self.allocated_slot = Some(slot);
        self.allocated_zone = Some(zone);
        self.penalty = penalty;
        self.allocated_at = Some(at);
        Ok(())
    }

    pub fn occupy(&mut self, at: Timestamp) -> Result<(), InvalidTransitionError> {
        self.check(RequestStatus::Occupied)?;
        self.status = RequestStatus::Occupied;
        self.occupied_at = Some(at);
        Ok(())
    }

    pub fn release(&mut self, at: Timestamp) -> Result<(), InvalidTransitionError> {
        self.check(RequestStatus::Released)?;
        self.status = RequestStatus::Released;
        self.released_at = Some(at);
        self.duration_minutes = self
            .occupied_at
            .map(|occupied| whole_minutes_between(occupied, at));
        Ok(())
    }

    pub fn cancel(&mut self, at: Timestamp) -> Result<(), InvalidTransitionError> {
        self.check(RequestStatus::Cancelled)?;
        self.status = RequestStatus::Cancelled;
        self.cancelled_at = Some(at);
        Ok(())
    }

    /// Unchecked write used by rollback.
    ///
    /// Timestamps and the duration recorded after `status` are cleared.
    /// Going back to `Requested` also drops the slot, zone and penalty.
    pub fn restore_state(
        &mut self,
        status: RequestStatus,
        slot: Option<SlotId>,
        zone: Option<ZoneId>,
        penalty: Penalty,
    ) {
        self.status = status;
        self.allocated_slot = slot;
        self.allocated_zone = zone;
        self.penalty = penalty;

        match status {
            RequestStatus::Requested => {
                self.allocated_at = None;
                self.occupied_at = None;
                self.released_at = None;
                self.cancelled_at = None;
                self.duration_minutes = None;
            }
            RequestStatus::Allocated => {
                self.occupied_at = None;
                self.released_at = None;
                self.cancelled_at = None;
                self.duration_minutes = None;
            }
            RequestStatus::Occupied => {
                self.released_at = None;
                self.cancelled_at = None;
                self.duration_minutes = None;
            }
            RequestStatus::Released | RequestStatus::Cancelled => {}
        }
    }

    #[inline]
    fn check(&self, to: RequestStatus) -> Result<(), InvalidTransitionError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(InvalidTransitionError::new(self.id, self.status, to))
        }
    }
}

impl Display for ParkingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParkingRequest(id: {}, vehicle: {}, preferred: {}, status: {}",
            self.id, self.vehicle, self.preferred_zone, self.status
        )?;
        if let Some(slot) = self.allocated_slot {
            write!(f, ", slot: {}", slot)?;
        }
        if let Some(zone) = self.allocated_zone {
            write!(f, ", zone: {}, penalty: {}", zone, self.penalty)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta};

    fn request() -> ParkingRequest {
        ParkingRequest::new(
            RequestId::new(1),
            VehicleId::new(1),
            ZoneId::new(1),
            DateTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_transition_table_is_exact() {
        use RequestStatus::*;
        let allowed = [
            (Requested, Allocated),
            (Requested, Cancelled),
            (Allocated, Occupied),
            (Allocated, Cancelled),
            (Occupied, Released),
        ];
        for from in RequestStatus::ALL {
            for to in RequestStatus::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    RequestStatus::can_transition(from, to),
                    expected,
                    "{from} -> {to}"
                );
            }
        }
        assert!(Released.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Occupied.is_terminal());
    }

    #[test]
    fn test_happy_path_records_duration() {
        let mut r = request();
        let t0 = DateTime::UNIX_EPOCH;
        r.allocate(SlotId::new(3), ZoneId::new(2), Penalty::new(12.0), t0)
            .unwrap();
        assert!(r.is_cross_zone());
        r.occupy(t0).unwrap();
        r.release(t0 + TimeDelta::seconds(90)).unwrap();
        assert_eq!(r.status(), RequestStatus::Released);
        assert_eq!(r.duration_minutes(), Some(2));
        // the slot id stays on the record after release
        assert_eq!(r.allocated_slot(), Some(SlotId::new(3)));
    }

    #[test]
    fn test_occupy_from_requested_is_rejected() {
        let mut r = request();
        let err = r.occupy(DateTime::UNIX_EPOCH).unwrap_err();
        assert_eq!(err.from(), RequestStatus::Requested);
        assert_eq!(err.to(), RequestStatus::Occupied);
        assert_eq!(r.status(), RequestStatus::Requested);
        assert_eq!(r.occupied_at(), None);
    }

    #[test]
    fn test_cancel_only_before_occupation() {
        let t = DateTime::UNIX_EPOCH;
        let mut fresh = request();
        fresh.cancel(t).unwrap();
        assert_eq!(fresh.status(), RequestStatus::Cancelled);
        assert!(fresh.cancel(t).is_err());

        let mut held = request();
        held.allocate(SlotId::new(1), ZoneId::new(1), Penalty::ZERO, t)
            .unwrap();
        assert!(!held.is_cross_zone());
        held.occupy(t).unwrap();
        assert!(held.cancel(t).is_err());
        assert_eq!(held.status(), RequestStatus::Occupied);
    }

    #[test]
    fn test_restore_to_requested_clears_downstream() {
        let t = DateTime::UNIX_EPOCH;
        let mut r = request();
        r.allocate(SlotId::new(1), ZoneId::new(2), Penalty::new(12.0), t)
            .unwrap();
        r.occupy(t).unwrap();
        r.restore_state(RequestStatus::Requested, None, None, Penalty::ZERO);
        assert_eq!(r.status(), RequestStatus::Requested);
        assert_eq!(r.allocated_slot(), None);
        assert_eq!(r.allocated_at(), None);
        assert_eq!(r.occupied_at(), None);
        assert!(!r.is_cross_zone());
        // the request is live again
        assert!(r.can_transition_to(RequestStatus::Allocated));
    }

    #[test]
    fn test_restore_to_occupied_drops_release_data() {
        let t = DateTime::UNIX_EPOCH;
        let mut r = request();
        r.allocate(SlotId::new(1), ZoneId::new(1), Penalty::ZERO, t)
            .unwrap();
        r.occupy(t).unwrap();
        r.release(t + TimeDelta::minutes(5)).unwrap();
        r.restore_state(
            RequestStatus::Occupied,
            r.allocated_slot(),
            r.allocated_zone(),
            r.penalty(),
        );
        assert_eq!(r.released_at(), None);
        assert_eq!(r.duration_minutes(), None);
        assert_eq!(r.occupied_at(), Some(t));
    }
}
