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

//! The orchestrator: owns every collection and routes calls to the engines.
//!
//! All mutation goes through `&mut self`, so a single `ParkingSystem` is
//! strictly serialized. Hosts that need sharing wrap it in
//! [`crate::shared::SharedParkingSystem`].

use crate::{
    allocation::{Allocation, AllocationEngine, AllocationError, OperationError},
    analytics::{Analytics, AnalyticsEngine, ZoneAnalytics},
    config::SystemConfig,
    rollback::{RollbackError, RollbackManager, RollbackReport},
};
use park_alloc_core::{
    id::{IdSequence, RequestId, VehicleId, ZoneId},
    time::{Clock, SystemClock, Timestamp},
};
use park_alloc_model::{
    err::{InvalidPlateError, LayoutError},
    layout::{CityLayout, HierarchyIds},
    operation::Operation,
    request::{ParkingRequest, RequestStatus},
    vehicle::{Vehicle, VehicleClass},
    zone::{Zone, ZoneMap},
};
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_RECENT_OPERATIONS: usize = 10;
const SELF_CHECK_PLATE: &str = "TEST123";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    InvalidPlate(InvalidPlateError),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::InvalidPlate(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistrationError::InvalidPlate(e) => Some(e),
        }
    }
}

impl From<InvalidPlateError> for RegistrationError {
    fn from(e: InvalidPlateError) -> Self {
        RegistrationError::InvalidPlate(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SystemError {
    VehicleNotFound(VehicleId),
    ZoneNotFound(ZoneId),
    RequestNotFound(RequestId),
    Registration(RegistrationError),
    Allocation(AllocationError),
    Operation(OperationError),
    Rollback(RollbackError),
    Layout(LayoutError),
}

impl Display for SystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SystemError::*;
        match self {
            VehicleNotFound(id) => write!(f, "Vehicle {} not found", id),
            ZoneNotFound(id) => write!(f, "Zone {} not found", id),
            RequestNotFound(id) => write!(f, "Request {} not found", id),
            Registration(e) => write!(f, "{}", e),
            Allocation(e) => write!(f, "{}", e),
            Operation(e) => write!(f, "{}", e),
            Rollback(e) => write!(f, "{}", e),
            Layout(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use SystemError::*;
        match self {
            Registration(e) => Some(e),
            Allocation(e) => Some(e),
            Operation(e) => Some(e),
            Rollback(e) => Some(e),
            Layout(e) => Some(e),
            VehicleNotFound(_) | ZoneNotFound(_) | RequestNotFound(_) => None,
        }
    }
}

impl From<RegistrationError> for SystemError {
    fn from(e: RegistrationError) -> Self {
        SystemError::Registration(e)
    }
}

impl From<AllocationError> for SystemError {
    fn from(e: AllocationError) -> Self {
        SystemError::Allocation(e)
    }
}

impl From<OperationError> for SystemError {
    fn from(e: OperationError) -> Self {
        SystemError::Operation(e)
    }
}

impl From<RollbackError> for SystemError {
    fn from(e: RollbackError) -> Self {
        SystemError::Rollback(e)
    }
}

impl From<LayoutError> for SystemError {
    fn from(e: LayoutError) -> Self {
        SystemError::Layout(e)
    }
}

/// A registration either created a vehicle or found it by plate.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Created(Vehicle),
    Existing(Vehicle),
}

impl Registration {
    #[inline]
    pub fn vehicle(&self) -> &Vehicle {
        match self {
            Registration::Created(v) | Registration::Existing(v) => v,
        }
    }

    #[inline]
    pub fn is_new(&self) -> bool {
        matches!(self, Registration::Created(_))
    }

    pub fn into_vehicle(self) -> Vehicle {
        match self {
            Registration::Created(v) | Registration::Existing(v) => v,
        }
    }
}

/// Result of `create_request`. The request is stored even when the
/// allocation attempt failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    request: ParkingRequest,
    allocation: Result<Allocation, AllocationError>,
}

impl RequestOutcome {
    #[inline]
    pub fn request(&self) -> &ParkingRequest {
        &self.request
    }

    #[inline]
    pub fn success(&self) -> bool {
        self.allocation.is_ok()
    }

    #[inline]
    pub fn allocation(&self) -> Option<&Allocation> {
        self.allocation.as_ref().ok()
    }

    #[inline]
    pub fn error(&self) -> Option<&AllocationError> {
        self.allocation.as_ref().err()
    }

    pub fn message(&self) -> String {
        match &self.allocation {
            Ok(a) => format!("Allocated {}", a),
            Err(e) => e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfCheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub message: String,
}

impl SelfCheckResult {
    fn new(name: &'static str, passed: bool, message: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            message: message.into(),
        }
    }
}

/// Owned, serializable copy of the whole system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub zones: Vec<Zone>,
    pub vehicles: Vec<Vehicle>,
    pub requests: Vec<ParkingRequest>,
    pub operation_history: Vec<Operation>,
    pub exported_at: Timestamp,
}

pub struct ParkingSystem<C: Clock = SystemClock> {
    config: SystemConfig,
    clock: C,
    zones: ZoneMap,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    plates: HashMap<String, VehicleId>,
    requests: BTreeMap<RequestId, ParkingRequest>,
    vehicle_ids: IdSequence<VehicleId>,
    request_ids: IdSequence<RequestId>,
    allocation: AllocationEngine,
    rollback: RollbackManager,
    analytics: AnalyticsEngine,
}

impl ParkingSystem<SystemClock> {
    pub fn new(config: SystemConfig, layout: &CityLayout) -> Result<Self, SystemError> {
        Self::with_clock(config, layout, SystemClock)
    }

    /// Five-zone reference city with default settings.
    pub fn reference_city() -> Result<Self, SystemError> {
        Self::new(SystemConfig::default(), &CityLayout::default())
    }
}

impl<C: Clock> ParkingSystem<C> {
    pub fn with_clock(config: SystemConfig, layout: &CityLayout, clock: C) -> Result<Self, SystemError> {
        let mut ids = HierarchyIds::new();
        let zones = layout.build(&mut ids, clock.now())?;
        info!(
            zones = zones.len(),
            slots = zones.total_slots(),
            "Parking system initialized"
        );

        Ok(Self {
            allocation: AllocationEngine::new(config.alloc.base_penalty),
            rollback: RollbackManager::new(config.rollback.capacity),
            analytics: AnalyticsEngine::new(config.analytics.clone()),
            config,
            clock,
            zones,
            vehicles: BTreeMap::new(),
            plates: HashMap::new(),
            requests: BTreeMap::new(),
            vehicle_ids: IdSequence::new(),
            request_ids: IdSequence::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Registers a vehicle, or returns the one already holding this plate.
    #[instrument(level = "debug", skip_all, fields(plate = plate))]
    pub fn register_vehicle(
        &mut self,
        plate: &str,
        owner: &str,
        class: VehicleClass,
    ) -> Result<Registration, RegistrationError> {
        if !Vehicle::is_valid_plate(plate) {
            debug!("Rejected plate");
            return Err(InvalidPlateError::new(plate).into());
        }
        let key = Vehicle::normalize_plate(plate);
        if let Some(existing) = self.plates.get(&key).and_then(|id| self.vehicles.get(id)) {
            debug!(vehicle = %existing.id(), "Plate already registered");
            return Ok(Registration::Existing(existing.clone()));
        }

        let vehicle = Vehicle::new(self.vehicle_ids.next_id(), plate, owner, class, self.clock.now())?;
        info!(vehicle = %vehicle.id(), %class, "Vehicle registered");
        self.plates.insert(key, vehicle.id());
        self.vehicles.insert(vehicle.id(), vehicle.clone());
        Ok(Registration::Created(vehicle))
    }

    /// Creates a request and immediately tries to allocate it.
    #[instrument(level = "debug", skip_all, fields(vehicle = %vehicle, zone = %preferred_zone))]
    pub fn create_request(
        &mut self,
        vehicle: VehicleId,
        preferred_zone: ZoneId,
    ) -> Result<RequestOutcome, SystemError> {
        let class = self
            .vehicles
            .get(&vehicle)
            .map(Vehicle::class)
            .ok_or(SystemError::VehicleNotFound(vehicle))?;
        if !self.zones.contains(preferred_zone) {
            return Err(SystemError::ZoneNotFound(preferred_zone));
        }

        let now = self.clock.now();
        let id = self.request_ids.next_id();
        let request = self
            .requests
            .entry(id)
            .or_insert_with(|| ParkingRequest::new(id, vehicle, preferred_zone, now));

        let allocation = self
            .allocation
            .allocate(&mut self.zones, request, class, now);
        match &allocation {
            Ok(a) => {
                info!(request = %id, slot = %a.slot(), zone = %a.zone(), penalty = %a.penalty(), "Request allocated");
                self.rollback.push(a.operation().clone());
            }
            Err(e) => warn!(request = %id, error = %e, "Request left unallocated"),
        }

        Ok(RequestOutcome {
            request: request.clone(),
            allocation,
        })
    }

    /// Retries allocation for a request still waiting in REQUESTED.
    pub fn retry_allocation(&mut self, request: RequestId) -> Result<Allocation, SystemError> {
        let now = self.clock.now();
        let r = self
            .requests
            .get_mut(&request)
            .ok_or(SystemError::RequestNotFound(request))?;
        let class = self
            .vehicles
            .get(&r.vehicle())
            .map(Vehicle::class)
            .ok_or(SystemError::VehicleNotFound(r.vehicle()))?;
        let allocation = self.allocation.allocate(&mut self.zones, r, class, now)?;
        self.rollback.push(allocation.operation().clone());
        Ok(allocation)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn occupy_slot(&mut self, request: RequestId) -> Result<Operation, SystemError> {
        let now = self.clock.now();
        let r = self
            .requests
            .get_mut(&request)
            .ok_or(SystemError::RequestNotFound(request))?;
        let op = self.allocation.occupy(&mut self.zones, r, now)?;
        info!(%request, "Slot occupied");
        self.rollback.push(op.clone());
        Ok(op)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn release_slot(&mut self, request: RequestId) -> Result<Operation, SystemError> {
        let now = self.clock.now();
        let r = self
            .requests
            .get_mut(&request)
            .ok_or(SystemError::RequestNotFound(request))?;
        let op = self.allocation.release(&mut self.zones, r, now)?;
        info!(%request, duration = ?r.duration_minutes(), "Slot released");
        self.rollback.push(op.clone());
        Ok(op)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn cancel_request(&mut self, request: RequestId) -> Result<Operation, SystemError> {
        let now = self.clock.now();
        let r = self
            .requests
            .get_mut(&request)
            .ok_or(SystemError::RequestNotFound(request))?;
        let op = self.allocation.cancel(&mut self.zones, r, now)?;
        info!(%request, "Request cancelled");
        self.rollback.push(op.clone());
        Ok(op)
    }

    /// Undoes the last `count` operations. See [`RollbackManager::rollback`].
    #[instrument(level = "info", skip(self))]
    pub fn rollback(&mut self, count: usize) -> Result<RollbackReport, RollbackError> {
        let now = self.clock.now();
        let report = self
            .rollback
            .rollback(count, &mut self.zones, &mut self.requests, now)?;
        info!(rolled_back = report.rolled_back(), "Rollback applied");
        Ok(report)
    }

    pub fn analytics(&self) -> Analytics {
        self.analytics
            .snapshot(&self.zones, self.requests.values(), self.clock.now())
    }

    /// `None` for an unknown zone.
    pub fn zone_analytics(&self, zone: ZoneId) -> Option<ZoneAnalytics> {
        let zone = self.zones.get(zone)?;
        Some(self.analytics.zone_snapshot(zone, self.requests.values()))
    }

    pub fn export_state(&self) -> SystemSnapshot {
        SystemSnapshot {
            zones: self.zones.iter().cloned().collect(),
            vehicles: self.vehicles.values().cloned().collect(),
            requests: self.requests.values().cloned().collect(),
            operation_history: self.rollback.history().cloned().collect(),
            exported_at: self.clock.now(),
        }
    }

    /// Adds a directed adjacency edge. Returns `false` if it already existed.
    pub fn connect_zones(&mut self, from: ZoneId, to: ZoneId) -> Result<bool, SystemError> {
        if !self.zones.contains(to) {
            return Err(SystemError::ZoneNotFound(to));
        }
        let zone = self
            .zones
            .get_mut(from)
            .ok_or(SystemError::ZoneNotFound(from))?;
        Ok(zone.add_adjacent_zone(to))
    }

    #[inline]
    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    #[inline]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    #[inline]
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn vehicle_by_plate(&self, plate: &str) -> Option<&Vehicle> {
        self.plates
            .get(&Vehicle::normalize_plate(plate))
            .and_then(|id| self.vehicles.get(id))
    }

    pub fn requests(&self) -> impl Iterator<Item = &ParkingRequest> {
        self.requests.values()
    }

    #[inline]
    pub fn request(&self, id: RequestId) -> Option<&ParkingRequest> {
        self.requests.get(&id)
    }

    /// ALLOCATED or OCCUPIED.
    pub fn active_requests(&self) -> impl Iterator<Item = &ParkingRequest> {
        self.requests.values().filter(|r| r.status().is_active())
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = &ParkingRequest> {
        self.requests
            .values()
            .filter(|r| r.status() == RequestStatus::Requested)
    }

    pub fn requests_with_status(&self, status: RequestStatus) -> impl Iterator<Item = &ParkingRequest> {
        self.requests.values().filter(move |r| r.status() == status)
    }

    /// Most recent first.
    pub fn recent_operations(&self, count: usize) -> impl Iterator<Item = &Operation> {
        self.rollback.recent(count)
    }

    #[inline]
    pub fn rollback_depth(&self) -> usize {
        self.rollback.depth()
    }

    pub fn clear_history(&mut self) {
        info!(dropped = self.rollback.depth(), "Operation history cleared");
        self.rollback.clear();
    }

    /// Runs register, request, occupy, release, rollback and analytics
    /// against the live system and reports each step.
    pub fn run_self_check(&mut self) -> Vec<SelfCheckResult> {
        let mut results = Vec::with_capacity(6);

        let vehicle = match self.register_vehicle(SELF_CHECK_PLATE, "Test Driver", VehicleClass::Car) {
            Ok(reg) => {
                results.push(SelfCheckResult::new(
                    "Vehicle Registration",
                    true,
                    "Vehicle registered successfully",
                ));
                Some(reg.vehicle().id())
            }
            Err(e) => {
                results.push(SelfCheckResult::new("Vehicle Registration", false, e.to_string()));
                None
            }
        };

        let first_zone = self.zones.ids().next();
        if let Some(vehicle) = vehicle
            && let Some(first_zone) = first_zone
        {
            let request = match self.create_request(vehicle, first_zone) {
                Ok(outcome) => {
                    results.push(SelfCheckResult::new(
                        "Request Creation & Allocation",
                        outcome.success(),
                        outcome.message(),
                    ));
                    Some(outcome.request().id())
                }
                Err(e) => {
                    results.push(SelfCheckResult::new(
                        "Request Creation & Allocation",
                        false,
                        e.to_string(),
                    ));
                    None
                }
            };

            if let Some(request) = request {
                let occupied = self.occupy_slot(request);
                results.push(SelfCheckResult::new(
                    "Slot Occupation",
                    occupied.is_ok(),
                    match &occupied {
                        Ok(_) => "Slot occupied successfully".to_string(),
                        Err(e) => e.to_string(),
                    },
                ));

                let released = self.release_slot(request);
                results.push(SelfCheckResult::new(
                    "Slot Release",
                    released.is_ok(),
                    match &released {
                        Ok(_) => "Slot released successfully".to_string(),
                        Err(e) => e.to_string(),
                    },
                ));
            }

            let rollback = self.rollback(2);
            let rolled_back = rollback.as_ref().map_or(0, RollbackReport::rolled_back);
            results.push(SelfCheckResult::new(
                "Rollback Operations",
                rolled_back > 0,
                format!("Rolled back {} operations", rolled_back),
            ));
        }

        let analytics = self.analytics();
        results.push(SelfCheckResult::new(
            "Analytics Computation",
            true,
            format!(
                "Total requests: {}, Utilization: {}%",
                analytics.total_requests, analytics.utilization_percent
            ),
        ));

        let passed = results.iter().filter(|r| r.passed).count();
        info!(passed, total = results.len(), "Self-check finished");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{allocation::SearchTier, config::SystemConfigBuilder};
    use chrono::{DateTime, TimeDelta};
    use park_alloc_core::{penalty::Penalty, time::ManualClock};
    use park_alloc_model::{
        area::{AreaSpec, SlotMix},
        operation::OperationKind,
        slot::SlotStatus,
        zone::ZoneSpec,
    };

    fn lot(n: u32) -> AreaSpec {
        AreaSpec::new("Lot", n).with_mix(SlotMix::Uniform(VehicleClass::Car))
    }

    /// Z1 (1.0, one slot) -> Z2 (1.2, two slots).
    fn two_zone_system() -> ParkingSystem<ManualClock> {
        let layout = CityLayout::new()
            .zone(ZoneSpec::new("One", "Z1", 1.0).area(lot(1)))
            .zone(ZoneSpec::new("Two", "Z2", 1.2).area(lot(2)))
            .edge("Z1", "Z2");
        ParkingSystem::with_clock(
            SystemConfig::default(),
            &layout,
            ManualClock::new(DateTime::UNIX_EPOCH),
        )
        .unwrap()
    }

    fn car(system: &mut ParkingSystem<ManualClock>, plate: &str) -> VehicleId {
        system
            .register_vehicle(plate, "Owner", VehicleClass::Car)
            .unwrap()
            .vehicle()
            .id()
    }

    #[test]
    fn test_scenario_full_preferred_zone_spills_to_neighbour() {
        let mut s = two_zone_system();
        let a = car(&mut s, "AAA1");
        let b = car(&mut s, "BBB2");
        let z1 = ZoneId::new(1);

        assert!(s.create_request(a, z1).unwrap().success());
        let outcome = s.create_request(b, z1).unwrap();
        let alloc = outcome.allocation().unwrap();
        assert_eq!(alloc.zone(), ZoneId::new(2));
        assert_eq!(alloc.tier(), SearchTier::Adjacent);
        assert!(alloc.penalty().approx_eq(Penalty::new(12.0), 1e-9));
        assert!(outcome.request().is_cross_zone());
    }

    #[test]
    fn test_scenario_occupy_before_allocation_fails() {
        let layout = CityLayout::new().zone(ZoneSpec::new("One", "Z1", 1.0).area(lot(1)));
        let mut s = ParkingSystem::with_clock(SystemConfig::default(), &layout, ManualClock::default())
            .unwrap();
        let a = car(&mut s, "AAA1");
        let b = car(&mut s, "BBB2");
        s.create_request(a, ZoneId::new(1)).unwrap();
        // no capacity left, so b stays REQUESTED
        let outcome = s.create_request(b, ZoneId::new(1)).unwrap();
        assert!(!outcome.success());
        let id = outcome.request().id();
        assert_eq!(s.request(id).unwrap().status(), RequestStatus::Requested);

        let err = s.occupy_slot(id).unwrap_err();
        assert!(matches!(err, SystemError::Operation(OperationError::InvalidTransition(_))));
        assert_eq!(s.request(id).unwrap().status(), RequestStatus::Requested);
        assert_eq!(s.rollback_depth(), 1);
    }

    #[test]
    fn test_scenario_duration_is_rounded_minutes() {
        let mut s = two_zone_system();
        let a = car(&mut s, "AAA1");
        let id = s.create_request(a, ZoneId::new(1)).unwrap().request().id();
        s.occupy_slot(id).unwrap();
        s.clock().advance(TimeDelta::seconds(90));
        s.release_slot(id).unwrap();
        assert_eq!(s.request(id).unwrap().duration_minutes(), Some(2));
        assert_eq!(s.analytics().average_duration_minutes, 2);
    }

    #[test]
    fn test_scenario_rollback_more_than_depth() {
        let mut s = two_zone_system();
        let a = car(&mut s, "AAA1");
        let id = s.create_request(a, ZoneId::new(1)).unwrap().request().id();
        s.occupy_slot(id).unwrap();
        s.release_slot(id).unwrap();

        let report = s.rollback(5).unwrap();
        assert_eq!(report.rolled_back(), 3);
        assert_eq!(s.request(id).unwrap().status(), RequestStatus::Requested);
        assert!(s.zones().iter_slots().all(|sl| sl.status() == SlotStatus::Available));

        // a second rollback has nothing left to undo
        assert_eq!(s.rollback(5), Err(RollbackError::EmptyHistory));
    }

    #[test]
    fn test_scenario_duplicate_plate_returns_same_vehicle() {
        let mut s = two_zone_system();
        let first = s
            .register_vehicle("ab-12", "Sara", VehicleClass::Car)
            .unwrap();
        assert!(first.is_new());
        let again = s
            .register_vehicle(" AB-12 ", "Someone Else", VehicleClass::Truck)
            .unwrap();
        assert!(!again.is_new());
        assert_eq!(first.vehicle(), again.vehicle());
        assert_eq!(s.vehicles().count(), 1);
        assert_eq!(
            s.vehicle_by_plate("ab-12").map(Vehicle::id),
            Some(first.vehicle().id())
        );
    }

    #[test]
    fn test_invalid_plate_is_rejected() {
        let mut s = two_zone_system();
        let err = s
            .register_vehicle("X", "Nobody", VehicleClass::Car)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPlate(_)));
        assert_eq!(s.vehicles().count(), 0);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let mut s = two_zone_system();
        let a = car(&mut s, "AAA1");
        assert_eq!(
            s.create_request(VehicleId::new(99), ZoneId::new(1)).unwrap_err(),
            SystemError::VehicleNotFound(VehicleId::new(99))
        );
        assert_eq!(
            s.create_request(a, ZoneId::new(99)).unwrap_err(),
            SystemError::ZoneNotFound(ZoneId::new(99))
        );
        assert_eq!(s.requests().count(), 0);
        assert_eq!(
            s.cancel_request(RequestId::new(5)).unwrap_err(),
            SystemError::RequestNotFound(RequestId::new(5))
        );
        assert!(s.zone_analytics(ZoneId::new(99)).is_none());
    }

    #[test]
    fn test_queries_and_history() {
        let mut s = two_zone_system();
        let a = car(&mut s, "AAA1");
        let b = car(&mut s, "BBB2");
        let c = car(&mut s, "CCC3");
        let d = car(&mut s, "DDD4");
        let ra = s.create_request(a, ZoneId::new(1)).unwrap().request().id();
        s.create_request(b, ZoneId::new(1)).unwrap();
        s.create_request(c, ZoneId::new(1)).unwrap();
        // city is full now
        let rd = s.create_request(d, ZoneId::new(1)).unwrap().request().id();
        s.occupy_slot(ra).unwrap();

        assert_eq!(s.active_requests().count(), 3);
        assert_eq!(s.pending_requests().map(ParkingRequest::id).collect::<Vec<_>>(), vec![rd]);
        assert_eq!(s.requests_with_status(RequestStatus::Occupied).count(), 1);

        let kinds: Vec<_> = s.recent_operations(DEFAULT_RECENT_OPERATIONS).map(Operation::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Occupy,
                OperationKind::Allocate,
                OperationKind::Allocate,
                OperationKind::Allocate
            ]
        );

        let za = s.zone_analytics(ZoneId::new(2)).unwrap();
        assert_eq!(za.allocated, 2);
        assert_eq!(za.utilization_percent, 100);

        s.clear_history();
        assert_eq!(s.rollback_depth(), 0);
        assert_eq!(s.rollback(1), Err(RollbackError::EmptyHistory));
    }

    #[test]
    fn test_retry_allocation_after_capacity_frees_up() {
        let layout = CityLayout::new().zone(ZoneSpec::new("One", "Z1", 1.0).area(lot(1)));
        let mut s = ParkingSystem::with_clock(SystemConfig::default(), &layout, ManualClock::default())
            .unwrap();
        let a = car(&mut s, "AAA1");
        let b = car(&mut s, "BBB2");
        let ra = s.create_request(a, ZoneId::new(1)).unwrap().request().id();
        let rb = s.create_request(b, ZoneId::new(1)).unwrap().request().id();
        assert!(s.retry_allocation(rb).is_err());
        s.cancel_request(ra).unwrap();
        let alloc = s.retry_allocation(rb).unwrap();
        assert_eq!(alloc.tier(), SearchTier::Preferred);
        assert_eq!(s.request(rb).unwrap().status(), RequestStatus::Allocated);
    }

    #[test]
    fn test_connect_zones_changes_search_order() {
        let layout = CityLayout::new()
            .zone(ZoneSpec::new("One", "Z1", 1.0).area(lot(1)))
            .zone(ZoneSpec::new("Two", "Z2", 1.2).area(lot(1)));
        let mut s = ParkingSystem::with_clock(SystemConfig::default(), &layout, ManualClock::default())
            .unwrap();
        let a = car(&mut s, "AAA1");
        let b = car(&mut s, "BBB2");
        s.create_request(a, ZoneId::new(2)).unwrap();
        // remote tier before the edge exists
        let remote = s.create_request(b, ZoneId::new(2)).unwrap();
        assert!(remote.allocation().unwrap().penalty().approx_eq(Penalty::new(20.0), 1e-9));

        assert_eq!(s.connect_zones(ZoneId::new(2), ZoneId::new(1)), Ok(true));
        assert_eq!(s.connect_zones(ZoneId::new(2), ZoneId::new(1)), Ok(false));
        assert_eq!(
            s.connect_zones(ZoneId::new(2), ZoneId::new(7)),
            Err(SystemError::ZoneNotFound(ZoneId::new(7)))
        );
    }

    #[test]
    fn test_export_state_contains_everything() {
        let mut s = two_zone_system();
        let a = car(&mut s, "AAA1");
        s.create_request(a, ZoneId::new(1)).unwrap();
        let snap = s.export_state();
        assert_eq!(snap.zones.len(), 2);
        assert_eq!(snap.vehicles.len(), 1);
        assert_eq!(snap.requests.len(), 1);
        assert_eq!(snap.operation_history.len(), 1);
        assert_eq!(snap.exported_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_self_check_passes_on_reference_city() {
        let mut s = ParkingSystem::with_clock(
            SystemConfig::default(),
            &CityLayout::default(),
            ManualClock::default(),
        )
        .unwrap();
        let results = s.run_self_check();
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn test_custom_base_penalty_flows_into_allocations() {
        let layout = CityLayout::new()
            .zone(ZoneSpec::new("One", "Z1", 1.0).area(lot(1)))
            .zone(ZoneSpec::new("Two", "Z2", 1.5).area(lot(1)))
            .edge("Z1", "Z2");
        let config = SystemConfigBuilder::new().base_penalty(4.0).build().unwrap();
        let mut s = ParkingSystem::with_clock(config, &layout, ManualClock::default()).unwrap();
        let a = car(&mut s, "AAA1");
        let b = car(&mut s, "BBB2");
        s.create_request(a, ZoneId::new(1)).unwrap();
        let out = s.create_request(b, ZoneId::new(1)).unwrap();
        assert!(out.allocation().unwrap().penalty().approx_eq(Penalty::new(6.0), 1e-9));
    }
}
