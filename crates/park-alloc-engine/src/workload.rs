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

//! Replays generated workloads against a simulated-time system.

use crate::system::ParkingSystem;
use chrono::TimeDelta;
use park_alloc_core::{id::RequestId, time::ManualClock};
use park_alloc_model::{generator::WorkloadAction, request::RequestStatus};
use serde::Serialize;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A new vehicle was registered or an existing one was found.
    Registered,
    Requested { allocated: bool },
    /// Occupy, release or cancel succeeded and was recorded.
    Applied,
    RolledBack(usize),
    ClockAdvanced,
    /// The system refused the action.
    Rejected,
    /// Nothing to target, e.g. an occupy with no allocated requests.
    Skipped,
}

impl ActionOutcome {
    /// Number of operations this action pushed onto the undo stack.
    #[inline]
    pub fn operations_recorded(self) -> usize {
        match self {
            ActionOutcome::Requested { allocated: true } | ActionOutcome::Applied => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WorkloadStats {
    pub actions: usize,
    pub registrations: usize,
    pub requests: usize,
    pub allocations: usize,
    pub unallocated: usize,
    pub transitions: usize,
    pub rollbacks: usize,
    pub operations_rolled_back: usize,
    pub rejected: usize,
    pub skipped: usize,
}

impl WorkloadStats {
    pub fn record(&mut self, outcome: ActionOutcome) {
        self.actions += 1;
        match outcome {
            ActionOutcome::Registered => self.registrations += 1,
            ActionOutcome::Requested { allocated } => {
                self.requests += 1;
                if allocated {
                    self.allocations += 1;
                } else {
                    self.unallocated += 1;
                }
            }
            ActionOutcome::Applied => self.transitions += 1,
            ActionOutcome::RolledBack(n) => {
                self.rollbacks += 1;
                self.operations_rolled_back += n;
            }
            ActionOutcome::ClockAdvanced => {}
            ActionOutcome::Rejected => self.rejected += 1,
            ActionOutcome::Skipped => self.skipped += 1,
        }
    }
}

fn pick_request(
    system: &ParkingSystem<ManualClock>,
    pick: usize,
    accept: impl Fn(RequestStatus) -> bool,
) -> Option<RequestId> {
    let candidates: Vec<RequestId> = system
        .requests()
        .filter(|r| accept(r.status()))
        .map(|r| r.id())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[pick % candidates.len()])
}

/// Applies one action. Picks are reduced modulo the current candidates.
pub fn apply_action(system: &mut ParkingSystem<ManualClock>, action: &WorkloadAction) -> ActionOutcome {
    trace!(?action, "Applying workload action");
    match action {
        WorkloadAction::RegisterVehicle { plate, owner, class } => {
            match system.register_vehicle(plate, owner, *class) {
                Ok(_) => ActionOutcome::Registered,
                Err(_) => ActionOutcome::Rejected,
            }
        }
        WorkloadAction::CreateRequest {
            vehicle_pick,
            zone_pick,
        } => {
            let vehicles: Vec<_> = system.vehicles().map(|v| v.id()).collect();
            let zones: Vec<_> = system.zones().ids().collect();
            if vehicles.is_empty() || zones.is_empty() {
                return ActionOutcome::Skipped;
            }
            let vehicle = vehicles[vehicle_pick % vehicles.len()];
            let zone = zones[zone_pick % zones.len()];
            match system.create_request(vehicle, zone) {
                Ok(outcome) => ActionOutcome::Requested {
                    allocated: outcome.success(),
                },
                Err(_) => ActionOutcome::Rejected,
            }
        }
        WorkloadAction::Occupy { pick } => {
            let Some(id) = pick_request(system, *pick, |s| s == RequestStatus::Allocated) else {
                return ActionOutcome::Skipped;
            };
            applied(system.occupy_slot(id).is_ok())
        }
        WorkloadAction::Release { pick } => {
            let Some(id) = pick_request(system, *pick, |s| s == RequestStatus::Occupied) else {
                return ActionOutcome::Skipped;
            };
            applied(system.release_slot(id).is_ok())
        }
        WorkloadAction::Cancel { pick } => {
            let Some(id) = pick_request(system, *pick, |s| {
                matches!(s, RequestStatus::Requested | RequestStatus::Allocated)
            }) else {
                return ActionOutcome::Skipped;
            };
            applied(system.cancel_request(id).is_ok())
        }
        WorkloadAction::Rollback { count } => match system.rollback(*count) {
            Ok(report) => ActionOutcome::RolledBack(report.rolled_back()),
            Err(_) => ActionOutcome::Skipped,
        },
        WorkloadAction::AdvanceClock { secs } => {
            system.clock().advance(TimeDelta::seconds(i64::from(*secs)));
            ActionOutcome::ClockAdvanced
        }
    }
}

#[inline]
fn applied(ok: bool) -> ActionOutcome {
    if ok {
        ActionOutcome::Applied
    } else {
        ActionOutcome::Rejected
    }
}

/// Applies every action in order and tallies the outcomes.
pub fn run_workload<I>(system: &mut ParkingSystem<ManualClock>, actions: I) -> WorkloadStats
where
    I: IntoIterator<Item = WorkloadAction>,
{
    let mut stats = WorkloadStats::default();
    for action in actions {
        stats.record(apply_action(system, &action));
    }
    stats
}
