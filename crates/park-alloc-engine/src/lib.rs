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

//! # Parking Allocation Engine (`park-alloc-engine`)
//!
//! Stateful services on top of `park-alloc-model`:
//!
//! - **`AllocationEngine`**: three-tier slot search (preferred zone, adjacent
//!   zones, everything else) with per-tier penalties, plus the occupy,
//!   release and cancel transitions. Every applied change yields an
//!   `Operation` carrying the pre-transition statuses.
//! - **`RollbackManager`**: bounded undo stack of those operations.
//!   `rollback(k)` reverts the most recent `k`, newest first, restoring slot
//!   and request state exactly.
//! - **`AnalyticsEngine`**: read-only snapshots of utilization, durations,
//!   cross-zone counts, peak zones and the creation-hour histogram.
//! - **`ParkingSystem`**: the orchestrator owning every arena. It is generic
//!   over a `Clock`, so tests and workload replays run on simulated time.
//! - **`SharedParkingSystem`**: a cloneable handle serializing access through
//!   one lock.
//!
//! The engine performs no I/O and emits only `tracing` events.

pub mod allocation;
pub mod analytics;
pub mod config;
pub mod rollback;
pub mod shared;
pub mod system;
pub mod workload;

pub mod prelude {
    pub use crate::allocation::{
        Allocation, AllocationEngine, AllocationError, OperationError, SearchTier,
    };
    pub use crate::analytics::{Analytics, AnalyticsEngine, PeakZone, SlotStatusCounts, ZoneAnalytics};
    pub use crate::config::{
        AllocationConfig, AnalyticsConfig, ConfigBuildError, RollbackConfig, SystemConfig,
        SystemConfigBuilder,
    };
    pub use crate::rollback::{RollbackError, RollbackManager, RollbackReport};
    pub use crate::shared::SharedParkingSystem;
    pub use crate::system::{
        ParkingSystem, Registration, RegistrationError, RequestOutcome, SelfCheckResult,
        SystemError, SystemSnapshot,
    };
    pub use crate::workload::{ActionOutcome, WorkloadStats, apply_action, run_workload};
}
