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

//! # Parking Allocation Model (`park-alloc-model`)
//!
//! The domain model of a multi-zone parking city, built on the primitives of
//! `park-alloc-core`.
//!
//! ## Key Data Structures
//!
//! - **`Slot`**: the atomic allocatable unit. Holds its status, its fixed
//!   vehicle-class designation and capability flags, and the request bound to
//!   it. All slot transitions are checked and return a `SlotTransitionError`
//!   on a precondition violation.
//! - **`Area`**: an ordered, fixed list of slots. Slot order is search order.
//! - **`Zone`**: ordered areas, a penalty multiplier and a directed adjacency
//!   list. `ZoneMap` keeps all zones keyed by id, which is creation order.
//! - **`Vehicle`**: a registered identity with a normalized licence plate.
//! - **`ParkingRequest`**: binds a vehicle to a preferred zone and owns the
//!   lifecycle state machine (`RequestStatus::allowed_transitions`).
//! - **`Operation`**: the immutable record of one applied transition, holding
//!   the pre-transition statuses needed to undo it.
//!
//! `CityLayout` describes a city declaratively and builds a `ZoneMap` from it;
//! `WorkloadGenerator` produces seeded action streams for demos and tests.

pub mod area;
pub mod err;
pub mod generator;
pub mod layout;
pub mod operation;
pub mod request;
pub mod slot;
pub mod vehicle;
pub mod zone;

pub mod prelude {
    pub use crate::area::{Area, AreaLocation, AreaSpec, SlotCounts, SlotMix};
    pub use crate::err::{
        InvalidPlateError, InvalidTransitionError, LayoutError, SlotAction, SlotTransitionError,
    };
    pub use crate::generator::{
        ActionWeights, WorkloadAction, WorkloadConfig, WorkloadConfigBuildError,
        WorkloadConfigBuilder, WorkloadGenerator,
    };
    pub use crate::layout::{CityLayout, HierarchyIds};
    pub use crate::operation::{Operation, OperationKind};
    pub use crate::request::{ParkingRequest, RequestStatus};
    pub use crate::slot::{Slot, SlotFeatures, SlotStatus};
    pub use crate::vehicle::{Vehicle, VehicleClass};
    pub use crate::zone::{Zone, ZoneMap, ZoneSpec};
}
