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

//! # Parking Allocation Core (`park-alloc-core`)
//!
//! Foundational, domain-agnostic building blocks shared by the model and the
//! engine crates:
//!
//! - **Typed identifiers** (`ZoneId`, `AreaId`, `SlotId`, `VehicleId`, `RequestId`,
//!   `OperationId`) and the monotonic [`id::IdSequence`] that mints them. Because
//!   sequences only ever count upwards, ordering entities by id is the same as
//!   ordering them by creation.
//! - **`Penalty`** and **`PenaltyMultiplier`**, the numeric newtypes used to price
//!   cross-zone allocations.
//! - **`Clock`**, an injectable time source with a system and a manual
//!   implementation.
//! - **Ratio helpers** that round percentages and means the same way everywhere.

pub mod id;
pub mod penalty;
pub mod ratio;
pub mod time;

pub mod prelude {
    pub use crate::id::{AreaId, IdSequence, OperationId, RequestId, SlotId, VehicleId, ZoneId};
    pub use crate::penalty::{InvalidPenaltyMultiplierError, Penalty, PenaltyMultiplier};
    pub use crate::ratio::{percent, rounded_mean};
    pub use crate::time::{Clock, ManualClock, SystemClock, Timestamp, whole_minutes_between};
}
