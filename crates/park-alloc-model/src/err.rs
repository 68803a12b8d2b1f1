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

use crate::{request::RequestStatus, slot::SlotStatus};
use park_alloc_core::{
    id::{RequestId, SlotId},
    penalty::InvalidPenaltyMultiplierError,
};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidPlateError {
    plate: String,
}

impl InvalidPlateError {
    #[inline]
    pub fn new(plate: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
        }
    }

    #[inline]
    pub fn plate(&self) -> &str {
        &self.plate
    }
}

impl Display for InvalidPlateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid license plate '{}': expected 2-10 alphanumeric characters",
            self.plate
        )
    }
}

impl std::error::Error for InvalidPlateError {}

/// The slot-side transition that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotAction {
    Allocate,
    Occupy,
    Release,
    CancelAllocation,
}

impl Display for SlotAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotAction::Allocate => "allocate",
            SlotAction::Occupy => "occupy",
            SlotAction::Release => "release",
            SlotAction::CancelAllocation => "cancel allocation of",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotTransitionError {
    slot: SlotId,
    action: SlotAction,
    status: SlotStatus,
}

impl SlotTransitionError {
    #[inline]
    pub fn new(slot: SlotId, action: SlotAction, status: SlotStatus) -> Self {
        Self {
            slot,
            action,
            status,
        }
    }

    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    #[inline]
    pub fn action(&self) -> SlotAction {
        self.action
    }

    #[inline]
    pub fn status(&self) -> SlotStatus {
        self.status
    }
}

impl Display for SlotTransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot {} slot {} while it is {}",
            self.action, self.slot, self.status
        )
    }
}

impl std::error::Error for SlotTransitionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidTransitionError {
    request: RequestId,
    from: RequestStatus,
    to: RequestStatus,
}

impl InvalidTransitionError {
    #[inline]
    pub fn new(request: RequestId, from: RequestStatus, to: RequestStatus) -> Self {
        Self { request, from, to }
    }

    #[inline]
    pub fn request(&self) -> RequestId {
        self.request
    }

    #[inline]
    pub fn from(&self) -> RequestStatus {
        self.from
    }

    #[inline]
    pub fn to(&self) -> RequestStatus {
        self.to
    }
}

impl Display for InvalidTransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid transition for request {}: {} -> {}",
            self.request, self.from, self.to
        )
    }
}

impl std::error::Error for InvalidTransitionError {}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    InvalidMultiplier {
        zone_code: String,
        source: InvalidPenaltyMultiplierError,
    },
    NoAreas(String),
    EmptyArea { zone_code: String, area: String },
    DuplicateZoneCode(String),
    UnknownZoneCode(String),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LayoutError::*;
        match self {
            InvalidMultiplier { zone_code, source } => {
                write!(f, "Zone '{}': {}", zone_code, source)
            }
            NoAreas(code) => write!(f, "Zone '{}' has no parking areas", code),
            EmptyArea { zone_code, area } => {
                write!(f, "Area '{}' in zone '{}' has no slots", area, zone_code)
            }
            DuplicateZoneCode(code) => write!(f, "Duplicate zone code '{}'", code),
            UnknownZoneCode(code) => write!(f, "Unknown zone code '{}' in adjacency", code),
        }
    }
}

impl std::error::Error for LayoutError {}
