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
    id::{OperationId, RequestId, SlotId},
    time::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Allocate,
    Occupy,
    Release,
    Cancel,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationKind::Allocate => "ALLOCATE",
            OperationKind::Occupy => "OCCUPY",
            OperationKind::Release => "RELEASE",
            OperationKind::Cancel => "CANCEL",
        };
        f.write_str(s)
    }
}

/// Immutable record of one applied transition, carrying what is needed to undo it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    id: OperationId,
    request: RequestId,
    slot: Option<SlotId>,
    previous_slot_status: SlotStatus,
    previous_request_status: RequestStatus,
    kind: OperationKind,
    timestamp: Timestamp,
}

impl Operation {
    pub fn new(
        id: OperationId,
        request: RequestId,
        slot: Option<SlotId>,
        previous_slot_status: SlotStatus,
        previous_request_status: RequestStatus,
        kind: OperationKind,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            request,
            slot,
            previous_slot_status,
            previous_request_status,
            kind,
            timestamp,
        }
    }

    #[inline]
    pub fn id(&self) -> OperationId {
        self.id
    }

    #[inline]
    pub fn request(&self) -> RequestId {
        self.request
    }

    /// `None` for a cancel of a request that never held a slot.
    #[inline]
    pub fn slot(&self) -> Option<SlotId> {
        self.slot
    }

    #[inline]
    pub fn previous_slot_status(&self) -> SlotStatus {
        self.previous_slot_status
    }

    #[inline]
    pub fn previous_request_status(&self) -> RequestStatus {
        self.previous_request_status
    }

    #[inline]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} for {}", self.id, self.kind, self.request)?;
        if let Some(slot) = self.slot {
            write!(f, " on {}", slot)?;
        }
        Ok(())
    }
}
