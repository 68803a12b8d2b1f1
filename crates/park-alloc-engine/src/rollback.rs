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

use park_alloc_core::{
    id::RequestId,
    penalty::Penalty,
    time::Timestamp,
};
use park_alloc_model::{
    operation::Operation,
    request::{ParkingRequest, RequestStatus},
    zone::ZoneMap,
};
use serde::Serialize;
use std::{
    collections::{BTreeMap, VecDeque},
    fmt::Display,
};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackError {
    ZeroCount,
    EmptyHistory,
}

impl Display for RollbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackError::ZeroCount => write!(f, "Rollback count must be positive"),
            RollbackError::EmptyHistory => write!(f, "No operations to roll back"),
        }
    }
}

impl std::error::Error for RollbackError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackReport {
    requested: usize,
    rolled_back: usize,
    details: Vec<String>,
}

impl RollbackReport {
    #[inline]
    pub fn requested(&self) -> usize {
        self.requested
    }

    #[inline]
    pub fn rolled_back(&self) -> usize {
        self.rolled_back
    }

    /// One line per attempted operation, most recent first.
    #[inline]
    pub fn details(&self) -> &[String] {
        &self.details
    }

    #[inline]
    pub fn success(&self) -> bool {
        self.rolled_back > 0
    }
}

impl Display for RollbackReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rolled back {} of {} requested operation(s)",
            self.rolled_back, self.requested
        )
    }
}

/// Bounded undo stack of applied operations.
///
/// Once `capacity` is reached every push silently evicts the oldest entry,
/// which can then no longer be undone.
#[derive(Debug, Clone)]
pub struct RollbackManager {
    history: VecDeque<Operation>,
    capacity: usize,
}

impl Default for RollbackManager {
    fn default() -> Self {
        Self::new(1_000)
    }
}

impl RollbackManager {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity.min(1_024)),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Records `operation`, returning the evicted one if the stack was full.
    pub fn push(&mut self, operation: Operation) -> Option<Operation> {
        let evicted = if self.history.len() >= self.capacity {
            self.history.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            debug!(evicted = %old.id(), "History full; dropped oldest operation");
        }
        self.history.push_back(operation);
        evicted
    }

    /// Oldest first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &Operation> {
        self.history.iter()
    }

    /// Up to `count` operations, most recent first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Operation> {
        self.history.iter().rev().take(count)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Reverts the last `count` operations, most recent first. `count` is
    /// clamped to the current depth.
    ///
    /// Each operation is popped whether or not it can be reverted; one whose
    /// request no longer exists is reported and skipped.
    #[instrument(level = "debug", skip_all, fields(count = count, depth = self.history.len()))]
    pub fn rollback(
        &mut self,
        count: usize,
        zones: &mut ZoneMap,
        requests: &mut BTreeMap<RequestId, ParkingRequest>,
        at: Timestamp,
    ) -> Result<RollbackReport, RollbackError> {
        if count == 0 {
            return Err(RollbackError::ZeroCount);
        }
        if self.history.is_empty() {
            return Err(RollbackError::EmptyHistory);
        }

        let effective = count.min(self.history.len());
        let mut report = RollbackReport {
            requested: count,
            rolled_back: 0,
            details: Vec::with_capacity(effective),
        };

        for _ in 0..effective {
            let Some(op) = self.history.pop_back() else {
                break;
            };
            match revert(&op, zones, requests, at) {
                Ok(line) => {
                    report.rolled_back += 1;
                    report.details.push(line);
                }
                Err(line) => {
                    warn!(operation = %op.id(), "{}", line);
                    report.details.push(line);
                }
            }
        }

        debug!(rolled_back = report.rolled_back, "Rollback finished");
        Ok(report)
    }
}

fn revert(
    op: &Operation,
    zones: &mut ZoneMap,
    requests: &mut BTreeMap<RequestId, ParkingRequest>,
    at: Timestamp,
) -> Result<String, String> {
    let Some(request) = requests.get_mut(&op.request()) else {
        return Err(format!("Skipped {}: {} not found", op, op.request()));
    };

    let mut slot_note = String::new();
    if let Some(slot_id) = op.slot() {
        let previous = op.previous_slot_status();
        match zones.slot_mut(slot_id) {
            Some(slot) => {
                let binding = (!previous.is_free()).then_some(op.request());
                slot.restore_state(previous, binding, at);
                slot_note = format!(", slot {} -> {}", slot_id, previous);
            }
            None => slot_note = format!(", slot {} missing", slot_id),
        }
    }

    let from = request.status();
    let to = op.previous_request_status();
    if to == RequestStatus::Requested {
        request.restore_state(to, None, None, Penalty::ZERO);
    } else {
        request.restore_state(
            to,
            request.allocated_slot(),
            request.allocated_zone(),
            request.penalty(),
        );
    }

    Ok(format!(
        "Reverted {}: {} -> {}{}",
        op, from, to, slot_note
    ))
}
