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

use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[inline]
            pub const fn new(id: u64) -> Self {
                $name(id)
            }

            #[inline]
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $label, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

entity_id!(
    /// Identifies a city zone.
    ZoneId,
    "ZoneId"
);
entity_id!(
    /// Identifies a parking area inside a zone.
    AreaId,
    "AreaId"
);
entity_id!(
    /// Identifies a single slot. Unique across the whole city, not just its area.
    SlotId,
    "SlotId"
);
entity_id!(VehicleId, "VehicleId");
entity_id!(RequestId, "RequestId");
entity_id!(OperationId, "OperationId");

/// Monotonic id source for one entity kind.
///
/// Ids start at 1 and are never reused, so an ordered map keyed by the
/// produced ids iterates in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence<I> {
    next: u64,
    _kind: PhantomData<I>,
}

impl<I> Default for IdSequence<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> IdSequence<I> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            next: 1,
            _kind: PhantomData,
        }
    }

    /// Number of ids handed out so far.
    #[inline]
    pub const fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl<I: From<u64>> IdSequence<I> {
    #[inline]
    pub fn next_id(&mut self) -> I {
        let id = self.next;
        self.next += 1;
        I::from(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic_and_starts_at_one() {
        let mut seq: IdSequence<SlotId> = IdSequence::new();
        let a = seq.next_id();
        let b = seq.next_id();
        let c = seq.next_id();
        assert_eq!(a, SlotId::new(1));
        assert!(a < b && b < c);
        assert_eq!(seq.issued(), 3);
    }

    #[test]
    fn test_display_carries_kind_label() {
        assert_eq!(ZoneId::new(7).to_string(), "ZoneId(7)");
        assert_eq!(OperationId::new(3).to_string(), "OperationId(3)");
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let id = RequestId::new(42);
        assert_eq!(u64::from(id), 42);
        assert_eq!(RequestId::from(42u64), id);
    }
}
