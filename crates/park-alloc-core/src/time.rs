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

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

pub type Timestamp = DateTime<Utc>;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Source of "now" for every state transition.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let ms = self.millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Elapsed time in whole minutes, halves rounded up. Negative spans yield 0.
pub fn whole_minutes_between(start: Timestamp, end: Timestamp) -> u64 {
    let ms = (end - start).num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    ((ms + MILLIS_PER_MINUTE / 2) / MILLIS_PER_MINUTE) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ninety_seconds_round_up_to_two_minutes() {
        let t0 = DateTime::UNIX_EPOCH;
        assert_eq!(whole_minutes_between(t0, t0 + TimeDelta::seconds(90)), 2);
    }

    #[test]
    fn test_just_below_half_rounds_down() {
        let t0 = DateTime::UNIX_EPOCH;
        let t1 = t0 + TimeDelta::milliseconds(89_999);
        assert_eq!(whole_minutes_between(t0, t1), 1);
    }

    #[test]
    fn test_reversed_span_is_zero() {
        let t0 = DateTime::UNIX_EPOCH + TimeDelta::minutes(5);
        assert_eq!(whole_minutes_between(t0, DateTime::UNIX_EPOCH), 0);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let handle = clock.clone();
        handle.advance(TimeDelta::minutes(3));
        assert_eq!(clock.now(), DateTime::UNIX_EPOCH + TimeDelta::minutes(3));
    }
}
