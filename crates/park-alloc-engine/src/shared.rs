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

//! Cloneable, thread-safe handle around a [`ParkingSystem`].

use crate::system::ParkingSystem;
use parking_lot::{Mutex, MutexGuard};
use park_alloc_core::time::{Clock, SystemClock};
use std::sync::Arc;

/// Every clone refers to the same system. Calls are serialized by one lock,
/// so each public operation stays atomic with respect to the others.
pub struct SharedParkingSystem<C: Clock = SystemClock> {
    inner: Arc<Mutex<ParkingSystem<C>>>,
}

impl<C: Clock> Clone for SharedParkingSystem<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> From<ParkingSystem<C>> for SharedParkingSystem<C> {
    fn from(system: ParkingSystem<C>) -> Self {
        Self::new(system)
    }
}

impl<C: Clock> SharedParkingSystem<C> {
    pub fn new(system: ParkingSystem<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(system)),
        }
    }

    /// Runs `f` with exclusive access and returns its result.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut ParkingSystem<C>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Holds the lock until the guard drops. Use for multi-step sequences
    /// that must not interleave with other callers.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, ParkingSystem<C>> {
        self.inner.lock()
    }

    /// Returns the system if this is the last handle.
    pub fn try_unwrap(self) -> Result<ParkingSystem<C>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;
    use park_alloc_core::{id::VehicleId, time::ManualClock};
    use park_alloc_model::{layout::CityLayout, slot::SlotStatus, vehicle::VehicleClass};
    use static_assertions::assert_impl_all;
    use std::collections::HashSet;

    assert_impl_all!(SharedParkingSystem: Send, Sync, Clone);
    assert_impl_all!(SharedParkingSystem<ManualClock>: Send, Sync, Clone);

    fn shared() -> SharedParkingSystem<ManualClock> {
        ParkingSystem::with_clock(
            SystemConfig::default(),
            &CityLayout::default(),
            ManualClock::default(),
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_clones_see_the_same_system() {
        let a = shared();
        let b = a.clone();
        a.with(|s| s.register_vehicle("ABC123", "Ann", VehicleClass::Car))
            .unwrap();
        assert!(b.with(|s| s.vehicle_by_plate("abc123").is_some()));
    }

    #[test]
    fn test_concurrent_requests_never_share_a_slot() {
        let system = shared();
        let vehicles: Vec<VehicleId> = (0..64)
            .map(|i| {
                system
                    .with(|s| s.register_vehicle(&format!("CAR{i:04}"), "Driver", VehicleClass::Car))
                    .unwrap()
                    .vehicle()
                    .id()
            })
            .collect();
        let zone = system.with(|s| s.zones().ids().next()).unwrap();

        std::thread::scope(|scope| {
            for chunk in vehicles.chunks(16) {
                let handle = system.clone();
                scope.spawn(move || {
                    for &v in chunk {
                        handle.with(|s| s.create_request(v, zone)).unwrap();
                    }
                });
            }
        });

        let guard = system.lock();
        let slots: Vec<_> = guard
            .active_requests()
            .filter_map(|r| r.allocated_slot())
            .collect();
        let unique: HashSet<_> = slots.iter().copied().collect();
        assert_eq!(slots.len(), 64);
        assert_eq!(unique.len(), slots.len());
        let bound = guard
            .zones()
            .iter_slots()
            .filter(|s| s.status() == SlotStatus::Allocated)
            .count();
        assert_eq!(bound, 64);
    }

    #[test]
    fn test_try_unwrap_needs_last_handle() {
        let a = shared();
        let b = a.clone();
        let Err(a) = a.try_unwrap() else {
            panic!("another handle is still alive");
        };
        drop(b);
        assert!(a.try_unwrap().is_ok());
    }
}
