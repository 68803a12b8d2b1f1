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

//! Seeded stream of parking actions.
//!
//! The generator knows nothing about the live system. Actions that target
//! existing entities carry a raw `pick` which the consumer reduces modulo
//! whatever candidate list it has at that moment, so one stream can drive
//! any number of independent systems identically.

mod config;
mod err;

pub use config::{ActionWeights, WorkloadConfig, WorkloadConfigBuilder};
pub use err::WorkloadConfigBuildError;

use crate::vehicle::VehicleClass;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PLATE_PREFIXES: [&str; 6] = ["LEA", "LEB", "LEC", "LED", "LHR", "RWP"];
const OWNERS: [&str; 8] = [
    "Ahmed Khan",
    "Sara Malik",
    "Bilal Ahmed",
    "Fatima Noor",
    "Usman Tariq",
    "Ayesha Raza",
    "Hamza Ali",
    "Zainab Shah",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadAction {
    RegisterVehicle {
        plate: String,
        owner: String,
        class: VehicleClass,
    },
    CreateRequest {
        vehicle_pick: usize,
        zone_pick: usize,
    },
    /// Target one of the ALLOCATED requests.
    Occupy { pick: usize },
    /// Target one of the OCCUPIED requests.
    Release { pick: usize },
    /// Target one of the REQUESTED or ALLOCATED requests.
    Cancel { pick: usize },
    Rollback { count: usize },
    AdvanceClock { secs: u32 },
}

pub struct WorkloadGenerator {
    config: WorkloadConfig,
    rng: ChaCha8Rng,
    emitted: usize,
    plates_issued: u64,
}

impl From<WorkloadConfig> for WorkloadGenerator {
    fn from(config: WorkloadConfig) -> Self {
        Self::new(config)
    }
}

impl WorkloadGenerator {
    pub fn new(config: WorkloadConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            config,
            emitted: 0,
            plates_issued: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    fn vehicle_class(&mut self) -> VehicleClass {
        match self.rng.random_range(0..100u32) {
            0..60 => VehicleClass::Car,
            60..80 => VehicleClass::Motorcycle,
            80..90 => VehicleClass::Truck,
            _ => VehicleClass::Electric,
        }
    }

    fn register(&mut self) -> WorkloadAction {
        self.plates_issued += 1;
        let prefix = PLATE_PREFIXES[self.rng.random_range(0..PLATE_PREFIXES.len())];
        let owner = OWNERS[self.rng.random_range(0..OWNERS.len())];
        WorkloadAction::RegisterVehicle {
            plate: format!("{}-{:04}", prefix, self.plates_issued),
            owner: owner.to_string(),
            class: self.vehicle_class(),
        }
    }

    fn weighted(&mut self) -> WorkloadAction {
        let w = *self.config.weights();
        let mut roll = self.rng.random_range(0..w.total());

        let mut take = |weight: u32| {
            if roll < weight {
                true
            } else {
                roll -= weight;
                false
            }
        };

        if take(w.register) {
            return self.register();
        }
        let pick: usize = self.rng.random::<u64>() as usize;
        if take(w.request) {
            return WorkloadAction::CreateRequest {
                vehicle_pick: pick,
                zone_pick: self.rng.random::<u64>() as usize,
            };
        }
        if take(w.occupy) {
            return WorkloadAction::Occupy { pick };
        }
        if take(w.release) {
            return WorkloadAction::Release { pick };
        }
        if take(w.cancel) {
            return WorkloadAction::Cancel { pick };
        }
        if take(w.rollback) {
            return WorkloadAction::Rollback {
                count: self.rng.random_range(1..=self.config.max_rollback()),
            };
        }
        WorkloadAction::AdvanceClock {
            secs: self.rng.random_range(1..=self.config.max_advance_secs()),
        }
    }
}

impl Iterator for WorkloadGenerator {
    type Item = WorkloadAction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.config.len() {
            return None;
        }
        let action = if self.emitted < self.config.initial_vehicles() {
            self.register()
        } else {
            self.weighted()
        };
        self.emitted += 1;
        Some(action)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.config.len() - self.emitted;
        (left, Some(left))
    }
}

impl ExactSizeIterator for WorkloadGenerator {}
