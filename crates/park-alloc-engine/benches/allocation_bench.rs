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

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use park_alloc_core::{
    id::{VehicleId, ZoneId},
    time::ManualClock,
};
use park_alloc_engine::prelude::*;
use park_alloc_model::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

const CLASSES: [VehicleClass; 4] = [
    VehicleClass::Car,
    VehicleClass::Motorcycle,
    VehicleClass::Truck,
    VehicleClass::Electric,
];

struct Fixture {
    system: ParkingSystem<ManualClock>,
    vehicles: Vec<VehicleId>,
    zones: Vec<ZoneId>,
}

fn fixture(vehicles_n: usize, rng: &mut impl Rng) -> Fixture {
    let mut system = ParkingSystem::with_clock(
        SystemConfig::default(),
        &CityLayout::default(),
        ManualClock::default(),
    )
    .expect("reference city");
    let vehicles = (0..vehicles_n)
        .map(|i| {
            let class = CLASSES[rng.random_range(0..CLASSES.len())];
            system
                .register_vehicle(&format!("BEN-{i:05}"), "Bench", class)
                .expect("valid plate")
                .vehicle()
                .id()
        })
        .collect();
    let zones = system.zones().ids().collect();
    Fixture {
        system,
        vehicles,
        zones,
    }
}

fn gen_requests(f: &Fixture, n: usize, rng: &mut impl Rng) -> Vec<(VehicleId, ZoneId)> {
    (0..n)
        .map(|_| {
            let v = f.vehicles[rng.random_range(0..f.vehicles.len())];
            let z = f.zones[rng.random_range(0..f.zones.len())];
            (v, z)
        })
        .collect()
}

fn register_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_0001);

    for &n in &[50usize, 200, 400] {
        let base = fixture(n, &mut rng);
        let requests = gen_requests(&base, n, &mut rng);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::new("create_request", n), |b| {
            b.iter_batched(
                || fixture(n, &mut ChaCha8Rng::seed_from_u64(0x5EED_0001)),
                |mut f| {
                    let mut allocated = 0usize;
                    for &(v, z) in &requests {
                        if let Ok(outcome) = f.system.create_request(v, z)
                            && outcome.success()
                        {
                            allocated += 1;
                        }
                    }
                    black_box((allocated, f))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn register_search_order(c: &mut Criterion) {
    let f = fixture(1, &mut ChaCha8Rng::seed_from_u64(7));
    let engine = AllocationEngine::default();
    c.bench_function("search_order/reference_city", |b| {
        b.iter(|| {
            for &z in &f.zones {
                black_box(engine.search_order(f.system.zones(), z));
            }
        })
    });
}

fn register_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("rollback");

    for &n in &[10usize, 100, 200] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::new("undo", n), |b| {
            b.iter_batched(
                || {
                    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_0002);
                    let mut f = fixture(n, &mut rng);
                    let requests = gen_requests(&f, n, &mut rng);
                    for (v, z) in requests {
                        let _ = f.system.create_request(v, z);
                    }
                    f
                },
                |mut f| {
                    let depth = f.system.rollback_depth();
                    black_box(f.system.rollback(depth.max(1)).ok());
                    black_box(f)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn register_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("workload");

    for &steps in &[500usize, 2_000] {
        let config = WorkloadConfigBuilder::new()
            .steps(steps)
            .seed(0xC0FFEE)
            .build()
            .expect("valid workload config");
        let actions: Vec<WorkloadAction> = WorkloadGenerator::new(config.clone()).collect();
        group.throughput(Throughput::Elements(actions.len() as u64));
        group.bench_function(BenchmarkId::new("replay", steps), |b| {
            b.iter_batched(
                || {
                    ParkingSystem::with_clock(
                        SystemConfig::default(),
                        &CityLayout::default(),
                        ManualClock::default(),
                    )
                    .expect("reference city")
                },
                |mut system| {
                    let stats = run_workload(&mut system, actions.iter().cloned());
                    black_box((stats, system.analytics()))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn benches(c: &mut Criterion) {
    register_allocate(c);
    register_search_order(c);
    register_rollback(c);
    register_workload(c);
}

criterion_group!(allocation_benches, benches);
criterion_main!(allocation_benches);
