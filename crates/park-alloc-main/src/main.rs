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

use chrono::Utc;
use park_alloc_core::time::ManualClock;
use park_alloc_engine::prelude::*;
use park_alloc_model::prelude::*;
use std::{fs::File, io::BufWriter, time::Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SNAPSHOT_PATH: &str = "state_snapshot.json";

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn log_analytics(analytics: &Analytics) {
    info!(
        total = analytics.total_requests,
        allocated = analytics.allocated_requests,
        occupied = analytics.occupied_requests,
        utilization = analytics.utilization_percent,
        cancellations = analytics.cancellation_percent,
        cross_zone = analytics.cross_zone_allocations,
        penalties = %analytics.total_penalties,
        avg_minutes = analytics.average_duration_minutes,
        "City analytics"
    );
    for peak in &analytics.peak_zones {
        info!(zone = %peak.code, allocations = peak.allocations, "Peak zone");
    }
}

fn main() {
    enable_tracing();

    let clock = ManualClock::new(Utc::now());
    let mut system = ParkingSystem::with_clock(SystemConfig::default(), &CityLayout::default(), clock)
        .expect("reference city layout is valid");

    let config = WorkloadConfigBuilder::new()
        .initial_vehicles(40)
        .steps(400)
        .seed(42)
        .build()
        .expect("valid workload config");
    info!(actions = config.len(), seed = config.seed(), "Replaying workload");

    let t0 = Instant::now();
    let stats = run_workload(&mut system, WorkloadGenerator::new(config));
    info!(
        elapsed_ms = t0.elapsed().as_millis() as u64,
        requests = stats.requests,
        allocations = stats.allocations,
        unallocated = stats.unallocated,
        transitions = stats.transitions,
        rolled_back = stats.operations_rolled_back,
        rejected = stats.rejected,
        "Workload finished"
    );

    for zone in system.zones() {
        if let Some(z) = system.zone_analytics(zone.id()) {
            info!(
                zone = %z.code,
                total = z.total_slots,
                available = z.available,
                allocated = z.allocated,
                occupied = z.occupied,
                utilization = z.utilization_percent,
                "Zone"
            );
        }
    }
    log_analytics(&system.analytics());

    let checks = system.run_self_check();
    let passed = checks.iter().filter(|c| c.passed).count();
    for check in &checks {
        if check.passed {
            info!(name = check.name, "{}", check.message);
        } else {
            warn!(name = check.name, "{}", check.message);
        }
    }

    let snapshot = system.export_state();
    let file = File::create(SNAPSHOT_PATH).expect("create state snapshot file");
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot).expect("write state snapshot");

    println!();
    println!("=================================================================");
    println!("====================== Parking Run Done =========================");
    println!("=================================================================");
    println!();
    println!("Self-check: {passed}/{} passed", checks.len());
    println!("Wrote: {SNAPSHOT_PATH}");
}
