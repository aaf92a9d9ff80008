//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::config::{EconomyConfig, ProductionRules};
use crate::economy::Economy;
use crate::id::PlaceId;
use crate::place::PlaceKind;
use crate::resource::{Resource, Worker};
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};

// ===========================================================================
// Runtime and economy
// ===========================================================================

/// A small multi-threaded runtime for production cycles.
pub fn runtime() -> Runtime {
    Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .expect("failed to build test runtime")
}

/// Millisecond cycles and no randomness, so runs finish quickly and
/// predictably.
pub fn fast_rules() -> ProductionRules {
    ProductionRules {
        cycle_ms: 4,
        delivery_cooldown_ms: 1,
        ..ProductionRules::deterministic()
    }
}

/// An empty seeded economy with [`fast_rules`].
pub fn economy(rt: &Runtime) -> Economy {
    economy_with(rt, fast_rules())
}

pub fn economy_with(rt: &Runtime, rules: ProductionRules) -> Economy {
    let config = EconomyConfig {
        seed: Some(0x5151),
        rules,
    };
    Economy::new(&config, rt.handle().clone())
}

// ===========================================================================
// Resources
// ===========================================================================

pub fn worker(viability: f64) -> Resource {
    Resource::Worker(Worker::with_viability(viability))
}

/// Drop `count` fresh workers into `place`.
pub fn add_workers(eco: &mut Economy, place: PlaceId, count: usize) {
    for _ in 0..count {
        eco.insert_resource(place, worker(1.0));
    }
}

// ===========================================================================
// Layouts
// ===========================================================================

/// The places of one worker loop, see [`factory_loop`].
#[derive(Debug, Clone, Copy)]
pub struct FactoryLoop {
    pub road: PlaceId,
    pub factory: PlaceId,
    pub magazine: PlaceId,
}

/// Road -> Factory -> Magazine, with the factory also returning its workers
/// to the road. Placed in a row starting at `(x, y)`.
pub fn factory_loop(eco: &mut Economy, x: f32, y: f32) -> FactoryLoop {
    let road = eco.add_place(PlaceKind::Road, x, y);
    let factory = eco.add_place(PlaceKind::Factory, x + 200.0, y);
    let magazine = eco.add_place(PlaceKind::Magazine, x + 400.0, y);
    eco.connect(road, factory);
    eco.connect(factory, magazine);
    eco.connect(factory, road);
    FactoryLoop {
        road,
        factory,
        magazine,
    }
}

/// `count` independent factory loops, each stocked with `workers` workers.
pub fn factory_loops(eco: &mut Economy, count: usize, workers: usize) -> Vec<FactoryLoop> {
    (0..count)
        .map(|i| {
            let l = factory_loop(eco, 100.0, 100.0 + 200.0 * i as f32);
            add_workers(eco, l.road, workers);
            l
        })
        .collect()
}

// ===========================================================================
// Driving
// ===========================================================================

/// Tick `eco` until `done` holds, sleeping briefly between ticks. Returns
/// false on timeout.
pub fn tick_until(
    eco: &mut Economy,
    timeout: Duration,
    mut done: impl FnMut(&Economy) -> bool,
) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        eco.tick();
        if done(eco) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    done(eco)
}

/// Tick `eco` a fixed number of times, sleeping briefly between ticks.
pub fn tick_for(eco: &mut Economy, ticks: usize) {
    for _ in 0..ticks {
        eco.tick();
        std::thread::sleep(Duration::from_millis(1));
    }
}
