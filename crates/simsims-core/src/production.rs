//! Production cycles of the four node kinds.
//!
//! A node moves through Idle -> Fetching -> Working -> Delivering -> Idle:
//!
//! 1. **Fetching** ([`fetch`]) runs inline on the main loop. It pulls at most
//!    one unit per required kind from ingoing containers and reports whether
//!    the node now holds enough input to run.
//! 2. **Working** ([`run_cycle`]) is an independent task: wait out the first
//!    half of the cycle, apply the kind's [`transform`], wait out the second
//!    half, then flag the output as waiting.
//! 3. **Delivering** happens from the main loop, when containers downstream
//!    pull the waiting output (see [`crate::container::give_resources`]).
//!
//! A node that cannot get its input simply stays idle; nothing here fails.
//! Resource loss (accidents, deaths, consumed rent) is part of the economy
//! and is reported only through [`CycleReport`].

use crate::config::ProductionRules;
use crate::container::place_resource;
use crate::place::{FLAT_MAX_WORKERS, Place, PlaceKind};
use crate::resource::{Resource, ResourceKind, Worker, count_kind};
use crate::rng::{SimRng, chance};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// What one transform did to a node's buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Units of Product or Food made.
    pub produced: usize,
    /// Workers created (flat population growth).
    pub born: usize,
    /// Workers lost to accidents, damage or poisoning.
    pub lost: usize,
    /// Inputs used up (rent paid at a flat, meals eaten at a diner).
    pub consumed: usize,
}

impl CycleReport {
    /// Add `other`'s counts to these.
    pub fn merge(&mut self, other: &CycleReport) {
        self.produced += other.produced;
        self.born += other.born;
        self.lost += other.lost;
        self.consumed += other.consumed;
    }
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Try to pull one unit of `kind` into `node` from the first ingoing
/// container that has one.
fn pull_one(
    node: &Place,
    sources: &[Arc<Place>],
    kind: ResourceKind,
    rules: &ProductionRules,
) -> bool {
    sources
        .iter()
        .filter(|s| s.kind().is_container() && s.produces(kind))
        .any(|s| place_resource(s, node, rules))
}

/// Pull whatever input `node` is missing from `sources` (its ingoing
/// neighbours, in connection order) and report whether it can now run.
pub fn fetch(
    node: &Place,
    sources: &[Arc<Place>],
    rules: &ProductionRules,
    rng: &mut SimRng,
) -> bool {
    use ResourceKind::{Food, Product, Worker};

    match node.kind() {
        PlaceKind::Factory | PlaceKind::Field => {
            if node.resource_count() == 0 {
                pull_one(node, sources, Worker, rules);
            }
            node.count(Worker) > 0
        }
        PlaceKind::Flat => {
            if node.count(Product) == 0 {
                pull_one(node, sources, Product, rules);
            }
            if node.count(Worker) == 0 {
                // Once one worker has moved in, a second follows only by
                // chance.
                for _ in 0..FLAT_MAX_WORKERS {
                    pull_one(node, sources, Worker, rules);
                    if node.count(Worker) >= FLAT_MAX_WORKERS
                        || !chance(rng, rules.flat_second_worker_chance)
                    {
                        break;
                    }
                }
            }
            let workers = node.count(Worker);
            node.count(Product) >= 1 && (1..=FLAT_MAX_WORKERS).contains(&workers)
        }
        PlaceKind::Diner => {
            if node.count(Food) == 0 {
                pull_one(node, sources, Food, rules);
            }
            if node.count(Worker) == 0 {
                pull_one(node, sources, Worker, rules);
            }
            node.count(Food) > 0 && node.count(Worker) > 0
        }
        PlaceKind::Magazine | PlaceKind::Barn | PlaceKind::Road => false,
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Slow-down factor for a worker: 1 at full viability, 2 at zero or below.
pub fn viability_penalty(viability: f64) -> f64 {
    if viability.is_nan() {
        return 2.0;
    }
    (2.0 - viability).clamp(0.0, 2.0)
}

/// The two waits of a cycle: before the transform and after it.
///
/// Factories and fields run the first half slower the less viable their
/// first worker is.
pub fn cycle_delays(
    kind: PlaceKind,
    resources: &[Resource],
    rules: &ProductionRules,
) -> (Duration, Duration) {
    let half = rules.cycle() / 2;
    match kind {
        PlaceKind::Factory | PlaceKind::Field => {
            let viability = resources
                .iter()
                .find_map(Resource::as_worker)
                .map_or(1.0, Worker::viability);
            (half.mul_f64(viability_penalty(viability)), half)
        }
        _ => (half, half),
    }
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Draw the viability change for one meal: uniform in the configured gain
/// range, turned into a loss (scaled by the poison factor) on food
/// poisoning.
pub fn diner_viability_delta<R: Rng + ?Sized>(rules: &ProductionRules, rng: &mut R) -> f64 {
    let (min, max) = (rules.diner_min_viability_gain, rules.diner_max_viability_gain);
    let gain = if min < max { rng.gen_range(min..=max) } else { min };
    if chance(rng, rules.diner_poison_chance) {
        rules.diner_poison_factor * gain
    } else {
        gain
    }
}

/// Apply one production step of `kind` to `resources`.
pub fn transform<R: Rng + ?Sized>(
    kind: PlaceKind,
    resources: &mut Vec<Resource>,
    rules: &ProductionRules,
    rng: &mut R,
) -> CycleReport {
    match kind {
        PlaceKind::Factory => work_shift(
            resources,
            Resource::Product,
            rules.factory_accident_chance,
            rules.factory_worker_damage,
            rng,
        ),
        PlaceKind::Field => {
            work_shift(resources, Resource::Food, rules.field_accident_chance, 0.0, rng)
        }
        PlaceKind::Flat => house(resources, rules),
        PlaceKind::Diner => feed(resources, rules, rng),
        PlaceKind::Magazine | PlaceKind::Barn | PlaceKind::Road => CycleReport::default(),
    }
}

/// Factory and field: each worker makes one unit of `output`, then either
/// has an accident or takes `damage`; either one removes the worker.
fn work_shift<R: Rng + ?Sized>(
    resources: &mut Vec<Resource>,
    output: Resource,
    accident_chance: f64,
    damage: f64,
    rng: &mut R,
) -> CycleReport {
    let mut report = CycleReport::default();
    let mut made = Vec::new();
    resources.retain_mut(|r| {
        let Some(worker) = r.as_worker_mut() else {
            return true;
        };
        made.push(output);
        let survives = !(chance(rng, accident_chance) || worker.damage(damage));
        if !survives {
            report.lost += 1;
        }
        survives
    });
    report.produced = made.len();
    resources.extend(made);
    report
}

/// Flat: two workers make a third; otherwise every worker rests. Products
/// are always used up as rent.
fn house(resources: &mut Vec<Resource>, rules: &ProductionRules) -> CycleReport {
    let mut report = CycleReport::default();
    if count_kind(resources, ResourceKind::Worker) == 2 {
        resources.push(Worker::new().into());
        report.born = 1;
    } else {
        for worker in resources.iter_mut().filter_map(Resource::as_worker_mut) {
            worker.add_viability(rules.flat_viability_increase);
        }
    }
    let before = resources.len();
    resources.retain(|r| !r.is(ResourceKind::Product));
    report.consumed = before - resources.len();
    report
}

/// Diner: one worker eats one food. A worker killed by the meal is removed.
fn feed<R: Rng + ?Sized>(
    resources: &mut Vec<Resource>,
    rules: &ProductionRules,
    rng: &mut R,
) -> CycleReport {
    let mut report = CycleReport::default();
    let (Some(worker_at), Some(food_at)) = (
        resources.iter().position(|r| r.is(ResourceKind::Worker)),
        resources.iter().position(|r| r.is(ResourceKind::Food)),
    ) else {
        return report;
    };

    let delta = diner_viability_delta(rules, rng);
    let died = resources[worker_at]
        .as_worker_mut()
        .is_some_and(|w| w.add_viability(delta));

    // Remove the higher index first so the lower one stays valid.
    let mut doomed = vec![food_at];
    if died {
        doomed.push(worker_at);
        report.lost = 1;
    }
    doomed.sort_unstable_by(|a, b| b.cmp(a));
    for index in doomed {
        resources.remove(index);
    }
    report.consumed = 1;
    report
}

// ---------------------------------------------------------------------------
// The cycle task
// ---------------------------------------------------------------------------

/// One production cycle of `place`, run as an independent task.
///
/// Phases are strictly sequential within the cycle. The place lock is only
/// held for the transform itself, never across a wait.
pub async fn run_cycle(
    place: Arc<Place>,
    rules: Arc<ProductionRules>,
    mut rng: SimRng,
) -> CycleReport {
    let (before, after) = {
        let state = place.lock();
        cycle_delays(place.kind(), &state.resources, &rules)
    };
    tokio::time::sleep(before).await;

    let report = {
        let mut state = place.lock();
        transform(place.kind(), &mut state.resources, &rules, &mut rng)
    };

    tokio::time::sleep(after).await;
    place.lock().waiting = true;

    tracing::debug!(
        place = %place.id(),
        kind = place.name(),
        produced = report.produced,
        born = report.born,
        lost = report.lost,
        consumed = report.consumed,
        "production cycle finished"
    );
    report
}
