//! The economy: owns every place and the connections between them, and
//! drives production one tick at a time.
//!
//! # Architecture
//!
//! The `Economy` owns:
//! - An arena of [`Place`]s keyed by [`PlaceId`]. Ids grow monotonically, so
//!   map order is insertion order.
//! - A [`PlaceGraph`] of directed connections
//! - The [`JoinHandle`] of every production cycle still in flight
//! - The master RNG that seeds each cycle
//! - The player's [`Selection`]
//!
//! # Tick
//!
//! Each [`tick`](Economy::tick) visits every place once, in insertion order:
//! - **Containers** pull waiting output from their ingoing nodes.
//! - **Nodes** reap a finished cycle, push waiting output to outgoing nodes,
//!   or, when idle and rested, fetch inputs and spawn a new cycle.
//!
//! Cycles run on the tokio runtime behind the handle passed to
//! [`Economy::new`]. The tick itself never awaits them; it only checks
//! whether their handles have finished.

use crate::config::{EconomyConfig, ProductionRules};
use crate::container::give_resources;
use crate::graph::PlaceGraph;
use crate::id::{PlaceId, PlaceIdAllocator};
use crate::place::{Place, PlaceKind};
use crate::production::{CycleReport, fetch, run_cycle};
use crate::resource::{Resource, ResourceKind};
use crate::rng::{SimRng, fork, seeded};
use crate::selection::{BuildOutcome, BuildPreview, Selection};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long [`Economy::wait_for_cycles`] sleeps between checks.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(1);

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// What happened during one [`Economy::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick counter after this tick. Unchanged by a paused tick.
    pub tick: u64,
    /// Production cycles spawned.
    pub started: usize,
    /// Production cycles reaped.
    pub finished: usize,
    /// Units moved out of waiting node buffers.
    pub delivered: usize,
    /// Totals over the cycles reaped this tick.
    pub cycles: CycleReport,
}

impl TickReport {
    fn absorb(&mut self, cycle: CycleReport) {
        self.finished += 1;
        self.cycles.merge(&cycle);
    }

    /// Fold a later tick's report into a running total. `tick` becomes the
    /// later tick's counter.
    pub fn merge(&mut self, later: &TickReport) {
        self.tick = later.tick;
        self.started += later.started;
        self.finished += later.finished;
        self.delivered += later.delivered;
        self.cycles.merge(&later.cycles);
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Economy {
    pub(crate) places: BTreeMap<PlaceId, Arc<Place>>,
    pub(crate) graph: PlaceGraph,
    pub(crate) ids: PlaceIdAllocator,
    cycles: BTreeMap<PlaceId, JoinHandle<CycleReport>>,
    runtime: Handle,
    rules: Arc<ProductionRules>,
    rng: SimRng,
    pub(crate) selection: Selection,
    paused: bool,
    ticks: u64,
}

impl Economy {
    /// An empty economy whose production cycles run on `runtime`.
    pub fn new(config: &EconomyConfig, runtime: Handle) -> Self {
        Self {
            places: BTreeMap::new(),
            graph: PlaceGraph::new(),
            ids: PlaceIdAllocator::new(),
            cycles: BTreeMap::new(),
            runtime,
            rules: Arc::new(config.rules.clone()),
            rng: seeded(config.seed),
            selection: Selection::None,
            paused: false,
            ticks: 0,
        }
    }

    pub fn rules(&self) -> &ProductionRules {
        &self.rules
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    // -----------------------------------------------------------------------
    // Places and connections
    // -----------------------------------------------------------------------

    /// Build a new, empty place centred on `(x, y)`.
    pub fn add_place(&mut self, kind: PlaceKind, x: f32, y: f32) -> PlaceId {
        let id = self.ids.allocate();
        self.places.insert(id, Arc::new(Place::centred(id, kind, x, y)));
        self.graph.add_place(id);
        info!(place = %id, kind = kind.name(), x, y, "built place");
        id
    }

    /// Sever every edge of `id`, then remove it. A cycle still running on
    /// the place finishes in the background and its output is lost with
    /// the place.
    pub fn remove_place(&mut self, id: PlaceId) -> bool {
        if self.places.remove(&id).is_none() {
            return false;
        }
        self.graph.remove_place(id);
        self.cycles.remove(&id);
        if self.selection == Selection::Place(id) {
            self.selection = Selection::None;
        }
        info!(place = %id, "deleted place");
        true
    }

    /// Add the edge `from -> to`. Self-loops, duplicates and unknown places
    /// are ignored.
    pub fn connect(&mut self, from: PlaceId, to: PlaceId) -> bool {
        let connected = self.graph.connect(from, to);
        if connected {
            info!(%from, %to, "connected places");
        }
        connected
    }

    /// Remove the edge between `a` and `b` in either direction.
    pub fn disconnect(&mut self, a: PlaceId, b: PlaceId) -> bool {
        let removed = self.graph.disconnect(a, b);
        if removed {
            info!(%a, %b, "disconnected places");
        }
        removed
    }

    /// Offer `resource` to place `id`. Returns whether it was accepted.
    pub fn insert_resource(&mut self, id: PlaceId, resource: Resource) -> bool {
        self.places
            .get(&id)
            .is_some_and(|place| place.insert(resource, &self.rules))
    }

    /// The place containing `(x, y)`. When places overlap, the most recently
    /// built one wins.
    pub fn place_at(&self, x: f32, y: f32) -> Option<PlaceId> {
        self.places
            .values()
            .rev()
            .find(|p| p.contains_point(x, y))
            .map(|p| p.id())
    }

    pub fn place(&self, id: PlaceId) -> Option<&Arc<Place>> {
        self.places.get(&id)
    }

    /// All places in insertion order.
    pub fn places(&self) -> impl Iterator<Item = &Arc<Place>> + '_ {
        self.places.values()
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn graph(&self) -> &PlaceGraph {
        &self.graph
    }

    /// Whether a production cycle of `id` is currently running.
    pub fn is_working(&self, id: PlaceId) -> bool {
        self.cycles.get(&id).is_some_and(|h| !h.is_finished())
    }

    /// See [`PlaceGraph::has_required_connections`].
    pub fn has_required_connections(&self, id: PlaceId) -> bool {
        self.graph
            .has_required_connections(id, |p| self.places.get(&p).map(|place| place.kind()))
    }

    // -----------------------------------------------------------------------
    // Selection and building
    // -----------------------------------------------------------------------

    pub fn select_build_type(&mut self, kind: PlaceKind) {
        self.selection = Selection::Build(kind);
    }

    pub fn select_resource_type(&mut self, kind: ResourceKind) {
        self.selection = Selection::Resource(kind);
    }

    /// Select the place under `(x, y)`. Leaves the selection alone if there
    /// is none.
    pub fn select_building_at(&mut self, x: f32, y: f32) -> Option<PlaceId> {
        let id = self.place_at(x, y)?;
        self.selection = Selection::Place(id);
        Some(id)
    }

    pub fn deselect_selections(&mut self) {
        self.selection = Selection::None;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Whether a click would do anything.
    pub fn can_build(&self) -> bool {
        !self.selection.is_none()
    }

    /// Apply the current selection at `(x, y)`.
    pub fn build(&mut self, x: f32, y: f32) -> BuildOutcome {
        let selection = self.selection;
        match selection {
            Selection::None => BuildOutcome::Nothing,
            Selection::Build(kind) => BuildOutcome::Built(self.add_place(kind, x, y)),
            Selection::Resource(kind) => match self.place_at(x, y) {
                Some(place) => BuildOutcome::Inserted {
                    place,
                    accepted: self.insert_resource(place, kind.spawn()),
                },
                None => BuildOutcome::Nothing,
            },
            Selection::Place(from) => match self.place_at(x, y) {
                Some(to) if self.connect(from, to) => BuildOutcome::Connected { from, to },
                _ => BuildOutcome::Nothing,
            },
        }
    }

    /// Disconnect the selected place from the place under `(x, y)`.
    pub fn disconnect_from_selection(&mut self, x: f32, y: f32) -> bool {
        match (self.selection.place(), self.place_at(x, y)) {
            (Some(selected), Some(other)) => self.disconnect(selected, other),
            _ => false,
        }
    }

    /// Delete the place under `(x, y)`, returning its id.
    pub fn delete_place_at(&mut self, x: f32, y: f32) -> Option<PlaceId> {
        let id = self.place_at(x, y)?;
        self.remove_place(id);
        Some(id)
    }

    /// Preview of what a click would build, if a build type is selected.
    pub fn selected_build_preview(&self) -> Option<BuildPreview> {
        match self.selection {
            Selection::Build(kind) => Some(BuildPreview::of(kind)),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Advance the economy by one frame. Does nothing while paused.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        if self.paused {
            return report;
        }

        let now = Instant::now();
        let order: Vec<Arc<Place>> = self.places.values().cloned().collect();
        for place in order {
            if place.kind().is_container() {
                report.delivered += self.update_container(&place, now);
            } else {
                self.update_node(&place, now, &mut report);
            }
        }

        self.ticks += 1;
        report.tick = self.ticks;
        report
    }

    /// Pull waiting output from every ingoing node into `container`.
    fn update_container(&self, container: &Place, now: Instant) -> usize {
        self.graph
            .ingoing(container.id())
            .iter()
            .filter_map(|id| self.places.get(id))
            .filter(|source| source.kind().is_node())
            .map(|source| give_resources(source, container, &self.rules, now))
            .sum()
    }

    fn update_node(&mut self, node: &Arc<Place>, now: Instant, report: &mut TickReport) {
        let id = node.id();
        if let Some(cycle) = self.reap(id) {
            report.absorb(cycle);
        }
        if self.cycles.contains_key(&id) {
            return;
        }

        if node.is_waiting() {
            report.delivered += self
                .graph
                .outgoing(id)
                .iter()
                .filter_map(|to| self.places.get(to))
                .filter(|target| target.kind().is_node())
                .map(|target| give_resources(node, target, &self.rules, now))
                .sum::<usize>();
            return;
        }
        if node.is_cooling_down(now) {
            return;
        }

        let sources: Vec<Arc<Place>> = self
            .graph
            .ingoing(id)
            .iter()
            .filter_map(|from| self.places.get(from).cloned())
            .collect();
        if !fetch(node, &sources, &self.rules, &mut self.rng) {
            return;
        }

        let cycle = run_cycle(Arc::clone(node), Arc::clone(&self.rules), fork(&mut self.rng));
        self.cycles.insert(id, self.runtime.spawn(cycle));
        report.started += 1;
        debug!(place = %id, kind = node.name(), "production cycle started");
    }

    /// Remove the cycle handle of `id` if it has finished, returning its
    /// report. A cycle that panicked is logged and yields nothing.
    fn reap(&mut self, id: PlaceId) -> Option<CycleReport> {
        let mut handle = self.cycles.remove(&id)?;
        if !handle.is_finished() {
            self.cycles.insert(id, handle);
            return None;
        }
        // A finished handle resolves on the first poll.
        match Pin::new(&mut handle).poll(&mut Context::from_waker(Waker::noop())) {
            Poll::Ready(Ok(cycle)) => Some(cycle),
            Poll::Ready(Err(err)) => {
                warn!(place = %id, error = %err, "production cycle failed");
                None
            }
            Poll::Pending => None,
        }
    }

    /// Number of production cycles still running.
    pub fn in_flight(&self) -> usize {
        self.cycles.values().filter(|h| !h.is_finished()).count()
    }

    /// Block until every running cycle has finished, then reap them all.
    ///
    /// Must be called from outside the runtime's worker threads.
    pub fn wait_for_cycles(&mut self) {
        while self.in_flight() > 0 {
            std::thread::sleep(WAIT_POLL_INTERVAL);
        }
        let ids: Vec<PlaceId> = self.cycles.keys().copied().collect();
        for id in ids {
            self.reap(id);
        }
    }

    /// Stop starting new cycles and wait for the running ones to finish.
    pub fn pause(&mut self) {
        self.paused = true;
        self.wait_for_cycles();
        info!(tick = self.ticks, "economy paused");
    }

    pub fn resume(&mut self) {
        self.paused = false;
        info!(tick = self.ticks, "economy resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replace the contents of the economy. In-flight cycles are waited for
    /// first; they belong to the places being replaced.
    pub(crate) fn replace_places(
        &mut self,
        places: BTreeMap<PlaceId, Arc<Place>>,
        graph: PlaceGraph,
    ) {
        self.wait_for_cycles();
        self.cycles.clear();
        self.ids = PlaceIdAllocator::new();
        if let Some(&last) = places.keys().next_back() {
            self.ids.reserve_past(last);
        }
        self.places = places;
        self.graph = graph;
        self.selection = Selection::None;
    }
}
