//! Place kinds, their capability table, and the shared place cell.
//!
//! A [`Place`] is shared between the economy (main loop) and any production
//! cycle running for it, so everything mutable lives behind one mutex. No
//! code path holds two place locks at the same time: moves between places
//! extract under the source lock, release it, then insert under the target
//! lock.

use crate::config::ProductionRules;
use crate::geometry::{Footprint, Position};
use crate::id::PlaceId;
use crate::resource::{Resource, ResourceKind, count_kind};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Kinds and capabilities
// ---------------------------------------------------------------------------

/// The closed set of buildable places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlaceKind {
    Magazine,
    Barn,
    Road,
    Factory,
    Field,
    Flat,
    Diner,
}

/// Whether a place stores resources or runs production cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceClass {
    Container,
    Node,
}

/// One row of the capability table.
struct Capability {
    kind: PlaceKind,
    uses: &'static [ResourceKind],
    produces: &'static [ResourceKind],
}

use ResourceKind::{Food, Product, Worker};

/// A flat runs a cycle with one worker, or with two who raise a third.
pub const FLAT_MAX_WORKERS: usize = 2;

/// What every place kind consumes and produces. A place accepts exactly the
/// resource kinds it uses.
const CAPABILITIES: [Capability; 7] = [
    Capability { kind: PlaceKind::Magazine, uses: &[Product], produces: &[Product] },
    Capability { kind: PlaceKind::Barn, uses: &[Food], produces: &[Food] },
    Capability { kind: PlaceKind::Road, uses: &[Worker], produces: &[Worker] },
    Capability { kind: PlaceKind::Factory, uses: &[Worker], produces: &[Worker, Product] },
    Capability { kind: PlaceKind::Field, uses: &[Worker], produces: &[Worker, Food] },
    Capability { kind: PlaceKind::Flat, uses: &[Worker, Product], produces: &[Worker] },
    Capability { kind: PlaceKind::Diner, uses: &[Worker, Food], produces: &[Worker] },
];

impl PlaceKind {
    pub const ALL: [PlaceKind; 7] = [
        Self::Magazine,
        Self::Barn,
        Self::Road,
        Self::Factory,
        Self::Field,
        Self::Flat,
        Self::Diner,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Magazine => "Magazine",
            Self::Barn => "Barn",
            Self::Road => "Road",
            Self::Factory => "Factory",
            Self::Field => "Field",
            Self::Flat => "Flat",
            Self::Diner => "Diner",
        }
    }

    pub fn class(self) -> PlaceClass {
        match self {
            Self::Magazine | Self::Barn | Self::Road => PlaceClass::Container,
            Self::Factory | Self::Field | Self::Flat | Self::Diner => PlaceClass::Node,
        }
    }

    pub fn is_container(self) -> bool {
        self.class() == PlaceClass::Container
    }

    pub fn is_node(self) -> bool {
        self.class() == PlaceClass::Node
    }

    /// Rows of `CAPABILITIES` are in declaration order.
    fn capability(self) -> &'static Capability {
        &CAPABILITIES[self as usize]
    }

    /// Resource kinds this place consumes.
    pub fn used(self) -> &'static [ResourceKind] {
        self.capability().uses
    }

    /// Resource kinds this place hands on.
    pub fn produced(self) -> &'static [ResourceKind] {
        self.capability().produces
    }

    pub fn uses(self, kind: ResourceKind) -> bool {
        self.used().contains(&kind)
    }

    pub fn produces(self, kind: ResourceKind) -> bool {
        self.produced().contains(&kind)
    }

    /// Whether `insert` takes a resource of this kind.
    pub fn accepts(self, kind: ResourceKind) -> bool {
        self.uses(kind)
    }

    /// Most units of `kind` a node of this kind can start a cycle with.
    /// `None` means any number.
    pub fn input_limit(self, kind: ResourceKind) -> Option<usize> {
        match (self, kind) {
            (Self::Flat, Worker) => Some(FLAT_MAX_WORKERS),
            _ => None,
        }
    }

    pub fn footprint(self) -> Footprint {
        match self.class() {
            PlaceClass::Container => Footprint::container(),
            PlaceClass::Node => Footprint::NODE,
        }
    }
}

// ---------------------------------------------------------------------------
// Place
// ---------------------------------------------------------------------------

/// Mutable state of a place, guarded by the place's mutex.
#[derive(Debug, Default)]
pub(crate) struct PlaceState {
    /// Unordered multiset; kept in arrival order so pulls are first-in,
    /// first-out.
    pub(crate) resources: Vec<Resource>,
    /// Node only: output is ready for pickup.
    pub(crate) waiting: bool,
    /// Node only: earliest instant at which the node may fetch again.
    pub(crate) next_available: Option<Instant>,
}

/// A building in the economy.
#[derive(Debug)]
pub struct Place {
    id: PlaceId,
    kind: PlaceKind,
    position: Position,
    state: Mutex<PlaceState>,
}

impl Place {
    /// A new, empty place whose top-left corner is at `position`.
    pub fn new(id: PlaceId, kind: PlaceKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            state: Mutex::new(PlaceState::default()),
        }
    }

    /// A new, empty place centred on `(x, y)`.
    pub fn centred(id: PlaceId, kind: PlaceKind, x: f32, y: f32) -> Self {
        Self::new(id, kind, kind.footprint().centred_at(x, y))
    }

    /// Restore a place from saved parts without running any insert rules.
    pub(crate) fn restored(
        id: PlaceId,
        kind: PlaceKind,
        position: Position,
        resources: Vec<Resource>,
        waiting: bool,
        cooldown: Option<Duration>,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            state: Mutex::new(PlaceState {
                resources,
                waiting: waiting && kind.is_node(),
                next_available: cooldown.map(|d| Instant::now() + d),
            }),
        }
    }

    pub fn id(&self) -> PlaceId {
        self.id
    }

    pub fn kind(&self) -> PlaceKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn footprint(&self) -> Footprint {
        self.kind.footprint()
    }

    pub fn centre(&self) -> (f32, f32) {
        self.footprint().centre(self.position)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.footprint().contains(self.position, x, y)
    }

    pub fn uses(&self, kind: ResourceKind) -> bool {
        self.kind.uses(kind)
    }

    pub fn produces(&self, kind: ResourceKind) -> bool {
        self.kind.produces(kind)
    }

    /// Lock the place state. A cycle that panicked while holding the lock
    /// leaves consistent data behind (every mutation is a single push or
    /// remove), so poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, PlaceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // -- Transfer primitives --

    /// Offer a resource to this place (push).
    ///
    /// Returns false and drops nothing if the kind is not accepted; the
    /// caller keeps ownership through the returned `Err`. Roads damage an
    /// incoming worker by `road_damage_per_worker` for every worker already
    /// on the road; a worker killed that way is consumed and the insert
    /// still counts as accepted.
    pub fn offer(&self, resource: Resource, rules: &ProductionRules) -> Result<(), Resource> {
        if !self.kind.accepts(resource.kind()) {
            return Err(resource);
        }
        let mut state = self.lock();
        match (self.kind, resource) {
            (PlaceKind::Road, Resource::Worker(mut worker)) => {
                let damage = rules.road_damage_per_worker * state.resources.len() as f64;
                if worker.damage(damage) {
                    tracing::trace!(place = %self.id, damage, "worker died entering road");
                } else {
                    state.resources.push(Resource::Worker(worker));
                }
            }
            _ => state.resources.push(resource),
        }
        Ok(())
    }

    /// Offer a resource, discarding it if rejected. Returns whether it was
    /// accepted.
    pub fn insert(&self, resource: Resource, rules: &ProductionRules) -> bool {
        self.offer(resource, rules).is_ok()
    }

    /// Remove the first resource a place of `consumer` kind would accept.
    pub fn take_for(&self, consumer: PlaceKind) -> Option<Resource> {
        let mut state = self.lock();
        let index = state
            .resources
            .iter()
            .position(|r| consumer.accepts(r.kind()))?;
        Some(state.resources.remove(index))
    }

    /// How many more units of `kind` this place can take and still run.
    pub fn room_for(&self, kind: ResourceKind) -> usize {
        if !self.kind.accepts(kind) {
            return 0;
        }
        match self.kind.input_limit(kind) {
            Some(limit) => limit.saturating_sub(self.count(kind)),
            None => usize::MAX,
        }
    }

    // -- Inspection --

    /// A copy of the current inventory.
    pub fn resources(&self) -> Vec<Resource> {
        self.lock().resources.clone()
    }

    pub fn resource_count(&self) -> usize {
        self.lock().resources.len()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        count_kind(&self.lock().resources, kind)
    }

    /// Whether this node has output waiting for pickup.
    pub fn is_waiting(&self) -> bool {
        self.lock().waiting
    }

    /// Whether the node is still resting after its last delivery.
    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.lock().next_available.is_some_and(|t| now < t)
    }

    /// Remaining cooldown, if any.
    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        self.lock()
            .next_available
            .and_then(|t| t.checked_duration_since(now))
            .filter(|d| !d.is_zero())
    }
}
