//! Resources: the typed units that flow between places.
//!
//! Food and Product are inert tokens. A Worker carries a viability scalar
//! that production cycles raise and lower; a worker whose viability drops to
//! zero or below is dead and must be discarded by whoever holds it.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The fixed set of resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Worker,
    Food,
    Product,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Worker, Self::Food, Self::Product];

    pub fn name(self) -> &'static str {
        match self {
            Self::Worker => "Worker",
            Self::Food => "Food",
            Self::Product => "Product",
        }
    }

    /// A fresh unit of this kind, as placed by the player.
    pub fn spawn(self) -> Resource {
        match self {
            Self::Worker => Resource::Worker(Worker::new()),
            Self::Food => Resource::Food,
            Self::Product => Resource::Product,
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Upper bound for worker viability.
pub const MAX_VIABILITY: f64 = 1.0;

/// A worker and its current viability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Worker {
    viability: f64,
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}

impl Worker {
    /// A fully viable worker.
    pub fn new() -> Self {
        Self {
            viability: MAX_VIABILITY,
        }
    }

    /// A worker with the given viability, clamped above at 1.
    pub fn with_viability(viability: f64) -> Self {
        Self {
            viability: viability.min(MAX_VIABILITY),
        }
    }

    pub fn viability(&self) -> f64 {
        self.viability
    }

    pub fn is_dead(&self) -> bool {
        self.viability <= 0.0
    }

    /// Subtract `amount`. Returns true if the worker is now dead.
    pub fn damage(&mut self, amount: f64) -> bool {
        self.viability -= amount;
        self.is_dead()
    }

    /// Add `amount` (which may be negative), clamping at 1. Returns true if
    /// the worker is now dead.
    pub fn add_viability(&mut self, amount: f64) -> bool {
        self.viability = (self.viability + amount).min(MAX_VIABILITY);
        self.is_dead()
    }

    /// Overwrite the viability, clamping at 1.
    pub fn restore_viability(&mut self, viability: f64) {
        self.viability = viability.min(MAX_VIABILITY);
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A single unit held in a place's inventory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resource {
    Worker(Worker),
    Food,
    Product,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Worker(_) => ResourceKind::Worker,
            Self::Food => ResourceKind::Food,
            Self::Product => ResourceKind::Product,
        }
    }

    pub fn as_worker(&self) -> Option<&Worker> {
        match self {
            Self::Worker(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_worker_mut(&mut self) -> Option<&mut Worker> {
        match self {
            Self::Worker(w) => Some(w),
            _ => None,
        }
    }

    pub fn is(&self, kind: ResourceKind) -> bool {
        self.kind() == kind
    }
}

impl From<Worker> for Resource {
    fn from(worker: Worker) -> Self {
        Self::Worker(worker)
    }
}

// ---------------------------------------------------------------------------
// Persistence shape
// ---------------------------------------------------------------------------

/// How a resource is written to a save: its kind plus the worker viability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub kind: ResourceKind,
    #[serde(default)]
    pub viability: Option<f64>,
}

impl From<&Resource> for ResourceRecord {
    fn from(resource: &Resource) -> Self {
        Self {
            kind: resource.kind(),
            viability: resource.as_worker().map(Worker::viability),
        }
    }
}

impl From<ResourceRecord> for Resource {
    fn from(record: ResourceRecord) -> Self {
        match record.kind {
            ResourceKind::Worker => Resource::Worker(Worker::with_viability(
                record.viability.unwrap_or(MAX_VIABILITY),
            )),
            ResourceKind::Food => Resource::Food,
            ResourceKind::Product => Resource::Product,
        }
    }
}

/// Count how many resources of `kind` are in `resources`.
pub fn count_kind(resources: &[Resource], kind: ResourceKind) -> usize {
    resources.iter().filter(|r| r.is(kind)).count()
}
