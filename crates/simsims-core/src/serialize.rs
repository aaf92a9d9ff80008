//! Saving and loading the economy.
//!
//! A save is an ordered list of [`PlaceRecord`]s, one per place in insertion
//! order, behind a [`SaveHeader`]. Each record carries the place's index
//! (its [`PlaceId`]), its kind, its outgoing neighbours by index and its
//! inventory. Two encodings are provided: pretty-printed JSON for save files
//! and a compact `bitcode` snapshot.
//!
//! Loading is two-pass: every place is created first, then edges are wired
//! by index. A bad save fails as a whole and leaves the economy untouched.

use crate::economy::Economy;
use crate::geometry::Position;
use crate::graph::PlaceGraph;
use crate::id::{MAX_SAVED_INDEX, PlaceId};
use crate::place::{Place, PlaceKind};
use crate::resource::{Resource, ResourceRecord, Worker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a SimSims save.
pub const SAVE_MAGIC: u32 = 0x5153_0001;

/// Current format version. Increment when breaking the save format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding a save.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur while decoding or applying a save.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("JSON decoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SAVE_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("save from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("unsupported save version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("place index {0} appears more than once")]
    DuplicateIndex(u32),
    #[error("place index {0} is above the highest allowed index {MAX_SAVED_INDEX}")]
    IndexOutOfRange(u32),
    #[error("place {place} holds a worker with viability {viability}")]
    InvalidViability { place: u32, viability: f64 },
    #[error("place {place} lists unknown neighbour {neighbour}")]
    UnknownNeighbour { place: u32, neighbour: u32 },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Header at the front of every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub magic: u32,
    pub version: u32,
}

impl Default for SaveHeader {
    fn default() -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: FORMAT_VERSION,
        }
    }
}

impl SaveHeader {
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.magic != SAVE_MAGIC {
            return Err(LoadError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(LoadError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// One saved place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub index: u32,
    pub kind: PlaceKind,
    pub position: Position,
    /// Indices of the places this one delivers to, in connection order.
    pub outgoing: Vec<u32>,
    pub resources: Vec<ResourceRecord>,
    #[serde(default)]
    pub has_waiting_resources: bool,
    /// Delivery cooldown left when the save was taken.
    #[serde(default)]
    pub cooldown_ms: Option<u64>,
}

impl PlaceRecord {
    /// The saved inventory. Workers saved dead are not brought back.
    fn restore_resources(&self) -> Result<Vec<Resource>, LoadError> {
        let mut resources = Vec::with_capacity(self.resources.len());
        for &saved in &self.resources {
            if let Some(viability) = saved.viability.filter(|v| !v.is_finite()) {
                return Err(LoadError::InvalidViability {
                    place: self.index,
                    viability,
                });
            }
            let resource = Resource::from(saved);
            if resource.as_worker().is_some_and(Worker::is_dead) {
                continue;
            }
            resources.push(resource);
        }
        Ok(resources)
    }
}

/// A whole saved economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub header: SaveHeader,
    pub places: Vec<PlaceRecord>,
}

impl SaveData {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let data: SaveData = serde_json::from_str(json)?;
        data.header.validate()?;
        Ok(data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        bitcode::serialize(self).map_err(|e| SaveError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let data: SaveData =
            bitcode::deserialize(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
        data.header.validate()?;
        Ok(data)
    }

    /// Build the places and graph this save describes, without touching any
    /// economy.
    fn restore(&self) -> Result<(BTreeMap<PlaceId, Arc<Place>>, PlaceGraph), LoadError> {
        let mut places = BTreeMap::new();
        let mut graph = PlaceGraph::new();

        // Pass 1: every place.
        for record in &self.places {
            let id = PlaceId(record.index);
            if record.index > MAX_SAVED_INDEX {
                return Err(LoadError::IndexOutOfRange(record.index));
            }
            if places.contains_key(&id) {
                return Err(LoadError::DuplicateIndex(record.index));
            }
            let resources = record.restore_resources()?;
            let place = Place::restored(
                id,
                record.kind,
                record.position,
                resources,
                record.has_waiting_resources,
                record.cooldown_ms.map(Duration::from_millis),
            );
            places.insert(id, Arc::new(place));
            graph.add_place(id);
        }

        // Pass 2: edges by index.
        for record in &self.places {
            for &neighbour in &record.outgoing {
                if !places.contains_key(&PlaceId(neighbour)) {
                    return Err(LoadError::UnknownNeighbour {
                        place: record.index,
                        neighbour,
                    });
                }
                graph.connect(PlaceId(record.index), PlaceId(neighbour));
            }
        }

        Ok((places, graph))
    }
}

// ---------------------------------------------------------------------------
// Economy save/load
// ---------------------------------------------------------------------------

impl Economy {
    /// Record every place in insertion order. Running cycles are waited for
    /// first so no place is caught mid-transform.
    pub fn to_save_data(&mut self) -> SaveData {
        self.wait_for_cycles();
        let now = Instant::now();
        let places = self
            .places
            .values()
            .map(|place| {
                let state = place.lock();
                PlaceRecord {
                    index: place.id().0,
                    kind: place.kind(),
                    position: place.position(),
                    outgoing: self.graph.outgoing(place.id()).iter().map(|p| p.0).collect(),
                    resources: state.resources.iter().map(ResourceRecord::from).collect(),
                    has_waiting_resources: state.waiting,
                    cooldown_ms: state
                        .next_available
                        .and_then(|t| t.checked_duration_since(now))
                        .map(|d| d.as_millis() as u64)
                        .filter(|&ms| ms > 0),
                }
            })
            .collect();
        SaveData {
            header: SaveHeader::default(),
            places,
        }
    }

    /// Replace the economy's places and connections with those in `data`.
    ///
    /// Inventories are restored as saved; no insert rules (such as road
    /// damage) run. On error the economy is left as it was.
    pub fn load_save_data(&mut self, data: &SaveData) -> Result<(), LoadError> {
        data.header.validate()?;
        let (places, graph) = data.restore()?;
        let place_count = places.len();
        let edge_count = graph.edge_count();
        self.replace_places(places, graph);
        info!(places = place_count, edges = edge_count, "loaded economy");
        Ok(())
    }
}
