//! Read-only views of the economy for rendering and UI code.
//!
//! All types are owned copies taken under each place's lock in turn, so a
//! snapshot of many places is not one consistent instant; it is what a
//! renderer would see drawing them one after another.

use crate::economy::Economy;
use crate::geometry::{Footprint, Position};
use crate::id::PlaceId;
use crate::place::{Place, PlaceKind};
use crate::resource::Resource;
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// Place snapshot
// ---------------------------------------------------------------------------

/// Everything needed to draw one place.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSnapshot {
    pub id: PlaceId,
    pub kind: PlaceKind,
    pub name: &'static str,
    /// Top-left corner.
    pub position: Position,
    pub footprint: Footprint,
    /// Copy of the inventory.
    pub resources: Vec<Resource>,
    /// A production cycle is running.
    pub working: bool,
    /// Output is waiting for pickup.
    pub waiting: bool,
    /// Inputs and outputs are wired up (the green indicator).
    pub satisfied: bool,
    /// This place is the current selection.
    pub selected: bool,
}

// ---------------------------------------------------------------------------
// Connection snapshot
// ---------------------------------------------------------------------------

/// One directed edge, with the centres of both endpoints for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionSnapshot {
    pub from: PlaceId,
    pub to: PlaceId,
    pub from_centre: (f32, f32),
    pub to_centre: (f32, f32),
}

impl Economy {
    fn snapshot_of(&self, place: &Place) -> PlaceSnapshot {
        let id = place.id();
        PlaceSnapshot {
            id,
            kind: place.kind(),
            name: place.name(),
            position: place.position(),
            footprint: place.footprint(),
            resources: place.resources(),
            working: self.is_working(id),
            waiting: place.is_waiting(),
            satisfied: self.has_required_connections(id),
            selected: self.selection == Selection::Place(id),
        }
    }

    /// Snapshot of a single place, or `None` if it does not exist.
    pub fn snapshot_place(&self, id: PlaceId) -> Option<PlaceSnapshot> {
        self.place(id).map(|p| self.snapshot_of(p))
    }

    /// Snapshots of every place, in drawing (insertion) order.
    pub fn snapshot_all_places(&self) -> Vec<PlaceSnapshot> {
        self.places().map(|p| self.snapshot_of(p)).collect()
    }

    /// Every connection, ordered by source place then connection order.
    pub fn connections(&self) -> Vec<ConnectionSnapshot> {
        self.graph()
            .edges()
            .filter_map(|(from, to)| {
                let a = self.place(from)?;
                let b = self.place(to)?;
                Some(ConnectionSnapshot {
                    from,
                    to,
                    from_centre: a.centre(),
                    to_centre: b.centre(),
                })
            })
            .collect()
    }
}
