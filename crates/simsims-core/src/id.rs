use serde::{Deserialize, Serialize};

/// Identifies a place in the economy. Cheap to copy and compare.
///
/// Ids are handed out in increasing order and never reused within a session,
/// so ordering by id is the same as ordering by insertion. Saves record the
/// id verbatim as the place's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaceId(pub u32);

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Highest index a save may give a place. The ids above it stay free for
/// places built after the load.
pub const MAX_SAVED_INDEX: u32 = u32::MAX / 2;

/// Hands out place ids. Never reuses an id, even after the place is deleted.
#[derive(Debug, Clone, Default)]
pub struct PlaceIdAllocator {
    next: u32,
}

impl PlaceIdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next free id.
    pub fn allocate(&mut self) -> PlaceId {
        let id = PlaceId(self.next);
        self.next += 1;
        id
    }

    /// Make sure future allocations come after `id`. Used after loading a
    /// save whose indices were assigned by an earlier session.
    pub fn reserve_past(&mut self, id: PlaceId) {
        self.next = self.next.max(id.0.saturating_add(1));
    }
}
