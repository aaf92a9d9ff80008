//! What the player currently has selected, and what a click did with it.

use crate::geometry::Footprint;
use crate::id::PlaceId;
use crate::place::PlaceKind;
use crate::resource::ResourceKind;

/// The active selection. Building, placing resources and connecting from a
/// place are mutually exclusive modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    /// A click builds a new place of this kind.
    Build(PlaceKind),
    /// A click drops one unit of this kind into the place under the cursor.
    Resource(ResourceKind),
    /// A click connects this place to the place under the cursor.
    Place(PlaceId),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The selected place, if a place is selected.
    pub fn place(&self) -> Option<PlaceId> {
        match self {
            Self::Place(id) => Some(*id),
            _ => None,
        }
    }
}

/// Result of [`Economy::build`](crate::economy::Economy::build).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// A new place was built.
    Built(PlaceId),
    /// A resource was offered to `place`; `accepted` is false when the place
    /// does not use that kind.
    Inserted { place: PlaceId, accepted: bool },
    /// A new edge `from -> to` was created.
    Connected { from: PlaceId, to: PlaceId },
    /// Nothing selected, nothing under the cursor, or the connection was
    /// rejected.
    Nothing,
}

/// Ghost of the place that would be built, for drawing under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildPreview {
    pub kind: PlaceKind,
    pub name: &'static str,
    pub footprint: Footprint,
}

impl BuildPreview {
    pub fn of(kind: PlaceKind) -> Self {
        Self {
            kind,
            name: kind.name(),
            footprint: kind.footprint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_none() {
        assert!(Selection::default().is_none());
        assert_eq!(Selection::default().place(), None);
    }

    #[test]
    fn place_selection_exposes_id() {
        assert_eq!(Selection::Place(PlaceId(4)).place(), Some(PlaceId(4)));
        assert_eq!(Selection::Build(PlaceKind::Barn).place(), None);
    }

    #[test]
    fn preview_matches_kind() {
        let p = BuildPreview::of(PlaceKind::Road);
        assert_eq!(p.name, "Road");
        assert_eq!(p.footprint, Footprint::container());
    }
}
