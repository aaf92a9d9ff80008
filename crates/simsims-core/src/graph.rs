use crate::id::PlaceId;
use crate::place::PlaceKind;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Adjacency lists for a single place. Both lists are duplicate-free and keep
/// the order in which connections were made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Adjacency {
    /// Places with an edge into this one.
    ingoing: Vec<PlaceId>,
    /// Places this one delivers to.
    outgoing: Vec<PlaceId>,
}

/// The connection graph between places.
///
/// Edges are directed (delivery flows from `from` to `to`) but tracked on both
/// endpoints so either side can sever them. Misuse (self-loops, duplicate
/// edges, unknown places, removing a missing edge) is absorbed as a no-op and
/// reported through the boolean return.
#[derive(Debug, Clone, Default)]
pub struct PlaceGraph {
    adjacency: BTreeMap<PlaceId, Adjacency>,
}

impl PlaceGraph {
    /// Create a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Register a place with no connections. No-op if already present.
    pub fn add_place(&mut self, place: PlaceId) {
        self.adjacency.entry(place).or_default();
    }

    /// Sever every edge of `place`, then forget it.
    pub fn remove_place(&mut self, place: PlaceId) {
        self.disconnect_all(place);
        self.adjacency.remove(&place);
    }

    /// Add the edge `from -> to`. Returns true if a new edge was created.
    pub fn connect(&mut self, from: PlaceId, to: PlaceId) -> bool {
        if from == to
            || !self.adjacency.contains_key(&from)
            || !self.adjacency.contains_key(&to)
            || self.contains_edge(from, to)
        {
            return false;
        }
        if let Some(adj) = self.adjacency.get_mut(&from) {
            adj.outgoing.push(to);
        }
        if let Some(adj) = self.adjacency.get_mut(&to) {
            adj.ingoing.push(from);
        }
        true
    }

    /// Remove every edge between `a` and `b`, in whichever direction(s) it
    /// exists. Returns true if anything was removed.
    pub fn disconnect(&mut self, a: PlaceId, b: PlaceId) -> bool {
        let forward = self.remove_edge(a, b);
        let backward = self.remove_edge(b, a);
        forward || backward
    }

    /// Remove the directed edge `from -> to` from both endpoints.
    fn remove_edge(&mut self, from: PlaceId, to: PlaceId) -> bool {
        let mut removed = false;
        if let Some(adj) = self.adjacency.get_mut(&from) {
            let before = adj.outgoing.len();
            adj.outgoing.retain(|&p| p != to);
            removed = adj.outgoing.len() != before;
        }
        if let Some(adj) = self.adjacency.get_mut(&to) {
            adj.ingoing.retain(|&p| p != from);
        }
        removed
    }

    /// Sever every edge touching `place`, on both endpoints.
    pub fn disconnect_all(&mut self, place: PlaceId) {
        let neighbours: Vec<PlaceId> = match self.adjacency.get(&place) {
            Some(adj) => adj.ingoing.iter().chain(adj.outgoing.iter()).copied().collect(),
            None => return,
        };
        for other in neighbours {
            self.disconnect(place, other);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn contains_place(&self, place: PlaceId) -> bool {
        self.adjacency.contains_key(&place)
    }

    pub fn contains_edge(&self, from: PlaceId, to: PlaceId) -> bool {
        self.outgoing(from).contains(&to)
    }

    /// Places with an edge into `place`, in connection order.
    pub fn ingoing(&self, place: PlaceId) -> &[PlaceId] {
        self.adjacency
            .get(&place)
            .map(|adj| adj.ingoing.as_slice())
            .unwrap_or(&[])
    }

    /// Places `place` delivers to, in connection order.
    pub fn outgoing(&self, place: PlaceId) -> &[PlaceId] {
        self.adjacency
            .get(&place)
            .map(|adj| adj.outgoing.as_slice())
            .unwrap_or(&[])
    }

    pub fn place_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|adj| adj.outgoing.len()).sum()
    }

    /// All directed edges as `(from, to)`, ordered by source then connection
    /// order.
    pub fn edges(&self) -> impl Iterator<Item = (PlaceId, PlaceId)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(&from, adj)| adj.outgoing.iter().map(move |&to| (from, to)))
    }

    /// Whether `place` is wired up well enough to operate: every kind it uses
    /// is produced by some ingoing neighbour, and every kind it produces is
    /// used by some outgoing neighbour.
    ///
    /// Advisory only; production is not gated on it.
    pub fn has_required_connections(
        &self,
        place: PlaceId,
        kind_of: impl Fn(PlaceId) -> Option<PlaceKind>,
    ) -> bool {
        let Some(kind) = kind_of(place) else {
            return false;
        };
        let ingoing: Vec<PlaceKind> = self.ingoing(place).iter().filter_map(|&p| kind_of(p)).collect();
        let outgoing: Vec<PlaceKind> = self.outgoing(place).iter().filter_map(|&p| kind_of(p)).collect();

        let inputs_fed = kind
            .used()
            .iter()
            .all(|&r| ingoing.iter().any(|k| k.produces(r)));
        let outputs_drained = kind
            .produced()
            .iter()
            .all(|&r| outgoing.iter().any(|k| k.uses(r)));
        inputs_fed && outputs_drained
    }

    /// Check that every edge is recorded on both endpoints and that no list
    /// holds a duplicate or a self-loop.
    pub fn is_consistent(&self) -> bool {
        self.adjacency.iter().all(|(&id, adj)| {
            let no_dupes = |v: &[PlaceId]| {
                v.iter().enumerate().all(|(i, p)| !v[..i].contains(p))
            };
            no_dupes(&adj.outgoing)
                && no_dupes(&adj.ingoing)
                && !adj.outgoing.contains(&id)
                && adj.outgoing.iter().all(|&to| self.ingoing(to).contains(&id))
                && adj.ingoing.iter().all(|&from| self.outgoing(from).contains(&id))
        })
    }
}
