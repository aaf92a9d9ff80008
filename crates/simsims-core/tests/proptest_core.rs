//! Property-based tests for the SimSims core.
//!
//! Uses proptest to generate random graph mutation sequences and random
//! saved layouts, then verify structural invariants hold.

use proptest::prelude::*;
use simsims_core::graph::PlaceGraph;
use simsims_core::id::PlaceId;
use simsims_core::place::PlaceKind;
use simsims_core::resource::{Resource, ResourceKind, Worker};
use simsims_core::serialize::SaveData;
use simsims_core::test_utils::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Graph mutation operations.
#[derive(Debug, Clone)]
enum GraphOp {
    Add,
    Remove(usize),
    Connect(usize, usize),
    Disconnect(usize, usize),
    DisconnectAll(usize),
}

fn arb_graph_ops(max_ops: usize) -> impl Strategy<Value = Vec<GraphOp>> {
    proptest::collection::vec(
        prop_oneof![
            2 => Just(GraphOp::Add),
            1 => (0..20usize).prop_map(GraphOp::Remove),
            4 => (0..20usize, 0..20usize).prop_map(|(a, b)| GraphOp::Connect(a, b)),
            1 => (0..20usize, 0..20usize).prop_map(|(a, b)| GraphOp::Disconnect(a, b)),
            1 => (0..20usize).prop_map(GraphOp::DisconnectAll),
        ],
        1..=max_ops,
    )
}

/// The `i`th live place, wrapping around.
fn pick(live: &[PlaceId], i: usize) -> Option<PlaceId> {
    (!live.is_empty()).then(|| live[i % live.len()])
}

fn arb_kind() -> impl Strategy<Value = PlaceKind> {
    proptest::sample::select(PlaceKind::ALL.to_vec())
}

fn arb_resource() -> impl Strategy<Value = Resource> {
    prop_oneof![
        (0.01f64..=1.0).prop_map(|v| Resource::Worker(Worker::with_viability(v))),
        Just(Resource::Food),
        Just(Resource::Product),
    ]
}

/// A layout: place kinds, candidate edges by position, and resources to
/// offer to each place.
type Layout = (Vec<PlaceKind>, Vec<(usize, usize)>, Vec<Vec<Resource>>);

fn arb_layout() -> impl Strategy<Value = Layout> {
    (1..12usize).prop_flat_map(|n| {
        (
            proptest::collection::vec(arb_kind(), n),
            proptest::collection::vec((0..n, 0..n), 0..30),
            proptest::collection::vec(proptest::collection::vec(arb_resource(), 0..6), n),
        )
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every edge is recorded on both endpoints, never twice, never a
    /// self-loop, whatever the mutation order.
    #[test]
    fn graph_stays_symmetric(ops in arb_graph_ops(120)) {
        let mut graph = PlaceGraph::new();
        let mut live: Vec<PlaceId> = Vec::new();
        let mut next = 0u32;

        for op in ops {
            match op {
                GraphOp::Add => {
                    let id = PlaceId(next);
                    next += 1;
                    graph.add_place(id);
                    live.push(id);
                }
                GraphOp::Remove(i) => {
                    if let Some(id) = pick(&live, i) {
                        graph.remove_place(id);
                        live.retain(|&p| p != id);
                        for &other in &live {
                            prop_assert!(!graph.contains_edge(id, other));
                            prop_assert!(!graph.ingoing(other).contains(&id));
                        }
                    }
                }
                GraphOp::Connect(a, b) => {
                    if let (Some(a), Some(b)) = (pick(&live, a), pick(&live, b)) {
                        let existed = graph.contains_edge(a, b);
                        let created = graph.connect(a, b);
                        prop_assert_eq!(created, a != b && !existed);
                        prop_assert_eq!(graph.contains_edge(a, b), a != b);
                    }
                }
                GraphOp::Disconnect(a, b) => {
                    if let (Some(a), Some(b)) = (pick(&live, a), pick(&live, b)) {
                        graph.disconnect(a, b);
                        prop_assert!(!graph.contains_edge(a, b));
                        prop_assert!(!graph.contains_edge(b, a));
                    }
                }
                GraphOp::DisconnectAll(i) => {
                    if let Some(id) = pick(&live, i) {
                        graph.disconnect_all(id);
                        prop_assert!(graph.ingoing(id).is_empty());
                        prop_assert!(graph.outgoing(id).is_empty());
                    }
                }
            }
            prop_assert!(graph.is_consistent());
        }

        prop_assert_eq!(graph.place_count(), live.len());
        prop_assert_eq!(graph.edges().count(), graph.edge_count());
    }

    /// Saving and loading reproduces the edge set by index and the
    /// inventory of every place, in both encodings.
    #[test]
    fn save_round_trip((kinds, edges, stock) in arb_layout()) {
        let rt = runtime();
        let mut eco = economy(&rt);
        let ids: Vec<PlaceId> = kinds
            .iter()
            .enumerate()
            .map(|(i, &k)| eco.add_place(k, 100.0 * i as f32, 50.0))
            .collect();
        for (a, b) in edges {
            eco.connect(ids[a], ids[b]);
        }
        for (id, resources) in ids.iter().zip(stock) {
            for r in resources {
                eco.insert_resource(*id, r);
            }
        }
        // Drop one place so indices have a gap.
        eco.remove_place(ids[0]);

        let data = eco.to_save_data();
        let from_json = SaveData::from_json(&data.to_json().unwrap()).unwrap();
        let from_bytes = SaveData::from_bytes(&data.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(&from_json, &data);
        prop_assert_eq!(&from_bytes, &data);

        let mut restored = economy(&rt);
        restored.load_save_data(&from_json).unwrap();

        let original_edges: Vec<_> = eco.graph().edges().collect();
        let restored_edges: Vec<_> = restored.graph().edges().collect();
        prop_assert_eq!(original_edges, restored_edges);

        for place in eco.places() {
            let twin = restored.place(place.id()).unwrap();
            prop_assert_eq!(twin.kind(), place.kind());
            prop_assert_eq!(twin.position(), place.position());
            prop_assert_eq!(twin.resources(), place.resources());
        }
        prop_assert!(restored.graph().is_consistent());
    }

    /// Accepted inserts match the static capability table.
    #[test]
    fn insert_follows_capabilities(
        kind in arb_kind(),
        resources in proptest::collection::vec(arb_resource(), 0..20),
    ) {
        let rt = runtime();
        let mut eco = economy(&rt);
        let id = eco.add_place(kind, 0.0, 0.0);
        let mut expected = 0;
        for r in resources {
            let accepted = eco.insert_resource(id, r);
            prop_assert_eq!(accepted, kind.uses(r.kind()));
            if accepted && kind != PlaceKind::Road {
                expected += 1;
            }
        }
        if kind != PlaceKind::Road {
            prop_assert_eq!(eco.place(id).unwrap().resource_count(), expected);
        }
        for r in ResourceKind::ALL {
            if !kind.uses(r) {
                prop_assert_eq!(eco.place(id).unwrap().count(r), 0);
            }
        }
    }
}
