//! Adversarial input tests for the SimSims economy.
//!
//! Misuse of the graph and transfer API must be absorbed without panics;
//! malformed saves must fail loudly without touching the economy.

use simsims_core::config::ProductionRules;
use simsims_core::id::PlaceId;
use simsims_core::place::PlaceKind;
use simsims_core::resource::{Resource, ResourceKind};
use simsims_core::serialize::{FORMAT_VERSION, LoadError, SAVE_MAGIC, SaveData};
use simsims_core::test_utils::*;
use std::time::Duration;

/// Self-loop: should be rejected and leave no edge.
#[test]
fn self_loop_is_ignored() {
    let rt = runtime();
    let mut eco = economy(&rt);
    let flat = eco.add_place(PlaceKind::Flat, 100.0, 100.0);
    assert!(!eco.connect(flat, flat));
    assert_eq!(eco.graph().edge_count(), 0);
    tick_for(&mut eco, 5);
}

/// Operations on ids that were never allocated or were deleted.
#[test]
fn unknown_places_are_noops() {
    let rt = runtime();
    let mut eco = economy(&rt);
    let road = eco.add_place(PlaceKind::Road, 100.0, 100.0);
    let ghost = PlaceId(999);

    assert!(!eco.connect(road, ghost));
    assert!(!eco.connect(ghost, road));
    assert!(!eco.disconnect(road, ghost));
    assert!(!eco.remove_place(ghost));
    assert!(!eco.insert_resource(ghost, Resource::Food));
    assert!(!eco.is_working(ghost));
    assert!(!eco.has_required_connections(ghost));
    assert!(eco.snapshot_place(ghost).is_none());

    eco.remove_place(road);
    assert!(!eco.remove_place(road));
    assert!(!eco.insert_resource(road, worker(1.0)));
}

/// Disconnecting an edge that does not exist.
#[test]
fn disconnect_missing_edge() {
    let rt = runtime();
    let mut eco = economy(&rt);
    let a = eco.add_place(PlaceKind::Barn, 100.0, 100.0);
    let b = eco.add_place(PlaceKind::Diner, 400.0, 100.0);
    assert!(!eco.disconnect(a, b));
    assert!(eco.connect(a, b));
    assert!(eco.disconnect(b, a));
    assert!(!eco.disconnect(a, b));
    assert!(eco.graph().is_consistent());
}

/// Every container rejects the two kinds it does not store.
#[test]
fn containers_reject_foreign_kinds() {
    let rt = runtime();
    let mut eco = economy(&rt);
    for kind in [PlaceKind::Magazine, PlaceKind::Barn, PlaceKind::Road] {
        let id = eco.add_place(kind, 100.0, 100.0);
        let accepted: Vec<ResourceKind> = ResourceKind::ALL
            .into_iter()
            .filter(|&r| eco.insert_resource(id, r.spawn()))
            .collect();
        assert_eq!(accepted.len(), 1, "{kind:?} accepted {accepted:?}");
        assert_eq!(eco.place(id).unwrap().resource_count(), 1);
    }
}

/// Deleting a place while its cycle is running must not disturb the rest.
#[test]
fn delete_place_mid_cycle() {
    let rt = runtime();
    let rules = ProductionRules {
        cycle_ms: 40,
        ..fast_rules()
    };
    let mut eco = economy_with(&rt, rules);
    let loops = factory_loops(&mut eco, 2, 1);
    assert_eq!(eco.tick().started, 2);

    assert!(eco.remove_place(loops[0].factory));
    assert_eq!(eco.in_flight(), 1);
    assert!(eco.graph().is_consistent());

    let produced = tick_until(&mut eco, Duration::from_secs(10), |eco| {
        eco.place(loops[1].magazine).unwrap().count(ResourceKind::Product) >= 1
    });
    assert!(produced);
    assert_eq!(eco.place(loops[0].magazine).unwrap().resource_count(), 0);
}

/// Wiring containers to each other moves nothing.
#[test]
fn container_to_container_is_inert() {
    let rt = runtime();
    let mut eco = economy(&rt);
    let a = eco.add_place(PlaceKind::Road, 100.0, 100.0);
    let b = eco.add_place(PlaceKind::Road, 400.0, 100.0);
    eco.connect(a, b);
    eco.connect(b, a);
    add_workers(&mut eco, a, 3);
    tick_for(&mut eco, 10);
    assert_eq!(eco.place(a).unwrap().resource_count(), 3);
    assert_eq!(eco.place(b).unwrap().resource_count(), 0);
}

/// A node wired only to other nodes with nothing to give never starts.
#[test]
fn node_ring_without_input_is_idle() {
    let rt = runtime();
    let mut eco = economy(&rt);
    let ids: Vec<PlaceId> = [PlaceKind::Factory, PlaceKind::Flat, PlaceKind::Diner]
        .into_iter()
        .enumerate()
        .map(|(i, k)| eco.add_place(k, 100.0 + 200.0 * i as f32, 100.0))
        .collect();
    for i in 0..ids.len() {
        eco.connect(ids[i], ids[(i + 1) % ids.len()]);
    }
    for _ in 0..20 {
        assert_eq!(eco.tick().started, 0);
    }
}

// ===========================================================================
// Malformed saves
// ===========================================================================

#[test]
fn garbage_json_is_an_error() {
    assert!(matches!(SaveData::from_json("not json"), Err(LoadError::Json(_))));
    assert!(matches!(SaveData::from_json("{}"), Err(LoadError::Json(_))));
}

#[test]
fn empty_bytes_are_an_error() {
    assert!(matches!(SaveData::from_bytes(&[]), Err(LoadError::Decode(_))));
}

#[test]
fn wrong_header_in_json() {
    let json = format!(
        r#"{{"header":{{"magic":1,"version":{FORMAT_VERSION}}},"places":[]}}"#
    );
    assert!(matches!(
        SaveData::from_json(&json),
        Err(LoadError::InvalidMagic(1))
    ));

    let json = format!(r#"{{"header":{{"magic":{SAVE_MAGIC},"version":0}},"places":[]}}"#);
    assert!(matches!(
        SaveData::from_json(&json),
        Err(LoadError::UnsupportedVersion(0))
    ));
}

#[test]
fn unknown_kind_in_json() {
    let json = format!(
        r#"{{"header":{{"magic":{SAVE_MAGIC},"version":{FORMAT_VERSION}}},
            "places":[{{"index":0,"kind":"Castle","position":{{"x":0.0,"y":0.0}},
                        "outgoing":[],"resources":[]}}]}}"#
    );
    assert!(matches!(SaveData::from_json(&json), Err(LoadError::Json(_))));
}

#[test]
fn minimal_json_record_uses_defaults() {
    let json = format!(
        r#"{{"header":{{"magic":{SAVE_MAGIC},"version":{FORMAT_VERSION}}},
            "places":[{{"index":5,"kind":"Road","position":{{"x":10.0,"y":20.0}},
                        "outgoing":[],"resources":[{{"kind":"Worker"}}]}}]}}"#
    );
    let data = SaveData::from_json(&json).unwrap();
    let rt = runtime();
    let mut eco = economy(&rt);
    eco.load_save_data(&data).unwrap();

    let road = eco.place(PlaceId(5)).unwrap();
    assert_eq!(road.resources(), vec![worker(1.0)]);
    assert!(!road.is_waiting());
    assert_eq!(eco.add_place(PlaceKind::Barn, 0.0, 0.0), PlaceId(6));
}
