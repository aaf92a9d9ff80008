//! The starting town built when there is no save to restore.
//!
//! ```text
//!   Field ----> Barn ----> Diner
//!     ^                      |
//!     |                      v
//!   Road <-------------------+
//!     |  ^        ^
//!     v  |        |
//!   Factory --> Magazine --> Flat
//! ```
//!
//! Every node returns its workers to the road, so the town keeps running
//! until accidents, wear and hunger thin the population out.

use simsims_core::economy::Economy;
use simsims_core::id::PlaceId;
use simsims_core::place::PlaceKind;
use simsims_core::resource::ResourceKind;
use simsims_data::Surface;

const STARTING_WORKERS: usize = 8;
const STARTING_FOOD: usize = 4;

/// Lay out the town on `surface` and stock it.
pub fn build_town(economy: &mut Economy, surface: Surface) {
    let (w, h) = (surface.width as f32, surface.height as f32);
    let at = |fx: f32, fy: f32| (w * fx, h * fy);

    let mut place = |kind: PlaceKind, (x, y): (f32, f32)| economy.add_place(kind, x, y);
    let road = place(PlaceKind::Road, at(0.2, 0.5));
    let field = place(PlaceKind::Field, at(0.2, 0.2));
    let barn = place(PlaceKind::Barn, at(0.5, 0.2));
    let diner = place(PlaceKind::Diner, at(0.8, 0.2));
    let factory = place(PlaceKind::Factory, at(0.2, 0.8));
    let magazine = place(PlaceKind::Magazine, at(0.5, 0.8));
    let flat = place(PlaceKind::Flat, at(0.8, 0.8));

    let edges: [(PlaceId, PlaceId); 12] = [
        (road, field),
        (field, barn),
        (field, road),
        (barn, diner),
        (road, diner),
        (diner, road),
        (road, factory),
        (factory, magazine),
        (factory, road),
        (magazine, flat),
        (road, flat),
        (flat, road),
    ];
    for (from, to) in edges {
        economy.connect(from, to);
    }

    for _ in 0..STARTING_WORKERS {
        economy.insert_resource(road, ResourceKind::Worker.spawn());
    }
    for _ in 0..STARTING_FOOD {
        economy.insert_resource(barn, ResourceKind::Food.spawn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simsims_core::test_utils::{economy, runtime};

    #[test]
    fn town_is_fully_wired() {
        let rt = runtime();
        let mut eco = economy(&rt);
        build_town(&mut eco, Surface::default());

        assert_eq!(eco.place_count(), 7);
        assert_eq!(eco.graph().edge_count(), 12);
        assert!(eco.graph().is_consistent());
        for place in eco.places() {
            assert!(
                eco.has_required_connections(place.id()),
                "{} is not wired up",
                place.name()
            );
        }
    }

    #[test]
    fn town_fits_default_surface() {
        let rt = runtime();
        let mut eco = economy(&rt);
        let surface = Surface::default();
        build_town(&mut eco, surface);
        for place in eco.places() {
            let p = place.position();
            let f = place.footprint();
            assert!(p.x >= 0.0 && p.y >= 0.0);
            assert!(p.x + f.width <= surface.width as f32);
            assert!(p.y + f.height <= surface.height as f32);
        }
    }
}
