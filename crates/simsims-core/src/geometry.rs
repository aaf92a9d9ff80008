//! Positions and footprints of places on the build surface.

use serde::{Deserialize, Serialize};

/// Top-left corner of a place, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a place's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f32,
    pub height: f32,
}

/// Side length of a node's square.
pub const NODE_SIZE: f32 = 90.0;

/// Radius of a container's circle.
pub const CONTAINER_RADIUS: f32 = 60.0;

impl Footprint {
    pub const NODE: Footprint = Footprint {
        width: NODE_SIZE,
        height: NODE_SIZE,
    };

    /// Containers draw a circle inside a square slightly larger than its
    /// diameter.
    pub fn container() -> Self {
        let side = (CONTAINER_RADIUS * 2.1).round();
        Self {
            width: side,
            height: side,
        }
    }

    /// Top-left position that centres this footprint on `(x, y)`.
    pub fn centred_at(&self, x: f32, y: f32) -> Position {
        Position::new(x - self.width / 2.0, y - self.height / 2.0)
    }

    /// Inclusive containment test for a footprint placed at `origin`.
    pub fn contains(&self, origin: Position, x: f32, y: f32) -> bool {
        x >= origin.x
            && x <= origin.x + self.width
            && y >= origin.y
            && y <= origin.y + self.height
    }

    /// Centre point of a footprint placed at `origin`.
    pub fn centre(&self, origin: Position) -> (f32, f32) {
        (origin.x + self.width / 2.0, origin.y + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_side_is_rounded() {
        let f = Footprint::container();
        assert_eq!(f.width, 126.0);
        assert_eq!(f.height, 126.0);
    }

    #[test]
    fn centred_then_centre_round_trips() {
        let f = Footprint::NODE;
        let origin = f.centred_at(200.0, 100.0);
        assert_eq!(origin, Position::new(155.0, 55.0));
        assert_eq!(f.centre(origin), (200.0, 100.0));
    }

    #[test]
    fn contains_is_inclusive() {
        let f = Footprint::NODE;
        let origin = Position::new(0.0, 0.0);
        assert!(f.contains(origin, 0.0, 0.0));
        assert!(f.contains(origin, 90.0, 90.0));
        assert!(!f.contains(origin, 90.1, 10.0));
        assert!(!f.contains(origin, -0.1, 10.0));
    }
}
