use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Engine-level node a body or collider belongs to.
/// The physics layer never interprets it; it only hands it back in collision events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

new_key_type! {
    /// Generational key of a body. A key of a removed body never resolves again.
    pub struct BodyId;
    /// Generational key of a collider. A key of a removed collider never resolves again.
    pub struct ColliderId;
}

/// The kind of rigid body. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    Dynamic,
    Kinematic,
}

/// Collision layer bitmasks (32 bits).
///
/// `layers` says what a collider *is*, `collides_with` what it *reacts to*.
pub mod layers {
    pub const NONE: u32 = 0;
    pub const ALL: u32 = u32::MAX;
    /// Layer assigned to new colliders unless the world config says otherwise.
    pub const DEFAULT: u32 = 1;

    /// Whether a collider on `layers` passes a filter of `mask`.
    #[inline]
    pub fn intersects(layers: u32, mask: u32) -> bool {
        layers & mask != 0
    }
}

/// Axis-aligned region in simulation units, used for spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min: Vec2,
    pub max: Vec2,
}

impl Region {
    /// Build a region from two corners in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_normalizes_corners() {
        let r = Region::new(Vec2::new(1.0, -1.0), Vec2::new(-1.0, 1.0));
        assert_eq!(r.min, Vec2::new(-1.0, -1.0));
        assert_eq!(r.max, Vec2::new(1.0, 1.0));
        assert_eq!(r.center(), Vec2::ZERO);
    }

    #[test]
    fn region_from_center_size() {
        let r = Region::from_center_size(Vec2::new(10.0, 0.0), Vec2::new(4.0, 2.0));
        assert_eq!(r.min, Vec2::new(8.0, -1.0));
        assert_eq!(r.max, Vec2::new(12.0, 1.0));
        assert!(r.contains(Vec2::new(9.0, 0.5)));
        assert!(!r.contains(Vec2::new(7.9, 0.0)));
    }

    #[test]
    fn region_overlap_touching_edges() {
        let a = Region::new(Vec2::ZERO, Vec2::ONE);
        let b = Region::new(Vec2::ONE, Vec2::splat(2.0));
        let c = Region::new(Vec2::splat(3.0), Vec2::splat(4.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn layer_intersection() {
        assert!(layers::intersects(0b0110, 0b0010));
        assert!(!layers::intersects(0b0100, 0b0011));
        assert!(!layers::intersects(layers::ALL, layers::NONE));
        assert!(layers::intersects(layers::DEFAULT, layers::ALL));
    }
}
