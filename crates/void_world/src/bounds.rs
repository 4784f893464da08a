//! Axis-aligned bounding volumes for containment and visibility tests

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box stored as center plus half-extents
///
/// A box with any half-extent that is zero, negative or non-finite is empty:
/// it never contains a point and never intersects another box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// World-space center
    pub center: Vec3,
    /// Half size along each axis
    pub half_extents: Vec3,
}

impl Bounds {
    /// The canonical empty box
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        half_extents: Vec3::ZERO,
    };

    /// Create from center and half-extents
    #[inline]
    pub const fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Create from min and max corners
    ///
    /// Inverted corners produce an empty box.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Smallest box enclosing every point
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::EMPTY;
        };
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Self::from_min_max(min, max)
    }

    /// Minimum corner
    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    /// Maximum corner
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Full size along each axis
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }

    /// Check if the box is empty (malformed boxes are empty)
    #[inline]
    pub fn is_empty(&self) -> bool {
        let h = self.half_extents;
        !(h.x > 0.0 && h.y > 0.0 && h.z > 0.0) || !h.is_finite() || !self.center.is_finite()
    }

    /// Check if a point is inside (boundary inclusive)
    pub fn contains(&self, point: Vec3) -> bool {
        if self.is_empty() {
            return false;
        }
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y && d.z <= self.half_extents.z
    }

    /// Check if two boxes overlap
    pub fn intersects(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let d = (other.center - self.center).abs();
        let reach = self.half_extents + other.half_extents;
        d.x <= reach.x && d.y <= reach.y && d.z <= reach.z
    }

    /// Union of two boxes, ignoring empty operands
    pub fn union(&self, other: &Bounds) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Self::EMPTY,
            (true, false) => *other,
            (false, true) => *self,
            (false, false) => Self::from_min_max(self.min().min(other.min()), self.max().max(other.max())),
        }
    }

    /// The 8 corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min(), self.max());
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ]
    }

    /// Transform local bounds into world space (result is re-fit axis-aligned)
    pub fn transformed(&self, world_transform: &Mat4) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let corners = self.corners().map(|c| world_transform.transform_point3(c));
        Self::from_points(&corners)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Authored geometry extents of a hierarchy node
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalGeometry {
    /// Bounds in the node's local space
    pub local_bounds: Bounds,
    /// Local-to-world transform
    #[serde(default = "identity")]
    pub transform: Mat4,
}

fn identity() -> Mat4 {
    Mat4::IDENTITY
}

impl LocalGeometry {
    /// Geometry already expressed in world space
    pub fn world(bounds: Bounds) -> Self {
        Self {
            local_bounds: bounds,
            transform: Mat4::IDENTITY,
        }
    }

    /// Set the local-to-world transform
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// World-space bounds of this geometry
    pub fn world_bounds(&self) -> Bounds {
        self.local_bounds.transformed(&self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_contains() {
        let b = Bounds::new(Vec3::ZERO, Vec3::ONE);
        assert!(b.contains(Vec3::new(0.5, -0.5, 0.9)));
        assert!(b.contains(Vec3::ONE));
        assert!(!b.contains(Vec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_malformed_is_empty() {
        let flat = Bounds::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        let inverted = Bounds::from_min_max(Vec3::ONE, Vec3::ZERO);
        let nan = Bounds::new(Vec3::ZERO, Vec3::splat(f32::NAN));

        for b in [flat, inverted, nan, Bounds::EMPTY] {
            assert!(b.is_empty());
            assert!(!b.contains(b.center));
            assert!(!b.intersects(&Bounds::new(Vec3::ZERO, Vec3::splat(10.0))));
        }
    }

    #[test]
    fn test_intersects() {
        let a = Bounds::from_min_max(Vec3::ZERO, Vec3::ONE);
        let b = Bounds::from_min_max(Vec3::splat(0.5), Vec3::splat(1.5));
        let c = Bounds::from_min_max(Vec3::splat(2.0), Vec3::splat(3.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_union_skips_empty() {
        let a = Bounds::from_min_max(Vec3::ZERO, Vec3::ONE);
        let b = Bounds::from_min_max(Vec3::splat(2.0), Vec3::splat(3.0));

        assert_eq!(a.union(&Bounds::EMPTY), a);
        assert_eq!(Bounds::EMPTY.union(&b), b);

        let u = a.union(&b);
        assert_eq!(u.min(), Vec3::ZERO);
        assert_eq!(u.max(), Vec3::splat(3.0));
    }

    #[test]
    fn test_transformed_bounds() {
        let local = Bounds::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let moved = local.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert!((moved.center - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);

        // Quarter turn about Y swaps the X and Z extents
        let turned = local.transformed(&Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)));
        assert!((turned.half_extents - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-5);
    }
}
