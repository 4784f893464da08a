//! Rendering-visibility predicates
//!
//! The streaming core only ever asks "is this volume visible?". A camera
//! subsystem answers with a [`Frustum`], a closure, or anything else that
//! implements [`VisibilityPredicate`].

use crate::bounds::Bounds;
use glam::{Mat4, Vec3, Vec4};

/// Side-effect-free visibility test for a bounding volume
pub trait VisibilityPredicate {
    /// Check if the volume should be considered visible
    fn is_volume_visible(&self, volume: &Bounds) -> bool;
}

impl<F> VisibilityPredicate for F
where
    F: Fn(&Bounds) -> bool,
{
    fn is_volume_visible(&self, volume: &Bounds) -> bool {
        self(volume)
    }
}

/// View frustum as six inward-facing planes (left, right, bottom, top, near, far)
///
/// Each plane is stored as `(normal.x, normal.y, normal.z, distance)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes of a view-projection matrix with a `[0, 1]` depth range
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let r0 = view_projection.row(0);
        let r1 = view_projection.row(1);
        let r2 = view_projection.row(2);
        let r3 = view_projection.row(3);

        let mut planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2];
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Test if a point is inside
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Test if a box is at least partially inside
    ///
    /// Empty boxes are never visible.
    pub fn intersects_bounds(&self, bounds: &Bounds) -> bool {
        if bounds.is_empty() {
            return false;
        }
        let (min, max) = (bounds.min(), bounds.max());
        self.planes.iter().all(|plane| {
            let positive = Vec3::new(
                if plane.x >= 0.0 { max.x } else { min.x },
                if plane.y >= 0.0 { max.y } else { min.y },
                if plane.z >= 0.0 { max.z } else { min.z },
            );
            plane.truncate().dot(positive) + plane.w >= 0.0
        })
    }
}

/// Frustum test with an optional draw distance
#[derive(Clone, Copy, Debug)]
pub struct FrustumVisibility {
    /// Camera frustum
    pub frustum: Frustum,
    /// Camera position
    pub eye: Vec3,
    /// Volumes farther than this from the eye are culled
    pub max_distance: Option<f32>,
}

impl FrustumVisibility {
    /// Build from a camera
    pub fn new(view_projection: &Mat4, eye: Vec3) -> Self {
        Self {
            frustum: Frustum::from_view_projection(view_projection),
            eye,
            max_distance: None,
        }
    }

    /// Set draw distance
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = Some(distance);
        self
    }
}

impl VisibilityPredicate for FrustumVisibility {
    fn is_volume_visible(&self, volume: &Bounds) -> bool {
        if volume.is_empty() {
            return false;
        }
        if let Some(max) = self.max_distance {
            let closest = self.eye.clamp(volume.min(), volume.max());
            if closest.distance_squared(self.eye) > max * max {
                return false;
            }
        }
        self.frustum.intersects_bounds(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Mat4 {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        proj * view
    }

    #[test]
    fn test_frustum_point() {
        let frustum = Frustum::from_view_projection(&camera());
        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -200.0)));
    }

    #[test]
    fn test_frustum_bounds() {
        let frustum = Frustum::from_view_projection(&camera());
        let ahead = Bounds::new(Vec3::new(0.0, 0.0, -20.0), Vec3::ONE);
        let behind = Bounds::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ONE);
        let straddling = Bounds::new(Vec3::ZERO, Vec3::splat(5.0));

        assert!(frustum.intersects_bounds(&ahead));
        assert!(!frustum.intersects_bounds(&behind));
        assert!(frustum.intersects_bounds(&straddling));
        assert!(!frustum.intersects_bounds(&Bounds::EMPTY));
    }

    #[test]
    fn test_draw_distance() {
        let visibility = FrustumVisibility::new(&camera(), Vec3::ZERO).with_max_distance(30.0);
        assert!(visibility.is_volume_visible(&Bounds::new(Vec3::new(0.0, 0.0, -20.0), Vec3::ONE)));
        assert!(!visibility.is_volume_visible(&Bounds::new(Vec3::new(0.0, 0.0, -50.0), Vec3::ONE)));
    }

    #[test]
    fn test_closure_predicate() {
        let only_positive_x = |b: &Bounds| b.center.x > 0.0;
        assert!(only_positive_x.is_volume_visible(&Bounds::new(Vec3::X, Vec3::ONE)));
        assert!(!only_positive_x.is_volume_visible(&Bounds::new(-Vec3::X, Vec3::ONE)));
    }
}
