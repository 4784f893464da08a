//! Scripted camera following a waypoint path

use glam::{Mat4, Vec3};
use void_world::FrustumVisibility;

/// Camera offset behind and above the tracked point
const FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 6.0, 0.0);
const FOLLOW_DISTANCE: f32 = 12.0;

/// Piecewise-linear path, parameterised by arc length
#[derive(Debug, Clone)]
pub struct CameraPath {
    waypoints: Vec<Vec3>,
    length: f32,
}

impl CameraPath {
    pub fn new(waypoints: impl IntoIterator<Item = Vec3>) -> Self {
        let waypoints: Vec<Vec3> = waypoints.into_iter().collect();
        let length = waypoints.windows(2).map(|w| w[0].distance(w[1])).sum();
        Self { waypoints, length }
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Point at `t` in `[0, 1]` of the total length
    pub fn sample(&self, t: f32) -> Vec3 {
        let Some(&first) = self.waypoints.first() else {
            return Vec3::ZERO;
        };
        let mut remaining = t.clamp(0.0, 1.0) * self.length;
        for w in self.waypoints.windows(2) {
            let segment = w[0].distance(w[1]);
            if remaining <= segment && segment > 0.0 {
                return w[0].lerp(w[1], remaining / segment);
            }
            remaining -= segment;
        }
        self.waypoints.last().copied().unwrap_or(first)
    }

    /// Direction of travel at `t`
    pub fn heading(&self, t: f32) -> Vec3 {
        let ahead = self.sample((t + 0.01).min(1.0));
        let behind = self.sample((t - 0.01).max(0.0));
        let dir = (ahead - behind).normalize_or_zero();
        if dir == Vec3::ZERO {
            Vec3::X
        } else {
            dir
        }
    }
}

/// Follow camera looking along the heading
#[derive(Debug, Clone, Copy)]
pub struct FollowCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub view_distance: f32,
}

impl FollowCamera {
    /// Eye position for a tracked point and heading
    pub fn eye(&self, target: Vec3, heading: Vec3) -> Vec3 {
        target - heading * FOLLOW_DISTANCE + FOLLOW_OFFSET
    }

    /// Visibility predicate for this frame
    pub fn visibility(&self, target: Vec3, heading: Vec3) -> FrustumVisibility {
        let eye = self.eye(target, heading);
        let view = Mat4::look_at_rh(eye, target + heading * FOLLOW_DISTANCE, Vec3::Y);
        let projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            0.1,
            self.view_distance,
        );
        FrustumVisibility::new(&(projection * view), eye).with_max_distance(self.view_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_world::{Bounds, VisibilityPredicate};

    #[test]
    fn test_sample_by_arc_length() {
        let path = CameraPath::new([Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 10.0)]);
        assert_eq!(path.length(), 20.0);
        assert_eq!(path.sample(0.0), Vec3::ZERO);
        assert_eq!(path.sample(0.25), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(path.sample(0.75), Vec3::new(10.0, 0.0, 5.0));
        assert_eq!(path.sample(2.0), Vec3::new(10.0, 0.0, 10.0));
    }

    #[test]
    fn test_degenerate_paths() {
        assert_eq!(CameraPath::new([]).sample(0.5), Vec3::ZERO);
        let single = CameraPath::new([Vec3::ONE]);
        assert_eq!(single.sample(0.5), Vec3::ONE);
        assert_eq!(single.heading(0.5), Vec3::X);
    }

    #[test]
    fn test_camera_sees_ahead_not_behind() {
        let camera = FollowCamera {
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            view_distance: 50.0,
        };
        let visibility = camera.visibility(Vec3::ZERO, Vec3::X);

        let ahead = Bounds::new(Vec3::new(15.0, 0.0, 0.0), Vec3::splat(2.0));
        let behind = Bounds::new(Vec3::new(-40.0, 0.0, 0.0), Vec3::splat(2.0));
        let far = Bounds::new(Vec3::new(500.0, 0.0, 0.0), Vec3::splat(2.0));
        assert!(visibility.is_volume_visible(&ahead));
        assert!(!visibility.is_volume_visible(&behind));
        assert!(!visibility.is_volume_visible(&far));
    }
}
