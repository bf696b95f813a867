//! Terrain queries supplied by the host.

use nalgebra::Vector3;

/// Result of a ray cast against the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Distance from ray origin to hit point.
    pub distance: f32,
    /// Hit point in scene space.
    pub point: Vector3<f32>,
    /// Surface normal at the hit point (pointing away from the surface).
    pub normal: Vector3<f32>,
}

impl RaycastHit {
    /// Create a new ray hit.
    #[must_use]
    pub fn new(distance: f32, point: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            distance,
            point,
            normal,
        }
    }
}

/// Scene-space geometry queries used by the locomotion stack.
///
/// All coordinates are in scene space with +Y up.
pub trait Terrain {
    /// Height of the walkable ground below `(x, z)`.
    ///
    /// Only geometry that counts as terrain answers this query; obstacles
    /// such as walls and props return `None`.
    fn ground_height(&self, x: f32, z: f32) -> Option<f32>;

    /// Cast a ray against all scene geometry.
    ///
    /// `direction` must be unit length. Returns the closest hit within
    /// `max_distance`.
    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit>;
}

impl<T: Terrain + ?Sized> Terrain for &T {
    fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        (**self).ground_height(x, z)
    }

    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        (**self).raycast(origin, direction, max_distance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    struct Floor;

    impl Terrain for Floor {
        fn ground_height(&self, _x: f32, _z: f32) -> Option<f32> {
            Some(0.0)
        }

        fn raycast(
            &self,
            origin: Vector3<f32>,
            direction: Vector3<f32>,
            max_distance: f32,
        ) -> Option<RaycastHit> {
            if direction.y >= 0.0 {
                return None;
            }
            let t = -origin.y / direction.y;
            (0.0..=max_distance).contains(&t)
                .then(|| RaycastHit::new(t, origin + direction * t, Vector3::y()))
        }
    }

    fn probe(terrain: &impl Terrain) -> Option<RaycastHit> {
        terrain.raycast(Vector3::new(0.0, 2.0, 0.0), -Vector3::y(), 10.0)
    }

    #[test]
    fn test_reference_forwarding() {
        let floor = Floor;
        let hit = probe(&&floor).unwrap();
        assert_eq!(hit.distance, 2.0);
        assert_eq!(hit.point, Vector3::zeros());
        assert_eq!((&floor).ground_height(3.0, 4.0), Some(0.0));
    }
}
