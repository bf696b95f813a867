//! Scenes implementing [`Terrain`].
//!
//! Ground geometry answers height queries. Obstacles only block rays: a
//! character standing next to a crate keeps sampling the ground below it,
//! while the auto-wall probe still sees the crate.

use loco_types::{RaycastHit, Terrain};
use nalgebra::Vector3;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::raycast::{raycast_box, raycast_heightfield, raycast_plane, safe_normalize};
use crate::{HeightField, TerrainError};

/// Infinite horizontal ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatGround {
    /// Plane height.
    pub height: f32,
}

impl FlatGround {
    /// Ground plane at `height`.
    #[must_use]
    pub const fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Terrain for FlatGround {
    fn ground_height(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }

    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        raycast_plane(self.height, origin, direction, max_distance)
    }
}

impl Terrain for HeightField {
    fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        self.sample(x, z)
    }

    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        raycast_heightfield(self, origin, direction, max_distance)
    }
}

/// Axis-aligned box that blocks rays but is not walkable ground.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxObstacle {
    min: Vector3<f32>,
    max: Vector3<f32>,
}

impl BoxObstacle {
    /// Box spanning two corners.
    ///
    /// # Errors
    ///
    /// Returns an error if a corner is not finite or `min` exceeds `max` on
    /// any axis.
    pub fn from_corners(min: Vector3<f32>, max: Vector3<f32>) -> Result<Self, TerrainError> {
        if !(min.iter().all(|v| v.is_finite()) && max.iter().all(|v| v.is_finite())) {
            return Err(TerrainError::non_finite("box corners"));
        }
        if let Some(axis) = (0..3).find(|&i| min[i] > max[i]) {
            return Err(TerrainError::InvertedBox { axis });
        }
        Ok(Self { min, max })
    }

    /// Box centered at `center` with the given half extents.
    pub fn centered(center: Vector3<f32>, half_extents: Vector3<f32>) -> Result<Self, TerrainError> {
        Self::from_corners(center - half_extents, center + half_extents)
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Vector3<f32> {
        self.min
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vector3<f32> {
        self.max
    }

    /// Whether `point` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Vector3<f32>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Ray against this box.
    #[must_use]
    pub fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        raycast_box(&self.min, &self.max, origin, direction, max_distance)
    }
}

/// Walkable ground under a [`TerrainScene`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ground {
    /// Infinite plane.
    Flat(FlatGround),
    /// Finite height field. Height queries outside it return `None`.
    Field(HeightField),
}

impl Default for Ground {
    fn default() -> Self {
        Self::Flat(FlatGround::default())
    }
}

impl From<FlatGround> for Ground {
    fn from(ground: FlatGround) -> Self {
        Self::Flat(ground)
    }
}

impl From<HeightField> for Ground {
    fn from(field: HeightField) -> Self {
        Self::Field(field)
    }
}

impl Terrain for Ground {
    fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        match self {
            Self::Flat(flat) => flat.ground_height(x, z),
            Self::Field(field) => field.ground_height(x, z),
        }
    }

    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        match self {
            Self::Flat(flat) => flat.raycast(origin, direction, max_distance),
            Self::Field(field) => field.raycast(origin, direction, max_distance),
        }
    }
}

/// Ground plus box obstacles.
///
/// # Example
///
/// ```
/// use loco_terrain::{BoxObstacle, FlatGround, TerrainScene};
/// use loco_types::Terrain;
/// use nalgebra::Vector3;
///
/// let scene = TerrainScene::new(FlatGround::new(0.0)).with_obstacle(
///     BoxObstacle::centered(Vector3::new(0.0, 1.0, 5.0), Vector3::new(2.0, 1.0, 0.5)).unwrap(),
/// );
///
/// // The box blocks rays...
/// let hit = scene.raycast(Vector3::new(0.0, 1.0, 0.0), Vector3::z(), 10.0).unwrap();
/// assert!((hit.distance - 4.5).abs() < 1e-5);
///
/// // ...but is not ground.
/// assert_eq!(scene.ground_height(0.0, 5.0), Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerrainScene {
    ground: Ground,
    obstacles: Vec<BoxObstacle>,
}

impl TerrainScene {
    /// Scene with the given ground and no obstacles.
    #[must_use]
    pub fn new(ground: impl Into<Ground>) -> Self {
        Self {
            ground: ground.into(),
            obstacles: Vec::new(),
        }
    }

    /// Add an obstacle (builder).
    #[must_use]
    pub fn with_obstacle(mut self, obstacle: BoxObstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Add an obstacle.
    pub fn add_obstacle(&mut self, obstacle: BoxObstacle) {
        debug!(min = ?obstacle.min, max = ?obstacle.max, "obstacle added");
        self.obstacles.push(obstacle);
    }

    /// Remove all obstacles.
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Walkable ground.
    #[must_use]
    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    /// Box obstacles.
    #[must_use]
    pub fn obstacles(&self) -> &[BoxObstacle] {
        &self.obstacles
    }
}

impl Terrain for TerrainScene {
    fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        self.ground.ground_height(x, z)
    }

    fn raycast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        let direction = safe_normalize(&direction, Vector3::zeros());
        if direction == Vector3::zeros() {
            return None;
        }

        let ground = self.ground.raycast(origin, direction, max_distance);
        self.obstacles
            .iter()
            .filter_map(|o| o.raycast(origin, direction, max_distance))
            .chain(ground)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn crate_at(z: f32) -> BoxObstacle {
        BoxObstacle::centered(Vector3::new(0.0, 1.0, z), Vector3::new(1.0, 1.0, 0.5)).unwrap()
    }

    #[test]
    fn test_box_validation() {
        assert!(matches!(
            BoxObstacle::from_corners(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 1.0)),
            Err(TerrainError::InvertedBox { axis: 0 })
        ));
        assert!(BoxObstacle::from_corners(Vector3::zeros(), Vector3::new(f32::NAN, 1.0, 1.0)).is_err());

        let b = crate_at(3.0);
        assert!(b.contains(&Vector3::new(0.5, 1.5, 3.2)));
        assert!(!b.contains(&Vector3::new(0.5, 2.5, 3.2)));
    }

    #[test]
    fn test_obstacle_is_not_ground() {
        let scene = TerrainScene::new(FlatGround::new(0.25)).with_obstacle(crate_at(3.0));
        assert_eq!(scene.ground_height(0.0, 3.0), Some(0.25));

        let hit = scene
            .raycast(Vector3::new(0.0, 5.0, 3.0), -Vector3::y(), 10.0)
            .unwrap();
        assert_relative_eq!(hit.point.y, 2.0);
    }

    #[test]
    fn test_closest_hit_wins() {
        let scene = TerrainScene::new(FlatGround::new(0.0))
            .with_obstacle(crate_at(8.0))
            .with_obstacle(crate_at(4.0));
        let hit = scene
            .raycast(Vector3::new(0.0, 1.0, 0.0), Vector3::z(), 20.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 3.5);
        assert_eq!(hit.normal, -Vector3::z());
    }

    #[test]
    fn test_unnormalized_direction() {
        let scene = TerrainScene::new(FlatGround::new(0.0));
        let hit = scene
            .raycast(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, -4.0, 0.0), 10.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 2.0);
        assert!(scene.raycast(Vector3::zeros(), Vector3::zeros(), 10.0).is_none());
    }

    #[test]
    fn test_heightfield_ground() {
        let field = HeightField::flat(11, 11, 1.0, 1.0)
            .unwrap()
            .with_origin(-5.0, -5.0);
        let mut scene = TerrainScene::new(field);
        assert_eq!(scene.ground_height(0.0, 0.0), Some(1.0));
        assert_eq!(scene.ground_height(6.0, 0.0), None);

        scene.add_obstacle(crate_at(2.0));
        assert_eq!(scene.obstacles().len(), 1);
        scene.clear_obstacles();
        assert!(scene.obstacles().is_empty());
        assert!(matches!(scene.ground(), Ground::Field(_)));
    }

    #[test]
    fn test_default_scene_is_flat_zero() {
        let scene = TerrainScene::default();
        assert_eq!(scene.ground_height(100.0, -100.0), Some(0.0));
    }
}
