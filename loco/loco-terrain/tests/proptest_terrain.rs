//! Property-based tests for terrain queries.
//!
//! Run with: cargo test -p loco-terrain -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use loco_terrain::{BoxObstacle, FlatGround, HeightField, TerrainScene};
use loco_types::Terrain;
use nalgebra::Vector3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Random 8x8 height field with unit cells.
fn arb_heightfield() -> impl Strategy<Value = HeightField> {
    prop::collection::vec(-2.0f32..2.0, 64)
        .prop_map(|heights| HeightField::new(heights, 8, 8, 1.0).unwrap())
}

/// Point strictly inside the 8x8 grid.
fn arb_inside() -> impl Strategy<Value = (f32, f32)> {
    (0.0f32..7.0, 0.0f32..7.0)
}

// =============================================================================
// Height field
// =============================================================================

proptest! {
    #[test]
    fn proptest_sample_within_bounds(field in arb_heightfield(), (x, z) in arb_inside()) {
        let h = field.sample(x, z).unwrap();
        prop_assert!(h >= field.min_height() - 1e-5);
        prop_assert!(h <= field.max_height() + 1e-5);
    }

    #[test]
    fn proptest_normal_points_up(field in arb_heightfield(), (x, z) in arb_inside()) {
        let n = field.normal(x, z).unwrap();
        prop_assert!(n.y > 0.0);
        prop_assert!((n.norm() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn proptest_vertical_ray_lands_on_sample(
        field in arb_heightfield(),
        (x, z) in arb_inside(),
        lift in 0.1f32..5.0,
    ) {
        let ground = field.sample(x, z).unwrap();
        let origin = Vector3::new(x, field.max_height() + lift, z);
        let hit = field.raycast(origin, -Vector3::y(), 20.0).unwrap();
        prop_assert!((hit.point.y - ground).abs() < 1e-4);
        prop_assert!((hit.distance - (origin.y - ground)).abs() < 1e-4);
    }
}

// =============================================================================
// Scene
// =============================================================================

proptest! {
    #[test]
    fn proptest_obstacles_never_change_ground(
        height in -1.0f32..1.0,
        (x, z) in (-10.0f32..10.0, -10.0f32..10.0),
        top in 0.5f32..3.0,
    ) {
        let scene = TerrainScene::new(FlatGround::new(height)).with_obstacle(
            BoxObstacle::from_corners(
                Vector3::new(x - 1.0, height, z - 1.0),
                Vector3::new(x + 1.0, height + top, z + 1.0),
            )
            .unwrap(),
        );
        prop_assert_eq!(scene.ground_height(x, z), Some(height));

        let hit = scene.raycast(Vector3::new(x, height + 10.0, z), -Vector3::y(), 20.0).unwrap();
        prop_assert!((hit.point.y - (height + top)).abs() < 1e-4);
    }

    #[test]
    fn proptest_hit_distance_respects_range(
        origin_y in 0.5f32..20.0,
        max_distance in 0.0f32..20.0,
    ) {
        let ground = FlatGround::new(0.0);
        let hit = ground.raycast(Vector3::new(0.0, origin_y, 0.0), -Vector3::y(), max_distance);
        prop_assert_eq!(hit.is_some(), origin_y <= max_distance);
    }
}
