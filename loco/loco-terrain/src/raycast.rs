//! Ray casts against terrain primitives.
//!
//! - Plane: analytic intersection with a horizontal plane
//! - Box: slab test against an axis-aligned box
//! - Height field: ray marching with bisection refinement
//!
//! All functions expect a unit `direction` and report the closest hit with
//! `0 <= distance <= max_distance`.

// Step counts are bounded before casting.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use loco_types::RaycastHit;
use nalgebra::Vector3;

use crate::HeightField;

/// Upper bound on ray-march iterations for one height field query.
const MAX_MARCH_STEPS: usize = 100_000;

/// Bisection iterations after a surface crossing.
const REFINE_STEPS: usize = 8;

/// Directions with a horizontal component below this are treated as vertical.
const VERTICAL_EPS: f32 = 1e-6;

/// Normalize `v`, or return `fallback` when it is too short.
#[inline]
pub(crate) fn safe_normalize(v: &Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    let n = v.norm();
    if n > 1e-10 { v / n } else { fallback }
}

/// Ray against the horizontal plane `y = height`.
///
/// The returned normal faces the ray origin.
#[must_use]
pub fn raycast_plane(
    height: f32,
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RaycastHit> {
    let denom = direction.y;
    if !(denom.abs() >= 1e-10) {
        return None;
    }

    let t = (height - origin.y) / denom;
    if t < 0.0 || t > max_distance {
        return None;
    }

    let normal = if denom > 0.0 {
        -Vector3::y()
    } else {
        Vector3::y()
    };
    Some(RaycastHit::new(t, origin + direction * t, normal))
}

/// Ray against the axis-aligned box `[min, max]` using the slab method.
///
/// A ray starting inside the box reports no hit.
#[must_use]
pub fn raycast_box(
    min: &Vector3<f32>,
    max: &Vector3<f32>,
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RaycastHit> {
    let mut t_min = 0.0_f32;
    let mut t_max = max_distance;
    let mut hit_normal = Vector3::zeros();

    for i in 0..3 {
        let o = origin[i];
        let d = direction[i];

        if d.abs() < 1e-10 {
            if o < min[i] || o > max[i] {
                return None;
            }
        } else {
            let inv = 1.0 / d;
            let t1 = (min[i] - o) * inv;
            let t2 = (max[i] - o) * inv;

            let (t_near, t_far, sign) = if t1 < t2 {
                (t1, t2, -1.0)
            } else {
                (t2, t1, 1.0)
            };

            if t_near > t_min {
                t_min = t_near;
                hit_normal = Vector3::zeros();
                hit_normal[i] = sign;
            }

            t_max = t_max.min(t_far);

            if t_min > t_max {
                return None;
            }
        }
    }

    // Origin inside the box: no entering face.
    if hit_normal == Vector3::zeros() || t_min > max_distance {
        return None;
    }

    Some(RaycastHit::new(
        t_min,
        origin + direction * t_min,
        hit_normal,
    ))
}

/// Ray against the upper surface of a height field.
///
/// Only crossings from above the surface to below it count. Vertical rays
/// use a direct height lookup; other rays march at half the cell size and
/// refine the crossing by bisection.
#[must_use]
pub fn raycast_heightfield(
    field: &HeightField,
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RaycastHit> {
    if !(max_distance >= 0.0) {
        return None;
    }

    if direction.x.abs() < VERTICAL_EPS && direction.z.abs() < VERTICAL_EPS {
        return raycast_heightfield_vertical(field, origin, direction, max_distance);
    }

    let step_size = field.cell_size() * 0.5;
    let max_steps = ((max_distance / step_size) as usize + 1).min(MAX_MARCH_STEPS);

    let mut t = 0.0_f32;
    let mut prev_t = 0.0_f32;
    let mut prev_height_diff = None;

    for _ in 0..=max_steps {
        let t_here = t.min(max_distance);
        let pt = origin + direction * t_here;

        if let Some(ground) = field.sample(pt.x, pt.z) {
            let height_diff = pt.y - ground;

            if let Some(prev) = prev_height_diff {
                if prev > 0.0 && height_diff <= 0.0 {
                    let hit_t = refine_crossing(field, origin, direction, prev_t, t_here);
                    let point = origin + direction * hit_t;
                    let normal = field.normal_clamped(point.x, point.z);
                    return Some(RaycastHit::new(hit_t, point, normal));
                }
            }

            prev_height_diff = Some(height_diff);
            prev_t = t_here;
        } else {
            prev_height_diff = None;
        }

        if t_here >= max_distance {
            break;
        }
        t += step_size;
    }

    None
}

fn raycast_heightfield_vertical(
    field: &HeightField,
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RaycastHit> {
    if direction.y >= 0.0 {
        return None;
    }
    let ground = field.sample(origin.x, origin.z)?;
    let t = (origin.y - ground) / -direction.y;
    if !(0.0..=max_distance).contains(&t) {
        return None;
    }
    let point = Vector3::new(origin.x, ground, origin.z);
    Some(RaycastHit::new(t, point, field.normal_clamped(origin.x, origin.z)))
}

fn refine_crossing(
    field: &HeightField,
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    lo: f32,
    hi: f32,
) -> f32 {
    let mut t_lo = lo.max(0.0);
    let mut t_hi = hi;

    for _ in 0..REFINE_STEPS {
        let t_mid = (t_lo + t_hi) * 0.5;
        let p = origin + direction * t_mid;
        match field.sample(p.x, p.z) {
            Some(h) if p.y - h > 0.0 => t_lo = t_mid,
            Some(_) => t_hi = t_mid,
            None => break,
        }
    }

    (t_lo + t_hi) * 0.5
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_hit_from_above() {
        let hit = raycast_plane(1.0, Vector3::new(0.0, 5.0, 0.0), -Vector3::y(), 10.0).unwrap();
        assert_relative_eq!(hit.distance, 4.0);
        assert_relative_eq!(hit.point.y, 1.0);
        assert_eq!(hit.normal, Vector3::y());
    }

    #[test]
    fn test_plane_parallel_and_behind() {
        assert!(raycast_plane(0.0, Vector3::new(0.0, 1.0, 0.0), Vector3::x(), 10.0).is_none());
        assert!(raycast_plane(0.0, Vector3::new(0.0, 1.0, 0.0), Vector3::y(), 10.0).is_none());
        assert!(raycast_plane(0.0, Vector3::new(0.0, 20.0, 0.0), -Vector3::y(), 10.0).is_none());
    }

    #[test]
    fn test_plane_from_below_faces_origin() {
        let hit = raycast_plane(2.0, Vector3::zeros(), Vector3::y(), 10.0).unwrap();
        assert_eq!(hit.normal, -Vector3::y());
    }

    #[test]
    fn test_box_hit_side() {
        let min = Vector3::new(4.0, 0.0, -1.0);
        let max = Vector3::new(6.0, 2.0, 1.0);
        let hit = raycast_box(&min, &max, Vector3::new(0.0, 1.0, 0.0), Vector3::x(), 10.0).unwrap();
        assert_relative_eq!(hit.distance, 4.0);
        assert_eq!(hit.normal, -Vector3::x());
    }

    #[test]
    fn test_box_hit_top() {
        let min = Vector3::new(-1.0, 0.0, -1.0);
        let max = Vector3::new(1.0, 2.0, 1.0);
        let hit = raycast_box(&min, &max, Vector3::new(0.0, 5.0, 0.0), -Vector3::y(), 10.0).unwrap();
        assert_relative_eq!(hit.distance, 3.0);
        assert_eq!(hit.normal, Vector3::y());
    }

    #[test]
    fn test_box_miss_and_range() {
        let min = Vector3::new(4.0, 0.0, -1.0);
        let max = Vector3::new(6.0, 2.0, 1.0);
        assert!(raycast_box(&min, &max, Vector3::new(0.0, 5.0, 0.0), Vector3::x(), 10.0).is_none());
        assert!(raycast_box(&min, &max, Vector3::new(0.0, 1.0, 0.0), Vector3::x(), 3.0).is_none());
        assert!(raycast_box(&min, &max, Vector3::new(0.0, 1.0, 0.0), -Vector3::x(), 10.0).is_none());
    }

    #[test]
    fn test_box_origin_inside() {
        let min = Vector3::new(-1.0, -1.0, -1.0);
        let max = Vector3::new(1.0, 1.0, 1.0);
        assert!(raycast_box(&min, &max, Vector3::zeros(), Vector3::x(), 10.0).is_none());
    }

    #[test]
    fn test_heightfield_vertical() {
        let field = HeightField::flat(10, 10, 1.0, 0.5).unwrap();
        let hit =
            raycast_heightfield(&field, Vector3::new(3.0, 4.0, 3.0), -Vector3::y(), 10.0).unwrap();
        assert_relative_eq!(hit.distance, 3.5);
        assert_relative_eq!(hit.point, Vector3::new(3.0, 0.5, 3.0));
        assert_relative_eq!(hit.normal, Vector3::y(), epsilon = 1e-6);

        // Upward rays never hit the surface from above.
        assert!(raycast_heightfield(&field, Vector3::new(3.0, 0.0, 3.0), Vector3::y(), 10.0).is_none());
        // Outside the grid.
        assert!(raycast_heightfield(&field, Vector3::new(30.0, 4.0, 3.0), -Vector3::y(), 10.0).is_none());
    }

    #[test]
    fn test_heightfield_slanted() {
        let field = HeightField::flat(20, 20, 0.5, 0.0).unwrap();
        let dir = Vector3::new(1.0, -1.0, 0.0).normalize();
        let hit = raycast_heightfield(&field, Vector3::new(1.0, 2.0, 2.0), dir, 10.0).unwrap();
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 0.01);
        assert_relative_eq!(hit.point.x, 3.0, epsilon = 0.01);
        assert_relative_eq!(hit.distance, 2.0 * 2.0_f32.sqrt(), epsilon = 0.02);
    }

    #[test]
    fn test_heightfield_clamped_last_step() {
        // Step 0.25: samples at 0, 0.25, .., 1.25 then a short step to 1.45.
        let field = HeightField::flat(20, 20, 0.5, 0.0).unwrap();
        let dir = Vector3::new(1.0, -1.0, 0.0).normalize();
        let hit = raycast_heightfield(&field, Vector3::new(1.0, 1.0, 2.0), dir, 1.45).unwrap();
        assert!(hit.distance > 1.25 && hit.distance <= 1.45);
        assert_relative_eq!(hit.distance, 2.0_f32.sqrt(), epsilon = 1e-3);
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_heightfield_out_of_range() {
        let field = HeightField::flat(20, 20, 0.5, 0.0).unwrap();
        let dir = Vector3::new(1.0, -1.0, 0.0).normalize();
        assert!(raycast_heightfield(&field, Vector3::new(1.0, 2.0, 2.0), dir, 1.0).is_none());
        assert!(raycast_heightfield(&field, Vector3::new(1.0, 2.0, 2.0), dir, -1.0).is_none());
    }

    #[test]
    fn test_safe_normalize_fallback() {
        assert_eq!(safe_normalize(&Vector3::zeros(), Vector3::y()), Vector3::y());
        assert_relative_eq!(safe_normalize(&Vector3::new(0.0, 0.0, 3.0), Vector3::y()), Vector3::z());
    }
}
