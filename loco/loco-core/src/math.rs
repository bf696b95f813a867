//! Ground-plane rotation helpers and wall geometry.
//!
//! Yaw is measured from +Z toward +X, so `yaw_rotation(d) * Z == d` for any
//! unit ground-plane direction `d`.

use std::f32::consts::PI;

use loco_types::WallSegment;
use nalgebra::{UnitQuaternion, Vector2, Vector3};

/// Exponential-map magnitudes below this decode to the identity rotation.
const EXP_MAP_EPS: f32 = 0.01;

/// Linear interpolation.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to `[0, 1]`.
#[inline]
#[must_use]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Heading angle of a ground-plane direction.
#[inline]
#[must_use]
pub fn yaw_of(direction: &Vector3<f32>) -> f32 {
    direction.x.atan2(direction.z)
}

/// Rotation about +Y by `angle` radians.
#[inline]
#[must_use]
pub fn rotate_y(angle: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle)
}

/// Pure yaw rotation that turns +Z onto `direction`.
#[inline]
#[must_use]
pub fn yaw_rotation(direction: &Vector3<f32>) -> UnitQuaternion<f32> {
    rotate_y(yaw_of(direction))
}

/// Unit ground-plane direction from a 2D `(x, z)` vector, +Z if degenerate.
#[must_use]
pub fn ground_direction(v: &Vector2<f32>) -> Vector3<f32> {
    let d = Vector3::new(v.x, 0.0, v.y);
    let n = d.norm();
    if n > 1e-6 { d / n } else { Vector3::z() }
}

/// Blend two headings along the shorter arc.
///
/// Only the yaw of each input matters. `t = 0` yields the heading of `from`,
/// `t = 1` the heading of `to`.
#[must_use]
pub fn mix_directions(from: &Vector3<f32>, to: &Vector3<f32>, t: f32) -> Vector3<f32> {
    let a = yaw_of(from);
    let b = yaw_of(to);
    let mut delta = b - a;
    if delta > PI {
        delta -= 2.0 * PI;
    } else if delta < -PI {
        delta += 2.0 * PI;
    }
    let angle = a + delta * t;
    Vector3::new(angle.sin(), 0.0, angle.cos())
}

/// Rotation from an exponential-map vector.
///
/// Vectors shorter than 0.01 decode to the identity.
#[must_use]
pub fn quat_exp(v: &Vector3<f32>) -> UnitQuaternion<f32> {
    let theta = v.norm();
    if theta < EXP_MAP_EPS || !theta.is_finite() {
        return UnitQuaternion::identity();
    }
    let s = theta.sin() / theta;
    UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(
        theta.cos(),
        v.x * s,
        v.y * s,
        v.z * s,
    ))
}

/// Push a point away from a wall.
///
/// Points closer than `width + val` are moved along the wall normal to
/// `width + clamp01((d - width) / val) * val`. The net effect is that points
/// inside `width` land exactly at `width`, and points in the soft band stay
/// put. A point lying on the segment uses the segment normal.
///
/// Returns `None` when the wall is too far to matter.
#[must_use]
pub fn push_out(point: Vector2<f32>, wall: &WallSegment, width: f32, val: f32) -> Option<Vector2<f32>> {
    let nearest = wall.nearest_point(point);
    let offset = point - nearest;
    let d = offset.norm();
    if !(d < width + val) {
        return None;
    }
    let normal = if d > 1e-6 { offset / d } else { wall.normal() };
    let target = width + clamp01((d - width) / val) * val;
    Some(nearest + normal * target)
}

/// Wall proximity weight in `[0, 1]`: 1 within `width`, 0 beyond `width + val`.
#[must_use]
pub fn bump_weight(point: Vector2<f32>, wall: &WallSegment, width: f32, val: f32) -> f32 {
    1.0 - clamp01((wall.distance(point) - width) / val)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_yaw_rotation_maps_forward() {
        for d in [
            Vector3::z(),
            Vector3::x(),
            -Vector3::z(),
            Vector3::new(1.0, 0.0, 1.0).normalize(),
        ] {
            assert_relative_eq!(yaw_rotation(&d) * Vector3::z(), d, epsilon = 1e-6);
        }
        // +X maps to -Z under a quarter turn.
        assert_relative_eq!(
            rotate_y(PI / 2.0) * Vector3::x(),
            -Vector3::z(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_ground_direction() {
        assert_relative_eq!(ground_direction(&Vector2::new(3.0, 0.0)), Vector3::x());
        assert_eq!(ground_direction(&Vector2::zeros()), Vector3::z());
    }

    #[test]
    fn test_mix_directions_endpoints() {
        let a = Vector3::z();
        let b = Vector3::x();
        assert_relative_eq!(mix_directions(&a, &b, 0.0), a, epsilon = 1e-6);
        assert_relative_eq!(mix_directions(&a, &b, 1.0), b, epsilon = 1e-6);
        let half = mix_directions(&a, &b, 0.5);
        assert_relative_eq!(half, Vector3::new(1.0, 0.0, 1.0).normalize(), epsilon = 1e-6);
    }

    #[test]
    fn test_mix_directions_short_arc() {
        // 170 and -170 degrees are 20 degrees apart through 180.
        let a = Vector3::new(10f32.to_radians().sin(), 0.0, -(10f32.to_radians().cos()));
        let b = Vector3::new(-(10f32.to_radians().sin()), 0.0, -(10f32.to_radians().cos()));
        let mid = mix_directions(&a, &b, 0.5);
        assert_relative_eq!(mid, -Vector3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_quat_exp() {
        assert_eq!(quat_exp(&Vector3::new(0.001, 0.0, 0.0)), UnitQuaternion::identity());
        // exp(v) is a rotation of 2|v| about v.
        let q = quat_exp(&Vector3::new(0.0, PI / 4.0, 0.0));
        assert_relative_eq!(q.angle(), PI / 2.0, epsilon = 1e-5);
        assert_relative_eq!(q * Vector3::z(), Vector3::x(), epsilon = 1e-5);
    }

    #[test]
    fn test_push_out_inside_width() {
        let wall = WallSegment::new(Vector2::new(-5.0, 0.0), Vector2::new(5.0, 0.0)).unwrap();
        let p = push_out(Vector2::new(1.0, 0.5), &wall, 1.5, 1.1).unwrap();
        assert_relative_eq!(p, Vector2::new(1.0, 1.5), epsilon = 1e-6);

        let p = push_out(Vector2::new(1.0, -0.5), &wall, 1.5, 1.1).unwrap();
        assert_relative_eq!(p, Vector2::new(1.0, -1.5), epsilon = 1e-6);
    }

    #[test]
    fn test_push_out_soft_band_and_far() {
        let wall = WallSegment::new(Vector2::new(-5.0, 0.0), Vector2::new(5.0, 0.0)).unwrap();
        let p = push_out(Vector2::new(0.0, 2.0), &wall, 1.5, 1.1).unwrap();
        assert_relative_eq!(p, Vector2::new(0.0, 2.0), epsilon = 1e-6);
        assert!(push_out(Vector2::new(0.0, 3.0), &wall, 1.5, 1.1).is_none());
    }

    #[test]
    fn test_push_out_on_segment_uses_normal() {
        let wall = WallSegment::new(Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        let p = push_out(Vector2::zeros(), &wall, 1.5, 1.1).unwrap();
        assert_relative_eq!(p.norm(), 1.5, epsilon = 1e-6);
        assert_relative_eq!(p, wall.normal() * 1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_bump_weight() {
        let wall = WallSegment::new(Vector2::new(-5.0, 0.0), Vector2::new(5.0, 0.0)).unwrap();
        assert_eq!(bump_weight(Vector2::new(0.0, 1.0), &wall, 1.5, 1.0), 1.0);
        assert_relative_eq!(bump_weight(Vector2::new(0.0, 2.0), &wall, 1.5, 1.0), 0.5);
        assert_eq!(bump_weight(Vector2::new(0.0, 9.0), &wall, 1.5, 1.0), 0.0);
    }
}
