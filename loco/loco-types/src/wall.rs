//! Wall segments on the ground plane.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LocoError, Result};

/// A 2D wall segment in scene space.
///
/// Coordinates are the scene-space `(x, z)` of the segment endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallSegment {
    /// First endpoint.
    pub start: Vector2<f32>,
    /// Second endpoint.
    pub end: Vector2<f32>,
}

impl WallSegment {
    /// Create a wall segment, rejecting zero-length or non-finite segments.
    pub fn new(start: Vector2<f32>, end: Vector2<f32>) -> Result<Self> {
        let wall = Self { start, end };
        wall.validate()?;
        Ok(wall)
    }

    /// Create a wall segment without validation.
    ///
    /// Degenerate segments are still safe to query: [`nearest_point`]
    /// short-circuits to `start`.
    ///
    /// [`nearest_point`]: Self::nearest_point
    #[must_use]
    pub const fn new_unchecked(start: Vector2<f32>, end: Vector2<f32>) -> Self {
        Self { start, end }
    }

    /// Check that the segment has finite endpoints and non-zero length.
    pub fn validate(&self) -> Result<()> {
        if !self.start.iter().chain(self.end.iter()).all(|v| v.is_finite()) {
            return Err(LocoError::invalid_config(
                "wall segment endpoints must be finite",
            ));
        }
        if self.is_degenerate() {
            return Err(LocoError::DegenerateWallSegment {
                x: self.start.x,
                z: self.start.y,
            });
        }
        Ok(())
    }

    /// Whether both endpoints coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        (self.end - self.start).norm_squared() == 0.0
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f32 {
        (self.end - self.start).norm()
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Vector2<f32> {
        (self.start + self.end) * 0.5
    }

    /// Nearest point on the segment to `p`.
    #[must_use]
    pub fn nearest_point(&self, p: Vector2<f32>) -> Vector2<f32> {
        let along = self.end - self.start;
        let len_sq = along.norm_squared();
        if len_sq == 0.0 {
            return self.start;
        }
        let t = ((p - self.start).dot(&along) / len_sq).clamp(0.0, 1.0);
        self.start + along * t
    }

    /// Distance from `p` to the segment.
    #[must_use]
    pub fn distance(&self, p: Vector2<f32>) -> f32 {
        (p - self.nearest_point(p)).norm()
    }

    /// Unit normal of the segment, rotated 90 degrees from `start -> end`.
    ///
    /// Falls back to +X for a degenerate segment.
    #[must_use]
    pub fn normal(&self) -> Vector2<f32> {
        let along = self.end - self.start;
        let n = Vector2::new(-along.y, along.x);
        let len = n.norm();
        if len > 0.0 { n / len } else { Vector2::x() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall() -> WallSegment {
        WallSegment::new(Vector2::new(0.0, 0.0), Vector2::new(4.0, 0.0)).unwrap()
    }

    #[test]
    fn test_nearest_point_interior() {
        let p = wall().nearest_point(Vector2::new(1.5, 3.0));
        assert_relative_eq!(p, Vector2::new(1.5, 0.0));
    }

    #[test]
    fn test_nearest_point_clamps_to_endpoints() {
        let w = wall();
        assert_eq!(w.nearest_point(Vector2::new(-2.0, 1.0)), w.start);
        assert_eq!(w.nearest_point(Vector2::new(9.0, -1.0)), w.end);
    }

    #[test]
    fn test_distance() {
        assert_relative_eq!(wall().distance(Vector2::new(2.0, -3.0)), 3.0);
        assert_relative_eq!(wall().distance(Vector2::new(7.0, 4.0)), 5.0);
    }

    #[test]
    fn test_degenerate_segment_rejected() {
        let p = Vector2::new(1.0, 2.0);
        let err = WallSegment::new(p, p).unwrap_err();
        assert!(matches!(err, LocoError::DegenerateWallSegment { .. }));
    }

    #[test]
    fn test_degenerate_segment_short_circuits() {
        let p = Vector2::new(1.0, 2.0);
        let w = WallSegment::new_unchecked(p, p);
        assert_eq!(w.nearest_point(Vector2::new(5.0, 5.0)), p);
        assert_eq!(w.normal(), Vector2::x());
    }

    #[test]
    fn test_non_finite_rejected() {
        let err =
            WallSegment::new(Vector2::new(f32::INFINITY, 0.0), Vector2::new(1.0, 0.0)).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_normal_is_unit() {
        let n = WallSegment::new(Vector2::new(0.0, 0.0), Vector2::new(3.0, 3.0))
            .unwrap()
            .normal();
        assert_relative_eq!(n.norm(), 1.0);
        assert_relative_eq!(n.dot(&Vector2::new(1.0, 1.0)), 0.0);
        assert_relative_eq!(wall().midpoint(), Vector2::new(2.0, 0.0));
    }
}
