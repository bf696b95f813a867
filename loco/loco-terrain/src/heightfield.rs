//! Height field terrain.
//!
//! A height field is a regular grid of heights over the ground plane. With
//! +Y up, the grid spans X and Z:
//!
//! ```text
//!    Y (up)
//!    │
//!    │  ╱────╲
//!    │ ╱      ╲
//!    │╱        ╲
//!    └────────────→ X
//!   ╱
//!  ╱
//! ↙ Z
//! ```
//!
//! - Sample `(i, j)` sits at `origin + (i * cell_size, j * cell_size)`
//! - X spans `[origin.x, origin.x + (width - 1) * cell_size]`
//! - Z spans `[origin.y, origin.y + (depth - 1) * cell_size]`
//!
//! Point queries are O(1) bilinear lookups.

// Grid indices are small and bounds are checked before casting.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]

use nalgebra::{Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::TerrainError;

/// Grid of ground heights.
///
/// Heights are stored in row-major order (X varies fastest):
/// `heights[j * width + i]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeightField {
    heights: Vec<f32>,
    width: usize,
    depth: usize,
    cell_size: f32,
    /// World position of sample `(0, 0)` as `(x, z)`.
    origin: Vector2<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightField {
    /// Create a height field from row-major samples.
    ///
    /// The grid starts at the world origin; see [`with_origin`](Self::with_origin).
    ///
    /// # Errors
    ///
    /// Returns an error if the sample count does not match `width * depth`,
    /// the grid is smaller than 2x2, the cell size is not positive, or any
    /// sample is not finite.
    pub fn new(
        heights: Vec<f32>,
        width: usize,
        depth: usize,
        cell_size: f32,
    ) -> Result<Self, TerrainError> {
        if width < 2 || depth < 2 {
            return Err(TerrainError::TooSmall { width, depth });
        }
        if heights.len() != width * depth {
            return Err(TerrainError::DimensionMismatch {
                width,
                depth,
                expected: width * depth,
                actual: heights.len(),
            });
        }
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(TerrainError::InvalidCellSize(cell_size));
        }
        if heights.iter().any(|h| !h.is_finite()) {
            return Err(TerrainError::non_finite("heights"));
        }

        let (min_height, max_height) = heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &h| {
                (min.min(h), max.max(h))
            });

        Ok(Self {
            heights,
            width,
            depth,
            cell_size,
            origin: Vector2::zeros(),
            min_height,
            max_height,
        })
    }

    /// Create a flat height field at a given height.
    pub fn flat(
        width: usize,
        depth: usize,
        cell_size: f32,
        height: f32,
    ) -> Result<Self, TerrainError> {
        Self::new(vec![height; width * depth], width, depth, cell_size)
    }

    /// Create a height field from a function of grid-local `(x, z)`.
    pub fn from_fn<F>(
        width: usize,
        depth: usize,
        cell_size: f32,
        f: F,
    ) -> Result<Self, TerrainError>
    where
        F: Fn(f32, f32) -> f32,
    {
        let mut heights = Vec::with_capacity(width * depth);
        for j in 0..depth {
            for i in 0..width {
                heights.push(f(i as f32 * cell_size, j as f32 * cell_size));
            }
        }
        Self::new(heights, width, depth, cell_size)
    }

    /// Move the grid so that sample `(0, 0)` sits at world `(x, z)`.
    #[must_use]
    pub fn with_origin(mut self, x: f32, z: f32) -> Self {
        self.origin = Vector2::new(x, z);
        self
    }

    /// Number of samples along X.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along Z.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Spacing between samples.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World `(x, z)` of sample `(0, 0)`.
    #[must_use]
    pub fn origin(&self) -> Vector2<f32> {
        self.origin
    }

    /// Extent along X.
    #[must_use]
    pub fn extent_x(&self) -> f32 {
        (self.width - 1) as f32 * self.cell_size
    }

    /// Extent along Z.
    #[must_use]
    pub fn extent_z(&self) -> f32 {
        (self.depth - 1) as f32 * self.cell_size
    }

    /// Lowest sample.
    #[must_use]
    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Highest sample.
    #[must_use]
    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Height of grid sample `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        (i < self.width && j < self.depth).then(|| self.heights[j * self.width + i])
    }

    /// Whether world `(x, z)` lies over the grid.
    #[must_use]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let lx = x - self.origin.x;
        let lz = z - self.origin.y;
        (0.0..=self.extent_x()).contains(&lx) && (0.0..=self.extent_z()).contains(&lz)
    }

    /// Bilinearly interpolated height at world `(x, z)`.
    ///
    /// Returns `None` outside the grid.
    #[must_use]
    pub fn sample(&self, x: f32, z: f32) -> Option<f32> {
        if !self.contains(x, z) {
            return None;
        }

        let gx = (x - self.origin.x) / self.cell_size;
        let gz = (z - self.origin.y) / self.cell_size;

        let i0 = (gx.floor() as usize).min(self.width - 1);
        let j0 = (gz.floor() as usize).min(self.depth - 1);
        let i1 = (i0 + 1).min(self.width - 1);
        let j1 = (j0 + 1).min(self.depth - 1);

        let fx = gx - i0 as f32;
        let fz = gz - j0 as f32;

        let h00 = self.heights[j0 * self.width + i0];
        let h10 = self.heights[j0 * self.width + i1];
        let h01 = self.heights[j1 * self.width + i0];
        let h11 = self.heights[j1 * self.width + i1];

        let h0 = h00 + fx * (h10 - h00);
        let h1 = h01 + fx * (h11 - h01);
        Some(h0 + fz * (h1 - h0))
    }

    /// Height at world `(x, z)`, clamping the query onto the grid.
    #[must_use]
    pub fn sample_clamped(&self, x: f32, z: f32) -> f32 {
        let (x, z) = self.clamp_to_grid(x, z);
        self.sample(x, z).unwrap_or(self.min_height)
    }

    /// Surface normal at world `(x, z)` from finite differences.
    ///
    /// Returns `None` outside the grid.
    #[must_use]
    pub fn normal(&self, x: f32, z: f32) -> Option<Vector3<f32>> {
        let eps = self.cell_size * 0.1;

        let hc = self.sample(x, z)?;
        let hx = self.sample_clamped(x + eps, z);
        let hz = self.sample_clamped(x, z + eps);

        let dx = (hx - hc) / eps;
        let dz = (hz - hc) / eps;

        Some(Vector3::new(-dx, 1.0, -dz).normalize())
    }

    /// Surface normal, clamping the query onto the grid.
    #[must_use]
    pub fn normal_clamped(&self, x: f32, z: f32) -> Vector3<f32> {
        let (x, z) = self.clamp_to_grid(x, z);
        self.normal(x, z).unwrap_or_else(Vector3::y)
    }

    /// World-space bounding box as `(min, max)`.
    #[must_use]
    pub fn aabb(&self) -> (Vector3<f32>, Vector3<f32>) {
        (
            Vector3::new(self.origin.x, self.min_height, self.origin.y),
            Vector3::new(
                self.origin.x + self.extent_x(),
                self.max_height,
                self.origin.y + self.extent_z(),
            ),
        )
    }

    fn clamp_to_grid(&self, x: f32, z: f32) -> (f32, f32) {
        (
            x.clamp(self.origin.x, self.origin.x + self.extent_x()),
            z.clamp(self.origin.y, self.origin.y + self.extent_z()),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_validates() {
        assert!(matches!(
            HeightField::new(vec![0.0; 5], 3, 2, 1.0),
            Err(TerrainError::DimensionMismatch { expected: 6, .. })
        ));
        assert!(matches!(
            HeightField::new(vec![0.0; 3], 3, 1, 1.0),
            Err(TerrainError::TooSmall { .. })
        ));
        assert!(matches!(
            HeightField::new(vec![0.0; 4], 2, 2, 0.0),
            Err(TerrainError::InvalidCellSize(_))
        ));
        assert!(matches!(
            HeightField::new(vec![0.0, f32::NAN, 0.0, 0.0], 2, 2, 1.0),
            Err(TerrainError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_flat_sample() {
        let hf = HeightField::flat(10, 10, 1.0, 2.5).unwrap();
        assert_relative_eq!(hf.sample(3.3, 4.7).unwrap(), 2.5);
        assert_eq!(hf.min_height(), 2.5);
        assert_eq!(hf.max_height(), 2.5);
        assert_relative_eq!(hf.extent_x(), 9.0);
    }

    #[test]
    fn test_bilinear_interpolation() {
        // Corners: (0,0)=0 (1,0)=1 (0,1)=2 (1,1)=3
        let hf = HeightField::new(vec![0.0, 1.0, 2.0, 3.0], 2, 2, 1.0).unwrap();
        assert_relative_eq!(hf.sample(0.0, 0.0).unwrap(), 0.0);
        assert_relative_eq!(hf.sample(1.0, 0.0).unwrap(), 1.0);
        assert_relative_eq!(hf.sample(0.0, 1.0).unwrap(), 2.0);
        assert_relative_eq!(hf.sample(1.0, 1.0).unwrap(), 3.0);
        assert_relative_eq!(hf.sample(0.5, 0.5).unwrap(), 1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_bounds() {
        let hf = HeightField::flat(5, 5, 1.0, 0.0).unwrap();
        assert!(hf.sample(-0.1, 1.0).is_none());
        assert!(hf.sample(1.0, 4.1).is_none());
        assert_eq!(hf.sample_clamped(-10.0, 2.0), 0.0);
    }

    #[test]
    fn test_origin_offset() {
        let hf = HeightField::from_fn(11, 11, 1.0, |x, _| x)
            .unwrap()
            .with_origin(-5.0, -5.0);
        assert!(hf.contains(0.0, 0.0));
        assert!(!hf.contains(5.5, 0.0));
        assert_relative_eq!(hf.sample(0.0, 0.0).unwrap(), 5.0, epsilon = 1e-5);
        assert_relative_eq!(hf.sample(-5.0, 3.0).unwrap(), 0.0, epsilon = 1e-5);

        let (min, max) = hf.aabb();
        assert_relative_eq!(min.x, -5.0);
        assert_relative_eq!(max.z, 5.0);
        assert_relative_eq!(max.y, 10.0);
    }

    #[test]
    fn test_normal_flat_is_up() {
        let hf = HeightField::flat(10, 10, 0.5, 1.0).unwrap();
        let n = hf.normal(2.0, 2.0).unwrap();
        assert_relative_eq!(n, Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_normal_slope() {
        // Rises along X with slope 1.
        let hf = HeightField::from_fn(10, 10, 1.0, |x, _| x).unwrap();
        let n = hf.normal(4.5, 4.5).unwrap();
        let expected = Vector3::new(-1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(n, expected, epsilon = 1e-4);
        assert!(hf.normal_clamped(100.0, 100.0).y > 0.0);
    }

    #[test]
    fn test_get() {
        let hf = HeightField::from_fn(3, 3, 1.0, |x, z| x + 10.0 * z).unwrap();
        assert_eq!(hf.get(2, 1), Some(12.0));
        assert_eq!(hf.get(3, 0), None);
    }
}
