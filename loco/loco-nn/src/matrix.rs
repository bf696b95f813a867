//! Row-major dense matrix of `f32`.
//!
//! [`DenseMatrix`] is the only numeric container the network uses. Column
//! vectors are `N x 1` matrices. Binary operators are exposed as `try_*`
//! methods that return [`NetworkError::DimensionMismatch`] on shape violations
//! instead of panicking.
//!
//! Besides the standard product, `try_mul` treats two `N x 1` operands of
//! equal length as an element-wise product. That case is checked first, so
//! it also covers `1 x 1` operands.

use std::ops::{Index, IndexMut, Mul};

use crate::{NetworkError, Result};

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DenseMatrix {
    /// Zero matrix of the given shape.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Zero column vector of length `n`.
    #[must_use]
    pub fn vector(n: usize) -> Self {
        Self::zeros(n, 1)
    }

    /// Matrix filled with `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Matrix from row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(NetworkError::dimension_mismatch(
                "from_vec",
                (rows, cols),
                (data.len(), 1),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Column vector from data.
    #[must_use]
    pub fn from_column(data: Vec<f32>) -> Self {
        Self {
            rows: data.len(),
            cols: 1,
            data,
        }
    }

    /// Matrix whose entry `(r, c)` is `f(r, c)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the matrix has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this is an `N x 1` column vector.
    #[must_use]
    pub fn is_vector(&self) -> bool {
        self.cols == 1
    }

    /// Row-major element slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable row-major element slice.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the matrix and return its row-major data.
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Element at `(row, col)`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Copy the contents of a matrix of identical shape.
    pub fn copy_from(&mut self, other: &Self) -> Result<()> {
        self.check_same_shape("copy_from", other)?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Whether every element is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    fn check_same_shape(&self, op: &'static str, other: &Self) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(NetworkError::dimension_mismatch(op, self.shape(), other.shape()))
        }
    }

    fn is_elementwise_pair(&self, other: &Self) -> bool {
        self.is_vector() && other.is_vector() && self.rows == other.rows
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Element-wise sum.
    pub fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.check_same_shape("add", rhs)?;
        Ok(self.zip_with(rhs, |a, b| a + b))
    }

    /// Element-wise difference.
    pub fn try_sub(&self, rhs: &Self) -> Result<Self> {
        self.check_same_shape("sub", rhs)?;
        Ok(self.zip_with(rhs, |a, b| a - b))
    }

    /// Matrix product, or element-wise product for two `N x 1` vectors.
    pub fn try_mul(&self, rhs: &Self) -> Result<Self> {
        if self.is_elementwise_pair(rhs) {
            return Ok(self.zip_with(rhs, |a, b| a * b));
        }
        if self.cols != rhs.rows {
            return Err(NetworkError::dimension_mismatch(
                "mul",
                self.shape(),
                rhs.shape(),
            ));
        }
        let mut out = Self::zeros(self.rows, rhs.cols);
        for r in 0..self.rows {
            let row = &self.data[r * self.cols..(r + 1) * self.cols];
            for (k, &a) in row.iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                let rhs_row = &rhs.data[k * rhs.cols..(k + 1) * rhs.cols];
                let out_row = &mut out.data[r * rhs.cols..(r + 1) * rhs.cols];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
        Ok(out)
    }

    /// Element-wise quotient of two equal-length `N x 1` vectors.
    pub fn try_div(&self, rhs: &Self) -> Result<Self> {
        if !self.is_elementwise_pair(rhs) {
            return Err(NetworkError::dimension_mismatch(
                "div",
                self.shape(),
                rhs.shape(),
            ));
        }
        Ok(self.zip_with(rhs, |a, b| a / b))
    }

    /// Product with a scalar.
    #[must_use]
    pub fn scale(&self, s: f32) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * s).collect(),
        }
    }

    /// In-place `self -= rhs`.
    pub fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.check_same_shape("sub", rhs)?;
        self.data.iter_mut().zip(&rhs.data).for_each(|(a, b)| *a -= b);
        Ok(())
    }

    /// In-place `self += rhs`.
    pub fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.check_same_shape("add", rhs)?;
        self.data.iter_mut().zip(&rhs.data).for_each(|(a, b)| *a += b);
        Ok(())
    }

    /// In-place element-wise product with an equal-length `N x 1` vector.
    pub fn try_mul_elementwise_assign(&mut self, rhs: &Self) -> Result<()> {
        if !self.is_elementwise_pair(rhs) {
            return Err(NetworkError::dimension_mismatch(
                "mul",
                self.shape(),
                rhs.shape(),
            ));
        }
        self.data.iter_mut().zip(&rhs.data).for_each(|(a, b)| *a *= b);
        Ok(())
    }

    /// In-place element-wise quotient by an equal-length `N x 1` vector.
    pub fn try_div_assign(&mut self, rhs: &Self) -> Result<()> {
        if !self.is_elementwise_pair(rhs) {
            return Err(NetworkError::dimension_mismatch(
                "div",
                self.shape(),
                rhs.shape(),
            ));
        }
        self.data.iter_mut().zip(&rhs.data).for_each(|(a, b)| *a /= b);
        Ok(())
    }

    /// Exponential linear unit, in place: `max(x, 0) + exp(min(x, 0)) - 1`.
    pub fn elu(&mut self) {
        for v in &mut self.data {
            *v = v.max(0.0) + v.min(0.0).exp() - 1.0;
        }
    }

    /// Write `self * x + bias` into `out` without allocating.
    ///
    /// `self` is `M x N`, `x` and `bias`/`out` are `N x 1` and `M x 1`.
    pub fn affine_into(&self, x: &Self, bias: &Self, out: &mut Self) -> Result<()> {
        if !x.is_vector() || self.cols != x.rows {
            return Err(NetworkError::dimension_mismatch(
                "affine",
                self.shape(),
                x.shape(),
            ));
        }
        if bias.shape() != (self.rows, 1) {
            return Err(NetworkError::dimension_mismatch(
                "affine bias",
                (self.rows, 1),
                bias.shape(),
            ));
        }
        out.check_same_shape("affine output", bias)?;

        for (r, o) in out.data.iter_mut().enumerate() {
            let row = &self.data[r * self.cols..(r + 1) * self.cols];
            let dot: f32 = row.iter().zip(&x.data).map(|(a, b)| a * b).sum();
            *o = dot + bias.data[r];
        }
        Ok(())
    }

    /// Linear blend `(1 - mu) * y0 + mu * y1`.
    pub fn linear(y0: &Self, y1: &Self, mu: f32) -> Result<Self> {
        let mut out = Self::zeros(y0.rows, y0.cols);
        out.set_linear(y0, y1, mu)?;
        Ok(out)
    }

    /// Catmull-Rom blend of four control values at `mu` between `y1` and `y2`.
    pub fn cubic(y0: &Self, y1: &Self, y2: &Self, y3: &Self, mu: f32) -> Result<Self> {
        let mut out = Self::zeros(y1.rows, y1.cols);
        out.set_cubic(y0, y1, y2, y3, mu)?;
        Ok(out)
    }

    /// In-place form of [`DenseMatrix::linear`].
    pub fn set_linear(&mut self, y0: &Self, y1: &Self, mu: f32) -> Result<()> {
        self.check_same_shape("linear", y0)?;
        self.check_same_shape("linear", y1)?;
        for ((o, &a), &b) in self.data.iter_mut().zip(&y0.data).zip(&y1.data) {
            *o = (1.0 - mu) * a + mu * b;
        }
        Ok(())
    }

    /// In-place form of [`DenseMatrix::cubic`].
    pub fn set_cubic(&mut self, y0: &Self, y1: &Self, y2: &Self, y3: &Self, mu: f32) -> Result<()> {
        for y in [y0, y1, y2, y3] {
            self.check_same_shape("cubic", y)?;
        }
        let mu2 = mu * mu;
        let mu3 = mu2 * mu;
        for (i, o) in self.data.iter_mut().enumerate() {
            let (p0, p1, p2, p3) = (y0.data[i], y1.data[i], y2.data[i], y3.data[i]);
            *o = (-0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3) * mu3
                + (p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3) * mu2
                + (-0.5 * p0 + 0.5 * p2) * mu
                + p1;
        }
        Ok(())
    }
}

impl Index<usize> for DenseMatrix {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.data[index]
    }
}

impl IndexMut<usize> for DenseMatrix {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.data[index]
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(col < self.cols, "column {col} out of range");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        assert!(col < self.cols, "column {col} out of range");
        &mut self.data[row * self.cols + col]
    }
}

impl Mul<f32> for &DenseMatrix {
    type Output = DenseMatrix;

    fn mul(self, rhs: f32) -> DenseMatrix {
        self.scale(rhs)
    }
}

impl Mul<f32> for DenseMatrix {
    type Output = DenseMatrix;

    fn mul(mut self, rhs: f32) -> DenseMatrix {
        self.data.iter_mut().for_each(|v| *v *= rhs);
        self
    }
}

impl Mul<&DenseMatrix> for f32 {
    type Output = DenseMatrix;

    fn mul(self, rhs: &DenseMatrix) -> DenseMatrix {
        rhs.scale(self)
    }
}

impl Mul<DenseMatrix> for f32 {
    type Output = DenseMatrix;

    fn mul(self, rhs: DenseMatrix) -> DenseMatrix {
        rhs * self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn m(rows: usize, cols: usize, data: &[f32]) -> DenseMatrix {
        DenseMatrix::from_vec(rows, cols, data.to_vec()).unwrap()
    }

    #[test]
    fn test_from_vec_checks_length() {
        let err = DenseMatrix::from_vec(2, 2, vec![1.0; 3]).unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_indexing_is_row_major() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a[(0, 2)], 3.0);
        assert_eq!(a[(1, 0)], 4.0);
        assert_eq!(a[4], 5.0);
        assert_eq!(a.get(2, 0), None);
        assert_eq!(a.get(1, 2), Some(6.0));
    }

    #[test]
    fn test_add_sub() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = m(2, 2, &[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(a.try_add(&b).unwrap().as_slice(), &[1.5, 2.5, 3.5, 4.5]);
        assert_eq!(a.try_sub(&b).unwrap().as_slice(), &[0.5, 1.5, 2.5, 3.5]);

        let c = DenseMatrix::vector(4);
        assert!(a.try_add(&c).unwrap_err().is_dimension_mismatch());
        assert!(a.try_sub(&c).is_err());
    }

    #[test]
    fn test_matrix_product() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = m(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = a.try_mul(&b).unwrap();
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);

        assert!(b.try_mul(&b).is_err());
    }

    #[test]
    fn test_vector_product_is_elementwise() {
        let a = DenseMatrix::from_column(vec![1.0, 2.0, 3.0]);
        let b = DenseMatrix::from_column(vec![4.0, 5.0, 6.0]);
        let c = a.try_mul(&b).unwrap();
        assert_eq!(c.shape(), (3, 1));
        assert_eq!(c.as_slice(), &[4.0, 10.0, 18.0]);

        let short = DenseMatrix::from_column(vec![1.0, 2.0]);
        assert!(a.try_mul(&short).is_err());
    }

    #[test]
    fn test_divide_vectors_only() {
        let a = DenseMatrix::from_column(vec![2.0, 9.0]);
        let b = DenseMatrix::from_column(vec![4.0, 3.0]);
        assert_eq!(a.try_div(&b).unwrap().as_slice(), &[0.5, 3.0]);

        let sq = m(2, 2, &[1.0; 4]);
        assert!(sq.try_div(&sq).unwrap_err().is_dimension_mismatch());
    }

    #[test]
    fn test_scalar_product_commutes() {
        let a = m(1, 3, &[1.0, -2.0, 3.0]);
        assert_eq!((&a * 2.0).as_slice(), &[2.0, -4.0, 6.0]);
        assert_eq!(&a * 2.0, 2.0 * &a);
        assert_eq!(a.clone() * 0.5, 0.5 * a);
    }

    #[test]
    fn test_elu() {
        let mut a = DenseMatrix::from_column(vec![-1.0, 0.0, 2.5]);
        a.elu();
        assert_relative_eq!(a[0], (-1.0f32).exp() - 1.0);
        assert_eq!(a[1], 0.0);
        assert_relative_eq!(a[2], 2.5);
    }

    #[test]
    fn test_affine_into() {
        let w = m(2, 3, &[1.0, 0.0, -1.0, 2.0, 1.0, 0.0]);
        let x = DenseMatrix::from_column(vec![1.0, 2.0, 3.0]);
        let b = DenseMatrix::from_column(vec![0.5, -0.5]);
        let mut out = DenseMatrix::vector(2);
        w.affine_into(&x, &b, &mut out).unwrap();
        assert_eq!(out.as_slice(), &[-1.5, 3.5]);

        let expected = w.try_mul(&x).unwrap().try_add(&b).unwrap();
        assert_eq!(out, expected);

        let mut wrong = DenseMatrix::vector(3);
        assert!(w.affine_into(&x, &b, &mut wrong).is_err());
    }

    #[test]
    fn test_linear_blend() {
        let a = DenseMatrix::from_column(vec![0.0, 10.0]);
        let b = DenseMatrix::from_column(vec![4.0, 20.0]);
        let c = DenseMatrix::linear(&a, &b, 0.25).unwrap();
        assert_relative_eq!(c[0], 1.0);
        assert_relative_eq!(c[1], 12.5);
    }

    #[test]
    fn test_cubic_interpolates_control_points() {
        let y0 = DenseMatrix::from_column(vec![0.0]);
        let y1 = DenseMatrix::from_column(vec![1.0]);
        let y2 = DenseMatrix::from_column(vec![3.0]);
        let y3 = DenseMatrix::from_column(vec![4.0]);

        let at0 = DenseMatrix::cubic(&y0, &y1, &y2, &y3, 0.0).unwrap();
        let at1 = DenseMatrix::cubic(&y0, &y1, &y2, &y3, 1.0).unwrap();
        assert_relative_eq!(at0[0], 1.0);
        assert_relative_eq!(at1[0], 3.0);

        // Collinear control points reproduce the line.
        let l0 = DenseMatrix::from_column(vec![0.0]);
        let l1 = DenseMatrix::from_column(vec![1.0]);
        let l2 = DenseMatrix::from_column(vec![2.0]);
        let l3 = DenseMatrix::from_column(vec![3.0]);
        let mid = DenseMatrix::cubic(&l0, &l1, &l2, &l3, 0.5).unwrap();
        assert_relative_eq!(mid[0], 1.5);
    }

    #[test]
    fn test_blend_shape_mismatch() {
        let a = DenseMatrix::vector(2);
        let b = DenseMatrix::vector(3);
        assert!(DenseMatrix::linear(&a, &b, 0.5).is_err());
        assert!(DenseMatrix::cubic(&a, &a, &a, &b, 0.5).is_err());
    }
}
