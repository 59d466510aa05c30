//! 4x4 affine matrix for RGBA color operations.
//!
//! [`Mat4`] carries the double-precision matrix part of an affine RGBA
//! transform. The offset lives next to it in the op that owns the matrix.
//!
//! # Convention
//!
//! Elements are stored in **row-major** order and act on **column vectors**:
//!
//! ```text
//! | m0  m1  m2  m3  |   | r |
//! | m4  m5  m6  m7  | * | g |
//! | m8  m9  m10 m11 |   | b |
//! | m12 m13 m14 m15 |   | a |
//! ```
//!
//! # Usage
//!
//! ```rust
//! use vfx_math::Mat4;
//!
//! let m = Mat4::diagonal([2.0, 2.0, 2.0, 1.0]);
//! assert_eq!(m.transform([0.5, 0.25, 1.0, 1.0]), [1.0, 0.5, 2.0, 1.0]);
//! assert!(m.is_diagonal());
//! ```

use std::ops::{Index, Mul};

/// Determinant magnitude below which a matrix is treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A row-major 4x4 matrix of `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    /// Elements in row-major order.
    pub m: [f64; 16],
}

impl Mat4 {
    /// Zero matrix.
    pub const ZERO: Self = Self { m: [0.0; 16] };

    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Creates a matrix from 16 row-major values.
    #[inline]
    pub const fn from_row_major(m: [f64; 16]) -> Self {
        Self { m }
    }

    /// Creates a matrix from row arrays.
    pub const fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self {
            m: [
                rows[0][0], rows[0][1], rows[0][2], rows[0][3],
                rows[1][0], rows[1][1], rows[1][2], rows[1][3],
                rows[2][0], rows[2][1], rows[2][2], rows[2][3],
                rows[3][0], rows[3][1], rows[3][2], rows[3][3],
            ],
        }
    }

    /// Creates a diagonal (per-channel scale) matrix.
    #[inline]
    pub const fn diagonal(d: [f64; 4]) -> Self {
        Self {
            m: [
                d[0], 0.0, 0.0, 0.0,
                0.0, d[1], 0.0, 0.0,
                0.0, 0.0, d[2], 0.0,
                0.0, 0.0, 0.0, d[3],
            ],
        }
    }

    /// Builds the saturation matrix for the given luma weights.
    ///
    /// Each RGB row is `(1 - sat) * luma + sat * e_i`; alpha is untouched.
    ///
    /// ```rust
    /// use vfx_math::Mat4;
    ///
    /// let m = Mat4::saturation(1.0, [0.2126, 0.7152, 0.0722]);
    /// assert!(m.is_identity());
    /// ```
    pub fn saturation(sat: f64, luma: [f64; 3]) -> Self {
        let k = 1.0 - sat;
        let (l0, l1, l2) = (k * luma[0], k * luma[1], k * luma[2]);
        Self {
            m: [
                l0 + sat, l1, l2, 0.0,
                l0, l1 + sat, l2, 0.0,
                l0, l1, l2 + sat, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[row * 4 + col]
    }

    /// Returns row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> [f64; 4] {
        [self.m[i * 4], self.m[i * 4 + 1], self.m[i * 4 + 2], self.m[i * 4 + 3]]
    }

    /// Returns column `i`.
    #[inline]
    pub fn col(&self, i: usize) -> [f64; 4] {
        [self.m[i], self.m[4 + i], self.m[8 + i], self.m[12 + i]]
    }

    /// The diagonal elements.
    #[inline]
    pub fn diag(&self) -> [f64; 4] {
        [self.m[0], self.m[5], self.m[10], self.m[15]]
    }

    /// True when every element equals the identity exactly.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when all off-diagonal elements are exactly zero.
    pub fn is_diagonal(&self) -> bool {
        (0..16).all(|i| i % 5 == 0 || self.m[i] == 0.0)
    }

    /// Returns the transpose.
    pub fn transpose(&self) -> Self {
        let mut out = [0.0; 16];
        for r in 0..4 {
            for c in 0..4 {
                out[c * 4 + r] = self.m[r * 4 + c];
            }
        }
        Self { m: out }
    }

    /// Converts to a column-major glam matrix.
    #[inline]
    pub fn to_glam(&self) -> glam::DMat4 {
        // Row-major storage read as columns is the transpose.
        glam::DMat4::from_cols_array(&self.m).transpose()
    }

    /// Converts from a column-major glam matrix.
    #[inline]
    pub fn from_glam(m: glam::DMat4) -> Self {
        Self { m: m.transpose().to_cols_array() }
    }

    /// Computes the determinant.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.to_glam().determinant()
    }

    /// Computes the inverse.
    ///
    /// Returns `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        if self.is_diagonal() {
            let d = self.diag();
            if d.iter().any(|v| v.abs() < SINGULAR_EPSILON) {
                return None;
            }
            return Some(Self::diagonal([1.0 / d[0], 1.0 / d[1], 1.0 / d[2], 1.0 / d[3]]));
        }
        let g = self.to_glam();
        if g.determinant().abs() < SINGULAR_EPSILON {
            return None;
        }
        Some(Self::from_glam(g.inverse()))
    }

    /// Matrix product `self * other` (apply `other` first).
    pub fn mul_mat(&self, other: &Self) -> Self {
        let mut out = [0.0; 16];
        for r in 0..4 {
            for c in 0..4 {
                out[r * 4 + c] = (0..4).map(|k| self.m[r * 4 + k] * other.m[k * 4 + c]).sum();
            }
        }
        Self { m: out }
    }

    /// Transforms an RGBA vector.
    #[inline]
    pub fn transform(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (r, o) in out.iter_mut().enumerate() {
            *o = self.m[r * 4] * v[0]
                + self.m[r * 4 + 1] * v[1]
                + self.m[r * 4 + 2] * v[2]
                + self.m[r * 4 + 3] * v[3];
        }
        out
    }

    /// Columns converted to `f32`, ready for the column-broadcast kernels.
    pub fn cols_f32(&self) -> [[f32; 4]; 4] {
        let mut cols = [[0.0f32; 4]; 4];
        for (i, col) in cols.iter_mut().enumerate() {
            let c = self.col(i);
            *col = [c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32];
        }
        cols
    }

    /// True when all elements are finite.
    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_mat(&rhs)
    }
}

impl Index<usize> for Mat4 {
    type Output = f64;

    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.m[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LUMA: [f64; 3] = [0.2126, 0.7152, 0.0722];

    #[test]
    fn identity_and_diagonal() {
        assert!(Mat4::IDENTITY.is_identity());
        assert!(Mat4::IDENTITY.is_diagonal());
        assert!(Mat4::diagonal([2.0, 3.0, 4.0, 1.0]).is_diagonal());
        assert!(!Mat4::saturation(0.5, LUMA).is_diagonal());
    }

    #[test]
    fn saturation_layout() {
        let m = Mat4::saturation(0.0, LUMA);
        for r in 0..3 {
            assert_relative_eq!(m.get(r, 0), LUMA[0]);
            assert_relative_eq!(m.get(r, 1), LUMA[1]);
            assert_relative_eq!(m.get(r, 2), LUMA[2]);
        }
        assert_eq!(m.row(3), [0.0, 0.0, 0.0, 1.0]);

        let m = Mat4::saturation(1.7, LUMA);
        assert_relative_eq!(m[0], (1.0 - 1.7) * LUMA[0] + 1.7);
        assert_relative_eq!(m[1], (1.0 - 1.7) * LUMA[1]);
        assert_relative_eq!(m[6], (1.0 - 1.7) * LUMA[2]);
    }

    #[test]
    fn transform_rows() {
        let m = Mat4::from_rows([
            [1.0, 2.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(m.transform([1.0, 1.0, 1.0, 1.0]), [3.0, 1.0, 4.0, 1.0]);
        assert_eq!(m.col(3), [0.0, 0.0, 3.0, 1.0]);
    }

    #[test]
    fn inverse_roundtrip() {
        let m = Mat4::saturation(1.3, LUMA);
        let inv = m.inverse().unwrap();
        let id = m * inv;
        for i in 0..16 {
            assert_relative_eq!(id.m[i], Mat4::IDENTITY.m[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn inverse_diagonal() {
        let inv = Mat4::diagonal([2.0, 4.0, 0.5, 1.0]).inverse().unwrap();
        assert_eq!(inv.diag(), [0.5, 0.25, 2.0, 1.0]);
    }

    #[test]
    fn singular() {
        assert!(Mat4::saturation(0.0, LUMA).inverse().is_none());
        assert!(Mat4::diagonal([1.0, 0.0, 1.0, 1.0]).inverse().is_none());
    }

    #[test]
    fn glam_roundtrip() {
        let m = Mat4::from_row_major([
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        ]);
        assert_eq!(Mat4::from_glam(m.to_glam()), m);
        // glam applies column vectors like we do
        let v = m.to_glam() * glam::DVec4::new(1.0, 0.0, 0.0, 0.0);
        assert_eq!([v.x, v.y, v.z, v.w], m.col(0));
    }

    #[test]
    fn mul_order() {
        let scale = Mat4::diagonal([2.0, 2.0, 2.0, 1.0]);
        let sat = Mat4::saturation(0.0, LUMA);
        // sat * scale: scale first, then desaturate
        let both = sat * scale;
        let v = both.transform([1.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(v[0], 2.0 * LUMA[0]);
        assert_relative_eq!(v[1], 2.0 * LUMA[0]);
    }
}
