//! Affine RGBA matrix op and its shape-specialised renderers.
//!
//! A [`MatrixOp`] stores `out = M * in + offset` in double precision.
//! Rendering goes through [`MatrixRenderer`], which inspects the matrix once
//! and picks the cheapest kernel:
//!
//! | Shape                  | Renderer            |
//! |------------------------|---------------------|
//! | diagonal, no offset    | `Scale`             |
//! | diagonal, with offset  | `ScaleWithOffset`   |
//! | full, no offset        | `Matrix`            |
//! | full, with offset      | `MatrixWithOffset`  |
//!
//! # Example
//!
//! ```rust
//! use vfx_ops::matrix::{MatrixOp, MatrixRenderer};
//!
//! let op = MatrixOp::scale([2.0, 2.0, 2.0, 1.0]).with_offset([0.1, 0.1, 0.1, 0.0]);
//! let renderer = MatrixRenderer::compile(&op);
//! assert!(matches!(renderer, MatrixRenderer::ScaleWithOffset { .. }));
//!
//! let mut px = vec![0.5, 0.25, 0.0, 1.0];
//! renderer.apply(&mut px);
//! assert!((px[0] - 1.1).abs() < 1e-6);
//! ```

use tracing::trace;
use vfx_math::{simd, Mat4};

use crate::{OpsError, OpsResult};

/// Affine 4x4 matrix plus offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixOp {
    /// Row-major matrix.
    pub m: Mat4,
    /// Offset added after the multiply.
    pub offset: [f64; 4],
}

impl MatrixOp {
    /// Identity (no-op).
    pub fn identity() -> Self {
        Self { m: Mat4::IDENTITY, offset: [0.0; 4] }
    }

    /// Wraps a matrix with zero offset.
    pub fn new(m: Mat4) -> Self {
        Self { m, offset: [0.0; 4] }
    }

    /// Per-channel scale.
    pub fn scale(scale: [f64; 4]) -> Self {
        Self::new(Mat4::diagonal(scale))
    }

    /// Saturation about the given luma weights; alpha untouched.
    pub fn saturation(sat: f64, luma: [f64; 3]) -> Self {
        Self::new(Mat4::saturation(sat, luma))
    }

    /// Replaces the offset.
    pub fn with_offset(mut self, offset: [f64; 4]) -> Self {
        self.offset = offset;
        self
    }

    /// True if the op leaves every pixel unchanged.
    pub fn is_no_op(&self) -> bool {
        self.m.is_identity() && self.offset == [0.0; 4]
    }

    /// Inverse op: `M⁻¹` and `-M⁻¹ * offset`.
    pub fn inverse(&self) -> OpsResult<Self> {
        let inv = self
            .m
            .inverse()
            .ok_or_else(|| OpsError::NonInvertible("singular matrix".into()))?;
        let o = inv.transform(self.offset);
        Ok(Self { m: inv, offset: [-o[0], -o[1], -o[2], -o[3]] })
    }

    /// Single op equal to applying `self` then `next`.
    pub fn compose(&self, next: &MatrixOp) -> Self {
        let o = next.m.transform(self.offset);
        Self {
            m: next.m.mul_mat(&self.m),
            offset: [
                o[0] + next.offset[0],
                o[1] + next.offset[1],
                o[2] + next.offset[2],
                o[3] + next.offset[3],
            ],
        }
    }

    /// Applies the op to one pixel in double precision.
    pub fn apply_f64(&self, rgba: [f64; 4]) -> [f64; 4] {
        let v = self.m.transform(rgba);
        [
            v[0] + self.offset[0],
            v[1] + self.offset[1],
            v[2] + self.offset[2],
            v[3] + self.offset[3],
        ]
    }
}

impl Default for MatrixOp {
    fn default() -> Self {
        Self::identity()
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Kernel chosen for a [`MatrixOp`], with its parameters in single precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatrixRenderer {
    /// Diagonal matrix, zero offset.
    Scale {
        /// Per-channel gain.
        scale: [f32; 4],
    },
    /// Diagonal matrix with offset.
    ScaleWithOffset {
        /// Per-channel gain.
        scale: [f32; 4],
        /// Per-channel offset.
        offset: [f32; 4],
    },
    /// Full matrix, zero offset.
    Matrix {
        /// Matrix columns.
        cols: [[f32; 4]; 4],
    },
    /// Full matrix with offset.
    MatrixWithOffset {
        /// Matrix columns.
        cols: [[f32; 4]; 4],
        /// Per-channel offset.
        offset: [f32; 4],
    },
}

fn to_f32(v: [f64; 4]) -> [f32; 4] {
    [v[0] as f32, v[1] as f32, v[2] as f32, v[3] as f32]
}

impl MatrixRenderer {
    /// Picks the kernel for an op by shape analysis only.
    pub fn compile(op: &MatrixOp) -> Self {
        let has_offset = op.offset != [0.0; 4];
        let renderer = match (op.m.is_diagonal(), has_offset) {
            (true, false) => MatrixRenderer::Scale { scale: to_f32(op.m.diag()) },
            (true, true) => MatrixRenderer::ScaleWithOffset {
                scale: to_f32(op.m.diag()),
                offset: to_f32(op.offset),
            },
            (false, false) => MatrixRenderer::Matrix { cols: op.m.cols_f32() },
            (false, true) => MatrixRenderer::MatrixWithOffset {
                cols: op.m.cols_f32(),
                offset: to_f32(op.offset),
            },
        };
        trace!(renderer = renderer.name(), "Compiled matrix renderer");
        renderer
    }

    /// Kernel name, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            MatrixRenderer::Scale { .. } => "Scale",
            MatrixRenderer::ScaleWithOffset { .. } => "ScaleWithOffset",
            MatrixRenderer::Matrix { .. } => "Matrix",
            MatrixRenderer::MatrixWithOffset { .. } => "MatrixWithOffset",
        }
    }

    /// Renders interleaved RGBA in place. A trailing partial pixel is left alone.
    pub fn apply(&self, pixels: &mut [f32]) {
        match self {
            MatrixRenderer::Scale { scale } => simd::scale_rgba(pixels, *scale),
            MatrixRenderer::ScaleWithOffset { scale, offset } => {
                simd::scale_offset_rgba(pixels, *scale, *offset)
            }
            MatrixRenderer::Matrix { cols } => simd::matrix_rgba(pixels, cols),
            MatrixRenderer::MatrixWithOffset { cols, offset } => {
                simd::matrix_offset_rgba(pixels, cols, *offset)
            }
        }
    }
}
