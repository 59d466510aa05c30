//! # vfx-math
//!
//! Math primitives for VFX color processing.
//!
//! - [`Mat4`] - 4x4 affine matrices for RGBA color operations
//! - [`simd`] - `f32x4` kernels over interleaved RGBA buffers
//!
//! # Design
//!
//! Matrices are stored in double precision, **row-major**, and act on
//! **column vectors**:
//!
//! ```text
//! result = matrix * rgba
//! ```
//!
//! Pixel kernels run in single precision; [`Mat4::cols_f32`] produces the
//! column layout they expect.
//!
//! # Usage
//!
//! ```rust
//! use vfx_math::{Mat4, simd};
//!
//! let sat = Mat4::saturation(0.0, [0.2126, 0.7152, 0.0722]);
//! let mut pixels = vec![1.0, 0.0, 0.0, 1.0];
//! simd::matrix_rgba(&mut pixels, &sat.cols_f32());
//! assert!((pixels[1] - 0.2126).abs() < 1e-6);
//! ```
//!
//! # Dependencies
//!
//! - [`glam`] - Matrix inversion
//! - [`wide`] - Portable SIMD
//!
//! # Used By
//!
//! - `vfx-ops` - Matrix renderers and CDL kernels
//! - `vfx-lut` - Range to Matrix conversion

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod mat4;
pub mod simd;

pub use mat4::*;
