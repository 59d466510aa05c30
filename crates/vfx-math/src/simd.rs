//! SIMD kernels for interleaved RGBA pixels.
//!
//! All kernels use the `wide` crate for portable SIMD on stable Rust and
//! treat one pixel as one `f32x4` lane group. Buffers must hold whole
//! pixels; a trailing partial pixel is left untouched.
//!
//! The full-matrix kernels compute
//!
//! ```text
//! out = col0 * splat(r) + col1 * splat(g) + col2 * splat(b) + col3 * splat(a)
//! ```
//!
//! which needs no horizontal adds and keeps every lane busy.
//!
//! # Example
//!
//! ```rust
//! use vfx_math::simd::scale_rgba;
//!
//! let mut px = [0.5, 0.25, 1.0, 1.0];
//! scale_rgba(&mut px, [2.0, 2.0, 2.0, 1.0]);
//! assert_eq!(px, [1.0, 0.5, 2.0, 1.0]);
//! ```

use wide::f32x4;

#[inline]
fn load(px: &[f32]) -> f32x4 {
    f32x4::from([px[0], px[1], px[2], px[3]])
}

#[inline]
fn store(px: &mut [f32], v: f32x4) {
    px.copy_from_slice(&v.to_array());
}

/// Per-lane multiply-add: `out = v * scale + offset`.
#[inline]
pub fn mul_add_x4(v: [f32; 4], scale: [f32; 4], offset: [f32; 4]) -> [f32; 4] {
    (f32x4::from(v) * f32x4::from(scale) + f32x4::from(offset)).to_array()
}

/// Clamps 4 values to [0, 1].
///
/// ```rust
/// use vfx_math::simd::clamp01_x4;
///
/// assert_eq!(clamp01_x4([-0.1, 0.5, 1.2, 0.8]), [0.0, 0.5, 1.0, 0.8]);
/// ```
#[inline]
pub fn clamp01_x4(v: [f32; 4]) -> [f32; 4] {
    f32x4::from(v)
        .max(f32x4::splat(0.0))
        .min(f32x4::splat(1.0))
        .to_array()
}

/// Dot product of 4-element vectors.
#[inline]
pub fn dot_x4(a: [f32; 4], b: [f32; 4]) -> f32 {
    (f32x4::from(a) * f32x4::from(b)).reduce_add()
}

/// Moves RGB toward or away from its luma: `gray + sat * (v - gray)`.
///
/// `luma` holds the RGB weights with a zero alpha weight; alpha is kept.
#[inline]
pub fn saturate_x4(v: [f32; 4], luma: [f32; 4], sat: f32) -> [f32; 4] {
    let gray = dot_x4(v, luma);
    let g = f32x4::splat(gray);
    let mut out = (g + f32x4::splat(sat) * (f32x4::from(v) - g)).to_array();
    out[3] = v[3];
    out
}

/// Scales every pixel per channel.
pub fn scale_rgba(pixels: &mut [f32], scale: [f32; 4]) {
    let s = f32x4::from(scale);
    for px in pixels.chunks_exact_mut(4) {
        let v = load(px);
        store(px, v * s);
    }
}

/// Scales every pixel per channel and adds an offset.
pub fn scale_offset_rgba(pixels: &mut [f32], scale: [f32; 4], offset: [f32; 4]) {
    let s = f32x4::from(scale);
    let o = f32x4::from(offset);
    for px in pixels.chunks_exact_mut(4) {
        let v = load(px);
        store(px, v * s + o);
    }
}

/// Multiplies every pixel by a 4x4 matrix given as columns.
pub fn matrix_rgba(pixels: &mut [f32], cols: &[[f32; 4]; 4]) {
    let c0 = f32x4::from(cols[0]);
    let c1 = f32x4::from(cols[1]);
    let c2 = f32x4::from(cols[2]);
    let c3 = f32x4::from(cols[3]);
    for px in pixels.chunks_exact_mut(4) {
        let out = c0 * f32x4::splat(px[0])
            + c1 * f32x4::splat(px[1])
            + c2 * f32x4::splat(px[2])
            + c3 * f32x4::splat(px[3]);
        store(px, out);
    }
}

/// Multiplies every pixel by a 4x4 matrix given as columns, then adds an offset.
pub fn matrix_offset_rgba(pixels: &mut [f32], cols: &[[f32; 4]; 4], offset: [f32; 4]) {
    let c0 = f32x4::from(cols[0]);
    let c1 = f32x4::from(cols[1]);
    let c2 = f32x4::from(cols[2]);
    let c3 = f32x4::from(cols[3]);
    let o = f32x4::from(offset);
    for px in pixels.chunks_exact_mut(4) {
        let out = c0 * f32x4::splat(px[0])
            + c1 * f32x4::splat(px[1])
            + c2 * f32x4::splat(px[2])
            + c3 * f32x4::splat(px[3])
            + o;
        store(px, out);
    }
}
