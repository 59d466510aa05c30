//! Range op: clamp, optionally with a linear remap.
//!
//! With both input and output bounds the op maps `[min_in, max_in]` onto
//! `[min_out, max_out]` and clamps to the output bounds. With output bounds
//! only it is a plain clamp. ASC-style CDLs that reduce to an identity
//! compile to `Range::clamp(0.0, 1.0)`.
//!
//! # Example
//!
//! ```rust
//! use vfx_ops::range::Range;
//!
//! let range = Range::clamp(0.0, 1.0);
//! let mut pixel = [1.5, -0.2, 0.5, 2.0];
//! range.apply_rgba(&mut pixel);
//! assert_eq!(pixel, [1.0, 0.0, 0.5, 2.0]);
//! ```

use vfx_lut::RangeParams;

use crate::matrix::MatrixOp;
use crate::OpsResult;

/// Clamp/remap bounds. `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Input value mapped to `min_out`.
    pub min_in: Option<f64>,
    /// Input value mapped to `max_out`.
    pub max_in: Option<f64>,
    /// Output floor.
    pub min_out: Option<f64>,
    /// Output ceiling.
    pub max_out: Option<f64>,
}

impl Range {
    const fn bounds(
        min_in: Option<f64>,
        max_in: Option<f64>,
        min_out: Option<f64>,
        max_out: Option<f64>,
    ) -> Self {
        Self { min_in, max_in, min_out, max_out }
    }

    /// Remaps `[min_in, max_in]` to `[min_out, max_out]`, clamped.
    pub const fn new(min_in: f64, max_in: f64, min_out: f64, max_out: f64) -> Self {
        Self::bounds(Some(min_in), Some(max_in), Some(min_out), Some(max_out))
    }

    /// Clamps to `[min, max]`.
    pub const fn clamp(min: f64, max: f64) -> Self {
        Self::bounds(None, None, Some(min), Some(max))
    }

    /// Clamps below `min` only.
    pub const fn clamp_min(min: f64) -> Self {
        Self::bounds(None, None, Some(min), None)
    }

    /// Clamps above `max` only.
    pub const fn clamp_max(max: f64) -> Self {
        Self::bounds(None, None, None, Some(max))
    }

    /// Builds from ProcessList Range bounds.
    ///
    /// Output-only bounds become a plain clamp, one-sided when only one is set.
    pub fn from_params(params: &RangeParams) -> Self {
        match (params.min_in, params.max_in, params.min_out, params.max_out) {
            (None, None, Some(min), Some(max)) => Self::clamp(min, max),
            (None, None, Some(min), None) => Self::clamp_min(min),
            (None, None, None, Some(max)) => Self::clamp_max(max),
            (min_in, max_in, min_out, max_out) => Self::bounds(min_in, max_in, min_out, max_out),
        }
    }

    /// Converts to ProcessList Range bounds (clamping style).
    pub fn to_params(&self) -> RangeParams {
        RangeParams {
            min_in: self.min_in,
            max_in: self.max_in,
            min_out: self.min_out,
            max_out: self.max_out,
            clamp: true,
        }
    }

    /// Remap gain; 1 unless all four bounds are set and the input span is non-zero.
    pub fn scale(&self) -> f64 {
        let (Some(min_in), Some(max_in), Some(min_out), Some(max_out)) =
            (self.min_in, self.max_in, self.min_out, self.max_out)
        else {
            return 1.0;
        };
        let span = max_in - min_in;
        if span.abs() < 1e-12 { 1.0 } else { (max_out - min_out) / span }
    }

    /// Remap offset, applied after [`Range::scale`].
    pub fn offset(&self) -> f64 {
        match (self.min_in, self.min_out, self.max_in, self.max_out) {
            (Some(min_in), Some(min_out), _, _) => min_out - min_in * self.scale(),
            (None, None, Some(max_in), Some(max_out)) => max_out - max_in * self.scale(),
            _ => 0.0,
        }
    }

    /// True if values are remapped, not only clamped.
    pub fn scales(&self) -> bool {
        (self.scale() - 1.0).abs() > 1e-9 || self.offset().abs() > 1e-9
    }

    /// Output floor, `-inf` when open.
    pub fn lower_bound(&self) -> f64 {
        self.min_out.unwrap_or(f64::NEG_INFINITY)
    }

    /// Output ceiling, `+inf` when open.
    pub fn upper_bound(&self) -> f64 {
        self.max_out.unwrap_or(f64::INFINITY)
    }

    /// True when the range neither clamps nor scales.
    pub fn is_no_op(&self) -> bool {
        self.min_out.is_none() && self.max_out.is_none() && !self.scales()
    }

    /// Swaps input and output bounds.
    pub fn inverse(&self) -> Self {
        Self::bounds(self.min_out, self.max_out, self.min_in, self.max_in)
    }

    /// Unclamped equivalent as a matrix; needs all four bounds.
    pub fn to_matrix(&self) -> OpsResult<MatrixOp> {
        let params = RangeParams { clamp: false, ..self.to_params() };
        let (m, offset) = params.to_matrix()?;
        Ok(MatrixOp { m, offset })
    }

    /// Applies the range to RGB of an interleaved RGBA buffer.
    pub fn apply_rgba(&self, pixels: &mut [f32]) {
        let scale = self.scale() as f32;
        let offset = self.offset() as f32;
        let lower = self.lower_bound() as f32;
        let upper = self.upper_bound() as f32;

        if self.scales() {
            for chunk in pixels.chunks_exact_mut(4) {
                for c in &mut chunk[..3] {
                    *c = clamp_nan(*c * scale + offset, lower, upper);
                }
            }
        } else {
            for chunk in pixels.chunks_exact_mut(4) {
                for c in &mut chunk[..3] {
                    *c = clamp_nan(*c, lower, upper);
                }
            }
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::clamp(0.0, 1.0)
    }
}

/// NaN maps to the floor, or to the ceiling when the floor is open.
#[inline]
fn clamp_nan(v: f32, lower: f32, upper: f32) -> f32 {
    if v.is_nan() {
        if lower.is_finite() { lower } else { upper }
    } else if v < lower {
        lower
    } else if v > upper {
        upper
    } else {
        v
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpsError;
    use approx::assert_relative_eq;

    #[test]
    fn simple_clamp() {
        let mut px = [1.5_f32, -0.2, 0.5, 3.0];
        Range::clamp(0.0, 1.0).apply_rgba(&mut px);
        assert_eq!(px, [1.0, 0.0, 0.5, 3.0]);
    }

    #[test]
    fn one_sided() {
        let mut px = [1.5_f32, -0.2, 0.5, 1.0];
        Range::clamp_min(0.0).apply_rgba(&mut px);
        assert_eq!(px, [1.5, 0.0, 0.5, 1.0]);

        let mut px = [1.5_f32, -0.2, 0.5, 1.0];
        Range::clamp_max(1.0).apply_rgba(&mut px);
        assert_eq!(px, [1.0, -0.2, 0.5, 1.0]);
    }

    #[test]
    fn one_sided_params() {
        let floor = RangeParams { min_in: None, max_in: None, min_out: Some(0.0), max_out: None, clamp: true };
        let range = Range::from_params(&floor);
        assert_eq!(range, Range::clamp_min(0.0));
        assert!(!range.scales());
        assert_eq!(range.upper_bound(), f64::INFINITY);

        let ceiling = RangeParams { max_out: Some(1.0), min_out: None, ..floor };
        assert_eq!(Range::from_params(&ceiling), Range::clamp_max(1.0));

        let remap = RangeParams { min_in: Some(0.0), max_in: Some(1.0), min_out: Some(0.5), max_out: Some(1.0), clamp: true };
        assert_eq!(Range::from_params(&remap), Range::new(0.0, 1.0, 0.5, 1.0));
    }

    #[test]
    fn remap_with_clamp() {
        let range = Range::new(0.0, 1.0, 0.1, 0.9);
        let mut px = [-0.5_f32, 1.5, 0.5, 1.0];
        range.apply_rgba(&mut px);
        assert_relative_eq!(px[0], 0.1, epsilon = 1e-6);
        assert_relative_eq!(px[1], 0.9, epsilon = 1e-6);
        assert_relative_eq!(px[2], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn shifted_min_only() {
        // CLF one-sided range: max(v, minIn) - minIn + minOut
        let range = Range { min_in: Some(0.1), max_in: None, min_out: Some(0.2), max_out: None };
        let mut px = [0.0_f32, 0.5, 0.1, 1.0];
        range.apply_rgba(&mut px);
        assert_relative_eq!(px[0], 0.2, epsilon = 1e-6);
        assert_relative_eq!(px[1], 0.6, epsilon = 1e-6);
    }

    #[test]
    fn nan_handling() {
        let mut px = [f32::NAN, 0.5, f32::NAN, 1.0];
        Range::clamp(0.0, 1.0).apply_rgba(&mut px);
        assert_eq!(&px[..3], &[0.0, 0.5, 0.0]);
    }

    #[test]
    fn inverse_swaps() {
        let inv = Range::new(0.0, 1.0, 0.1, 0.9).inverse();
        assert_eq!(inv, Range::new(0.1, 0.9, 0.0, 1.0));
    }

    #[test]
    fn no_op_and_scales() {
        assert!(Range { min_in: None, max_in: None, min_out: None, max_out: None }.is_no_op());
        assert!(!Range::clamp(0.0, 1.0).scales());
        assert!(!Range::new(0.0, 1.0, 0.0, 1.0).scales());
        assert!(Range::new(0.0, 1.0, 0.0, 0.5).scales());
    }

    #[test]
    fn matrix_equivalent() {
        let m = Range::new(0.1, 0.9, 0.0, 1.0).to_matrix().unwrap();
        assert_relative_eq!(m.m.get(0, 0), 1.25, epsilon = 1e-12);
        assert_relative_eq!(m.offset[1], -0.125, epsilon = 1e-12);
        assert_eq!(m.offset[3], 0.0);
        assert!(matches!(Range::clamp(0.0, 1.0).to_matrix(), Err(OpsError::Lut(_))));
    }

    #[test]
    fn params_roundtrip() {
        let params = RangeParams::clamp(0.0, 1.0);
        assert_eq!(Range::from_params(&params).to_params(), params);
    }
}
