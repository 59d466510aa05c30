//! ASC CDL (Color Decision List) evaluation.
//!
//! Compiles a [`CdlData`] into a [`CdlOp`] with single-precision render
//! parameters. CDL applies Slope, Offset, Power (SOP) and Saturation
//! adjustments to RGB; alpha passes through.
//!
//! # Formula
//!
//! ```text
//! v    = in * slope + offset
//! v    = v ^ power
//! gray = dot(luma, v)
//! out  = gray + sat * (v - gray)
//! ```
//!
//! The ASC v1.2 styles clamp to [0, 1] after SOP and after saturation. The
//! no-clamp styles do not clamp and raise negatives with a mirrored power,
//! `sign(v) * |v| ^ power`, which keeps them invertible.
//!
//! # Reverse
//!
//! Reverse styles run the steps backward with reciprocal parameters. The ASC
//! reverse floors each reciprocal at `1 / 1e-2`, so a zero slope gives a gain
//! of 100 rather than infinity.
//!
//! # Reference
//!
//! ASC CDL Transfer Functions and Interchange Syntax v1.2

use tracing::debug;
use vfx_lut::{CdlData, CdlStyle};
use vfx_math::simd::{clamp01_x4, mul_add_x4, saturate_x4};

use crate::exponent::{pow_mirror, ExponentOp};
use crate::matrix::MatrixOp;
use crate::op::{Op, OpList, TransformDirection};
use crate::range::Range;
use crate::{OpsError, OpsResult};

/// Rec.709 luminance weights.
pub const DEFAULT_LUMA: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Smallest parameter the ASC reverse divides by.
const ASC_RECIPROCAL_FLOOR: f64 = 1e-2;

/// Single-precision parameters, already inverted for reverse styles.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderParams {
    slope: [f32; 4],
    offset: [f32; 4],
    power: [f32; 3],
    saturation: f32,
    luma: [f32; 4],
}

/// A compiled CDL.
///
/// # Example
///
/// ```rust
/// use vfx_lut::{CdlData, CdlStyle};
/// use vfx_ops::cdl::{CdlOp, DEFAULT_LUMA};
///
/// let cdl = CdlData::new([2.0; 3], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::AscFwd);
/// let op = CdlOp::new(&cdl, DEFAULT_LUMA).unwrap();
///
/// let mut px = [4.0, 3.0, 2.0, 1.0];
/// op.apply_rgba(&mut px);
/// assert_eq!(px, [1.0, 1.0, 1.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CdlOp {
    style: CdlStyle,
    slope: [f64; 3],
    offset: [f64; 3],
    power: [f64; 3],
    saturation: f64,
    luma: [f64; 3],
    params: RenderParams,
}

fn f32x3(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

fn asc_reciprocal(x: f64) -> f64 {
    1.0 / x.max(ASC_RECIPROCAL_FLOOR)
}

impl CdlOp {
    /// Validates and compiles `cdl` in its own style.
    pub fn new(cdl: &CdlData, luma: [f64; 3]) -> OpsResult<Self> {
        cdl.validate()?;
        Self::compile(cdl.style, cdl.slope, cdl.offset, cdl.power, cdl.saturation, luma)
    }

    fn compile(
        style: CdlStyle,
        slope: [f64; 3],
        offset: [f64; 3],
        power: [f64; 3],
        saturation: f64,
        luma: [f64; 3],
    ) -> OpsResult<Self> {
        let luma4 = [luma[0] as f32, luma[1] as f32, luma[2] as f32, 0.0];
        let params = match style {
            CdlStyle::AscFwd | CdlStyle::NoClamp => {
                let s = f32x3(slope);
                let o = f32x3(offset);
                RenderParams {
                    slope: [s[0], s[1], s[2], 1.0],
                    offset: [o[0], o[1], o[2], 0.0],
                    power: f32x3(power),
                    saturation: saturation as f32,
                    luma: luma4,
                }
            }
            CdlStyle::AscRev => {
                if saturation == 0.0 {
                    return Err(OpsError::NonInvertible("CDL saturation of 0 has no inverse".into()));
                }
                if power.iter().any(|p| *p <= 0.0) {
                    return Err(OpsError::NonInvertible("CDL power must be positive to invert".into()));
                }
                Self::reverse_params(slope, offset, power, saturation, luma4, asc_reciprocal)
            }
            CdlStyle::NoClampRev => {
                if saturation == 0.0 || slope.contains(&0.0) || power.contains(&0.0) {
                    return Err(OpsError::NonInvertible(
                        "CDL slope, power and saturation must be non-zero to invert".into(),
                    ));
                }
                Self::reverse_params(slope, offset, power, saturation, luma4, |x| 1.0 / x)
            }
        };
        Ok(Self { style, slope, offset, power, saturation, luma, params })
    }

    /// `(v - offset) / slope` folded into one multiply-add.
    fn reverse_params(
        slope: [f64; 3],
        offset: [f64; 3],
        power: [f64; 3],
        saturation: f64,
        luma: [f32; 4],
        recip: impl Fn(f64) -> f64,
    ) -> RenderParams {
        let inv_slope = slope.map(&recip);
        RenderParams {
            slope: [inv_slope[0] as f32, inv_slope[1] as f32, inv_slope[2] as f32, 1.0],
            offset: [
                (-offset[0] * inv_slope[0]) as f32,
                (-offset[1] * inv_slope[1]) as f32,
                (-offset[2] * inv_slope[2]) as f32,
                0.0,
            ],
            power: f32x3(power.map(&recip)),
            saturation: recip(saturation) as f32,
            luma,
        }
    }

    /// Evaluation style.
    pub fn style(&self) -> CdlStyle {
        self.style
    }

    /// Luma weights used by the saturation step.
    pub fn luma(&self) -> [f64; 3] {
        self.luma
    }

    /// Parameters as a [`CdlData`] without metadata.
    pub fn to_data(&self) -> CdlData {
        CdlData::new(self.slope, self.offset, self.power, self.saturation).with_style(self.style)
    }

    /// True when the op changes nothing, clamps included.
    pub fn is_no_op(&self) -> bool {
        !self.style.is_clamping() && self.to_data().is_identity()
    }

    /// Same parameters, opposite direction.
    pub fn inverse(&self) -> OpsResult<Self> {
        Self::compile(
            self.style.inverse(),
            self.slope,
            self.offset,
            self.power,
            self.saturation,
            self.luma,
        )
    }

    /// Evaluates one RGBA pixel.
    #[inline]
    pub fn apply_pixel(&self, px: [f32; 4]) -> [f32; 4] {
        let p = &self.params;
        let alpha = px[3];
        let saturate = |v: [f32; 4]| {
            if p.saturation == 1.0 { v } else { saturate_x4(v, p.luma, p.saturation) }
        };
        let mut v = match self.style {
            CdlStyle::AscFwd => {
                let mut v = clamp01_x4(mul_add_x4(px, p.slope, p.offset));
                for (c, e) in v.iter_mut().zip(p.power) {
                    *c = c.powf(e);
                }
                clamp01_x4(saturate(v))
            }
            CdlStyle::AscRev => {
                let mut v = clamp01_x4(saturate(clamp01_x4(px)));
                for (c, e) in v.iter_mut().zip(p.power) {
                    *c = c.powf(e);
                }
                clamp01_x4(mul_add_x4(v, p.slope, p.offset))
            }
            CdlStyle::NoClamp => {
                let mut v = mul_add_x4(px, p.slope, p.offset);
                for (c, e) in v.iter_mut().zip(p.power) {
                    *c = pow_mirror(*c, e);
                }
                saturate(v)
            }
            CdlStyle::NoClampRev => {
                let mut v = saturate(px);
                for (c, e) in v.iter_mut().zip(p.power) {
                    *c = pow_mirror(*c, e);
                }
                mul_add_x4(v, p.slope, p.offset)
            }
        };
        v[3] = alpha;
        v
    }

    /// Evaluates an interleaved RGBA buffer in place.
    pub fn apply_rgba(&self, pixels: &mut [f32]) {
        for px in pixels.chunks_exact_mut(4) {
            let out = self.apply_pixel([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
    }
}

// ============================================================================
// Op creation
// ============================================================================

/// Appends the ops for `cdl` to `ops`.
///
/// An inverse direction flips the style. An identity CDL adds nothing in the
/// no-clamp styles and a [0, 1] clamp in the ASC styles.
pub fn create_cdl_ops(
    ops: &mut OpList,
    cdl: &CdlData,
    direction: TransformDirection,
    luma: [f64; 3],
) -> OpsResult<()> {
    cdl.validate()?;
    let style = match direction {
        TransformDirection::Forward => cdl.style,
        TransformDirection::Inverse => cdl.style.inverse(),
    };

    if cdl.is_identity() {
        if style.is_clamping() {
            debug!(id = cdl.id(), "Identity CDL replaced by a clamp");
            ops.push(Op::Range(Range::clamp(0.0, 1.0)));
        } else {
            debug!(id = cdl.id(), "Identity CDL dropped");
        }
        return Ok(());
    }

    let op = CdlOp::compile(style, cdl.slope, cdl.offset, cdl.power, cdl.saturation, luma)?;
    ops.push(Op::Cdl(op));
    Ok(())
}

/// Appends the CDL as separate matrix and exponent ops.
///
/// Forward order is slope/offset matrix, exponent, saturation matrix; each is
/// skipped when it would be an identity. The inverse emits the inverses in
/// reverse order. The exponent clamps negatives and the style is ignored.
pub fn create_legacy_cdl_ops(
    ops: &mut OpList,
    cdl: &CdlData,
    direction: TransformDirection,
    luma: [f64; 3],
) -> OpsResult<()> {
    cdl.validate()?;
    let [s, o, p] = [cdl.slope, cdl.offset, cdl.power];

    let mut legacy = Vec::with_capacity(3);
    if s != [1.0; 3] || o != [0.0; 3] {
        legacy.push(Op::Matrix(
            MatrixOp::scale([s[0], s[1], s[2], 1.0]).with_offset([o[0], o[1], o[2], 0.0]),
        ));
    }
    if p != [1.0; 3] {
        legacy.push(Op::Exponent(ExponentOp::from_rgb(p)));
    }
    if cdl.saturation != 1.0 {
        legacy.push(Op::Matrix(MatrixOp::saturation(cdl.saturation, luma)));
    }

    debug!(id = cdl.id(), ops = legacy.len(), ?direction, "Legacy CDL decomposition");
    match direction {
        TransformDirection::Forward => {
            for op in legacy {
                ops.push(op);
            }
        }
        TransformDirection::Inverse => {
            for op in legacy.iter().rev() {
                ops.push(op.inverse()?);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cdl(style: CdlStyle) -> CdlData {
        CdlData::new([1.2, 0.9, 1.1], [0.01, -0.02, 0.03], [1.1, 0.95, 1.05], 1.1).with_style(style)
    }

    fn run(op: &CdlOp, px: [f32; 4]) -> [f32; 4] {
        op.apply_pixel(px)
    }

    #[test]
    fn asc_forward_clamps() {
        let data = CdlData::new([2.0; 3], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::AscFwd);
        let op = CdlOp::new(&data, DEFAULT_LUMA).unwrap();
        assert_eq!(run(&op, [4.0, 3.0, 2.0, 1.0]), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(run(&op, [-1.0, 0.25, 0.5, 7.0]), [0.0, 0.5, 1.0, 7.0]);
    }

    #[test]
    fn no_clamp_reverse_slope() {
        let data = CdlData::new([2.0; 3], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::NoClampRev);
        let op = CdlOp::new(&data, DEFAULT_LUMA).unwrap();
        assert_eq!(run(&op, [1.0, 1.0, 1.0, 1.0]), [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn saturation_uses_luma() {
        let data = CdlData::new([1.0; 3], [0.0; 3], [1.0; 3], 0.0);
        let op = CdlOp::new(&data, DEFAULT_LUMA).unwrap();
        let out = run(&op, [1.0, 0.0, 0.0, 1.0]);
        for c in &out[..3] {
            assert_relative_eq!(*c, 0.2126, epsilon = 1e-6);
        }
    }

    #[test]
    fn mirror_power_for_negatives() {
        let data = CdlData::new([1.0; 3], [-0.1; 3], [2.0; 3], 1.0);
        let op = CdlOp::new(&data, DEFAULT_LUMA).unwrap();
        let out = run(&op, [0.05, 0.05, 0.05, 1.0]);
        assert_relative_eq!(out[0], -0.0025, epsilon = 1e-7);

        let asc = CdlOp::new(&data.clone().with_style(CdlStyle::AscFwd), DEFAULT_LUMA).unwrap();
        assert_eq!(run(&asc, [0.05, 0.05, 0.05, 1.0])[0], 0.0);
    }

    #[test]
    fn no_clamp_roundtrip() {
        let fwd = CdlOp::new(&cdl(CdlStyle::NoClamp), DEFAULT_LUMA).unwrap();
        let inv = fwd.inverse().unwrap();
        assert_eq!(inv.style(), CdlStyle::NoClampRev);
        for px in [[0.3, 0.5, 0.4, 1.0], [-0.2, 1.7, 0.01, 0.5], [2.0, 2.0, 2.0, 0.0]] {
            let there = run(&inv, run(&fwd, px));
            let back = run(&fwd, run(&inv, px));
            for c in 0..4 {
                assert_relative_eq!(there[c], px[c], epsilon = 1e-5, max_relative = 1e-5);
                assert_relative_eq!(back[c], px[c], epsilon = 1e-5, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn asc_roundtrip_in_range() {
        let fwd = CdlOp::new(&cdl(CdlStyle::AscFwd), DEFAULT_LUMA).unwrap();
        let inv = fwd.inverse().unwrap();
        let px = [0.3, 0.5, 0.4, 1.0];
        let back = run(&inv, run(&fwd, px));
        for c in 0..3 {
            assert_relative_eq!(back[c], px[c], epsilon = 1e-4);
        }
    }

    #[test]
    fn asc_reverse_floors_zero_slope() {
        let data = CdlData::new([0.0, 1.0, 1.0], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::AscRev);
        let op = CdlOp::new(&data, DEFAULT_LUMA).unwrap();
        let out = run(&op, [0.005, 0.5, 0.5, 1.0]);
        assert_relative_eq!(out[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn non_invertible() {
        let zero_sat = CdlData::new([1.0; 3], [0.0; 3], [1.0; 3], 0.0);
        for style in [CdlStyle::AscRev, CdlStyle::NoClampRev] {
            let err = CdlOp::new(&zero_sat.clone().with_style(style), DEFAULT_LUMA).unwrap_err();
            assert!(matches!(err, OpsError::NonInvertible(_)), "{style}");
        }
        let zero_slope = CdlData::new([0.0, 1.0, 1.0], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::NoClampRev);
        assert!(CdlOp::new(&zero_slope, DEFAULT_LUMA).is_err());
    }

    #[test]
    fn invalid_asc_parameters() {
        let data = CdlData::new([-1.0, 1.0, 1.0], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::AscFwd);
        assert!(matches!(CdlOp::new(&data, DEFAULT_LUMA), Err(OpsError::Lut(_))));
    }

    #[test]
    fn identity_replacement() {
        let mut ops = OpList::new();
        create_cdl_ops(&mut ops, &CdlData::default(), TransformDirection::Forward, DEFAULT_LUMA).unwrap();
        assert!(ops.is_empty());

        let asc = CdlData::default().with_style(CdlStyle::AscFwd);
        create_cdl_ops(&mut ops, &asc, TransformDirection::Inverse, DEFAULT_LUMA).unwrap();
        assert_eq!(ops.ops(), &[Op::Range(Range::clamp(0.0, 1.0))]);
    }

    #[test]
    fn inverse_direction_flips_style() {
        let mut ops = OpList::new();
        create_cdl_ops(&mut ops, &cdl(CdlStyle::AscFwd), TransformDirection::Inverse, DEFAULT_LUMA).unwrap();
        match &ops.ops()[0] {
            Op::Cdl(op) => assert_eq!(op.style(), CdlStyle::AscRev),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn legacy_order() {
        let data = cdl(CdlStyle::NoClamp);
        let mut ops = OpList::new();
        create_legacy_cdl_ops(&mut ops, &data, TransformDirection::Forward, DEFAULT_LUMA).unwrap();
        let kinds: Vec<_> = ops.ops().iter().map(Op::name).collect();
        assert_eq!(kinds, ["Matrix", "Exponent", "Matrix"]);

        let mut inv = OpList::new();
        create_legacy_cdl_ops(&mut inv, &data, TransformDirection::Inverse, DEFAULT_LUMA).unwrap();
        let kinds: Vec<_> = inv.ops().iter().map(Op::name).collect();
        assert_eq!(kinds, ["Matrix", "Exponent", "Matrix"]);

        let mut px = [0.3_f32, 0.5, 0.4, 1.0];
        ops.apply_rgba(&mut px);
        inv.apply_rgba(&mut px);
        assert_relative_eq!(px[0], 0.3, epsilon = 1e-5);
        assert_relative_eq!(px[1], 0.5, epsilon = 1e-5);
        assert_relative_eq!(px[2], 0.4, epsilon = 1e-5);
    }

    #[test]
    fn legacy_matches_cdl_op_in_range() {
        let data = cdl(CdlStyle::NoClamp);
        let mut legacy = OpList::new();
        create_legacy_cdl_ops(&mut legacy, &data, TransformDirection::Forward, DEFAULT_LUMA).unwrap();
        let op = CdlOp::new(&data, DEFAULT_LUMA).unwrap();

        let mut a = [0.3_f32, 0.5, 0.4, 1.0];
        let b = op.apply_pixel(a);
        legacy.apply_rgba(&mut a);
        for c in 0..4 {
            assert_relative_eq!(a[c], b[c], epsilon = 1e-5);
        }
    }

    #[test]
    fn legacy_skips_identity_parts() {
        let mut ops = OpList::new();
        let sat_only = CdlData::new([1.0; 3], [0.0; 3], [1.0; 3], 0.5);
        create_legacy_cdl_ops(&mut ops, &sat_only, TransformDirection::Forward, DEFAULT_LUMA).unwrap();
        assert_eq!(ops.len(), 1);

        let mut none = OpList::new();
        create_legacy_cdl_ops(&mut none, &CdlData::default(), TransformDirection::Forward, DEFAULT_LUMA).unwrap();
        assert!(none.is_empty());
    }
}
