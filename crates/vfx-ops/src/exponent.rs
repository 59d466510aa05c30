//! Per-channel power op.
//!
//! The legacy CDL decomposition uses it for the power term, with negatives
//! clamped to zero before the power.

use crate::{OpsError, OpsResult};

/// Treatment of negative inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeStyle {
    /// Negatives become 0 first.
    #[default]
    Clamp,
    /// `sign(x) * |x|^e`.
    Mirror,
}

/// `out = in^e` per RGBA channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentOp {
    /// Exponents as `[r, g, b, a]`.
    pub exp: [f64; 4],
    /// Treatment of negative inputs.
    pub negative_style: NegativeStyle,
}

impl ExponentOp {
    /// Same exponent on RGB, alpha untouched.
    pub fn uniform(exp: f64) -> Self {
        Self::from_rgb([exp; 3])
    }

    /// RGB exponents, alpha untouched.
    pub fn from_rgb(power: [f64; 3]) -> Self {
        Self::per_channel([power[0], power[1], power[2], 1.0])
    }

    /// All four exponents.
    pub fn per_channel(exp: [f64; 4]) -> Self {
        Self { exp, negative_style: NegativeStyle::Clamp }
    }

    /// Builder-style negative style setter.
    pub fn with_negative_style(self, negative_style: NegativeStyle) -> Self {
        Self { negative_style, ..self }
    }

    /// Exponents as `[r, g, b, a]`.
    #[inline]
    pub fn values(&self) -> [f64; 4] {
        self.exp
    }

    /// True if every exponent is exactly 1.
    pub fn is_no_op(&self) -> bool {
        self.exp == [1.0; 4]
    }

    /// Reciprocal exponents, same negative style.
    ///
    /// Fails with [`OpsError::NonInvertible`] if any exponent is 0.
    pub fn inverse(&self) -> OpsResult<Self> {
        if self.exp.contains(&0.0) {
            return Err(OpsError::NonInvertible("exponent of 0 has no inverse".into()));
        }
        Ok(Self { exp: self.exp.map(|e| 1.0 / e), ..*self })
    }

    /// Applies the op to an interleaved RGBA buffer.
    pub fn apply_rgba(&self, pixels: &mut [f32]) {
        let exp = self.exp.map(|e| e as f32);
        let pow = match self.negative_style {
            NegativeStyle::Clamp => pow_clamp,
            NegativeStyle::Mirror => pow_mirror,
        };
        for px in pixels.chunks_exact_mut(4) {
            for (v, e) in px.iter_mut().zip(exp) {
                *v = pow(*v, e);
            }
        }
    }
}

impl Default for ExponentOp {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// `max(x, 0)^e`.
#[inline]
pub fn pow_clamp(x: f32, exp: f32) -> f32 {
    x.max(0.0).powf(exp)
}

/// `sign(x) * |x|^e`.
#[inline]
pub fn pow_mirror(x: f32, exp: f32) -> f32 {
    let p = x.abs().powf(exp);
    if x < 0.0 { -p } else { p }
}
