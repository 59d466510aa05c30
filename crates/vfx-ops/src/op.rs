//! Op list: the ordered ops a transform compiles to.
//!
//! Ops are pushed in evaluation order. [`OpList::finalize`] drops the ones
//! that leave every pixel unchanged.

use tracing::debug;

use crate::cdl::CdlOp;
use crate::exponent::ExponentOp;
use crate::matrix::{MatrixOp, MatrixRenderer};
use crate::range::Range;
use crate::OpsResult;

/// Direction a transform is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformDirection {
    /// Forward transform.
    #[default]
    Forward,
    /// Inverse transform.
    Inverse,
}

impl TransformDirection {
    /// Returns the opposite direction.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }

    /// Combines two directions: inverse of inverse is forward.
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        if self == other { Self::Forward } else { Self::Inverse }
    }
}

/// One compiled operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// ASC CDL.
    Cdl(CdlOp),
    /// Affine matrix.
    Matrix(MatrixOp),
    /// Per-channel power.
    Exponent(ExponentOp),
    /// Clamp or remap.
    Range(Range),
}

impl Op {
    /// Short op kind name.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Cdl(_) => "CDL",
            Op::Matrix(_) => "Matrix",
            Op::Exponent(_) => "Exponent",
            Op::Range(_) => "Range",
        }
    }

    /// True if the op leaves every pixel unchanged.
    pub fn is_no_op(&self) -> bool {
        match self {
            Op::Cdl(op) => op.is_no_op(),
            Op::Matrix(op) => op.is_no_op(),
            Op::Exponent(op) => op.is_no_op(),
            Op::Range(op) => op.is_no_op(),
        }
    }

    /// The op undoing this one.
    pub fn inverse(&self) -> OpsResult<Op> {
        Ok(match self {
            Op::Cdl(op) => Op::Cdl(op.inverse()?),
            Op::Matrix(op) => Op::Matrix(op.inverse()?),
            Op::Exponent(op) => Op::Exponent(op.inverse()?),
            Op::Range(op) => Op::Range(op.inverse()),
        })
    }

    /// Applies the op to an interleaved RGBA buffer.
    pub fn apply_rgba(&self, pixels: &mut [f32]) {
        match self {
            Op::Cdl(op) => op.apply_rgba(pixels),
            Op::Matrix(op) => MatrixRenderer::compile(op).apply(pixels),
            Op::Exponent(op) => op.apply_rgba(pixels),
            Op::Range(op) => op.apply_rgba(pixels),
        }
    }
}

/// Ordered list of ops.
///
/// # Example
///
/// ```rust
/// use vfx_ops::{Op, OpList};
/// use vfx_ops::matrix::MatrixOp;
///
/// let mut ops = OpList::new();
/// ops.push(Op::Matrix(MatrixOp::identity()));
/// ops.push(Op::Matrix(MatrixOp::scale([2.0, 2.0, 2.0, 1.0])));
/// ops.finalize();
/// assert_eq!(ops.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpList {
    ops: Vec<Op>,
}

impl OpList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an op.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Ops in evaluation order.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if the list holds no ops.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drops no-op ops.
    pub fn finalize(&mut self) {
        let before = self.ops.len();
        self.ops.retain(|op| !op.is_no_op());
        debug!(before, after = self.ops.len(), "Finalized op list");
    }

    /// True when applying the list changes nothing.
    pub fn is_no_op(&self) -> bool {
        self.ops.iter().all(Op::is_no_op)
    }

    /// Applies every op in order to an interleaved RGBA buffer.
    pub fn apply_rgba(&self, pixels: &mut [f32]) {
        for op in &self.ops {
            op.apply_rgba(pixels);
        }
    }
}

impl Extend<Op> for OpList {
    fn extend<I: IntoIterator<Item = Op>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}
