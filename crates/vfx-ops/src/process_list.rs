//! Compiles a CLF/CTF ProcessList into ops.
//!
//! Values in a [`ProcessList`] are already normalized to float range by the
//! reader, so bit depths play no part here. A root `luma="r g b"` attribute
//! overrides the saturation weights of every CDL in the list.

use tracing::debug;
use vfx_lut::{NodeOp, ProcessList};

use crate::cdl::{create_cdl_ops, DEFAULT_LUMA};
use crate::matrix::MatrixOp;
use crate::op::{Op, OpList, TransformDirection};
use crate::range::Range;
use crate::OpsResult;

/// Appends the ops of every node in `list` to `ops`.
///
/// The inverse direction walks the nodes back to front and inverts each.
/// On error `ops` is left unchanged.
pub fn create_process_list_ops(
    ops: &mut OpList,
    list: &ProcessList,
    direction: TransformDirection,
) -> OpsResult<()> {
    let luma = list.luma().unwrap_or(DEFAULT_LUMA);
    debug!(id = list.id(), nodes = list.nodes.len(), ?direction, "Compiling ProcessList");

    let mut built = OpList::new();
    let mut push_node = |op: &NodeOp| -> OpsResult<()> {
        match op {
            NodeOp::Matrix { matrix, offset, .. } => {
                let op = MatrixOp::new(*matrix).with_offset(*offset);
                built.push(Op::Matrix(match direction {
                    TransformDirection::Forward => op,
                    TransformDirection::Inverse => op.inverse()?,
                }));
            }
            NodeOp::Range { range, .. } if range.clamp => {
                let op = Range::from_params(range);
                built.push(Op::Range(match direction {
                    TransformDirection::Forward => op,
                    TransformDirection::Inverse => op.inverse(),
                }));
            }
            NodeOp::Range { range, .. } => {
                let op = Range::from_params(range).to_matrix()?;
                built.push(Op::Matrix(match direction {
                    TransformDirection::Forward => op,
                    TransformDirection::Inverse => op.inverse()?,
                }));
            }
            NodeOp::Cdl(cdl) => create_cdl_ops(&mut built, cdl, direction, luma)?,
        }
        Ok(())
    };

    match direction {
        TransformDirection::Forward => list.nodes.iter().try_for_each(|n| push_node(&n.op))?,
        TransformDirection::Inverse => list.nodes.iter().rev().try_for_each(|n| push_node(&n.op))?,
    }

    ops.extend(built.ops().iter().cloned());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vfx_lut::{CdlData, CdlStyle, ProcessNode, RangeParams};
    use vfx_lut::metadata::FormatMetadata;

    fn list_with(nodes: Vec<NodeOp>) -> ProcessList {
        let mut list = ProcessList::new("test");
        list.nodes = nodes.into_iter().map(ProcessNode::new).collect();
        list
    }

    #[test]
    fn nodes_in_order() {
        let cdl = CdlData::new([2.0; 3], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::AscFwd);
        let list = list_with(vec![
            NodeOp::Matrix {
                matrix: vfx_math::Mat4::diagonal([0.5, 0.5, 0.5, 1.0]),
                offset: [0.0; 4],
                metadata: FormatMetadata::new(),
            },
            NodeOp::Cdl(cdl),
            NodeOp::Range { range: RangeParams::clamp(0.0, 0.5), metadata: FormatMetadata::new() },
        ]);

        let mut ops = OpList::new();
        create_process_list_ops(&mut ops, &list, TransformDirection::Forward).unwrap();
        let names: Vec<_> = ops.ops().iter().map(Op::name).collect();
        assert_eq!(names, ["Matrix", "CDL", "Range"]);

        let mut px = vec![0.8, 0.2, 4.0, 1.0];
        ops.apply_rgba(&mut px);
        assert_relative_eq!(px[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(px[1], 0.2, epsilon = 1e-6);
        assert_relative_eq!(px[2], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn inverse_reverses_and_inverts() {
        let list = list_with(vec![
            NodeOp::Matrix {
                matrix: vfx_math::Mat4::diagonal([2.0, 2.0, 2.0, 1.0]),
                offset: [0.1, 0.1, 0.1, 0.0],
                metadata: FormatMetadata::new(),
            },
            NodeOp::Cdl(CdlData::new([1.5, 1.0, 0.8], [0.0; 3], [1.2, 1.0, 1.0], 0.9)),
        ]);

        let mut ops = OpList::new();
        create_process_list_ops(&mut ops, &list, TransformDirection::Forward).unwrap();
        create_process_list_ops(&mut ops, &list, TransformDirection::Inverse).unwrap();
        assert_eq!(ops.ops()[2].name(), "CDL");

        let src = [0.1_f32, 0.3, 0.6, 1.0];
        let mut px = src.to_vec();
        ops.apply_rgba(&mut px);
        for (a, b) in px.iter().zip(src) {
            assert_relative_eq!(*a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn root_luma_reaches_cdl() {
        let mut list = list_with(vec![NodeOp::Cdl(CdlData::new([1.0; 3], [0.0; 3], [1.0; 3], 0.0))]);
        list.metadata.add_attribute("luma", "0 1 0").unwrap();

        let mut ops = OpList::new();
        create_process_list_ops(&mut ops, &list, TransformDirection::Forward).unwrap();
        let mut px = vec![0.2, 0.6, 0.9, 1.0];
        ops.apply_rgba(&mut px);
        for c in &px[..3] {
            assert_relative_eq!(*c, 0.6, epsilon = 1e-6);
        }
    }

    #[test]
    fn failure_leaves_ops() {
        let singular = NodeOp::Matrix {
            matrix: vfx_math::Mat4::ZERO,
            offset: [0.0; 4],
            metadata: FormatMetadata::new(),
        };
        let list = list_with(vec![singular]);
        let mut ops = OpList::new();
        ops.push(Op::Range(Range::clamp(0.0, 1.0)));
        assert!(create_process_list_ops(&mut ops, &list, TransformDirection::Inverse).is_err());
        assert_eq!(ops.len(), 1);
    }
}
