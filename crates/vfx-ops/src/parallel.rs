//! Parallel op application using Rayon.
//!
//! Every op is a pure function of one pixel, so a buffer can be split into
//! row-sized chunks and processed independently.
//!
//! # Example
//!
//! ```rust
//! use vfx_lut::CdlData;
//! use vfx_ops::{parallel, Op, OpList};
//! use vfx_ops::cdl::{CdlOp, DEFAULT_LUMA};
//!
//! let cdl = CdlData::new([1.1, 1.0, 0.9], [0.0; 3], [1.0; 3], 1.2);
//! let mut ops = OpList::new();
//! ops.push(Op::Cdl(CdlOp::new(&cdl, DEFAULT_LUMA).unwrap()));
//!
//! let mut pixels = vec![0.5f32; 1920 * 4];
//! parallel::apply_rgba_par(&ops, &mut pixels).unwrap();
//! ```

use rayon::prelude::*;

use crate::op::OpList;
use crate::{OpsError, OpsResult};

/// Pixels per parallel work item.
const CHUNK_PIXELS: usize = 4096;

/// Applies an op list to an interleaved RGBA buffer across threads.
///
/// Fails if the buffer length is not a multiple of 4.
pub fn apply_rgba_par(ops: &OpList, pixels: &mut [f32]) -> OpsResult<()> {
    if pixels.len() % 4 != 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "RGBA buffer length {} is not a multiple of 4",
            pixels.len()
        )));
    }
    if ops.is_empty() {
        return Ok(());
    }

    pixels
        .par_chunks_mut(CHUNK_PIXELS * 4)
        .for_each(|chunk| ops.apply_rgba(chunk));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdl::{CdlOp, DEFAULT_LUMA};
    use crate::matrix::MatrixOp;
    use crate::op::Op;
    use vfx_lut::{CdlData, CdlStyle};

    #[test]
    fn matches_serial() {
        let cdl = CdlData::new([1.2, 0.9, 1.1], [0.01, -0.02, 0.03], [1.1, 0.95, 1.05], 1.1)
            .with_style(CdlStyle::AscFwd);
        let mut ops = OpList::new();
        ops.push(Op::Cdl(CdlOp::new(&cdl, DEFAULT_LUMA).unwrap()));
        ops.push(Op::Matrix(MatrixOp::saturation(0.8, DEFAULT_LUMA)));

        let src: Vec<f32> = (0..(CHUNK_PIXELS * 3 + 17) * 4).map(|i| (i % 97) as f32 / 96.0).collect();
        let mut serial = src.clone();
        ops.apply_rgba(&mut serial);
        let mut par = src;
        apply_rgba_par(&ops, &mut par).unwrap();
        assert_eq!(serial, par);
    }

    #[test]
    fn rejects_partial_pixel() {
        let ops = OpList::new();
        let mut px = vec![0.0; 6];
        assert!(matches!(apply_rgba_par(&ops, &mut px), Err(OpsError::InvalidDimensions(_))));
    }
}
