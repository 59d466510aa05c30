//! # vfx-ops
//!
//! Per-pixel color operations for VFX pipelines.
//!
//! This crate turns grade parameters into ops that run over interleaved
//! RGBA `f32` buffers.
//!
//! # Modules
//!
//! - [`cdl`] - ASC CDL evaluation in four styles, legacy decomposition
//! - [`matrix`] - Affine matrix op and shape-specialised renderers
//! - [`exponent`] - Per-channel power
//! - [`range`] - Clamp and remap
//! - [`op`] - Op enum and ordered op list
//! - [`process_list`] - CLF/CTF ProcessList to ops
//!
//! # Example
//!
//! ```rust
//! use vfx_lut::{CdlData, CdlStyle};
//! use vfx_ops::{cdl, OpList, TransformDirection};
//!
//! let grade = CdlData::new([2.0; 3], [0.0; 3], [1.0; 3], 1.0).with_style(CdlStyle::AscFwd);
//! let mut ops = OpList::new();
//! cdl::create_cdl_ops(&mut ops, &grade, TransformDirection::Forward, cdl::DEFAULT_LUMA).unwrap();
//! ops.finalize();
//!
//! let mut rgba = vec![4.0, 3.0, 2.0, 1.0];
//! ops.apply_rgba(&mut rgba);
//! assert_eq!(rgba, [1.0, 1.0, 1.0, 1.0]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod cdl;
pub mod exponent;
pub mod matrix;
pub mod op;
pub mod process_list;
pub mod range;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use error::{OpsError, OpsResult};
pub use op::{Op, OpList, TransformDirection};
