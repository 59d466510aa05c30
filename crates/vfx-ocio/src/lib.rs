//! OpenColorIO-compatible CDL transforms for VFX.
//!
//! This crate ties the CDL pieces together:
//! - Load `.cc`, `.ccc` and `.cdl` files through a shared parse cache
//! - Pick a correction by id or index
//! - Compile it to ops, honouring the config version and luma
//!
//! # Quick Start
//!
//! ```no_run
//! use vfx_ocio::{CdlTransform, Config};
//!
//! let config = Config::from_file("path/to/config.ocio")?;
//! let grade = CdlTransform::create_from_file("grades.ccc", "shot_010")?;
//!
//! let ops = grade.build_ops(Some(&config))?;
//! let mut pixels = vec![0.18_f32, 0.18, 0.18, 1.0];
//! ops.apply_rgba(&mut pixels);
//! # Ok::<(), vfx_ocio::OcioError>(())
//! ```
//!
//! # Building into an existing op list
//!
//! ```
//! use vfx_ocio::{build_cdl_ops, CdlTransform, TransformDirection};
//! use vfx_ops::OpList;
//!
//! let mut grade = CdlTransform::new();
//! grade.set_slope([2.0, 2.0, 2.0]);
//!
//! let mut ops = OpList::new();
//! build_cdl_ops(&mut ops, None, &grade, TransformDirection::Inverse).unwrap();
//!
//! let mut rgba = vec![1.0, 1.0, 1.0, 1.0];
//! ops.apply_rgba(&mut rgba);
//! assert_eq!(rgba, [0.5, 0.5, 0.5, 1.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod config;
mod cache;
mod cdl_transform;

pub use error::{OcioError, OcioResult};
pub use config::{Config, ConfigVersion};
pub use cache::clear_all_caches;
pub use cdl_transform::{build_cdl_ops, CdlTransform, EQUALS_TOLERANCE};

pub use vfx_lut::{CdlStyle, CdlStyleFamily};
pub use vfx_ops::TransformDirection;
