//! # vfx-lut
//!
//! Grade file formats for VFX color pipelines.
//!
//! This crate reads and writes the files that carry ASC CDL grades, and the
//! descriptive metadata that travels with them.
//!
//! # Supported Formats
//!
//! - `.cc` / `.ccc` / `.cdl` - ASC CDL XML ([`cdl`] module)
//! - `.ctf` / `.clf` - Autodesk CTF and Academy CLF ProcessLists ([`ctf`] module)
//!
//! # Usage
//!
//! ```rust
//! use vfx_lut::cdl::{parse_str, CdlFormat};
//!
//! let text = r#"<ColorCorrection id="shot_010">
//!   <SOPNode>
//!     <Slope>1.1 1.0 0.9</Slope>
//!     <Offset>0 0 0</Offset>
//!     <Power>1 1 1</Power>
//!   </SOPNode>
//!   <SatNode><Saturation>1.2</Saturation></SatNode>
//! </ColorCorrection>"#;
//!
//! let grades = parse_str(text, "shot_010.cc").unwrap();
//! assert_eq!(grades.format, CdlFormat::Cc);
//! assert_eq!(grades.select("").unwrap().saturation, 1.2);
//! ```
//!
//! # Dependencies
//!
//! - [`vfx-math`] - Matrices for ProcessList operators
//! - [`quick-xml`] - XML tokenizer
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Parser diagnostics
//!
//! # Used By
//!
//! - `vfx-ops` - CDL evaluation
//! - `vfx-ocio` - CDL transforms and file caching

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod cdl;
pub mod ctf;
pub mod metadata;

pub use error::{LutError, LutResult};
pub use metadata::FormatMetadata;
pub use cdl::{CdlCollection, CdlData, CdlFormat, CdlStyle, CdlStyleFamily};
pub use ctf::{
    parse_ctf, read_ctf, write_ctf, write_ctf_to, BitDepth, CtfVersion, NodeOp, ProcessList,
    ProcessListFormat, ProcessNode, RangeParams,
};
