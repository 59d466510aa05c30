//! ASC CDL file format parser and writer.
//!
//! Supports three ASC CDL file formats:
//! - `.cc` - Single ColorCorrection
//! - `.ccc` - ColorCorrectionCollection (multiple CCs)
//! - `.cdl` - ColorDecisionList (CCs wrapped in ColorDecisions)
//!
//! The reader dispatches on the root element, so the extension does not
//! matter. Every format reads into a [`CdlCollection`].
//!
//! # Example
//!
//! ```rust,no_run
//! use vfx_lut::cdl::read_file;
//! use std::path::Path;
//!
//! let grades = read_file(Path::new("grades.ccc")).unwrap();
//! let shot = grades.select("shot_010").unwrap();
//! println!("Slope: {:?}", shot.slope);
//! ```
//!
//! # References
//!
//! - ASC CDL v1.01 Specification

mod data;
mod parser;
mod writer;
mod xml;

pub use data::{CdlCollection, CdlData, CdlFormat, CdlStyle, CdlStyleFamily};
pub use parser::{parse_str, read_file, MEMORY_SOURCE};
pub use writer::{
    to_cc_string, write_cc, write_cc_to, write_ccc, write_ccc_to, write_cdl, write_cdl_to,
    write_collection_to,
};
pub use xml::{escape_xml, unescape_xml};

pub(crate) use xml::{find_attr, parse_numbers, read_attributes, tag_name, LineCounter};

/// Namespace written on collection roots.
pub const ASC_CDL_NAMESPACE: &str = "urn:ASC:CDL:v1.01";

/// `<ColorCorrection>`.
pub const TAG_COLOR_CORRECTION: &str = "ColorCorrection";
/// `<ColorCorrectionCollection>`.
pub const TAG_COLOR_CORRECTION_COLLECTION: &str = "ColorCorrectionCollection";
/// `<ColorDecisionList>`.
pub const TAG_COLOR_DECISION_LIST: &str = "ColorDecisionList";
/// `<ColorDecision>`.
pub const TAG_COLOR_DECISION: &str = "ColorDecision";
/// `<MediaRef>`.
pub const TAG_MEDIA_REF: &str = "MediaRef";
/// `<SOPNode>`.
pub const TAG_SOPNODE: &str = "SOPNode";
/// `<SatNode>`.
pub const TAG_SATNODE: &str = "SatNode";
/// Alternate `<SATNode>` spelling.
pub const TAG_SATNODE_ALT: &str = "SATNode";
/// `<Slope>`.
pub const TAG_SLOPE: &str = "Slope";
/// `<Offset>`.
pub const TAG_OFFSET: &str = "Offset";
/// `<Power>`.
pub const TAG_POWER: &str = "Power";
/// `<Saturation>`.
pub const TAG_SATURATION: &str = "Saturation";
