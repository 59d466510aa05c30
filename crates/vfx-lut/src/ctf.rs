//! CLF/CTF ProcessList reader and writer.
//!
//! Covers the subset of the Academy Common LUT Format (CLF) and its CTF
//! superset needed to carry CDL grades: `Matrix`, `Range` and `ASC_CDL`
//! operators plus the ProcessList descriptive metadata.
//!
//! # File Structure
//!
//! ```xml
//! <ProcessList id="grade" compCLFversion="3.0">
//!   <Description>Example</Description>
//!   <ASC_CDL id="cc" inBitDepth="32f" outBitDepth="32f" style="Fwd">
//!     <SOPNode>
//!       <Slope>1.1 1 0.9</Slope>
//!       <Offset>0 0.01 0</Offset>
//!       <Power>1 1 1</Power>
//!     </SOPNode>
//!     <SatNode>
//!       <Saturation>1.2</Saturation>
//!     </SatNode>
//!   </ASC_CDL>
//! </ProcessList>
//! ```
//!
//! # Versions
//!
//! CTF files declare `version`, CLF files declare `compCLFversion`. Both map
//! onto one [`CtfVersion`] scale: CLF 2.0 and earlier read as CTF 1.7, CLF 3
//! reads as CTF 2.0. A CTF file without a version is CTF 1.2.
//!
//! # References
//!
//! - [CLF Specification](https://acescentral.com/clf/)

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, warn};
use vfx_math::Mat4;

use crate::cdl::{
    escape_xml, find_attr, parse_numbers, read_attributes, tag_name, unescape_xml, CdlData,
    CdlStyle, LineCounter, TAG_OFFSET, TAG_POWER, TAG_SATNODE, TAG_SATNODE_ALT, TAG_SATURATION,
    TAG_SLOPE, TAG_SOPNODE,
};
use crate::metadata::{
    FormatMetadata, METADATA_DESCRIPTION, METADATA_INFO, METADATA_INPUT_DESCRIPTOR,
    METADATA_OUTPUT_DESCRIPTOR, METADATA_PROCESS_LIST, METADATA_SAT_DESCRIPTION,
    METADATA_SOP_DESCRIPTION,
};
use crate::{LutError, LutResult};

/// CLF version written by [`write_ctf`].
pub const CLF_VERSION: &str = "3.0";

/// Denominator below which a Range input interval is degenerate.
const RANGE_EPSILON: f64 = 1e-6;

// ============================================================================
// Version
// ============================================================================

/// CTF format version, ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtfVersion {
    /// Major number.
    pub major: u32,
    /// Minor number.
    pub minor: u32,
    /// Revision number.
    pub revision: u32,
}

impl CtfVersion {
    /// CTF 1.2, assumed when a CTF file declares no version.
    pub const V1_2: Self = Self::new(1, 2, 0);
    /// CTF 1.3.
    pub const V1_3: Self = Self::new(1, 3, 0);
    /// CTF 1.4.
    pub const V1_4: Self = Self::new(1, 4, 0);
    /// CTF 1.5.
    pub const V1_5: Self = Self::new(1, 5, 0);
    /// CTF 1.6.
    pub const V1_6: Self = Self::new(1, 6, 0);
    /// CTF 1.7, the reading of any CLF 2.0 or earlier.
    pub const V1_7: Self = Self::new(1, 7, 0);
    /// CTF 1.8.
    pub const V1_8: Self = Self::new(1, 8, 0);
    /// CTF 2.0, the reading of CLF 3.
    pub const V2_0: Self = Self::new(2, 0, 0);
    /// Newest supported version.
    pub const LATEST: Self = Self::V2_0;

    /// Creates a version.
    pub const fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self { major, minor, revision }
    }

    /// Parses `MAJOR[.MINOR[.REVISION]]`. Leading zeros are fine.
    ///
    /// ```rust
    /// use vfx_lut::ctf::CtfVersion;
    ///
    /// assert_eq!(CtfVersion::parse("1.07").unwrap(), CtfVersion::new(1, 7, 0));
    /// assert!(CtfVersion::parse("1.").is_err());
    /// assert!(CtfVersion::parse("1.2.3.4").is_err());
    /// ```
    pub fn parse(s: &str) -> LutResult<Self> {
        let invalid = || {
            LutError::ParseError(format!(
                "'{s}' is not a valid version. Expecting MAJOR[.MINOR[.REVISION]]"
            ))
        };
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return Err(invalid());
        }
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }
        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }

    /// Same major with another minor, checked against known versions.
    pub fn with_minor(self, minor: u32) -> LutResult<Self> {
        let max_minor = match self.major {
            1 => Self::V1_8.minor,
            2 => Self::V2_0.minor,
            major => {
                return Err(LutError::VersionMismatch(format!(
                    "Unknown CTF major version {major}"
                )));
            }
        };
        if minor > max_minor {
            return Err(LutError::VersionMismatch(format!(
                "CTF version {}.{minor} is beyond the latest known {}.{max_minor}",
                self.major, self.major
            )));
        }
        Ok(Self::new(self.major, minor, 0))
    }

    /// Maps a declared CLF version onto the CTF scale.
    pub fn from_clf(clf: Self) -> LutResult<Self> {
        if clf <= Self::new(2, 0, 0) {
            Ok(Self::V1_7)
        } else if clf.major == 3 {
            Ok(Self::V2_0)
        } else {
            Err(LutError::ParseError(format!("Unsupported CLF version '{clf}' supplied.")))
        }
    }
}

impl Default for CtfVersion {
    fn default() -> Self {
        Self::V1_2
    }
}

impl PartialOrd for CtfVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CtfVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.revision).cmp(&(other.major, other.minor, other.revision))
    }
}

impl fmt::Display for CtfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.revision != 0 {
            write!(f, ".{}", self.revision)?;
        }
        Ok(())
    }
}

impl FromStr for CtfVersion {
    type Err = LutError;

    fn from_str(s: &str) -> LutResult<Self> {
        Self::parse(s)
    }
}

// ============================================================================
// Bit depth
// ============================================================================

/// Bit depth of an operator's input or output.
///
/// Defines how file values are scaled to the normalized float range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// 8-bit unsigned integer [0, 255].
    Uint8,
    /// 10-bit unsigned integer [0, 1023].
    Uint10,
    /// 12-bit unsigned integer [0, 4095].
    Uint12,
    /// 16-bit unsigned integer [0, 65535].
    Uint16,
    /// 16-bit half float.
    Float16,
    /// 32-bit float (normalized [0, 1]).
    #[default]
    Float32,
}

impl BitDepth {
    /// Returns the scale factor to convert to normalized [0, 1].
    ///
    /// # Example
    ///
    /// ```rust
    /// use vfx_lut::ctf::BitDepth;
    ///
    /// assert_eq!(BitDepth::Uint8.scale(), 255.0);
    /// assert_eq!(BitDepth::Float32.scale(), 1.0);
    /// ```
    #[inline]
    pub fn scale(&self) -> f64 {
        match self {
            BitDepth::Uint8 => 255.0,
            BitDepth::Uint10 => 1023.0,
            BitDepth::Uint12 => 4095.0,
            BitDepth::Uint16 => 65535.0,
            BitDepth::Float16 | BitDepth::Float32 => 1.0,
        }
    }

    /// Parses a bit depth attribute, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "8i" => Some(BitDepth::Uint8),
            "10i" => Some(BitDepth::Uint10),
            "12i" => Some(BitDepth::Uint12),
            "16i" => Some(BitDepth::Uint16),
            "16f" => Some(BitDepth::Float16),
            "32f" => Some(BitDepth::Float32),
            _ => None,
        }
    }

    /// Returns the attribute string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BitDepth::Uint8 => "8i",
            BitDepth::Uint10 => "10i",
            BitDepth::Uint12 => "12i",
            BitDepth::Uint16 => "16i",
            BitDepth::Float16 => "16f",
            BitDepth::Float32 => "32f",
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Range parameters in normalized float units.
///
/// Missing bounds are `None`; a Range with only a min or only a max is a
/// one-sided clamp.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeParams {
    /// Lower input bound.
    pub min_in: Option<f64>,
    /// Upper input bound.
    pub max_in: Option<f64>,
    /// Lower output bound.
    pub min_out: Option<f64>,
    /// Upper output bound.
    pub max_out: Option<f64>,
    /// False for `style="noClamp"`.
    pub clamp: bool,
}

impl RangeParams {
    /// Clamp to `[min, max]` without scaling.
    pub fn clamp(min: f64, max: f64) -> Self {
        Self {
            min_in: Some(min),
            max_in: Some(max),
            min_out: Some(min),
            max_out: Some(max),
            clamp: true,
        }
    }

    /// Scale and offset of the mapping from the input to the output interval.
    pub fn scale_offset(&self) -> LutResult<(f64, f64)> {
        let (Some(min_in), Some(max_in), Some(min_out), Some(max_out)) =
            (self.min_in, self.max_in, self.min_out, self.max_out)
        else {
            return Err(LutError::InvalidParameter(
                "Non-clamping Range min & max values have to be set.".into(),
            ));
        };
        let denom = max_in - min_in;
        if denom.abs() < RANGE_EPSILON {
            return Err(LutError::InvalidParameter(
                "Range maxInValue is too close to minInValue".into(),
            ));
        }
        let scale = (max_out - min_out) / denom;
        Ok((scale, min_out - scale * min_in))
    }

    /// Affine matrix equivalent of an unclamped Range.
    ///
    /// The scale goes on the RGB diagonal, the offset on RGB; alpha passes.
    pub fn to_matrix(&self) -> LutResult<(Mat4, [f64; 4])> {
        let (scale, offset) = self.scale_offset()?;
        Ok((Mat4::diagonal([scale, scale, scale, 1.0]), [offset, offset, offset, 0.0]))
    }
}

/// The operator carried by a [`ProcessNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOp {
    /// Affine RGBA matrix, normalized.
    Matrix {
        /// 4x4 matrix part.
        matrix: Mat4,
        /// Offset added after the matrix.
        offset: [f64; 4],
        /// Id, name and descriptions.
        metadata: FormatMetadata,
    },
    /// Clamp or scale, normalized.
    Range {
        /// Bounds.
        range: RangeParams,
        /// Id, name and descriptions.
        metadata: FormatMetadata,
    },
    /// ASC CDL. Its metadata lives in the CDL.
    Cdl(CdlData),
}

/// One operator of a ProcessList.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessNode {
    /// Declared input bit depth.
    pub in_depth: BitDepth,
    /// Declared output bit depth.
    pub out_depth: BitDepth,
    /// The operator.
    pub op: NodeOp,
}

impl ProcessNode {
    /// A float-to-float node.
    pub fn new(op: NodeOp) -> Self {
        Self { in_depth: BitDepth::Float32, out_depth: BitDepth::Float32, op }
    }

    /// Element name in the file.
    pub fn tag(&self) -> &'static str {
        match self.op {
            NodeOp::Matrix { .. } => TAG_MATRIX,
            NodeOp::Range { .. } => TAG_RANGE,
            NodeOp::Cdl(_) => TAG_ASC_CDL,
        }
    }

    /// Operator metadata.
    pub fn metadata(&self) -> &FormatMetadata {
        match &self.op {
            NodeOp::Matrix { metadata, .. } | NodeOp::Range { metadata, .. } => metadata,
            NodeOp::Cdl(cdl) => &cdl.metadata,
        }
    }
}

const TAG_MATRIX: &str = "Matrix";
const TAG_RANGE: &str = "Range";
const TAG_ASC_CDL: &str = "ASC_CDL";
const TAG_ARRAY: &str = "Array";
const TAG_MIN_IN: &str = "minInValue";
const TAG_MAX_IN: &str = "maxInValue";
const TAG_MIN_OUT: &str = "minOutValue";
const TAG_MAX_OUT: &str = "maxOutValue";

/// Declared flavour of a ProcessList file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessListFormat {
    /// `.ctf`, declares `version`.
    #[default]
    Ctf,
    /// `.clf`, declares `compCLFversion`.
    Clf,
}

impl ProcessListFormat {
    /// Picks the flavour from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("clf") => Self::Clf,
            _ => Self::Ctf,
        }
    }
}

/// A CLF/CTF ProcessList.
///
/// The metadata root keeps the `ROOT` name in memory and is written as
/// `<ProcessList>`; its attributes hold `id`, `name` and `inverseOf`.
///
/// # Example
///
/// ```rust
/// use vfx_lut::ctf::{NodeOp, ProcessList, ProcessNode};
/// use vfx_lut::cdl::{CdlData, CdlStyle};
///
/// let mut pl = ProcessList::new("grade");
/// let cdl = CdlData::new([1.1, 1.0, 0.9], [0.0; 3], [1.0; 3], 1.2).with_style(CdlStyle::AscFwd);
/// pl.nodes.push(ProcessNode::new(NodeOp::Cdl(cdl)));
///
/// let mut out = Vec::new();
/// vfx_lut::ctf::write_ctf_to(&mut out, &pl).unwrap();
/// let again = vfx_lut::ctf::parse_ctf(std::str::from_utf8(&out).unwrap(), "<memory>", Default::default()).unwrap();
/// assert_eq!(again.nodes, pl.nodes);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessList {
    /// Root attributes and descriptive children.
    pub metadata: FormatMetadata,
    /// Format version on the CTF scale.
    pub version: CtfVersion,
    /// Ordered list of processing nodes.
    pub nodes: Vec<ProcessNode>,
}

impl ProcessList {
    /// Creates an empty list at the latest version.
    pub fn new(id: &str) -> Self {
        let mut metadata = FormatMetadata::new();
        metadata.set_id(id);
        Self { metadata, version: CtfVersion::LATEST, nodes: Vec::new() }
    }

    /// ProcessList id.
    pub fn id(&self) -> &str {
        self.metadata.id()
    }

    /// First ProcessList description, `""` if none.
    pub fn description(&self) -> &str {
        self.metadata.first_child(METADATA_DESCRIPTION).map(|m| m.value()).unwrap_or("")
    }

    /// Parsed root `luma` attribute (`"r g b"`), if present and well formed.
    pub fn luma(&self) -> Option<[f64; 3]> {
        let raw = self.metadata.find_attribute("luma")?;
        let values = parse_numbers(raw).ok()?;
        <[f64; 3]>::try_from(values.as_slice()).ok()
    }
}

// ============================================================================
// Reader
// ============================================================================

/// State threaded through element handlers.
#[derive(Debug, Clone, Copy)]
struct ReaderContext {
    format: ProcessListFormat,
    version: CtfVersion,
    previous_out_depth: Option<BitDepth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Matrix,
    Range,
    Cdl,
}

#[derive(Debug)]
struct PendingOp {
    kind: OpKind,
    in_depth: BitDepth,
    out_depth: BitDepth,
    metadata: FormatMetadata,
    cdl: CdlData,
    array: Option<(Vec<usize>, Vec<f64>)>,
    range: RangeParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueTag {
    MinIn,
    MaxIn,
    MinOut,
    MaxOut,
    Slope,
    Offset,
    Power,
    Saturation,
}

/// What the innermost open element is, without borrowing it.
#[derive(Debug, Clone, Copy)]
enum Parent {
    Document,
    ProcessList,
    Meta,
    Op(OpKind),
    Sop,
    Sat,
    Ignored,
}

#[derive(Debug)]
enum CtfNode {
    ProcessList,
    Meta(FormatMetadata, String),
    Op(Box<PendingOp>),
    Array(Vec<usize>, String),
    Value(ValueTag, String),
    Sop,
    Sat,
    Ignored,
}

#[derive(Debug)]
struct CtfFrame {
    tag: String,
    node: CtfNode,
}

struct CtfReader<'a> {
    file: &'a str,
    line: usize,
    ctx: ReaderContext,
    list: Option<ProcessList>,
    stack: Vec<CtfFrame>,
}

impl<'a> CtfReader<'a> {
    fn fail(&self, message: impl Into<String>) -> LutError {
        LutError::Parse {
            element: METADATA_PROCESS_LIST.to_string(),
            file: self.file.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn ignore(&self, tag: &str) -> CtfNode {
        warn!(file = self.file, line = self.line, "Ignoring unsupported element '{tag}'");
        CtfNode::Ignored
    }

    fn start_list(&mut self, tag: &str, attrs: &[(String, String)]) -> LutResult<CtfNode> {
        if tag != METADATA_PROCESS_LIST {
            return Err(self.fail(format!("'{tag}' is not a ProcessList")));
        }

        let count = |key: &str| attrs.iter().filter(|(k, _)| k.eq_ignore_ascii_case(key)).count();
        let (n_version, n_clf) = (count("version"), count("compCLFversion"));
        if n_version > 1 || n_clf > 1 {
            return Err(self.fail("'version' and 'compCLFversion' may each appear only once"));
        }
        if n_version == 1 && n_clf == 1 {
            return Err(self.fail("'compCLFversion' and 'Version' cannot both be present"));
        }

        let version = if let Some(raw) = find_attr(attrs, "compCLFversion") {
            let clf = CtfVersion::parse(raw).map_err(|e| self.fail(e.to_string()))?;
            CtfVersion::from_clf(clf).map_err(|e| self.fail(e.to_string()))?
        } else if let Some(raw) = find_attr(attrs, "version") {
            if self.ctx.format == ProcessListFormat::Clf {
                return Err(self.fail("CLF files must declare 'compCLFversion', not 'version'"));
            }
            let v = CtfVersion::parse(raw).map_err(|e| self.fail(e.to_string()))?;
            if v > CtfVersion::LATEST {
                return Err(self.fail(format!("Unsupported transform file version '{raw}' supplied.")));
            }
            v
        } else if self.ctx.format == ProcessListFormat::Clf {
            return Err(self.fail("Required attribute 'compCLFversion' is missing."));
        } else {
            CtfVersion::V1_2
        };
        self.ctx.version = version;

        if find_attr(attrs, "id").is_none() {
            return Err(self.fail("Required attribute 'id' is missing."));
        }

        let mut metadata = FormatMetadata::new();
        for (key, value) in attrs {
            if !key.eq_ignore_ascii_case("version")
                && !key.eq_ignore_ascii_case("compCLFversion")
                && key != "xmlns"
            {
                metadata.add_attribute(key, value.as_str())?;
            }
        }
        self.list = Some(ProcessList { metadata, version, nodes: Vec::new() });
        Ok(CtfNode::ProcessList)
    }

    fn depth(&self, tag: &str, attrs: &[(String, String)], key: &str) -> LutResult<BitDepth> {
        let raw = find_attr(attrs, key).ok_or_else(|| self.fail(format!("{tag}: {key} is missing.")))?;
        BitDepth::parse(raw).ok_or_else(|| self.fail(format!("{tag}: '{raw}' is not a valid {key}.")))
    }

    fn start_op(&mut self, tag: &str, kind: OpKind, attrs: &[(String, String)]) -> LutResult<CtfNode> {
        let in_depth = self.depth(tag, attrs, "inBitDepth")?;
        let out_depth = self.depth(tag, attrs, "outBitDepth")?;

        if let Some(prev) = self.ctx.previous_out_depth {
            if prev != in_depth {
                warn!(
                    file = self.file,
                    line = self.line,
                    "{tag} inBitDepth {} does not match previous outBitDepth {}",
                    in_depth.as_str(),
                    prev.as_str()
                );
            }
        }

        let mut op = PendingOp {
            kind,
            in_depth,
            out_depth,
            metadata: FormatMetadata::new(),
            cdl: CdlData::default(),
            array: None,
            range: RangeParams { clamp: true, ..Default::default() },
        };

        let style = find_attr(attrs, "style");
        match kind {
            OpKind::Cdl => {
                let style = style.ok_or_else(|| {
                    self.fail("CTF/CLF CDL parsing. Required attribute 'style' is missing.")
                })?;
                op.cdl.style = CdlStyle::from_name(style).map_err(|e| self.fail(e.to_string()))?;
            }
            OpKind::Range => match style {
                None => {}
                Some(s) if s.eq_ignore_ascii_case("clamp") => {}
                Some(s) if s.eq_ignore_ascii_case("noClamp") => {
                    if self.ctx.version < CtfVersion::V1_7 {
                        return Err(self.fail(format!(
                            "Range style 'noClamp' requires version 1.7 or newer, file is {}",
                            self.ctx.version
                        )));
                    }
                    op.range.clamp = false;
                }
                Some(s) => return Err(self.fail(format!("Unknown Range style '{s}'"))),
            },
            OpKind::Matrix => {}
        }

        let target = match kind {
            OpKind::Cdl => &mut op.cdl.metadata,
            _ => &mut op.metadata,
        };
        for (key, value) in attrs {
            let skip = ["inBitDepth", "outBitDepth", "style"].iter().any(|k| key.eq_ignore_ascii_case(k));
            if !skip {
                target.add_attribute(key, value.as_str())?;
            }
        }
        Ok(CtfNode::Op(Box::new(op)))
    }

    fn parent(&self) -> Parent {
        match self.stack.last().map(|f| &f.node) {
            None => Parent::Document,
            Some(CtfNode::ProcessList) => Parent::ProcessList,
            Some(CtfNode::Meta(..)) => Parent::Meta,
            Some(CtfNode::Op(op)) => Parent::Op(op.kind),
            Some(CtfNode::Sop) => Parent::Sop,
            Some(CtfNode::Sat) => Parent::Sat,
            Some(CtfNode::Array(..)) | Some(CtfNode::Value(..)) | Some(CtfNode::Ignored) => Parent::Ignored,
        }
    }

    fn meta_node(name: &str, attrs: &[(String, String)]) -> LutResult<CtfNode> {
        let mut meta = FormatMetadata::with_name(name)?;
        for (key, value) in attrs {
            meta.add_attribute(key, value.as_str())?;
        }
        Ok(CtfNode::Meta(meta, String::new()))
    }

    fn start(&mut self, tag: String, attrs: Vec<(String, String)>) -> LutResult<()> {
        let node = match self.parent() {
            Parent::Document => self.start_list(&tag, &attrs)?,
            Parent::Ignored => CtfNode::Ignored,
            Parent::Meta => Self::meta_node(&tag, &attrs)?,
            Parent::ProcessList => match tag.as_str() {
                METADATA_DESCRIPTION | METADATA_INPUT_DESCRIPTOR | METADATA_OUTPUT_DESCRIPTOR
                | METADATA_INFO => Self::meta_node(&tag, &attrs)?,
                TAG_MATRIX => self.start_op(&tag, OpKind::Matrix, &attrs)?,
                TAG_RANGE => self.start_op(&tag, OpKind::Range, &attrs)?,
                TAG_ASC_CDL => self.start_op(&tag, OpKind::Cdl, &attrs)?,
                _ => self.ignore(&tag),
            },
            Parent::Op(kind) => match (kind, tag.as_str()) {
                (_, METADATA_DESCRIPTION) => Self::meta_node(&tag, &attrs)?,
                (OpKind::Matrix, TAG_ARRAY) => {
                    let raw = find_attr(&attrs, "dim")
                        .ok_or_else(|| self.fail("Array: Required attribute 'dim' is missing."))?;
                    let dims = raw
                        .split_whitespace()
                        .map(|d| d.parse::<usize>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|_| self.fail(format!("Illegal array dimension '{raw}'")))?;
                    CtfNode::Array(dims, String::new())
                }
                (OpKind::Range, TAG_MIN_IN) => CtfNode::Value(ValueTag::MinIn, String::new()),
                (OpKind::Range, TAG_MAX_IN) => CtfNode::Value(ValueTag::MaxIn, String::new()),
                (OpKind::Range, TAG_MIN_OUT) => CtfNode::Value(ValueTag::MinOut, String::new()),
                (OpKind::Range, TAG_MAX_OUT) => CtfNode::Value(ValueTag::MaxOut, String::new()),
                (OpKind::Cdl, TAG_SOPNODE) => CtfNode::Sop,
                (OpKind::Cdl, TAG_SATNODE | TAG_SATNODE_ALT) => CtfNode::Sat,
                _ => self.ignore(&tag),
            },
            Parent::Sop => match tag.as_str() {
                TAG_SLOPE => CtfNode::Value(ValueTag::Slope, String::new()),
                TAG_OFFSET => CtfNode::Value(ValueTag::Offset, String::new()),
                TAG_POWER => CtfNode::Value(ValueTag::Power, String::new()),
                METADATA_DESCRIPTION => Self::meta_node(METADATA_SOP_DESCRIPTION, &[])?,
                _ => self.ignore(&tag),
            },
            Parent::Sat => match tag.as_str() {
                TAG_SATURATION => CtfNode::Value(ValueTag::Saturation, String::new()),
                METADATA_DESCRIPTION => Self::meta_node(METADATA_SAT_DESCRIPTION, &[])?,
                _ => self.ignore(&tag),
            },
        };
        self.stack.push(CtfFrame { tag, node });
        Ok(())
    }

    fn text(&mut self, s: &str) {
        if let Some(frame) = self.stack.last_mut() {
            match &mut frame.node {
                CtfNode::Meta(_, buf) | CtfNode::Array(_, buf) | CtfNode::Value(_, buf) => buf.push_str(s),
                _ => {}
            }
        }
    }

    fn current_op(&mut self) -> Option<&mut PendingOp> {
        self.stack.iter_mut().rev().find_map(|f| match &mut f.node {
            CtfNode::Op(op) => Some(op.as_mut()),
            _ => None,
        })
    }

    fn finish_meta(&mut self, mut meta: FormatMetadata, raw: &str) -> LutResult<()> {
        meta.set_value(unescape_xml(raw).trim());
        match self.parent() {
            Parent::Meta => {
                if let Some(CtfFrame { node: CtfNode::Meta(parent, _), .. }) = self.stack.last_mut() {
                    parent.add_child_node(meta);
                    return Ok(());
                }
            }
            Parent::ProcessList => {
                if let Some(list) = self.list.as_mut() {
                    list.metadata.add_child_node(meta);
                    return Ok(());
                }
            }
            _ => {
                if let Some(op) = self.current_op() {
                    match op.kind {
                        OpKind::Cdl => op.cdl.metadata.add_child_node(meta),
                        _ => op.metadata.add_child_node(meta),
                    }
                    return Ok(());
                }
            }
        }
        Err(self.fail("Internal CTF parsing error"))
    }

    fn finish_value(&mut self, tag: &str, value: ValueTag, raw: &str) -> LutResult<()> {
        let text = unescape_xml(raw);
        let values = parse_numbers(&text).map_err(|m| self.fail(m))?;
        let expected = match value {
            ValueTag::Slope | ValueTag::Offset | ValueTag::Power => 3,
            _ => 1,
        };
        if values.len() != expected {
            return Err(self.fail(format!(
                "{tag}: {expected} value(s) required, found {} in '{}'",
                values.len(),
                text.trim()
            )));
        }
        let internal = self.fail("Internal CTF parsing error");
        let op = self.current_op().ok_or(internal)?;
        let (in_scale, out_scale) = (op.in_depth.scale(), op.out_depth.scale());
        match value {
            ValueTag::MinIn => op.range.min_in = Some(values[0] / in_scale),
            ValueTag::MaxIn => op.range.max_in = Some(values[0] / in_scale),
            ValueTag::MinOut => op.range.min_out = Some(values[0] / out_scale),
            ValueTag::MaxOut => op.range.max_out = Some(values[0] / out_scale),
            ValueTag::Slope => op.cdl.slope = [values[0], values[1], values[2]],
            ValueTag::Offset => op.cdl.offset = [values[0], values[1], values[2]],
            ValueTag::Power => op.cdl.power = [values[0], values[1], values[2]],
            ValueTag::Saturation => op.cdl.saturation = values[0],
        }
        Ok(())
    }

    fn finish_array(&mut self, dims: Vec<usize>, raw: &str) -> LutResult<()> {
        let values = parse_numbers(raw).map_err(|m| self.fail(m))?;
        let (rows, cols) = match dims.as_slice() {
            [r, c] | [r, c, _] => (*r, *c),
            _ => return Err(self.fail(format!("Illegal Matrix dimensions {dims:?}"))),
        };
        if !matches!((rows, cols), (3, 3) | (3, 4) | (4, 4) | (4, 5)) {
            return Err(self.fail(format!("Illegal Matrix dimensions {rows}x{cols}")));
        }
        if values.len() != rows * cols {
            return Err(self.fail(format!(
                "Matrix: expected {} values, found {}",
                rows * cols,
                values.len()
            )));
        }
        let internal = self.fail("Internal CTF parsing error");
        let op = self.current_op().ok_or(internal)?;
        op.array = Some((vec![rows, cols], values));
        Ok(())
    }

    fn finish_op(&mut self, op: PendingOp) -> LutResult<()> {
        let (in_scale, out_scale) = (op.in_depth.scale(), op.out_depth.scale());
        let node_op = match op.kind {
            OpKind::Cdl => NodeOp::Cdl(op.cdl),
            OpKind::Range => NodeOp::Range { range: op.range, metadata: op.metadata },
            OpKind::Matrix => {
                let Some((dims, values)) = op.array else {
                    return Err(self.fail("Matrix: missing Array element"));
                };
                let (rows, cols) = (dims[0], dims[1]);
                let mut matrix = Mat4::IDENTITY;
                let mut offset = [0.0; 4];
                let gain = in_scale / out_scale;
                for r in 0..rows {
                    for c in 0..cols {
                        let v = values[r * cols + c];
                        if c < rows {
                            matrix.m[r * 4 + c] = v * gain;
                        } else {
                            offset[r] = v / out_scale;
                        }
                    }
                }
                NodeOp::Matrix { matrix, offset, metadata: op.metadata }
            }
        };

        let convert = matches!(&node_op, NodeOp::Range { range, .. } if !range.clamp);
        let internal = self.fail("Internal CTF parsing error");
        let list = self.list.as_mut().ok_or(internal)?;
        list.nodes.push(ProcessNode { in_depth: op.in_depth, out_depth: op.out_depth, op: node_op });
        self.ctx.previous_out_depth = Some(op.out_depth);

        if convert {
            self.replace_last_range()?;
        }
        Ok(())
    }

    /// Rewrites the unclamped Range just pushed as the equivalent Matrix.
    fn replace_last_range(&mut self) -> LutResult<()> {
        let converted = match self.list.as_ref().and_then(|l| l.nodes.last()).map(|n| &n.op) {
            Some(NodeOp::Range { range, metadata }) => range
                .to_matrix()
                .map(|(matrix, offset)| NodeOp::Matrix { matrix, offset, metadata: metadata.clone() }),
            _ => return Err(self.fail("Internal CTF parsing error: Range is not the last op")),
        };
        let op = converted.map_err(|e| match e {
            LutError::InvalidParameter(message) => self.fail(message),
            other => other,
        })?;
        if let Some(last) = self.list.as_mut().and_then(|l| l.nodes.last_mut()) {
            last.op = op;
        }
        debug!(file = self.file, "Range noClamp rewritten as Matrix");
        Ok(())
    }

    fn end(&mut self, tag: &str) -> LutResult<()> {
        let Some(frame) = self.stack.pop() else {
            return Err(self.fail(format!("XML parsing error (unbalanced element tags) at '{tag}'")));
        };
        if frame.tag != tag {
            return Err(self.fail(format!("XML parsing error (no closing tag for '{}')", frame.tag)));
        }
        match frame.node {
            CtfNode::Meta(meta, raw) => self.finish_meta(meta, &raw),
            CtfNode::Value(value, raw) => self.finish_value(tag, value, &raw),
            CtfNode::Array(dims, raw) => self.finish_array(dims, &raw),
            CtfNode::Op(op) => self.finish_op(*op),
            _ => Ok(()),
        }
    }
}

/// Parses a ProcessList from a string.
pub fn parse_ctf(text: &str, file: &str, format: ProcessListFormat) -> LutResult<ProcessList> {
    let mut xml = Reader::from_str(text);
    let mut lines = LineCounter::new(text);
    let mut reader = CtfReader {
        file,
        line: 0,
        ctx: ReaderContext { format, version: CtfVersion::default(), previous_out_depth: None },
        list: None,
        stack: Vec::new(),
    };

    loop {
        let event = xml.read_event();
        reader.line = lines.advance(xml.buffer_position() as usize);
        match event {
            Ok(Event::Start(ref e)) => {
                let attrs = read_attributes(e).map_err(|m| reader.fail(m))?;
                reader.start(tag_name(e), attrs)?;
            }
            Ok(Event::Empty(ref e)) => {
                let tag = tag_name(e);
                let attrs = read_attributes(e).map_err(|m| reader.fail(m))?;
                reader.start(tag.clone(), attrs)?;
                reader.end(&tag)?;
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                reader.end(&tag)?;
            }
            Ok(Event::Text(ref e)) => {
                let s = e.decode().map_err(|err| reader.fail(format!("XML parsing error: {err}")))?;
                reader.text(&s);
            }
            Ok(Event::GeneralRef(ref e)) => {
                let name = e.decode().map_err(|err| reader.fail(format!("XML parsing error: {err}")))?;
                reader.text(&format!("&{name};"));
            }
            Ok(Event::CData(ref e)) => {
                reader.text(&escape_xml(&String::from_utf8_lossy(e)));
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(reader.fail(format!("XML parsing error: {err}"))),
            _ => {}
        }
    }

    if let Some(frame) = reader.stack.last() {
        return Err(reader.fail(format!("CTF/CLF parsing error (no closing tag for '{}')", frame.tag)));
    }
    let list = reader.list.take().ok_or_else(|| reader.fail("Missing ProcessList element"))?;
    debug!(file, version = %list.version, nodes = list.nodes.len(), "Read ProcessList");
    Ok(list)
}

/// Reads a `.ctf` or `.clf` file; the extension picks the flavour.
pub fn read_ctf(path: &Path) -> LutResult<ProcessList> {
    let text = fs::read_to_string(path)?;
    parse_ctf(&text, &path.display().to_string(), ProcessListFormat::from_path(path))
}

// ============================================================================
// Writer
// ============================================================================

fn write_err(e: impl fmt::Display) -> LutError {
    LutError::ParseError(format!("write error: {e}"))
}

fn format_values(values: &[f64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Helper to write a text element.
fn write_text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> LutResult<()> {
    xml.write_event(Event::Start(BytesStart::new(name))).map_err(write_err)?;
    xml.write_event(Event::Text(BytesText::new(text))).map_err(write_err)?;
    xml.write_event(Event::End(BytesEnd::new(name))).map_err(write_err)?;
    Ok(())
}

/// Writes a metadata node under its own name, recursing into children.
fn write_metadata<W: Write>(xml: &mut Writer<W>, name: &str, meta: &FormatMetadata) -> LutResult<()> {
    let mut start = BytesStart::new(name);
    for (k, v) in meta.attributes() {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if meta.children().is_empty() {
        xml.write_event(Event::Start(start)).map_err(write_err)?;
        xml.write_event(Event::Text(BytesText::new(meta.value()))).map_err(write_err)?;
    } else {
        xml.write_event(Event::Start(start)).map_err(write_err)?;
        for child in meta.children() {
            write_metadata(xml, child.name(), child)?;
        }
    }
    xml.write_event(Event::End(BytesEnd::new(name))).map_err(write_err)?;
    Ok(())
}

/// Writes op-level descriptions; CDL SOP/SAT descriptions are handled by the caller.
fn write_op_descriptions<W: Write>(xml: &mut Writer<W>, meta: &FormatMetadata) -> LutResult<()> {
    for desc in meta.child_values(METADATA_DESCRIPTION) {
        write_text_element(xml, METADATA_DESCRIPTION, desc)?;
    }
    Ok(())
}

fn write_node<W: Write>(xml: &mut Writer<W>, node: &ProcessNode) -> LutResult<()> {
    let tag = node.tag();
    let mut start = BytesStart::new(tag);
    for (k, v) in node.metadata().attributes() {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    start.push_attribute(("inBitDepth", node.in_depth.as_str()));
    start.push_attribute(("outBitDepth", node.out_depth.as_str()));
    if let NodeOp::Cdl(cdl) = &node.op {
        start.push_attribute(("style", cdl.style.clf_name()));
    }
    if let NodeOp::Range { range, .. } = &node.op {
        if !range.clamp {
            start.push_attribute(("style", "noClamp"));
        }
    }
    xml.write_event(Event::Start(start)).map_err(write_err)?;
    write_op_descriptions(xml, node.metadata())?;

    let (in_scale, out_scale) = (node.in_depth.scale(), node.out_depth.scale());
    match &node.op {
        NodeOp::Matrix { matrix, offset, .. } => {
            let alpha_untouched = matrix.row(3) == [0.0, 0.0, 0.0, 1.0]
                && matrix.col(3) == [0.0, 0.0, 0.0, 1.0]
                && offset[3] == 0.0;
            let rows = if alpha_untouched { 3 } else { 4 };
            let has_offset = offset[..rows].iter().any(|v| *v != 0.0);
            let cols = rows + usize::from(has_offset);

            let gain = out_scale / in_scale;
            let mut values = Vec::with_capacity(rows * cols);
            for r in 0..rows {
                for c in 0..rows {
                    values.push(matrix.get(r, c) * gain);
                }
                if has_offset {
                    values.push(offset[r] * out_scale);
                }
            }

            let mut arr = BytesStart::new(TAG_ARRAY);
            arr.push_attribute(("dim", format!("{rows} {cols}").as_str()));
            xml.write_event(Event::Start(arr)).map_err(write_err)?;
            xml.write_event(Event::Text(BytesText::new(&format_values(&values)))).map_err(write_err)?;
            xml.write_event(Event::End(BytesEnd::new(TAG_ARRAY))).map_err(write_err)?;
        }
        NodeOp::Range { range, .. } => {
            let bounds = [
                (TAG_MIN_IN, range.min_in, in_scale),
                (TAG_MAX_IN, range.max_in, in_scale),
                (TAG_MIN_OUT, range.min_out, out_scale),
                (TAG_MAX_OUT, range.max_out, out_scale),
            ];
            for (name, value, scale) in bounds {
                if let Some(v) = value {
                    write_text_element(xml, name, &(v * scale).to_string())?;
                }
            }
        }
        NodeOp::Cdl(cdl) => {
            xml.write_event(Event::Start(BytesStart::new(TAG_SOPNODE))).map_err(write_err)?;
            for desc in cdl.metadata.child_values(METADATA_SOP_DESCRIPTION) {
                write_text_element(xml, METADATA_DESCRIPTION, desc)?;
            }
            write_text_element(xml, TAG_SLOPE, &format_values(&cdl.slope))?;
            write_text_element(xml, TAG_OFFSET, &format_values(&cdl.offset))?;
            write_text_element(xml, TAG_POWER, &format_values(&cdl.power))?;
            xml.write_event(Event::End(BytesEnd::new(TAG_SOPNODE))).map_err(write_err)?;

            xml.write_event(Event::Start(BytesStart::new(TAG_SATNODE))).map_err(write_err)?;
            for desc in cdl.metadata.child_values(METADATA_SAT_DESCRIPTION) {
                write_text_element(xml, METADATA_DESCRIPTION, desc)?;
            }
            write_text_element(xml, TAG_SATURATION, &cdl.saturation.to_string())?;
            xml.write_event(Event::End(BytesEnd::new(TAG_SATNODE))).map_err(write_err)?;
        }
    }

    xml.write_event(Event::End(BytesEnd::new(tag))).map_err(write_err)?;
    Ok(())
}

/// Writes a ProcessList to any writer.
///
/// Version 2.0 lists are written as CLF 3.0, older ones as CTF with their
/// own version. A no-clamp CDL below 2.0 fails with a version mismatch.
pub fn write_ctf_to<W: Write>(writer: W, list: &ProcessList) -> LutResult<()> {
    for node in &list.nodes {
        if let NodeOp::Cdl(cdl) = &node.op {
            cdl.validate_for_version(&list.version)?;
        }
    }

    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None))).map_err(write_err)?;

    let mut start = BytesStart::new(METADATA_PROCESS_LIST);
    for (k, v) in list.metadata.attributes() {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if list.version >= CtfVersion::V2_0 {
        start.push_attribute(("compCLFversion", CLF_VERSION));
    } else {
        start.push_attribute(("version", list.version.to_string().as_str()));
    }
    xml.write_event(Event::Start(start)).map_err(write_err)?;

    for child in list.metadata.children() {
        write_metadata(&mut xml, child.name(), child)?;
    }
    for node in &list.nodes {
        write_node(&mut xml, node)?;
    }

    xml.write_event(Event::End(BytesEnd::new(METADATA_PROCESS_LIST))).map_err(write_err)?;
    xml.into_inner().flush()?;
    Ok(())
}

/// Writes a ProcessList file to disk.
pub fn write_ctf(path: &Path, list: &ProcessList) -> LutResult<()> {
    let file = fs::File::create(path)?;
    write_ctf_to(BufWriter::new(file), list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> LutResult<ProcessList> {
        parse_ctf(text, "test.ctf", ProcessListFormat::Ctf)
    }

    #[test]
    fn version_grammar() {
        assert_eq!(CtfVersion::parse("2").unwrap(), CtfVersion::new(2, 0, 0));
        assert_eq!(CtfVersion::parse("1.2.3").unwrap(), CtfVersion::new(1, 2, 3));
        assert_eq!(CtfVersion::parse("001.010").unwrap(), CtfVersion::new(1, 10, 0));
        for bad in ["", "1.", ".1", "1..2", "1.2.3.4", "1 2", "a.b", "-1"] {
            let err = CtfVersion::parse(bad).unwrap_err();
            assert!(err.to_string().contains("Expecting MAJOR[.MINOR[.REVISION]]"), "{bad}");
        }
    }

    #[test]
    fn version_order_and_display() {
        assert!(CtfVersion::new(1, 2, 3) < CtfVersion::new(1, 3, 0));
        assert!(CtfVersion::V2_0 > CtfVersion::V1_8);
        assert_eq!(CtfVersion::V1_7.to_string(), "1.7");
        assert_eq!(CtfVersion::new(1, 2, 3).to_string(), "1.2.3");
        assert_eq!("1.5".parse::<CtfVersion>().unwrap(), CtfVersion::V1_5);
    }

    #[test]
    fn version_with_minor() {
        assert_eq!(CtfVersion::V1_2.with_minor(8).unwrap(), CtfVersion::V1_8);
        assert!(matches!(CtfVersion::V1_2.with_minor(9), Err(LutError::VersionMismatch(_))));
        assert!(CtfVersion::V2_0.with_minor(1).is_err());
        assert!(CtfVersion::new(3, 0, 0).with_minor(0).is_err());
    }

    #[test]
    fn clf_version_mapping() {
        let read = |v: &str| {
            let text = format!("<ProcessList id=\"x\" compCLFversion=\"{v}\"/>");
            parse_ctf(&text, "x.clf", ProcessListFormat::Clf).map(|pl| pl.version)
        };
        assert_eq!(read("3.0").unwrap(), CtfVersion::V2_0);
        assert_eq!(read("2.0").unwrap(), CtfVersion::V1_7);
        assert_eq!(read("1.2").unwrap(), CtfVersion::V1_7);
        assert!(read("4").is_err());
    }

    #[test]
    fn header_rules() {
        assert_eq!(parse("<ProcessList id=\"a\"/>").unwrap().version, CtfVersion::V1_2);

        let err = parse("<ProcessList version=\"1.3\"/>").unwrap_err();
        assert!(err.to_string().contains("'id' is missing"));

        let err = parse("<ProcessList id=\"a\" version=\"2.1\"/>").unwrap_err();
        assert!(err.to_string().contains("Unsupported transform file version '2.1' supplied."));

        let err = parse("<ProcessList id=\"a\" version=\"1.3\" compCLFversion=\"3\"/>").unwrap_err();
        assert!(err.to_string().contains("cannot both be present"));

        let err = parse_ctf("<ProcessList id=\"a\"/>", "a.clf", ProcessListFormat::Clf).unwrap_err();
        assert!(err.to_string().contains("compCLFversion"));
    }

    #[test]
    fn metadata_kept() {
        let text = r#"<ProcessList id="pl" name="grade" version="1.7">
  <Description>first</Description>
  <Description>second</Description>
  <InputDescriptor>ACEScct</InputDescriptor>
  <Info version="2.0"><Release>2015</Release></Info>
</ProcessList>"#;
        let pl = parse(text).unwrap();
        assert_eq!(pl.id(), "pl");
        assert_eq!(pl.metadata.node_name(), "grade");
        assert_eq!(pl.description(), "first");
        assert_eq!(pl.metadata.children().len(), 4);
        let info = pl.metadata.first_child("Info").unwrap();
        assert_eq!(info.to_string(), "<Info version=\"2.0\"><Release>2015</Release></Info>");
    }

    #[test]
    fn bit_depth_required() {
        let text = r#"<ProcessList id="a" version="1.7">
  <Matrix outBitDepth="32f"><Array dim="3 3">1 0 0 0 1 0 0 0 1</Array></Matrix>
</ProcessList>"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("inBitDepth is missing."));
        assert!(err.to_string().ends_with("At line (2)"));
        assert_eq!(BitDepth::parse("16F"), Some(BitDepth::Float16));
        assert_eq!(BitDepth::parse("7i"), None);
    }

    #[test]
    fn matrix_normalized() {
        let text = r#"<ProcessList id="a" version="1.7">
  <Matrix inBitDepth="10i" outBitDepth="12i">
    <Array dim="3 4">
      2 0 0 4095
      0 1 0 0
      0 0 1 0
    </Array>
  </Matrix>
</ProcessList>"#;
        let pl = parse(text).unwrap();
        let NodeOp::Matrix { matrix, offset, .. } = &pl.nodes[0].op else {
            panic!("expected matrix");
        };
        assert_relative_eq!(matrix.get(0, 0), 2.0 * 1023.0 / 4095.0);
        assert_relative_eq!(offset[0], 1.0);
        assert_eq!(matrix.row(3), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn cdl_requires_style() {
        let text = r#"<ProcessList id="a" version="1.7">
  <ASC_CDL inBitDepth="32f" outBitDepth="32f"/>
</ProcessList>"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("CTF/CLF CDL parsing. Required attribute 'style' is missing."));
    }

    #[test]
    fn cdl_node() {
        let text = r#"<ProcessList id="a" version="2">
  <ASC_CDL id="cc" inBitDepth="32f" outBitDepth="32f" style="noClampRev">
    <Description>look</Description>
    <SOPNode>
      <Description>sop</Description>
      <Slope>1.1 1 0.9</Slope>
      <Offset>0 0.01 0</Offset>
      <Power>1 1 1.2</Power>
    </SOPNode>
    <SATNode><Saturation>1.3</Saturation></SATNode>
  </ASC_CDL>
</ProcessList>"#;
        let pl = parse(text).unwrap();
        let NodeOp::Cdl(cdl) = &pl.nodes[0].op else {
            panic!("expected cdl");
        };
        assert_eq!(cdl.id(), "cc");
        assert_eq!(cdl.style, CdlStyle::NoClampRev);
        assert_eq!(cdl.slope, [1.1, 1.0, 0.9]);
        assert_eq!(cdl.saturation, 1.3);
        assert_eq!(cdl.first_sop_description(), "sop");
        assert_eq!(cdl.descriptions().collect::<Vec<_>>(), ["look"]);
    }

    #[test]
    fn range_no_clamp_becomes_matrix() {
        let text = r#"<ProcessList id="a" version="1.7">
  <Range inBitDepth="32f" outBitDepth="32f" style="noClamp">
    <minInValue>0.1</minInValue>
    <maxInValue>0.9</maxInValue>
    <minOutValue>0</minOutValue>
    <maxOutValue>1</maxOutValue>
  </Range>
</ProcessList>"#;
        let pl = parse(text).unwrap();
        assert_eq!(pl.nodes.len(), 1);
        let NodeOp::Matrix { matrix, offset, .. } = &pl.nodes[0].op else {
            panic!("expected matrix");
        };
        let scale = 1.0 / 0.8;
        assert_relative_eq!(matrix[0], scale);
        assert_relative_eq!(matrix[5], scale);
        assert_relative_eq!(matrix[10], scale);
        assert_eq!(matrix[15], 1.0);
        assert_relative_eq!(offset[0], -0.1 * scale);
        assert_eq!(offset[3], 0.0);
    }

    #[test]
    fn range_no_clamp_needs_bounds() {
        let text = r#"<ProcessList id="a" version="1.7">
  <Range inBitDepth="32f" outBitDepth="32f" style="noclamp">
    <minInValue>0.1</minInValue>
  </Range>
</ProcessList>"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("Non-clamping Range min & max values have to be set."));

        let degenerate = RangeParams {
            min_in: Some(0.5),
            max_in: Some(0.5),
            min_out: Some(0.0),
            max_out: Some(1.0),
            clamp: false,
        };
        assert!(degenerate.to_matrix().unwrap_err().to_string().contains("too close"));
    }

    #[test]
    fn range_clamp_kept() {
        let text = r#"<ProcessList id="a" version="1.7">
  <Range inBitDepth="8i" outBitDepth="32f">
    <minInValue>0</minInValue>
    <maxInValue>255</maxInValue>
    <minOutValue>0</minOutValue>
    <maxOutValue>1</maxOutValue>
  </Range>
  <Range inBitDepth="16f" outBitDepth="32f"><minInValue>0</minInValue><minOutValue>0</minOutValue></Range>
</ProcessList>"#;
        let pl = parse(text).unwrap();
        let NodeOp::Range { range, .. } = &pl.nodes[0].op else {
            panic!("expected range");
        };
        assert_eq!(range.max_in, Some(1.0));
        assert!(range.clamp);
    }

    #[test]
    fn unknown_ops_skipped() {
        let text = r#"<ProcessList id="a" version="1.7">
  <LUT1D inBitDepth="32f" outBitDepth="32f"><Array dim="2 1">0 1</Array></LUT1D>
  <Matrix inBitDepth="32f" outBitDepth="32f"><Array dim="3 3">1 0 0 0 1 0 0 0 1</Array></Matrix>
</ProcessList>"#;
        let pl = parse(text).unwrap();
        assert_eq!(pl.nodes.len(), 1);
        assert_eq!(pl.nodes[0].tag(), "Matrix");
    }

    #[test]
    fn write_then_read() {
        let mut pl = ProcessList::new("grade");
        pl.metadata.add_child(METADATA_DESCRIPTION, "a & b").unwrap();
        let mut cdl = CdlData::new([1.5, 1.0, 0.5], [0.1, 0.0, -0.1], [1.0, 2.0, 1.0], 0.8);
        cdl.set_id("cc1");
        cdl.metadata.add_child(METADATA_SAT_DESCRIPTION, "sat").unwrap();
        pl.nodes.push(ProcessNode::new(NodeOp::Cdl(cdl)));
        pl.nodes.push(ProcessNode::new(NodeOp::Matrix {
            matrix: Mat4::saturation(0.5, [0.2126, 0.7152, 0.0722]),
            offset: [0.1, 0.2, 0.3, 0.0],
            metadata: FormatMetadata::new(),
        }));
        pl.nodes.push(ProcessNode::new(NodeOp::Range {
            range: RangeParams::clamp(0.0, 1.0),
            metadata: FormatMetadata::new(),
        }));

        let mut out = Vec::new();
        write_ctf_to(&mut out, &pl).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("compCLFversion=\"3.0\""));
        assert!(text.contains("style=\"FwdNoClamp\""));

        let again = parse_ctf(&text, "x.clf", ProcessListFormat::Clf).unwrap();
        assert_eq!(again, pl);
    }

    #[test]
    fn no_clamp_needs_v2() {
        let mut pl = ProcessList::new("old");
        pl.version = CtfVersion::V1_7;
        pl.nodes.push(ProcessNode::new(NodeOp::Cdl(CdlData::default())));
        let err = write_ctf_to(Vec::new(), &pl).unwrap_err();
        assert!(matches!(err, LutError::VersionMismatch(_)));

        pl.nodes[0].op = NodeOp::Cdl(CdlData::default().with_style(CdlStyle::AscFwd));
        let mut out = Vec::new();
        write_ctf_to(&mut out, &pl).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("version=\"1.7\""));
    }

    #[test]
    fn luma_attribute() {
        let pl = parse("<ProcessList id=\"a\" luma=\"0.3 0.6 0.1\"/>").unwrap();
        assert_eq!(pl.luma(), Some([0.3, 0.6, 0.1]));
        assert_eq!(ProcessList::new("b").luma(), None);
    }
}
