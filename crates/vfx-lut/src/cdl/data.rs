//! CDL data structures.

use std::fmt;

use crate::ctf::CtfVersion;
use crate::metadata::{
    FormatMetadata, METADATA_DESCRIPTION, METADATA_SAT_DESCRIPTION, METADATA_SOP_DESCRIPTION,
};
use crate::{LutError, LutResult};

// ============================================================================
// Style
// ============================================================================

/// Evaluation style of a CDL.
///
/// ASC styles follow the v1.2 formula with clamps to [0, 1]; the no-clamp
/// styles leave values unbounded and use a mirrored power for negatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CdlStyle {
    /// ASC v1.2 forward.
    AscFwd,
    /// ASC v1.2 reverse.
    AscRev,
    /// Unclamped forward.
    #[default]
    NoClamp,
    /// Unclamped reverse.
    NoClampRev,
}

/// Style family, independent of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CdlStyleFamily {
    /// ASC v1.2, clamped.
    Asc,
    /// Unclamped.
    #[default]
    NoClamp,
}

impl CdlStyle {
    /// All styles.
    pub const ALL: [CdlStyle; 4] = [Self::AscFwd, Self::AscRev, Self::NoClamp, Self::NoClampRev];

    /// Builds a style from family and direction.
    pub fn from_family(family: CdlStyleFamily, forward: bool) -> Self {
        match (family, forward) {
            (CdlStyleFamily::Asc, true) => Self::AscFwd,
            (CdlStyleFamily::Asc, false) => Self::AscRev,
            (CdlStyleFamily::NoClamp, true) => Self::NoClamp,
            (CdlStyleFamily::NoClamp, false) => Self::NoClampRev,
        }
    }

    /// Family of this style.
    pub fn family(self) -> CdlStyleFamily {
        match self {
            Self::AscFwd | Self::AscRev => CdlStyleFamily::Asc,
            Self::NoClamp | Self::NoClampRev => CdlStyleFamily::NoClamp,
        }
    }

    /// Name used by CTF files.
    pub fn ctf_name(self) -> &'static str {
        match self {
            Self::AscFwd => "v1.2_Fwd",
            Self::AscRev => "v1.2_Rev",
            Self::NoClamp => "noClampFwd",
            Self::NoClampRev => "noClampRev",
        }
    }

    /// Name used by CLF files. This is what gets written.
    pub fn clf_name(self) -> &'static str {
        match self {
            Self::AscFwd => "Fwd",
            Self::AscRev => "Rev",
            Self::NoClamp => "FwdNoClamp",
            Self::NoClampRev => "RevNoClamp",
        }
    }

    /// Parses either the CTF or the CLF name, ignoring ASCII case.
    ///
    /// ```rust
    /// use vfx_lut::cdl::CdlStyle;
    ///
    /// assert_eq!(CdlStyle::from_name("fwdnoclamp").unwrap(), CdlStyle::NoClamp);
    /// assert_eq!(CdlStyle::from_name("v1.2_Rev").unwrap(), CdlStyle::AscRev);
    /// assert!(CdlStyle::from_name("sideways").is_err());
    /// ```
    pub fn from_name(name: &str) -> LutResult<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.ctf_name().eq_ignore_ascii_case(name) || s.clf_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| LutError::ParseError(format!("Unknown style for CDL: '{name}'")))
    }

    /// True for forward styles.
    #[inline]
    pub fn is_forward(self) -> bool {
        matches!(self, Self::AscFwd | Self::NoClamp)
    }

    /// True for ASC styles, which clamp to [0, 1].
    #[inline]
    pub fn is_clamping(self) -> bool {
        self.family() == CdlStyleFamily::Asc
    }

    /// Same family, opposite direction.
    pub fn inverse(self) -> Self {
        Self::from_family(self.family(), !self.is_forward())
    }
}

impl fmt::Display for CdlStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clf_name())
    }
}

// ============================================================================
// CdlData
// ============================================================================

/// One ASC color correction: slope, offset, power, saturation.
///
/// The correction id lives in the `id` attribute of [`CdlData::metadata`];
/// descriptions are children of the same tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CdlData {
    /// Slope per channel.
    pub slope: [f64; 3],
    /// Offset per channel.
    pub offset: [f64; 3],
    /// Power per channel.
    pub power: [f64; 3],
    /// Saturation.
    pub saturation: f64,
    /// Evaluation style.
    pub style: CdlStyle,
    /// Id and descriptions.
    pub metadata: FormatMetadata,
}

impl Default for CdlData {
    fn default() -> Self {
        Self {
            slope: [1.0; 3],
            offset: [0.0; 3],
            power: [1.0; 3],
            saturation: 1.0,
            style: CdlStyle::default(),
            metadata: FormatMetadata::new(),
        }
    }
}

fn triple(name: &str, values: &[f64]) -> LutResult<[f64; 3]> {
    <[f64; 3]>::try_from(values).map_err(|_| {
        LutError::InvalidParameter(format!(
            "CDL {name} expects 3 values, got {}",
            values.len()
        ))
    })
}

impl CdlData {
    /// Creates a correction with the given parameters and the default style.
    pub fn new(slope: [f64; 3], offset: [f64; 3], power: [f64; 3], saturation: f64) -> Self {
        Self { slope, offset, power, saturation, ..Default::default() }
    }

    /// Builder-style style setter.
    pub fn with_style(mut self, style: CdlStyle) -> Self {
        self.style = style;
        self
    }

    /// Correction id, `""` when unset.
    pub fn id(&self) -> &str {
        self.metadata.id()
    }

    /// Sets the correction id.
    pub fn set_id(&mut self, id: &str) {
        self.metadata.set_id(id);
    }

    /// Sets the slope from a slice of exactly 3 values.
    pub fn set_slope_slice(&mut self, v: &[f64]) -> LutResult<()> {
        self.slope = triple("slope", v)?;
        Ok(())
    }

    /// Sets the offset from a slice of exactly 3 values.
    pub fn set_offset_slice(&mut self, v: &[f64]) -> LutResult<()> {
        self.offset = triple("offset", v)?;
        Ok(())
    }

    /// Sets the power from a slice of exactly 3 values.
    pub fn set_power_slice(&mut self, v: &[f64]) -> LutResult<()> {
        self.power = triple("power", v)?;
        Ok(())
    }

    /// Slope, offset and power as 9 values.
    pub fn sop(&self) -> [f64; 9] {
        let mut out = [0.0; 9];
        out[..3].copy_from_slice(&self.slope);
        out[3..6].copy_from_slice(&self.offset);
        out[6..].copy_from_slice(&self.power);
        out
    }

    /// Sets slope, offset and power from 9 values.
    pub fn set_sop(&mut self, sop: &[f64; 9]) {
        self.slope.copy_from_slice(&sop[..3]);
        self.offset.copy_from_slice(&sop[3..6]);
        self.power.copy_from_slice(&sop[6..]);
    }

    /// Correction-level descriptions in file order.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.metadata.child_values(METADATA_DESCRIPTION)
    }

    /// First description found inside the SOPNode, `""` if none.
    pub fn first_sop_description(&self) -> &str {
        self.metadata
            .first_child(METADATA_SOP_DESCRIPTION)
            .map(|m| m.value())
            .unwrap_or("")
    }

    /// First description found inside the SatNode, `""` if none.
    pub fn first_sat_description(&self) -> &str {
        self.metadata
            .first_child(METADATA_SAT_DESCRIPTION)
            .map(|m| m.value())
            .unwrap_or("")
    }

    /// True when the parameters leave RGB unchanged (before clamping).
    pub fn is_identity(&self) -> bool {
        self.slope == [1.0; 3] && self.offset == [0.0; 3] && self.power == [1.0; 3] && self.saturation == 1.0
    }

    /// True when evaluation does nothing at all.
    pub fn is_no_op(&self) -> bool {
        self.is_identity() && self.style == CdlStyle::NoClamp
    }

    /// Same parameters, opposite direction.
    pub fn inverse(&self) -> Self {
        let mut inv = self.clone();
        inv.style = self.style.inverse();
        inv
    }

    /// Checks the parameters are usable for this style.
    ///
    /// All values must be finite; ASC styles also need non-negative
    /// slope, power and saturation.
    pub fn validate(&self) -> LutResult<()> {
        let fields = [("slope", &self.slope), ("offset", &self.offset), ("power", &self.power)];
        for (name, values) in fields {
            for (ch, v) in values.iter().enumerate() {
                if !v.is_finite() {
                    return Err(LutError::InvalidParameter(format!(
                        "CDL {name}[{ch}] must be finite, got {v}"
                    )));
                }
            }
        }
        if !self.saturation.is_finite() {
            return Err(LutError::InvalidParameter(format!(
                "CDL saturation must be finite, got {}",
                self.saturation
            )));
        }

        if self.style.is_clamping() {
            for (name, values) in [("slope", &self.slope), ("power", &self.power)] {
                if let Some((ch, v)) = values.iter().enumerate().find(|(_, v)| **v < 0.0) {
                    return Err(LutError::InvalidParameter(format!(
                        "CDL {name}[{ch}] must be >= 0 for style {}, got {v}",
                        self.style
                    )));
                }
            }
            if self.saturation < 0.0 {
                return Err(LutError::InvalidParameter(format!(
                    "CDL saturation must be >= 0 for style {}, got {}",
                    self.style, self.saturation
                )));
            }
        }
        Ok(())
    }

    /// Checks the style can be written in a file of the given version.
    pub fn validate_for_version(&self, version: &CtfVersion) -> LutResult<()> {
        if !self.style.is_clamping() && *version < CtfVersion::V2_0 {
            return Err(LutError::VersionMismatch(format!(
                "CDL style '{}' requires file format version 2.0 or newer, got {version}",
                self.style.clf_name()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Collection
// ============================================================================

/// Top-level element a collection was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CdlFormat {
    /// Single `<ColorCorrection>`.
    Cc,
    /// `<ColorCorrectionCollection>`.
    #[default]
    Ccc,
    /// `<ColorDecisionList>`.
    Cdl,
}

impl CdlFormat {
    /// Root element name.
    pub fn root_tag(self) -> &'static str {
        match self {
            Self::Cc => super::TAG_COLOR_CORRECTION,
            Self::Ccc => super::TAG_COLOR_CORRECTION_COLLECTION,
            Self::Cdl => super::TAG_COLOR_DECISION_LIST,
        }
    }
}

/// Ordered corrections read from one file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CdlCollection {
    /// Where the corrections came from.
    pub format: CdlFormat,
    /// Collection-level descriptions.
    pub metadata: FormatMetadata,
    /// Corrections in file order.
    pub corrections: Vec<CdlData>,
}

impl CdlCollection {
    /// Number of corrections.
    #[inline]
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    /// True when there are no corrections.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    /// Finds a correction by exact id.
    pub fn find_by_id(&self, id: &str) -> LutResult<&CdlData> {
        if !id.is_empty() {
            if let Some(cdl) = self.corrections.iter().find(|c| c.id() == id) {
                return Ok(cdl);
            }
        }
        Err(LutError::NotFound(format!(
            "The specified cccid '{id}' could not be loaded from the file"
        )))
    }

    /// Finds a correction by 0-based position.
    pub fn find_by_index(&self, index: usize) -> LutResult<&CdlData> {
        if self.corrections.is_empty() {
            return Err(LutError::NotFound("The file holds no color corrections".into()));
        }
        self.corrections
            .get(index)
            .ok_or(LutError::OutOfRange { index, len: self.corrections.len() })
    }

    /// Resolves a selector: empty picks the first correction, otherwise
    /// an id match wins over an integer index.
    ///
    /// ```rust
    /// use vfx_lut::cdl::{CdlCollection, CdlData};
    ///
    /// let mut a = CdlData::default();
    /// a.set_id("1");
    /// let b = CdlData::default();
    /// let coll = CdlCollection { corrections: vec![b, a], ..Default::default() };
    ///
    /// // "1" is an id here, so it does not mean index 1
    /// assert_eq!(coll.select("1").unwrap().id(), "1");
    /// assert_eq!(coll.select("0").unwrap().id(), "");
    /// ```
    pub fn select(&self, selector: &str) -> LutResult<&CdlData> {
        if self.corrections.is_empty() {
            return Err(LutError::NotFound("The file holds no color corrections".into()));
        }
        let selector = selector.trim();
        if selector.is_empty() {
            return Ok(&self.corrections[0]);
        }
        if let Ok(cdl) = self.find_by_id(selector) {
            return Ok(cdl);
        }
        match selector.parse::<usize>() {
            Ok(index) => self.find_by_index(index),
            Err(_) if selector.bytes().all(|b| b.is_ascii_digit()) => Err(LutError::OutOfRange {
                index: usize::MAX,
                len: self.corrections.len(),
            }),
            Err(_) => Err(LutError::NotFound(format!(
                "The specified cccid/cccindex '{selector}' could not be loaded from the file"
            ))),
        }
    }
}
