//! CDL transform: an ASC color correction as used in a config.
//!
//! A [`CdlTransform`] holds the grade numbers and descriptions, a style
//! family (ASC or no-clamp) and a direction. Loading goes through the
//! process-wide file cache, compiling goes through [`build_cdl_ops`].
//!
//! # Example
//!
//! ```rust
//! use vfx_ocio::{CdlTransform, Config, ConfigVersion};
//!
//! let mut cdl = CdlTransform::new();
//! cdl.set_slope([1.1, 1.0, 0.9]);
//! cdl.set_sat(1.2);
//!
//! let ops = cdl.build_ops(Some(&Config::with_version(ConfigVersion::V2))).unwrap();
//! assert_eq!(ops.len(), 1);
//!
//! let mut rgba = vec![0.5, 0.5, 0.5, 1.0];
//! ops.apply_rgba(&mut rgba);
//! ```

use std::path::Path;

use tracing::debug;
use vfx_lut::cdl::{parse_str, to_cc_string, MEMORY_SOURCE};
use vfx_lut::metadata::{FormatMetadata, METADATA_SOP_DESCRIPTION};
use vfx_lut::{CdlData, CdlFormat, CdlStyle, CdlStyleFamily, LutError};
use vfx_ops::cdl::{create_cdl_ops, create_legacy_cdl_ops, DEFAULT_LUMA};
use vfx_ops::{OpList, TransformDirection};

use crate::cache::load_collection;
use crate::config::{Config, ConfigVersion};
use crate::error::OcioResult;

/// Absolute tolerance used by [`CdlTransform::equals`].
pub const EQUALS_TOLERANCE: f64 = 1e-9;

/// ASC CDL transform.
#[derive(Debug, Clone, PartialEq)]
pub struct CdlTransform {
    data: CdlData,
    family: CdlStyleFamily,
    direction: TransformDirection,
}

impl Default for CdlTransform {
    fn default() -> Self {
        Self::from_data(CdlData::default())
    }
}

impl CdlTransform {
    /// Identity transform, no-clamp style, forward.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps parsed data. A reverse style becomes an inverse direction.
    pub fn from_data(data: CdlData) -> Self {
        let family = data.style.family();
        let direction = if data.style.is_forward() {
            TransformDirection::Forward
        } else {
            TransformDirection::Inverse
        };
        Self { data: data.with_style(CdlStyle::from_family(family, true)), family, direction }
    }

    /// Loads one correction from a `.cc`, `.ccc` or `.cdl` file.
    ///
    /// `selector` is an id or a 0-based index; empty picks the first entry.
    /// A `.cc` file holds a single correction and ignores the selector.
    pub fn create_from_file(path: impl AsRef<Path>, selector: &str) -> OcioResult<Self> {
        let path = path.as_ref();
        let collection = load_collection(path)?;
        let cdl = match collection.format {
            CdlFormat::Cc => collection.select("")?,
            CdlFormat::Ccc | CdlFormat::Cdl => collection.select(selector)?,
        };
        debug!(path = %path.display(), selector, id = cdl.id(), "Loaded CDL");
        Ok(Self::from_data(cdl.clone()))
    }

    /// Loads every correction of a file, in file order.
    pub fn create_group_from_file(path: impl AsRef<Path>) -> OcioResult<Vec<Self>> {
        let collection = load_collection(path.as_ref())?;
        Ok(collection.corrections.iter().cloned().map(Self::from_data).collect())
    }

    /// Serializes to a `<ColorCorrection>` element.
    pub fn xml(&self) -> OcioResult<String> {
        Ok(to_cc_string(&self.data)?)
    }

    /// Replaces numbers, id and descriptions from a `<ColorCorrection>` element.
    ///
    /// Style family and direction are kept.
    pub fn set_xml(&mut self, xml: &str) -> OcioResult<()> {
        let collection = parse_str(xml, MEMORY_SOURCE)?;
        if collection.format != CdlFormat::Cc {
            return Err(LutError::ParseError(
                "SetXML could not parse the XML, it has to be a single ColorCorrection".into(),
            )
            .into());
        }
        let Some(cdl) = collection.corrections.into_iter().next() else {
            return Err(LutError::ParseError("SetXML found no ColorCorrection".into()).into());
        };
        self.data = cdl.with_style(CdlStyle::from_family(self.family, true));
        Ok(())
    }

    /// Appends this transform's ops to `ops`; see [`build_cdl_ops`].
    pub fn build_ops(&self, config: Option<&Config>) -> OcioResult<OpList> {
        let mut ops = OpList::new();
        build_cdl_ops(&mut ops, config, self, TransformDirection::Forward)?;
        ops.finalize();
        Ok(ops)
    }

    /// Checks the numbers against the style.
    pub fn validate(&self) -> OcioResult<()> {
        Ok(self.to_data().validate()?)
    }

    /// True when style, direction and numbers match within [`EQUALS_TOLERANCE`].
    pub fn equals(&self, other: &Self) -> bool {
        fn close(a: &[f64], b: &[f64]) -> bool {
            a.iter().zip(b).all(|(x, y)| (x - y).abs() <= EQUALS_TOLERANCE)
        }
        self.family == other.family
            && self.direction == other.direction
            && close(&self.data.sop(), &other.data.sop())
            && close(&[self.data.saturation], &[other.data.saturation])
    }

    /// Resolved style: family plus direction.
    pub fn style(&self) -> CdlStyle {
        CdlStyle::from_family(self.family, self.direction == TransformDirection::Forward)
    }

    /// Style family.
    #[inline]
    pub fn style_family(&self) -> CdlStyleFamily {
        self.family
    }

    /// Sets the style family.
    pub fn set_style_family(&mut self, family: CdlStyleFamily) {
        self.family = family;
        self.data.style = CdlStyle::from_family(family, true);
    }

    /// Direction.
    #[inline]
    pub fn direction(&self) -> TransformDirection {
        self.direction
    }

    /// Sets the direction.
    pub fn set_direction(&mut self, direction: TransformDirection) {
        self.direction = direction;
    }

    /// Correction id.
    pub fn id(&self) -> &str {
        self.data.id()
    }

    /// Sets the correction id.
    pub fn set_id(&mut self, id: &str) {
        self.data.set_id(id);
    }

    /// First SOP description, `""` when none.
    pub fn description(&self) -> &str {
        self.data.first_sop_description()
    }

    /// Replaces the SOP descriptions with one entry.
    pub fn set_description(&mut self, description: &str) -> OcioResult<()> {
        let meta = &mut self.data.metadata;
        meta.children_mut().retain(|c| c.name() != METADATA_SOP_DESCRIPTION);
        if !description.is_empty() {
            meta.add_child(METADATA_SOP_DESCRIPTION, description)?;
        }
        Ok(())
    }

    /// First SAT description, `""` when none.
    pub fn sat_description(&self) -> &str {
        self.data.first_sat_description()
    }

    /// Id and descriptions.
    pub fn format_metadata(&self) -> &FormatMetadata {
        &self.data.metadata
    }

    /// Mutable id and descriptions.
    pub fn format_metadata_mut(&mut self) -> &mut FormatMetadata {
        &mut self.data.metadata
    }

    /// Slope.
    pub fn slope(&self) -> [f64; 3] {
        self.data.slope
    }

    /// Sets the slope.
    pub fn set_slope(&mut self, slope: [f64; 3]) {
        self.data.slope = slope;
    }

    /// Offset.
    pub fn offset(&self) -> [f64; 3] {
        self.data.offset
    }

    /// Sets the offset.
    pub fn set_offset(&mut self, offset: [f64; 3]) {
        self.data.offset = offset;
    }

    /// Power.
    pub fn power(&self) -> [f64; 3] {
        self.data.power
    }

    /// Sets the power.
    pub fn set_power(&mut self, power: [f64; 3]) {
        self.data.power = power;
    }

    /// Slope, offset and power as 9 values.
    pub fn sop(&self) -> [f64; 9] {
        self.data.sop()
    }

    /// Sets slope, offset and power from 9 values.
    pub fn set_sop(&mut self, sop: &[f64; 9]) {
        self.data.set_sop(sop);
    }

    /// Saturation.
    pub fn sat(&self) -> f64 {
        self.data.saturation
    }

    /// Sets the saturation.
    pub fn set_sat(&mut self, sat: f64) {
        self.data.saturation = sat;
    }

    /// Luma coefficients saturation uses with the given config.
    pub fn sat_luma_coefs(config: Option<&Config>) -> [f64; 3] {
        config.map_or(DEFAULT_LUMA, Config::luma)
    }

    /// The stored correction with the resolved style.
    pub fn to_data(&self) -> CdlData {
        self.data.clone().with_style(self.style())
    }
}

/// Appends the ops for `cdl` applied in `direction` to `ops`.
///
/// A v1 config compiles to the legacy matrix/exponent decomposition; a v2
/// config, or none, compiles to a single CDL op. The transform's own
/// direction is combined with `direction`, so inverse of inverse is forward.
/// Validation and inversion errors abort without touching `ops`.
pub fn build_cdl_ops(
    ops: &mut OpList,
    config: Option<&Config>,
    cdl: &CdlTransform,
    direction: TransformDirection,
) -> OcioResult<()> {
    let direction = cdl.direction.combine(direction);
    let luma = CdlTransform::sat_luma_coefs(config);
    let data = &cdl.data;

    let legacy = config.is_some_and(|c| c.version() == ConfigVersion::V1);
    debug!(id = data.id(), legacy, ?direction, "Building CDL ops");

    let mut built = OpList::new();
    if legacy {
        create_legacy_cdl_ops(&mut built, data, direction, luma)?;
    } else {
        create_cdl_ops(&mut built, data, direction, luma)?;
    }
    ops.extend(built.ops().iter().cloned());
    Ok(())
}
