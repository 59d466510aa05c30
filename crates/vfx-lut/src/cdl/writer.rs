//! `.cc`, `.ccc` and `.cdl` writers.
//!
//! Output uses a 4-space indent and a fixed element order, so a written
//! file reads back into an equal [`CdlData`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::data::{CdlCollection, CdlData, CdlFormat};
use super::xml::escape_xml;
use super::{
    ASC_CDL_NAMESPACE, TAG_COLOR_CORRECTION, TAG_COLOR_CORRECTION_COLLECTION, TAG_COLOR_DECISION,
    TAG_COLOR_DECISION_LIST,
};
use crate::metadata::{
    FormatMetadata, METADATA_DESCRIPTION, METADATA_INPUT_DESCRIPTION, METADATA_SAT_DESCRIPTION,
    METADATA_SOP_DESCRIPTION, METADATA_VIEWING_DESCRIPTION,
};
use crate::LutResult;

const INDENT: &str = "    ";

fn pad(level: usize) -> String {
    INDENT.repeat(level)
}

fn write_text<W: Write>(w: &mut W, level: usize, tag: &str, value: &str) -> LutResult<()> {
    writeln!(w, "{}<{tag}>{}</{tag}>", pad(level), escape_xml(value))?;
    Ok(())
}

fn write_triple<W: Write>(w: &mut W, level: usize, tag: &str, v: &[f64; 3]) -> LutResult<()> {
    writeln!(w, "{}<{tag}>{} {} {}</{tag}>", pad(level), v[0], v[1], v[2])?;
    Ok(())
}

/// Description, InputDescription and ViewingDescription children, grouped in that order.
fn write_descriptions<W: Write>(w: &mut W, level: usize, meta: &FormatMetadata) -> LutResult<()> {
    for name in [METADATA_DESCRIPTION, METADATA_INPUT_DESCRIPTION, METADATA_VIEWING_DESCRIPTION] {
        for desc in meta.child_values(name) {
            write_text(w, level, name, desc)?;
        }
    }
    Ok(())
}

/// Opening tag of a collection root: namespace, then the stored attributes.
fn write_root_open<W: Write>(w: &mut W, tag: &str, meta: &FormatMetadata) -> LutResult<()> {
    write!(w, "<{tag} xmlns=\"{ASC_CDL_NAMESPACE}\"")?;
    for (key, value) in meta.attributes().iter().filter(|(k, _)| k != "xmlns") {
        write!(w, " {key}=\"{}\"", escape_xml(value))?;
    }
    writeln!(w, ">")?;
    Ok(())
}

fn write_correction<W: Write>(w: &mut W, level: usize, cdl: &CdlData) -> LutResult<()> {
    let p = pad(level);
    write!(w, "{p}<{TAG_COLOR_CORRECTION}")?;
    for (key, value) in cdl.metadata.attributes() {
        write!(w, " {key}=\"{}\"", escape_xml(value))?;
    }
    writeln!(w, ">")?;

    write_descriptions(w, level + 1, &cdl.metadata)?;

    let inner = pad(level + 1);
    writeln!(w, "{inner}<SOPNode>")?;
    for desc in cdl.metadata.child_values(METADATA_SOP_DESCRIPTION) {
        write_text(w, level + 2, METADATA_DESCRIPTION, desc)?;
    }
    write_triple(w, level + 2, "Slope", &cdl.slope)?;
    write_triple(w, level + 2, "Offset", &cdl.offset)?;
    write_triple(w, level + 2, "Power", &cdl.power)?;
    writeln!(w, "{inner}</SOPNode>")?;

    writeln!(w, "{inner}<SatNode>")?;
    for desc in cdl.metadata.child_values(METADATA_SAT_DESCRIPTION) {
        write_text(w, level + 2, METADATA_DESCRIPTION, desc)?;
    }
    writeln!(w, "{}<Saturation>{}</Saturation>", pad(level + 2), cdl.saturation)?;
    writeln!(w, "{inner}</SatNode>")?;

    writeln!(w, "{p}</{TAG_COLOR_CORRECTION}>")?;
    Ok(())
}

// ============================================================================
// Stream writers
// ============================================================================

/// Writes a single `<ColorCorrection>`.
pub fn write_cc_to<W: Write>(w: &mut W, cdl: &CdlData) -> LutResult<()> {
    write_correction(w, 0, cdl)
}

/// Writes a `<ColorCorrectionCollection>`.
pub fn write_ccc_to<W: Write>(w: &mut W, collection: &CdlCollection) -> LutResult<()> {
    write_root_open(w, TAG_COLOR_CORRECTION_COLLECTION, &collection.metadata)?;
    write_descriptions(w, 1, &collection.metadata)?;
    for cdl in &collection.corrections {
        write_correction(w, 1, cdl)?;
    }
    writeln!(w, "</{TAG_COLOR_CORRECTION_COLLECTION}>")?;
    Ok(())
}

/// Writes a `<ColorDecisionList>`, one `<ColorDecision>` per correction.
pub fn write_cdl_to<W: Write>(w: &mut W, collection: &CdlCollection) -> LutResult<()> {
    write_root_open(w, TAG_COLOR_DECISION_LIST, &collection.metadata)?;
    write_descriptions(w, 1, &collection.metadata)?;
    for cdl in &collection.corrections {
        writeln!(w, "{INDENT}<{TAG_COLOR_DECISION}>")?;
        write_correction(w, 2, cdl)?;
        writeln!(w, "{INDENT}</{TAG_COLOR_DECISION}>")?;
    }
    writeln!(w, "</{TAG_COLOR_DECISION_LIST}>")?;
    Ok(())
}

/// Writes a collection in the format it was read from.
///
/// A `Cc` collection writes its first correction only.
pub fn write_collection_to<W: Write>(w: &mut W, collection: &CdlCollection) -> LutResult<()> {
    match collection.format {
        CdlFormat::Cc => match collection.corrections.first() {
            Some(cdl) => write_cc_to(w, cdl),
            None => write_cc_to(w, &CdlData::default()),
        },
        CdlFormat::Ccc => write_ccc_to(w, collection),
        CdlFormat::Cdl => write_cdl_to(w, collection),
    }
}

/// Serializes one correction to a `<ColorCorrection>` string.
pub fn to_cc_string(cdl: &CdlData) -> LutResult<String> {
    let mut buf = Vec::new();
    write_cc_to(&mut buf, cdl)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ============================================================================
// File writers
// ============================================================================

/// Writes a `.cc` file.
pub fn write_cc(path: &Path, cdl: &CdlData) -> LutResult<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_cc_to(&mut w, cdl)?;
    w.flush()?;
    Ok(())
}

/// Writes a `.ccc` file.
pub fn write_ccc(path: &Path, collection: &CdlCollection) -> LutResult<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_ccc_to(&mut w, collection)?;
    w.flush()?;
    Ok(())
}

/// Writes a `.cdl` file.
pub fn write_cdl(path: &Path, collection: &CdlCollection) -> LutResult<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_cdl_to(&mut w, collection)?;
    w.flush()?;
    Ok(())
}
