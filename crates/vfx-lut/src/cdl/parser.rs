//! `.cc`, `.ccc` and `.cdl` reader.
//!
//! The reader keeps an explicit stack of element frames. A start tag pushes
//! a frame chosen from the parent frame; an end tag finalizes the top frame
//! and merges it into the new top. Unknown elements are skipped along with
//! their subtree and reported through `tracing`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use super::data::{CdlCollection, CdlData, CdlFormat};
use super::xml::{escape_xml, find_attr, parse_numbers, read_attributes, tag_name, unescape_xml, LineCounter};
use super::{
    ASC_CDL_NAMESPACE, TAG_COLOR_CORRECTION, TAG_COLOR_CORRECTION_COLLECTION, TAG_COLOR_DECISION,
    TAG_COLOR_DECISION_LIST, TAG_MEDIA_REF, TAG_OFFSET, TAG_POWER, TAG_SATNODE, TAG_SATNODE_ALT,
    TAG_SATURATION, TAG_SLOPE, TAG_SOPNODE,
};
use crate::metadata::{
    METADATA_DESCRIPTION, METADATA_INPUT_DESCRIPTION, METADATA_SAT_DESCRIPTION,
    METADATA_SOP_DESCRIPTION, METADATA_VIEWING_DESCRIPTION,
};
use crate::{LutError, LutResult};

/// Source name used for in-memory documents.
pub const MEMORY_SOURCE: &str = "<memory>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    Description,
    InputDescription,
    ViewingDescription,
    Slope,
    Offset,
    Power,
    Saturation,
}

impl Leaf {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            METADATA_DESCRIPTION => Self::Description,
            METADATA_INPUT_DESCRIPTION => Self::InputDescription,
            METADATA_VIEWING_DESCRIPTION => Self::ViewingDescription,
            TAG_SLOPE => Self::Slope,
            TAG_OFFSET => Self::Offset,
            TAG_POWER => Self::Power,
            TAG_SATURATION => Self::Saturation,
            _ => return None,
        })
    }

    fn is_description(self) -> bool {
        matches!(self, Self::Description | Self::InputDescription | Self::ViewingDescription)
    }

    fn metadata_name(self) -> &'static str {
        match self {
            Self::InputDescription => METADATA_INPUT_DESCRIPTION,
            Self::ViewingDescription => METADATA_VIEWING_DESCRIPTION,
            _ => METADATA_DESCRIPTION,
        }
    }
}

#[derive(Debug)]
enum Node {
    /// `ColorCorrectionCollection` or `ColorDecisionList`.
    Root,
    /// Number of corrections read so far.
    Decision(usize),
    Correction(Box<CdlData>),
    Sop,
    Sat,
    Leaf(Leaf, String),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Root,
    Decision,
    Correction,
    Sop,
    Sat,
    Leaf,
    Ignored,
}

impl Node {
    fn kind(&self) -> Kind {
        match self {
            Node::Root => Kind::Root,
            Node::Decision(_) => Kind::Decision,
            Node::Correction(_) => Kind::Correction,
            Node::Sop => Kind::Sop,
            Node::Sat => Kind::Sat,
            Node::Leaf(..) => Kind::Leaf,
            Node::Ignored => Kind::Ignored,
        }
    }
}

#[derive(Debug)]
struct Frame {
    tag: String,
    node: Node,
}

struct CdlReader<'a> {
    file: &'a str,
    line: usize,
    format: Option<CdlFormat>,
    collection: CdlCollection,
    stack: Vec<Frame>,
    ids: HashSet<String>,
}

impl<'a> CdlReader<'a> {
    fn new(file: &'a str) -> Self {
        Self {
            file,
            line: 0,
            format: None,
            collection: CdlCollection::default(),
            stack: Vec::new(),
            ids: HashSet::new(),
        }
    }

    fn fail(&self, message: impl Into<String>) -> LutError {
        LutError::Parse {
            element: self.format.unwrap_or(CdlFormat::Cc).root_tag().to_string(),
            file: self.file.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn ignore(&self, tag: &str, reason: &str) -> Node {
        warn!(file = self.file, line = self.line, "Ignoring element '{tag}'{reason}");
        Node::Ignored
    }

    fn correction(&self, attrs: &[(String, String)]) -> LutResult<Node> {
        let mut cdl = CdlData::default();
        for (key, value) in attrs {
            if key != "xmlns" {
                cdl.metadata.add_attribute(key, value.as_str())?;
            }
        }
        Ok(Node::Correction(Box::new(cdl)))
    }

    fn start_root(&mut self, tag: &str, attrs: &[(String, String)]) -> LutResult<Node> {
        let format = match tag {
            TAG_COLOR_CORRECTION => CdlFormat::Cc,
            TAG_COLOR_CORRECTION_COLLECTION => CdlFormat::Ccc,
            TAG_COLOR_DECISION_LIST => CdlFormat::Cdl,
            _ => {
                return Err(self.fail(format!(
                    "Missing CDL tag, root element '{tag}' is not a CDL/CCC/CC file"
                )));
            }
        };
        self.format = Some(format);
        self.collection.format = format;

        if let Some(ns) = find_attr(attrs, "xmlns") {
            if ns != ASC_CDL_NAMESPACE {
                warn!(file = self.file, line = self.line, "Unexpected namespace '{ns}' on '{tag}'");
            }
        }

        if format == CdlFormat::Cc {
            return self.correction(attrs);
        }
        for (key, value) in attrs {
            if key != "xmlns" {
                self.collection.metadata.add_attribute(key, value.as_str())?;
            }
        }
        Ok(Node::Root)
    }

    fn start(&mut self, tag: String, attrs: Vec<(String, String)>) -> LutResult<()> {
        let parent = self.stack.last().map(|f| f.node.kind());
        let leaf = Leaf::from_tag(&tag);

        let node = match parent {
            None if self.format.is_some() => {
                return Err(self.fail(format!(
                    "XML parsing error (multiple root elements, found '{tag}')"
                )));
            }
            None => self.start_root(&tag, &attrs)?,
            Some(Kind::Ignored) => Node::Ignored,
            Some(Kind::Leaf) => self.ignore(&tag, ", text elements have no children"),
            Some(Kind::Root) => match (self.format, tag.as_str()) {
                (Some(CdlFormat::Ccc), TAG_COLOR_CORRECTION) => self.correction(&attrs)?,
                (Some(CdlFormat::Cdl), TAG_COLOR_DECISION) => Node::Decision(0),
                (_, TAG_COLOR_CORRECTION) => self.ignore(
                    &tag,
                    ": ColorCorrection must be under a ColorDecision (CDL), \
                     ColorCorrectionCollection (CCC), or must be the root element (CC)",
                ),
                _ => match leaf {
                    Some(l) if l.is_description() => Node::Leaf(l, String::new()),
                    _ => self.ignore(&tag, ""),
                },
            },
            Some(Kind::Decision) => match tag.as_str() {
                TAG_COLOR_CORRECTION => self.correction(&attrs)?,
                TAG_MEDIA_REF => self.ignore(&tag, ", media references are not supported"),
                _ => self.ignore(&tag, ""),
            },
            Some(Kind::Correction) => match tag.as_str() {
                TAG_SOPNODE => Node::Sop,
                TAG_SATNODE | TAG_SATNODE_ALT => Node::Sat,
                _ => match leaf {
                    Some(l) if l.is_description() => Node::Leaf(l, String::new()),
                    _ => self.ignore(&tag, ""),
                },
            },
            Some(kind @ (Kind::Sop | Kind::Sat)) => match leaf {
                Some(Leaf::InputDescription | Leaf::ViewingDescription) => {
                    let node = if kind == Kind::Sop { TAG_SOPNODE } else { TAG_SATNODE };
                    return Err(self.fail(format!("'{tag}' is not allowed inside '{node}'")));
                }
                Some(Leaf::Description) => Node::Leaf(Leaf::Description, String::new()),
                Some(l @ (Leaf::Slope | Leaf::Offset | Leaf::Power)) if kind == Kind::Sop => {
                    Node::Leaf(l, String::new())
                }
                Some(Leaf::Saturation) if kind == Kind::Sat => Node::Leaf(Leaf::Saturation, String::new()),
                _ => self.ignore(&tag, ""),
            },
        };

        self.stack.push(Frame { tag, node });
        Ok(())
    }

    fn text(&mut self, s: &str) {
        if let Some(Frame { node: Node::Leaf(_, buf), .. }) = self.stack.last_mut() {
            buf.push_str(s);
        }
    }

    fn current_correction(&mut self) -> Option<&mut CdlData> {
        self.stack.iter_mut().rev().find_map(|f| match &mut f.node {
            Node::Correction(cdl) => Some(cdl.as_mut()),
            _ => None,
        })
    }

    fn finish_leaf(&mut self, tag: &str, leaf: Leaf, raw: &str) -> LutResult<()> {
        let value = unescape_xml(raw);
        let value = value.trim();
        let parent = self.stack.last().map(|f| f.node.kind());

        match leaf {
            Leaf::Description | Leaf::InputDescription | Leaf::ViewingDescription => {
                let name = match parent {
                    Some(Kind::Sop) => METADATA_SOP_DESCRIPTION,
                    Some(Kind::Sat) => METADATA_SAT_DESCRIPTION,
                    _ => leaf.metadata_name(),
                };
                if parent == Some(Kind::Root) {
                    self.collection.metadata.add_child(name, value)?;
                } else {
                    let internal = self.fail("Internal CDL parsing error");
                    let cdl = self.current_correction().ok_or(internal)?;
                    cdl.metadata.add_child(name, value)?;
                }
            }
            Leaf::Slope | Leaf::Offset | Leaf::Power => {
                let values = parse_numbers(value).map_err(|m| self.fail(m))?;
                let values: [f64; 3] = values.as_slice().try_into().map_err(|_| {
                    self.fail(format!(
                        "{tag}: 3 values required, found {} in '{value}'",
                        values.len()
                    ))
                })?;
                let internal = self.fail("Internal CDL parsing error");
                let cdl = self.current_correction().ok_or(internal)?;
                match leaf {
                    Leaf::Slope => cdl.slope = values,
                    Leaf::Offset => cdl.offset = values,
                    _ => cdl.power = values,
                }
            }
            Leaf::Saturation => {
                let values = parse_numbers(value).map_err(|m| self.fail(m))?;
                let [sat] = values.as_slice() else {
                    return Err(self.fail(format!(
                        "{tag}: 1 value required, found {} in '{value}'",
                        values.len()
                    )));
                };
                let sat = *sat;
                let internal = self.fail("Internal CDL parsing error");
                self.current_correction().ok_or(internal)?.saturation = sat;
            }
        }
        Ok(())
    }

    fn finish_correction(&mut self, cdl: CdlData) -> LutResult<()> {
        let id = cdl.id();
        if !id.is_empty() && !self.ids.insert(id.to_string()) {
            return Err(LutError::Duplicate { id: id.to_string() });
        }
        if let Some(Frame { node: Node::Decision(count), .. }) = self.stack.last_mut() {
            *count += 1;
        }
        self.collection.corrections.push(cdl);
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
            Node::Leaf(leaf, raw) => self.finish_leaf(tag, leaf, &raw),
            Node::Correction(cdl) => self.finish_correction(*cdl),
            Node::Decision(1) => Ok(()),
            Node::Decision(count) => Err(self.fail(format!(
                "{TAG_COLOR_DECISION} must hold exactly one {TAG_COLOR_CORRECTION}, found {count}"
            ))),
            _ => Ok(()),
        }
    }

    fn finish(self) -> LutResult<CdlCollection> {
        if let Some(frame) = self.stack.last() {
            return Err(self.fail(format!("CDL parsing error (no closing tag for '{}')", frame.tag)));
        }
        if self.format.is_none() {
            return Err(self.fail("Missing CDL tag"));
        }
        debug!(
            file = self.file,
            corrections = self.collection.corrections.len(),
            "Read {:?} document",
            self.collection.format
        );
        Ok(self.collection)
    }
}

/// Parses a CDL document from a string.
///
/// `file` names the source in error messages; pass [`MEMORY_SOURCE`] for
/// in-memory data.
///
/// ```rust
/// use vfx_lut::cdl::parse_str;
///
/// let xml = r#"<ColorCorrection id="foo">
///     <SOPNode><Slope>2 2 2</Slope></SOPNode>
/// </ColorCorrection>"#;
/// let coll = parse_str(xml, "<memory>").unwrap();
/// assert_eq!(coll.corrections[0].id(), "foo");
/// assert_eq!(coll.corrections[0].slope, [2.0, 2.0, 2.0]);
/// ```
pub fn parse_str(text: &str, file: &str) -> LutResult<CdlCollection> {
    let mut xml = Reader::from_str(text);
    let mut lines = LineCounter::new(text);
    let mut reader = CdlReader::new(file);

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

    reader.finish()
}

/// Reads a `.cc`, `.ccc` or `.cdl` file.
///
/// The format is taken from the root element, not the extension.
pub fn read_file(path: &Path) -> LutResult<CdlCollection> {
    let text = fs::read_to_string(path).map_err(|_| {
        LutError::NotFound(format!("Error could not read CDL source file '{}'", path.display()))
    })?;
    parse_str(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdl::{to_cc_string, write_ccc_to, write_collection_to, CdlStyle};

    const CC: &str = r#"<ColorCorrection id="foo">
    <SOPNode>
        <Description>this is a description</Description>
        <Slope>1.1 1.2 1.3</Slope>
        <Offset>2.1 2.2 2.3</Offset>
        <Power>3.1 3.2 3.3</Power>
    </SOPNode>
    <SatNode>
        <Saturation>0.7</Saturation>
    </SatNode>
</ColorCorrection>"#;

    #[test]
    fn parse_cc() {
        let coll = parse_str(CC, MEMORY_SOURCE).unwrap();
        assert_eq!(coll.format, CdlFormat::Cc);
        let cdl = &coll.corrections[0];
        assert_eq!(cdl.id(), "foo");
        assert_eq!(cdl.first_sop_description(), "this is a description");
        assert_eq!(cdl.slope, [1.1, 1.2, 1.3]);
        assert_eq!(cdl.offset, [2.1, 2.2, 2.3]);
        assert_eq!(cdl.power, [3.1, 3.2, 3.3]);
        assert_eq!(cdl.saturation, 0.7);
        assert_eq!(cdl.style, CdlStyle::NoClamp);
    }

    #[test]
    fn roundtrip_cc() {
        let coll = parse_str(CC, MEMORY_SOURCE).unwrap();
        let text = to_cc_string(&coll.corrections[0]).unwrap();
        let again = parse_str(&text, MEMORY_SOURCE).unwrap();
        assert_eq!(again.corrections[0], coll.corrections[0]);
    }

    #[test]
    fn crlf_and_entities() {
        let xml = "<ColorCorrection id=\"Esc &lt; &amp; &quot; &apos; &gt;\">\r\n\
            <Description>These: &lt; &amp; &quot; &apos; &gt; are escape chars</Description>\r\n\
            <SOPNode><Slope> 1e0  2E-1\t3 </Slope></SOPNode>\r\n\
            </ColorCorrection>\r\n";
        let cdl = &parse_str(xml, MEMORY_SOURCE).unwrap().corrections[0];
        assert_eq!(cdl.id(), "Esc < & \" ' >");
        assert_eq!(cdl.descriptions().next(), Some("These: < & \" ' > are escape chars"));
        assert_eq!(cdl.slope, [1.0, 0.2, 3.0]);
        // untouched nodes keep defaults
        assert_eq!(cdl.saturation, 1.0);
    }

    #[test]
    fn wrong_arity_reports_line() {
        let xml = "<ColorCorrection>\n<SOPNode>\n<Slope>1 2</Slope>\n</SOPNode>\n</ColorCorrection>";
        let err = parse_str(xml, "bad.cc").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Error parsing ColorCorrection (bad.cc). Error is: "), "{msg}");
        assert!(msg.ends_with("At line (3)"), "{msg}");
    }

    #[test]
    fn trailing_garbage() {
        let xml = "<ColorCorrection><SatNode><Saturation>1.0x</Saturation></SatNode></ColorCorrection>";
        assert!(matches!(parse_str(xml, MEMORY_SOURCE), Err(LutError::Parse { .. })));
    }

    #[test]
    fn sat_node_alternate_spelling() {
        let xml = "<ColorCorrection><SATNode><Description>s</Description>\
            <Saturation>0.5</Saturation></SATNode></ColorCorrection>";
        let cdl = &parse_str(xml, MEMORY_SOURCE).unwrap().corrections[0];
        assert_eq!(cdl.saturation, 0.5);
        assert_eq!(cdl.first_sat_description(), "s");
    }

    #[test]
    fn input_description_inside_sop_rejected() {
        let xml = "<ColorCorrection><SOPNode><InputDescription>x</InputDescription>\
            </SOPNode></ColorCorrection>";
        let err = parse_str(xml, MEMORY_SOURCE).unwrap_err();
        assert!(err.to_string().contains("not allowed inside 'SOPNode'"));
    }

    #[test]
    fn unknown_elements_skipped() {
        let xml = "<ColorCorrectionCollection>\
            <Bogus><ColorCorrection id=\"hidden\"/></Bogus>\
            <ColorCorrection id=\"a\"><ASC_SOP><Slope>9 9 9</Slope></ASC_SOP></ColorCorrection>\
            </ColorCorrectionCollection>";
        let coll = parse_str(xml, MEMORY_SOURCE).unwrap();
        assert_eq!(coll.len(), 1);
        assert_eq!(coll.corrections[0].slope, [1.0; 3]);
    }

    #[test]
    fn duplicate_ids() {
        let xml = "<ColorCorrectionCollection>\
            <ColorCorrection id=\"a\"/><ColorCorrection id=\"a\"/>\
            </ColorCorrectionCollection>";
        let err = parse_str(xml, MEMORY_SOURCE).unwrap_err();
        assert!(matches!(err, LutError::Duplicate { .. }));
        assert!(err.to_string().contains("Duplicate elements with 'id' found"));

        let xml = "<ColorCorrectionCollection>\
            <ColorCorrection/><ColorCorrection/>\
            </ColorCorrectionCollection>";
        assert_eq!(parse_str(xml, MEMORY_SOURCE).unwrap().len(), 2);
    }

    #[test]
    fn wrong_root() {
        let err = parse_str("<ProcessList id=\"x\"/>", MEMORY_SOURCE).unwrap_err();
        assert!(err.to_string().contains("is not a CDL/CCC/CC file"));
        assert!(parse_str("", MEMORY_SOURCE).is_err());
    }

    #[test]
    fn second_root_rejected() {
        let xml = "<ColorCorrectionCollection><ColorCorrection id=\"a\"/></ColorCorrectionCollection>\
            <ColorCorrection id=\"b\"/>";
        let err = parse_str(xml, MEMORY_SOURCE).unwrap_err();
        assert!(matches!(err, LutError::Parse { .. }));
        assert!(err.to_string().contains("multiple root elements"), "{err}");
    }

    #[test]
    fn decision_needs_one_correction() {
        let empty = "<ColorDecisionList><ColorDecision><MediaRef ref=\"a.dpx\"/></ColorDecision></ColorDecisionList>";
        let err = parse_str(empty, MEMORY_SOURCE).unwrap_err();
        assert!(matches!(err, LutError::Parse { .. }));
        assert!(err.to_string().contains("found 0"), "{err}");

        let two = "<ColorDecisionList><ColorDecision>\
            <ColorCorrection id=\"a\"/><ColorCorrection id=\"b\"/>\
            </ColorDecision></ColorDecisionList>";
        let err = parse_str(two, MEMORY_SOURCE).unwrap_err();
        assert!(err.to_string().contains("found 2"), "{err}");
    }

    #[test]
    fn unclosed_element() {
        assert!(parse_str("<ColorCorrection><SOPNode>", MEMORY_SOURCE).is_err());
    }

    #[test]
    fn collection_roundtrip() {
        let xml = "<ColorCorrectionCollection xmlns=\"urn:ASC:CDL:v1.01\">\
            <Description>coll</Description>\
            <InputDescription>in</InputDescription>\
            <ColorCorrection id=\"a\"><Description>first</Description>\
            <ViewingDescription>view</ViewingDescription>\
            <SOPNode><Slope>1 2 3</Slope></SOPNode></ColorCorrection>\
            <ColorCorrection id=\"b\"><SatNode><Saturation>0.25</Saturation></SatNode></ColorCorrection>\
            </ColorCorrectionCollection>";
        let coll = parse_str(xml, MEMORY_SOURCE).unwrap();
        let mut buf = Vec::new();
        write_ccc_to(&mut buf, &coll).unwrap();
        let again = parse_str(&String::from_utf8(buf).unwrap(), MEMORY_SOURCE).unwrap();
        assert_eq!(again, coll);
        assert_eq!(again.metadata.first_child("InputDescription").unwrap().value(), "in");
    }

    #[test]
    fn root_attributes_and_descriptions_kept() {
        for root in ["ColorCorrectionCollection", "ColorDecisionList"] {
            let body = if root == "ColorDecisionList" {
                "<ColorDecision><ColorCorrection id=\"a\"/></ColorDecision>"
            } else {
                "<ColorCorrection id=\"a\"/>"
            };
            let xml = format!(
                "<{root} xmlns=\"urn:ASC:CDL:v1.01\" id=\"coll\">\
                <InputDescription>in1</InputDescription>\
                <InputDescription>in2</InputDescription>\
                <ViewingDescription>v1</ViewingDescription>\
                <ViewingDescription>v2</ViewingDescription>\
                {body}</{root}>"
            );
            let coll = parse_str(&xml, MEMORY_SOURCE).unwrap();
            let mut buf = Vec::new();
            write_collection_to(&mut buf, &coll).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.starts_with(&format!("<{root} xmlns=\"urn:ASC:CDL:v1.01\" id=\"coll\">")), "{text}");

            let again = parse_str(&text, MEMORY_SOURCE).unwrap();
            assert_eq!(again, coll);
            assert_eq!(again.metadata.attribute("id"), "coll");
            let inputs: Vec<_> = again.metadata.child_values("InputDescription").collect();
            assert_eq!(inputs, ["in1", "in2"]);
            let views: Vec<_> = again.metadata.child_values("ViewingDescription").collect();
            assert_eq!(views, ["v1", "v2"]);
        }
    }

    #[test]
    fn decision_list_with_media_ref() {
        let xml = r#"<ColorDecisionList xmlns="urn:ASC:CDL:v1.01">
    <ColorDecision>
        <MediaRef ref="shot.dpx"/>
        <ColorCorrection id="shot001">
            <SOPNode><Slope>1.1 1.0 0.9</Slope></SOPNode>
        </ColorCorrection>
    </ColorDecision>
</ColorDecisionList>"#;
        let coll = parse_str(xml, MEMORY_SOURCE).unwrap();
        assert_eq!(coll.format, CdlFormat::Cdl);
        assert_eq!(coll.corrections[0].id(), "shot001");
    }

    #[test]
    fn missing_file() {
        let err = read_file(Path::new("does/not/exist.cc")).unwrap_err();
        assert!(err.to_string().contains("Error could not read CDL source file"));
    }
}
