//! Format metadata tree.
//!
//! [`FormatMetadata`] mirrors the descriptive XML carried by CDL and
//! ProcessList files: every node has a name, an optional value, ordered
//! attributes and ordered children. Child order and repetition are kept
//! as-is, so several `<Description>` elements survive a round trip.
//!
//! # Example
//!
//! ```rust
//! use vfx_lut::metadata::{FormatMetadata, METADATA_DESCRIPTION};
//!
//! let mut root = FormatMetadata::new();
//! root.add_attribute("id", "shot_010").unwrap();
//! root.add_child(METADATA_DESCRIPTION, "warm look").unwrap();
//!
//! assert_eq!(root.attribute("ID"), "shot_010");
//! assert_eq!(root.first_child_index("description"), Some(0));
//! ```

use std::fmt;

use crate::cdl::escape_xml;
use crate::{LutError, LutResult};

/// Reserved name of a root metadata node.
pub const METADATA_ROOT: &str = "ROOT";
/// ProcessList element.
pub const METADATA_PROCESS_LIST: &str = "ProcessList";
/// Info element.
pub const METADATA_INFO: &str = "Info";
/// Description element.
pub const METADATA_DESCRIPTION: &str = "Description";
/// ProcessList input descriptor.
pub const METADATA_INPUT_DESCRIPTOR: &str = "InputDescriptor";
/// ProcessList output descriptor.
pub const METADATA_OUTPUT_DESCRIPTOR: &str = "OutputDescriptor";
/// CDL input description.
pub const METADATA_INPUT_DESCRIPTION: &str = "InputDescription";
/// CDL viewing description.
pub const METADATA_VIEWING_DESCRIPTION: &str = "ViewingDescription";
/// Description found inside a SOPNode.
pub const METADATA_SOP_DESCRIPTION: &str = "SOPDescription";
/// Description found inside a SatNode.
pub const METADATA_SAT_DESCRIPTION: &str = "SATDescription";
/// `id` attribute.
pub const METADATA_ID: &str = "id";
/// `name` attribute.
pub const METADATA_NAME: &str = "name";

/// An ordered name/value tree with attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatMetadata {
    name: String,
    value: String,
    attributes: Vec<(String, String)>,
    children: Vec<FormatMetadata>,
}

impl Default for FormatMetadata {
    fn default() -> Self {
        Self::new()
    }
}

fn check_name(name: &str) -> LutResult<()> {
    if name.is_empty() {
        return Err(LutError::InvalidParameter(
            "FormatMetadata has to have a non-empty name".into(),
        ));
    }
    if name == METADATA_ROOT {
        return Err(LutError::InvalidParameter(format!(
            "'{METADATA_ROOT}' is reserved for root FormatMetadata elements"
        )));
    }
    Ok(())
}

impl FormatMetadata {
    /// Creates an empty root node.
    pub fn new() -> Self {
        Self {
            name: METADATA_ROOT.to_string(),
            value: String::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an empty element with the given name.
    pub fn with_name(name: &str) -> LutResult<Self> {
        Self::element(name, "")
    }

    /// Creates a named element with a value.
    ///
    /// Fails on an empty name or the reserved root name.
    pub fn element(name: &str, value: impl Into<String>) -> LutResult<Self> {
        check_name(name)?;
        Ok(Self {
            name: name.to_string(),
            value: value.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Element name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the element.
    ///
    /// A root node keeps its name; other nodes can't take the root name.
    pub fn set_name(&mut self, name: &str) -> LutResult<()> {
        if self.name == METADATA_ROOT {
            return Err(LutError::InvalidParameter(format!(
                "FormatMetadata '{METADATA_ROOT}' element can't be renamed"
            )));
        }
        check_name(name)?;
        self.name = name.to_string();
        Ok(())
    }

    /// True for the root node.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.name == METADATA_ROOT
    }

    /// Element value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the element value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Attributes in insertion order.
    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Looks up an attribute, ignoring ASCII case of the key.
    pub fn find_attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, or `""` when absent.
    pub fn attribute(&self, key: &str) -> &str {
        self.find_attribute(key).unwrap_or("")
    }

    /// Adds an attribute or overwrites an existing one in place.
    pub fn add_attribute(&mut self, key: &str, value: impl Into<String>) -> LutResult<()> {
        if key.is_empty() {
            return Err(LutError::InvalidParameter(
                "Attribute must have a non-empty name".into(),
            ));
        }
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
        Ok(())
    }

    /// Child elements in insertion order.
    #[inline]
    pub fn children(&self) -> &[FormatMetadata] {
        &self.children
    }

    /// Mutable access to the child list.
    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<FormatMetadata> {
        &mut self.children
    }

    /// Appends a child element and returns it.
    pub fn add_child(&mut self, name: &str, value: impl Into<String>) -> LutResult<&mut FormatMetadata> {
        let child = Self::element(name, value)?;
        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    /// Appends an existing node.
    pub fn add_child_node(&mut self, child: FormatMetadata) {
        self.children.push(child);
    }

    /// Index of the first child with the given name (ASCII case-insensitive).
    pub fn first_child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// First child with the given name.
    pub fn first_child(&self, name: &str) -> Option<&FormatMetadata> {
        self.first_child_index(name).map(|i| &self.children[i])
    }

    /// Values of every child with the given name, in order.
    pub fn child_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.children
            .iter()
            .filter(move |c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.value.as_str())
    }

    /// The `id` attribute.
    pub fn id(&self) -> &str {
        self.attribute(METADATA_ID)
    }

    /// Sets the `id` attribute.
    pub fn set_id(&mut self, id: &str) {
        self.set_known_attribute(METADATA_ID, id);
    }

    /// The `name` attribute (not the element name).
    pub fn node_name(&self) -> &str {
        self.attribute(METADATA_NAME)
    }

    fn set_known_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Merges `other` into `self`.
    ///
    /// Values join with `" + "`, matching attributes join the same way,
    /// new attributes and all children of `other` are appended.
    pub fn combine(&mut self, other: &FormatMetadata) -> LutResult<()> {
        if self.name != other.name {
            return Err(LutError::InvalidParameter(format!(
                "Only FormatMetadata with the same name '{}' can be combined with '{}'",
                self.name, other.name
            )));
        }

        join_values(&mut self.value, &other.value);

        for (key, value) in &other.attributes {
            match self.attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(slot) => join_values(&mut slot.1, value),
                None => self.attributes.push((key.clone(), value.clone())),
            }
        }

        self.children.extend(other.children.iter().cloned());
        Ok(())
    }

    /// Drops value, attributes and children. The name stays.
    pub fn clear(&mut self) {
        self.value.clear();
        self.attributes.clear();
        self.children.clear();
    }

    /// True when there is nothing but a name.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.attributes.is_empty() && self.children.is_empty()
    }
}

fn join_values(left: &mut String, right: &str) {
    if right.is_empty() {
        return;
    }
    if left.is_empty() {
        left.push_str(right);
    } else {
        left.push_str(" + ");
        left.push_str(right);
    }
}

/// Compact single-line XML rendering.
impl fmt::Display for FormatMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (k, v) in &self.attributes {
            write!(f, " {}=\"{}\"", k, escape_xml(v))?;
        }
        write!(f, ">{}", escape_xml(&self.value))?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.name)
    }
}
