//! Build document element tree
//!
//! The engine works on an owned element tree rather than on markup. This
//! module turns XML text into that tree and records where each element came
//! from so errors can point back at the build file.

use crate::error::{DocumentError, DocumentResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Position of an element in its source document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: Option<PathBuf>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: Option<PathBuf>, line: u32, column: u32) -> Self {
        Location { file, line, column }
    }

    /// A location for elements that were not read from a file
    pub fn unknown() -> Self {
        Location::default()
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.is_known()) {
            (Some(file), true) => write!(f, "{}:{}:{}", file.display(), self.line, self.column),
            (Some(file), false) => write!(f, "{}", file.display()),
            (None, true) => write!(f, "line {}, column {}", self.line, self.column),
            (None, false) => write!(f, "<unknown location>"),
        }
    }
}

/// A parsed element: tag name, raw attribute text, children and location
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Trimmed text content, if any
    pub text: Option<String>,
    pub location: Location,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
            location: Location::unknown(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Raw text of an attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Child elements with the given tag name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Load and parse a build document from disk
pub fn load_document(path: &Path) -> DocumentResult<XmlElement> {
    let contents = fs::read_to_string(path).map_err(|e| DocumentError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_document(&contents, Some(path))
}

/// Parse a build document from a string
pub fn parse_document(xml: &str, path: Option<&Path>) -> DocumentResult<XmlElement> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| DocumentError::Xml {
        path: path.map(Path::to_path_buf),
        message: e.to_string(),
    })?;

    let file = path.map(Path::to_path_buf);
    Ok(convert_node(&doc, doc.root_element(), &file))
}

fn convert_node(
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    file: &Option<PathBuf>,
) -> XmlElement {
    let pos = doc.text_pos_at(node.range().start);

    let attributes = node
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();

    let mut children = Vec::new();
    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            children.push(convert_node(doc, child, file));
        } else if child.is_text() {
            if let Some(t) = child.text() {
                text.push_str(t);
            }
        }
    }

    let trimmed = text.trim();
    XmlElement {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
        text: if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        },
        location: Location::new(file.clone(), pos.row, pos.col),
    }
}
