//! Pretty-printing serializer.
//!
//! Layout: one node per line, one space of indentation per depth level,
//! text trimmed and whitespace-only text dropped. Elements whose content is
//! whitespace-sensitive or raw text are written verbatim on a single
//! logical line.
//!
//! Tags, text, comments and doctypes go through html5ever's
//! [`HtmlSerializer`], which owns escaping, raw-text parents and void
//! elements. This module only decides where whitespace goes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use html5ever::serialize::{HtmlSerializer, SerializeOpts, Serializer};
use html5ever::{LocalName, QualName};

use crate::dom::{Document, Element, Namespace, Node};
use crate::error::{BundleError, Result};

/// Name of the bundled file, written next to the entry file.
pub const OUTPUT_FILE_NAME: &str = "single_html.html";

const INDENT: &[u8] = b" ";

/// Elements whose content is kept byte for byte instead of re-indented.
const PRESERVE_WHITESPACE_ELEMENTS: &[&str] = &[
    "script", "style", "pre", "textarea", "noscript", "iframe", "noembed", "noframes", "xmp",
    "plaintext",
];

/// Render `doc` as indented HTML.
pub fn prettify(doc: &Document) -> io::Result<String> {
    let mut pretty = PrettySerializer::new();
    for node in &doc.children {
        pretty.write_node(node, 0)?;
    }
    String::from_utf8(pretty.ser.writer).map_err(io::Error::other)
}

/// Write the prettified document to `<entry_dir>/single_html.html`,
/// replacing any existing file. Returns the output path.
pub fn write_output(doc: &Document, entry_dir: &Path) -> Result<PathBuf> {
    let path = entry_dir.join(OUTPUT_FILE_NAME);
    let write_error = |source| BundleError::Write {
        path: path.clone(),
        source,
    };
    let html = prettify(doc).map_err(write_error)?;
    fs::write(&path, html).map_err(write_error)?;
    Ok(path)
}

fn qual_name(el: &Element) -> QualName {
    QualName::new(
        None,
        el.namespace.uri().into(),
        LocalName::from(el.name.as_str()),
    )
}

/// Attribute names are stored already prefixed (`xlink:href`), so they are
/// written with no namespace.
fn attribute_name(name: &str) -> QualName {
    QualName::new(None, "".into(), LocalName::from(name))
}

fn preserves_whitespace(el: &Element) -> bool {
    el.namespace == Namespace::Html && PRESERVE_WHITESPACE_ELEMENTS.contains(&el.name.as_str())
}

struct PrettySerializer {
    ser: HtmlSerializer<Vec<u8>>,
}

impl PrettySerializer {
    fn new() -> Self {
        Self {
            ser: HtmlSerializer::new(Vec::new(), SerializeOpts::default()),
        }
    }

    fn indent(&mut self, depth: usize) -> io::Result<()> {
        for _ in 0..depth {
            self.ser.writer.write_all(INDENT)?;
        }
        Ok(())
    }

    fn newline(&mut self) -> io::Result<()> {
        self.ser.writer.write_all(b"\n")
    }

    fn write_node(&mut self, node: &Node, depth: usize) -> io::Result<()> {
        match node {
            Node::Doctype(doctype) => {
                self.indent(depth)?;
                self.ser.write_doctype(&doctype.name)?;
                self.newline()
            }
            Node::Comment(text) => {
                self.indent(depth)?;
                self.ser.write_comment(text)?;
                self.newline()
            }
            Node::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(());
                }
                self.indent(depth)?;
                self.ser.write_text(trimmed)?;
                self.newline()
            }
            Node::Element(el) => self.write_element(el, depth),
        }
    }

    fn write_element(&mut self, el: &Element, depth: usize) -> io::Result<()> {
        self.indent(depth)?;
        self.start_tag(el)?;

        if el.children.is_empty() {
            self.ser.end_elem(qual_name(el))?;
            return self.newline();
        }

        if preserves_whitespace(el) {
            for child in &el.children {
                self.write_compact(child)?;
            }
            self.ser.end_elem(qual_name(el))?;
            return self.newline();
        }

        self.newline()?;
        for child in &el.children {
            self.write_node(child, depth + 1)?;
        }
        self.indent(depth)?;
        self.ser.end_elem(qual_name(el))?;
        self.newline()
    }

    /// Serialize without adding any whitespace.
    fn write_compact(&mut self, node: &Node) -> io::Result<()> {
        match node {
            Node::Doctype(doctype) => self.ser.write_doctype(&doctype.name),
            Node::Comment(text) => self.ser.write_comment(text),
            Node::Text(text) => self.ser.write_text(text),
            Node::Element(el) => {
                self.start_tag(el)?;
                for child in &el.children {
                    self.write_compact(child)?;
                }
                self.ser.end_elem(qual_name(el))
            }
        }
    }

    fn start_tag(&mut self, el: &Element) -> io::Result<()> {
        let names: Vec<QualName> = el
            .attributes
            .iter()
            .map(|a| attribute_name(&a.name))
            .collect();
        let attrs = names
            .iter()
            .zip(el.attributes.iter())
            .map(|(name, a)| (name, a.value.as_deref().unwrap_or("")));

        let mark = self.ser.writer.len();
        self.ser.start_elem(qual_name(el), attrs)?;
        self.strip_boolean_values(mark, el);
        Ok(())
    }

    /// The serializer always writes `name=""`; valueless attributes are
    /// turned back into bare names inside the tag written since `mark`.
    fn strip_boolean_values(&mut self, mark: usize, el: &Element) {
        for attr in el.attributes.iter().filter(|a| a.value.is_none()) {
            let needle = format!(" {}=\"\"", attr.name);
            let needle = needle.as_bytes();
            let found = self.ser.writer[mark..]
                .windows(needle.len())
                .position(|w| w == needle);
            if let Some(pos) = found {
                let value_start = mark + pos + needle.len() - 3;
                self.ser.writer.drain(value_start..value_start + 3);
            }
        }
    }
}
