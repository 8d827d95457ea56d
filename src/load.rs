//! File loading and HTML parsing.
//!
//! Parsing is delegated to html5ever in HTML mode, which never fails on
//! malformed input. The resulting `markup5ever_rcdom` tree is converted into
//! the owned [`crate::dom`] model straight away.

use std::fs;
use std::path::Path;

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::dom::{Attribute, Attributes, Doctype, Document, Element, Namespace, Node};
use crate::error::{BundleError, Result};

/// Read and parse the entry document.
pub fn load_document(path: &Path) -> Result<Document> {
    let source = read_source(path)?;
    Ok(parse_html(&source))
}

/// Read and parse a fragment file (Markdown section or SVG asset).
///
/// Returns the file's own nodes in document order; the `<html>`, `<head>`
/// and `<body>` wrappers synthesized by the tree builder are flattened away
/// and doctypes are dropped.
pub fn load_fragment(path: &Path) -> Result<Vec<Node>> {
    let source = read_source(path)?;
    Ok(parse_fragment(&source))
}

fn read_source(path: &Path) -> Result<String> {
    log::debug!("[load] reading path='{}'", path.display());
    fs::read_to_string(path).map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a full HTML document.
pub fn parse_html(source: &str) -> Document {
    let dom = parse_rcdom(source);
    let children = dom
        .document
        .children
        .borrow()
        .iter()
        .filter_map(convert)
        .collect();
    Document { children }
}

/// Parse markup that is not a full document.
pub fn parse_fragment(source: &str) -> Vec<Node> {
    let dom = parse_rcdom(source);
    let mut nodes = Vec::new();
    for child in dom.document.children.borrow().iter() {
        flatten_wrappers(child, &mut nodes);
    }
    nodes
}

fn parse_rcdom(source: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(source)
}

/// Copy `handle` into `out`, replacing the implied document wrappers by
/// their children.
fn flatten_wrappers(handle: &Handle, out: &mut Vec<Node>) {
    match &handle.data {
        NodeData::Doctype { .. } => {}
        NodeData::Element { name, .. } if is_wrapper(name) => {
            for child in handle.children.borrow().iter() {
                flatten_wrappers(child, out);
            }
        }
        _ => out.extend(convert(handle)),
    }
}

fn is_wrapper(name: &QualName) -> bool {
    namespace_of(name) == Namespace::Html && matches!(&*name.local, "html" | "head" | "body")
}

fn namespace_of(name: &QualName) -> Namespace {
    Namespace::from_uri(&name.ns)
}

fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", &**prefix, &*name.local),
        None => name.local.to_string(),
    }
}

/// Convert one rcdom node (and its subtree) into an owned [`Node`].
fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Document | NodeData::ProcessingInstruction { .. } => None,
        // Public and system identifiers are dropped; output is always an
        // HTML5 doctype.
        NodeData::Doctype { name, .. } => Some(Node::Doctype(Doctype {
            name: name.to_string(),
        })),
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attributes: Attributes = attrs
                .borrow()
                .iter()
                .map(|a| Attribute {
                    name: attribute_name(&a.name),
                    value: Some(a.value.to_string()),
                })
                .collect();

            // <template> keeps its parsed content in a separate fragment.
            let mut children: Vec<Node> = Vec::new();
            if let Some(contents) = template_contents.borrow().as_ref() {
                children.extend(contents.children.borrow().iter().filter_map(convert));
            }
            children.extend(handle.children.borrow().iter().filter_map(convert));

            Some(Node::Element(Element {
                name: name.local.to_string(),
                namespace: namespace_of(name),
                attributes,
                children,
            }))
        }
    }
}
