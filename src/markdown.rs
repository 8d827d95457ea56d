//! Markdown section splicing.
//!
//! `<section data-markdown="path">` gets the referenced fragment appended
//! as children. A fragment whose first `<div>` carries `data-load="path"`
//! is replaced wholesale by `<div data-animate>` holding the SVG and the
//! fragment's marker comment.
//!
//! All reference values resolve against the entry file's directory, never
//! against the file that contains the reference.

use std::path::{Path, PathBuf};

use crate::dom::{self, Document, Element, Node};
use crate::error::{BundleError, Result};
use crate::load;

pub const MARKDOWN_ATTR: &str = "data-markdown";
pub const LOAD_ATTR: &str = "data-load";
pub const ANIMATE_ATTR: &str = "data-animate";

/// Join a reference value onto the entry directory.
///
/// A leading `/` is ignored so the value cannot escape to the filesystem
/// root. Empty values are rejected.
pub fn resolve_reference(
    entry_dir: &Path,
    value: &str,
    element: &'static str,
    attribute: &'static str,
) -> Result<PathBuf> {
    let relative = value.trim_start_matches('/');
    if relative.is_empty() {
        return Err(BundleError::EmptyReference { element, attribute });
    }
    Ok(entry_dir.join(relative))
}

fn has_markdown_source(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| el.is("section") && el.attributes.contains(MARKDOWN_ATTR))
}

/// Splice every markdown section of `doc`, in document order. Returns the
/// number of sections processed.
///
/// Sections are collected before the first splice, so sections arriving
/// inside spliced content are not expanded.
pub fn splice_markdown_sections(doc: &mut Document, entry_dir: &Path) -> Result<usize> {
    let paths = dom::find_paths(&doc.children, &has_markdown_source);

    for path in &paths {
        let Some(section) = dom::element_at_mut(&mut doc.children, path) else {
            continue;
        };
        let value = match section.attributes.remove(MARKDOWN_ATTR) {
            Some(value) => value.unwrap_or_default(),
            None => continue,
        };
        let fragment_path = resolve_reference(entry_dir, &value, "section", MARKDOWN_ATTR)?;
        let content = resolve_fragment(&fragment_path, entry_dir)?;
        section.children.extend(content);
    }

    Ok(paths.len())
}

/// Load a markdown fragment and apply its SVG indirection, if any.
///
/// Returns the nodes to append to the section: the fragment unchanged, or a
/// single `<div data-animate>` when the fragment's first `<div>` has
/// `data-load`.
pub fn resolve_fragment(fragment_path: &Path, entry_dir: &Path) -> Result<Vec<Node>> {
    let mut fragment = load::load_fragment(fragment_path)?;

    let svg_ref = dom::find_first(&fragment, &dom::is_element("div"))
        .and_then(Node::as_element)
        .and_then(|div| div.attributes.get(LOAD_ATTR))
        .map(|value| value.unwrap_or_default().to_owned());

    let Some(svg_ref) = svg_ref else {
        log::debug!("[markdown] spliced fragment='{}'", fragment_path.display());
        return Ok(fragment);
    };

    let svg_path = resolve_reference(entry_dir, &svg_ref, "div", LOAD_ATTR)?;

    // Exactly one comment marks the animation; anything else is ambiguous.
    let found = dom::count(&fragment, &dom::is_comment);
    if found != 1 {
        return Err(BundleError::MarkerComment {
            path: fragment_path.to_path_buf(),
            found,
        });
    }

    let svg = load::load_fragment(&svg_path)?;
    let marker = dom::take_first(&mut fragment, &dom::is_comment);

    let mut animate = Element::new("div");
    animate.attributes.set(ANIMATE_ATTR, None);
    animate.children = svg;
    animate.children.extend(marker);

    log::debug!(
        "[markdown] spliced fragment='{}' svg='{}'",
        fragment_path.display(),
        svg_path.display()
    );
    Ok(vec![Node::Element(animate)])
}
