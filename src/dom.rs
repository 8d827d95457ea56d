//! Owned markup tree.
//!
//! The parser's reference-counted DOM is converted into this plain tree on
//! load (see [`crate::load`]). Every node has exactly one owner, so splicing
//! a fragment into the document is a move and no node can be reachable from
//! two places at once.
//!
//! Lookups that feed a mutation return a [`NodePath`] rather than a
//! reference: callers collect all paths first, then mutate.

/// Namespace of an element, as assigned by the HTML tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
    MathMl,
}

impl Namespace {
    const HTML_URI: &'static str = "http://www.w3.org/1999/xhtml";
    const SVG_URI: &'static str = "http://www.w3.org/2000/svg";
    const MATHML_URI: &'static str = "http://www.w3.org/1998/Math/MathML";

    /// Namespace URI as used by the tree builder.
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => Self::HTML_URI,
            Namespace::Svg => Self::SVG_URI,
            Namespace::MathMl => Self::MATHML_URI,
        }
    }

    /// Map a tree-builder namespace URI; anything unknown is treated as HTML.
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            Self::SVG_URI => Namespace::Svg,
            Self::MATHML_URI => Namespace::MathMl,
            _ => Namespace::Html,
        }
    }
}

/// A single attribute. `value: None` is a boolean-style attribute written
/// without `=`, as opposed to `Some(String::new())`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// Attributes of an element, kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    /// `None` if the attribute is absent, `Some(None)` if it is present
    /// without a value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.0
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|a| a.name == name)
    }

    /// Set or replace an attribute, keeping its position if it already exists.
    pub fn set(&mut self, name: &str, value: Option<String>) {
        match self.0.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.0.push(Attribute {
                name: name.to_owned(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        let idx = self.0.iter().position(|a| a.name == name)?;
        Some(self.0.remove(idx).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub namespace: Namespace,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    /// A new, empty HTML element.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            namespace: Namespace::Html,
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    /// True for an HTML element with the given local name.
    pub fn is(&self, name: &str) -> bool {
        self.namespace == Namespace::Html && self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Doctype(Doctype),
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            _ => &[],
        }
    }
}

/// A parsed document: the top-level nodes of the entry file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

/// Child indices leading from a list of root nodes to one node.
pub type NodePath = Vec<usize>;

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Pre-order (document order) search for the first node matching `pred`.
pub fn find_first<'a, F>(nodes: &'a [Node], pred: &F) -> Option<&'a Node>
where
    F: Fn(&Node) -> bool,
{
    for node in nodes {
        if pred(node) {
            return Some(node);
        }
        if let Some(found) = find_first(node.children(), pred) {
            return Some(found);
        }
    }
    None
}

/// Paths of every node matching `pred`, in document order.
pub fn find_paths<F>(nodes: &[Node], pred: &F) -> Vec<NodePath>
where
    F: Fn(&Node) -> bool,
{
    let mut paths = Vec::new();
    let mut prefix = Vec::new();
    collect_paths(nodes, pred, &mut prefix, &mut paths);
    paths
}

fn collect_paths<F>(nodes: &[Node], pred: &F, prefix: &mut NodePath, out: &mut Vec<NodePath>)
where
    F: Fn(&Node) -> bool,
{
    for (i, node) in nodes.iter().enumerate() {
        prefix.push(i);
        if pred(node) {
            out.push(prefix.clone());
        }
        collect_paths(node.children(), pred, prefix, out);
        prefix.pop();
    }
}

/// Count the nodes matching `pred` anywhere in the tree.
pub fn count<F>(nodes: &[Node], pred: &F) -> usize
where
    F: Fn(&Node) -> bool,
{
    nodes
        .iter()
        .map(|n| usize::from(pred(n)) + count(n.children(), pred))
        .sum()
}

/// Mutable access to the node at `path`.
pub fn node_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (&first, rest) = path.split_first()?;
    let node = nodes.get_mut(first)?;
    if rest.is_empty() {
        return Some(node);
    }
    match node {
        Node::Element(el) => node_at_mut(&mut el.children, rest),
        _ => None,
    }
}

/// Shared access to the element at `path`.
#[cfg(test)]
pub fn element_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Element> {
    let (&first, rest) = path.split_first()?;
    let el = nodes.get(first)?.as_element()?;
    if rest.is_empty() {
        Some(el)
    } else {
        element_at(&el.children, rest)
    }
}

/// Mutable access to the element at `path`; `None` if the path is stale or
/// points at a non-element node.
pub fn element_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Element> {
    match node_at_mut(nodes, path)? {
        Node::Element(el) => Some(el),
        _ => None,
    }
}

/// Detach the first node (pre-order) matching `pred` from the tree.
pub fn take_first<F>(nodes: &mut Vec<Node>, pred: &F) -> Option<Node>
where
    F: Fn(&Node) -> bool,
{
    let path = find_paths(nodes, pred).into_iter().next()?;
    let (&last, parents) = path.split_last()?;
    let siblings = if parents.is_empty() {
        nodes
    } else {
        &mut element_at_mut(nodes, parents)?.children
    };
    Some(siblings.remove(last))
}

/// Matches HTML elements with the given local name.
pub fn is_element(name: &'static str) -> impl Fn(&Node) -> bool {
    move |node| node.as_element().is_some_and(|el| el.is(name))
}

/// Matches any comment node.
pub fn is_comment(node: &Node) -> bool {
    matches!(node, Node::Comment(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(name: &str, children: Vec<Node>) -> Node {
        let mut e = Element::new(name);
        e.children = children;
        Node::Element(e)
    }

    fn sample() -> Vec<Node> {
        vec![
            el(
                "section",
                vec![
                    Node::Text("intro".to_owned()),
                    el("div", vec![Node::Comment("inner".to_owned())]),
                ],
            ),
            el("div", vec![]),
            Node::Comment("outer".to_owned()),
        ]
    }

    #[test]
    fn attribute_presence_is_not_truthiness() {
        let mut attrs = Attributes::default();
        attrs.set("data-markdown", Some(String::new()));
        attrs.set("data-animate", None);

        assert_eq!(attrs.get("data-markdown"), Some(Some("")));
        assert_eq!(attrs.get("data-animate"), Some(None));
        assert_eq!(attrs.get("data-load"), None);
        assert!(attrs.contains("data-animate"));
    }

    #[test]
    fn set_replaces_in_place() {
        let mut attrs: Attributes = [
            Attribute {
                name: "a".to_owned(),
                value: Some("1".to_owned()),
            },
            Attribute {
                name: "b".to_owned(),
                value: Some("2".to_owned()),
            },
        ]
        .into_iter()
        .collect();
        attrs.set("a", Some("3".to_owned()));
        let names: Vec<_> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(attrs.get("a"), Some(Some("3")));
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut attrs = Attributes::default();
        attrs.set("data-markdown", Some("a.md".to_owned()));
        assert_eq!(attrs.remove("data-markdown"), Some(Some("a.md".to_owned())));
        assert_eq!(attrs.remove("data-markdown"), None);
    }

    #[test]
    fn find_first_is_preorder() {
        let nodes = sample();
        let div = find_first(&nodes, &is_element("div")).expect("div");
        // The nested div comes before the top-level one in document order.
        assert_eq!(
            div.as_element().map(|e| e.children.len()),
            Some(1),
            "expected the nested div"
        );
    }

    #[test]
    fn find_paths_in_document_order() {
        let nodes = sample();
        assert_eq!(find_paths(&nodes, &is_element("div")), vec![vec![0, 1], vec![1]]);
        assert_eq!(find_paths(&nodes, &is_comment), vec![vec![0, 1, 0], vec![2]]);
    }

    #[test]
    fn count_walks_whole_tree() {
        assert_eq!(count(&sample(), &is_comment), 2);
        assert_eq!(count(&sample(), &is_element("script")), 0);
    }

    #[test]
    fn take_first_detaches_nested_node() {
        let mut nodes = sample();
        let taken = take_first(&mut nodes, &is_comment);
        assert_eq!(taken, Some(Node::Comment("inner".to_owned())));
        assert_eq!(count(&nodes, &is_comment), 1);
    }

    #[test]
    fn element_at_mut_rejects_text_paths() {
        let mut nodes = sample();
        assert!(element_at_mut(&mut nodes, &[0, 0]).is_none());
        assert!(element_at_mut(&mut nodes, &[0, 1]).is_some());
        assert!(element_at_mut(&mut nodes, &[9]).is_none());
    }
}
