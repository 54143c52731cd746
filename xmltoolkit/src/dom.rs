//! Arena-based DOM: nodes live in one `Vec` and reference each other by
//! index, so the tree has no back-pointer reference cycles and no
//! `Rc<RefCell<_>>` graphs to walk.

use itertools::Itertools as _;

/// An index into a [`Document`]'s node arena. Only valid for the `Document`
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// A namespace declaration collected from an element's `xmlns`/`xmlns:prefix`
/// attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for a default namespace declaration (`xmlns="..."`).
    pub prefix: Option<String>,
    /// The declared namespace URI.
    pub uri: String,
}

/// A non-namespace-declaration attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace prefix, if the attribute name was qualified.
    pub prefix: Option<String>,
    /// The local (unqualified) name.
    pub local_name: String,
    /// The attribute's decoded value.
    pub value: String,
    /// Resolved namespace URI, if `prefix` resolved to one. Unprefixed
    /// attributes never inherit the default namespace.
    pub namespace_uri: Option<String>,
}

impl Attribute {
    /// The attribute's qualified name (`prefix:local` or just `local`).
    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// An element node's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Namespace prefix, if the element name was qualified.
    pub prefix: Option<String>,
    /// The local (unqualified) name.
    pub local_name: String,
    /// Resolved namespace URI for the element name, if any.
    pub namespace_uri: Option<String>,
    /// Namespace declarations carried by this element, in source order.
    pub namespace_decls: Vec<NamespaceDecl>,
    /// Non-namespace-declaration attributes, in source order.
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// The element's qualified name (`prefix:local` or just `local`).
    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Looks up an attribute by local name, ignoring its prefix.
    pub fn attribute(&self, local_name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.local_name == local_name)
    }
}

/// The kind of content a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document's synthetic root (never has a parent, holds exactly the
    /// top-level element plus any preserved top-level comments/PIs).
    Document,
    /// An element node; its data lives alongside the arena entry.
    Element(Element),
    /// A run of character data.
    Text(String),
    /// A `CDATA` section, kept distinct from `Text` when `preserveCData`.
    CData(String),
    /// A comment's content, excluding the `<!--`/`-->` delimiters.
    Comment(String),
    /// A processing instruction's target and (optional) data.
    ProcessingInstruction {
        /// The PI target name.
        target: String,
        /// Everything after the target and its separating whitespace.
        data: String,
    },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The XML declaration's attributes, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDeclaration {
    /// The declared XML version (e.g. `"1.0"`).
    pub version: Option<String>,
    /// The declared encoding name, if any.
    pub encoding: Option<String>,
    /// The declared standalone value, if any.
    pub standalone: Option<bool>,
}

/// A parsed document: an arena of nodes plus the declaration that preceded
/// them.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    /// The `<?xml ... ?>` declaration, if one was present.
    pub declaration: XmlDeclaration,
}

impl Document {
    pub(crate) fn new() -> Self {
        Document {
            nodes: vec![NodeData { kind: NodeKind::Document, parent: None, children: Vec::new() }],
            root: NodeId(0),
            declaration: XmlDeclaration::default(),
        }
    }

    /// The synthetic document-root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root element, if the document has well-formed top-level content.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root).find(|&id| matches!(self.kind(id), NodeKind::Element(_)))
    }

    pub(crate) fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData { kind, parent: Some(parent), children: Vec::new() });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The node's content/data.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    /// The node's parent, or `None` for the document root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Direct children, in document order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.iter().copied()
    }

    /// Direct children that are elements, in document order.
    pub fn children_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&c| matches!(self.kind(c), NodeKind::Element(_)))
    }

    /// All descendants in document (pre-)order, not including `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(id) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// The element data for `id`, if it is an element node.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    /// The ancestor chain of `id`, innermost first, not including `id`
    /// itself, stopping at (and not including) the document root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == self.root {
                break;
            }
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Concatenated text-value of a node per XPath's string-value rules:
    /// text/CDATA nodes contribute their content; elements contribute the
    /// concatenation of their descendant text/CDATA, in document order.
    pub fn text_value(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(t) | NodeKind::CData(t) => t.clone(),
            NodeKind::Element(_) | NodeKind::Document => self
                .descendants(id)
                .into_iter()
                .filter_map(|d| match self.kind(d) {
                    NodeKind::Text(t) | NodeKind::CData(t) => Some(t.as_str()),
                    _ => None,
                })
                .join(""),
            NodeKind::Comment(_) | NodeKind::ProcessingInstruction { .. } => String::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_node_links_parent_and_child() {
        let mut doc = Document::new();
        let root = doc.root();
        let el = doc.push_node(
            root,
            NodeKind::Element(Element {
                prefix: None,
                local_name: "a".into(),
                namespace_uri: None,
                namespace_decls: Vec::new(),
                attributes: Vec::new(),
            }),
        );
        assert_eq!(doc.parent(el), Some(root));
        assert_eq!(doc.children(root).collect_vec(), vec![el]);
    }

    #[test]
    fn text_value_concatenates_descendant_text() {
        let mut doc = Document::new();
        let root = doc.root();
        let el = doc.push_node(
            root,
            NodeKind::Element(Element {
                prefix: None,
                local_name: "a".into(),
                namespace_uri: None,
                namespace_decls: Vec::new(),
                attributes: Vec::new(),
            }),
        );
        doc.push_node(el, NodeKind::Text("hello ".into()));
        doc.push_node(el, NodeKind::Comment("ignored".into()));
        doc.push_node(el, NodeKind::Text("world".into()));
        assert_eq!(doc.text_value(el), "hello world");
    }

    #[test]
    fn ancestors_stop_before_document_root() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.push_node(
            root,
            NodeKind::Element(Element {
                prefix: None,
                local_name: "a".into(),
                namespace_uri: None,
                namespace_decls: Vec::new(),
                attributes: Vec::new(),
            }),
        );
        let b = doc.push_node(
            a,
            NodeKind::Element(Element {
                prefix: None,
                local_name: "b".into(),
                namespace_uri: None,
                namespace_decls: Vec::new(),
                attributes: Vec::new(),
            }),
        );
        assert_eq!(doc.ancestors(b), vec![a]);
    }
}
