#![forbid(unsafe_code)]

//! Document walk and start-tag rendering shared by both C14N variants.
//!
//! The two variants differ only in which namespace declarations an element
//! start tag carries (and, for inclusive C14N, in `xml:*` attribute
//! inheritance). That difference is captured by [`NamespacePolicy`]; the
//! walk over text, comments, processing instructions and element nesting
//! lives in [`Walker`].

use crate::escape;
use samlvakt_core::ns;
use samlvakt_xml::{select, NodeSet};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Namespace bindings rendered by the nearest output ancestor,
/// prefix (`""` for the default namespace) to URI.
pub type RenderedNamespaces = BTreeMap<String, String>;

/// A namespace declaration to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// The prefix, `""` for the default namespace.
    pub prefix: String,
    /// The namespace URI, `""` for an `xmlns=""` undeclaration.
    pub uri: String,
}

impl NsDecl {
    fn write(&self, out: &mut Vec<u8>) {
        if self.prefix.is_empty() {
            out.extend_from_slice(b" xmlns=\"");
        } else {
            out.extend_from_slice(b" xmlns:");
            out.extend_from_slice(self.prefix.as_bytes());
            out.extend_from_slice(b"=\"");
        }
        out.extend_from_slice(escape::escape_attr(&self.uri).as_bytes());
        out.push(b'"');
    }
}

// The default namespace sorts first, then by prefix.
impl Ord for NsDecl {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.prefix.is_empty(), other.prefix.is_empty()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self.prefix.cmp(&other.prefix),
        }
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Namespace URI, `""` for unqualified attributes.
    pub ns_uri: String,
    pub local_name: String,
    /// `prefix:local` or `local`.
    pub qualified_name: String,
    pub value: String,
}

impl Attr {
    fn from_node(node: roxmltree::Node<'_, '_>, attr: &roxmltree::Attribute<'_, '_>) -> Self {
        Self {
            ns_uri: attr.namespace().unwrap_or("").to_owned(),
            local_name: attr.name().to_owned(),
            qualified_name: select::attribute_qualified_name(node, attr),
            value: attr.value().to_owned(),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.push(b' ');
        out.extend_from_slice(self.qualified_name.as_bytes());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(escape::escape_attr(&self.value).as_bytes());
        out.push(b'"');
    }
}

// Unqualified attributes first, by local name; then by (namespace URI, local name).
impl Ord for Attr {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.ns_uri.is_empty(), other.ns_uri.is_empty()) {
            (true, true) => self.local_name.cmp(&other.local_name),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .ns_uri
                .cmp(&other.ns_uri)
                .then_with(|| self.local_name.cmp(&other.local_name)),
        }
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Every namespace binding in scope on `node`, excluding `xml` and empty
/// (undeclared) default namespaces.
pub fn in_scope_namespaces(node: roxmltree::Node<'_, '_>) -> RenderedNamespaces {
    node.namespaces()
        .filter(|ns| ns.name() != Some("xml") && !ns.uri().is_empty())
        .map(|ns| (ns.name().unwrap_or("").to_owned(), ns.uri().to_owned()))
        .collect()
}

/// The attributes written on `node`'s own start tag.
pub fn element_attrs(node: roxmltree::Node<'_, '_>) -> Vec<Attr> {
    node.attributes().map(|a| Attr::from_node(node, &a)).collect()
}

/// Whether `attr` lives in the `xml` namespace.
pub fn is_xml_attr(attr: &Attr) -> bool {
    attr.ns_uri == ns::XML
}

/// Per-variant namespace handling on visible element start tags.
pub trait NamespacePolicy {
    /// Namespace declarations to emit on a visible element, given what the
    /// nearest output ancestor already rendered.
    fn declarations(&self, node: roxmltree::Node<'_, '_>, rendered: &RenderedNamespaces)
        -> Vec<NsDecl>;

    /// Extra attributes the element picks up from outside the node set.
    fn inherited_attrs(
        &self,
        _node: roxmltree::Node<'_, '_>,
        _node_set: Option<&NodeSet>,
    ) -> Vec<Attr> {
        Vec::new()
    }
}

/// Walks a parsed document in document order and writes the canonical form.
pub struct Walker<'a, P> {
    policy: P,
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    out: Vec<u8>,
}

impl<'a, P: NamespacePolicy> Walker<'a, P> {
    pub fn new(policy: P, with_comments: bool, node_set: Option<&'a NodeSet>) -> Self {
        Self {
            policy,
            with_comments,
            node_set,
            out: Vec::new(),
        }
    }

    /// Canonicalize the whole of `doc` (restricted to the node set, if any).
    pub fn run(mut self, doc: &roxmltree::Document<'_>) -> Vec<u8> {
        self.node(doc.root(), &RenderedNamespaces::new());
        self.out
    }

    fn is_visible(&self, node: roxmltree::Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |set| set.contains(node))
    }

    fn node(&mut self, node: roxmltree::Node<'_, '_>, rendered: &RenderedNamespaces) {
        match node.node_type() {
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.node(child, rendered);
                }
            }
            roxmltree::NodeType::Element => self.element(node, rendered),
            roxmltree::NodeType::Text => {
                if self.is_visible(node) {
                    let text = node.text().unwrap_or("");
                    self.out.extend_from_slice(escape::escape_text(text).as_bytes());
                }
            }
            roxmltree::NodeType::Comment => {
                if self.with_comments && self.is_visible(node) {
                    let text = node.text().unwrap_or("");
                    self.top_level(node, |out| {
                        out.extend_from_slice(b"<!--");
                        out.extend_from_slice(text.as_bytes());
                        out.extend_from_slice(b"-->");
                    });
                }
            }
            roxmltree::NodeType::PI => {
                if self.is_visible(node) {
                    if let Some(pi) = node.pi() {
                        self.top_level(node, |out| {
                            out.extend_from_slice(b"<?");
                            out.extend_from_slice(pi.target.as_bytes());
                            if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
                                out.push(b' ');
                                out.extend_from_slice(escape::escape_pi(value).as_bytes());
                            }
                            out.extend_from_slice(b"?>");
                        });
                    }
                }
            }
        }
    }

    /// Write a comment or PI, separating it from the document element with
    /// a newline when it sits outside of it.
    fn top_level(&mut self, node: roxmltree::Node<'_, '_>, write: impl FnOnce(&mut Vec<u8>)) {
        let at_root = node.parent().is_some_and(|p| p.is_root());
        if at_root && node.prev_siblings().skip(1).any(|n| n.is_element()) {
            self.out.push(b'\n');
        }
        write(&mut self.out);
        if at_root && node.next_siblings().skip(1).any(|n| n.is_element()) {
            self.out.push(b'\n');
        }
    }

    fn element(&mut self, node: roxmltree::Node<'_, '_>, rendered: &RenderedNamespaces) {
        if !self.is_visible(node) {
            for child in node.children() {
                self.node(child, rendered);
            }
            return;
        }

        let mut decls = self.policy.declarations(node, rendered);
        decls.sort();

        let mut attrs = element_attrs(node);
        attrs.extend(self.policy.inherited_attrs(node, self.node_set));
        attrs.sort();

        let qname = select::qualified_name(node);
        self.out.push(b'<');
        self.out.extend_from_slice(qname.as_bytes());
        for decl in &decls {
            decl.write(&mut self.out);
        }
        for attr in &attrs {
            attr.write(&mut self.out);
        }
        self.out.push(b'>');

        let mut child_rendered = rendered.clone();
        for decl in decls {
            child_rendered.insert(decl.prefix, decl.uri);
        }
        for child in node.children() {
            self.node(child, &child_rendered);
        }

        self.out.extend_from_slice(b"</");
        self.out.extend_from_slice(qname.as_bytes());
        self.out.push(b'>');
    }
}
