#![forbid(unsafe_code)]

//! Canonical XML 1.0 (inclusive C14N).
//!
//! Algorithm URI: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315`
//! With comments: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments`
//!
//! Every in-scope namespace is rendered on a visible element unless the
//! nearest output ancestor already rendered the same binding. For document
//! subsets, `xml:*` attributes of omitted ancestors are inherited.

use crate::render::{self, Attr, NamespacePolicy, NsDecl, RenderedNamespaces, Walker};
use samlvakt_core::Error;
use samlvakt_xml::NodeSet;

/// Canonicalize using Canonical XML 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
) -> Result<Vec<u8>, Error> {
    Ok(Walker::new(InclusivePolicy, with_comments, node_set).run(doc))
}

struct InclusivePolicy;

impl NamespacePolicy for InclusivePolicy {
    fn declarations(
        &self,
        node: roxmltree::Node<'_, '_>,
        rendered: &RenderedNamespaces,
    ) -> Vec<NsDecl> {
        let in_scope = render::in_scope_namespaces(node);
        let mut decls: Vec<NsDecl> = in_scope
            .iter()
            .filter(|(prefix, uri)| rendered.get(*prefix) != Some(*uri))
            .map(|(prefix, uri)| NsDecl {
                prefix: prefix.clone(),
                uri: uri.clone(),
            })
            .collect();

        let default_rendered = rendered.get("").is_some_and(|uri| !uri.is_empty());
        if default_rendered && !in_scope.contains_key("") {
            decls.push(NsDecl {
                prefix: String::new(),
                uri: String::new(),
            });
        }
        decls
    }

    fn inherited_attrs(
        &self,
        node: roxmltree::Node<'_, '_>,
        node_set: Option<&NodeSet>,
    ) -> Vec<Attr> {
        let Some(set) = node_set else {
            return Vec::new();
        };

        let own = render::element_attrs(node);
        let mut inherited: Vec<Attr> = Vec::new();
        for ancestor in node.ancestors().skip(1).filter(|n| n.is_element()) {
            if set.contains(ancestor) {
                break;
            }
            for attr in render::element_attrs(ancestor) {
                if !render::is_xml_attr(&attr) {
                    continue;
                }
                let seen = own
                    .iter()
                    .chain(inherited.iter())
                    .any(|a| a.ns_uri == attr.ns_uri && a.local_name == attr.local_name);
                if !seen {
                    inherited.push(attr);
                }
            }
        }
        inherited
    }
}
