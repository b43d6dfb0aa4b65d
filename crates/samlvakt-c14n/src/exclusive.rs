#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 (exc-C14N).
//!
//! Algorithm URI: `http://www.w3.org/2001/10/xml-exc-c14n#`
//! With comments: `http://www.w3.org/2001/10/xml-exc-c14n#WithComments`
//!
//! Only visibly utilized namespaces are rendered: the element's own prefix,
//! prefixes of its qualified attributes, and whatever the
//! `InclusiveNamespaces` PrefixList names (`#default` meaning the default
//! namespace).

use crate::render::{self, NamespacePolicy, NsDecl, RenderedNamespaces, Walker};
use samlvakt_core::Error;
use samlvakt_xml::{select, NodeSet};
use std::collections::BTreeSet;

/// Canonicalize using Exclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let policy = ExclusivePolicy {
        inclusive_prefixes: inclusive_prefixes
            .iter()
            .map(|p| if p == "#default" { String::new() } else { p.clone() })
            .collect(),
    };
    Ok(Walker::new(policy, with_comments, node_set).run(doc))
}

struct ExclusivePolicy {
    inclusive_prefixes: BTreeSet<String>,
}

impl ExclusivePolicy {
    fn utilized_prefixes(&self, node: roxmltree::Node<'_, '_>) -> BTreeSet<String> {
        let mut utilized = self.inclusive_prefixes.clone();
        utilized.insert(select::element_prefix(node).to_owned());
        for attr in node.attributes() {
            if let Some(prefix) = select::attribute_prefix(node, &attr) {
                utilized.insert(prefix.to_owned());
            }
        }
        utilized.remove("xml");
        utilized
    }
}

impl NamespacePolicy for ExclusivePolicy {
    fn declarations(
        &self,
        node: roxmltree::Node<'_, '_>,
        rendered: &RenderedNamespaces,
    ) -> Vec<NsDecl> {
        let in_scope = render::in_scope_namespaces(node);
        let mut decls = Vec::new();
        for prefix in self.utilized_prefixes(node) {
            match in_scope.get(&prefix) {
                Some(uri) => {
                    if rendered.get(&prefix) != Some(uri) {
                        decls.push(NsDecl {
                            prefix,
                            uri: uri.clone(),
                        });
                    }
                }
                None if prefix.is_empty() => {
                    if rendered.get("").is_some_and(|uri| !uri.is_empty()) {
                        decls.push(NsDecl {
                            prefix,
                            uri: String::new(),
                        });
                    }
                }
                None => {}
            }
        }
        decls
    }
}
