#![forbid(unsafe_code)]

//! URI resolution for XML-DSig references.
//!
//! Only same-document references are resolved:
//! - `""`: the whole document without comments
//! - `#id`: the element whose registered ID attribute equals `id`, as a
//!   subtree without comments
//!
//! External URIs and XPointer expressions are rejected.

use samlvakt_core::Error;
use samlvakt_xml::{IdMap, NodeSet};

/// A resolved reference: the element it designates and the node set to
/// feed into the transform chain.
pub struct ResolvedReference<'a, 'input> {
    pub target: roxmltree::Node<'a, 'input>,
    pub node_set: NodeSet,
}

/// Resolve a `Reference/@URI` value.
pub fn resolve_uri<'a, 'input>(
    uri: &str,
    doc: &'a roxmltree::Document<'input>,
    id_map: &IdMap,
) -> Result<ResolvedReference<'a, 'input>, Error> {
    if uri.is_empty() {
        return Ok(ResolvedReference {
            target: doc.root_element(),
            node_set: NodeSet::all_without_comments(doc),
        });
    }

    let Some(id) = uri.strip_prefix('#') else {
        return Err(Error::InvalidUri(format!("external URI not supported: {uri}")));
    };
    if id.is_empty() || id.starts_with("xpointer(") {
        return Err(Error::InvalidUri(format!("unsupported same-document reference: {uri}")));
    }

    let target = id_map
        .resolve(doc, id)
        .ok_or_else(|| Error::InvalidUri(format!("ID not found: {id}")))?;
    Ok(ResolvedReference {
        target,
        node_set: NodeSet::tree_without_comments(target),
    })
}
