#![forbid(unsafe_code)]

//! Node sets for document-subset canonicalization.
//!
//! A `NodeSet` records which nodes of a parsed document are visible to the
//! canonicalizer. Namespace and attribute nodes are not tracked separately:
//! they are visible exactly when their owner element is.

use std::collections::HashSet;

/// A set of nodes from one parsed `roxmltree` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: HashSet<usize>,
}

impl NodeSet {
    /// The whole document, comments included.
    pub fn all(doc: &roxmltree::Document<'_>) -> Self {
        Self::tree_with_comments(doc.root())
    }

    /// The whole document without comments, as selected by `URI=""`.
    pub fn all_without_comments(doc: &roxmltree::Document<'_>) -> Self {
        Self::tree_without_comments(doc.root())
    }

    /// The subtree rooted at `root`, comments included.
    pub fn tree_with_comments(root: roxmltree::Node<'_, '_>) -> Self {
        Self {
            nodes: root.descendants().map(|n| n.id().get_usize()).collect(),
        }
    }

    /// The subtree rooted at `root` with comment nodes left out.
    pub fn tree_without_comments(root: roxmltree::Node<'_, '_>) -> Self {
        Self {
            nodes: root
                .descendants()
                .filter(|n| !n.is_comment())
                .map(|n| n.id().get_usize())
                .collect(),
        }
    }

    /// Whether `node` is in the set.
    pub fn contains(&self, node: roxmltree::Node<'_, '_>) -> bool {
        self.nodes.contains(&node.id().get_usize())
    }

    /// Remove `node` and all of its descendants.
    pub fn remove_subtree(&mut self, node: roxmltree::Node<'_, '_>) {
        for n in node.descendants() {
            self.nodes.remove(&n.id().get_usize());
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
