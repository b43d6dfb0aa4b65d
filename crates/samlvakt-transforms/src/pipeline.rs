#![forbid(unsafe_code)]

//! Transform pipeline and trait definitions.

use crate::enveloped::EnvelopedSignatureTransform;
use samlvakt_c14n::C14nMode;
use samlvakt_core::{algorithm, ns, Error};
use samlvakt_xml::{select, NodeSet};

/// Data flowing through the transform pipeline.
#[derive(Debug, Clone)]
pub enum TransformData {
    /// Nodes of the document being processed.
    NodeSet(NodeSet),
    /// Raw octets.
    Octets(Vec<u8>),
}

impl TransformData {
    /// Convert to octets, applying inclusive C14N 1.0 (without comments) to
    /// a node set.
    pub fn into_octets(self, doc: &roxmltree::Document<'_>) -> Result<Vec<u8>, Error> {
        match self {
            Self::Octets(data) => Ok(data),
            Self::NodeSet(node_set) => {
                samlvakt_c14n::canonicalize_doc(doc, C14nMode::Inclusive, Some(&node_set), &[])
            }
        }
    }
}

/// Trait for individual transforms.
pub trait Transform: Send + Sync {
    /// The algorithm URI for this transform.
    fn uri(&self) -> &str;

    /// Execute the transform on the given data from `doc`.
    fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error>;
}

/// A pipeline of transforms executed in sequence.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the pipeline for a `<ds:Reference>` from its optional
    /// `<ds:Transforms>` child.
    ///
    /// `signature` is the `<ds:Signature>` the reference belongs to; it is
    /// what the enveloped-signature transform removes. Any transform other
    /// than enveloped-signature or a supported canonicalization is an
    /// [`Error::UnsupportedAlgorithm`].
    pub fn from_transforms_node(
        transforms: Option<roxmltree::Node<'_, '_>>,
        signature: roxmltree::Node<'_, '_>,
    ) -> Result<Self, Error> {
        let mut pipeline = Self::new();
        let Some(transforms) = transforms else {
            return Ok(pipeline);
        };

        for node in select::find_child_elements(transforms, ns::DSIG, ns::node::TRANSFORM) {
            let uri = node.attribute(ns::attr::ALGORITHM).ok_or_else(|| {
                Error::MissingAttribute("Algorithm on Transform".into())
            })?;
            if uri == algorithm::ENVELOPED_SIGNATURE {
                pipeline.push(Box::new(EnvelopedSignatureTransform::new(signature.id())));
                continue;
            }
            match C14nMode::from_uri(uri) {
                Some(mode) => {
                    let prefixes = if mode.is_exclusive() {
                        read_inclusive_prefixes(node)
                    } else {
                        Vec::new()
                    };
                    pipeline.push(Box::new(C14nTransform::new(mode, prefixes)));
                }
                None => {
                    return Err(Error::UnsupportedAlgorithm(format!("transform: {uri}")));
                }
            }
        }
        Ok(pipeline)
    }

    /// Add a transform to the pipeline.
    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    /// Execute all transforms in order.
    pub fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error> {
        let mut data = input;
        for transform in &self.transforms {
            data = transform.execute(doc, data)?;
        }
        Ok(data)
    }

    /// URIs of the transforms, in order.
    pub fn uris(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.uri()).collect()
    }

    /// Number of transforms in the pipeline.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Read the `PrefixList` of an `<ec:InclusiveNamespaces>` child, if any.
pub fn read_inclusive_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    select::find_child_element(node, ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES)
        .and_then(|n| n.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

// ── C14N Transform ───────────────────────────────────────────────────

/// A canonicalization transform.
pub struct C14nTransform {
    mode: C14nMode,
    inclusive_prefixes: Vec<String>,
}

impl C14nTransform {
    pub fn new(mode: C14nMode, inclusive_prefixes: Vec<String>) -> Self {
        Self {
            mode,
            inclusive_prefixes,
        }
    }
}

impl Transform for C14nTransform {
    fn uri(&self) -> &str {
        self.mode.uri()
    }

    fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error> {
        let bytes = match input {
            TransformData::NodeSet(node_set) => samlvakt_c14n::canonicalize_doc(
                doc,
                self.mode,
                Some(&node_set),
                &self.inclusive_prefixes,
            )?,
            TransformData::Octets(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| Error::Transform(format!("invalid UTF-8: {e}")))?;
                samlvakt_c14n::canonicalize(text, self.mode, None, &self.inclusive_prefixes)?
            }
        };
        Ok(TransformData::Octets(bytes))
    }
}
