#![forbid(unsafe_code)]

//! Enveloped signature transform.
//!
//! Removes the `<ds:Signature>` element the reference belongs to, with all
//! of its descendants, from the node set.

use crate::pipeline::{Transform, TransformData};
use samlvakt_core::{algorithm, Error};

pub struct EnvelopedSignatureTransform {
    signature: roxmltree::NodeId,
}

impl EnvelopedSignatureTransform {
    /// Create with the id of the `<ds:Signature>` element to remove.
    pub fn new(signature: roxmltree::NodeId) -> Self {
        Self { signature }
    }
}

impl Transform for EnvelopedSignatureTransform {
    fn uri(&self) -> &str {
        algorithm::ENVELOPED_SIGNATURE
    }

    fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error> {
        match input {
            TransformData::NodeSet(mut node_set) => {
                let signature = doc.get_node(self.signature).ok_or_else(|| {
                    Error::Transform("enveloped signature not found in document".into())
                })?;
                node_set.remove_subtree(signature);
                Ok(TransformData::NodeSet(node_set))
            }
            TransformData::Octets(_) => Err(Error::Transform(
                "enveloped-signature transform requires XML input".into(),
            )),
        }
    }
}
