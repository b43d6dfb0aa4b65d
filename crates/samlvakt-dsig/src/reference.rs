#![forbid(unsafe_code)]

//! Reference validation.
//!
//! For each `<ds:Reference>`: resolve the URI, run the transform chain,
//! digest the result and compare against `DigestValue`. On top of the
//! per-reference digests, at least one reference must designate the element
//! the signature is enveloped in; a signature whose references all point
//! elsewhere does not vouch for the content it appears to sign.

use crate::context::DsigContext;
use crate::locate::{ReferenceEntry, SignatureBlock};
use samlvakt_core::{Error, RejectReason, Rejection};
use samlvakt_crypto::digest;
use samlvakt_transforms::{uri, TransformData, TransformPipeline};
use samlvakt_xml::IdMap;

/// Validate every reference of `block`.
///
/// Fails with [`RejectReason::ReferenceMismatch`] for duplicate ID values,
/// zero references, unresolved URIs, digest mismatches and signatures that
/// do not cover their enveloping element; with
/// [`RejectReason::UnsupportedAlgorithm`] for unknown transforms or digest
/// methods.
pub fn validate_references(
    doc: &roxmltree::Document<'_>,
    block: &SignatureBlock<'_, '_>,
    ctx: &DsigContext,
) -> Result<(), Rejection> {
    let mismatch = |e: Error| Rejection::from_error(RejectReason::ReferenceMismatch, e);

    let ids = IdMap::build(doc, &ctx.id_attrs).map_err(mismatch)?;

    if block.references.is_empty() {
        return Err(Rejection::new(
            RejectReason::ReferenceMismatch,
            "SignedInfo contains no Reference",
        ));
    }

    let mut covers_enveloping = false;
    for reference in &block.references {
        let target = validate_reference(doc, block, reference, &ids).map_err(mismatch)?;
        tracing::debug!(
            uri = %reference.uri,
            digest_method = %reference.digest_method,
            "reference digest matches"
        );
        if target == block.enveloping.id() {
            covers_enveloping = true;
        }
    }

    if !covers_enveloping {
        return Err(Rejection::new(
            RejectReason::ReferenceMismatch,
            format!(
                "no reference covers the signed element (ID={})",
                block.enveloping.attribute("ID").unwrap_or("<none>")
            ),
        ));
    }
    Ok(())
}

/// Check one reference's digest and return the element it designates.
fn validate_reference(
    doc: &roxmltree::Document<'_>,
    block: &SignatureBlock<'_, '_>,
    reference: &ReferenceEntry<'_, '_>,
    ids: &IdMap,
) -> Result<roxmltree::NodeId, Error> {
    let pipeline = TransformPipeline::from_transforms_node(reference.transforms, block.signature)?;
    let mut hasher = digest::from_uri(&reference.digest_method)?;

    let resolved = uri::resolve_uri(&reference.uri, doc, ids)?;
    let octets = pipeline
        .execute(doc, TransformData::NodeSet(resolved.node_set))?
        .into_octets(doc)?;

    hasher.update(&octets);
    if hasher.finalize() != reference.digest_value {
        return Err(Error::DigestMismatch(format!(
            "URI={}: expected digest does not match computed digest",
            reference.uri
        )));
    }
    Ok(resolved.target.id())
}
