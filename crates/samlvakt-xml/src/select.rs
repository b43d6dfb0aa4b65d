#![forbid(unsafe_code)]

//! Namespace-aware lookup helpers over `roxmltree` nodes.

/// Whether `node` is an element named `{ns}local`.
pub fn is_element(node: roxmltree::Node<'_, '_>, ns: &str, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(ns)
}

/// First child element named `{ns}local`.
pub fn find_child_element<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    ns: &str,
    local: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| is_element(*n, ns, local))
}

/// Every child element named `{ns}local`, in document order.
pub fn find_child_elements<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    ns: &str,
    local: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    node.children().filter(|n| is_element(*n, ns, local)).collect()
}

/// Every element in the document whose local name is `local`, whatever
/// namespace it lives in.
pub fn elements_by_local_name<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    local: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == local)
        .collect()
}

/// Concatenated text of every text descendant of `node`.
///
/// Comments and processing instructions split a value into several text
/// nodes; they are skipped and the pieces joined.
pub fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// The element's tag exactly as written in the source, e.g. `saml:Assertion`.
///
/// roxmltree resolves prefixes away, so the tag is read back from the input
/// text using the node's byte range.
pub fn qualified_name<'input>(node: roxmltree::Node<'_, 'input>) -> &'input str {
    let text = node.document().input_text();
    let Some(rest) = text.get(node.range().start + 1..) else {
        return node.tag_name().name();
    };
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// The element's prefix as written in the source, `""` when unprefixed.
pub fn element_prefix<'input>(node: roxmltree::Node<'_, 'input>) -> &'input str {
    match qualified_name(node).split_once(':') {
        Some((prefix, _)) => prefix,
        None => "",
    }
}

/// The attribute's prefix as written in the source, `None` when unprefixed.
///
/// Like [`qualified_name`], this reads the source text: several prefixes may
/// be bound to the attribute's namespace and only the written one is right.
pub fn attribute_prefix<'input>(
    node: roxmltree::Node<'_, 'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> Option<&'input str> {
    attr.namespace()?;
    let qname = node.document().input_text().get(attr.range_qname())?;
    qname.split_once(':').map(|(prefix, _)| prefix)
}

/// `prefix:local` or `local` for an attribute.
pub fn attribute_qualified_name<'input>(
    node: roxmltree::Node<'_, 'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> String {
    match attribute_prefix(node, attr) {
        Some(prefix) => format!("{prefix}:{}", attr.name()),
        None => attr.name().to_owned(),
    }
}
