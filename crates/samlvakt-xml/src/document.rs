#![forbid(unsafe_code)]

//! Owned SAML document with ID attribute registration.

use crate::select;
use samlvakt_core::{ns, Error};
use std::collections::HashMap;

/// An owned, well-formed SAML Response document.
///
/// The text is stored and re-parsed on demand with [`AssertionDocument::parse_doc`],
/// which returns a `roxmltree::Document` borrowing from it. Parsed trees are
/// read-only, so nothing downstream can rewrite the bytes that were signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionDocument {
    text: String,
}

impl AssertionDocument {
    /// Parse and validate XML, taking ownership of the text.
    ///
    /// Fails unless the text is well-formed and its document element is a
    /// SAML 2.0 protocol `Response`.
    pub fn parse(text: impl Into<String>) -> Result<Self, Error> {
        let text = text.into();
        {
            let doc = roxmltree::Document::parse_with_options(&text, crate::parsing_options())
                .map_err(|e| Error::XmlParse(e.to_string()))?;
            let root = doc.root_element();
            if !select::is_element(root, ns::SAML_PROTOCOL, ns::node::RESPONSE) {
                return Err(Error::XmlStructure(format!(
                    "document element is {{{}}}{}, expected samlp:Response",
                    root.tag_name().namespace().unwrap_or(""),
                    root.tag_name().name()
                )));
            }
        }
        Ok(Self { text })
    }

    /// Parse and validate XML from bytes.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::XmlParse(format!("invalid UTF-8: {e}")))?
            .to_owned();
        Self::parse(text)
    }

    /// The raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// An independent copy of this document.
    pub fn working_copy(&self) -> Self {
        Self {
            text: self.text.clone(),
        }
    }

    /// Parse the stored text into a temporary tree.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        roxmltree::Document::parse_with_options(&self.text, crate::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))
    }
}

/// Map from ID attribute value to the element carrying it.
#[derive(Debug, Default)]
pub struct IdMap {
    ids: HashMap<String, roxmltree::NodeId>,
}

impl IdMap {
    /// Register every element carrying one of `attr_names`.
    ///
    /// An ID value that appears twice anywhere in the document is an error.
    pub fn build(doc: &roxmltree::Document<'_>, attr_names: &[String]) -> Result<Self, Error> {
        let mut ids = HashMap::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            for attr_name in attr_names {
                if let Some(value) = node.attribute(attr_name.as_str()) {
                    if ids.insert(value.to_owned(), node.id()).is_some() {
                        return Err(Error::XmlStructure(format!("duplicate ID value: {value}")));
                    }
                }
            }
        }
        Ok(Self { ids })
    }

    /// Find an element by its registered ID value.
    pub fn resolve<'a, 'input>(
        &self,
        doc: &'a roxmltree::Document<'input>,
        id: &str,
    ) -> Option<roxmltree::Node<'a, 'input>> {
        let node_id = self.ids.get(id)?;
        doc.get_node(*node_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_r1"><saml:Assertion ID="_a1"/></samlp:Response>"#;

    #[test]
    fn test_parse_response() {
        let doc = AssertionDocument::parse(RESPONSE).unwrap();
        assert_eq!(doc.text(), RESPONSE);
    }

    #[test]
    fn test_parse_rejects_non_response_root() {
        let xml =
            r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_a1"/>"#;
        let err = AssertionDocument::parse(xml).unwrap_err();
        assert!(matches!(err, Error::XmlStructure(_)));
    }

    #[test]
    fn test_parse_rejects_response_in_wrong_namespace() {
        let xml = r#"<Response xmlns="urn:example" ID="_r1"/>"#;
        assert!(AssertionDocument::parse(xml).is_err());
    }

    #[test]
    fn test_parse_rejects_dtd() {
        let xml = r#"<!DOCTYPE r [<!ENTITY e "x">]><samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol">&e;</samlp:Response>"#;
        assert!(matches!(AssertionDocument::parse(xml), Err(Error::XmlParse(_))));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            AssertionDocument::parse("<samlp:Response"),
            Err(Error::XmlParse(_))
        ));
    }

    #[test]
    fn test_working_copy_is_independent() {
        let original = AssertionDocument::parse(RESPONSE).unwrap();
        let copy = original.working_copy();
        drop(original);
        assert_eq!(copy.text(), RESPONSE);
    }

    #[test]
    fn test_id_map_resolves() {
        let doc = AssertionDocument::parse(RESPONSE).unwrap();
        let tree = doc.parse_doc().unwrap();
        let map = IdMap::build(&tree, &["ID".to_owned()]).unwrap();
        assert_eq!(map.len(), 2);
        let node = map.resolve(&tree, "_a1").unwrap();
        assert_eq!(node.tag_name().name(), "Assertion");
        assert!(map.resolve(&tree, "_missing").is_none());
    }

    #[test]
    fn test_id_map_ignores_other_attribute_names() {
        let doc = AssertionDocument::parse(RESPONSE).unwrap();
        let tree = doc.parse_doc().unwrap();
        let map = IdMap::build(&tree, &["Id".to_owned()]).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_id_map_rejects_duplicates() {
        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_x"><a ID="_x"/></samlp:Response>"#;
        let doc = AssertionDocument::parse(xml).unwrap();
        let tree = doc.parse_doc().unwrap();
        let err = IdMap::build(&tree, &["ID".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("duplicate ID"));
    }
}
