#![forbid(unsafe_code)]

//! DSig context: configuration shared by the verification stages.

/// Context for signature processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsigContext {
    /// Attribute names registered as IDs when resolving `#id` references.
    pub id_attrs: Vec<String>,
}

impl DsigContext {
    /// A context registering only the SAML `ID` attribute.
    pub fn new() -> Self {
        Self {
            id_attrs: vec![samlvakt_core::ns::attr::ID.to_owned()],
        }
    }

    /// Use exactly these ID attribute names.
    pub fn with_id_attrs(id_attrs: Vec<String>) -> Self {
        Self { id_attrs }
    }

    /// Add an ID attribute name to register during processing.
    pub fn add_id_attr(&mut self, name: &str) {
        if !self.id_attrs.iter().any(|a| a == name) {
            self.id_attrs.push(name.to_owned());
        }
    }
}

impl Default for DsigContext {
    fn default() -> Self {
        Self::new()
    }
}
