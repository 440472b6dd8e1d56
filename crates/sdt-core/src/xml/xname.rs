use std::fmt;

/// Expanded XML name: namespace URI plus local name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct XName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl XName {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        Self {
            namespace: if namespace.is_empty() {
                None
            } else {
                Some(namespace.to_string())
            },
            local_name: local_name.to_string(),
        }
    }

    pub fn local(local_name: &str) -> Self {
        Self {
            namespace: None,
            local_name: local_name.to_string(),
        }
    }

    /// A name with the same namespace as `self` and a different local name.
    ///
    /// Used when creating wrapper elements that must live in whatever
    /// namespace the wrapped node was parsed with.
    pub fn sibling(&self, local_name: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            local_name: local_name.to_string(),
        }
    }

    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }
}

impl fmt::Display for XName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XAttribute {
    pub name: XName,
    pub value: String,
}

impl XAttribute {
    pub fn new(name: XName, value: &str) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xname_with_namespace_displays_correctly() {
        let name = XName::new("http://example.com", "element");
        assert_eq!(name.to_string(), "{http://example.com}element");
    }

    #[test]
    fn sibling_keeps_namespace() {
        let name = XName::new("urn:custom-w", "p");
        let sdt = name.sibling("sdt");
        assert_eq!(sdt.namespace.as_deref(), Some("urn:custom-w"));
        assert_eq!(sdt.local_name, "sdt");
    }

    #[test]
    fn is_requires_namespace_match() {
        let name = XName::new("urn:a", "tbl");
        assert!(name.is("urn:a", "tbl"));
        assert!(!name.is("urn:b", "tbl"));
        assert!(!XName::local("tbl").is("urn:a", "tbl"));
    }
}
