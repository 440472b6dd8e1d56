use crate::util::escape_xml_attr;
use std::collections::BTreeMap;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// `[Content_Types].xml` model, rendered in key order.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), content_type_values::RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), "application/xml".to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    pub fn get_content_type(&self, path: &str) -> Option<&str> {
        let key = format!("/{}", path.trim_start_matches('/'));
        if let Some(ct) = self.overrides.get(&key) {
            return Some(ct);
        }
        let ext = path.rsplit_once('.')?.1;
        self.defaults.get(ext).map(String::as_str)
    }

    /// Override for one part; `path` is an archive path such as
    /// `word/document.xml`.
    pub fn set_content_type(&mut self, path: &str, content_type: &str) {
        self.overrides.insert(
            format!("/{}", path.trim_start_matches('/')),
            content_type.to_string(),
        );
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_string(), content_type.to_string());
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
        );
        for (ext, ct) in &self.defaults {
            out.push_str(&format!(
                "<Default Extension=\"{}\" ContentType=\"{}\"/>",
                escape_xml_attr(ext),
                escape_xml_attr(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            out.push_str(&format!(
                "<Override PartName=\"{}\" ContentType=\"{}\"/>",
                escape_xml_attr(part),
                escape_xml_attr(ct)
            ));
        }
        out.push_str("</Types>");
        out
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::new()
    }
}

pub mod content_type_values {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const WORD_DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WORD_HEADER: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
    pub const WORD_FOOTER: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
}
