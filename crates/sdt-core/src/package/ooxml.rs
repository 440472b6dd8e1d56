use crate::error::{Result, SdtError};
use crate::xml::XmlDocument;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use tracing::trace;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use super::content_types::CONTENT_TYPES_PART;

/// In-memory OOXML package: every archive entry held as raw bytes.
pub struct OoxmlPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

impl OoxmlPackage {
    pub fn new() -> Self {
        Self {
            parts: BTreeMap::new(),
        }
    }

    pub fn open(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        let mut archive = ZipArchive::new(cursor)?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            trace!(part = %name, bytes = content.len(), "read part");
            parts.insert(name, content);
        }

        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(SdtError::InvalidPackage {
                message: format!("archive has no {CONTENT_TYPES_PART}"),
            });
        }

        Ok(Self { parts })
    }

    /// Write the archive. `[Content_Types].xml` comes first, then
    /// `_rels/.rels`, then every other part by name, so equal packages
    /// produce identical bytes.
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        for path in self.save_order() {
            writer.start_file(path, options)?;
            writer.write_all(&self.parts[path])?;
        }

        writer.finish()?;
        Ok(buffer.into_inner())
    }

    fn save_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::with_capacity(self.parts.len());
        for first in [CONTENT_TYPES_PART, "_rels/.rels"] {
            if self.parts.contains_key(first) {
                order.push(first);
            }
        }
        order.extend(
            self.parts
                .keys()
                .map(String::as_str)
                .filter(|p| *p != CONTENT_TYPES_PART && *p != "_rels/.rels"),
        );
        order
    }

    pub fn get_part(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(|v| v.as_slice())
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    pub fn get_xml_part(&self, path: &str) -> Result<XmlDocument> {
        let bytes = self.get_part(path).ok_or_else(|| SdtError::MissingPart {
            part_path: path.to_string(),
            document_type: "Word".to_string(),
        })?;
        crate::xml::parser::parse_bytes(bytes)
    }

    pub fn set_part(&mut self, path: &str, content: Vec<u8>) {
        self.parts.insert(path.to_string(), content);
    }

    pub fn put_xml_part(&mut self, path: &str, doc: &XmlDocument) -> Result<()> {
        let bytes = crate::xml::builder::serialize_bytes(doc)?;
        self.set_part(path, bytes);
        Ok(())
    }

    /// Part names in archive-path order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }
}

impl Default for OoxmlPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> OoxmlPackage {
        let mut pkg = OoxmlPackage::new();
        pkg.set_part("word/document.xml", b"<root/>".to_vec());
        pkg.set_part("_rels/.rels", b"<Relationships/>".to_vec());
        pkg.set_part(CONTENT_TYPES_PART, b"<Types/>".to_vec());
        pkg
    }

    #[test]
    fn package_roundtrip() {
        let saved = minimal().save().unwrap();
        let loaded = OoxmlPackage::open(&saved).unwrap();

        assert_eq!(loaded.get_part("word/document.xml"), Some(&b"<root/>"[..]));
        assert_eq!(loaded.part_names().count(), 3);
    }

    #[test]
    fn content_types_saved_first() {
        let pkg = minimal();
        assert_eq!(
            pkg.save_order(),
            vec![CONTENT_TYPES_PART, "_rels/.rels", "word/document.xml"]
        );
    }

    #[test]
    fn save_is_deterministic() {
        assert_eq!(minimal().save().unwrap(), minimal().save().unwrap());
    }

    #[test]
    fn missing_xml_part_is_reported() {
        let err = minimal().get_xml_part("word/footer1.xml").err().unwrap();
        assert!(matches!(err, SdtError::MissingPart { .. }));
    }

    #[test]
    fn archive_without_content_types_is_rejected() {
        let mut pkg = OoxmlPackage::new();
        pkg.set_part("word/document.xml", b"<root/>".to_vec());
        let bytes = pkg.save().unwrap();
        assert!(matches!(
            OoxmlPackage::open(&bytes),
            Err(SdtError::InvalidPackage { .. })
        ));
    }
}
