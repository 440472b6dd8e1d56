use super::config::{LockType, SdtType};
use super::identity::is_wml;
use super::locator::{ControlFilter, Locator, RootContext};
use super::router::{available_parts, inject_package, InjectionPair, InjectionReport};
use super::settings::InjectionSettings;
use crate::error::{Result, SdtError};
use crate::model::{ContentElement, ElementWriter, PartTarget};
use crate::package::content_types::content_type_values;
use crate::package::relationships::{relationship_types, relationships_xml};
use crate::package::{ContentTypes, OoxmlPackage, Relationship, CONTENT_TYPES_PART};
use crate::util::TextNormalizer;
use crate::xml::namespaces::W;
use crate::xml::{XName, XmlDocument};
use indextree::NodeId;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Namespace declarations on generated part roots. Fragments from
/// [`crate::model::write_element`] use these prefixes.
pub const PART_NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#,
);

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// `w:headerReference`/`w:footerReference` types, by part number.
const REFERENCE_TYPES: [&str; 3] = ["default", "first", "even"];

/// A content control already present in a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdtInfo {
    /// `w:id` is a signed decimal in documents written by other tools.
    pub id: Option<i64>,
    pub tag: Option<String>,
    pub alias: Option<String>,
    #[serde(rename = "type")]
    pub sdt_type: Option<SdtType>,
    pub lock: Option<LockType>,
    pub path: String,
}

/// A Word document open for content control injection.
pub struct SdtDocument {
    package: OoxmlPackage,
}

impl SdtDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = OoxmlPackage::open(bytes)?;
        let body = PartTarget::Body.part_path();
        if !package.has_part(&body) {
            return Err(SdtError::MissingPart {
                part_path: body,
                document_type: "Word".to_string(),
            });
        }
        Ok(Self { package })
    }

    /// Minimal package around an existing `word/document.xml`.
    pub fn from_main_xml(xml: &str) -> Result<Self> {
        crate::xml::parser::parse(xml)?;
        Ok(Self {
            package: build_package(xml.to_string(), Vec::new()),
        })
    }

    /// Minimal package holding `elements`, each written to the part named by
    /// its [`PartTarget`].
    pub fn from_elements(elements: &[ContentElement]) -> Result<Self> {
        let mut by_part: BTreeMap<PartTarget, Vec<&ContentElement>> = BTreeMap::new();
        by_part.entry(PartTarget::Body).or_default();
        for element in elements {
            by_part.entry(element.part()).or_default().push(element);
        }

        let mut writer = ElementWriter::new();
        let mut body = String::new();
        let mut extra = Vec::new();
        for (part, members) in &by_part {
            let content: String = members.iter().map(|e| writer.write_block(e)).collect();
            match part {
                PartTarget::Body => body = content,
                PartTarget::Header(_) => extra.push((
                    *part,
                    format!("{XML_DECLARATION}<w:hdr {PART_NAMESPACES}>{content}</w:hdr>"),
                )),
                PartTarget::Footer(_) => extra.push((
                    *part,
                    format!("{XML_DECLARATION}<w:ftr {PART_NAMESPACES}>{content}</w:ftr>"),
                )),
            }
        }

        let references: String = extra
            .iter()
            .filter_map(|(part, _)| section_reference(*part))
            .collect();
        let main = format!(
            "{XML_DECLARATION}<w:document {PART_NAMESPACES}><w:body>{body}<w:sectPr>{references}</w:sectPr></w:body></w:document>"
        );
        crate::xml::parser::parse(&main)?;

        Ok(Self {
            package: build_package(main, extra),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package.save()
    }

    pub fn package(&self) -> &OoxmlPackage {
        &self.package
    }

    /// Body plus every header and footer in the package.
    pub fn parts(&self) -> Vec<PartTarget> {
        let mut parts = vec![PartTarget::Body];
        parts.extend(available_parts(&self.package));
        parts
    }

    pub fn inject_all(&mut self, batch: &[InjectionPair]) -> Result<InjectionReport> {
        self.inject_all_with_settings(batch, &InjectionSettings::default())
    }

    pub fn inject_all_with_settings(
        &mut self,
        batch: &[InjectionPair],
        settings: &InjectionSettings,
    ) -> Result<InjectionReport> {
        debug!(pairs = batch.len(), ?settings, "injecting batch");
        inject_package(&mut self.package, batch, settings)
    }

    /// Raw XML of one part.
    pub fn part_xml(&self, part: PartTarget) -> Result<String> {
        let path = part.part_path();
        let bytes = self
            .package
            .get_part(&path)
            .ok_or_else(|| SdtError::MissingPart {
                part_path: path.clone(),
                document_type: "Word".to_string(),
            })?;
        String::from_utf8(bytes.to_vec()).map_err(|e| SdtError::InvalidPackage {
            message: format!("{path} is not UTF-8: {e}"),
        })
    }

    pub fn content_controls(&self, part: PartTarget) -> Result<Vec<SdtInfo>> {
        self.find_content_controls(part, &ControlFilter::all())
    }

    pub fn find_content_controls(&self, part: PartTarget, filter: &ControlFilter) -> Result<Vec<SdtInfo>> {
        let doc = self.package.get_xml_part(&part.part_path())?;
        let mut locator = Locator::new(
            RootContext::for_part(part),
            InjectionSettings::default().fallback,
            TextNormalizer::default(),
        );
        Ok(locator
            .find_content_controls(&doc, filter)
            .into_iter()
            .map(|sdt| describe_control(&doc, sdt))
            .collect())
    }
}

fn section_reference(part: PartTarget) -> Option<String> {
    let (element, n) = match part {
        PartTarget::Header(n) => ("headerReference", n),
        PartTarget::Footer(n) => ("footerReference", n),
        PartTarget::Body => return None,
    };
    let kind = REFERENCE_TYPES.get(n.checked_sub(1)? as usize)?;
    Some(format!(
        r#"<w:{element} w:type="{kind}" r:id="{}"/>"#,
        relationship_id(part)
    ))
}

fn relationship_id(part: PartTarget) -> String {
    match part {
        PartTarget::Body => "rIdDocument".to_string(),
        PartTarget::Header(n) => format!("rIdHeader{n}"),
        PartTarget::Footer(n) => format!("rIdFooter{n}"),
    }
}

fn build_package(main: String, extra: Vec<(PartTarget, String)>) -> OoxmlPackage {
    let mut content_types = ContentTypes::new();
    content_types.set_content_type(&PartTarget::Body.part_path(), content_type_values::WORD_DOCUMENT);

    let mut package = OoxmlPackage::new();
    let mut document_rels = Vec::new();
    for (part, xml) in extra {
        let path = part.part_path();
        let (content_type, rel_type) = match part {
            PartTarget::Footer(_) => (content_type_values::WORD_FOOTER, relationship_types::FOOTER),
            _ => (content_type_values::WORD_HEADER, relationship_types::HEADER),
        };
        content_types.set_content_type(&path, content_type);
        let target = path.trim_start_matches("word/");
        document_rels.push(Relationship::new(&relationship_id(part), rel_type, target));
        package.set_part(&path, xml.into_bytes());
    }

    package.set_part(CONTENT_TYPES_PART, content_types.to_xml().into_bytes());
    package.set_part(
        "_rels/.rels",
        relationships_xml(&[Relationship::new(
            "rId1",
            relationship_types::OFFICE_DOCUMENT,
            "word/document.xml",
        )])
        .into_bytes(),
    );
    package.set_part("word/_rels/document.xml.rels", relationships_xml(&document_rels).into_bytes());
    package.set_part(&PartTarget::Body.part_path(), main.into_bytes());
    package
}

/// `w:val` of `w:sdtPr/w:<local_name>`.
fn property<'a>(doc: &'a XmlDocument, sdt: NodeId, local_name: &str) -> Option<&'a str> {
    let pr = doc.children(sdt).find(|&c| is_wml(doc, c, "sdtPr"))?;
    let el = doc.children(pr).find(|&c| is_wml(doc, c, local_name))?;
    let ns = doc.name(el)?.namespace.clone().unwrap_or_default();
    doc.get(el)?.attribute(&XName::new(&ns, "val"))
}

fn describe_control(doc: &XmlDocument, sdt: NodeId) -> SdtInfo {
    let value = |local: &str| property(doc, sdt, local).map(str::to_string);
    let sdt_type = doc
        .children(sdt)
        .find(|&c| is_wml(doc, c, "sdtPr"))
        .and_then(|pr| {
            doc.children(pr).find_map(|c| {
                let name = doc.name(c)?;
                W::is(name, &name.local_name)
                    .then(|| SdtType::from_marker(&name.local_name))
                    .flatten()
            })
        });

    SdtInfo {
        id: value("id").and_then(|v| v.parse().ok()),
        tag: value("tag"),
        alias: value("alias"),
        sdt_type,
        lock: value("lock").and_then(|v| v.parse().ok()),
        path: doc.path(sdt),
    }
}
