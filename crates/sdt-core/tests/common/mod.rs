//! Shared helpers for the injection integration tests.
#![allow(dead_code)]

use sdt_core::{ContentElement, PartTarget, SdtConfig, SdtDocument};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn config(id: u32) -> SdtConfig {
    SdtConfig::new(id).unwrap_or_else(|e| panic!("bad test id {id}: {e}"))
}

pub fn tagged(id: u32, tag: &str) -> SdtConfig {
    config(id).with_tag(tag).unwrap()
}

pub fn document(elements: Vec<ContentElement>) -> SdtDocument {
    SdtDocument::from_elements(&elements).unwrap_or_else(|e| panic!("building document: {e}"))
}

pub fn xml(doc: &SdtDocument, part: PartTarget) -> String {
    doc.part_xml(part).unwrap_or_else(|e| panic!("reading {part}: {e}"))
}

/// Number of `w:<local>` elements.
pub fn count(xml: &str, local: &str) -> usize {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants().filter(|n| n.has_tag_name((W_NS, local))).count()
}

/// `w:val` of every `w:tag`, document order.
pub fn tags(xml: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name((W_NS, "tag")))
        .filter_map(|n| n.attribute((W_NS, "val")).map(str::to_string))
        .collect()
}

/// Local names from the root to the first `w:<local>` element.
pub fn ancestry(xml: &str, local: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).unwrap();
    let node = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, local)))
        .unwrap_or_else(|| panic!("no w:{local} in {xml}"));
    let mut names: Vec<String> = node
        .ancestors()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name().to_string())
        .collect();
    names.reverse();
    names
}

/// The first `<w:sdtPr>…</w:sdtPr>` of a serialized part.
pub fn first_sdt_pr(xml: &str) -> &str {
    let start = xml.find("<w:sdtPr>").expect("no sdtPr");
    let end = xml[start..].find("</w:sdtPr>").expect("unterminated sdtPr") + start;
    &xml[start..end + "</w:sdtPr>".len()]
}

/// Every `w:p` sits directly in a `w:sdtContent`.
pub fn all_paragraphs_wrapped(xml: &str) -> bool {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .all(|p| p.parent_element().is_some_and(|parent| parent.has_tag_name((W_NS, "sdtContent"))))
}
