//! Element fingerprints.
//!
//! A fingerprint is computed from the document-model side ([`fingerprint`])
//! and from a parsed node ([`node_fingerprint`]); the two agree exactly when
//! the node is the serialized form of the element. Both sides share the
//! text extraction rules and one [`TextNormalizer`].

use crate::hash::{namespaced_id, sha1_hex, sha256_hex, TABLE_NAMESPACE};
use crate::model::{ContentElement, ElementKind, Paragraph, RunFormat, Table, TableCell, Title};
use crate::util::{descendants_pruned, TextNormalizer};
use crate::xml::namespaces::{W, WP};
use crate::xml::{XName, XmlDocument};
use indextree::NodeId;
use std::collections::HashMap;
use std::fmt;

/// Marks a payload that is absent, as opposed to present and empty.
const MISSING: &str = "\u{2205}";

const PARAGRAPH_SEP: char = '\u{1d}';
const ROW_SEP: char = '\u{1e}';
const CELL_SEP: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Node kind an element serializes to.
///
/// A paragraph styled `Title` or `HeadingN` is written as a heading, so it
/// is looked up as one.
pub fn expected_kind(element: &ContentElement) -> ElementKind {
    match element {
        ContentElement::Paragraph(p) if title_depth_of(p).is_some() => ElementKind::Title,
        other => other.kind(),
    }
}

fn title_depth_of(p: &Paragraph) -> Option<u8> {
    p.style.as_deref().and_then(Title::depth_for_style)
}

pub fn fingerprint(element: &ContentElement, normalizer: &TextNormalizer) -> Fingerprint {
    match element {
        ContentElement::Paragraph(p) => match title_depth_of(p) {
            Some(depth) => text_fingerprint(ElementKind::Title, Some(depth), "", &normalizer.normalize(&p.text())),
            None => text_fingerprint(ElementKind::Paragraph, None, "", &normalizer.normalize(&p.text())),
        },
        ContentElement::Title(t) => {
            text_fingerprint(ElementKind::Title, Some(t.depth()), "", &normalizer.normalize(&t.text))
        }
        ContentElement::Run(r) => text_fingerprint(
            ElementKind::Run,
            None,
            &r.format.signature(),
            &normalizer.normalize(&r.text),
        ),
        ContentElement::Cell(c) => cell_fingerprint(&model_cell_text(c, normalizer)),
        ContentElement::Table(t) => table_fingerprint(&model_table_layout(t, normalizer)),
        ContentElement::Image(i) => image_fingerprint(&i.name, i.description.as_deref()),
    }
}

fn text_fingerprint(kind: ElementKind, depth: Option<u8>, formatting: &str, text: &str) -> Fingerprint {
    let depth = depth.map_or_else(|| "-".to_string(), |d| d.to_string());
    Fingerprint(sha1_hex(&format!("{}|{depth}|{formatting}|{text}", kind.as_str())))
}

fn cell_fingerprint(paragraphs: &[String]) -> Fingerprint {
    let joined: String = join(paragraphs, PARAGRAPH_SEP);
    Fingerprint(sha1_hex(&format!("tc|{joined}")))
}

/// `rows` holds, per row, the per-cell paragraph texts.
fn table_fingerprint(rows: &[Vec<Vec<String>>]) -> Fingerprint {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let body: Vec<String> = rows
        .iter()
        .map(|cells| {
            let cells: Vec<String> = cells.iter().map(|paras| join(paras, PARAGRAPH_SEP)).collect();
            join(&cells, CELL_SEP)
        })
        .collect();
    let canonical = format!("{}x{columns}|{}", rows.len(), join(&body, ROW_SEP));
    Fingerprint(format!("tbl:{}", namespaced_id(&TABLE_NAMESPACE, &canonical)))
}

fn image_fingerprint(name: &str, description: Option<&str>) -> Fingerprint {
    let descriptor = format!("img|{name}|{}", description.unwrap_or(MISSING));
    Fingerprint(sha256_hex(descriptor.as_bytes()))
}

fn join(parts: &[String], sep: char) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(part);
    }
    out
}

fn model_cell_text(cell: &TableCell, normalizer: &TextNormalizer) -> Vec<String> {
    if cell.paragraphs.is_empty() {
        // Serialized as a single empty paragraph.
        return vec![String::new()];
    }
    cell.paragraphs
        .iter()
        .map(|p| normalizer.normalize(&p.text()))
        .collect()
}

fn model_table_layout(table: &Table, normalizer: &TextNormalizer) -> Vec<Vec<Vec<String>>> {
    table
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|c| model_cell_text(c, normalizer))
                .collect()
        })
        .collect()
}

/// Fingerprints of batch elements, memoised per element instance.
#[derive(Default)]
pub struct FingerprintCache {
    entries: HashMap<*const ContentElement, Fingerprint>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, element: &ContentElement, normalizer: &TextNormalizer) -> Fingerprint {
        self.entries
            .entry(element as *const ContentElement)
            .or_insert_with(|| fingerprint(element, normalizer))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parsed-XML side
// ---------------------------------------------------------------------------

pub(crate) fn is_wml(doc: &XmlDocument, node: NodeId, local_name: &str) -> bool {
    doc.name(node).is_some_and(|n| W::is(n, local_name))
}

fn attr<'a>(doc: &'a XmlDocument, node: NodeId, local_name: &str) -> Option<&'a str> {
    let data = doc.get(node)?;
    let ns = data.name()?.namespace.clone().unwrap_or_default();
    data.attribute(&XName::new(&ns, local_name))
}

fn child_wml(doc: &XmlDocument, parent: NodeId, local_name: &str) -> Option<NodeId> {
    doc.children(parent).find(|&c| is_wml(doc, c, local_name))
}

/// `w:val` of `parent/w:<local_name>`.
fn child_val<'a>(doc: &'a XmlDocument, parent: NodeId, local_name: &str) -> Option<&'a str> {
    child_wml(doc, parent, local_name).and_then(|c| attr(doc, c, "val"))
}

fn paragraph_style(doc: &XmlDocument, p: NodeId) -> Option<&str> {
    let ppr = child_wml(doc, p, "pPr")?;
    child_val(doc, ppr, "pStyle")
}

/// Descendants of `start` (itself included) that do not belong to a nested
/// table.
fn own_descendants(doc: &XmlDocument, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    descendants_pruned(doc, start, move |n| n != start && is_wml(doc, n, "tbl"))
}

/// Raw visible text of a subtree: `w:t` content, with `w:tab` and `w:br`
/// read as whitespace.
pub fn visible_text(doc: &XmlDocument, node: NodeId) -> String {
    let mut out = String::new();
    for n in own_descendants(doc, node) {
        if is_wml(doc, n, "t") {
            for child in doc.children(n) {
                if let Some(text) = doc.text(child) {
                    out.push_str(text);
                }
            }
        } else if is_wml(doc, n, "tab") || is_wml(doc, n, "br") {
            out.push(' ');
        }
    }
    out
}

fn has_graphic(doc: &XmlDocument, p: NodeId) -> bool {
    doc.descendants(p)
        .any(|n| is_wml(doc, n, "drawing") || is_wml(doc, n, "pict"))
}

/// Which element kind a node is, if any.
pub fn classify(doc: &XmlDocument, node: NodeId) -> Option<ElementKind> {
    let name = doc.name(node)?;
    if W::is(name, "r") {
        Some(ElementKind::Run)
    } else if W::is(name, "tbl") {
        Some(ElementKind::Table)
    } else if W::is(name, "tc") {
        Some(ElementKind::Cell)
    } else if W::is(name, "p") {
        if has_graphic(doc, node) && visible_text(doc, node).trim().is_empty() {
            Some(ElementKind::Image)
        } else if paragraph_style(doc, node).and_then(Title::depth_for_style).is_some() {
            Some(ElementKind::Title)
        } else {
            Some(ElementKind::Paragraph)
        }
    } else {
        None
    }
}

fn toggle_on(doc: &XmlDocument, rpr: NodeId, local_name: &str) -> bool {
    match child_wml(doc, rpr, local_name) {
        None => false,
        Some(el) => !matches!(attr(doc, el, "val"), Some("0" | "false" | "off")),
    }
}

fn run_format(doc: &XmlDocument, r: NodeId) -> RunFormat {
    let Some(rpr) = child_wml(doc, r, "rPr") else {
        return RunFormat::default();
    };
    let underline = match child_wml(doc, rpr, "u") {
        None => false,
        Some(u) => attr(doc, u, "val") != Some("none"),
    };
    RunFormat {
        bold: toggle_on(doc, rpr, "b"),
        italic: toggle_on(doc, rpr, "i"),
        underline,
        strike: toggle_on(doc, rpr, "strike"),
    }
}

fn cell_paragraph_texts(doc: &XmlDocument, tc: NodeId, normalizer: &TextNormalizer) -> Vec<String> {
    own_descendants(doc, tc)
        .filter(|&n| is_wml(doc, n, "p"))
        .map(|p| normalizer.normalize(&visible_text(doc, p)))
        .collect()
}

fn table_layout(doc: &XmlDocument, tbl: NodeId, normalizer: &TextNormalizer) -> Vec<Vec<Vec<String>>> {
    own_descendants(doc, tbl)
        .filter(|&n| is_wml(doc, n, "tr"))
        .map(|tr| {
            own_descendants(doc, tr)
                .filter(|&n| is_wml(doc, n, "tc"))
                .map(|tc| cell_paragraph_texts(doc, tc, normalizer))
                .collect()
        })
        .collect()
}

fn drawing_descriptor(doc: &XmlDocument, p: NodeId) -> (String, Option<String>) {
    let doc_pr = doc
        .descendants(p)
        .find(|&n| doc.is_named(n, WP::NS, "docPr"));
    match doc_pr.and_then(|n| doc.get(n)) {
        Some(data) => (
            data.attribute(&XName::local("name")).unwrap_or_default().to_string(),
            data.attribute(&XName::local("descr")).map(str::to_string),
        ),
        None => (String::new(), None),
    }
}

/// Fingerprint of `node` read as an element of `kind`.
pub fn node_fingerprint(
    doc: &XmlDocument,
    node: NodeId,
    kind: ElementKind,
    normalizer: &TextNormalizer,
) -> Fingerprint {
    match kind {
        ElementKind::Paragraph => {
            text_fingerprint(kind, None, "", &normalizer.normalize(&visible_text(doc, node)))
        }
        ElementKind::Title => {
            let depth = paragraph_style(doc, node).and_then(Title::depth_for_style);
            text_fingerprint(kind, depth, "", &normalizer.normalize(&visible_text(doc, node)))
        }
        ElementKind::Run => text_fingerprint(
            kind,
            None,
            &run_format(doc, node).signature(),
            &normalizer.normalize(&visible_text(doc, node)),
        ),
        ElementKind::Cell => cell_fingerprint(&cell_paragraph_texts(doc, node, normalizer)),
        ElementKind::Table => table_fingerprint(&table_layout(doc, node, normalizer)),
        ElementKind::Image => {
            let (name, descr) = drawing_descriptor(doc, node);
            image_fingerprint(&name, descr.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Image, Paragraph, Run, Table};
    use crate::xml::parser::parse;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn fp(element: impl Into<ContentElement>) -> Fingerprint {
        fingerprint(&element.into(), &TextNormalizer::default())
    }

    fn first(doc: &XmlDocument, local: &str) -> NodeId {
        let root = doc.root().unwrap();
        doc.descendants(root).find(|&n| is_wml(doc, n, local)).unwrap()
    }

    #[test]
    fn kind_separates_identical_text() {
        assert_ne!(fp(Paragraph::new("Same")), fp(Title::new("Same", 1)));
        assert_ne!(fp(Paragraph::new("Same")), fp(Run::new("Same")));
        assert_ne!(fp(Title::new("Same", 1)), fp(Title::new("Same", 2)));
    }

    #[test]
    fn empty_text_differs_from_missing_descriptor() {
        let mut with_empty = Image::new("pic", "rId1");
        with_empty.description = Some(String::new());
        let missing = Image::new("pic", "rId1");
        assert_ne!(fp(with_empty), fp(missing));
        assert_eq!(fp(Paragraph::new("")), fp(Paragraph::new("")));
    }

    #[test]
    fn tables_use_namespaced_ids() {
        let a = fp(Table::from_text([["a", "b"], ["c", "d"]]));
        let b = fp(Table::from_text([["a", "b"], ["c", "e"]]));
        assert!(a.as_str().starts_with("tbl:"));
        assert_ne!(a, b);
        // Same text, different layout.
        assert_ne!(fp(Table::from_text([["ab"]])), fp(Table::from_text([["a", "b"]])));
    }

    #[test]
    fn whitespace_and_composition_are_normalised() {
        assert_eq!(fp(Paragraph::new("  Caf\u{0065}\u{0301}  bar ")), fp(Paragraph::new("Caf\u{00E9} bar")));
    }

    #[test]
    fn styled_paragraph_is_looked_up_as_title() {
        let mut p = Paragraph::new("Intro");
        p.style = Some("Heading1".to_string());
        let element = ContentElement::from(p);
        assert_eq!(expected_kind(&element), ElementKind::Title);
        assert_eq!(
            fingerprint(&element, &TextNormalizer::default()),
            fp(Title::new("Intro", 1))
        );
    }

    #[test]
    fn node_side_matches_model_side() {
        let xml = format!(
            r#"<w:document xmlns:w="{W_NS}"><w:body>
                <w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Scope</w:t></w:r></w:p>
                <w:p><w:r><w:rPr><w:b/><w:i w:val="0"/></w:rPr><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>
                <w:tbl><w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>
            </w:body></w:document>"#
        );
        let doc = parse(&xml).unwrap();
        let n = TextNormalizer::default();
        let root = doc.root().unwrap();
        let paragraphs: Vec<_> = doc.descendants(root).filter(|&x| is_wml(&doc, x, "p")).collect();

        assert_eq!(classify(&doc, paragraphs[0]), Some(ElementKind::Title));
        assert_eq!(
            node_fingerprint(&doc, paragraphs[0], ElementKind::Title, &n),
            fp(Title::new("Scope", 2))
        );

        assert_eq!(classify(&doc, paragraphs[1]), Some(ElementKind::Paragraph));
        assert_eq!(
            node_fingerprint(&doc, paragraphs[1], ElementKind::Paragraph, &n),
            fp(Paragraph::new("Hello world"))
        );

        let bold = Run::new("Hello").with_format(RunFormat {
            bold: true,
            ..Default::default()
        });
        let hello = doc
            .descendants(paragraphs[1])
            .find(|&x| is_wml(&doc, x, "r"))
            .unwrap();
        assert_eq!(node_fingerprint(&doc, hello, ElementKind::Run, &n), fp(bold));

        let table = Table::from_text([["a", ""]]);
        assert_eq!(node_fingerprint(&doc, first(&doc, "tbl"), ElementKind::Table, &n), fp(table));
        assert_eq!(
            node_fingerprint(&doc, first(&doc, "tc"), ElementKind::Cell, &n),
            fp(TableCell::new("a"))
        );
    }

    #[test]
    fn image_paragraph_is_classified_by_graphic() {
        let image = Image::new("Logo", "rId5");
        let xml = format!(
            r#"<w:document xmlns:w="{W_NS}" xmlns:wp="{}" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
            WP::NS,
            crate::model::write_element(&image.clone().into())
        );
        let doc = parse(&xml).unwrap();
        let p = first(&doc, "p");
        assert_eq!(classify(&doc, p), Some(ElementKind::Image));
        assert_eq!(
            node_fingerprint(&doc, p, ElementKind::Image, &TextNormalizer::default()),
            fp(image)
        );
    }

    #[test]
    fn cache_memoises_per_instance() {
        let element = ContentElement::from(Table::from_text([["x"]]));
        let normalizer = TextNormalizer::default();
        let mut cache = FingerprintCache::new();
        let a = cache.get(&element, &normalizer);
        let b = cache.get(&element, &normalizer);
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
    }
}
