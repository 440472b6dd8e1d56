//! Finds the node that corresponds to a document-model element.
//!
//! Candidates are the descendants of the part's root context (`w:body`,
//! `w:hdr` or `w:ftr`) whose fingerprint equals the element's. Subtrees
//! under a `w:sdtContent` created by the current run are pruned from the
//! traversal itself, so an element can never be matched twice.

use super::identity::{classify, expected_kind, is_wml, node_fingerprint, visible_text, Fingerprint};
use super::registry::ProcessedRegistry;
use super::settings::FallbackPolicy;
use crate::model::{ContentElement, ElementKind, PartTarget};
use crate::util::{descendants_pruned, xpath_literal, TextNormalizer};
use crate::xml::XmlDocument;
use indextree::NodeId;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootContext {
    Body,
    Header,
    Footer,
}

impl RootContext {
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Header => "hdr",
            Self::Footer => "ftr",
        }
    }

    pub fn for_part(part: PartTarget) -> Self {
        match part {
            PartTarget::Body => Self::Body,
            PartTarget::Header(_) => Self::Header,
            PartTarget::Footer(_) => Self::Footer,
        }
    }
}

/// One lookup request.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub element: &'a ContentElement,
    pub fingerprint: &'a Fingerprint,
    /// Position among earlier batch pairs with the same fingerprint and
    /// the same `inline_level`.
    pub index: usize,
    pub run_level: bool,
    pub inline_level: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Fingerprint,
    /// First unprocessed node of the expected kind.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub node: NodeId,
    pub matched: MatchKind,
}

/// Selects pre-existing `w:sdt` elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFilter {
    pub tag: Option<String>,
    pub alias: Option<String>,
}

impl ControlFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            alias: None,
        }
    }

    pub fn by_alias(alias: &str) -> Self {
        Self {
            tag: None,
            alias: Some(alias.to_string()),
        }
    }

    fn shape(&self) -> String {
        let mut predicate = String::new();
        if let Some(tag) = &self.tag {
            predicate.push_str(&format!("[w:sdtPr/w:tag/@w:val={}]", xpath_literal(tag)));
        }
        if let Some(alias) = &self.alias {
            predicate.push_str(&format!("[w:sdtPr/w:alias/@w:val={}]", xpath_literal(alias)));
        }
        format!("//w:sdt{predicate}")
    }
}

/// Structural query results for one shape of one tree.
#[derive(Default)]
struct QueryCache {
    key: Option<(u64, u64)>,
    entries: HashMap<String, Vec<NodeId>>,
}

impl QueryCache {
    fn lookup(&mut self, doc: &XmlDocument, shape: &str) -> Option<Vec<NodeId>> {
        let key = (doc.tree_id(), doc.revision());
        if self.key != Some(key) {
            self.entries.clear();
            self.key = Some(key);
            return None;
        }
        self.entries.get(shape).cloned()
    }

    fn store(&mut self, shape: String, nodes: Vec<NodeId>) {
        self.entries.insert(shape, nodes);
    }
}

/// Lookup state for one tree.
///
/// Node classifications and fingerprints are memoised by node id; they depend
/// only on a node's own content, which wrapping never changes. Passing a
/// different tree resets all state.
pub struct Locator {
    root_context: RootContext,
    fallback: FallbackPolicy,
    normalizer: TextNormalizer,
    tree_id: Option<u64>,
    root: Option<NodeId>,
    kinds: HashMap<NodeId, Option<ElementKind>>,
    fingerprints: HashMap<(NodeId, ElementKind), Fingerprint>,
    queries: QueryCache,
}

impl Locator {
    pub fn new(root_context: RootContext, fallback: FallbackPolicy, normalizer: TextNormalizer) -> Self {
        Self {
            root_context,
            fallback,
            normalizer,
            tree_id: None,
            root: None,
            kinds: HashMap::new(),
            fingerprints: HashMap::new(),
            queries: QueryCache::default(),
        }
    }

    pub fn root_context(&self) -> RootContext {
        self.root_context
    }

    /// The scoped root element in `doc`, if present.
    pub fn root(&mut self, doc: &XmlDocument) -> Option<NodeId> {
        self.rescope(doc);
        self.root
    }

    fn rescope(&mut self, doc: &XmlDocument) {
        if self.tree_id == Some(doc.tree_id()) {
            return;
        }
        self.tree_id = Some(doc.tree_id());
        self.kinds.clear();
        self.fingerprints.clear();
        self.queries = QueryCache::default();

        let local = self.root_context.local_name();
        self.root = doc
            .root()
            .and_then(|r| doc.descendants(r).find(|&n| is_wml(doc, n, local)));
        trace!(tree = doc.tree_id(), root = local, found = self.root.is_some(), "locator scoped");
    }

    fn kind_of(&mut self, doc: &XmlDocument, node: NodeId) -> Option<ElementKind> {
        *self
            .kinds
            .entry(node)
            .or_insert_with(|| classify(doc, node))
    }

    fn fingerprint_of(&mut self, doc: &XmlDocument, node: NodeId, kind: ElementKind) -> Fingerprint {
        let normalizer = &self.normalizer;
        self.fingerprints
            .entry((node, kind))
            .or_insert_with(|| node_fingerprint(doc, node, kind, normalizer))
            .clone()
    }

    /// Unprocessed nodes of `kind` in scope, document order.
    fn candidates(
        &mut self,
        doc: &XmlDocument,
        registry: &ProcessedRegistry,
        kind: ElementKind,
        inline_level: bool,
    ) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        let scope = if inline_level { "[ancestor-or-self::w:tc]" } else { "" };
        let shape = format!("//w:{}//{}{scope}", self.root_context.local_name(), kind.as_str());
        if let Some(hit) = self.queries.lookup(doc, &shape) {
            return hit;
        }

        let visible: Vec<NodeId> =
            descendants_pruned(doc, root, |n| registry.is_container(n)).collect();
        let mut nodes = Vec::new();
        for n in visible {
            if registry.is_processed(n) || self.kind_of(doc, n) != Some(kind) {
                continue;
            }
            if inline_level && !doc.ancestors(n).any(|a| is_wml(doc, a, "tc")) {
                continue;
            }
            nodes.push(n);
        }
        self.queries.store(shape, nodes.clone());
        nodes
    }

    fn matching(
        &mut self,
        doc: &XmlDocument,
        registry: &ProcessedRegistry,
        kind: ElementKind,
        fingerprint: &Fingerprint,
        inline_level: bool,
    ) -> Vec<NodeId> {
        let scope = if inline_level { "[ancestor-or-self::w:tc]" } else { "" };
        let shape = format!(
            "//w:{}//{}{scope}[@fingerprint={}]",
            self.root_context.local_name(),
            kind.as_str(),
            xpath_literal(fingerprint.as_str())
        );
        if let Some(hit) = self.queries.lookup(doc, &shape) {
            return hit;
        }
        let nodes: Vec<NodeId> = self
            .candidates(doc, registry, kind, inline_level)
            .into_iter()
            .filter(|&n| &self.fingerprint_of(doc, n, kind) == fingerprint)
            .collect();
        self.queries.store(shape, nodes.clone());
        nodes
    }

    /// Locate the node for `target`, or `None`.
    pub fn locate(
        &mut self,
        doc: &XmlDocument,
        registry: &ProcessedRegistry,
        target: &Target<'_>,
    ) -> Option<Located> {
        self.rescope(doc);
        let kind = expected_kind(target.element);

        if target.run_level && kind != ElementKind::Run {
            let paragraph = self.locate_kind(doc, registry, kind, target)?;
            let run = self.first_text_run(doc, registry, paragraph.node)?;
            return Some(Located {
                node: run,
                matched: paragraph.matched,
            });
        }
        if !target.run_level && kind == ElementKind::Run {
            // Block-level wrapping of a run wraps the paragraph holding it.
            let run = self.locate_kind(doc, registry, kind, target)?;
            let paragraph = doc
                .ancestors(run.node)
                .skip(1)
                .find(|&a| is_wml(doc, a, "p"))?;
            return Some(Located {
                node: paragraph,
                matched: run.matched,
            });
        }
        self.locate_kind(doc, registry, kind, target)
    }

    fn locate_kind(
        &mut self,
        doc: &XmlDocument,
        registry: &ProcessedRegistry,
        kind: ElementKind,
        target: &Target<'_>,
    ) -> Option<Located> {
        let matches = self.matching(doc, registry, kind, target.fingerprint, target.inline_level);
        let wrapped = registry.wrapped_before(target.fingerprint, target.inline_level, target.index);
        let position = target.index.saturating_sub(wrapped);
        if let Some(&node) = matches.get(position) {
            return Some(Located {
                node,
                matched: MatchKind::Fingerprint,
            });
        }

        match self.fallback {
            FallbackPolicy::Strict => None,
            FallbackPolicy::Positional => self
                .candidates(doc, registry, kind, target.inline_level)
                .first()
                .map(|&node| Located {
                    node,
                    matched: MatchKind::Fallback,
                }),
        }
    }

    /// First unprocessed run with visible text inside `paragraph`.
    fn first_text_run(
        &mut self,
        doc: &XmlDocument,
        registry: &ProcessedRegistry,
        paragraph: NodeId,
    ) -> Option<NodeId> {
        descendants_pruned(doc, paragraph, |n| registry.is_container(n))
            .filter(|&n| is_wml(doc, n, "r") && !registry.is_processed(n))
            .find(|&n| !visible_text(doc, n).trim().is_empty())
    }

    /// Pre-existing content controls selected by `filter`, document order.
    pub fn find_content_controls(&mut self, doc: &XmlDocument, filter: &ControlFilter) -> Vec<NodeId> {
        self.rescope(doc);
        let Some(root) = self.root else {
            return Vec::new();
        };
        let shape = filter.shape();
        if let Some(hit) = self.queries.lookup(doc, &shape) {
            return hit;
        }

        let nodes: Vec<NodeId> = doc
            .descendants(root)
            .filter(|&n| is_wml(doc, n, "sdt"))
            .filter(|&n| {
                let value = |local: &str| {
                    doc.children(n)
                        .find(|&c| is_wml(doc, c, "sdtPr"))
                        .and_then(|pr| doc.children(pr).find(|&c| is_wml(doc, c, local)))
                        .and_then(|el| {
                            let ns = doc.name(el)?.namespace.clone().unwrap_or_default();
                            doc.get(el)?
                                .attribute(&crate::xml::XName::new(&ns, "val"))
                                .map(str::to_string)
                        })
                };
                filter.tag.as_ref().map_or(true, |t| value("tag").as_ref() == Some(t))
                    && filter
                        .alias
                        .as_ref()
                        .map_or(true, |a| value("alias").as_ref() == Some(a))
            })
            .collect();
        self.queries.store(shape, nodes.clone());
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Run, Table};
    use crate::wml::identity::fingerprint;
    use crate::xml::parser::parse;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn body(inner: &str) -> XmlDocument {
        parse(&format!(
            r#"<w:document xmlns:w="{W_NS}"><w:body>{inner}</w:body></w:document>"#
        ))
        .unwrap()
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn locator(fallback: FallbackPolicy) -> Locator {
        Locator::new(RootContext::Body, fallback, TextNormalizer::default())
    }

    fn target<'a>(element: &'a ContentElement, fp: &'a Fingerprint, index: usize) -> Target<'a> {
        Target {
            element,
            fingerprint: fp,
            index,
            run_level: false,
            inline_level: false,
        }
    }

    #[test]
    fn finds_by_fingerprint_and_index() {
        let doc = body(&format!("{}{}{}", para("A"), para("B"), para("B")));
        let element = ContentElement::from(Paragraph::new("B"));
        let fp = fingerprint(&element, &TextNormalizer::default());
        let registry = ProcessedRegistry::new();
        let mut loc = locator(FallbackPolicy::Strict);

        let first = loc.locate(&doc, &registry, &target(&element, &fp, 0)).unwrap();
        let second = loc.locate(&doc, &registry, &target(&element, &fp, 1)).unwrap();
        assert_ne!(first.node, second.node);
        assert_eq!(doc.path(first.node), "/document[1]/body[1]/p[2]");
        assert_eq!(doc.path(second.node), "/document[1]/body[1]/p[3]");
        assert_eq!(first.matched, MatchKind::Fingerprint);
    }

    #[test]
    fn strict_policy_reports_missing_match() {
        let doc = body(&para("A"));
        let element = ContentElement::from(Paragraph::new("Z"));
        let fp = fingerprint(&element, &TextNormalizer::default());
        let registry = ProcessedRegistry::new();

        assert!(locator(FallbackPolicy::Strict)
            .locate(&doc, &registry, &target(&element, &fp, 0))
            .is_none());

        let fallback = locator(FallbackPolicy::Positional)
            .locate(&doc, &registry, &target(&element, &fp, 0))
            .unwrap();
        assert_eq!(fallback.matched, MatchKind::Fallback);
    }

    #[test]
    fn inline_level_scopes_to_cells() {
        let doc = body(&format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("X"),
            para("X")
        ));
        let element = ContentElement::from(Paragraph::new("X"));
        let fp = fingerprint(&element, &TextNormalizer::default());
        let registry = ProcessedRegistry::new();
        let mut loc = locator(FallbackPolicy::Strict);

        let mut t = target(&element, &fp, 0);
        t.inline_level = true;
        let found = loc.locate(&doc, &registry, &t).unwrap();
        assert_eq!(doc.path(found.node), "/document[1]/body[1]/tbl[1]/tr[1]/tc[1]/p[1]");
    }

    #[test]
    fn run_level_picks_first_text_run() {
        let doc = body("<w:p><w:r><w:tab/></w:r><w:r><w:t>Name</w:t></w:r></w:p>");
        let element = ContentElement::from(Paragraph::new("Name"));
        let fp = fingerprint(&element, &TextNormalizer::default());
        let registry = ProcessedRegistry::new();

        let mut t = target(&element, &fp, 0);
        t.run_level = true;
        let found = locator(FallbackPolicy::Strict).locate(&doc, &registry, &t).unwrap();
        assert_eq!(doc.path(found.node), "/document[1]/body[1]/p[1]/r[2]");
    }

    #[test]
    fn plain_run_resolves_to_its_paragraph() {
        let doc = body(&format!("{}{}", para("Intro"), para("Hello")));
        let element = ContentElement::from(Run::new("Hello"));
        let fp = fingerprint(&element, &TextNormalizer::default());
        let registry = ProcessedRegistry::new();

        let found = locator(FallbackPolicy::Strict)
            .locate(&doc, &registry, &target(&element, &fp, 0))
            .unwrap();
        assert_eq!(doc.path(found.node), "/document[1]/body[1]/p[2]");
        assert_eq!(found.matched, MatchKind::Fingerprint);
    }

    #[test]
    fn state_resets_for_a_new_tree() {
        let element = ContentElement::from(Table::from_text([["a"]]));
        let fp = fingerprint(&element, &TextNormalizer::default());
        let registry = ProcessedRegistry::new();
        let mut loc = locator(FallbackPolicy::Strict);

        let tbl = "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc></w:tr></w:tbl>";
        let first_tree = body(tbl);
        assert!(loc.locate(&first_tree, &registry, &target(&element, &fp, 0)).is_some());

        let second_tree = body(&para("a"));
        assert!(loc.locate(&second_tree, &registry, &target(&element, &fp, 0)).is_none());
    }

    #[test]
    fn finds_existing_controls_by_tag() {
        let doc = body(&format!(
            r#"<w:sdt><w:sdtPr><w:tag w:val="it's &quot;x&quot;"/><w:id w:val="12345678"/></w:sdtPr><w:sdtContent>{}</w:sdtContent></w:sdt>
               <w:sdt><w:sdtPr><w:tag w:val="other"/></w:sdtPr><w:sdtContent>{}</w:sdtContent></w:sdt>"#,
            para("a"),
            para("b")
        ));
        let mut loc = locator(FallbackPolicy::Strict);

        assert_eq!(loc.find_content_controls(&doc, &ControlFilter::all()).len(), 2);
        let quoted = ControlFilter::by_tag("it's \"x\"");
        assert!(quoted.shape().contains("concat("));
        assert_eq!(loc.find_content_controls(&doc, &quoted).len(), 1);
        assert!(loc
            .find_content_controls(&doc, &ControlFilter::by_alias("none"))
            .is_empty());
    }
}
