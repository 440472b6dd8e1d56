//! Word-processing content elements that can be targeted by a content control.
//!
//! This is the document-model side of a match: elements carry their visible
//! content and, optionally, which physical part of the package they live in.
//! The parsed-XML side is handled by [`crate::wml::identity`].

pub mod writer;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use writer::{write_element, ElementWriter};

/// Physical XML part an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PartTarget {
    #[default]
    Body,
    Header(u32),
    Footer(u32),
}

impl PartTarget {
    /// Archive path of the part, e.g. `word/header1.xml`.
    pub fn part_path(&self) -> String {
        match self {
            Self::Body => "word/document.xml".to_string(),
            Self::Header(n) => format!("word/header{n}.xml"),
            Self::Footer(n) => format!("word/footer{n}.xml"),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Body)
    }

    /// Inverse of [`PartTarget::part_path`] for header and footer parts.
    pub fn from_part_path(path: &str) -> Option<Self> {
        if path == "word/document.xml" {
            return Some(Self::Body);
        }
        let stem = path.strip_prefix("word/")?.strip_suffix(".xml")?;
        if let Some(n) = stem.strip_prefix("header") {
            return n.parse().ok().map(Self::Header);
        }
        if let Some(n) = stem.strip_prefix("footer") {
            return n.parse().ok().map(Self::Footer);
        }
        None
    }
}

/// Parses the [`Display`](fmt::Display) form: `body`, `header2`, `footer1`.
impl std::str::FromStr for PartTarget {
    type Err = crate::error::SdtError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        let parsed = if s == "body" {
            Some(Self::Body)
        } else if let Some(n) = s.strip_prefix("header") {
            n.parse().ok().map(Self::Header)
        } else if let Some(n) = s.strip_prefix("footer") {
            n.parse().ok().map(Self::Footer)
        } else {
            None
        };
        parsed.ok_or_else(|| crate::error::SdtError::InvalidValue(format!("unknown part '{s}'")))
    }
}

impl fmt::Display for PartTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Header(n) => write!(f, "header{n}"),
            Self::Footer(n) => write!(f, "footer{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Paragraph,
    Run,
    Table,
    Cell,
    Image,
    Title,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Run => "run",
            Self::Table => "table",
            Self::Cell => "cell",
            Self::Image => "image",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run formatting that changes the serialized shape of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
}

impl RunFormat {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Compact signature used in fingerprints, e.g. `b-u-`.
    pub fn signature(&self) -> String {
        [
            (self.bold, 'b'),
            (self.italic, 'i'),
            (self.underline, 'u'),
            (self.strike, 's'),
        ]
        .iter()
        .map(|&(on, c)| if on { c } else { '-' })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub format: RunFormat,
    #[serde(default)]
    pub part: PartTarget,
}

impl Run {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: RunFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub part: PartTarget,
}

impl Paragraph {
    pub fn new(text: &str) -> Self {
        Self {
            runs: vec![Run::new(text)],
            ..Default::default()
        }
    }

    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub part: PartTarget,
}

impl TableCell {
    pub fn new(text: &str) -> Self {
        Self {
            paragraphs: vec![Paragraph::new(text)],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub part: PartTarget,
}

impl Table {
    /// Table with one single-paragraph cell per string.
    pub fn from_text<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|cells| TableRow {
                    cells: cells
                        .into_iter()
                        .map(|text| TableCell::new(text.as_ref()))
                        .collect(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Image {
    /// `wp:docPr/@name`
    pub name: String,
    /// `wp:docPr/@descr`
    #[serde(default)]
    pub description: Option<String>,
    /// Relationship id of the image part (`a:blip/@r:embed`).
    pub rel_id: String,
    #[serde(default = "Image::default_extent")]
    pub width_emu: u64,
    #[serde(default = "Image::default_extent")]
    pub height_emu: u64,
    #[serde(default)]
    pub part: PartTarget,
}

impl Image {
    pub fn new(name: &str, rel_id: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            rel_id: rel_id.to_string(),
            width_emu: Self::default_extent(),
            height_emu: Self::default_extent(),
            part: PartTarget::Body,
        }
    }

    fn default_extent() -> u64 {
        // One inch.
        914_400
    }
}

/// A heading. Depth 0 is the document title, 1 to 9 map to `Heading1..9`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    depth: u8,
    #[serde(default)]
    pub part: PartTarget,
}

impl Title {
    pub const MAX_DEPTH: u8 = 9;

    /// Depths above [`Title::MAX_DEPTH`] are clamped.
    pub fn new(text: &str, depth: u8) -> Self {
        Self {
            text: text.to_string(),
            depth: depth.min(Self::MAX_DEPTH),
            part: PartTarget::Body,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth.min(Self::MAX_DEPTH)
    }

    pub fn style_id(&self) -> String {
        match self.depth() {
            0 => "Title".to_string(),
            n => format!("Heading{n}"),
        }
    }

    /// Inverse of [`Title::style_id`].
    pub fn depth_for_style(style: &str) -> Option<u8> {
        if style == "Title" {
            return Some(0);
        }
        let n: u8 = style.strip_prefix("Heading")?.parse().ok()?;
        (1..=Self::MAX_DEPTH).contains(&n).then_some(n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentElement {
    Paragraph(Paragraph),
    Run(Run),
    Table(Table),
    Cell(TableCell),
    Image(Image),
    Title(Title),
}

impl ContentElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Paragraph(_) => ElementKind::Paragraph,
            Self::Run(_) => ElementKind::Run,
            Self::Table(_) => ElementKind::Table,
            Self::Cell(_) => ElementKind::Cell,
            Self::Image(_) => ElementKind::Image,
            Self::Title(_) => ElementKind::Title,
        }
    }

    pub fn part(&self) -> PartTarget {
        match self {
            Self::Paragraph(p) => p.part,
            Self::Run(r) => r.part,
            Self::Table(t) => t.part,
            Self::Cell(c) => c.part,
            Self::Image(i) => i.part,
            Self::Title(t) => t.part,
        }
    }

    /// Builder-style part assignment.
    pub fn in_part(mut self, target: PartTarget) -> Self {
        match &mut self {
            Self::Paragraph(p) => p.part = target,
            Self::Run(r) => r.part = target,
            Self::Table(t) => t.part = target,
            Self::Cell(c) => c.part = target,
            Self::Image(i) => i.part = target,
            Self::Title(t) => t.part = target,
        }
        self
    }

    /// Whether a run-level content control may target this element.
    pub fn is_run_eligible(&self) -> bool {
        matches!(self, Self::Run(_) | Self::Paragraph(_))
    }

    /// Short human label for diagnostics.
    pub fn label(&self) -> String {
        const MAX: usize = 24;
        let text = match self {
            Self::Paragraph(p) => p.text(),
            Self::Run(r) => r.text.clone(),
            Self::Title(t) => t.text.clone(),
            Self::Cell(c) => c.paragraphs.iter().map(Paragraph::text).collect::<Vec<_>>().join(" "),
            Self::Table(t) => format!("{}x{}", t.rows.len(), t.column_count()),
            Self::Image(i) => i.name.clone(),
        };
        if text.chars().count() > MAX {
            let cut: String = text.chars().take(MAX).collect();
            format!("{cut}…")
        } else {
            text
        }
    }
}

impl From<Paragraph> for ContentElement {
    fn from(value: Paragraph) -> Self {
        Self::Paragraph(value)
    }
}

impl From<Run> for ContentElement {
    fn from(value: Run) -> Self {
        Self::Run(value)
    }
}

impl From<Table> for ContentElement {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

impl From<TableCell> for ContentElement {
    fn from(value: TableCell) -> Self {
        Self::Cell(value)
    }
}

impl From<Image> for ContentElement {
    fn from(value: Image) -> Self {
        Self::Image(value)
    }
}

impl From<Title> for ContentElement {
    fn from(value: Title) -> Self {
        Self::Title(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_paths_round_trip() {
        for target in [PartTarget::Body, PartTarget::Header(2), PartTarget::Footer(1)] {
            assert_eq!(PartTarget::from_part_path(&target.part_path()), Some(target));
        }
        assert_eq!(PartTarget::from_part_path("word/styles.xml"), None);
        assert_eq!(PartTarget::from_part_path("word/headerX.xml"), None);
    }

    #[test]
    fn part_names_parse() {
        assert_eq!("header2".parse::<PartTarget>().unwrap(), PartTarget::Header(2));
        assert_eq!("body".parse::<PartTarget>().unwrap(), PartTarget::Body);
        assert!("sidebar".parse::<PartTarget>().is_err());
    }

    #[test]
    fn title_style_mapping() {
        assert_eq!(Title::new("Doc", 0).style_id(), "Title");
        assert_eq!(Title::new("Intro", 2).style_id(), "Heading2");
        assert_eq!(Title::new("Deep", 42).depth(), 9);
        assert_eq!(Title::depth_for_style("Heading3"), Some(3));
        assert_eq!(Title::depth_for_style("Heading10"), None);
        assert_eq!(Title::depth_for_style("Normal"), None);
    }

    #[test]
    fn run_eligibility() {
        assert!(ContentElement::from(Run::new("x")).is_run_eligible());
        assert!(ContentElement::from(Paragraph::new("x")).is_run_eligible());
        assert!(!ContentElement::from(Table::from_text([["a"]])).is_run_eligible());
        assert!(!ContentElement::from(Title::new("x", 1)).is_run_eligible());
    }

    #[test]
    fn elements_deserialize_from_tagged_json() {
        let json = r#"{"kind":"paragraph","runs":[{"text":"Hello"}],"part":{"footer":1}}"#;
        let element: ContentElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.kind(), ElementKind::Paragraph);
        assert_eq!(element.part(), PartTarget::Footer(1));
        assert_eq!(element.label(), "Hello");
    }

    #[test]
    fn format_signature() {
        let format = RunFormat {
            bold: true,
            underline: true,
            ..Default::default()
        };
        assert_eq!(format.signature(), "b-u-");
        assert!(RunFormat::default().is_plain());
    }
}
