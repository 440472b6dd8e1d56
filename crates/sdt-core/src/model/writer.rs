//! WordprocessingML serialization of [`ContentElement`]s.
//!
//! Output is a fragment in the `w:` / `wp:` / `a:` / `pic:` / `r:` prefixes;
//! the enclosing part is expected to declare them (see
//! [`crate::wml::document::PART_NAMESPACES`]).

use super::{ContentElement, Image, Paragraph, Run, Table, TableCell, Title};
use crate::util::{escape_xml_attr, escape_xml_text};

/// Single entry point that turns any element into markup.
///
/// Keeps the running `wp:docPr/@id` counter so drawings written through one
/// writer get distinct ids.
#[derive(Debug, Default)]
pub struct ElementWriter {
    next_drawing_id: u32,
}

impl ElementWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, element: &ContentElement) -> String {
        let mut out = String::new();
        match element {
            ContentElement::Paragraph(p) => self.paragraph(p, &mut out),
            ContentElement::Run(r) => run(r, &mut out),
            ContentElement::Table(t) => self.table(t, &mut out),
            ContentElement::Cell(c) => self.cell(c, &mut out),
            ContentElement::Image(i) => self.image(i, &mut out),
            ContentElement::Title(t) => title(t, &mut out),
        }
        out
    }

    /// Markup that can stand directly under `w:body`, `w:hdr` or `w:ftr`.
    ///
    /// Runs are placed in a paragraph and cells in a one-cell table.
    pub fn write_block(&mut self, element: &ContentElement) -> String {
        match element {
            ContentElement::Run(r) => {
                let mut out = String::from("<w:p>");
                run(r, &mut out);
                out.push_str("</w:p>");
                out
            }
            ContentElement::Cell(c) => {
                let mut out = String::new();
                open_table(1, &mut out);
                out.push_str("<w:tr>");
                self.cell(c, &mut out);
                out.push_str("</w:tr></w:tbl>");
                out
            }
            other => self.write(other),
        }
    }

    fn paragraph(&mut self, p: &Paragraph, out: &mut String) {
        out.push_str("<w:p>");
        if let Some(style) = &p.style {
            paragraph_style(style, out);
        }
        for r in &p.runs {
            run(r, out);
        }
        out.push_str("</w:p>");
    }

    fn table(&mut self, t: &Table, out: &mut String) {
        open_table(t.column_count(), out);
        for row in &t.rows {
            out.push_str("<w:tr>");
            for c in &row.cells {
                self.cell(c, out);
            }
            out.push_str("</w:tr>");
        }
        out.push_str("</w:tbl>");
    }

    fn cell(&mut self, c: &TableCell, out: &mut String) {
        out.push_str("<w:tc><w:tcPr><w:tcW w:w=\"0\" w:type=\"auto\"/></w:tcPr>");
        if c.paragraphs.is_empty() {
            // A cell must end with a paragraph.
            out.push_str("<w:p/>");
        }
        for p in &c.paragraphs {
            self.paragraph(p, out);
        }
        out.push_str("</w:tc>");
    }

    fn image(&mut self, i: &Image, out: &mut String) {
        self.next_drawing_id += 1;
        let id = self.next_drawing_id;
        let name = escape_xml_attr(&i.name);
        let descr = i
            .description
            .as_deref()
            .map(|d| format!(" descr=\"{}\"", escape_xml_attr(d)))
            .unwrap_or_default();

        out.push_str("<w:p><w:r><w:drawing><wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">");
        out.push_str(&format!(
            "<wp:extent cx=\"{}\" cy=\"{}\"/>",
            i.width_emu, i.height_emu
        ));
        out.push_str(&format!("<wp:docPr id=\"{id}\" name=\"{name}\"{descr}/>"));
        out.push_str("<a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">");
        out.push_str(&format!(
            "<pic:pic><pic:nvPicPr><pic:cNvPr id=\"0\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>"
        ));
        out.push_str(&format!(
            "<pic:blipFill><a:blip r:embed=\"{}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
            escape_xml_attr(&i.rel_id)
        ));
        out.push_str(&format!(
            "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm><a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
            i.width_emu, i.height_emu
        ));
        out.push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>");
    }
}

/// Serialize one element with a fresh [`ElementWriter`].
pub fn write_element(element: &ContentElement) -> String {
    ElementWriter::new().write(element)
}

fn open_table(columns: usize, out: &mut String) {
    out.push_str("<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/></w:tblPr><w:tblGrid>");
    for _ in 0..columns {
        out.push_str("<w:gridCol/>");
    }
    out.push_str("</w:tblGrid>");
}

fn paragraph_style(style: &str, out: &mut String) {
    out.push_str(&format!(
        "<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>",
        escape_xml_attr(style)
    ));
}

fn title(t: &Title, out: &mut String) {
    out.push_str("<w:p>");
    paragraph_style(&t.style_id(), out);
    run(&Run::new(&t.text), out);
    out.push_str("</w:p>");
}

fn run(r: &Run, out: &mut String) {
    out.push_str("<w:r>");
    if !r.format.is_plain() {
        out.push_str("<w:rPr>");
        if r.format.bold {
            out.push_str("<w:b/>");
        }
        if r.format.italic {
            out.push_str("<w:i/>");
        }
        if r.format.underline {
            out.push_str("<w:u w:val=\"single\"/>");
        }
        if r.format.strike {
            out.push_str("<w:strike/>");
        }
        out.push_str("</w:rPr>");
    }
    let preserve = r.text.starts_with(char::is_whitespace) || r.text.ends_with(char::is_whitespace);
    if preserve {
        out.push_str("<w:t xml:space=\"preserve\">");
    } else {
        out.push_str("<w:t>");
    }
    out.push_str(&escape_xml_text(&r.text));
    out.push_str("</w:t></w:r>");
}
