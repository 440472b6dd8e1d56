#![allow(non_snake_case)]

use super::xname::XName;

pub mod W {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// ISO/IEC 29500 Strict namespace.
    pub const STRICT_NS: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

    /// True for `local_name` in either the transitional or the strict namespace.
    pub fn is(name: &XName, local_name: &str) -> bool {
        name.is(NS, local_name) || name.is(STRICT_NS, local_name)
    }

    pub fn document() -> XName { XName::new(NS, "document") }
    pub fn body() -> XName { XName::new(NS, "body") }
    pub fn hdr() -> XName { XName::new(NS, "hdr") }
    pub fn headerReference() -> XName { XName::new(NS, "headerReference") }
    pub fn footerReference() -> XName { XName::new(NS, "footerReference") }
    pub fn ftr() -> XName { XName::new(NS, "ftr") }
    pub fn p() -> XName { XName::new(NS, "p") }
    pub fn pPr() -> XName { XName::new(NS, "pPr") }
    pub fn pStyle() -> XName { XName::new(NS, "pStyle") }
    pub fn r() -> XName { XName::new(NS, "r") }
    pub fn rPr() -> XName { XName::new(NS, "rPr") }
    pub fn t() -> XName { XName::new(NS, "t") }
    pub fn tab() -> XName { XName::new(NS, "tab") }
    pub fn br() -> XName { XName::new(NS, "br") }
    pub fn b() -> XName { XName::new(NS, "b") }
    pub fn i() -> XName { XName::new(NS, "i") }
    pub fn u() -> XName { XName::new(NS, "u") }
    pub fn strike() -> XName { XName::new(NS, "strike") }
    pub fn tbl() -> XName { XName::new(NS, "tbl") }
    pub fn tblPr() -> XName { XName::new(NS, "tblPr") }
    pub fn tblGrid() -> XName { XName::new(NS, "tblGrid") }
    pub fn tr() -> XName { XName::new(NS, "tr") }
    pub fn tc() -> XName { XName::new(NS, "tc") }
    pub fn tcPr() -> XName { XName::new(NS, "tcPr") }
    pub fn drawing() -> XName { XName::new(NS, "drawing") }
    pub fn pict() -> XName { XName::new(NS, "pict") }
    pub fn sectPr() -> XName { XName::new(NS, "sectPr") }
    pub fn sdt() -> XName { XName::new(NS, "sdt") }
    pub fn sdtPr() -> XName { XName::new(NS, "sdtPr") }
    pub fn sdtEndPr() -> XName { XName::new(NS, "sdtEndPr") }
    pub fn sdtContent() -> XName { XName::new(NS, "sdtContent") }
    pub fn alias() -> XName { XName::new(NS, "alias") }
    pub fn tag() -> XName { XName::new(NS, "tag") }
    pub fn id() -> XName { XName::new(NS, "id") }
    pub fn lock() -> XName { XName::new(NS, "lock") }
    pub fn group() -> XName { XName::new(NS, "group") }
    pub fn text() -> XName { XName::new(NS, "text") }
    pub fn richText() -> XName { XName::new(NS, "richText") }
    pub fn picture() -> XName { XName::new(NS, "picture") }
    pub fn val() -> XName { XName::new(NS, "val") }
}

pub mod R {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    pub fn id() -> XName { XName::new(NS, "id") }
    pub fn embed() -> XName { XName::new(NS, "embed") }
}

pub mod WP {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

    pub fn inline() -> XName { XName::new(NS, "inline") }
    pub fn docPr() -> XName { XName::new(NS, "docPr") }
}

pub mod A {
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
}

pub mod PIC {
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
}

pub mod XMLNS {
    pub const NS: &str = "http://www.w3.org/2000/xmlns/";
}

pub mod XML {
    use super::XName;
    pub const NS: &str = "http://www.w3.org/XML/1998/namespace";

    pub fn space() -> XName { XName::new(NS, "space") }
}
