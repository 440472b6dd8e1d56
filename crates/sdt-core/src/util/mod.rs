pub mod descendants;
pub mod strings;

pub use descendants::descendants_pruned;
pub use strings::{
    collapse_whitespace, contains_xml_reserved, escape_xml_attr, escape_xml_text, xpath_literal,
    TextNormalizer,
};
