//! In-place wrapping of a located node in a `w:sdt`.
//!
//! ```text
//! before:  parent ─ … ─ node ─ …
//! after:   parent ─ … ─ w:sdt ─ …
//!                         ├─ w:sdtPr
//!                         └─ w:sdtContent ─ node
//! ```

use super::config::SdtConfig;
use super::identity::is_wml;
use super::registry::ProcessedRegistry;
use crate::error::{Result, SdtError};
use crate::xml::{XAttribute, XName, XmlDocument, XmlNodeData};
use indextree::NodeId;
use std::fmt;

/// Where the control sits in the content model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapFlavor {
    /// Around a paragraph or table.
    Block,
    /// Around a cell, or around content inside a cell.
    Inline,
    /// Around a single run.
    Run,
}

impl WrapFlavor {
    /// `run_level` decides what is wrapped, `inline_level` where.
    pub fn for_config(config: &SdtConfig) -> Self {
        if config.run_level() {
            Self::Run
        } else if config.inline_level() {
            Self::Inline
        } else {
            Self::Block
        }
    }
}

impl fmt::Display for WrapFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::Inline => "inline",
            Self::Run => "run",
        })
    }
}

/// Nodes created by one wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapped {
    pub sdt: NodeId,
    pub content: NodeId,
}

fn check_shape(doc: &XmlDocument, node: NodeId, flavor: WrapFlavor) -> Result<()> {
    let ok = match flavor {
        WrapFlavor::Run => is_wml(doc, node, "r"),
        WrapFlavor::Inline => doc.ancestors(node).any(|a| is_wml(doc, a, "tc")),
        WrapFlavor::Block => !is_wml(doc, node, "r"),
    };
    if ok {
        Ok(())
    } else {
        Err(SdtError::Contract(format!(
            "{flavor} wrap does not apply to {}",
            doc.path(node)
        )))
    }
}

fn val_element(name: XName, value: &str) -> XmlNodeData {
    let val = name.sibling("val");
    XmlNodeData::element_with_attrs(name, vec![XAttribute::new(val, value)])
}

/// Build `<w:sdtPr>` under `sdt`: alias, tag, id, lock, type marker.
fn build_properties(doc: &mut XmlDocument, sdt: NodeId, ns: &XName, config: &SdtConfig) {
    let pr = doc.add_child(sdt, XmlNodeData::element(ns.sibling("sdtPr")));
    if let Some(alias) = config.alias() {
        doc.add_child(pr, val_element(ns.sibling("alias"), alias));
    }
    if let Some(tag) = config.tag() {
        doc.add_child(pr, val_element(ns.sibling("tag"), tag));
    }
    doc.add_child(pr, val_element(ns.sibling("id"), &config.id().to_string()));
    if let Some(lock) = config.lock().attribute_value() {
        doc.add_child(pr, val_element(ns.sibling("lock"), lock));
    }
    doc.add_child(pr, XmlNodeData::element(ns.sibling(config.sdt_type().marker())));
}

/// Wrap `node` in a new content control and mark it processed.
///
/// The node is moved, never copied: afterwards it is the only child of the
/// new `w:sdtContent`, which is the second child of a `w:sdt` standing where
/// the node used to be.
pub fn wrap(
    doc: &mut XmlDocument,
    registry: &mut ProcessedRegistry,
    node: NodeId,
    config: &SdtConfig,
    flavor: WrapFlavor,
) -> Result<Wrapped> {
    if !doc.contains(node) || doc.parent(node).is_none() {
        return Err(SdtError::Contract(
            "wrap target must be attached to the tree".to_string(),
        ));
    }
    if registry.is_processed(node) {
        return Err(SdtError::Contract(format!(
            "{} is already wrapped",
            doc.path(node)
        )));
    }
    check_shape(doc, node, flavor)?;

    let name = doc
        .name(node)
        .cloned()
        .ok_or_else(|| SdtError::Contract("wrap target must be an element".to_string()))?;

    let sdt = doc.add_before(node, XmlNodeData::element(name.sibling("sdt")));
    build_properties(doc, sdt, &name, config);
    let content = doc.add_child(sdt, XmlNodeData::element(name.sibling("sdtContent")));
    doc.move_into(node, content)?;
    registry.mark_processed(node, content);

    Ok(Wrapped { sdt, content })
}
