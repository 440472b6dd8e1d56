use super::arena::XmlDocument;
use super::namespaces::{XML, XMLNS};
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use crate::error::{Result, SdtError};
use indextree::NodeId;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Cursor;

/// Namespace URI -> prefix currently in scope. The empty prefix is the
/// default namespace.
type NamespaceMap = HashMap<String, String>;

pub fn serialize(doc: &XmlDocument) -> Result<String> {
    into_string(serialize_bytes(doc)?)
}

pub fn serialize_bytes(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(write_error)?;

    if let Some(root) = doc.root() {
        write_node(doc, root, &mut writer, &NamespaceMap::new())?;
    }

    Ok(writer.into_inner().into_inner())
}

/// Serialize the subtree at `node` without an XML declaration.
///
/// Namespace declarations inherited from ancestors are re-declared on the
/// subtree root so the fragment stands on its own.
pub fn serialize_subtree(doc: &XmlDocument, node: NodeId) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    match doc.get(node) {
        Some(XmlNodeData::Element { name, attributes }) => {
            let mut merged = attributes.clone();
            for inherited in inherited_declarations(doc, node) {
                if !merged.iter().any(|a| a.name == inherited.name) {
                    merged.push(inherited);
                }
            }
            write_element(doc, node, name, &merged, &mut writer, &NamespaceMap::new())?;
        }
        Some(_) => write_node(doc, node, &mut writer, &NamespaceMap::new())?,
        None => return Ok(String::new()),
    }

    into_string(writer.into_inner().into_inner())
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| SdtError::XmlWrite(e.to_string()))
}

fn write_error(e: impl std::fmt::Display) -> SdtError {
    SdtError::XmlWrite(e.to_string())
}

fn is_declaration(attr: &XAttribute) -> bool {
    (attr.name.namespace.is_none() && attr.name.local_name == "xmlns")
        || attr.name.namespace.as_deref() == Some(XMLNS::NS)
}

/// Nearest-first namespace declarations of all ancestors of `node`.
fn inherited_declarations(doc: &XmlDocument, node: NodeId) -> Vec<XAttribute> {
    let mut collected: Vec<XAttribute> = Vec::new();
    for ancestor in doc.ancestors(node).skip(1) {
        let Some(attrs) = doc.get(ancestor).and_then(XmlNodeData::attributes) else {
            continue;
        };
        for attr in attrs.iter().filter(|a| is_declaration(a)) {
            if !collected.iter().any(|c| c.name == attr.name) {
                collected.push(attr.clone());
            }
        }
    }
    collected
}

fn scope_with(parent: &NamespaceMap, attributes: &[XAttribute]) -> NamespaceMap {
    let mut scoped = parent.clone();
    for attr in attributes.iter().filter(|a| is_declaration(a)) {
        let prefix = match attr.name.namespace {
            Some(_) => attr.name.local_name.clone(),
            None => String::new(),
        };
        scoped.insert(attr.value.clone(), prefix);
    }
    scoped
}

fn qualified_element_name(name: &XName, scope: &NamespaceMap) -> String {
    let Some(ns) = &name.namespace else {
        return name.local_name.clone();
    };
    let prefix = scope
        .get(ns)
        .map(String::as_str)
        .unwrap_or_else(|| well_known_prefix(ns));
    if prefix.is_empty() {
        name.local_name.clone()
    } else {
        format!("{}:{}", prefix, name.local_name)
    }
}

fn qualified_attribute_name(name: &XName, scope: &NamespaceMap) -> String {
    let Some(ns) = &name.namespace else {
        return name.local_name.clone();
    };
    // Unprefixed attributes never take the default namespace, so an empty
    // mapping falls through to the well-known prefix.
    let prefix = match scope.get(ns) {
        _ if ns == XMLNS::NS => "xmlns",
        Some(prefix) if !prefix.is_empty() => prefix.as_str(),
        _ => well_known_prefix(ns),
    };
    format!("{}:{}", prefix, name.local_name)
}

fn write_node<W: std::io::Write>(
    doc: &XmlDocument,
    node: NodeId,
    writer: &mut Writer<W>,
    scope: &NamespaceMap,
) -> Result<()> {
    let Some(data) = doc.get(node) else {
        return Ok(());
    };

    let event = match data {
        XmlNodeData::Element { name, attributes } => {
            return write_element(doc, node, name, attributes, writer, scope);
        }
        XmlNodeData::Text(text) => Event::Text(BytesText::new(text)),
        XmlNodeData::CData(text) => Event::CData(BytesCData::new(text)),
        XmlNodeData::Comment(text) => Event::Comment(BytesText::from_escaped(text.as_str())),
        XmlNodeData::ProcessingInstruction { target, data } => {
            let content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            Event::PI(BytesPI::new(content))
        }
    };
    writer.write_event(event).map_err(write_error)
}

fn write_element<W: std::io::Write>(
    doc: &XmlDocument,
    node: NodeId,
    name: &XName,
    attributes: &[XAttribute],
    writer: &mut Writer<W>,
    scope: &NamespaceMap,
) -> Result<()> {
    let scoped = scope_with(scope, attributes);
    let tag_name = qualified_element_name(name, &scoped);

    let mut start = BytesStart::new(tag_name.as_str());
    for attr in attributes {
        let attr_name = qualified_attribute_name(&attr.name, &scoped);
        start.push_attribute((attr_name.as_str(), attr.value.as_str()));
    }

    let mut children = doc.children(node).peekable();
    if children.peek().is_none() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in children {
        write_node(doc, child, writer, &scoped)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag_name.as_str())))
        .map_err(write_error)
}

fn well_known_prefix(namespace: &str) -> &'static str {
    match namespace {
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main" => "w",
        "http://schemas.microsoft.com/office/word/2010/wordml" => "w14",
        "http://schemas.microsoft.com/office/word/2012/wordml" => "w15",
        "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" => "wp",
        "http://schemas.openxmlformats.org/drawingml/2006/picture" => "pic",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships" => "r",
        "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
        XML::NS => "xml",
        XMLNS::NS => "xmlns",
        _ => "ns",
    }
}
