// crates/orchestra-transposer/src/xml/writer.rs

//! Serializes a [`Node`] tree back to XML.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::node::Node;
use super::{DialectSchema, NamespaceDecl};
use crate::error::TransposerError;

const XSI_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Encodes a tree as an XML document with the dialect's namespace
/// declarations on the root element.
pub fn write_document<W: Write>(
    root: &Node,
    schema: &DialectSchema,
    out: W,
) -> Result<Vec<TransposerError>, TransposerError> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(TransposerError::xml)?;
    write_node(&mut writer, root, schema, true)?;
    Ok(Vec::new())
}

fn write_node<W: Write>(
    writer: &mut Writer<W>,
    node: &Node,
    schema: &DialectSchema,
    is_root: bool,
) -> Result<(), TransposerError> {
    let name = written_name(node.name(), schema);
    let mut start = BytesStart::new(name.as_str());

    if is_root {
        for decl in schema.namespaces {
            if decl.declare_if_used && !uses_canonical(node, decl) {
                continue;
            }
            match decl.write_prefix {
                Some(prefix) => {
                    start.push_attribute((format!("xmlns:{prefix}").as_str(), decl.uri))
                }
                None => start.push_attribute(("xmlns", decl.uri)),
            }
        }
        // xsi only carries attributes (schemaLocation, type); declare it when
        // one survived decoding.
        if node.attrs().any(|(k, _)| k.starts_with("xsi:")) {
            start.push_attribute(("xmlns:xsi", XSI_URI));
        }
    }

    for (key, value) in node.attrs() {
        start.push_attribute((key, value.as_text().as_ref()));
    }

    if node.children().is_empty() && node.text().is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(TransposerError::xml);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(TransposerError::xml)?;
    if let Some(text) = node.text() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(TransposerError::xml)?;
    }
    for child in node.children() {
        write_node(writer, child, schema, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(TransposerError::xml)
}

/// Maps a canonical node name to the name written in the document.
fn written_name(name: &str, schema: &DialectSchema) -> String {
    if let Some((prefix, local)) = name.split_once(':') {
        return match schema.namespaces.iter().find(|d| d.canonical == prefix) {
            Some(decl) => match decl.write_prefix {
                Some(p) => format!("{p}:{local}"),
                None => local.to_string(),
            },
            None => name.to_string(),
        };
    }
    if schema.qualified_locals.contains(&name) {
        if let Some(decl) = schema
            .namespaces
            .iter()
            .find(|d| d.canonical.is_empty())
        {
            if let Some(p) = decl.write_prefix {
                return format!("{p}:{name}");
            }
        }
    }
    name.to_string()
}

/// Whether any element in the tree carries the declaration's canonical prefix.
fn uses_canonical(node: &Node, decl: &NamespaceDecl) -> bool {
    if !decl.canonical.is_empty() {
        if let Some((prefix, _)) = node.name().split_once(':') {
            if prefix == decl.canonical {
                return true;
            }
        }
    }
    node.children().iter().any(|c| uses_canonical(c, decl))
}
