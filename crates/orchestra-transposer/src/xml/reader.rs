// crates/orchestra-transposer/src/xml/reader.rs

//! Event-based decoding of a dialect document into a [`Node`] tree.

use std::io::BufRead;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use super::node::Node;
use super::DialectSchema;
use crate::error::TransposerError;

/// Decodes a document into a tree, preserving attribute and child order.
///
/// Decoding is lax: findings that leave a usable tree (currently an
/// unexpected root element) are returned in the error list rather than
/// failing the call. Malformed XML is a hard error.
pub fn read_document<R: BufRead>(
    input: R,
    schema: &DialectSchema,
) -> Result<(Node, Vec<TransposerError>), TransposerError> {
    let mut reader = NsReader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((resolve, Event::Start(e))) => {
                stack.push(start_node(resolve, &e, schema)?);
            }
            Ok((resolve, Event::Empty(e))) => {
                let node = start_node(resolve, &e, schema)?;
                attach(node, &mut stack, &mut root);
            }
            Ok((_, Event::End(_))) => {
                if let Some(node) = stack.pop() {
                    attach(node, &mut stack, &mut root);
                }
            }
            Ok((_, Event::Text(t))) => {
                if let Some(top) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&t).into_owned();
                    let text =
                        quick_xml::escape::unescape(&raw).map_err(TransposerError::xml)?;
                    top.push_text(&text);
                }
            }
            Ok((_, Event::CData(t))) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&String::from_utf8_lossy(&t));
                }
            }
            Ok((_, Event::GeneralRef(r))) => {
                // Predefined entities arrive as references when split out of
                // their surrounding text.
                if let Some(top) = stack.last_mut() {
                    match &*r {
                        b"amp" => top.push_text("&"),
                        b"lt" => top.push_text("<"),
                        b"gt" => top.push_text(">"),
                        b"quot" => top.push_text("\""),
                        b"apos" => top.push_text("'"),
                        _ => {}
                    }
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => return Err(TransposerError::xml(e)),
        }
        buf.clear();
    }

    let root = root.ok_or(TransposerError::EmptyDocument)?;
    let mut errors = Vec::new();
    if root.name() != schema.root {
        errors.push(TransposerError::UnexpectedRoot {
            expected: schema.root,
            found: root.name().to_string(),
        });
    }
    Ok((root, errors))
}

fn attach(node: Node, stack: &mut Vec<Node>, root: &mut Option<Node>) {
    match stack.last_mut() {
        Some(parent) => parent.push_child(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

/// Builds a node from a start tag: canonical name plus decoded attributes,
/// with namespace declarations stripped (the writer re-creates them).
fn start_node(
    resolve: ResolveResult<'_>,
    start: &BytesStart<'_>,
    schema: &DialectSchema,
) -> Result<Node, TransposerError> {
    let local = String::from_utf8_lossy(start.local_name().into_inner()).into_owned();
    let name = match resolve {
        ResolveResult::Bound(ns) => {
            let uri = String::from_utf8_lossy(ns.0);
            match schema.namespaces.iter().find(|d| d.uri == uri) {
                Some(decl) if decl.canonical.is_empty() => local,
                Some(decl) => format!("{}:{}", decl.canonical, local),
                // Unknown namespace: keep the name exactly as written.
                None => String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            }
        }
        _ => local,
    };

    let mut node = Node::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(TransposerError::xml)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = quick_xml::escape::unescape(&raw).map_err(TransposerError::xml)?;
        node.set_attr(key, value.into_owned());
    }
    Ok(node)
}
