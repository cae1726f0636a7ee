// crates/orchestra-transposer/src/orchestra/instance.rs

//! Typed views over a decoded Orchestra repository tree.

use crate::xml::Node;

/// Shared accessors over an Orchestra repository document.
///
/// Collection accessors auto-vivify their container element, so translators
/// may call them in any order; id lookups are a linear scan returning the
/// first match in document order, and a miss is a recoverable condition for
/// the caller (log, substitute a placeholder, continue).
pub trait Repository {
    /// The document root (`fixr:repository`).
    fn root(&self) -> &Node;
    /// Mutable document root.
    fn root_mut(&mut self) -> &mut Node;

    /// Metadata section holding Dublin Core terms.
    fn metadata(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:metadata")
    }

    /// Text of one metadata term, e.g. `dcterms:identifier` or `dc:rights`.
    fn metadata_term(&self, term: &str) -> Option<&str> {
        self.root().child("fixr:metadata")?.child(term)?.text()
    }

    /// Sets a metadata term, replacing any existing text.
    fn set_metadata_term(&mut self, term: &str, value: &str) {
        self.metadata().get_or_create_child(term).set_text(value);
    }

    fn sections_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:sections")
    }

    fn categories_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:categories")
    }

    fn datatypes_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:datatypes")
    }

    fn codesets_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:codeSets")
    }

    fn fields_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:fields")
    }

    fn components_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:components")
    }

    fn groups_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:groups")
    }

    fn messages_mut(&mut self) -> &mut Node {
        self.root_mut().get_or_create_child("fixr:messages")
    }

    fn sections(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:sections", "fixr:section")
    }

    fn categories(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:categories", "fixr:category")
    }

    fn datatypes(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:datatypes", "fixr:datatype")
    }

    fn codesets(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:codeSets", "fixr:codeSet")
    }

    fn fields(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:fields", "fixr:field")
    }

    fn components(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:components", "fixr:component")
    }

    fn groups(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:groups", "fixr:group")
    }

    fn messages(&self) -> impl Iterator<Item = &Node> {
        collection(self.root(), "fixr:messages", "fixr:message")
    }

    /// Field definition by numeric id.
    fn field(&self, id: i64) -> Option<&Node> {
        self.fields().find(|f| f.attr_i64("id") == Some(id))
    }

    /// Component definition by numeric id.
    fn component(&self, id: i64) -> Option<&Node> {
        self.components().find(|c| c.attr_i64("id") == Some(id))
    }

    /// Group definition by numeric id.
    fn group(&self, id: i64) -> Option<&Node> {
        self.groups().find(|g| g.attr_i64("id") == Some(id))
    }

    /// Codeset definition by name (fields reference codesets through their
    /// `type` attribute).
    fn codeset_by_name(&self, name: &str) -> Option<&Node> {
        self.codesets().find(|c| c.attr_str("name") == Some(name))
    }

    fn append_section(&mut self, section: Node) {
        self.sections_mut().push_child(section);
    }

    fn append_category(&mut self, category: Node) {
        self.categories_mut().push_child(category);
    }

    fn append_datatype(&mut self, datatype: Node) {
        self.datatypes_mut().push_child(datatype);
    }

    fn append_codeset(&mut self, codeset: Node) {
        self.codesets_mut().push_child(codeset);
    }

    fn append_field(&mut self, field: Node) {
        self.fields_mut().push_child(field);
    }

    fn append_component(&mut self, component: Node) {
        self.components_mut().push_child(component);
    }

    fn append_group(&mut self, group: Node) {
        self.groups_mut().push_child(group);
    }

    fn append_message(&mut self, message: Node) {
        self.messages_mut().push_child(message);
    }
}

fn collection<'a>(
    root: &'a Node,
    container: &'static str,
    item: &'static str,
) -> impl Iterator<Item = &'a Node> {
    root.child(container)
        .into_iter()
        .flat_map(move |c| c.children_named(item))
}

/// An instance of Orchestra version 1.0.
#[derive(Debug, Clone)]
pub struct OrchestraInstance10 {
    root: Node,
}

impl Default for OrchestraInstance10 {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestraInstance10 {
    /// An empty repository skeleton.
    pub fn new() -> Self {
        OrchestraInstance10 {
            root: Node::new("fixr:repository"),
        }
    }

    /// Wraps a decoded document root.
    pub fn from_root(root: Node) -> Self {
        OrchestraInstance10 { root }
    }

    /// Releases the underlying tree.
    pub fn into_root(self) -> Node {
        self.root
    }
}

impl Repository for OrchestraInstance10 {
    fn root(&self) -> &Node {
        &self.root
    }

    fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }
}

/// An instance of Orchestra version 1.1, which adds a first-class scenario
/// collection.
#[derive(Debug, Clone)]
pub struct OrchestraInstance11 {
    root: Node,
}

impl Default for OrchestraInstance11 {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestraInstance11 {
    /// An empty repository skeleton.
    pub fn new() -> Self {
        OrchestraInstance11 {
            root: Node::new("fixr:repository"),
        }
    }

    /// Wraps a decoded document root.
    pub fn from_root(root: Node) -> Self {
        OrchestraInstance11 { root }
    }

    /// Releases the underlying tree.
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Declared scenarios, in document order.
    pub fn scenarios(&self) -> impl Iterator<Item = &Node> {
        collection(&self.root, "fixr:scenarios", "fixr:scenario")
    }

    /// Adds a scenario declaration.
    pub fn append_scenario(&mut self, scenario: Node) {
        self.root
            .get_or_create_child("fixr:scenarios")
            .push_child(scenario);
    }
}

impl Repository for OrchestraInstance11 {
    fn root(&self) -> &Node {
        &self.root
    }

    fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }
}

/// Body of a message, created on demand. Components and groups carry their
/// member references directly; only messages wrap them in a structure
/// element.
pub fn structure(message: &mut Node) -> &mut Node {
    message.get_or_create_child("fixr:structure")
}

/// `fieldRef` members of a structure, component, or group.
pub fn field_refs(node: &Node) -> impl Iterator<Item = &Node> {
    node.children_named("fixr:fieldRef")
}

/// `componentRef` members of a structure, component, or group.
pub fn component_refs(node: &Node) -> impl Iterator<Item = &Node> {
    node.children_named("fixr:componentRef")
}

/// `groupRef` members of a structure, component, or group.
pub fn group_refs(node: &Node) -> impl Iterator<Item = &Node> {
    node.children_named("fixr:groupRef")
}

/// Documentation entries of an element as `(purpose, text)` pairs; either
/// side may be absent.
pub fn documentation(node: &Node) -> Vec<(Option<String>, Option<String>)> {
    let Some(annotation) = node.child("fixr:annotation") else {
        return Vec::new();
    };
    annotation
        .children_named("fixr:documentation")
        .map(|doc| {
            (
                doc.attr_str("purpose").map(str::to_string),
                doc.text().map(str::to_string),
            )
        })
        .collect()
}

/// Documentation text of an element joined into one string, for formats that
/// keep a single description attribute.
pub fn documentation_text(node: &Node) -> Option<String> {
    let docs = documentation(node);
    let texts: Vec<&str> = docs
        .iter()
        .filter_map(|(_, t)| t.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join(" "))
    }
}

/// Adds a documentation entry to an element, preserving existing entries.
pub fn append_documentation(node: &mut Node, text: &str) {
    let annotation = node.get_or_create_child("fixr:annotation");
    let mut doc = Node::new("fixr:documentation");
    doc.set_text(text);
    annotation.push_child(doc);
}

/// Appends a member reference to a structure, keeping any trailing
/// annotation block last.
pub fn append_to_structure(structure: &mut Node, member: Node) {
    let pos = structure
        .children()
        .iter()
        .rposition(|c| c.name() == "fixr:annotation");
    match pos {
        Some(idx) => structure.insert_child(idx, member),
        None => structure.push_child(member),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_first_match_in_document_order() {
        let mut orch = OrchestraInstance10::new();
        let mut first = Node::new("fixr:field");
        first.set_attr("id", 37i64);
        first.set_attr("name", "OrderID");
        let mut dup = Node::new("fixr:field");
        dup.set_attr("id", 37i64);
        dup.set_attr("name", "Duplicate");
        orch.append_field(first);
        orch.append_field(dup);
        assert_eq!(orch.field(37).unwrap().attr_str("name"), Some("OrderID"));
        assert!(orch.field(38).is_none());
    }

    #[test]
    fn test_id_spaces_are_independent() {
        let mut orch = OrchestraInstance10::new();
        let mut field = Node::new("fixr:field");
        field.set_attr("id", 37i64);
        let mut component = Node::new("fixr:component");
        component.set_attr("id", 37i64);
        orch.append_field(field);
        orch.append_component(component);
        assert!(orch.field(37).is_some());
        assert!(orch.component(37).is_some());
        assert!(orch.group(37).is_none());
    }

    #[test]
    fn test_append_to_structure_keeps_annotation_last() {
        let mut message = Node::new("fixr:message");
        let body = structure(&mut message);
        append_documentation(body, "a heartbeat");
        let mut field_ref = Node::new("fixr:fieldRef");
        field_ref.set_attr("id", 112i64);
        append_to_structure(body, field_ref);
        let names: Vec<&str> = body.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["fixr:fieldRef", "fixr:annotation"]);
    }

    #[test]
    fn test_documentation_pairs() {
        let mut field = Node::new("fixr:field");
        append_documentation(&mut field, "first");
        field
            .child_mut("fixr:annotation")
            .unwrap()
            .children_mut()
            .last_mut()
            .unwrap()
            .set_attr("purpose", "SYNOPSIS");
        append_documentation(&mut field, "second");
        let docs = documentation(&field);
        assert_eq!(
            docs,
            vec![
                (Some("SYNOPSIS".to_string()), Some("first".to_string())),
                (None, Some("second".to_string())),
            ]
        );
        assert_eq!(documentation_text(&field).as_deref(), Some("first second"));
    }
}
