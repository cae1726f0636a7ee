// crates/orchestra-transposer/src/sbe/instance.rs

//! Typed view over a decoded SBE message schema tree.
//!
//! SBE 1.0 and 2.0 documents canonicalize to the same bare element names, so
//! one view serves both versions; the codec re-qualifies names on output.

use crate::xml::Node;

/// An SBE message schema instance.
#[derive(Debug, Clone)]
pub struct SbeInstance {
    root: Node,
}

impl Default for SbeInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl SbeInstance {
    /// An empty message schema skeleton.
    pub fn new() -> Self {
        SbeInstance {
            root: Node::new("messageSchema"),
        }
    }

    /// Wraps a decoded document root.
    pub fn from_root(root: Node) -> Self {
        SbeInstance { root }
    }

    /// The document root (`messageSchema`).
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable document root.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// The types section, created on demand.
    pub fn types_mut(&mut self) -> &mut Node {
        self.root.get_or_create_child("types")
    }

    /// Simple encoding types.
    pub fn encoding_types(&self) -> impl Iterator<Item = &Node> {
        self.types_children("type")
    }

    /// Composite encoding types.
    pub fn composites(&self) -> impl Iterator<Item = &Node> {
        self.types_children("composite")
    }

    /// Enumerations, aka code sets.
    pub fn enums(&self) -> impl Iterator<Item = &Node> {
        self.types_children("enum")
    }

    fn types_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        // A schema may carry several types sections; walk them all.
        self.root
            .children_named("types")
            .flat_map(move |t| t.children_named(name))
    }

    /// Appends a simple encoding type.
    pub fn append_encoding_type(&mut self, encoding_type: Node) {
        self.types_mut().push_child(encoding_type);
    }

    /// Appends a composite type.
    pub fn append_composite(&mut self, composite: Node) {
        self.types_mut().push_child(composite);
    }

    /// Appends an enumeration.
    pub fn append_enum(&mut self, enumeration: Node) {
        self.types_mut().push_child(enumeration);
    }

    /// Messages in document order.
    pub fn messages(&self) -> impl Iterator<Item = &Node> {
        self.root.children_named("message")
    }

    /// Appends a message.
    pub fn append_message(&mut self, message: Node) {
        self.root.push_child(message);
    }

    /// Fixed-length fields of a message or group structure.
    pub fn fields(structure: &Node) -> impl Iterator<Item = &Node> {
        structure.children_named("field")
    }

    /// Repeating groups of a message or group structure.
    pub fn groups(structure: &Node) -> impl Iterator<Item = &Node> {
        structure.children_named("group")
    }

    /// Variable-length data fields of a message or group structure.
    pub fn data(structure: &Node) -> impl Iterator<Item = &Node> {
        structure.children_named("data")
    }

    /// Appends a fixed-length field, ahead of any groups or data so the
    /// fields / groups / data wire layout holds structurally.
    pub fn append_field(structure: &mut Node, field: Node) {
        let pos = structure
            .children()
            .iter()
            .position(|c| c.name() == "group" || c.name() == "data");
        match pos {
            Some(idx) => structure.insert_child(idx, field),
            None => structure.push_child(field),
        }
    }

    /// Appends a repeating group, ahead of any variable-length data.
    pub fn append_group(structure: &mut Node, group: Node) {
        let pos = structure
            .children()
            .iter()
            .position(|c| c.name() == "data");
        match pos {
            Some(idx) => structure.insert_child(idx, group),
            None => structure.push_child(group),
        }
    }

    /// Appends a variable-length data field at the end of the structure.
    pub fn append_data(structure: &mut Node, field: Node) {
        structure.push_child(field);
    }

    /// Collects fixed-length fields of a structure and every nested group,
    /// depth-first.
    pub fn collect_fields<'a>(structure: &'a Node, out: &mut Vec<&'a Node>) {
        out.extend(Self::fields(structure));
        for group in Self::groups(structure) {
            Self::collect_fields(group, out);
        }
    }

    /// Collects variable-length data fields of a structure and every nested
    /// group, depth-first.
    pub fn collect_data<'a>(structure: &'a Node, out: &mut Vec<&'a Node>) {
        out.extend(Self::data(structure));
        for group in Self::groups(structure) {
            Self::collect_data(group, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SbeInstance;
    use crate::xml::Node;

    fn named(name: &str, id: i64) -> Node {
        let mut node = Node::new(name);
        node.set_attr("id", id);
        node
    }

    #[test]
    fn test_append_keeps_wire_layout_order() {
        let mut message = Node::new("message");
        SbeInstance::append_data(&mut message, named("data", 96));
        SbeInstance::append_field(&mut message, named("field", 35));
        SbeInstance::append_group(&mut message, named("group", 555));
        SbeInstance::append_field(&mut message, named("field", 49));
        let names: Vec<&str> = message.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["field", "field", "group", "data"]);
        // Relative order within each segment follows insertion order.
        assert_eq!(message.children()[0].attr_i64("id"), Some(35));
        assert_eq!(message.children()[1].attr_i64("id"), Some(49));
    }

    #[test]
    fn test_collect_fields_descends_into_groups() {
        let mut inner = Node::new("group");
        SbeInstance::append_field(&mut inner, named("field", 3));
        let mut outer = Node::new("group");
        SbeInstance::append_field(&mut outer, named("field", 2));
        SbeInstance::append_group(&mut outer, inner);
        let mut message = Node::new("message");
        SbeInstance::append_field(&mut message, named("field", 1));
        SbeInstance::append_group(&mut message, outer);

        let mut fields = Vec::new();
        SbeInstance::collect_fields(&message, &mut fields);
        let ids: Vec<i64> = fields.iter().filter_map(|f| f.attr_i64("id")).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
