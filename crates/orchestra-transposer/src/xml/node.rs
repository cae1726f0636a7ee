// crates/orchestra-transposer/src/xml/node.rs

//! The generic document tree.

use std::borrow::Cow;
use std::fmt;

/// An attribute value.
///
/// Decoding always produces [`AttrValue::Str`]; the typed variants arise from
/// translator coercions (synthesized identifiers, the 1.0→1.1 `sort`
/// coercion) and serialize through their display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Literal attribute text.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Boolean value, serialized as `true`/`false`.
    Bool(bool),
}

impl AttrValue {
    /// The serialized form of the value.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            AttrValue::Str(s) => Cow::Borrowed(s.as_str()),
            AttrValue::Int(i) => Cow::Owned(i.to_string()),
            AttrValue::Bool(b) => Cow::Owned(b.to_string()),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<Cow<'_, str>> for AttrValue {
    fn from(value: Cow<'_, str>) -> Self {
        AttrValue::Str(value.into_owned())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// One element of a decoded XML document.
///
/// Attribute insertion order and child order are preserved exactly as read;
/// both are significant on output (SBE member order is the wire layout, and
/// structural insertion rules rely on positional adjacency).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    name: String,
    attrs: Vec<(String, AttrValue)>,
    children: Vec<Node>,
    text: Option<String>,
}

impl Node {
    /// Creates an element with no attributes, children, or text.
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Canonical element name (prefix-qualified where the dialect uses one).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up an attribute by name.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// String attribute value; `None` for typed variants.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        match self.attr(key) {
            Some(AttrValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attribute value in its serialized form, whatever the variant.
    pub fn attr_text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.attr(key).map(AttrValue::as_text)
    }

    /// Integer attribute value, parsing string attributes on demand.
    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        match self.attr(key)? {
            AttrValue::Int(i) => Some(*i),
            AttrValue::Str(s) => s.trim().parse().ok(),
            AttrValue::Bool(_) => None,
        }
    }

    /// Sets an attribute, replacing an existing value in place so that
    /// attribute order stays stable.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Removes an attribute, returning its value if it was present.
    pub fn remove_attr(&mut self, key: &str) -> Option<AttrValue> {
        let idx = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Replaces the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Appends decoded text, concatenating split text events.
    pub fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Children in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Mutable access to the child list.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Inserts a child element at a position.
    pub fn insert_child(&mut self, index: usize, child: Node) {
        self.children.insert(index, child);
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child with the given name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// All children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the first child with the given name, creating and attaching
    /// an empty one when absent. This is the single auto-vivification point
    /// behind every get-or-create collection accessor.
    pub fn get_or_create_child(&mut self, name: &str) -> &mut Node {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(Node::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::{AttrValue, Node};

    #[test]
    fn test_attr_order_preserved() {
        let mut node = Node::new("field");
        node.set_attr("id", 35i64);
        node.set_attr("name", "MsgType");
        node.set_attr("type", "String");
        let keys: Vec<&str> = node.attrs().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "name", "type"]);

        // Replacing a value must not move the attribute.
        node.set_attr("name", "MessageType");
        let keys: Vec<&str> = node.attrs().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "name", "type"]);
        assert_eq!(node.attr_str("name"), Some("MessageType"));
    }

    #[test]
    fn test_attr_i64_parses_strings() {
        let mut node = Node::new("code");
        node.set_attr("sort", "17");
        node.set_attr("id", 9i64);
        assert_eq!(node.attr_i64("sort"), Some(17));
        assert_eq!(node.attr_i64("id"), Some(9));
        node.set_attr("sort", "seventeen");
        assert_eq!(node.attr_i64("sort"), None);
    }

    #[test]
    fn test_get_or_create_child_is_idempotent() {
        let mut root = Node::new("fixr:repository");
        root.get_or_create_child("fixr:fields").push_child(Node::new("fixr:field"));
        root.get_or_create_child("fixr:fields").push_child(Node::new("fixr:field"));
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.child("fixr:fields").unwrap().children().len(), 2);
    }

    #[test]
    fn test_bool_attr_serializes_lowercase() {
        assert_eq!(AttrValue::Bool(true).as_text(), "true");
        assert_eq!(AttrValue::Bool(false).as_text(), "false");
    }
}
