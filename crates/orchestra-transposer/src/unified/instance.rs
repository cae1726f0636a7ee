// crates/orchestra-transposer/src/unified/instance.rs

//! Typed views over the Unified Repository main document and its phrases
//! companion.

use crate::xml::Node;

/// The main Unified Repository document (`fixRepository` root holding one
/// `fix` block per protocol version).
#[derive(Debug, Clone)]
pub struct UnifiedMainInstance {
    root: Node,
}

impl Default for UnifiedMainInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl UnifiedMainInstance {
    /// An empty repository skeleton.
    pub fn new() -> Self {
        UnifiedMainInstance {
            root: Node::new("fixRepository"),
        }
    }

    /// Wraps a decoded document root.
    pub fn from_root(root: Node) -> Self {
        UnifiedMainInstance { root }
    }

    /// The document root (`fixRepository`).
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable document root.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// The `fix` block for a version, or the first block when no version is
    /// given.
    pub fn fix(&self, version: Option<&str>) -> Option<&Node> {
        match version {
            Some(v) => self
                .root
                .children_named("fix")
                .find(|f| f.attr_str("version") == Some(v)),
            None => self.root.children_named("fix").next(),
        }
    }

    /// The `fix` block for a version, created on demand.
    pub fn fix_mut(&mut self, version: &str) -> &mut Node {
        let pos = self
            .root
            .children()
            .iter()
            .position(|c| c.name() == "fix" && c.attr_str("version") == Some(version));
        let idx = match pos {
            Some(idx) => idx,
            None => {
                let mut fix = Node::new("fix");
                fix.set_attr("version", version);
                self.root.push_child(fix);
                self.root.children().len() - 1
            }
        };
        &mut self.root.children_mut()[idx]
    }

    /// Sections of a `fix` block.
    pub fn sections(fix: &Node) -> impl Iterator<Item = &Node> {
        collection(fix, "sections", "section")
    }

    /// Categories of a `fix` block.
    pub fn categories(fix: &Node) -> impl Iterator<Item = &Node> {
        collection(fix, "categories", "category")
    }

    /// Datatypes of a `fix` block.
    pub fn datatypes(fix: &Node) -> impl Iterator<Item = &Node> {
        collection(fix, "datatypes", "datatype")
    }

    /// Fields of a `fix` block; enumerated values are inline `enum` children.
    pub fn fields(fix: &Node) -> impl Iterator<Item = &Node> {
        collection(fix, "fields", "field")
    }

    /// Components of a `fix` block; repeating groups are components with a
    /// `repeating` flag.
    pub fn components(fix: &Node) -> impl Iterator<Item = &Node> {
        collection(fix, "components", "component")
    }

    /// Messages of a `fix` block.
    pub fn messages(fix: &Node) -> impl Iterator<Item = &Node> {
        collection(fix, "messages", "message")
    }

    /// Field definition by numeric id (the FIX tag).
    pub fn field_by_id(fix: &Node, id: i64) -> Option<&Node> {
        Self::fields(fix).find(|f| f.attr_i64("id") == Some(id))
    }

    /// Component definition by numeric id.
    pub fn component_by_id(fix: &Node, id: i64) -> Option<&Node> {
        Self::components(fix).find(|c| c.attr_i64("id") == Some(id))
    }

    pub fn sections_mut(fix: &mut Node) -> &mut Node {
        fix.get_or_create_child("sections")
    }

    pub fn categories_mut(fix: &mut Node) -> &mut Node {
        fix.get_or_create_child("categories")
    }

    pub fn datatypes_mut(fix: &mut Node) -> &mut Node {
        fix.get_or_create_child("datatypes")
    }

    pub fn fields_mut(fix: &mut Node) -> &mut Node {
        fix.get_or_create_child("fields")
    }

    pub fn components_mut(fix: &mut Node) -> &mut Node {
        fix.get_or_create_child("components")
    }

    pub fn messages_mut(fix: &mut Node) -> &mut Node {
        fix.get_or_create_child("messages")
    }
}

fn collection<'a>(
    fix: &'a Node,
    container: &'static str,
    item: &'static str,
) -> impl Iterator<Item = &'a Node> {
    fix.child(container)
        .into_iter()
        .flat_map(move |c| c.children_named(item))
}

/// The phrases companion document: opaque `textId` keys mapped to
/// documentation paragraphs.
#[derive(Debug, Clone)]
pub struct UnifiedPhrasesInstance {
    root: Node,
}

impl Default for UnifiedPhrasesInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl UnifiedPhrasesInstance {
    /// An empty phrases skeleton.
    pub fn new() -> Self {
        UnifiedPhrasesInstance {
            root: Node::new("phrases"),
        }
    }

    /// Wraps a decoded document root.
    pub fn from_root(root: Node) -> Self {
        UnifiedPhrasesInstance { root }
    }

    /// The document root (`phrases`).
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable document root.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Documentation entries stored under a `textId` key, as
    /// `(purpose, text)` pairs. Multi-paragraph entries join with newlines.
    pub fn text_id(&self, key: &str) -> Vec<(Option<String>, String)> {
        let Some(phrase) = self
            .root
            .children_named("phrase")
            .find(|p| p.attr_str("textId") == Some(key))
        else {
            return Vec::new();
        };
        phrase
            .children_named("text")
            .map(|text| {
                let purpose = text.attr_str("purpose").map(str::to_string);
                let paras: Vec<&str> = text
                    .children_named("para")
                    .filter_map(Node::text)
                    .collect();
                let body = if paras.is_empty() {
                    text.text().unwrap_or_default().to_string()
                } else {
                    paras.join("\n")
                };
                (purpose, body)
            })
            .collect()
    }

    /// Stores documentation entries under a `textId` key, replacing any
    /// phrase already stored for that key.
    pub fn set_phrase(&mut self, key: &str, entries: &[(Option<String>, Option<String>)]) {
        self.root
            .children_mut()
            .retain(|p| !(p.name() == "phrase" && p.attr_str("textId") == Some(key)));
        let mut phrase = Node::new("phrase");
        phrase.set_attr("textId", key);
        for (purpose, body) in entries {
            let mut text = Node::new("text");
            if let Some(purpose) = purpose {
                text.set_attr("purpose", purpose.as_str());
            }
            let mut para = Node::new("para");
            if let Some(body) = body {
                para.set_text(body.as_str());
            }
            text.push_child(para);
            phrase.push_child(text);
        }
        self.root.push_child(phrase);
    }
}

/// A Unified Repository instance together with its phrases document.
///
/// Explicit composition: one main document, one phrases document, no shared
/// state between them.
#[derive(Debug, Clone, Default)]
pub struct UnifiedWithPhrases {
    /// The main repository document.
    pub main: UnifiedMainInstance,
    /// The phrases companion document.
    pub phrases: UnifiedPhrasesInstance,
}

impl UnifiedWithPhrases {
    /// Empty skeletons for both documents.
    pub fn new() -> Self {
        UnifiedWithPhrases {
            main: UnifiedMainInstance::new(),
            phrases: UnifiedPhrasesInstance::new(),
        }
    }

    /// Pairs two decoded documents.
    pub fn from_parts(main: UnifiedMainInstance, phrases: UnifiedPhrasesInstance) -> Self {
        UnifiedWithPhrases { main, phrases }
    }

    /// Stores documentation for a `textId` key in the phrases document.
    pub fn append_documentation(
        &mut self,
        text_id: &str,
        entries: &[(Option<String>, Option<String>)],
    ) {
        self.phrases.set_phrase(text_id, entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_defaults_to_first_version_block() {
        let mut unified = UnifiedMainInstance::new();
        unified.fix_mut("FIX.4.4");
        unified.fix_mut("FIX.Latest_EP269");
        assert_eq!(
            unified.fix(None).unwrap().attr_str("version"),
            Some("FIX.4.4")
        );
        assert_eq!(
            unified
                .fix(Some("FIX.Latest_EP269"))
                .unwrap()
                .attr_str("version"),
            Some("FIX.Latest_EP269")
        );
        assert!(unified.fix(Some("FIX.5.0")).is_none());
    }

    #[test]
    fn test_set_phrase_replaces_by_key() {
        let mut phrases = UnifiedPhrasesInstance::new();
        phrases.set_phrase(
            "FIELD_112",
            &[(Some("SYNOPSIS".to_string()), Some("old".to_string()))],
        );
        phrases.set_phrase(
            "FIELD_112",
            &[
                (Some("SYNOPSIS".to_string()), Some("new".to_string())),
                (Some("ELABORATION".to_string()), Some("details".to_string())),
            ],
        );
        phrases.set_phrase("FIELD_113", &[(None, Some("other".to_string()))]);

        assert_eq!(
            phrases.text_id("FIELD_112"),
            vec![
                (Some("SYNOPSIS".to_string()), "new".to_string()),
                (Some("ELABORATION".to_string()), "details".to_string()),
            ]
        );
        assert_eq!(
            phrases.text_id("FIELD_113"),
            vec![(None, "other".to_string())]
        );
        assert_eq!(phrases.root().children().len(), 2);
    }
}
