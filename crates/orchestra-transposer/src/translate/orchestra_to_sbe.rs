// crates/orchestra-transposer/src/translate/orchestra_to_sbe.rs

//! Orchestra 1.0 → SBE 1.0 message schema translation.

use std::io::{BufRead, Write};

use log::{debug, error, warn};

use crate::error::TransposerError;
use crate::orchestra::{
    self, Orchestra10, OrchestraInstance10, Repository, documentation_text,
};
use crate::sbe::{Sbe10, SbeInstance};
use crate::xml::Node;

/// Longest name SBE tooling accepts for a field or group.
const MAX_NAME_LEN: usize = 64;

/// Orchestra datatypes with no SBE counterpart. Length and NumInGroup are
/// implicit in SBE's length-prefix and group-dimension encodings; the rest
/// are repository bookkeeping types.
const SKIPPED_DATATYPES: &[&str] = &[
    "NumInGroup",
    "Length",
    "Reserved100Plus",
    "Reserved1000Plus",
    "Reserved4000Plus",
    "XID",
    "XIDREF",
];

/// Components that are protocol framing rather than payload; SBE has no
/// equivalent abstraction, so they are never expanded.
const FRAMING_COMPONENTS: &[&str] = &["StandardHeader", "StandardTrailer"];

/// Tracks the expansion path to keep recursive reference resolution
/// cycle-safe on malformed input.
#[derive(Default)]
struct ExpandState {
    component_stack: Vec<i64>,
    group_stack: Vec<i64>,
}

/// Translates an Orchestra version 1.0 repository into an SBE version 1.0
/// message schema.
#[derive(Debug, Default)]
pub struct Orchestra2Sbe;

impl Orchestra2Sbe {
    pub fn new() -> Self {
        Orchestra2Sbe
    }

    /// Translates a decoded Orchestra instance into a fresh SBE instance.
    pub fn translate(&self, orch: &OrchestraInstance10) -> SbeInstance {
        let mut sbe = SbeInstance::new();
        self.metadata(orch, &mut sbe);
        self.datatypes(orch, &mut sbe);
        self.codesets(orch, &mut sbe);
        self.messages(orch, &mut sbe);
        sbe
    }

    /// Translates an Orchestra document stream into an SBE document stream.
    ///
    /// Decode findings abort the conversion and are returned as the error
    /// list; no output is written in that case.
    pub fn translate_xml<R: BufRead, W: Write>(
        &self,
        orch_xml: R,
        sbe_out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        let (orch, errors) = Orchestra10::read_xml(orch_xml)?;
        if !errors.is_empty() {
            for e in &errors {
                error!("{e}");
            }
            return Ok(errors);
        }
        let sbe = self.translate(&orch);
        let errors = Sbe10::write_xml(&sbe, sbe_out)?;
        for e in &errors {
            error!("{e}");
        }
        Ok(errors)
    }

    /// Message schema header attributes. The schema id comes from the
    /// repository's `dcterms:identifier`, defaulting to 1.
    fn metadata(&self, orch: &OrchestraInstance10, sbe: &mut SbeInstance) {
        let package = orch
            .root()
            .attr_text("name")
            .map(|n| n.into_owned())
            .unwrap_or_else(|| "Unknown".to_string());
        let id = orch
            .metadata_term("dcterms:identifier")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let root = sbe.root_mut();
        root.set_attr("package", package);
        root.set_attr("id", id);
        root.set_attr("version", 0i64);
    }

    fn datatypes(&self, orch: &OrchestraInstance10, sbe: &mut SbeInstance) {
        for datatype in orch.datatypes() {
            let Some(name) = datatype.attr_str("name") else {
                continue;
            };
            if SKIPPED_DATATYPES.contains(&name) {
                continue;
            }
            let mapping = datatype
                .children_named("fixr:mappedDatatype")
                .find(|m| m.attr_str("standard") == Some("SBE"));
            let Some(mapping) = mapping else {
                warn!("datatype name={name} has no SBE mapping; skipped");
                continue;
            };
            if let Some(extension) = mapping.child("fixr:extension") {
                self.embedded_composites(name, extension, sbe);
            } else {
                let mut encoding = Node::new("type");
                encoding.set_attr("name", name);
                encoding.set_attr("semanticType", name);
                if let Some(doc) = documentation_text(mapping) {
                    encoding.set_attr("description", doc);
                }
                if let Some(base) = mapping.attr_str("base") {
                    encoding.set_attr("primitiveType", base);
                }
                if let Some(min) = mapping.attr_str("minInclusive") {
                    encoding.set_attr("minValue", min);
                }
                if let Some(max) = mapping.attr_str("maxInclusive") {
                    encoding.set_attr("maxValue", max);
                }
                sbe.append_encoding_type(encoding);
            }
        }
    }

    /// Lifts composite encodings embedded under a datatype's
    /// `fixr:extension/sbe:messageSchema/types` into the schema's own types.
    fn embedded_composites(&self, name: &str, extension: &Node, sbe: &mut SbeInstance) {
        let types = extension
            .child("sbe:messageSchema")
            .and_then(|s| s.child("types"));
        let Some(types) = types else {
            error!("SBE datatype mapping not found for name={name}");
            return;
        };
        for composite in types.children_named("composite") {
            sbe.append_composite(composite.clone());
        }
    }

    fn codesets(&self, orch: &OrchestraInstance10, sbe: &mut SbeInstance) {
        for codeset in orch.codesets() {
            let mut enumeration = Node::new("enum");
            if let Some(name) = codeset.attr_text("name") {
                enumeration.set_attr("name", name.into_owned());
            }
            if let Some(encoding_type) = codeset.attr_text("type") {
                enumeration.set_attr("encodingType", encoding_type.into_owned());
            }
            if let Some(doc) = documentation_text(codeset) {
                enumeration.set_attr("description", doc);
            }
            for code in codeset.children_named("fixr:code") {
                let mut valid_value = Node::new("validValue");
                if let Some(name) = code.attr_text("name") {
                    valid_value.set_attr("name", name.into_owned());
                }
                if let Some(doc) = documentation_text(code) {
                    valid_value.set_attr("description", doc);
                }
                if let Some(value) = code.attr_text("value") {
                    valid_value.set_text(value.into_owned());
                }
                enumeration.push_child(valid_value);
            }
            sbe.append_enum(enumeration);
        }
    }

    fn messages(&self, orch: &OrchestraInstance10, sbe: &mut SbeInstance) {
        for msg in orch.messages() {
            let mut message = Node::new("message");
            if let Some(name) = msg.attr_text("name") {
                message.set_attr("name", name.into_owned());
            }
            if let Some(id) = msg.attr_i64("id") {
                message.set_attr("id", id);
            }
            if let Some(msg_type) = msg.attr_text("msgType") {
                message.set_attr("semanticType", msg_type.into_owned());
            }
            if let Some(doc) = documentation_text(msg) {
                message.set_attr("description", doc);
            }
            let mut state = ExpandState::default();
            if let Some(body) = msg.child("fixr:structure") {
                self.append_members(&mut message, body, orch, &mut state);
            }
            sbe.append_message(message);
        }
    }

    /// Collects the members reachable from a structure and re-emits them in
    /// the order SBE's wire layout requires: fixed fields, then groups, then
    /// variable-length data, regardless of the source member order.
    fn append_members(
        &self,
        target: &mut Node,
        source: &Node,
        orch: &OrchestraInstance10,
        state: &mut ExpandState,
    ) {
        let mut fields = Vec::new();
        let mut groups = Vec::new();
        let mut data = Vec::new();
        self.fields_into(orch, source, &mut fields, &mut data);
        self.components_into(orch, source, &mut fields, &mut groups, &mut data, state);
        self.groups_into(orch, source, &mut groups, state);
        for field in fields {
            SbeInstance::append_field(target, field);
        }
        for group in groups {
            SbeInstance::append_group(target, group);
        }
        for field in data {
            SbeInstance::append_data(target, field);
        }
    }

    fn fields_into(
        &self,
        orch: &OrchestraInstance10,
        source: &Node,
        fields: &mut Vec<Node>,
        data: &mut Vec<Node>,
    ) {
        for field_ref in orchestra::field_refs(source) {
            let Some(id) = field_ref.attr_i64("id") else {
                warn!("fieldRef without id skipped");
                continue;
            };
            let field = orch.field(id);
            let (name, field_type) = match field {
                Some(field) => (
                    self.shortened_name("field", id, field),
                    field
                        .attr_str("type")
                        .unwrap_or("Unknown")
                        .to_string(),
                ),
                None => {
                    warn!("field id={id} not defined");
                    ("Unknown".to_string(), "Unknown".to_string())
                }
            };
            if field_type == "Length" || field_type == "NumInGroup" {
                debug!("field id={id} name={name} dropped; {field_type} is implicit in SBE");
                continue;
            }
            let mut node = Node::new("field");
            node.set_attr("id", id);
            node.set_attr("name", name);
            node.set_attr("presence", map_presence(field_ref.attr_str("presence")));
            node.set_attr("type", field_type.as_str());
            if let Some(doc) = documentation_text(field_ref) {
                node.set_attr("description", doc);
            }
            if field_type == "data" {
                data.push(node);
            } else {
                fields.push(node);
            }
        }
    }

    /// Recursively dissolves components into their members. Framing
    /// components are dropped whole; everything else contributes its fields,
    /// nested components, and groups.
    fn components_into(
        &self,
        orch: &OrchestraInstance10,
        source: &Node,
        fields: &mut Vec<Node>,
        groups: &mut Vec<Node>,
        data: &mut Vec<Node>,
        state: &mut ExpandState,
    ) {
        for component_ref in orchestra::component_refs(source) {
            let Some(id) = component_ref.attr_i64("id") else {
                warn!("componentRef without id skipped");
                continue;
            };
            let Some(component) = orch.component(id) else {
                warn!("component id={id} not defined");
                continue;
            };
            let name = component.attr_str("name").unwrap_or("Unknown");
            if FRAMING_COMPONENTS.contains(&name) {
                debug!("component id={id} name={name} not expanded");
                continue;
            }
            if state.component_stack.contains(&id) {
                warn!("cyclic component reference id={id} name={name}");
                continue;
            }
            state.component_stack.push(id);
            self.fields_into(orch, component, fields, data);
            self.components_into(orch, component, fields, groups, data, state);
            self.groups_into(orch, component, groups, state);
            state.component_stack.pop();
        }
    }

    fn groups_into(
        &self,
        orch: &OrchestraInstance10,
        source: &Node,
        groups: &mut Vec<Node>,
        state: &mut ExpandState,
    ) {
        for group_ref in orchestra::group_refs(source) {
            let Some(id) = group_ref.attr_i64("id") else {
                warn!("groupRef without id skipped");
                continue;
            };
            let Some(group) = orch.group(id) else {
                warn!("group id={id} not defined");
                let mut placeholder = Node::new("group");
                placeholder.set_attr("id", id);
                placeholder.set_attr("name", "Unknown");
                groups.push(placeholder);
                continue;
            };
            if state.group_stack.contains(&id) {
                warn!("cyclic group reference id={id}");
                continue;
            }
            let mut node = Node::new("group");
            node.set_attr("id", id);
            node.set_attr("name", self.shortened_name("group", id, group));
            if let Some(doc) = documentation_text(group) {
                node.set_attr("description", doc);
            }
            state.group_stack.push(id);
            self.append_members(&mut node, group, orch, state);
            state.group_stack.pop();
            groups.push(node);
        }
    }

    /// Name of a field or group definition, shortened when it exceeds the
    /// SBE limit: an explicit `abbrName` wins over plain truncation. One
    /// warning per occurrence.
    fn shortened_name(&self, kind: &str, id: i64, definition: &Node) -> String {
        let name = definition.attr_str("name").unwrap_or("Unknown");
        if name.chars().count() <= MAX_NAME_LEN {
            return name.to_string();
        }
        let short: String = match definition.attr_str("abbrName") {
            Some(abbr) => abbr.to_string(),
            None => name.chars().take(MAX_NAME_LEN).collect(),
        };
        warn!("{kind} id={id} name={name} shortened to {short}");
        short
    }
}

/// Orchestra presence vocabulary to SBE presence vocabulary.
fn map_presence(presence: Option<&str>) -> &'static str {
    match presence {
        Some("required") => "required",
        Some("constant") => "constant",
        _ => "optional",
    }
}

#[cfg(test)]
mod tests {
    use super::map_presence;

    #[test]
    fn test_presence_mapping() {
        assert_eq!(map_presence(Some("required")), "required");
        assert_eq!(map_presence(Some("constant")), "constant");
        assert_eq!(map_presence(Some("optional")), "optional");
        assert_eq!(map_presence(Some("forbidden")), "optional");
        assert_eq!(map_presence(None), "optional");
    }
}
