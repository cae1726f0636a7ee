// crates/orchestra-transposer/src/translate/sbe_to_orchestra.rs

//! SBE 1.0/2.0 message schema → Orchestra 1.0 translation.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use log::{error, warn};

use crate::error::TransposerError;
use crate::orchestra::{
    self, Orchestra10, OrchestraInstance10, Repository, append_documentation,
    append_to_structure,
};
use crate::sbe::{Sbe10, Sbe20, SbeInstance};
use crate::xml::Node;

/// Which SBE schema version the source document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SbeSource {
    /// SBE 1.0 (`http://fixprotocol.io/2016/sbe`).
    #[default]
    V1,
    /// SBE 2.0 release candidate (`http://fixprotocol.io/2017/sbe`).
    V2,
}

/// Translates an SBE message schema into an Orchestra version 1.0
/// repository, with embedded SBE datatype extensions.
#[derive(Debug, Default)]
pub struct Sbe2Orchestra {
    source: SbeSource,
}

impl Sbe2Orchestra {
    /// Translator for SBE 1.0 sources.
    pub fn new() -> Self {
        Sbe2Orchestra {
            source: SbeSource::V1,
        }
    }

    /// Translator for SBE 2.0 sources.
    pub fn from_sbe2() -> Self {
        Sbe2Orchestra {
            source: SbeSource::V2,
        }
    }

    /// Translates a decoded SBE instance into a fresh Orchestra instance.
    pub fn translate(&self, sbe: &SbeInstance) -> OrchestraInstance10 {
        let mut orch = OrchestraInstance10::new();
        self.metadata(sbe, &mut orch);
        self.datatypes(sbe, &mut orch);
        self.codesets(sbe, &mut orch);
        self.fields(sbe, &mut orch);
        // Vivify ahead of the message walk so the group collection lands
        // before messages in document order.
        orch.groups_mut();
        orch.messages_mut();
        self.messages_and_groups(sbe, &mut orch);
        orch
    }

    /// Translates an SBE document stream into an Orchestra document stream.
    ///
    /// Decode findings abort the conversion and are returned as the error
    /// list; no output is written in that case.
    pub fn translate_xml<R: BufRead, W: Write>(
        &self,
        sbe_xml: R,
        orch_out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        let (sbe, errors) = match self.source {
            SbeSource::V1 => Sbe10::read_xml(sbe_xml)?,
            SbeSource::V2 => Sbe20::read_xml(sbe_xml)?,
        };
        if !errors.is_empty() {
            for e in &errors {
                error!("{e}");
            }
            return Ok(errors);
        }
        let orch = self.translate(&sbe);
        let errors = Orchestra10::write_xml(&orch, orch_out)?;
        for e in &errors {
            error!("{e}");
        }
        Ok(errors)
    }

    fn metadata(&self, sbe: &SbeInstance, orch: &mut OrchestraInstance10) {
        let package = sbe
            .root()
            .attr_text("package")
            .map(|p| p.into_owned())
            .unwrap_or_else(|| "Unknown".to_string());
        let id = sbe
            .root()
            .attr_text("id")
            .map(|i| i.into_owned())
            .unwrap_or_else(|| "1".to_string());
        // A bare integer is not accepted as an Orchestra 1.0 version.
        let version = format!(
            "{}.0",
            sbe.root()
                .attr_text("version")
                .map(|v| v.into_owned())
                .unwrap_or_else(|| "0".to_string())
        );
        orch.root_mut().set_attr("name", package);
        orch.root_mut().set_attr("version", version);
        orch.set_metadata_term("dcterms:identifier", &id);
    }

    /// Every SBE type maps to its own Orchestra datatype: `semanticType` is
    /// optional on the SBE side, and several encodings may share one FIX
    /// datatype, which the Orchestra 1.0 schema cannot express.
    fn datatypes(&self, sbe: &SbeInstance, orch: &mut OrchestraInstance10) {
        let mut datatypes = Vec::new();
        for encoding_type in sbe.encoding_types() {
            let mut mapping = Node::new("fixr:mappedDatatype");
            mapping.set_attr("standard", "SBE");
            if let Some(base) = encoding_type.attr_text("primitiveType") {
                mapping.set_attr("base", base.into_owned());
            }
            let mut datatype = Node::new("fixr:datatype");
            if let Some(name) = encoding_type.attr_text("name") {
                datatype.set_attr("name", name.into_owned());
            }
            datatype.push_child(mapping);
            datatypes.push(datatype);
        }
        for composite in sbe.composites() {
            let mut mapping = Node::new("fixr:mappedDatatype");
            mapping.set_attr("standard", "SBE");
            mapping.push_child(embed_composite(composite));
            let mut datatype = Node::new("fixr:datatype");
            if let Some(name) = composite.attr_text("name") {
                datatype.set_attr("name", name.into_owned());
            }
            datatype.push_child(mapping);
            datatypes.push(datatype);
        }
        for datatype in datatypes {
            orch.append_datatype(datatype);
        }
    }

    /// SBE enums carry no numeric identifiers; codeset and code ids are
    /// synthesized from position as `index * 100` and `index * 100 + code`,
    /// a pure function of document order.
    fn codesets(&self, sbe: &SbeInstance, orch: &mut OrchestraInstance10) {
        let mut codesets = Vec::new();
        for (idx, sbe_enum) in sbe.enums().enumerate() {
            let idx = idx as i64 + 1;
            let mut codeset = Node::new("fixr:codeSet");
            if let Some(name) = sbe_enum.attr_text("name") {
                codeset.set_attr("name", name.into_owned());
            }
            codeset.set_attr("id", idx * 100);
            if let Some(encoding_type) = sbe_enum.attr_text("encodingType") {
                codeset.set_attr("type", encoding_type.into_owned());
            }
            for (code_idx, valid_value) in sbe_enum.children_named("validValue").enumerate() {
                let mut code = Node::new("fixr:code");
                if let Some(name) = valid_value.attr_text("name") {
                    code.set_attr("name", name.into_owned());
                }
                code.set_attr("id", idx * 100 + code_idx as i64 + 1);
                if let Some(value) = valid_value.text() {
                    code.set_attr("value", value);
                }
                if let Some(doc) = valid_value.attr_str("description") {
                    append_documentation(&mut code, doc);
                }
                codeset.push_child(code);
            }
            if let Some(doc) = sbe_enum.attr_str("description") {
                append_documentation(&mut codeset, doc);
            }
            codesets.push(codeset);
        }
        for codeset in codesets {
            orch.append_codeset(codeset);
        }
    }

    /// One flat field catalogue across all messages and their nested groups,
    /// de-duplicated by id and sorted by id for deterministic output.
    fn fields(&self, sbe: &SbeInstance, orch: &mut OrchestraInstance10) {
        let mut catalogue: BTreeMap<i64, &Node> = BTreeMap::new();
        for message in sbe.messages() {
            let mut members = Vec::new();
            SbeInstance::collect_fields(message, &mut members);
            SbeInstance::collect_data(message, &mut members);
            for member in members {
                if let Some(id) = member.attr_i64("id") {
                    catalogue.insert(id, member);
                }
            }
        }
        let mut fields = Vec::new();
        for (id, sbe_field) in catalogue {
            let mut field = Node::new("fixr:field");
            field.set_attr("id", id);
            if let Some(name) = sbe_field.attr_text("name") {
                field.set_attr("name", name.into_owned());
            }
            if let Some(field_type) = sbe_field.attr_text("type") {
                field.set_attr("type", field_type.into_owned());
            }
            if let Some(doc) = sbe_field.attr_str("description") {
                append_documentation(&mut field, doc);
            }
            fields.push(field);
        }
        for field in fields {
            orch.append_field(field);
        }
    }

    fn messages_and_groups(&self, sbe: &SbeInstance, orch: &mut OrchestraInstance10) {
        let mut messages = Vec::new();
        let mut group_defs = Vec::new();
        let mut seen_groups = Vec::new();
        for sbe_message in sbe.messages() {
            let mut message = Node::new("fixr:message");
            if let Some(name) = sbe_message.attr_text("name") {
                message.set_attr("name", name.into_owned());
            }
            if let Some(id) = sbe_message.attr_i64("id") {
                message.set_attr("id", id);
            }
            if let Some(msg_type) = sbe_message.attr_text("semanticType") {
                message.set_attr("msgType", msg_type.into_owned());
            }
            let body = orchestra::structure(&mut message);
            self.append_members(body, sbe_message);
            if let Some(doc) = sbe_message.attr_str("description") {
                append_documentation(&mut message, doc);
            }
            messages.push(message);
            self.group_definitions(sbe_message, &mut group_defs, &mut seen_groups);
        }
        for group in group_defs {
            orch.append_group(group);
        }
        for message in messages {
            orch.append_message(message);
        }
    }

    /// Emits an Orchestra group definition for every group at every nesting
    /// depth, first occurrence winning on duplicate ids, so that each
    /// `groupRef` in the output resolves.
    fn group_definitions(
        &self,
        structure: &Node,
        group_defs: &mut Vec<Node>,
        seen: &mut Vec<i64>,
    ) {
        for sbe_group in SbeInstance::groups(structure) {
            let id = sbe_group.attr_i64("id");
            if let Some(id) = id {
                if seen.contains(&id) {
                    self.group_definitions(sbe_group, group_defs, seen);
                    continue;
                }
                seen.push(id);
            }
            let mut group = Node::new("fixr:group");
            if let Some(name) = sbe_group.attr_text("name") {
                group.set_attr("name", name.into_owned());
            }
            if let Some(id) = id {
                group.set_attr("id", id);
            }
            self.append_members(&mut group, sbe_group);
            group_defs.push(group);
            self.group_definitions(sbe_group, group_defs, seen);
        }
    }

    /// Member references in source order: fields, groups, then data, which
    /// is also the order the SBE document stores them in.
    fn append_members(&self, target: &mut Node, source: &Node) {
        for sbe_field in SbeInstance::fields(source) {
            append_to_structure(target, self.field_ref(sbe_field));
        }
        for sbe_group in SbeInstance::groups(source) {
            let mut group_ref = Node::new("fixr:groupRef");
            if let Some(id) = sbe_group.attr_i64("id") {
                group_ref.set_attr("id", id);
            }
            if let Some(doc) = sbe_group.attr_str("description") {
                append_documentation(&mut group_ref, doc);
            }
            append_to_structure(target, group_ref);
        }
        for sbe_field in SbeInstance::data(source) {
            append_to_structure(target, self.field_ref(sbe_field));
        }
    }

    fn field_ref(&self, sbe_field: &Node) -> Node {
        let mut field_ref = Node::new("fixr:fieldRef");
        match sbe_field.attr_i64("id") {
            Some(id) => field_ref.set_attr("id", id),
            None => warn!("SBE field without id"),
        }
        field_ref.set_attr("presence", map_presence(sbe_field.attr_str("presence")));
        if let Some(doc) = sbe_field.attr_str("description") {
            append_documentation(&mut field_ref, doc);
        }
        field_ref
    }
}

/// Rebuilds the `sbe:messageSchema/types` wrapper a composite lives under
/// when embedded in an Orchestra datatype extension.
fn embed_composite(composite: &Node) -> Node {
    let mut types = Node::new("types");
    types.push_child(composite.clone());
    let mut schema = Node::new("sbe:messageSchema");
    schema.push_child(types);
    let mut extension = Node::new("fixr:extension");
    extension.push_child(schema);
    extension
}

/// SBE presence vocabulary to Orchestra presence vocabulary.
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
    fn test_presence_mapping_defaults_to_optional() {
        assert_eq!(map_presence(None), "optional");
        assert_eq!(map_presence(Some("optional")), "optional");
        assert_eq!(map_presence(Some("required")), "required");
        assert_eq!(map_presence(Some("constant")), "constant");
    }
}
